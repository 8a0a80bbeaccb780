//! Payloads accepted by the gateway before they are forwarded
//!
//! Every field is optional so that missing values surface as field
//! errors instead of deserialization failures.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{
    error::GatewayResult,
    validation::{
        FieldErrors, required, validate_email, validate_future, validate_not_blank,
        validate_not_past, validate_positive,
    },
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserPayload {
    pub fn validate_create(&self) -> GatewayResult<()> {
        let mut errors = FieldErrors::new();
        errors
            .check("email", required(self.email.as_ref()))
            .check_present("email", self.email.as_deref(), validate_email)
            .check_present("name", self.name.as_deref(), validate_not_blank);
        errors.into_result()
    }

    pub fn validate_update(&self) -> GatewayResult<()> {
        let mut errors = FieldErrors::new();
        errors
            .check_present("email", self.email.as_deref(), validate_email)
            .check_present("name", self.name.as_deref(), validate_not_blank);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<i64>,
}

impl ItemPayload {
    pub fn validate_create(&self) -> GatewayResult<()> {
        let mut errors = FieldErrors::new();
        errors
            .check("name", required(self.name.as_ref()))
            .check_present("name", self.name.as_deref(), validate_not_blank)
            .check("description", required(self.description.as_ref()))
            .check_present("description", self.description.as_deref(), validate_not_blank)
            .check("available", required(self.available.as_ref()))
            .check_present("requestId", self.request_id.as_ref(), validate_positive);
        errors.into_result()
    }

    pub fn validate_update(&self) -> GatewayResult<()> {
        let mut errors = FieldErrors::new();
        errors
            .check_present("name", self.name.as_deref(), validate_not_blank)
            .check_present("description", self.description.as_deref(), validate_not_blank);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl CommentPayload {
    pub fn validate(&self) -> GatewayResult<()> {
        let mut errors = FieldErrors::new();
        errors
            .check("text", required(self.text.as_ref()))
            .check_present("text", self.text.as_deref(), validate_not_blank);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDateTime>,
}

impl BookingPayload {
    /// Window checks are relative to `now`; ordering of start and end is
    /// left to the server.
    pub fn validate(&self, now: NaiveDateTime) -> GatewayResult<()> {
        let mut errors = FieldErrors::new();
        errors
            .check("itemId", required(self.item_id.as_ref()))
            .check_present("itemId", self.item_id.as_ref(), validate_positive)
            .check("start", required(self.start.as_ref()))
            .check_present("start", self.start.as_ref(), |start| {
                validate_not_past(start, now)
            })
            .check("end", required(self.end.as_ref()))
            .check_present("end", self.end.as_ref(), |end| validate_future(end, now));
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RequestPayload {
    pub fn validate(&self) -> GatewayResult<()> {
        let mut errors = FieldErrors::new();
        errors
            .check("description", required(self.description.as_ref()))
            .check_present("description", self.description.as_deref(), validate_not_blank);
        errors.into_result()
    }
}

/// `from`/`size` window
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub from: Option<i64>,
    pub size: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingListParams {
    pub state: Option<String>,
    pub from: Option<i64>,
    pub size: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub text: Option<String>,
    pub from: Option<i64>,
    pub size: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApprovalParams {
    pub approved: bool,
}

/// Query pairs to forward, skipping absent parameters
pub fn query_pairs(pairs: &[(&str, Option<String>)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .filter_map(|(key, value)| value.clone().map(|v| (key.to_string(), v)))
        .collect()
}
