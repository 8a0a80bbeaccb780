//! Item model, patch type and item views

use serde::{Deserialize, Serialize};

use crate::models::{booking::BookingShort, comment::CommentResponse};

/// Item entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub owner_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<i64>,
}

/// New item creation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub name: String,
    pub description: String,
    pub available: bool,
    pub request_id: Option<i64>,
}

/// Item update payload
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItem {
    pub name: Option<String>,
    pub description: Option<String>,
    pub available: Option<bool>,
}

impl UpdateItem {
    /// Merge the patch into `item`. Ownership and the request link never change.
    pub fn apply(self, item: Item) -> Item {
        Item {
            name: self.name.unwrap_or(item.name),
            description: self.description.unwrap_or(item.description),
            available: self.available.unwrap_or(item.available),
            ..item
        }
    }
}

/// Item together with the booking context visible to the viewer
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDetails {
    #[serde(flatten)]
    pub item: Item,
    pub last_booking: Option<BookingShort>,
    pub next_booking: Option<BookingShort>,
    pub comments: Vec<CommentResponse>,
}

/// Query parameters for item search
#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    pub text: Option<String>,
    pub from: Option<i64>,
    pub size: Option<i64>,
}
