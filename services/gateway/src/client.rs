//! HTTP client forwarding accepted requests to the ShareIt server

use axum::{
    body::Body,
    http::{HeaderValue, StatusCode, header},
    response::Response,
};
use reqwest::{Client, Method};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::error::GatewayResult;

pub const SHARER_USER_HEADER: &str = "X-Sharer-User-Id";
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// A request headed for the server
pub struct Forward<'a, B: Serialize = ()> {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub user_id: Option<i64>,
    pub request_id: &'a str,
    pub body: Option<&'a B>,
}

impl<'a> Forward<'a> {
    pub fn new(method: Method, path: impl Into<String>, request_id: &'a str) -> Self {
        Forward {
            method,
            path: path.into(),
            query: Vec::new(),
            user_id: None,
            request_id,
            body: None,
        }
    }
}

impl<'a, B: Serialize> Forward<'a, B> {
    pub fn user(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn body<T: Serialize>(self, body: &'a T) -> Forward<'a, T> {
        Forward {
            method: self.method,
            path: self.path,
            query: self.query,
            user_id: self.user_id,
            request_id: self.request_id,
            body: Some(body),
        }
    }
}

/// Client for the ShareIt server
#[derive(Clone)]
pub struct ServerClient {
    http: Client,
    base_url: String,
}

impl ServerClient {
    pub fn new(base_url: &str, timeout: Duration) -> GatewayResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Send the request and relay the server's status and body unchanged
    pub async fn send<B: Serialize>(&self, forward: Forward<'_, B>) -> GatewayResult<Response> {
        let url = format!("{}{}", self.base_url, forward.path);
        debug!("Forwarding {} {}", forward.method, url);

        let mut request = self
            .http
            .request(forward.method, &url)
            .header(REQUEST_ID_HEADER, forward.request_id);
        if !forward.query.is_empty() {
            request = request.query(&forward.query);
        }
        if let Some(user_id) = forward.user_id {
            request = request.header(SHARER_USER_HEADER, user_id.to_string());
        }
        if let Some(body) = forward.body {
            request = request.json(body);
        }

        let upstream = request.send().await?;
        let status =
            StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
        let bytes = upstream.bytes().await?;
        let has_body = !bytes.is_empty();

        let mut response = Response::new(Body::from(bytes));
        *response.status_mut() = status;
        if has_body {
            response.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
        }
        Ok(response)
    }
}
