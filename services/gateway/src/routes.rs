//! Gateway routes: validate, then forward to the server

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::extract::WithRejection;
use chrono::Utc;
use reqwest::Method;
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{
    client::{Forward, ServerClient},
    error::{GatewayError, GatewayResult},
    middleware::{RequestId, SharerUserId},
    models::{
        ApprovalParams, BookingListParams, BookingPayload, CommentPayload, ItemPayload,
        PageParams, RequestPayload, SearchParams, UserPayload, query_pairs,
    },
    validation::{validate_page, validate_state},
};

// Extractors whose failures answer 400 with the usual error body
type JsonBody<T> = WithRejection<Json<T>, GatewayError>;
type PathId = WithRejection<Path<i64>, GatewayError>;
type QueryParams<T> = WithRejection<Query<T>, GatewayError>;

/// Gateway state shared across handlers
#[derive(Clone)]
pub struct GatewayState {
    pub client: ServerClient,
}

/// Create the router for the gateway
pub fn create_router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/users", post(create_user).get(get_users))
        .route(
            "/users/:id",
            get(get_user).patch(update_user).delete(delete_user),
        )
        .route("/items", post(create_item).get(get_owner_items))
        .route("/items/search", get(search_items))
        .route("/items/:id", get(get_item).patch(update_item))
        .route("/items/:id/comment", post(add_comment))
        .route("/bookings", post(add_booking).get(get_booker_bookings))
        .route("/bookings/owner", get(get_owner_bookings))
        .route("/bookings/:id", get(get_booking).patch(approve_booking))
        .route("/requests", post(create_request).get(get_own_requests))
        .route("/requests/all", get(get_other_requests))
        .route("/requests/:id", get(get_request))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn page_query(from: Option<i64>, size: Option<i64>) -> Vec<(String, String)> {
    query_pairs(&[
        ("from", from.map(|v| v.to_string())),
        ("size", size.map(|v| v.to_string())),
    ])
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "shareit-gateway"
    }))
}

/// Create a new user
pub async fn create_user(
    State(state): State<GatewayState>,
    RequestId(request_id): RequestId,
    WithRejection(Json(payload), _): JsonBody<UserPayload>,
) -> GatewayResult<Response> {
    payload.validate_create()?;
    let forward = Forward::new(Method::POST, "/users", &request_id).body(&payload);
    state.client.send(forward).await
}

/// Get all users
pub async fn get_users(
    State(state): State<GatewayState>,
    RequestId(request_id): RequestId,
) -> GatewayResult<Response> {
    state
        .client
        .send(Forward::new(Method::GET, "/users", &request_id))
        .await
}

/// Get a user by id
pub async fn get_user(
    State(state): State<GatewayState>,
    RequestId(request_id): RequestId,
    WithRejection(Path(id), _): PathId,
) -> GatewayResult<Response> {
    let forward = Forward::new(Method::GET, format!("/users/{}", id), &request_id);
    state.client.send(forward).await
}

/// Update a user
pub async fn update_user(
    State(state): State<GatewayState>,
    RequestId(request_id): RequestId,
    WithRejection(Path(id), _): PathId,
    WithRejection(Json(payload), _): JsonBody<UserPayload>,
) -> GatewayResult<Response> {
    payload.validate_update()?;
    let forward =
        Forward::new(Method::PATCH, format!("/users/{}", id), &request_id).body(&payload);
    state.client.send(forward).await
}

/// Delete a user
pub async fn delete_user(
    State(state): State<GatewayState>,
    RequestId(request_id): RequestId,
    WithRejection(Path(id), _): PathId,
) -> GatewayResult<Response> {
    let forward = Forward::new(Method::DELETE, format!("/users/{}", id), &request_id);
    state.client.send(forward).await
}

/// Create an item
pub async fn create_item(
    State(state): State<GatewayState>,
    SharerUserId(user_id): SharerUserId,
    RequestId(request_id): RequestId,
    WithRejection(Json(payload), _): JsonBody<ItemPayload>,
) -> GatewayResult<Response> {
    payload.validate_create()?;
    let forward = Forward::new(Method::POST, "/items", &request_id)
        .user(user_id)
        .body(&payload);
    state.client.send(forward).await
}

/// Update an item
pub async fn update_item(
    State(state): State<GatewayState>,
    SharerUserId(user_id): SharerUserId,
    RequestId(request_id): RequestId,
    WithRejection(Path(id), _): PathId,
    WithRejection(Json(payload), _): JsonBody<ItemPayload>,
) -> GatewayResult<Response> {
    payload.validate_update()?;
    let forward = Forward::new(Method::PATCH, format!("/items/{}", id), &request_id)
        .user(user_id)
        .body(&payload);
    state.client.send(forward).await
}

/// Get an item
pub async fn get_item(
    State(state): State<GatewayState>,
    SharerUserId(user_id): SharerUserId,
    RequestId(request_id): RequestId,
    WithRejection(Path(id), _): PathId,
) -> GatewayResult<Response> {
    let forward = Forward::new(Method::GET, format!("/items/{}", id), &request_id).user(user_id);
    state.client.send(forward).await
}

/// Get the caller's items
pub async fn get_owner_items(
    State(state): State<GatewayState>,
    SharerUserId(user_id): SharerUserId,
    RequestId(request_id): RequestId,
    WithRejection(Query(params), _): QueryParams<PageParams>,
) -> GatewayResult<Response> {
    validate_page(params.from, params.size)?;
    let forward = Forward::new(Method::GET, "/items", &request_id)
        .user(user_id)
        .query(page_query(params.from, params.size));
    state.client.send(forward).await
}

/// Search available items
pub async fn search_items(
    State(state): State<GatewayState>,
    SharerUserId(user_id): SharerUserId,
    RequestId(request_id): RequestId,
    WithRejection(Query(params), _): QueryParams<SearchParams>,
) -> GatewayResult<Response> {
    validate_page(params.from, params.size)?;
    let mut query = query_pairs(&[("text", params.text)]);
    query.extend(page_query(params.from, params.size));

    let forward = Forward::new(Method::GET, "/items/search", &request_id)
        .user(user_id)
        .query(query);
    state.client.send(forward).await
}

/// Comment on an item
pub async fn add_comment(
    State(state): State<GatewayState>,
    SharerUserId(user_id): SharerUserId,
    RequestId(request_id): RequestId,
    WithRejection(Path(id), _): PathId,
    WithRejection(Json(payload), _): JsonBody<CommentPayload>,
) -> GatewayResult<Response> {
    payload.validate()?;
    let forward = Forward::new(Method::POST, format!("/items/{}/comment", id), &request_id)
        .user(user_id)
        .body(&payload);
    state.client.send(forward).await
}

/// Book an item
pub async fn add_booking(
    State(state): State<GatewayState>,
    SharerUserId(user_id): SharerUserId,
    RequestId(request_id): RequestId,
    WithRejection(Json(payload), _): JsonBody<BookingPayload>,
) -> GatewayResult<Response> {
    payload.validate(Utc::now().naive_utc())?;
    let forward = Forward::new(Method::POST, "/bookings", &request_id)
        .user(user_id)
        .body(&payload);
    state.client.send(forward).await
}

/// Approve or reject a booking
pub async fn approve_booking(
    State(state): State<GatewayState>,
    SharerUserId(user_id): SharerUserId,
    RequestId(request_id): RequestId,
    WithRejection(Path(id), _): PathId,
    WithRejection(Query(params), _): QueryParams<ApprovalParams>,
) -> GatewayResult<Response> {
    let forward = Forward::new(Method::PATCH, format!("/bookings/{}", id), &request_id)
        .user(user_id)
        .query(vec![("approved".to_string(), params.approved.to_string())]);
    state.client.send(forward).await
}

/// Get a booking
pub async fn get_booking(
    State(state): State<GatewayState>,
    SharerUserId(user_id): SharerUserId,
    RequestId(request_id): RequestId,
    WithRejection(Path(id), _): PathId,
) -> GatewayResult<Response> {
    let forward =
        Forward::new(Method::GET, format!("/bookings/{}", id), &request_id).user(user_id);
    state.client.send(forward).await
}

async fn list_bookings(
    state: GatewayState,
    path: &str,
    user_id: i64,
    request_id: &str,
    params: BookingListParams,
) -> GatewayResult<Response> {
    if let Some(filter) = &params.state {
        validate_state(filter)?;
    }
    validate_page(params.from, params.size)?;

    let mut query = query_pairs(&[("state", params.state)]);
    query.extend(page_query(params.from, params.size));

    let forward = Forward::new(Method::GET, path, request_id)
        .user(user_id)
        .query(query);
    state.client.send(forward).await
}

/// Get the caller's bookings
pub async fn get_booker_bookings(
    State(state): State<GatewayState>,
    SharerUserId(user_id): SharerUserId,
    RequestId(request_id): RequestId,
    WithRejection(Query(params), _): QueryParams<BookingListParams>,
) -> GatewayResult<Response> {
    list_bookings(state, "/bookings", user_id, &request_id, params).await
}

/// Get bookings of the caller's items
pub async fn get_owner_bookings(
    State(state): State<GatewayState>,
    SharerUserId(user_id): SharerUserId,
    RequestId(request_id): RequestId,
    WithRejection(Query(params), _): QueryParams<BookingListParams>,
) -> GatewayResult<Response> {
    list_bookings(state, "/bookings/owner", user_id, &request_id, params).await
}

/// Create an item request
pub async fn create_request(
    State(state): State<GatewayState>,
    SharerUserId(user_id): SharerUserId,
    RequestId(request_id): RequestId,
    WithRejection(Json(payload), _): JsonBody<RequestPayload>,
) -> GatewayResult<Response> {
    payload.validate()?;
    let forward = Forward::new(Method::POST, "/requests", &request_id)
        .user(user_id)
        .body(&payload);
    state.client.send(forward).await
}

/// Get the caller's requests
pub async fn get_own_requests(
    State(state): State<GatewayState>,
    SharerUserId(user_id): SharerUserId,
    RequestId(request_id): RequestId,
) -> GatewayResult<Response> {
    let forward = Forward::new(Method::GET, "/requests", &request_id).user(user_id);
    state.client.send(forward).await
}

/// Get other users' requests
pub async fn get_other_requests(
    State(state): State<GatewayState>,
    SharerUserId(user_id): SharerUserId,
    RequestId(request_id): RequestId,
    WithRejection(Query(params), _): QueryParams<PageParams>,
) -> GatewayResult<Response> {
    validate_page(params.from, params.size)?;
    let forward = Forward::new(Method::GET, "/requests/all", &request_id)
        .user(user_id)
        .query(page_query(params.from, params.size));
    state.client.send(forward).await
}

/// Get a request
pub async fn get_request(
    State(state): State<GatewayState>,
    SharerUserId(user_id): SharerUserId,
    RequestId(request_id): RequestId,
    WithRejection(Path(id), _): PathId,
) -> GatewayResult<Response> {
    let forward =
        Forward::new(Method::GET, format!("/requests/{}", id), &request_id).user(user_id);
    state.client.send(forward).await
}
