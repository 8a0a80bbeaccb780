//! Server routes

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{
    error::ServerResult,
    middleware::{SharerUserId, request_id_middleware},
    models::{
        PageQuery,
        booking::{ApprovalQuery, BookingListQuery, BookingResponse, NewBooking},
        comment::{CommentResponse, NewComment},
        item::{Item, ItemDetails, NewItem, SearchQuery, UpdateItem},
        request::{ItemRequestResponse, NewItemRequest},
        user::{NewUser, UpdateUser, User},
    },
    state::AppState,
};

/// Create the router for the server
pub fn create_router(state: AppState) -> Router {
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
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let healthy = match &state.db_pool {
        Some(pool) => common::database::health_check(pool).await.unwrap_or(false),
        None => true,
    };

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if healthy { "ok" } else { "unavailable" },
            "service": "shareit-server"
        })),
    )
}

/// Create a new user
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<NewUser>,
) -> ServerResult<Json<User>> {
    Ok(Json(state.services.users.create(payload).await?))
}

/// Get all users
pub async fn get_users(State(state): State<AppState>) -> ServerResult<Json<Vec<User>>> {
    Ok(Json(state.services.users.list().await?))
}

/// Get a user by id
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ServerResult<Json<User>> {
    Ok(Json(state.services.users.get(id).await?))
}

/// Update a user
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUser>,
) -> ServerResult<Json<User>> {
    Ok(Json(state.services.users.update(id, payload).await?))
}

/// Delete a user and everything they own
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ServerResult<StatusCode> {
    state.services.users.delete(id).await?;
    Ok(StatusCode::OK)
}

/// Create an item
pub async fn create_item(
    State(state): State<AppState>,
    SharerUserId(user_id): SharerUserId,
    Json(payload): Json<NewItem>,
) -> ServerResult<Json<Item>> {
    Ok(Json(state.services.items.create(user_id, payload).await?))
}

/// Update an item
pub async fn update_item(
    State(state): State<AppState>,
    SharerUserId(user_id): SharerUserId,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateItem>,
) -> ServerResult<Json<Item>> {
    Ok(Json(state.services.items.update(user_id, id, payload).await?))
}

/// Get an item, with booking context for its owner
pub async fn get_item(
    State(state): State<AppState>,
    SharerUserId(user_id): SharerUserId,
    Path(id): Path<i64>,
) -> ServerResult<Json<ItemDetails>> {
    Ok(Json(state.services.items.get(id, user_id).await?))
}

/// Get the caller's items
pub async fn get_owner_items(
    State(state): State<AppState>,
    SharerUserId(user_id): SharerUserId,
    Query(query): Query<PageQuery>,
) -> ServerResult<Json<Vec<ItemDetails>>> {
    let items = state
        .services
        .items
        .list_by_owner(user_id, query.from, query.size)
        .await?;
    Ok(Json(items))
}

/// Search available items
pub async fn search_items(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ServerResult<Json<Vec<Item>>> {
    let text = query.text.unwrap_or_default();
    let items = state
        .services
        .items
        .search(&text, query.from, query.size)
        .await?;
    Ok(Json(items))
}

/// Comment on an item
pub async fn add_comment(
    State(state): State<AppState>,
    SharerUserId(user_id): SharerUserId,
    Path(id): Path<i64>,
    Json(payload): Json<NewComment>,
) -> ServerResult<Json<CommentResponse>> {
    Ok(Json(
        state.services.items.add_comment(id, user_id, payload).await?,
    ))
}

/// Book an item
pub async fn add_booking(
    State(state): State<AppState>,
    SharerUserId(user_id): SharerUserId,
    Json(payload): Json<NewBooking>,
) -> ServerResult<Json<BookingResponse>> {
    let booking = state.services.bookings.add(user_id, payload).await?;
    Ok(Json(booking.into()))
}

/// Approve or reject a booking
pub async fn approve_booking(
    State(state): State<AppState>,
    SharerUserId(user_id): SharerUserId,
    Path(id): Path<i64>,
    Query(query): Query<ApprovalQuery>,
) -> ServerResult<Json<BookingResponse>> {
    let booking = state
        .services
        .bookings
        .approve(id, user_id, query.approved)
        .await?;
    Ok(Json(booking.into()))
}

/// Get a booking
pub async fn get_booking(
    State(state): State<AppState>,
    SharerUserId(user_id): SharerUserId,
    Path(id): Path<i64>,
) -> ServerResult<Json<BookingResponse>> {
    let booking = state.services.bookings.get(id, user_id).await?;
    Ok(Json(booking.into()))
}

/// Get the caller's bookings
pub async fn get_booker_bookings(
    State(state): State<AppState>,
    SharerUserId(user_id): SharerUserId,
    Query(query): Query<BookingListQuery>,
) -> ServerResult<Json<Vec<BookingResponse>>> {
    let bookings = state
        .services
        .bookings
        .list_for_booker(user_id, query.state.as_deref(), query.from, query.size)
        .await?;
    Ok(Json(bookings.into_iter().map(Into::into).collect()))
}

/// Get bookings of the caller's items
pub async fn get_owner_bookings(
    State(state): State<AppState>,
    SharerUserId(user_id): SharerUserId,
    Query(query): Query<BookingListQuery>,
) -> ServerResult<Json<Vec<BookingResponse>>> {
    let bookings = state
        .services
        .bookings
        .list_for_owner(user_id, query.state.as_deref(), query.from, query.size)
        .await?;
    Ok(Json(bookings.into_iter().map(Into::into).collect()))
}

/// Create an item request
pub async fn create_request(
    State(state): State<AppState>,
    SharerUserId(user_id): SharerUserId,
    Json(payload): Json<NewItemRequest>,
) -> ServerResult<Json<ItemRequestResponse>> {
    Ok(Json(state.services.requests.create(user_id, payload).await?))
}

/// Get the caller's requests
pub async fn get_own_requests(
    State(state): State<AppState>,
    SharerUserId(user_id): SharerUserId,
) -> ServerResult<Json<Vec<ItemRequestResponse>>> {
    Ok(Json(state.services.requests.list_own(user_id).await?))
}

/// Get other users' requests
pub async fn get_other_requests(
    State(state): State<AppState>,
    SharerUserId(user_id): SharerUserId,
    Query(query): Query<PageQuery>,
) -> ServerResult<Json<Vec<ItemRequestResponse>>> {
    let requests = state
        .services
        .requests
        .list_others(user_id, query.from, query.size)
        .await?;
    Ok(Json(requests))
}

/// Get a request
pub async fn get_request(
    State(state): State<AppState>,
    SharerUserId(user_id): SharerUserId,
    Path(id): Path<i64>,
) -> ServerResult<Json<ItemRequestResponse>> {
    Ok(Json(state.services.requests.get(id, user_id).await?))
}
