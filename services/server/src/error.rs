//! Custom error types for the ShareIt server

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::models::booking::BookingStatus;

/// Coarse category of a domain failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Authorization,
    Conflict,
    InvalidInput,
    InvalidStateTransition,
    Internal,
}

/// Custom error type for the server
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("User {0} not found")]
    UserNotFound(i64),

    #[error("Item {0} not found")]
    ItemNotFound(i64),

    #[error("User {0} has no items")]
    OwnerHasNoItems(i64),

    #[error("Booking {0} not found")]
    BookingNotFound(i64),

    #[error("No bookings found")]
    NoBookingsFound,

    #[error("Request {0} not found")]
    RequestNotFound(i64),

    #[error("Item {0} is not available for booking")]
    ItemNotAvailable(i64),

    #[error("Booking end must be after its start")]
    InvalidTimeRange,

    #[error("Owner cannot book their own item {0}")]
    BookerIsOwner(i64),

    #[error("Item {0} is already reserved for this period")]
    AlreadyReserved(i64),

    #[error("User {user_id} does not own the item of booking {booking_id}")]
    NotItemOwner { booking_id: i64, user_id: i64 },

    #[error("User {user_id} is neither the booker nor the item owner of booking {booking_id}")]
    NotAuthorized { booking_id: i64, user_id: i64 },

    #[error("User {user_id} does not own item {item_id}")]
    NotOwnerOfItem { item_id: i64, user_id: i64 },

    #[error("Booking {booking_id} status has already been changed to {status}")]
    BadStatusForApprove {
        booking_id: i64,
        status: BookingStatus,
    },

    #[error("Page size must be at least 1")]
    InvalidPageSize,

    #[error("Unknown state: {0}")]
    UnknownState(String),

    #[error("User {user_id} has not completed a booking of item {item_id}")]
    NotRenter { item_id: i64, user_id: i64 },

    #[error("Email {0} is already registered")]
    DuplicateEmail(String),

    #[error("Missing or invalid X-Sharer-User-Id header")]
    MissingUserHeader,

    #[error("{0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(#[from] common::error::DatabaseError),
}

impl ServerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServerError::UserNotFound(_)
            | ServerError::ItemNotFound(_)
            | ServerError::OwnerHasNoItems(_)
            | ServerError::BookingNotFound(_)
            | ServerError::NoBookingsFound
            | ServerError::RequestNotFound(_) => ErrorKind::NotFound,
            ServerError::BookerIsOwner(_)
            | ServerError::NotItemOwner { .. }
            | ServerError::NotAuthorized { .. }
            | ServerError::NotOwnerOfItem { .. } => ErrorKind::Authorization,
            ServerError::AlreadyReserved(_) | ServerError::DuplicateEmail(_) => {
                ErrorKind::Conflict
            }
            ServerError::BadStatusForApprove { .. } => ErrorKind::InvalidStateTransition,
            ServerError::ItemNotAvailable(_)
            | ServerError::InvalidTimeRange
            | ServerError::InvalidPageSize
            | ServerError::UnknownState(_)
            | ServerError::NotRenter { .. }
            | ServerError::MissingUserHeader
            | ServerError::InvalidInput(_) => ErrorKind::InvalidInput,
            ServerError::Database(_) => ErrorKind::Internal,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            // Self-booking is reported as a rejected request, not a hidden resource.
            ServerError::BookerIsOwner(_) => StatusCode::BAD_REQUEST,
            ServerError::DuplicateEmail(_) => StatusCode::CONFLICT,
            _ => match self.kind() {
                ErrorKind::NotFound | ErrorKind::Authorization => StatusCode::NOT_FOUND,
                ErrorKind::Conflict
                | ErrorKind::InvalidInput
                | ErrorKind::InvalidStateTransition => StatusCode::BAD_REQUEST,
                ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_message = match &self {
            ServerError::Database(_) => "Database error".to_string(),
            other => other.to_string(),
        };

        match self.kind() {
            ErrorKind::NotFound | ErrorKind::Authorization => warn!("{}", self),
            ErrorKind::Internal => error!("{}", self),
            _ => info!("Rejected request: {}", self),
        }

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for server results
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use common::error::DatabaseError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ServerError::UserNotFound(1).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServerError::NotAuthorized {
                booking_id: 1,
                user_id: 2
            }
            .status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServerError::AlreadyReserved(1).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServerError::BadStatusForApprove {
                booking_id: 1,
                status: BookingStatus::Approved
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServerError::BookerIsOwner(1).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServerError::DuplicateEmail("a@x.com".to_string()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServerError::Database(DatabaseError::Migration("boom".to_string())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_bad_status_message_reports_current_status() {
        let err = ServerError::BadStatusForApprove {
            booking_id: 5,
            status: BookingStatus::Rejected,
        };
        assert_eq!(
            err.to_string(),
            "Booking 5 status has already been changed to REJECTED"
        );
    }

    #[test]
    fn test_empty_listings_are_not_found() {
        let no_items = ServerError::OwnerHasNoItems(4);
        assert_eq!(no_items.kind(), ErrorKind::NotFound);
        assert_eq!(no_items.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(no_items.to_string(), "User 4 has no items");

        let no_bookings = ServerError::NoBookingsFound;
        assert_eq!(no_bookings.kind(), ErrorKind::NotFound);
        assert_eq!(no_bookings.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(no_bookings.to_string(), "No bookings found");
    }

    #[test]
    fn test_booker_is_owner_is_authorization_kind() {
        assert_eq!(
            ServerError::BookerIsOwner(3).kind(),
            ErrorKind::Authorization
        );
    }
}
