//! Booking model: status machine, listing filters and booking views

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::{item::Item, user::User};

/// Lifecycle status of a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Waiting,
    Approved,
    Rejected,
    Canceled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Waiting => "WAITING",
            BookingStatus::Approved => "APPROVED",
            BookingStatus::Rejected => "REJECTED",
            BookingStatus::Canceled => "CANCELED",
        }
    }

    /// Whether the booking still reserves its window
    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        !matches!(self, BookingStatus::Rejected | BookingStatus::Canceled)
    }

    /// Outcome of the owner's decision on a waiting booking
    pub fn decided(approved: bool) -> Self {
        if approved {
            BookingStatus::Approved
        } else {
            BookingStatus::Rejected
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WAITING" => Ok(BookingStatus::Waiting),
            "APPROVED" => Ok(BookingStatus::Approved),
            "REJECTED" => Ok(BookingStatus::Rejected),
            "CANCELED" => Ok(BookingStatus::Canceled),
            other => Err(format!("Unknown booking status: {}", other)),
        }
    }
}

/// Listing filter requested by clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingState {
    All,
    Current,
    Past,
    Future,
    Waiting,
    Rejected,
}

impl FromStr for BookingState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ALL" => Ok(BookingState::All),
            "CURRENT" => Ok(BookingState::Current),
            "PAST" => Ok(BookingState::Past),
            "FUTURE" => Ok(BookingState::Future),
            "WAITING" => Ok(BookingState::Waiting),
            "REJECTED" => Ok(BookingState::Rejected),
            _ => Err(s.to_string()),
        }
    }
}

#[cfg(test)]
impl BookingState {
    /// Whether a booking belongs to this state at instant `now`
    pub fn matches(&self, booking: &Booking, now: NaiveDateTime) -> bool {
        match self {
            BookingState::All => true,
            BookingState::Current => booking.start <= now && now < booking.end,
            BookingState::Past => booking.end < now,
            BookingState::Future => booking.start > now,
            BookingState::Waiting => booking.status == BookingStatus::Waiting,
            BookingState::Rejected => booking.status == BookingStatus::Rejected,
        }
    }
}

/// Whose bookings a listing covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingScope {
    /// Bookings placed by this user
    Booker(i64),
    /// Bookings of these items
    Items(Vec<i64>),
}

/// Booking entity with its item and booker resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub id: i64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub item: Item,
    pub booker: User,
    pub status: BookingStatus,
}

#[cfg(test)]
impl Booking {
    /// Inclusive overlap test used for availability conflicts.
    ///
    /// A booking conflicts when its start or end falls inside `[start, end]`,
    /// or when it encloses the whole window. Status is not consulted.
    pub fn conflicts_with(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        let start_inside = self.start >= start && self.start <= end;
        let end_inside = self.end >= start && self.end <= end;
        let encloses = self.start <= start && self.end >= end;
        start_inside || end_inside || encloses
    }
}

/// New booking payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub item_id: i64,
}

/// Query parameters for booking listings
#[derive(Debug, Clone, Deserialize)]
pub struct BookingListQuery {
    pub state: Option<String>,
    pub from: Option<i64>,
    pub size: Option<i64>,
}

/// Query parameters for the approval endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ApprovalQuery {
    pub approved: bool,
}

/// Item summary embedded in booking responses
#[derive(Debug, Clone, Serialize)]
pub struct BookedItem {
    pub id: i64,
    pub name: String,
}

/// Response for booking operations
#[derive(Debug, Clone, Serialize)]
pub struct BookingResponse {
    pub id: i64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub status: BookingStatus,
    pub booker: User,
    pub item: BookedItem,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        BookingResponse {
            id: booking.id,
            start: booking.start,
            end: booking.end,
            status: booking.status,
            booker: booking.booker,
            item: BookedItem {
                id: booking.item.id,
                name: booking.item.name,
            },
        }
    }
}

/// Booking summary shown to item owners as last/next booking
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingShort {
    pub id: i64,
    pub booker_id: i64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub status: BookingStatus,
}

impl From<&Booking> for BookingShort {
    fn from(booking: &Booking) -> Self {
        BookingShort {
            id: booking.id,
            booker_id: booking.booker.id,
            start: booking.start,
            end: booking.end,
            status: booking.status,
        }
    }
}
