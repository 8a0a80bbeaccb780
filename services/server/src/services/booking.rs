//! Booking lifecycle: reservation, owner decision, listings

use common::error::DatabaseError;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    clock::Clock,
    error::{ServerError, ServerResult},
    models::{
        Page,
        booking::{Booking, BookingScope, BookingState, BookingStatus, NewBooking},
    },
    repositories::Repositories,
    services::{require_user, resolve_page},
};

#[derive(Clone)]
pub struct BookingService {
    repositories: Repositories,
    clock: Arc<dyn Clock>,
}

fn parse_state(state: Option<&str>) -> ServerResult<BookingState> {
    match state {
        None => Ok(BookingState::All),
        Some(text) => text.parse().map_err(ServerError::UnknownState),
    }
}

impl BookingService {
    pub fn new(repositories: Repositories, clock: Arc<dyn Clock>) -> Self {
        Self {
            repositories,
            clock,
        }
    }

    async fn require_booking(&self, booking_id: i64) -> ServerResult<Booking> {
        self.repositories
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or(ServerError::BookingNotFound(booking_id))
    }

    /// Reserve an item; the booking starts out WAITING for the owner
    pub async fn add(&self, booker_id: i64, proposed: NewBooking) -> ServerResult<Booking> {
        require_user(self.repositories.users.as_ref(), booker_id).await?;
        let item = self
            .repositories
            .items
            .find_by_id(proposed.item_id)
            .await?
            .ok_or(ServerError::ItemNotFound(proposed.item_id))?;

        if !item.available {
            return Err(ServerError::ItemNotAvailable(item.id));
        }
        if proposed.end <= proposed.start {
            return Err(ServerError::InvalidTimeRange);
        }
        if item.owner_id == booker_id {
            return Err(ServerError::BookerIsOwner(item.id));
        }

        let conflicting = self
            .repositories
            .bookings
            .find_conflicting(item.id, proposed.start, proposed.end)
            .await?;
        if !conflicting.is_empty() {
            return Err(ServerError::AlreadyReserved(item.id));
        }

        // The store re-checks overlaps atomically with the insert.
        let booking = self
            .repositories
            .bookings
            .create(booker_id, &proposed)
            .await
            .map_err(|err| match err {
                DatabaseError::Conflict(reason) => {
                    warn!("Lost booking race on item {}: {}", item.id, reason);
                    ServerError::AlreadyReserved(item.id)
                }
                other => other.into(),
            })?;

        info!(
            "User {} booked item {} as booking {}",
            booker_id, item.id, booking.id
        );
        Ok(booking)
    }

    /// Owner approves or rejects a WAITING booking
    pub async fn approve(
        &self,
        booking_id: i64,
        owner_id: i64,
        approved: bool,
    ) -> ServerResult<Booking> {
        let booking = self.require_booking(booking_id).await?;

        if booking.item.owner_id != owner_id {
            return Err(ServerError::NotItemOwner {
                booking_id,
                user_id: owner_id,
            });
        }
        if booking.status != BookingStatus::Waiting {
            return Err(ServerError::BadStatusForApprove {
                booking_id,
                status: booking.status,
            });
        }

        let decided = BookingStatus::decided(approved);
        let changed = self
            .repositories
            .bookings
            .transition_status(booking_id, BookingStatus::Waiting, decided)
            .await?;

        let booking = self.require_booking(booking_id).await?;
        if !changed {
            return Err(ServerError::BadStatusForApprove {
                booking_id,
                status: booking.status,
            });
        }

        info!("Booking {} is now {}", booking_id, decided);
        Ok(booking)
    }

    /// Visible to the booker and to the item owner
    pub async fn get(&self, booking_id: i64, requester_id: i64) -> ServerResult<Booking> {
        let booking = self.require_booking(booking_id).await?;

        if booking.booker.id != requester_id && booking.item.owner_id != requester_id {
            return Err(ServerError::NotAuthorized {
                booking_id,
                user_id: requester_id,
            });
        }
        Ok(booking)
    }

    pub async fn list_for_booker(
        &self,
        booker_id: i64,
        state: Option<&str>,
        from: Option<i64>,
        size: Option<i64>,
    ) -> ServerResult<Vec<Booking>> {
        let state = parse_state(state)?;
        let page = resolve_page(from, size)?;
        require_user(self.repositories.users.as_ref(), booker_id).await?;

        self.list(BookingScope::Booker(booker_id), state, page).await
    }

    pub async fn list_for_owner(
        &self,
        owner_id: i64,
        state: Option<&str>,
        from: Option<i64>,
        size: Option<i64>,
    ) -> ServerResult<Vec<Booking>> {
        let state = parse_state(state)?;
        let page = resolve_page(from, size)?;
        require_user(self.repositories.users.as_ref(), owner_id).await?;

        let item_ids = self.repositories.items.find_ids_by_owner(owner_id).await?;
        if item_ids.is_empty() {
            return Err(ServerError::OwnerHasNoItems(owner_id));
        }
        self.list(BookingScope::Items(item_ids), state, page).await
    }

    async fn list(
        &self,
        scope: BookingScope,
        state: BookingState,
        page: Page,
    ) -> ServerResult<Vec<Booking>> {
        let bookings = self
            .repositories
            .bookings
            .find_by_scope(&scope, state, self.clock.now(), page)
            .await?;

        if bookings.is_empty() {
            return Err(ServerError::NoBookingsFound);
        }
        Ok(bookings)
    }
}
