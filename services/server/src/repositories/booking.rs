//! Booking repository

use async_trait::async_trait;
use chrono::NaiveDateTime;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};
use tracing::{info, warn};

use crate::models::{
    Page,
    booking::{Booking, BookingScope, BookingState, BookingStatus, NewBooking},
    item::Item,
    user::User,
};

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Insert a WAITING booking unless any booking of the same item
    /// overlaps the window; an overlap yields `DatabaseError::Conflict`.
    async fn create(&self, booker_id: i64, booking: &NewBooking) -> DatabaseResult<Booking>;
    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<Booking>>;
    /// Move a booking from `from` to `to`; false when it is no longer in `from`
    async fn transition_status(
        &self,
        id: i64,
        from: BookingStatus,
        to: BookingStatus,
    ) -> DatabaseResult<bool>;
    /// Bookings of an item overlapping `[start, end]`, whatever their status
    async fn find_conflicting(
        &self,
        item_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> DatabaseResult<Vec<Booking>>;
    /// Bookings in scope matching `state`, newest start first
    async fn find_by_scope(
        &self,
        scope: &BookingScope,
        state: BookingState,
        now: NaiveDateTime,
        page: Page,
    ) -> DatabaseResult<Vec<Booking>>;
    /// Latest active booking started before `now`, per item
    async fn find_last_for_items(
        &self,
        item_ids: &[i64],
        now: NaiveDateTime,
    ) -> DatabaseResult<Vec<Booking>>;
    /// Earliest active booking starting at or after `now`, per item
    async fn find_next_for_items(
        &self,
        item_ids: &[i64],
        now: NaiveDateTime,
    ) -> DatabaseResult<Vec<Booking>>;
    /// Whether the user has a booking of the item that ended before `now`
    async fn has_completed(
        &self,
        item_id: i64,
        booker_id: i64,
        now: NaiveDateTime,
    ) -> DatabaseResult<bool>;
}

/// Booking repository backed by PostgreSQL
#[derive(Clone)]
pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    /// Create a new booking repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const BOOKING_SELECT: &str = r#"
    SELECT b.id, b.start_date, b.end_date, b.status,
           i.id AS item_id, i.name AS item_name, i.description AS item_description,
           i.available AS item_available, i.owner_id AS item_owner_id,
           i.request_id AS item_request_id,
           u.id AS booker_id, u.name AS booker_name, u.email AS booker_email
    FROM bookings b
    JOIN items i ON i.id = b.item_id
    JOIN users u ON u.id = b.booker_id
"#;

// Inclusive on both ends, matching Booking::conflicts_with. Any status
// holds the window, a rejected booking included.
const OVERLAP_PREDICATE: &str = r#"
    b.item_id = $1
    AND ((b.start_date BETWEEN $2 AND $3)
      OR (b.end_date BETWEEN $2 AND $3)
      OR (b.start_date <= $2 AND b.end_date >= $3))
"#;

fn booking_from_row(row: &PgRow) -> Result<Booking, sqlx::Error> {
    let status: String = row.try_get("status")?;
    let status = status
        .parse::<BookingStatus>()
        .map_err(|e| sqlx::Error::Decode(e.into()))?;

    Ok(Booking {
        id: row.try_get("id")?,
        start: row.try_get("start_date")?,
        end: row.try_get("end_date")?,
        status,
        item: Item {
            id: row.try_get("item_id")?,
            name: row.try_get("item_name")?,
            description: row.try_get("item_description")?,
            available: row.try_get("item_available")?,
            owner_id: row.try_get("item_owner_id")?,
            request_id: row.try_get("item_request_id")?,
        },
        booker: User {
            id: row.try_get("booker_id")?,
            name: row.try_get("booker_name")?,
            email: row.try_get("booker_email")?,
        },
    })
}

fn bookings_from_rows(rows: &[PgRow]) -> DatabaseResult<Vec<Booking>> {
    rows.iter()
        .map(|row| booking_from_row(row).map_err(DatabaseError::Query))
        .collect()
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn create(&self, booker_id: i64, booking: &NewBooking) -> DatabaseResult<Booking> {
        info!(
            "Creating booking of item {} for user {}",
            booking.item_id, booker_id
        );

        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await?;

        let overlapping: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM bookings b WHERE {}",
            OVERLAP_PREDICATE
        ))
        .bind(booking.item_id)
        .bind(booking.start)
        .bind(booking.end)
        .fetch_one(&mut *tx)
        .await?;

        if overlapping > 0 {
            warn!(
                "Item {} already has {} overlapping booking(s)",
                booking.item_id, overlapping
            );
            return Err(DatabaseError::Conflict(format!(
                "item {} is reserved between {} and {}",
                booking.item_id, booking.start, booking.end
            )));
        }

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO bookings (start_date, end_date, item_id, booker_id, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(booking.start)
        .bind(booking.end)
        .bind(booking.item_id)
        .bind(booker_id)
        .bind(BookingStatus::Waiting.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        self.find_by_id(id)
            .await?
            .ok_or(DatabaseError::Query(sqlx::Error::RowNotFound))
    }

    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<Booking>> {
        let row = sqlx::query(&format!("{} WHERE b.id = $1", BOOKING_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref()
            .map(booking_from_row)
            .transpose()
            .map_err(DatabaseError::Query)
    }

    async fn transition_status(
        &self,
        id: i64,
        from: BookingStatus,
        to: BookingStatus,
    ) -> DatabaseResult<bool> {
        let result = sqlx::query("UPDATE bookings SET status = $3 WHERE id = $1 AND status = $2")
            .bind(id)
            .bind(from.as_str())
            .bind(to.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_conflicting(
        &self,
        item_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> DatabaseResult<Vec<Booking>> {
        let rows = sqlx::query(&format!(
            "{} WHERE {} ORDER BY b.start_date",
            BOOKING_SELECT, OVERLAP_PREDICATE
        ))
        .bind(item_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        bookings_from_rows(&rows)
    }

    async fn find_by_scope(
        &self,
        scope: &BookingScope,
        state: BookingState,
        now: NaiveDateTime,
        page: Page,
    ) -> DatabaseResult<Vec<Booking>> {
        let mut query = QueryBuilder::<Postgres>::new(BOOKING_SELECT);

        match scope {
            BookingScope::Booker(booker_id) => {
                query.push(" WHERE b.booker_id = ").push_bind(*booker_id);
            }
            BookingScope::Items(item_ids) => {
                query
                    .push(" WHERE b.item_id = ANY(")
                    .push_bind(item_ids.clone())
                    .push(")");
            }
        }

        match state {
            BookingState::All => {}
            BookingState::Current => {
                query
                    .push(" AND b.start_date <= ")
                    .push_bind(now)
                    .push(" AND b.end_date > ")
                    .push_bind(now);
            }
            BookingState::Past => {
                query.push(" AND b.end_date < ").push_bind(now);
            }
            BookingState::Future => {
                query.push(" AND b.start_date > ").push_bind(now);
            }
            BookingState::Waiting => {
                query
                    .push(" AND b.status = ")
                    .push_bind(BookingStatus::Waiting.as_str());
            }
            BookingState::Rejected => {
                query
                    .push(" AND b.status = ")
                    .push_bind(BookingStatus::Rejected.as_str());
            }
        }

        query
            .push(" ORDER BY b.start_date DESC, b.id DESC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset);

        let rows = query.build().fetch_all(&self.pool).await?;
        bookings_from_rows(&rows)
    }

    async fn find_last_for_items(
        &self,
        item_ids: &[i64],
        now: NaiveDateTime,
    ) -> DatabaseResult<Vec<Booking>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT DISTINCT ON (recent.item_id) recent.* FROM ({}
                WHERE b.item_id = ANY($1)
                  AND b.start_date < $2
                  AND b.status NOT IN ('REJECTED', 'CANCELED')
            ) recent
            ORDER BY recent.item_id, recent.start_date DESC, recent.id DESC
            "#,
            BOOKING_SELECT
        ))
        .bind(item_ids)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        bookings_from_rows(&rows)
    }

    async fn find_next_for_items(
        &self,
        item_ids: &[i64],
        now: NaiveDateTime,
    ) -> DatabaseResult<Vec<Booking>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT DISTINCT ON (upcoming.item_id) upcoming.* FROM ({}
                WHERE b.item_id = ANY($1)
                  AND b.start_date >= $2
                  AND b.status NOT IN ('REJECTED', 'CANCELED')
            ) upcoming
            ORDER BY upcoming.item_id, upcoming.start_date ASC, upcoming.id ASC
            "#,
            BOOKING_SELECT
        ))
        .bind(item_ids)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        bookings_from_rows(&rows)
    }

    async fn has_completed(
        &self,
        item_id: i64,
        booker_id: i64,
        now: NaiveDateTime,
    ) -> DatabaseResult<bool> {
        let completed: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM bookings
                WHERE item_id = $1 AND booker_id = $2 AND end_date < $3
            )
            "#,
        )
        .bind(item_id)
        .bind(booker_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(completed)
    }
}
