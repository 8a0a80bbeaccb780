//! Item request repository

use async_trait::async_trait;
use chrono::NaiveDateTime;
use common::error::DatabaseResult;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;

use crate::models::{Page, request::ItemRequest};

#[async_trait]
pub trait RequestRepository: Send + Sync {
    async fn create(
        &self,
        requestor_id: i64,
        description: &str,
        created: NaiveDateTime,
    ) -> DatabaseResult<ItemRequest>;
    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<ItemRequest>>;
    /// Requests authored by the user, newest first
    async fn find_by_requestor(&self, requestor_id: i64) -> DatabaseResult<Vec<ItemRequest>>;
    /// Requests authored by anyone else, newest first
    async fn find_by_other_requestors(
        &self,
        requestor_id: i64,
        page: Page,
    ) -> DatabaseResult<Vec<ItemRequest>>;
}

/// Item request repository backed by PostgreSQL
#[derive(Clone)]
pub struct PgRequestRepository {
    pool: PgPool,
}

impl PgRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn request_from_row(row: &PgRow) -> ItemRequest {
    ItemRequest {
        id: row.get("id"),
        description: row.get("description"),
        requestor_id: row.get("requestor_id"),
        created: row.get("created"),
    }
}

#[async_trait]
impl RequestRepository for PgRequestRepository {
    async fn create(
        &self,
        requestor_id: i64,
        description: &str,
        created: NaiveDateTime,
    ) -> DatabaseResult<ItemRequest> {
        info!("Creating item request for user {}", requestor_id);

        let row = sqlx::query(
            r#"
            INSERT INTO requests (description, requestor_id, created)
            VALUES ($1, $2, $3)
            RETURNING id, description, requestor_id, created
            "#,
        )
        .bind(description)
        .bind(requestor_id)
        .bind(created)
        .fetch_one(&self.pool)
        .await?;

        Ok(request_from_row(&row))
    }

    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<ItemRequest>> {
        let row = sqlx::query(
            r#"
            SELECT id, description, requestor_id, created
            FROM requests
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(request_from_row))
    }

    async fn find_by_requestor(&self, requestor_id: i64) -> DatabaseResult<Vec<ItemRequest>> {
        let rows = sqlx::query(
            r#"
            SELECT id, description, requestor_id, created
            FROM requests
            WHERE requestor_id = $1
            ORDER BY created DESC, id DESC
            "#,
        )
        .bind(requestor_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(request_from_row).collect())
    }

    async fn find_by_other_requestors(
        &self,
        requestor_id: i64,
        page: Page,
    ) -> DatabaseResult<Vec<ItemRequest>> {
        let rows = sqlx::query(
            r#"
            SELECT id, description, requestor_id, created
            FROM requests
            WHERE requestor_id <> $1
            ORDER BY created DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(requestor_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(request_from_row).collect())
    }
}
