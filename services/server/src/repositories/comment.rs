//! Comment repository

use async_trait::async_trait;
use chrono::NaiveDateTime;
use common::error::DatabaseResult;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;

use crate::models::comment::Comment;

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(
        &self,
        item_id: i64,
        author_id: i64,
        text: &str,
        created: NaiveDateTime,
    ) -> DatabaseResult<Comment>;
    /// Comments on any of the items, oldest first
    async fn find_by_item_ids(&self, item_ids: &[i64]) -> DatabaseResult<Vec<Comment>>;
}

/// Comment repository backed by PostgreSQL
#[derive(Clone)]
pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn comment_from_row(row: &PgRow) -> Comment {
    Comment {
        id: row.get("id"),
        text: row.get("text"),
        item_id: row.get("item_id"),
        author_id: row.get("author_id"),
        author_name: row.get("author_name"),
        created: row.get("created"),
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn create(
        &self,
        item_id: i64,
        author_id: i64,
        text: &str,
        created: NaiveDateTime,
    ) -> DatabaseResult<Comment> {
        info!("User {} commenting on item {}", author_id, item_id);

        let row = sqlx::query(
            r#"
            WITH inserted AS (
                INSERT INTO comments (text, item_id, author_id, created)
                VALUES ($1, $2, $3, $4)
                RETURNING id, text, item_id, author_id, created
            )
            SELECT c.id, c.text, c.item_id, c.author_id, u.name AS author_name, c.created
            FROM inserted c
            JOIN users u ON u.id = c.author_id
            "#,
        )
        .bind(text)
        .bind(item_id)
        .bind(author_id)
        .bind(created)
        .fetch_one(&self.pool)
        .await?;

        Ok(comment_from_row(&row))
    }

    async fn find_by_item_ids(&self, item_ids: &[i64]) -> DatabaseResult<Vec<Comment>> {
        let rows = sqlx::query(
            r#"
            SELECT c.id, c.text, c.item_id, c.author_id, u.name AS author_name, c.created
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.item_id = ANY($1)
            ORDER BY c.id
            "#,
        )
        .bind(item_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(comment_from_row).collect())
    }
}
