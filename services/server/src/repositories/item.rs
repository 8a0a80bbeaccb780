//! Item repository

use async_trait::async_trait;
use common::error::DatabaseResult;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;

use crate::models::{
    Page,
    item::{Item, NewItem},
};

#[async_trait]
pub trait ItemRepository: Send + Sync {
    async fn create(&self, owner_id: i64, item: &NewItem) -> DatabaseResult<Item>;
    /// Persist name, description and availability of `item`
    async fn update(&self, item: &Item) -> DatabaseResult<Item>;
    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<Item>>;
    /// Owner's items ordered by id
    async fn find_by_owner(&self, owner_id: i64, page: Page) -> DatabaseResult<Vec<Item>>;
    async fn find_ids_by_owner(&self, owner_id: i64) -> DatabaseResult<Vec<i64>>;
    /// Available items whose name or description contains `text`, ignoring case
    async fn search_available(&self, text: &str, page: Page) -> DatabaseResult<Vec<Item>>;
    /// Items answering any of the given requests, ordered by id
    async fn find_by_request_ids(&self, request_ids: &[i64]) -> DatabaseResult<Vec<Item>>;
}

/// Item repository backed by PostgreSQL
#[derive(Clone)]
pub struct PgItemRepository {
    pool: PgPool,
}

impl PgItemRepository {
    /// Create a new item repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn item_from_row(row: &PgRow) -> Item {
    Item {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        available: row.get("available"),
        owner_id: row.get("owner_id"),
        request_id: row.get("request_id"),
    }
}

/// Build an ILIKE pattern matching `text` literally anywhere in the column
fn contains_pattern(text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl ItemRepository for PgItemRepository {
    async fn create(&self, owner_id: i64, item: &NewItem) -> DatabaseResult<Item> {
        info!("Creating item '{}' for owner {}", item.name, owner_id);

        let row = sqlx::query(
            r#"
            INSERT INTO items (name, description, available, owner_id, request_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, description, available, owner_id, request_id
            "#,
        )
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.available)
        .bind(owner_id)
        .bind(item.request_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(item_from_row(&row))
    }

    async fn update(&self, item: &Item) -> DatabaseResult<Item> {
        let row = sqlx::query(
            r#"
            UPDATE items
            SET name = $2, description = $3, available = $4
            WHERE id = $1
            RETURNING id, name, description, available, owner_id, request_id
            "#,
        )
        .bind(item.id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.available)
        .fetch_one(&self.pool)
        .await?;

        Ok(item_from_row(&row))
    }

    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<Item>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, description, available, owner_id, request_id
            FROM items
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(item_from_row))
    }

    async fn find_by_owner(&self, owner_id: i64, page: Page) -> DatabaseResult<Vec<Item>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, available, owner_id, request_id
            FROM items
            WHERE owner_id = $1
            ORDER BY id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(owner_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(item_from_row).collect())
    }

    async fn find_ids_by_owner(&self, owner_id: i64) -> DatabaseResult<Vec<i64>> {
        let ids = sqlx::query_scalar("SELECT id FROM items WHERE owner_id = $1 ORDER BY id")
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(ids)
    }

    async fn search_available(&self, text: &str, page: Page) -> DatabaseResult<Vec<Item>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, available, owner_id, request_id
            FROM items
            WHERE available = TRUE
              AND (name ILIKE $1 OR description ILIKE $1)
            ORDER BY id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(contains_pattern(text))
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(item_from_row).collect())
    }

    async fn find_by_request_ids(&self, request_ids: &[i64]) -> DatabaseResult<Vec<Item>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, available, owner_id, request_id
            FROM items
            WHERE request_id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(request_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(item_from_row).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::testing::{marker, pg_item, pg_pool, pg_user};

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("drill"), "%drill%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL"]
    async fn test_search_matches_wildcards_literally() {
        let pool = pg_pool().await;
        let repo = PgItemRepository::new(pool.clone());
        let owner = pg_user(&pool, "Owner").await;
        let tag = marker();

        let percent = pg_item(&pool, owner.id, &format!("{} 100% wool", tag), true).await;
        pg_item(&pool, owner.id, &format!("{} 1000 wool", tag), true).await;
        pg_item(&pool, owner.id, &format!("{} 100% cotton", tag), false).await;

        let found = repo
            .search_available(&format!("{} 100%", tag.to_uppercase()), Page::new(0, 20))
            .await
            .unwrap();
        assert_eq!(found.iter().map(|i| i.id).collect::<Vec<_>>(), vec![percent.id]);

        let found = repo
            .search_available(&format!("{} 1_0", tag), Page::new(0, 20))
            .await
            .unwrap();
        assert!(found.is_empty());
    }
}
