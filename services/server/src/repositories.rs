//! Repositories for database operations
//!
//! Each entity has an async repository trait and a PostgreSQL
//! implementation. Services only see the traits, collected in
//! [`Repositories`].

use sqlx::PgPool;
use std::sync::Arc;

pub mod booking;
pub mod comment;
pub mod item;
pub mod request;
pub mod user;

#[cfg(test)]
pub mod memory;

pub use booking::{BookingRepository, PgBookingRepository};
pub use comment::{CommentRepository, PgCommentRepository};
pub use item::{ItemRepository, PgItemRepository};
pub use request::{PgRequestRepository, RequestRepository};
pub use user::{PgUserRepository, UserRepository};

/// Set of repositories handed to the services
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub items: Arc<dyn ItemRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub requests: Arc<dyn RequestRepository>,
    pub comments: Arc<dyn CommentRepository>,
}

impl Repositories {
    /// Wire every repository to the same PostgreSQL pool
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            items: Arc::new(PgItemRepository::new(pool.clone())),
            bookings: Arc::new(PgBookingRepository::new(pool.clone())),
            requests: Arc::new(PgRequestRepository::new(pool.clone())),
            comments: Arc::new(PgCommentRepository::new(pool)),
        }
    }
}

/// Live PostgreSQL fixtures for the adapter tests
#[cfg(test)]
pub(crate) mod testing {
    use common::database::{DatabaseConfig, init_pool, run_migrations};
    use sqlx::PgPool;
    use uuid::Uuid;

    use super::{ItemRepository, PgItemRepository, PgUserRepository, UserRepository};
    use crate::models::{
        item::{Item, NewItem},
        user::User,
    };

    /// Pool on `DATABASE_URL` with the schema applied
    pub async fn pg_pool() -> PgPool {
        let config = DatabaseConfig::from_env().expect("Failed to create database config");
        let pool = init_pool(&config).await.expect("Failed to connect");
        run_migrations(&pool, &sqlx::migrate!("./migrations"))
            .await
            .expect("Failed to migrate");
        pool
    }

    /// Marker unique to one test run, for data shared across tests
    pub fn marker() -> String {
        Uuid::new_v4().simple().to_string()
    }

    pub async fn pg_user(pool: &PgPool, name: &str) -> User {
        let email = format!("{}-{}@example.com", name.to_lowercase(), marker());
        PgUserRepository::new(pool.clone())
            .create(name, &email)
            .await
            .unwrap()
    }

    pub async fn pg_item(pool: &PgPool, owner_id: i64, name: &str, available: bool) -> Item {
        PgItemRepository::new(pool.clone())
            .create(
                owner_id,
                &NewItem {
                    name: name.to_string(),
                    description: format!("{} for rent", name),
                    available,
                    request_id: None,
                },
            )
            .await
            .unwrap()
    }
}
