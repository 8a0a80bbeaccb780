//! Business rules, one service per aggregate
//!
//! Services receive the acting user explicitly and talk to storage only
//! through the repository traits, so they run unchanged against
//! PostgreSQL or the in-memory store used in tests.

use std::sync::Arc;

use crate::{
    clock::Clock,
    error::{ServerError, ServerResult},
    models::{DEFAULT_PAGE_SIZE, Page, user::User},
    repositories::{Repositories, UserRepository},
};

pub mod booking;
pub mod item;
pub mod request;
pub mod user;

pub use booking::BookingService;
pub use item::ItemService;
pub use request::RequestService;
pub use user::UserService;

/// All services, wired to one repository set and one clock
#[derive(Clone)]
pub struct Services {
    pub users: UserService,
    pub items: ItemService,
    pub bookings: BookingService,
    pub requests: RequestService,
}

impl Services {
    pub fn new(repositories: Repositories, clock: Arc<dyn Clock>) -> Self {
        Self {
            users: UserService::new(repositories.clone()),
            items: ItemService::new(repositories.clone(), clock.clone()),
            bookings: BookingService::new(repositories.clone(), clock.clone()),
            requests: RequestService::new(repositories, clock),
        }
    }
}

/// Resolve listing parameters, applying defaults for absent values
pub fn resolve_page(from: Option<i64>, size: Option<i64>) -> ServerResult<Page> {
    let from = from.unwrap_or(0);
    let size = size.unwrap_or(DEFAULT_PAGE_SIZE);

    if size < 1 {
        return Err(ServerError::InvalidPageSize);
    }
    if from < 0 {
        return Err(ServerError::InvalidInput(
            "Parameter 'from' must not be negative".to_string(),
        ));
    }
    Ok(Page::new(from, size))
}

/// Load a user or fail with `UserNotFound`
pub(crate) async fn require_user(users: &dyn UserRepository, id: i64) -> ServerResult<User> {
    users
        .find_by_id(id)
        .await?
        .ok_or(ServerError::UserNotFound(id))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_page_defaults() {
        assert_eq!(
            resolve_page(None, None).unwrap(),
            Page {
                offset: 0,
                limit: DEFAULT_PAGE_SIZE
            }
        );
    }

    #[test]
    fn test_resolve_page_rejects_bad_window() {
        assert!(matches!(
            resolve_page(Some(0), Some(0)),
            Err(ServerError::InvalidPageSize)
        ));
        assert!(matches!(
            resolve_page(Some(-1), Some(10)),
            Err(ServerError::InvalidInput(_))
        ));
    }
}
