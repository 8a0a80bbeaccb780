//! User management

use common::error::DatabaseError;
use tracing::info;

use crate::{
    error::{ServerError, ServerResult},
    models::user::{NewUser, UpdateUser, User},
    repositories::Repositories,
    services::require_user,
};

#[derive(Clone)]
pub struct UserService {
    repositories: Repositories,
}

fn duplicate_email(email: &str) -> impl FnOnce(DatabaseError) -> ServerError + '_ {
    move |err| match err {
        DatabaseError::UniqueViolation(_) => ServerError::DuplicateEmail(email.to_string()),
        other => other.into(),
    }
}

impl UserService {
    pub fn new(repositories: Repositories) -> Self {
        Self { repositories }
    }

    pub async fn create(&self, new_user: NewUser) -> ServerResult<User> {
        let user = self
            .repositories
            .users
            .create(&new_user.display_name(), &new_user.email)
            .await
            .map_err(duplicate_email(&new_user.email))?;

        info!("Created user {}", user.id);
        Ok(user)
    }

    pub async fn update(&self, user_id: i64, patch: UpdateUser) -> ServerResult<User> {
        let current = require_user(self.repositories.users.as_ref(), user_id).await?;
        let updated = patch.apply(current);

        let user = self
            .repositories
            .users
            .update(&updated)
            .await
            .map_err(duplicate_email(&updated.email))?;

        info!("Updated user {}", user.id);
        Ok(user)
    }

    pub async fn get(&self, user_id: i64) -> ServerResult<User> {
        require_user(self.repositories.users.as_ref(), user_id).await
    }

    pub async fn list(&self) -> ServerResult<Vec<User>> {
        Ok(self.repositories.users.find_all().await?)
    }

    pub async fn delete(&self, user_id: i64) -> ServerResult<()> {
        if !self.repositories.users.delete(user_id).await? {
            return Err(ServerError::UserNotFound(user_id));
        }
        info!("Deleted user {}", user_id);
        Ok(())
    }
}
