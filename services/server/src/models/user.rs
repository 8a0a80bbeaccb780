//! User model and related payloads

use serde::{Deserialize, Serialize};

/// User entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// New user creation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub name: Option<String>,
    pub email: String,
}

impl NewUser {
    /// Name to store: falls back to the email when none was given
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.email.clone())
    }
}

/// User update payload
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UpdateUser {
    /// Merge the patch into `user`; only fields carried by the patch change.
    pub fn apply(self, user: User) -> User {
        User {
            id: user.id,
            name: self.name.unwrap_or(user.name),
            email: self.email.unwrap_or(user.email),
        }
    }
}
