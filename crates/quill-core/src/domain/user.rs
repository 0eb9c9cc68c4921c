use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// User entity - represents a registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Opaque identifier, a random UUID rendered as a string.
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

impl User {
    /// Create a new user with a freshly generated ID.
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            password_hash,
        }
    }

    /// Minimal shape check for an email address: `local@domain` with both parts present.
    pub fn validate_email(email: &str) -> Result<(), DomainError> {
        match email.split_once('@') {
            Some((local, domain))
                if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
            {
                Ok(())
            }
            _ => Err(DomainError::Validation(format!(
                "'{email}' is not a valid email address"
            ))),
        }
    }
}

/// Partial profile update. Absent or empty fields leave the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UserUpdate {
    /// Merge the update into `user`, returning whether anything changed.
    pub fn apply(self, user: &mut User) -> bool {
        let mut changed = false;

        if let Some(name) = self.name.filter(|n| !n.is_empty()) {
            user.name = name;
            changed = true;
        }
        if let Some(email) = self.email.filter(|e| !e.is_empty()) {
            user.email = email;
            changed = true;
        }

        changed
    }
}
