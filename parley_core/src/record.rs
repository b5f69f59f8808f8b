//! Normalized user record and the persistence seam it is handed to.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A validated, type-coerced extraction result.
///
/// `None` marks a field the model did not supply or that failed validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRecord {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub age: Option<i64>,
}

impl UserRecord {
    /// True when no field carries a value.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.location.is_none()
            && self.age.is_none()
    }
}

/// Durable storage for extracted records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist one record, returning its storage identifier.
    async fn save(&self, record: &UserRecord) -> anyhow::Result<i64>;
}
