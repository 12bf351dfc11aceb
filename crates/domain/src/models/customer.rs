//! Customer account models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use folio_core::{CustomerId, Email, Phone, Sub};

/// A registered customer.
///
/// The identity provider owns authentication; `sub` is the stable subject
/// claim linking its account to this record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// Unique customer ID.
    pub id: CustomerId,
    /// Subject claim from the identity provider.
    pub sub: Sub,
    /// Login name mirrored from the identity provider.
    pub username: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact email.
    pub email: Email,
    /// Contact phone, if provided.
    pub phone: Option<Phone>,
    /// When the customer first signed in.
    pub created_on: DateTime<Utc>,
    /// When the profile was last synced.
    pub updated_on: DateTime<Utc>,
}

impl Customer {
    /// Given and family name joined for display.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Profile fields synced from the identity provider on sign-in.
///
/// The subject claim travels separately; it keys the upsert and is never
/// rewritten once a customer row exists.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerProfile {
    /// Login name.
    pub username: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact email.
    pub email: Email,
    /// Contact phone, if provided.
    pub phone: Option<Phone>,
}
