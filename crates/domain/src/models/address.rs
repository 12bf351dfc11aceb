//! Customer address models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use folio_core::{AddressId, CustomerId};

/// A delivery address in a customer's address book.
///
/// Addresses referenced by past orders are never deleted; removal flips
/// `is_active` so order history keeps resolving.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    /// Unique address ID.
    pub id: AddressId,
    /// Owning customer.
    pub customer_id: CustomerId,
    /// Street address, first line.
    pub address_line1: String,
    /// Street address, second line.
    pub address_line2: Option<String>,
    /// City name.
    pub city: String,
    /// State or province.
    pub state: String,
    /// Country name.
    pub country: String,
    /// Postal or ZIP code.
    pub zip_code: String,
    /// False once the customer removed this address.
    pub is_active: bool,
    /// When the address was added.
    pub created_on: DateTime<Utc>,
    /// When the address was last changed.
    pub updated_on: DateTime<Utc>,
}

/// Input for adding an address to a customer's address book.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAddress {
    /// Street address, first line.
    pub address_line1: String,
    /// Street address, second line.
    pub address_line2: Option<String>,
    /// City name.
    pub city: String,
    /// State or province.
    pub state: String,
    /// Country name.
    pub country: String,
    /// Postal or ZIP code.
    pub zip_code: String,
}
