//! Resale offer models.
//!
//! An offer is a customer's proposal to sell a used book back to the
//! store. Administrators review offers and approve or reject them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use folio_core::{CustomerId, OfferId, OfferStatus, ReferenceDataId};

use super::contains_ignore_case;

/// A customer's resale offer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    /// Unique offer ID.
    pub id: OfferId,
    /// Customer who submitted the offer.
    pub customer_id: CustomerId,
    /// Title of the offered book.
    pub book_name: String,
    /// Author of the offered book.
    pub author: String,
    /// ISBN as printed on the copy.
    pub isbn: String,
    /// Binding/format reference entry.
    pub book_type_id: ReferenceDataId,
    /// Condition grade reference entry.
    pub condition_id: ReferenceDataId,
    /// Genre reference entry.
    pub genre_id: ReferenceDataId,
    /// Publisher reference entry.
    pub publisher_id: ReferenceDataId,
    /// Asking price.
    pub price: Decimal,
    /// Review status.
    pub status: OfferStatus,
    /// When the offer was submitted.
    pub created_on: DateTime<Utc>,
    /// When the offer was last changed.
    pub updated_on: DateTime<Utc>,
    /// Optimistic concurrency token, incremented by every persisted update.
    pub row_version: i64,
}

/// Input for submitting a new resale offer.
#[derive(Debug, Clone, Deserialize)]
pub struct NewOffer {
    /// Title of the offered book.
    pub book_name: String,
    /// Author of the offered book.
    pub author: String,
    /// ISBN as printed on the copy.
    pub isbn: String,
    /// Binding/format reference entry.
    pub book_type_id: ReferenceDataId,
    /// Condition grade reference entry.
    pub condition_id: ReferenceDataId,
    /// Genre reference entry.
    pub genre_id: ReferenceDataId,
    /// Publisher reference entry.
    pub publisher_id: ReferenceDataId,
    /// Asking price.
    pub price: Decimal,
}

/// Filter criteria for the admin offer list.
///
/// Absent fields never constrain; present criteria AND-compose.
#[derive(Debug, Clone, Default)]
pub struct OfferFilters {
    /// Case-insensitive substring match on the author.
    pub author: Option<String>,
    /// Case-insensitive substring match on the book title.
    pub book_name: Option<String>,
    /// Exact condition reference entry.
    pub condition_id: Option<ReferenceDataId>,
    /// Exact genre reference entry.
    pub genre_id: Option<ReferenceDataId>,
    /// Exact review status.
    pub status: Option<OfferStatus>,
}

impl OfferFilters {
    /// True when `offer` satisfies every present criterion.
    #[must_use]
    pub fn matches(&self, offer: &Offer) -> bool {
        self.author
            .as_deref()
            .is_none_or(|author| contains_ignore_case(&offer.author, author))
            && self
                .book_name
                .as_deref()
                .is_none_or(|name| contains_ignore_case(&offer.book_name, name))
            && self.condition_id.is_none_or(|id| offer.condition_id == id)
            && self.genre_id.is_none_or(|id| offer.genre_id == id)
            && self.status.is_none_or(|status| offer.status == status)
    }
}

/// Offer counts for the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OfferStatistics {
    /// Offers awaiting review.
    pub pending_offers: i64,
    /// Offers submitted since the start of the current month.
    pub offers_this_month: i64,
    /// All offers ever submitted.
    pub offers_total: i64,
}
