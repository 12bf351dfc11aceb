//! Book catalog models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use folio_core::{BookId, ReferenceDataId};

use super::contains_ignore_case;

/// A book available for sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    /// Unique book ID.
    pub id: BookId,
    /// Title.
    pub name: String,
    /// Author name.
    pub author: String,
    /// ISBN as printed, no format enforced.
    pub isbn: String,
    /// Reference to the book type entry.
    pub book_type_id: ReferenceDataId,
    /// Reference to the condition entry.
    pub condition_id: ReferenceDataId,
    /// Reference to the genre entry.
    pub genre_id: ReferenceDataId,
    /// Reference to the publisher entry.
    pub publisher_id: ReferenceDataId,
    /// Current list price.
    pub price: Decimal,
    /// Copies on hand.
    pub quantity: i32,
    /// When the book was added to the catalog.
    pub created_on: DateTime<Utc>,
    /// When the book was last changed.
    pub updated_on: DateTime<Utc>,
}

/// Input for adding a book to the catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBook {
    /// Title.
    pub name: String,
    /// Author name.
    pub author: String,
    /// ISBN as printed.
    pub isbn: String,
    /// Reference to the book type entry.
    pub book_type_id: ReferenceDataId,
    /// Reference to the condition entry.
    pub condition_id: ReferenceDataId,
    /// Reference to the genre entry.
    pub genre_id: ReferenceDataId,
    /// Reference to the publisher entry.
    pub publisher_id: ReferenceDataId,
    /// List price.
    pub price: Decimal,
    /// Copies on hand.
    pub quantity: i32,
}

/// Filter criteria for catalog searches.
///
/// Name and author match case-insensitive substrings; ISBN matches
/// exactly. Absent fields never constrain; present criteria AND-compose.
#[derive(Debug, Clone, Default)]
pub struct BookFilters {
    /// Substring of the title, case-insensitive.
    pub name: Option<String>,
    /// Substring of the author, case-insensitive.
    pub author: Option<String>,
    /// Exact ISBN.
    pub isbn: Option<String>,
    /// Exact book type entry.
    pub book_type_id: Option<ReferenceDataId>,
    /// Exact genre entry.
    pub genre_id: Option<ReferenceDataId>,
}

impl BookFilters {
    /// True when `book` satisfies every present criterion.
    #[must_use]
    pub fn matches(&self, book: &Book) -> bool {
        self.name
            .as_deref()
            .is_none_or(|name| contains_ignore_case(&book.name, name))
            && self
                .author
                .as_deref()
                .is_none_or(|author| contains_ignore_case(&book.author, author))
            && self.isbn.as_deref().is_none_or(|isbn| book.isbn == isbn)
            && self
                .book_type_id
                .is_none_or(|book_type_id| book.book_type_id == book_type_id)
            && self
                .genre_id
                .is_none_or(|genre_id| book.genre_id == genre_id)
    }
}
