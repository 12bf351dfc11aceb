//! Catalog workflows: storefront browsing and admin upkeep.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, instrument};

use folio_core::{BookId, PaginatedResult};

use super::page_request;
use crate::db::RepositoryError;
use crate::db::repositories::BookRepository;
use crate::error::DomainError;
use crate::models::{Book, BookFilters, NewBook};

/// Book catalog service.
pub struct BookService {
    books: Arc<dyn BookRepository>,
}

impl BookService {
    /// Create a new book service.
    #[must_use]
    pub fn new(books: Arc<dyn BookRepository>) -> Self {
        Self { books }
    }

    /// Fetch one book.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if no book has this ID.
    pub async fn get_book(&self, id: BookId) -> Result<Book, DomainError> {
        self.books
            .get(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("book {id} not found")))
    }

    /// Storefront browse and search: books matching `filters`, paginated.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidArgument` for a zero page index or
    /// size, or a persistence error from the store.
    #[instrument(skip(self, filters))]
    pub async fn list_books(
        &self,
        filters: &BookFilters,
        page_index: u32,
        page_size: u32,
    ) -> Result<PaginatedResult<Book>, DomainError> {
        let page = page_request(page_index, page_size)?;
        Ok(self.books.list(filters, page).await?)
    }

    /// Add a book to the catalog.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidArgument` for a blank name or author,
    /// a negative price, or a negative stock quantity.
    #[instrument(skip(self, book), fields(name = %book.name))]
    pub async fn add_book(&self, book: NewBook) -> Result<Book, DomainError> {
        if book.name.trim().is_empty() {
            return Err(DomainError::InvalidArgument(
                "book name cannot be blank".to_string(),
            ));
        }
        if book.author.trim().is_empty() {
            return Err(DomainError::InvalidArgument(
                "author cannot be blank".to_string(),
            ));
        }
        if book.price < Decimal::ZERO {
            return Err(DomainError::InvalidArgument(
                "price cannot be negative".to_string(),
            ));
        }
        if book.quantity < 0 {
            return Err(DomainError::InvalidArgument(
                "quantity cannot be negative".to_string(),
            ));
        }

        let book = self.books.add(book).await?;

        info!(book_id = %book.id, "Added book");
        Ok(book)
    }

    /// Change a book's list price. Orders already placed keep the price
    /// they snapshotted.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidArgument` for a negative price and
    /// `DomainError::NotFound` if the book does not exist.
    #[instrument(skip(self))]
    pub async fn update_book_price(
        &self,
        id: BookId,
        price: Decimal,
    ) -> Result<Book, DomainError> {
        if price < Decimal::ZERO {
            return Err(DomainError::InvalidArgument(
                "price cannot be negative".to_string(),
            ));
        }

        match self.books.update_price(id, price).await {
            Ok(book) => {
                info!(book_id = %id, price = %price, "Updated book price");
                Ok(book)
            }
            Err(RepositoryError::NotFound) => {
                Err(DomainError::NotFound(format!("book {id} not found")))
            }
            Err(e) => Err(e.into()),
        }
    }
}
