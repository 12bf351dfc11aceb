//! Shopping cart workflows for anonymous storefront sessions.

use std::sync::Arc;

use tracing::{debug, instrument};

use folio_core::{BookId, CorrelationId, ShoppingCartItemId};

use crate::db::RepositoryError;
use crate::db::repositories::{BookRepository, ShoppingCartRepository};
use crate::error::DomainError;
use crate::models::{ShoppingCartItem, ShoppingCartView};

/// Shopping cart service.
pub struct ShoppingCartService {
    carts: Arc<dyn ShoppingCartRepository>,
    books: Arc<dyn BookRepository>,
}

impl ShoppingCartService {
    /// Create a new shopping cart service.
    #[must_use]
    pub fn new(carts: Arc<dyn ShoppingCartRepository>, books: Arc<dyn BookRepository>) -> Self {
        Self { carts, books }
    }

    /// The cart as the storefront renders it. A correlation ID that never
    /// added anything gets an empty view.
    ///
    /// # Errors
    ///
    /// Returns a persistence error from the store.
    pub async fn get_cart(
        &self,
        correlation_id: CorrelationId,
    ) -> Result<ShoppingCartView, DomainError> {
        Ok(self.carts.get_view(correlation_id).await?)
    }

    /// Put copies of a book in the cart, creating the cart on first use.
    /// Adding a book already in the cart sums the quantities.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidArgument` for a quantity below 1 and
    /// `DomainError::NotFound` for an unknown book.
    #[instrument(skip(self))]
    pub async fn add_to_cart(
        &self,
        correlation_id: CorrelationId,
        book_id: BookId,
        quantity: i32,
    ) -> Result<ShoppingCartItem, DomainError> {
        if quantity < 1 {
            return Err(DomainError::InvalidArgument(
                "quantity must be at least 1".to_string(),
            ));
        }
        if self.books.get(book_id).await?.is_none() {
            return Err(DomainError::NotFound(format!("book {book_id} not found")));
        }

        let item = self.carts.add_item(correlation_id, book_id, quantity).await?;

        debug!(item_id = %item.id, quantity = item.quantity, "Added book to cart");
        Ok(item)
    }

    /// Take a line out of the cart.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` when the correlation ID's cart has
    /// no such line.
    #[instrument(skip(self))]
    pub async fn remove_from_cart(
        &self,
        correlation_id: CorrelationId,
        item_id: ShoppingCartItemId,
    ) -> Result<(), DomainError> {
        match self.carts.remove_item(correlation_id, item_id).await {
            Ok(()) => Ok(()),
            Err(RepositoryError::NotFound) => Err(DomainError::NotFound(format!(
                "cart item {item_id} not found"
            ))),
            Err(e) => Err(e.into()),
        }
    }
}
