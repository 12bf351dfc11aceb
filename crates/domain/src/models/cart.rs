//! Shopping cart models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use folio_core::{BookId, CorrelationId, ShoppingCartId, ShoppingCartItemId};

/// A shopping cart keyed by an anonymous browser correlation ID.
///
/// Carts exist before sign-in; the correlation ID lives in a browser
/// cookie and is the only handle the storefront holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingCart {
    /// Unique cart ID.
    pub id: ShoppingCartId,
    /// Browser correlation ID owning this cart.
    pub correlation_id: CorrelationId,
    /// When the cart was created.
    pub created_on: DateTime<Utc>,
    /// When the cart was last changed.
    pub updated_on: DateTime<Utc>,
}

/// One line of a shopping cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingCartItem {
    /// Unique line ID.
    pub id: ShoppingCartItemId,
    /// Cart this line belongs to.
    pub cart_id: ShoppingCartId,
    /// Book in the cart.
    pub book_id: BookId,
    /// Number of copies.
    pub quantity: i32,
}

/// A cart line joined with its book for display.
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    /// Cart line ID, used for removal.
    pub item_id: ShoppingCartItemId,
    /// Book in the cart.
    pub book_id: BookId,
    /// Book title.
    pub book_name: String,
    /// Book author.
    pub author: String,
    /// Current book price.
    pub unit_price: Decimal,
    /// Number of copies.
    pub quantity: i32,
}

impl CartLine {
    /// Price of this line (unit price times quantity).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// The cart as the storefront renders it.
///
/// Prices come from the current catalog; they are only frozen into
/// snapshots when the order is placed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ShoppingCartView {
    /// Lines joined with their books.
    pub items: Vec<CartLine>,
}

impl ShoppingCartView {
    /// A view with no lines, for correlation IDs that never added anything.
    #[must_use]
    pub const fn empty() -> Self {
        Self { items: Vec::new() }
    }

    /// True when the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of the line totals at current prices.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(CartLine::line_total).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_view_has_zero_subtotal() {
        let view = ShoppingCartView::empty();
        assert!(view.is_empty());
        assert_eq!(view.subtotal(), Decimal::ZERO);
    }

    #[test]
    fn test_subtotal_sums_line_totals() {
        let view = ShoppingCartView {
            items: vec![
                CartLine {
                    item_id: ShoppingCartItemId::new(1),
                    book_id: BookId::new(1),
                    book_name: "The Hobbit".to_string(),
                    author: "J.R.R. Tolkien".to_string(),
                    unit_price: Decimal::new(1499, 2),
                    quantity: 2,
                },
                CartLine {
                    item_id: ShoppingCartItemId::new(2),
                    book_id: BookId::new(2),
                    book_name: "Dune".to_string(),
                    author: "Frank Herbert".to_string(),
                    unit_price: Decimal::new(999, 2),
                    quantity: 1,
                },
            ],
        };

        assert!(!view.is_empty());
        assert_eq!(view.subtotal(), Decimal::new(3997, 2));
    }

    #[test]
    fn test_line_total_multiplies_by_quantity() {
        let line = CartLine {
            item_id: ShoppingCartItemId::new(1),
            book_id: BookId::new(1),
            book_name: "The Hobbit".to_string(),
            author: "J.R.R. Tolkien".to_string(),
            unit_price: Decimal::new(1050, 2),
            quantity: 3,
        };

        assert_eq!(line.line_total(), Decimal::new(3150, 2));
    }
}
