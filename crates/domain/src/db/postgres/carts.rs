//! Shopping cart repository backed by `PostgreSQL`.
//!
//! Carts are created lazily on the first add for a correlation ID. The
//! unique index on `correlation_id` plus `ON CONFLICT DO NOTHING` keeps
//! concurrent first adds down to one cart row.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use folio_core::{BookId, CorrelationId, ShoppingCartId, ShoppingCartItemId};

use super::{DEFAULT_OP_TIMEOUT, timed};
use crate::db::RepositoryError;
use crate::db::repositories::ShoppingCartRepository;
use crate::models::{CartLine, ShoppingCart, ShoppingCartItem, ShoppingCartView};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` cart queries.
#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    id: i32,
    correlation_id: Uuid,
    created_on: DateTime<Utc>,
    updated_on: DateTime<Utc>,
}

impl From<CartRow> for ShoppingCart {
    fn from(row: CartRow) -> Self {
        Self {
            id: ShoppingCartId::new(row.id),
            correlation_id: CorrelationId::from_uuid(row.correlation_id),
            created_on: row.created_on,
            updated_on: row.updated_on,
        }
    }
}

/// Internal row type for `PostgreSQL` cart item queries.
#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    id: i32,
    cart_id: i32,
    book_id: i32,
    quantity: i32,
}

impl From<CartItemRow> for ShoppingCartItem {
    fn from(row: CartItemRow) -> Self {
        Self {
            id: ShoppingCartItemId::new(row.id),
            cart_id: ShoppingCartId::new(row.cart_id),
            book_id: BookId::new(row.book_id),
            quantity: row.quantity,
        }
    }
}

/// Internal row type for the cart view join.
#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    item_id: i32,
    book_id: i32,
    book_name: String,
    author: String,
    unit_price: Decimal,
    quantity: i32,
}

impl From<CartLineRow> for CartLine {
    fn from(row: CartLineRow) -> Self {
        Self {
            item_id: ShoppingCartItemId::new(row.item_id),
            book_id: BookId::new(row.book_id),
            book_name: row.book_name,
            author: row.author,
            unit_price: row.unit_price,
            quantity: row.quantity,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Shopping cart repository for `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PgShoppingCartRepository {
    pool: PgPool,
    op_timeout: Duration,
}

impl PgShoppingCartRepository {
    /// Create a repository on the shared pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self {
            pool,
            op_timeout: DEFAULT_OP_TIMEOUT,
        }
    }

    /// Override the per-operation time limit.
    #[must_use]
    pub const fn with_op_timeout(mut self, limit: Duration) -> Self {
        self.op_timeout = limit;
        self
    }
}

#[async_trait]
impl ShoppingCartRepository for PgShoppingCartRepository {
    async fn find_cart(
        &self,
        correlation_id: CorrelationId,
    ) -> Result<Option<ShoppingCart>, RepositoryError> {
        timed(self.op_timeout, async {
            let row = sqlx::query_as::<_, CartRow>(
                "SELECT id, correlation_id, created_on, updated_on \
                 FROM shopping_carts WHERE correlation_id = $1",
            )
            .bind(correlation_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

            Ok(row.map(ShoppingCart::from))
        })
        .await
    }

    async fn get_view(
        &self,
        correlation_id: CorrelationId,
    ) -> Result<ShoppingCartView, RepositoryError> {
        timed(self.op_timeout, async {
            let rows = sqlx::query_as::<_, CartLineRow>(
                "SELECT items.id AS item_id, items.book_id, books.name AS book_name, \
                        books.author, books.price AS unit_price, items.quantity \
                 FROM shopping_cart_items AS items \
                 JOIN shopping_carts AS carts ON carts.id = items.cart_id \
                 JOIN books ON books.id = items.book_id \
                 WHERE carts.correlation_id = $1 \
                 ORDER BY items.id",
            )
            .bind(correlation_id.as_uuid())
            .fetch_all(&self.pool)
            .await?;

            Ok(ShoppingCartView {
                items: rows.into_iter().map(CartLine::from).collect(),
            })
        })
        .await
    }

    async fn add_item(
        &self,
        correlation_id: CorrelationId,
        book_id: BookId,
        quantity: i32,
    ) -> Result<ShoppingCartItem, RepositoryError> {
        timed(self.op_timeout, async {
            let mut tx = self.pool.begin().await?;

            sqlx::query(
                "INSERT INTO shopping_carts (correlation_id) VALUES ($1) \
                 ON CONFLICT (correlation_id) DO NOTHING",
            )
            .bind(correlation_id.as_uuid())
            .execute(&mut *tx)
            .await?;

            let (cart_id,): (i32,) =
                sqlx::query_as("SELECT id FROM shopping_carts WHERE correlation_id = $1")
                    .bind(correlation_id.as_uuid())
                    .fetch_one(&mut *tx)
                    .await?;

            // Same book twice merges into one line.
            let row = sqlx::query_as::<_, CartItemRow>(
                "INSERT INTO shopping_cart_items (cart_id, book_id, quantity) \
                 VALUES ($1, $2, $3) \
                 ON CONFLICT (cart_id, book_id) \
                 DO UPDATE SET quantity = shopping_cart_items.quantity + EXCLUDED.quantity \
                 RETURNING id, cart_id, book_id, quantity",
            )
            .bind(cart_id)
            .bind(book_id.as_i32())
            .bind(quantity)
            .fetch_one(&mut *tx)
            .await?;

            sqlx::query("UPDATE shopping_carts SET updated_on = NOW() WHERE id = $1")
                .bind(cart_id)
                .execute(&mut *tx)
                .await?;

            tx.commit().await?;

            Ok(row.into())
        })
        .await
    }

    async fn remove_item(
        &self,
        correlation_id: CorrelationId,
        item_id: ShoppingCartItemId,
    ) -> Result<(), RepositoryError> {
        timed(self.op_timeout, async {
            let result = sqlx::query(
                "DELETE FROM shopping_cart_items AS items \
                 USING shopping_carts AS carts \
                 WHERE items.id = $2 AND items.cart_id = carts.id \
                   AND carts.correlation_id = $1",
            )
            .bind(correlation_id.as_uuid())
            .bind(item_id.as_i32())
            .execute(&self.pool)
            .await?;

            if result.rows_affected() == 0 {
                return Err(RepositoryError::NotFound);
            }
            Ok(())
        })
        .await
    }
}
