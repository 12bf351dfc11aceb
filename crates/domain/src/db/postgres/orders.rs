//! Order repository backed by `PostgreSQL`.
//!
//! Order placement is the one multi-statement write in the store: the
//! order insert, the price-snapshot item copy, and the cart clearing run
//! in a single transaction so no reader ever sees one without the others.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use folio_core::calendar::{end_of_day, start_of_day};
use folio_core::{
    AddressId, BookId, CustomerId, OrderId, OrderItemId, OrderStatus, PageRequest,
    PaginatedResult, ReferenceDataId,
};

use super::{DEFAULT_OP_TIMEOUT, timed};
use crate::db::RepositoryError;
use crate::db::repositories::OrderRepository;
use crate::models::{
    BestSellingBook, Book, Order, OrderFilters, OrderItem, OrderPlacement, OrderStatistics,
};

const ORDER_COLUMNS: &str =
    "id, customer_id, address_id, status, ordered_on, delivery_date, updated_on";

// $1 status, $2 placed-from instant, $3 placed-through instant. NULL
// parameters never constrain, mirroring OrderFilters::matches.
const ORDER_FILTER_WHERE: &str = "($1::text IS NULL OR status = $1) \
     AND ($2::timestamptz IS NULL OR ordered_on >= $2) \
     AND ($3::timestamptz IS NULL OR ordered_on <= $3)";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` order queries. Items are loaded
/// separately and attached afterwards.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    customer_id: i32,
    address_id: i32,
    status: String,
    ordered_on: DateTime<Utc>,
    delivery_date: Option<DateTime<Utc>>,
    updated_on: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<OrderStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order status in database: {e}"))
        })?;

        Ok(Self {
            id: OrderId::new(row.id),
            customer_id: CustomerId::new(row.customer_id),
            address_id: AddressId::new(row.address_id),
            status,
            ordered_on: row.ordered_on,
            delivery_date: row.delivery_date,
            updated_on: row.updated_on,
            items: Vec::new(),
        })
    }
}

/// Internal row type for `PostgreSQL` order item queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: i32,
    order_id: i32,
    book_id: i32,
    quantity: i32,
    unit_price: Decimal,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            id: OrderItemId::new(row.id),
            order_id: OrderId::new(row.order_id),
            book_id: BookId::new(row.book_id),
            quantity: row.quantity,
            unit_price: row.unit_price,
        }
    }
}

/// Internal row type for the best-seller ranking: a book joined with its
/// summed order quantity.
#[derive(Debug, sqlx::FromRow)]
struct BestSellerRow {
    id: i32,
    name: String,
    author: String,
    isbn: String,
    book_type_id: i32,
    condition_id: i32,
    genre_id: i32,
    publisher_id: i32,
    price: Decimal,
    quantity: i32,
    created_on: DateTime<Utc>,
    updated_on: DateTime<Utc>,
    total_ordered: i64,
}

impl From<BestSellerRow> for BestSellingBook {
    fn from(row: BestSellerRow) -> Self {
        Self {
            book: Book {
                id: BookId::new(row.id),
                name: row.name,
                author: row.author,
                isbn: row.isbn,
                book_type_id: ReferenceDataId::new(row.book_type_id),
                condition_id: ReferenceDataId::new(row.condition_id),
                genre_id: ReferenceDataId::new(row.genre_id),
                publisher_id: ReferenceDataId::new(row.publisher_id),
                price: row.price,
                quantity: row.quantity,
                created_on: row.created_on,
                updated_on: row.updated_on,
            },
            total_ordered: row.total_ordered,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Order repository for `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PgOrderRepository {
    pool: PgPool,
    op_timeout: Duration,
}

impl PgOrderRepository {
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

    /// Load the items for every order in `orders` with one query.
    async fn attach_items(&self, orders: &mut [Order]) -> Result<(), RepositoryError> {
        if orders.is_empty() {
            return Ok(());
        }

        let ids: Vec<i32> = orders.iter().map(|order| order.id.as_i32()).collect();
        let rows = sqlx::query_as::<_, OrderItemRow>(
            "SELECT id, order_id, book_id, quantity, unit_price \
             FROM order_items WHERE order_id = ANY($1) ORDER BY id",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_order: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
        for row in rows {
            let item = OrderItem::from(row);
            by_order.entry(item.order_id).or_default().push(item);
        }

        for order in orders.iter_mut() {
            if let Some(items) = by_order.remove(&order.id) {
                order.items = items;
            }
        }

        Ok(())
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn place(&self, placement: OrderPlacement) -> Result<Order, RepositoryError> {
        timed(self.op_timeout, async {
            let mut tx = self.pool.begin().await?;

            let sql = format!(
                "INSERT INTO orders (customer_id, address_id, status) \
                 VALUES ($1, $2, $3) RETURNING {ORDER_COLUMNS}"
            );
            let order_row = sqlx::query_as::<_, OrderRow>(&sql)
                .bind(placement.customer_id.as_i32())
                .bind(placement.address_id.as_i32())
                .bind(OrderStatus::Pending.to_string())
                .fetch_one(&mut *tx)
                .await?;

            // Snapshot current prices while copying the cart lines.
            let inserted = sqlx::query(
                "INSERT INTO order_items (order_id, book_id, quantity, unit_price) \
                 SELECT $1, items.book_id, items.quantity, books.price \
                 FROM shopping_cart_items AS items \
                 JOIN books ON books.id = items.book_id \
                 WHERE items.cart_id = $2",
            )
            .bind(order_row.id)
            .bind(placement.cart_id.as_i32())
            .execute(&mut *tx)
            .await?;

            // Returning here drops the transaction, rolling the order back.
            if inserted.rows_affected() == 0 {
                return Err(RepositoryError::Conflict(
                    "shopping cart emptied during checkout".to_string(),
                ));
            }

            sqlx::query("DELETE FROM shopping_cart_items WHERE cart_id = $1")
                .bind(placement.cart_id.as_i32())
                .execute(&mut *tx)
                .await?;

            let item_rows = sqlx::query_as::<_, OrderItemRow>(
                "SELECT id, order_id, book_id, quantity, unit_price \
                 FROM order_items WHERE order_id = $1 ORDER BY id",
            )
            .bind(order_row.id)
            .fetch_all(&mut *tx)
            .await?;

            tx.commit().await?;

            let mut order = Order::try_from(order_row)?;
            order.items = item_rows.into_iter().map(OrderItem::from).collect();
            Ok(order)
        })
        .await
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        timed(self.op_timeout, async {
            let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");

            let row = sqlx::query_as::<_, OrderRow>(&sql)
                .bind(id.as_i32())
                .fetch_optional(&self.pool)
                .await?;

            let Some(row) = row else {
                return Ok(None);
            };

            let mut orders = vec![Order::try_from(row)?];
            self.attach_items(&mut orders).await?;
            Ok(orders.pop())
        })
        .await
    }

    async fn list(
        &self,
        filters: &OrderFilters,
        page: PageRequest,
    ) -> Result<PaginatedResult<Order>, RepositoryError> {
        timed(self.op_timeout, async {
            let status = filters.status.map(|s| s.to_string());
            let from = filters.ordered_from.map(start_of_day);
            let through = filters.ordered_through.map(end_of_day);

            let count_sql = format!("SELECT COUNT(*) FROM orders WHERE {ORDER_FILTER_WHERE}");
            let total: i64 = sqlx::query_scalar(&count_sql)
                .bind(status.as_deref())
                .bind(from)
                .bind(through)
                .fetch_one(&self.pool)
                .await?;

            let list_sql = format!(
                "SELECT {ORDER_COLUMNS} FROM orders WHERE {ORDER_FILTER_WHERE} \
                 ORDER BY ordered_on DESC, id DESC LIMIT $4 OFFSET $5"
            );
            let rows = sqlx::query_as::<_, OrderRow>(&list_sql)
                .bind(status.as_deref())
                .bind(from)
                .bind(through)
                .bind(page.limit())
                .bind(page.offset())
                .fetch_all(&self.pool)
                .await?;

            let mut orders = rows
                .into_iter()
                .map(TryInto::try_into)
                .collect::<Result<Vec<Order>, _>>()?;
            self.attach_items(&mut orders).await?;

            Ok(PaginatedResult::from_page(
                orders,
                u64::try_from(total).unwrap_or_default(),
                page,
            ))
        })
        .await
    }

    async fn list_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Order>, RepositoryError> {
        timed(self.op_timeout, async {
            let sql = format!(
                "SELECT {ORDER_COLUMNS} FROM orders WHERE customer_id = $1 \
                 ORDER BY ordered_on DESC, id DESC"
            );

            let rows = sqlx::query_as::<_, OrderRow>(&sql)
                .bind(customer_id.as_i32())
                .fetch_all(&self.pool)
                .await?;

            let mut orders = rows
                .into_iter()
                .map(TryInto::try_into)
                .collect::<Result<Vec<Order>, _>>()?;
            self.attach_items(&mut orders).await?;
            Ok(orders)
        })
        .await
    }

    async fn update_status(
        &self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
        delivery_date: Option<DateTime<Utc>>,
    ) -> Result<Order, RepositoryError> {
        timed(self.op_timeout, async {
            let sql = format!(
                "UPDATE orders \
                 SET status = $3, delivery_date = COALESCE($4::timestamptz, delivery_date), \
                     updated_on = NOW() \
                 WHERE id = $1 AND status = $2 \
                 RETURNING {ORDER_COLUMNS}"
            );

            let row = sqlx::query_as::<_, OrderRow>(&sql)
                .bind(id.as_i32())
                .bind(from.to_string())
                .bind(to.to_string())
                .bind(delivery_date)
                .fetch_optional(&self.pool)
                .await?;

            let Some(row) = row else {
                let exists: bool =
                    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM orders WHERE id = $1)")
                        .bind(id.as_i32())
                        .fetch_one(&self.pool)
                        .await?;

                return if exists {
                    Err(RepositoryError::Conflict(
                        "order status changed by another writer".to_string(),
                    ))
                } else {
                    Err(RepositoryError::NotFound)
                };
            };

            let mut orders = vec![Order::try_from(row)?];
            self.attach_items(&mut orders).await?;
            orders.pop().ok_or(RepositoryError::NotFound)
        })
        .await
    }

    async fn best_selling(&self, limit: usize) -> Result<Vec<BestSellingBook>, RepositoryError> {
        timed(self.op_timeout, async {
            let rows = sqlx::query_as::<_, BestSellerRow>(
                "SELECT books.id, books.name, books.author, books.isbn, \
                        books.book_type_id, books.condition_id, books.genre_id, \
                        books.publisher_id, books.price, books.quantity, \
                        books.created_on, books.updated_on, totals.total_ordered \
                 FROM (SELECT book_id, SUM(quantity)::bigint AS total_ordered \
                       FROM order_items GROUP BY book_id) AS totals \
                 JOIN books ON books.id = totals.book_id \
                 ORDER BY totals.total_ordered DESC, books.id ASC \
                 LIMIT $1",
            )
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;

            Ok(rows.into_iter().map(BestSellingBook::from).collect())
        })
        .await
    }

    async fn statistics(
        &self,
        now: DateTime<Utc>,
        month_start: DateTime<Utc>,
    ) -> Result<OrderStatistics, RepositoryError> {
        timed(self.op_timeout, async {
            let (pending_orders, past_due_orders, orders_this_month, orders_total): (
                i64,
                i64,
                i64,
                i64,
            ) = sqlx::query_as(
                "SELECT COUNT(*) FILTER (WHERE status = $1), \
                        COUNT(*) FILTER (WHERE status = $2 AND delivery_date < $3), \
                        COUNT(*) FILTER (WHERE ordered_on >= $4), \
                        COUNT(*) \
                 FROM orders",
            )
            .bind(OrderStatus::Pending.to_string())
            .bind(OrderStatus::Ordered.to_string())
            .bind(now)
            .bind(month_start)
            .fetch_one(&self.pool)
            .await?;

            Ok(OrderStatistics {
                pending_orders,
                past_due_orders,
                orders_this_month,
                orders_total,
            })
        })
        .await
    }
}
