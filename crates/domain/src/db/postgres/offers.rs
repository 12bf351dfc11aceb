//! Offer repository backed by `PostgreSQL`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use folio_core::{
    CustomerId, OfferId, OfferStatus, PageRequest, PaginatedResult, ReferenceDataId,
};

use super::{DEFAULT_OP_TIMEOUT, timed};
use crate::db::RepositoryError;
use crate::db::repositories::OfferRepository;
use crate::models::{NewOffer, Offer, OfferFilters, OfferStatistics};

const OFFER_COLUMNS: &str = "id, customer_id, book_name, author, isbn, book_type_id, \
     condition_id, genre_id, publisher_id, price, status, created_on, updated_on, row_version";

// $1 author, $2 book name, $3 condition, $4 genre, $5 status. NULL
// parameters never constrain, mirroring OfferFilters::matches.
const OFFER_FILTER_WHERE: &str = "($1::text IS NULL OR author ILIKE '%' || $1 || '%') \
     AND ($2::text IS NULL OR book_name ILIKE '%' || $2 || '%') \
     AND ($3::int IS NULL OR condition_id = $3) \
     AND ($4::int IS NULL OR genre_id = $4) \
     AND ($5::text IS NULL OR status = $5)";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` offer queries.
#[derive(Debug, sqlx::FromRow)]
struct OfferRow {
    id: i32,
    customer_id: i32,
    book_name: String,
    author: String,
    isbn: String,
    book_type_id: i32,
    condition_id: i32,
    genre_id: i32,
    publisher_id: i32,
    price: Decimal,
    status: String,
    created_on: DateTime<Utc>,
    updated_on: DateTime<Utc>,
    row_version: i64,
}

impl TryFrom<OfferRow> for Offer {
    type Error = RepositoryError;

    fn try_from(row: OfferRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<OfferStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid offer status in database: {e}"))
        })?;

        Ok(Self {
            id: OfferId::new(row.id),
            customer_id: CustomerId::new(row.customer_id),
            book_name: row.book_name,
            author: row.author,
            isbn: row.isbn,
            book_type_id: ReferenceDataId::new(row.book_type_id),
            condition_id: ReferenceDataId::new(row.condition_id),
            genre_id: ReferenceDataId::new(row.genre_id),
            publisher_id: ReferenceDataId::new(row.publisher_id),
            price: row.price,
            status,
            created_on: row.created_on,
            updated_on: row.updated_on,
            row_version: row.row_version,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Offer repository for `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PgOfferRepository {
    pool: PgPool,
    op_timeout: Duration,
}

impl PgOfferRepository {
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
impl OfferRepository for PgOfferRepository {
    async fn add(
        &self,
        customer_id: CustomerId,
        offer: NewOffer,
    ) -> Result<Offer, RepositoryError> {
        timed(self.op_timeout, async {
            let sql = format!(
                "INSERT INTO offers \
                     (customer_id, book_name, author, isbn, book_type_id, condition_id, \
                      genre_id, publisher_id, price, status) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
                 RETURNING {OFFER_COLUMNS}"
            );

            let row = sqlx::query_as::<_, OfferRow>(&sql)
                .bind(customer_id.as_i32())
                .bind(&offer.book_name)
                .bind(&offer.author)
                .bind(&offer.isbn)
                .bind(offer.book_type_id.as_i32())
                .bind(offer.condition_id.as_i32())
                .bind(offer.genre_id.as_i32())
                .bind(offer.publisher_id.as_i32())
                .bind(offer.price)
                .bind(OfferStatus::PendingApproval.to_string())
                .fetch_one(&self.pool)
                .await?;

            row.try_into()
        })
        .await
    }

    async fn get(&self, id: OfferId) -> Result<Option<Offer>, RepositoryError> {
        timed(self.op_timeout, async {
            let sql = format!("SELECT {OFFER_COLUMNS} FROM offers WHERE id = $1");

            let row = sqlx::query_as::<_, OfferRow>(&sql)
                .bind(id.as_i32())
                .fetch_optional(&self.pool)
                .await?;

            row.map(TryInto::try_into).transpose()
        })
        .await
    }

    async fn list(
        &self,
        filters: &OfferFilters,
        page: PageRequest,
    ) -> Result<PaginatedResult<Offer>, RepositoryError> {
        timed(self.op_timeout, async {
            let author = filters.author.as_deref();
            let book_name = filters.book_name.as_deref();
            let condition_id = filters.condition_id.map(|id| id.as_i32());
            let genre_id = filters.genre_id.map(|id| id.as_i32());
            let status = filters.status.map(|s| s.to_string());

            let count_sql = format!("SELECT COUNT(*) FROM offers WHERE {OFFER_FILTER_WHERE}");
            let total: i64 = sqlx::query_scalar(&count_sql)
                .bind(author)
                .bind(book_name)
                .bind(condition_id)
                .bind(genre_id)
                .bind(status.as_deref())
                .fetch_one(&self.pool)
                .await?;

            let list_sql = format!(
                "SELECT {OFFER_COLUMNS} FROM offers WHERE {OFFER_FILTER_WHERE} \
                 ORDER BY created_on DESC, id DESC LIMIT $6 OFFSET $7"
            );
            let rows = sqlx::query_as::<_, OfferRow>(&list_sql)
                .bind(author)
                .bind(book_name)
                .bind(condition_id)
                .bind(genre_id)
                .bind(status.as_deref())
                .bind(page.limit())
                .bind(page.offset())
                .fetch_all(&self.pool)
                .await?;

            let items = rows
                .into_iter()
                .map(TryInto::try_into)
                .collect::<Result<Vec<Offer>, _>>()?;

            Ok(PaginatedResult::from_page(
                items,
                u64::try_from(total).unwrap_or_default(),
                page,
            ))
        })
        .await
    }

    async fn list_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Offer>, RepositoryError> {
        timed(self.op_timeout, async {
            let sql = format!(
                "SELECT {OFFER_COLUMNS} FROM offers WHERE customer_id = $1 \
                 ORDER BY created_on DESC, id DESC"
            );

            let rows = sqlx::query_as::<_, OfferRow>(&sql)
                .bind(customer_id.as_i32())
                .fetch_all(&self.pool)
                .await?;

            rows.into_iter().map(TryInto::try_into).collect()
        })
        .await
    }

    async fn update_status(
        &self,
        id: OfferId,
        status: OfferStatus,
        expected_version: i64,
    ) -> Result<Offer, RepositoryError> {
        timed(self.op_timeout, async {
            let sql = format!(
                "UPDATE offers \
                 SET status = $2, updated_on = NOW(), row_version = row_version + 1 \
                 WHERE id = $1 AND row_version = $3 \
                 RETURNING {OFFER_COLUMNS}"
            );

            let row = sqlx::query_as::<_, OfferRow>(&sql)
                .bind(id.as_i32())
                .bind(status.to_string())
                .bind(expected_version)
                .fetch_optional(&self.pool)
                .await?;

            match row {
                Some(row) => row.try_into(),
                None => {
                    let exists: bool =
                        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM offers WHERE id = $1)")
                            .bind(id.as_i32())
                            .fetch_one(&self.pool)
                            .await?;

                    if exists {
                        Err(RepositoryError::Conflict(
                            "offer was changed by another writer".to_string(),
                        ))
                    } else {
                        Err(RepositoryError::NotFound)
                    }
                }
            }
        })
        .await
    }

    async fn statistics(
        &self,
        month_start: DateTime<Utc>,
    ) -> Result<OfferStatistics, RepositoryError> {
        timed(self.op_timeout, async {
            let (pending_offers, offers_this_month, offers_total): (i64, i64, i64) =
                sqlx::query_as(
                    "SELECT COUNT(*) FILTER (WHERE status = $1), \
                            COUNT(*) FILTER (WHERE created_on >= $2), \
                            COUNT(*) \
                     FROM offers",
                )
                .bind(OfferStatus::PendingApproval.to_string())
                .bind(month_start)
                .fetch_one(&self.pool)
                .await?;

            Ok(OfferStatistics {
                pending_offers,
                offers_this_month,
                offers_total,
            })
        })
        .await
    }
}
