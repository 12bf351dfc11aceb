//! Address book repository backed by `PostgreSQL`.
//!
//! Addresses are soft-deleted: orders keep referencing them, so removal
//! only clears `is_active`. Every read goes through the shared
//! active-rows predicate.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use folio_core::{AddressId, CustomerId};

use super::{DEFAULT_OP_TIMEOUT, timed};
use crate::db::RepositoryError;
use crate::db::repositories::AddressRepository;
use crate::models::{Address, NewAddress};

const ADDRESS_COLUMNS: &str = "id, customer_id, address_line1, address_line2, city, state, \
     country, zip_code, is_active, created_on, updated_on";

// Every read path filters through this single predicate.
const ACTIVE_ONLY: &str = "customer_id = $1 AND is_active";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` address queries.
#[derive(Debug, sqlx::FromRow)]
struct AddressRow {
    id: i32,
    customer_id: i32,
    address_line1: String,
    address_line2: Option<String>,
    city: String,
    state: String,
    country: String,
    zip_code: String,
    is_active: bool,
    created_on: DateTime<Utc>,
    updated_on: DateTime<Utc>,
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Self {
            id: AddressId::new(row.id),
            customer_id: CustomerId::new(row.customer_id),
            address_line1: row.address_line1,
            address_line2: row.address_line2,
            city: row.city,
            state: row.state,
            country: row.country,
            zip_code: row.zip_code,
            is_active: row.is_active,
            created_on: row.created_on,
            updated_on: row.updated_on,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Address repository for `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PgAddressRepository {
    pool: PgPool,
    op_timeout: Duration,
}

impl PgAddressRepository {
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
impl AddressRepository for PgAddressRepository {
    async fn add(
        &self,
        customer_id: CustomerId,
        address: NewAddress,
    ) -> Result<Address, RepositoryError> {
        timed(self.op_timeout, async {
            let sql = format!(
                "INSERT INTO customer_addresses \
                     (customer_id, address_line1, address_line2, city, state, country, zip_code) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7) \
                 RETURNING {ADDRESS_COLUMNS}"
            );

            let row = sqlx::query_as::<_, AddressRow>(&sql)
                .bind(customer_id.as_i32())
                .bind(&address.address_line1)
                .bind(address.address_line2.as_deref())
                .bind(&address.city)
                .bind(&address.state)
                .bind(&address.country)
                .bind(&address.zip_code)
                .fetch_one(&self.pool)
                .await?;

            Ok(row.into())
        })
        .await
    }

    async fn list_active_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Address>, RepositoryError> {
        timed(self.op_timeout, async {
            let sql = format!(
                "SELECT {ADDRESS_COLUMNS} FROM customer_addresses \
                 WHERE {ACTIVE_ONLY} ORDER BY created_on ASC, id ASC"
            );

            let rows = sqlx::query_as::<_, AddressRow>(&sql)
                .bind(customer_id.as_i32())
                .fetch_all(&self.pool)
                .await?;

            Ok(rows.into_iter().map(Address::from).collect())
        })
        .await
    }

    async fn get_active(
        &self,
        customer_id: CustomerId,
        id: AddressId,
    ) -> Result<Option<Address>, RepositoryError> {
        timed(self.op_timeout, async {
            let sql = format!(
                "SELECT {ADDRESS_COLUMNS} FROM customer_addresses \
                 WHERE {ACTIVE_ONLY} AND id = $2"
            );

            let row = sqlx::query_as::<_, AddressRow>(&sql)
                .bind(customer_id.as_i32())
                .bind(id.as_i32())
                .fetch_optional(&self.pool)
                .await?;

            Ok(row.map(Address::from))
        })
        .await
    }

    async fn deactivate(
        &self,
        customer_id: CustomerId,
        id: AddressId,
    ) -> Result<(), RepositoryError> {
        timed(self.op_timeout, async {
            let sql = format!(
                "UPDATE customer_addresses SET is_active = FALSE, updated_on = NOW() \
                 WHERE {ACTIVE_ONLY} AND id = $2"
            );

            let result = sqlx::query(&sql)
                .bind(customer_id.as_i32())
                .bind(id.as_i32())
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
