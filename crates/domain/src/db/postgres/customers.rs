//! Customer repository backed by `PostgreSQL`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use folio_core::{CustomerId, Email, Phone, Sub};

use super::{DEFAULT_OP_TIMEOUT, timed};
use crate::db::RepositoryError;
use crate::db::repositories::CustomerRepository;
use crate::models::{Customer, CustomerProfile};

const CUSTOMER_COLUMNS: &str =
    "id, sub, username, first_name, last_name, email, phone, created_on, updated_on";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` customer queries.
#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: i32,
    sub: String,
    username: String,
    first_name: String,
    last_name: String,
    email: String,
    phone: Option<String>,
    created_on: DateTime<Utc>,
    updated_on: DateTime<Utc>,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = RepositoryError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let phone = row
            .phone
            .as_deref()
            .map(Phone::parse)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid phone in database: {e}"))
            })?;

        Ok(Self {
            id: CustomerId::new(row.id),
            sub: Sub::from(row.sub),
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            email,
            phone,
            created_on: row.created_on,
            updated_on: row.updated_on,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Customer repository for `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PgCustomerRepository {
    pool: PgPool,
    op_timeout: Duration,
}

impl PgCustomerRepository {
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
impl CustomerRepository for PgCustomerRepository {
    async fn get(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        timed(self.op_timeout, async {
            let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1");

            let row = sqlx::query_as::<_, CustomerRow>(&sql)
                .bind(id.as_i32())
                .fetch_optional(&self.pool)
                .await?;

            row.map(TryInto::try_into).transpose()
        })
        .await
    }

    async fn get_by_sub(&self, sub: &Sub) -> Result<Option<Customer>, RepositoryError> {
        timed(self.op_timeout, async {
            let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE sub = $1");

            let row = sqlx::query_as::<_, CustomerRow>(&sql)
                .bind(sub.as_str())
                .fetch_optional(&self.pool)
                .await?;

            row.map(TryInto::try_into).transpose()
        })
        .await
    }

    async fn upsert(
        &self,
        sub: &Sub,
        profile: CustomerProfile,
    ) -> Result<Customer, RepositoryError> {
        timed(self.op_timeout, async {
            let sql = format!(
                "INSERT INTO customers (sub, username, first_name, last_name, email, phone) \
                 VALUES ($1, $2, $3, $4, $5, $6) \
                 ON CONFLICT (sub) DO UPDATE \
                 SET username = EXCLUDED.username, \
                     first_name = EXCLUDED.first_name, \
                     last_name = EXCLUDED.last_name, \
                     email = EXCLUDED.email, \
                     phone = EXCLUDED.phone, \
                     updated_on = NOW() \
                 RETURNING {CUSTOMER_COLUMNS}"
            );

            let row = sqlx::query_as::<_, CustomerRow>(&sql)
                .bind(sub.as_str())
                .bind(&profile.username)
                .bind(&profile.first_name)
                .bind(&profile.last_name)
                .bind(profile.email.as_str())
                .bind(profile.phone.as_ref().map(Phone::as_str))
                .fetch_one(&self.pool)
                .await?;

            row.try_into()
        })
        .await
    }
}
