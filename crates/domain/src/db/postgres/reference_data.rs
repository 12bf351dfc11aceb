//! Reference data repository backed by `PostgreSQL`.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;

use folio_core::{PageRequest, PaginatedResult, ReferenceDataId, ReferenceDataType};

use super::{DEFAULT_OP_TIMEOUT, timed};
use crate::db::RepositoryError;
use crate::db::repositories::ReferenceDataRepository;
use crate::models::{ReferenceDataFilters, ReferenceDataItem};

const REFERENCE_COLUMNS: &str = "id, data_type, value";

// $1 data type. A NULL parameter never constrains, mirroring
// ReferenceDataFilters::matches.
const REFERENCE_FILTER_WHERE: &str = "($1::text IS NULL OR data_type = $1)";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` reference data queries.
#[derive(Debug, sqlx::FromRow)]
struct ReferenceDataRow {
    id: i32,
    data_type: String,
    value: String,
}

impl TryFrom<ReferenceDataRow> for ReferenceDataItem {
    type Error = RepositoryError;

    fn try_from(row: ReferenceDataRow) -> Result<Self, Self::Error> {
        let data_type = row.data_type.parse::<ReferenceDataType>().map_err(|e| {
            RepositoryError::DataCorruption(format!(
                "invalid reference data type in database: {e}"
            ))
        })?;

        Ok(Self {
            id: ReferenceDataId::new(row.id),
            data_type,
            value: row.value,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Reference data repository for `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PgReferenceDataRepository {
    pool: PgPool,
    op_timeout: Duration,
}

impl PgReferenceDataRepository {
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
impl ReferenceDataRepository for PgReferenceDataRepository {
    async fn add(
        &self,
        data_type: ReferenceDataType,
        value: String,
    ) -> Result<ReferenceDataItem, RepositoryError> {
        timed(self.op_timeout, async {
            let sql = format!(
                "INSERT INTO reference_data (data_type, value) VALUES ($1, $2) \
                 RETURNING {REFERENCE_COLUMNS}"
            );

            let row = sqlx::query_as::<_, ReferenceDataRow>(&sql)
                .bind(data_type.to_string())
                .bind(&value)
                .fetch_one(&self.pool)
                .await?;

            row.try_into()
        })
        .await
    }

    async fn get(&self, id: ReferenceDataId) -> Result<Option<ReferenceDataItem>, RepositoryError> {
        timed(self.op_timeout, async {
            let sql = format!("SELECT {REFERENCE_COLUMNS} FROM reference_data WHERE id = $1");

            let row = sqlx::query_as::<_, ReferenceDataRow>(&sql)
                .bind(id.as_i32())
                .fetch_optional(&self.pool)
                .await?;

            row.map(TryInto::try_into).transpose()
        })
        .await
    }

    async fn list_all(&self) -> Result<Vec<ReferenceDataItem>, RepositoryError> {
        timed(self.op_timeout, async {
            let sql = format!(
                "SELECT {REFERENCE_COLUMNS} FROM reference_data \
                 ORDER BY data_type ASC, value ASC, id ASC"
            );

            let rows = sqlx::query_as::<_, ReferenceDataRow>(&sql)
                .fetch_all(&self.pool)
                .await?;

            rows.into_iter().map(TryInto::try_into).collect()
        })
        .await
    }

    async fn list(
        &self,
        filters: &ReferenceDataFilters,
        page: PageRequest,
    ) -> Result<PaginatedResult<ReferenceDataItem>, RepositoryError> {
        timed(self.op_timeout, async {
            let data_type = filters.data_type.map(|t| t.to_string());

            let count_sql =
                format!("SELECT COUNT(*) FROM reference_data WHERE {REFERENCE_FILTER_WHERE}");
            let total: i64 = sqlx::query_scalar(&count_sql)
                .bind(data_type.as_deref())
                .fetch_one(&self.pool)
                .await?;

            let list_sql = format!(
                "SELECT {REFERENCE_COLUMNS} FROM reference_data \
                 WHERE {REFERENCE_FILTER_WHERE} \
                 ORDER BY value ASC, id ASC LIMIT $2 OFFSET $3"
            );
            let rows = sqlx::query_as::<_, ReferenceDataRow>(&list_sql)
                .bind(data_type.as_deref())
                .bind(page.limit())
                .bind(page.offset())
                .fetch_all(&self.pool)
                .await?;

            let items = rows
                .into_iter()
                .map(TryInto::try_into)
                .collect::<Result<Vec<ReferenceDataItem>, _>>()?;

            Ok(PaginatedResult::from_page(
                items,
                u64::try_from(total).unwrap_or_default(),
                page,
            ))
        })
        .await
    }
}
