//! Book catalog repository backed by `PostgreSQL`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use folio_core::{BookId, PageRequest, PaginatedResult, ReferenceDataId};

use super::{DEFAULT_OP_TIMEOUT, timed};
use crate::db::RepositoryError;
use crate::db::repositories::BookRepository;
use crate::models::{Book, BookFilters, NewBook};

const BOOK_COLUMNS: &str = "id, name, author, isbn, book_type_id, condition_id, genre_id, \
     publisher_id, price, quantity, created_on, updated_on";

// $1 name, $2 author, $3 isbn, $4 book type, $5 genre. NULL parameters
// never constrain, mirroring BookFilters::matches.
const BOOK_FILTER_WHERE: &str = "($1::text IS NULL OR name ILIKE '%' || $1 || '%') \
     AND ($2::text IS NULL OR author ILIKE '%' || $2 || '%') \
     AND ($3::text IS NULL OR isbn = $3) \
     AND ($4::int IS NULL OR book_type_id = $4) \
     AND ($5::int IS NULL OR genre_id = $5)";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` book queries.
#[derive(Debug, sqlx::FromRow)]
struct BookRow {
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
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Self {
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
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Book catalog repository for `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PgBookRepository {
    pool: PgPool,
    op_timeout: Duration,
}

impl PgBookRepository {
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
impl BookRepository for PgBookRepository {
    async fn add(&self, book: NewBook) -> Result<Book, RepositoryError> {
        timed(self.op_timeout, async {
            let sql = format!(
                "INSERT INTO books \
                     (name, author, isbn, book_type_id, condition_id, genre_id, \
                      publisher_id, price, quantity) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
                 RETURNING {BOOK_COLUMNS}"
            );

            let row = sqlx::query_as::<_, BookRow>(&sql)
                .bind(&book.name)
                .bind(&book.author)
                .bind(&book.isbn)
                .bind(book.book_type_id.as_i32())
                .bind(book.condition_id.as_i32())
                .bind(book.genre_id.as_i32())
                .bind(book.publisher_id.as_i32())
                .bind(book.price)
                .bind(book.quantity)
                .fetch_one(&self.pool)
                .await?;

            Ok(row.into())
        })
        .await
    }

    async fn get(&self, id: BookId) -> Result<Option<Book>, RepositoryError> {
        timed(self.op_timeout, async {
            let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = $1");

            let row = sqlx::query_as::<_, BookRow>(&sql)
                .bind(id.as_i32())
                .fetch_optional(&self.pool)
                .await?;

            Ok(row.map(Book::from))
        })
        .await
    }

    async fn get_many(&self, ids: &[BookId]) -> Result<Vec<Book>, RepositoryError> {
        timed(self.op_timeout, async {
            if ids.is_empty() {
                return Ok(Vec::new());
            }

            let ids: Vec<i32> = ids.iter().map(|id| id.as_i32()).collect();
            let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = ANY($1) ORDER BY id");

            let rows = sqlx::query_as::<_, BookRow>(&sql)
                .bind(&ids)
                .fetch_all(&self.pool)
                .await?;

            Ok(rows.into_iter().map(Book::from).collect())
        })
        .await
    }

    async fn list(
        &self,
        filters: &BookFilters,
        page: PageRequest,
    ) -> Result<PaginatedResult<Book>, RepositoryError> {
        timed(self.op_timeout, async {
            let name = filters.name.as_deref();
            let author = filters.author.as_deref();
            let isbn = filters.isbn.as_deref();
            let book_type_id = filters.book_type_id.map(|id| id.as_i32());
            let genre_id = filters.genre_id.map(|id| id.as_i32());

            let count_sql = format!("SELECT COUNT(*) FROM books WHERE {BOOK_FILTER_WHERE}");
            let total: i64 = sqlx::query_scalar(&count_sql)
                .bind(name)
                .bind(author)
                .bind(isbn)
                .bind(book_type_id)
                .bind(genre_id)
                .fetch_one(&self.pool)
                .await?;

            let list_sql = format!(
                "SELECT {BOOK_COLUMNS} FROM books WHERE {BOOK_FILTER_WHERE} \
                 ORDER BY created_on DESC, id DESC LIMIT $6 OFFSET $7"
            );
            let rows = sqlx::query_as::<_, BookRow>(&list_sql)
                .bind(name)
                .bind(author)
                .bind(isbn)
                .bind(book_type_id)
                .bind(genre_id)
                .bind(page.limit())
                .bind(page.offset())
                .fetch_all(&self.pool)
                .await?;

            Ok(PaginatedResult::from_page(
                rows.into_iter().map(Book::from).collect(),
                u64::try_from(total).unwrap_or_default(),
                page,
            ))
        })
        .await
    }

    async fn update_price(&self, id: BookId, price: Decimal) -> Result<Book, RepositoryError> {
        timed(self.op_timeout, async {
            let sql = format!(
                "UPDATE books SET price = $2, updated_on = NOW() \
                 WHERE id = $1 RETURNING {BOOK_COLUMNS}"
            );

            let row = sqlx::query_as::<_, BookRow>(&sql)
                .bind(id.as_i32())
                .bind(price)
                .fetch_optional(&self.pool)
                .await?;

            row.map(Book::from).ok_or(RepositoryError::NotFound)
        })
        .await
    }
}
