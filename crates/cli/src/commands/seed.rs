//! Seed the catalog from a YAML file.
//!
//! The file lists reference data values (grouped by category) and books.
//! Values that already exist are kept, and books are matched by ISBN, so
//! re-running the command with the same file is safe.

use std::collections::HashMap;
use std::path::Path;

use rust_decimal::Decimal;
use secrecy::SecretString;
use serde::Deserialize;
use tracing::{error, info};

use folio_core::{PageRequest, ReferenceDataId, ReferenceDataType};
use folio_domain::db::{
    self, BookRepository, PgBookRepository, PgReferenceDataRepository, ReferenceDataRepository,
    RepositoryError,
};
use folio_domain::models::{BookFilters, NewBook};

/// Root of the seed file.
#[derive(Debug, Deserialize)]
pub struct CatalogSeed {
    /// Lookup values, grouped by category.
    #[serde(default)]
    pub reference_data: ReferenceDataSeed,
    /// Books to add to the catalog.
    #[serde(default)]
    pub books: Vec<BookSeed>,
}

/// Reference data sections of the seed file.
#[derive(Debug, Default, Deserialize)]
pub struct ReferenceDataSeed {
    /// Bindings and formats.
    #[serde(default)]
    pub book_types: Vec<String>,
    /// Condition grades.
    #[serde(default)]
    pub conditions: Vec<String>,
    /// Genres.
    #[serde(default)]
    pub genres: Vec<String>,
    /// Publishing houses.
    #[serde(default)]
    pub publishers: Vec<String>,
}

/// One book entry in the seed file.
///
/// Reference fields name values from the `reference_data` sections (or
/// values already stored).
#[derive(Debug, Deserialize)]
pub struct BookSeed {
    /// Title.
    pub name: String,
    /// Author name.
    pub author: String,
    /// ISBN as printed. Books are matched on this across runs.
    pub isbn: String,
    /// Book type value, e.g. `Hardcover`.
    pub book_type: String,
    /// Condition value, e.g. `New`.
    pub condition: String,
    /// Genre value.
    pub genre: String,
    /// Publisher value.
    pub publisher: String,
    /// List price, quoted in the YAML so it parses as a string.
    pub price: Decimal,
    /// Copies on hand.
    pub quantity: i32,
}

/// Load reference data and books from a YAML file.
///
/// # Arguments
///
/// * `file_path` - Path to the YAML seed file
///
/// # Errors
///
/// Returns an error if environment variables are missing, the file cannot
/// be read or parsed, or a database operation fails.
pub async fn catalog(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| "DATABASE_URL not set")?;

    // Verify file exists
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading catalog seed from file");

    // Read and validate YAML before connecting to database
    let content = tokio::fs::read_to_string(path).await?;
    let seed: CatalogSeed = serde_yaml::from_str(&content)?;

    info!(books = seed.books.len(), "Parsed seed file");

    let errors = validate(&seed);
    if !errors.is_empty() {
        error!("Seed file validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    // Connect to database
    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let reference_data = PgReferenceDataRepository::new(pool.clone());
    let books = PgBookRepository::new(pool);

    let mut lookup = existing_values(&reference_data).await?;
    let mut values_inserted = 0_usize;
    let mut values_skipped = 0_usize;

    for (data_type, values) in sections(&seed.reference_data) {
        for value in values {
            if lookup.contains_key(&(data_type, value.clone())) {
                values_skipped += 1;
                continue;
            }
            let item = reference_data.add(data_type, value.clone()).await?;
            lookup.insert((data_type, item.value), item.id);
            values_inserted += 1;
        }
    }

    let mut books_inserted = 0_usize;
    let mut books_skipped = 0_usize;
    let mut failures: Vec<(String, String)> = Vec::new();

    for entry in seed.books {
        if book_exists(&books, &entry.isbn).await? {
            books_skipped += 1;
            continue;
        }
        match new_book(&entry, &lookup) {
            Ok(book) => {
                books.add(book).await?;
                books_inserted += 1;
            }
            Err(reason) => failures.push((entry.name, reason)),
        }
    }

    // Print summary
    info!("Seeding complete!");
    info!("  Reference values inserted: {values_inserted}");
    info!("  Reference values skipped (already exist): {values_skipped}");
    info!("  Books inserted: {books_inserted}");
    info!("  Books skipped (already exist): {books_skipped}");

    if !failures.is_empty() {
        error!("  Failures: {}", failures.len());
        for (name, reason) in &failures {
            error!("    - {name}: {reason}");
        }
    }

    Ok(())
}

/// Check a parsed seed file for entries that can never insert cleanly.
fn validate(seed: &CatalogSeed) -> Vec<String> {
    let mut errors = Vec::new();

    for (index, book) in seed.books.iter().enumerate() {
        let position = index + 1;
        if book.name.trim().is_empty() {
            errors.push(format!("book #{position}: name is blank"));
        }
        if book.author.trim().is_empty() {
            errors.push(format!("book #{position}: author is blank"));
        }
        if book.isbn.trim().is_empty() {
            errors.push(format!("book #{position}: isbn is blank"));
        }
        if book.price < Decimal::ZERO {
            errors.push(format!(
                "book #{position} ({}): price is negative",
                book.name
            ));
        }
        if book.quantity < 0 {
            errors.push(format!(
                "book #{position} ({}): quantity is negative",
                book.name
            ));
        }
    }

    errors
}

/// Map every stored reference value to its ID.
async fn existing_values(
    repo: &PgReferenceDataRepository,
) -> Result<HashMap<(ReferenceDataType, String), ReferenceDataId>, RepositoryError> {
    let mut lookup = HashMap::new();
    for item in repo.list_all().await? {
        lookup.insert((item.data_type, item.value), item.id);
    }
    Ok(lookup)
}

/// Pair each seed section with its reference data category.
fn sections(seed: &ReferenceDataSeed) -> [(ReferenceDataType, &[String]); 4] {
    [
        (ReferenceDataType::BookType, seed.book_types.as_slice()),
        (ReferenceDataType::Condition, seed.conditions.as_slice()),
        (ReferenceDataType::Genre, seed.genres.as_slice()),
        (ReferenceDataType::Publisher, seed.publishers.as_slice()),
    ]
}

/// True when a book with this ISBN is already in the catalog.
async fn book_exists(
    repo: &PgBookRepository,
    isbn: &str,
) -> Result<bool, Box<dyn std::error::Error>> {
    let filters = BookFilters {
        isbn: Some(isbn.to_owned()),
        ..BookFilters::default()
    };
    let page = PageRequest::new(1, 1)?;
    let result = repo.list(&filters, page).await?;
    Ok(result.total_count > 0)
}

/// Resolve a seed entry's reference values into a row ready to insert.
fn new_book(
    entry: &BookSeed,
    lookup: &HashMap<(ReferenceDataType, String), ReferenceDataId>,
) -> Result<NewBook, String> {
    let resolve = |data_type: ReferenceDataType, value: &str| {
        lookup
            .get(&(data_type, value.to_owned()))
            .copied()
            .ok_or_else(|| format!("unknown {data_type} value: {value}"))
    };

    Ok(NewBook {
        name: entry.name.clone(),
        author: entry.author.clone(),
        isbn: entry.isbn.clone(),
        book_type_id: resolve(ReferenceDataType::BookType, &entry.book_type)?,
        condition_id: resolve(ReferenceDataType::Condition, &entry.condition)?,
        genre_id: resolve(ReferenceDataType::Genre, &entry.genre)?,
        publisher_id: resolve(ReferenceDataType::Publisher, &entry.publisher)?,
        price: entry.price,
        quantity: entry.quantity,
    })
}
