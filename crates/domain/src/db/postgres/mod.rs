//! `PostgreSQL` repository implementations.
//!
//! All queries use sqlx's runtime API so the crate builds without a
//! database or an offline query cache. Paginated lists build their list
//! and count statements from one shared `WHERE` fragment, which keeps
//! `total_count` counting exactly the filtered set.
//!
//! Every call runs under a bounded timeout; a pool that cannot serve the
//! query in time surfaces [`RepositoryError::Timeout`] instead of hanging
//! the caller.

mod addresses;
mod books;
mod carts;
mod customers;
mod offers;
mod orders;
mod reference_data;

use std::future::Future;
use std::time::Duration;

pub use addresses::PgAddressRepository;
pub use books::PgBookRepository;
pub use carts::PgShoppingCartRepository;
pub use customers::PgCustomerRepository;
pub use offers::PgOfferRepository;
pub use orders::PgOrderRepository;
pub use reference_data::PgReferenceDataRepository;

use super::RepositoryError;

/// Time limit applied to every repository call unless overridden.
pub const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(10);

/// Run `op` under `limit`, mapping elapsed time to
/// [`RepositoryError::Timeout`].
pub(crate) async fn timed<T, F>(limit: Duration, op: F) -> Result<T, RepositoryError>
where
    F: Future<Output = Result<T, RepositoryError>> + Send,
{
    tokio::time::timeout(limit, op)
        .await
        .map_err(|_elapsed| RepositoryError::Timeout)?
}
