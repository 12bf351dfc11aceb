//! Dashboard counters, printed from the command line.

use secrecy::SecretString;
use tracing::info;

use folio_core::calendar::start_of_month;
use folio_domain::db::{
    self, OfferRepository, OrderRepository, PgOfferRepository, PgOrderRepository,
};

/// Print offer moderation and order fulfillment counters.
///
/// # Errors
///
/// Returns an error if `DATABASE_URL` is unset, the database cannot be
/// reached, or a query fails.
pub async fn overview() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| "DATABASE_URL not set")?;

    let pool = db::create_pool(&database_url).await?;

    let now = chrono::Utc::now();
    let month_start = start_of_month(now);

    let offers = PgOfferRepository::new(pool.clone());
    let orders = PgOrderRepository::new(pool);

    let offer_stats = offers.statistics(month_start).await?;
    let order_stats = orders.statistics(now, month_start).await?;

    info!("Folio Statistics");
    info!("================");
    info!("Offers pending review: {}", offer_stats.pending_offers);
    info!("Offers this month: {}", offer_stats.offers_this_month);
    info!("Offers total: {}", offer_stats.offers_total);
    info!("Orders pending: {}", order_stats.pending_orders);
    info!("Orders past due: {}", order_stats.past_due_orders);
    info!("Orders this month: {}", order_stats.orders_this_month);
    info!("Orders total: {}", order_stats.orders_total);

    Ok(())
}
