//! Postgres round-trips for the repository layer.
//!
//! These tests require:
//! - A running `PostgreSQL` database
//! - `DATABASE_URL` pointing at it
//!
//! Migrations are applied on connect, and every test writes rows under
//! fresh UUID markers, so the suite can run repeatedly against the same
//! database. Run with:
//!
//! ```bash
//! cargo test -p folio-integration-tests -- --ignored
//! ```

use rust_decimal::Decimal;
use secrecy::SecretString;
use sqlx::PgPool;
use uuid::Uuid;

use folio_core::{
    AddressId, CorrelationId, CustomerId, Email, OfferStatus, OrderStatus, PageRequest,
    ReferenceDataId, ReferenceDataType, Sub,
};
use folio_domain::db::{
    self, AddressRepository, BookRepository, CustomerRepository, OfferRepository, OrderRepository,
    PgAddressRepository, PgBookRepository, PgCustomerRepository, PgOfferRepository,
    PgOrderRepository, PgReferenceDataRepository, PgShoppingCartRepository,
    ReferenceDataRepository, RepositoryError, ShoppingCartRepository,
};
use folio_domain::models::{
    Book, BookFilters, CustomerProfile, NewAddress, NewBook, NewOffer, OrderPlacement,
};

/// Connect and bring the schema up to date.
async fn test_pool() -> PgPool {
    let database_url = std::env::var("DATABASE_URL")
        .map(SecretString::from)
        .expect("DATABASE_URL must be set for Postgres tests");
    let pool = db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    db::MIGRATOR
        .run(&pool)
        .await
        .expect("Failed to apply migrations");
    pool
}

/// Test helper: a profile for `username`.
fn profile(username: &str) -> CustomerProfile {
    CustomerProfile {
        username: username.to_owned(),
        first_name: "Round".to_owned(),
        last_name: "Trip".to_owned(),
        email: Email::parse(&format!("{username}@example.com")).expect("test email should parse"),
        phone: None,
    }
}

/// Test helper: one reference value per category, unique per `marker`.
async fn seed_references(
    reference_data: &PgReferenceDataRepository,
    marker: &str,
) -> (
    ReferenceDataId,
    ReferenceDataId,
    ReferenceDataId,
    ReferenceDataId,
) {
    let book_type = reference_data
        .add(ReferenceDataType::BookType, format!("type-{marker}"))
        .await
        .expect("Failed to add book type");
    let condition = reference_data
        .add(ReferenceDataType::Condition, format!("condition-{marker}"))
        .await
        .expect("Failed to add condition");
    let genre = reference_data
        .add(ReferenceDataType::Genre, format!("genre-{marker}"))
        .await
        .expect("Failed to add genre");
    let publisher = reference_data
        .add(ReferenceDataType::Publisher, format!("publisher-{marker}"))
        .await
        .expect("Failed to add publisher");
    (book_type.id, condition.id, genre.id, publisher.id)
}

/// Test helper: a book priced at 19.99 under `marker`.
async fn seed_book(pool: PgPool, marker: &str) -> Book {
    let reference_data = PgReferenceDataRepository::new(pool.clone());
    let books = PgBookRepository::new(pool);
    let (book_type_id, condition_id, genre_id, publisher_id) =
        seed_references(&reference_data, marker).await;

    books
        .add(NewBook {
            name: format!("Integration {marker}"),
            author: format!("Author {marker}"),
            isbn: format!("isbn-{marker}"),
            book_type_id,
            condition_id,
            genre_id,
            publisher_id,
            price: Decimal::new(1999, 2),
            quantity: 4,
        })
        .await
        .expect("Failed to add book")
}

/// Test helper: customer plus one active address.
async fn seed_buyer(pool: PgPool, marker: &str) -> (CustomerId, AddressId) {
    let customers = PgCustomerRepository::new(pool.clone());
    let addresses = PgAddressRepository::new(pool);

    let sub = Sub::new(format!("auth0|{marker}"));
    let customer = customers
        .upsert(&sub, profile(&format!("buyer-{marker}")))
        .await
        .expect("Failed to upsert customer");
    let address = addresses
        .add(
            customer.id,
            NewAddress {
                address_line1: "12 Shelf Road".to_owned(),
                address_line2: None,
                city: "Portland".to_owned(),
                state: "OR".to_owned(),
                country: "USA".to_owned(),
                zip_code: "97201".to_owned(),
            },
        )
        .await
        .expect("Failed to add address");
    (customer.id, address.id)
}

// ============================================================================
// Customer Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_customer_upsert_keyed_by_subject() {
    let pool = test_pool().await;
    let customers = PgCustomerRepository::new(pool);

    let marker = Uuid::new_v4().simple().to_string();
    let sub = Sub::new(format!("auth0|{marker}"));

    let created = customers
        .upsert(&sub, profile(&format!("ana-{marker}")))
        .await
        .expect("Failed to create customer");
    let updated = customers
        .upsert(&sub, profile(&format!("ana-renamed-{marker}")))
        .await
        .expect("Failed to update customer");

    assert_eq!(updated.id, created.id, "Upsert must keep the row");
    assert_eq!(updated.username, format!("ana-renamed-{marker}"));
    assert_eq!(updated.sub, sub);

    let fetched = customers
        .get_by_sub(&sub)
        .await
        .expect("Failed to fetch customer");
    assert_eq!(fetched.map(|c| c.id), Some(created.id));
}

// ============================================================================
// Catalog Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_book_filters_round_trip() {
    let pool = test_pool().await;
    let books = PgBookRepository::new(pool.clone());

    let marker = Uuid::new_v4().simple().to_string();
    let created = seed_book(pool, &marker).await;
    let page = PageRequest::new(1, 10).expect("valid page");

    // Author matches a case-insensitive substring.
    let by_author = books
        .list(
            &BookFilters {
                author: Some(format!("Author {marker}").to_uppercase()),
                ..Default::default()
            },
            page,
        )
        .await
        .expect("Failed to list by author");
    assert_eq!(by_author.total_count, 1);
    assert_eq!(by_author.items.first().map(|b| b.id), Some(created.id));

    // ISBN matches exactly.
    let by_isbn = books
        .list(
            &BookFilters {
                isbn: Some(format!("isbn-{marker}")),
                ..Default::default()
            },
            page,
        )
        .await
        .expect("Failed to list by isbn");
    assert_eq!(by_isbn.total_count, 1);

    let partial: String = marker.chars().take(8).collect();
    let by_partial_isbn = books
        .list(
            &BookFilters {
                isbn: Some(format!("isbn-{partial}")),
                ..Default::default()
            },
            page,
        )
        .await
        .expect("Failed to list by partial isbn");
    assert_eq!(by_partial_isbn.total_count, 0, "ISBN must not substring-match");
}

// ============================================================================
// Offer Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_offer_version_guard() {
    let pool = test_pool().await;
    let reference_data = PgReferenceDataRepository::new(pool.clone());
    let offers = PgOfferRepository::new(pool.clone());

    let marker = Uuid::new_v4().simple().to_string();
    let (customer_id, _) = seed_buyer(pool, &marker).await;
    let (book_type_id, condition_id, genre_id, publisher_id) =
        seed_references(&reference_data, &marker).await;

    let offer = offers
        .add(
            customer_id,
            NewOffer {
                book_name: format!("Offered {marker}"),
                author: format!("Author {marker}"),
                isbn: format!("isbn-offer-{marker}"),
                book_type_id,
                condition_id,
                genre_id,
                publisher_id,
                price: Decimal::new(1250, 2),
            },
        )
        .await
        .expect("Failed to add offer");
    assert_eq!(offer.status, OfferStatus::PendingApproval);

    let approved = offers
        .update_status(offer.id, OfferStatus::Approved, offer.row_version)
        .await
        .expect("Failed to approve offer");
    assert_eq!(approved.status, OfferStatus::Approved);
    assert_eq!(approved.row_version, offer.row_version + 1);

    // A write against the old version loses.
    let stale = offers
        .update_status(offer.id, OfferStatus::Rejected, offer.row_version)
        .await;
    assert!(matches!(stale, Err(RepositoryError::Conflict(_))));
}

// ============================================================================
// Cart & Order Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_cart_to_order_round_trip() {
    let pool = test_pool().await;
    let carts = PgShoppingCartRepository::new(pool.clone());
    let orders = PgOrderRepository::new(pool.clone());

    let marker = Uuid::new_v4().simple().to_string();
    let (customer_id, address_id) = seed_buyer(pool.clone(), &marker).await;
    let book = seed_book(pool, &marker).await;

    let correlation_id = CorrelationId::generate();
    carts
        .add_item(correlation_id, book.id, 2)
        .await
        .expect("Failed to add to cart");
    let merged = carts
        .add_item(correlation_id, book.id, 1)
        .await
        .expect("Failed to add to cart");
    assert_eq!(merged.quantity, 3, "Same book must merge into one line");

    let cart = carts
        .find_cart(correlation_id)
        .await
        .expect("Failed to find cart")
        .expect("Cart should exist after adding");

    let order = orders
        .place(OrderPlacement {
            customer_id,
            address_id,
            cart_id: cart.id,
        })
        .await
        .expect("Failed to place order");

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items.first().map(|i| i.quantity), Some(3));
    assert_eq!(order.total(), Decimal::new(5997, 2));

    let view = carts
        .get_view(correlation_id)
        .await
        .expect("Failed to read cart");
    assert!(view.is_empty(), "Placement must clear the cart");

    // Status moves compare-and-swap on the current status.
    let confirmed = orders
        .update_status(order.id, OrderStatus::Pending, OrderStatus::Ordered, None)
        .await
        .expect("Failed to confirm order");
    assert_eq!(confirmed.status, OrderStatus::Ordered);

    let stale = orders
        .update_status(order.id, OrderStatus::Pending, OrderStatus::Cancelled, None)
        .await;
    assert!(matches!(stale, Err(RepositoryError::Conflict(_))));
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_placing_from_emptied_cart_conflicts() {
    let pool = test_pool().await;
    let carts = PgShoppingCartRepository::new(pool.clone());
    let orders = PgOrderRepository::new(pool.clone());

    let marker = Uuid::new_v4().simple().to_string();
    let (customer_id, address_id) = seed_buyer(pool.clone(), &marker).await;
    let book = seed_book(pool, &marker).await;

    let correlation_id = CorrelationId::generate();
    let line = carts
        .add_item(correlation_id, book.id, 1)
        .await
        .expect("Failed to add to cart");
    let cart = carts
        .find_cart(correlation_id)
        .await
        .expect("Failed to find cart")
        .expect("Cart should exist after adding");

    carts
        .remove_item(correlation_id, line.id)
        .await
        .expect("Failed to remove line");

    let result = orders
        .place(OrderPlacement {
            customer_id,
            address_id,
            cart_id: cart.id,
        })
        .await;
    assert!(matches!(result, Err(RepositoryError::Conflict(_))));
}
