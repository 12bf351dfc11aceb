//! Integration tests for the customer address book.
//!
//! These tests verify soft deletion and per-customer visibility through
//! the address service over the in-memory backend.

use rust_decimal::Decimal;

use folio_core::{AddressId, CorrelationId, Sub};
use folio_domain::DomainError;
use folio_domain::models::NewAddress;
use folio_integration_tests::TestBackend;

/// Test helper: an address at `street`.
fn address_at(street: &str) -> NewAddress {
    NewAddress {
        address_line1: street.to_owned(),
        address_line2: None,
        city: "Portland".to_owned(),
        state: "OR".to_owned(),
        country: "USA".to_owned(),
        zip_code: "97201".to_owned(),
    }
}

// ============================================================================
// Create & List Tests
// ============================================================================

#[tokio::test]
async fn test_addresses_list_oldest_first() {
    let backend = TestBackend::new();
    let sub = Sub::new("auth0|mover");
    backend.seed_customer(&sub, "mover").await;

    let addresses = backend.address_service();
    let first = addresses
        .create_address(&sub, address_at("1 Old Place"))
        .await
        .expect("Failed to add address");
    let second = addresses
        .create_address(&sub, address_at("2 New Place"))
        .await
        .expect("Failed to add address");

    let listed = addresses
        .list_addresses(&sub)
        .await
        .expect("Failed to list addresses");
    let ids: Vec<AddressId> = listed.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);
}

#[tokio::test]
async fn test_create_requires_customer_record() {
    let backend = TestBackend::new();

    let result = backend
        .address_service()
        .create_address(&Sub::new("auth0|stranger"), address_at("1 Nowhere"))
        .await;

    assert!(matches!(result, Err(DomainError::NotFound(_))));
}

#[tokio::test]
async fn test_unknown_subject_has_no_addresses() {
    let backend = TestBackend::new();

    let listed = backend
        .address_service()
        .list_addresses(&Sub::new("auth0|nobody"))
        .await
        .expect("Listing for an unknown subject should succeed");

    assert!(listed.is_empty());
}

#[tokio::test]
async fn test_addresses_invisible_to_other_customers() {
    let backend = TestBackend::new();
    let owner = Sub::new("auth0|owner");
    let other = Sub::new("auth0|other");
    backend.seed_customer(&owner, "owner").await;
    backend.seed_customer(&other, "other").await;

    let addresses = backend.address_service();
    let address = addresses
        .create_address(&owner, address_at("1 Private Drive"))
        .await
        .expect("Failed to add address");

    let result = addresses.get_address(&other, address.id).await;
    assert!(matches!(result, Err(DomainError::NotFound(_))));

    let listed = addresses
        .list_addresses(&other)
        .await
        .expect("Failed to list addresses");
    assert!(listed.is_empty());
}

// ============================================================================
// Soft Delete Tests
// ============================================================================

#[tokio::test]
async fn test_deleted_address_disappears_from_the_book() {
    let backend = TestBackend::new();
    let sub = Sub::new("auth0|mover");
    backend.seed_customer(&sub, "mover").await;

    let addresses = backend.address_service();
    let keep = addresses
        .create_address(&sub, address_at("1 Kept Street"))
        .await
        .expect("Failed to add address");
    let gone = addresses
        .create_address(&sub, address_at("2 Gone Street"))
        .await
        .expect("Failed to add address");

    addresses
        .delete_address(&sub, gone.id)
        .await
        .expect("Failed to delete address");

    let listed = addresses
        .list_addresses(&sub)
        .await
        .expect("Failed to list addresses");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed.first().map(|a| a.id), Some(keep.id));

    let result = addresses.get_address(&sub, gone.id).await;
    assert!(matches!(result, Err(DomainError::NotFound(_))));
}

#[tokio::test]
async fn test_deleting_twice_not_found() {
    let backend = TestBackend::new();
    let sub = Sub::new("auth0|mover");
    backend.seed_customer(&sub, "mover").await;

    let addresses = backend.address_service();
    let address = addresses
        .create_address(&sub, address_at("1 Brief Street"))
        .await
        .expect("Failed to add address");

    addresses
        .delete_address(&sub, address.id)
        .await
        .expect("Failed to delete address");

    let result = addresses.delete_address(&sub, address.id).await;
    assert!(matches!(result, Err(DomainError::NotFound(_))));
}

#[tokio::test]
async fn test_orders_keep_deleted_addresses() {
    let backend = TestBackend::new();
    let refs = backend.seed_reference_data().await;
    let sub = Sub::new("auth0|mover");
    backend.seed_customer(&sub, "mover").await;
    let book = backend
        .seed_book("The Hobbit", "J.R.R. Tolkien", Decimal::new(1499, 2), refs)
        .await;

    let addresses = backend.address_service();
    let address = addresses
        .create_address(&sub, address_at("1 Former Home"))
        .await
        .expect("Failed to add address");

    let correlation_id = CorrelationId::generate();
    backend
        .cart_service()
        .add_to_cart(correlation_id, book.id, 1)
        .await
        .expect("Failed to add to cart");
    let order = backend
        .order_service()
        .place_order(&sub, correlation_id, address.id)
        .await
        .expect("Failed to place order");

    addresses
        .delete_address(&sub, address.id)
        .await
        .expect("Failed to delete address");

    // The order still points at the address; only the address book stops
    // offering it.
    let stored = backend
        .order_service()
        .get_order(order.id)
        .await
        .expect("Failed to fetch order");
    assert_eq!(stored.address_id, address.id);

    let listed = addresses
        .list_addresses(&sub)
        .await
        .expect("Failed to list addresses");
    assert!(listed.is_empty());
}
