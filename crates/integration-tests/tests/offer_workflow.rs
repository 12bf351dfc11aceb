//! Integration tests for the resale offer workflow.
//!
//! These tests exercise submission, moderation, filtering, and pagination
//! through the domain services over the in-memory backend, without
//! requiring a database.

use rust_decimal::Decimal;

use folio_core::{OfferStatus, ReferenceDataType, Sub};
use folio_domain::DomainError;
use folio_domain::models::{NewOffer, OfferFilters};
use folio_integration_tests::{ReferenceIds, TestBackend};

/// Test helper: an offer for a used copy, priced at 12.50.
fn new_offer(book_name: &str, author: &str, refs: ReferenceIds) -> NewOffer {
    NewOffer {
        book_name: book_name.to_owned(),
        author: author.to_owned(),
        isbn: "978-0-00-000000-0".to_owned(),
        book_type_id: refs.book_type,
        condition_id: refs.condition,
        genre_id: refs.genre,
        publisher_id: refs.publisher,
        price: Decimal::new(1250, 2),
    }
}

// ============================================================================
// Submission Tests
// ============================================================================

#[tokio::test]
async fn test_submitted_offer_starts_pending() {
    let backend = TestBackend::new();
    let refs = backend.seed_reference_data().await;
    let sub = Sub::new("auth0|seller");
    backend.seed_customer(&sub, "seller").await;

    let offers = backend.offer_service();
    let offer = offers
        .create_offer(&sub, new_offer("The Hobbit", "J.R.R. Tolkien", refs))
        .await
        .expect("Failed to submit offer");

    assert_eq!(offer.status, OfferStatus::PendingApproval);
    assert_eq!(offer.row_version, 1);

    let mine = offers
        .list_offers_for_customer(&sub)
        .await
        .expect("Failed to list own offers");
    assert_eq!(mine.len(), 1);
    assert_eq!(mine.first().map(|o| o.id), Some(offer.id));
}

#[tokio::test]
async fn test_submission_requires_customer_record() {
    let backend = TestBackend::new();
    let refs = backend.seed_reference_data().await;

    let result = backend
        .offer_service()
        .create_offer(
            &Sub::new("auth0|stranger"),
            new_offer("The Hobbit", "J.R.R. Tolkien", refs),
        )
        .await;

    assert!(matches!(result, Err(DomainError::NotFound(_))));
}

#[tokio::test]
async fn test_negative_asking_price_rejected() {
    let backend = TestBackend::new();
    let refs = backend.seed_reference_data().await;
    let sub = Sub::new("auth0|seller");
    backend.seed_customer(&sub, "seller").await;

    let mut offer = new_offer("The Hobbit", "J.R.R. Tolkien", refs);
    offer.price = Decimal::new(-100, 2);

    let result = backend.offer_service().create_offer(&sub, offer).await;
    assert!(matches!(result, Err(DomainError::InvalidArgument(_))));
}

#[tokio::test]
async fn test_unknown_subject_has_no_offers() {
    let backend = TestBackend::new();

    let mine = backend
        .offer_service()
        .list_offers_for_customer(&Sub::new("auth0|nobody"))
        .await
        .expect("Listing for an unknown subject should succeed");

    assert!(mine.is_empty());
}

// ============================================================================
// Moderation Tests
// ============================================================================

#[tokio::test]
async fn test_approve_pending_offer() {
    let backend = TestBackend::new();
    let refs = backend.seed_reference_data().await;
    let sub = Sub::new("auth0|seller");
    backend.seed_customer(&sub, "seller").await;

    let offers = backend.offer_service();
    let offer = offers
        .create_offer(&sub, new_offer("The Hobbit", "J.R.R. Tolkien", refs))
        .await
        .expect("Failed to submit offer");

    let approved = offers
        .update_offer_status(offer.id, OfferStatus::Approved)
        .await
        .expect("Failed to approve offer");

    assert_eq!(approved.status, OfferStatus::Approved);
    assert_eq!(approved.row_version, offer.row_version + 1);
}

#[tokio::test]
async fn test_rejected_offer_cannot_be_approved() {
    let backend = TestBackend::new();
    let refs = backend.seed_reference_data().await;
    let sub = Sub::new("auth0|seller");
    backend.seed_customer(&sub, "seller").await;

    let offers = backend.offer_service();
    let offer = offers
        .create_offer(&sub, new_offer("The Hobbit", "J.R.R. Tolkien", refs))
        .await
        .expect("Failed to submit offer");

    offers
        .update_offer_status(offer.id, OfferStatus::Rejected)
        .await
        .expect("Failed to reject offer");

    let result = offers
        .update_offer_status(offer.id, OfferStatus::Approved)
        .await;
    assert!(matches!(result, Err(DomainError::InvalidOperation(_))));
}

#[tokio::test]
async fn test_reapplying_current_status_is_a_noop() {
    let backend = TestBackend::new();
    let refs = backend.seed_reference_data().await;
    let sub = Sub::new("auth0|seller");
    backend.seed_customer(&sub, "seller").await;

    let offers = backend.offer_service();
    let offer = offers
        .create_offer(&sub, new_offer("The Hobbit", "J.R.R. Tolkien", refs))
        .await
        .expect("Failed to submit offer");

    let unchanged = offers
        .update_offer_status(offer.id, OfferStatus::PendingApproval)
        .await
        .expect("Re-applying the current status should succeed");

    assert_eq!(unchanged.status, OfferStatus::PendingApproval);
    assert_eq!(unchanged.row_version, offer.row_version);
}

#[tokio::test]
async fn test_moderating_unknown_offer_not_found() {
    let backend = TestBackend::new();

    let result = backend
        .offer_service()
        .update_offer_status(folio_core::OfferId::new(404), OfferStatus::Approved)
        .await;

    assert!(matches!(result, Err(DomainError::NotFound(_))));
}

// ============================================================================
// Filter & Pagination Tests
// ============================================================================

#[tokio::test]
async fn test_offer_list_pagination_window() {
    let backend = TestBackend::new();
    let refs = backend.seed_reference_data().await;
    let sub = Sub::new("auth0|seller");
    backend.seed_customer(&sub, "seller").await;

    let offers = backend.offer_service();
    for i in 0..15 {
        offers
            .create_offer(&sub, new_offer(&format!("Book {i}"), "J.R.R. Tolkien", refs))
            .await
            .expect("Failed to submit offer");
    }
    // Noise on each filtered axis: wrong author, then wrong condition.
    for i in 0..3 {
        offers
            .create_offer(&sub, new_offer(&format!("Other {i}"), "Jane Austen", refs))
            .await
            .expect("Failed to submit offer");
    }
    let worn = backend
        .add_reference(ReferenceDataType::Condition, "Worn")
        .await;
    let mut worn_offer = new_offer("Worn Book", "J.R.R. Tolkien", refs);
    worn_offer.condition_id = worn;
    offers
        .create_offer(&sub, worn_offer)
        .await
        .expect("Failed to submit offer");

    let filters = OfferFilters {
        author: Some("tolkien".to_owned()),
        condition_id: Some(refs.condition),
        ..OfferFilters::default()
    };

    let first = offers
        .list_offers(&filters, 1, 10)
        .await
        .expect("Failed to list page 1");
    assert_eq!(first.items.len(), 10);
    assert_eq!(first.total_count, 15);
    assert_eq!(first.total_pages(), 2);
    assert!(!first.has_previous_page());
    assert!(first.has_next_page());

    let second = offers
        .list_offers(&filters, 2, 10)
        .await
        .expect("Failed to list page 2");
    assert_eq!(second.items.len(), 5);
    assert_eq!(second.total_count, 15);
    assert!(second.has_previous_page());
    assert!(!second.has_next_page());

    // Pages past the end are empty, not errors.
    let third = offers
        .list_offers(&filters, 3, 10)
        .await
        .expect("Failed to list page 3");
    assert!(third.items.is_empty());
    assert_eq!(third.total_count, 15);
}

#[tokio::test]
async fn test_offer_filters_and_compose() {
    let backend = TestBackend::new();
    let refs = backend.seed_reference_data().await;
    let sub = Sub::new("auth0|seller");
    backend.seed_customer(&sub, "seller").await;

    let offers = backend.offer_service();
    let keep = offers
        .create_offer(&sub, new_offer("The Hobbit", "J.R.R. Tolkien", refs))
        .await
        .expect("Failed to submit offer");
    let approved = offers
        .create_offer(&sub, new_offer("Silmarillion", "J.R.R. Tolkien", refs))
        .await
        .expect("Failed to submit offer");
    offers
        .update_offer_status(approved.id, OfferStatus::Approved)
        .await
        .expect("Failed to approve offer");

    let filters = OfferFilters {
        author: Some("tolkien".to_owned()),
        status: Some(OfferStatus::PendingApproval),
        ..OfferFilters::default()
    };

    let page = offers
        .list_offers(&filters, 1, 10)
        .await
        .expect("Failed to list offers");
    assert_eq!(page.total_count, 1);
    assert_eq!(page.items.first().map(|o| o.id), Some(keep.id));
}

#[tokio::test]
async fn test_zero_page_index_rejected() {
    let backend = TestBackend::new();

    let result = backend
        .offer_service()
        .list_offers(&OfferFilters::default(), 0, 10)
        .await;

    assert!(matches!(result, Err(DomainError::InvalidArgument(_))));
}

// ============================================================================
// Statistics Tests
// ============================================================================

#[tokio::test]
async fn test_statistics_over_no_offers_are_zero() {
    let backend = TestBackend::new();

    let stats = backend
        .offer_service()
        .statistics()
        .await
        .expect("Statistics over an empty store should succeed");

    assert_eq!(stats.pending_offers, 0);
    assert_eq!(stats.offers_this_month, 0);
    assert_eq!(stats.offers_total, 0);
}

#[tokio::test]
async fn test_offer_statistics_count_by_status() {
    let backend = TestBackend::new();
    let refs = backend.seed_reference_data().await;
    let sub = Sub::new("auth0|seller");
    backend.seed_customer(&sub, "seller").await;

    let offers = backend.offer_service();
    for i in 0..2 {
        offers
            .create_offer(&sub, new_offer(&format!("Pending {i}"), "J.R.R. Tolkien", refs))
            .await
            .expect("Failed to submit offer");
    }
    let approved = offers
        .create_offer(&sub, new_offer("Approved one", "J.R.R. Tolkien", refs))
        .await
        .expect("Failed to submit offer");
    offers
        .update_offer_status(approved.id, OfferStatus::Approved)
        .await
        .expect("Failed to approve offer");

    let stats = offers.statistics().await.expect("Failed to read statistics");
    assert_eq!(stats.pending_offers, 2);
    assert_eq!(stats.offers_this_month, 3);
    assert_eq!(stats.offers_total, 3);
}
