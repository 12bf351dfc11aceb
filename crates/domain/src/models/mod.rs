//! Domain models: entities, write inputs, filters, and statistics.
//!
//! Filter types expose pure `matches` predicates; the in-memory backend
//! applies them directly and the Postgres backend mirrors them in SQL, so
//! both stores answer queries identically.

pub mod address;
pub mod book;
pub mod cart;
pub mod customer;
pub mod offer;
pub mod order;
pub mod reference_data;

pub use address::{Address, NewAddress};
pub use book::{Book, BookFilters, NewBook};
pub use cart::{CartLine, ShoppingCart, ShoppingCartItem, ShoppingCartView};
pub use customer::{Customer, CustomerProfile};
pub use offer::{NewOffer, Offer, OfferFilters, OfferStatistics};
pub use order::{
    BestSellingBook, Order, OrderFilters, OrderItem, OrderPlacement, OrderStatistics,
};
pub use reference_data::{ReferenceDataFilters, ReferenceDataItem};

/// Case-insensitive substring test shared by the text filters.
pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
