//! Folio Domain - bookstore services and persistence.
//!
//! This crate is the layer between web-facing controllers and the
//! persisted store: querying, filtering, pagination, and entity state
//! transitions. It consumes an authenticated identity subject and a
//! persistence backend, and exposes plain data to a presentation layer;
//! it never renders pages or routes requests.
//!
//! # Modules
//!
//! - [`models`] - Entities, write inputs, filters, and statistics
//! - [`db`] - Repository traits plus the Postgres and in-memory backends
//! - [`services`] - Domain services consumed by the presentation layer
//! - [`error`] - The service-level error type
//!
//! # Construction
//!
//! Services receive their repositories as `Arc<dyn Trait>` handles;
//! wiring is explicit at the composition root, there is no process-wide
//! registry.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use error::DomainError;
