//! Folio Core - Shared types library.
//!
//! This crate provides common types used across all Folio components:
//! - `domain` - Bookstore services, repositories, and persistence
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure helpers - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, identity tokens, contact
//!   details, and statuses
//! - [`pagination`] - The single page request / paginated result contract
//! - [`calendar`] - UTC day and month boundary helpers for date-scoped queries

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod calendar;
pub mod pagination;
pub mod types;

pub use pagination::{PageRequest, PageRequestError, PaginatedResult};
pub use types::*;
