//! Core types for Folio.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod contact;
pub mod id;
pub mod identity;
pub mod status;

pub use contact::{Email, EmailError, Phone, PhoneError};
pub use id::*;
pub use identity::{CorrelationId, Sub};
pub use status::*;
