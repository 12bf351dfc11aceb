//! Status enums and their transition rules.
//!
//! Transition tables live here, next to the enums, so that every caller
//! (services, both repository backends, tests) consults the same rules.

use serde::{Deserialize, Serialize};

/// Review status of a customer's resale offer.
///
/// Offers start as `PendingApproval`; an administrator then approves or
/// rejects them. Both outcomes are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    /// Submitted by the customer, awaiting administrator review.
    #[default]
    PendingApproval,
    /// Accepted for resale.
    Approved,
    /// Declined for resale.
    Rejected,
}

impl OfferStatus {
    /// Returns true when this status may move to `target`.
    ///
    /// Re-applying the current status is not a transition; callers treat
    /// that as a no-op before consulting this table.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::PendingApproval, Self::Approved | Self::Rejected)
        )
    }

    /// True for statuses that permit no further transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl std::fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PendingApproval => write!(f, "pending_approval"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for OfferStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_approval" => Ok(Self::PendingApproval),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(format!("invalid offer status: {s}")),
        }
    }
}

/// Fulfillment status of a customer order.
///
/// The fulfillment lifecycle is forward-only and stepwise:
/// `Pending → Ordered → Delivered`. `Cancelled` is reachable from either
/// non-terminal status; `Delivered` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Created from a cart, not yet confirmed for fulfillment.
    #[default]
    Pending,
    /// Confirmed and (optionally) scheduled for delivery.
    Ordered,
    /// Cancelled by the customer or an administrator.
    Cancelled,
    /// Delivered to the customer.
    Delivered,
}

impl OrderStatus {
    /// Returns true when this status may move to `target`.
    ///
    /// Re-applying the current status is not a transition; callers treat
    /// that as a no-op before consulting this table.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Ordered | Self::Cancelled)
                | (Self::Ordered, Self::Delivered | Self::Cancelled)
        )
    }

    /// True for statuses that permit no further transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Delivered)
    }

    /// Statuses from which the customer may still cancel.
    ///
    /// Cancellation is additionally gated on the delivery date at the
    /// service layer; this covers only the status dimension.
    #[must_use]
    pub const fn is_cancellable(self) -> bool {
        matches!(self, Self::Pending | Self::Ordered)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Ordered => write!(f, "ordered"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Delivered => write!(f, "delivered"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "ordered" => Ok(Self::Ordered),
            "cancelled" => Ok(Self::Cancelled),
            "delivered" => Ok(Self::Delivered),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Category of a reference-data lookup row.
///
/// Reference data normalizes the descriptive attributes shared by books
/// and resale offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceDataType {
    /// Binding/format of a book (hardcover, paperback, ...).
    BookType,
    /// Physical condition grade for resale copies.
    Condition,
    /// Literary genre.
    Genre,
    /// Publishing house.
    Publisher,
}

impl std::fmt::Display for ReferenceDataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BookType => write!(f, "book_type"),
            Self::Condition => write!(f, "condition"),
            Self::Genre => write!(f, "genre"),
            Self::Publisher => write!(f, "publisher"),
        }
    }
}

impl std::str::FromStr for ReferenceDataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "book_type" => Ok(Self::BookType),
            "condition" => Ok(Self::Condition),
            "genre" => Ok(Self::Genre),
            "publisher" => Ok(Self::Publisher),
            _ => Err(format!("invalid reference data type: {s}")),
        }
    }
}
