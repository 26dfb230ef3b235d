//! # Error Types
//!
//! Domain-specific error types for mesa-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  mesa-core errors (this file)                                          │
//! │  ├── CoreError        - Order rule violations                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  mesa-data errors (separate crate)                                     │
//! │  └── DataError        - Backend / transport failures                   │
//! │                                                                         │
//! │  register errors (app)                                                 │
//! │  └── ApiError         - What the cashier sees                          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError ─┐                                  │
//! │                          DataError ─┴─► ApiError → toast message       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The Discount Validator never returns these: it reports failures as a
//! [`DiscountValidation`](crate::discount::DiscountValidation) value.

use thiserror::Error;

use crate::types::OrderStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Order rule violations raised by the draft store and the order lifecycle.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Requested quantity exceeds what is on hand.
    ///
    /// ## User Workflow
    /// ```text
    /// Add "Classic Burger" × 5
    ///      │
    ///      ▼
    /// stock = 3
    ///      │
    ///      ▼
    /// InsufficientStock { product: "Classic Burger", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// UI shows: "Only 3 Classic Burger in stock"
    /// ```
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// Product is switched off in the catalog.
    #[error("Product {0} is not available for sale")]
    ProductInactive(String),

    /// No line with this id in the draft.
    #[error("Order item not found: {0}")]
    ItemNotFound(String),

    /// Checkout attempted on a draft with no lines.
    #[error("Order has no items")]
    EmptyOrder,

    /// Order has exceeded maximum allowed lines.
    #[error("Order cannot have more than {max} lines")]
    OrderTooLarge { max: usize },

    /// Line quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Discount failed the client-side pre-check.
    #[error("Discount {code} cannot be applied: {reason}")]
    DiscountRejected { code: String, reason: String },

    /// Loyalty redemption needs a customer on the order.
    #[error("Attach a customer before redeeming loyalty points")]
    NoCustomer,

    /// Redemption above the customer's balance or the per-order cap.
    #[error("Cannot redeem {requested} points: at most {max} allowed on this order")]
    LoyaltyRedemptionExceeded { requested: i64, max: i64 },

    /// Order status move rejected by the state machine.
    #[error("Order {order_id} cannot move from {from} to {to}")]
    InvalidStatusTransition {
        order_id: String,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors, raised before any business rule runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product: "Classic Burger".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Classic Burger: available 3, requested 5"
        );

        let err = CoreError::InvalidStatusTransition {
            order_id: "o-1".to_string(),
            from: OrderStatus::Completed,
            to: OrderStatus::Open,
        };
        assert_eq!(err.to_string(), "Order o-1 cannot move from COMPLETED to OPEN");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "discount code".to_string(),
        };
        assert_eq!(err.to_string(), "discount code is required");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
