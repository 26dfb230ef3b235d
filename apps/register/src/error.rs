//! # API Error Type
//!
//! Unified error type for register commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Mesa POS                               │
//! │                                                                         │
//! │  Command Function: Result<T, ApiError>                                  │
//! │         │                                                               │
//! │         ├── Role check fails ──────── Forbidden ───────────────┐       │
//! │         │                                                       │       │
//! │         ├── CoreError (stock, discount, loyalty, ...) ─────────┤       │
//! │         │                                                       ▼       │
//! │         ├── DataError (backend, transport) ───────────────► ApiError   │
//! │         │                                                       │       │
//! │         └── Success                                             ▼       │
//! │                                                      toast: code + msg  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Backend and transport details are logged, never shown: the cashier gets a
//! short message they can act on.

use mesa_core::{CoreError, Permission, Role};
use mesa_data::DataError;
use serde::Serialize;

/// Error returned from register commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Only 3 Classic Burger in stock (5 requested)"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for command responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Order rule violated (empty order, bad status move, ...)
    BusinessLogic,

    /// Insufficient stock
    InsufficientStock,

    /// Discount code rejected
    DiscountRejected,

    /// Loyalty redemption refused
    LoyaltyError,

    /// Payment processing error
    PaymentError,

    /// Role lacks the permission
    Forbidden,

    /// Backend refused or failed the request
    BackendError,

    /// Backend could not be reached
    Unavailable,

    /// Internal error
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates a payment error.
    pub fn payment(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::PaymentError, message)
    }

    /// Creates a forbidden error for a role lacking a permission.
    pub fn forbidden(role: Role, permission: Permission) -> Self {
        ApiError::new(
            ErrorCode::Forbidden,
            format!("Role {} is not allowed to {}", role, permission),
        )
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts data source errors to API errors.
impl From<DataError> for ApiError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DataError::Rejected { status, message } if (400..500).contains(&status) => {
                tracing::warn!(status, %message, "Backend rejected request");
                ApiError::new(ErrorCode::BusinessLogic, message)
            }
            DataError::Rejected { status, message } => {
                // Log the actual error but return a generic message
                tracing::error!(status, %message, "Backend request failed");
                ApiError::new(ErrorCode::BackendError, "Backend request failed")
            }
            DataError::Transport(e) => {
                tracing::error!("Backend unreachable: {}", e);
                ApiError::new(ErrorCode::Unavailable, "Backend is unreachable")
            }
            DataError::Decode(e) => {
                tracing::error!("Unexpected backend response: {}", e);
                ApiError::internal("Unexpected response from backend")
            }
            DataError::InvalidUrl(e) => {
                tracing::error!("Backend URL rejected: {}", e);
                ApiError::internal("Backend URL is not valid")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InsufficientStock {
                product,
                available,
                requested,
            } => ApiError::new(
                ErrorCode::InsufficientStock,
                format!(
                    "Only {} {} in stock ({} requested)",
                    available, product, requested
                ),
            ),
            CoreError::ProductInactive(name) => {
                ApiError::validation(format!("{} is not available for sale", name))
            }
            CoreError::ItemNotFound(id) => ApiError::not_found("Order item", &id),
            CoreError::EmptyOrder => ApiError::new(ErrorCode::BusinessLogic, "Order has no items"),
            err @ CoreError::OrderTooLarge { .. } => {
                ApiError::new(ErrorCode::BusinessLogic, err.to_string())
            }
            err @ CoreError::QuantityTooLarge { .. } => ApiError::validation(err.to_string()),
            CoreError::DiscountRejected { code, reason } => ApiError::new(
                ErrorCode::DiscountRejected,
                format!("{}: {}", code, reason),
            ),
            err @ (CoreError::NoCustomer | CoreError::LoyaltyRedemptionExceeded { .. }) => {
                ApiError::new(ErrorCode::LoyaltyError, err.to_string())
            }
            err @ CoreError::InvalidStatusTransition { .. } => {
                ApiError::new(ErrorCode::BusinessLogic, err.to_string())
            }
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_error_message() {
        let err: ApiError = CoreError::InsufficientStock {
            product: "Classic Burger".to_string(),
            available: 3,
            requested: 5,
        }
        .into();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(err.message, "Only 3 Classic Burger in stock (5 requested)");
    }

    #[test]
    fn test_backend_details_are_hidden() {
        let err: ApiError = DataError::Rejected {
            status: 503,
            message: "pg pool exhausted".to_string(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::BackendError);
        assert!(!err.message.contains("pg"));

        let err: ApiError = DataError::Transport("connection refused".to_string()).into();
        assert_eq!(err.code, ErrorCode::Unavailable);
    }

    #[test]
    fn test_client_rejections_keep_message() {
        let err: ApiError = DataError::Rejected {
            status: 409,
            message: "Order already submitted".to_string(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
        assert_eq!(err.message, "Order already submitted");
    }

    #[test]
    fn test_serialized_shape() {
        let err = ApiError::forbidden(Role::Kitchen, Permission::Checkout);
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "FORBIDDEN");
        assert_eq!(json["message"], "Role kitchen is not allowed to check out orders");
    }
}
