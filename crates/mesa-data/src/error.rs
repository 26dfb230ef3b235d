//! # Data Source Errors
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  reqwest::Error / HTTP status                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DataError (this module) ← categorized by what the cashier can do      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (in register app) ← user-facing message                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Failures talking to the backend (or the fixture stand-in).
#[derive(Debug, Error)]
pub enum DataError {
    /// The backend has no such record.
    ///
    /// ## When This Occurs
    /// - HTTP 404
    /// - Unknown product, customer, order or discount code
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The backend answered but refused the request.
    ///
    /// ## When This Occurs
    /// - Payment declined (402)
    /// - Discount rejected on re-validation (4xx)
    /// - Backend failure (5xx)
    #[error("Backend rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The request never got an answer.
    ///
    /// ## When This Occurs
    /// - Backend unreachable
    /// - Request timed out
    #[error("Transport error: {0}")]
    Transport(String),

    /// The answer was not the JSON we expected.
    #[error("Invalid response body: {0}")]
    Decode(String),

    /// The configured backend URL cannot be used.
    #[error("Invalid backend URL {0}")]
    InvalidUrl(String),
}

impl DataError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DataError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// True for failures where the backend was never reached.
    pub fn is_transport(&self) -> bool {
        matches!(self, DataError::Transport(_))
    }
}

/// Convert reqwest errors to DataError.
///
/// ## Error Mapping
/// ```text
/// body decode failure     → DataError::Decode
/// timeout / connect / ... → DataError::Transport
/// ```
/// Status codes are mapped by the live source before this point.
impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            DataError::Decode(err.to_string())
        } else {
            DataError::Transport(err.to_string())
        }
    }
}

/// Convenience type alias for Results with DataError.
pub type DataResult<T> = Result<T, DataError>;
