//! # Validation Module
//!
//! Input validation for everything the cashier can type.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend form                                                 │
//! │  └── Immediate feedback (empty fields, non-numeric input)              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  └── Shape checks before any order rule runs                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Order draft / discount validator                             │
//! │  └── Stock, loyalty caps, discount rules                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 4: Backend                                                       │
//! │  └── Re-validates discounts and payment at checkout                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use mesa_core::validation::{validate_discount_code, validate_quantity};
//!
//! assert!(validate_quantity(2).is_ok());
//! assert_eq!(validate_discount_code(" save5 ").unwrap(), "SAVE5");
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Rate, TipSelection};
use crate::{MAX_AMOUNT_CENTS, MAX_ITEM_QUANTITY, MAX_NOTES_LENGTH, MAX_ORDER_LINES};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Highest tip percentage accepted (100%).
pub const MAX_TIP_RATE: Rate = Rate::from_bps(10_000);

// =============================================================================
// String Validators
// =============================================================================

/// Validates and normalizes a discount code.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 32 characters
/// - Letters, digits, hyphens and underscores only
///
/// ## Returns
/// The trimmed, upper-cased code.
pub fn validate_discount_code(code: &str) -> ValidationResult<String> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "discount code".to_string(),
        });
    }

    if code.len() > 32 {
        return Err(ValidationError::TooLong {
            field: "discount code".to_string(),
            max: 32,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "discount code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(code.to_uppercase())
}

/// Validates free-text notes (order or line level).
///
/// ## Returns
/// `None` for blank input, otherwise the trimmed text.
pub fn validate_notes(notes: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(text) = notes.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };

    if text.chars().count() > MAX_NOTES_LENGTH {
        return Err(ValidationError::TooLong {
            field: "notes".to_string(),
            max: MAX_NOTES_LENGTH,
        });
    }

    Ok(Some(text.to_string()))
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// Stock is checked separately by the draft, against the product snapshot.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price. Zero is allowed (free items).
pub fn validate_price(price: Money) -> ValidationResult<()> {
    validate_amount("price", price)
}

/// Checks `0 <= amount <= MAX_AMOUNT_CENTS`.
fn validate_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() || amount.cents() > MAX_AMOUNT_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT_CENTS,
        });
    }

    Ok(())
}

/// Validates a tip selection.
///
/// ## Rules
/// - Percentages between 0% and 100%
/// - Fixed amounts between $0 and MAX_AMOUNT_CENTS
pub fn validate_tip(tip: TipSelection) -> ValidationResult<()> {
    match tip {
        TipSelection::None => Ok(()),
        TipSelection::Percent(rate) if rate > MAX_TIP_RATE => Err(ValidationError::OutOfRange {
            field: "tip percentage".to_string(),
            min: 0,
            max: 100,
        }),
        TipSelection::Percent(_) => Ok(()),
        TipSelection::Amount(amount) => validate_amount("tip amount", amount),
    }
}

/// Validates a loyalty redemption request (shape only; caps are the draft's job).
pub fn validate_loyalty_points(points: i64) -> ValidationResult<()> {
    if points < 0 {
        return Err(ValidationError::OutOfRange {
            field: "loyalty points".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points (0% to 100%).
pub fn validate_tax_rate(rate: Rate) -> ValidationResult<()> {
    if rate.bps() > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10_000,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates that one more line fits in the order.
pub fn validate_order_size(current_lines: usize) -> ValidationResult<()> {
    if current_lines >= MAX_ORDER_LINES {
        return Err(ValidationError::OutOfRange {
            field: "order lines".to_string(),
            min: 0,
            max: MAX_ORDER_LINES as i64,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string (order and line ids).
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
