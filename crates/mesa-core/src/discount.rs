//! # Discount Validator
//!
//! Decides whether a discount code may be applied to an order right now.
//!
//! ## Rule Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. is_active             → "Discount code is not active"               │
//! │  2. now < valid_from      → "Discount code is not yet active"           │
//! │  3. now > valid_until     → "Discount code has expired"                 │
//! │  4. usage_count ≥ limit   → "Discount code usage limit reached"         │
//! │  5. subtotal < minimum    → "Minimum order of $20.00 required"          │
//! │  6. rate / amount sane    → "Invalid discount value"                    │
//! │                                                                         │
//! │  First failing rule wins. Passing all six → valid.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This is a pre-check for the cashier. The backend checks the code again
//! when the order is submitted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Discount, DiscountKind};

/// Outcome of a discount check. Failure is a value, never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DiscountValidation {
    pub is_valid: bool,
    /// Cashier-facing reason, set when `is_valid` is false.
    pub error: Option<String>,
}

impl DiscountValidation {
    pub fn valid() -> Self {
        DiscountValidation {
            is_valid: true,
            error: None,
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        DiscountValidation {
            is_valid: false,
            error: Some(reason.into()),
        }
    }
}

/// Checks `discount` against the current subtotal at time `now`.
///
/// ## Example
/// ```rust
/// use chrono::Utc;
/// use mesa_core::discount::validate_discount;
/// use mesa_core::{Discount, DiscountKind, Money};
///
/// let discount = Discount {
///     code: "SAVE5".into(),
///     description: None,
///     kind: DiscountKind::Fixed { amount: Money::from_cents(500) },
///     min_order_amount: Money::from_cents(2000),
///     valid_from: None,
///     valid_until: None,
///     usage_limit: None,
///     usage_count: 0,
///     is_active: true,
/// };
///
/// let result = validate_discount(&discount, Money::from_cents(1500), Utc::now());
/// assert!(!result.is_valid);
/// assert_eq!(result.error.as_deref(), Some("Minimum order of $20.00 required"));
/// ```
pub fn validate_discount(
    discount: &Discount,
    subtotal: Money,
    now: DateTime<Utc>,
) -> DiscountValidation {
    if !discount.is_active {
        return DiscountValidation::invalid("Discount code is not active");
    }

    if matches!(discount.valid_from, Some(from) if now < from) {
        return DiscountValidation::invalid("Discount code is not yet active");
    }

    if matches!(discount.valid_until, Some(until) if now > until) {
        return DiscountValidation::invalid("Discount code has expired");
    }

    if matches!(discount.usage_limit, Some(limit) if discount.usage_count >= limit) {
        return DiscountValidation::invalid("Discount code usage limit reached");
    }

    if subtotal < discount.min_order_amount {
        return DiscountValidation::invalid(format!(
            "Minimum order of {} required",
            discount.min_order_amount
        ));
    }

    let sane = match discount.kind {
        DiscountKind::Percentage { rate } => (1..=10_000).contains(&rate.bps()),
        DiscountKind::Fixed { amount } => amount.is_positive(),
    };
    if !sane {
        return DiscountValidation::invalid("Invalid discount value");
    }

    DiscountValidation::valid()
}

// =============================================================================
// Unit Tests
// =============================================================================
