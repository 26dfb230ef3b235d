//! # Pricing Engine
//!
//! Computes every monetary field of an order from its lines and the
//! checkout-time adjustments. Pure: same input, same output, no clock, no I/O.
//!
//! ## Calculation Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  subtotal  = Σ price × quantity                                         │
//! │  tax       = round(subtotal × tax rate)                                 │
//! │  tip       = round(subtotal × tip %)  or a fixed amount                 │
//! │  discount  = percentage or fixed, clamped to [0, subtotal]              │
//! │  loyalty   = min(points, cap) × $0.10                                   │
//! │                                                                         │
//! │  total     = max(0, subtotal + tax + tip − discount − loyalty)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each derived amount is rounded to the cent once, half away from zero.
//!
//! ## Example
//! ```rust
//! use mesa_core::pricing::{price_order, PricingAdjustments};
//! use mesa_core::{Money, OrderItem, Product, Rate, TipSelection};
//!
//! let product = Product {
//!     id: "burger".into(),
//!     name: "Classic Burger".into(),
//!     price: Money::from_cents(1899),
//!     category: "Mains".into(),
//!     stock: 10,
//!     is_active: true,
//!     allergens: vec![],
//! };
//! let items = vec![OrderItem::new(product, 2, None)];
//! let adjustments = PricingAdjustments {
//!     tip: TipSelection::Percent(Rate::from_percent(10)),
//!     ..PricingAdjustments::default()
//! };
//!
//! let totals = price_order(&items, &adjustments, Rate::from_bps(800));
//! assert_eq!(totals.total.cents(), 4482); // $44.82
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Discount, DiscountKind, OrderItem, Rate, TipSelection};
use crate::{LOYALTY_POINT_VALUE_CENTS, LOYALTY_REDEMPTION_POINTS_PER_TEN};

/// Checkout-time inputs besides the lines and the tax rate.
#[derive(Debug, Clone, Copy, Default)]
pub struct PricingAdjustments<'a> {
    /// Tip selection.
    pub tip: TipSelection,
    /// A discount that already passed validation, if any.
    pub discount: Option<&'a Discount>,
    /// Points the cashier asked to redeem.
    pub loyalty_points: i64,
    /// The customer's balance (0 without a customer).
    pub customer_points: i64,
}

/// All monetary fields of an order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub tax_rate: Rate,
    pub tax: Money,
    pub tip_amount: Money,
    /// Code of the discount that contributed `discount_amount`.
    pub discount_code: Option<String>,
    pub discount_amount: Money,
    /// Why a held discount contributed nothing (filled in by the draft).
    pub discount_error: Option<String>,
    /// Points actually redeemed, after the cap.
    pub loyalty_points_applied: i64,
    pub loyalty_discount: Money,
    pub total: Money,
}

impl OrderTotals {
    /// Checkout is offered only for a positive total.
    pub fn checkout_enabled(&self) -> bool {
        self.total.is_positive()
    }
}

// =============================================================================
// Component Calculations
// =============================================================================

/// Sum of `price × quantity` over all lines.
pub fn calculate_subtotal(items: &[OrderItem]) -> Money {
    items
        .iter()
        .map(|item| item.product.price.multiply_quantity(item.quantity))
        .sum()
}

/// Tax on the subtotal.
#[inline]
pub fn calculate_tax(subtotal: Money, rate: Rate) -> Money {
    subtotal.apply_rate(rate)
}

/// Tip for the given selection.
pub fn calculate_tip(subtotal: Money, tip: TipSelection) -> Money {
    match tip {
        TipSelection::None => Money::zero(),
        TipSelection::Percent(rate) => subtotal.apply_rate(rate),
        TipSelection::Amount(amount) => amount.non_negative(),
    }
}

/// Amount a discount takes off the subtotal, never more than the subtotal.
///
/// ## Example
/// ```rust
/// use mesa_core::pricing::calculate_discount_amount;
/// use mesa_core::{Discount, DiscountKind, Money};
///
/// let discount = Discount {
///     code: "BIG".into(),
///     description: None,
///     kind: DiscountKind::Fixed { amount: Money::from_cents(5000) },
///     min_order_amount: Money::zero(),
///     valid_from: None,
///     valid_until: None,
///     usage_limit: None,
///     usage_count: 0,
///     is_active: true,
/// };
/// // $50 off a $12 order takes off $12
/// let amount = calculate_discount_amount(Money::from_cents(1200), Some(&discount));
/// assert_eq!(amount.cents(), 1200);
/// ```
pub fn calculate_discount_amount(subtotal: Money, discount: Option<&Discount>) -> Money {
    let Some(discount) = discount else {
        return Money::zero();
    };

    let raw = match discount.kind {
        DiscountKind::Percentage { rate } => subtotal.apply_rate(rate),
        DiscountKind::Fixed { amount } => amount,
    };

    raw.non_negative().min(subtotal.non_negative())
}

/// Most points redeemable on an order.
///
/// `min(customer balance, floor(subtotal / $10) × 100)`: every full $10 of
/// subtotal unlocks 100 points ($10 of discount).
pub fn max_redeemable_points(subtotal: Money, customer_points: i64) -> i64 {
    let tens = subtotal.whole_units().max(0) / 10;
    customer_points.max(0).min(tens * LOYALTY_REDEMPTION_POINTS_PER_TEN)
}

/// Monetary value of redeemed points ($0.10 per point).
#[inline]
pub fn loyalty_discount(points: i64) -> Money {
    Money::from_cents(points.max(0) * LOYALTY_POINT_VALUE_CENTS)
}

/// Points earned by an order: one per whole currency unit of subtotal.
#[inline]
pub fn loyalty_points_earned(subtotal: Money) -> i64 {
    subtotal.whole_units().max(0)
}

// =============================================================================
// Order Pricing
// =============================================================================

/// Prices an order.
///
/// Redemption above the cap is clamped here; the draft store rejects such
/// requests before they reach this point, so the clamp only matters when
/// lines are removed after redeeming.
pub fn price_order(
    items: &[OrderItem],
    adjustments: &PricingAdjustments<'_>,
    tax_rate: Rate,
) -> OrderTotals {
    let subtotal = calculate_subtotal(items);
    let tax = calculate_tax(subtotal, tax_rate);
    let tip_amount = calculate_tip(subtotal, adjustments.tip);
    let discount_amount = calculate_discount_amount(subtotal, adjustments.discount);

    let cap = max_redeemable_points(subtotal, adjustments.customer_points);
    let loyalty_points_applied = adjustments.loyalty_points.clamp(0, cap);
    let loyalty_discount = loyalty_discount(loyalty_points_applied);

    let total = (subtotal + tax + tip_amount - discount_amount - loyalty_discount).non_negative();

    OrderTotals {
        subtotal,
        tax_rate,
        tax,
        tip_amount,
        discount_code: adjustments.discount.map(|d| d.code.clone()),
        discount_amount,
        discount_error: None,
        loyalty_points_applied,
        loyalty_discount,
        total,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Product;
    use crate::DEFAULT_TAX_RATE;

    fn product(id: &str, cents: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            price: Money::from_cents(cents),
            category: "Mains".to_string(),
            stock: 100,
            is_active: true,
            allergens: vec![],
        }
    }

    fn fixed(code: &str, cents: i64) -> Discount {
        Discount {
            code: code.to_string(),
            description: None,
            kind: DiscountKind::Fixed {
                amount: Money::from_cents(cents),
            },
            min_order_amount: Money::zero(),
            valid_from: None,
            valid_until: None,
            usage_limit: None,
            usage_count: 0,
            is_active: true,
        }
    }

    fn percentage(code: &str, pct: u32) -> Discount {
        Discount {
            kind: DiscountKind::Percentage {
                rate: Rate::from_percent(pct),
            },
            ..fixed(code, 0)
        }
    }

    #[test]
    fn test_subtotal_is_exact_sum() {
        let items = vec![
            OrderItem::new(product("a", 1899), 2, None),
            OrderItem::new(product("b", 699), 3, None),
            OrderItem::new(product("c", 0), 4, None),
        ];
        assert_eq!(calculate_subtotal(&items).cents(), 1899 * 2 + 699 * 3);
        assert!(calculate_subtotal(&[]).is_zero());
    }

    #[test]
    fn test_tip_scenario_two_burgers() {
        // 2 × $18.99, 10% tip, no discount, no loyalty
        let items = vec![OrderItem::new(product("burger", 1899), 2, None)];
        let adjustments = PricingAdjustments {
            tip: TipSelection::Percent(Rate::from_percent(10)),
            ..PricingAdjustments::default()
        };

        let totals = price_order(&items, &adjustments, DEFAULT_TAX_RATE);

        assert_eq!(totals.subtotal.cents(), 3798);
        assert_eq!(totals.tax.cents(), 304);
        assert_eq!(totals.tip_amount.cents(), 380);
        assert_eq!(totals.total.cents(), 4482);
        assert!(totals.checkout_enabled());
    }

    #[test]
    fn test_discount_and_loyalty_scenario() {
        // subtotal $50.97, $5 off, 100 points, no tip
        let items = vec![
            OrderItem::new(product("a", 1699), 2, None),
            OrderItem::new(product("b", 1699), 1, None),
        ];
        let discount = fixed("SAVE5", 500);
        let adjustments = PricingAdjustments {
            tip: TipSelection::None,
            discount: Some(&discount),
            loyalty_points: 100,
            customer_points: 250,
        };

        let totals = price_order(&items, &adjustments, DEFAULT_TAX_RATE);

        assert_eq!(totals.subtotal.cents(), 5097);
        assert_eq!(totals.tax.cents(), 408);
        assert_eq!(totals.discount_amount.cents(), 500);
        assert_eq!(totals.loyalty_points_applied, 100);
        assert_eq!(totals.loyalty_discount.cents(), 1000);
        assert_eq!(totals.total.cents(), 4005);
        assert_eq!(totals.discount_code.as_deref(), Some("SAVE5"));
    }

    #[test]
    fn test_total_clamped_at_zero() {
        let items = vec![OrderItem::new(product("a", 1000), 1, None)];
        let discount = fixed("HUGE", 100_000);
        let adjustments = PricingAdjustments {
            discount: Some(&discount),
            loyalty_points: 100,
            customer_points: 100,
            ..PricingAdjustments::default()
        };

        let totals = price_order(&items, &adjustments, DEFAULT_TAX_RATE);

        // Discount clamps to the subtotal; loyalty still applies; total floors at 0
        assert_eq!(totals.discount_amount.cents(), 1000);
        assert_eq!(totals.total, Money::zero());
        assert!(!totals.checkout_enabled());
    }

    #[test]
    fn test_percentage_discount_rounds_to_cent() {
        let discount = percentage("TEN", 10);
        let amount = calculate_discount_amount(Money::from_cents(3798), Some(&discount));
        assert_eq!(amount.cents(), 380);
    }

    #[test]
    fn test_fixed_tip_amount() {
        let tip = calculate_tip(Money::from_cents(3798), TipSelection::Amount(Money::from_cents(250)));
        assert_eq!(tip.cents(), 250);
    }

    #[test]
    fn test_loyalty_cap() {
        // $50.97 → 5 full tens → 500 points max
        assert_eq!(max_redeemable_points(Money::from_cents(5097), 10_000), 500);
        // Balance is the tighter limit
        assert_eq!(max_redeemable_points(Money::from_cents(5097), 120), 120);
        // Under $10 nothing can be redeemed
        assert_eq!(max_redeemable_points(Money::from_cents(999), 500), 0);
    }

    #[test]
    fn test_engine_clamps_over_cap_redemption() {
        let items = vec![OrderItem::new(product("a", 1500), 1, None)];
        let adjustments = PricingAdjustments {
            loyalty_points: 900,
            customer_points: 900,
            ..PricingAdjustments::default()
        };

        let totals = price_order(&items, &adjustments, DEFAULT_TAX_RATE);

        assert_eq!(totals.loyalty_points_applied, 100);
        assert_eq!(totals.loyalty_discount.cents(), 1000);
    }

    #[test]
    fn test_points_earned_floor_subtotal() {
        assert_eq!(loyalty_points_earned(Money::from_cents(3798)), 37);
        assert_eq!(loyalty_points_earned(Money::zero()), 0);
    }

    #[test]
    fn test_pricing_is_idempotent() {
        let items = vec![OrderItem::new(product("a", 1234), 3, None)];
        let discount = percentage("P15", 15);
        let adjustments = PricingAdjustments {
            tip: TipSelection::Percent(Rate::from_percent(18)),
            discount: Some(&discount),
            loyalty_points: 0,
            customer_points: 0,
        };

        let first = price_order(&items, &adjustments, DEFAULT_TAX_RATE);
        let second = price_order(&items, &adjustments, DEFAULT_TAX_RATE);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_order_prices_to_zero() {
        let totals = price_order(&[], &PricingAdjustments::default(), DEFAULT_TAX_RATE);
        assert!(totals.subtotal.is_zero());
        assert!(totals.tax.is_zero());
        assert!(totals.tip_amount.is_zero());
        assert!(totals.total.is_zero());
    }
}
