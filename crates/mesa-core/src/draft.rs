//! # Order Draft Store
//!
//! The order currently being rung up at the register.
//!
//! ## Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Order Draft Operations                             │
//! │                                                                         │
//! │  Cashier Action          Draft Method                 Effect            │
//! │  ──────────────          ────────────                 ──────            │
//! │                                                                         │
//! │  Tap product ──────────► add_item() ─────────────► merge or new line    │
//! │  Change quantity ──────► set_item_quantity() ────► 0 removes the line   │
//! │  Remove line ──────────► remove_item()                                  │
//! │  Pick customer ────────► set_customer()                                 │
//! │  Enter code ───────────► apply_discount() ───────► validator gates it   │
//! │  Redeem points ────────► redeem_loyalty_points() ► capped by subtotal   │
//! │  Choose tip ───────────► set_tip()                                      │
//! │  Pay ──────────────────► finalize() ─────────────► Order, then reset    │
//! │                                                                         │
//! │  Every mutation ends in recompute(): the Pricing Engine runs again      │
//! │  and the held discount is re-checked against the new subtotal.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Lines are unique by `(product_id, notes)`; adding again merges
//! - Every line quantity lies in `1..=min(stock, 999)`; nothing is clamped
//! - `totals()` always reflects the current lines and adjustments

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::discount::validate_discount;
use crate::error::{CoreError, CoreResult};
use crate::pricing::{
    calculate_subtotal, loyalty_points_earned, max_redeemable_points, price_order, OrderTotals,
    PricingAdjustments,
};
use crate::types::{
    Customer, Discount, Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus, Product,
    Rate, TipSelection,
};
use crate::validation::{
    validate_loyalty_points, validate_notes, validate_order_size, validate_price,
    validate_quantity, validate_tip,
};
use crate::{DEFAULT_TAX_RATE, MAX_ITEM_QUANTITY, MAX_ORDER_LINES};

/// A discount held by the draft, with the time it was accepted.
///
/// Recomputes re-check it at `applied_at` so that only the subtotal rules can
/// change the outcome between mutations; `finalize` re-checks at checkout time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppliedDiscount {
    discount: Discount,
    applied_at: DateTime<Utc>,
}

/// The order being built.
///
/// Owned by one register session. The app shares it behind a mutex; this
/// type itself has no interior mutability and no global state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    id: String,
    items: Vec<OrderItem>,
    customer: Option<Customer>,
    notes: Option<String>,
    tip: TipSelection,
    discount: Option<AppliedDiscount>,
    loyalty_points: i64,
    tax_rate: Rate,
    totals: OrderTotals,
}

impl Default for OrderDraft {
    fn default() -> Self {
        OrderDraft::new(DEFAULT_TAX_RATE)
    }
}

impl OrderDraft {
    /// Creates an empty draft priced at `tax_rate`.
    pub fn new(tax_rate: Rate) -> Self {
        OrderDraft {
            id: Uuid::new_v4().to_string(),
            items: Vec::new(),
            customer: None,
            notes: None,
            tip: TipSelection::None,
            discount: None,
            loyalty_points: 0,
            tax_rate,
            totals: OrderTotals {
                tax_rate,
                ..OrderTotals::default()
            },
        }
    }

    // =========================================================================
    // Lines
    // =========================================================================

    /// Adds `quantity` of `product`, merging into an existing line with the
    /// same product and notes.
    ///
    /// ## Errors
    /// - `ProductInactive` if the product is switched off
    /// - `Validation` for a bad quantity, price or notes
    /// - `QuantityTooLarge` if the merged line would pass 999
    /// - `InsufficientStock` if the line would exceed `product.stock`
    /// - `OrderTooLarge` if a new line would pass the line limit
    ///
    /// ## Returns
    /// The id of the line that now holds the product.
    pub fn add_item(
        &mut self,
        product: Product,
        quantity: i64,
        notes: Option<&str>,
    ) -> CoreResult<String> {
        if !product.is_active {
            return Err(CoreError::ProductInactive(product.name));
        }
        validate_price(product.price)?;
        validate_quantity(quantity)?;
        let notes = validate_notes(notes)?;

        if let Some(line) = self
            .items
            .iter_mut()
            .find(|line| line.matches(&product.id, notes.as_deref()))
        {
            let merged = line.quantity + quantity;
            if merged > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: merged,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            if !product.has_stock_for(merged) {
                return Err(CoreError::InsufficientStock {
                    product: product.name,
                    available: product.stock,
                    requested: merged,
                });
            }

            line.set_quantity(merged);
            let id = line.id.clone();
            self.recompute();
            return Ok(id);
        }

        validate_order_size(self.items.len())
            .map_err(|_| CoreError::OrderTooLarge { max: MAX_ORDER_LINES })?;

        if !product.has_stock_for(quantity) {
            return Err(CoreError::InsufficientStock {
                product: product.name,
                available: product.stock,
                requested: quantity,
            });
        }

        let line = OrderItem::new(product, quantity, notes);
        let id = line.id.clone();
        self.items.push(line);
        self.recompute();
        Ok(id)
    }

    /// Removes a line.
    pub fn remove_item(&mut self, item_id: &str) -> CoreResult<()> {
        let before = self.items.len();
        self.items.retain(|line| line.id != item_id);
        if self.items.len() == before {
            return Err(CoreError::ItemNotFound(item_id.to_string()));
        }

        self.recompute();
        Ok(())
    }

    /// Sets a line's quantity. Zero removes the line.
    pub fn set_item_quantity(&mut self, item_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove_item(item_id);
        }
        validate_quantity(quantity)?;

        let line = self
            .items
            .iter_mut()
            .find(|line| line.id == item_id)
            .ok_or_else(|| CoreError::ItemNotFound(item_id.to_string()))?;

        if !line.product.has_stock_for(quantity) {
            return Err(CoreError::InsufficientStock {
                product: line.product.name.clone(),
                available: line.product.stock,
                requested: quantity,
            });
        }

        line.set_quantity(quantity);
        self.recompute();
        Ok(())
    }

    // =========================================================================
    // Adjustments
    // =========================================================================

    /// Attaches or detaches the customer.
    ///
    /// Any loyalty redemption belongs to the previous customer and is dropped
    /// when the customer changes.
    pub fn set_customer(&mut self, customer: Option<Customer>) {
        let same = match (&self.customer, &customer) {
            (Some(current), Some(next)) => current.id == next.id,
            _ => false,
        };
        if !same {
            self.loyalty_points = 0;
        }

        self.customer = customer;
        self.recompute();
    }

    /// Sets the order-level notes. Blank text clears them.
    pub fn set_notes(&mut self, notes: Option<&str>) -> CoreResult<()> {
        self.notes = validate_notes(notes)?;
        Ok(())
    }

    /// Chooses the tip.
    pub fn set_tip(&mut self, tip: TipSelection) -> CoreResult<()> {
        validate_tip(tip)?;
        self.tip = tip;
        self.recompute();
        Ok(())
    }

    /// Applies a discount after running it through the validator.
    ///
    /// ## Errors
    /// `DiscountRejected` carrying the validator's message. On failure the
    /// draft holds no discount, even if one was applied before.
    pub fn apply_discount(&mut self, discount: Discount, now: DateTime<Utc>) -> CoreResult<()> {
        let subtotal = calculate_subtotal(&self.items);
        let check = validate_discount(&discount, subtotal, now);

        if !check.is_valid {
            self.discount = None;
            self.recompute();
            return Err(CoreError::DiscountRejected {
                code: discount.code,
                reason: check.error.unwrap_or_default(),
            });
        }

        self.discount = Some(AppliedDiscount {
            discount,
            applied_at: now,
        });
        self.recompute();
        Ok(())
    }

    /// Drops the discount.
    pub fn clear_discount(&mut self) {
        self.discount = None;
        self.recompute();
    }

    /// Redeems `points` of the attached customer's balance.
    ///
    /// ## Errors
    /// - `NoCustomer` without a customer
    /// - `LoyaltyRedemptionExceeded` above the balance or the subtotal cap
    pub fn redeem_loyalty_points(&mut self, points: i64) -> CoreResult<()> {
        validate_loyalty_points(points)?;

        let customer = self.customer.as_ref().ok_or(CoreError::NoCustomer)?;
        let max = self.max_redeemable_points_for(customer);
        if points > max {
            return Err(CoreError::LoyaltyRedemptionExceeded {
                requested: points,
                max,
            });
        }

        self.loyalty_points = points;
        self.recompute();
        Ok(())
    }

    /// Points the attached customer may redeem right now (0 without one).
    pub fn max_redeemable_points(&self) -> i64 {
        self.customer
            .as_ref()
            .map(|customer| self.max_redeemable_points_for(customer))
            .unwrap_or(0)
    }

    fn max_redeemable_points_for(&self, customer: &Customer) -> i64 {
        max_redeemable_points(calculate_subtotal(&self.items), customer.loyalty_points)
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Turns the draft into a completed, paid order and resets the draft.
    ///
    /// The held discount is re-checked at `now` first; one that no longer
    /// validates is left off the order.
    ///
    /// ## Errors
    /// `EmptyOrder` if there are no lines (the draft is left untouched).
    pub fn finalize(&mut self, payment_method: PaymentMethod, now: DateTime<Utc>) -> CoreResult<Order> {
        if self.items.is_empty() {
            return Err(CoreError::EmptyOrder);
        }

        self.reprice(Some(now));
        let totals = &self.totals;

        let mut order = Order {
            id: self.id.clone(),
            items: self.items.clone(),
            customer_id: self.customer.as_ref().map(|c| c.id.clone()),
            status: OrderStatus::Open,
            payment_status: PaymentStatus::Paid,
            payment_method: Some(payment_method),
            subtotal: totals.subtotal,
            tax: totals.tax,
            tax_rate: totals.tax_rate,
            discount_code: totals.discount_code.clone(),
            discount_amount: totals.discount_amount,
            tip_amount: totals.tip_amount,
            loyalty_points_redeemed: totals.loyalty_points_applied,
            loyalty_discount: totals.loyalty_discount,
            loyalty_points_earned: loyalty_points_earned(totals.subtotal),
            total: totals.total,
            notes: self.notes.clone(),
            created_at: now,
            updated_at: now,
            completed_at: None,
        };
        order.transition_to(OrderStatus::Completed, now)?;

        self.reset();
        Ok(order)
    }

    /// Discards everything and starts a fresh draft at the same tax rate.
    pub fn reset(&mut self) {
        *self = OrderDraft::new(self.tax_rate);
    }

    // =========================================================================
    // Read Access
    // =========================================================================

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn totals(&self) -> &OrderTotals {
        &self.totals
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn customer(&self) -> Option<&Customer> {
        self.customer.as_ref()
    }

    pub fn discount(&self) -> Option<&Discount> {
        self.discount.as_ref().map(|applied| &applied.discount)
    }

    pub fn tip(&self) -> TipSelection {
        self.tip
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Points requested for redemption (the applied count is in `totals()`).
    pub fn loyalty_points(&self) -> i64 {
        self.loyalty_points
    }

    pub fn tax_rate(&self) -> Rate {
        self.tax_rate
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Number of units across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|line| line.quantity).sum()
    }

    // =========================================================================
    // Pricing
    // =========================================================================

    fn recompute(&mut self) {
        self.reprice(None);
    }

    /// Runs the Pricing Engine. `now` overrides the discount's acceptance
    /// time for the validity-window check.
    fn reprice(&mut self, now: Option<DateTime<Utc>>) {
        let subtotal = calculate_subtotal(&self.items);

        let mut discount_error = None;
        let discount = self.discount.as_ref().and_then(|applied| {
            let at = now.unwrap_or(applied.applied_at);
            let check = validate_discount(&applied.discount, subtotal, at);
            if check.is_valid {
                Some(&applied.discount)
            } else {
                discount_error = check.error;
                None
            }
        });

        let adjustments = PricingAdjustments {
            tip: self.tip,
            discount,
            loyalty_points: self.loyalty_points,
            customer_points: self.customer.as_ref().map_or(0, |c| c.loyalty_points),
        };

        let mut totals = price_order(&self.items, &adjustments, self.tax_rate);
        if !self.items.is_empty() {
            totals.discount_error = discount_error;
        }
        self.totals = totals;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::DiscountKind;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn product(id: &str, cents: i64, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            price: Money::from_cents(cents),
            category: "Mains".to_string(),
            stock,
            is_active: true,
            allergens: vec![],
        }
    }

    fn customer(points: i64) -> Customer {
        Customer {
            id: "cust-1".to_string(),
            name: "Ana Lima".to_string(),
            email: None,
            phone: None,
            loyalty_points: points,
            dietary_preferences: vec![],
        }
    }

    fn save5() -> Discount {
        Discount {
            code: "SAVE5".to_string(),
            description: None,
            kind: DiscountKind::Fixed {
                amount: Money::from_cents(500),
            },
            min_order_amount: Money::from_cents(2000),
            valid_from: None,
            valid_until: None,
            usage_limit: None,
            usage_count: 0,
            is_active: true,
        }
    }

    #[test]
    fn test_add_merges_same_product_and_notes() {
        let mut draft = OrderDraft::default();
        let first = draft.add_item(product("a", 1000, 10), 1, None).unwrap();
        let second = draft.add_item(product("a", 1000, 10), 2, None).unwrap();

        assert_eq!(first, second);
        assert_eq!(draft.item_count(), 1);
        assert_eq!(draft.items()[0].quantity, 3);
        assert_eq!(draft.items()[0].total_price.cents(), 3000);
    }

    #[test]
    fn test_add_with_different_notes_is_new_line() {
        let mut draft = OrderDraft::default();
        draft.add_item(product("a", 1000, 10), 1, None).unwrap();
        draft.add_item(product("a", 1000, 10), 1, Some("no onions")).unwrap();

        assert_eq!(draft.item_count(), 2);
        assert_eq!(draft.total_quantity(), 2);
    }

    #[test]
    fn test_add_rejects_over_stock() {
        let mut draft = OrderDraft::default();
        draft.add_item(product("a", 1000, 3), 2, None).unwrap();

        let err = draft.add_item(product("a", 1000, 3), 2, None).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock { available: 3, requested: 4, .. }
        ));
        // Nothing was clamped
        assert_eq!(draft.items()[0].quantity, 2);
    }

    #[test]
    fn test_add_rejects_inactive_and_bad_quantity() {
        let mut draft = OrderDraft::default();
        let inactive = Product {
            is_active: false,
            ..product("a", 1000, 10)
        };
        assert!(matches!(
            draft.add_item(inactive, 1, None),
            Err(CoreError::ProductInactive(_))
        ));
        assert!(matches!(
            draft.add_item(product("a", 1000, 10), 0, None),
            Err(CoreError::Validation(_))
        ));
        assert!(draft.is_empty());
    }

    #[test]
    fn test_add_rejects_price_that_would_overflow_totals() {
        let mut draft = OrderDraft::default();
        assert!(matches!(
            draft.add_item(product("gold", i64::MAX / 2, 10), 3, None),
            Err(CoreError::Validation(crate::error::ValidationError::OutOfRange { .. }))
        ));
        assert!(draft.is_empty());

        assert!(matches!(
            draft.set_tip(TipSelection::Amount(Money::from_cents(i64::MAX))),
            Err(CoreError::Validation(_))
        ));
        assert_eq!(draft.tip(), TipSelection::None);
    }

    #[test]
    fn test_set_quantity_and_zero_removes() {
        let mut draft = OrderDraft::default();
        let id = draft.add_item(product("a", 1000, 5), 1, None).unwrap();

        draft.set_item_quantity(&id, 4).unwrap();
        assert_eq!(draft.totals().subtotal.cents(), 4000);

        assert!(draft.set_item_quantity(&id, 6).is_err());

        draft.set_item_quantity(&id, 0).unwrap();
        assert!(draft.is_empty());
    }

    #[test]
    fn test_unknown_line() {
        let mut draft = OrderDraft::default();
        assert!(matches!(
            draft.remove_item("missing"),
            Err(CoreError::ItemNotFound(_))
        ));
    }

    #[test]
    fn test_removing_last_item_resets_totals() {
        let mut draft = OrderDraft::default();
        let id = draft.add_item(product("a", 1899, 10), 2, None).unwrap();
        draft
            .set_tip(TipSelection::Percent(Rate::from_percent(10)))
            .unwrap();
        assert!(draft.totals().total.is_positive());

        draft.remove_item(&id).unwrap();

        let totals = draft.totals();
        assert!(totals.subtotal.is_zero());
        assert!(totals.tax.is_zero());
        assert!(totals.tip_amount.is_zero());
        assert!(totals.total.is_zero());
        assert!(!totals.checkout_enabled());
        // Still the same open draft
        assert_eq!(draft.tip(), TipSelection::Percent(Rate::from_percent(10)));
    }

    #[test]
    fn test_two_burgers_with_tip() {
        let mut draft = OrderDraft::default();
        draft.add_item(product("burger", 1899, 10), 2, None).unwrap();
        draft
            .set_tip(TipSelection::Percent(Rate::from_percent(10)))
            .unwrap();

        assert_eq!(draft.totals().total.cents(), 4482);
    }

    #[test]
    fn test_discount_and_loyalty_flow() {
        let mut draft = OrderDraft::default();
        draft.add_item(product("a", 1699, 10), 3, None).unwrap();
        draft.set_customer(Some(customer(250)));
        draft.apply_discount(save5(), now()).unwrap();
        draft.redeem_loyalty_points(100).unwrap();

        let totals = draft.totals();
        assert_eq!(totals.subtotal.cents(), 5097);
        assert_eq!(totals.tax.cents(), 408);
        assert_eq!(totals.discount_amount.cents(), 500);
        assert_eq!(totals.loyalty_discount.cents(), 1000);
        assert_eq!(totals.total.cents(), 4005);
    }

    #[test]
    fn test_discount_below_minimum_is_rejected() {
        let mut draft = OrderDraft::default();
        draft.add_item(product("a", 1000, 10), 1, None).unwrap();

        let err = draft.apply_discount(save5(), now()).unwrap_err();
        match err {
            CoreError::DiscountRejected { code, reason } => {
                assert_eq!(code, "SAVE5");
                assert!(!reason.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(draft.discount().is_none());
        assert!(draft.totals().discount_amount.is_zero());
    }

    #[test]
    fn test_discount_revalidated_when_subtotal_drops() {
        let mut draft = OrderDraft::default();
        let id = draft.add_item(product("a", 1000, 10), 3, None).unwrap();
        draft.apply_discount(save5(), now()).unwrap();
        assert_eq!(draft.totals().discount_amount.cents(), 500);

        draft.set_item_quantity(&id, 1).unwrap();

        // Held, but contributes nothing below the minimum
        assert!(draft.discount().is_some());
        assert!(draft.totals().discount_amount.is_zero());
        assert!(draft.totals().discount_error.is_some());

        draft.set_item_quantity(&id, 2).unwrap();
        assert_eq!(draft.totals().discount_amount.cents(), 500);
        assert!(draft.totals().discount_error.is_none());
    }

    #[test]
    fn test_loyalty_requires_customer_and_respects_cap() {
        let mut draft = OrderDraft::default();
        draft.add_item(product("a", 1500, 10), 1, None).unwrap();

        assert!(matches!(
            draft.redeem_loyalty_points(50),
            Err(CoreError::NoCustomer)
        ));

        draft.set_customer(Some(customer(900)));
        assert_eq!(draft.max_redeemable_points(), 100);
        assert!(matches!(
            draft.redeem_loyalty_points(101),
            Err(CoreError::LoyaltyRedemptionExceeded { requested: 101, max: 100 })
        ));

        draft.redeem_loyalty_points(100).unwrap();
        assert_eq!(draft.totals().loyalty_points_applied, 100);
    }

    #[test]
    fn test_clearing_customer_clears_redemption() {
        let mut draft = OrderDraft::default();
        draft.add_item(product("a", 5000, 10), 1, None).unwrap();
        draft.set_customer(Some(customer(300)));
        draft.redeem_loyalty_points(200).unwrap();

        draft.set_customer(None);

        assert_eq!(draft.loyalty_points(), 0);
        assert!(draft.totals().loyalty_discount.is_zero());
    }

    #[test]
    fn test_finalize_builds_completed_order_and_resets() {
        let mut draft = OrderDraft::default();
        draft.add_item(product("burger", 1899, 10), 2, None).unwrap();
        draft.set_customer(Some(customer(0)));
        draft.set_notes(Some("table 4")).unwrap();
        let draft_id = draft.id().to_string();

        let order = draft.finalize(PaymentMethod::Card, now()).unwrap();

        assert_eq!(order.id, draft_id);
        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(order.payment_status, PaymentStatus::Paid);
        assert_eq!(order.payment_method, Some(PaymentMethod::Card));
        assert_eq!(order.completed_at, Some(now()));
        assert_eq!(order.loyalty_points_earned, 37);
        assert_eq!(order.customer_id.as_deref(), Some("cust-1"));
        assert_eq!(order.notes.as_deref(), Some("table 4"));
        assert_eq!(order.total.cents(), 3798 + 304);

        assert!(draft.is_empty());
        assert_ne!(draft.id(), draft_id);
        assert!(draft.customer().is_none());
    }

    #[test]
    fn test_finalize_drops_discount_expired_since_applied() {
        let mut draft = OrderDraft::default();
        draft.add_item(product("a", 3000, 10), 1, None).unwrap();
        let discount = Discount {
            valid_until: Some(now() + Duration::minutes(5)),
            ..save5()
        };
        draft.apply_discount(discount, now()).unwrap();

        let order = draft
            .finalize(PaymentMethod::Cash, now() + Duration::hours(1))
            .unwrap();

        assert!(order.discount_code.is_none());
        assert!(order.discount_amount.is_zero());
    }

    #[test]
    fn test_finalize_empty_draft_fails() {
        let mut draft = OrderDraft::default();
        assert!(matches!(
            draft.finalize(PaymentMethod::Cash, now()),
            Err(CoreError::EmptyOrder)
        ));
    }

    #[test]
    fn test_reset_keeps_tax_rate() {
        let mut draft = OrderDraft::new(Rate::from_bps(825));
        draft.add_item(product("a", 1000, 10), 1, None).unwrap();

        draft.reset();

        assert!(draft.is_empty());
        assert_eq!(draft.tax_rate(), Rate::from_bps(825));
        assert_eq!(draft.totals().tax_rate, Rate::from_bps(825));
    }
}
