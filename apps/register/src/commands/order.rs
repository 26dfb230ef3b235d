//! # Order Commands
//!
//! Commands that build up the current draft.
//!
//! ## Draft Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Draft Lifecycle                                      │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐        │
//! │  │  Empty   │────►│  Lines   │────►│ Customer │────►│ Checkout │        │
//! │  │  Draft   │     │          │     │ Tip, Pts │     │          │        │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘        │
//! │                        │                 │               │              │
//! │                   add_item         attach_customer  checkout.rs         │
//! │                   update_item_     set_tip                              │
//! │                   quantity         redeem_loyalty_                      │
//! │                   remove_item      points                               │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                   clear_order ──────────────────────►                   │
//! │                                                      (back to empty)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::debug;

use mesa_core::validation::validate_uuid;
use mesa_core::{Customer, OrderDraft, OrderItem, OrderTotals, Permission, TipSelection};

use crate::error::ApiError;
use crate::state::{DraftState, SessionState, SourceState};

/// The draft as the order panel shows it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftResponse {
    pub order_id: String,
    pub items: Vec<OrderItem>,
    pub totals: OrderTotals,
    pub customer: Option<Customer>,
    pub notes: Option<String>,
    pub tip: TipSelection,
    pub loyalty_points_requested: i64,
    pub max_redeemable_points: i64,
    pub item_count: usize,
    pub total_quantity: i64,
    pub checkout_enabled: bool,
}

impl From<&OrderDraft> for DraftResponse {
    fn from(draft: &OrderDraft) -> Self {
        DraftResponse {
            order_id: draft.id().to_string(),
            items: draft.items().to_vec(),
            totals: draft.totals().clone(),
            customer: draft.customer().cloned(),
            notes: draft.notes().map(str::to_string),
            tip: draft.tip(),
            loyalty_points_requested: draft.loyalty_points(),
            max_redeemable_points: draft.max_redeemable_points(),
            item_count: draft.item_count(),
            total_quantity: draft.total_quantity(),
            checkout_enabled: draft.totals().checkout_enabled(),
        }
    }
}

/// Gets the current draft.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Order Panel (always visible)                                           │
/// │                                                                         │
/// │  ┌────────────────────────────────────────────────────────────────┐     │
/// │  │  ORDER                                            2 items      │     │
/// │  ├────────────────────────────────────────────────────────────────┤     │
/// │  │  Classic Burger          x2              $37.98                │     │
/// │  ├────────────────────────────────────────────────────────────────┤     │
/// │  │  Subtotal                                $37.98                │     │
/// │  │  Tax (8%)                                 $3.04                │     │
/// │  │  Tip                                      $3.80                │     │
/// │  │  ──────────────────────────────────────────────────            │     │
/// │  │  TOTAL                                   $44.82                │     │
/// │  └────────────────────────────────────────────────────────────────┘     │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn get_draft(draft: &DraftState) -> DraftResponse {
    debug!("get_draft command");
    draft.with_draft(|d| DraftResponse::from(d))
}

/// Adds a product to the draft.
///
/// ## Behavior
/// - Same product with the same notes: quantity increases
/// - Otherwise: added as a new line
/// - The product is fetched fresh, so the stock check uses current stock
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Cashier taps a menu tile                                               │
/// │                    │                                                    │
/// │                    ▼                                                    │
/// │  ┌────────────────────────────────────────────────────────────────┐     │
/// │  │  1. Fetch product from the data source (no lock held)          │     │
/// │  │  2. Lock draft, merge or add line, re-price                    │     │
/// │  │  3. Return updated draft                                       │     │
/// │  └────────────────────────────────────────────────────────────────┘     │
/// │                    │                                                    │
/// │                    ▼                                                    │
/// │  Order panel updates, or "Only 3 Classic Burger in stock"               │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn add_item(
    source: &SourceState,
    draft: &DraftState,
    session: &SessionState,
    product_id: &str,
    quantity: i64,
    notes: Option<&str>,
) -> Result<DraftResponse, ApiError> {
    debug!(product_id = %product_id, quantity, "add_item command");
    session.require(Permission::TakeOrders)?;

    let product = source.inner().get_product(product_id).await?;

    draft.with_draft_mut(|d| {
        d.add_item(product, quantity, notes)?;
        Ok::<_, ApiError>(DraftResponse::from(&*d))
    })
}

/// Sets a line's quantity. Zero removes the line.
pub fn update_item_quantity(
    draft: &DraftState,
    session: &SessionState,
    item_id: &str,
    quantity: i64,
) -> Result<DraftResponse, ApiError> {
    debug!(item_id = %item_id, quantity, "update_item_quantity command");
    session.require(Permission::TakeOrders)?;
    validate_uuid(item_id).map_err(|e| ApiError::validation(e.to_string()))?;

    draft.with_draft_mut(|d| {
        d.set_item_quantity(item_id, quantity)?;
        Ok::<_, ApiError>(DraftResponse::from(&*d))
    })
}

pub fn remove_item(
    draft: &DraftState,
    session: &SessionState,
    item_id: &str,
) -> Result<DraftResponse, ApiError> {
    debug!(item_id = %item_id, "remove_item command");
    session.require(Permission::TakeOrders)?;
    validate_uuid(item_id).map_err(|e| ApiError::validation(e.to_string()))?;

    draft.with_draft_mut(|d| {
        d.remove_item(item_id)?;
        Ok::<_, ApiError>(DraftResponse::from(&*d))
    })
}

/// Attaches a customer by id, or detaches with `None`.
///
/// Switching customers drops any loyalty redemption made for the previous
/// one.
pub async fn attach_customer(
    source: &SourceState,
    draft: &DraftState,
    session: &SessionState,
    customer_id: Option<&str>,
) -> Result<DraftResponse, ApiError> {
    debug!(customer_id = ?customer_id, "attach_customer command");
    session.require(Permission::TakeOrders)?;

    let customer = match customer_id {
        Some(id) => Some(source.inner().get_customer(id).await?),
        None => None,
    };

    Ok(draft.with_draft_mut(|d| {
        d.set_customer(customer);
        DraftResponse::from(&*d)
    }))
}

pub fn set_notes(
    draft: &DraftState,
    session: &SessionState,
    notes: Option<&str>,
) -> Result<DraftResponse, ApiError> {
    debug!(has_notes = notes.is_some(), "set_notes command");
    session.require(Permission::TakeOrders)?;

    draft.with_draft_mut(|d| {
        d.set_notes(notes)?;
        Ok::<_, ApiError>(DraftResponse::from(&*d))
    })
}

pub fn set_tip(
    draft: &DraftState,
    session: &SessionState,
    tip: TipSelection,
) -> Result<DraftResponse, ApiError> {
    debug!(tip = ?tip, "set_tip command");
    session.require(Permission::TakeOrders)?;

    draft.with_draft_mut(|d| {
        d.set_tip(tip)?;
        Ok::<_, ApiError>(DraftResponse::from(&*d))
    })
}

/// Redeems loyalty points for the attached customer.
///
/// ## Behavior
/// The customer's balance is re-read first so the cap reflects points
/// earned or spent at another register. Zero points cancels the redemption.
///
/// ## Errors
/// - `LoyaltyError` without a customer, or above the allowed maximum
pub async fn redeem_loyalty_points(
    source: &SourceState,
    draft: &DraftState,
    session: &SessionState,
    points: i64,
) -> Result<DraftResponse, ApiError> {
    debug!(points, "redeem_loyalty_points command");
    session.require(Permission::RedeemLoyalty)?;

    let customer_id = draft.with_draft(|d| d.customer().map(|c| c.id.clone()));
    let fresh = match customer_id.as_deref() {
        Some(id) => Some(source.inner().get_customer(id).await?),
        None => None,
    };

    draft.with_draft_mut(|d| {
        // Only refresh if the same customer is still attached
        if let Some(customer) = fresh {
            if d.customer().map(|c| c.id.as_str()) == Some(customer.id.as_str()) {
                d.set_customer(Some(customer));
            }
        }
        d.redeem_loyalty_points(points)?;
        Ok::<_, ApiError>(DraftResponse::from(&*d))
    })
}

/// Discards the draft and starts a new, empty one.
pub fn clear_order(draft: &DraftState, session: &SessionState) -> Result<DraftResponse, ApiError> {
    debug!("clear_order command");
    session.require(Permission::TakeOrders)?;

    Ok(draft.with_draft_mut(|d| {
        d.reset();
        DraftResponse::from(&*d)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use mesa_core::{Money, Rate, Role};
    use mesa_data::FixtureSource;
    use std::sync::Arc;

    fn setup() -> (SourceState, DraftState, SessionState) {
        (
            SourceState::new(Arc::new(FixtureSource::new())),
            DraftState::default(),
            SessionState::new(Role::Cashier),
        )
    }

    #[tokio::test]
    async fn test_add_and_update_item() {
        let (source, draft, session) = setup();

        let resp = add_item(&source, &draft, &session, "burger", 2, None)
            .await
            .unwrap();
        assert_eq!(resp.totals.subtotal, Money::from_cents(3798));
        assert!(resp.checkout_enabled);

        let line = resp.items[0].id.clone();
        let resp = update_item_quantity(&draft, &session, &line, 3).unwrap();
        assert_eq!(resp.total_quantity, 3);

        let err = remove_item(&draft, &session, "line-1").unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let resp = update_item_quantity(&draft, &session, &line, 0).unwrap();
        assert_eq!(resp.item_count, 0);
        assert_eq!(resp.totals.total, Money::zero());
        assert!(!resp.checkout_enabled);
    }

    #[tokio::test]
    async fn test_sold_out_product_rejected() {
        let (source, draft, session) = setup();

        let err = add_item(&source, &draft, &session, "seasonal-soup", 1, None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert!(draft.with_draft(|d| d.is_empty()));
    }

    #[tokio::test]
    async fn test_kitchen_cannot_take_orders() {
        let (source, draft, _) = setup();
        let kitchen = SessionState::new(Role::Kitchen);

        let err = add_item(&source, &draft, &kitchen, "burger", 1, None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn test_loyalty_requires_customer() {
        let (source, draft, session) = setup();
        add_item(&source, &draft, &session, "burger", 3, None)
            .await
            .unwrap();

        let err = redeem_loyalty_points(&source, &draft, &session, 100)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::LoyaltyError);

        attach_customer(&source, &draft, &session, Some("cust-001"))
            .await
            .unwrap();
        let resp = redeem_loyalty_points(&source, &draft, &session, 200)
            .await
            .unwrap();
        assert_eq!(resp.totals.loyalty_discount, Money::from_cents(2000));

        // Switching customers drops the redemption
        let resp = attach_customer(&source, &draft, &session, Some("cust-002"))
            .await
            .unwrap();
        assert_eq!(resp.loyalty_points_requested, 0);
    }

    #[tokio::test]
    async fn test_tip_and_clear() {
        let (source, draft, session) = setup();
        add_item(&source, &draft, &session, "burger", 2, None)
            .await
            .unwrap();

        let resp = set_tip(&draft, &session, TipSelection::Percent(Rate::from_percent(10))).unwrap();
        assert_eq!(resp.totals.total, Money::from_cents(4482));

        let before = resp.order_id;
        let resp = clear_order(&draft, &session).unwrap();
        assert_ne!(resp.order_id, before);
        assert!(resp.items.is_empty());
        assert_eq!(get_draft(&draft).order_id, resp.order_id);
    }
}
