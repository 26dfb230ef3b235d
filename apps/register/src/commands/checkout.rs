//! # Checkout Commands
//!
//! Payment for the current draft, and status changes on submitted orders.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Checkout                                             │
//! │                                                                         │
//! │  1. lock draft ─► snapshot ─► unlock                                    │
//! │  2. clone.finalize(method, now)      Completed + Paid, points earned    │
//! │  3. source.submit_order(&order).await                                   │
//! │          │                                 │                            │
//! │       success                           failure                         │
//! │          │                                 │                            │
//! │          ▼                                 ▼                            │
//! │  lock draft, reset it if it still    log error, PaymentError;           │
//! │  equals the snapshot; receipt        draft untouched, cashier           │
//! │                                      can retry or change method         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Order Status (kitchen)
//! ```text
//!   Open ──► Preparing ──► Ready ──► Completed        advance_order
//!     │          │           │                        (AdvanceOrders)
//!     └──────────┴───────────┴──────► Cancelled       cancel_order
//!                                                     (CancelOrders)
//! ```

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, info};

use mesa_core::validation::validate_uuid;
use mesa_core::{Order, OrderStatus, PaymentMethod, Permission};
use mesa_data::DataError;

use crate::error::{ApiError, ErrorCode};
use crate::receipt::render_receipt;
use crate::state::{DraftState, RegisterConfig, SessionState, SourceState};

/// A completed checkout.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    /// The order as the backend recorded it.
    pub order: Order,
    /// Printable receipt text.
    pub receipt: String,
}

/// Pays for the current draft.
///
/// ## Behavior
/// - The draft is finalized on a copy; the shared draft is only reset once
///   the backend accepts the order
/// - A draft changed by another command while the payment was in flight is
///   left alone
///
/// ## Errors
/// - `BusinessLogic` for an empty draft or a zero total
/// - `PaymentError` when the backend declines or cannot be reached
pub async fn checkout(
    source: &SourceState,
    draft: &DraftState,
    session: &SessionState,
    config: &RegisterConfig,
    payment_method: PaymentMethod,
) -> Result<CheckoutResponse, ApiError> {
    debug!(payment_method = %payment_method, "checkout command");
    session.require(Permission::Checkout)?;

    let paid = draft.snapshot();
    if !paid.is_empty() && !paid.totals().checkout_enabled() {
        return Err(ApiError::new(
            ErrorCode::BusinessLogic,
            "Order total must be greater than zero",
        ));
    }

    let customer_name = paid.customer().map(|c| c.name.clone());
    let order = paid.clone().finalize(payment_method, Utc::now())?;

    let recorded = match source.inner().submit_order(&order).await {
        Ok(recorded) => recorded,
        Err(e) => {
            error!(order_id = %order.id, total = %order.total, error = %e, "Checkout failed");
            return Err(payment_error(e));
        }
    };

    let reset = draft.with_draft_mut(|d| {
        if *d == paid {
            d.reset();
            true
        } else {
            false
        }
    });
    if !reset {
        debug!(order_id = %recorded.id, "Draft changed during checkout; keeping it");
    }

    info!(
        order_id = %recorded.id,
        total = %recorded.total,
        payment_method = %payment_method,
        units = recorded.total_quantity(),
        points_earned = recorded.loyalty_points_earned,
        "Checkout completed"
    );

    let receipt = render_receipt(&recorded, config, customer_name.as_deref());
    Ok(CheckoutResponse {
        order: recorded,
        receipt,
    })
}

/// Backend refusals keep their message; anything else gets a generic one.
fn payment_error(err: DataError) -> ApiError {
    match err {
        DataError::Rejected { status, message } if (400..500).contains(&status) => {
            ApiError::payment(message)
        }
        DataError::Transport(_) => {
            ApiError::payment("Payment service is unreachable, please try again")
        }
        _ => ApiError::payment("Payment could not be processed"),
    }
}

/// Moves a submitted order along the kitchen flow.
///
/// Moving to `Cancelled` needs `CancelOrders`; every other move needs
/// `AdvanceOrders`.
pub async fn advance_order(
    source: &SourceState,
    session: &SessionState,
    order_id: &str,
    status: OrderStatus,
) -> Result<Order, ApiError> {
    debug!(order_id = %order_id, status = %status, "advance_order command");
    session.require(match status {
        OrderStatus::Cancelled => Permission::CancelOrders,
        _ => Permission::AdvanceOrders,
    })?;
    validate_uuid(order_id).map_err(|e| ApiError::validation(e.to_string()))?;

    let mut order = source.inner().get_order(order_id).await?;
    let from = order.status;
    order.transition_to(status, Utc::now())?;

    let saved = source.inner().update_order(&order).await?;
    info!(order_id = %saved.id, from = %from, to = %saved.status, "Order status changed");

    Ok(saved)
}

pub async fn cancel_order(
    source: &SourceState,
    session: &SessionState,
    order_id: &str,
) -> Result<Order, ApiError> {
    advance_order(source, session, order_id, OrderStatus::Cancelled).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::order::add_item;
    use async_trait::async_trait;
    use mesa_core::{Customer, Discount, Product, Role};
    use mesa_data::{DataResult, DataSource, FixtureSource};
    use std::sync::Arc;

    /// Fixture backend where another command adds fries to the shared draft
    /// while the payment is being processed.
    struct FriesDuringPayment {
        inner: FixtureSource,
        draft: DraftState,
    }

    #[async_trait]
    impl DataSource for FriesDuringPayment {
        fn name(&self) -> &'static str {
            "fries-during-payment"
        }

        async fn list_products(&self) -> DataResult<Vec<Product>> {
            self.inner.list_products().await
        }

        async fn get_product(&self, id: &str) -> DataResult<Product> {
            self.inner.get_product(id).await
        }

        async fn list_customers(&self) -> DataResult<Vec<Customer>> {
            self.inner.list_customers().await
        }

        async fn get_customer(&self, id: &str) -> DataResult<Customer> {
            self.inner.get_customer(id).await
        }

        async fn lookup_discount(&self, code: &str) -> DataResult<Discount> {
            self.inner.lookup_discount(code).await
        }

        async fn submit_order(&self, order: &Order) -> DataResult<Order> {
            let fries = self.inner.get_product("truffle-fries").await?;
            self.draft
                .with_draft_mut(|d| d.add_item(fries, 1, None))
                .unwrap();
            self.inner.submit_order(order).await
        }

        async fn get_order(&self, id: &str) -> DataResult<Order> {
            self.inner.get_order(id).await
        }

        async fn update_order(&self, order: &Order) -> DataResult<Order> {
            self.inner.update_order(order).await
        }
    }

    #[tokio::test]
    async fn test_checkout_resets_draft() {
        let source = SourceState::new(Arc::new(FixtureSource::new()));
        let draft = DraftState::default();
        let session = SessionState::new(Role::Cashier);
        let config = RegisterConfig::default();

        add_item(&source, &draft, &session, "burger", 2, None)
            .await
            .unwrap();
        let draft_id = draft.with_draft(|d| d.id().to_string());

        let resp = checkout(&source, &draft, &session, &config, PaymentMethod::Cash)
            .await
            .unwrap();
        assert_eq!(resp.order.id, draft_id);
        assert_eq!(resp.order.status, OrderStatus::Completed);
        assert_eq!(resp.order.total_quantity(), 2);
        assert!(resp.receipt.contains("Paid by Cash"));

        assert!(draft.with_draft(|d| d.is_empty()));
        assert_ne!(draft.with_draft(|d| d.id().to_string()), draft_id);
    }

    #[tokio::test]
    async fn test_lines_added_during_payment_are_kept() {
        let draft = DraftState::default();
        let source = SourceState::new(Arc::new(FriesDuringPayment {
            inner: FixtureSource::new(),
            draft: draft.clone(),
        }));
        let session = SessionState::new(Role::Cashier);

        add_item(&source, &draft, &session, "burger", 2, None)
            .await
            .unwrap();
        let resp = checkout(&source, &draft, &session, &RegisterConfig::default(), PaymentMethod::Card)
            .await
            .unwrap();

        let paid: Vec<&str> = resp.order.items.iter().map(|i| i.product_id()).collect();
        assert_eq!(paid, vec!["burger"]);

        let unpaid = draft.with_draft(|d| {
            d.items()
                .iter()
                .map(|i| i.product_id().to_string())
                .collect::<Vec<_>>()
        });
        assert_eq!(unpaid, vec!["burger".to_string(), "truffle-fries".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_draft_rejected() {
        let source = SourceState::new(Arc::new(FixtureSource::new()));
        let err = checkout(
            &source,
            &DraftState::default(),
            &SessionState::new(Role::Cashier),
            &RegisterConfig::default(),
            PaymentMethod::Card,
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
    }

    #[tokio::test]
    async fn test_completed_orders_cannot_move() {
        let source = SourceState::new(Arc::new(FixtureSource::new()));
        let draft = DraftState::default();
        let cashier = SessionState::new(Role::Cashier);

        add_item(&source, &draft, &cashier, "iced-latte", 1, None)
            .await
            .unwrap();
        let resp = checkout(&source, &draft, &cashier, &RegisterConfig::default(), PaymentMethod::Card)
            .await
            .unwrap();

        let kitchen = SessionState::new(Role::Kitchen);
        let err = advance_order(&source, &kitchen, &resp.order.id, OrderStatus::Ready)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);

        let err = cancel_order(&source, &kitchen, &resp.order.id)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[test]
    fn test_payment_error_messages() {
        let err = payment_error(DataError::Rejected {
            status: 402,
            message: "Card declined".to_string(),
        });
        assert_eq!(err.code, ErrorCode::PaymentError);
        assert_eq!(err.message, "Card declined");

        let err = payment_error(DataError::Rejected {
            status: 500,
            message: "stack trace".to_string(),
        });
        assert_eq!(err.message, "Payment could not be processed");
    }
}
