//! # Discount Commands
//!
//! ## Apply Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cashier types "SAVE5" and taps Apply                                   │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │  source.lookup_discount("SAVE5")  ──── failed ────► discount cleared,   │
//! │                    │                                DiscountRejected /  │
//! │                    │                                backend error       │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │  draft.apply_discount(discount, now)                                    │
//! │     validator: active? window? usage? minimum? value?                   │
//! │          │                          │                                   │
//! │        valid                      invalid                               │
//! │          │                          │                                   │
//! │          ▼                          ▼                                   │
//! │  discount held, re-priced    draft holds no discount,                   │
//! │                              toast shows the validator's reason         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no retry: the cashier re-enters the code.

use chrono::Utc;
use tracing::{debug, warn};

use mesa_core::validation::validate_discount_code;
use mesa_core::Permission;
use mesa_data::DataError;

use crate::commands::order::DraftResponse;
use crate::error::{ApiError, ErrorCode};
use crate::state::{DraftState, SessionState, SourceState};

/// Looks up `code` and applies it to the draft.
///
/// Any failed lookup leaves the draft without a discount, including one
/// applied earlier.
///
/// ## Errors
/// - `DiscountRejected` for an unknown code or one the validator refuses
/// - `Unavailable` / `BackendError` when the lookup itself fails
/// - `Forbidden` for roles without `ApplyDiscounts`
pub async fn apply_discount(
    source: &SourceState,
    draft: &DraftState,
    session: &SessionState,
    code: &str,
) -> Result<DraftResponse, ApiError> {
    debug!(code = %code, "apply_discount command");
    session.require(Permission::ApplyDiscounts)?;

    let code = validate_discount_code(code).map_err(|e| ApiError::validation(e.to_string()))?;

    let discount = match source.inner().lookup_discount(&code).await {
        Ok(discount) => discount,
        Err(e) => {
            draft.with_draft_mut(|d| d.clear_discount());
            return Err(match e {
                DataError::NotFound { .. } => {
                    warn!(code = %code, "Unknown discount code");
                    ApiError::new(
                        ErrorCode::DiscountRejected,
                        format!("{}: Discount code not found", code),
                    )
                }
                other => {
                    warn!(code = %code, error = %other, "Discount lookup failed");
                    other.into()
                }
            });
        }
    };

    draft.with_draft_mut(|d| match d.apply_discount(discount, Utc::now()) {
        Ok(()) => Ok(DraftResponse::from(&*d)),
        Err(e) => {
            warn!(code = %code, error = %e, "Discount rejected");
            Err(ApiError::from(e))
        }
    })
}

pub fn remove_discount(
    draft: &DraftState,
    session: &SessionState,
) -> Result<DraftResponse, ApiError> {
    debug!("remove_discount command");
    session.require(Permission::ApplyDiscounts)?;

    Ok(draft.with_draft_mut(|d| {
        d.clear_discount();
        DraftResponse::from(&*d)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::order::add_item;
    use mesa_core::{Money, Role};
    use mesa_data::fixture::{discounts, menu};
    use mesa_data::{FixtureSource, LiveSource};
    use std::sync::Arc;
    use std::time::Duration;

    fn setup() -> (SourceState, DraftState, SessionState) {
        (
            SourceState::new(Arc::new(FixtureSource::new())),
            DraftState::default(),
            SessionState::new(Role::Cashier),
        )
    }

    #[tokio::test]
    async fn test_apply_and_remove() {
        let (source, draft, session) = setup();
        add_item(&source, &draft, &session, "burger", 2, None)
            .await
            .unwrap();

        let resp = apply_discount(&source, &draft, &session, " save5 ")
            .await
            .unwrap();
        assert_eq!(resp.totals.discount_code.as_deref(), Some("SAVE5"));
        assert_eq!(resp.totals.discount_amount, Money::from_cents(500));

        let resp = remove_discount(&draft, &session).unwrap();
        assert_eq!(resp.totals.discount_amount, Money::zero());
    }

    #[tokio::test]
    async fn test_below_minimum_leaves_no_discount() {
        let (source, draft, session) = setup();
        add_item(&source, &draft, &session, "truffle-fries", 1, None)
            .await
            .unwrap();

        let err = apply_discount(&source, &draft, &session, "SAVE5")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::DiscountRejected);
        assert!(err.message.contains("Minimum order of $20.00 required"));
        assert!(draft.with_draft(|d| d.discount().is_none()));
    }

    #[tokio::test]
    async fn test_unknown_code_clears_previous_discount() {
        let (source, draft, session) = setup();
        add_item(&source, &draft, &session, "burger", 2, None)
            .await
            .unwrap();
        apply_discount(&source, &draft, &session, "LUNCH10")
            .await
            .unwrap();

        let err = apply_discount(&source, &draft, &session, "NOPE")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::DiscountRejected);
        assert!(draft.with_draft(|d| d.discount().is_none()));
    }

    #[tokio::test]
    async fn test_unreachable_backend_clears_previous_discount() {
        // Nothing listens on the discard port
        let offline = LiveSource::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let source = SourceState::new(Arc::new(offline));
        let draft = DraftState::default();
        let session = SessionState::new(Role::Cashier);

        let burger = menu().into_iter().find(|p| p.id == "burger").unwrap();
        let lunch10 = discounts().into_iter().find(|d| d.code == "LUNCH10").unwrap();
        draft.with_draft_mut(|d| {
            d.add_item(burger, 2, None).unwrap();
            d.apply_discount(lunch10, Utc::now()).unwrap();
        });
        assert_eq!(draft.with_draft(|d| d.totals().discount_amount), Money::from_cents(380));

        let err = apply_discount(&source, &draft, &session, "SAVE5")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Unavailable);
        assert!(draft.with_draft(|d| d.discount().is_none()));
        assert_eq!(draft.with_draft(|d| d.totals().discount_amount), Money::zero());
    }

    #[tokio::test]
    async fn test_malformed_code_never_reaches_source() {
        let (source, draft, session) = setup();

        let err = apply_discount(&source, &draft, &session, "   ").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = apply_discount(&source, &draft, &session, "SAVE 5").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_kitchen_cannot_discount() {
        let (source, draft, _) = setup();
        let kitchen = SessionState::new(Role::Kitchen);

        let err = apply_discount(&source, &draft, &kitchen, "LUNCH10")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }
}
