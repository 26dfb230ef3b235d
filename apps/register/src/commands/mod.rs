//! # Register Commands
//!
//! Every operation a cashier (or the kitchen) can run against a session.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (exports)
//! ├── catalog.rs   ◄─── Menu and customer directory
//! ├── order.rs     ◄─── Draft lines, customer, notes, tip, loyalty
//! ├── discount.rs  ◄─── Discount codes
//! └── checkout.rs  ◄─── Payment, kitchen status, cancellation
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  CLI / UI                                                               │
//! │  ────────                                                               │
//! │  mesa-register quote --item burger:2 --tip 10%                          │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  pub async fn add_item(                                                 │
//! │      source: &SourceState,    ◄── Only the state it needs              │
//! │      draft: &DraftState,                                                │
//! │      session: &SessionState,  ◄── Role gate                            │
//! │      product_id: &str,                                                  │
//! │      quantity: i64,                                                     │
//! │      notes: Option<&str>,                                               │
//! │  ) -> Result<DraftResponse, ApiError>                                   │
//! │         │                                                               │
//! │         │ 1. session.require(Permission::TakeOrders)?                   │
//! │         │ 2. source.get_product(id).await?        (no lock held)        │
//! │         │ 3. draft.with_draft_mut(|d| d.add_item(..))                   │
//! │         ▼                                                               │
//! │  DraftResponse (items, totals, checkout_enabled)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The draft lock is never held across an `.await`.

pub mod catalog;
pub mod checkout;
pub mod discount;
pub mod order;

pub use checkout::CheckoutResponse;
pub use order::DraftResponse;
