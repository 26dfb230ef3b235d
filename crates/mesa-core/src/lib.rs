//! # mesa-core: Checkout Pricing Core for Mesa POS
//!
//! Everything the register needs to build and price an order, as pure
//! functions and plain values. No I/O happens in this crate.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Mesa POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Register (apps/register)                       │   │
//! │  │    add_item, apply_discount, redeem_points, checkout, ...       │   │
//! │  └───────────────┬─────────────────────────────┬───────────────────┘   │
//! │                  │                             │                        │
//! │  ┌───────────────▼─────────────────┐   ┌───────▼───────────────────┐   │
//! │  │    ★ mesa-core (THIS CRATE) ★   │   │   mesa-data               │   │
//! │  │                                 │   │   DataSource trait        │   │
//! │  │  draft ──► pricing ◄── discount │   │   live (HTTP) / fixture   │   │
//! │  │    │          │                 │   └───────────────────────────┘   │
//! │  │  types      money     roles     │                                   │
//! │  │                                 │                                   │
//! │  │  NO I/O • NO CLOCK • NO GLOBALS │                                   │
//! │  └─────────────────────────────────┘                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Customer, Order, Discount, ...)
//! - [`money`] - Integer-cent money
//! - [`pricing`] - Pricing Engine: subtotal, tax, tip, discount, loyalty, total
//! - [`discount`] - Discount Validator
//! - [`draft`] - Order Draft Store: the order being rung up
//! - [`roles`] - Staff roles and what they may do
//! - [`validation`] - Input shape checks
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use mesa_core::draft::OrderDraft;
//! use mesa_core::{Money, Product, Rate, TipSelection, DEFAULT_TAX_RATE};
//!
//! let burger = Product {
//!     id: "burger".into(),
//!     name: "Classic Burger".into(),
//!     price: Money::from_cents(1899),
//!     category: "Mains".into(),
//!     stock: 20,
//!     is_active: true,
//!     allergens: vec![],
//! };
//!
//! let mut draft = OrderDraft::new(DEFAULT_TAX_RATE);
//! draft.add_item(burger, 2, None).unwrap();
//! draft.set_tip(TipSelection::Percent(Rate::from_percent(10))).unwrap();
//!
//! assert_eq!(draft.totals().total.cents(), 4482); // $44.82
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod discount;
pub mod draft;
pub mod error;
pub mod money;
pub mod pricing;
pub mod roles;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use discount::{validate_discount, DiscountValidation};
pub use draft::OrderDraft;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::{price_order, OrderTotals, PricingAdjustments};
pub use roles::{Permission, Role};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default sales tax in basis points (8%).
///
/// Stores override it through the register's `[pricing]` config section.
pub const DEFAULT_TAX_RATE_BPS: u32 = 800;

/// [`DEFAULT_TAX_RATE_BPS`] as a [`Rate`].
pub const DEFAULT_TAX_RATE: Rate = Rate::from_bps(DEFAULT_TAX_RATE_BPS);

/// Value of one loyalty point, in cents.
pub const LOYALTY_POINT_VALUE_CENTS: i64 = 10;

/// Points unlocked for redemption by every full $10 of subtotal.
pub const LOYALTY_REDEMPTION_POINTS_PER_TEN: i64 = 100;

/// Maximum lines in a single order.
pub const MAX_ORDER_LINES: usize = 100;

/// Maximum quantity on a single line
///
/// Catches fat-finger entries (1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Largest unit price or fixed tip accepted, in cents ($1,000,000).
///
/// A full order (100 lines of 999 units at this price) stays far inside
/// `i64`, so totals never overflow.
pub const MAX_AMOUNT_CENTS: i64 = 100_000_000;

/// Maximum length of order and line notes, in characters.
pub const MAX_NOTES_LENGTH: usize = 500;
