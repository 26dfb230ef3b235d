//! # Domain Types
//!
//! Core domain types used throughout Mesa POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Order       │   │    Discount     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id (UUID)      │   │  code           │       │
//! │  │  price          │   │  items          │   │  kind           │       │
//! │  │  stock          │   │  status         │   │  min order      │       │
//! │  │  allergens      │   │  totals         │   │  window, usage  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Customer     │   │  OrderStatus    │   │ PaymentMethod   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  loyalty_points │   │  Open           │   │  Cash           │       │
//! │  │  dietary prefs  │   │  Preparing      │   │  Card           │       │
//! │  └─────────────────┘   │  Ready          │   │  EWallet        │       │
//! │                        │  Completed      │   └─────────────────┘       │
//! │                        │  Cancelled      │                              │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All types serialize with camelCase field names, matching the backend API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;

// =============================================================================
// Rate
// =============================================================================

/// A rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 800 bps = 8% (the default sales tax), 1500 bps = a 15% tip.
///
/// The same type carries tax rates, tip percentages and percentage discounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rate(u32);

impl Rate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Creates a rate from a whole percentage (15 → 15%).
    #[inline]
    pub const fn from_percent(pct: u32) -> Self {
        Rate(pct * 100)
    }

    /// Creates a rate from a fractional percentage (8.25 → 825 bps).
    ///
    /// Negative input yields zero.
    pub fn from_percentage(pct: f64) -> Self {
        Rate((pct * 100.0).round().max(0.0) as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::zero()
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 100 == 0 {
            write!(f, "{}%", self.0 / 100)
        } else {
            write!(f, "{:.2}%", self.percentage())
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A menu item or retail product available for sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Backend identifier.
    pub id: String,

    /// Display name shown to cashier and on receipt.
    pub name: String,

    /// Unit price (never negative).
    pub price: Money,

    /// Menu category ("Mains", "Drinks", ...).
    #[serde(default)]
    pub category: String,

    /// Units available right now.
    pub stock: i64,

    /// Inactive products cannot be added to an order.
    #[serde(default = "default_true")]
    pub is_active: bool,

    /// Allergen tags ("gluten", "nuts", ...).
    #[serde(default)]
    pub allergens: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl Product {
    /// Checks whether `quantity` units can be taken from current stock.
    #[inline]
    pub fn has_stock_for(&self, quantity: i64) -> bool {
        quantity <= self.stock
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer from the directory, with their loyalty balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Points available for redemption (never negative).
    #[serde(default)]
    pub loyalty_points: i64,
    /// Dietary preference tags ("vegan", "halal", ...).
    #[serde(default)]
    pub dietary_preferences: Vec<String>,
}

// =============================================================================
// Order Status
// =============================================================================

/// Lifecycle of an order.
///
/// ## State Machine
/// ```text
///   Open ──► Preparing ──► Ready ──► Completed
///     │          │           │
///     └──────────┴───────────┴──────► Cancelled
/// ```
/// Forward moves may skip steps (a counter sale completes straight from
/// `Open` at checkout). `Completed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum OrderStatus {
    /// Items are being entered.
    #[default]
    Open,
    /// Sent to the kitchen.
    Preparing,
    /// Ready for pickup / serving.
    Ready,
    /// Paid and handed over.
    Completed,
    /// Abandoned before completion.
    Cancelled,
}

impl OrderStatus {
    /// Position along the forward path; `None` for `Cancelled`.
    fn rank(&self) -> Option<u8> {
        match self {
            OrderStatus::Open => Some(0),
            OrderStatus::Preparing => Some(1),
            OrderStatus::Ready => Some(2),
            OrderStatus::Completed => Some(3),
            OrderStatus::Cancelled => None,
        }
    }

    /// Returns true for `Completed` and `Cancelled`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Checks whether the state machine allows moving to `next`.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match (self.rank(), next.rank()) {
            (_, None) => true,
            (Some(current), Some(target)) => target > current,
            (None, Some(_)) => false,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OrderStatus::Open => "OPEN",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::Ready => "READY",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
        };
        f.write_str(label)
    }
}

// =============================================================================
// Payment
// =============================================================================

/// Whether an order has been paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum PaymentMethod {
    Cash,
    Card,
    #[serde(rename = "EWALLET")]
    EWallet,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Cash => write!(f, "Cash"),
            PaymentMethod::Card => write!(f, "Card"),
            PaymentMethod::EWallet => write!(f, "E-Wallet"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "card" | "credit" | "debit" => Ok(PaymentMethod::Card),
            "ewallet" | "e-wallet" | "wallet" => Ok(PaymentMethod::EWallet),
            _ => Err(ValidationError::NotAllowed {
                field: "payment method".to_string(),
                allowed: vec!["cash".into(), "card".into(), "ewallet".into()],
            }),
        }
    }
}

// =============================================================================
// Order Item
// =============================================================================

/// A line in an order.
///
/// ## Snapshot Pattern
/// `product` is a frozen copy taken when the line was added, so price and
/// stock checks stay consistent even if the catalog changes mid-order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderItem {
    /// Line identifier (UUID v4).
    pub id: String,
    pub product: Product,
    pub quantity: i64,
    /// Per-line kitchen notes ("no onions").
    pub notes: Option<String>,
    /// `product.price × quantity`, kept in sync by every mutation.
    pub total_price: Money,
}

impl OrderItem {
    /// Creates a new line with a fresh id.
    pub fn new(product: Product, quantity: i64, notes: Option<String>) -> Self {
        let total_price = product.price.multiply_quantity(quantity);
        OrderItem {
            id: Uuid::new_v4().to_string(),
            product,
            quantity,
            notes,
            total_price,
        }
    }

    /// Returns the product id of this line.
    #[inline]
    pub fn product_id(&self) -> &str {
        &self.product.id
    }

    /// Checks whether this line merges with an add of `product_id` + `notes`.
    pub fn matches(&self, product_id: &str, notes: Option<&str>) -> bool {
        self.product_id() == product_id && self.notes.as_deref() == notes
    }

    /// Sets the quantity and recomputes the line total.
    pub fn set_quantity(&mut self, quantity: i64) {
        self.quantity = quantity;
        self.total_price = self.product.price.multiply_quantity(quantity);
    }
}

// =============================================================================
// Discount
// =============================================================================

/// How a discount reduces the subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "camelCase")]
#[ts(export)]
pub enum DiscountKind {
    /// A share of the subtotal.
    Percentage { rate: Rate },
    /// A flat amount off.
    Fixed { amount: Money },
}

/// A discount code as returned by the backend lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Discount {
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    pub kind: DiscountKind,
    /// Subtotal required before the code applies.
    #[serde(default)]
    pub min_order_amount: Money,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub valid_until: Option<DateTime<Utc>>,
    /// Maximum redemptions (`None` = unlimited).
    #[serde(default)]
    pub usage_limit: Option<i64>,
    #[serde(default)]
    pub usage_count: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

// =============================================================================
// Tip
// =============================================================================

/// The tip chosen at checkout: a preset/custom percentage or a fixed amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
#[ts(export)]
pub enum TipSelection {
    #[default]
    None,
    Percent(Rate),
    Amount(Money),
}

// =============================================================================
// Order
// =============================================================================

/// An order: the finalized form of a draft, as sent to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub items: Vec<OrderItem>,
    pub customer_id: Option<String>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<PaymentMethod>,
    pub subtotal: Money,
    pub tax: Money,
    pub tax_rate: Rate,
    pub discount_code: Option<String>,
    pub discount_amount: Money,
    pub tip_amount: Money,
    pub loyalty_points_redeemed: i64,
    pub loyalty_discount: Money,
    pub loyalty_points_earned: i64,
    pub total: Money,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Moves the order along its state machine.
    ///
    /// ## Errors
    /// `InvalidStatusTransition` when the move is backwards or starts from a
    /// terminal state.
    pub fn transition_to(&mut self, next: OrderStatus, now: DateTime<Utc>) -> CoreResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(CoreError::InvalidStatusTransition {
                order_id: self.id.clone(),
                from: self.status,
                to: next,
            });
        }

        self.status = next;
        self.updated_at = now;
        if next == OrderStatus::Completed {
            self.completed_at = Some(now);
        }
        Ok(())
    }

    /// Number of units across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
