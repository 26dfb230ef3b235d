//! # Fixture Data Source
//!
//! An in-memory backend with a small restaurant menu. Used for demos,
//! training mode and tests.
//!
//! ## Fixture Data
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Products   burger, pizza-margherita, caesar-salad, truffle-fries,      │
//! │             iced-latte, sparkling-water, lava-cake,                     │
//! │             seasonal-soup (sold out), lobster-roll (inactive)           │
//! │                                                                         │
//! │  Customers  cust-001 Ana Lima (250 pts)                                 │
//! │             cust-002 Ben Carter (1200 pts)                              │
//! │             cust-003 Chloe Nguyen (0 pts)                               │
//! │                                                                         │
//! │  Discounts  SAVE5      $5 off, $20 minimum                              │
//! │             LUNCH10    10% off                                          │
//! │             WELCOME15  15% off, usage limit reached                     │
//! │             SUMMER20   20% off, expired                                 │
//! │             STAFF50    50% off, inactive                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Submitted orders take stock off the menu, count discount usage and move
//! loyalty points, so a session behaves like a real backend.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use mesa_core::{
    Customer, Discount, DiscountKind, Money, Order, PaymentStatus, Product, Rate,
};
use tracing::{debug, info, warn};

use crate::error::{DataError, DataResult};
use crate::source::DataSource;

/// Mutable fixture state.
#[derive(Debug, Clone)]
struct FixtureData {
    products: Vec<Product>,
    customers: Vec<Customer>,
    discounts: Vec<Discount>,
    orders: Vec<Order>,
}

/// In-memory stand-in for the backend.
pub struct FixtureSource {
    data: Mutex<FixtureData>,
    fail_payments: bool,
}

impl Default for FixtureSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FixtureSource {
    /// Creates a source with the standard fixture menu.
    pub fn new() -> Self {
        Self::with_data(menu(), customers(), discounts())
    }

    /// Creates a source over custom data.
    pub fn with_data(
        products: Vec<Product>,
        customers: Vec<Customer>,
        discounts: Vec<Discount>,
    ) -> Self {
        FixtureSource {
            data: Mutex::new(FixtureData {
                products,
                customers,
                discounts,
                orders: Vec::new(),
            }),
            fail_payments: false,
        }
    }

    /// Makes every order submission fail as a declined payment.
    pub fn with_failing_payments(mut self) -> Self {
        self.fail_payments = true;
        self
    }

    /// Orders accepted so far, oldest first.
    pub fn submitted_orders(&self) -> Vec<Order> {
        self.lock().orders.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FixtureData> {
        self.data.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl DataSource for FixtureSource {
    fn name(&self) -> &'static str {
        "fixture"
    }

    async fn list_products(&self) -> DataResult<Vec<Product>> {
        Ok(self.lock().products.clone())
    }

    async fn get_product(&self, id: &str) -> DataResult<Product> {
        self.lock()
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| DataError::not_found("Product", id))
    }

    async fn list_customers(&self) -> DataResult<Vec<Customer>> {
        Ok(self.lock().customers.clone())
    }

    async fn get_customer(&self, id: &str) -> DataResult<Customer> {
        self.lock()
            .customers
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| DataError::not_found("Customer", id))
    }

    async fn lookup_discount(&self, code: &str) -> DataResult<Discount> {
        self.lock()
            .discounts
            .iter()
            .find(|d| d.code.eq_ignore_ascii_case(code))
            .cloned()
            .ok_or_else(|| DataError::not_found("Discount", code))
    }

    async fn submit_order(&self, order: &Order) -> DataResult<Order> {
        if self.fail_payments {
            warn!(order_id = %order.id, "Fixture payment declined");
            return Err(DataError::Rejected {
                status: 402,
                message: "Payment declined".to_string(),
            });
        }

        let mut data = self.lock();
        if data.orders.iter().any(|o| o.id == order.id) {
            return Err(DataError::Rejected {
                status: 409,
                message: format!("Order {} already submitted", order.id),
            });
        }

        for line in &order.items {
            if let Some(product) = data.products.iter_mut().find(|p| p.id == line.product_id()) {
                product.stock = (product.stock - line.quantity).max(0);
            }
        }

        if let Some(code) = &order.discount_code {
            if let Some(discount) = data.discounts.iter_mut().find(|d| &d.code == code) {
                discount.usage_count += 1;
            }
        }

        if let Some(customer_id) = &order.customer_id {
            if let Some(customer) = data.customers.iter_mut().find(|c| &c.id == customer_id) {
                customer.loyalty_points = (customer.loyalty_points
                    - order.loyalty_points_redeemed
                    + order.loyalty_points_earned)
                    .max(0);
                debug!(customer_id = %customer.id, points = customer.loyalty_points, "Loyalty balance updated");
            }
        }

        let mut recorded = order.clone();
        recorded.payment_status = PaymentStatus::Paid;
        data.orders.push(recorded.clone());

        info!(order_id = %recorded.id, total = %recorded.total, "Fixture order recorded");
        Ok(recorded)
    }

    async fn get_order(&self, id: &str) -> DataResult<Order> {
        self.lock()
            .orders
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .ok_or_else(|| DataError::not_found("Order", id))
    }

    async fn update_order(&self, order: &Order) -> DataResult<Order> {
        let mut data = self.lock();
        let stored = data
            .orders
            .iter_mut()
            .find(|o| o.id == order.id)
            .ok_or_else(|| DataError::not_found("Order", &order.id))?;

        *stored = order.clone();
        Ok(order.clone())
    }
}

// =============================================================================
// Fixture Data
// =============================================================================

fn product(
    id: &str,
    name: &str,
    cents: i64,
    category: &str,
    stock: i64,
    allergens: &[&str],
) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        price: Money::from_cents(cents),
        category: category.to_string(),
        stock,
        is_active: true,
        allergens: allergens.iter().map(|a| a.to_string()).collect(),
    }
}

/// The standard menu.
pub fn menu() -> Vec<Product> {
    vec![
        product("burger", "Classic Burger", 1899, "Mains", 25, &["gluten", "dairy"]),
        product("pizza-margherita", "Margherita Pizza", 1699, "Mains", 15, &["gluten", "dairy"]),
        product("caesar-salad", "Caesar Salad", 1299, "Salads", 12, &["dairy", "eggs", "fish"]),
        product("truffle-fries", "Truffle Fries", 799, "Sides", 40, &[]),
        product("iced-latte", "Iced Latte", 549, "Drinks", 50, &["dairy"]),
        product("sparkling-water", "Sparkling Water", 299, "Drinks", 80, &[]),
        product("lava-cake", "Chocolate Lava Cake", 899, "Desserts", 8, &["gluten", "dairy", "eggs"]),
        product("seasonal-soup", "Seasonal Soup", 999, "Mains", 0, &[]),
        Product {
            is_active: false,
            ..product("lobster-roll", "Lobster Roll", 3299, "Mains", 5, &["shellfish", "gluten"])
        },
    ]
}

/// The customer directory.
pub fn customers() -> Vec<Customer> {
    let customer = |id: &str, name: &str, email: &str, points: i64, prefs: &[&str]| Customer {
        id: id.to_string(),
        name: name.to_string(),
        email: Some(email.to_string()),
        phone: None,
        loyalty_points: points,
        dietary_preferences: prefs.iter().map(|p| p.to_string()).collect(),
    };

    vec![
        customer("cust-001", "Ana Lima", "ana@example.com", 250, &["vegetarian"]),
        customer("cust-002", "Ben Carter", "ben@example.com", 1200, &[]),
        customer("cust-003", "Chloe Nguyen", "chloe@example.com", 0, &["gluten-free"]),
    ]
}

/// Discount codes, one per rule the validator checks.
pub fn discounts() -> Vec<Discount> {
    let base = |code: &str, description: &str, kind: DiscountKind| Discount {
        code: code.to_string(),
        description: Some(description.to_string()),
        kind,
        min_order_amount: Money::zero(),
        valid_from: None,
        valid_until: None,
        usage_limit: None,
        usage_count: 0,
        is_active: true,
    };

    vec![
        Discount {
            min_order_amount: Money::from_cents(2000),
            ..base(
                "SAVE5",
                "$5 off orders of $20 or more",
                DiscountKind::Fixed {
                    amount: Money::from_cents(500),
                },
            )
        },
        base(
            "LUNCH10",
            "10% off",
            DiscountKind::Percentage {
                rate: Rate::from_percent(10),
            },
        ),
        Discount {
            usage_limit: Some(100),
            usage_count: 100,
            ..base(
                "WELCOME15",
                "15% off for new customers",
                DiscountKind::Percentage {
                    rate: Rate::from_percent(15),
                },
            )
        },
        Discount {
            valid_from: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).single(),
            valid_until: Utc.with_ymd_and_hms(2024, 9, 1, 0, 0, 0).single(),
            ..base(
                "SUMMER20",
                "Summer special",
                DiscountKind::Percentage {
                    rate: Rate::from_percent(20),
                },
            )
        },
        Discount {
            is_active: false,
            ..base(
                "STAFF50",
                "Staff meal",
                DiscountKind::Percentage {
                    rate: Rate::from_percent(50),
                },
            )
        },
    ]
}
