//! # Receipt Rendering
//!
//! Plain-text receipt for a completed order, laid out for a 42-column
//! thermal printer.
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │                Mesa Bistro               │
//! │             12 Harbour Street            │
//! │------------------------------------------│
//! │Order 5f0c2d1e                            │
//! │2026-10-17 12:30 UTC                      │
//! │------------------------------------------│
//! │2 x Classic Burger                  $37.98│
//! │    @ $18.99                              │
//! │------------------------------------------│
//! │Subtotal                            $37.98│
//! │Tax (8%)                             $3.04│
//! │Tip                                  $3.80│
//! │==========================================│
//! │TOTAL                               $44.82│
//! │Paid by Card                              │
//! │Points earned: 37                         │
//! └──────────────────────────────────────────┘
//! ```

use mesa_core::{Money, Order, Rate};

use crate::state::RegisterConfig;

/// Printer width in characters.
pub const RECEIPT_WIDTH: usize = 42;

/// Renders `order` as receipt text.
///
/// `customer_name` is printed when the order has a customer; the order only
/// carries the customer's id.
pub fn render_receipt(order: &Order, config: &RegisterConfig, customer_name: Option<&str>) -> String {
    let money = |amount: Money| config.format_currency(amount);
    let rule = "-".repeat(RECEIPT_WIDTH);
    let mut lines = Vec::new();

    lines.push(center(&config.store.name));
    for address in &config.store.address {
        lines.push(center(address));
    }
    lines.push(rule.clone());

    lines.push(format!("Order {}", short_id(&order.id)));
    let stamp = order.completed_at.unwrap_or(order.created_at);
    lines.push(stamp.format("%Y-%m-%d %H:%M UTC").to_string());
    if let Some(name) = customer_name {
        lines.push(format!("Customer: {}", name));
    }
    lines.push(rule.clone());

    for item in &order.items {
        lines.push(row(
            &format!("{} x {}", item.quantity, item.product.name),
            &money(item.total_price),
        ));
        if item.quantity > 1 {
            lines.push(format!("    @ {}", money(item.product.price)));
        }
        if let Some(notes) = &item.notes {
            lines.push(format!("    note: {}", notes));
        }
    }
    lines.push(rule.clone());

    lines.push(row("Subtotal", &money(order.subtotal)));
    lines.push(row(
        &format!("Tax ({})", format_rate(order.tax_rate)),
        &money(order.tax),
    ));
    if order.discount_amount.is_positive() {
        let label = match &order.discount_code {
            Some(code) => format!("Discount ({})", code),
            None => "Discount".to_string(),
        };
        lines.push(row(&label, &money(-order.discount_amount)));
    }
    if order.loyalty_points_redeemed > 0 {
        lines.push(row(
            &format!("Loyalty ({} pts)", order.loyalty_points_redeemed),
            &money(-order.loyalty_discount),
        ));
    }
    if order.tip_amount.is_positive() {
        lines.push(row("Tip", &money(order.tip_amount)));
    }
    lines.push("=".repeat(RECEIPT_WIDTH));
    lines.push(row("TOTAL", &money(order.total)));

    if let Some(method) = order.payment_method {
        lines.push(format!("Paid by {}", method));
    }
    if order.customer_id.is_some() {
        lines.push(format!("Points earned: {}", order.loyalty_points_earned));
    }
    if let Some(notes) = &order.notes {
        lines.push(rule);
        lines.push(format!("Notes: {}", notes));
    }

    lines.push(String::new());
    lines.push(center("Thank you!"));

    lines.join("\n")
}

/// Label on the left, amount right-aligned; long labels are cut to fit.
fn row(label: &str, amount: &str) -> String {
    let room = RECEIPT_WIDTH.saturating_sub(amount.chars().count() + 1);
    let label: String = label.chars().take(room).collect();
    let pad = RECEIPT_WIDTH - label.chars().count() - amount.chars().count();
    format!("{}{}{}", label, " ".repeat(pad.max(1)), amount)
}

fn center(text: &str) -> String {
    let len = text.chars().count();
    if len >= RECEIPT_WIDTH {
        return text.to_string();
    }
    format!("{}{}", " ".repeat((RECEIPT_WIDTH - len) / 2), text)
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// `800` bps → "8%", `825` bps → "8.25%".
fn format_rate(rate: Rate) -> String {
    let bps = rate.bps();
    if bps % 100 == 0 {
        format!("{}%", bps / 100)
    } else {
        let text = format!("{}.{:02}", bps / 100, bps % 100);
        format!("{}%", text.trim_end_matches('0'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use mesa_core::{OrderDraft, PaymentMethod, Product, TipSelection};

    fn burger() -> Product {
        Product {
            id: "burger".to_string(),
            name: "Classic Burger".to_string(),
            price: Money::from_cents(1899),
            category: "Mains".to_string(),
            stock: 25,
            is_active: true,
            allergens: vec![],
        }
    }

    fn completed_order() -> Order {
        let now = Utc.with_ymd_and_hms(2026, 10, 17, 12, 30, 0).unwrap();
        let mut draft = OrderDraft::default();
        draft.add_item(burger(), 2, None).unwrap();
        draft
            .set_tip(TipSelection::Percent(Rate::from_percent(10)))
            .unwrap();
        draft.finalize(PaymentMethod::Card, now).unwrap()
    }

    #[test]
    fn test_receipt_lines() {
        let receipt = render_receipt(&completed_order(), &RegisterConfig::default(), None);

        assert!(receipt.contains("2 x Classic Burger"));
        assert!(receipt.contains("@ $18.99"));
        assert!(receipt.contains("Tax (8%)"));
        assert!(receipt.contains("2026-10-17 12:30 UTC"));
        assert!(receipt.contains("Paid by Card"));
        assert!(!receipt.contains("Points earned"));

        let total = receipt.lines().find(|l| l.starts_with("TOTAL")).unwrap();
        assert_eq!(total.chars().count(), RECEIPT_WIDTH);
        assert!(total.ends_with("$44.82"));
    }

    #[test]
    fn test_row_cuts_long_labels() {
        let line = row(&"x".repeat(60), "$1.00");
        assert_eq!(line.chars().count(), RECEIPT_WIDTH);
        assert!(line.ends_with(" $1.00"));
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(Rate::from_bps(800)), "8%");
        assert_eq!(format_rate(Rate::from_bps(825)), "8.25%");
        assert_eq!(format_rate(Rate::from_bps(750)), "7.5%");
    }
}
