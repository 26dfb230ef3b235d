//! # Command Line
//!
//! ```text
//! mesa-register [--config FILE] [--source live|fixture] [--role ROLE] [--json] <COMMAND>
//!
//!   products   [--all]                      menu (active items unless --all)
//!   customers  [--search TEXT]              customer directory
//!   quote      --item ID:QTY[:NOTES] ...    price an order without paying
//!   checkout   --item ID:QTY[:NOTES] ...    price, pay and print the receipt
//!              [--payment cash|card|ewallet]
//!   advance    --order ID --status STATUS   move a submitted order (kitchen)
//!   cancel     --order ID                   cancel a submitted order
//!
//!   quote/checkout options:
//!     --customer ID  --discount CODE  --tip 10%|3.50  --redeem POINTS  --notes TEXT
//! ```
//!
//! Each invocation is one register session: the draft lives only for the
//! duration of the command.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use mesa_core::{
    Customer, Money, OrderStatus, PaymentMethod, Product, Rate, Role, TipSelection,
    MAX_AMOUNT_CENTS,
};
use mesa_data::DataSourceKind;

use crate::commands::{catalog, checkout, discount, order, CheckoutResponse, DraftResponse};
use crate::error::ApiError;
use crate::state::{Register, RegisterConfig};

#[derive(Debug, Parser)]
#[command(name = "mesa-register", about = "Mesa POS register", version, long_about = None)]
pub struct Cli {
    /// Config file (defaults to register.toml in the platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Data source, overriding the config file
    #[arg(long, global = true)]
    pub source: Option<DataSourceKind>,

    /// Signed-in role, overriding the config file
    #[arg(long, global = true)]
    pub role: Option<Role>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the menu
    Products {
        /// Include products switched off in the catalog
        #[arg(long)]
        all: bool,
    },
    /// List customers
    Customers {
        /// Filter by name, email or phone
        #[arg(long)]
        search: Option<String>,
    },
    /// Price an order without paying
    Quote(OrderArgs),
    /// Price and pay for an order
    Checkout {
        #[command(flatten)]
        order: OrderArgs,

        #[arg(long, default_value = "card")]
        payment: PaymentMethod,
    },
    /// Move a submitted order along the kitchen flow
    Advance {
        #[arg(long)]
        order: String,

        /// preparing, ready or completed
        #[arg(long, value_parser = parse_status)]
        status: OrderStatus,
    },
    /// Cancel a submitted order
    Cancel {
        #[arg(long)]
        order: String,
    },
}

#[derive(Debug, Args)]
pub struct OrderArgs {
    /// Line as PRODUCT_ID:QTY[:NOTES]; repeat for more lines
    #[arg(long = "item", value_parser = parse_item, required = true)]
    pub items: Vec<ItemSpec>,

    #[arg(long)]
    pub customer: Option<String>,

    #[arg(long)]
    pub discount: Option<String>,

    /// Percentage ("15%") or fixed amount ("3.50")
    #[arg(long, value_parser = parse_tip)]
    pub tip: Option<TipSelection>,

    /// Loyalty points to redeem (needs --customer)
    #[arg(long)]
    pub redeem: Option<i64>,

    #[arg(long)]
    pub notes: Option<String>,
}

/// One `--item` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSpec {
    pub product_id: String,
    pub quantity: i64,
    pub notes: Option<String>,
}

impl Cli {
    /// Applies `--source` and `--role` on top of the loaded config.
    pub fn apply_overrides(&self, config: &mut RegisterConfig) {
        if let Some(source) = self.source {
            config.data.source = source;
        }
        if let Some(role) = self.role {
            config.session.role = role;
        }
    }

    /// Runs the command and returns what to print.
    pub async fn execute(self, register: &Register) -> Result<String, ApiError> {
        let json = self.json;
        let config = &register.config;

        match self.command {
            Command::Products { all } => {
                let products = catalog::list_products(&register.source, all).await?;
                output(json, &products, || render_products(&products, config))
            }
            Command::Customers { search } => {
                let customers =
                    catalog::list_customers(&register.source, search.as_deref()).await?;
                output(json, &customers, || render_customers(&customers))
            }
            Command::Quote(args) => {
                let draft = build_order(register, &args).await?;
                output(json, &draft, || render_draft(&draft, config))
            }
            Command::Checkout {
                order: args,
                payment,
            } => {
                build_order(register, &args).await?;
                let resp = checkout::checkout(
                    &register.source,
                    &register.draft,
                    &register.session,
                    config,
                    payment,
                )
                .await?;
                output(json, &resp, || render_checkout(&resp))
            }
            Command::Advance { order: id, status } => {
                let order =
                    checkout::advance_order(&register.source, &register.session, &id, status)
                        .await?;
                output(json, &order, || format!("Order {} is now {}", order.id, order.status))
            }
            Command::Cancel { order: id } => {
                let order = checkout::cancel_order(&register.source, &register.session, &id).await?;
                output(json, &order, || format!("Order {} is now {}", order.id, order.status))
            }
        }
    }
}

/// Replays the order options against the session's draft.
async fn build_order(register: &Register, args: &OrderArgs) -> Result<DraftResponse, ApiError> {
    let (source, draft, session) = (&register.source, &register.draft, &register.session);

    for item in &args.items {
        order::add_item(
            source,
            draft,
            session,
            &item.product_id,
            item.quantity,
            item.notes.as_deref(),
        )
        .await?;
    }
    if let Some(customer_id) = &args.customer {
        order::attach_customer(source, draft, session, Some(customer_id.as_str())).await?;
    }
    if let Some(notes) = &args.notes {
        order::set_notes(draft, session, Some(notes.as_str()))?;
    }
    if let Some(tip) = args.tip {
        order::set_tip(draft, session, tip)?;
    }
    if let Some(code) = &args.discount {
        discount::apply_discount(source, draft, session, code).await?;
    }
    if let Some(points) = args.redeem {
        order::redeem_loyalty_points(source, draft, session, points).await?;
    }

    Ok(order::get_draft(draft))
}

fn output<T: Serialize>(
    json: bool,
    value: &T,
    text: impl FnOnce() -> String,
) -> Result<String, ApiError> {
    if json {
        serde_json::to_string_pretty(value)
            .map_err(|e| ApiError::internal(format!("Failed to encode output: {}", e)))
    } else {
        Ok(text())
    }
}

// =============================================================================
// Text Output
// =============================================================================

fn render_products(products: &[Product], config: &RegisterConfig) -> String {
    products
        .iter()
        .map(|p| {
            let status = if !p.is_active {
                "unavailable".to_string()
            } else if p.stock == 0 {
                "sold out".to_string()
            } else {
                format!("{} left", p.stock)
            };
            format!(
                "{:<18} {:<22} {:>9}  {}",
                p.id,
                p.name,
                config.format_currency(p.price),
                status
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_customers(customers: &[Customer]) -> String {
    customers
        .iter()
        .map(|c| {
            format!(
                "{:<10} {:<20} {:>6} pts  {}",
                c.id,
                c.name,
                c.loyalty_points,
                c.email.as_deref().unwrap_or("")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_draft(draft: &DraftResponse, config: &RegisterConfig) -> String {
    let money = |amount: Money| config.format_currency(amount);
    let totals = &draft.totals;
    let mut lines = Vec::new();

    for item in &draft.items {
        lines.push(format!(
            "{:>3} x {:<28} {:>10}",
            item.quantity,
            item.product.name,
            money(item.total_price)
        ));
    }
    lines.push(format!("{:<34} {:>10}", "Subtotal", money(totals.subtotal)));
    lines.push(format!(
        "{:<34} {:>10}",
        format!("Tax ({}%)", totals.tax_rate.percentage()),
        money(totals.tax)
    ));
    if let Some(code) = &totals.discount_code {
        lines.push(format!(
            "{:<34} {:>10}",
            format!("Discount ({})", code),
            money(-totals.discount_amount)
        ));
    }
    if let Some(reason) = &totals.discount_error {
        lines.push(format!("  discount not applied: {}", reason));
    }
    if totals.loyalty_points_applied > 0 {
        lines.push(format!(
            "{:<34} {:>10}",
            format!("Loyalty ({} pts)", totals.loyalty_points_applied),
            money(-totals.loyalty_discount)
        ));
    }
    if totals.tip_amount.is_positive() {
        lines.push(format!("{:<34} {:>10}", "Tip", money(totals.tip_amount)));
    }
    lines.push(format!("{:<34} {:>10}", "TOTAL", money(totals.total)));
    if let Some(customer) = &draft.customer {
        lines.push(format!(
            "Customer {} can redeem up to {} points",
            customer.name, draft.max_redeemable_points
        ));
    }

    lines.join("\n")
}

fn render_checkout(resp: &CheckoutResponse) -> String {
    format!("{}\n\nOrder {} {}", resp.receipt, resp.order.id, resp.order.status)
}

// =============================================================================
// Argument Parsers
// =============================================================================

/// `burger:2`, `burger:1:no onions`. Notes may contain colons.
fn parse_item(value: &str) -> Result<ItemSpec, String> {
    let mut parts = value.splitn(3, ':');
    let product_id = parts.next().map(str::trim).unwrap_or_default();
    if product_id.is_empty() {
        return Err("expected PRODUCT_ID:QTY[:NOTES]".to_string());
    }

    let quantity = match parts.next() {
        Some(qty) => qty
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("invalid quantity '{}'", qty))?,
        None => 1,
    };
    let notes = parts
        .next()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);

    Ok(ItemSpec {
        product_id: product_id.to_string(),
        quantity,
        notes,
    })
}

/// `15%` / `12.5%` for a percentage, `3.50` for a fixed amount, `none`.
fn parse_tip(value: &str) -> Result<TipSelection, String> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("none") {
        return Ok(TipSelection::None);
    }

    if let Some(pct) = value.strip_suffix('%') {
        let pct: f64 = pct
            .trim()
            .parse()
            .map_err(|_| format!("invalid tip percentage '{}'", value))?;
        if !(0.0..=100.0).contains(&pct) {
            return Err("tip percentage must be between 0 and 100".to_string());
        }
        return Ok(TipSelection::Percent(Rate::from_percentage(pct)));
    }

    parse_amount(value).map(TipSelection::Amount)
}

/// Decimal amount with at most two fraction digits, as cents.
fn parse_amount(value: &str) -> Result<Money, String> {
    let invalid = || format!("invalid amount '{}'", value);
    let (whole, fraction) = value.split_once('.').unwrap_or((value, ""));

    if fraction.len() > 2 || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let whole: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    if whole < 0 {
        return Err("amount must not be negative".to_string());
    }
    let cents: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
        _ => fraction.parse().map_err(|_| invalid())?,
    };

    whole
        .checked_mul(100)
        .and_then(|c| c.checked_add(cents))
        .filter(|c| *c <= MAX_AMOUNT_CENTS)
        .map(Money::from_cents)
        .ok_or_else(|| format!("amount must not exceed {}", Money::from_cents(MAX_AMOUNT_CENTS)))
}

fn parse_status(value: &str) -> Result<OrderStatus, String> {
    match value.trim().to_lowercase().as_str() {
        "open" => Ok(OrderStatus::Open),
        "preparing" => Ok(OrderStatus::Preparing),
        "ready" => Ok(OrderStatus::Ready),
        "completed" => Ok(OrderStatus::Completed),
        "cancelled" | "canceled" => Ok(OrderStatus::Cancelled),
        other => Err(format!("unknown order status '{}'", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_item() {
        assert_eq!(
            parse_item("burger:2").unwrap(),
            ItemSpec {
                product_id: "burger".to_string(),
                quantity: 2,
                notes: None
            }
        );

        let item = parse_item("iced-latte:1:oat milk: no ice").unwrap();
        assert_eq!(item.notes.as_deref(), Some("oat milk: no ice"));

        assert_eq!(parse_item("burger").unwrap().quantity, 1);
        assert!(parse_item(":2").is_err());
        assert!(parse_item("burger:two").is_err());
    }

    #[test]
    fn test_parse_tip() {
        assert_eq!(
            parse_tip("10%").unwrap(),
            TipSelection::Percent(Rate::from_bps(1000))
        );
        assert_eq!(
            parse_tip("12.5%").unwrap(),
            TipSelection::Percent(Rate::from_bps(1250))
        );
        assert_eq!(
            parse_tip("3.5").unwrap(),
            TipSelection::Amount(Money::from_cents(350))
        );
        assert_eq!(
            parse_tip("4").unwrap(),
            TipSelection::Amount(Money::from_cents(400))
        );
        assert_eq!(parse_tip("none").unwrap(), TipSelection::None);
        assert!(parse_tip("150%").is_err());
        assert!(parse_tip("1.234").is_err());
        assert!(parse_tip("-2").is_err());

        assert_eq!(
            parse_tip("1000000").unwrap(),
            TipSelection::Amount(Money::from_cents(MAX_AMOUNT_CENTS))
        );
        assert!(parse_tip("1000000.01").is_err());
        assert!(parse_tip("99999999999999999").is_err());
        assert!(parse_tip("99999999999999999999").is_err());
    }

    #[test]
    fn test_cli_parses_checkout() {
        let cli = Cli::try_parse_from([
            "mesa-register",
            "--role",
            "manager",
            "checkout",
            "--item",
            "burger:2",
            "--item",
            "iced-latte:1",
            "--tip",
            "10%",
            "--payment",
            "cash",
        ])
        .unwrap();

        assert_eq!(cli.role, Some(Role::Manager));
        match cli.command {
            Command::Checkout { order, payment } => {
                assert_eq!(order.items.len(), 2);
                assert_eq!(payment, PaymentMethod::Cash);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from(["mesa-register", "--source", "live", "products"]).unwrap();
        let mut config = RegisterConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.data.source, DataSourceKind::Live);
    }
}
