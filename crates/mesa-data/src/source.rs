//! # DataSource Trait
//!
//! The one seam between the register and the outside world.

use async_trait::async_trait;
use mesa_core::{Customer, Discount, Order, Product};

use crate::error::DataResult;

/// Catalog, customer directory, discount lookup and order submission.
///
/// Implementations are chosen once at startup and shared as
/// `Arc<dyn DataSource>`. Each call is a single request: no retries, no
/// caching.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Short name for logs ("live", "fixture").
    fn name(&self) -> &'static str;

    /// All products on the menu, active or not.
    async fn list_products(&self) -> DataResult<Vec<Product>>;

    /// One product, with current stock.
    async fn get_product(&self, id: &str) -> DataResult<Product>;

    async fn list_customers(&self) -> DataResult<Vec<Customer>>;

    async fn get_customer(&self, id: &str) -> DataResult<Customer>;

    /// Looks up a discount by code. Rule checks happen client-side afterwards.
    async fn lookup_discount(&self, code: &str) -> DataResult<Discount>;

    /// Submits a finalized order: the backend takes payment and stores it.
    ///
    /// Returns the order as the backend recorded it.
    async fn submit_order(&self, order: &Order) -> DataResult<Order>;

    /// Fetches a previously submitted order.
    async fn get_order(&self, id: &str) -> DataResult<Order>;

    /// Saves a status change on a submitted order.
    async fn update_order(&self, order: &Order) -> DataResult<Order>;
}
