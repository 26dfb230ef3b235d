//! # Live Data Source
//!
//! Talks to the backend REST API over HTTP with JSON bodies.
//!
//! ## Endpoints
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  list_products     GET  {base}/api/products                             │
//! │  get_product       GET  {base}/api/products/{id}                        │
//! │  list_customers    GET  {base}/api/customers                            │
//! │  get_customer      GET  {base}/api/customers/{id}                       │
//! │  lookup_discount   GET  {base}/api/discounts/validate?code={code}       │
//! │  submit_order      POST {base}/api/orders                               │
//! │  get_order         GET  {base}/api/orders/{id}                          │
//! │  update_order      PUT  {base}/api/orders/{id}                          │
//! │                                                                         │
//! │  404 → NotFound    other non-2xx → Rejected    no answer → Transport    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use async_trait::async_trait;
use mesa_core::{Customer, Discount, Order, Product};
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{DataError, DataResult};
use crate::source::DataSource;

/// Error body the backend sends with non-2xx answers.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(alias = "error")]
    message: String,
}

/// HTTP client for the backend.
#[derive(Debug)]
pub struct LiveSource {
    base_url: Url,
    client: reqwest::Client,
}

impl LiveSource {
    /// Creates a client for `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> DataResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_client(base_url, client)
    }

    /// Uses a preconfigured client.
    ///
    /// ## Errors
    /// - `InvalidUrl` when `base_url` is not an absolute http(s) URL
    pub fn with_client(base_url: &str, client: reqwest::Client) -> DataResult<Self> {
        let invalid = |reason: String| DataError::InvalidUrl(format!("{}: {}", base_url, reason));

        let parsed = Url::parse(base_url.trim_end_matches('/')).map_err(|e| invalid(e.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(invalid("cannot be used as a base".to_string()));
        }

        Ok(LiveSource {
            base_url: parsed,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// `{base}/api/{segments...}`, each segment percent-encoded.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("api").extend(segments);
        }
        url
    }

    /// Sends a request and decodes a 2xx JSON answer.
    ///
    /// `entity` and `id` name the record for a 404.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        entity: &str,
        id: &str,
    ) -> DataResult<T> {
        let response = request.send().await?;
        let response = check_status(response, entity, id).await?;
        Ok(response.json::<T>().await?)
    }
}

/// Maps non-2xx statuses to DataError.
async fn check_status(response: Response, entity: &str, id: &str) -> DataResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::NOT_FOUND {
        return Err(DataError::not_found(entity, id));
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.message)
        .unwrap_or(text);
    let message = if message.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Unexpected status")
            .to_string()
    } else {
        message
    };

    warn!(status = status.as_u16(), %entity, %id, %message, "Backend rejected request");
    Err(DataError::Rejected {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl DataSource for LiveSource {
    fn name(&self) -> &'static str {
        "live"
    }

    async fn list_products(&self) -> DataResult<Vec<Product>> {
        debug!("GET products");
        self.send(self.client.get(self.url(&["products"])), "Products", "*")
            .await
    }

    async fn get_product(&self, id: &str) -> DataResult<Product> {
        debug!(product_id = %id, "GET product");
        let url = self.url(&["products", id]);
        self.send(self.client.get(url), "Product", id).await
    }

    async fn list_customers(&self) -> DataResult<Vec<Customer>> {
        debug!("GET customers");
        self.send(self.client.get(self.url(&["customers"])), "Customers", "*")
            .await
    }

    async fn get_customer(&self, id: &str) -> DataResult<Customer> {
        debug!(customer_id = %id, "GET customer");
        let url = self.url(&["customers", id]);
        self.send(self.client.get(url), "Customer", id).await
    }

    async fn lookup_discount(&self, code: &str) -> DataResult<Discount> {
        debug!(%code, "GET discount");
        let request = self
            .client
            .get(self.url(&["discounts", "validate"]))
            .query(&[("code", code)]);
        self.send(request, "Discount", code).await
    }

    async fn submit_order(&self, order: &Order) -> DataResult<Order> {
        debug!(order_id = %order.id, total = %order.total, "POST order");
        let request = self.client.post(self.url(&["orders"])).json(order);
        self.send(request, "Order", &order.id).await
    }

    async fn get_order(&self, id: &str) -> DataResult<Order> {
        debug!(order_id = %id, "GET order");
        let url = self.url(&["orders", id]);
        self.send(self.client.get(url), "Order", id).await
    }

    async fn update_order(&self, order: &Order) -> DataResult<Order> {
        debug!(order_id = %order.id, status = %order.status, "PUT order");
        let url = self.url(&["orders", &order.id]);
        self.send(self.client.put(url).json(order), "Order", &order.id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_removed() {
        let source =
            LiveSource::with_client("http://pos.local:8080/", reqwest::Client::new()).unwrap();
        assert_eq!(source.base_url(), "http://pos.local:8080");
        assert_eq!(source.url(&["products"]).as_str(), "http://pos.local:8080/api/products");
    }

    #[test]
    fn test_ids_are_percent_encoded() {
        let source =
            LiveSource::with_client("http://pos.local:8080/register/", reqwest::Client::new())
                .unwrap();
        assert_eq!(
            source.url(&["products", "a/b?c#d"]).as_str(),
            "http://pos.local:8080/register/api/products/a%2Fb%3Fc%23d"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = LiveSource::with_client("pos.local", reqwest::Client::new()).unwrap_err();
        assert!(matches!(err, DataError::InvalidUrl(_)));

        let err = LiveSource::with_client("mailto:pos@local", reqwest::Client::new()).unwrap_err();
        assert!(matches!(err, DataError::InvalidUrl(_)));
    }
}
