//! # Catalog Commands
//!
//! Read-only views of the menu and the customer directory.

use tracing::debug;

use mesa_core::{Customer, Product};

use crate::error::ApiError;
use crate::state::SourceState;

/// Lists the menu.
///
/// Inactive products are left out unless `include_inactive` is set; out of
/// stock products stay in so the cashier can see they are sold out.
pub async fn list_products(
    source: &SourceState,
    include_inactive: bool,
) -> Result<Vec<Product>, ApiError> {
    debug!(include_inactive, "list_products command");

    let mut products = source.inner().list_products().await?;
    if !include_inactive {
        products.retain(|p| p.is_active);
    }
    products.sort_by(|a, b| a.category.cmp(&b.category).then(a.name.cmp(&b.name)));

    Ok(products)
}

/// Lists customers, optionally filtered by a case-insensitive name, email or
/// phone fragment.
pub async fn list_customers(
    source: &SourceState,
    query: Option<&str>,
) -> Result<Vec<Customer>, ApiError> {
    debug!(query = ?query, "list_customers command");

    let customers = source.inner().list_customers().await?;
    let query = query.map(str::trim).filter(|q| !q.is_empty());

    let Some(query) = query else {
        return Ok(customers);
    };

    let needle = query.to_lowercase();
    let hit = |field: Option<&str>| {
        field
            .map(|value| value.to_lowercase().contains(&needle))
            .unwrap_or(false)
    };

    Ok(customers
        .into_iter()
        .filter(|c| {
            hit(Some(c.name.as_str())) || hit(c.email.as_deref()) || hit(c.phone.as_deref())
        })
        .collect())
}

pub async fn get_customer(source: &SourceState, customer_id: &str) -> Result<Customer, ApiError> {
    debug!(customer_id = %customer_id, "get_customer command");
    Ok(source.inner().get_customer(customer_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesa_data::FixtureSource;
    use std::sync::Arc;

    fn source() -> SourceState {
        SourceState::new(Arc::new(FixtureSource::new()))
    }

    #[tokio::test]
    async fn test_inactive_products_hidden_by_default() {
        let source = source();

        let visible = list_products(&source, false).await.unwrap();
        assert!(visible.iter().all(|p| p.is_active));
        assert!(visible.iter().any(|p| p.id == "seasonal-soup"));

        let all = list_products(&source, true).await.unwrap();
        assert!(all.iter().any(|p| p.id == "lobster-roll"));
    }

    #[tokio::test]
    async fn test_customer_search() {
        let source = source();

        let found = list_customers(&source, Some("  ben ")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "cust-002");

        let everyone = list_customers(&source, Some("")).await.unwrap();
        assert_eq!(everyone.len(), 3);
    }

    #[tokio::test]
    async fn test_unknown_customer() {
        let err = get_customer(&source(), "cust-999").await.unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::NotFound);
    }
}
