//! # Product Commands
//!
//! Catalog listing, client-side search, and product creation.
//!
//! ## Search Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Product Search Flow                                  │
//! │                                                                         │
//! │  > products search "basmti rice" --max 500                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate_search_query (≤ 100 chars, trimmed)                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Catalog cached? ── no ──► GET /products/ ──► cache                     │
//! │       │ yes                                                             │
//! │       ▼                                                                 │
//! │  CatalogFilter { query, category, price range }                         │
//! │       │   fuzzy match over name / description / category                │
//! │       │   typo tolerance 0.3, best match first                          │
//! │       ▼                                                                 │
//! │  record in search history (5 most recent)                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  table on stdout                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt::Write as _;

use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use tracing::debug;

use livemart_core::catalog::categories;
use livemart_core::validation::{validate_search_query, validate_stock};
use livemart_core::{CatalogFilter, Money, NewProduct, PriceRange, Product, View};

use super::{require_any, CommandResult};
use crate::error::ApiError;
use crate::state::AppState;

/// Views that show the product list.
const BROWSE_VIEWS: [View; 3] = [
    View::CustomerHome,
    View::RetailerBuyWholesale,
    View::WholesalerProducts,
];

/// Views that can list a new product.
const LISTING_VIEWS: [View; 2] = [View::RetailerProducts, View::WholesalerProducts];

#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Only this category
    #[arg(long)]
    pub category: Option<String>,

    /// Lowest price, in rupees
    #[arg(long)]
    pub min: Option<Decimal>,

    /// Highest price, in rupees
    #[arg(long)]
    pub max: Option<Decimal>,
}

impl FilterArgs {
    fn to_filter(&self) -> Result<CatalogFilter, ApiError> {
        let defaults = PriceRange::default();
        let min = self.min.map(Money::from_decimal).transpose()?.unwrap_or(defaults.min);
        let max = self.max.map(Money::from_decimal).transpose()?.unwrap_or(defaults.max);
        if min > max {
            return Err(ApiError::validation(format!(
                "Price range is empty: {} is above {}",
                min, max
            )));
        }

        let mut filter = CatalogFilter::new().with_price_range(PriceRange::new(min, max));
        if let Some(category) = &self.category {
            filter = filter.with_category(category.trim());
        }
        Ok(filter)
    }
}

#[derive(Debug, Subcommand)]
pub enum ProductCommand {
    /// Fetch the catalog and list it
    List {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Fuzzy search the catalog
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// List the categories in the catalog
    Categories,

    /// Show recent searches
    History,

    /// List a new product (retailers and wholesalers)
    Create {
        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Unit price in rupees, e.g. 10.99
        #[arg(long)]
        price: Decimal,

        #[arg(long, default_value_t = 0)]
        stock: i64,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        delivery_time: Option<String>,

        #[arg(long)]
        image_url: Option<String>,
    },
}

pub async fn run(state: &AppState, cmd: ProductCommand) -> CommandResult {
    match cmd {
        ProductCommand::List { filter } => {
            require_any(state, &BROWSE_VIEWS)?;
            let filter = filter.to_filter()?;
            let products = load_catalog(state, true).await?;
            Ok(render_products(&filter.apply(&products)))
        }
        ProductCommand::Search { query, filter } => {
            require_any(state, &BROWSE_VIEWS)?;
            let query = validate_search_query(&query.join(" "))?;
            let filter = filter.to_filter()?.with_query(query.clone());
            let products = load_catalog(state, false).await?;

            let matches = filter.apply(&products);
            debug!(query = %query, matches = matches.len(), "Catalog searched");
            state.catalog.record_search(&query);
            Ok(render_products(&matches))
        }
        ProductCommand::Categories => {
            require_any(state, &BROWSE_VIEWS)?;
            let products = load_catalog(state, false).await?;
            let found = categories(&products);
            if found.is_empty() {
                return Ok("No categories".to_string());
            }
            Ok(found.join("\n"))
        }
        ProductCommand::History => {
            require_any(state, &BROWSE_VIEWS)?;
            let recent = state.catalog.recent_searches();
            if recent.is_empty() {
                return Ok("No recent searches".to_string());
            }
            Ok(recent.join("\n"))
        }
        ProductCommand::Create {
            name,
            description,
            price,
            stock,
            category,
            delivery_time,
            image_url,
        } => {
            require_any(state, &LISTING_VIEWS)?;
            validate_stock(stock)?;
            let product = NewProduct {
                name: name.trim().to_string(),
                description,
                price: Money::from_decimal(price)?,
                stock,
                category,
                delivery_time,
                image_url,
            };

            let created = state.api.create_product(&product).await?;
            let message = format!("Listed product #{} {} at {}", created.id, created.name, created.price);
            state.catalog.push(created);
            Ok(message)
        }
    }
}

/// Cached catalog, fetched first if empty or `refresh` is set.
pub(crate) async fn load_catalog(state: &AppState, refresh: bool) -> Result<Vec<Product>, ApiError> {
    if !refresh {
        if let Some(products) = state.catalog.snapshot() {
            return Ok(products);
        }
    }

    let products = state.api.list_products().await?;
    state.catalog.replace(products.clone());
    Ok(products)
}

pub(crate) fn render_products(products: &[&Product]) -> String {
    if products.is_empty() {
        return "No products found".to_string();
    }

    let mut out = format!(
        "{:>6}  {:<32}  {:>12}  {:>6}  {}\n",
        "ID", "NAME", "PRICE", "STOCK", "CATEGORY"
    );
    for product in products {
        let _ = writeln!(
            out,
            "{:>6}  {:<32}  {:>12}  {:>6}  {}",
            product.id,
            product.name,
            product.price.to_string(),
            product.stock,
            product.category.as_deref().unwrap_or("-")
        );
    }
    let _ = write!(out, "{} product(s)", products.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{state, state_as};
    use crate::error::ErrorCode;
    use livemart_core::{ProductId, Role};

    fn catalog() -> Vec<Product> {
        vec![
            Product::new(ProductId(1), "Basmati Rice", Money::from_major(100)).with_category("Grains"),
            Product::new(ProductId(2), "Toor Dal", Money::from_major(90)).with_category("Pulses"),
            Product::new(ProductId(3), "Brown Rice", Money::from_major(1200)).with_category("Grains"),
        ]
    }

    #[tokio::test]
    async fn test_search_uses_cache_and_records_history() {
        let state = state_as(Role::Customer);
        state.catalog.replace(catalog());

        let out = run(
            &state,
            ProductCommand::Search {
                query: vec!["basmti".into()],
                filter: FilterArgs::default(),
            },
        )
        .await
        .unwrap();

        assert!(out.contains("Basmati Rice"));
        assert!(!out.contains("Toor Dal"));
        assert_eq!(state.catalog.recent_searches(), vec!["basmti"]);
    }

    #[tokio::test]
    async fn test_search_respects_default_price_ceiling() {
        let state = state_as(Role::Customer);
        state.catalog.replace(catalog());

        let out = run(
            &state,
            ProductCommand::Search {
                query: vec!["rice".into()],
                filter: FilterArgs::default(),
            },
        )
        .await
        .unwrap();

        assert!(out.contains("Basmati Rice"));
        assert!(!out.contains("Brown Rice"));
    }

    #[tokio::test]
    async fn test_categories_first_seen_order() {
        let state = state_as(Role::Wholesaler);
        state.catalog.replace(catalog());

        let out = run(&state, ProductCommand::Categories).await.unwrap();
        assert_eq!(out, "Grains\nPulses");
    }

    #[tokio::test]
    async fn test_browse_requires_login() {
        let err = run(&state(), ProductCommand::Categories).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotAuthenticated);
    }

    #[tokio::test]
    async fn test_customer_cannot_create() {
        let err = run(
            &state_as(Role::Customer),
            ProductCommand::Create {
                name: "Rice".into(),
                description: String::new(),
                price: Decimal::new(1099, 2),
                stock: 5,
                category: None,
                delivery_time: None,
                image_url: None,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn test_create_rejects_negative_stock_before_network() {
        let err = run(
            &state_as(Role::Retailer),
            ProductCommand::Create {
                name: "Rice".into(),
                description: String::new(),
                price: Decimal::new(1099, 2),
                stock: -1,
                category: None,
                delivery_time: None,
                image_url: None,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_inverted_price_range_is_rejected() {
        let args = FilterArgs {
            min: Some(Decimal::from(500)),
            max: Some(Decimal::from(100)),
            ..Default::default()
        };
        assert!(args.to_filter().is_err());
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_products(&[]), "No products found");
    }
}
