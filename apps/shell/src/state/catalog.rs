//! # Catalog State
//!
//! The last product list fetched from the backend and the recent searches.
//! `cart add` looks products up here so a price is always the one the user
//! last saw.

use std::sync::{Mutex, PoisonError, RwLock};

use livemart_core::{Product, ProductId, SearchHistory};

#[derive(Debug, Default)]
pub struct CatalogState {
    products: RwLock<Option<Vec<Product>>>,
    history: Mutex<SearchHistory>,
}

impl CatalogState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the cached product list.
    pub fn replace(&self, products: Vec<Product>) {
        *self.products.write().unwrap_or_else(PoisonError::into_inner) = Some(products);
    }

    /// Appends a product the user just listed. No-op before the first fetch.
    pub fn push(&self, product: Product) {
        if let Some(products) = self
            .products
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .as_mut()
        {
            products.push(product);
        }
    }

    /// Cached products, or `None` if nothing was fetched yet.
    pub fn snapshot(&self) -> Option<Vec<Product>> {
        self.products
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn find(&self, id: ProductId) -> Option<Product> {
        self.products
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(|products| products.iter().find(|p| p.id == id).cloned())
    }

    pub fn record_search(&self, query: &str) {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record(query);
    }

    /// Recent searches, newest first.
    pub fn recent_searches(&self) -> Vec<String> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries()
            .map(str::to_string)
            .collect()
    }
}
