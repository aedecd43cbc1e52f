//! # Catalog Filtering
//!
//! Client-side search over the product list fetched from `GET /products/`.
//!
//! ## Filter Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      CatalogFilter::apply()                             │
//! │                                                                         │
//! │  products ──► text match ──► category ──► price range ──► results      │
//! │               (fuzzy, over    (exact,      (inclusive,                  │
//! │                name /          if set)      default ₹0-₹1000)           │
//! │                description /                                            │
//! │                category)                                                │
//! │                                                                         │
//! │  Blank query: text match is skipped and catalog order is kept.          │
//! │  Otherwise results are ordered best match first.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Fuzzy Score
//! The score is the edit distance between the query and the closest
//! substring of the field, divided by the query length. 0.0 is an exact
//! substring hit; a product matches when its best field scores at or under
//! [`FUZZY_THRESHOLD`](crate::FUZZY_THRESHOLD).

use std::collections::VecDeque;

use crate::money::Money;
use crate::types::Product;
use crate::{DEFAULT_MAX_PRICE, FUZZY_THRESHOLD, SEARCH_HISTORY_LEN};

// =============================================================================
// Price Range
// =============================================================================

/// Inclusive price bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceRange {
    pub min: Money,
    pub max: Money,
}

impl PriceRange {
    pub fn new(min: Money, max: Money) -> Self {
        PriceRange { min, max }
    }

    pub fn contains(&self, price: Money) -> bool {
        price >= self.min && price <= self.max
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        PriceRange {
            min: Money::zero(),
            max: Money::from_major(DEFAULT_MAX_PRICE),
        }
    }
}

// =============================================================================
// Catalog Filter
// =============================================================================

/// Search, category and price criteria for the product list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogFilter {
    pub query: String,
    pub category: Option<String>,
    pub price: PriceRange,
}

impl CatalogFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_price_range(mut self, range: PriceRange) -> Self {
        self.price = range;
        self
    }

    /// Returns the products passing every criterion.
    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        let query = self.query.trim();

        let mut scored: Vec<(f64, &Product)> = products
            .iter()
            .filter_map(|product| {
                if query.is_empty() {
                    Some((0.0, product))
                } else {
                    product_score(query, product)
                        .filter(|score| *score <= FUZZY_THRESHOLD)
                        .map(|score| (score, product))
                }
            })
            .filter(|(_, product)| match &self.category {
                Some(category) => product.category.as_deref() == Some(category.as_str()),
                None => true,
            })
            .filter(|(_, product)| self.price.contains(product.price))
            .collect();

        // sort_by is stable: equal scores keep catalog order
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));
        scored.into_iter().map(|(_, product)| product).collect()
    }
}

/// Distinct categories in first-seen order.
pub fn categories(products: &[Product]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for category in products.iter().filter_map(|p| p.category.as_ref()) {
        if !seen.contains(category) {
            seen.push(category.clone());
        }
    }
    seen
}

// =============================================================================
// Fuzzy Matching
// =============================================================================

/// Best score across the searchable fields, `None` if none are present.
fn product_score(query: &str, product: &Product) -> Option<f64> {
    [
        Some(product.name.as_str()),
        product.description.as_deref(),
        product.category.as_deref(),
    ]
    .into_iter()
    .flatten()
    .map(|field| fuzzy_score(query, field))
    .min_by(f64::total_cmp)
}

/// Normalized approximate-substring distance of `query` within `text`.
///
/// Case-insensitive. Returns 0.0 for an empty query.
pub fn fuzzy_score(query: &str, text: &str) -> f64 {
    let pattern: Vec<char> = query.to_lowercase().chars().collect();
    let text: Vec<char> = text.to_lowercase().chars().collect();

    if pattern.is_empty() {
        return 0.0;
    }

    // prev[j]: distance of pattern[..i] ending at text[..j]; row 0 is all
    // zeros so a match may start anywhere in the text.
    let mut prev: Vec<usize> = vec![0; text.len() + 1];
    let mut curr: Vec<usize> = vec![0; text.len() + 1];

    for (i, pc) in pattern.iter().enumerate() {
        curr[0] = i + 1;
        for (j, tc) in text.iter().enumerate() {
            let substitute = prev[j] + usize::from(pc != tc);
            let delete = prev[j + 1] + 1;
            let insert = curr[j] + 1;
            curr[j + 1] = substitute.min(delete).min(insert);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    let best = prev.iter().copied().min().unwrap_or(pattern.len());
    best as f64 / pattern.len() as f64
}

// =============================================================================
// Search History
// =============================================================================

/// The most recent distinct search queries, newest first.
#[derive(Debug, Clone)]
pub struct SearchHistory {
    entries: VecDeque<String>,
    capacity: usize,
}

impl SearchHistory {
    pub fn new() -> Self {
        Self::with_capacity(SEARCH_HISTORY_LEN)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        SearchHistory {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Records a query. Blank queries are ignored; a repeat moves to the front.
    pub fn record(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() || self.capacity == 0 {
            return;
        }

        self.entries.retain(|entry| entry != query);
        self.entries.push_front(query.to_string());
        self.entries.truncate(self.capacity);
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for SearchHistory {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
