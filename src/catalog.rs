//! The in-memory product store.
//!
//! Products live in insertion order in a `Vec`, with a side index from id to
//! position. One `parking_lot::RwLock` guards both, and every operation takes
//! it exactly once, so each operation sees a consistent snapshot and no
//! mutation is observed half-done. Guards are never held across `.await`.

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use parking_lot::RwLock;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::error::{ApiError, FieldError};
use crate::product::{Product, ProductDraft};
use crate::query::{ListQuery, Page};

#[derive(Default)]
struct Inventory {
    items: Vec<Product>,
    index: HashMap<String, usize>,
}

impl Inventory {
    fn position(&self, id: &str) -> Result<usize, ApiError> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| ApiError::not_found(format!("Product with id {id} not found")))
    }

    fn push(&mut self, product: Product) {
        self.index.insert(product.id.clone(), self.items.len());
        self.items.push(product);
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if !self.index.contains_key(&id) {
                return id;
            }
        }
    }
}

/// Aggregate figures over the whole catalog.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub total_products: usize,
    pub total_in_stock: usize,
    pub total_out_of_stock: usize,
    pub categories: BTreeMap<String, usize>,
    /// `None` (sent as `null`) when the catalog is empty.
    pub price_stats: Option<PriceStats>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PriceStats {
    pub highest: f64,
    pub lowest: f64,
    pub average: f64,
}

/// The product catalog. Shared between requests behind an `Arc`.
#[derive(Default)]
pub struct Catalog {
    inner: RwLock<Inventory>,
}

impl Catalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog holding `products` in the given order.
    ///
    /// Later duplicates of an id are dropped.
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let mut inv = Inventory::default();
        for p in products {
            if !inv.index.contains_key(&p.id) {
                inv.push(p);
            }
        }
        Self { inner: RwLock::new(inv) }
    }

    /// The three sample products the service starts with.
    pub fn seeded() -> Self {
        let now = Utc::now();
        let sample = |id: &str, name: &str, description: &str, price: f64, category: &str, in_stock: bool| {
            Product::from_draft(
                id.to_owned(),
                ProductDraft {
                    name: name.to_owned(),
                    description: description.to_owned(),
                    price,
                    category: category.to_owned(),
                    in_stock,
                },
                now,
            )
        };

        Self::with_products([
            sample("1", "Laptop", "High-performance laptop with 16GB RAM", 1200.0, "electronics", true),
            sample("2", "Smartphone", "Latest model with 128GB storage", 800.0, "electronics", true),
            sample("3", "Coffee Maker", "Programmable coffee maker with timer", 50.0, "kitchen", false),
        ])
    }

    pub fn len(&self) -> usize {
        self.inner.read().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Filters in insertion order, then windows the result.
    pub fn list(&self, query: &ListQuery) -> Page {
        let filter = query.filter();
        let matched: Vec<Product> = {
            let inv = self.inner.read();
            inv.items.iter().filter(|p| filter.matches(p)).cloned().collect()
        };
        debug!(matched = matched.len(), page = query.page, limit = query.limit, "listing products");
        Page::window(matched, query.page, query.limit)
    }

    /// Every product whose name or description contains `q`, ignoring case.
    pub fn search(&self, q: &str) -> Result<Vec<Product>, ApiError> {
        if q.is_empty() {
            return Err(ApiError::validation(
                "Search query (q) is required",
                vec![FieldError::new("q", "q is required")],
            ));
        }

        let term = q.to_lowercase();
        let inv = self.inner.read();
        Ok(inv.items.iter().filter(|p| p.mentions(&term)).cloned().collect())
    }

    /// Counts and price figures over the full catalog, in one pass.
    pub fn stats(&self) -> CatalogStats {
        let inv = self.inner.read();

        let mut in_stock = 0;
        let mut categories = BTreeMap::new();
        let mut prices: Option<(f64, f64, f64)> = None;

        for p in &inv.items {
            if p.in_stock {
                in_stock += 1;
            }
            *categories.entry(p.category.clone()).or_insert(0) += 1;
            prices = Some(match prices {
                None => (p.price, p.price, p.price),
                Some((hi, lo, sum)) => (hi.max(p.price), lo.min(p.price), sum + p.price),
            });
        }

        let total = inv.items.len();
        CatalogStats {
            total_products: total,
            total_in_stock: in_stock,
            total_out_of_stock: total - in_stock,
            categories,
            price_stats: prices.map(|(highest, lowest, sum)| PriceStats {
                highest,
                lowest,
                average: sum / total as f64,
            }),
        }
    }

    pub fn get(&self, id: &str) -> Result<Product, ApiError> {
        let inv = self.inner.read();
        let pos = inv.position(id)?;
        Ok(inv.items[pos].clone())
    }

    /// Appends a new product with a fresh id and creation time.
    pub fn create(&self, draft: ProductDraft) -> Product {
        let mut inv = self.inner.write();
        let product = Product::from_draft(inv.fresh_id(), draft, Utc::now());
        inv.push(product.clone());
        product
    }

    /// Replaces every mutable field of `id` and stamps `updated_at`.
    pub fn update(&self, id: &str, draft: ProductDraft) -> Result<Product, ApiError> {
        let mut inv = self.inner.write();
        let pos = inv.position(id)?;
        let product = &mut inv.items[pos];
        product.apply(draft, Utc::now());
        Ok(product.clone())
    }

    /// Removes `id` and hands the removed record back.
    pub fn delete(&self, id: &str) -> Result<Product, ApiError> {
        let mut inv = self.inner.write();
        let pos = inv.position(id)?;
        let removed = inv.items.remove(pos);
        inv.index.remove(id);

        let Inventory { items, index } = &mut *inv;
        for (i, p) in items.iter().enumerate().skip(pos) {
            index.insert(p.id.clone(), i);
        }
        Ok(removed)
    }
}
