//! The catalog's only entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A product as stored and as sent to clients.
///
/// `id` and `created_at` are assigned by the [`Catalog`](crate::Catalog) and
/// never change; `updated_at` appears after the first update.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub in_stock: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// The mutable fields of a product, already validated.
///
/// Produced by [`validation::validate`](crate::validation::validate); the
/// store trusts it as-is.
#[derive(Clone, Debug, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub in_stock: bool,
}

impl Product {
    pub(crate) fn from_draft(id: String, draft: ProductDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            price: draft.price,
            category: draft.category,
            in_stock: draft.in_stock,
            created_at,
            updated_at: None,
        }
    }

    /// Replaces every mutable field. `id` and `created_at` are kept.
    pub(crate) fn apply(&mut self, draft: ProductDraft, at: DateTime<Utc>) {
        self.name = draft.name;
        self.description = draft.description;
        self.price = draft.price;
        self.category = draft.category;
        self.in_stock = draft.in_stock;
        self.updated_at = Some(at);
    }

    /// `term` must already be lower-cased.
    pub(crate) fn mentions(&self, term: &str) -> bool {
        self.name.to_lowercase().contains(term) || self.description.to_lowercase().contains(term)
    }

    pub(crate) fn in_category(&self, category: &str) -> bool {
        self.category.to_lowercase() == category
    }
}
