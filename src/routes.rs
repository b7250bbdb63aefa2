//! The catalog's HTTP surface.
//!
//! | Method & path | Auth | Success |
//! |---|---|---|
//! | `GET /` | no | welcome + endpoint map |
//! | `GET /api/products` | yes | `{products, pagination}` |
//! | `GET /api/products/search` | yes | `{query, results, count}` |
//! | `GET /api/products/stats` | yes | stats object |
//! | `GET /api/products/{id}` | yes | product |
//! | `POST /api/products` | yes | `201` + created product |
//! | `PUT /api/products/{id}` | yes | updated product |
//! | `DELETE /api/products/{id}` | yes | `{message, product}` |

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Value, json};
use tracing::info;

use crate::catalog::{Catalog, CatalogStats};
use crate::error::ApiError;
use crate::handler::with_state;
use crate::method::Method;
use crate::middleware::{ApiKeyAuth, RequestLogger};
use crate::product::Product;
use crate::query::{ListQuery, Page};
use crate::request::Request;
use crate::response::Json;
use crate::router::Router;
use crate::status::Status;
use crate::validation::validate;

/// Builds the full router: request logging for everything, the API key gate
/// in front of every `/api/products` route.
pub fn app(catalog: Arc<Catalog>, api_key: &str) -> Router {
    let auth = ApiKeyAuth::new(api_key);
    let c = || Arc::clone(&catalog);

    Router::new()
        .layer(RequestLogger)
        .on(Method::Get, "/", welcome)
        .group(|g| {
            g.layer(auth)
                .on(Method::Get, "/api/products", with_state(c(), list_products))
                .on(Method::Get, "/api/products/search", with_state(c(), search_products))
                .on(Method::Get, "/api/products/stats", with_state(c(), product_stats))
                .on(Method::Get, "/api/products/{id}", with_state(c(), get_product))
                .on(Method::Post, "/api/products", with_state(c(), create_product))
                .on(Method::Put, "/api/products/{id}", with_state(c(), update_product))
                .on(Method::Delete, "/api/products/{id}", with_state(c(), delete_product))
        })
}

async fn welcome(_req: Request) -> Json<Value> {
    Json(json!({
        "message": "Welcome to the Product API!",
        "endpoints": {
            "products": "/api/products",
            "documentation": "See README.md for API documentation",
        },
    }))
}

async fn list_products(catalog: Arc<Catalog>, req: Request) -> Json<Page> {
    Json(catalog.list(&ListQuery::from_request(&req)))
}

#[derive(Serialize)]
struct SearchResults {
    query: String,
    results: Vec<Product>,
    count: usize,
}

async fn search_products(catalog: Arc<Catalog>, req: Request) -> Result<Json<SearchResults>, ApiError> {
    let q = req.query("q").unwrap_or_default();
    let results = catalog.search(q)?;
    Ok(Json(SearchResults { query: q.to_owned(), count: results.len(), results }))
}

async fn product_stats(catalog: Arc<Catalog>, _req: Request) -> Json<CatalogStats> {
    Json(catalog.stats())
}

fn id_of(req: &Request) -> Result<&str, ApiError> {
    req.param("id").ok_or_else(|| ApiError::internal("route matched without an id parameter"))
}

async fn get_product(catalog: Arc<Catalog>, req: Request) -> Result<Json<Product>, ApiError> {
    catalog.get(id_of(&req)?).map(Json)
}

async fn create_product(catalog: Arc<Catalog>, req: Request) -> Result<(Status, Json<Product>), ApiError> {
    let draft = validate(&req.json::<Value>()?)?;
    let product = catalog.create(draft);
    info!(id = %product.id, "product created");
    Ok((Status::Created, Json(product)))
}

async fn update_product(catalog: Arc<Catalog>, req: Request) -> Result<Json<Product>, ApiError> {
    let draft = validate(&req.json::<Value>()?)?;
    let product = catalog.update(id_of(&req)?, draft)?;
    info!(id = %product.id, "product updated");
    Ok(Json(product))
}

async fn delete_product(catalog: Arc<Catalog>, req: Request) -> Result<Json<Value>, ApiError> {
    let product = catalog.delete(id_of(&req)?)?;
    info!(id = %product.id, "product deleted");
    Ok(Json(json!({
        "message": "Product deleted successfully",
        "product": product,
    })))
}
