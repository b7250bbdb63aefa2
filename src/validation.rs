//! Payload validation for create and update.
//!
//! Every field is checked and every violation reported, so a client can fix
//! a payload in one round trip.

use serde_json::{Map, Value};

use crate::error::{ApiError, FieldError};
use crate::product::ProductDraft;

/// Checks a create/update payload and normalises it into a [`ProductDraft`].
///
/// Required: `name`, `description`, `category` (non-empty strings) and
/// `price` (a number ≥ 0). Optional: `inStock` (a boolean, default `true`).
pub fn validate(payload: &Value) -> Result<ProductDraft, ApiError> {
    let Some(fields) = payload.as_object() else {
        return Err(ApiError::validation(
            "Validation failed",
            vec![FieldError::new("body", "must be a JSON object")],
        ));
    };

    let mut errors = Vec::new();

    let name = required_text(fields, "name", &mut errors);
    let description = required_text(fields, "description", &mut errors);
    let price = price(fields, &mut errors);
    let category = required_text(fields, "category", &mut errors);
    let in_stock = in_stock(fields, &mut errors);

    match (name, description, price, category, in_stock) {
        (Some(name), Some(description), Some(price), Some(category), Some(in_stock))
            if errors.is_empty() =>
        {
            Ok(ProductDraft { name, description, price, category, in_stock })
        }
        _ => Err(ApiError::validation("Validation failed", errors)),
    }
}

fn required_text(fields: &Map<String, Value>, field: &str, errors: &mut Vec<FieldError>) -> Option<String> {
    match fields.get(field) {
        None | Some(Value::Null) => {
            errors.push(FieldError::new(field, format!("{field} is required")));
            None
        }
        Some(Value::String(s)) if s.trim().is_empty() => {
            errors.push(FieldError::new(field, format!("{field} must not be empty")));
            None
        }
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.push(FieldError::new(field, format!("{field} must be a string")));
            None
        }
    }
}

fn price(fields: &Map<String, Value>, errors: &mut Vec<FieldError>) -> Option<f64> {
    match fields.get("price") {
        None | Some(Value::Null) => {
            errors.push(FieldError::new("price", "price is required"));
            None
        }
        Some(Value::Number(n)) => match n.as_f64() {
            Some(p) if p.is_finite() && p >= 0.0 => Some(p),
            _ => {
                errors.push(FieldError::new("price", "price must be a number greater than or equal to 0"));
                None
            }
        },
        Some(_) => {
            errors.push(FieldError::new("price", "price must be a number"));
            None
        }
    }
}

fn in_stock(fields: &Map<String, Value>, errors: &mut Vec<FieldError>) -> Option<bool> {
    match fields.get("inStock") {
        None | Some(Value::Null) => Some(true),
        Some(Value::Bool(b)) => Some(*b),
        Some(_) => {
            errors.push(FieldError::new("inStock", "inStock must be a boolean"));
            None
        }
    }
}
