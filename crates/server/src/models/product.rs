//! Product domain types.

use serde::Serialize;

use mercato_core::{Price, ProductId};

/// A product as stored in the catalog (domain type).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    /// Unique product ID, generated server-side at creation.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price.
    pub price: Price,
    /// Units in stock.
    pub quantity: i32,
    /// Image URI or path.
    pub image: String,
}

/// The fields of a product minus its ID.
///
/// Used both for creation (the ID does not exist yet) and for update
/// (every field is overwritten, the ID is immutable).
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: Price,
    pub quantity: i32,
    pub image: String,
}
