//! Product CRUD handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;

use mercato_core::{Price, ProductId};

use super::MessageResponse;
use crate::db::ProductRepository;
use crate::error::AppError;
use crate::models::product::{NewProduct, Product};
use crate::state::AppState;

/// Build the products router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list).post(create))
        .route("/products/{id}", get(get_one).put(update).delete(remove))
}

/// Request body for creating or overwriting a product.
///
/// Every field is required; they are `Option` here so a missing field
/// becomes a 400 with a message instead of a serde rejection.
#[derive(Debug, Deserialize)]
pub struct ProductPayload {
    name: Option<String>,
    price: Option<Price>,
    quantity: Option<i32>,
    image: Option<String>,
}

impl TryFrom<ProductPayload> for NewProduct {
    type Error = AppError;

    fn try_from(payload: ProductPayload) -> Result<Self, Self::Error> {
        let missing = || AppError::BadRequest("name, price, quantity and image are required".to_owned());

        let name = payload.name.filter(|n| !n.trim().is_empty()).ok_or_else(missing)?;
        let price = payload.price.ok_or_else(missing)?;
        let quantity = payload.quantity.ok_or_else(missing)?;
        let image = payload.image.filter(|i| !i.trim().is_empty()).ok_or_else(missing)?;

        Ok(Self {
            name,
            price,
            quantity,
            image,
        })
    }
}

/// `GET /products` - list every product. An empty catalog is an empty
/// list, not a 404.
async fn list(State(state): State<AppState>) -> Result<Json<Vec<Product>>, AppError> {
    let products = ProductRepository::new(state.pool()).list_all().await?;
    Ok(Json(products))
}

/// `GET /products/{id}`
async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>, AppError> {
    let product = ProductRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id} not found")))?;

    Ok(Json(product))
}

/// `POST /products`
async fn create(
    State(state): State<AppState>,
    Json(payload): Json<ProductPayload>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let input = NewProduct::try_from(payload)?;
    let product = ProductRepository::new(state.pool()).create(&input).await?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// `PUT /products/{id}` - full overwrite of every field.
async fn update(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(payload): Json<ProductPayload>,
) -> Result<Json<Product>, AppError> {
    let input = NewProduct::try_from(payload)?;
    let product = ProductRepository::new(state.pool())
        .update(id, &input)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id} not found")))?;

    Ok(Json(product))
}

/// `DELETE /products/{id}`
async fn remove(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<MessageResponse>, AppError> {
    let deleted = ProductRepository::new(state.pool()).delete(id).await?;

    if !deleted {
        return Err(AppError::NotFound(format!("product {id} not found")));
    }

    Ok(Json(MessageResponse {
        message: format!("product {id} deleted"),
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn full_payload() -> ProductPayload {
        ProductPayload {
            name: Some("Widget".to_owned()),
            price: Some(Price::new(Decimal::new(999, 2))),
            quantity: Some(5),
            image: Some("w.png".to_owned()),
        }
    }

    #[test]
    fn test_full_payload_converts() {
        let input = NewProduct::try_from(full_payload()).unwrap();
        assert_eq!(input.name, "Widget");
        assert_eq!(input.price, Price::new(Decimal::new(999, 2)));
        assert_eq!(input.quantity, 5);
        assert_eq!(input.image, "w.png");
    }

    #[test]
    fn test_missing_name_is_rejected() {
        let payload = ProductPayload {
            name: None,
            ..full_payload()
        };
        assert!(matches!(
            NewProduct::try_from(payload),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let payload = ProductPayload {
            name: Some("   ".to_owned()),
            ..full_payload()
        };
        assert!(matches!(
            NewProduct::try_from(payload),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_missing_price_is_rejected() {
        let payload = ProductPayload {
            price: None,
            ..full_payload()
        };
        assert!(matches!(
            NewProduct::try_from(payload),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_missing_quantity_is_rejected() {
        let payload = ProductPayload {
            quantity: None,
            ..full_payload()
        };
        assert!(matches!(
            NewProduct::try_from(payload),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_missing_image_is_rejected() {
        let payload = ProductPayload {
            image: None,
            ..full_payload()
        };
        assert!(matches!(
            NewProduct::try_from(payload),
            Err(AppError::BadRequest(_))
        ));
    }
}
