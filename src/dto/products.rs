use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::Product;

#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub name: String,
    #[validate(range(min = 1, message = "must be greater than 0"))]
    pub price: i64,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub price_discount: Option<i64>,
    pub image: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub category_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub name: Option<String>,
    #[validate(range(min = 1, message = "must be greater than 0"))]
    pub price: Option<i64>,
    /// `0` removes the current discount.
    #[validate(range(min = 0, message = "must not be negative"))]
    pub price_discount: Option<i64>,
    pub image: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub category_id: Option<Uuid>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}
