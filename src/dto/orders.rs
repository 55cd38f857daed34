use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{LineItem, Order};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LineItemRequest {
    #[serde(rename = "_id")]
    pub product_id: Uuid,
    #[validate(length(min = 1, message = "is required"))]
    pub name: String,
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub quantity: i32,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub price: i64,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub price_discount: Option<i64>,
}

impl From<LineItemRequest> for LineItem {
    fn from(req: LineItemRequest) -> Self {
        Self {
            product_id: req.product_id,
            name: req.name,
            quantity: req.quantity,
            price: req.price,
            price_discount: req.price_discount,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub comments: Option<String>,
    pub coupon_id: Option<Uuid>,
    #[validate(length(min = 1, message = "must contain at least one item"), nested)]
    pub products: Vec<LineItemRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct OrderList {
    #[schema(value_type = Vec<Order>)]
    pub items: Vec<Order>,
}
