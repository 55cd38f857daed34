use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{
    customers, employees, employees::EmployeeRole, order_items, orders, orders::OrderStatus,
    product_categories, products,
};

/// Role claim carried by every token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Staff,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Staff => "staff",
            Role::Admin => "admin",
        }
    }

    pub fn is_employee(&self) -> bool {
        matches!(self, Role::Staff | Role::Admin)
    }
}

impl From<EmployeeRole> for Role {
    fn from(role: EmployeeRole) -> Self {
        match role {
            EmployeeRole::Admin => Role::Admin,
            EmployeeRole::Staff => Role::Staff,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    pub username: String,
    pub phone_number: String,
    pub address: String,
    pub image: Option<String>,
    pub coin: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub image: Option<String>,
    #[serde(rename = "type")]
    pub role: EmployeeRole,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductCategory {
    pub id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub price: i64,
    pub price_discount: Option<i64>,
    pub image: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub category_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub price: i64,
    pub price_discount: Option<i64>,
}

impl LineItem {
    /// Unit price actually charged: the discount wins when it is present and non-zero.
    pub fn effective_price(&self) -> i64 {
        match self.price_discount {
            Some(discount) if discount != 0 => discount,
            _ => self.price,
        }
    }
}

/// Sum of `effective_price * quantity`; `None` on overflow.
pub fn order_total(items: &[LineItem]) -> Option<i64> {
    items.iter().try_fold(0_i64, |total, item| {
        item.effective_price()
            .checked_mul(i64::from(item.quantity))
            .and_then(|line| total.checked_add(line))
    })
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub employee_id: Option<Uuid>,
    pub coupon_id: Option<Uuid>,
    pub comments: Option<String>,
    pub total_price: i64,
    pub status: OrderStatus,
    pub products: Vec<LineItem>,
    pub confirm_date: Option<DateTime<Utc>>,
    pub payment_date: Option<DateTime<Utc>>,
    pub shipment_date: Option<DateTime<Utc>>,
    pub cancel_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn from_parts(model: orders::Model, items: Vec<order_items::Model>) -> Self {
        Self {
            id: model.id,
            customer_id: model.customer_id,
            employee_id: model.employee_id,
            coupon_id: model.coupon_id,
            comments: model.comments,
            total_price: model.total_price,
            status: model.status,
            products: items.into_iter().map(LineItem::from).collect(),
            confirm_date: model.confirm_date.map(|dt| dt.with_timezone(&Utc)),
            payment_date: model.payment_date.map(|dt| dt.with_timezone(&Utc)),
            shipment_date: model.shipment_date.map(|dt| dt.with_timezone(&Utc)),
            cancel_date: model.cancel_date.map(|dt| dt.with_timezone(&Utc)),
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<customers::Model> for Customer {
    fn from(model: customers::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            phone_number: model.phone_number,
            address: model.address,
            image: model.image,
            coin: model.coin,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<employees::Model> for Employee {
    fn from(model: employees::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            phone_number: model.phone_number,
            address: model.address,
            image: model.image,
            role: model.role,
            created_at: model.created_at.with_timezone(&Utc),
            deleted_at: model.deleted_at.map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

impl From<product_categories::Model> for ProductCategory {
    fn from(model: product_categories::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            image: model.image,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<products::Model> for Product {
    fn from(model: products::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            slug: model.slug,
            price: model.price,
            price_discount: model.price_discount,
            image: model.image,
            status: model.status,
            category_id: model.category_id,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
            deleted_at: model.deleted_at.map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

impl From<order_items::Model> for LineItem {
    fn from(model: order_items::Model) -> Self {
        Self {
            product_id: model.product_id,
            name: model.name,
            quantity: model.quantity,
            price: model.price,
            price_discount: model.price_discount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(price: i64, price_discount: Option<i64>, quantity: i32) -> LineItem {
        LineItem {
            product_id: Uuid::new_v4(),
            name: "item".into(),
            quantity,
            price,
            price_discount,
        }
    }

    #[test]
    fn total_uses_discount_when_non_zero() {
        let items = vec![item(100, None, 2), item(50, Some(40), 1)];
        assert_eq!(order_total(&items), Some(240));
    }

    #[test]
    fn zero_discount_falls_back_to_price() {
        let items = vec![item(80, Some(0), 3)];
        assert_eq!(order_total(&items), Some(240));
    }

    #[test]
    fn total_reports_overflow() {
        let items = vec![item(i64::MAX, None, 2)];
        assert_eq!(order_total(&items), None);
    }
}
