use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[sea_orm(string_value = "order")]
    Order,
    #[sea_orm(string_value = "transaction")]
    Transaction,
    #[sea_orm(string_value = "shipping")]
    Shipping,
    #[sea_orm(string_value = "complete")]
    Complete,
    #[sea_orm(string_value = "cancel")]
    Cancel,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Order => "order",
            OrderStatus::Transaction => "transaction",
            OrderStatus::Shipping => "shipping",
            OrderStatus::Complete => "complete",
            OrderStatus::Cancel => "cancel",
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub customer_id: Uuid,
    pub employee_id: Option<Uuid>,
    pub coupon_id: Option<Uuid>,
    pub comments: Option<String>,
    pub total_price: i64,
    pub status: OrderStatus,
    pub confirm_date: Option<DateTimeWithTimeZone>,
    pub payment_date: Option<DateTimeWithTimeZone>,
    pub shipment_date: Option<DateTimeWithTimeZone>,
    pub cancel_date: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customers::Entity",
        from = "Column::CustomerId",
        to = "super::customers::Column::Id"
    )]
    Customers,
    #[sea_orm(
        belongs_to = "super::employees::Entity",
        from = "Column::EmployeeId",
        to = "super::employees::Column::Id"
    )]
    Employees,
    #[sea_orm(has_many = "super::order_items::Entity")]
    OrderItems,
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customers.def()
    }
}

impl Related<super::employees::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employees.def()
    }
}

impl Related<super::order_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::OrderStatus;
    use sea_orm::{ActiveEnum, Iterable};

    #[test]
    fn stored_values_match_wire_names() {
        for status in OrderStatus::iter() {
            assert_eq!(status.to_value(), status.as_str());
            assert_eq!(OrderStatus::try_from_value(&status.to_value()).unwrap(), status);
        }
    }
}
