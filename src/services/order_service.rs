use std::collections::{HashMap, HashSet};

use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait, sea_query::Expr,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit,
    dto::orders::{OrderList, PlaceOrderRequest},
    entity::{
        order_items::{
            ActiveModel as OrderItemActive, Column as ItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, OrderStatus},
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    lifecycle::{self, Actor, Guard, Milestone, OrderSnapshot, Transition},
    middleware::auth::AuthUser,
    models::{LineItem, Order, order_total},
    response::Meta,
    routes::params::OrderListQuery,
    state::AppState,
};

pub async fn place_order(
    state: &AppState,
    user: &AuthUser,
    payload: PlaceOrderRequest,
) -> AppResult<Order> {
    payload.validate()?;
    let PlaceOrderRequest {
        comments,
        coupon_id,
        products,
    } = payload;
    let items: Vec<LineItem> = products.into_iter().map(LineItem::from).collect();
    let total_price = checked_total(&items)?;

    let txn = state.orm.begin().await?;
    ensure_products_exist(&txn, &items).await?;

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        customer_id: Set(user.user_id),
        employee_id: Set(None),
        coupon_id: Set(coupon_id),
        comments: Set(comments),
        total_price: Set(total_price),
        status: Set(OrderStatus::Order),
        confirm_date: Set(None),
        payment_date: Set(None),
        shipment_date: Set(None),
        cancel_date: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;
    let stored = insert_items(&txn, order.id, &items).await?;
    txn.commit().await?;

    tracing::info!(order_id = %order.id, customer_id = %user.user_id, total_price, "order placed");
    audit::record(
        &state.pool,
        Some(user),
        "order_create",
        "orders",
        serde_json::json!({ "order_id": order.id, "total_price": total_price }),
    )
    .await;

    Ok(Order::from_parts(order, stored))
}

/// Replaces comments and line items of an order the customer still owns in
/// status `order`.
pub async fn update_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: PlaceOrderRequest,
) -> AppResult<Order> {
    payload.validate()?;
    let PlaceOrderRequest {
        comments,
        coupon_id,
        products,
    } = payload;
    let items: Vec<LineItem> = products.into_iter().map(LineItem::from).collect();
    let total_price = checked_total(&items)?;

    let txn = state.orm.begin().await?;
    ensure_products_exist(&txn, &items).await?;

    let updated = Orders::update_many()
        .col_expr(OrderCol::Comments, Expr::value(comments))
        .col_expr(OrderCol::CouponId, Expr::value(coupon_id))
        .col_expr(OrderCol::TotalPrice, Expr::value(total_price))
        .col_expr(OrderCol::UpdatedAt, Expr::current_timestamp().into())
        .filter(OrderCol::Id.eq(id))
        .filter(OrderCol::CustomerId.eq(user.user_id))
        .filter(OrderCol::Status.eq(OrderStatus::Order.as_str()))
        .exec_with_returning(&txn)
        .await?
        .into_iter()
        .next();

    let Some(order) = updated else {
        let current = Orders::find_by_id(id).one(&txn).await?;
        return Err(match current {
            Some(order) if order.customer_id == user.user_id => AppError::InvalidState(format!(
                "Cannot update an order in status '{}'",
                order.status.as_str()
            )),
            _ => AppError::NotFound("Order"),
        });
    };

    OrderItems::delete_many()
        .filter(ItemCol::OrderId.eq(order.id))
        .exec(&txn)
        .await?;
    let stored = insert_items(&txn, order.id, &items).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user),
        "order_update",
        "orders",
        serde_json::json!({ "order_id": order.id, "total_price": total_price }),
    )
    .await;

    Ok(Order::from_parts(order, stored))
}

/// Runs one status transition as a single conditional update. Nothing is
/// written unless the stored order satisfies the planned guard.
pub async fn transition(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    transition: Transition,
) -> AppResult<Order> {
    let actor = Actor {
        id: user.user_id,
        role: user.role,
    };
    let (guard, effect) = lifecycle::plan(transition, actor)?;

    let mut update = Orders::update_many()
        .col_expr(OrderCol::UpdatedAt, Expr::current_timestamp().into())
        .filter(guard_condition(id, &guard));
    if let Some(status) = effect.status {
        update = update.col_expr(OrderCol::Status, Expr::value(status.as_str()));
    }
    if let Some(milestone) = effect.milestone {
        update = update.col_expr(milestone_column(milestone), Expr::current_timestamp().into());
    }
    if let Some(employee_id) = effect.assign_employee {
        update = update.col_expr(OrderCol::EmployeeId, Expr::value(employee_id));
    }

    let updated = update
        .exec_with_returning(&state.orm)
        .await?
        .into_iter()
        .next();

    let Some(order) = updated else {
        let current = Orders::find_by_id(id).one(&state.orm).await?;
        let snapshot = current.as_ref().map(OrderSnapshot::from);
        let err = guard.rejection(transition, snapshot.as_ref());
        tracing::debug!(order_id = %id, action = transition.action(), error = %err, "transition rejected");
        return Err(err);
    };

    let items = load_items(&state.orm, order.id).await?;
    tracing::info!(
        order_id = %order.id,
        action = transition.action(),
        status = order.status.as_str(),
        actor = %user.user_id,
        "order transition"
    );
    audit::record(
        &state.pool,
        Some(user),
        transition.action(),
        "orders",
        serde_json::json!({ "order_id": order.id, "status": order.status.as_str() }),
    )
    .await;

    Ok(Order::from_parts(order, items))
}

/// Hard delete, allowed for the owning customer while the order is in status
/// `order`.
pub async fn delete_order(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<()> {
    let result = Orders::delete_many()
        .filter(OrderCol::Id.eq(id))
        .filter(OrderCol::CustomerId.eq(user.user_id))
        .filter(OrderCol::Status.eq(OrderStatus::Order.as_str()))
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        let current = Orders::find_by_id(id).one(&state.orm).await?;
        return Err(match current {
            None => AppError::NotFound("Order"),
            Some(order) if order.customer_id != user.user_id => AppError::forbidden(),
            Some(_) => AppError::Forbidden("Only orders that are not yet processed can be deleted".into()),
        });
    }

    audit::record(
        &state.pool,
        Some(user),
        "order_delete",
        "orders",
        serde_json::json!({ "order_id": id }),
    )
    .await;
    Ok(())
}

/// Customers only see their own orders; employees see any.
pub async fn get_order(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<Order> {
    let mut finder = Orders::find_by_id(id);
    if !user.is_employee() {
        finder = finder.filter(OrderCol::CustomerId.eq(user.user_id));
    }
    let order = finder
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("Order"))?;
    let items = load_items(&state.orm, order.id).await?;
    Ok(Order::from_parts(order, items))
}

pub async fn list_customer_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<(OrderList, Meta)> {
    let condition = list_condition(&query).add(OrderCol::CustomerId.eq(user.user_id));
    list_orders(state, condition, &query).await
}

pub async fn list_manager_orders(
    state: &AppState,
    query: OrderListQuery,
) -> AppResult<(OrderList, Meta)> {
    let mut condition = list_condition(&query);
    if let Some(customer_id) = query.customer_id {
        condition = condition.add(OrderCol::CustomerId.eq(customer_id));
    }
    if let Some(employee_id) = query.employee_id {
        condition = condition.add(OrderCol::EmployeeId.eq(employee_id));
    }
    list_orders(state, condition, &query).await
}

async fn list_orders(
    state: &AppState,
    condition: Condition,
    query: &OrderListQuery,
) -> AppResult<(OrderList, Meta)> {
    let (page, limit, offset) = query.pagination().normalize();

    let finder = Orders::find()
        .filter(condition)
        .order_by_desc(OrderCol::CreatedAt);
    let total = finder.clone().count(&state.orm).await?;

    let orders = finder
        .limit(limit)
        .offset(offset)
        .all(&state.orm)
        .await?;

    let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let mut grouped: HashMap<Uuid, Vec<OrderItemModel>> = HashMap::new();
    if !ids.is_empty() {
        for item in OrderItems::find()
            .filter(ItemCol::OrderId.is_in(ids))
            .order_by_asc(ItemCol::Position)
            .all(&state.orm)
            .await?
        {
            grouped.entry(item.order_id).or_default().push(item);
        }
    }

    let items = orders
        .into_iter()
        .map(|order| {
            let lines = grouped.remove(&order.id).unwrap_or_default();
            Order::from_parts(order, lines)
        })
        .collect();

    Ok((OrderList { items }, Meta::new(page, limit, total)))
}

fn list_condition(query: &OrderListQuery) -> Condition {
    let mut condition = Condition::all();
    if let Some(status) = query.status {
        condition = condition.add(OrderCol::Status.eq(status.as_str()));
    }
    if let Some(day) = query.order_date {
        let (start, end) = day_bounds(day);
        condition = condition
            .add(OrderCol::CreatedAt.gte(start))
            .add(OrderCol::CreatedAt.lt(end));
    }
    condition
}

/// UTC bounds `[start, end)` of a calendar day.
fn day_bounds(day: NaiveDate) -> (chrono::DateTime<Utc>, chrono::DateTime<Utc>) {
    let start = day.and_time(NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

/// `WHERE` clause equivalent of [`Guard::admits`], scoped to one order.
fn guard_condition(id: Uuid, guard: &Guard) -> Condition {
    let mut condition = Condition::all()
        .add(OrderCol::Id.eq(id))
        .add(OrderCol::Status.is_in(guard.from.iter().map(|s| s.as_str())));
    if guard.unconfirmed {
        condition = condition.add(OrderCol::ConfirmDate.is_null());
    }
    if guard.unpaid {
        condition = condition.add(OrderCol::PaymentDate.is_null());
    }
    if guard.paid {
        condition = condition.add(OrderCol::PaymentDate.is_not_null());
    }
    if let Some(customer_id) = guard.customer {
        condition = condition.add(OrderCol::CustomerId.eq(customer_id));
    }
    if let Some(employee_id) = guard.employee {
        condition = condition.add(OrderCol::EmployeeId.eq(employee_id));
    }
    condition
}

fn milestone_column(milestone: Milestone) -> OrderCol {
    match milestone {
        Milestone::Confirm => OrderCol::ConfirmDate,
        Milestone::Payment => OrderCol::PaymentDate,
        Milestone::Shipment => OrderCol::ShipmentDate,
        Milestone::Cancel => OrderCol::CancelDate,
    }
}

fn checked_total(items: &[LineItem]) -> AppResult<i64> {
    order_total(items).ok_or_else(|| AppError::Validation("Order total is too large".into()))
}

/// Every line item must point at a product that exists and is not deleted.
async fn ensure_products_exist<C: ConnectionTrait>(conn: &C, items: &[LineItem]) -> AppResult<()> {
    let wanted: HashSet<Uuid> = items.iter().map(|item| item.product_id).collect();
    let found = Products::find()
        .filter(ProdCol::Id.is_in(wanted.iter().copied()))
        .filter(ProdCol::DeletedAt.is_null())
        .count(conn)
        .await?;
    if found != wanted.len() as u64 {
        return Err(AppError::Validation(
            "Order contains unknown or deleted products".into(),
        ));
    }
    Ok(())
}

async fn insert_items<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
    items: &[LineItem],
) -> AppResult<Vec<OrderItemModel>> {
    let mut stored = Vec::with_capacity(items.len());
    for (position, item) in items.iter().enumerate() {
        let row = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            product_id: Set(item.product_id),
            position: Set(position as i32),
            name: Set(item.name.clone()),
            quantity: Set(item.quantity),
            price: Set(item.price),
            price_discount: Set(item.price_discount),
        }
        .insert(conn)
        .await?;
        stored.push(row);
    }
    Ok(stored)
}

async fn load_items<C: ConnectionTrait>(conn: &C, order_id: Uuid) -> AppResult<Vec<OrderItemModel>> {
    Ok(OrderItems::find()
        .filter(ItemCol::OrderId.eq(order_id))
        .order_by_asc(ItemCol::Position)
        .all(conn)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_bounds_cover_one_utc_day() {
        let day = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let (start, end) = day_bounds(day);
        assert_eq!(start.to_rfc3339(), "2024-02-29T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2024-03-01T00:00:00+00:00");
    }

    #[test]
    fn each_milestone_has_its_own_column() {
        let columns: HashSet<String> = [
            Milestone::Confirm,
            Milestone::Payment,
            Milestone::Shipment,
            Milestone::Cancel,
        ]
        .into_iter()
        .map(|m| format!("{:?}", milestone_column(m)))
        .collect();
        assert_eq!(columns.len(), 4);
    }

    #[test]
    fn overflowing_total_is_a_validation_error() {
        let items = vec![LineItem {
            product_id: Uuid::new_v4(),
            name: "x".into(),
            quantity: 2,
            price: i64::MAX,
            price_discount: None,
        }];
        assert!(matches!(checked_total(&items), Err(AppError::Validation(_))));
    }
}
