use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::orders::{OrderList, PlaceOrderRequest},
    error::AppResult,
    extract::{AppJson, AppPath, AppQuery},
    lifecycle::Transition,
    middleware::auth::{AuthUser, CustomerOnly, Require, StaffOnly},
    models::Order,
    response::ApiResponse,
    routes::params::OrderListQuery,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(place_order))
        .route("/customer", get(list_customer_orders))
        .route("/manager", get(list_manager_orders))
        .route(
            "/{id}",
            get(get_order).put(update_order).delete(delete_order),
        )
        .route("/{id}/confirm", patch(confirm_order))
        .route("/{id}/payment", patch(pay_order))
        .route("/{id}/shipping", patch(ship_order))
        .route("/{id}/complete", patch(complete_order))
        .route("/{id}/cancel", patch(cancel_order))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = ApiResponse<Order>),
        (status = 400, description = "Invalid line items"),
        (status = 403, description = "Not a customer")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn place_order(
    State(state): State<AppState>,
    auth: Require<CustomerOnly>,
    AppJson(payload): AppJson<PlaceOrderRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Order>>)> {
    let order = order_service::place_order(&state, &auth.user, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Order successfully", order)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/orders/customer",
    params(OrderListQuery),
    responses(
        (status = 200, description = "Orders of the authenticated customer", body = ApiResponse<OrderList>),
        (status = 403, description = "Not a customer")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_customer_orders(
    State(state): State<AppState>,
    auth: Require<CustomerOnly>,
    AppQuery(query): AppQuery<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let (list, meta) = order_service::list_customer_orders(&state, &auth.user, query).await?;
    Ok(Json(ApiResponse::page(list, meta)))
}

#[utoipa::path(
    get,
    path = "/api/orders/manager",
    params(OrderListQuery),
    responses(
        (status = 200, description = "All orders", body = ApiResponse<OrderList>),
        (status = 403, description = "Not an employee")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_manager_orders(
    State(state): State<AppState>,
    _auth: Require<StaffOnly>,
    AppQuery(query): AppQuery<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let (list, meta) = order_service::list_manager_orders(&state, query).await?;
    Ok(Json(ApiResponse::page(list, meta)))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order with line items", body = ApiResponse<Order>),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = order_service::get_order(&state, &user, id).await?;
    Ok(Json(ApiResponse::success("Order", order)))
}

#[utoipa::path(
    put,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = PlaceOrderRequest,
    responses(
        (status = 200, description = "Order updated", body = ApiResponse<Order>),
        (status = 400, description = "Order is no longer editable"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn update_order(
    State(state): State<AppState>,
    auth: Require<CustomerOnly>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<PlaceOrderRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = order_service::update_order(&state, &auth.user, id, payload).await?;
    Ok(Json(ApiResponse::success("Update successfully", order)))
}

#[utoipa::path(
    delete,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order deleted"),
        (status = 403, description = "Order belongs to someone else or is already processed"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    auth: Require<CustomerOnly>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    order_service::delete_order(&state, &auth.user, id).await?;
    Ok(Json(ApiResponse::message("Delete successfully")))
}

async fn run_transition(
    state: AppState,
    user: AuthUser,
    id: Uuid,
    transition: Transition,
    message: &'static str,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = order_service::transition(&state, &user, id, transition).await?;
    Ok(Json(ApiResponse::success(message, order)))
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}/confirm",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order confirmed", body = ApiResponse<Order>),
        (status = 400, description = "Order cannot be confirmed in its current state"),
        (status = 403, description = "Not an employee")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn confirm_order(
    State(state): State<AppState>,
    auth: Require<StaffOnly>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<Order>>> {
    run_transition(state, auth.user, id, Transition::Confirm, "Confirm successfully").await
}

/// Customers pay for a fresh order; the assigned employee records cash on
/// delivery while shipping.
#[utoipa::path(
    patch,
    path = "/api/orders/{id}/payment",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Payment recorded", body = ApiResponse<Order>),
        (status = 400, description = "Order already paid or in the wrong state"),
        (status = 403, description = "Order is handled by another employee")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn pay_order(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<Order>>> {
    run_transition(state, user, id, Transition::Payment, "Payment successfully").await
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}/shipping",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order shipped", body = ApiResponse<Order>),
        (status = 400, description = "Order is not confirmed"),
        (status = 403, description = "Order is handled by another employee")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn ship_order(
    State(state): State<AppState>,
    auth: Require<StaffOnly>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<Order>>> {
    run_transition(state, auth.user, id, Transition::Shipping, "Shipping successfully").await
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}/complete",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order completed", body = ApiResponse<Order>),
        (status = 400, description = "Order is not shipping or not paid"),
        (status = 403, description = "Order is handled by another employee")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn complete_order(
    State(state): State<AppState>,
    auth: Require<StaffOnly>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<Order>>> {
    run_transition(state, auth.user, id, Transition::Complete, "Complete successfully").await
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}/cancel",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order cancelled", body = ApiResponse<Order>),
        (status = 400, description = "Order is already cancelled"),
        (status = 403, description = "Order is handled by another employee")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn cancel_order(
    State(state): State<AppState>,
    auth: Require<StaffOnly>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<Order>>> {
    run_transition(state, auth.user, id, Transition::Cancel, "Cancel successfully").await
}
