use sea_orm::{ConnectionTrait, Statement};
use storefront_api::{
    config::TokenConfig,
    db::{create_pool, run_migrations},
    dto::{
        auth::{CustomerLoginRequest, RegisterCustomerRequest},
        categories::CategoryRequest,
        employees::RegisterEmployeeRequest,
        orders::{LineItemRequest, PlaceOrderRequest},
        products::CreateProductRequest,
    },
    entity::{employees::EmployeeRole, orders::OrderStatus},
    error::AppError,
    lifecycle::Transition,
    middleware::auth::AuthUser,
    models::{Product, Role},
    routes::params::OrderListQuery,
    services::{
        auth_service::{self, PrincipalKind},
        category_service, employee_service, order_service, product_service,
        token_service::TokenService,
    },
    state::AppState,
};
use uuid::Uuid;

// Integration flow: catalog setup -> customer orders -> employees drive the
// status machine -> sessions are revoked on logout.
#[tokio::test]
async fn order_lifecycle_and_session_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;

    // Employees
    let root = AuthUser {
        user_id: Uuid::new_v4(),
        role: Role::Admin,
    };
    let admin = register_employee(&state, &root, "admin@example.com", EmployeeRole::Admin).await?;
    let staff1 = register_employee(&state, &admin, "staff1@example.com", EmployeeRole::Staff).await?;
    let staff2 = register_employee(&state, &admin, "staff2@example.com", EmployeeRole::Staff).await?;

    let duplicate = register_employee(&state, &admin, "staff1@example.com", EmployeeRole::Staff).await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    // Catalog
    let category = category_service::create_category(
        &state,
        &admin,
        CategoryRequest {
            name: "Drinks".into(),
            image: None,
        },
    )
    .await?;
    let tea = create_product(&state, &admin, "Trà đào", 100, None, category.id).await?;
    let coffee = create_product(&state, &admin, "Cà phê sữa", 50, Some(40), category.id).await?;
    assert_eq!(tea.slug, "tra-dao");

    let bad_discount = create_product(&state, &admin, "Bánh mì", 10, Some(20), category.id).await;
    assert!(matches!(bad_discount, Err(AppError::Validation(_))));

    // Customers
    let alice = register_customer(&state, "0912345678").await?;
    let bob = register_customer(&state, "0987654321").await?;
    let again = register_customer(&state, "0912345678").await;
    assert!(matches!(again, Err(AppError::Conflict(_))));

    // Totals use the discounted price when present.
    let order = order_service::place_order(
        &state,
        &alice,
        place_request(vec![line(&tea, 2), line(&coffee, 1)]),
    )
    .await?;
    assert_eq!(order.total_price, 240);
    assert_eq!(order.status, OrderStatus::Order);
    assert_eq!(order.products.len(), 2);

    let order = order_service::update_order(
        &state,
        &alice,
        order.id,
        place_request(vec![line(&tea, 3), line(&coffee, 1)]),
    )
    .await?;
    assert_eq!(order.total_price, 340);

    let foreign_update = order_service::update_order(
        &state,
        &bob,
        order.id,
        place_request(vec![line(&tea, 1)]),
    )
    .await;
    assert!(matches!(foreign_update, Err(AppError::NotFound(_))));

    // Status machine
    let confirmed = order_service::transition(&state, &staff1, order.id, Transition::Confirm).await?;
    assert_eq!(confirmed.status, OrderStatus::Transaction);
    assert_eq!(confirmed.employee_id, Some(staff1.user_id));

    let second = order_service::transition(&state, &staff2, order.id, Transition::Confirm).await;
    assert!(matches!(second, Err(AppError::InvalidState(_))));

    let editable = order_service::update_order(
        &state,
        &alice,
        order.id,
        place_request(vec![line(&tea, 1)]),
    )
    .await;
    assert!(matches!(editable, Err(AppError::InvalidState(_))));

    let other_shipper = order_service::transition(&state, &staff2, order.id, Transition::Shipping).await;
    assert!(matches!(other_shipper, Err(AppError::Forbidden(_))));

    order_service::transition(&state, &staff1, order.id, Transition::Shipping).await?;
    let unpaid = order_service::transition(&state, &staff1, order.id, Transition::Complete).await;
    assert!(matches!(unpaid, Err(AppError::InvalidState(_))));

    order_service::transition(&state, &staff1, order.id, Transition::Payment).await?;
    let done = order_service::transition(&state, &staff1, order.id, Transition::Complete).await?;
    assert_eq!(done.status, OrderStatus::Complete);
    assert_eq!(done.employee_id, Some(staff1.user_id));
    assert!(done.payment_date.is_some());

    let cancelled = order_service::transition(&state, &admin, order.id, Transition::Cancel).await?;
    assert_eq!(cancelled.status, OrderStatus::Cancel);
    let twice = order_service::transition(&state, &admin, order.id, Transition::Cancel).await;
    assert!(matches!(twice, Err(AppError::InvalidState(_))));

    let missing = order_service::transition(&state, &staff1, Uuid::new_v4(), Transition::Confirm).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    // Delete guards
    let fresh = order_service::place_order(&state, &alice, place_request(vec![line(&coffee, 2)])).await?;
    assert_eq!(fresh.total_price, 80);

    let by_bob = order_service::delete_order(&state, &bob, fresh.id).await;
    assert!(matches!(by_bob, Err(AppError::Forbidden(_))));
    let processed = order_service::delete_order(&state, &alice, order.id).await;
    assert!(matches!(processed, Err(AppError::Forbidden(_))));
    let absent = order_service::delete_order(&state, &alice, Uuid::new_v4()).await;
    assert!(matches!(absent, Err(AppError::NotFound(_))));

    let hidden = order_service::get_order(&state, &bob, fresh.id).await;
    assert!(matches!(hidden, Err(AppError::NotFound(_))));
    order_service::get_order(&state, &staff2, fresh.id).await?;

    // Listings
    let (mine, meta) = order_service::list_customer_orders(&state, &alice, order_query(None)).await?;
    assert_eq!(meta.total_records, 2);
    assert_eq!(mine.items[0].id, fresh.id);

    let (cancelled_only, meta) =
        order_service::list_manager_orders(&state, order_query(Some(OrderStatus::Cancel))).await?;
    assert_eq!(meta.total_records, 1);
    assert_eq!(cancelled_only.items[0].products.len(), 2);

    order_service::delete_order(&state, &alice, fresh.id).await?;
    let gone = order_service::get_order(&state, &alice, fresh.id).await;
    assert!(matches!(gone, Err(AppError::NotFound(_))));

    // Two employees confirming at the same time: exactly one wins.
    let contested = order_service::place_order(&state, &alice, place_request(vec![line(&tea, 1)])).await?;
    let (by_staff1, by_staff2) = tokio::join!(
        order_service::transition(&state, &staff1, contested.id, Transition::Confirm),
        order_service::transition(&state, &staff2, contested.id, Transition::Confirm),
    );
    let winner = match (&by_staff1, &by_staff2) {
        (Ok(order), Err(AppError::InvalidState(_))) => {
            assert_eq!(order.employee_id, Some(staff1.user_id));
            staff1.user_id
        }
        (Err(AppError::InvalidState(_)), Ok(order)) => {
            assert_eq!(order.employee_id, Some(staff2.user_id));
            staff2.user_id
        }
        other => panic!("expected exactly one confirm to succeed, got {other:?}"),
    };
    let stored = order_service::get_order(&state, &admin, contested.id).await?;
    assert_eq!(stored.status, OrderStatus::Transaction);
    assert_eq!(stored.employee_id, Some(winner));

    // Deleted products cannot be ordered.
    product_service::soft_delete_product(&state, &admin, coffee.id).await?;
    let stale = order_service::place_order(&state, &alice, place_request(vec![line(&coffee, 1)])).await;
    assert!(matches!(stale, Err(AppError::Validation(_))));
    product_service::restore_product(&state, &admin, coffee.id).await?;

    // Sessions: last issued wins, logout revokes.
    let first = login(&state, "0912345678").await?;
    let latest = login(&state, "0912345678").await?;
    assert_ne!(first.refresh_token, latest.refresh_token);
    let stale_refresh =
        auth_service::refresh_access_token(&state, PrincipalKind::Customer, &first.refresh_token).await;
    assert!(matches!(stale_refresh, Err(AppError::TokenMismatch)));
    auth_service::refresh_access_token(&state, PrincipalKind::Customer, &latest.refresh_token).await?;

    auth_service::logout(&state, PrincipalKind::Customer, &latest.refresh_token).await?;
    let after_logout =
        auth_service::refresh_access_token(&state, PrincipalKind::Customer, &latest.refresh_token).await;
    assert!(matches!(after_logout, Err(AppError::TokenMismatch)));

    // Employee soft delete and restore.
    let own = employee_service::soft_delete_employee(&state, &admin, admin.user_id).await;
    assert!(matches!(own, Err(AppError::Validation(_))));
    employee_service::soft_delete_employee(&state, &admin, staff2.user_id).await?;
    let restored = employee_service::restore_employee(&state, &admin, staff2.user_id).await?;
    assert!(restored.deleted_at.is_none());

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url, 5).await?;
    run_migrations(&pool).await?;
    let state = AppState::new(
        pool,
        TokenService::new(&TokenConfig {
            access_secret: "flow-access".into(),
            refresh_secret: "flow-refresh".into(),
            access_ttl_minutes: 15,
            refresh_ttl_minutes: 60,
        }),
    );

    // Clean tables for a deterministic run.
    state
        .orm
        .execute(Statement::from_string(
            state.orm.get_database_backend(),
            "TRUNCATE order_items, orders, products, product_categories, customers, employees, audit_logs RESTART IDENTITY CASCADE",
        ))
        .await?;

    Ok(state)
}

async fn register_employee(
    state: &AppState,
    admin: &AuthUser,
    email: &str,
    role: EmployeeRole,
) -> Result<AuthUser, AppError> {
    let registered = employee_service::register_employee(
        state,
        admin,
        RegisterEmployeeRequest {
            username: email.split('@').next().unwrap_or(email).into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
            email: email.into(),
            phone_number: "0987654321".into(),
            address: "Head office".into(),
            image: None,
            role: Some(role),
        },
    )
    .await?;
    Ok(AuthUser {
        user_id: registered.employee.id,
        role: Role::from(role),
    })
}

async fn register_customer(state: &AppState, phone: &str) -> Result<AuthUser, AppError> {
    let customer = auth_service::register_customer(
        state,
        RegisterCustomerRequest {
            username: "customer".into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
            phone_number: phone.into(),
            address: "1 Le Loi".into(),
        },
    )
    .await?;
    Ok(AuthUser {
        user_id: customer.id,
        role: Role::Customer,
    })
}

async fn login(
    state: &AppState,
    phone: &str,
) -> Result<storefront_api::dto::auth::TokenPair, AppError> {
    auth_service::login_customer(
        state,
        CustomerLoginRequest {
            phone_number: phone.into(),
            password: "secret1".into(),
        },
    )
    .await
}

async fn create_product(
    state: &AppState,
    admin: &AuthUser,
    name: &str,
    price: i64,
    price_discount: Option<i64>,
    category_id: Uuid,
) -> Result<Product, AppError> {
    product_service::create_product(
        state,
        admin,
        CreateProductRequest {
            name: name.into(),
            price,
            price_discount,
            image: None,
            status: None,
            category_id,
        },
    )
    .await
}

fn line(product: &Product, quantity: i32) -> LineItemRequest {
    LineItemRequest {
        product_id: product.id,
        name: product.name.clone(),
        quantity,
        price: product.price,
        price_discount: product.price_discount,
    }
}

fn place_request(products: Vec<LineItemRequest>) -> PlaceOrderRequest {
    PlaceOrderRequest {
        comments: Some("leave at the door".into()),
        coupon_id: None,
        products,
    }
}

fn order_query(status: Option<OrderStatus>) -> OrderListQuery {
    OrderListQuery {
        status,
        ..Default::default()
    }
}
