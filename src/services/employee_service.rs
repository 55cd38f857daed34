use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, sea_query::Expr,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit,
    dto::employees::{EmployeeList, RegisterEmployeeRequest, RegisteredEmployee, UpdateEmployeeRequest},
    entity::employees::{
        ActiveModel as EmployeeActive, Column, EmployeeRole, Entity as Employees,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Employee, Role},
    response::Meta,
    routes::params::EmployeeQuery,
    services::password::hash_password,
    state::AppState,
};

/// Lists active employees, or soft-deleted ones when `deleted` is set.
pub async fn list_employees(
    state: &AppState,
    query: EmployeeQuery,
    deleted: bool,
) -> AppResult<(EmployeeList, Meta)> {
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all().add(if deleted {
        Column::DeletedAt.is_not_null()
    } else {
        Column::DeletedAt.is_null()
    });
    if let Some(search) = query.name_like.as_ref().filter(|s| !s.trim().is_empty()) {
        condition = condition.add(Expr::cust_with_values(
            "to_tsvector('simple', employees.username) @@ plainto_tsquery('simple', $1)",
            [search.trim()],
        ));
    }

    let finder = Employees::find()
        .filter(condition)
        .order_by_desc(Column::CreatedAt);
    let total = finder.clone().count(&state.orm).await?;

    let items = finder
        .limit(limit)
        .offset(offset)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Employee::from)
        .collect();

    Ok((EmployeeList { items }, Meta::new(page, limit, total)))
}

pub async fn register_employee(
    state: &AppState,
    admin: &AuthUser,
    payload: RegisterEmployeeRequest,
) -> AppResult<RegisteredEmployee> {
    payload.validate()?;

    let exist = Employees::find()
        .filter(Column::Email.eq(payload.email.as_str()))
        .one(&state.orm)
        .await?;
    if exist.is_some() {
        return Err(AppError::Conflict("Email already used".into()));
    }

    let password_hash = hash_password(payload.password).await?;
    let employee = EmployeeActive {
        id: Set(Uuid::new_v4()),
        username: Set(payload.username),
        email: Set(payload.email),
        phone_number: Set(payload.phone_number),
        password_hash: Set(password_hash),
        address: Set(payload.address),
        image: Set(payload.image.filter(|i| !i.is_empty())),
        role: Set(payload.role.unwrap_or(EmployeeRole::Staff)),
        refresh_token: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
        deleted_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let access_token = state
        .tokens
        .issue_access_token(employee.id, Role::from(employee.role))?;

    audit::record(
        &state.pool,
        Some(admin),
        "employee_register",
        "employees",
        serde_json::json!({ "employee_id": employee.id, "role": Role::from(employee.role) }),
    )
    .await;

    Ok(RegisteredEmployee {
        employee: employee.into(),
        access_token,
    })
}

/// Employees edit their own profile only.
pub async fn update_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateEmployeeRequest,
) -> AppResult<Employee> {
    payload.validate()?;

    let existing = Employees::find_by_id(user.user_id)
        .filter(Column::DeletedAt.is_null())
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("Employee"))?;

    let mut active: EmployeeActive = existing.into();
    active.username = Set(payload.username);
    active.email = Set(payload.email);
    active.phone_number = Set(payload.phone_number);
    active.address = Set(payload.address);
    active.image = Set(payload.image.filter(|i| !i.is_empty()));
    active.updated_at = Set(Utc::now().into());
    let employee = active.update(&state.orm).await?;

    Ok(employee.into())
}

pub async fn soft_delete_employee(state: &AppState, admin: &AuthUser, id: Uuid) -> AppResult<()> {
    if admin.user_id == id {
        return Err(AppError::Validation("You cannot delete your own account".into()));
    }

    let result = Employees::update_many()
        .col_expr(Column::DeletedAt, Expr::current_timestamp().into())
        .col_expr(Column::RefreshToken, Expr::value(Option::<String>::None))
        .filter(Column::Id.eq(id))
        .filter(Column::DeletedAt.is_null())
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Employee"));
    }

    audit::record(
        &state.pool,
        Some(admin),
        "employee_delete",
        "employees",
        serde_json::json!({ "employee_id": id }),
    )
    .await;
    Ok(())
}

pub async fn restore_employee(state: &AppState, admin: &AuthUser, id: Uuid) -> AppResult<Employee> {
    let restored = Employees::update_many()
        .col_expr(Column::DeletedAt, Expr::value(Option::<chrono::DateTime<Utc>>::None))
        .col_expr(Column::UpdatedAt, Expr::current_timestamp().into())
        .filter(Column::Id.eq(id))
        .filter(Column::DeletedAt.is_not_null())
        .exec_with_returning(&state.orm)
        .await?
        .into_iter()
        .next()
        .ok_or(AppError::NotFound("Employee"))?;

    audit::record(
        &state.pool,
        Some(admin),
        "employee_restore",
        "employees",
        serde_json::json!({ "employee_id": id }),
    )
    .await;
    Ok(restored.into())
}
