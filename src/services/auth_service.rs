use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, sea_query::Expr,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit,
    dto::auth::{
        AccessToken, CustomerLoginRequest, EmployeeLoginRequest, RegisterCustomerRequest,
        TokenPair,
    },
    entity::{
        customers::{self, ActiveModel as CustomerActive, Entity as Customers},
        employees::{self, Entity as Employees},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Customer, Employee, Role},
    services::password::{hash_password, verify_password},
    state::AppState,
};

/// Which credential table a token flow works against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrincipalKind {
    Customer,
    Employee,
}

impl PrincipalKind {
    pub fn admits(self, role: Role) -> bool {
        match self {
            PrincipalKind::Customer => role == Role::Customer,
            PrincipalKind::Employee => role.is_employee(),
        }
    }
}

pub async fn register_customer(
    state: &AppState,
    payload: RegisterCustomerRequest,
) -> AppResult<Customer> {
    payload.validate()?;
    let RegisterCustomerRequest {
        username,
        password,
        phone_number,
        address,
        ..
    } = payload;

    // Soft-deleted customers keep their phone number.
    let exist = Customers::find()
        .filter(customers::Column::PhoneNumber.eq(phone_number.as_str()))
        .one(&state.orm)
        .await?;
    if exist.is_some() {
        return Err(AppError::Conflict("Phone number is used".into()));
    }

    let password_hash = hash_password(password).await?;
    let customer = CustomerActive {
        id: Set(Uuid::new_v4()),
        username: Set(username),
        phone_number: Set(phone_number),
        password_hash: Set(password_hash),
        address: Set(address),
        image: Set(None),
        coin: Set(0),
        refresh_token: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
        deleted_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(customer_id = %customer.id, "customer registered");
    Ok(customer.into())
}

pub async fn login_customer(
    state: &AppState,
    payload: CustomerLoginRequest,
) -> AppResult<TokenPair> {
    payload
        .validate()
        .map_err(|_| AppError::Validation("Invalid password or phone number".into()))?;

    let customer = Customers::find()
        .filter(customers::Column::PhoneNumber.eq(payload.phone_number.as_str()))
        .filter(customers::Column::DeletedAt.is_null())
        .one(&state.orm)
        .await?
        .ok_or_else(incorrect_credentials)?;

    if !verify_password(payload.password, customer.password_hash).await? {
        return Err(incorrect_credentials());
    }

    let tokens = start_session(state, PrincipalKind::Customer, customer.id, Role::Customer).await?;
    let actor = AuthUser {
        user_id: customer.id,
        role: Role::Customer,
    };
    audit::record(
        &state.pool,
        Some(&actor),
        "customer_login",
        "customers",
        serde_json::json!({ "customer_id": customer.id }),
    )
    .await;
    Ok(tokens)
}

pub async fn login_employee(
    state: &AppState,
    payload: EmployeeLoginRequest,
) -> AppResult<TokenPair> {
    payload
        .validate()
        .map_err(|_| AppError::Validation("Invalid email or password".into()))?;

    let employee = Employees::find()
        .filter(employees::Column::Email.eq(payload.email.as_str()))
        .filter(employees::Column::DeletedAt.is_null())
        .one(&state.orm)
        .await?
        .ok_or_else(incorrect_credentials)?;

    if !verify_password(payload.password, employee.password_hash).await? {
        return Err(incorrect_credentials());
    }

    let role = Role::from(employee.role);
    let tokens = start_session(state, PrincipalKind::Employee, employee.id, role).await?;
    let actor = AuthUser {
        user_id: employee.id,
        role,
    };
    audit::record(
        &state.pool,
        Some(&actor),
        "employee_login",
        "employees",
        serde_json::json!({ "employee_id": employee.id }),
    )
    .await;
    Ok(tokens)
}

/// Issues a token pair and makes the refresh token the only valid one for the
/// principal (last issued wins).
async fn start_session(
    state: &AppState,
    kind: PrincipalKind,
    id: Uuid,
    role: Role,
) -> AppResult<TokenPair> {
    let access_token = state.tokens.issue_access_token(id, role)?;
    let refresh_token = state.tokens.issue_refresh_token(id, role)?;

    let now = Expr::current_timestamp();
    let stored = match kind {
        PrincipalKind::Customer => {
            Customers::update_many()
                .col_expr(customers::Column::RefreshToken, Expr::value(refresh_token.as_str()))
                .col_expr(customers::Column::UpdatedAt, now.into())
                .filter(customers::Column::Id.eq(id))
                .exec(&state.orm)
                .await?
        }
        PrincipalKind::Employee => {
            Employees::update_many()
                .col_expr(employees::Column::RefreshToken, Expr::value(refresh_token.as_str()))
                .col_expr(employees::Column::UpdatedAt, now.into())
                .filter(employees::Column::Id.eq(id))
                .exec(&state.orm)
                .await?
        }
    };
    if stored.rows_affected == 0 {
        return Err(AppError::NotFound(kind_label(kind)));
    }

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

/// Exchanges a refresh token for a new access token. The refresh token itself
/// is not rotated.
pub async fn refresh_access_token(
    state: &AppState,
    kind: PrincipalKind,
    refresh_token: &str,
) -> AppResult<AccessToken> {
    if refresh_token.is_empty() {
        return Err(AppError::Validation("Invalid refresh token".into()));
    }
    let claims = state.tokens.verify_refresh_token(refresh_token)?;
    if !kind.admits(claims.role) {
        return Err(AppError::InvalidToken);
    }
    let id = claims.principal_id()?;

    let role = match kind {
        PrincipalKind::Customer => Customers::find_by_id(id)
            .filter(customers::Column::RefreshToken.eq(refresh_token))
            .filter(customers::Column::DeletedAt.is_null())
            .one(&state.orm)
            .await?
            .map(|_| Role::Customer),
        PrincipalKind::Employee => Employees::find_by_id(id)
            .filter(employees::Column::RefreshToken.eq(refresh_token))
            .filter(employees::Column::DeletedAt.is_null())
            .one(&state.orm)
            .await?
            .map(|employee| Role::from(employee.role)),
    }
    .ok_or(AppError::TokenMismatch)?;

    Ok(AccessToken {
        access_token: state.tokens.issue_access_token(id, role)?,
    })
}

/// Clears the stored refresh token if it is still the presented one. The
/// signature is not checked; a stale or foreign token simply revokes nothing.
pub async fn logout(state: &AppState, kind: PrincipalKind, refresh_token: &str) -> AppResult<()> {
    let claims = state.tokens.decode_unverified(refresh_token)?;
    if !kind.admits(claims.role) {
        return Err(AppError::InvalidToken);
    }
    let id = claims.principal_id()?;

    let cleared = match kind {
        PrincipalKind::Customer => {
            Customers::update_many()
                .col_expr(customers::Column::RefreshToken, Expr::value(Option::<String>::None))
                .filter(customers::Column::Id.eq(id))
                .filter(customers::Column::RefreshToken.eq(refresh_token))
                .exec(&state.orm)
                .await?
        }
        PrincipalKind::Employee => {
            Employees::update_many()
                .col_expr(employees::Column::RefreshToken, Expr::value(Option::<String>::None))
                .filter(employees::Column::Id.eq(id))
                .filter(employees::Column::RefreshToken.eq(refresh_token))
                .exec(&state.orm)
                .await?
        }
    };
    tracing::debug!(principal = %id, revoked = cleared.rows_affected, "logout");
    Ok(())
}

pub async fn customer_profile(state: &AppState, user: &AuthUser) -> AppResult<Customer> {
    Customers::find_by_id(user.user_id)
        .filter(customers::Column::DeletedAt.is_null())
        .one(&state.orm)
        .await?
        .map(Customer::from)
        .ok_or(AppError::NotFound("Customer"))
}

pub async fn employee_profile(state: &AppState, user: &AuthUser) -> AppResult<Employee> {
    Employees::find_by_id(user.user_id)
        .filter(employees::Column::DeletedAt.is_null())
        .one(&state.orm)
        .await?
        .map(Employee::from)
        .ok_or(AppError::NotFound("Employee"))
}

fn incorrect_credentials() -> AppError {
    AppError::Validation("Incorrect credentials".into())
}

fn kind_label(kind: PrincipalKind) -> &'static str {
    match kind {
        PrincipalKind::Customer => "Customer",
        PrincipalKind::Employee => "Employee",
    }
}
