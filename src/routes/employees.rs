use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::{
        auth::{AccessToken, EmployeeLoginRequest, RefreshTokenRequest, TokenPair},
        employees::{EmployeeList, RegisterEmployeeRequest, RegisteredEmployee, UpdateEmployeeRequest},
    },
    error::AppResult,
    extract::{AppJson, AppPath, AppQuery},
    middleware::auth::{AdminOnly, Require, StaffOnly},
    models::Employee,
    response::ApiResponse,
    routes::params::EmployeeQuery,
    services::{
        auth_service::{self, PrincipalKind},
        employee_service,
    },
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_employees).put(update_profile))
        .route("/deleted", get(list_deleted))
        .route("/auth", get(profile))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/token", post(refresh_token))
        .route("/logout", post(logout))
        .route("/{id}", delete(delete_employee))
        .route("/{id}/restore", patch(restore_employee))
}

#[utoipa::path(
    get,
    path = "/api/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Active employees", body = ApiResponse<EmployeeList>),
        (status = 403, description = "Not an employee")
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn list_employees(
    State(state): State<AppState>,
    _auth: Require<StaffOnly>,
    AppQuery(query): AppQuery<EmployeeQuery>,
) -> AppResult<Json<ApiResponse<EmployeeList>>> {
    let (list, meta) = employee_service::list_employees(&state, query, false).await?;
    Ok(Json(ApiResponse::page(list, meta)))
}

#[utoipa::path(
    get,
    path = "/api/employees/deleted",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Soft-deleted employees", body = ApiResponse<EmployeeList>),
        (status = 403, description = "Not an admin")
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn list_deleted(
    State(state): State<AppState>,
    _auth: Require<AdminOnly>,
    AppQuery(query): AppQuery<EmployeeQuery>,
) -> AppResult<Json<ApiResponse<EmployeeList>>> {
    let (list, meta) = employee_service::list_employees(&state, query, true).await?;
    Ok(Json(ApiResponse::page(list, meta)))
}

#[utoipa::path(
    get,
    path = "/api/employees/auth",
    responses(
        (status = 200, description = "Authenticated employee", body = ApiResponse<Employee>),
        (status = 403, description = "Not an employee")
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn profile(
    State(state): State<AppState>,
    auth: Require<StaffOnly>,
) -> AppResult<Json<ApiResponse<Employee>>> {
    let employee = auth_service::employee_profile(&state, &auth.user).await?;
    Ok(Json(ApiResponse::success("Employee profile", employee)))
}

#[utoipa::path(
    post,
    path = "/api/employees/register",
    request_body = RegisterEmployeeRequest,
    responses(
        (status = 201, description = "Employee registered", body = ApiResponse<RegisteredEmployee>),
        (status = 400, description = "Invalid input or email already used"),
        (status = 403, description = "Not an admin")
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn register(
    State(state): State<AppState>,
    auth: Require<AdminOnly>,
    AppJson(payload): AppJson<RegisterEmployeeRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<RegisteredEmployee>>)> {
    let registered = employee_service::register_employee(&state, &auth.user, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Register successfully", registered)),
    ))
}

#[utoipa::path(
    post,
    path = "/api/employees/login",
    request_body = EmployeeLoginRequest,
    responses(
        (status = 200, description = "Token pair", body = ApiResponse<TokenPair>),
        (status = 400, description = "Incorrect credentials")
    ),
    tag = "Employees"
)]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<EmployeeLoginRequest>,
) -> AppResult<Json<ApiResponse<TokenPair>>> {
    let tokens = auth_service::login_employee(&state, payload).await?;
    Ok(Json(ApiResponse::success("Login successfully", tokens)))
}

#[utoipa::path(
    post,
    path = "/api/employees/token",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "New access token", body = ApiResponse<AccessToken>),
        (status = 400, description = "Refresh token is not the current one"),
        (status = 401, description = "Invalid refresh token")
    ),
    tag = "Employees"
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RefreshTokenRequest>,
) -> AppResult<Json<ApiResponse<AccessToken>>> {
    let token =
        auth_service::refresh_access_token(&state, PrincipalKind::Employee, &payload.refresh_token)
            .await?;
    Ok(Json(ApiResponse::success("Access token refreshed", token)))
}

#[utoipa::path(
    post,
    path = "/api/employees/logout",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "Logged out"),
        (status = 401, description = "Malformed token")
    ),
    tag = "Employees"
)]
pub async fn logout(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RefreshTokenRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    auth_service::logout(&state, PrincipalKind::Employee, &payload.refresh_token).await?;
    Ok(Json(ApiResponse::message("Logout successfully")))
}

#[utoipa::path(
    put,
    path = "/api/employees",
    request_body = UpdateEmployeeRequest,
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse<Employee>),
        (status = 400, description = "Invalid input")
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    auth: Require<StaffOnly>,
    AppJson(payload): AppJson<UpdateEmployeeRequest>,
) -> AppResult<Json<ApiResponse<Employee>>> {
    let employee = employee_service::update_profile(&state, &auth.user, payload).await?;
    Ok(Json(ApiResponse::success("Update successfully", employee)))
}

#[utoipa::path(
    delete,
    path = "/api/employees/{id}",
    params(("id" = Uuid, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Employee soft-deleted"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn delete_employee(
    State(state): State<AppState>,
    auth: Require<AdminOnly>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    employee_service::soft_delete_employee(&state, &auth.user, id).await?;
    Ok(Json(ApiResponse::message("Delete successfully")))
}

#[utoipa::path(
    patch,
    path = "/api/employees/{id}/restore",
    params(("id" = Uuid, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Employee restored", body = ApiResponse<Employee>),
        (status = 404, description = "No deleted employee with this id")
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn restore_employee(
    State(state): State<AppState>,
    auth: Require<AdminOnly>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<Employee>>> {
    let employee = employee_service::restore_employee(&state, &auth.user, id).await?;
    Ok(Json(ApiResponse::success("Restore successfully", employee)))
}
