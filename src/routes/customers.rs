use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use crate::{
    dto::auth::{AccessToken, CustomerLoginRequest, RefreshTokenRequest, RegisterCustomerRequest, TokenPair},
    error::AppResult,
    extract::AppJson,
    middleware::auth::{CustomerOnly, Require},
    models::Customer,
    response::ApiResponse,
    services::auth_service::{self, PrincipalKind},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/token", post(refresh_token))
        .route("/logout", post(logout))
        .route("/profile", get(profile))
}

#[utoipa::path(
    post,
    path = "/api/customers/register",
    request_body = RegisterCustomerRequest,
    responses(
        (status = 201, description = "Customer registered", body = ApiResponse<Customer>),
        (status = 400, description = "Invalid input or phone number already used")
    ),
    tag = "Customers"
)]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterCustomerRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Customer>>)> {
    let customer = auth_service::register_customer(&state, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Register successfully", customer)),
    ))
}

#[utoipa::path(
    post,
    path = "/api/customers/login",
    request_body = CustomerLoginRequest,
    responses(
        (status = 200, description = "Token pair", body = ApiResponse<TokenPair>),
        (status = 400, description = "Incorrect credentials")
    ),
    tag = "Customers"
)]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CustomerLoginRequest>,
) -> AppResult<Json<ApiResponse<TokenPair>>> {
    let tokens = auth_service::login_customer(&state, payload).await?;
    Ok(Json(ApiResponse::success("Login successfully", tokens)))
}

#[utoipa::path(
    post,
    path = "/api/customers/token",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "New access token", body = ApiResponse<AccessToken>),
        (status = 400, description = "Refresh token is not the current one"),
        (status = 401, description = "Invalid refresh token")
    ),
    tag = "Customers"
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RefreshTokenRequest>,
) -> AppResult<Json<ApiResponse<AccessToken>>> {
    let token =
        auth_service::refresh_access_token(&state, PrincipalKind::Customer, &payload.refresh_token)
            .await?;
    Ok(Json(ApiResponse::success("Access token refreshed", token)))
}

#[utoipa::path(
    post,
    path = "/api/customers/logout",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "Logged out"),
        (status = 401, description = "Malformed token")
    ),
    tag = "Customers"
)]
pub async fn logout(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RefreshTokenRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    auth_service::logout(&state, PrincipalKind::Customer, &payload.refresh_token).await?;
    Ok(Json(ApiResponse::message("Logout successfully")))
}

#[utoipa::path(
    get,
    path = "/api/customers/profile",
    responses(
        (status = 200, description = "Authenticated customer", body = ApiResponse<Customer>),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Not a customer")
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn profile(
    State(state): State<AppState>,
    auth: Require<CustomerOnly>,
) -> AppResult<Json<ApiResponse<Customer>>> {
    let customer = auth_service::customer_profile(&state, &auth.user).await?;
    Ok(Json(ApiResponse::success("Customer profile", customer)))
}
