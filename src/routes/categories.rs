use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::categories::{CategoryList, CategoryRequest},
    error::AppResult,
    extract::{AppJson, AppPath},
    middleware::auth::{AdminOnly, Require},
    models::ProductCategory,
    response::ApiResponse,
    services::category_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route(
            "/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
}

#[utoipa::path(
    get,
    path = "/api/product-category",
    responses(
        (status = 200, description = "All categories", body = ApiResponse<CategoryList>)
    ),
    tag = "Categories"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    let list = category_service::list_categories(&state).await?;
    Ok(Json(ApiResponse::success("Product categories", list)))
}

#[utoipa::path(
    get,
    path = "/api/product-category/{id}",
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category", body = ApiResponse<ProductCategory>),
        (status = 404, description = "Category not found")
    ),
    tag = "Categories"
)]
pub async fn get_category(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<ProductCategory>>> {
    let category = category_service::get_category(&state, id).await?;
    Ok(Json(ApiResponse::success("Product category", category)))
}

#[utoipa::path(
    post,
    path = "/api/product-category",
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Category created", body = ApiResponse<ProductCategory>),
        (status = 403, description = "Not an admin")
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn create_category(
    State(state): State<AppState>,
    auth: Require<AdminOnly>,
    AppJson(payload): AppJson<CategoryRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ProductCategory>>)> {
    let category = category_service::create_category(&state, &auth.user, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Create successfully", category)),
    ))
}

#[utoipa::path(
    put,
    path = "/api/product-category/{id}",
    params(("id" = Uuid, Path, description = "Category id")),
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = ApiResponse<ProductCategory>),
        (status = 404, description = "Category not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn update_category(
    State(state): State<AppState>,
    auth: Require<AdminOnly>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<CategoryRequest>,
) -> AppResult<Json<ApiResponse<ProductCategory>>> {
    let category = category_service::update_category(&state, &auth.user, id, payload).await?;
    Ok(Json(ApiResponse::success("Update successfully", category)))
}

#[utoipa::path(
    delete,
    path = "/api/product-category/{id}",
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category deleted", body = ApiResponse<ProductCategory>),
        (status = 404, description = "Category not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    auth: Require<AdminOnly>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<ProductCategory>>> {
    let category = category_service::delete_category(&state, &auth.user, id).await?;
    Ok(Json(ApiResponse::success("Delete successfully", category)))
}
