use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch},
};
use uuid::Uuid;

use crate::{
    dto::products::{CreateProductRequest, ProductList, UpdateProductRequest},
    error::{AppError, AppResult},
    extract::{AppJson, AppPath, AppQuery},
    middleware::auth::{AdminOnly, Require, StaffOnly},
    models::Product,
    response::ApiResponse,
    routes::params::ProductQuery,
    services::product_service,
    state::AppState,
};

/// `/{id}` carries a slug for reads and a uuid for writes; axum allows one
/// parameter name per segment.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/deleted", get(list_deleted))
        .route(
            "/{id}",
            get(get_by_slug).put(update_product).delete(delete_product),
        )
        .route("/{id}/edit", get(get_for_edit))
        .route("/{id}/restore", patch(restore_product))
}

fn parse_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound("Product"))
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(ProductQuery),
    responses(
        (status = 200, description = "Products", body = ApiResponse<ProductList>)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ProductQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let (list, meta) = product_service::list_products(&state, query, false).await?;
    Ok(Json(ApiResponse::page(list, meta)))
}

#[utoipa::path(
    get,
    path = "/api/products/deleted",
    params(ProductQuery),
    responses(
        (status = 200, description = "Soft-deleted products", body = ApiResponse<ProductList>),
        (status = 403, description = "Not an employee")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn list_deleted(
    State(state): State<AppState>,
    _auth: Require<StaffOnly>,
    AppQuery(query): AppQuery<ProductQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let (list, meta) = product_service::list_products(&state, query, true).await?;
    Ok(Json(ApiResponse::page(list, meta)))
}

#[utoipa::path(
    get,
    path = "/api/products/{slug}",
    params(("slug" = String, Path, description = "Product slug")),
    responses(
        (status = 200, description = "Product", body = ApiResponse<Product>),
        (status = 404, description = "Product not found")
    ),
    tag = "Products"
)]
pub async fn get_by_slug(
    State(state): State<AppState>,
    AppPath(slug): AppPath<String>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let product = product_service::get_by_slug(&state, &slug).await?;
    Ok(Json(ApiResponse::success("Product", product)))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}/edit",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product", body = ApiResponse<Product>),
        (status = 404, description = "Product not found")
    ),
    tag = "Products"
)]
pub async fn get_for_edit(
    State(state): State<AppState>,
    AppPath(id): AppPath<String>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let product = product_service::get_product(&state, parse_id(&id)?).await?;
    Ok(Json(ApiResponse::success("Product", product)))
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ApiResponse<Product>),
        (status = 400, description = "Invalid input or duplicate slug"),
        (status = 403, description = "Not an admin")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    auth: Require<AdminOnly>,
    AppJson(payload): AppJson<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Product>>)> {
    let product = product_service::create_product(&state, &auth.user, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Create successfully", product)),
    ))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ApiResponse<Product>),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    auth: Require<AdminOnly>,
    AppPath(id): AppPath<String>,
    AppJson(payload): AppJson<UpdateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let product =
        product_service::update_product(&state, &auth.user, parse_id(&id)?, payload).await?;
    Ok(Json(ApiResponse::success("Update successfully", product)))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product soft-deleted"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    auth: Require<AdminOnly>,
    AppPath(id): AppPath<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    product_service::soft_delete_product(&state, &auth.user, parse_id(&id)?).await?;
    Ok(Json(ApiResponse::message("Delete successfully")))
}

#[utoipa::path(
    patch,
    path = "/api/products/{id}/restore",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product restored", body = ApiResponse<Product>),
        (status = 404, description = "No deleted product with this id")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn restore_product(
    State(state): State<AppState>,
    auth: Require<AdminOnly>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let product = product_service::restore_product(&state, &auth.user, id).await?;
    Ok(Json(ApiResponse::success("Restore successfully", product)))
}
