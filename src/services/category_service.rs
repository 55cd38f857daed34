use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit,
    dto::categories::{CategoryList, CategoryRequest},
    entity::product_categories::{ActiveModel, Column, Entity as ProductCategories},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::ProductCategory,
    state::AppState,
};

pub async fn list_categories(state: &AppState) -> AppResult<CategoryList> {
    let items = ProductCategories::find()
        .order_by_asc(Column::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(ProductCategory::from)
        .collect();
    Ok(CategoryList { items })
}

pub async fn get_category(state: &AppState, id: Uuid) -> AppResult<ProductCategory> {
    ProductCategories::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(ProductCategory::from)
        .ok_or(AppError::NotFound("Product category"))
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CategoryRequest,
) -> AppResult<ProductCategory> {
    payload.validate()?;
    let category = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        image: Set(payload.image),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        Some(user),
        "category_create",
        "product_categories",
        serde_json::json!({ "category_id": category.id }),
    )
    .await;
    Ok(category.into())
}

pub async fn update_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: CategoryRequest,
) -> AppResult<ProductCategory> {
    payload.validate()?;
    let existing = ProductCategories::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("Product category"))?;

    let mut active: ActiveModel = existing.into();
    active.name = Set(payload.name);
    active.image = Set(payload.image);
    let category = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user),
        "category_update",
        "product_categories",
        serde_json::json!({ "category_id": category.id }),
    )
    .await;
    Ok(category.into())
}

/// Hard delete; products of the category keep a null category.
pub async fn delete_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ProductCategory> {
    let existing = ProductCategories::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("Product category"))?;

    let result = ProductCategories::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Product category"));
    }

    audit::record(
        &state.pool,
        Some(user),
        "category_delete",
        "product_categories",
        serde_json::json!({ "category_id": id }),
    )
    .await;
    Ok(existing.into())
}
