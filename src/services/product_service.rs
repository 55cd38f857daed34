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
    dto::products::{CreateProductRequest, ProductList, UpdateProductRequest},
    entity::{
        product_categories::Entity as ProductCategories,
        products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Product,
    response::Meta,
    routes::params::ProductQuery,
    slug::slugify,
    state::AppState,
};

/// Lists live products, or soft-deleted ones when `deleted` is set.
pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
    deleted: bool,
) -> AppResult<(ProductList, Meta)> {
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all().add(if deleted {
        Column::DeletedAt.is_not_null()
    } else {
        Column::DeletedAt.is_null()
    });
    if let Some(search) = query.name_like.as_ref().filter(|s| !s.trim().is_empty()) {
        condition = condition.add(Expr::cust_with_values(
            "to_tsvector('simple', products.name) @@ plainto_tsquery('simple', $1)",
            [search.trim()],
        ));
    }
    if let Some(category_id) = query.category_id {
        condition = condition.add(Column::CategoryId.eq(category_id));
    }

    let finder = Products::find()
        .filter(condition)
        .order_by_desc(Column::CreatedAt);
    let total = finder.clone().count(&state.orm).await?;

    let items = finder
        .limit(limit)
        .offset(offset)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    Ok((ProductList { items }, Meta::new(page, limit, total)))
}

pub async fn get_by_slug(state: &AppState, slug: &str) -> AppResult<Product> {
    Products::find()
        .filter(Column::Slug.eq(slug))
        .filter(Column::DeletedAt.is_null())
        .one(&state.orm)
        .await?
        .map(Product::from)
        .ok_or(AppError::NotFound("Product"))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<Product> {
    find_live(state, id).await.map(Product::from)
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<Product> {
    payload.validate()?;
    check_prices(payload.price, payload.price_discount)?;
    ensure_category(state, payload.category_id).await?;
    let slug = slug_for(&payload.name)?;

    let product = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name.trim().to_string()),
        slug: Set(slug),
        price: Set(payload.price),
        price_discount: Set(payload.price_discount),
        image: Set(payload.image.filter(|i| !i.is_empty())),
        status: Set(payload.status),
        category_id: Set(Some(payload.category_id)),
        created_at: NotSet,
        updated_at: NotSet,
        deleted_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        Some(user),
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;
    Ok(product.into())
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<Product> {
    payload.validate()?;
    let existing = find_live(state, id).await?;

    let name = payload.name.unwrap_or_else(|| existing.name.clone());
    let price = payload.price.unwrap_or(existing.price);
    let price_discount = merge_discount(payload.price_discount, existing.price_discount);
    check_prices(price, price_discount)?;
    if let Some(category_id) = payload.category_id {
        ensure_category(state, category_id).await?;
    }

    let mut active: ActiveModel = existing.into();
    active.slug = Set(slug_for(&name)?);
    active.name = Set(name.trim().to_string());
    active.price = Set(price);
    active.price_discount = Set(price_discount);
    if let Some(image) = payload.image {
        active.image = Set(Some(image).filter(|i| !i.is_empty()));
    }
    if let Some(status) = payload.status {
        active.status = Set(Some(status));
    }
    if let Some(category_id) = payload.category_id {
        active.category_id = Set(Some(category_id));
    }
    active.updated_at = Set(Utc::now().into());
    let product = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user),
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;
    Ok(product.into())
}

pub async fn soft_delete_product(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<()> {
    let result = Products::update_many()
        .col_expr(Column::DeletedAt, Expr::current_timestamp().into())
        .filter(Column::Id.eq(id))
        .filter(Column::DeletedAt.is_null())
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Product"));
    }

    audit::record(
        &state.pool,
        Some(user),
        "product_delete",
        "products",
        serde_json::json!({ "product_id": id }),
    )
    .await;
    Ok(())
}

pub async fn restore_product(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<Product> {
    let product = Products::update_many()
        .col_expr(Column::DeletedAt, Expr::value(Option::<chrono::DateTime<Utc>>::None))
        .col_expr(Column::UpdatedAt, Expr::current_timestamp().into())
        .filter(Column::Id.eq(id))
        .filter(Column::DeletedAt.is_not_null())
        .exec_with_returning(&state.orm)
        .await?
        .into_iter()
        .next()
        .ok_or(AppError::NotFound("Product"))?;

    audit::record(
        &state.pool,
        Some(user),
        "product_restore",
        "products",
        serde_json::json!({ "product_id": id }),
    )
    .await;
    Ok(product.into())
}

async fn find_live(state: &AppState, id: Uuid) -> AppResult<ProductModel> {
    Products::find_by_id(id)
        .filter(Column::DeletedAt.is_null())
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("Product"))
}

async fn ensure_category(state: &AppState, category_id: Uuid) -> AppResult<()> {
    ProductCategories::find_by_id(category_id)
        .one(&state.orm)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::Validation("Unknown product category".into()))
}

fn check_prices(price: i64, price_discount: Option<i64>) -> AppResult<()> {
    if price <= 0 {
        return Err(AppError::Validation("Invalid product price".into()));
    }
    if price_discount.is_some_and(|discount| discount < 0 || discount > price) {
        return Err(AppError::Validation(
            "Discounted price must be between 0 and the price".into(),
        ));
    }
    Ok(())
}

/// An explicit `0` clears the discount; an absent field keeps the stored one.
fn merge_discount(requested: Option<i64>, existing: Option<i64>) -> Option<i64> {
    match requested {
        Some(0) => None,
        Some(discount) => Some(discount),
        None => existing,
    }
}

fn slug_for(name: &str) -> AppResult<String> {
    let slug = slugify(name);
    if slug.is_empty() {
        return Err(AppError::Validation(
            "name must contain letters or digits".into(),
        ));
    }
    Ok(slug)
}
