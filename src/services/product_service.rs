use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::dto::products::{CreateProductRequest, ProductList, UpdateProductRequest};
use crate::{
    audit,
    entity::products::{ActiveModel, Column, Entity as Products},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    state::AppState,
};

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern)),
        );
    }

    if let Some(category) = query.category.as_ref().filter(|c| !c.is_empty()) {
        condition = condition.add(Column::Category.eq(category.clone()));
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }

    let sort_by = query.sort_by.unwrap_or(ProductSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        ProductSortBy::CreatedAt => Column::CreatedAt,
        ProductSortBy::Price => Column::Price,
        ProductSortBy::Name => Column::Name,
    };

    let mut finder = Products::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    Ok(ApiResponse::paged(
        "Products",
        ProductList { items },
        page,
        limit,
        total,
    ))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Product", Product::from(product), None))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    let name = required_text("name", &payload.name)?;
    let category = required_text("category", &payload.category)?;
    let unit = required_text("unit", &payload.unit)?;
    check_price_and_stock(Some(payload.price), Some(payload.stock))?;

    let product = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        description: Set(payload.description),
        category: Set(category),
        unit: Set(unit),
        price: Set(payload.price),
        stock: Set(payload.stock),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product created",
        Product::from(product),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    check_price_and_stock(payload.price, payload.stock)?;

    let existing = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(required_text("name", &name)?);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(category) = payload.category {
        active.category = Set(required_text("category", &category)?);
    }
    if let Some(unit) = payload.unit {
        active.unit = Set(required_text("unit", &unit)?);
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(stock) = payload.stock {
        active.stock = Set(stock);
    }

    let product = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        Product::from(product),
        Some(Meta::empty()),
    ))
}

fn required_text(field: &str, value: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::BadRequest(format!("{field} is required")));
    }
    Ok(value.to_string())
}

fn check_price_and_stock(price: Option<Decimal>, stock: Option<i32>) -> AppResult<()> {
    if price.is_some_and(|p| p < Decimal::ZERO) {
        return Err(AppError::BadRequest("price cannot be negative".into()));
    }
    if stock.is_some_and(|s| s < 0) {
        return Err(AppError::BadRequest("stock cannot be negative".into()));
    }
    Ok(())
}
