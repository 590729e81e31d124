use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, FromQueryResult,
    JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::cart::{AddToCartRequest, CartItemDto, CartList},
    entity::{
        cart_items::{self, ActiveModel as CartActive, Column as CartCol, Entity as CartItems},
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::CartItem,
    pricing::{Cart, CartLine},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// A cart line joined with the product it points at.
#[derive(Debug, FromQueryResult)]
pub struct CartProductRow {
    pub product_id: Uuid,
    pub quantity: i32,
    pub name: String,
    pub category: String,
    pub unit: String,
    pub price: Decimal,
    pub stock: i32,
}

impl CartProductRow {
    pub fn to_line(&self) -> CartLine {
        CartLine {
            product_id: self.product_id,
            category: self.category.clone(),
            quantity: self.quantity,
            price_per_unit: self.price,
            unit: self.unit.clone(),
        }
    }
}

/// Loads the user's cart lines, oldest first. `for_update` locks the cart
/// and product rows until the surrounding transaction ends.
pub async fn load_cart_rows<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    for_update: bool,
) -> AppResult<Vec<CartProductRow>> {
    let mut query = CartItems::find()
        .select_only()
        .column(CartCol::ProductId)
        .column(CartCol::Quantity)
        .column(ProdCol::Name)
        .column(ProdCol::Category)
        .column(ProdCol::Unit)
        .column(ProdCol::Price)
        .column(ProdCol::Stock)
        .join(JoinType::InnerJoin, cart_items::Relation::Products.def())
        .filter(CartCol::UserId.eq(user_id))
        .order_by_asc(CartCol::CreatedAt);

    if for_update {
        query = query.lock(LockType::Update);
    }

    let rows = query.into_model::<CartProductRow>().all(conn).await?;
    Ok(rows)
}

pub fn cart_from_rows(rows: &[CartProductRow]) -> Cart {
    Cart::new(rows.iter().map(CartProductRow::to_line).collect())
}

pub async fn load_cart<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> AppResult<Cart> {
    let rows = load_cart_rows(conn, user_id, false).await?;
    Ok(cart_from_rows(&rows))
}

pub async fn list_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartList>> {
    let rows = load_cart_rows(&state.orm, user.user_id, false).await?;
    let cart = cart_from_rows(&rows);

    let items = rows
        .into_iter()
        .map(|row| CartItemDto {
            line_total: row.to_line().line_total(),
            product_id: row.product_id,
            name: row.name,
            category: row.category,
            unit: row.unit,
            price: row.price,
            quantity: row.quantity,
        })
        .collect::<Vec<_>>();

    let total = items.len() as i64;
    let data = CartList {
        items,
        subtotal: cart.total(),
        total_items: cart.total_items(),
    };
    Ok(ApiResponse::success("OK", data, Some(Meta::new(1, total, total))))
}

pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartItem>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let product = Products::find_by_id(payload.product_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::BadRequest("product not found".to_string()))?;
    if product.stock < payload.quantity {
        return Err(AppError::BadRequest(format!(
            "only {} {} of {} in stock",
            product.stock, product.unit, product.name
        )));
    }

    let existing = CartItems::find()
        .filter(
            Condition::all()
                .add(CartCol::UserId.eq(user.user_id))
                .add(CartCol::ProductId.eq(payload.product_id)),
        )
        .one(&state.orm)
        .await?;

    let cart_item = match existing {
        Some(item) => {
            let mut active: CartActive = item.into();
            active.quantity = Set(payload.quantity);
            active.update(&state.orm).await?
        }
        None => {
            CartActive {
                id: Set(Uuid::new_v4()),
                user_id: Set(user.user_id),
                product_id: Set(payload.product_id),
                quantity: Set(payload.quantity),
                created_at: NotSet,
            }
            .insert(&state.orm)
            .await?
        }
    };

    audit::record(
        &state.pool,
        Some(user.user_id),
        "cart_update",
        "cart_items",
        serde_json::json!({ "product_id": payload.product_id, "quantity": payload.quantity }),
    )
    .await;

    Ok(ApiResponse::success("OK", CartItem::from(cart_item), None))
}

pub async fn remove_from_cart(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<CartList>> {
    let result = CartItems::delete_many()
        .filter(CartCol::ProductId.eq(product_id))
        .filter(CartCol::UserId.eq(user.user_id))
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "cart_remove",
        "cart_items",
        serde_json::json!({ "product_id": product_id }),
    )
    .await;

    let mut resp = list_cart(state, user).await?;
    resp.message = "Removed from cart".into();
    Ok(resp)
}
