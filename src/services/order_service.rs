use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::orders::{CheckoutRequest, CheckoutResponse, OrderList, OrderWithItems},
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Order, OrderItem},
    pricing::{Rejection, Voucher, round_money, voucher},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::{cart_service, shipping_service, voucher_service},
    state::AppState,
};

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all().add(OrderCol::UserId.eq(user.user_id));
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(OrderCol::Status.eq(status.clone()));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);

    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    Ok(ApiResponse::paged(
        "Ok",
        OrderList { items: orders },
        page,
        limit,
        total,
    ))
}

/// Prices the cart, applies at most one voucher and turns the cart into an
/// order, all in one transaction.
pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<CheckoutResponse>> {
    let payment_method = payload.payment_method.trim().to_string();
    if payment_method.is_empty() {
        return Err(AppError::BadRequest("payment_method is required".into()));
    }
    let destination = shipping_service::destination_from(payload.latitude, payload.longitude)?;

    let txn = state.orm.begin().await?;

    let rows = cart_service::load_cart_rows(&txn, user.user_id, true).await?;
    if rows.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }
    for row in &rows {
        if row.quantity <= 0 {
            return Err(AppError::BadRequest("Cart has invalid quantity".into()));
        }
        if row.stock < row.quantity {
            return Err(AppError::BadRequest(format!(
                "Insufficient stock for {}",
                row.name
            )));
        }
    }

    let cart = cart_service::cart_from_rows(&rows);
    let subtotal = cart.total();
    let quote = shipping_service::quote_for(state, destination, &cart);
    let now = Utc::now();

    let mut applied: Option<(Voucher, Decimal)> = None;
    let mut voucher_message = None;
    if let Some(raw_code) = payload.voucher_code.as_deref().filter(|c| !c.trim().is_empty()) {
        match voucher_service::evaluate(&txn, raw_code, &cart, now).await? {
            Ok(accepted) => {
                if voucher_service::apply_usage(&txn, accepted.id, now).await? {
                    let discount = voucher::calculate_discount(&accepted, subtotal);
                    voucher_message = Some("Voucher applied".to_string());
                    applied = Some((accepted, discount));
                } else {
                    tracing::warn!(code = %accepted.code, "voucher use lost to a concurrent checkout");
                    voucher_message = Some(Rejection::ExpiredOrExhausted.to_string());
                }
            }
            Err(rejection) => {
                tracing::info!(code = %raw_code, reason = %rejection, "voucher rejected at checkout");
                voucher_message = Some(rejection.to_string());
            }
        }
    }

    let discount = applied.as_ref().map_or(Decimal::ZERO, |(_, d)| *d);
    let total_before = round_money(subtotal + quote.shipping_fee);
    let total_amount = round_money((subtotal - discount).max(Decimal::ZERO) + quote.shipping_fee);

    let order_id = Uuid::new_v4();
    let order = OrderActive {
        id: Set(order_id),
        user_id: Set(user.user_id),
        subtotal: Set(subtotal),
        discount_amount: Set(discount),
        shipping_fee: Set(quote.shipping_fee),
        total_amount: Set(total_amount),
        voucher_id: Set(applied.as_ref().map(|(v, _)| v.id)),
        voucher_code: Set(applied.as_ref().map(|(v, _)| v.code.clone())),
        shipping_address: Set(payload.address.map(|a| a.trim().to_string()).filter(|a| !a.is_empty())),
        distance_km: Set(destination.map(|_| quote.distance_km)),
        payment_method: Set(payment_method),
        status: Set("pending".into()),
        invoice_number: Set(build_invoice_number(order_id)),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut order_items: Vec<OrderItem> = Vec::with_capacity(rows.len());
    for row in &rows {
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(row.product_id),
            product_name: Set(row.name.clone()),
            category: Set(row.category.clone()),
            unit: Set(row.unit.clone()),
            quantity: Set(row.quantity),
            price: Set(row.price),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;

        order_items.push(OrderItem::from(item));

        // reduce stock
        Products::update_many()
            .col_expr(ProdCol::Stock, Expr::col(ProdCol::Stock).sub(row.quantity))
            .filter(ProdCol::Id.eq(row.product_id))
            .exec(&txn)
            .await?;
    }

    if let Some((voucher, discount)) = &applied {
        voucher_service::record_usage(
            &txn,
            voucher.id,
            order.id,
            user.user_id,
            *discount,
            total_before,
            order.total_amount,
        )
        .await?;
    }

    // clear cart
    CartItems::delete_many()
        .filter(CartCol::UserId.eq(user.user_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    tracing::info!(
        order_id = %order.id,
        subtotal = %order.subtotal,
        discount = %order.discount_amount,
        shipping_fee = %order.shipping_fee,
        total = %order.total_amount,
        "checkout completed"
    );
    audit::record(
        &state.pool,
        Some(user.user_id),
        "checkout",
        "orders",
        serde_json::json!({
            "order_id": order.id,
            "voucher_code": order.voucher_code,
            "total_amount": order.total_amount,
        }),
    )
    .await;

    Ok(ApiResponse::success(
        "Checkout success",
        CheckoutResponse {
            order: Order::from(order),
            items: order_items,
            is_free_shipping: quote.is_free_shipping,
            voucher_message,
        },
        Some(Meta::empty()),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(OrderItem::from)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        OrderWithItems {
            order: Order::from(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

fn build_invoice_number(order_id: Uuid) -> String {
    let date = Utc::now().format("%Y%m%d");
    let suffix = order_id.simple().to_string();
    format!("INV-{}-{}", date, &suffix[..8].to_uppercase())
}
