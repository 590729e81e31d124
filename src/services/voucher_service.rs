use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::vouchers::{
        ApplicabilityKind, CreateVoucherRequest, UpdateVoucherStatusRequest,
        ValidateVoucherRequest, ValidateVoucherResult, VoucherList, VoucherUsageList,
    },
    entity::{
        products::Entity as Products,
        voucher_usages::{
            ActiveModel as UsageActive, Column as UsageCol, Entity as VoucherUsages,
            Model as UsageModel,
        },
        vouchers::{ActiveModel as VoucherActive, Column as VoucherCol, Entity as Vouchers, Model},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models,
    pricing::{
        Applicability, Cart, Rejection, Voucher, VoucherType,
        voucher::{self, CODE_LENGTH},
    },
    response::{ApiResponse, Meta},
    routes::params::{Pagination, VoucherListQuery},
    services::cart_service,
    state::AppState,
};

const MAX_CODE_ATTEMPTS: usize = 16;
const MAX_CUSTOM_CODE_LENGTH: usize = 32;

/// Builds the pricing view of a stored voucher.
pub fn to_domain(model: Model) -> AppResult<Voucher> {
    let voucher_type = VoucherType::parse(&model.voucher_type).ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!(
            "voucher {} has unknown type {}",
            model.code,
            model.voucher_type
        ))
    })?;
    let applicability = Applicability::from_parts(
        &model.applicability,
        model.applicable_category,
        model.applicable_product_id,
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("voucher {}: {e}", model.code)))?;

    Ok(Voucher {
        id: model.id,
        code: model.code,
        description: model.description,
        voucher_type,
        discount_value: model.discount_value,
        minimum_order_amount: model.minimum_order_amount,
        maximum_discount: model.maximum_discount,
        valid_from: model.valid_from.with_timezone(&Utc),
        valid_to: model.valid_to.with_timezone(&Utc),
        usage_limit: model.usage_limit,
        used_count: model.used_count,
        is_active: model.is_active,
        applicability,
    })
}

/// Looks up an active voucher by its normalized (upper-case) code.
pub async fn find_active_by_code<C: ConnectionTrait>(
    conn: &C,
    code: &str,
) -> AppResult<Option<Voucher>> {
    Vouchers::find()
        .filter(VoucherCol::Code.eq(code))
        .filter(VoucherCol::IsActive.eq(true))
        .one(conn)
        .await?
        .map(to_domain)
        .transpose()
}

/// Runs the full voucher check for a cart. The outer result carries
/// infrastructure failures, the inner one the business decision.
pub async fn evaluate<C: ConnectionTrait>(
    conn: &C,
    raw_code: &str,
    cart: &Cart,
    now: DateTime<Utc>,
) -> AppResult<Result<Voucher, Rejection>> {
    let code = match voucher::normalize_code(raw_code) {
        Ok(code) => code,
        Err(rejection) => return Ok(Err(rejection)),
    };
    let found = find_active_by_code(conn, &code).await?;
    Ok(voucher::validate(found.as_ref(), cart, now).cloned())
}

/// Consumes one use of the voucher. The guard mirrors `Voucher::is_valid`, so
/// of two concurrent checkouts racing for the last use only one matches a
/// row. Returns `false` when the use was not available any more.
pub async fn apply_usage<C: ConnectionTrait>(
    conn: &C,
    voucher_id: Uuid,
    now: DateTime<Utc>,
) -> AppResult<bool> {
    let result = Vouchers::update_many()
        .col_expr(VoucherCol::UsedCount, Expr::col(VoucherCol::UsedCount).add(1))
        .col_expr(VoucherCol::UpdatedAt, Expr::value(now))
        .filter(VoucherCol::Id.eq(voucher_id))
        .filter(VoucherCol::IsActive.eq(true))
        .filter(VoucherCol::ValidFrom.lte(now))
        .filter(VoucherCol::ValidTo.gte(now))
        .filter(
            Condition::any()
                .add(VoucherCol::UsageLimit.eq(0))
                .add(Expr::col(VoucherCol::UsedCount).lt(Expr::col(VoucherCol::UsageLimit))),
        )
        .exec(conn)
        .await?;

    Ok(result.rows_affected == 1)
}

/// Records one application of a voucher to a committed order.
pub async fn record_usage<C: ConnectionTrait>(
    conn: &C,
    voucher_id: Uuid,
    order_id: Uuid,
    user_id: Uuid,
    discount_amount: Decimal,
    total_before: Decimal,
    total_after: Decimal,
) -> AppResult<UsageModel> {
    let usage = UsageActive {
        id: Set(Uuid::new_v4()),
        voucher_id: Set(voucher_id),
        order_id: Set(order_id),
        user_id: Set(user_id),
        discount_amount: Set(discount_amount),
        total_before: Set(total_before),
        total_after: Set(total_after),
        used_at: NotSet,
    }
    .insert(conn)
    .await?;
    Ok(usage)
}

/// Checks a code against the caller's current cart without consuming it.
pub async fn validate_voucher(
    state: &AppState,
    user: &AuthUser,
    payload: ValidateVoucherRequest,
) -> AppResult<ApiResponse<ValidateVoucherResult>> {
    let cart = cart_service::load_cart(&state.orm, user.user_id).await?;

    let outcome = match voucher::normalize_code(&payload.code) {
        Err(rejection) => Err(rejection),
        Ok(_) if cart.is_empty() => Err(Rejection::EmptyCart),
        Ok(_) => evaluate(&state.orm, &payload.code, &cart, Utc::now()).await?,
    };

    let result = match outcome {
        Ok(voucher) => {
            let cart_total = cart.total();
            let discount = voucher::calculate_discount(&voucher, cart_total);
            tracing::debug!(code = %voucher.code, %discount, "voucher preview accepted");
            ValidateVoucherResult {
                success: true,
                message: "Voucher applied".into(),
                discount_amount: Some(discount),
                new_total: Some(voucher::discounted_total(cart_total, discount)),
                voucher_type: Some(voucher.voucher_type.as_str().to_string()),
                voucher_description: Some(voucher.description),
            }
        }
        Err(rejection) => {
            tracing::debug!(code = %payload.code, reason = %rejection, "voucher preview rejected");
            ValidateVoucherResult::rejected(rejection.to_string())
        }
    };

    let message = if result.success {
        "Voucher valid"
    } else {
        "Voucher rejected"
    };
    Ok(ApiResponse::success(message, result, Some(Meta::empty())))
}

pub async fn create_voucher(
    state: &AppState,
    user: &AuthUser,
    payload: CreateVoucherRequest,
) -> AppResult<ApiResponse<models::Voucher>> {
    ensure_admin(user)?;
    let applicability = validate_new_voucher(&payload)?;

    if let Applicability::SpecificProduct(product_id) = &applicability {
        if Products::find_by_id(*product_id)
            .one(&state.orm)
            .await?
            .is_none()
        {
            return Err(AppError::BadRequest("applicable product not found".into()));
        }
    }

    let code = match payload.code.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        Some(custom) => {
            let code = normalize_custom_code(custom)?;
            if code_exists(&state.orm, &code).await? {
                return Err(AppError::BadRequest("Voucher code already exists".into()));
            }
            code
        }
        None => unique_code(&state.orm).await?,
    };

    let voucher = VoucherActive {
        id: Set(Uuid::new_v4()),
        code: Set(code),
        description: Set(payload.description.trim().to_string()),
        voucher_type: Set(payload.voucher_type.as_str().to_string()),
        discount_value: Set(payload.discount_value),
        minimum_order_amount: Set(payload.minimum_order_amount),
        maximum_discount: Set(payload.maximum_discount),
        valid_from: Set(payload.valid_from.into()),
        valid_to: Set(payload.valid_to.into()),
        usage_limit: Set(payload.usage_limit.unwrap_or(0)),
        used_count: Set(0),
        is_active: Set(true),
        applicability: Set(applicability.kind().to_string()),
        applicable_category: Set(applicability.category().map(str::to_string)),
        applicable_product_id: Set(applicability.product_id()),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(code = %voucher.code, voucher_type = %voucher.voucher_type, "voucher created");
    audit::record(
        &state.pool,
        Some(user.user_id),
        "voucher_create",
        "vouchers",
        serde_json::json!({ "voucher_id": voucher.id, "code": voucher.code }),
    )
    .await;

    Ok(ApiResponse::success(
        "Voucher created",
        models::Voucher::from(voucher),
        Some(Meta::empty()),
    ))
}

pub async fn list_vouchers(
    state: &AppState,
    user: &AuthUser,
    query: VoucherListQuery,
) -> AppResult<ApiResponse<VoucherList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut finder = Vouchers::find();
    if let Some(is_active) = query.is_active {
        finder = finder.filter(VoucherCol::IsActive.eq(is_active));
    }
    finder = finder.order_by_desc(VoucherCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(models::Voucher::from)
        .collect();

    Ok(ApiResponse::paged(
        "Vouchers",
        VoucherList { items },
        page,
        limit,
        total,
    ))
}

pub async fn get_voucher(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<models::Voucher>> {
    ensure_admin(user)?;
    let voucher = Vouchers::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success(
        "Voucher",
        models::Voucher::from(voucher),
        None,
    ))
}

pub async fn set_voucher_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateVoucherStatusRequest,
) -> AppResult<ApiResponse<models::Voucher>> {
    ensure_admin(user)?;
    let existing = Vouchers::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: VoucherActive = existing.into();
    active.is_active = Set(payload.is_active);
    active.updated_at = Set(Utc::now().into());
    let voucher = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "voucher_status_update",
        "vouchers",
        serde_json::json!({ "voucher_id": voucher.id, "is_active": voucher.is_active }),
    )
    .await;

    Ok(ApiResponse::success(
        "Voucher updated",
        models::Voucher::from(voucher),
        Some(Meta::empty()),
    ))
}

pub async fn list_voucher_usages(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<VoucherUsageList>> {
    ensure_admin(user)?;
    if Vouchers::find_by_id(id).one(&state.orm).await?.is_none() {
        return Err(AppError::NotFound);
    }
    let (page, limit, offset) = pagination.normalize();

    let finder = VoucherUsages::find()
        .filter(UsageCol::VoucherId.eq(id))
        .order_by_desc(UsageCol::UsedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(models::VoucherUsage::from)
        .collect();

    Ok(ApiResponse::paged(
        "Voucher usages",
        VoucherUsageList { items },
        page,
        limit,
        total,
    ))
}

/// Checks the data-model rules and returns the typed applicability.
pub fn validate_new_voucher(payload: &CreateVoucherRequest) -> AppResult<Applicability> {
    if payload.discount_value <= Decimal::ZERO {
        return Err(AppError::BadRequest(
            "discount_value must be greater than 0".into(),
        ));
    }
    if payload.voucher_type == VoucherType::Percentage
        && payload.discount_value > Decimal::ONE_HUNDRED
    {
        return Err(AppError::BadRequest(
            "percentage discount cannot exceed 100".into(),
        ));
    }
    if payload.valid_to <= payload.valid_from {
        return Err(AppError::BadRequest(
            "valid_to must be after valid_from".into(),
        ));
    }
    if payload.usage_limit.is_some_and(|limit| limit < 0) {
        return Err(AppError::BadRequest("usage_limit cannot be negative".into()));
    }
    if payload
        .minimum_order_amount
        .is_some_and(|amount| amount < Decimal::ZERO)
    {
        return Err(AppError::BadRequest(
            "minimum_order_amount cannot be negative".into(),
        ));
    }
    if payload
        .maximum_discount
        .is_some_and(|cap| cap <= Decimal::ZERO)
    {
        return Err(AppError::BadRequest(
            "maximum_discount must be greater than 0".into(),
        ));
    }

    let category = payload
        .applicable_category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    let product_id = payload.applicable_product_id;

    match payload.applicability {
        ApplicabilityKind::SpecificCategory => match (category, product_id) {
            (Some(category), None) => Ok(Applicability::SpecificCategory(category.to_string())),
            _ => Err(AppError::BadRequest(
                "specific_category vouchers need applicable_category and no product".into(),
            )),
        },
        ApplicabilityKind::SpecificProduct => match (category, product_id) {
            (None, Some(id)) => Ok(Applicability::SpecificProduct(id)),
            _ => Err(AppError::BadRequest(
                "specific_product vouchers need applicable_product_id and no category".into(),
            )),
        },
        kind @ (ApplicabilityKind::AllProducts | ApplicabilityKind::MinimumOrderOnly) => {
            if category.is_some() || product_id.is_some() {
                return Err(AppError::BadRequest(
                    "this applicability takes no category or product".into(),
                ));
            }
            Ok(match kind {
                ApplicabilityKind::AllProducts => Applicability::AllProducts,
                _ => Applicability::MinimumOrderOnly,
            })
        }
    }
}

fn normalize_custom_code(raw: &str) -> AppResult<String> {
    let code = raw.to_uppercase();
    let well_formed = code.len() >= 4
        && code.len() <= MAX_CUSTOM_CODE_LENGTH
        && code.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit());
    if !well_formed {
        return Err(AppError::BadRequest(format!(
            "code must be 4-{MAX_CUSTOM_CODE_LENGTH} letters or digits"
        )));
    }
    Ok(code)
}

async fn code_exists<C: ConnectionTrait>(conn: &C, code: &str) -> AppResult<bool> {
    let count = Vouchers::find()
        .filter(VoucherCol::Code.eq(code))
        .count(conn)
        .await?;
    Ok(count > 0)
}

async fn unique_code<C: ConnectionTrait>(conn: &C) -> AppResult<String> {
    for _ in 0..MAX_CODE_ATTEMPTS {
        let candidate = {
            let mut rng = rand::thread_rng();
            voucher::generate_code(&mut rng)
        };
        if !code_exists(conn, &candidate).await? {
            return Ok(candidate);
        }
        tracing::debug!(%candidate, "generated voucher code collided, retrying");
    }
    Err(AppError::Internal(anyhow::anyhow!(
        "could not generate a unique {CODE_LENGTH}-character voucher code"
    )))
}
