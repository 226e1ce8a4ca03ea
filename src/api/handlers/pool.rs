//! Pool handlers: fund, list, get.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    FundPoolRequest, PaginationMeta, PaginationParams, PoolDetailResponse, PoolListResponse,
    parse_address, parse_amount,
};
use crate::app_state::AppState;
use crate::domain::{Address, PoolEntry};
use crate::error::{ErrorResponse, GatewayError};
use crate::service::TransactionReceipt;

/// `POST /pools/{asset}/fund`: Add liquidity to an asset pool.
///
/// # Errors
///
/// Returns [`GatewayError`] on a malformed address, a zero or malformed
/// amount, or balance overflow.
#[utoipa::path(
    post,
    path = "/api/v1/pools/{asset}/fund",
    tag = "Pools",
    summary = "Fund a pool",
    description = "Adds liquidity to the pool of `asset`, creating the pool on first funding. Emits a `pool_funded` event.",
    params(
        ("asset" = String, Path, description = "Asset address (0x-prefixed, 20 bytes)"),
    ),
    request_body = FundPoolRequest,
    responses(
        (status = 201, description = "Pool funded", body = TransactionReceipt),
        (status = 400, description = "Invalid address or amount", body = ErrorResponse),
        (status = 422, description = "Balance overflow", body = ErrorResponse),
    )
)]
pub async fn fund_pool(
    State(state): State<AppState>,
    Path(asset): Path<String>,
    Json(req): Json<FundPoolRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let asset = Address::parse_asset(&asset)?;
    let funder = parse_address(&req.funder)?;
    let amount = parse_amount("amount", &req.amount)?;

    let receipt = state
        .flash_loan_service
        .fund_pool(asset, funder, amount)
        .await?;

    Ok((StatusCode::CREATED, Json(receipt)))
}

/// `GET /pools`: List all pools with pagination.
///
/// # Errors
///
/// Returns [`GatewayError`] on internal failures.
#[utoipa::path(
    get,
    path = "/api/v1/pools",
    tag = "Pools",
    summary = "List pools",
    description = "Returns a paginated list of all funded pools ordered by asset address.",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated pool list", body = PoolListResponse),
    )
)]
pub async fn list_pools(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let params = params.clamped();
    let summaries = state.flash_loan_service.list_pools().await;

    let total = u32::try_from(summaries.len()).unwrap_or(u32::MAX);
    let per_page = params.per_page;
    let page = params.page;
    let total_pages = total.div_ceil(per_page);

    let start = (page.saturating_sub(1) as usize).saturating_mul(per_page as usize);
    let data = summaries
        .into_iter()
        .skip(start)
        .take(per_page as usize)
        .collect();

    Ok(Json(PoolListResponse {
        data,
        pagination: PaginationMeta {
            page,
            per_page,
            total,
            total_pages,
        },
    }))
}

/// `GET /pools/{asset}`: Get pool details.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidAddress`] on a malformed address. An asset
/// that was never funded reports a zero balance.
#[utoipa::path(
    get,
    path = "/api/v1/pools/{asset}",
    tag = "Pools",
    summary = "Get pool details",
    description = "Returns the balance, borrowable amount and loan statistics of a pool. Unknown assets report a zero balance.",
    params(
        ("asset" = String, Path, description = "Asset address (0x-prefixed, 20 bytes)"),
    ),
    responses(
        (status = 200, description = "Pool details", body = PoolDetailResponse),
        (status = 400, description = "Invalid address", body = ErrorResponse),
    )
)]
pub async fn get_pool(
    State(state): State<AppState>,
    Path(asset): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let asset = Address::parse_asset(&asset)?;
    let entry = state.flash_loan_service.pool(asset).await;

    let response = match entry {
        Some(entry) => PoolDetailResponse::from(&entry),
        None => PoolDetailResponse::from(&PoolEntry::new(asset)),
    };

    Ok(Json(response))
}

/// Pool routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pools", get(list_pools))
        .route("/pools/{asset}", get(get_pool))
        .route("/pools/{asset}/fund", post(fund_pool))
}
