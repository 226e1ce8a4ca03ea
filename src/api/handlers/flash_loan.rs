//! Flash-loan handlers: execute and fee quote.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    FeeQuoteParams, FeeQuoteResponse, FlashLoanRequest, parse_address, parse_amount,
    parse_params,
};
use crate::app_state::AppState;
use crate::domain::{Address, LoanRequest};
use crate::error::{ErrorResponse, GatewayError};
use crate::service::TransactionReceipt;

/// `POST /flash-loans`: Borrow and repay within one settlement unit.
///
/// # Errors
///
/// Returns [`GatewayError`] when the request is malformed, the borrower is
/// unknown, liquidity is insufficient, or the unit reverts.
#[utoipa::path(
    post,
    path = "/api/v1/flash-loans",
    tag = "Flash Loans",
    summary = "Execute a flash loan",
    description = "Lends `amount` of `asset` to the registered `borrower`, runs its callback, and commits only if the pool ends at least at its prior balance plus the fee. Reverted loans leave no trace.",
    request_body = FlashLoanRequest,
    responses(
        (status = 200, description = "Loan settled", body = TransactionReceipt),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Borrower not registered", body = ErrorResponse),
        (status = 422, description = "Insufficient liquidity or loan reverted", body = ErrorResponse),
    )
)]
pub async fn execute_flash_loan(
    State(state): State<AppState>,
    Json(req): Json<FlashLoanRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let request = LoanRequest {
        asset: Address::parse_asset(&req.asset)?,
        amount: parse_amount("amount", &req.amount)?,
        borrower: parse_address(&req.borrower)?,
        params: parse_params(req.params.as_deref())?,
    };

    let receipt = state.flash_loan_service.execute_flash_loan(request).await?;
    Ok(Json(receipt))
}

/// `GET /flash-loans/fee`: Quote the fee for a principal.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidAmount`] on a malformed amount.
#[utoipa::path(
    get,
    path = "/api/v1/flash-loans/fee",
    tag = "Flash Loans",
    summary = "Quote a flash-loan fee",
    description = "Returns the fee and total repayment for borrowing `amount`. Fees round down.",
    params(FeeQuoteParams),
    responses(
        (status = 200, description = "Fee quote", body = FeeQuoteResponse),
        (status = 400, description = "Invalid amount", body = ErrorResponse),
    )
)]
pub async fn flash_fee(
    State(state): State<AppState>,
    Query(params): Query<FeeQuoteParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let amount = parse_amount("amount", &params.amount)?;
    let fee = state.flash_loan_service.flash_fee(amount);
    let repayment = amount
        .checked_add(fee)
        .ok_or_else(|| GatewayError::InvalidAmount(format!("amount: {amount} overflows")))?;

    Ok(Json(FeeQuoteResponse {
        amount: amount.to_string(),
        fee: fee.to_string(),
        repayment: repayment.to_string(),
        fee_bps: state.flash_loan_service.fee_policy().bps(),
    }))
}

/// Flash-loan routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/flash-loans", post(execute_flash_loan))
        .route("/flash-loans/fee", get(flash_fee))
}
