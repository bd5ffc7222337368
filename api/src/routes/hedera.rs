use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use domain::{HederaAccountBalance, HederaTransaction};
use serde::Serialize;

use crate::{
    error::{ApiError, ApiResult},
    services::HederaMirrorClient,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/hedera/account/balance", get(account_balance))
        .route("/hedera/transactions", get(transactions))
}

#[derive(Serialize)]
struct TransactionsResponse {
    account_id: String,
    transactions: Vec<HederaTransaction>,
}

fn mirror(state: &AppState) -> ApiResult<Arc<HederaMirrorClient>> {
    state.hedera.clone().ok_or(ApiError::HederaNotConfigured)
}

async fn account_balance(State(state): State<AppState>) -> ApiResult<Json<HederaAccountBalance>> {
    let balance = mirror(&state)?
        .account_balance()
        .await
        .map_err(|err| ApiError::HederaUpstream(format!("{err:#}")))?;
    Ok(Json(balance))
}

async fn transactions(State(state): State<AppState>) -> ApiResult<Json<TransactionsResponse>> {
    let client = mirror(&state)?;
    let transactions = client
        .transactions()
        .await
        .map_err(|err| ApiError::HederaUpstream(format!("{err:#}")))?;
    Ok(Json(TransactionsResponse {
        account_id: client.account_id().to_string(),
        transactions,
    }))
}
