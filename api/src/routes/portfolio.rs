use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use domain::{ChainInfo, PortfolioSnapshot};
use serde::Deserialize;

use crate::{error::ApiResult, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/wallet/balance", get(wallet_balance))
        .route("/config/chains", get(list_chains))
}

#[derive(Deserialize)]
struct BalanceQuery {
    private_key: String,
}

/// Chain and token failures come back inside the snapshot; only a bad key is rejected.
async fn wallet_balance(
    State(state): State<AppState>,
    Query(query): Query<BalanceQuery>,
) -> ApiResult<Json<PortfolioSnapshot>> {
    let snapshot = state.portfolio.aggregate_portfolio(&query.private_key).await?;
    Ok(Json(snapshot))
}

async fn list_chains(State(state): State<AppState>) -> Json<Vec<ChainInfo>> {
    Json(state.portfolio.chains())
}
