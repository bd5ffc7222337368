use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use domain::{BalanceSnapshot, ReminderAck, ReminderEntry, ReminderRequest};

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reminders", post(create_reminder))
        .route("/reminders/:condition", get(list_reminders))
        .route("/balances", get(current_balances))
}

async fn create_reminder(
    State(state): State<AppState>,
    Json(payload): Json<ReminderRequest>,
) -> ApiResult<Json<ReminderAck>> {
    let entry = state
        .reminders
        .register(
            &payload.email,
            &payload.condition,
            payload.threshold,
            payload.current_balances,
        )
        .await?;
    Ok(Json(ReminderAck {
        message: "Reminder set successfully".to_string(),
        id: entry.id,
    }))
}

async fn list_reminders(
    State(state): State<AppState>,
    Path(condition): Path<String>,
) -> ApiResult<Json<Vec<ReminderEntry>>> {
    Ok(Json(state.reminders.list_tag(&condition).await?))
}

/// Next sample of the simulated sub-wallet balances.
async fn current_balances(State(state): State<AppState>) -> ApiResult<Json<BalanceSnapshot>> {
    state
        .balances
        .sample()
        .await
        .map(Json)
        .map_err(|err| ApiError::SourceUnavailable(err.to_string()))
}
