//! Dashboard aggregate routes.

use axum::{extract::State, response::IntoResponse, Json};

use crate::error::ApiResult;
use crate::state::AppState;

/// GET /dashboard/leads-stats - Lead counts per status plus total pipeline
/// value, across all leads (unfiltered).
pub async fn leads_stats(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let stats = state.store.lead_stats().await;
    Ok(Json(stats))
}
