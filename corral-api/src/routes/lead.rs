//! Lead REST routes (flat collection; creation lives under the customer
//! routes).

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use corral_core::LeadId;

use crate::error::{ApiError, ApiResult};
use crate::routes::parse_status_filter;
use crate::state::AppState;
use crate::types::{LeadListQuery, LeadPage, UpdateLeadRequest};

/// GET /leads - Paginated lead listing with search and status filter.
pub async fn list_leads(
    State(state): State<AppState>,
    Query(params): Query<LeadListQuery>,
) -> ApiResult<impl IntoResponse> {
    let status = parse_status_filter(params.status.as_deref())?;
    let slice = state
        .store
        .lead_list(params.page, params.limit, params.search.trim(), status)
        .await;

    Ok(Json(LeadPage {
        leads: slice.items,
        total: slice.total,
        page: params.page,
        limit: params.limit,
    }))
}

/// PUT /leads/:leadId - Merge a partial update into a lead.
pub async fn update_lead(
    State(state): State<AppState>,
    Path(lead_id): Path<LeadId>,
    Json(req): Json<UpdateLeadRequest>,
) -> ApiResult<impl IntoResponse> {
    if let Some(value) = req.value {
        if value < 0.0 {
            return Err(ApiError::invalid_input("value must be non-negative"));
        }
    }
    let lead = state.store.lead_update(lead_id, &req).await?;
    Ok(Json(lead))
}

/// DELETE /leads/:leadId - Delete a lead independently of its customer.
pub async fn delete_lead(
    State(state): State<AppState>,
    Path(lead_id): Path<LeadId>,
) -> ApiResult<StatusCode> {
    state.store.lead_delete(lead_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
