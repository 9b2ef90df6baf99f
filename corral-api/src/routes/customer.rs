//! Customer REST routes, including the nested per-customer lead
//! collection.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};

use corral_core::CustomerId;

use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::routes::parse_status_filter;
use crate::state::AppState;
use crate::store::{NewCustomer, NewLead};
use crate::types::{
    CreateCustomerRequest, CreateLeadRequest, CustomerLeadsQuery, CustomerListQuery, CustomerPage,
    UpdateCustomerRequest,
};

/// GET /customers - Paginated, searchable customer listing.
pub async fn list_customers(
    State(state): State<AppState>,
    Query(params): Query<CustomerListQuery>,
) -> ApiResult<impl IntoResponse> {
    let slice = state
        .store
        .customer_list(params.page, params.limit, params.search.trim())
        .await;

    Ok(Json(CustomerPage {
        data: slice.items,
        total: slice.total,
        page: params.page,
        limit: params.limit,
    }))
}

/// POST /customers - Create a customer owned by the caller.
pub async fn create_customer(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Json(req): Json<CreateCustomerRequest>,
) -> ApiResult<impl IntoResponse> {
    let name = req.name.as_deref().map(str::trim).unwrap_or_default();
    let email = req.email.as_deref().map(str::trim).unwrap_or_default();
    if name.is_empty() || email.is_empty() {
        return Err(ApiError::validation_failed("Name and email are required"));
    }

    let customer = state
        .store
        .customer_create(NewCustomer {
            name: name.to_string(),
            email: email.to_string(),
            phone: req.phone.unwrap_or_default(),
            company: req.company.unwrap_or_default(),
            owner_id: user.id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(customer)))
}

/// PUT /customers/:id - Merge a partial update into a customer.
pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<CustomerId>,
    Json(req): Json<UpdateCustomerRequest>,
) -> ApiResult<impl IntoResponse> {
    let customer = state.store.customer_update(id, &req).await?;
    Ok(Json(customer))
}

/// DELETE /customers/:id - Delete a customer and cascade to its leads.
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<CustomerId>,
) -> ApiResult<StatusCode> {
    state.store.customer_delete(id).await?;
    tracing::debug!(customer_id = id, "Customer deleted (leads cascaded)");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /customers/:id/leads - All leads for one customer, never paginated.
pub async fn list_customer_leads(
    State(state): State<AppState>,
    Path(id): Path<CustomerId>,
    Query(params): Query<CustomerLeadsQuery>,
) -> ApiResult<impl IntoResponse> {
    let status = parse_status_filter(params.status.as_deref())?;
    let leads = state.store.leads_for_customer(id, status).await;
    Ok(Json(leads))
}

/// POST /customers/:id/leads - Create a lead attached to a customer.
pub async fn create_customer_lead(
    State(state): State<AppState>,
    Path(id): Path<CustomerId>,
    Json(req): Json<CreateLeadRequest>,
) -> ApiResult<impl IntoResponse> {
    let title = req.title.as_deref().map(str::trim).unwrap_or_default();
    let (title, status) = match (title, req.status) {
        (t, Some(status)) if !t.is_empty() => (t.to_string(), status),
        _ => return Err(ApiError::validation_failed("Title and status are required")),
    };

    let value = req.value.unwrap_or(0.0);
    if value < 0.0 {
        return Err(ApiError::invalid_input("value must be non-negative"));
    }

    let lead = state
        .store
        .lead_create(
            id,
            NewLead {
                title,
                description: req.description.unwrap_or_default(),
                status,
                value,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(lead)))
}
