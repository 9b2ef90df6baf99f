//! REST API routes.
//!
//! Route paths follow the contract the mobile client consumes: unprefixed,
//! with `/register`, `/login` and `/health` public and everything else
//! behind bearer authentication.

pub mod auth;
pub mod customer;
pub mod dashboard;
pub mod health;
pub mod lead;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use corral_core::LeadStatus;

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::middleware::auth_middleware;
use crate::state::AppState;

/// Parse an optional `status` query parameter. Absent or empty means no
/// filter; an unknown value is a 400.
pub(crate) fn parse_status_filter(raw: Option<&str>) -> ApiResult<Option<LeadStatus>> {
    match raw {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => s
            .parse::<LeadStatus>()
            .map(Some)
            .map_err(|e| ApiError::invalid_input(e.to_string())),
    }
}

/// Build the complete API router.
///
/// Middleware order (outer to inner): trace, CORS, then bearer auth on the
/// protected routes only.
pub fn create_api_router(state: AppState, config: &ApiConfig) -> Router {
    let protected = Router::new()
        .route("/verify-token", get(auth::verify_token))
        .route(
            "/customers",
            get(customer::list_customers).post(customer::create_customer),
        )
        .route(
            "/customers/:id",
            put(customer::update_customer).delete(customer::delete_customer),
        )
        .route(
            "/customers/:id/leads",
            get(customer::list_customer_leads).post(customer::create_customer_lead),
        )
        .route("/leads", get(lead::list_leads))
        .route(
            "/leads/:lead_id",
            put(lead::update_lead).delete(lead::delete_lead),
        )
        .route("/dashboard/leads-stats", get(dashboard::leads_stats))
        .layer(from_fn_with_state(state.clone(), auth_middleware));

    let public = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/health", get(health::health));

    Router::new()
        .merge(public)
        .merge(protected)
        .with_state(state)
        .layer(build_cors_layer(config))
        .layer(TraceLayer::new_for_http())
}

/// Build the CORS layer from configuration.
///
/// With no configured origins every origin is allowed, which is what the
/// mobile client expects of the mock backend.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods([
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ]);

    if config.cors_origins.is_empty() {
        tracing::info!("CORS: allowing all origins");
        cors.allow_origin(Any).allow_headers(Any)
    } else {
        tracing::info!(origins = ?config.cors_origins, "CORS: restricting origins");
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(origins)
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
    }
}
