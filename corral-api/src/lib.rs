//! Corral CRM REST API.
//!
//! An in-memory mock backend for the Corral mobile client: auth with
//! signed bearer tokens, customer and lead CRUD with pagination and
//! search, and dashboard aggregates. Storage sits behind the [`CrmStore`]
//! trait so the in-memory engine can be replaced without touching routes.

pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod store;
pub mod types;

pub use auth::{AuthConfig, Clock, FixedClock, SystemClock};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use routes::create_api_router;
pub use state::AppState;
pub use store::{CrmStore, MemoryStore, StoreError};
