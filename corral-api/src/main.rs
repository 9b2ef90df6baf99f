//! Corral API server entry point.

use std::sync::Arc;

use corral_api::{
    create_api_router, ApiConfig, ApiError, ApiResult, AppState, AuthConfig, MemoryStore,
};

#[tokio::main]
async fn main() -> ApiResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "corral_api=info,tower_http=info".into()),
        )
        .init();

    let api_config = ApiConfig::from_env();
    let auth_config = AuthConfig::from_env()?;

    let store = Arc::new(MemoryStore::new());
    if api_config.seed_demo {
        store.seed_demo().await;
    }

    let state = AppState::new(store, auth_config);
    let app = create_api_router(state, &api_config);

    let addr = api_config.bind_addr()?;
    tracing::info!(%addr, "Starting Corral API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
