//! Corral client library: typed HTTP client, token storage, and the
//! cached list state that backs a UI.

pub mod api_client;
pub mod app;
pub mod config;
pub mod error;
pub mod state;
pub mod token;

pub use api_client::ApiClient;
pub use app::CrmApp;
pub use config::ClientConfig;
pub use error::ClientError;
pub use state::{DashboardState, FetchTicket, Keyed, LeadsState, PagedList, Session};
pub use token::{FileTokenStore, MemoryTokenStore, TokenStore};
