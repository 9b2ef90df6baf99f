//! HTTP client for the Corral API.
//!
//! Every outbound request attempts to attach the stored bearer token; a
//! missing token simply sends the request unauthenticated. A 401 response
//! evicts the stored token exactly once and surfaces the original failure
//! to the caller - no automatic retry, no redirect, no deduplication of
//! in-flight requests.

use reqwest::Method;
use std::sync::Arc;
use std::time::Duration;

use corral_api::types::{
    AuthResponse, CreateCustomerRequest, CreateLeadRequest, CustomerPage, LeadPage, LeadStats,
    LoginRequest, RegisterRequest, UpdateCustomerRequest, UpdateLeadRequest, VerifyResponse,
};
use corral_core::{Customer, CustomerId, Lead, LeadId, LeadStatus};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::token::TokenStore;

#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    /// Handle to the token store shared with this client.
    pub fn tokens(&self) -> Arc<dyn TokenStore> {
        self.tokens.clone()
    }

    // ------------------------------------------------------------------------
    // Auth endpoints
    // ------------------------------------------------------------------------

    pub async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse, ClientError> {
        self.send_json(Method::POST, "/register", req).await
    }

    pub async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, ClientError> {
        self.send_json(Method::POST, "/login", req).await
    }

    pub async fn verify_token(&self) -> Result<VerifyResponse, ClientError> {
        self.get_json::<VerifyResponse, ()>("/verify-token", None)
            .await
    }

    // ------------------------------------------------------------------------
    // Customer endpoints
    // ------------------------------------------------------------------------

    pub async fn list_customers(
        &self,
        page: u32,
        limit: u32,
        search: &str,
    ) -> Result<CustomerPage, ClientError> {
        let query = [
            ("page", page.to_string()),
            ("limit", limit.to_string()),
            ("search", search.to_string()),
        ];
        self.get_json("/customers", Some(&query)).await
    }

    pub async fn create_customer(
        &self,
        req: &CreateCustomerRequest,
    ) -> Result<Customer, ClientError> {
        self.send_json(Method::POST, "/customers", req).await
    }

    pub async fn update_customer(
        &self,
        id: CustomerId,
        req: &UpdateCustomerRequest,
    ) -> Result<Customer, ClientError> {
        self.send_json(Method::PUT, &format!("/customers/{}", id), req)
            .await
    }

    pub async fn delete_customer(&self, id: CustomerId) -> Result<(), ClientError> {
        self.delete(&format!("/customers/{}", id)).await
    }

    // ------------------------------------------------------------------------
    // Lead endpoints
    // ------------------------------------------------------------------------

    pub async fn list_leads(
        &self,
        page: u32,
        limit: u32,
        search: &str,
        status: Option<LeadStatus>,
    ) -> Result<LeadPage, ClientError> {
        let mut query = vec![("page", page.to_string()), ("limit", limit.to_string())];
        if !search.is_empty() {
            query.push(("search", search.to_string()));
        }
        if let Some(status) = status {
            query.push(("status", status.to_string()));
        }
        self.get_json("/leads", Some(&query)).await
    }

    pub async fn leads_for_customer(
        &self,
        customer_id: CustomerId,
        status: Option<LeadStatus>,
    ) -> Result<Vec<Lead>, ClientError> {
        let query: Vec<(&str, String)> = status
            .map(|s| vec![("status", s.to_string())])
            .unwrap_or_default();
        self.get_json(&format!("/customers/{}/leads", customer_id), Some(&query))
            .await
    }

    pub async fn create_lead(
        &self,
        customer_id: CustomerId,
        req: &CreateLeadRequest,
    ) -> Result<Lead, ClientError> {
        self.send_json(
            Method::POST,
            &format!("/customers/{}/leads", customer_id),
            req,
        )
        .await
    }

    pub async fn update_lead(
        &self,
        lead_id: LeadId,
        req: &UpdateLeadRequest,
    ) -> Result<Lead, ClientError> {
        self.send_json(Method::PUT, &format!("/leads/{}", lead_id), req)
            .await
    }

    pub async fn delete_lead(&self, lead_id: LeadId) -> Result<(), ClientError> {
        self.delete(&format!("/leads/{}", lead_id)).await
    }

    // ------------------------------------------------------------------------
    // Dashboard endpoints
    // ------------------------------------------------------------------------

    pub async fn lead_stats(&self) -> Result<LeadStats, ClientError> {
        self.get_json::<LeadStats, ()>("/dashboard/leads-stats", None)
            .await
    }

    // ------------------------------------------------------------------------
    // Request plumbing
    // ------------------------------------------------------------------------

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.tokens.load() {
            Ok(Some(token)) => request.bearer_auth(token),
            Ok(None) => request,
            Err(err) => {
                // An unreadable token store degrades to an unauthenticated
                // request rather than failing the call outright.
                tracing::warn!(error = %err, "Failed to read stored token");
                request
            }
        }
    }

    async fn get_json<T, Q>(&self, path: &str, query: Option<&Q>) -> Result<T, ClientError>
    where
        T: serde::de::DeserializeOwned,
        Q: serde::Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.authorized(self.client.get(url));
        if let Some(query) = query {
            request = request.query(query);
        }
        let response = request.send().await?;
        self.parse_response(response).await
    }

    async fn send_json<T, B>(&self, method: Method, path: &str, body: &B) -> Result<T, ClientError>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        let request = self.authorized(self.client.request(method, url)).json(body);
        let response = request.send().await?;
        self.parse_response(response).await
    }

    async fn delete(&self, path: &str) -> Result<(), ClientError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.authorized(self.client.delete(url)).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.error_from(response).await)
        }
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        if response.status().is_success() {
            Ok(response.json::<T>().await?)
        } else {
            Err(self.error_from(response).await)
        }
    }

    /// Build the error for a non-success response, evicting the stored
    /// token when the server says the session is no longer valid.
    async fn error_from(&self, response: reqwest::Response) -> ClientError {
        let status = response.status().as_u16();
        if status == 401 {
            if let Err(err) = self.tokens.clear() {
                tracing::warn!(error = %err, "Failed to evict stored token after 401");
            } else {
                tracing::debug!("Evicted stored token after 401");
            }
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&text)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
            .unwrap_or_else(|| format!("HTTP {}", status));

        ClientError::Api { status, message }
    }
}
