//! Request and response types for the REST API.
//!
//! These mirror the JSON contract consumed by the mobile client. List
//! responses keep the original asymmetric envelope field names (`data` for
//! customers, `leads` for leads).

use corral_core::{Customer, Lead, LeadStatus, User};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// AUTH
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Returned by both `/register` and `/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: User,
}

/// Returned by `GET /verify-token`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub user: User,
}

// ============================================================================
// CUSTOMERS
// ============================================================================

/// Query parameters for `GET /customers`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub search: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerPage {
    pub data: Vec<Customer>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateCustomerRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
}

/// Partial update for `PUT /customers/:id`. Absent fields are left as-is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCustomerRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
}

// ============================================================================
// LEADS
// ============================================================================

/// Query parameters for `GET /leads`.
///
/// `status` arrives as a raw string so that an absent or empty parameter
/// means "no filter" and an unknown value is a 400, not a deserialization
/// rejection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Query parameters for `GET /customers/:id/leads`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerLeadsQuery {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadPage {
    pub leads: Vec<Lead>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateLeadRequest {
    pub title: Option<String>,
    pub status: Option<LeadStatus>,
    pub description: Option<String>,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateLeadRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<LeadStatus>,
    pub value: Option<f64>,
}

// ============================================================================
// DASHBOARD
// ============================================================================

/// Returned by `GET /dashboard/leads-stats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadStats {
    pub by_status: HashMap<LeadStatus, u64>,
    pub total_value: f64,
}

// ============================================================================
// DEFAULTS
// ============================================================================

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    10
}
