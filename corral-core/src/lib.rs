//! Corral Core - Entity Types
//!
//! Pure data structures shared by the API server and the client.
//! This crate contains ONLY data types - no business logic.
//!
//! All wire-facing structs serialize with camelCase field names, matching
//! the JSON contract consumed by the mobile client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// User identifier. Server-assigned, monotonically increasing.
pub type UserId = i64;

/// Customer identifier. Server-assigned, monotonically increasing.
pub type CustomerId = i64;

/// Lead identifier. Server-assigned, monotonically increasing.
pub type LeadId = i64;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

// ============================================================================
// ENUMS
// ============================================================================

/// Sales pipeline stage of a lead.
///
/// Serialized as the exact capitalized strings the HTTP contract uses
/// (`"New"`, `"Contacted"`, ...), both in JSON bodies and in the `status`
/// query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeadStatus {
    New,
    Contacted,
    Converted,
    Lost,
}

impl LeadStatus {
    /// All statuses, in pipeline order.
    pub const ALL: [LeadStatus; 4] = [
        LeadStatus::New,
        LeadStatus::Contacted,
        LeadStatus::Converted,
        LeadStatus::Lost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "New",
            LeadStatus::Contacted => "Contacted",
            LeadStatus::Converted => "Converted",
            LeadStatus::Lost => "Lost",
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown lead status string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown lead status: {0}")]
pub struct ParseLeadStatusError(pub String);

impl FromStr for LeadStatus {
    type Err = ParseLeadStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "New" => Ok(LeadStatus::New),
            "Contacted" => Ok(LeadStatus::Contacted),
            "Converted" => Ok(LeadStatus::Converted),
            "Lost" => Ok(LeadStatus::Lost),
            other => Err(ParseLeadStatusError(other.to_string())),
        }
    }
}

// ============================================================================
// ENTITIES
// ============================================================================

/// Authenticated account. The password never leaves the server layer, so
/// this struct is safe to return in API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

/// Customer record. Email is unique across customers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub owner_id: UserId,
}

/// Lead record, always owned by exactly one customer. Deleting the owning
/// customer cascades to its leads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: LeadId,
    pub customer_id: CustomerId,
    pub title: String,
    pub description: String,
    pub status: LeadStatus,
    /// Monetary value, non-negative.
    pub value: f64,
    pub created_at: Timestamp,
}
