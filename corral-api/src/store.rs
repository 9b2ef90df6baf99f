//! Storage layer for the Corral API.
//!
//! Route handlers depend only on the [`CrmStore`] trait, so the in-memory
//! implementation can be swapped for a persistent engine without touching
//! handler logic. [`MemoryStore`] keeps everything behind a single
//! `tokio::sync::RwLock`; identifiers are assigned from monotonically
//! increasing counters, never reused.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

use corral_core::{Customer, CustomerId, Lead, LeadId, LeadStatus, User, UserId};

use crate::types::{LeadStats, UpdateCustomerRequest, UpdateLeadRequest};

// ============================================================================
// STORE ERRORS
// ============================================================================

/// Domain-level storage failures. Converted to `ApiError` at the route
/// boundary (see `error.rs` for the exact wire messages).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("user email already taken")]
    UserEmailTaken,
    #[error("customer email already taken")]
    CustomerEmailTaken,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("customer not found")]
    CustomerNotFound,
    #[error("lead not found")]
    LeadNotFound,
    #[error("user not found")]
    UserNotFound,
}

pub type StoreResult<T> = Result<T, StoreError>;

// ============================================================================
// INPUT / OUTPUT TYPES
// ============================================================================

/// Validated input for creating a customer.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub owner_id: UserId,
}

/// Validated input for creating a lead under a customer.
#[derive(Debug, Clone)]
pub struct NewLead {
    pub title: String,
    pub description: String,
    pub status: LeadStatus,
    pub value: f64,
}

/// One page of a filtered listing plus the full filtered count.
#[derive(Debug, Clone)]
pub struct PageSlice<T> {
    pub items: Vec<T>,
    pub total: u64,
}

// ============================================================================
// STORE TRAIT
// ============================================================================

#[async_trait]
pub trait CrmStore: Send + Sync {
    // ------------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------------

    async fn user_create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> StoreResult<User>;

    async fn user_authenticate(&self, email: &str, password_hash: &str) -> StoreResult<User>;

    async fn user_get(&self, id: UserId) -> StoreResult<User>;

    // ------------------------------------------------------------------------
    // Customers
    // ------------------------------------------------------------------------

    /// List customers matching `search` (case-insensitive substring over
    /// name and email), one page at a time.
    async fn customer_list(&self, page: u32, limit: u32, search: &str) -> PageSlice<Customer>;

    async fn customer_create(&self, new: NewCustomer) -> StoreResult<Customer>;

    async fn customer_update(
        &self,
        id: CustomerId,
        patch: &UpdateCustomerRequest,
    ) -> StoreResult<Customer>;

    /// Delete a customer, cascading to every lead that references it.
    async fn customer_delete(&self, id: CustomerId) -> StoreResult<()>;

    // ------------------------------------------------------------------------
    // Leads
    // ------------------------------------------------------------------------

    /// List leads matching `search` (case-insensitive substring over title
    /// and description) and, when given, the exact `status`.
    async fn lead_list(
        &self,
        page: u32,
        limit: u32,
        search: &str,
        status: Option<LeadStatus>,
    ) -> PageSlice<Lead>;

    /// All leads owned by `customer_id`, optionally filtered by status.
    /// An unknown customer yields an empty list, matching the contract.
    async fn leads_for_customer(
        &self,
        customer_id: CustomerId,
        status: Option<LeadStatus>,
    ) -> Vec<Lead>;

    async fn lead_create(&self, customer_id: CustomerId, new: NewLead) -> StoreResult<Lead>;

    async fn lead_update(&self, id: LeadId, patch: &UpdateLeadRequest) -> StoreResult<Lead>;

    async fn lead_delete(&self, id: LeadId) -> StoreResult<()>;

    // ------------------------------------------------------------------------
    // Dashboard
    // ------------------------------------------------------------------------

    async fn lead_stats(&self) -> LeadStats;
}

// ============================================================================
// IN-MEMORY IMPLEMENTATION
// ============================================================================

#[derive(Debug)]
struct StoredUser {
    user: User,
    password_hash: String,
}

#[derive(Debug, Default)]
struct Inner {
    users: Vec<StoredUser>,
    customers: Vec<Customer>,
    leads: Vec<Lead>,
    next_user_id: UserId,
    next_customer_id: CustomerId,
    next_lead_id: LeadId,
}

impl Inner {
    fn new() -> Self {
        Self {
            next_user_id: 1,
            next_customer_id: 1,
            next_lead_id: 1,
            ..Default::default()
        }
    }
}

/// In-memory store. No persistence across restarts.
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::new()),
        }
    }

    /// Populate the demo data set: 35 customers owned by user 1, two leads
    /// each with statuses rotating through the pipeline. No-op when data
    /// already exists.
    pub async fn seed_demo(&self) {
        let mut inner = self.inner.write().await;
        if !inner.customers.is_empty() {
            return;
        }

        for i in 1..=35u32 {
            let id = inner.next_customer_id;
            inner.next_customer_id += 1;
            inner.customers.push(Customer {
                id,
                name: format!("Customer {}", i),
                email: format!("customer{}@example.com", i),
                phone: format!("+1-555-000{:02}", i),
                company: format!("Company {}", i.div_ceil(3)),
                owner_id: 1,
            });
        }

        let customers = inner.customers.clone();
        for customer in &customers {
            for j in 0..2u32 {
                let id = inner.next_lead_id;
                inner.next_lead_id += 1;
                let status = LeadStatus::ALL
                    [((customer.id as u32 + j) % LeadStatus::ALL.len() as u32) as usize];
                inner.leads.push(Lead {
                    id,
                    customer_id: customer.id,
                    title: format!("Lead {}-{}", customer.id, j + 1),
                    description: format!("Opportunity for {}", customer.name),
                    status,
                    value: 500.0 + 150.0 * id as f64,
                    created_at: Utc::now(),
                });
            }
        }

        tracing::info!(
            customers = inner.customers.len(),
            leads = inner.leads.len(),
            "Seeded demo data"
        );
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute the index window for one page of a listing. Pages are 1-based;
/// page 0 is treated as page 1. The window is clamped to `len`.
pub(crate) fn page_window(len: usize, page: u32, limit: u32) -> (usize, usize) {
    let page = page.max(1) as usize;
    let limit = limit as usize;
    let start = (page - 1).saturating_mul(limit).min(len);
    let end = start.saturating_add(limit).min(len);
    (start, end)
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[async_trait]
impl CrmStore for MemoryStore {
    async fn user_create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> StoreResult<User> {
        let mut inner = self.inner.write().await;
        if inner.users.iter().any(|u| u.user.email == email) {
            return Err(StoreError::UserEmailTaken);
        }
        let user = User {
            id: inner.next_user_id,
            name: name.to_string(),
            email: email.to_string(),
        };
        inner.next_user_id += 1;
        inner.users.push(StoredUser {
            user: user.clone(),
            password_hash: password_hash.to_string(),
        });
        Ok(user)
    }

    async fn user_authenticate(&self, email: &str, password_hash: &str) -> StoreResult<User> {
        let inner = self.inner.read().await;
        inner
            .users
            .iter()
            .find(|u| u.user.email == email && u.password_hash == password_hash)
            .map(|u| u.user.clone())
            .ok_or(StoreError::InvalidCredentials)
    }

    async fn user_get(&self, id: UserId) -> StoreResult<User> {
        let inner = self.inner.read().await;
        inner
            .users
            .iter()
            .find(|u| u.user.id == id)
            .map(|u| u.user.clone())
            .ok_or(StoreError::UserNotFound)
    }

    async fn customer_list(&self, page: u32, limit: u32, search: &str) -> PageSlice<Customer> {
        let inner = self.inner.read().await;
        let filtered: Vec<&Customer> = inner
            .customers
            .iter()
            .filter(|c| contains_ci(&c.name, search) || contains_ci(&c.email, search))
            .collect();
        let total = filtered.len() as u64;
        let (start, end) = page_window(filtered.len(), page, limit);
        PageSlice {
            items: filtered[start..end].iter().map(|c| (*c).clone()).collect(),
            total,
        }
    }

    async fn customer_create(&self, new: NewCustomer) -> StoreResult<Customer> {
        let mut inner = self.inner.write().await;
        if inner.customers.iter().any(|c| c.email == new.email) {
            return Err(StoreError::CustomerEmailTaken);
        }
        let customer = Customer {
            id: inner.next_customer_id,
            name: new.name,
            email: new.email,
            phone: new.phone,
            company: new.company,
            owner_id: new.owner_id,
        };
        inner.next_customer_id += 1;
        inner.customers.push(customer.clone());
        Ok(customer)
    }

    async fn customer_update(
        &self,
        id: CustomerId,
        patch: &UpdateCustomerRequest,
    ) -> StoreResult<Customer> {
        let mut inner = self.inner.write().await;
        let customer = inner
            .customers
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(StoreError::CustomerNotFound)?;
        if let Some(name) = &patch.name {
            customer.name = name.clone();
        }
        if let Some(email) = &patch.email {
            customer.email = email.clone();
        }
        if let Some(phone) = &patch.phone {
            customer.phone = phone.clone();
        }
        if let Some(company) = &patch.company {
            customer.company = company.clone();
        }
        Ok(customer.clone())
    }

    async fn customer_delete(&self, id: CustomerId) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let before = inner.customers.len();
        inner.customers.retain(|c| c.id != id);
        if inner.customers.len() == before {
            return Err(StoreError::CustomerNotFound);
        }
        // Cascade: a lead cannot outlive its customer.
        inner.leads.retain(|l| l.customer_id != id);
        Ok(())
    }

    async fn lead_list(
        &self,
        page: u32,
        limit: u32,
        search: &str,
        status: Option<LeadStatus>,
    ) -> PageSlice<Lead> {
        let inner = self.inner.read().await;
        let filtered: Vec<&Lead> = inner
            .leads
            .iter()
            .filter(|l| {
                let matches_search =
                    contains_ci(&l.title, search) || contains_ci(&l.description, search);
                let matches_status = status.is_none_or(|s| l.status == s);
                matches_search && matches_status
            })
            .collect();
        let total = filtered.len() as u64;
        let (start, end) = page_window(filtered.len(), page, limit);
        PageSlice {
            items: filtered[start..end].iter().map(|l| (*l).clone()).collect(),
            total,
        }
    }

    async fn leads_for_customer(
        &self,
        customer_id: CustomerId,
        status: Option<LeadStatus>,
    ) -> Vec<Lead> {
        let inner = self.inner.read().await;
        inner
            .leads
            .iter()
            .filter(|l| l.customer_id == customer_id && status.is_none_or(|s| l.status == s))
            .cloned()
            .collect()
    }

    async fn lead_create(&self, customer_id: CustomerId, new: NewLead) -> StoreResult<Lead> {
        let mut inner = self.inner.write().await;
        if !inner.customers.iter().any(|c| c.id == customer_id) {
            return Err(StoreError::CustomerNotFound);
        }
        let lead = Lead {
            id: inner.next_lead_id,
            customer_id,
            title: new.title,
            description: new.description,
            status: new.status,
            value: new.value,
            created_at: Utc::now(),
        };
        inner.next_lead_id += 1;
        inner.leads.push(lead.clone());
        Ok(lead)
    }

    async fn lead_update(&self, id: LeadId, patch: &UpdateLeadRequest) -> StoreResult<Lead> {
        let mut inner = self.inner.write().await;
        let lead = inner
            .leads
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(StoreError::LeadNotFound)?;
        if let Some(title) = &patch.title {
            lead.title = title.clone();
        }
        if let Some(description) = &patch.description {
            lead.description = description.clone();
        }
        if let Some(status) = patch.status {
            lead.status = status;
        }
        if let Some(value) = patch.value {
            lead.value = value;
        }
        Ok(lead.clone())
    }

    async fn lead_delete(&self, id: LeadId) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let before = inner.leads.len();
        inner.leads.retain(|l| l.id != id);
        if inner.leads.len() == before {
            return Err(StoreError::LeadNotFound);
        }
        Ok(())
    }

    async fn lead_stats(&self) -> LeadStats {
        let inner = self.inner.read().await;
        let mut by_status: HashMap<LeadStatus, u64> = HashMap::new();
        let mut total_value = 0.0;
        for lead in &inner.leads {
            *by_status.entry(lead.status).or_insert(0) += 1;
            total_value += lead.value;
        }
        LeadStats {
            by_status,
            total_value,
        }
    }
}
