//! Client-held list state.
//!
//! [`PagedList`] is the in-memory mirror of one paginated server listing.
//! It is the sole mutable owner of list state; the UI layer only reads it
//! and dispatches intents. Fetches are tagged with a per-cache sequence
//! number so that a slow response arriving after the user has changed the
//! search term is discarded instead of appending stale results.

use std::collections::HashMap;

use corral_api::types::LeadStats;
use corral_core::{Customer, CustomerId, Lead, LeadId, LeadStatus, User};

// ============================================================================
// KEYED ENTITIES
// ============================================================================

/// Anything a [`PagedList`] can hold: identified by a server-assigned id.
pub trait Keyed {
    fn key(&self) -> i64;
}

impl Keyed for Customer {
    fn key(&self) -> i64 {
        self.id
    }
}

impl Keyed for Lead {
    fn key(&self) -> i64 {
        self.id
    }
}

// ============================================================================
// FETCH TICKETS
// ============================================================================

/// Handle for one in-flight fetch. Only the most recently issued ticket
/// may land its result; everything older is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

// ============================================================================
// PAGED LIST CACHE
// ============================================================================

/// One page-by-page mirror of a server listing.
///
/// `items` keeps server page order; `total` is whatever the server last
/// reported for the current filter combination, not the local length.
#[derive(Debug, Clone)]
pub struct PagedList<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub search: String,
    pub loading: bool,
    pub error: Option<String>,
    issued: u64,
}

impl<T: Keyed> PagedList<T> {
    pub fn new(limit: u32) -> Self {
        Self {
            items: Vec::new(),
            page: 1,
            limit,
            total: 0,
            search: String::new(),
            loading: false,
            error: None,
            issued: 0,
        }
    }

    /// Start a fetch: sets `loading`, clears the previous error, and
    /// returns the ticket the completion must present.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issued += 1;
        self.loading = true;
        self.error = None;
        FetchTicket(self.issued)
    }

    fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.0 == self.issued
    }

    /// Land a successful page. Page 1 replaces the sequence wholesale;
    /// later pages append, deduplicated by id. Returns `false` when the
    /// ticket is stale and the result was discarded.
    pub fn apply_page(
        &mut self,
        ticket: FetchTicket,
        entities: Vec<T>,
        total: u64,
        page: u32,
        limit: u32,
    ) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(page, "Discarding stale page response");
            return false;
        }
        self.loading = false;
        if page <= 1 {
            self.items = entities;
        } else {
            for entity in entities {
                if !self.items.iter().any(|e| e.key() == entity.key()) {
                    self.items.push(entity);
                }
            }
        }
        self.page = page;
        self.limit = limit;
        self.total = total;
        true
    }

    /// Land a failed fetch. The sequence is left unchanged. Returns
    /// `false` when the ticket is stale.
    pub fn fail(&mut self, ticket: FetchTicket, message: impl Into<String>) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!("Discarding stale fetch error");
            return false;
        }
        self.loading = false;
        self.error = Some(message.into());
        true
    }

    /// Record the search text and force the page back to 1. Does not
    /// trigger a network call; the caller re-fetches.
    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
        self.page = 1;
    }

    /// Clear the sequence without touching search or filters.
    pub fn reset(&mut self) {
        self.items.clear();
        self.page = 1;
        self.total = 0;
    }

    // ------------------------------------------------------------------------
    // Mutation reconciliation
    // ------------------------------------------------------------------------

    /// A mutation went pending: shared loading flag on, prior error gone.
    pub fn begin_mutation(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// A mutation was rejected: record the message, leave state otherwise
    /// untouched.
    pub fn fail_mutation(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
    }

    /// Reconcile a server-acknowledged create: prepend and bump the total.
    pub fn apply_created(&mut self, entity: T) {
        self.loading = false;
        self.items.insert(0, entity);
        self.total += 1;
    }

    /// Reconcile a server-acknowledged update: replace in place, position
    /// unchanged. Silently no-ops when the entity is not cached.
    pub fn apply_updated(&mut self, entity: T) {
        self.loading = false;
        if let Some(existing) = self.items.iter_mut().find(|e| e.key() == entity.key()) {
            *existing = entity;
        }
    }

    /// Reconcile a server-acknowledged delete: drop the entity and floor
    /// the total at zero.
    pub fn apply_deleted(&mut self, key: i64) {
        self.loading = false;
        self.items.retain(|e| e.key() != key);
        self.total = self.total.saturating_sub(1);
    }
}

impl<T: Keyed> Default for PagedList<T> {
    fn default() -> Self {
        Self::new(10)
    }
}

// ============================================================================
// LEADS STATE (flat list + association index)
// ============================================================================

/// Lead list state: the flat paginated cache plus the per-customer
/// association index. The index is populated independently per customer,
/// never paginated, and replaced wholesale on each fetch.
#[derive(Debug, Clone, Default)]
pub struct LeadsState {
    pub list: PagedList<Lead>,
    pub by_customer: HashMap<CustomerId, Vec<Lead>>,
    pub status_filter: Option<LeadStatus>,
}

impl LeadsState {
    pub fn new(limit: u32) -> Self {
        Self {
            list: PagedList::new(limit),
            by_customer: HashMap::new(),
            status_filter: None,
        }
    }

    /// Record the status filter and force the page back to 1. The caller
    /// re-fetches.
    pub fn set_status_filter(&mut self, status: Option<LeadStatus>) {
        self.status_filter = status;
        self.list.page = 1;
    }

    /// Replace a customer's bucket wholesale. Does not touch the flat
    /// list.
    pub fn replace_customer_leads(&mut self, customer_id: CustomerId, leads: Vec<Lead>) {
        self.by_customer.insert(customer_id, leads);
    }

    /// Drop everything cached for a customer: its bucket and every flat
    /// list entry it owns (mirror of the server-side cascade).
    pub fn purge_customer(&mut self, customer_id: CustomerId) {
        self.by_customer.remove(&customer_id);
        let before = self.list.items.len();
        self.list.items.retain(|l| l.customer_id != customer_id);
        let removed = (before - self.list.items.len()) as u64;
        self.list.total = self.list.total.saturating_sub(removed);
    }

    pub fn apply_created(&mut self, lead: Lead) {
        if let Some(bucket) = self.by_customer.get_mut(&lead.customer_id) {
            bucket.insert(0, lead.clone());
        }
        self.list.apply_created(lead);
    }

    pub fn apply_updated(&mut self, lead: Lead) {
        // The lead's own customer id selects the bucket directly.
        if let Some(bucket) = self.by_customer.get_mut(&lead.customer_id) {
            if let Some(existing) = bucket.iter_mut().find(|l| l.id == lead.id) {
                *existing = lead.clone();
            }
        }
        self.list.apply_updated(lead);
    }

    pub fn apply_deleted(&mut self, lead_id: LeadId) {
        // Prefer resolving the owner from the flat list; fall back to a
        // bucket scan (first match wins) when the lead is not cached.
        let owner = self
            .list
            .items
            .iter()
            .find(|l| l.id == lead_id)
            .map(|l| l.customer_id);
        self.list.apply_deleted(lead_id);

        match owner {
            Some(customer_id) => {
                if let Some(bucket) = self.by_customer.get_mut(&customer_id) {
                    bucket.retain(|l| l.id != lead_id);
                }
            }
            None => {
                for bucket in self.by_customer.values_mut() {
                    if let Some(pos) = bucket.iter().position(|l| l.id == lead_id) {
                        bucket.remove(pos);
                        break;
                    }
                }
            }
        }
    }
}

// ============================================================================
// SESSION & DASHBOARD STATE
// ============================================================================

/// Authentication state.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub user: Option<User>,
    pub loading: bool,
    pub error: Option<String>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Dashboard aggregates, fetched on demand.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub stats: Option<LeadStats>,
    pub loading: bool,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn customer(id: CustomerId) -> Customer {
        Customer {
            id,
            name: format!("Customer {}", id),
            email: format!("c{}@example.com", id),
            phone: String::new(),
            company: String::new(),
            owner_id: 1,
        }
    }

    fn lead(id: LeadId, customer_id: CustomerId) -> Lead {
        Lead {
            id,
            customer_id,
            title: format!("Lead {}", id),
            description: String::new(),
            status: LeadStatus::New,
            value: 100.0,
            created_at: Utc::now(),
        }
    }

    fn ids(list: &PagedList<Customer>) -> Vec<i64> {
        list.items.iter().map(|c| c.id).collect()
    }

    #[test]
    fn page_one_replaces_wholesale() {
        let mut list = PagedList::new(10);
        let t = list.begin_fetch();
        assert!(list.loading);
        assert!(list.apply_page(t, vec![customer(1), customer(2)], 12, 1, 10));
        assert!(!list.loading);

        let t = list.begin_fetch();
        assert!(list.apply_page(t, vec![customer(3)], 1, 1, 10));
        assert_eq!(ids(&list), vec![3]);
        assert_eq!(list.total, 1);
    }

    #[test]
    fn later_pages_append_with_dedupe() {
        let mut list = PagedList::new(2);
        let t = list.begin_fetch();
        list.apply_page(t, vec![customer(1), customer(2)], 4, 1, 2);

        // Entity 2 moved pages between requests; it must not duplicate.
        let t = list.begin_fetch();
        list.apply_page(t, vec![customer(2), customer(3)], 4, 2, 2);
        assert_eq!(ids(&list), vec![1, 2, 3]);
        assert_eq!(list.page, 2);
        assert_eq!(list.total, 4);
    }

    #[test]
    fn stale_page_responses_are_discarded() {
        let mut list = PagedList::new(10);
        let t1 = list.begin_fetch();
        list.apply_page(t1, vec![customer(1)], 20, 1, 10);

        // Page 2 goes out, then the user changes the search term and a new
        // page-1 fetch supersedes it.
        let stale = list.begin_fetch();
        list.set_search("acme");
        let fresh = list.begin_fetch();
        assert!(list.apply_page(fresh, vec![customer(9)], 1, 1, 10));

        // The slow page-2 response lands last and must not append.
        assert!(!list.apply_page(stale, vec![customer(2)], 20, 2, 10));
        assert_eq!(ids(&list), vec![9]);
        assert_eq!(list.total, 1);
    }

    #[test]
    fn stale_errors_are_discarded_too() {
        let mut list = PagedList::<Customer>::new(10);
        let stale = list.begin_fetch();
        let fresh = list.begin_fetch();
        assert!(!list.fail(stale, "timeout"));
        assert!(list.error.is_none());
        assert!(list.fail(fresh, "timeout"));
        assert_eq!(list.error.as_deref(), Some("timeout"));
    }

    #[test]
    fn failed_fetch_leaves_sequence_unchanged() {
        let mut list = PagedList::new(10);
        let t = list.begin_fetch();
        list.apply_page(t, vec![customer(1)], 1, 1, 10);

        let t = list.begin_fetch();
        assert!(list.fail(t, "Request failed"));
        assert_eq!(ids(&list), vec![1]);
        assert!(!list.loading);
    }

    #[test]
    fn set_search_resets_page_without_clearing_items() {
        let mut list = PagedList::new(10);
        let t = list.begin_fetch();
        list.apply_page(t, vec![customer(1)], 5, 3, 10);
        list.set_search("acme");
        assert_eq!(list.page, 1);
        assert_eq!(list.search, "acme");
        assert_eq!(ids(&list), vec![1]);
    }

    #[test]
    fn reset_keeps_search() {
        let mut list = PagedList::new(10);
        list.set_search("acme");
        let t = list.begin_fetch();
        list.apply_page(t, vec![customer(1)], 5, 1, 10);
        list.reset();
        assert!(list.items.is_empty());
        assert_eq!(list.page, 1);
        assert_eq!(list.total, 0);
        assert_eq!(list.search, "acme");
    }

    #[test]
    fn created_entities_are_prepended_and_counted() {
        let mut list = PagedList::new(10);
        let t = list.begin_fetch();
        list.apply_page(t, vec![customer(1)], 1, 1, 10);

        list.begin_mutation();
        list.apply_created(customer(2));
        assert_eq!(ids(&list), vec![2, 1]);
        assert_eq!(list.total, 2);
        assert!(!list.loading);
    }

    #[test]
    fn update_replaces_in_place_and_ignores_unknown_ids() {
        let mut list = PagedList::new(10);
        let t = list.begin_fetch();
        list.apply_page(t, vec![customer(1), customer(2), customer(3)], 3, 1, 10);

        let mut renamed = customer(2);
        renamed.name = "Renamed".to_string();
        list.apply_updated(renamed);
        assert_eq!(ids(&list), vec![1, 2, 3]);
        assert_eq!(list.items[1].name, "Renamed");

        // Unknown id: silent no-op.
        list.apply_updated(customer(99));
        assert_eq!(ids(&list), vec![1, 2, 3]);
    }

    #[test]
    fn delete_removes_and_floors_total_at_zero() {
        let mut list = PagedList::new(10);
        let t = list.begin_fetch();
        list.apply_page(t, vec![customer(1)], 1, 1, 10);

        list.apply_deleted(1);
        assert!(list.items.is_empty());
        assert_eq!(list.total, 0);

        list.apply_deleted(1);
        assert_eq!(list.total, 0);
    }

    #[test]
    fn rejected_mutation_records_error_only() {
        let mut list = PagedList::new(10);
        let t = list.begin_fetch();
        list.apply_page(t, vec![customer(1)], 1, 1, 10);

        list.begin_mutation();
        assert!(list.error.is_none());
        list.fail_mutation("Customer with this email already exists");
        assert_eq!(
            list.error.as_deref(),
            Some("Customer with this email already exists")
        );
        assert_eq!(ids(&list), vec![1]);
        assert_eq!(list.total, 1);
    }

    #[test]
    fn lead_create_updates_flat_list_and_bucket() {
        let mut leads = LeadsState::new(10);
        leads.replace_customer_leads(7, vec![lead(1, 7)]);

        leads.apply_created(lead(2, 7));
        assert_eq!(leads.list.items[0].id, 2);
        assert_eq!(leads.list.total, 1);
        let bucket = &leads.by_customer[&7];
        assert_eq!(bucket[0].id, 2);
        assert_eq!(bucket.len(), 2);
    }

    #[test]
    fn lead_update_touches_matching_bucket_entry() {
        let mut leads = LeadsState::new(10);
        let t = leads.list.begin_fetch();
        leads.list.apply_page(t, vec![lead(1, 7)], 1, 1, 10);
        leads.replace_customer_leads(7, vec![lead(1, 7)]);

        let mut converted = lead(1, 7);
        converted.status = LeadStatus::Converted;
        leads.apply_updated(converted);

        assert_eq!(leads.list.items[0].status, LeadStatus::Converted);
        assert_eq!(leads.by_customer[&7][0].status, LeadStatus::Converted);
    }

    #[test]
    fn lead_delete_resolves_owner_from_flat_list() {
        let mut leads = LeadsState::new(10);
        let t = leads.list.begin_fetch();
        leads.list.apply_page(t, vec![lead(1, 7), lead(2, 8)], 2, 1, 10);
        leads.replace_customer_leads(7, vec![lead(1, 7)]);
        leads.replace_customer_leads(8, vec![lead(2, 8)]);

        leads.apply_deleted(1);
        assert!(leads.by_customer[&7].is_empty());
        assert_eq!(leads.by_customer[&8].len(), 1);
        assert_eq!(leads.list.total, 1);
    }

    #[test]
    fn lead_delete_falls_back_to_bucket_scan() {
        let mut leads = LeadsState::new(10);
        // Lead 5 is only in the association index, not the flat list.
        leads.replace_customer_leads(3, vec![lead(5, 3)]);

        leads.apply_deleted(5);
        assert!(leads.by_customer[&3].is_empty());
    }

    #[test]
    fn purging_a_customer_drops_bucket_and_owned_flat_entries() {
        let mut leads = LeadsState::new(10);
        let t = leads.list.begin_fetch();
        leads
            .list
            .apply_page(t, vec![lead(1, 7), lead(2, 8), lead(3, 7)], 5, 1, 10);
        leads.replace_customer_leads(7, vec![lead(1, 7), lead(3, 7)]);

        leads.purge_customer(7);
        assert!(!leads.by_customer.contains_key(&7));
        assert_eq!(leads.list.items.len(), 1);
        assert_eq!(leads.list.items[0].customer_id, 8);
        assert_eq!(leads.list.total, 3);
    }

    #[test]
    fn status_filter_resets_page() {
        let mut leads = LeadsState::new(10);
        leads.list.page = 4;
        leads.set_status_filter(Some(LeadStatus::Lost));
        assert_eq!(leads.list.page, 1);
        assert_eq!(leads.status_filter, Some(LeadStatus::Lost));
    }
}
