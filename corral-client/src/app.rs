//! Application facade: owns the HTTP client and every piece of cached
//! state, and exposes one async method per user intent.
//!
//! Each intent follows the same shape: mark the affected state pending,
//! call the API, then reconcile the acknowledged result (or record the
//! failure message). Mutations never update caches optimistically; the
//! server response is the only thing that lands.

use std::sync::Arc;

use corral_api::types::{
    CreateCustomerRequest, CreateLeadRequest, LoginRequest, RegisterRequest,
    UpdateCustomerRequest, UpdateLeadRequest,
};
use corral_core::{Customer, CustomerId, Lead, LeadId, LeadStatus, User};

use crate::api_client::ApiClient;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::state::{DashboardState, LeadsState, PagedList, Session};
use crate::token::TokenStore;

pub struct CrmApp {
    api: ApiClient,
    tokens: Arc<dyn TokenStore>,
    pub session: Session,
    pub customers: PagedList<Customer>,
    pub leads: LeadsState,
    pub dashboard: DashboardState,
}

impl CrmApp {
    pub fn new(config: &ClientConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, ClientError> {
        let api = ApiClient::new(config, tokens.clone())?;
        Ok(Self {
            api,
            tokens,
            session: Session::default(),
            customers: PagedList::new(10),
            leads: LeadsState::new(10),
            dashboard: DashboardState::default(),
        })
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    // ------------------------------------------------------------------------
    // Session intents
    // ------------------------------------------------------------------------

    pub async fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<(), ClientError> {
        self.session.loading = true;
        self.session.error = None;
        let req = RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        match self.api.register(&req).await {
            Ok(resp) => self.establish_session(resp.token, resp.user),
            Err(err) => self.fail_session(err),
        }
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<(), ClientError> {
        self.session.loading = true;
        self.session.error = None;
        let req = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        match self.api.login(&req).await {
            Ok(resp) => self.establish_session(resp.token, resp.user),
            Err(err) => self.fail_session(err),
        }
    }

    /// Re-validate a stored token on startup. On failure the 401 handling
    /// in the HTTP layer has already evicted the token; here we just clear
    /// the session.
    pub async fn verify_session(&mut self) -> Result<(), ClientError> {
        self.session.loading = true;
        self.session.error = None;
        match self.api.verify_token().await {
            Ok(resp) => {
                self.session.loading = false;
                self.session.user = Some(resp.user);
                Ok(())
            }
            Err(err) => {
                self.session.loading = false;
                self.session.user = None;
                Err(err)
            }
        }
    }

    /// Purely local: drop the token and reset every cache.
    pub fn logout(&mut self) -> Result<(), ClientError> {
        self.tokens.clear()?;
        self.session = Session::default();
        self.customers.reset();
        self.leads = LeadsState::new(self.leads.list.limit);
        self.dashboard = DashboardState::default();
        Ok(())
    }

    fn establish_session(&mut self, token: String, user: User) -> Result<(), ClientError> {
        self.tokens.save(&token)?;
        self.session.loading = false;
        self.session.user = Some(user);
        Ok(())
    }

    fn fail_session(&mut self, err: ClientError) -> Result<(), ClientError> {
        self.session.loading = false;
        self.session.error = Some(err.ui_message());
        Err(err)
    }

    // ------------------------------------------------------------------------
    // Customer intents
    // ------------------------------------------------------------------------

    pub async fn fetch_customers(&mut self, page: u32) -> Result<(), ClientError> {
        let ticket = self.customers.begin_fetch();
        let limit = self.customers.limit;
        let search = self.customers.search.clone();
        match self.api.list_customers(page, limit, &search).await {
            Ok(resp) => {
                self.customers
                    .apply_page(ticket, resp.data, resp.total, resp.page, resp.limit);
                Ok(())
            }
            Err(err) => {
                self.customers.fail(ticket, err.ui_message());
                Err(err)
            }
        }
    }

    pub async fn search_customers(&mut self, text: &str) -> Result<(), ClientError> {
        self.customers.set_search(text);
        self.fetch_customers(1).await
    }

    pub async fn load_more_customers(&mut self) -> Result<(), ClientError> {
        let next = self.customers.page + 1;
        self.fetch_customers(next).await
    }

    pub async fn add_customer(&mut self, req: &CreateCustomerRequest) -> Result<(), ClientError> {
        self.customers.begin_mutation();
        match self.api.create_customer(req).await {
            Ok(created) => {
                self.customers.apply_created(created);
                Ok(())
            }
            Err(err) => {
                self.customers.fail_mutation(err.ui_message());
                Err(err)
            }
        }
    }

    pub async fn update_customer(
        &mut self,
        id: CustomerId,
        req: &UpdateCustomerRequest,
    ) -> Result<(), ClientError> {
        self.customers.begin_mutation();
        match self.api.update_customer(id, req).await {
            Ok(updated) => {
                self.customers.apply_updated(updated);
                Ok(())
            }
            Err(err) => {
                self.customers.fail_mutation(err.ui_message());
                Err(err)
            }
        }
    }

    /// Delete a customer. The server cascades to its leads, so the local
    /// lead caches are purged to match.
    pub async fn delete_customer(&mut self, id: CustomerId) -> Result<(), ClientError> {
        self.customers.begin_mutation();
        match self.api.delete_customer(id).await {
            Ok(()) => {
                self.customers.apply_deleted(id);
                self.leads.purge_customer(id);
                Ok(())
            }
            Err(err) => {
                self.customers.fail_mutation(err.ui_message());
                Err(err)
            }
        }
    }

    // ------------------------------------------------------------------------
    // Lead intents
    // ------------------------------------------------------------------------

    pub async fn fetch_leads(&mut self, page: u32) -> Result<(), ClientError> {
        let ticket = self.leads.list.begin_fetch();
        let limit = self.leads.list.limit;
        let search = self.leads.list.search.clone();
        let status = self.leads.status_filter;
        match self.api.list_leads(page, limit, &search, status).await {
            Ok(resp) => {
                self.leads
                    .list
                    .apply_page(ticket, resp.leads, resp.total, resp.page, resp.limit);
                Ok(())
            }
            Err(err) => {
                self.leads.list.fail(ticket, err.ui_message());
                Err(err)
            }
        }
    }

    pub async fn search_leads(&mut self, text: &str) -> Result<(), ClientError> {
        self.leads.list.set_search(text);
        self.fetch_leads(1).await
    }

    pub async fn set_lead_status_filter(
        &mut self,
        status: Option<LeadStatus>,
    ) -> Result<(), ClientError> {
        self.leads.set_status_filter(status);
        self.fetch_leads(1).await
    }

    pub async fn load_more_leads(&mut self) -> Result<(), ClientError> {
        let next = self.leads.list.page + 1;
        self.fetch_leads(next).await
    }

    /// Fetch one customer's leads into the association index. Replaces
    /// that customer's bucket wholesale; other buckets and the flat list
    /// are untouched.
    pub async fn fetch_customer_leads(
        &mut self,
        customer_id: CustomerId,
        status: Option<LeadStatus>,
    ) -> Result<Vec<Lead>, ClientError> {
        let leads = self.api.leads_for_customer(customer_id, status).await?;
        self.leads.replace_customer_leads(customer_id, leads.clone());
        Ok(leads)
    }

    pub async fn add_lead(
        &mut self,
        customer_id: CustomerId,
        req: &CreateLeadRequest,
    ) -> Result<(), ClientError> {
        self.leads.list.begin_mutation();
        match self.api.create_lead(customer_id, req).await {
            Ok(created) => {
                self.leads.apply_created(created);
                Ok(())
            }
            Err(err) => {
                self.leads.list.fail_mutation(err.ui_message());
                Err(err)
            }
        }
    }

    pub async fn update_lead(
        &mut self,
        lead_id: LeadId,
        req: &UpdateLeadRequest,
    ) -> Result<(), ClientError> {
        self.leads.list.begin_mutation();
        match self.api.update_lead(lead_id, req).await {
            Ok(updated) => {
                self.leads.apply_updated(updated);
                Ok(())
            }
            Err(err) => {
                self.leads.list.fail_mutation(err.ui_message());
                Err(err)
            }
        }
    }

    pub async fn delete_lead(&mut self, lead_id: LeadId) -> Result<(), ClientError> {
        self.leads.list.begin_mutation();
        match self.api.delete_lead(lead_id).await {
            Ok(()) => {
                self.leads.apply_deleted(lead_id);
                Ok(())
            }
            Err(err) => {
                self.leads.list.fail_mutation(err.ui_message());
                Err(err)
            }
        }
    }

    // ------------------------------------------------------------------------
    // Dashboard intents
    // ------------------------------------------------------------------------

    pub async fn refresh_dashboard(&mut self) -> Result<(), ClientError> {
        self.dashboard.loading = true;
        self.dashboard.error = None;
        match self.api.lead_stats().await {
            Ok(stats) => {
                self.dashboard.loading = false;
                self.dashboard.stats = Some(stats);
                Ok(())
            }
            Err(err) => {
                self.dashboard.loading = false;
                self.dashboard.error = Some(err.ui_message());
                Err(err)
            }
        }
    }
}
