//! End-to-end tests: a real API server on a loopback port, driven
//! through the full client stack (`CrmApp` -> `ApiClient` -> HTTP).

use std::sync::Arc;

use corral_api::types::{CreateCustomerRequest, CreateLeadRequest, UpdateLeadRequest};
use corral_api::{create_api_router, ApiConfig, AppState, AuthConfig, MemoryStore};
use corral_client::{ClientConfig, CrmApp, MemoryTokenStore, TokenStore};
use corral_core::LeadStatus;

const NOW: i64 = 1_704_067_200;

/// Start an empty API server on an ephemeral port and return its base URL.
async fn spawn_server() -> String {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(store, AuthConfig::for_tests(NOW));
    let router = create_api_router(state, &ApiConfig::default());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback listener");
    let addr = listener.local_addr().expect("listener addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    format!("http://{}", addr)
}

async fn authenticated_app(base_url: &str) -> (CrmApp, Arc<MemoryTokenStore>) {
    let tokens = Arc::new(MemoryTokenStore::new());
    let config = ClientConfig::new(base_url);
    let mut app = CrmApp::new(&config, tokens.clone()).expect("build app");
    app.register("Ada", "ada@example.com", "hunter22")
        .await
        .expect("register");
    (app, tokens)
}

fn customer_req(name: &str, email: &str) -> CreateCustomerRequest {
    CreateCustomerRequest {
        name: Some(name.to_string()),
        email: Some(email.to_string()),
        phone: None,
        company: None,
    }
}

fn lead_req(title: &str, status: LeadStatus, value: f64) -> CreateLeadRequest {
    CreateLeadRequest {
        title: Some(title.to_string()),
        status: Some(status),
        description: Some(format!("{} opportunity", title)),
        value: Some(value),
    }
}

#[tokio::test]
async fn register_stores_token_and_verify_returns_same_user() {
    let base = spawn_server().await;
    let (mut app, tokens) = authenticated_app(&base).await;

    assert!(app.session.is_authenticated());
    assert!(tokens.load().unwrap().is_some());
    let registered = app.session.user.clone().unwrap();

    app.verify_session().await.expect("verify");
    let verified = app.session.user.clone().unwrap();
    assert_eq!(verified.id, registered.id);
    assert_eq!(verified.email, "ada@example.com");
}

#[tokio::test]
async fn login_with_wrong_password_surfaces_server_message() {
    let base = spawn_server().await;
    let (mut app, _tokens) = authenticated_app(&base).await;
    app.logout().expect("logout");

    let err = app
        .login("ada@example.com", "wrong")
        .await
        .expect_err("login must fail");
    assert_eq!(err.status(), Some(401));
    assert_eq!(app.session.error.as_deref(), Some("Invalid email or password"));
    assert!(!app.session.is_authenticated());
}

#[tokio::test]
async fn duplicate_customer_email_is_rejected_with_exact_message() {
    let base = spawn_server().await;
    let (mut app, _tokens) = authenticated_app(&base).await;

    app.add_customer(&customer_req("Acme", "acme@example.com"))
        .await
        .expect("first create");

    let err = app
        .add_customer(&customer_req("Acme Again", "acme@example.com"))
        .await
        .expect_err("duplicate must fail");
    assert_eq!(err.status(), Some(400));
    assert_eq!(
        app.customers.error.as_deref(),
        Some("Customer with this email already exists")
    );
    // Cache holds only the acknowledged create.
    assert_eq!(app.customers.items.len(), 1);
    assert_eq!(app.customers.total, 1);
}

#[tokio::test]
async fn customer_pagination_appends_across_pages() {
    let base = spawn_server().await;
    let (mut app, _tokens) = authenticated_app(&base).await;

    for i in 0..5 {
        app.add_customer(&customer_req(
            &format!("Customer {}", i),
            &format!("c{}@example.com", i),
        ))
        .await
        .expect("create");
    }

    app.customers.limit = 2;
    app.fetch_customers(1).await.expect("page 1");
    assert_eq!(app.customers.items.len(), 2);
    assert_eq!(app.customers.total, 5);

    app.load_more_customers().await.expect("page 2");
    app.load_more_customers().await.expect("page 3");
    assert_eq!(app.customers.items.len(), 5);
    assert_eq!(app.customers.page, 3);

    // Re-fetching a page the cache already holds must not duplicate.
    app.fetch_customers(3).await.expect("page 3 again");
    assert_eq!(app.customers.items.len(), 5);
}

#[tokio::test]
async fn customer_search_filters_and_resets_page() {
    let base = spawn_server().await;
    let (mut app, _tokens) = authenticated_app(&base).await;

    app.add_customer(&customer_req("Globex", "globex@example.com"))
        .await
        .expect("create");
    app.add_customer(&customer_req("Initech", "initech@example.com"))
        .await
        .expect("create");

    app.search_customers("glob").await.expect("search");
    assert_eq!(app.customers.page, 1);
    assert_eq!(app.customers.items.len(), 1);
    assert_eq!(app.customers.items[0].name, "Globex");
    assert_eq!(app.customers.total, 1);
}

#[tokio::test]
async fn lead_status_filter_and_search_narrow_the_flat_list() {
    let base = spawn_server().await;
    let (mut app, _tokens) = authenticated_app(&base).await;

    app.add_customer(&customer_req("Acme", "acme@example.com"))
        .await
        .expect("create customer");
    let customer_id = app.customers.items[0].id;

    app.add_lead(customer_id, &lead_req("Expansion", LeadStatus::New, 1000.0))
        .await
        .expect("lead 1");
    app.add_lead(customer_id, &lead_req("Renewal", LeadStatus::Contacted, 500.0))
        .await
        .expect("lead 2");
    app.add_lead(customer_id, &lead_req("Upsell", LeadStatus::New, 250.0))
        .await
        .expect("lead 3");

    app.set_lead_status_filter(Some(LeadStatus::New))
        .await
        .expect("filter");
    assert_eq!(app.leads.list.items.len(), 2);
    assert!(app
        .leads
        .list
        .items
        .iter()
        .all(|l| l.status == LeadStatus::New));

    app.search_leads("upsell").await.expect("search");
    assert_eq!(app.leads.list.items.len(), 1);
    assert_eq!(app.leads.list.items[0].title, "Upsell");
}

#[tokio::test]
async fn customer_leads_populate_the_association_index() {
    let base = spawn_server().await;
    let (mut app, _tokens) = authenticated_app(&base).await;

    app.add_customer(&customer_req("Acme", "acme@example.com"))
        .await
        .expect("create customer");
    let customer_id = app.customers.items[0].id;
    app.add_lead(customer_id, &lead_req("Expansion", LeadStatus::New, 1000.0))
        .await
        .expect("lead");

    let leads = app
        .fetch_customer_leads(customer_id, None)
        .await
        .expect("customer leads");
    assert_eq!(leads.len(), 1);
    assert_eq!(app.leads.by_customer[&customer_id].len(), 1);

    // Updating through the flat path also updates the bucket.
    let lead_id = leads[0].id;
    app.update_lead(
        lead_id,
        &UpdateLeadRequest {
            status: Some(LeadStatus::Converted),
            ..Default::default()
        },
    )
    .await
    .expect("update lead");
    assert_eq!(
        app.leads.by_customer[&customer_id][0].status,
        LeadStatus::Converted
    );
}

#[tokio::test]
async fn deleting_a_customer_cascades_on_server_and_client() {
    let base = spawn_server().await;
    let (mut app, _tokens) = authenticated_app(&base).await;

    app.add_customer(&customer_req("Acme", "acme@example.com"))
        .await
        .expect("create customer");
    let customer_id = app.customers.items[0].id;
    app.add_lead(customer_id, &lead_req("Expansion", LeadStatus::New, 1000.0))
        .await
        .expect("lead");
    app.fetch_customer_leads(customer_id, None)
        .await
        .expect("customer leads");

    app.delete_customer(customer_id).await.expect("delete");
    assert!(app.customers.items.is_empty());
    assert!(!app.leads.by_customer.contains_key(&customer_id));
    assert!(app.leads.list.items.is_empty());

    // Server side agrees: the flat lead listing is empty too.
    app.fetch_leads(1).await.expect("fetch leads");
    assert!(app.leads.list.items.is_empty());
    assert_eq!(app.leads.list.total, 0);
}

#[tokio::test]
async fn dashboard_stats_aggregate_by_status_and_value() {
    let base = spawn_server().await;
    let (mut app, _tokens) = authenticated_app(&base).await;

    app.add_customer(&customer_req("Acme", "acme@example.com"))
        .await
        .expect("create customer");
    let customer_id = app.customers.items[0].id;
    app.add_lead(customer_id, &lead_req("Expansion", LeadStatus::New, 1000.0))
        .await
        .expect("lead 1");
    app.add_lead(customer_id, &lead_req("Renewal", LeadStatus::New, 500.0))
        .await
        .expect("lead 2");

    app.refresh_dashboard().await.expect("stats");
    let stats = app.dashboard.stats.clone().unwrap();
    assert_eq!(stats.by_status.get(&LeadStatus::New), Some(&2));
    assert!((stats.total_value - 1500.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn unauthorized_request_evicts_the_stored_token_once() {
    let base = spawn_server().await;
    let tokens = Arc::new(MemoryTokenStore::new());
    tokens.save("not-a-real-token").expect("seed bogus token");

    let config = ClientConfig::new(&base);
    let mut app = CrmApp::new(&config, tokens.clone()).expect("build app");

    let err = app.fetch_customers(1).await.expect_err("must be rejected");
    assert_eq!(err.status(), Some(401));
    assert_eq!(app.customers.error.as_deref(), Some("Token is invalid"));
    // The bogus token is gone; the next request goes out unauthenticated.
    assert_eq!(tokens.load().unwrap(), None);

    let err = app.fetch_customers(1).await.expect_err("still rejected");
    assert_eq!(err.status(), Some(401));
    assert_eq!(app.customers.error.as_deref(), Some("No token provided"));
}

#[tokio::test]
async fn logout_clears_token_and_caches() {
    let base = spawn_server().await;
    let (mut app, tokens) = authenticated_app(&base).await;

    app.add_customer(&customer_req("Acme", "acme@example.com"))
        .await
        .expect("create");
    assert!(!app.customers.items.is_empty());

    app.logout().expect("logout");
    assert_eq!(tokens.load().unwrap(), None);
    assert!(!app.session.is_authenticated());
    assert!(app.customers.items.is_empty());
    assert!(app.leads.list.items.is_empty());

    let err = app.fetch_customers(1).await.expect_err("unauthenticated");
    assert_eq!(err.status(), Some(401));
}
