mod common;

use axum::middleware;
use axum::routing::get;
use axum::Router;
use common::TestApp;
use identity_service::domain::account::models::Role;
use identity_service::inbound::http::middleware::authenticate;
use identity_service::inbound::http::middleware::require_roles;
use serde_json::Value;

/// An admin-only route wired the way a real protected surface would be:
/// authentication first, then the role gate.
fn admin_routes(state: identity_service::inbound::http::router::AppState) -> Router {
    Router::new()
        .route("/api/admin/ping", get(|| async { "pong" }))
        .route_layer(middleware::from_fn(require_roles(&[Role::Admin])))
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate))
        .with_state(state)
}

async fn spawn_with_admin_route() -> TestApp {
    // spawn_with rebuilds state internally; mount the extra route through the
    // same builder so it shares the service.
    TestApp::spawn_with_extra(admin_routes).await
}

async fn access_token_for(app: &TestApp, email: &str, role: &str) -> String {
    app.register_and_verify(email, "password123", role).await;
    let response = app.login(email, "password123").await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    body["accessToken"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_admin_route_rejects_unauthenticated_requests() {
    let app = spawn_with_admin_route().await;

    let response = app
        .client
        .get(format!("{}/api/admin/ping", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_admin_route_rejects_other_roles() {
    let app = spawn_with_admin_route().await;
    let token = access_token_for(&app, "member@example.com", "member").await;

    let response = app
        .client
        .get(format!("{}/api/admin/ping", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 403);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Forbidden: insufficient permissions");
}

#[tokio::test]
async fn test_admin_route_allows_admins() {
    let app = spawn_with_admin_route().await;
    let token = access_token_for(&app, "admin@example.com", "admin").await;

    let response = app
        .client
        .get(format!("{}/api/admin/ping", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "pong");
}
