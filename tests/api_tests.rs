//! Router tests for the tenant directory API.

#[path = "test_utils/mod.rs"]
mod test_utils;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::Value;
use tenant_admin::models::TenantUserRole;
use tenant_admin::server::{AppState, create_app};
use test_utils::*;
use tower::ServiceExt;
use uuid::Uuid;

async fn app() -> (Router, AppState) {
    let state = create_test_app_state().await.unwrap();
    (create_app(state.clone()), state)
}

fn authed(uri: &str, user_id: Uuid) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("Authorization", format!("Bearer {TEST_OPERATOR_TOKEN}"))
        .header("X-User-Id", user_id.to_string())
        .body(Body::empty())
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn root_and_health_are_public() {
    let (app, _) = app().await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["service"], "tenant-admin");

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-trace-id"));
    assert_eq!(json_body(response).await["database"], "ok");
}

#[tokio::test]
async fn tenants_without_credentials_is_401() {
    let (app, _) = app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/tenants")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/problem+json"
    );
    let trace_header = response
        .headers()
        .get("x-trace-id")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let body = json_body(response).await;
    assert_eq!(body["code"], "UNAUTHORIZED");
    assert_eq!(body["trace_id"], trace_header);
}

#[tokio::test]
async fn tenants_with_token_but_no_user_is_401() {
    let (app, _) = app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/tenants")
                .header("Authorization", format!("Bearer {TEST_OPERATOR_TOKEN}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn list_tenants_returns_items() {
    let (app, state) = app().await;
    let owner = create_test_user(&state.db, "owner").await.unwrap();
    let tenant = create_test_tenant(&state.db, "Tenant 1").await.unwrap();
    add_member(&state.db, &tenant, &owner, TenantUserRole::Owner)
        .await
        .unwrap();

    let response = app
        .oneshot(authed("/api/v1/tenants", owner.id))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Tenant 1");
    assert_eq!(items[0]["users"][0]["role"], "OWNER");
    assert_eq!(items[0]["users"][0]["status"], "ACTIVE");
    assert_eq!(items[0]["users"][0]["user"]["username"], "owner");
}

#[tokio::test]
async fn list_tenants_empty_directory() {
    let (app, _) = app().await;

    let response = app
        .oneshot(authed("/api/v1/tenants", Uuid::new_v4()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["items"], serde_json::json!([]));
}

#[tokio::test]
async fn get_tenant_by_id() {
    let (app, state) = app().await;
    let tenant = create_test_tenant(&state.db, "Acme").await.unwrap();

    let response = app
        .clone()
        .oneshot(authed(
            &format!("/api/v1/tenants/{}", tenant.id),
            Uuid::new_v4(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["id"], tenant.id.to_string());
    assert_eq!(body["subscription_customer_id"], "cus_test");

    let response = app
        .oneshot(authed(
            &format!("/api/v1/tenants/{}", Uuid::new_v4()),
            Uuid::new_v4(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["code"], "NOT_FOUND");
}

#[tokio::test]
async fn list_tenant_users_with_total() {
    let (app, state) = app().await;
    let tenant = create_test_tenant(&state.db, "Acme").await.unwrap();
    for (name, role) in [("a", TenantUserRole::Owner), ("b", TenantUserRole::Guest)] {
        let user = create_test_user(&state.db, name).await.unwrap();
        add_member(&state.db, &tenant, &user, role).await.unwrap();
    }

    let response = app
        .oneshot(authed(
            &format!("/api/v1/tenants/{}/users", tenant.id),
            Uuid::new_v4(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn my_tenants_lists_callers_memberships() {
    let (app, state) = app().await;
    let me = create_test_user(&state.db, "me").await.unwrap();
    let other = create_test_user(&state.db, "other").await.unwrap();
    let mine = create_test_tenant(&state.db, "Mine").await.unwrap();
    let theirs = create_test_tenant(&state.db, "Theirs").await.unwrap();
    add_member(&state.db, &mine, &me, TenantUserRole::Admin)
        .await
        .unwrap();
    add_member(&state.db, &theirs, &other, TenantUserRole::Owner)
        .await
        .unwrap();

    let response = app
        .oneshot(authed("/api/v1/me/tenants", me.id))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["tenant"]["name"], "Mine");
    assert_eq!(items[0]["role"], "ADMIN");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let (app, _) = app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert!(body["paths"]["/api/v1/tenants"].is_object());
    assert!(body["paths"]["/api/v1/me/tenants"].is_object());
}
