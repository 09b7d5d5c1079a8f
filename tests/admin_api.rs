//! Admin settings API tests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};

use affiliate_redirect::settings::{
    FileSettingsStore, GlobalSettings, MemorySettingsStore, SettingsHandle, SettingsStore,
    SETTINGS_KEY,
};

mod common;

fn admin_request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", common::API_KEY));

    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: axum::http::Response<Body>) -> Value {
    serde_json::from_str(&common::body_string(response).await).unwrap()
}

#[tokio::test]
async fn test_requires_bearer_key() {
    let app = common::build_app(
        Arc::new(MemorySettingsStore::new()),
        SettingsHandle::new(common::sample_settings()),
    );

    let missing = Request::builder().uri("/admin/settings").body(Body::empty()).unwrap();
    assert_eq!(common::send(&app, missing).await.status(), StatusCode::UNAUTHORIZED);

    let wrong = Request::builder()
        .uri("/admin/settings")
        .header(header::AUTHORIZATION, "Bearer wrong")
        .body(Body::empty())
        .unwrap();
    assert_eq!(common::send(&app, wrong).await.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_get_settings() {
    let app = common::build_app(
        Arc::new(MemorySettingsStore::new()),
        SettingsHandle::new(common::sample_settings()),
    );

    let response = common::send(&app, admin_request(Method::GET, "/admin/settings", None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["affiliate_id"], "999");
    assert_eq!(body["merchants"]["coolblue"]["network_merchant_id"], "12345");
    assert_eq!(body["merchants"]["bol"]["enabled"], false);
}

#[tokio::test]
async fn test_put_settings_replaces_and_persists() {
    let store = Arc::new(MemorySettingsStore::new());
    let handle = SettingsHandle::new(common::sample_settings());
    let app = common::build_app(store.clone(), handle.clone());

    let record = json!({
        "awinaffid": "555",
        "merchants": {
            "coolblue": {
                "name": "Coolblue",
                "awinmid": "777",
                "domains": ["WWW.Coolblue.NL"],
                "enabled": true
            }
        }
    });
    let response = common::send(&app, admin_request(Method::PUT, "/admin/settings", Some(record))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let current = handle.load();
    assert_eq!(current.affiliate_id, "555");
    assert_eq!(current.merchants.len(), 1);
    assert_eq!(current.merchants.get("coolblue").unwrap().domains, vec!["coolblue.nl"]);
    assert_eq!(store.load(SETTINGS_KEY).unwrap().as_ref(), Some(&*current));

    let response = common::send(&app, Request::builder().uri("/deal").body(Body::empty()).unwrap()).await;
    let body = common::body_string(response).await;
    assert!(body.contains("awinmid=777&amp;awinaffid=555"));
}

#[tokio::test]
async fn test_add_and_update_merchant() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileSettingsStore::new(dir.path()));
    let handle = SettingsHandle::new(GlobalSettings::default_record());
    let app = common::build_app(store.clone(), handle.clone());

    let draft = json!({
        "name": "Example Shop",
        "network_merchant_id": "4242",
        "domains": ["example.org", "www.example.org"]
    });
    let response = common::send(&app, admin_request(Method::POST, "/admin/merchants", Some(draft))).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = json_body(response).await;
    assert_eq!(body["key"], "example-shop");
    assert_eq!(body["enabled"], true);
    assert_eq!(body["domains"], json!(["example.org"]));

    let response = common::send(&app, Request::builder().uri("/other").body(Body::empty()).unwrap()).await;
    assert_eq!(response.status(), StatusCode::OK);

    let update = json!({ "enabled": false, "domains": "example.org\nWWW.Shop.Example.org" });
    let response = common::send(
        &app,
        admin_request(Method::PATCH, "/admin/merchants/example-shop", Some(update)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let persisted = store.load(SETTINGS_KEY).unwrap().unwrap();
    let merchant = persisted.merchants.get("example-shop").unwrap();
    assert!(!merchant.enabled);
    assert_eq!(merchant.domains, vec!["example.org", "shop.example.org"]);

    let response = common::send(&app, Request::builder().uri("/other").body(Body::empty()).unwrap()).await;
    assert_eq!(response.status(), StatusCode::FOUND);
}

#[tokio::test]
async fn test_rejected_edits() {
    let app = common::build_app(
        Arc::new(MemorySettingsStore::new()),
        SettingsHandle::new(common::sample_settings()),
    );

    let draft = json!({ "name": "No Id" });
    let response = common::send(&app, admin_request(Method::POST, "/admin/merchants", Some(draft))).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json_body(response).await["error"], "network merchant id is required");

    let response = common::send(
        &app,
        admin_request(Method::PATCH, "/admin/merchants/missing", Some(json!({}))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
