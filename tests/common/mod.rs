//! Shared utilities for integration tests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use tower::ServiceExt;

use affiliate_redirect::config::ServiceConfig;
use affiliate_redirect::http::HttpServer;
use affiliate_redirect::settings::{GlobalSettings, Merchant, SettingsHandle, SettingsStore};

pub const API_KEY: &str = "test-admin-key";

/// Settings with one enabled and one disabled merchant.
pub fn sample_settings() -> GlobalSettings {
    GlobalSettings {
        affiliate_id: "999".into(),
        merchants: [
            Merchant::new("coolblue", "Coolblue", "12345")
                .with_domains(["coolblue.nl", "coolblue.be"])
                .with_campaign("launch"),
            Merchant::new("bol", "Bol", "7").with_domains(["bol.com"]).disabled(),
        ]
        .into_iter()
        .collect(),
        ..GlobalSettings::default()
    }
}

/// Config with a handful of short links and the admin API enabled.
pub fn sample_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.admin.enabled = true;
    config.admin.api_key = API_KEY.into();
    for (code, destination) in [
        ("deal", "https://www.coolblue.nl/product/123?campaign=summer&clickref=abc"),
        ("be", "https://coolblue.be/"),
        ("mixed", "https://WWW.CoolBlue.NL/Acties/../Deal?clickref=x"),
        ("bol", "https://www.bol.com/nl/p/1"),
        ("other", "https://example.org/page?x=1"),
    ] {
        config.links.insert(code.into(), destination.into());
    }
    config
}

pub fn build_app(store: Arc<dyn SettingsStore>, settings: SettingsHandle) -> Router {
    HttpServer::new(sample_config(), store, settings).router()
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
