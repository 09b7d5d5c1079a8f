//! Admin settings API.
//!
//! # Routes
//! - `GET /admin/settings`: current settings record
//! - `PUT /admin/settings`: replace the whole record
//! - `POST /admin/merchants`: add a merchant from a draft
//! - `PATCH /admin/merchants/{key}`: update one merchant
//!
//! Every route requires `Authorization: Bearer <admin.api_key>`.

pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::http::server::AppState;

pub fn setup_admin_router(state: AppState) -> Router {
    Router::new()
        .route("/admin/settings", get(get_settings).put(put_settings))
        .route("/admin/merchants", post(add_merchant))
        .route("/admin/merchants/{key}", patch(update_merchant))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}
