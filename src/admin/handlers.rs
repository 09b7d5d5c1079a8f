use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::http::server::AppState;
use crate::settings::{
    EditError, GlobalSettings, Merchant, MerchantDraft, MerchantEditError, MerchantUpdate,
};

/// A merchant together with its table key.
#[derive(Debug, Serialize)]
pub struct MerchantView {
    pub key: String,
    #[serde(flatten)]
    pub merchant: Merchant,
}

impl From<&Merchant> for MerchantView {
    fn from(merchant: &Merchant) -> Self {
        Self {
            key: merchant.key.clone(),
            merchant: merchant.clone(),
        }
    }
}

/// Edit failures mapped onto HTTP statuses.
#[derive(Debug)]
pub struct AdminError(EditError);

impl From<EditError> for AdminError {
    fn from(err: EditError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            EditError::Rejected(MerchantEditError::UnknownMerchant(_)) => StatusCode::NOT_FOUND,
            EditError::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            EditError::Persist(e) => {
                tracing::error!(error = %e, "Failed to persist affiliate settings");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

pub async fn get_settings(State(state): State<AppState>) -> Json<GlobalSettings> {
    Json(GlobalSettings::clone(&state.settings.load()))
}

pub async fn put_settings(
    State(state): State<AppState>,
    Json(settings): Json<GlobalSettings>,
) -> Result<Json<GlobalSettings>, AdminError> {
    let saved = state.settings.edit(state.store.as_ref(), move |current| {
        *current = settings;
        Ok(current.clone())
    })?;

    tracing::info!(merchants = saved.merchants.len(), "Affiliate settings replaced");
    Ok(Json(saved))
}

pub async fn add_merchant(
    State(state): State<AppState>,
    Json(draft): Json<MerchantDraft>,
) -> Result<(StatusCode, Json<MerchantView>), AdminError> {
    let view = state.settings.edit(state.store.as_ref(), |settings| {
        settings.add_merchant(draft).map(MerchantView::from)
    })?;

    tracing::info!(merchant = %view.key, "Merchant added");
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn update_merchant(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(update): Json<MerchantUpdate>,
) -> Result<Json<MerchantView>, AdminError> {
    let view = state.settings.edit(state.store.as_ref(), |settings| {
        settings.update_merchant(&key, update).map(MerchantView::from)
    })?;

    tracing::info!(merchant = %view.key, enabled = view.merchant.enabled, "Merchant updated");
    Ok(Json(view))
}
