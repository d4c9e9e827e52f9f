use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use crate::api::AppState;
use crate::error::Result;
use crate::store::CardStore;

#[derive(Debug, Serialize)]
pub struct VerificationResponse {
    pub verified: bool,
    pub card_id: Uuid,
    pub email: String,
}

/// `GET /verify/:token` confirms that a token belongs to an active card
async fn verify_token(
    State(store): State<CardStore>,
    Path(token): Path<String>,
) -> Result<Json<VerificationResponse>> {
    let ownership = store.find_by_token(&token).await?;

    tracing::info!(card_id = %ownership.card_id, "Token verified");

    Ok(Json(VerificationResponse {
        verified: true,
        card_id: ownership.card_id,
        email: ownership.email,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/verify/:token", get(verify_token))
}
