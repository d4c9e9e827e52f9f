use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use crate::api::AppState;
use crate::error::{AppError, Result};
use crate::models::{Card, NewCard};
use crate::store::{CardStore, StoreError};

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// `POST /cards`
async fn create_card(
    State(store): State<CardStore>,
    payload: std::result::Result<Json<NewCard>, JsonRejection>,
) -> Result<(StatusCode, Json<Card>)> {
    let Json(data) = payload?;

    let card = store.create(data).await.map_err(|e| {
        tracing::debug!(error = %e, "Rejected card creation");
        AppError::from(e)
    })?;

    tracing::info!(card_id = %card.id, expires_at = %card.expires_at, "Card created");

    Ok((StatusCode::CREATED, Json(card)))
}

/// `GET /cards`
async fn list_cards(State(store): State<CardStore>) -> Json<Vec<Card>> {
    Json(store.list_active().await)
}

/// Accepts only the lowercase hyphenated form that cards are issued with
fn parse_card_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw)
        .ok()
        .filter(|id| id.hyphenated().to_string() == raw)
}

/// `GET /cards/:id`
async fn get_card(State(store): State<CardStore>, Path(id): Path<String>) -> Result<Json<Card>> {
    let id = parse_card_id(&id).ok_or(StoreError::CardNotFound)?;

    Ok(Json(store.get(id).await?))
}

/// `DELETE /cards/:id/:token`
async fn delete_card(
    State(store): State<CardStore>,
    Path((id, token)): Path<(String, String)>,
) -> Result<Json<MessageResponse>> {
    let result = match parse_card_id(&id) {
        Some(id) => store.delete(id, &token).await,
        None => Err(StoreError::Unauthorized),
    };

    if let Err(e) = result {
        tracing::warn!(card_id = %id, "Card deletion refused");
        return Err(e.into());
    }

    tracing::info!(card_id = %id, "Card deleted");

    Ok(Json(MessageResponse {
        message: "Card deleted successfully".to_string(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cards", get(list_cards).post(create_card))
        .route("/cards/:id", get(get_card))
        .route("/cards/:id/:token", delete(delete_card))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_card_id_requires_issued_form() {
        let id = Uuid::new_v4();
        let issued = id.to_string();

        assert_eq!(parse_card_id(&issued), Some(id));
        assert_eq!(parse_card_id(&issued.to_uppercase()), None);
        assert_eq!(parse_card_id(&id.simple().to_string()), None);
        assert_eq!(parse_card_id(&id.braced().to_string()), None);
        assert_eq!(parse_card_id(&id.urn().to_string()), None);
        assert_eq!(parse_card_id("invalid-id"), None);
    }
}
