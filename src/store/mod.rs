use chrono::{DateTime, Utc};
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Card, CardOwnership, NewCard, ValidationError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Card not found or expired")]
    CardNotFound,

    #[error("Token not found or invalid")]
    TokenNotFound,

    /// Wrong token and unknown id are reported the same way
    #[error("Unauthorized: invalid token")]
    Unauthorized,
}

/// In-memory card store.
///
/// Expired cards are hidden from every read but stay in the map until they
/// are deleted by their owner or removed by [`CardStore::evict_expired`].
/// Cloning the store yields another handle to the same records.
#[derive(Debug, Clone, Default)]
pub struct CardStore {
    cards: Arc<RwLock<HashMap<Uuid, Card>>>,
}

impl CardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and stores a new card, returning it with its token
    pub async fn create(&self, data: NewCard) -> Result<Card, StoreError> {
        self.create_at(data, Utc::now()).await
    }

    pub async fn create_at(&self, data: NewCard, now: DateTime<Utc>) -> Result<Card, StoreError> {
        data.validate()?;

        let card = Card::issue(data, now);
        self.cards.write().await.insert(card.id, card.clone());

        Ok(card)
    }

    /// Lists every card that has not expired yet, in no particular order
    pub async fn list_active(&self) -> Vec<Card> {
        self.list_active_at(Utc::now()).await
    }

    pub async fn list_active_at(&self, now: DateTime<Utc>) -> Vec<Card> {
        self.cards
            .read()
            .await
            .values()
            .filter(|card| card.is_active_at(now))
            .cloned()
            .collect()
    }

    pub async fn get(&self, id: Uuid) -> Result<Card, StoreError> {
        self.get_at(id, Utc::now()).await
    }

    pub async fn get_at(&self, id: Uuid, now: DateTime<Utc>) -> Result<Card, StoreError> {
        self.cards
            .read()
            .await
            .get(&id)
            .filter(|card| card.is_active_at(now))
            .cloned()
            .ok_or(StoreError::CardNotFound)
    }

    /// Removes a card if `token` matches. Expiry is not checked, so owners can
    /// still delete cards that are no longer listed.
    pub async fn delete(&self, id: Uuid, token: &str) -> Result<(), StoreError> {
        let mut cards = self.cards.write().await;

        match cards.get(&id) {
            Some(card) if card.token == token => {
                cards.remove(&id);
                Ok(())
            }
            _ => Err(StoreError::Unauthorized),
        }
    }

    /// Looks up the active card issued with `token`
    pub async fn find_by_token(&self, token: &str) -> Result<CardOwnership, StoreError> {
        self.find_by_token_at(token, Utc::now()).await
    }

    pub async fn find_by_token_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<CardOwnership, StoreError> {
        self.cards
            .read()
            .await
            .values()
            .find(|card| card.token == token && card.is_active_at(now))
            .map(Card::ownership)
            .ok_or(StoreError::TokenNotFound)
    }

    /// Drops expired records and returns how many were removed
    pub async fn evict_expired(&self) -> usize {
        self.evict_expired_at(Utc::now()).await
    }

    pub async fn evict_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut cards = self.cards.write().await;
        let before = cards.len();
        cards.retain(|_, card| card.is_active_at(now));
        before - cards.len()
    }

    /// Number of stored records, expired ones included
    pub async fn len(&self) -> usize {
        self.cards.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cards.read().await.is_empty()
    }
}
