use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// How long a card stays visible after creation.
pub const CARD_TTL_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: Uuid,
    pub token: String,
    pub subject: String,
    pub purpose: String,
    pub year: i64,
    pub message: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Client-supplied fields for a new card
#[derive(Debug, Clone, Deserialize)]
pub struct NewCard {
    pub subject: String,
    pub purpose: String,
    pub year: i64,
    pub message: String,
    pub email: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    #[error("Invalid email format")]
    InvalidEmail,
}

/// Result of a token lookup, used to confirm email ownership
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardOwnership {
    pub card_id: Uuid,
    pub email: String,
}

impl NewCard {
    /// Checks required fields and the email shape
    pub fn validate(&self) -> Result<(), ValidationError> {
        let required = [
            ("subject", &self.subject),
            ("purpose", &self.purpose),
            ("message", &self.message),
            ("email", &self.email),
        ];

        for (field, value) in required {
            if value.is_empty() {
                return Err(ValidationError::EmptyField(field));
            }
        }

        if !self.email.contains('@') {
            return Err(ValidationError::InvalidEmail);
        }

        Ok(())
    }
}

impl Card {
    /// Builds a card with fresh identifiers, stamped at `now`
    pub fn issue(data: NewCard, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            token: Uuid::new_v4().to_string(),
            subject: data.subject,
            purpose: data.purpose,
            year: data.year,
            message: data.message,
            email: data.email,
            created_at: now,
            expires_at: now + Duration::days(CARD_TTL_DAYS),
        }
    }

    /// A card is active strictly before its expiry instant
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    pub fn ownership(&self) -> CardOwnership {
        CardOwnership {
            card_id: self.id,
            email: self.email.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_card(email: &str) -> NewCard {
        NewCard {
            subject: "Math Tutoring".to_string(),
            purpose: "help".to_string(),
            year: 2,
            message: "Available for tutoring".to_string(),
            email: email.to_string(),
        }
    }

    #[test]
    fn test_issue_sets_seven_day_expiry() {
        let now = Utc::now();
        let card = Card::issue(new_card("student@example.com"), now);

        assert_eq!(card.created_at, now);
        assert_eq!(card.expires_at - card.created_at, Duration::days(7));
        assert_eq!(card.subject, "Math Tutoring");
        assert_eq!(card.year, 2);
    }

    #[test]
    fn test_issue_generates_distinct_identifiers() {
        let now = Utc::now();
        let first = Card::issue(new_card("a@b.com"), now);
        let second = Card::issue(new_card("a@b.com"), now);

        assert_ne!(first.id, second.id);
        assert_ne!(first.token, second.token);
    }

    #[test]
    fn test_is_active_boundary() {
        let now = Utc::now();
        let card = Card::issue(new_card("a@b.com"), now);

        assert!(card.is_active_at(now));
        assert!(card.is_active_at(card.expires_at - Duration::milliseconds(1)));
        // Expiry instant itself is no longer active
        assert!(!card.is_active_at(card.expires_at));
    }

    #[test]
    fn test_validate_rejects_email_without_at() {
        let result = new_card("not-an-email").validate();
        assert_eq!(result, Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn test_validate_rejects_empty_fields() {
        let mut data = new_card("a@b.com");
        data.subject = String::new();

        assert_eq!(data.validate(), Err(ValidationError::EmptyField("subject")));
    }

    #[test]
    fn test_validate_accepts_whitespace_only_text() {
        let mut data = new_card("a@b.com");
        data.subject = "   ".to_string();
        data.message = " ".to_string();

        assert!(data.validate().is_ok());
    }

    #[test]
    fn test_issue_keeps_year_beyond_i32_range() {
        let mut data = new_card("a@b.com");
        data.year = 3_000_000_000;
        let card = Card::issue(data, Utc::now());

        assert_eq!(card.year, 3_000_000_000);
        assert_eq!(serde_json::to_value(&card).unwrap()["year"], 3_000_000_000_i64);
    }

    #[test]
    fn test_validate_accepts_minimal_email() {
        assert!(new_card("a@b").validate().is_ok());
    }

    #[test]
    fn test_card_serializes_token_and_timestamps() {
        let card = Card::issue(new_card("a@b.com"), Utc::now());
        let json = serde_json::to_value(&card).unwrap();

        assert_eq!(json["token"], card.token);
        assert_eq!(json["id"], card.id.to_string());
        assert!(json["created_at"].is_string());
        assert!(json["expires_at"].is_string());
    }
}
