// Models module - card entity and request representations

pub mod card;

pub use card::{Card, CardOwnership, NewCard, ValidationError};
