use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An authenticated user as seen by the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub username: String,
}

/// A posted message with an optional picture.
///
/// `owner_id` is set when the gram is created and never rewritten.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gram {
    pub id: Uuid,
    pub message: String,
    #[serde(skip)]
    pub picture: Option<Vec<u8>>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Gram {
    pub fn has_picture(&self) -> bool {
        self.picture.is_some()
    }
}
