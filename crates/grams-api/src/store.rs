use anyhow::Result;
use tracing::warn;
use uuid::Uuid;

use grams_db::Database;
use grams_db::models::GramRow;
use grams_types::models::Gram;

use crate::validation::GramChanges;

/// Persistence seam for the controller: CRUD over grams by id.
///
/// Each call is expected to be atomic for the single row it touches.
pub trait GramStore: Send + Sync {
    fn all(&self) -> Result<Vec<Gram>>;

    /// Look up by the raw id from the request. Ids that are not valid
    /// UUIDs simply do not match.
    fn find(&self, id: &str) -> Result<Option<Gram>>;

    fn insert(&self, owner_id: Uuid, changes: &GramChanges) -> Result<Gram>;

    /// Owner is never touched; `changes.picture == None` keeps the stored
    /// picture. Returns `None` if the gram disappeared since it was looked up.
    fn update(&self, id: Uuid, changes: &GramChanges) -> Result<Option<Gram>>;

    fn delete(&self, id: Uuid) -> Result<bool>;
}

impl GramStore for Database {
    fn all(&self) -> Result<Vec<Gram>> {
        Ok(self.list_grams()?.into_iter().map(gram_from_row).collect())
    }

    fn find(&self, id: &str) -> Result<Option<Gram>> {
        Ok(self.get_gram(id)?.map(gram_from_row))
    }

    fn insert(&self, owner_id: Uuid, changes: &GramChanges) -> Result<Gram> {
        let id = Uuid::new_v4();
        let row = self.insert_gram(
            &id.to_string(),
            &owner_id.to_string(),
            &changes.message,
            changes.picture.as_deref(),
        )?;
        Ok(gram_from_row(row))
    }

    fn update(&self, id: Uuid, changes: &GramChanges) -> Result<Option<Gram>> {
        let row = self.update_gram(&id.to_string(), &changes.message, changes.picture.as_deref())?;
        Ok(row.map(gram_from_row))
    }

    fn delete(&self, id: Uuid) -> Result<bool> {
        self.delete_gram(&id.to_string())
    }
}

fn gram_from_row(row: GramRow) -> Gram {
    Gram {
        id: row.id.parse().unwrap_or_else(|e| {
            warn!("Corrupt gram id '{}': {}", row.id, e);
            Uuid::default()
        }),
        owner_id: row.owner_id.parse().unwrap_or_else(|e| {
            warn!("Corrupt owner_id '{}' on gram '{}': {}", row.owner_id, row.id, e);
            Uuid::default()
        }),
        created_at: parse_timestamp(&row.created_at, &row.id),
        updated_at: parse_timestamp(&row.updated_at, &row.id),
        message: row.message,
        picture: row.picture,
    }
}

fn parse_timestamp(raw: &str, gram_id: &str) -> chrono::DateTime<chrono::Utc> {
    raw.parse::<chrono::DateTime<chrono::Utc>>()
        .or_else(|_| {
            // SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}' on gram '{}': {}", raw, gram_id, e);
            chrono::DateTime::default()
        })
}
