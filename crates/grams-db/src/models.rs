//! Database row types — these map directly to SQLite rows.
//! Distinct from grams-types API models to keep the DB layer independent.

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub password: String,
    pub created_at: String,
}

pub struct GramRow {
    pub id: String,
    pub owner_id: String,
    pub message: String,
    pub picture: Option<Vec<u8>>,
    pub created_at: String,
    pub updated_at: String,
}
