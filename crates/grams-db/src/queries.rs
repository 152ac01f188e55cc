use crate::models::{GramRow, UserRow};
use crate::Database;
use anyhow::Result;
use rusqlite::Connection;

const GRAM_COLUMNS: &str = "id, owner_id, message, picture, created_at, updated_at";

impl Database {
    // -- Users --

    /// Returns `false` without writing anything if the username is taken.
    pub fn create_user(&self, id: &str, username: &str, password_hash: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (id, username, password) VALUES (?1, ?2, ?3)
                 ON CONFLICT(username) DO NOTHING",
                (id, username, password_hash),
            )?;
            Ok(inserted == 1)
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username", username))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    // -- Grams --

    pub fn insert_gram(
        &self,
        id: &str,
        owner_id: &str,
        message: &str,
        picture: Option<&[u8]>,
    ) -> Result<GramRow> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO grams (id, owner_id, message, picture) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![id, owner_id, message, picture],
            )?;
            query_gram(conn, id)?
                .ok_or_else(|| anyhow::anyhow!("Gram vanished after insert: {}", id))
        })
    }

    pub fn get_gram(&self, id: &str) -> Result<Option<GramRow>> {
        self.with_conn(|conn| query_gram(conn, id))
    }

    /// All grams, newest first.
    pub fn list_grams(&self) -> Result<Vec<GramRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM grams ORDER BY created_at DESC, rowid DESC",
                GRAM_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], map_gram_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn count_grams(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM grams", [], |row| row.get(0))?;
            Ok(count as u64)
        })
    }

    /// Rewrites the message, and the picture only when one is given.
    /// The owner column is never touched. Returns `None` if the gram no
    /// longer exists.
    pub fn update_gram(
        &self,
        id: &str,
        message: &str,
        picture: Option<&[u8]>,
    ) -> Result<Option<GramRow>> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE grams
                 SET message = ?2, picture = COALESCE(?3, picture), updated_at = datetime('now')
                 WHERE id = ?1",
                rusqlite::params![id, message, picture],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_gram(conn, id)
        })
    }

    /// Returns whether a row was deleted.
    pub fn delete_gram(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let deleted = conn.execute("DELETE FROM grams WHERE id = ?1", [id])?;
            Ok(deleted > 0)
        })
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    let sql = format!(
        "SELECT id, username, password, created_at FROM users WHERE {} = ?1",
        column
    );
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt
        .query_row([value], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                password: row.get(2)?,
                created_at: row.get(3)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_gram(conn: &Connection, id: &str) -> Result<Option<GramRow>> {
    let sql = format!("SELECT {} FROM grams WHERE id = ?1", GRAM_COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let row = stmt.query_row([id], map_gram_row).optional()?;
    Ok(row)
}

fn map_gram_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<GramRow> {
    Ok(GramRow {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        message: row.get(2)?,
        picture: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
