//! Cached mint keysets.

use std::str::FromStr;

use cashu_types::{Keyset, KeysetId};
use rusqlite::{Connection, OptionalExtension};

use crate::{to_i64, DbError, Result};

/// Store a keyset. Returns `false` if the id was already stored; keysets
/// are immutable so the existing row is kept.
///
/// # Errors
///
/// [`DbError::Constraint`] if the keyset's id does not match its keys.
pub fn insert_keyset(
    conn: &Connection,
    mint_url: &str,
    keyset: &Keyset,
    added_at: u64,
) -> Result<bool> {
    if !keyset.validate() {
        return Err(DbError::Constraint(format!("keyset {} does not match its keys", keyset.id)));
    }
    let json = serde_json::to_string(keyset).map_err(|e| DbError::Serialization(e.to_string()))?;
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO keysets (id, mint_url, unit, keyset_json, added_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            keyset.id.to_string(),
            mint_url,
            keyset.unit.as_str(),
            json,
            to_i64(added_at, "added_at")?,
        ],
    )?;
    if inserted > 0 {
        tracing::info!(keyset_id = %keyset.id, mint_url, unit = %keyset.unit, "keyset cached");
    }
    Ok(inserted > 0)
}

fn decode(json: &str) -> Result<Keyset> {
    let keyset: Keyset =
        serde_json::from_str(json).map_err(|e| DbError::Serialization(e.to_string()))?;
    if !keyset.validate() {
        return Err(DbError::Serialization(format!("stored keyset {} is corrupt", keyset.id)));
    }
    Ok(keyset)
}

pub fn get_keyset(conn: &Connection, id: &KeysetId) -> Result<Keyset> {
    let json: String = conn
        .query_row(
            "SELECT keyset_json FROM keysets WHERE id = ?1",
            [id.to_string()],
            |row| row.get(0),
        )
        .optional()?
        .ok_or_else(|| DbError::NotFound(format!("keyset {id}")))?;
    decode(&json)
}

/// Keysets of one mint, oldest first.
pub fn list_keysets(conn: &Connection, mint_url: &str) -> Result<Vec<Keyset>> {
    let mut stmt = conn.prepare(
        "SELECT keyset_json FROM keysets WHERE mint_url = ?1 ORDER BY added_at, rowid",
    )?;
    let rows = stmt
        .query_map([mint_url], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    rows.iter().map(|json| decode(json)).collect()
}

/// Ids of every cached keyset.
pub fn keyset_ids(conn: &Connection) -> Result<Vec<KeysetId>> {
    let mut stmt = conn.prepare("SELECT id FROM keysets ORDER BY id")?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    rows.iter()
        .map(|id| KeysetId::from_str(id).map_err(|e| DbError::Serialization(e.to_string())))
        .collect()
}
