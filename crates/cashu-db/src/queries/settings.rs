//! Wallet preferences.

use std::str::FromStr;

use cashu_types::{CurrencyUnit, TokenVersion};
use rusqlite::Connection;

use crate::{DbError, Result};

pub fn get(conn: &Connection, key: &str) -> Result<String> {
    conn.query_row("SELECT value FROM settings WHERE key = ?1", [key], |row| row.get(0))
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => DbError::NotFound(format!("setting '{key}'")),
            other => DbError::Sqlite(other),
        })
}

pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
        rusqlite::params![key, value],
    )?;
    Ok(())
}

/// Unit used when a token carries none.
pub fn default_unit(conn: &Connection) -> Result<CurrencyUnit> {
    match get(conn, "default_unit") {
        Ok(v) => CurrencyUnit::from_str(&v).map_err(|e| DbError::Serialization(e.to_string())),
        Err(DbError::NotFound(_)) => Ok(CurrencyUnit::default()),
        Err(e) => Err(e),
    }
}

/// Wire version used for outgoing tokens, stored as its marker character.
pub fn token_version(conn: &Connection) -> Result<TokenVersion> {
    let value = match get(conn, "token_version") {
        Ok(v) => v,
        Err(DbError::NotFound(_)) => return Ok(TokenVersion::V2),
        Err(e) => return Err(e),
    };
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(marker), None) => {
            TokenVersion::from_marker(marker).map_err(|e| DbError::Serialization(e.to_string()))
        }
        _ => Err(DbError::Serialization(format!("invalid token version '{value}'"))),
    }
}

pub fn set_token_version(conn: &Connection, version: TokenVersion) -> Result<()> {
    set(conn, "token_version", &version.marker().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Connection {
        crate::open_memory().expect("open test db")
    }

    #[test]
    fn test_defaults() {
        let conn = test_db();
        assert_eq!(default_unit(&conn).expect("unit"), CurrencyUnit::Sat);
        assert_eq!(token_version(&conn).expect("version"), TokenVersion::V2);
    }

    #[test]
    fn test_set_and_get() {
        let conn = test_db();
        set(&conn, "default_unit", "usd").expect("set");
        assert_eq!(default_unit(&conn).expect("unit"), CurrencyUnit::Usd);
    }

    #[test]
    fn test_token_version_roundtrip() {
        let conn = test_db();
        set_token_version(&conn, TokenVersion::V1).expect("set");
        assert_eq!(get(&conn, "token_version").expect("raw"), "A");
        assert_eq!(token_version(&conn).expect("version"), TokenVersion::V1);
    }

    #[test]
    fn test_bad_token_version() {
        let conn = test_db();
        set(&conn, "token_version", "Z").expect("set");
        assert!(matches!(token_version(&conn), Err(DbError::Serialization(_))));
        set(&conn, "token_version", "AB").expect("set");
        assert!(token_version(&conn).is_err());
    }

    #[test]
    fn test_get_nonexistent() {
        let conn = test_db();
        assert!(matches!(get(&conn, "nonexistent"), Err(DbError::NotFound(_))));
    }
}
