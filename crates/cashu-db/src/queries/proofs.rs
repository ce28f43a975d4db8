//! Unspent proof storage.
//!
//! A proof row is deleted when spent. [`take_proofs`] removes rows inside an
//! immediate transaction and fails as a whole if any row is already gone,
//! so two connections racing for the same proof cannot both succeed.

use std::str::FromStr;

use cashu_crypto::PublicKey;
use cashu_types::{Amount, KeysetId, Proof, Secret};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior};

use crate::{to_i64, to_u64, DbError, Result};

/// A proof as stored, with its `Y` and provenance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredProof {
    pub y: PublicKey,
    pub mint_url: String,
    pub proof: Proof,
    pub created_at: u64,
}

struct ProofRow {
    y: String,
    mint_url: String,
    keyset_id: String,
    amount: i64,
    secret: String,
    c: String,
    created_at: i64,
}

impl ProofRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            y: row.get(0)?,
            mint_url: row.get(1)?,
            keyset_id: row.get(2)?,
            amount: row.get(3)?,
            secret: row.get(4)?,
            c: row.get(5)?,
            created_at: row.get(6)?,
        })
    }

    fn decode(self) -> Result<StoredProof> {
        let point = |hex: &str, what: &str| {
            PublicKey::from_hex(hex).map_err(|e| DbError::Serialization(format!("{what}: {e}")))
        };
        Ok(StoredProof {
            y: point(&self.y, "y")?,
            mint_url: self.mint_url,
            proof: Proof {
                amount: to_u64(self.amount, "amount")?,
                id: KeysetId::from_str(&self.keyset_id)
                    .map_err(|e| DbError::Serialization(e.to_string()))?,
                secret: Secret::new(self.secret),
                c: point(&self.c, "c")?,
            },
            created_at: to_u64(self.created_at, "created_at")?,
        })
    }
}

const SELECT_COLUMNS: &str =
    "SELECT y, mint_url, keyset_id, amount, secret, c, created_at FROM proofs";

fn y_of(proof: &Proof) -> Result<PublicKey> {
    proof.y().map_err(|e| DbError::Serialization(e.to_string()))
}

fn insert_one(
    conn: &Connection,
    mint_url: &str,
    proof: &Proof,
    created_at: u64,
) -> Result<PublicKey> {
    let y = y_of(proof)?;
    let result = conn.execute(
        "INSERT INTO proofs (y, mint_url, keyset_id, amount, secret, c, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            y.to_hex(),
            mint_url,
            proof.id.to_string(),
            to_i64(proof.amount, "amount")?,
            proof.secret.as_str(),
            proof.c.to_hex(),
            to_i64(created_at, "created_at")?,
        ],
    );
    match result {
        Ok(_) => Ok(y),
        Err(rusqlite::Error::SqliteFailure(e, msg))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            let reason = msg.unwrap_or_else(|| e.to_string());
            Err(DbError::Constraint(format!("proof {y}: {reason}")))
        }
        Err(e) => Err(e.into()),
    }
}

/// Store one proof. Returns its `Y`.
pub fn insert_proof(
    conn: &Connection,
    mint_url: &str,
    proof: &Proof,
    created_at: u64,
) -> Result<PublicKey> {
    insert_one(conn, mint_url, proof, created_at)
}

/// Store a batch of proofs. Either every proof is stored or none.
pub fn insert_proofs(
    conn: &mut Connection,
    mint_url: &str,
    proofs: &[Proof],
    created_at: u64,
) -> Result<()> {
    let tx = conn.transaction()?;
    for proof in proofs {
        insert_one(&tx, mint_url, proof, created_at)?;
    }
    tx.commit()?;
    tracing::debug!(count = proofs.len(), mint_url, "proofs stored");
    Ok(())
}

fn query(conn: &Connection, sql: &str, params: impl rusqlite::Params) -> Result<Vec<StoredProof>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, ProofRow::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    rows.into_iter().map(ProofRow::decode).collect()
}

/// Stored proofs in insertion order, optionally restricted to one mint.
pub fn list_proofs(conn: &Connection, mint_url: Option<&str>) -> Result<Vec<StoredProof>> {
    query(
        conn,
        &format!("{SELECT_COLUMNS} WHERE ?1 IS NULL OR mint_url = ?1 ORDER BY rowid"),
        [mint_url],
    )
}

/// Stored proofs of one keyset, in insertion order.
pub fn list_by_keyset(conn: &Connection, keyset_id: &KeysetId) -> Result<Vec<StoredProof>> {
    query(
        conn,
        &format!("{SELECT_COLUMNS} WHERE keyset_id = ?1 ORDER BY rowid"),
        [keyset_id.to_string()],
    )
}

/// Look up one proof by `Y`.
pub fn get_proof(conn: &Connection, y: &PublicKey) -> Result<StoredProof> {
    conn.query_row(&format!("{SELECT_COLUMNS} WHERE y = ?1"), [y.to_hex()], ProofRow::from_row)
        .optional()?
        .ok_or_else(|| DbError::NotFound(format!("proof {y}")))?
        .decode()
}

/// Sum of stored amounts, optionally restricted to one mint.
pub fn balance(conn: &Connection, mint_url: Option<&str>) -> Result<Amount> {
    let total: i64 = conn.query_row(
        "SELECT COALESCE(SUM(amount), 0) FROM proofs WHERE ?1 IS NULL OR mint_url = ?1",
        [mint_url],
        |row| row.get(0),
    )?;
    to_u64(total, "balance")
}

/// Remove the proofs with the given `Y`s and return them.
///
/// Runs in one immediate transaction. If any `Y` is not stored, nothing is
/// removed and [`DbError::NotFound`] is returned.
pub fn take_proofs(conn: &mut Connection, ys: &[PublicKey]) -> Result<Vec<Proof>> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let mut taken = Vec::with_capacity(ys.len());
    for y in ys {
        let row = tx
            .query_row(&format!("{SELECT_COLUMNS} WHERE y = ?1"), [y.to_hex()], ProofRow::from_row)
            .optional()?
            .ok_or_else(|| DbError::NotFound(format!("proof {y} not stored or already spent")))?;
        let deleted = tx.execute("DELETE FROM proofs WHERE y = ?1", [y.to_hex()])?;
        if deleted == 0 {
            return Err(DbError::NotFound(format!("proof {y} already spent")));
        }
        taken.push(row.decode()?.proof);
    }
    tx.commit()?;
    tracing::debug!(count = taken.len(), "proofs taken from store");
    Ok(taken)
}
