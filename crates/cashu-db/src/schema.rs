//! SQL schema definitions.

/// Schema version 1.
pub const SCHEMA_V1: &str = r#"
-- Mint keysets, as published by the mint.
CREATE TABLE IF NOT EXISTS keysets (
    id TEXT PRIMARY KEY,
    mint_url TEXT NOT NULL,
    unit TEXT NOT NULL,
    keyset_json TEXT NOT NULL,
    added_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_keysets_mint ON keysets(mint_url);

-- Unspent proofs, keyed by Y = hash_to_curve(secret).
CREATE TABLE IF NOT EXISTS proofs (
    y TEXT PRIMARY KEY,
    mint_url TEXT NOT NULL,
    keyset_id TEXT NOT NULL,
    amount INTEGER NOT NULL CHECK (amount > 0),
    secret TEXT NOT NULL,
    c TEXT NOT NULL,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_proofs_mint ON proofs(mint_url);
CREATE INDEX IF NOT EXISTS idx_proofs_keyset ON proofs(keyset_id);

-- Key-value settings.
CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;
