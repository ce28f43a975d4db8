//! Token transport envelope and its two wire encodings.
//!
//! ```text
//! [cashu:]cashu<V><base64url(payload), no padding>
//!
//! V = 'A'  payload = JSON  {"token":[{"mint","proofs":[{"amount","id","secret","C"}]}],
//!                           "unit","memo"}
//! V = 'B'  payload = CBOR  {"t":[{"m","p":[{"a","i","s","c"}]}],"u","d"}
//! ```
//!
//! In the compact encoding the keyset id (`i`) is 8 raw bytes and the
//! signature (`c`) is the 33-byte compressed point.
//!
//! Decoding reads the marker character right after the tag and runs only
//! the decoder it names.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose;
use base64::Engine;
use cashu_crypto::PublicKey;
use serde::{Deserialize, Serialize};

use crate::keyset::{CurrencyUnit, KeysetId};
use crate::proof::{Proof, Secret};
use crate::{Amount, Error, Result};

/// Fixed token tag.
pub const TOKEN_PREFIX: &str = "cashu";

/// Optional URI scheme prefix.
pub const URI_PREFIX: &str = "cashu:";

/// Wire version of a serialized token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenVersion {
    /// JSON payload, marker `A`.
    V1,
    /// Compact CBOR payload, marker `B`.
    V2,
}

impl TokenVersion {
    pub const ALL: [TokenVersion; 2] = [TokenVersion::V1, TokenVersion::V2];

    pub fn marker(self) -> char {
        match self {
            TokenVersion::V1 => 'A',
            TokenVersion::V2 => 'B',
        }
    }

    pub fn from_marker(marker: char) -> Result<Self> {
        match marker {
            'A' => Ok(TokenVersion::V1),
            'B' => Ok(TokenVersion::V2),
            other => Err(Error::InvalidTokenFormat(format!(
                "unknown version marker {other:?}"
            ))),
        }
    }
}

/// Proofs issued by a single mint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenEntry {
    pub mint: String,
    pub proofs: Vec<Proof>,
}

/// Transport envelope grouping proofs by issuing mint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    #[serde(rename = "token")]
    pub entries: Vec<TokenEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<CurrencyUnit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

impl Token {
    /// Single-mint token.
    pub fn new(
        mint: impl Into<String>,
        proofs: Vec<Proof>,
        unit: Option<CurrencyUnit>,
        memo: Option<String>,
    ) -> Self {
        Self {
            entries: vec![TokenEntry {
                mint: mint.into(),
                proofs,
            }],
            unit,
            memo,
        }
    }

    /// Sum of all proof amounts.
    ///
    /// # Errors
    ///
    /// [`Error::AmountOverflow`] if the sum does not fit in a `u64`.
    pub fn value(&self) -> Result<Amount> {
        self.proofs()
            .try_fold(0u64, |acc, p| acc.checked_add(p.amount))
            .ok_or(Error::AmountOverflow)
    }

    /// All proofs across entries.
    pub fn proofs(&self) -> impl Iterator<Item = &Proof> {
        self.entries.iter().flat_map(|e| e.proofs.iter())
    }

    /// Mint URLs in entry order.
    pub fn mints(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.mint.as_str()).collect()
    }

    pub fn serialize(&self, version: TokenVersion) -> Result<String> {
        serialize(self, version)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = serialize(self, TokenVersion::V2).map_err(|_| fmt::Error)?;
        f.write_str(&encoded)
    }
}

impl FromStr for Token {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        deserialize(s)
    }
}

#[derive(Serialize, Deserialize)]
struct CompactToken {
    #[serde(rename = "t")]
    entries: Vec<CompactEntry>,
    #[serde(rename = "u", default, skip_serializing_if = "Option::is_none")]
    unit: Option<CurrencyUnit>,
    #[serde(rename = "d", default, skip_serializing_if = "Option::is_none")]
    memo: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct CompactEntry {
    #[serde(rename = "m")]
    mint: String,
    #[serde(rename = "p")]
    proofs: Vec<CompactProof>,
}

#[derive(Serialize, Deserialize)]
struct CompactProof {
    #[serde(rename = "a")]
    amount: Amount,
    #[serde(rename = "i")]
    id: KeysetId,
    #[serde(rename = "s")]
    secret: Secret,
    #[serde(rename = "c")]
    c: PublicKey,
}

impl From<&Token> for CompactToken {
    fn from(token: &Token) -> Self {
        Self {
            entries: token
                .entries
                .iter()
                .map(|entry| CompactEntry {
                    mint: entry.mint.clone(),
                    proofs: entry
                        .proofs
                        .iter()
                        .map(|p| CompactProof {
                            amount: p.amount,
                            id: p.id,
                            secret: p.secret.clone(),
                            c: p.c,
                        })
                        .collect(),
                })
                .collect(),
            unit: token.unit.clone(),
            memo: token.memo.clone(),
        }
    }
}

impl From<CompactToken> for Token {
    fn from(compact: CompactToken) -> Self {
        Self {
            entries: compact
                .entries
                .into_iter()
                .map(|entry| TokenEntry {
                    mint: entry.mint,
                    proofs: entry
                        .proofs
                        .into_iter()
                        .map(|p| Proof {
                            amount: p.amount,
                            id: p.id,
                            secret: p.secret,
                            c: p.c,
                        })
                        .collect(),
                })
                .collect(),
            unit: compact.unit,
            memo: compact.memo,
        }
    }
}

/// Encode a token under the given wire version.
pub fn serialize(token: &Token, version: TokenVersion) -> Result<String> {
    let payload = match version {
        TokenVersion::V1 => {
            serde_json::to_vec(token).map_err(|e| Error::Serialization(e.to_string()))?
        }
        TokenVersion::V2 => {
            let mut buf = Vec::new();
            ciborium::into_writer(&CompactToken::from(token), &mut buf)
                .map_err(|e| Error::Serialization(format!("CBOR serialization failed: {e}")))?;
            buf
        }
    };
    Ok(format!(
        "{TOKEN_PREFIX}{}{}",
        version.marker(),
        general_purpose::URL_SAFE_NO_PAD.encode(payload)
    ))
}

/// Decode a token string, dispatching on its version marker.
///
/// # Errors
///
/// [`Error::InvalidTokenFormat`] if the tag or marker is wrong, the base64
/// is malformed, or the payload does not decode under the marked version.
pub fn deserialize(encoded: &str) -> Result<Token> {
    let trimmed = encoded.trim();
    let without_uri = trimmed.strip_prefix(URI_PREFIX).unwrap_or(trimmed);
    let rest = without_uri
        .strip_prefix(TOKEN_PREFIX)
        .ok_or_else(|| Error::InvalidTokenFormat("missing cashu tag".to_string()))?;

    let mut chars = rest.chars();
    let marker = chars
        .next()
        .ok_or_else(|| Error::InvalidTokenFormat("missing version marker".to_string()))?;
    let version = TokenVersion::from_marker(marker)?;
    let payload = decode_base64(chars.as_str())?;

    match version {
        TokenVersion::V1 => serde_json::from_slice(&payload)
            .map_err(|e| Error::InvalidTokenFormat(format!("JSON payload: {e}"))),
        TokenVersion::V2 => ciborium::from_reader::<CompactToken, _>(payload.as_slice())
            .map(Token::from)
            .map_err(|e| Error::InvalidTokenFormat(format!("CBOR payload: {e}"))),
    }
}

/// Restore padding, then decode url-safe base64 with a standard-alphabet
/// fallback.
fn decode_base64(payload: &str) -> Result<Vec<u8>> {
    if payload.is_empty() {
        return Err(Error::InvalidTokenFormat("empty payload".to_string()));
    }
    let mut padded = payload.trim_end_matches('=').to_string();
    while padded.len() % 4 != 0 {
        padded.push('=');
    }
    general_purpose::URL_SAFE
        .decode(&padded)
        .or_else(|_| general_purpose::STANDARD.decode(&padded))
        .map_err(|e| Error::InvalidTokenFormat(format!("base64: {e}")))
}

/// Structural checks only; cryptographic validity is checked by the mint.
///
/// # Errors
///
/// - [`Error::EmptyToken`] if there are no entries
/// - [`Error::EmptyEntry`] if an entry has no proofs or no mint URL
/// - [`Error::InvalidProof`] if a proof has a zero amount or empty secret
pub fn validate_token(token: &Token) -> Result<()> {
    if token.entries.is_empty() {
        return Err(Error::EmptyToken);
    }
    for entry in &token.entries {
        if entry.proofs.is_empty() || entry.mint.trim().is_empty() {
            return Err(Error::EmptyEntry {
                mint: entry.mint.clone(),
            });
        }
        for proof in &entry.proofs {
            if proof.amount == 0 {
                return Err(Error::InvalidProof("amount must be positive".to_string()));
            }
            if proof.secret.is_empty() {
                return Err(Error::InvalidProof("secret must be non-empty".to_string()));
            }
        }
    }
    Ok(())
}
