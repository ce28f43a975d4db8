//! Keysets: a mint's published per-amount public keys.
//!
//! The keyset id is derived from the keys alone, so independently
//! computed ids over the same key material agree:
//!
//! ```text
//! id = 0x00 || SHA256(K_a1 || K_a2 || ... )[..7]     a1 < a2 < ...
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use cashu_crypto::PublicKey;
use serde::de::{self, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::{Amount, Error, Result};

/// Current keyset id version byte.
pub const KEYSET_ID_VERSION: u8 = 0x00;

/// Keyset id length in bytes.
pub const KEYSET_ID_LEN: usize = 8;

/// Currency unit of a keyset.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum CurrencyUnit {
    #[default]
    Sat,
    Msat,
    Usd,
    Eur,
    Custom(String),
}

impl CurrencyUnit {
    pub fn as_str(&self) -> &str {
        match self {
            CurrencyUnit::Sat => "sat",
            CurrencyUnit::Msat => "msat",
            CurrencyUnit::Usd => "usd",
            CurrencyUnit::Eur => "eur",
            CurrencyUnit::Custom(unit) => unit,
        }
    }
}

impl fmt::Display for CurrencyUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurrencyUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        Ok(match lower.as_str() {
            "" => return Err(Error::InvalidKeyset("empty currency unit".to_string())),
            "sat" => CurrencyUnit::Sat,
            "msat" => CurrencyUnit::Msat,
            "usd" => CurrencyUnit::Usd,
            "eur" => CurrencyUnit::Eur,
            _ => CurrencyUnit::Custom(lower),
        })
    }
}

impl Serialize for CurrencyUnit {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CurrencyUnit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Deterministic keyset identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeysetId([u8; KEYSET_ID_LEN]);

impl KeysetId {
    /// Derive the id from public keys ordered by ascending amount.
    pub fn from_keys(keys: &BTreeMap<Amount, PublicKey>) -> Self {
        let mut hasher = Sha256::new();
        for key in keys.values() {
            hasher.update(key.to_bytes());
        }
        let hash = hasher.finalize();

        let mut id = [0u8; KEYSET_ID_LEN];
        id[0] = KEYSET_ID_VERSION;
        id[1..].copy_from_slice(&hash[..KEYSET_ID_LEN - 1]);
        Self(id)
    }

    /// Decode 8 raw bytes.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidKeysetId`] on wrong length or unknown version byte.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let id: [u8; KEYSET_ID_LEN] = bytes
            .try_into()
            .map_err(|_| Error::InvalidKeysetId(format!("expected 8 bytes, got {}", bytes.len())))?;
        if id[0] != KEYSET_ID_VERSION {
            return Err(Error::InvalidKeysetId(format!(
                "unknown version byte {:#04x}",
                id[0]
            )));
        }
        Ok(Self(id))
    }

    pub fn to_bytes(&self) -> [u8; KEYSET_ID_LEN] {
        self.0
    }

    pub fn version(&self) -> u8 {
        self.0[0]
    }
}

impl fmt::Display for KeysetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for KeysetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeysetId({self})")
    }
}

impl FromStr for KeysetId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.len() != KEYSET_ID_LEN * 2 {
            return Err(Error::InvalidKeysetId(format!("expected 16 hex chars, got {s:?}")));
        }
        let bytes = hex::decode(s).map_err(|e| Error::InvalidKeysetId(e.to_string()))?;
        Self::from_slice(&bytes)
    }
}

impl Serialize for KeysetId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            serializer.serialize_bytes(&self.0)
        }
    }
}

struct KeysetIdVisitor;

impl<'de> Visitor<'de> for KeysetIdVisitor {
    type Value = KeysetId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a keyset id as 16 hex chars or 8 bytes")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<KeysetId, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> std::result::Result<KeysetId, E> {
        KeysetId::from_slice(v).map_err(E::custom)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<KeysetId, A::Error> {
        let mut bytes = Vec::with_capacity(KEYSET_ID_LEN);
        while let Some(b) = seq.next_element::<u8>()? {
            bytes.push(b);
        }
        KeysetId::from_slice(&bytes).map_err(de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for KeysetId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            deserializer.deserialize_str(KeysetIdVisitor)
        } else {
            deserializer.deserialize_bytes(KeysetIdVisitor)
        }
    }
}

/// A mint's published keyset. Immutable once constructed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyset {
    pub id: KeysetId,
    pub unit: CurrencyUnit,
    pub keys: BTreeMap<Amount, PublicKey>,
}

impl Keyset {
    /// Build a keyset, deriving its id from the keys.
    pub fn new(unit: CurrencyUnit, keys: BTreeMap<Amount, PublicKey>) -> Self {
        let id = KeysetId::from_keys(&keys);
        Self { id, unit, keys }
    }

    /// Decode a keyset whose keys arrive as hex strings.
    ///
    /// The keyset is rejected as a whole if any key fails to decode or the
    /// given id does not match the keys.
    pub fn from_hex_keys(
        id: KeysetId,
        unit: CurrencyUnit,
        hex_keys: &BTreeMap<Amount, String>,
    ) -> Result<Self> {
        let mut keys = BTreeMap::new();
        for (amount, hex_key) in hex_keys {
            let key = PublicKey::from_hex(hex_key).map_err(|e| {
                Error::InvalidKeyset(format!("key for amount {amount}: {e}"))
            })?;
            keys.insert(*amount, key);
        }
        let keyset = Self { id, unit, keys };
        if !keyset.validate() {
            return Err(Error::InvalidKeyset(format!(
                "keyset {id} does not match its keys"
            )));
        }
        Ok(keyset)
    }

    /// Public key for `amount`, if this keyset supports it.
    pub fn lookup(&self, amount: Amount) -> Option<PublicKey> {
        self.keys.get(&amount).copied()
    }

    /// Supported denominations, ascending.
    pub fn supported_amounts(&self) -> Vec<Amount> {
        self.keys.keys().copied().collect()
    }

    /// The id recomputed from the keys.
    pub fn derived_id(&self) -> KeysetId {
        KeysetId::from_keys(&self.keys)
    }

    /// Structural validity: at least one key, no zero amount, id matches
    /// keys. Keys themselves are valid points by construction.
    pub fn validate(&self) -> bool {
        !self.keys.is_empty() && !self.keys.contains_key(&0) && self.derived_id() == self.id
    }
}
