//! Per-denomination key pairs.
//!
//! A [`MintKeyset`] holds one [`MintKeyPair`] per amount. Denominations are
//! powers of two, `2^0 .. 2^(max_order - 1)`. Keysets are either derived
//! from a seed (reproducible), sampled at random, or loaded from explicit
//! key pairs. Only [`MintKeyset::keyset`] leaves the mint.

use std::collections::BTreeMap;
use std::fmt;

use cashu_crypto::derive::derive_amount_key;
use cashu_crypto::{PublicKey, SecretKey};
use cashu_types::{Amount, CurrencyUnit, Keyset, KeysetId};

use crate::{MintError, Result, MAX_ORDER};

/// Private scalar `k` and its public point `K = k*G`.
#[derive(Clone)]
pub struct MintKeyPair {
    public_key: PublicKey,
    secret_key: SecretKey,
}

impl MintKeyPair {
    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        Self {
            public_key: secret_key.public_key(),
            secret_key,
        }
    }

    pub fn generate() -> Self {
        Self::from_secret_key(SecretKey::generate())
    }

    pub fn public_key(&self) -> PublicKey {
        self.public_key
    }

    pub(crate) fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }
}

impl fmt::Debug for MintKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MintKeyPair")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

/// A mint's full keyset, private keys included.
#[derive(Clone, Debug)]
pub struct MintKeyset {
    id: KeysetId,
    unit: CurrencyUnit,
    keys: BTreeMap<Amount, MintKeyPair>,
}

fn check_order(max_order: u8) -> Result<()> {
    if max_order == 0 || max_order > MAX_ORDER {
        return Err(MintError::InvalidMaxOrder(max_order));
    }
    Ok(())
}

fn amounts(max_order: u8) -> impl Iterator<Item = Amount> {
    (0..u32::from(max_order)).map(|i| 1u64 << i)
}

impl MintKeyset {
    /// Derive a keyset from a seed.
    ///
    /// The same `(seed, unit, max_order)` always yields the same keys and
    /// therefore the same id.
    ///
    /// # Errors
    ///
    /// - [`MintError::InvalidMaxOrder`] if `max_order` is 0 or above [`MAX_ORDER`]
    pub fn generate(seed: &[u8], unit: CurrencyUnit, max_order: u8) -> Result<Self> {
        check_order(max_order)?;
        let mut keys = BTreeMap::new();
        for amount in amounts(max_order) {
            let secret_key = derive_amount_key(seed, unit.as_str(), amount)?;
            keys.insert(amount, MintKeyPair::from_secret_key(secret_key));
        }
        Self::from_key_pairs(unit, keys)
    }

    /// Sample a fresh random keyset.
    pub fn random(unit: CurrencyUnit, max_order: u8) -> Result<Self> {
        check_order(max_order)?;
        let keys = amounts(max_order)
            .map(|amount| (amount, MintKeyPair::generate()))
            .collect();
        Self::from_key_pairs(unit, keys)
    }

    /// Load explicit key pairs.
    ///
    /// # Errors
    ///
    /// [`MintError::InvalidKeyset`] if `keys` is empty or contains amount 0.
    pub fn from_key_pairs(unit: CurrencyUnit, keys: BTreeMap<Amount, MintKeyPair>) -> Result<Self> {
        if keys.is_empty() {
            return Err(MintError::InvalidKeyset("no key pairs".to_string()));
        }
        if keys.contains_key(&0) {
            return Err(MintError::InvalidKeyset("zero amount".to_string()));
        }
        let public: BTreeMap<Amount, PublicKey> =
            keys.iter().map(|(a, kp)| (*a, kp.public_key())).collect();
        let id = KeysetId::from_keys(&public);
        Ok(Self { id, unit, keys })
    }

    pub fn id(&self) -> KeysetId {
        self.id
    }

    pub fn unit(&self) -> &CurrencyUnit {
        &self.unit
    }

    pub fn key_pair(&self, amount: Amount) -> Option<&MintKeyPair> {
        self.keys.get(&amount)
    }

    /// The public half, safe to publish.
    pub fn keyset(&self) -> Keyset {
        Keyset {
            id: self.id,
            unit: self.unit.clone(),
            keys: self
                .keys
                .iter()
                .map(|(amount, kp)| (*amount, kp.public_key()))
                .collect(),
        }
    }
}
