//! Blind signing and proof verification.
//!
//! The key store is append-only: keysets are inserted once and never
//! mutated, so readers clone an `Arc<MintKeyset>` under a short read lock
//! and do all curve arithmetic after releasing it. Adding a keyset for a
//! unit makes it the active keyset for that unit; older keysets stay
//! available for verification.

use std::collections::HashMap;
use std::sync::Arc;

use cashu_crypto::dhke::{sign_message, verify_message};
use cashu_crypto::PublicKey;
use cashu_types::{
    Amount, BlindSignature, BlindedMessage, CurrencyUnit, Keyset, KeysetId, Proof, Secret,
};
use parking_lot::RwLock;

use crate::keyset::MintKeyset;
use crate::{MintError, Result};

#[derive(Default)]
struct KeyStore {
    keysets: HashMap<KeysetId, Arc<MintKeyset>>,
    active: HashMap<CurrencyUnit, KeysetId>,
}

/// The mint role.
#[derive(Default)]
pub struct Mint {
    store: RwLock<KeyStore>,
}

impl Mint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mint from keysets, registering them in order.
    pub fn with_keysets(keysets: impl IntoIterator<Item = MintKeyset>) -> Result<Self> {
        let mint = Self::new();
        for keyset in keysets {
            mint.add_keyset(keyset)?;
        }
        Ok(mint)
    }

    /// Register a keyset and make it active for its unit.
    ///
    /// # Errors
    ///
    /// [`MintError::DuplicateKeyset`] if the id is already registered. The
    /// store is left unchanged.
    pub fn add_keyset(&self, keyset: MintKeyset) -> Result<KeysetId> {
        let id = keyset.id();
        let unit = keyset.unit().clone();
        let mut store = self.store.write();
        if store.keysets.contains_key(&id) {
            return Err(MintError::DuplicateKeyset(id));
        }
        store.keysets.insert(id, Arc::new(keyset));
        store.active.insert(unit.clone(), id);
        drop(store);

        tracing::info!(keyset_id = %id, %unit, "keyset registered");
        Ok(id)
    }

    fn get(&self, id: &KeysetId) -> Result<Arc<MintKeyset>> {
        self.store
            .read()
            .keysets
            .get(id)
            .cloned()
            .ok_or(MintError::UnknownKeyset(*id))
    }

    /// Public keys of one keyset.
    pub fn keyset(&self, id: &KeysetId) -> Result<Keyset> {
        Ok(self.get(id)?.keyset())
    }

    /// Public keys of every registered keyset, ordered by id.
    pub fn keysets(&self) -> Vec<Keyset> {
        let snapshot: Vec<Arc<MintKeyset>> = self.store.read().keysets.values().cloned().collect();
        let mut keysets: Vec<Keyset> = snapshot.iter().map(|ks| ks.keyset()).collect();
        keysets.sort_by_key(|ks| ks.id);
        keysets
    }

    /// The keyset new signatures for `unit` should use.
    pub fn active_keyset_id(&self, unit: &CurrencyUnit) -> Option<KeysetId> {
        self.store.read().active.get(unit).copied()
    }

    /// `C_ = k * B_` with the key for the message's amount.
    ///
    /// # Errors
    ///
    /// - [`MintError::UnknownKeyset`] if the message's keyset is not registered
    /// - [`MintError::UnknownDenomination`] if the keyset has no key for the amount
    /// - [`MintError::Crypto`] if the product is the point at infinity
    pub fn sign(&self, message: &BlindedMessage) -> Result<BlindSignature> {
        let keyset = self.get(&message.id)?;
        let key_pair = keyset
            .key_pair(message.amount)
            .ok_or(MintError::UnknownDenomination {
                amount: message.amount,
                keyset_id: message.id,
            })?;

        let c = sign_message(key_pair.secret_key(), &message.blinded_secret)?;

        tracing::debug!(amount = message.amount, keyset_id = %message.id, "blind signature issued");

        Ok(BlindSignature {
            amount: message.amount,
            id: message.id,
            c,
        })
    }

    /// Sign a batch. Either every message is signed or none is returned.
    pub fn sign_all(&self, messages: &[BlindedMessage]) -> Result<Vec<BlindSignature>> {
        messages.iter().map(|m| self.sign(m)).collect()
    }

    /// Verify a proof against the key that issued it.
    ///
    /// Fails closed: an unknown keyset, unknown amount or any decode error
    /// is reported as [`MintError::VerificationFailed`].
    pub fn verify_proof(&self, proof: &Proof) -> Result<()> {
        if self.verify(&proof.secret, &proof.c, proof.amount, &proof.id) {
            Ok(())
        } else {
            Err(MintError::VerificationFailed)
        }
    }

    /// `true` iff `k * hash_to_curve(secret) == C` for the keyset's key at
    /// `amount`.
    pub fn verify(
        &self,
        secret: &Secret,
        c: &PublicKey,
        amount: Amount,
        keyset_id: &KeysetId,
    ) -> bool {
        let Ok(keyset) = self.get(keyset_id) else {
            tracing::warn!(%keyset_id, "verification against unknown keyset");
            return false;
        };
        let Some(key_pair) = keyset.key_pair(amount) else {
            tracing::warn!(%keyset_id, amount, "verification against unknown denomination");
            return false;
        };
        match verify_message(key_pair.secret_key(), c, secret.as_bytes()) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(%keyset_id, amount, error = %e, "proof rejected");
                false
            }
        }
    }
}
