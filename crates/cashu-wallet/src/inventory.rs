//! In-memory proof inventory.
//!
//! Proofs are keyed by `Y = hash_to_curve(secret)`. Selection and removal
//! happen under one lock, so concurrent spends never hand out the same
//! proof twice.

use cashu_crypto::PublicKey;
use cashu_types::{Amount, Proof};
use parking_lot::Mutex;

use crate::select::select_indices;
use crate::{Result, WalletError};

#[derive(Debug)]
struct Entry {
    y: PublicKey,
    proof: Proof,
}

/// Thread-safe store of unspent proofs.
#[derive(Debug, Default)]
pub struct ProofInventory {
    entries: Mutex<Vec<Entry>>,
}

impl ProofInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add proofs. Either all are added or none.
    ///
    /// # Errors
    ///
    /// [`WalletError::DuplicateProof`] if a secret is already held or repeats
    /// within the batch.
    pub fn add(&self, proofs: Vec<Proof>) -> Result<()> {
        let mut incoming = Vec::with_capacity(proofs.len());
        for proof in proofs {
            incoming.push(Entry { y: proof.y()?, proof });
        }

        let mut entries = self.entries.lock();
        for (i, entry) in incoming.iter().enumerate() {
            let held = entries.iter().any(|e| e.y == entry.y);
            let repeated = incoming[..i].iter().any(|e| e.y == entry.y);
            if held || repeated {
                return Err(WalletError::DuplicateProof);
            }
        }
        let added = incoming.len();
        entries.extend(incoming);
        tracing::debug!(added, held = entries.len(), "proofs added to inventory");
        Ok(())
    }

    /// Sum of held amounts.
    pub fn balance(&self) -> Result<Amount> {
        self.entries
            .lock()
            .iter()
            .try_fold(0u64, |acc, e| acc.checked_add(e.proof.amount))
            .ok_or(WalletError::AmountOverflow)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Copy of the held proofs in insertion order.
    pub fn proofs(&self) -> Vec<Proof> {
        self.entries.lock().iter().map(|e| e.proof.clone()).collect()
    }

    pub fn contains(&self, y: &PublicKey) -> bool {
        self.entries.lock().iter().any(|e| e.y == *y)
    }

    /// Select proofs covering `amount` and remove them in one step.
    ///
    /// On error the inventory is unchanged.
    pub fn take(&self, amount: Amount) -> Result<Vec<Proof>> {
        let mut entries = self.entries.lock();
        let amounts: Vec<Amount> = entries.iter().map(|e| e.proof.amount).collect();
        let selected = select_indices(&amounts, amount)?;

        let taken: Vec<Proof> = selected.iter().map(|&i| entries[i].proof.clone()).collect();
        let mut keep = vec![true; entries.len()];
        for &i in &selected {
            keep[i] = false;
        }
        let mut keep = keep.into_iter();
        entries.retain(|_| keep.next().unwrap_or(true));

        tracing::debug!(amount, taken = taken.len(), "proofs taken from inventory");
        Ok(taken)
    }

    /// Remove specific proofs by `Y`. Either all are removed or none.
    ///
    /// # Errors
    ///
    /// [`WalletError::DuplicateProof`] if a `Y` repeats within `ys`,
    /// [`WalletError::ProofNotFound`] if any `Y` is not held.
    pub fn remove(&self, ys: &[PublicKey]) -> Result<Vec<Proof>> {
        if ys.iter().enumerate().any(|(i, y)| ys[..i].contains(y)) {
            return Err(WalletError::DuplicateProof);
        }

        let mut entries = self.entries.lock();
        if ys.iter().any(|y| !entries.iter().any(|e| e.y == *y)) {
            return Err(WalletError::ProofNotFound);
        }

        let mut removed = Vec::with_capacity(ys.len());
        for y in ys {
            if let Some(pos) = entries.iter().position(|e| e.y == *y) {
                removed.push(entries.remove(pos).proof);
            }
        }
        Ok(removed)
    }
}
