//! # cashu-wallet
//!
//! Holder role of the blind Diffie-Hellman key exchange, plus the proof
//! inventory and spend selection.
//!
//! ## Modules
//!
//! - [`premint`] - Blind secrets for the mint and unblind its signatures
//! - [`select`] - Greedy denomination selection and amount splitting
//! - [`inventory`] - In-memory proof inventory with at-most-once removal

pub mod inventory;
pub mod premint;
pub mod select;

pub use inventory::ProofInventory;
pub use premint::{blind, unblind, BlindingContext, PreMint, PreMintSecrets};
pub use select::{select_proofs, split_amount};

use cashu_types::Amount;

/// Error types for wallet operations.
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    /// Inventory cannot cover the requested amount.
    #[error("insufficient balance: have {available}, need {required}")]
    InsufficientBalance {
        /// Required amount.
        required: Amount,
        /// Available balance.
        available: Amount,
    },

    /// A blind signature does not belong to the blinding context it was
    /// paired with.
    #[error("signature mismatch: {0}")]
    SignatureMismatch(String),

    /// The mint's keyset has no key for this amount.
    #[error("no mint key for amount {0}")]
    UnknownDenomination(Amount),

    /// Amount is zero where a positive amount is required.
    #[error("invalid amount: {0}")]
    InvalidAmount(Amount),

    /// A proof with the same secret is already held.
    #[error("proof already in inventory")]
    DuplicateProof,

    /// A proof requested for removal is not held.
    #[error("proof not found in inventory")]
    ProofNotFound,

    /// Summing amounts overflowed.
    #[error("amount overflow")]
    AmountOverflow,

    /// Underlying cryptographic error.
    #[error(transparent)]
    Crypto(#[from] cashu_crypto::CryptoError),

    /// Domain type error.
    #[error(transparent)]
    Types(#[from] cashu_types::Error),
}

impl WalletError {
    /// Protocol/domain errors the caller can recover from (top up, pick a
    /// different amount). Cryptographic and mismatch failures are terminal.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            WalletError::InsufficientBalance { .. }
                | WalletError::UnknownDenomination(_)
                | WalletError::InvalidAmount(_)
                | WalletError::DuplicateProof
                | WalletError::ProofNotFound
        )
    }
}

/// Convenience result type for wallet operations.
pub type Result<T> = std::result::Result<T, WalletError>;
