//! # cashu-mint
//!
//! Mint role of the blind Diffie-Hellman key exchange.
//!
//! The mint holds one private key per denomination, signs blinded messages
//! without learning the holder's secret, and later verifies unblinded
//! proofs against the same key.
//!
//! ## Modules
//!
//! - [`keyset`] - Per-denomination key pairs and keyset generation
//! - [`signer`] - Append-only key store, blind signing and verification

pub mod keyset;
pub mod signer;

pub use keyset::{MintKeyPair, MintKeyset};
pub use signer::Mint;

use cashu_types::{Amount, KeysetId};

/// Largest supported keyset order: amounts `2^0 .. 2^63`.
pub const MAX_ORDER: u8 = 64;

/// Error types for minting operations.
#[derive(Debug, thiserror::Error)]
pub enum MintError {
    /// No keyset with this id is registered.
    #[error("unknown keyset: {0}")]
    UnknownKeyset(KeysetId),

    /// The keyset has no key pair for this amount.
    #[error("unknown denomination {amount} in keyset {keyset_id}")]
    UnknownDenomination {
        /// The requested amount.
        amount: Amount,
        /// The keyset that was searched.
        keyset_id: KeysetId,
    },

    /// A keyset with this id is already registered.
    #[error("keyset {0} already registered")]
    DuplicateKeyset(KeysetId),

    /// Keyset order outside `1..=MAX_ORDER`.
    #[error("invalid keyset order {0}, expected 1..=64")]
    InvalidMaxOrder(u8),

    /// A keyset was built with no keys or a zero amount.
    #[error("invalid keyset: {0}")]
    InvalidKeyset(String),

    /// Proof verification failed.
    #[error("proof verification failed")]
    VerificationFailed,

    /// Underlying cryptographic error.
    #[error(transparent)]
    Crypto(#[from] cashu_crypto::CryptoError),
}

impl MintError {
    /// Protocol/domain errors the caller can recover from by choosing
    /// different inputs. Cryptographic failures are terminal.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            MintError::UnknownKeyset(_)
                | MintError::UnknownDenomination { .. }
                | MintError::DuplicateKeyset(_)
                | MintError::InvalidMaxOrder(_)
        )
    }
}

/// Convenience result type for mint operations.
pub type Result<T> = std::result::Result<T, MintError>;
