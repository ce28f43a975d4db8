//! # cashu-types
//!
//! Shared domain types for the mint and wallet: keysets, the blinded
//! message / blind signature / proof triple, and the token transport
//! envelope with its two wire encodings.

pub mod keyset;
pub mod options;
pub mod proof;
pub mod token;

pub use keyset::{CurrencyUnit, Keyset, KeysetId};
pub use options::{OptionValue, Options};
pub use proof::{BlindSignature, BlindedMessage, Proof, Secret};
pub use token::{Token, TokenEntry, TokenVersion};

/// An amount in the smallest unit of a keyset's currency.
pub type Amount = u64;

/// Error types for domain types and token encoding.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Token string or payload does not match either wire version.
    #[error("invalid token format: {0}")]
    InvalidTokenFormat(String),

    /// Keyset id is not 16 hex characters with a known version byte.
    #[error("invalid keyset id: {0}")]
    InvalidKeysetId(String),

    /// A keyset failed to decode or validate as a whole.
    #[error("invalid keyset: {0}")]
    InvalidKeyset(String),

    /// Token has no entries.
    #[error("token has no entries")]
    EmptyToken,

    /// A token entry has no proofs or no mint URL.
    #[error("token entry for mint {mint:?} is empty")]
    EmptyEntry {
        /// The entry's mint URL.
        mint: String,
    },

    /// A proof failed structural validation.
    #[error("invalid proof: {0}")]
    InvalidProof(String),

    /// Summing amounts overflowed.
    #[error("amount overflow")]
    AmountOverflow,

    /// Encoding a token failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Underlying cryptographic error.
    #[error(transparent)]
    Crypto(#[from] cashu_crypto::CryptoError),
}

pub type Result<T> = std::result::Result<T, Error>;
