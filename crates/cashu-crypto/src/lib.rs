//! # cashu-crypto
//!
//! Cryptographic primitives for the blind Diffie-Hellman key exchange
//! (BDHKE) used by the ecash mint and wallet.
//!
//! The suite is fixed: secp256k1 points, SHA-256 hash-to-curve with a
//! protocol-wide domain separator, and BLAKE3 for deterministic key
//! derivation from a mint seed.
//!
//! ## Modules
//!
//! - [`point`] - secp256k1 point and scalar wrappers
//! - [`hash_to_curve`] - Domain-separated mapping from bytes to a curve point
//! - [`dhke`] - Blind / sign / unblind / verify arithmetic
//! - [`derive`] - Seed-based key derivation with fixed context strings

pub mod derive;
pub mod dhke;
pub mod hash_to_curve;
pub mod point;

pub use point::{PublicKey, SecretKey};

/// Error types for cryptographic operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CryptoError {
    /// Bytes do not decode to a point on the curve, or a result is the
    /// point at infinity.
    #[error("invalid curve point")]
    InvalidPoint,

    /// Scalar is zero or not below the curve order.
    #[error("invalid scalar")]
    InvalidScalar,

    /// No counter value produced a valid curve point.
    #[error("hash to curve failed")]
    HashToCurveFailed,

    /// The unblinded signature does not match `k * hash_to_curve(secret)`.
    #[error("signature verification failed")]
    VerificationFailed,

    /// Hex decoding failed.
    #[error("hex decoding failed: {0}")]
    Hex(String),
}

pub type Result<T> = std::result::Result<T, CryptoError>;
