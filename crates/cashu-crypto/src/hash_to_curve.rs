//! Domain-separated hash-to-curve for secp256k1.
//!
//! ```text
//! msg_hash  = SHA256(DOMAIN_SEPARATOR || message)
//! candidate = SHA256(msg_hash || LE32(counter))     counter = 0, 1, ...
//! Y         = decode(0x02 || candidate)             first that is on the curve
//! ```
//!
//! Roughly half of all x-coordinates are on the curve, so the loop almost
//! always terminates within a handful of iterations.

use sha2::{Digest, Sha256};

use crate::point::{PublicKey, COMPRESSED_LEN};
use crate::{CryptoError, Result};

/// Protocol-wide domain separator. Must match every interoperating
/// implementation byte-for-byte.
pub const DOMAIN_SEPARATOR: &[u8] = b"Secp256k1_HashToCurve_Cashu_";

/// Compressed-point prefix used for every candidate (even y).
pub const EVEN_PREFIX: u8 = 0x02;

/// Map an arbitrary message to a curve point.
///
/// # Errors
///
/// [`CryptoError::HashToCurveFailed`] if no counter in the 32-bit space
/// yields a valid point.
pub fn hash_to_curve(message: &[u8]) -> Result<PublicKey> {
    let msg_hash: [u8; 32] = Sha256::new()
        .chain_update(DOMAIN_SEPARATOR)
        .chain_update(message)
        .finalize()
        .into();

    let mut candidate = [0u8; COMPRESSED_LEN];
    candidate[0] = EVEN_PREFIX;

    for counter in 0..=u32::MAX {
        let hash = Sha256::new()
            .chain_update(msg_hash)
            .chain_update(counter.to_le_bytes())
            .finalize();
        candidate[1..].copy_from_slice(&hash);
        if let Ok(point) = PublicKey::from_slice(&candidate) {
            return Ok(point);
        }
    }

    Err(CryptoError::HashToCurveFailed)
}
