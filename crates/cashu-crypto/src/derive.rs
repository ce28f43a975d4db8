//! Seed-based key derivation using BLAKE3's key derivation mode.
//!
//! A mint seed deterministically yields one private scalar per
//! `(unit, amount)`, so a keyset can be regenerated from the seed alone.
//!
//! ## Context Strings
//!
//! Every derivation uses one of the fixed strings in [`contexts`].

use crate::point::SecretKey;
use crate::{CryptoError, Result};

/// Registered BLAKE3 context strings.
pub mod contexts {
    pub const KEYSET_DERIVATION: &str = "cashu-core v1 keyset-derivation";
    pub const TEST_VECTOR_SEED: &str = "cashu-core v1 test-vector-seed";
}

/// Derive a 32-byte key with BLAKE3 `derive_key`.
pub fn derive_key(context: &str, key_material: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    let mut hasher = ::blake3::Hasher::new_derive_key(context);
    hasher.update(key_material);
    out.copy_from_slice(hasher.finalize().as_bytes());
    out
}

/// Encode multiple dynamic fields using length-prefixed encoding.
///
/// `LE32(len(field1)) || field1 || LE32(len(field2)) || field2 || ...`
pub fn encode_multi_field(fields: &[&[u8]]) -> Vec<u8> {
    let total_len: usize = fields.iter().map(|f| 4 + f.len()).sum();
    let mut output = Vec::with_capacity(total_len);
    for field in fields {
        output.extend_from_slice(&(field.len() as u32).to_le_bytes());
        output.extend_from_slice(field);
    }
    output
}

/// Derive the mint's private key for one denomination.
///
/// Key material is `seed || unit || LE64(amount) || LE32(counter)`,
/// length-prefixed. The counter starts at 0 and only advances when the
/// derived bytes are not a valid scalar.
///
/// # Errors
///
/// [`CryptoError::InvalidScalar`] if every counter value fails, which does
/// not happen in practice.
pub fn derive_amount_key(seed: &[u8], unit: &str, amount: u64) -> Result<SecretKey> {
    let amount_bytes = amount.to_le_bytes();
    for counter in 0u32..=u32::MAX {
        let counter_bytes = counter.to_le_bytes();
        let material = zeroize::Zeroizing::new(encode_multi_field(&[
            seed,
            unit.as_bytes(),
            &amount_bytes,
            &counter_bytes,
        ]));
        let candidate = zeroize::Zeroizing::new(derive_key(contexts::KEYSET_DERIVATION, &material));
        if let Ok(key) = SecretKey::from_slice(&candidate[..]) {
            return Ok(key);
        }
    }
    Err(CryptoError::InvalidScalar)
}
