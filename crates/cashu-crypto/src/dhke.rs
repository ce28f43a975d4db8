//! Blind Diffie-Hellman key exchange arithmetic.
//!
//! ## Protocol Flow
//!
//! 1. Holder: `Y = hash_to_curve(secret)`, `B_ = Y + r*G`
//! 2. Mint: `C_ = k * B_`
//! 3. Holder: `C = C_ - r*K` (which equals `k * Y`)
//! 4. Mint: accept iff `k * hash_to_curve(secret) == C`
//!
//! These are pure functions. Wire types and key lookup live in the mint and
//! wallet crates.

use crate::hash_to_curve::hash_to_curve;
use crate::point::{PublicKey, SecretKey};
use crate::{CryptoError, Result};

/// Blind a secret message.
///
/// Samples a fresh blinding factor unless one is given. Returns
/// `(B_, r)`.
pub fn blind_message(
    secret: &[u8],
    blinding_factor: Option<SecretKey>,
) -> Result<(PublicKey, SecretKey)> {
    let y = hash_to_curve(secret)?;
    let r = blinding_factor.unwrap_or_else(SecretKey::generate);
    let blinded = blind_point(&y, &r)?;
    Ok((blinded, r))
}

/// `B_ = Y + r*G` for an already hashed `Y`.
pub fn blind_point(y: &PublicKey, r: &SecretKey) -> Result<PublicKey> {
    y.add(&r.public_key())
}

/// Mint side: `C_ = k * B_`.
pub fn sign_message(k: &SecretKey, blinded_message: &PublicKey) -> Result<PublicKey> {
    blinded_message.mul(k)
}

/// Holder side: `C = C_ - r * K`.
pub fn unblind_message(
    blinded_signature: &PublicKey,
    r: &SecretKey,
    mint_pubkey: &PublicKey,
) -> Result<PublicKey> {
    let r_k = mint_pubkey.mul(r)?;
    blinded_signature.subtract(&r_k)
}

/// Check `k * hash_to_curve(secret) == C` on compressed bytes.
///
/// # Errors
///
/// [`CryptoError::VerificationFailed`] on mismatch. Hash-to-curve errors
/// propagate unchanged.
pub fn verify_message(k: &SecretKey, unblinded: &PublicKey, secret: &[u8]) -> Result<()> {
    let y = hash_to_curve(secret)?;
    let expected = y.mul(k)?;
    if expected.to_bytes() == unblinded.to_bytes() {
        Ok(())
    } else {
        Err(CryptoError::VerificationFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO_SECRET: &[u8] =
        b"407915bc212be61a77e3e6d2aeb4c727980bda51cd06a6afc29e2861768a7837";

    fn fixed_key(last: u8) -> SecretKey {
        let mut bytes = [0u8; 32];
        bytes[31] = last;
        SecretKey::from_slice(&bytes).expect("fixed scalar")
    }

    #[test]
    fn test_blind_sign_unblind_verify() {
        let k = SecretKey::generate();
        let (blinded, r) = blind_message(SCENARIO_SECRET, None).expect("blind");
        let signed = sign_message(&k, &blinded).expect("sign");
        let c = unblind_message(&signed, &r, &k.public_key()).expect("unblind");
        verify_message(&k, &c, SCENARIO_SECRET).expect("verify");
    }

    #[test]
    fn test_unblinded_equals_k_times_y() {
        let k = fixed_key(1);
        let r = fixed_key(1);
        let (blinded, r) = blind_message(SCENARIO_SECRET, Some(r)).expect("blind");
        let signed = sign_message(&k, &blinded).expect("sign");
        let c = unblind_message(&signed, &r, &k.public_key()).expect("unblind");

        let y = hash_to_curve(SCENARIO_SECRET).expect("hash to curve");
        assert_eq!(c.to_bytes(), y.mul(&k).expect("k*Y").to_bytes());
        // k = 1 so C = Y
        assert_eq!(c, y);
    }

    #[test]
    fn test_scenario_is_stable() {
        let run = || {
            let k = fixed_key(7);
            let (blinded, r) = blind_message(SCENARIO_SECRET, Some(fixed_key(3))).expect("blind");
            let signed = sign_message(&k, &blinded).expect("sign");
            unblind_message(&signed, &r, &k.public_key()).expect("unblind")
        };
        let c = run();
        assert_eq!(c.to_bytes(), run().to_bytes());
        assert_eq!(
            c.to_hex(),
            "0327e8d36342f162568675b1ad450067ff1f064c8489384d648325e25e90173f00"
        );
        verify_message(&fixed_key(7), &c, SCENARIO_SECRET).expect("verify");
    }

    #[test]
    fn test_blind_point_matches_blind_message() {
        let r = fixed_key(3);
        let (blinded, r) = blind_message(SCENARIO_SECRET, Some(r)).expect("blind");
        let y = hash_to_curve(SCENARIO_SECRET).expect("hash to curve");
        assert_eq!(blind_point(&y, &r).expect("blind point"), blinded);
    }

    #[test]
    fn test_mutated_signature_rejected() {
        let k = fixed_key(7);
        let (blinded, r) = blind_message(SCENARIO_SECRET, Some(fixed_key(3))).expect("blind");
        let signed = sign_message(&k, &blinded).expect("sign");
        let c = unblind_message(&signed, &r, &k.public_key()).expect("unblind");
        verify_message(&k, &c, SCENARIO_SECRET).expect("verify original");

        let original = c.to_bytes();
        for i in 0..original.len() {
            let mut mutated = original;
            mutated[i] ^= 0x01;
            // Either it no longer decodes or it is a different point.
            match PublicKey::from_slice(&mutated) {
                Ok(point) => assert_eq!(
                    verify_message(&k, &point, SCENARIO_SECRET),
                    Err(CryptoError::VerificationFailed)
                ),
                Err(e) => assert_eq!(e, CryptoError::InvalidPoint),
            }
        }
    }

    #[test]
    fn test_forgery_with_other_key_rejected() {
        let k = SecretKey::generate();
        let forger = SecretKey::generate();
        let (blinded, r) = blind_message(SCENARIO_SECRET, None).expect("blind");
        let signed = sign_message(&forger, &blinded).expect("sign");
        let c = unblind_message(&signed, &r, &forger.public_key()).expect("unblind");

        assert_eq!(
            verify_message(&k, &c, SCENARIO_SECRET),
            Err(CryptoError::VerificationFailed)
        );
        verify_message(&forger, &c, SCENARIO_SECRET).expect("forger key verifies its own");
    }

    #[test]
    fn test_unblind_with_wrong_mint_key_fails_verification() {
        let k = SecretKey::generate();
        let (blinded, r) = blind_message(SCENARIO_SECRET, None).expect("blind");
        let signed = sign_message(&k, &blinded).expect("sign");
        let wrong_k = SecretKey::generate().public_key();
        let c = unblind_message(&signed, &r, &wrong_k).expect("unblind");
        assert!(verify_message(&k, &c, SCENARIO_SECRET).is_err());
    }

    #[test]
    fn test_blinding_hides_y() {
        let (b1, _) = blind_message(SCENARIO_SECRET, None).expect("blind 1");
        let (b2, _) = blind_message(SCENARIO_SECRET, None).expect("blind 2");
        let y = hash_to_curve(SCENARIO_SECRET).expect("hash to curve");
        assert_ne!(b1, b2);
        assert_ne!(b1, y);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let k = SecretKey::generate();
        let (blinded, r) = blind_message(SCENARIO_SECRET, None).expect("blind");
        let signed = sign_message(&k, &blinded).expect("sign");
        let c = unblind_message(&signed, &r, &k.public_key()).expect("unblind");
        assert_eq!(
            verify_message(&k, &c, b"another secret"),
            Err(CryptoError::VerificationFailed)
        );
    }
}
