//! secp256k1 point and scalar wrappers.
//!
//! [`PublicKey`] is a curve point that is never the identity. Every
//! operation that could land on the point at infinity reports
//! [`CryptoError::InvalidPoint`] instead. [`SecretKey`] is a scalar in
//! `[1, n)`; it is zeroized on drop and redacted from `Debug` output.
//!
//! Scalar multiplication goes through `k256`, which is constant-time with
//! respect to the scalar.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{ProjectivePoint, Scalar};
use serde::de::{self, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{CryptoError, Result};

/// Length of a compressed SEC1 point.
pub const COMPRESSED_LEN: usize = 33;

/// Length of a serialized scalar.
pub const SECRET_KEY_LEN: usize = 32;

/// A non-identity secp256k1 point.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(ProjectivePoint);

impl PublicKey {
    /// The curve generator `G`.
    pub const GENERATOR: Self = PublicKey(ProjectivePoint::GENERATOR);

    /// Decode a 33-byte compressed point.
    ///
    /// # Errors
    ///
    /// [`CryptoError::InvalidPoint`] if the length is wrong or the bytes are
    /// not a point on the curve.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != COMPRESSED_LEN {
            return Err(CryptoError::InvalidPoint);
        }
        let key = k256::PublicKey::from_sec1_bytes(bytes).map_err(|_| CryptoError::InvalidPoint)?;
        Self::from_projective(key.to_projective())
    }

    /// Decode a hex-encoded compressed point.
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let bytes = hex::decode(hex_str).map_err(|e| CryptoError::Hex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Compressed SEC1 encoding.
    pub fn to_bytes(&self) -> [u8; COMPRESSED_LEN] {
        let encoded = self.0.to_affine().to_encoded_point(true);
        let mut out = [0u8; COMPRESSED_LEN];
        out.copy_from_slice(encoded.as_bytes());
        out
    }

    /// Lowercase hex of the compressed encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    fn from_projective(point: ProjectivePoint) -> Result<Self> {
        if point == ProjectivePoint::IDENTITY {
            return Err(CryptoError::InvalidPoint);
        }
        Ok(Self(point))
    }

    /// `self + other`.
    pub fn add(&self, other: &PublicKey) -> Result<Self> {
        Self::from_projective(self.0 + other.0)
    }

    /// `self + (-other)`.
    pub fn subtract(&self, other: &PublicKey) -> Result<Self> {
        let negated = -other.0;
        Self::from_projective(self.0 + negated)
    }

    /// `scalar * self`.
    pub fn mul(&self, scalar: &SecretKey) -> Result<Self> {
        Self::from_projective(self.0 * scalar.as_scalar())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Hash for PublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_bytes().hash(state);
    }
}

impl PartialOrd for PublicKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PublicKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_bytes().cmp(&other.to_bytes())
    }
}

impl std::str::FromStr for PublicKey {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            serializer.serialize_bytes(&self.to_bytes())
        }
    }
}

struct PublicKeyVisitor;

impl<'de> Visitor<'de> for PublicKeyVisitor {
    type Value = PublicKey;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a compressed secp256k1 point as hex or 33 bytes")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<PublicKey, E> {
        PublicKey::from_hex(v).map_err(E::custom)
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> std::result::Result<PublicKey, E> {
        PublicKey::from_slice(v).map_err(E::custom)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<PublicKey, A::Error> {
        let mut bytes = Vec::with_capacity(COMPRESSED_LEN);
        while let Some(b) = seq.next_element::<u8>()? {
            bytes.push(b);
        }
        PublicKey::from_slice(&bytes).map_err(de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            deserializer.deserialize_str(PublicKeyVisitor)
        } else {
            deserializer.deserialize_bytes(PublicKeyVisitor)
        }
    }
}

/// A secp256k1 scalar in `[1, n)`.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(k256::SecretKey);

impl SecretKey {
    /// Sample a uniformly random scalar from the OS RNG.
    pub fn generate() -> Self {
        Self(k256::SecretKey::random(&mut rand::rngs::OsRng))
    }

    /// Decode a 32-byte big-endian scalar.
    ///
    /// # Errors
    ///
    /// [`CryptoError::InvalidScalar`] if the length is not 32, the value is
    /// zero, or it is not below the curve order.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != SECRET_KEY_LEN {
            return Err(CryptoError::InvalidScalar);
        }
        k256::SecretKey::from_slice(bytes)
            .map(Self)
            .map_err(|_| CryptoError::InvalidScalar)
    }

    /// Decode a hex-encoded scalar.
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let bytes = zeroize::Zeroizing::new(
            hex::decode(hex_str).map_err(|e| CryptoError::Hex(e.to_string()))?,
        );
        Self::from_slice(&bytes)
    }

    /// Big-endian scalar bytes. The caller owns zeroizing the copy.
    pub fn to_secret_bytes(&self) -> zeroize::Zeroizing<[u8; SECRET_KEY_LEN]> {
        let mut out = zeroize::Zeroizing::new([0u8; SECRET_KEY_LEN]);
        out.copy_from_slice(&self.0.to_bytes());
        out
    }

    /// Lowercase hex of the scalar bytes.
    pub fn to_secret_hex(&self) -> String {
        hex::encode(&self.to_secret_bytes()[..])
    }

    /// `self * G`.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.0.public_key().to_projective())
    }

    pub(crate) fn as_scalar(&self) -> Scalar {
        *self.0.to_nonzero_scalar()
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_matches_scalar_one() {
        let mut one = [0u8; 32];
        one[31] = 1;
        let sk = SecretKey::from_slice(&one).expect("scalar one");
        assert_eq!(sk.public_key(), PublicKey::GENERATOR);
        assert_eq!(
            PublicKey::GENERATOR.to_hex(),
            "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        );
    }

    #[test]
    fn test_add_then_subtract_is_identity() {
        let g = PublicKey::GENERATOR;
        for _ in 0..16 {
            let p = SecretKey::generate().public_key();
            let sum = p.add(&g).expect("add");
            let back = sum.subtract(&g).expect("subtract");
            assert_eq!(back.to_bytes(), p.to_bytes());
        }
    }

    #[test]
    fn test_subtract_self_is_infinity() {
        let p = SecretKey::generate().public_key();
        assert_eq!(p.subtract(&p), Err(CryptoError::InvalidPoint));
    }

    #[test]
    fn test_mul_matches_public_key() {
        let k = SecretKey::generate();
        let via_mul = PublicKey::GENERATOR.mul(&k).expect("mul");
        assert_eq!(via_mul, k.public_key());
    }

    #[test]
    fn test_compressed_roundtrip() {
        let p = SecretKey::generate().public_key();
        let bytes = p.to_bytes();
        assert!(bytes[0] == 0x02 || bytes[0] == 0x03);
        assert_eq!(PublicKey::from_slice(&bytes).expect("decode"), p);
        assert_eq!(PublicKey::from_hex(&p.to_hex()).expect("hex"), p);
    }

    #[test]
    fn test_invalid_point_rejected() {
        assert_eq!(PublicKey::from_slice(&[0u8; 33]), Err(CryptoError::InvalidPoint));
        assert_eq!(PublicKey::from_slice(&[0x02; 32]), Err(CryptoError::InvalidPoint));

        // x = 5 has no square root on secp256k1
        let mut not_on_curve = [0u8; 33];
        not_on_curve[0] = 0x02;
        not_on_curve[32] = 0x05;
        assert_eq!(PublicKey::from_slice(&not_on_curve), Err(CryptoError::InvalidPoint));
    }

    #[test]
    fn test_uncompressed_rejected() {
        let p = SecretKey::generate().public_key();
        let uncompressed = p.0.to_affine().to_encoded_point(false);
        assert_eq!(
            PublicKey::from_slice(uncompressed.as_bytes()),
            Err(CryptoError::InvalidPoint)
        );
    }

    #[test]
    fn test_invalid_scalar_rejected() {
        assert_eq!(SecretKey::from_slice(&[0u8; 32]), Err(CryptoError::InvalidScalar));
        assert_eq!(SecretKey::from_slice(&[0xFF; 32]), Err(CryptoError::InvalidScalar));
        assert_eq!(SecretKey::from_slice(&[0x01; 16]), Err(CryptoError::InvalidScalar));
    }

    #[test]
    fn test_secret_hex_roundtrip() {
        let sk = SecretKey::generate();
        let restored = SecretKey::from_hex(&sk.to_secret_hex()).expect("from hex");
        assert_eq!(sk, restored);
    }

    #[test]
    fn test_secret_debug_redacted() {
        let sk = SecretKey::generate();
        let debug = format!("{sk:?}");
        assert!(!debug.contains(&sk.to_secret_hex()));
    }

    #[test]
    fn test_public_key_json_is_hex() {
        let p = SecretKey::generate().public_key();
        let json = serde_json::to_string(&p).expect("serialize");
        assert_eq!(json, format!("\"{}\"", p.to_hex()));
        let restored: PublicKey = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored, p);
    }
}
