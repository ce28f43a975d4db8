//! The blinded message, blind signature and proof exchanged by the BDHKE
//! protocol.
//!
//! Field names on the wire follow the protocol: `B_` for the blinded
//! secret, `C_` for the blind signature and `C` for the unblinded one.

use std::fmt;

use cashu_crypto::hash_to_curve::hash_to_curve;
use cashu_crypto::PublicKey;
use serde::{Deserialize, Serialize};

use crate::keyset::KeysetId;
use crate::{Amount, Result};

/// Length in bytes of a randomly generated secret before hex encoding.
pub const SECRET_BYTES: usize = 32;

/// Holder-chosen secret. Hash-to-curve runs over its UTF-8 bytes.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// 32 random bytes, hex-encoded.
    pub fn generate() -> Self {
        let mut bytes = [0u8; SECRET_BYTES];
        rand::RngCore::fill_bytes(&mut rand::rngs::OsRng, &mut bytes);
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Y = hash_to_curve(secret)`.
    pub fn to_point(&self) -> Result<PublicKey> {
        Ok(hash_to_curve(self.as_bytes())?)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

/// `{amount, id, B_}` sent by the holder to the mint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlindedMessage {
    pub amount: Amount,
    pub id: KeysetId,
    #[serde(rename = "B_")]
    pub blinded_secret: PublicKey,
}

/// `{amount, id, C_}` returned by the mint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlindSignature {
    pub amount: Amount,
    pub id: KeysetId,
    #[serde(rename = "C_")]
    pub c: PublicKey,
}

/// An unblinded signature over a secret: the bearer credential.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Proof {
    pub amount: Amount,
    pub id: KeysetId,
    pub secret: Secret,
    #[serde(rename = "C")]
    pub c: PublicKey,
}

impl Proof {
    /// `Y = hash_to_curve(secret)`, the identifier spent ledgers key on.
    pub fn y(&self) -> Result<PublicKey> {
        self.secret.to_point()
    }
}

#[cfg(test)]
mod tests {
    use cashu_crypto::SecretKey;

    use super::*;

    fn sample_id() -> KeysetId {
        "009a1f293253e41e".parse().expect("keyset id")
    }

    #[test]
    fn test_generated_secret_shape() {
        let s1 = Secret::generate();
        let s2 = Secret::generate();
        assert_eq!(s1.as_str().len(), SECRET_BYTES * 2);
        assert!(s1.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(s1, s2);
    }

    #[test]
    fn test_secret_debug_redacted() {
        let secret = Secret::new("very secret");
        assert!(!format!("{secret:?}").contains("very secret"));
    }

    #[test]
    fn test_proof_json_field_names() {
        let proof = Proof {
            amount: 8,
            id: sample_id(),
            secret: Secret::new("abc"),
            c: SecretKey::generate().public_key(),
        };
        let json = serde_json::to_value(&proof).expect("serialize");
        assert_eq!(json["amount"], 8);
        assert_eq!(json["id"], "009a1f293253e41e");
        assert_eq!(json["secret"], "abc");
        assert_eq!(json["C"], proof.c.to_hex());

        let restored: Proof = serde_json::from_value(json).expect("deserialize");
        assert_eq!(restored, proof);
    }

    #[test]
    fn test_blinded_message_field_names() {
        let msg = BlindedMessage {
            amount: 2,
            id: sample_id(),
            blinded_secret: SecretKey::generate().public_key(),
        };
        let json = serde_json::to_value(&msg).expect("serialize");
        assert_eq!(json["B_"], msg.blinded_secret.to_hex());
    }

    #[test]
    fn test_blind_signature_field_names() {
        let sig = BlindSignature {
            amount: 2,
            id: sample_id(),
            c: SecretKey::generate().public_key(),
        };
        let json = serde_json::to_value(&sig).expect("serialize");
        assert_eq!(json["C_"], sig.c.to_hex());
    }

    #[test]
    fn test_proof_y_matches_hash_to_curve() {
        let proof = Proof {
            amount: 1,
            id: sample_id(),
            secret: Secret::new("407915bc212be61a77e3e6d2aeb4c727980bda51cd06a6afc29e2861768a7837"),
            c: SecretKey::generate().public_key(),
        };
        let expected = hash_to_curve(proof.secret.as_bytes()).expect("hash to curve");
        assert_eq!(proof.y().expect("y"), expected);
    }
}
