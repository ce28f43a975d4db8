//! Holder side of blind issuance.
//!
//! ## Protocol Flow
//!
//! 1. Holder: `blind(secret, amount, keyset_id)` -> `(BlindedMessage, BlindingContext)`
//! 2. Mint: `sign(blinded_message)` -> `BlindSignature`
//! 3. Holder: `unblind(signature, context, K)` -> `Proof`
//!
//! The [`BlindingContext`] is not `Clone` and is consumed by [`unblind`],
//! so the blinding factor does not outlive the round trip.

use std::fmt;

use cashu_crypto::dhke::{blind_point, unblind_message};
use cashu_crypto::{PublicKey, SecretKey};
use cashu_types::{Amount, BlindSignature, BlindedMessage, Keyset, KeysetId, Proof, Secret};

use crate::select::split_amount;
use crate::{Result, WalletError};

/// State retained by the holder between blinding and unblinding.
pub struct BlindingContext {
    amount: Amount,
    keyset_id: KeysetId,
    secret: Secret,
    r: SecretKey,
    y: PublicKey,
}

impl BlindingContext {
    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn keyset_id(&self) -> KeysetId {
        self.keyset_id
    }

    /// `Y = hash_to_curve(secret)`.
    pub fn y(&self) -> PublicKey {
        self.y
    }
}

impl fmt::Debug for BlindingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlindingContext")
            .field("amount", &self.amount)
            .field("keyset_id", &self.keyset_id)
            .field("y", &self.y)
            .finish_non_exhaustive()
    }
}

/// Blind a secret for the given amount and keyset with a fresh blinding
/// factor.
pub fn blind(
    secret: Secret,
    amount: Amount,
    keyset_id: KeysetId,
) -> Result<(BlindedMessage, BlindingContext)> {
    blind_with_factor(secret, amount, keyset_id, SecretKey::generate())
}

/// Blind with a caller-supplied blinding factor. Used for reproducible
/// vectors; production callers use [`blind`].
pub fn blind_with_factor(
    secret: Secret,
    amount: Amount,
    keyset_id: KeysetId,
    r: SecretKey,
) -> Result<(BlindedMessage, BlindingContext)> {
    if amount == 0 {
        return Err(WalletError::InvalidAmount(0));
    }
    let y = secret.to_point()?;
    let blinded_secret = blind_point(&y, &r)?;

    let message = BlindedMessage {
        amount,
        id: keyset_id,
        blinded_secret,
    };
    let context = BlindingContext {
        amount,
        keyset_id,
        secret,
        r,
        y,
    };
    Ok((message, context))
}

/// Unblind a mint signature into a proof, consuming the context.
///
/// # Errors
///
/// - [`WalletError::SignatureMismatch`] if the signature's amount or keyset
///   differs from the context
/// - [`WalletError::Crypto`] if unblinding lands on the point at infinity
pub fn unblind(
    signature: &BlindSignature,
    context: BlindingContext,
    mint_pubkey: &PublicKey,
) -> Result<Proof> {
    if signature.amount != context.amount {
        return Err(WalletError::SignatureMismatch(format!(
            "amount {} does not match blinded amount {}",
            signature.amount, context.amount
        )));
    }
    if signature.id != context.keyset_id {
        return Err(WalletError::SignatureMismatch(format!(
            "keyset {} does not match blinded keyset {}",
            signature.id, context.keyset_id
        )));
    }

    let c = unblind_message(&signature.c, &context.r, mint_pubkey)?;

    Ok(Proof {
        amount: context.amount,
        id: context.keyset_id,
        secret: context.secret,
        c,
    })
}

/// A blinded message together with its context.
#[derive(Debug)]
pub struct PreMint {
    pub blinded_message: BlindedMessage,
    pub context: BlindingContext,
}

/// The outputs for one issuance request.
#[derive(Debug)]
pub struct PreMintSecrets {
    keyset_id: KeysetId,
    secrets: Vec<PreMint>,
}

impl PreMintSecrets {
    /// Split `amount` into powers of two and blind one random secret per
    /// part.
    ///
    /// # Errors
    ///
    /// [`WalletError::InvalidAmount`] if `amount` is zero.
    pub fn random(keyset_id: KeysetId, amount: Amount) -> Result<Self> {
        if amount == 0 {
            return Err(WalletError::InvalidAmount(0));
        }
        let secrets = split_amount(amount)
            .into_iter()
            .map(|part| {
                let (blinded_message, context) = blind(Secret::generate(), part, keyset_id)?;
                Ok(PreMint {
                    blinded_message,
                    context,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(amount, outputs = secrets.len(), %keyset_id, "blinded outputs prepared");
        Ok(Self { keyset_id, secrets })
    }

    /// Blind caller-chosen secrets, one per amount.
    pub fn from_secrets(
        keyset_id: KeysetId,
        outputs: impl IntoIterator<Item = (Amount, Secret)>,
    ) -> Result<Self> {
        let secrets = outputs
            .into_iter()
            .map(|(amount, secret)| {
                let (blinded_message, context) = blind(secret, amount, keyset_id)?;
                Ok(PreMint {
                    blinded_message,
                    context,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { keyset_id, secrets })
    }

    pub fn keyset_id(&self) -> KeysetId {
        self.keyset_id
    }

    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }

    /// Messages to send to the mint, in output order.
    pub fn blinded_messages(&self) -> Vec<BlindedMessage> {
        self.secrets.iter().map(|p| p.blinded_message.clone()).collect()
    }

    pub fn total_amount(&self) -> Result<Amount> {
        self.secrets
            .iter()
            .try_fold(0u64, |acc, p| acc.checked_add(p.blinded_message.amount))
            .ok_or(WalletError::AmountOverflow)
    }

    /// Unblind the mint's signatures into proofs.
    ///
    /// Signatures must be in output order. Returns every proof or none.
    ///
    /// # Errors
    ///
    /// - [`WalletError::SignatureMismatch`] on a count, amount or keyset mismatch
    /// - [`WalletError::UnknownDenomination`] if `keyset` lacks a needed key
    pub fn into_proofs(self, signatures: &[BlindSignature], keyset: &Keyset) -> Result<Vec<Proof>> {
        if signatures.len() != self.secrets.len() {
            return Err(WalletError::SignatureMismatch(format!(
                "expected {} signatures, got {}",
                self.secrets.len(),
                signatures.len()
            )));
        }
        if keyset.id != self.keyset_id {
            return Err(WalletError::SignatureMismatch(format!(
                "keyset {} does not match outputs keyset {}",
                keyset.id, self.keyset_id
            )));
        }

        self.secrets
            .into_iter()
            .zip(signatures)
            .map(|(premint, signature)| {
                let mint_pubkey = keyset
                    .lookup(premint.context.amount)
                    .ok_or(WalletError::UnknownDenomination(premint.context.amount))?;
                unblind(signature, premint.context, &mint_pubkey)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use cashu_mint::{Mint, MintKeyset};
    use cashu_types::CurrencyUnit;

    use super::*;

    fn setup() -> (Mint, Keyset) {
        let keyset =
            MintKeyset::generate(b"wallet tests", CurrencyUnit::Sat, 16).expect("keyset");
        let public = keyset.keyset();
        let mint = Mint::with_keysets([keyset]).expect("mint");
        (mint, public)
    }

    #[test]
    fn test_blind_sign_unblind_verify() {
        let (mint, keyset) = setup();
        let (message, context) = blind(Secret::generate(), 8, keyset.id).expect("blind");
        let signature = mint.sign(&message).expect("sign");
        let k = keyset.lookup(8).expect("key");
        let proof = unblind(&signature, context, &k).expect("unblind");
        assert_eq!(proof.amount, 8);
        assert_eq!(proof.id, keyset.id);
        mint.verify_proof(&proof).expect("verify");
    }

    #[test]
    fn test_context_y_matches_secret() {
        let (_, keyset) = setup();
        let secret = Secret::generate();
        let (message, context) = blind(secret.clone(), 1, keyset.id).expect("blind");
        assert_eq!(context.y(), secret.to_point().expect("y"));
        assert_ne!(message.blinded_secret, context.y());
    }

    #[test]
    fn test_blinded_secret_is_y_plus_rg() {
        let (_, keyset) = setup();
        let secret = Secret::generate();
        let r = SecretKey::from_slice(&[0x11; 32]).expect("r");
        let (message, context) =
            blind_with_factor(secret.clone(), 4, keyset.id, r.clone()).expect("blind");
        let expected = secret
            .to_point()
            .expect("y")
            .add(&r.public_key())
            .expect("y + rG");
        assert_eq!(message.blinded_secret, expected);
        assert_eq!(context.y(), secret.to_point().expect("y"));
    }

    #[test]
    fn test_zero_amount_rejected() {
        let (_, keyset) = setup();
        assert!(matches!(
            blind(Secret::generate(), 0, keyset.id),
            Err(WalletError::InvalidAmount(0))
        ));
        assert!(PreMintSecrets::random(keyset.id, 0).is_err());
    }

    #[test]
    fn test_unblind_rejects_mismatched_signature() {
        let (mint, keyset) = setup();
        let (_m1, c1) = blind(Secret::generate(), 2, keyset.id).expect("blind 1");
        let (m2, _c2) = blind(Secret::generate(), 4, keyset.id).expect("blind 2");
        let sig_for_4 = mint.sign(&m2).expect("sign");
        let k = keyset.lookup(2).expect("key");
        assert!(matches!(
            unblind(&sig_for_4, c1, &k),
            Err(WalletError::SignatureMismatch(_))
        ));
    }

    #[test]
    fn test_fixed_factor_is_reproducible() {
        let (mint, keyset) = setup();
        let secret =
            Secret::new("407915bc212be61a77e3e6d2aeb4c727980bda51cd06a6afc29e2861768a7837");
        let r_hex = "0000000000000000000000000000000000000000000000000000000000000003";
        let run = || {
            let r = SecretKey::from_hex(r_hex).expect("r");
            let (message, context) =
                blind_with_factor(secret.clone(), 1, keyset.id, r).expect("blind");
            let sig = mint.sign(&message).expect("sign");
            unblind(&sig, context, &keyset.lookup(1).expect("key")).expect("unblind")
        };
        let p1 = run();
        let p2 = run();
        assert_eq!(p1.c.to_bytes(), p2.c.to_bytes());
        mint.verify_proof(&p1).expect("verify");
    }

    #[test]
    fn test_premint_roundtrip() {
        let (mint, keyset) = setup();
        let premint = PreMintSecrets::random(keyset.id, 13).expect("premint");
        assert_eq!(premint.len(), 3);
        assert_eq!(premint.total_amount().expect("total"), 13);

        let messages = premint.blinded_messages();
        let amounts: Vec<Amount> = messages.iter().map(|m| m.amount).collect();
        assert_eq!(amounts, vec![1, 4, 8]);

        let signatures = mint.sign_all(&messages).expect("sign all");
        let proofs = premint.into_proofs(&signatures, &keyset).expect("proofs");
        assert_eq!(proofs.len(), 3);
        for proof in &proofs {
            mint.verify_proof(proof).expect("verify");
        }
    }

    #[test]
    fn test_into_proofs_requires_all_signatures() {
        let (mint, keyset) = setup();
        let premint = PreMintSecrets::random(keyset.id, 3).expect("premint");
        let messages = premint.blinded_messages();
        let signatures = mint.sign_all(&messages[..1]).expect("sign one");
        assert!(matches!(
            premint.into_proofs(&signatures, &keyset),
            Err(WalletError::SignatureMismatch(_))
        ));
    }

    #[test]
    fn test_from_secrets_keeps_order() {
        let (mint, keyset) = setup();
        let s1 = Secret::generate();
        let s2 = Secret::generate();
        let premint = PreMintSecrets::from_secrets(keyset.id, [(2, s1.clone()), (1, s2.clone())])
            .expect("premint");
        let signatures = mint.sign_all(&premint.blinded_messages()).expect("sign");
        let proofs = premint.into_proofs(&signatures, &keyset).expect("proofs");
        assert_eq!(proofs[0].secret, s1);
        assert_eq!(proofs[1].secret, s2);
    }

    #[test]
    fn test_context_debug_hides_secret() {
        let (_, keyset) = setup();
        let (_, context) = blind(Secret::new("do-not-print"), 1, keyset.id).expect("blind");
        assert!(!format!("{context:?}").contains("do-not-print"));
    }
}
