//! Test vector generator for the cashu core.
//!
//! Writes `tests/fixtures/test_vectors.json` with hash-to-curve, keyset id,
//! seed derivation, blind signature and token encoding vectors. Other
//! implementations check against this file for interoperability.
//!
//! Usage:
//!   cashu-testvec              # Generate test_vectors.json
//!   cashu-testvec --verify     # Verify test vectors match expected values

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use cashu_crypto::derive::{contexts, derive_amount_key, derive_key};
use cashu_crypto::dhke::{blind_message, sign_message, unblind_message, verify_message};
use cashu_crypto::hash_to_curve::hash_to_curve;
use cashu_crypto::{PublicKey, SecretKey};
use cashu_types::{Keyset, KeysetId, Proof, Secret, Token, TokenVersion};
use serde::{Deserialize, Serialize};

const FIXTURE_PATH: &str = "tests/fixtures/test_vectors.json";

const SCENARIO_SECRET: &str = "407915bc212be61a77e3e6d2aeb4c727980bda51cd06a6afc29e2861768a7837";

#[derive(Serialize, Deserialize)]
struct TestVectors {
    version: String,
    generated_by: String,
    vectors: BTreeMap<String, TestVector>,
}

#[derive(Serialize, Deserialize)]
struct TestVector {
    description: String,
    inputs: BTreeMap<String, String>,
    outputs: BTreeMap<String, String>,
}

fn entry(pairs: &[(&str, String)]) -> BTreeMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

/// Scalar `n` as a 32-byte big-endian key.
fn small_key(n: u8) -> anyhow::Result<SecretKey> {
    let mut bytes = [0u8; 32];
    bytes[31] = n;
    Ok(SecretKey::from_slice(&bytes)?)
}

fn generate_hash_to_curve_vectors() -> anyhow::Result<BTreeMap<String, TestVector>> {
    let mut vectors = BTreeMap::new();

    for last in [0u8, 1, 2] {
        let mut message = [0u8; 32];
        message[31] = last;
        let point = hash_to_curve(&message)?;
        vectors.insert(
            format!("hash_to_curve_{last:02x}"),
            TestVector {
                description: format!("hash_to_curve(0x00*31 || {last:02x})"),
                inputs: entry(&[("message", hex::encode(message))]),
                outputs: entry(&[("point", point.to_hex())]),
            },
        );
    }

    let point = hash_to_curve(SCENARIO_SECRET.as_bytes())?;
    vectors.insert(
        "hash_to_curve_scenario_secret".to_string(),
        TestVector {
            description: "hash_to_curve over the UTF-8 bytes of the scenario secret".to_string(),
            inputs: entry(&[("message", SCENARIO_SECRET.to_string())]),
            outputs: entry(&[("point", point.to_hex())]),
        },
    );

    Ok(vectors)
}

fn fixed_keyset() -> anyhow::Result<Keyset> {
    let mut keys = BTreeMap::new();
    for (i, amount) in [1u64, 2, 4, 8].into_iter().enumerate() {
        let scalar = u8::try_from(i + 1)?;
        keys.insert(amount, small_key(scalar)?.public_key());
    }
    Ok(Keyset::new(cashu_types::CurrencyUnit::Sat, keys))
}

fn generate_keyset_vectors() -> anyhow::Result<BTreeMap<String, TestVector>> {
    let mut vectors = BTreeMap::new();

    let keyset = fixed_keyset()?;
    let mut inputs: BTreeMap<String, String> = keyset
        .keys
        .iter()
        .map(|(amount, key)| (format!("key_{amount}"), key.to_hex()))
        .collect();
    inputs.insert("unit".to_string(), keyset.unit.to_string());
    vectors.insert(
        "keyset_id_fixed_keys".to_string(),
        TestVector {
            description: "00 || SHA256(K_1 || K_2 || K_4 || K_8)[..7] with K_a = (index+1)*G"
                .to_string(),
            inputs,
            outputs: entry(&[("id", KeysetId::from_keys(&keyset.keys).to_string())]),
        },
    );

    let seed = derive_key(contexts::TEST_VECTOR_SEED, b"");
    let derived = derive_amount_key(&seed, "sat", 1)?;
    vectors.insert(
        "derive_amount_key_sat_1".to_string(),
        TestVector {
            description: "derive_amount_key(derive_key(test-vector-seed, \"\"), \"sat\", 1)"
                .to_string(),
            inputs: entry(&[
                ("seed", hex::encode(seed)),
                ("unit", "sat".to_string()),
                ("amount", "1".to_string()),
            ]),
            outputs: entry(&[("public_key", derived.public_key().to_hex())]),
        },
    );

    Ok(vectors)
}

fn generate_dhke_vectors() -> anyhow::Result<BTreeMap<String, TestVector>> {
    let mut vectors = BTreeMap::new();

    let k = small_key(7)?;
    let r = small_key(3)?;
    let (blinded, r) = blind_message(SCENARIO_SECRET.as_bytes(), Some(r))?;
    let signed = sign_message(&k, &blinded)?;
    let unblinded = unblind_message(&signed, &r, &k.public_key())?;
    let verified = verify_message(&k, &unblinded, SCENARIO_SECRET.as_bytes()).is_ok();

    vectors.insert(
        "dhke_scenario".to_string(),
        TestVector {
            description: "Blind, sign, unblind and verify with k = 7, r = 3".to_string(),
            inputs: entry(&[
                ("secret", SCENARIO_SECRET.to_string()),
                ("k", k.to_secret_hex()),
                ("r", r.to_secret_hex()),
            ]),
            outputs: entry(&[
                ("K", k.public_key().to_hex()),
                ("B_", blinded.to_hex()),
                ("C_", signed.to_hex()),
                ("C", unblinded.to_hex()),
                ("verified", verified.to_string()),
            ]),
        },
    );

    // With k = r = 1 the unblinded signature is Y itself.
    let one = small_key(1)?;
    let (blinded, one_r) = blind_message(SCENARIO_SECRET.as_bytes(), Some(one.clone()))?;
    let signed = sign_message(&one, &blinded)?;
    let unblinded = unblind_message(&signed, &one_r, &one.public_key())?;
    vectors.insert(
        "dhke_unit_keys".to_string(),
        TestVector {
            description: "With k = r = 1, C equals hash_to_curve(secret)".to_string(),
            inputs: entry(&[("secret", SCENARIO_SECRET.to_string())]),
            outputs: entry(&[("C", unblinded.to_hex())]),
        },
    );

    Ok(vectors)
}

fn generate_token_vectors() -> anyhow::Result<BTreeMap<String, TestVector>> {
    let mut vectors = BTreeMap::new();

    let keyset = fixed_keyset()?;
    let secret = Secret::new(SCENARIO_SECRET);
    let c: PublicKey = hash_to_curve(secret.as_bytes())?.mul(&small_key(2)?)?;
    let proof = Proof {
        amount: 2,
        id: keyset.id,
        secret,
        c,
    };
    let token = Token::new(
        "https://mint.example.com",
        vec![proof],
        Some(cashu_types::CurrencyUnit::Sat),
        Some("test vector".to_string()),
    );

    for version in TokenVersion::ALL {
        let marker = version.marker();
        vectors.insert(
            format!("token_{}", marker.to_ascii_lowercase()),
            TestVector {
                description: format!("Single-proof token serialized with marker {marker}"),
                inputs: entry(&[
                    ("mint", "https://mint.example.com".to_string()),
                    ("keyset_id", keyset.id.to_string()),
                    ("amount", "2".to_string()),
                    ("secret", SCENARIO_SECRET.to_string()),
                    ("unit", "sat".to_string()),
                    ("memo", "test vector".to_string()),
                ]),
                outputs: entry(&[("token", token.serialize(version)?)]),
            },
        );
    }

    Ok(vectors)
}

fn generate_all_vectors() -> anyhow::Result<TestVectors> {
    let mut all_vectors = BTreeMap::new();

    all_vectors.extend(generate_hash_to_curve_vectors()?);
    all_vectors.extend(generate_keyset_vectors()?);
    all_vectors.extend(generate_dhke_vectors()?);
    all_vectors.extend(generate_token_vectors()?);

    Ok(TestVectors {
        version: "1.0".to_string(),
        generated_by: "cashu-testvec".to_string(),
        vectors: all_vectors,
    })
}

fn verify_vectors(vectors: &TestVectors) -> anyhow::Result<bool> {
    let regenerated = generate_all_vectors()?;
    let mut all_pass = true;

    for (name, expected) in &vectors.vectors {
        match regenerated.vectors.get(name) {
            Some(actual) if actual.outputs == expected.outputs => eprintln!("PASS: {name}"),
            Some(actual) => {
                eprintln!("FAIL: {name}");
                eprintln!("  expected: {:?}", expected.outputs);
                eprintln!("  actual:   {:?}", actual.outputs);
                all_pass = false;
            }
            None => {
                eprintln!("MISSING: {name}");
                all_pass = false;
            }
        }
    }

    Ok(all_pass)
}

fn write_vectors(path: &Path, vectors: &TestVectors) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(vectors)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    eprintln!("Generated {} test vectors to {}", vectors.vectors.len(), path.display());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let verify = std::env::args().any(|a| a == "--verify");
    let path = Path::new(FIXTURE_PATH);

    let vectors = if verify && path.exists() {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))?
    } else {
        if verify {
            eprintln!("No existing test vectors found at {}. Generating...", path.display());
        }
        let vectors = generate_all_vectors()?;
        write_vectors(path, &vectors)?;
        vectors
    };

    if verify_vectors(&vectors)? {
        eprintln!("All test vectors verified successfully.");
        Ok(())
    } else {
        anyhow::bail!("test vector verification failed")
    }
}
