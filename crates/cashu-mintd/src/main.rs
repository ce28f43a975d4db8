//! cashu-mintd: mint setup.
//!
//! Loads the configuration, builds one keyset per configured unit, runs a
//! blind-sign round trip against every keyset, and prints the public mint
//! description (info plus keysets) as JSON on stdout.

mod config;

use anyhow::Context;
use cashu_mint::{Mint, MintKeyset};
use cashu_types::{Keyset, Options, Secret};
use cashu_wallet::PreMintSecrets;
use serde::Serialize;
use tracing::info;

use crate::config::MintConfig;

/// What the mint publishes to holders.
#[derive(Debug, Serialize)]
struct MintDescription<'a> {
    name: &'a str,
    url: &'a str,
    version: &'static str,
    options: &'a Options,
    keysets: Vec<Keyset>,
}

fn main() -> anyhow::Result<()> {
    let config = MintConfig::load()?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("cashu={}", config.advanced.log_level).parse()?),
        )
        .init();

    info!(data_dir = %config.data_dir().display(), "cashu mint starting");

    let mint = build_mint(&config)?;
    self_check(&mint)?;

    let description = MintDescription {
        name: &config.mint.name,
        url: &config.mint.url,
        version: env!("CARGO_PKG_VERSION"),
        options: &config.mint.options,
        keysets: mint.keysets(),
    };
    println!("{}", serde_json::to_string_pretty(&description)?);
    Ok(())
}

/// One keyset per unit, derived from the seed when one is configured.
fn build_mint(config: &MintConfig) -> anyhow::Result<Mint> {
    let seed = config.seed()?;
    let mint = Mint::new();
    for unit in config.units()? {
        let keyset = match &seed {
            Some(seed) => MintKeyset::generate(seed, unit.clone(), config.keys.max_order),
            None => MintKeyset::random(unit.clone(), config.keys.max_order),
        }
        .with_context(|| format!("building keyset for unit {unit}"))?;
        mint.add_keyset(keyset)?;
    }
    if seed.is_none() {
        tracing::warn!(
            "no keys.seed_hex configured, keysets are random and will not survive a restart"
        );
    }
    Ok(mint)
}

/// Issue and verify one proof per keyset.
fn self_check(mint: &Mint) -> anyhow::Result<()> {
    for keyset in mint.keysets() {
        let amount = keyset.supported_amounts().first().copied().context("empty keyset")?;
        let premint = PreMintSecrets::from_secrets(keyset.id, [(amount, Secret::generate())])?;
        let signatures = mint.sign_all(&premint.blinded_messages())?;
        let proofs = premint.into_proofs(&signatures, &keyset)?;
        for proof in &proofs {
            mint.verify_proof(proof)
                .with_context(|| format!("self-check failed for keyset {}", keyset.id))?;
        }
        info!(keyset_id = %keyset.id, unit = %keyset.unit, "self-check passed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use cashu_types::CurrencyUnit;

    use super::*;

    fn config(toml: &str) -> MintConfig {
        MintConfig::from_toml(toml).expect("config")
    }

    #[test]
    fn test_build_one_keyset_per_unit() {
        let cfg = config("[keys]\nunits = [\"sat\", \"usd\"]\nmax_order = 4");
        let mint = build_mint(&cfg).expect("mint");
        let keysets = mint.keysets();
        assert_eq!(keysets.len(), 2);
        assert!(mint.active_keyset_id(&CurrencyUnit::Sat).is_some());
        assert!(mint.active_keyset_id(&CurrencyUnit::Usd).is_some());
        self_check(&mint).expect("self check");
    }

    #[test]
    fn test_seeded_keysets_are_stable() {
        let cfg = config("[keys]\nseed_hex = \"0102030405\"\nmax_order = 6");
        let a = build_mint(&cfg).expect("a").keysets();
        let b = build_mint(&cfg).expect("b").keysets();
        assert_eq!(a, b);
    }

    #[test]
    fn test_random_keysets_differ() {
        let cfg = config("[keys]\nmax_order = 2");
        let a = build_mint(&cfg).expect("a").keysets();
        let b = build_mint(&cfg).expect("b").keysets();
        assert_ne!(a[0].id, b[0].id);
    }

    #[test]
    fn test_invalid_order_fails() {
        assert!(build_mint(&config("[keys]\nmax_order = 0")).is_err());
    }

    #[test]
    fn test_description_json() {
        let cfg = config("[mint]\nname = \"test\"\n[keys]\nseed_hex = \"ab\"\nmax_order = 1");
        let mint = build_mint(&cfg).expect("mint");
        let description = MintDescription {
            name: &cfg.mint.name,
            url: &cfg.mint.url,
            version: "0",
            options: &cfg.mint.options,
            keysets: mint.keysets(),
        };
        let json = serde_json::to_value(&description).expect("json");
        assert_eq!(json["name"], "test");
        assert_eq!(json["keysets"][0]["unit"], "sat");
        assert_eq!(json["keysets"][0]["id"].as_str().map(str::len), Some(16));
        assert!(json["keysets"][0]["keys"]["1"].is_string());
    }
}
