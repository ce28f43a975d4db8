//! Integration tests for the cashu core.
//!
//! The tests under `tests/` exercise issuance, transport and spending
//! across the mint, wallet, types and db crates. This library only holds
//! the fixtures they share.
//!
//! ```sh
//! cargo test -p cashu-integration-tests
//! ```

use cashu_mint::{Mint, MintError, MintKeyset};
use cashu_types::{Amount, CurrencyUnit, Keyset, Proof};
use cashu_wallet::{PreMintSecrets, WalletError};

/// Mint URL used throughout the tests.
pub const MINT_URL: &str = "https://mint.example.com";

/// Fixed timestamp for stored rows.
pub const TEST_TIMESTAMP: u64 = 1_700_000_000;

/// Fixture failures.
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error(transparent)]
    Mint(#[from] MintError),

    #[error(transparent)]
    Wallet(#[from] WalletError),
}

/// A mint with one seeded keyset of order 16 for `unit`.
pub fn seeded_mint(seed: &[u8], unit: CurrencyUnit) -> Result<(Mint, Keyset), FixtureError> {
    let keyset = MintKeyset::generate(seed, unit, 16)?;
    let public = keyset.keyset();
    let mint = Mint::with_keysets([keyset])?;
    Ok((mint, public))
}

/// Run a full issuance round for `amount` against `keyset`.
pub fn issue(mint: &Mint, keyset: &Keyset, amount: Amount) -> Result<Vec<Proof>, FixtureError> {
    let premint = PreMintSecrets::random(keyset.id, amount)?;
    let signatures = mint.sign_all(&premint.blinded_messages())?;
    Ok(premint.into_proofs(&signatures, keyset)?)
}
