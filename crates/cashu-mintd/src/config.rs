//! Configuration file management.
//!
//! Read from `$CASHU_MINT_DIR/config.toml` (default `~/.cashu-mint`).
//! Every field has a default, so a missing file or section is valid.

use std::path::PathBuf;

use anyhow::Context;
use cashu_types::{CurrencyUnit, Options};
use serde::{Deserialize, Serialize};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "CASHU_MINT_DIR";

/// Complete mint configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MintConfig {
    /// Public mint information.
    #[serde(default)]
    pub mint: MintInfoConfig,
    /// Key generation settings.
    #[serde(default)]
    pub keys: KeysConfig,
    /// Advanced settings.
    #[serde(default)]
    pub advanced: AdvancedConfig,
}

/// Public mint information, published alongside the keysets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MintInfoConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_name")]
    pub name: String,
    /// Free-form settings advertised to holders.
    #[serde(default)]
    pub options: Options,
}

/// Key generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeysConfig {
    /// Hex seed for reproducible keysets. Empty = random keys each start.
    #[serde(default)]
    pub seed_hex: String,
    /// One keyset per unit.
    #[serde(default = "default_units")]
    pub units: Vec<String>,
    /// Denominations `2^0 .. 2^(max_order - 1)`.
    #[serde(default = "default_max_order")]
    pub max_order: u8,
}

/// Advanced settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvancedConfig {
    /// Log level: "trace" | "debug" | "info" | "warn" | "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Data directory. Empty = platform default.
    #[serde(default)]
    pub data_dir: String,
}

fn default_url() -> String {
    "http://127.0.0.1:3338".to_string()
}

fn default_name() -> String {
    "cashu mint".to_string()
}

fn default_units() -> Vec<String> {
    vec!["sat".to_string()]
}

fn default_max_order() -> u8 {
    cashu_mint::MAX_ORDER
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for MintInfoConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            name: default_name(),
            options: Options::new(),
        }
    }
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            seed_hex: String::new(),
            units: default_units(),
            max_order: default_max_order(),
        }
    }
}

impl Default for AdvancedConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            data_dir: String::new(),
        }
    }
}

impl MintConfig {
    /// Load configuration from the default location, falling back to
    /// defaults if the file does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            Self::from_toml(&content).with_context(|| format!("parsing {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Decoded seed, or `None` for random keys.
    pub fn seed(&self) -> anyhow::Result<Option<Vec<u8>>> {
        let seed = self.keys.seed_hex.trim();
        if seed.is_empty() {
            return Ok(None);
        }
        let bytes = hex::decode(seed).context("keys.seed_hex is not valid hex")?;
        Ok(Some(bytes))
    }

    /// Configured units, duplicates removed, in order of first appearance.
    pub fn units(&self) -> anyhow::Result<Vec<CurrencyUnit>> {
        let mut units: Vec<CurrencyUnit> = Vec::new();
        for raw in &self.keys.units {
            let unit: CurrencyUnit = raw
                .parse()
                .with_context(|| format!("invalid unit {raw:?} in keys.units"))?;
            if !units.contains(&unit) {
                units.push(unit);
            }
        }
        if units.is_empty() {
            anyhow::bail!("keys.units must name at least one unit");
        }
        Ok(units)
    }

    pub fn data_dir(&self) -> PathBuf {
        if self.advanced.data_dir.is_empty() {
            Self::default_data_dir()
        } else {
            PathBuf::from(&self.advanced.data_dir)
        }
    }

    fn config_path() -> PathBuf {
        Self::default_data_dir().join("config.toml")
    }

    fn default_data_dir() -> PathBuf {
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            return PathBuf::from(dir);
        }
        std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".cashu-mint"))
            .unwrap_or_else(|_| PathBuf::from("/tmp/cashu-mint"))
    }
}
