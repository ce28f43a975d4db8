//! Free-form option values.
//!
//! The legal value set is small and fixed, so options are a closed tagged
//! variant rather than an arbitrary serde value.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single option value.
///
/// Untagged on the wire: `true`, `42`, `2.5` and `"text"` map to the
/// matching variant. Integers are tried before floats.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
}

/// Ordered option map.
pub type Options = BTreeMap<String, OptionValue>;

impl OptionValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            OptionValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Integers widen to `f64`.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            OptionValue::Double(d) => Some(*d),
            OptionValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{b}"),
            OptionValue::Int(i) => write!(f, "{i}"),
            OptionValue::Double(d) => write!(f, "{d}"),
            OptionValue::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        OptionValue::Bool(v)
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        OptionValue::Int(v)
    }
}

impl From<f64> for OptionValue {
    fn from(v: f64) -> Self {
        OptionValue::Double(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        OptionValue::String(v.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        OptionValue::String(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_variants() {
        let options: Options =
            serde_json::from_str(r#"{"a":true,"b":42,"c":2.5,"d":"text"}"#).expect("parse");
        assert_eq!(options["a"], OptionValue::Bool(true));
        assert_eq!(options["b"], OptionValue::Int(42));
        assert_eq!(options["c"], OptionValue::Double(2.5));
        assert_eq!(options["d"], OptionValue::String("text".to_string()));
    }

    #[test]
    fn test_toml_variants() {
        let options: Options =
            toml::from_str("motd = \"hello\"\nmax_inputs = 100\nfee_ppk = 0.5\nopen = false\n")
                .expect("parse");
        assert_eq!(options["motd"].as_str(), Some("hello"));
        assert_eq!(options["max_inputs"].as_int(), Some(100));
        assert_eq!(options["fee_ppk"].as_double(), Some(0.5));
        assert_eq!(options["open"].as_bool(), Some(false));
    }

    #[test]
    fn test_rejects_nested_values() {
        assert!(serde_json::from_str::<Options>(r#"{"a":[1,2]}"#).is_err());
        assert!(serde_json::from_str::<Options>(r#"{"a":null}"#).is_err());
    }

    #[test]
    fn test_accessors_and_display() {
        assert_eq!(OptionValue::from(3i64).as_double(), Some(3.0));
        assert_eq!(OptionValue::from("x").as_int(), None);
        assert_eq!(OptionValue::from(true).to_string(), "true");
    }
}
