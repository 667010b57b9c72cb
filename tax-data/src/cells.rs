//! Serde helpers for lenient CSV cells.
//!
//! Spreadsheet exports leave cells empty, use thousands separators and spell
//! booleans in several ways; these helpers accept all of that.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, de};

fn normalize(s: &str) -> String {
    s.trim().replace(',', "")
}

/// An optional decimal; empty cells are `None`.
pub fn optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s.as_deref().map(normalize) {
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => s.parse::<Decimal>().map(Some).map_err(de::Error::custom),
        None => Ok(None),
    }
}

/// A monetary amount; empty cells are zero.
pub fn amount<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    optional_decimal(deserializer).map(Option::unwrap_or_default)
}

/// A whole count; empty cells are zero.
pub fn count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s.as_deref().map(str::trim) {
        Some("") | None => Ok(0),
        Some(s) => s.parse::<u32>().map_err(de::Error::custom),
    }
}

/// A yes/no flag; empty cells are `false`.
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    let Some(s) = s else {
        return Ok(false);
    };
    match s.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "n" | "no" | "false" => Ok(false),
        "1" | "y" | "yes" | "true" | "x" => Ok(true),
        other => Err(de::Error::custom(format!("invalid flag '{other}'"))),
    }
}
