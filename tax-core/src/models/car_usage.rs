use serde::{Deserialize, Serialize};

/// How an employer-provided car is used, which sets the perquisite rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarUsage {
    /// Partly official, partly personal use.
    #[default]
    Partial,
    /// Exclusively personal use.
    Full,
}

impl CarUsage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Partial => "partial",
            Self::Full => "full",
        }
    }

    /// Parses a usage code. Case-insensitive; `part` is accepted for partial.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "partial" | "part" => Some(Self::Partial),
            "full" => Some(Self::Full),
            _ => None,
        }
    }
}
