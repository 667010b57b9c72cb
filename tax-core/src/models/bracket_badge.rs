use serde::{Deserialize, Serialize};

/// Colour family a front end should use for a [`BracketBadge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeLevel {
    Green,
    Blue,
    Purple,
    Orange,
    Red,
}

/// Qualitative label for the slab a taxable income falls into.
///
/// Purely for display. The titles and rate blurbs are written for the six
/// slabs of [`crate::SlabSchedule::fy2025_26`]; with a configured schedule
/// the badge still follows the slab position, but the quoted rates may not
/// match it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketBadge {
    TaxFree,
    Light,
    Steady,
    Elite,
    Power,
    TopBracket,
}

impl BracketBadge {
    /// Picks the badge for a zero-based slab position. Positions past the
    /// sixth slab all read as the top bracket, whatever their rate.
    pub fn for_slab_index(index: usize) -> Self {
        match index {
            0 => Self::TaxFree,
            1 => Self::Light,
            2 => Self::Steady,
            3 => Self::Elite,
            4 => Self::Power,
            _ => Self::TopBracket,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::TaxFree => "Tax Free!",
            Self::Light => "Slab 2 - Light",
            Self::Steady => "Slab 3 - Steady",
            Self::Elite => "Slab 4 - Elite",
            Self::Power => "Slab 5 - Power",
            Self::TopBracket => "Slab 6 - Top Bracket",
        }
    }

    /// One-line blurb quoting the FY 2025-26 marginal rate.
    pub fn subtitle(&self) -> &'static str {
        match self {
            Self::TaxFree => "You owe nothing, enjoy your full salary!",
            Self::Light => "Just 5%, barely a scratch.",
            Self::Steady => "15% bracket. Solid professional range.",
            Self::Elite => "25% bracket. You're in the big leagues.",
            Self::Power => "30% bracket. High earner territory!",
            Self::TopBracket => "35%. The pinnacle of income tax.",
        }
    }

    pub fn level(&self) -> BadgeLevel {
        match self {
            Self::TaxFree | Self::Light => BadgeLevel::Green,
            Self::Steady => BadgeLevel::Blue,
            Self::Elite => BadgeLevel::Purple,
            Self::Power => BadgeLevel::Orange,
            Self::TopBracket => BadgeLevel::Red,
        }
    }
}
