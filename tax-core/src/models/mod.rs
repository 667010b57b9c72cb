mod bracket_badge;
mod car_usage;
mod tax_slab;

pub use bracket_badge::{BadgeLevel, BracketBadge};
pub use car_usage::CarUsage;
pub use tax_slab::{SlabSchedule, SlabScheduleError, TaxSlab};
