//! Shared primitive types used across the cohort core.

/// Months elapsed since a cohort's acquisition month. `0` is the
/// acquisition month itself.
pub type Offset = u32;

/// Sentinel dimension value carried by every `overall` row.
pub const ALL_SENTINEL: &str = "ALL";
