//! Numeric normalization for upstream cell values.
//!
//! Ratios arrive as bare numbers, numeric strings, or percentage strings.
//! All three normalize to the same real-valued ratio. A value that is not
//! a finite number normalizes to `None`, which callers treat as absent.

/// A ratio as delivered upstream, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RatioInput {
    Number(f64),
    Text(String),
}

impl From<f64> for RatioInput {
    fn from(v: f64) -> Self { Self::Number(v) }
}

impl From<&str> for RatioInput {
    fn from(v: &str) -> Self { Self::Text(v.to_string()) }
}

impl From<String> for RatioInput {
    fn from(v: String) -> Self { Self::Text(v) }
}

/// `"66.7%"`, `"0.667"` and `0.667` all yield `Some(0.667)`.
pub fn parse_ratio(raw: impl Into<RatioInput>) -> Option<f64> {
    let value = match raw.into() {
        RatioInput::Number(v) => v,
        RatioInput::Text(s) => {
            let s = s.trim();
            match s.strip_suffix('%') {
                Some(pct) => pct.trim().parse::<f64>().ok()? / 100.0,
                None => s.parse::<f64>().ok()?,
            }
        }
    };
    value.is_finite().then_some(value)
}

/// Parse a currency amount. Thousands separators are stripped.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    let value = cleaned.parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

/// Parse a non-negative whole count, accepting "10" and "10.0".
pub fn parse_count(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<u32>() {
        return Some(n);
    }
    let f = raw.parse::<f64>().ok()?;
    (f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64).then_some(f as u32)
}
