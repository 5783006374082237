use std::time::Duration;

use crate::metrics::{IndicatorLevel, RatingTier};
use crate::ui::Tone;

const BYTE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
const UNIT_STEP: f64 = 1024.0;

/// Human-readable size with one decimal, e.g. `1.5 MB`.
#[must_use]
pub fn format_bytes(bytes: f64) -> String {
    let mut value = bytes;
    for unit in BYTE_UNITS {
        if value < UNIT_STEP {
            return format!("{:.1} {}", value, unit);
        }
        value /= UNIT_STEP;
    }
    format!("{:.1} TB", value)
}

/// Integer with `,` thousands separators.
#[must_use]
pub fn format_number(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len().saturating_mul(2));
    let lead = digits.len().checked_rem(3).unwrap_or(0);
    for (index, ch) in digits.chars().enumerate() {
        if index != 0 && index.checked_sub(lead).and_then(|n| n.checked_rem(3)) == Some(0) {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[must_use]
pub fn format_interval(interval: Duration) -> String {
    if interval.subsec_millis() == 0 {
        format!("{}s", interval.as_secs())
    } else {
        format!("{}ms", interval.as_millis())
    }
}

pub(crate) const fn indicator_tone(level: IndicatorLevel) -> Tone {
    match level {
        IndicatorLevel::Good => Tone::Good,
        IndicatorLevel::Warn => Tone::Warn,
        IndicatorLevel::Bad => Tone::Bad,
    }
}

pub(crate) const fn rating_tone(tier: RatingTier) -> Tone {
    match tier {
        RatingTier::Excellent | RatingTier::Good => Tone::Good,
        RatingTier::Fair => Tone::Warn,
        RatingTier::Poor => Tone::Bad,
    }
}
