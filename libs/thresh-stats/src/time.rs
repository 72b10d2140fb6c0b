//! Timestamp resolution applied before slot lookup

use serde::{Deserialize, Serialize};
use std::fmt;

/// Granularity that timestamps are truncated to before they are mapped to a slot.
///
/// `Absolute` uses timestamps as given, whatever their unit. `Seconds` and `Minutes`
/// expect millisecond timestamps and truncate them to the start of the second or
/// minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeResolution {
    #[default]
    Absolute,
    Seconds,
    Minutes,
}

impl TimeResolution {
    pub fn adjust(self, timestamp: i64) -> i64 {
        match self {
            TimeResolution::Absolute => timestamp,
            TimeResolution::Seconds => timestamp.saturating_sub(timestamp.rem_euclid(1_000)),
            TimeResolution::Minutes => timestamp.saturating_sub(timestamp.rem_euclid(60_000)),
        }
    }
}

impl fmt::Display for TimeResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimeResolution::Absolute => "absolute",
            TimeResolution::Seconds => "seconds",
            TimeResolution::Minutes => "minutes",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjust() {
        assert_eq!(TimeResolution::Absolute.adjust(1_234_567), 1_234_567);
        assert_eq!(TimeResolution::Seconds.adjust(1_234_567), 1_234_000);
        assert_eq!(TimeResolution::Minutes.adjust(1_234_567), 1_200_000);
        // Negative timestamps round toward the past
        assert_eq!(TimeResolution::Seconds.adjust(-1), -1_000);
        // The earliest timestamps clamp instead of wrapping
        assert_eq!(TimeResolution::Seconds.adjust(i64::MIN), i64::MIN);
        assert_eq!(TimeResolution::Minutes.adjust(i64::MIN), i64::MIN);
    }
}
