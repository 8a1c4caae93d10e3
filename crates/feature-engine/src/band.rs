//! Frequency Band Filter

use serde::{Deserialize, Serialize};

/// Default lower band edge (Hz), exclusive
pub const DEFAULT_LOW_HZ: f64 = 0.2;
/// Default upper band edge (Hz), inclusive
pub const DEFAULT_HIGH_HZ: f64 = 20_000.0;

/// EIS frequency band, open at the low edge and closed at the high edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyBand {
    /// Lower edge (Hz), excluded
    pub low_hz: f64,
    /// Upper edge (Hz), included
    pub high_hz: f64,
}

impl Default for FrequencyBand {
    fn default() -> Self {
        Self {
            low_hz: DEFAULT_LOW_HZ,
            high_hz: DEFAULT_HIGH_HZ,
        }
    }
}

impl FrequencyBand {
    /// Create a band from its edges
    pub fn new(low_hz: f64, high_hz: f64) -> Self {
        Self { low_hz, high_hz }
    }

    /// Whether a frequency lies within `(low_hz, high_hz]`
    pub fn contains(&self, frequency: f64) -> bool {
        frequency > self.low_hz && frequency <= self.high_hz
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_band_edges() {
        let band = FrequencyBand::default();
        assert!(!band.contains(0.2));
        assert!(band.contains(0.2000001));
        assert!(band.contains(20_000.0));
        assert!(!band.contains(20_000.1));
    }

    #[test]
    fn test_nan_is_outside() {
        assert!(!FrequencyBand::default().contains(f64::NAN));
    }

    proptest! {
        #[test]
        fn prop_contains_matches_edges(low in 0.0f64..10.0, width in 0.0f64..1e4, f in -1.0f64..2e4) {
            let band = FrequencyBand::new(low, low + width);
            prop_assert_eq!(band.contains(f), f > low && f <= low + width);
        }
    }
}
