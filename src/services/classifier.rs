use serde::{Deserialize, Serialize};

use crate::services::fingerprint::Fingerprint;

/// Alert tier assigned to a snapshot at capture time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AlertTier {
    Green,
    Yellow,
    Red,
}

impl AlertTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertTier::Green => "green",
            AlertTier::Yellow => "yellow",
            AlertTier::Red => "red",
        }
    }

    /// Yellow and red are alert-worthy; green is not.
    pub fn is_alerting(&self) -> bool {
        !matches!(self, AlertTier::Green)
    }
}

/// Change-percentage thresholds for a target, as fractions in [0, 1].
#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    pub yellow: f64,
    pub red: f64,
}

pub const DEFAULT_YELLOW_THRESHOLD: f64 = 0.3;
pub const DEFAULT_RED_THRESHOLD: f64 = 0.5;

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            yellow: DEFAULT_YELLOW_THRESHOLD,
            red: DEFAULT_RED_THRESHOLD,
        }
    }
}

impl Thresholds {
    /// Build thresholds from a target's nullable columns, falling back to
    /// the defaults for whichever side is unset. yellow <= red is a
    /// convention, not enforced here or at write time.
    pub fn from_target(yellow: Option<f64>, red: Option<f64>) -> Self {
        Self {
            yellow: yellow.unwrap_or(DEFAULT_YELLOW_THRESHOLD),
            red: red.unwrap_or(DEFAULT_RED_THRESHOLD),
        }
    }
}

/// Result of comparing a new fingerprint against the previous snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub tier: AlertTier,
    /// |new length - previous length| / previous length, base-previous.
    pub change_percentage: f64,
}

/// Classify a content change into an alert tier.
///
/// The previous fingerprint is the one stored on the immediately preceding
/// snapshot of the same target, or None when this check establishes the
/// baseline. Hash equality forces green before the status code is even
/// consulted: identical content is never alert-worthy, including under
/// fetch errors that preserved byte-identical cached content. Once the
/// hash differs, a non-200 status escalates straight to red.
pub fn classify(
    previous: Option<&Fingerprint>,
    current: &Fingerprint,
    http_status: u16,
    thresholds: &Thresholds,
) -> Classification {
    let previous = match previous {
        Some(prev) => prev,
        None => {
            return Classification {
                tier: AlertTier::Green,
                change_percentage: 0.0,
            };
        }
    };

    let change_percentage = if previous.length > 0 {
        (current.length as f64 - previous.length as f64).abs() / previous.length as f64
    } else {
        0.0
    };

    let tier = if current.hash == previous.hash {
        AlertTier::Green
    } else if http_status != 200 || change_percentage >= thresholds.red {
        AlertTier::Red
    } else if change_percentage >= thresholds.yellow {
        AlertTier::Yellow
    } else {
        AlertTier::Green
    };

    Classification {
        tier,
        change_percentage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fp(hash: &str, length: usize) -> Fingerprint {
        Fingerprint {
            hash: hash.to_string(),
            length,
        }
    }

    #[test]
    fn test_no_previous_snapshot_is_green_baseline() {
        let result = classify(None, &fp("h1", 1000), 200, &Thresholds::default());
        assert_eq!(result.tier, AlertTier::Green);
        assert_eq!(result.change_percentage, 0.0);

        // Baseline holds even for a failed fetch
        let result = classify(None, &fp("h1", 1000), 500, &Thresholds::default());
        assert_eq!(result.tier, AlertTier::Green);
    }

    #[test]
    fn test_forty_percent_growth_is_yellow() {
        let prev = fp("h1", 1000);
        let result = classify(Some(&prev), &fp("h2", 1400), 200, &Thresholds::default());
        assert_eq!(result.tier, AlertTier::Yellow);
        assert!((result.change_percentage - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_non_200_escalates_to_red_once_hash_differs() {
        let prev = fp("h1", 1000);
        let result = classify(Some(&prev), &fp("h2", 1400), 500, &Thresholds::default());
        assert_eq!(result.tier, AlertTier::Red);
        assert!((result.change_percentage - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_identical_hash_is_green_regardless_of_status_or_length() {
        // Upstream glitch: hash identical but reported length differs
        let prev = fp("h1", 1000);
        let result = classify(Some(&prev), &fp("h1", 1400), 200, &Thresholds::default());
        assert_eq!(result.tier, AlertTier::Green);
        // Percentage is still reported as computed
        assert!((result.change_percentage - 0.4).abs() < 1e-9);

        // Even a 500 does not escalate when content is unchanged
        let result = classify(Some(&prev), &fp("h1", 1000), 500, &Thresholds::default());
        assert_eq!(result.tier, AlertTier::Green);
    }

    #[test]
    fn test_percentage_base_is_previous_length() {
        // (100 -> 150) = 50/100 = 0.5, but (150 -> 100) = 50/150 = 0.333...
        let result = classify(
            Some(&fp("h1", 100)),
            &fp("h2", 150),
            200,
            &Thresholds::default(),
        );
        assert!((result.change_percentage - 0.5).abs() < 1e-9);

        let result = classify(
            Some(&fp("h1", 150)),
            &fp("h2", 100),
            200,
            &Thresholds::default(),
        );
        assert!((result.change_percentage - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_red_threshold_reached_on_200() {
        let prev = fp("h1", 1000);
        let result = classify(Some(&prev), &fp("h2", 1600), 200, &Thresholds::default());
        assert_eq!(result.tier, AlertTier::Red);
    }

    #[test]
    fn test_small_change_stays_green() {
        let prev = fp("h1", 1000);
        let result = classify(Some(&prev), &fp("h2", 1050), 200, &Thresholds::default());
        assert_eq!(result.tier, AlertTier::Green);
        assert!((result.change_percentage - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_zero_previous_length_yields_zero_percentage() {
        let prev = fp("h1", 0);
        let result = classify(Some(&prev), &fp("h2", 500), 200, &Thresholds::default());
        assert_eq!(result.change_percentage, 0.0);
        // Hash differs and status is 200, 0% is below yellow
        assert_eq!(result.tier, AlertTier::Green);
    }

    #[test]
    fn test_custom_thresholds_respected() {
        let prev = fp("h1", 1000);
        let thresholds = Thresholds::from_target(Some(0.05), Some(0.1));
        let result = classify(Some(&prev), &fp("h2", 1070), 200, &thresholds);
        assert_eq!(result.tier, AlertTier::Yellow);

        let result = classify(Some(&prev), &fp("h2", 1200), 200, &thresholds);
        assert_eq!(result.tier, AlertTier::Red);
    }

    #[test]
    fn test_threshold_defaults_applied_when_unset() {
        let thresholds = Thresholds::from_target(None, None);
        assert_eq!(thresholds.yellow, DEFAULT_YELLOW_THRESHOLD);
        assert_eq!(thresholds.red, DEFAULT_RED_THRESHOLD);
    }
}
