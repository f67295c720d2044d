//! Anomaly classification of a difference count.

use serde::Serialize;

/// Differing-pixel count above which a field is flagged as a candidate.
pub const ANOMALY_THRESHOLD: u64 = 1500;

/// Observation label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Classification {
    /// Candidate anomaly (transient not present in the survey)
    #[serde(rename = "SUPERNOVA")]
    Supernova,
    /// Stable, previously catalogued region
    #[serde(rename = "GALAXY")]
    Galaxy,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Supernova => "SUPERNOVA",
            Self::Galaxy => "GALAXY",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn classify(differing_pixels: u64) -> Classification {
    if differing_pixels > ANOMALY_THRESHOLD {
        Classification::Supernova
    } else {
        Classification::Galaxy
    }
}

/// Human-readable verdict. Anomalous verdicts embed the raw count.
pub fn verdict(classification: Classification, differing_pixels: u64) -> String {
    match classification {
        Classification::Supernova => format!(
            "Potential new transient detected: {} pixels differ from the historical survey image",
            differing_pixels
        ),
        Classification::Galaxy => {
            "Region is stable: no significant change against the historical survey image"
                .to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_boundary_is_not_anomalous() {
        assert_eq!(classify(1500), Classification::Galaxy);
        assert_eq!(classify(1501), Classification::Supernova);
    }

    #[test]
    fn zero_and_large_counts() {
        assert_eq!(classify(0), Classification::Galaxy);
        assert_eq!(classify(250_000), Classification::Supernova);
    }

    #[test]
    fn anomalous_verdict_embeds_count() {
        let text = verdict(Classification::Supernova, 2000);
        assert!(text.contains("2000"));
    }

    #[test]
    fn stable_verdict_says_stable() {
        let text = verdict(Classification::Galaxy, 500);
        assert!(text.contains("stable"));
        assert!(!text.contains("500"));
    }
}
