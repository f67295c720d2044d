use serde::Serialize;

use crate::domains::discovery::classifier::Classification;
use crate::domains::discovery::models::CalibrationResult;

/// Coordinates as rendered in the report: fixed 4 decimal places.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportCoords {
    pub ra: String,
    pub dec: String,
}

impl ReportCoords {
    pub fn from_calibration(calibration: &CalibrationResult) -> Self {
        Self {
            ra: format_degrees(calibration.ra),
            dec: format_degrees(calibration.dec),
        }
    }
}

/// Terminal artifact of a successful run. Every field is always populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveryReport {
    pub coords: ReportCoords,
    #[serde(rename = "historicalImage")]
    pub historical_image: String,
    pub discovery: String,
    #[serde(rename = "type")]
    pub classification: Classification,
}

fn format_degrees(value: f64) -> String {
    let formatted = format!("{:.4}", value);
    // -0.00004 rounds to "-0.0000"
    if formatted.trim_start_matches('-').chars().all(|c| c == '0' || c == '.') {
        formatted.trim_start_matches('-').to_string()
    } else {
        formatted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_always_have_four_decimals() {
        let coords = ReportCoords::from_calibration(&CalibrationResult::new(1, 150.0, 2.0));
        assert_eq!(coords.ra, "150.0000");
        assert_eq!(coords.dec, "2.0000");

        let coords =
            ReportCoords::from_calibration(&CalibrationResult::new(1, 83.633_212_7, -5.391_111));
        assert_eq!(coords.ra, "83.6332");
        assert_eq!(coords.dec, "-5.3911");
    }

    #[test]
    fn negative_zero_is_not_rendered() {
        let coords = ReportCoords::from_calibration(&CalibrationResult::new(1, 10.0, -0.00001));
        assert_eq!(coords.dec, "0.0000");
    }

    #[test]
    fn report_serializes_to_wire_shape() {
        let report = DiscoveryReport {
            coords: ReportCoords {
                ra: "150.0000".into(),
                dec: "2.0000".into(),
            },
            historical_image: "https://example.org/ref.jpg".into(),
            discovery: "Region stable".into(),
            classification: Classification::Galaxy,
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["coords"]["ra"], "150.0000");
        assert_eq!(json["historicalImage"], "https://example.org/ref.jpg");
        assert_eq!(json["type"], "GALAXY");
    }
}
