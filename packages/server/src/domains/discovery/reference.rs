//! Historical survey image locator.

use crate::domains::discovery::comparator::WORKING_RESOLUTION;

pub const DEFAULT_SKYVIEW_URL: &str = "https://skyview.gsfc.nasa.gov/current/cgi/runquery.pl";
pub const DEFAULT_SURVEY: &str = "DSS";
/// Angular size of the requested cutout, degrees.
pub const FIELD_OF_VIEW_DEG: f64 = 0.5;

/// Builds survey cutout requests centred on solved coordinates.
///
/// The pixel count always matches the comparator's working resolution so the
/// reference needs no resampling in the common case. Coordinates are not
/// validated here; the pipeline checks them before asking for a locator.
#[derive(Debug, Clone)]
pub struct ReferenceImageFetcher {
    base_url: String,
    survey: String,
}

impl Default for ReferenceImageFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_SKYVIEW_URL)
    }
}

impl ReferenceImageFetcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            survey: DEFAULT_SURVEY.to_string(),
        }
    }

    pub fn with_survey(mut self, survey: impl Into<String>) -> Self {
        self.survey = survey.into();
        self
    }

    pub fn build_reference_url(&self, ra: f64, dec: f64) -> String {
        format!(
            "{}?Survey={}&Position={},{}&Size={}&Pixels={}&Return=JPEG",
            self.base_url,
            self.survey.replace(' ', "+"),
            ra,
            dec,
            FIELD_OF_VIEW_DEG,
            WORKING_RESOLUTION
        )
    }
}

/// Locator on the default survey service.
pub fn build_reference_url(ra: f64, dec: f64) -> String {
    ReferenceImageFetcher::default().build_reference_url(ra, dec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embeds_coordinates_verbatim() {
        let url = build_reference_url(10.1234, -5.6789);
        assert!(url.contains("10.1234"));
        assert!(url.contains("-5.6789"));
        assert!(url.contains("Position=10.1234,-5.6789"));
    }

    #[test]
    fn carries_fixed_field_and_pixel_size() {
        let url = build_reference_url(150.0, 2.0);
        assert!(url.starts_with(DEFAULT_SKYVIEW_URL));
        assert!(url.contains("Size=0.5"));
        assert!(url.contains("Pixels=500"));
        assert!(url.contains("Survey=DSS"));
    }

    #[test]
    fn pixel_count_is_the_comparator_working_resolution() {
        let url = build_reference_url(150.0, 2.0);
        assert!(url.contains(&format!("&Pixels={}&", WORKING_RESOLUTION)));
    }

    #[test]
    fn is_deterministic() {
        assert_eq!(build_reference_url(1.5, 2.5), build_reference_url(1.5, 2.5));
    }

    #[test]
    fn custom_survey_is_query_safe() {
        let fetcher = ReferenceImageFetcher::new("http://mirror.local/run").with_survey("DSS2 Red");
        let url = fetcher.build_reference_url(1.0, 1.0);
        assert!(url.starts_with("http://mirror.local/run?"));
        assert!(url.contains("Survey=DSS2+Red"));
    }
}
