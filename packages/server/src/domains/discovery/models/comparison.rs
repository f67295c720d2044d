/// Result of comparing the user image against the survey reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComparisonOutcome {
    /// Both images were normalized and diffed
    Measured { differing_pixels: u64 },
    /// Reference could not be fetched or either image failed to decode
    Unavailable { reason: String },
}

impl ComparisonOutcome {
    pub fn measured(differing_pixels: u64) -> Self {
        Self::Measured { differing_pixels }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }
}
