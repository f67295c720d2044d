//! Normalized pixel differencing between a user photo and a survey image.
//!
//! Both images are resized to a common working resolution and reduced to
//! greyscale before comparison, so neither source resolution nor colour depth
//! matters. Differences use the luma term of the YIQ perceptual delta with a
//! tolerance threshold; pixels that look like anti-aliasing on either side are
//! not counted.

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageError};

use crate::domains::discovery::models::ComparisonOutcome;
use crate::kernel::BaseReferenceImageSource;

/// Width and height both images are resampled to.
pub const WORKING_RESOLUTION: u32 = 500;

/// Fraction of the maximum perceptual delta tolerated as noise.
const THRESHOLD: f64 = 0.15;

/// Largest possible YIQ delta between two pixels.
const MAX_YIQ_DELTA: f64 = 35215.0;

/// Weight of the luma term in the YIQ delta.
const LUMA_WEIGHT: f64 = 0.5053;

/// Diffs images at [`WORKING_RESOLUTION`]; survey cutouts are requested at
/// the same size so the reference is usually compared as delivered.
#[derive(Debug, Clone, Default)]
pub struct ImageComparator {
    /// Count pixels that look like anti-aliasing as differences too
    count_anti_aliased: bool,
}

impl ImageComparator {
    /// Resize to the working resolution, then drop to a single luma channel.
    pub fn normalize(&self, image: &DynamicImage) -> GrayImage {
        if image.width() == WORKING_RESOLUTION && image.height() == WORKING_RESOLUTION {
            return image.to_luma8();
        }
        image
            .resize_exact(WORKING_RESOLUTION, WORKING_RESOLUTION, FilterType::Triangle)
            .to_luma8()
    }

    /// Number of pixels that differ beyond tolerance after normalization.
    pub fn compare(&self, a: &DynamicImage, b: &DynamicImage) -> u64 {
        self.count_differences(&self.normalize(a), &self.normalize(b))
    }

    /// Decode the reference bytes and compare against the user image.
    pub fn compare_bytes(&self, user: &DynamicImage, reference: &[u8]) -> Result<u64, ImageError> {
        let reference = image::load_from_memory(reference)?;
        Ok(self.compare(user, &reference))
    }

    /// Fetch the reference image and diff it against the user image.
    ///
    /// Never fails: fetch or decode problems come back as
    /// [`ComparisonOutcome::Unavailable`] for the caller to judge.
    pub async fn compare_with_reference(
        &self,
        user: DynamicImage,
        locator: &str,
        source: &dyn BaseReferenceImageSource,
    ) -> ComparisonOutcome {
        let bytes = match source.fetch(locator).await {
            Ok(bytes) => bytes,
            Err(e) => {
                return ComparisonOutcome::unavailable(format!("reference fetch failed: {}", e))
            }
        };

        let comparator = self.clone();
        let diffed =
            tokio::task::spawn_blocking(move || comparator.compare_bytes(&user, &bytes)).await;

        match diffed {
            Ok(Ok(count)) => ComparisonOutcome::measured(count),
            Ok(Err(e)) => ComparisonOutcome::unavailable(format!("reference decode failed: {}", e)),
            Err(e) => ComparisonOutcome::unavailable(format!("comparison task failed: {}", e)),
        }
    }

    fn count_differences(&self, a: &GrayImage, b: &GrayImage) -> u64 {
        debug_assert_eq!(a.dimensions(), b.dimensions());
        if a.as_raw() == b.as_raw() {
            return 0;
        }

        let max_delta = MAX_YIQ_DELTA * THRESHOLD * THRESHOLD;
        let (width, height) = a.dimensions();
        let mut differing = 0;

        for y in 0..height.min(b.height()) {
            for x in 0..width.min(b.width()) {
                let delta = luma_delta(a.get_pixel(x, y)[0], b.get_pixel(x, y)[0]);
                if delta <= max_delta {
                    continue;
                }
                if !self.count_anti_aliased
                    && (is_anti_aliased(a, b, x, y) || is_anti_aliased(b, a, x, y))
                {
                    continue;
                }
                differing += 1;
            }
        }

        differing
    }
}

fn luma_delta(a: u8, b: u8) -> f64 {
    let d = a as f64 - b as f64;
    LUMA_WEIGHT * d * d
}

fn neighbourhood(image: &GrayImage, x: u32, y: u32) -> (u32, u32, u32, u32) {
    (
        x.saturating_sub(1),
        y.saturating_sub(1),
        (x + 1).min(image.width() - 1),
        (y + 1).min(image.height() - 1),
    )
}

/// A pixel is anti-aliasing when it sits between a darker and a brighter
/// neighbour, has at most two identical neighbours, and one of those extreme
/// neighbours lies in a flat region of both images.
fn is_anti_aliased(image: &GrayImage, other: &GrayImage, x1: u32, y1: u32) -> bool {
    let (x0, y0, x2, y2) = neighbourhood(image, x1, y1);
    let centre = image.get_pixel(x1, y1)[0] as i16;

    let mut zeroes = u32::from(x1 == x0 || x1 == x2 || y1 == y0 || y1 == y2);
    let (mut min, mut max) = (0i16, 0i16);
    let (mut min_at, mut max_at) = (None, None);

    for x in x0..=x2 {
        for y in y0..=y2 {
            if x == x1 && y == y1 {
                continue;
            }
            let delta = centre - image.get_pixel(x, y)[0] as i16;
            if delta == 0 {
                zeroes += 1;
                if zeroes > 2 {
                    return false;
                }
            } else if delta < min {
                min = delta;
                min_at = Some((x, y));
            } else if delta > max {
                max = delta;
                max_at = Some((x, y));
            }
        }
    }

    if min == 0 || max == 0 {
        return false;
    }

    let flat_in_both = |at: Option<(u32, u32)>| {
        at.is_some_and(|(x, y)| has_many_siblings(image, x, y) && has_many_siblings(other, x, y))
    };
    flat_in_both(min_at) || flat_in_both(max_at)
}

/// More than two neighbours share this pixel's exact value.
fn has_many_siblings(image: &GrayImage, x1: u32, y1: u32) -> bool {
    if x1 >= image.width() || y1 >= image.height() {
        return false;
    }
    let (x0, y0, x2, y2) = neighbourhood(image, x1, y1);
    let value = image.get_pixel(x1, y1)[0];

    let mut zeroes = u32::from(x1 == x0 || x1 == x2 || y1 == y0 || y1 == y2);
    for x in x0..=x2 {
        for y in y0..=y2 {
            if x == x1 && y == y1 {
                continue;
            }
            if image.get_pixel(x, y)[0] == value {
                zeroes += 1;
            }
            if zeroes > 2 {
                return true;
            }
        }
    }
    false
}
