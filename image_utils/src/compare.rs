//! Pixel Comparison Module
//!
//! Compares two images in 8-bit RGB space:
//! - pixel match: share of positions whose RGB triples are exactly equal
//! - color match: mean Euclidean RGB distance across all positions
//! - optional inverted difference image (white where pixels match)

use crate::codec::{ImageCodec, StandardCodec};
use crate::img_errors::{ImageToolError, Result};
use image::imageops::FilterType;
use image::{DynamicImage, Rgb, RgbImage};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Resampling filter used when the second image must be stretched.
const ALIGN_FILTER: FilterType = FilterType::CatmullRom;

/// What to do when the two images have different dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignPolicy {
    /// Resize the second image to the first image's dimensions.
    /// Aspect ratio is not preserved.
    #[default]
    Stretch,
    /// Fail with [`ImageToolError::DimensionMismatch`].
    Reject,
}

#[derive(Debug, Clone)]
pub struct CompareOptions {
    pub align: AlignPolicy,
    /// Directory the difference image is written to; empty means the
    /// current working directory.
    pub output_dir: PathBuf,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            align: AlignPolicy::default(),
            output_dir: PathBuf::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    /// Percentage of exactly matching pixels, 0..=100.
    pub pixel_match: f64,
    /// Mean Euclidean RGB distance, 0 for identical images.
    pub color_match: f64,
    pub output_file: Option<PathBuf>,
    pub width: u32,
    pub height: u32,
    /// Whether the second image was resized to fit the first.
    pub resized: bool,
}

/// Aggregate statistics over two aligned RGB buffers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PixelStats {
    pub matching_pixels: u64,
    pub total_pixels: u64,
    pub distance_sum: f64,
}

impl PixelStats {
    pub fn match_percentage(&self) -> f64 {
        self.matching_pixels as f64 / self.total_pixels as f64 * 100.0
    }

    pub fn mean_distance(&self) -> f64 {
        self.distance_sum / self.total_pixels as f64
    }
}

pub struct ImageComparator<C = StandardCodec> {
    codec: C,
    options: CompareOptions,
}

impl ImageComparator<StandardCodec> {
    pub fn new() -> Self {
        Self::with_codec(StandardCodec)
    }
}

impl Default for ImageComparator<StandardCodec> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ImageCodec> ImageComparator<C> {
    pub fn with_codec(codec: C) -> Self {
        Self {
            codec,
            options: CompareOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CompareOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_output_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.options.output_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_align_policy(mut self, align: AlignPolicy) -> Self {
        self.options.align = align;
        self
    }

    /// Compare `path1` against `path2`.
    ///
    /// With `produce_output`, writes the inverted difference image as
    /// `{stem1}_{stem2}{ext2}` in the configured output directory. Any load or
    /// save failure aborts the whole call.
    pub fn compare(
        &self,
        path1: &Path,
        path2: &Path,
        produce_output: bool,
    ) -> Result<ComparisonResult> {
        let first = self.load_rgb(path1)?;
        let second = self.load_rgb(path2)?;

        let (width, height) = first.dimensions();
        let (second, resized) = self.align(&first, second)?;

        let stats = pixel_stats(&first, &second);
        tracing::debug!(
            first = %path1.display(),
            second = %path2.display(),
            matching = stats.matching_pixels,
            total = stats.total_pixels,
            "Computed pixel statistics"
        );

        let output_file = if produce_output {
            let name = derive_output_name(path1, path2);
            let target = self.options.output_dir.join(name);
            let diff = DynamicImage::ImageRgb8(inverted_difference(&first, &second));
            self.codec.save(&diff, &target)?;
            tracing::info!(output = %target.display(), "Wrote difference image");
            Some(target)
        } else {
            None
        };

        Ok(ComparisonResult {
            pixel_match: stats.match_percentage(),
            color_match: stats.mean_distance(),
            output_file,
            width,
            height,
            resized,
        })
    }

    fn load_rgb(&self, path: &Path) -> Result<RgbImage> {
        let rgb = self.codec.load(path)?.to_rgb8();
        if rgb.width() == 0 || rgb.height() == 0 {
            return Err(ImageToolError::decode(path, "empty image"));
        }
        Ok(rgb)
    }

    fn align(&self, first: &RgbImage, second: RgbImage) -> Result<(RgbImage, bool)> {
        let expected = first.dimensions();
        let actual = second.dimensions();
        if expected == actual {
            return Ok((second, false));
        }

        match self.options.align {
            AlignPolicy::Reject => Err(ImageToolError::DimensionMismatch { expected, actual }),
            AlignPolicy::Stretch => {
                tracing::warn!(
                    expected = ?expected,
                    actual = ?actual,
                    "Image sizes differ; resizing second image without preserving aspect ratio"
                );
                let resized = image::imageops::resize(&second, expected.0, expected.1, ALIGN_FILTER);
                Ok((resized, true))
            }
        }
    }
}

/// Match count and distance sum for two buffers of equal dimensions.
pub(crate) fn pixel_stats(first: &RgbImage, second: &RgbImage) -> PixelStats {
    debug_assert_eq!(first.dimensions(), second.dimensions());

    let mut matching_pixels = 0u64;
    let mut distance_sum = 0.0f64;
    for (a, b) in first.pixels().zip(second.pixels()) {
        if a == b {
            matching_pixels += 1;
        } else {
            distance_sum += rgb_distance(a, b);
        }
    }

    PixelStats {
        matching_pixels,
        total_pixels: u64::from(first.width()) * u64::from(first.height()),
        distance_sum,
    }
}

pub fn rgb_distance(a: &Rgb<u8>, b: &Rgb<u8>) -> f64 {
    a.0.iter()
        .zip(b.0.iter())
        .map(|(&x, &y)| {
            let d = f64::from(x) - f64::from(y);
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

/// Per channel `255 - |a - b|`.
pub fn inverted_difference(first: &RgbImage, second: &RgbImage) -> RgbImage {
    RgbImage::from_fn(first.width(), first.height(), |x, y| {
        let a = first.get_pixel(x, y);
        let b = second.get_pixel(x, y);
        Rgb([
            255 - a[0].abs_diff(b[0]),
            255 - a[1].abs_diff(b[1]),
            255 - a[2].abs_diff(b[2]),
        ])
    })
}

/// `{stem1}_{stem2}{ext2}`, e.g. `a/x.png` + `b/y.jpg` → `x_y.jpg`.
pub fn derive_output_name(path1: &Path, path2: &Path) -> String {
    let stem1 = path1.file_stem().unwrap_or_default().to_string_lossy();
    let stem2 = path2.file_stem().unwrap_or_default().to_string_lossy();
    let ext2 = path2
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    format!("{stem1}_{stem2}{ext2}")
}

/// Compare with the standard codec, writing any output to the current directory.
pub fn compare_images(path1: &Path, path2: &Path, produce_output: bool) -> Result<ComparisonResult> {
    ImageComparator::new().compare(path1, path2, produce_output)
}
