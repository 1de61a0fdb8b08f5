//! HEIC → JPEG Conversion Module
//!
//! Converts a single HEIC file, or every HEIC file in a directory, to a JPEG
//! placed next to the source as `{file_name}.jpg` (`IMG_1.HEIC` → `IMG_1.HEIC.jpg`).

use crate::batch::{collect_files, BatchResult};
use crate::codec::{ensure_exists, ImageCodec, StandardCodec};
use crate::image_heic::{is_heic_path, HEIC_EXTENSIONS};
use crate::img_errors::{ImageToolError, Result};
use crate::metadata::copy_file_timestamps;
use image::DynamicImage;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// JPEG quality used when none is given.
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub jpeg_quality: u8,
    /// Descend into subdirectories when converting a directory.
    pub recursive: bool,
    /// Replace an existing `.jpg`; otherwise the file is skipped.
    pub overwrite: bool,
    /// Copy the source's access/modification times onto the output.
    pub preserve_timestamps: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            recursive: false,
            overwrite: true,
            preserve_timestamps: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
}

pub type DirectoryReport = BatchResult<ConversionOutcome>;

pub fn jpeg_output_path(input: &Path) -> PathBuf {
    let mut name = input.file_name().unwrap_or_default().to_os_string();
    name.push(".jpg");
    input.with_file_name(name)
}

pub struct HeicConverter<C = StandardCodec> {
    codec: C,
    options: ConvertOptions,
}

impl HeicConverter<StandardCodec> {
    pub fn new(options: ConvertOptions) -> Self {
        Self::with_codec(StandardCodec, options)
    }
}

impl<C: ImageCodec> HeicConverter<C> {
    pub fn with_codec(codec: C, options: ConvertOptions) -> Self {
        Self { codec, options }
    }

    pub fn convert_file(&self, path: &Path) -> Result<ConversionOutcome> {
        if !is_heic_path(path) {
            return Err(ImageToolError::NotHeic(path.to_path_buf()));
        }
        ensure_exists(path)?;

        let output = jpeg_output_path(path);
        if !self.options.overwrite && output.exists() {
            return Err(ImageToolError::OutputExists(output));
        }

        let rgb = DynamicImage::ImageRgb8(self.codec.load(path)?.to_rgb8());
        self.codec
            .save_jpeg(&rgb, &output, self.options.jpeg_quality)?;

        if self.options.preserve_timestamps {
            if let Err(e) = copy_file_timestamps(path, &output) {
                tracing::warn!(output = %output.display(), error = %e, "Failed to copy file times");
            }
        }

        tracing::info!(
            input = %path.display(),
            output = %output.display(),
            quality = self.options.jpeg_quality,
            "Converted HEIC to JPEG"
        );

        Ok(ConversionOutcome {
            input: path.to_path_buf(),
            output,
            width: rgb.width(),
            height: rgb.height(),
        })
    }

    /// HEIC files that [`convert_directory`](Self::convert_directory) would process.
    pub fn collect(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        ensure_exists(dir)?;
        if !dir.is_dir() {
            return Err(ImageToolError::NotADirectory(dir.to_path_buf()));
        }
        Ok(collect_files(dir, HEIC_EXTENSIONS, self.options.recursive))
    }

    pub fn convert_directory(&self, dir: &Path) -> Result<DirectoryReport> {
        self.convert_directory_with(dir, |_| {})
    }

    /// Like [`convert_directory`](Self::convert_directory), calling `on_file`
    /// after each file regardless of outcome.
    pub fn convert_directory_with<F>(&self, dir: &Path, on_file: F) -> Result<DirectoryReport>
    where
        F: FnMut(&Path),
    {
        let files = self.collect(dir)?;
        tracing::debug!(dir = %dir.display(), count = files.len(), "Collected HEIC files");
        Ok(self.convert_files_with(&files, on_file))
    }

    /// Converts an already collected file list, e.g. from [`collect`](Self::collect).
    pub fn convert_files_with<F>(&self, files: &[PathBuf], mut on_file: F) -> DirectoryReport
    where
        F: FnMut(&Path),
    {
        let mut report = DirectoryReport::new();
        for file in files {
            match self.convert_file(file) {
                Ok(outcome) => report.success(outcome),
                Err(ImageToolError::OutputExists(existing)) => {
                    tracing::debug!(output = %existing.display(), "Skipping existing output");
                    report.skip(file.clone());
                }
                Err(e) => {
                    tracing::warn!(input = %file.display(), error = %e, "Conversion failed");
                    report.fail(file.clone(), e.to_string());
                }
            }
            on_file(file.as_path());
        }

        report
    }
}

pub fn convert_heic(path: &Path, options: &ConvertOptions) -> Result<ConversionOutcome> {
    HeicConverter::new(options.clone()).convert_file(path)
}

pub fn convert_heic_directory(dir: &Path, options: &ConvertOptions) -> Result<DirectoryReport> {
    HeicConverter::new(options.clone()).convert_directory(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::FileTime;
    use image::{RgbImage, Rgba, RgbaImage};
    use std::fs;
    use tempfile::TempDir;

    /// Decodes any existing file to a fixed RGBA image; files named `broken*` fail.
    struct SyntheticCodec;

    impl ImageCodec for SyntheticCodec {
        fn load(&self, path: &Path) -> Result<DynamicImage> {
            ensure_exists(path)?;
            let name = path.file_name().unwrap().to_string_lossy();
            if name.starts_with("broken") {
                return Err(ImageToolError::decode(path, "bad hevc stream"));
            }
            Ok(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
                6,
                4,
                Rgba([30, 160, 90, 128]),
            )))
        }

        fn save(&self, image: &DynamicImage, path: &Path) -> Result<()> {
            StandardCodec.save(image, path)
        }
    }

    fn converter(options: ConvertOptions) -> HeicConverter<SyntheticCodec> {
        HeicConverter::with_codec(SyntheticCodec, options)
    }

    fn touch(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, b"....ftypheic").unwrap();
        path
    }

    #[test]
    fn test_jpeg_output_path_appends_extension() {
        assert_eq!(
            jpeg_output_path(Path::new("photos/IMG_1.HEIC")),
            PathBuf::from("photos/IMG_1.HEIC.jpg")
        );
    }

    #[test]
    fn test_convert_file_writes_rgb_jpeg() {
        let dir = TempDir::new().unwrap();
        let input = touch(&dir, "IMG_0001.HEIC");

        let outcome = converter(ConvertOptions::default())
            .convert_file(&input)
            .unwrap();

        assert_eq!(outcome.output, dir.path().join("IMG_0001.HEIC.jpg"));
        assert_eq!((outcome.width, outcome.height), (6, 4));

        let jpeg = image::open(&outcome.output).unwrap();
        assert_eq!(jpeg.color(), image::ColorType::Rgb8);
        let px = jpeg.to_rgb8().get_pixel(3, 2).0;
        assert!(px[1].abs_diff(160) <= 4);
    }

    #[test]
    fn test_convert_non_heic_is_rejected() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("photo.png");
        RgbImage::new(1, 1).save(&input).unwrap();

        let err = converter(ConvertOptions::default())
            .convert_file(&input)
            .unwrap_err();
        assert!(matches!(err, ImageToolError::NotHeic(_)), "got {err}");
    }

    #[test]
    fn test_convert_missing_heic_is_not_found() {
        let err = converter(ConvertOptions::default())
            .convert_file(Path::new("/nonexistent/IMG.HEIC"))
            .unwrap_err();
        assert!(err.is_not_found(), "got {err}");
    }

    #[test]
    fn test_existing_output_without_overwrite() {
        let dir = TempDir::new().unwrap();
        let input = touch(&dir, "a.heic");
        fs::write(dir.path().join("a.heic.jpg"), b"keep me").unwrap();

        let options = ConvertOptions {
            overwrite: false,
            ..ConvertOptions::default()
        };
        let err = converter(options).convert_file(&input).unwrap_err();

        assert!(matches!(err, ImageToolError::OutputExists(_)));
        assert_eq!(fs::read(dir.path().join("a.heic.jpg")).unwrap(), b"keep me");
    }

    #[test]
    fn test_timestamps_preserved() {
        let dir = TempDir::new().unwrap();
        let input = touch(&dir, "old.heic");
        let old = FileTime::from_unix_time(1_500_000_000, 0);
        filetime::set_file_times(&input, old, old).unwrap();

        let outcome = converter(ConvertOptions::default())
            .convert_file(&input)
            .unwrap();

        let m = fs::metadata(&outcome.output).unwrap();
        assert_eq!(FileTime::from_last_modification_time(&m), old);
    }

    #[test]
    fn test_convert_directory_collects_results() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "one.HEIC");
        touch(&dir, "two.heic");
        touch(&dir, "broken.heic");
        fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/deep.heic"), b"").unwrap();

        let mut seen = Vec::new();
        let report = converter(ConvertOptions::default())
            .convert_directory_with(dir.path(), |p| seen.push(p.to_path_buf()))
            .unwrap();

        assert_eq!(report.succeeded.len(), 2);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].0, dir.path().join("broken.heic"));
        assert_eq!(seen.len(), 3);
        assert!(dir.path().join("one.HEIC.jpg").exists());
        assert!(dir.path().join("two.heic.jpg").exists());
        assert!(!dir.path().join("nested/deep.heic.jpg").exists());
    }

    #[test]
    fn test_convert_directory_recursive_and_skip() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "top.heic");
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/deep.heic"), b"").unwrap();
        fs::write(dir.path().join("top.heic.jpg"), b"existing").unwrap();

        let options = ConvertOptions {
            recursive: true,
            overwrite: false,
            ..ConvertOptions::default()
        };
        let report = converter(options).convert_directory(dir.path()).unwrap();

        assert_eq!(report.skipped, vec![dir.path().join("top.heic")]);
        assert_eq!(report.succeeded.len(), 1);
        assert!(dir.path().join("nested/deep.heic.jpg").exists());
    }

    #[test]
    fn test_convert_empty_directory() {
        let dir = TempDir::new().unwrap();
        let report = converter(ConvertOptions::default())
            .convert_directory(dir.path())
            .unwrap();
        assert_eq!(report.total(), 0);
    }

    #[test]
    fn test_convert_directory_missing_or_file() {
        let dir = TempDir::new().unwrap();
        let c = converter(ConvertOptions::default());

        let err = c.convert_directory(&dir.path().join("gone")).unwrap_err();
        assert!(err.is_not_found());

        let file = touch(&dir, "single.heic");
        let err = c.convert_directory(&file).unwrap_err();
        assert!(matches!(err, ImageToolError::NotADirectory(ref p) if p == &file), "got {err}");
        assert!(!dir.path().join("single.heic.jpg").exists());
    }

    #[test]
    fn test_convert_collected_files_once() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "a.heic");
        touch(&dir, "broken.heic");
        touch(&dir, "c.HEIF");

        let c = converter(ConvertOptions::default());
        let files = c.collect(dir.path()).unwrap();
        assert_eq!(files.len(), 3);

        let mut seen = Vec::new();
        let report = c.convert_files_with(&files, |f| seen.push(f.to_path_buf()));

        assert_eq!(seen, files);
        assert_eq!(report.succeeded.len(), 2);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.total(), files.len());
    }
}
