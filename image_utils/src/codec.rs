//! Image decode/encode capability
//!
//! The comparator and converter never call the imaging backend directly; they
//! go through [`ImageCodec`] so another backend (or a test double) can be
//! substituted.

use crate::image_heic::{is_heic_path, sniff_heic};
use crate::img_errors::{ImageToolError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageReader};
use std::fs::File;
use std::io::{BufWriter, ErrorKind};
use std::path::Path;

pub trait ImageCodec {
    /// Decode the image at `path`.
    ///
    /// A missing or unreadable file must surface as [`ImageToolError::NotFound`].
    fn load(&self, path: &Path) -> Result<DynamicImage>;

    /// Encode `image` to `path`, format chosen by the path's extension.
    fn save(&self, image: &DynamicImage, path: &Path) -> Result<()>;

    /// Encode `image` as baseline JPEG at `quality` (1-100), dropping alpha.
    fn save_jpeg(&self, image: &DynamicImage, path: &Path, quality: u8) -> Result<()> {
        let file = File::create(path).map_err(|e| ImageToolError::write(path, e))?;
        let encoder = JpegEncoder::new_with_quality(BufWriter::new(file), quality.clamp(1, 100));
        let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
        if let Err(e) = rgb.write_with_encoder(encoder) {
            let _ = std::fs::remove_file(path);
            return Err(ImageToolError::write(path, e));
        }
        Ok(())
    }
}

/// `image` crate backend, with HEIC routed to libheif when built with `heic`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCodec;

impl StandardCodec {
    pub fn new() -> Self {
        Self
    }
}

impl ImageCodec for StandardCodec {
    fn load(&self, path: &Path) -> Result<DynamicImage> {
        ensure_exists(path)?;

        if is_heic_path(path) || sniff_heic(path) {
            return load_heic(path);
        }

        let reader = ImageReader::open(path)
            .map_err(|e| map_open_error(path, e))?
            .with_guessed_format()
            .map_err(|e| ImageToolError::decode(path, e))?;

        reader
            .decode()
            .map_err(|e| ImageToolError::decode(path, e))
    }

    fn save(&self, image: &DynamicImage, path: &Path) -> Result<()> {
        // The encoder may fail after the output file has been created.
        let existed = path.exists();
        if let Err(e) = image.save(path) {
            if !existed {
                let _ = std::fs::remove_file(path);
            }
            return Err(ImageToolError::write(path, e));
        }
        tracing::debug!(path = %path.display(), "Saved image");
        Ok(())
    }
}

#[cfg(feature = "heic")]
fn load_heic(path: &Path) -> Result<DynamicImage> {
    crate::image_heic::decode_heic(path)
}

#[cfg(not(feature = "heic"))]
fn load_heic(path: &Path) -> Result<DynamicImage> {
    Err(ImageToolError::UnsupportedFormat(format!(
        "HEIC decoding is not enabled in this build ({})",
        path.display()
    )))
}

pub(crate) fn ensure_exists(path: &Path) -> Result<()> {
    match std::fs::metadata(path) {
        Ok(_) => Ok(()),
        Err(e) => Err(map_open_error(path, e)),
    }
}

fn map_open_error(path: &Path, e: std::io::Error) -> ImageToolError {
    match e.kind() {
        ErrorKind::NotFound | ErrorKind::PermissionDenied => {
            ImageToolError::NotFound(path.to_path_buf())
        }
        _ => ImageToolError::Io(e),
    }
}
