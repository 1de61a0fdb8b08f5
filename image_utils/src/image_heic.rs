//! HEIC/HEIF Format Module
//!
//! Detection by extension or `ftyp` brand, and decoding through libheif-rs
//! when the `heic` feature is enabled.

use std::io::Read;
use std::path::Path;

pub const HEIC_EXTENSIONS: &[&str] = &["heic", "heif"];

const HEIC_BRANDS: &[&[u8; 4]] = &[b"heic", b"heix", b"heim", b"heis", b"mif1", b"msf1"];

pub fn is_heic_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| HEIC_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Checks the ISO-BMFF `ftyp` major brand.
pub fn sniff_heic(path: &Path) -> bool {
    let Ok(mut file) = std::fs::File::open(path) else {
        return false;
    };
    let mut buffer = [0u8; 12];
    if file.read_exact(&mut buffer).is_err() {
        return false;
    }
    is_heic_header(&buffer)
}

fn is_heic_header(buffer: &[u8; 12]) -> bool {
    &buffer[4..8] == b"ftyp" && HEIC_BRANDS.iter().any(|brand| &buffer[8..12] == *brand)
}

#[cfg(feature = "heic")]
pub use decode::decode_heic;

#[cfg(feature = "heic")]
mod decode {
    use crate::img_errors::{ImageToolError, Result};
    use image::{DynamicImage, RgbImage};
    use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};
    use std::path::Path;

    /// Decode the primary image of a HEIC container to 8-bit RGB.
    pub fn decode_heic(path: &Path) -> Result<DynamicImage> {
        let lib_heif = LibHeif::new();

        let ctx = HeifContext::read_from_file(path.to_string_lossy().as_ref())
            .map_err(|e| ImageToolError::decode(path, format!("Failed to read HEIC: {}", e)))?;

        let handle = ctx.primary_image_handle().map_err(|e| {
            ImageToolError::decode(path, format!("Failed to get primary image: {}", e))
        })?;

        let width = handle.width();
        let height = handle.height();

        let decoded = lib_heif
            .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), None)
            .map_err(|e| ImageToolError::decode(path, format!("Failed to decode HEIC: {}", e)))?;

        let planes = decoded.planes();
        let plane = planes
            .interleaved
            .ok_or_else(|| ImageToolError::decode(path, "No RGB plane found"))?;

        // rows may be padded past width * 3
        let row_len = width as usize * 3;
        let mut data = Vec::with_capacity(row_len * height as usize);
        for row in plane.data.chunks(plane.stride).take(height as usize) {
            let row = row
                .get(..row_len)
                .ok_or_else(|| ImageToolError::decode(path, "Truncated RGB plane"))?;
            data.extend_from_slice(row);
        }

        tracing::debug!(path = %path.display(), width, height, "Decoded HEIC image");

        RgbImage::from_raw(width, height, data)
            .map(DynamicImage::ImageRgb8)
            .ok_or_else(|| ImageToolError::decode(path, "Failed to create RGB image"))
    }
}
