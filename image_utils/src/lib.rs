//! Shared utilities for the image tools
//!
//! - Pixel comparison with an optional inverted difference image
//! - HEIC → JPEG conversion (single file or directory)
//! - Pluggable decode/encode backend
//! - Common error type, logging setup and reporting

pub mod batch;
pub mod codec;
pub mod compare;
pub mod conversion;
pub mod image_heic;
pub mod img_errors;
pub mod logging;
pub mod metadata;
pub mod report;

pub use batch::{collect_files, BatchResult};
pub use codec::{ImageCodec, StandardCodec};
pub use compare::{
    compare_images, derive_output_name, AlignPolicy, CompareOptions, ComparisonResult,
    ImageComparator,
};
pub use conversion::{
    convert_heic, convert_heic_directory, ConversionOutcome, ConvertOptions, DirectoryReport,
    HeicConverter,
};
pub use image_heic::{is_heic_path, sniff_heic};
pub use img_errors::{ImageToolError, Result};
