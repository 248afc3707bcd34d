//! Capture surface for GovSync: reads document images and classifies them
//! for the analysis service.

pub mod capture;
pub mod mime_detect;

pub use capture::{CaptureError, DEFAULT_MAX_IMAGE_BYTES, FileCapture};
pub use mime_detect::{detect_mime_type, is_supported_image, sniff_mime_type};
