//! Upload normalization
//!
//! The Gemini API only accepts PNG or JPEG inline data, so every upload is
//! decoded and re-encoded into one of those two formats before sending.

pub mod normalizer;

pub use normalizer::{normalize, normalize_blocking, JPEG_QUALITY};
