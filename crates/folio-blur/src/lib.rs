//! Placeholder generation for Folio.
//!
//! Computes a compact [BlurHash] preview of an image and wraps it in a
//! `data:` URL, which clients render while the full image loads.
//! Generation is best-effort by contract: callers treat a
//! [`PlaceholderError`] as "no placeholder", never as a failed upload.
//!
//! [BlurHash]: https://blurha.sh

pub mod error;
pub mod generator;

pub use error::PlaceholderError;
pub use generator::{BlurHashGenerator, PlaceholderGenerator};
