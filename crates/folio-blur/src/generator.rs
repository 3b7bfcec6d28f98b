use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::PlaceholderError;

/// Computes an opaque preview string from stored image bytes.
///
/// Implementations are synchronous and CPU-bound; async callers should run
/// them on a blocking thread.
pub trait PlaceholderGenerator: Send + Sync {
    fn generate(&self, data: &[u8]) -> Result<String, PlaceholderError>;
}

/// BlurHash placeholder rendered as a `data:text/plain;base64,...` URL.
#[derive(Clone, Copy, Debug)]
pub struct BlurHashGenerator {
    components_x: u32,
    components_y: u32,
    /// Images are downsampled to fit this edge before encoding.
    sample_edge: u32,
}

impl BlurHashGenerator {
    pub const fn new(components_x: u32, components_y: u32) -> Self {
        Self {
            components_x,
            components_y,
            sample_edge: 64,
        }
    }

    /// Produce the bare BlurHash string without the data URL wrapping.
    pub fn hash(&self, data: &[u8]) -> Result<String, PlaceholderError> {
        let decoded =
            image::load_from_memory(data).map_err(|e| PlaceholderError::Decode(e.to_string()))?;
        let sample = decoded.thumbnail(self.sample_edge, self.sample_edge).to_rgba8();
        blurhash::encode(
            self.components_x,
            self.components_y,
            sample.width(),
            sample.height(),
            sample.as_raw(),
        )
        .map_err(|e| PlaceholderError::Encode(format!("{e:?}")))
    }
}

impl Default for BlurHashGenerator {
    fn default() -> Self {
        Self::new(4, 4)
    }
}

impl PlaceholderGenerator for BlurHashGenerator {
    fn generate(&self, data: &[u8]) -> Result<String, PlaceholderError> {
        let hash = self.hash(data)?;
        Ok(format!("data:text/plain;base64,{}", STANDARD.encode(hash)))
    }
}
