//! Media type detection and stored file naming.

use image::ImageFormat;

use crate::digest::ContentDigest;
use crate::error::{StoreError, StoreResult};

/// Image media types the store accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaType {
    Jpeg,
    Png,
    WebP,
}

impl MediaType {
    /// Sniff the media type from the leading bytes of the content.
    ///
    /// Returns `None` for anything that is not an accepted image type,
    /// including formats the decoder knows but the store does not accept.
    pub fn detect(data: &[u8]) -> Option<Self> {
        match image::guess_format(data).ok()? {
            ImageFormat::Jpeg => Some(Self::Jpeg),
            ImageFormat::Png => Some(Self::Png),
            ImageFormat::WebP => Some(Self::WebP),
            _ => None,
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::WebP => "image/webp",
        }
    }

    /// Canonical extension (without dot) of stored files of this type.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::WebP => "webp",
        }
    }
}

/// Validate content and derive its stored file name.
///
/// The name is `<blake3-hex>.<ext>` with the canonical extension of the
/// detected media type, so it depends on the bytes alone.
pub fn stored_file_name(data: &[u8]) -> StoreResult<(MediaType, String)> {
    let media = MediaType::detect(data).ok_or_else(|| StoreError::UnsupportedMediaType {
        detected: describe_unknown(data),
    })?;
    let digest = ContentDigest::compute(data);
    Ok((media, format!("{}.{}", digest.to_hex(), media.extension())))
}

fn describe_unknown(data: &[u8]) -> String {
    if data.is_empty() {
        return "empty content".to_string();
    }
    match image::guess_format(data) {
        Ok(format) => format!("{format:?}"),
        Err(_) => "unrecognized content".to_string(),
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn detects_accepted_types() {
        assert_eq!(MediaType::detect(PNG), Some(MediaType::Png));
        assert_eq!(MediaType::detect(JPEG), Some(MediaType::Jpeg));
        assert_eq!(MediaType::detect(WEBP), Some(MediaType::WebP));
    }

    #[test]
    fn rejects_other_types() {
        assert_eq!(MediaType::detect(GIF), None);
        assert_eq!(MediaType::detect(TEXT), None);
        assert_eq!(MediaType::detect(&[]), None);
    }

    #[test]
    fn name_uses_detected_extension() {
        let (media, name) = stored_file_name(PNG).unwrap();
        assert_eq!(media, MediaType::Png);
        assert!(name.ends_with(".png"));
        assert_eq!(name.len(), 64 + 4);

        let (_, name) = stored_file_name(JPEG).unwrap();
        assert!(name.ends_with(".jpg"));

        let (_, name) = stored_file_name(WEBP).unwrap();
        assert!(name.ends_with(".webp"));
    }

    #[test]
    fn same_bytes_same_name() {
        assert_eq!(stored_file_name(PNG).unwrap(), stored_file_name(PNG).unwrap());
        assert_ne!(stored_file_name(PNG).unwrap().1, stored_file_name(JPEG).unwrap().1);
    }

    #[test]
    fn unsupported_content_is_rejected() {
        let err = stored_file_name(TEXT).unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedMediaType { .. }));

        let err = stored_file_name(GIF).unwrap_err();
        match err {
            StoreError::UnsupportedMediaType { detected } => assert_eq!(detected, "Gif"),
            other => panic!("expected UnsupportedMediaType, got {other:?}"),
        }
    }
}
