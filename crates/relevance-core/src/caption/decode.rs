//! Image decoding with format detection, validation, and timeout support.
//!
//! Decoding proves the bytes are a real image within limits. Formats vision
//! APIs accept (JPEG, PNG, GIF, WebP) are passed on unchanged; anything else
//! is re-encoded to PNG so the declared media type always matches the bytes.

use image::{GenericImageView, ImageFormat};
use std::time::Duration;
use tokio::time::timeout;

use crate::config::LimitsConfig;
use crate::error::PipelineError;

/// Image decoder with configurable limits and timeout.
pub struct ImageDecoder {
    limits: LimitsConfig,
}

/// A successfully decoded image and the bytes to caption it from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// Detected image format
    pub format: ImageFormat,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Bytes for the vision model, in `payload_format`
    pub payload: Vec<u8>,
    pub payload_format: ImageFormat,
}

/// Whether vision APIs take this format as-is.
pub fn is_caption_format(format: ImageFormat) -> bool {
    matches!(
        format,
        ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::Gif | ImageFormat::WebP
    )
}

impl ImageDecoder {
    /// Create a new decoder with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Decode an in-memory image on a blocking thread, bounded by the decode timeout.
    pub async fn decode(&self, bytes: &[u8], url: &str) -> Result<DecodedImage, PipelineError> {
        let owned = bytes.to_vec();
        let url_owned = url.to_string();
        let timeout_duration = Duration::from_millis(self.limits.decode_timeout_ms);

        let decode_result = timeout(timeout_duration, async {
            tokio::task::spawn_blocking(move || Self::decode_sync(owned, &url_owned)).await
        })
        .await;

        match decode_result {
            Ok(Ok(Ok(decoded))) => {
                if decoded.width > self.limits.max_image_dimension
                    || decoded.height > self.limits.max_image_dimension
                {
                    return Err(PipelineError::ImageTooLarge {
                        url: url.to_string(),
                        width: decoded.width,
                        height: decoded.height,
                        max_dim: self.limits.max_image_dimension,
                    });
                }
                Ok(decoded)
            }
            Ok(Ok(Err(e))) => Err(e),
            Ok(Err(e)) => Err(PipelineError::Decode {
                url: url.to_string(),
                message: format!("Task join error: {}", e),
            }),
            Err(_) => Err(PipelineError::Timeout {
                url: url.to_string(),
                stage: "decode".to_string(),
                timeout_ms: self.limits.decode_timeout_ms,
            }),
        }
    }

    /// Synchronous decode from bytes (runs in spawn_blocking).
    fn decode_sync(bytes: Vec<u8>, url: &str) -> Result<DecodedImage, PipelineError> {
        use std::io::Cursor;

        let reader = image::ImageReader::new(Cursor::new(bytes.as_slice()))
            .with_guessed_format()
            .map_err(|e| PipelineError::Decode {
                url: url.to_string(),
                message: format!("Cannot detect image format: {}", e),
            })?;
        let format = reader.format().ok_or_else(|| PipelineError::Decode {
            url: url.to_string(),
            message: "Unrecognized image format".to_string(),
        })?;
        let image = reader.decode().map_err(|e| PipelineError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let (width, height) = image.dimensions();
        let (payload, payload_format) = if is_caption_format(format) {
            (bytes, format)
        } else {
            tracing::debug!("Re-encoding {format:?} image from {url} as PNG");
            let rgba = image::DynamicImage::ImageRgba8(image.to_rgba8());
            let mut buf = Cursor::new(Vec::new());
            rgba.write_to(&mut buf, ImageFormat::Png)
                .map_err(|e| PipelineError::Decode {
                    url: url.to_string(),
                    message: format!("PNG re-encode failed: {e}"),
                })?;
            (buf.into_inner(), ImageFormat::Png)
        };

        Ok(DecodedImage {
            format,
            width,
            height,
            payload,
            payload_format,
        })
    }
}

/// Convert an ImageFormat to a string representation.
pub fn format_to_string(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg".to_string(),
        ImageFormat::Png => "png".to_string(),
        ImageFormat::WebP => "webp".to_string(),
        ImageFormat::Gif => "gif".to_string(),
        ImageFormat::Tiff => "tiff".to_string(),
        ImageFormat::Bmp => "bmp".to_string(),
        ImageFormat::Ico => "ico".to_string(),
        ImageFormat::Pnm => "pnm".to_string(),
        ImageFormat::Avif => "avif".to_string(),
        _ => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::new(width, height));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_format_to_string() {
        assert_eq!(format_to_string(ImageFormat::Jpeg), "jpeg");
        assert_eq!(format_to_string(ImageFormat::Png), "png");
        assert_eq!(format_to_string(ImageFormat::WebP), "webp");
    }

    #[tokio::test]
    async fn test_decode_png() {
        let decoder = ImageDecoder::new(LimitsConfig::default());
        let decoded = decoder
            .decode(&png_bytes(16, 8), "https://example.com/a")
            .await
            .unwrap();
        assert_eq!(decoded.format, ImageFormat::Png);
        assert_eq!((decoded.width, decoded.height), (16, 8));
    }

    #[tokio::test]
    async fn test_png_payload_is_passed_through() {
        let bytes = png_bytes(4, 4);
        let decoder = ImageDecoder::new(LimitsConfig::default());
        let decoded = decoder.decode(&bytes, "https://example.com/a").await.unwrap();
        assert_eq!(decoded.payload_format, ImageFormat::Png);
        assert_eq!(decoded.payload, bytes);
    }

    #[tokio::test]
    async fn test_bmp_is_reencoded_as_png() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(6, 5));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Bmp).unwrap();

        let decoder = ImageDecoder::new(LimitsConfig::default());
        let decoded = decoder
            .decode(&buf.into_inner(), "https://example.com/diagram.bmp")
            .await
            .unwrap();
        assert_eq!(decoded.format, ImageFormat::Bmp);
        assert_eq!(decoded.payload_format, ImageFormat::Png);
        assert_eq!(
            image::guess_format(&decoded.payload).unwrap(),
            ImageFormat::Png
        );
        assert_eq!((decoded.width, decoded.height), (6, 5));
    }

    #[test]
    fn test_caption_formats() {
        assert!(is_caption_format(ImageFormat::Jpeg));
        assert!(is_caption_format(ImageFormat::WebP));
        assert!(!is_caption_format(ImageFormat::Bmp));
        assert!(!is_caption_format(ImageFormat::Tiff));
    }

    #[tokio::test]
    async fn test_decode_garbage_is_recoverable() {
        let decoder = ImageDecoder::new(LimitsConfig::default());
        let err = decoder
            .decode(b"definitely not an image", "https://example.com/x.png")
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Decode { .. }));
        assert!(err.is_recoverable());
    }

    #[tokio::test]
    async fn test_decode_rejects_oversized_dimensions() {
        let decoder = ImageDecoder::new(LimitsConfig {
            max_image_dimension: 10,
            ..LimitsConfig::default()
        });
        let err = decoder
            .decode(&png_bytes(32, 4), "https://example.com/wide.png")
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::ImageTooLarge { width: 32, .. }));
    }
}
