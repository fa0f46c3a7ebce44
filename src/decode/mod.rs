//! Decoding of encoded image bytes into model-consumable tensors.

use tracing::debug;

use crate::core::constants::RGB_CHANNELS;
use crate::core::errors::DecodeError;
use crate::core::tensor::DecodedTensor;
use crate::core::traits::ImageDecoder;

/// Decoder for the common raster encodings (PNG, JPEG, GIF, BMP, WebP, ...)
/// built on the `image` crate.
///
/// Any supported color depth is normalized to 8-bit RGB; an alpha channel is
/// stripped. The decoder preserves the source resolution; spatial resizing
/// to the model's input dimensions is the provider's preprocessing
/// responsibility.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterDecoder;

impl RasterDecoder {
    /// Creates a new raster decoder.
    pub fn new() -> Self {
        Self
    }
}

impl ImageDecoder for RasterDecoder {
    fn decode(&self, bytes: &[u8], channels: usize) -> Result<DecodedTensor, DecodeError> {
        if channels != RGB_CHANNELS {
            return Err(DecodeError::UnsupportedChannelCount {
                requested: channels,
            });
        }

        let image = image::load_from_memory(bytes)?;
        let rgb = image.to_rgb8();
        debug!(
            width = rgb.width(),
            height = rgb.height(),
            "decoded image bytes"
        );

        Ok(DecodedTensor::from_rgb(&rgb))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    fn encode_png(image: DynamicImage) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, ImageFormat::Png).unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_decode_png_preserves_dimensions() {
        let bytes = encode_png(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            5,
            4,
            Rgb([10, 20, 30]),
        )));

        let tensor = RasterDecoder::new().decode(&bytes, 3).unwrap();
        assert_eq!(tensor.shape(), (4, 5, 3));
        assert_eq!(tensor.view()[(0, 0, 1)], 20.0);
    }

    #[test]
    fn test_decode_strips_alpha_channel() {
        let bytes = encode_png(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            2,
            2,
            Rgba([50, 60, 70, 128]),
        )));

        let tensor = RasterDecoder::new().decode(&bytes, 3).unwrap();
        assert_eq!(tensor.channels(), 3);
        assert_eq!(tensor.view()[(0, 0, 0)], 50.0);
    }

    #[test]
    fn test_unrecognized_bytes_are_unsupported_format() {
        let result = RasterDecoder::new().decode(b"definitely not an image", 3);
        assert!(matches!(
            result,
            Err(DecodeError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_truncated_png_is_corrupt_data() {
        // Valid PNG signature followed by garbage.
        let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
        bytes.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef, 0xde, 0xad, 0xbe, 0xef]);

        let result = RasterDecoder::new().decode(&bytes, 3);
        assert!(matches!(result, Err(DecodeError::CorruptData { .. })));
    }

    #[test]
    fn test_non_rgb_channel_request_is_rejected() {
        let bytes = encode_png(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            1,
            1,
            Rgb([0, 0, 0]),
        )));

        let result = RasterDecoder::new().decode(&bytes, 4);
        assert!(matches!(
            result,
            Err(DecodeError::UnsupportedChannelCount { requested: 4 })
        ));
    }
}
