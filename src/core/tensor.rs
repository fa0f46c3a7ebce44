//! The decoded image tensor consumed by inference.

use crate::core::constants::RGB_CHANNELS;
use image::RgbImage;
use ndarray::{Array3, ArrayView3};

/// A decoded image as an exclusively owned H×W×C float buffer.
///
/// The tensor is a transient value: the decoder produces it, the inference
/// call consumes it by value, and it is dropped inside that call on every
/// exit path (success or failure). Nothing retains a decoded tensor across
/// classification episodes.
///
/// Values are raw channel intensities in `[0, 255]`; providers apply their
/// own input scaling during preprocessing.
#[derive(Debug, Clone)]
pub struct DecodedTensor {
    data: Array3<f32>,
}

impl DecodedTensor {
    /// Creates a tensor from an owned array in H×W×C layout.
    pub fn from_array(data: Array3<f32>) -> Self {
        Self { data }
    }

    /// Creates an H×W×3 tensor from an RGB image.
    pub fn from_rgb(image: &RgbImage) -> Self {
        let (width, height) = image.dimensions();
        let data = Array3::from_shape_fn(
            (height as usize, width as usize, RGB_CHANNELS),
            |(y, x, c)| image.get_pixel(x as u32, y as u32)[c] as f32,
        );
        Self { data }
    }

    /// Height of the image in pixels.
    pub fn height(&self) -> usize {
        self.data.shape()[0]
    }

    /// Width of the image in pixels.
    pub fn width(&self) -> usize {
        self.data.shape()[1]
    }

    /// Number of color channels.
    pub fn channels(&self) -> usize {
        self.data.shape()[2]
    }

    /// Shape as (height, width, channels).
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.height(), self.width(), self.channels())
    }

    /// Borrowed view of the underlying buffer.
    pub fn view(&self) -> ArrayView3<'_, f32> {
        self.data.view()
    }

    /// Consumes the tensor, returning the underlying buffer.
    pub fn into_inner(self) -> Array3<f32> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_from_rgb_shape_and_values() {
        let image = RgbImage::from_pixel(4, 2, Rgb([10, 20, 30]));
        let tensor = DecodedTensor::from_rgb(&image);

        assert_eq!(tensor.shape(), (2, 4, 3));
        assert_eq!(tensor.view()[(0, 0, 0)], 10.0);
        assert_eq!(tensor.view()[(1, 3, 2)], 30.0);
    }

    #[test]
    fn test_into_inner_returns_buffer() {
        let image = RgbImage::from_pixel(2, 2, Rgb([255, 0, 128]));
        let data = DecodedTensor::from_rgb(&image).into_inner();

        assert_eq!(data.shape(), &[2, 2, 3]);
        assert_eq!(data[(0, 1, 0)], 255.0);
    }
}
