// THEORY:
// A `PixelSource` is the read-only window through which the core sees an image.
// Decoding happens before the core is invoked, so the core never owns pixels:
// it borrows them for the duration of one pixelation pass.
//
// Two sources are provided:
// - `PixelBuffer`, a zero-copy view over a raw RGBA byte slice (the layout a
//   camera frame or a decoded bitmap is handed over in), and
// - `image::RgbaImage`, so callers who decoded with the `image` crate can pass
//   their image straight in.
//
// Both are `Sync`, which is what lets the parallel pipeline share one source
// across workers without locking.

use crate::core_modules::pixel::pixel::{CHANNELS, Color};
use crate::error::{PixelateError, Result};
use image::RgbaImage;

/// Read-only, addressable access to decoded pixels.
pub trait PixelSource {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// The color at `(x, y)`. Only valid for `x < width()` and `y < height()`.
    fn pixel(&self, x: u32, y: u32) -> Color;
}

/// A non-owning view over a tightly packed RGBA8 buffer, rows top to bottom.
#[derive(Debug, Clone, Copy)]
pub struct PixelBuffer<'a> {
    width: u32,
    height: u32,
    data: &'a [u8],
}

impl<'a> PixelBuffer<'a> {
    pub fn new(width: u32, height: u32, data: &'a [u8]) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(PixelateError::InvalidDimensions { width, height });
        }

        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(PixelateError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }
}

impl PixelSource for PixelBuffer<'_> {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn pixel(&self, x: u32, y: u32) -> Color {
        debug_assert!(x < self.width && y < self.height);
        let byte_index = (y as usize * self.width as usize + x as usize) * CHANNELS;
        Color::new(
            self.data[byte_index],
            self.data[byte_index + 1],
            self.data[byte_index + 2],
            self.data[byte_index + 3],
        )
    }
}

impl PixelSource for RgbaImage {
    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }

    #[inline]
    fn pixel(&self, x: u32, y: u32) -> Color {
        Color::from(*self.get_pixel(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn reads_rgba_in_row_major_order() {
        // 2x2: red, green / blue, transparent
        let data = [
            255, 0, 0, 255, 0, 255, 0, 255, //
            0, 0, 255, 255, 0, 0, 0, 0,
        ];
        let buffer = PixelBuffer::new(2, 2, &data).expect("valid buffer");

        assert_eq!(buffer.pixel(0, 0), Color::opaque(255, 0, 0));
        assert_eq!(buffer.pixel(1, 0), Color::opaque(0, 255, 0));
        assert_eq!(buffer.pixel(0, 1), Color::opaque(0, 0, 255));
        assert_eq!(buffer.pixel(1, 1), Color::TRANSPARENT);
    }

    #[test]
    fn rejects_mismatched_length() {
        let data = vec![0u8; 15];
        assert_eq!(
            PixelBuffer::new(2, 2, &data).unwrap_err(),
            PixelateError::BufferSizeMismatch {
                expected: 16,
                actual: 15
            }
        );
    }

    #[test]
    fn rejects_zero_dimensions() {
        assert_eq!(
            PixelBuffer::new(0, 3, &[]).unwrap_err(),
            PixelateError::InvalidDimensions {
                width: 0,
                height: 3
            }
        );
    }

    #[test]
    fn rgba_image_is_a_source() {
        let mut image = RgbaImage::new(3, 1);
        image.put_pixel(2, 0, Rgba([9, 8, 7, 6]));

        assert_eq!(PixelSource::width(&image), 3);
        assert_eq!(PixelSource::height(&image), 1);
        assert_eq!(PixelSource::pixel(&image, 2, 0), Color::new(9, 8, 7, 6));
    }
}
