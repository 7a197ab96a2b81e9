// THEORY:
// The `Chunk` module holds the two rectangles the system works with.
//
// - `Block` is one cell of the partition grid: integer pixel coordinates, width
//   and height of at least one pixel. Blocks are what the renderer fills and what
//   the histogram counts.
// - `Area` is the interpolation input: a rectangle with possibly fractional
//   bounds. Sampling turns it into inclusive pixel ranges
//   `ceil(left)..=floor(right)` and `ceil(top)..=floor(bottom)`. Note the
//   inclusive right/bottom edge: a block of width `w` samples `w + 1` columns.
//   The partitioner's one-pixel-short trailing blocks rely on exactly this.
//
// A `Block` converts losslessly into an `Area`.

pub mod chunk {
    use crate::error::{PixelateError, Result};
    use std::ops::RangeInclusive;

    /// One axis-aligned rectangular cell of the partition grid.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Block {
        pub x: u32,
        pub y: u32,
        pub width: u32,
        pub height: u32,
    }

    impl Block {
        pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
            Self {
                x,
                y,
                width,
                height,
            }
        }

        /// Exclusive right edge.
        pub fn right(&self) -> u32 {
            self.x + self.width
        }

        /// Exclusive bottom edge.
        pub fn bottom(&self) -> u32 {
            self.y + self.height
        }

        pub fn area(&self) -> Area {
            Area::from(*self)
        }
    }

    /// A sampling rectangle with possibly fractional bounds.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Area {
        pub left: f64,
        pub top: f64,
        pub right: f64,
        pub bottom: f64,
    }

    impl Area {
        pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
            Self {
                left,
                top,
                right: left + width,
                bottom: top + height,
            }
        }

        pub fn width(&self) -> f64 {
            self.right - self.left
        }

        pub fn height(&self) -> f64 {
            self.bottom - self.top
        }

        /// Fails unless both extents are strictly positive.
        pub fn validate(&self) -> Result<()> {
            let (width, height) = (self.width(), self.height());
            // `!(w > 0.0)` also rejects NaN.
            if !(width > 0.0) || !(height > 0.0) {
                return Err(PixelateError::InvalidArea { width, height });
            }
            Ok(())
        }

        /// The inclusive pixel ranges this area samples, intersected with a
        /// `width` x `height` buffer. `None` if nothing is left.
        pub fn sample_ranges(
            &self,
            width: u32,
            height: u32,
        ) -> Option<(RangeInclusive<u32>, RangeInclusive<u32>)> {
            let columns = Self::clamp_axis(self.left, self.right, width)?;
            let rows = Self::clamp_axis(self.top, self.bottom, height)?;
            Some((columns, rows))
        }

        fn clamp_axis(start: f64, end: f64, extent: u32) -> Option<RangeInclusive<u32>> {
            if extent == 0 {
                return None;
            }
            let first = start.ceil().max(0.0);
            let last = end.floor().min((extent - 1) as f64);
            if first > last {
                return None;
            }
            Some(first as u32..=last as u32)
        }

        pub(crate) fn empty_sample(&self) -> PixelateError {
            PixelateError::EmptySample {
                left: self.left,
                top: self.top,
                right: self.right,
                bottom: self.bottom,
            }
        }
    }

    impl From<Block> for Area {
        fn from(block: Block) -> Self {
            Area::new(
                block.x as f64,
                block.y as f64,
                block.width as f64,
                block.height as f64,
            )
        }
    }
}
