// THEORY:
// The `pipeline` module is the top-level API of the pixelation engine. One call
// runs one full pixelation pass:
//
//   partition -> interpolate each block -> group blocks by color
//
// and hands back a `Pixelation`, from which the caller can take the ranked
// palette, the grid overlay geometry, or a rasterized image.
//
// Everything a pass needs is passed in explicitly through `PixelationConfig`.
// There is no "current interpolator" held anywhere; swapping strategies is just
// calling `render` again with a different config. Nothing is cached between
// passes: results of two different grid sizes are not comparable, so a new pass
// always starts from scratch.

use crate::core_modules::chunk::chunk::Block;
use crate::core_modules::color_usage::ColorUsage;
use crate::core_modules::grid_manager::{self, GridLines};
use crate::core_modules::histogram::{self, RankedPalette};
use crate::core_modules::pixel::pixel::Color;
use crate::core_modules::pixel_buffer::PixelSource;
use crate::error::{PixelateError, Result};
use image::{Rgba, RgbaImage};
use log::{debug, trace};

// Re-export key data structures for the public API.
pub use crate::core_modules::interpolator::Interpolator;

/// Smallest grid size the configuration accepts.
pub const MIN_GRID_SIZE: u32 = 4;
/// Largest grid size the configuration accepts.
pub const MAX_GRID_SIZE: u32 = 64;
const DEFAULT_GRID_SIZE: u32 = 16;

/// Color of the overlay grid lines in rasterized output.
pub const GRID_LINE_COLOR: Color = Color::BLACK;

/// Configuration for one pixelation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PixelationConfig {
    /// Edge length of a block in pixels.
    pub grid_size: u32,
    /// How a block's color is chosen.
    pub interpolator: Interpolator,
    /// Whether the pass also produces grid overlay lines.
    pub draw_grid: bool,
}

impl Default for PixelationConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            interpolator: Interpolator::MiddlePixel,
            draw_grid: true,
        }
    }
}

impl PixelationConfig {
    /// Checks the grid size against `MIN_GRID_SIZE..=MAX_GRID_SIZE`.
    ///
    /// `render` itself accepts any positive grid size.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&self.grid_size) {
            return Err(PixelateError::GridSizeOutOfRange {
                size: self.grid_size,
                min: MIN_GRID_SIZE,
                max: MAX_GRID_SIZE,
            });
        }
        Ok(())
    }

    /// The "16x16" style label shown next to the grid size slider.
    pub fn grid_label(&self) -> String {
        format!("{0}x{0}", self.grid_size)
    }

    /// Same pass without the grid overlay, as used for printing.
    pub fn without_grid(&self) -> Self {
        Self {
            draw_grid: false,
            ..self.clone()
        }
    }
}

/// The result of one pixelation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pixelation {
    pub image_width: u32,
    pub image_height: u32,
    pub grid_size: u32,
    /// Blocks grouped by their assigned color.
    pub usage: ColorUsage,
    /// Overlay geometry, present only if the grid was requested.
    pub grid_lines: Option<GridLines>,
}

impl Pixelation {
    /// The result for "no image loaded yet".
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.usage.is_empty()
    }

    /// Total number of blocks in the pass.
    pub fn block_count(&self) -> usize {
        self.usage.total_blocks()
    }

    /// The ranked, capped, transparency-filtered palette of this pass.
    pub fn palette(&self) -> RankedPalette {
        histogram::rank(&self.usage)
    }

    /// Paints the pass into a new image of the source size.
    pub fn rasterize(&self) -> RgbaImage {
        rasterize(
            self.image_width,
            self.image_height,
            &self.usage,
            self.grid_lines.as_ref(),
        )
    }
}

/// Runs one pixelation pass over `source`.
///
/// A `None` source means no image has been loaded yet; the result is then
/// `Pixelation::empty()` rather than an error.
pub fn render<S>(source: Option<&S>, config: &PixelationConfig) -> Result<Pixelation>
where
    S: PixelSource + ?Sized,
{
    let Some(source) = source else {
        debug!("render requested without an image; returning an empty pixelation");
        return Ok(Pixelation::empty());
    };

    if config.grid_size == 0 {
        return Err(PixelateError::ZeroGridSize);
    }

    let (image_width, image_height) = (source.width(), source.height());

    // Stage 1: Partition
    let blocks = grid_manager::partition(image_width, image_height, config.grid_size);

    // Stage 2 + 3: Interpolate and aggregate
    let mut usage = ColorUsage::new();
    for block in blocks {
        let color = config.interpolator.determine_color(source, block.area())?;
        usage.assign(color, block);
    }

    debug!(
        "pixelated {}x{} at grid {} with {}: {} blocks, {} colors",
        image_width,
        image_height,
        config.grid_size,
        config.interpolator,
        usage.total_blocks(),
        usage.len()
    );

    Ok(Pixelation {
        image_width,
        image_height,
        grid_size: config.grid_size,
        usage,
        grid_lines: overlay(image_width, image_height, config),
    })
}

pub(crate) fn overlay(
    image_width: u32,
    image_height: u32,
    config: &PixelationConfig,
) -> Option<GridLines> {
    if !config.draw_grid {
        return None;
    }
    let lines = GridLines::new(image_width, image_height, config.grid_size);
    trace!(
        "grid overlay: {} vertical, {} horizontal lines",
        lines.vertical.len(),
        lines.horizontal.len()
    );
    Some(lines)
}

/// Paints blocks and grid lines onto a transparent `width` x `height` image.
///
/// Each block fills at most `block.width` x `block.height` pixels, so the pixel
/// taken off trailing blocks by the edge clamp stays transparent. Grid lines
/// are drawn last, one pixel wide, across the whole image.
pub fn rasterize(
    width: u32,
    height: u32,
    usage: &ColorUsage,
    grid_lines: Option<&GridLines>,
) -> RgbaImage {
    let mut image = RgbaImage::from_pixel(width, height, Rgba::from(Color::TRANSPARENT));

    // All blocks of a color are painted in one batch.
    for (color, blocks) in usage.iter() {
        let paint = Rgba::from(*color);
        for block in blocks {
            fill_block(&mut image, block, paint);
        }
    }

    if let Some(lines) = grid_lines {
        let ink = Rgba::from(GRID_LINE_COLOR);
        for &x in lines.vertical.iter().filter(|&&x| x < width) {
            for y in 0..height {
                image.put_pixel(x, y, ink);
            }
        }
        for &y in lines.horizontal.iter().filter(|&&y| y < height) {
            for x in 0..width {
                image.put_pixel(x, y, ink);
            }
        }
    }

    image
}

/// Fills are clipped one pixel short of the image edge. Only the one-pixel
/// blocks the partitioner raises from zero width/height reach that far, and
/// those stay unpainted.
fn fill_block(image: &mut RgbaImage, block: &Block, paint: Rgba<u8>) {
    let right = block.right().min(image.width().saturating_sub(1));
    let bottom = block.bottom().min(image.height().saturating_sub(1));
    for y in block.y..bottom {
        for x in block.x..right {
            image.put_pixel(x, y, paint);
        }
    }
}
