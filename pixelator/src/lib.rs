// THEORY:
// This file is the main entry point for the `pixelator` library crate.
// It reduces a decoded raster image to a grid of uniformly colored blocks and
// ranks the colors that result.
//
// The public surface is small:
// - `pipeline::render` runs one synchronous pixelation pass and returns a
//   `Pixelation` (blocks grouped by color, optional grid overlay).
// - `Pixelation::palette` ranks the colors for display and
//   `Pixelation::rasterize` paints the result into an image.
// - `parallel_pipeline::ParallelPixelator` runs the same pass on a tokio
//   worker pool and tells the caller when a pass has been superseded.
//
// Decoding, file handling and any UI live outside this crate; callers hand in
// an already decoded `PixelSource`.

pub mod core_modules;
pub mod error;
pub mod parallel_pipeline;
pub mod pipeline;

pub use crate::core_modules::chunk::chunk::{Area, Block};
pub use crate::core_modules::color_usage::ColorUsage;
pub use crate::core_modules::grid_manager::{GridLines, partition};
pub use crate::core_modules::histogram::{MAX_PALETTE_ENTRIES, PaletteEntry, RankedPalette, rank};
pub use crate::core_modules::interpolator::{Interpolator, UnknownInterpolator};
pub use crate::core_modules::pixel::pixel::Color;
pub use crate::core_modules::pixel_buffer::{PixelBuffer, PixelSource};
pub use crate::error::{PixelateError, Result};
pub use crate::pipeline::{Pixelation, PixelationConfig, render};
