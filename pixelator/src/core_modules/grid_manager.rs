// THEORY:
// The `GridManager` turns image dimensions and a grid size into the sequence of
// `Block`s a pixelation pass works on. It is the slicing step that bridges the
// raw image and the block-based analysis.
//
// Key architectural principles:
// 1.  **Scan Order**: Blocks come out column-major: the outer loop walks `x` in
//     steps of `grid_size`, the inner loop walks `y`. Counts do not depend on the
//     order, but the "first encountered wins" tie-breaks of the histogram do, so
//     the order is part of the contract.
// 2.  **Edge Clamp**: A block whose nominal right edge reaches or passes the image
//     width gets width `image_width - x - 1`, one pixel short of the true edge.
//     The same rule applies to heights. The interpolators sample inclusively, so
//     the short block still samples the last column; the renderer, which fills
//     exclusively, leaves that column unfilled. This is reproduced as-is.
//     If the clamp would produce a zero extent (the block starts on the last
//     pixel), the extent is raised to one pixel so that every block stays
//     sampleable.
// 3.  **Geometry Only**: Grid lines for the overlay are returned as coordinates.
//     They are never written into pixel data by this module.
// 4.  **No Range Policy**: The UI offers grid sizes 4..=64. This module only
//     requires a non-zero size; enforcing the UI range is the job of
//     `PixelationConfig::validate`.

use crate::core_modules::chunk::chunk::Block;

/// Splits a `image_width` x `image_height` image into blocks of `grid_size`.
///
/// Returns an empty sequence for a zero dimension or a zero grid size.
pub fn partition(image_width: u32, image_height: u32, grid_size: u32) -> Vec<Block> {
    if image_width == 0 || image_height == 0 || grid_size == 0 {
        return Vec::new();
    }

    let columns = image_width.div_ceil(grid_size) as usize;
    let rows = image_height.div_ceil(grid_size) as usize;
    let mut blocks = Vec::with_capacity(columns * rows);

    for x in (0..image_width).step_by(grid_size as usize) {
        let width = clamped_extent(x, grid_size, image_width);
        for y in (0..image_height).step_by(grid_size as usize) {
            let height = clamped_extent(y, grid_size, image_height);
            blocks.push(Block::new(x, y, width, height));
        }
    }

    blocks
}

/// Number of blocks `partition` produces, without allocating them.
pub fn block_count(image_width: u32, image_height: u32, grid_size: u32) -> usize {
    if image_width == 0 || image_height == 0 || grid_size == 0 {
        return 0;
    }
    image_width.div_ceil(grid_size) as usize * image_height.div_ceil(grid_size) as usize
}

fn clamped_extent(origin: u32, grid_size: u32, image_extent: u32) -> u32 {
    if origin.saturating_add(grid_size) >= image_extent {
        (image_extent - origin - 1).max(1)
    } else {
        grid_size
    }
}

/// Positions of the overlay grid lines, in pixel coordinates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridLines {
    /// x coordinates of the vertical lines; each spans the full image height.
    pub vertical: Vec<u32>,
    /// y coordinates of the horizontal lines; each spans the full image width.
    pub horizontal: Vec<u32>,
}

impl GridLines {
    /// Lines at every multiple of `grid_size` strictly between 0 and the image extent.
    pub fn new(image_width: u32, image_height: u32, grid_size: u32) -> Self {
        Self {
            vertical: Self::positions(image_width, grid_size),
            horizontal: Self::positions(image_height, grid_size),
        }
    }

    fn positions(extent: u32, grid_size: u32) -> Vec<u32> {
        if grid_size == 0 {
            return Vec::new();
        }
        (grid_size..extent).step_by(grid_size as usize).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.vertical.is_empty() && self.horizontal.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scans_x_outer_then_y() {
        let blocks = partition(32, 32, 16);
        let origins: Vec<(u32, u32)> = blocks.iter().map(|b| (b.x, b.y)).collect();
        assert_eq!(origins, vec![(0, 0), (0, 16), (16, 0), (16, 16)]);
    }

    #[test]
    fn trailing_blocks_are_one_pixel_short() {
        let blocks = partition(32, 20, 16);
        // First column: full width, trailing row clamped to 20 - 16 - 1.
        assert_eq!(blocks[0], Block::new(0, 0, 16, 16));
        assert_eq!(blocks[1], Block::new(0, 16, 16, 3));
        // Second column reaches the edge exactly: 32 - 16 - 1.
        assert_eq!(blocks[2], Block::new(16, 0, 15, 16));
        assert_eq!(blocks[3], Block::new(16, 16, 15, 3));
    }

    #[test]
    fn exact_fit_image_still_gets_the_short_edge() {
        let blocks = partition(16, 16, 16);
        assert_eq!(blocks, vec![Block::new(0, 0, 15, 15)]);
    }

    #[test]
    fn block_starting_on_last_pixel_keeps_one_pixel() {
        let blocks = partition(17, 1, 16);
        assert_eq!(blocks, vec![Block::new(0, 0, 16, 1), Block::new(16, 0, 1, 1)]);
    }

    #[test]
    fn degenerate_input_is_empty() {
        assert!(partition(0, 10, 4).is_empty());
        assert!(partition(10, 0, 4).is_empty());
        assert!(partition(10, 10, 0).is_empty());
        assert_eq!(block_count(0, 10, 4), 0);
    }

    #[test]
    fn block_count_matches_partition() {
        for (w, h, g) in [(1, 1, 4), (37, 23, 4), (64, 64, 64), (100, 3, 7), (640, 480, 13)] {
            assert_eq!(block_count(w, h, g), partition(w, h, g).len(), "{w}x{h} @ {g}");
        }
    }

    /// Every pixel is covered by exactly one block once the trailing blocks are
    /// widened back by the pixel the clamp took away.
    #[test]
    fn blocks_tile_the_image_modulo_the_edge_clamp() {
        for (w, h, g) in [(37, 23, 4), (64, 64, 16), (17, 33, 16), (5, 9, 64)] {
            let mut hits = vec![0u32; (w * h) as usize];
            for block in partition(w, h, g) {
                let right = if block.x + g >= w { w } else { block.right() };
                let bottom = if block.y + g >= h { h } else { block.bottom() };
                for y in block.y..bottom {
                    for x in block.x..right {
                        hits[(y * w + x) as usize] += 1;
                    }
                }
            }
            assert!(hits.iter().all(|&n| n == 1), "{w}x{h} @ {g} is not a tiling");
        }
    }

    #[test]
    fn grid_lines_are_strictly_inside_the_image() {
        let lines = GridLines::new(40, 32, 16);
        assert_eq!(lines.vertical, vec![16, 32]);
        assert_eq!(lines.horizontal, vec![16]);

        assert!(GridLines::new(16, 16, 16).is_empty());
    }
}
