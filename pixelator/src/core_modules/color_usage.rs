// THEORY:
// `ColorUsage` groups the blocks of one pixelation pass by the color they were
// assigned. It serves two consumers at once:
// - the renderer, which fills every block of a color in one batch, and
// - the histogram, which only needs the length of each bucket.
//
// It is built once per pass and then only read. Buckets remember the order in
// which their color was first assigned during the block scan; the histogram's
// stable sort relies on that order for tie-breaks, so it must never be
// re-derived from anything else.

use crate::core_modules::chunk::chunk::Block;
use crate::core_modules::pixel::pixel::Color;
use std::collections::HashMap;

/// Mapping from a resulting color to the blocks that were assigned it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorUsage {
    buckets: Vec<(Color, Vec<Block>)>,
    index: HashMap<Color, usize>,
}

impl ColorUsage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `block` to the bucket of `color`, creating the bucket on first use.
    pub fn assign(&mut self, color: Color, block: Block) {
        match self.index.get(&color) {
            Some(&slot) => self.buckets[slot].1.push(block),
            None => {
                self.index.insert(color, self.buckets.len());
                self.buckets.push((color, vec![block]));
            }
        }
    }

    /// The blocks assigned `color`, in scan order.
    pub fn blocks(&self, color: &Color) -> Option<&[Block]> {
        self.index
            .get(color)
            .map(|&slot| self.buckets[slot].1.as_slice())
    }

    /// How many blocks were assigned `color`.
    pub fn count(&self, color: &Color) -> usize {
        self.blocks(color).map_or(0, <[Block]>::len)
    }

    /// Buckets in first-encounter order.
    pub fn iter(&self) -> impl Iterator<Item = (&Color, &[Block])> + '_ {
        self.buckets
            .iter()
            .map(|(color, blocks)| (color, blocks.as_slice()))
    }

    /// Number of distinct colors.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Sum of all bucket lengths; equals the number of blocks in the pass.
    pub fn total_blocks(&self) -> usize {
        self.buckets.iter().map(|(_, blocks)| blocks.len()).sum()
    }
}

impl FromIterator<(Color, Block)> for ColorUsage {
    fn from_iter<I: IntoIterator<Item = (Color, Block)>>(iter: I) -> Self {
        let mut usage = ColorUsage::new();
        for (color, block) in iter {
            usage.assign(color, block);
        }
        usage
    }
}
