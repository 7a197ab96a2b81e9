// THEORY:
// The histogram is the last stage of a pixelation pass: it turns the
// `ColorUsage` of the pass into the short, ranked list the user sees next to
// the image.
//
// Rules, in order:
// 1.  Sort buckets by block count, most used first. The sort is stable over the
//     buckets' first-encounter order, so equal counts keep scan order.
// 2.  Drop fully transparent colors (alpha 0).
// 3.  Keep at most `MAX_PALETTE_ENTRIES` survivors. Truncation happens after the
//     transparency filter, so a transparent color never costs a slot.
//
// `rank` only reads the usage; the returned `RankedPalette` is an independent
// snapshot.

use crate::core_modules::color_usage::ColorUsage;
use crate::core_modules::pixel::pixel::Color;
use std::fmt;

/// Upper bound on the number of entries in a `RankedPalette`.
pub const MAX_PALETTE_ENTRIES: usize = 64;

/// One line of the palette list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PaletteEntry {
    pub color: Color,
    pub count: usize,
}

impl fmt::Display for PaletteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {} time(s)", self.color.to_argb_hex(), self.count)
    }
}

/// Colors ranked by usage, descending, transparent colors removed, capped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankedPalette {
    entries: Vec<PaletteEntry>,
}

impl RankedPalette {
    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PaletteEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a RankedPalette {
    type Item = &'a PaletteEntry;
    type IntoIter = std::slice::Iter<'a, PaletteEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Ranks the colors of a pass for display.
pub fn rank(usage: &ColorUsage) -> RankedPalette {
    let mut entries: Vec<PaletteEntry> = usage
        .iter()
        .map(|(color, blocks)| PaletteEntry {
            color: *color,
            count: blocks.len(),
        })
        .collect();

    // `sort_by` is stable.
    entries.sort_by(|a, b| b.count.cmp(&a.count));

    let entries = entries
        .into_iter()
        .filter(|entry| !entry.color.is_transparent())
        .take(MAX_PALETTE_ENTRIES)
        .collect();

    RankedPalette { entries }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::chunk::chunk::Block;

    fn usage_from_counts(counts: &[(Color, usize)]) -> ColorUsage {
        let mut usage = ColorUsage::new();
        let mut offset = 0;
        for &(color, count) in counts {
            for _ in 0..count {
                usage.assign(color, Block::new(offset, 0, 1, 1));
                offset += 1;
            }
        }
        usage
    }

    fn grey(level: u8) -> Color {
        Color::opaque(level, level, level)
    }

    #[test]
    fn sorted_by_count_descending() {
        let usage = usage_from_counts(&[(grey(1), 1), (grey(2), 3), (grey(3), 2)]);
        let counts: Vec<usize> = rank(&usage).iter().map(|e| e.count).collect();
        assert_eq!(counts, vec![3, 2, 1]);
    }

    #[test]
    fn equal_counts_keep_first_encounter_order() {
        let mut usage = ColorUsage::new();
        // Interleave so first-encounter order is 5, 9, 7.
        usage.assign(grey(5), Block::new(0, 0, 1, 1));
        usage.assign(grey(9), Block::new(1, 0, 1, 1));
        usage.assign(grey(5), Block::new(2, 0, 1, 1));
        usage.assign(grey(7), Block::new(3, 0, 1, 1));
        usage.assign(grey(9), Block::new(4, 0, 1, 1));
        usage.assign(grey(7), Block::new(5, 0, 1, 1));

        let order: Vec<Color> = rank(&usage).iter().map(|e| e.color).collect();
        assert_eq!(order, vec![grey(5), grey(9), grey(7)]);
    }

    #[test]
    fn transparent_colors_are_dropped_before_truncation() {
        let mut counts = vec![(Color::new(10, 10, 10, 0), 500), (Color::TRANSPARENT, 400)];
        counts.extend((0..70u8).map(|i| (grey(i), 1)));
        let usage = usage_from_counts(&counts);

        let palette = rank(&usage);
        assert_eq!(palette.len(), MAX_PALETTE_ENTRIES);
        assert!(palette.iter().all(|e| !e.color.is_transparent()));
        // Survivors are the first 64 opaque greys in scan order.
        assert_eq!(palette.entries()[0].color, grey(0));
        assert_eq!(palette.entries()[63].color, grey(63));
    }

    #[test]
    fn never_longer_than_cap_and_monotonic() {
        let counts: Vec<(Color, usize)> =
            (0..100u8).map(|i| (grey(i), (i as usize * 7) % 13 + 1)).collect();
        let palette = rank(&usage_from_counts(&counts));

        assert!(palette.len() <= MAX_PALETTE_ENTRIES);
        assert!(palette.entries().windows(2).all(|w| w[0].count >= w[1].count));
    }

    #[test]
    fn ranking_does_not_touch_the_usage() {
        let usage = usage_from_counts(&[(grey(1), 2), (Color::TRANSPARENT, 3)]);
        let before = usage.clone();
        let _ = rank(&usage);
        assert_eq!(usage, before);
    }

    #[test]
    fn entry_label_matches_palette_list() {
        let entry = PaletteEntry {
            color: Color::opaque(255, 0, 0),
            count: 12,
        };
        assert_eq!(entry.to_string(), "#FFFF0000, 12 time(s)");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn palette_serializes_as_entries() {
        let usage = usage_from_counts(&[(Color::opaque(1, 2, 3), 2)]);
        let json = serde_json::to_value(rank(&usage)).expect("serializable");
        assert_eq!(json["entries"][0]["count"], 2);
        assert_eq!(json["entries"][0]["color"]["blue"], 3);
    }
}
