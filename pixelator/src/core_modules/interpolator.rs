// THEORY:
// An `Interpolator` reduces every pixel under an `Area` to one representative
// `Color`. It is the algorithmic heart of a pixelation pass.
//
// The set of strategies is closed and small, so it is a plain enum dispatched
// with a `match`, not a trait object:
//
// - `MiddlePixel`: the stored pixel at the middle of the area. O(1), no blending.
// - `DominantPixel`: the most frequent exact color in the area. Ties go to the
//   color that was seen first while scanning (x outer, y inner).
// - `WeightedAverage`: the per-channel mean of every sampled pixel using
//   truncating integer division. Alpha is not averaged; the result is always
//   opaque.
//
// All three are pure functions of (source, area): no shared state, so disjoint
// blocks can be interpolated concurrently.

use crate::core_modules::chunk::chunk::Area;
use crate::core_modules::pixel::pixel::Color;
use crate::core_modules::pixel_buffer::PixelSource;
use crate::error::Result;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// The strategy used to pick one color per block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Interpolator {
    #[default]
    MiddlePixel,
    DominantPixel,
    WeightedAverage,
}

impl Interpolator {
    pub const ALL: [Interpolator; 3] = [
        Interpolator::MiddlePixel,
        Interpolator::DominantPixel,
        Interpolator::WeightedAverage,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Interpolator::MiddlePixel => "middle-pixel",
            Interpolator::DominantPixel => "dominant-pixel",
            Interpolator::WeightedAverage => "weighted-average",
        }
    }

    /// Determines the representative color of `area` in `source`.
    ///
    /// Fails with [`PixelateError::InvalidArea`](crate::error::PixelateError::InvalidArea) if the area has a non-positive
    /// width or height, and with [`PixelateError::EmptySample`](crate::error::PixelateError::EmptySample) if it does not
    /// overlap the source at all.
    pub fn determine_color<S>(&self, source: &S, area: Area) -> Result<Color>
    where
        S: PixelSource + ?Sized,
    {
        area.validate()?;
        match self {
            Interpolator::MiddlePixel => middle_pixel(source, area),
            Interpolator::DominantPixel => dominant_pixel(source, area),
            Interpolator::WeightedAverage => weighted_average(source, area),
        }
    }
}

impl fmt::Display for Interpolator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when parsing an unknown interpolator name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownInterpolator(pub String);

impl fmt::Display for UnknownInterpolator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown interpolator '{}' (expected one of: middle-pixel, dominant-pixel, weighted-average)",
            self.0
        )
    }
}

impl std::error::Error for UnknownInterpolator {}

impl FromStr for Interpolator {
    type Err = UnknownInterpolator;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Interpolator::ALL
            .into_iter()
            .find(|interpolator| interpolator.name() == wanted)
            .ok_or_else(|| UnknownInterpolator(s.to_string()))
    }
}

/// The midpoint is clamped into the buffer; an area that misses the buffer
/// entirely still fails, like the other strategies.
fn middle_pixel<S: PixelSource + ?Sized>(source: &S, area: Area) -> Result<Color> {
    let (width, height) = (source.width(), source.height());
    if area.sample_ranges(width, height).is_none() {
        return Err(area.empty_sample());
    }

    let x = (area.left + area.width() / 2.0)
        .floor()
        .clamp(0.0, (width - 1) as f64);
    let y = (area.top + area.height() / 2.0)
        .floor()
        .clamp(0.0, (height - 1) as f64);

    Ok(source.pixel(x as u32, y as u32))
}

fn dominant_pixel<S: PixelSource + ?Sized>(source: &S, area: Area) -> Result<Color> {
    let table = FrequencyTable::scan(source, area)?;
    table.dominant().ok_or_else(|| area.empty_sample())
}

fn weighted_average<S: PixelSource + ?Sized>(source: &S, area: Area) -> Result<Color> {
    let table = FrequencyTable::scan(source, area)?;
    table.weighted_average().ok_or_else(|| area.empty_sample())
}

/// Exact-color occurrence counts, in first-seen order.
#[derive(Debug, Default)]
struct FrequencyTable {
    entries: Vec<(Color, u64)>,
    index: HashMap<Color, usize>,
}

impl FrequencyTable {
    /// Counts every pixel in the inclusive sample ranges of `area`, x outer, y inner.
    fn scan<S: PixelSource + ?Sized>(source: &S, area: Area) -> Result<Self> {
        let (columns, rows) = area
            .sample_ranges(source.width(), source.height())
            .ok_or_else(|| area.empty_sample())?;

        let mut table = Self::default();
        for x in columns {
            for y in rows.clone() {
                table.record(source.pixel(x, y));
            }
        }
        Ok(table)
    }

    fn record(&mut self, color: Color) {
        match self.index.get(&color) {
            Some(&slot) => self.entries[slot].1 += 1,
            None => {
                self.index.insert(color, self.entries.len());
                self.entries.push((color, 1));
            }
        }
    }

    /// The most frequent color; the earliest recorded one wins a tie.
    fn dominant(&self) -> Option<Color> {
        let mut best: Option<(Color, u64)> = None;
        for &(color, count) in &self.entries {
            if best.is_none_or(|(_, best_count)| count > best_count) {
                best = Some((color, count));
            }
        }
        best.map(|(color, _)| color)
    }

    /// Count-weighted RGB mean with truncating division, always opaque.
    fn weighted_average(&self) -> Option<Color> {
        let (mut total, mut red, mut green, mut blue) = (0u64, 0u64, 0u64, 0u64);
        for &(color, count) in &self.entries {
            total += count;
            red += count * color.red as u64;
            green += count * color.green as u64;
            blue += count * color.blue as u64;
        }

        if total == 0 {
            return None;
        }

        Some(Color::opaque(
            (red / total) as u8,
            (green / total) as u8,
            (blue / total) as u8,
        ))
    }
}
