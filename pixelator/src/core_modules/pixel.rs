// THEORY:
// The `Pixel` module holds the most fundamental value of the system: a single
// RGBA `Color`. It is a "dumb" data container. It knows how to be built from raw
// bytes, how to print itself the way the palette list shows it, and nothing else.
//
// Key architectural principles:
// 1.  **Exact Identity**: Two colors are equal only if all four channels are equal.
//     `Color` is `Hash + Eq` so it can key the frequency tables of the
//     interpolators and the color buckets of the aggregation step. There is no
//     tolerance and no implicit blending anywhere.
// 2.  **Byte Layout**: Raw buffers are RGBA, 4 bytes per pixel, the same layout the
//     `image` crate uses for `Rgba<u8>`. Conversions in both directions live here
//     so that no other module has to know the channel order.
// 3.  **Transparency Sentinel**: A color with alpha 0 is "fully transparent". The
//     histogram drops such colors; `is_transparent` is the single definition of
//     that rule.

pub mod pixel {
    use image::{Rgba, RgbaImage};
    use std::fmt;

    pub type Byte = u8;
    pub type Channel = Byte;

    pub const CHANNELS: usize = 4;

    /// A single 8-bit-per-channel RGBA color.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Color {
        /// The red channel value (0-255).
        pub red: Channel,
        /// The green channel value (0-255).
        pub green: Channel,
        /// The blue channel value (0-255).
        pub blue: Channel,
        /// The alpha (opacity) channel value (0-255). 0 is fully transparent.
        pub alpha: Channel,
    }

    impl Color {
        pub const TRANSPARENT: Color = Color::new(0, 0, 0, 0);
        pub const BLACK: Color = Color::opaque(0, 0, 0);
        pub const WHITE: Color = Color::opaque(255, 255, 255);

        pub const fn new(red: Channel, green: Channel, blue: Channel, alpha: Channel) -> Self {
            Color {
                red,
                green,
                blue,
                alpha,
            }
        }

        /// A color with full opacity.
        pub const fn opaque(red: Channel, green: Channel, blue: Channel) -> Self {
            Color::new(red, green, blue, Channel::MAX)
        }

        pub fn is_transparent(&self) -> bool {
            self.alpha == 0
        }

        /// `#AARRGGBB`, uppercase, alpha first.
        pub fn to_argb_hex(&self) -> String {
            format!(
                "#{:02X}{:02X}{:02X}{:02X}",
                self.alpha, self.red, self.green, self.blue
            )
        }

        /// A square image filled with this color, used as a palette swatch.
        pub fn swatch(&self, size: u32) -> RgbaImage {
            RgbaImage::from_pixel(size, size, Rgba::from(*self))
        }
    }

    impl fmt::Display for Color {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(&self.to_argb_hex())
        }
    }

    impl From<[Byte; CHANNELS]> for Color {
        fn from(bytes: [Byte; CHANNELS]) -> Self {
            Color::new(bytes[0], bytes[1], bytes[2], bytes[3])
        }
    }

    impl From<Rgba<u8>> for Color {
        fn from(rgba: Rgba<u8>) -> Self {
            Color::from(rgba.0)
        }
    }

    impl From<Color> for Rgba<u8> {
        fn from(color: Color) -> Self {
            Rgba([color.red, color.green, color.blue, color.alpha])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::pixel::*;
    use image::Rgba;

    #[test]
    fn hex_is_alpha_first_and_uppercase() {
        let color = Color::new(0xAB, 0x0C, 0xFF, 0x80);
        assert_eq!(color.to_argb_hex(), "#80AB0CFF");
        assert_eq!(Color::BLACK.to_string(), "#FF000000");
    }

    #[test]
    fn rgba_bytes_map_to_channels_in_order() {
        let color = Color::from([1, 2, 3, 4]);
        assert_eq!(color, Color::new(1, 2, 3, 4));
        assert_eq!(Rgba::from(color), Rgba([1, 2, 3, 4]));
        assert_eq!(Color::from(Rgba([1, 2, 3, 4])), color);
    }

    #[test]
    fn only_zero_alpha_counts_as_transparent() {
        assert!(Color::new(255, 0, 0, 0).is_transparent());
        assert!(!Color::new(0, 0, 0, 1).is_transparent());
    }

    #[test]
    fn swatch_is_solid() {
        let red = Color::opaque(255, 0, 0);
        let swatch = red.swatch(32);
        assert_eq!(swatch.dimensions(), (32, 32));
        assert!(swatch.pixels().all(|p| Color::from(*p) == red));
    }
}
