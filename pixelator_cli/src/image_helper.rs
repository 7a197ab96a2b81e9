// THEORY:
// The image helper is the CLI's boundary with the file system. The pixelation
// library never decodes or encodes anything; this module loads a file into an
// `RgbaImage` before a pass and writes the rendered result back out as PNG.

use anyhow::{Context, Result};
use image::{ImageEncoder, ImageReader, RgbaImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Decodes any format the `image` crate understands into RGBA8.
pub fn load(path: &Path) -> Result<RgbaImage> {
    let image = ImageReader::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("failed to detect the format of {}", path.display()))?
        .decode()
        .with_context(|| format!("failed to decode {}", path.display()))?;
    Ok(image.to_rgba8())
}

/// Writes `image` as an RGBA PNG.
pub fn save(path: &Path, image: &RgbaImage) -> Result<()> {
    let output = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let encoder = image::codecs::png::PngEncoder::new(BufWriter::new(output));

    encoder
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgba8,
        )
        .with_context(|| format!("failed to encode {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::path::PathBuf;

    fn scratch_file(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("pixelator-{}-{}", std::process::id(), name))
    }

    #[test]
    fn save_then_load_keeps_pixels() {
        let path = scratch_file("gradient.png");
        let image = RgbaImage::from_fn(40, 30, |x, y| Rgba([x as u8, y as u8, 128, (x + y) as u8]));

        save(&path, &image).expect("Error Saving File.");
        let loaded = load(&path).expect("Error Loading File.");
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, image);
    }

    #[test]
    fn non_square_dimensions_are_not_swapped() {
        let path = scratch_file("wide.png");
        let image = RgbaImage::from_pixel(7, 3, Rgba([255, 255, 255, 255]));

        save(&path, &image).expect("Error Saving File.");
        let loaded = load(&path).expect("Error Loading File.");
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.dimensions(), (7, 3));
    }

    #[test]
    fn missing_file_reports_the_path() {
        let path = scratch_file("does-not-exist.png");
        let err = load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("does-not-exist.png"));
    }
}
