use color_eyre::eyre::{WrapErr, eyre};
use image::{RgbImage, imageops};
use std::path::{Path, PathBuf};

/// Appends the images in `frames` left to right, top aligned, and writes the result to `output`.
///
/// The output format follows the extension of `output`. Frames narrower or shorter than the
/// largest one leave black padding.
pub fn append_horizontally(frames: &[PathBuf], output: &Path) -> color_eyre::Result<()> {
    if frames.is_empty() {
        return Err(eyre!("no frames were extracted for the sprite"));
    }

    let images = frames
        .iter()
        .map(|f| {
            image::open(f)
                .map(|img| img.to_rgb8())
                .wrap_err_with(|| format!("failed to open frame {}", f.display()))
        })
        .collect::<color_eyre::Result<Vec<_>>>()?;

    let width: u32 = images.iter().map(|img| img.width()).sum();
    let height = images.iter().map(|img| img.height()).max().unwrap_or(0);
    if width == 0 || height == 0 {
        return Err(eyre!("sprite frames are empty"));
    }

    let mut sheet = RgbImage::new(width, height);
    let mut x = 0i64;
    for img in &images {
        imageops::replace(&mut sheet, img, x, 0);
        x += i64::from(img.width());
    }

    sheet
        .save(output)
        .wrap_err_with(|| format!("failed to write sprite {}", output.display()))?;
    Ok(())
}
