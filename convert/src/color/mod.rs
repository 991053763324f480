pub mod color_histogram_eq;
pub mod display_color;
pub mod e_paper_color_map;

use crate::color::display_color::DisplayColor;
use image::RgbImage;

/// Palette code per pixel, row-major.
pub fn to_display_colors(rgb: &RgbImage) -> Vec<DisplayColor> {
    rgb.pixels().map(DisplayColor::from).collect()
}

/// Packs two pixels per byte, first pixel in the upper nibble. An odd trailing
/// pixel is padded with white.
pub fn pack_4bit(rgb: &RgbImage) -> Vec<u8> {
    to_display_colors(rgb)
        .chunks(2)
        .map(|pixels| {
            let high = pixels[0].code();
            let low = pixels.get(1).copied().unwrap_or(DisplayColor::White).code();
            high << 4 | low
        })
        .collect()
}
