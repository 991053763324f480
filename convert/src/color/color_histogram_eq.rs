use image::{GrayImage, Rgb, RgbImage};
use imageproc::contrast::equalize_histogram_mut;

/// Equalises each of the R, G and B channels independently. Returns `None`
/// only if a channel plane cannot be rebuilt at the source dimensions.
pub fn equalize_color_histogram(image: &RgbImage) -> Option<RgbImage> {
    let (width, height) = image.dimensions();
    let mut planes = Vec::with_capacity(3);
    for channel in 0..3 {
        let samples = image.pixels().map(|p| p[channel]).collect();
        let mut plane = GrayImage::from_vec(width, height, samples)?;
        equalize_histogram_mut(&mut plane);
        planes.push(plane);
    }

    Some(RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            planes[0].get_pixel(x, y)[0],
            planes[1].get_pixel(x, y)[0],
            planes[2].get_pixel(x, y)[0],
        ])
    }))
}
