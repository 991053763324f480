pub mod color;
pub mod display_constants;

use crate::color::color_histogram_eq::equalize_color_histogram;
use crate::color::{e_paper_color_map::EPaperColorMap, pack_4bit};
use clap::ValueEnum;
use image::imageops::{dither, ColorMap, FilterType};
use image::{DynamicImage, ImageDecoder, ImageError, ImageReader, RgbImage};
use std::fs;
use std::io::{self, Cursor};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Image(#[from] ImageError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("histogram equalisation failed on a {0}x{1} image")]
    Equalize(u32, u32),
}

/// How the source is brought to panel size.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, ValueEnum)]
pub enum Fit {
    /// Resize to exactly the panel size, ignoring aspect ratio.
    #[default]
    Stretch,
    /// Scale to cover the panel and crop the overflow.
    Fill,
}

/// How each pixel picks its palette colour.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, ValueEnum)]
pub enum Dither {
    /// Every pixel becomes its own nearest colour.
    #[default]
    None,
    /// Error diffusion; quantisation error spreads to neighbouring pixels.
    FloydSteinberg,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Options {
    pub fit: Fit,
    pub dither: Dither,
    pub equalize: bool,
}

/// Decodes an encoded image, guessing the format from its magic bytes and
/// applying any EXIF orientation.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, ConvertError> {
    let mut decoder = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_decoder()?;
    let orientation = decoder.orientation()?;
    let mut img = DynamicImage::from_decoder(decoder)?;
    img.apply_orientation(orientation);
    debug!("Decoded {}x{} image", img.width(), img.height());
    Ok(img)
}

pub fn fit(img: &DynamicImage, width: u32, height: u32, fit: Fit) -> DynamicImage {
    match fit {
        Fit::Stretch => img.resize_exact(width, height, FilterType::Lanczos3),
        Fit::Fill => img.resize_to_fill(width, height, FilterType::Lanczos3),
    }
}

/// Produces a `width` x `height` image whose every pixel is one of the
/// panel's seven colours.
pub fn quantise(
    img: &DynamicImage,
    width: u32,
    height: u32,
    options: &Options,
) -> Result<RgbImage, ConvertError> {
    let mut img = fit(img, width, height, options.fit).into_rgb8();
    info!("Resized to {}x{}", width, height);

    if options.equalize {
        img = equalize_color_histogram(&img).ok_or(ConvertError::Equalize(width, height))?;
        info!("Equalized");
    }

    let epd_map = EPaperColorMap::new();
    match options.dither {
        Dither::FloydSteinberg => {
            dither(&mut img, &epd_map);
            info!("Dithered");
        }
        Dither::None => {
            img.pixels_mut().for_each(|p| epd_map.map_color(p));
            info!("Mapped to nearest palette colour");
        }
    }
    Ok(img)
}

/// Quantises `img` and packs it into the panel's 4-bit frame layout.
pub fn to_frame(
    img: &DynamicImage,
    width: u32,
    height: u32,
    options: &Options,
) -> Result<(RgbImage, Vec<u8>), ConvertError> {
    let quantised = quantise(img, width, height, options)?;
    let frame = pack_4bit(&quantised);
    info!("Image packed to 4bit format ({} bytes)", frame.len());
    Ok((quantised, frame))
}

/// Converts an image file into a packed frame file. The quantised image is
/// also saved to `preview` when given.
pub fn convert(
    file: &Path,
    out_file: &Path,
    preview: Option<&Path>,
    width: u32,
    height: u32,
    options: &Options,
) -> Result<(), ConvertError> {
    let img = decode(&fs::read(file)?)?;
    info!("Opened image {}", file.display());

    let (quantised, frame) = to_frame(&img, width, height, options)?;
    if let Some(preview_path) = preview {
        quantised.save(preview_path)?;
        info!("Saved preview {}", preview_path.display());
    }

    fs::write(out_file, frame)?;
    info!("Frame written to {}. Done", out_file.display());
    Ok(())
}
