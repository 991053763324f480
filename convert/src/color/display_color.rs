use image::Rgb;
use palette::{FromColor, LinSrgb, Oklab, Srgb};

/// The seven pigments of the panel. The discriminant is the 4-bit code the
/// controller expects in the frame buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DisplayColor {
    Black = 0x00,
    White = 0x01,
    Green = 0x02,
    Blue = 0x03,
    Red = 0x04,
    Yellow = 0x05,
    Orange = 0x06,
}

impl DisplayColor {
    /// Palette order, indexed by code.
    pub const ALL: [DisplayColor; 7] = [
        DisplayColor::Black,
        DisplayColor::White,
        DisplayColor::Green,
        DisplayColor::Blue,
        DisplayColor::Red,
        DisplayColor::Yellow,
        DisplayColor::Orange,
    ];

    pub const fn rgb(self) -> [u8; 3] {
        match self {
            DisplayColor::Black => [0, 0, 0],
            DisplayColor::White => [255, 255, 255],
            DisplayColor::Green => [0, 255, 0],
            DisplayColor::Blue => [0, 0, 255],
            DisplayColor::Red => [255, 0, 0],
            DisplayColor::Yellow => [255, 255, 0],
            DisplayColor::Orange => [255, 165, 0],
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

pub(crate) fn rgb_to_oklab(color: Rgb<u8>) -> Oklab {
    let [red, green, blue] = color.0;
    let linear: LinSrgb<f32> = Srgb::new(red, green, blue).into_format::<f32>().into_linear();
    Oklab::from_color(linear)
}

impl From<DisplayColor> for Rgb<u8> {
    fn from(value: DisplayColor) -> Self {
        Rgb(value.rgb())
    }
}

impl From<DisplayColor> for Oklab {
    fn from(value: DisplayColor) -> Self {
        rgb_to_oklab(value.into())
    }
}

/// Exact match only. Anything off-palette reads as white, the panel's
/// background.
impl From<&Rgb<u8>> for DisplayColor {
    fn from(value: &Rgb<u8>) -> Self {
        DisplayColor::ALL
            .into_iter()
            .find(|c| c.rgb() == value.0)
            .unwrap_or(DisplayColor::White)
    }
}
