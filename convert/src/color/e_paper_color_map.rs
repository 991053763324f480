use crate::color::display_color::{rgb_to_oklab, DisplayColor};
use image::imageops::ColorMap;
use image::Rgb;
use palette::color_difference::HyAb;
use palette::Oklab;

/// Nearest-colour lookup against the panel palette, measured with the
/// HyAb distance in Oklab. Ties resolve to the lower palette code.
pub struct EPaperColorMap {
    colormap: [(DisplayColor, Oklab); 7],
}

impl EPaperColorMap {
    pub fn new() -> Self {
        Self {
            colormap: DisplayColor::ALL.map(|c| (c, c.into())),
        }
    }

    pub fn nearest(&self, color: &Rgb<u8>) -> DisplayColor {
        let target = rgb_to_oklab(*color);
        self.colormap
            .iter()
            .map(|(c, lab)| (*c, lab.hybrid_distance(target)))
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(c, _)| c)
            .unwrap_or(DisplayColor::White)
    }
}

impl ColorMap for EPaperColorMap {
    type Color = Rgb<u8>; // dither requires this to be u8

    fn index_of(&self, color: &Self::Color) -> usize {
        self.nearest(color).code() as usize
    }

    fn lookup(&self, index: usize) -> Option<Self::Color> {
        DisplayColor::ALL.get(index).map(|c| (*c).into())
    }

    fn has_lookup(&self) -> bool {
        true
    }

    fn map_color(&self, color: &mut Self::Color) {
        *color = self.nearest(color).into();
    }
}
