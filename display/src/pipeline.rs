use crate::display_constants::{PIXEL_HEIGHT, PIXEL_WIDTH};
use crate::e_paper_display_driver::EpdError;
use crate::source::{Fetcher, ImageSource, InputError};
use epaper_convert::{decode, to_frame, ConvertError, Options};
use std::path::PathBuf;
use std::thread::sleep;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// What the push pipeline needs from a panel.
pub trait Panel {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Power on and load the waveform registers.
    fn init(&mut self) -> Result<(), EpdError>;
    /// Paint the whole canvas white.
    fn clear(&mut self) -> Result<(), EpdError>;
    /// Transfer a packed frame and refresh.
    fn display(&mut self, buffer: &[u8]) -> Result<(), EpdError>;
    /// Deep sleep.
    fn sleep(&mut self) -> Result<(), EpdError>;
}

#[derive(Debug, Error)]
pub enum PushError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Convert(#[from] ConvertError),
    #[error(transparent)]
    Device(#[from] EpdError),
}

#[derive(Debug, Clone)]
pub struct PushOptions {
    pub convert: Options,
    /// How long the pigment is left to settle before deep sleep.
    pub settle: Duration,
    pub preview: Option<PathBuf>,
}

/// Stands in for the panel with `--dry-run`: same geometry, no hardware.
#[derive(Debug, Default)]
pub struct DryRunPanel;

impl Panel for DryRunPanel {
    fn width(&self) -> u32 {
        PIXEL_WIDTH
    }

    fn height(&self) -> u32 {
        PIXEL_HEIGHT
    }

    fn init(&mut self) -> Result<(), EpdError> {
        info!("dry run: init skipped");
        Ok(())
    }

    fn clear(&mut self) -> Result<(), EpdError> {
        info!("dry run: clear skipped");
        Ok(())
    }

    fn display(&mut self, buffer: &[u8]) -> Result<(), EpdError> {
        info!("dry run: {} byte frame not sent", buffer.len());
        Ok(())
    }

    fn sleep(&mut self) -> Result<(), EpdError> {
        info!("dry run: sleep skipped");
        Ok(())
    }
}

/// init, clear, display, settle, sleep. Stops at the first error; the panel
/// is not put to sleep in that case.
pub fn show<P: Panel>(panel: &mut P, buffer: &[u8], settle: Duration) -> Result<(), EpdError> {
    info!("Device init.");
    panel.init()?;
    info!("Clearing display");
    panel.clear()?;
    info!("Cleared. Sending image...");
    panel.display(buffer)?;
    info!("Image sent. Waiting {:?} to settle", settle);
    sleep(settle);
    panel.sleep()?;
    info!("Display asleep");
    Ok(())
}

/// Loads and decodes the source first so bad input never touches the panel,
/// then opens the panel and runs [`show`].
pub fn push<P, F>(
    source: &ImageSource,
    fetcher: &Fetcher,
    options: &PushOptions,
    open_panel: F,
) -> Result<(), PushError>
where
    P: Panel,
    F: FnOnce() -> Result<P, EpdError>,
{
    info!("Loading {}", source);
    let bytes = source.load(fetcher)?;
    let img = decode(&bytes)?;
    info!("Decoded {}x{}. Opening panel", img.width(), img.height());

    let mut panel = open_panel()?;
    let (quantised, frame) = to_frame(&img, panel.width(), panel.height(), &options.convert)?;
    if let Some(preview) = &options.preview {
        quantised.save(preview).map_err(ConvertError::from)?;
        info!("Saved preview {}", preview.display());
    }

    show(&mut panel, &frame, options.settle)?;
    info!("Complete");
    Ok(())
}
