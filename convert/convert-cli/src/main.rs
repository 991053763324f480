use clap::Parser;
use epaper_convert::display_constants::{PIXEL_HEIGHT, PIXEL_WIDTH};
use epaper_convert::{convert, Dither, Fit, Options};
use std::error::Error;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

/// Convert an image into a packed 7-colour e-paper frame.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    file_input: PathBuf,
    file_output: PathBuf,
    /// Also save the quantised image here.
    preview_output: Option<PathBuf>,
    #[arg(long, default_value_t = PIXEL_WIDTH)]
    width: u32,
    #[arg(long, default_value_t = PIXEL_HEIGHT)]
    height: u32,
    #[arg(long, value_enum, default_value_t = Fit::Stretch)]
    fit: Fit,
    #[arg(long, value_enum, default_value_t = Dither::None)]
    dither: Dither,
    #[arg(long)]
    equalize: bool,
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let level = if args.verbose { LevelFilter::DEBUG } else { LevelFilter::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    let options = Options {
        fit: args.fit,
        dither: args.dither,
        equalize: args.equalize,
    };
    convert(
        &args.file_input,
        &args.file_output,
        args.preview_output.as_deref(),
        args.width,
        args.height,
        &options,
    )?;
    Ok(())
}
