mod display_constants;
mod e_paper_display_driver;
mod pipeline;
mod source;

use clap::Parser;
use display_constants::EPD_SPI_CLOCK_HZ;
use e_paper_display_driver::epd5in65f::PiEpd5in65f;
use epaper_convert::{Dither, Fit, Options};
use pipeline::{push, DryRunPanel, PushOptions};
use source::{Fetcher, ImageSource, DEFAULT_FETCH_TIMEOUT, DEFAULT_IMAGE_URL};
use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;
use tracing::level_filters::LevelFilter;

/// Push an image onto a Waveshare 5.65" 7-colour e-paper panel.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Image file or http(s) URL. Defaults to --default-url.
    source: Option<String>,
    #[arg(long, env = "EPAPER_DEFAULT_URL", default_value = DEFAULT_IMAGE_URL)]
    default_url: String,
    /// Network fetch timeout, seconds.
    #[arg(
        long,
        env = "EPAPER_FETCH_TIMEOUT",
        default_value_t = DEFAULT_FETCH_TIMEOUT.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    timeout: u64,
    /// Ignore HTTP(S)_PROXY, e.g. for an image server on the LAN.
    #[arg(long)]
    no_proxy: bool,
    /// Settle time before deep sleep, seconds.
    #[arg(long, env = "EPAPER_SETTLE_SECS", default_value_t = 2)]
    settle: u64,
    #[arg(long, value_enum, default_value_t = Fit::Stretch)]
    fit: Fit,
    #[arg(long, value_enum, default_value_t = Dither::None)]
    dither: Dither,
    #[arg(long)]
    equalize: bool,
    /// Save the quantised image here.
    #[arg(long)]
    preview: Option<PathBuf>,
    /// Convert only, never touch the panel.
    #[arg(long)]
    dry_run: bool,
    #[arg(long, env = "EPAPER_SPI_HZ", default_value_t = EPD_SPI_CLOCK_HZ)]
    spi_hz: u32,
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn source(&self) -> ImageSource {
        ImageSource::parse(self.source.as_deref(), &self.default_url)
    }

    fn push_options(&self) -> PushOptions {
        PushOptions {
            convert: Options {
                fit: self.fit,
                dither: self.dither,
                equalize: self.equalize,
            },
            settle: Duration::from_secs(self.settle),
            preview: self.preview.clone(),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let level = if args.verbose { LevelFilter::DEBUG } else { LevelFilter::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    let source = args.source();
    let timeout = Duration::from_secs(args.timeout);
    let fetcher = if args.no_proxy {
        Fetcher::without_proxy(timeout)?
    } else {
        Fetcher::new(timeout)?
    };
    let options = args.push_options();
    if args.dry_run {
        push(&source, &fetcher, &options, || Ok(DryRunPanel))?;
    } else {
        push(&source, &fetcher, &options, || PiEpd5in65f::open(args.spi_hz))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_source_falls_back_to_default_url() {
        let args = Args::try_parse_from([
            "epaper-push",
            "--default-url",
            "https://frame.local/today.png",
        ])
        .expect("parse");
        assert_eq!(
            args.source(),
            ImageSource::Url("https://frame.local/today.png".to_string())
        );
    }

    #[test]
    fn path_argument_is_a_file_source() {
        let args = Args::try_parse_from(["epaper-push", "picture.png"]).expect("parse");
        assert_eq!(args.source(), ImageSource::File(PathBuf::from("picture.png")));
    }

    #[test]
    fn more_than_one_source_is_a_usage_error() {
        assert!(Args::try_parse_from(["epaper-push", "a.png", "b.png"]).is_err());
    }

    #[test]
    fn zero_fetch_timeout_is_rejected() {
        assert!(Args::try_parse_from(["epaper-push", "--timeout", "0"]).is_err());
        let args = Args::try_parse_from(["epaper-push", "--timeout", "1"]).expect("parse");
        assert_eq!(args.timeout, 1);
    }

    #[test]
    fn options_carry_through() {
        let args = Args::try_parse_from([
            "epaper-push",
            "a.png",
            "--settle",
            "0",
            "--fit",
            "fill",
            "--dither",
            "floyd-steinberg",
        ])
        .expect("parse");
        let options = args.push_options();
        assert_eq!(options.settle, Duration::ZERO);
        assert_eq!(options.convert.fit, Fit::Fill);
        assert_eq!(options.convert.dither, Dither::FloydSteinberg);
        assert!(!options.convert.equalize);
    }
}
