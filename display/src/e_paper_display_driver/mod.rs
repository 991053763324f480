pub mod command_code;
pub mod epd5in65f;
pub mod gpio_pin;

use embedded_hal::{digital, spi};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EpdError {
    #[error(transparent)]
    Gpio(#[from] rppal::gpio::Error),
    #[error(transparent)]
    SpiSetup(#[from] rppal::spi::Error),
    #[error("spi write failed: {0:?}")]
    Spi(spi::ErrorKind),
    #[error("gpio access failed: {0:?}")]
    Pin(digital::ErrorKind),
    #[error("frame is {actual} bytes, panel expects {expected}")]
    FrameSize { expected: usize, actual: usize },
}

pub(crate) fn spi_error<E: spi::Error>(error: E) -> EpdError {
    EpdError::Spi(error.kind())
}

pub(crate) fn pin_error<E: digital::Error>(error: E) -> EpdError {
    EpdError::Pin(error.kind())
}
