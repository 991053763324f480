pub use epaper_convert::display_constants::{BYTES_TOTAL, PIXEL_HEIGHT, PIXEL_WIDTH};

/// spidev0.0 clock, same as the vendor driver.
pub const EPD_SPI_CLOCK_HZ: u32 = 4_000_000;
/// Largest single spidev write (the kernel's default `bufsiz`).
pub const EPD_SPI_CHUNK: usize = 4_096;
/// Data byte that paints two white pixels.
pub const EPD_WHITE_PAIR: u8 = 0x11;
