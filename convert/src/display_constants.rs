/// Panel resolution of the Waveshare 5.65" 7-colour (epd5in65f), landscape.
pub const PIXEL_WIDTH: u32 = 600;
pub const PIXEL_HEIGHT: u32 = 448;

/// bytes are packed so one byte is two four-bit colors. so 300 bytes for 600 px
pub const BYTE_WIDTH: usize = PIXEL_WIDTH as usize / 2;
pub const BYTES_TOTAL: usize = BYTE_WIDTH * PIXEL_HEIGHT as usize;
