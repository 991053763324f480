/// BCM pin numbers of the Waveshare e-paper HAT.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u8)]
pub enum GpioPin {
    /// Data/command control signal: low for a command byte, high for
    /// data/parameter bytes
    DataCommandPin = 25,
    /// Reset, active low
    ResetPin = 17,
    /// This pin indicates the driver status. Low while the controller is busy.
    BusyPin = 24,
    // chip select is CE0 (BCM 8), driven by the SPI peripheral
}

impl From<GpioPin> for u8 {
    fn from(value: GpioPin) -> Self {
        value as u8
    }
}
