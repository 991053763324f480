use crate::display_constants::{PIXEL_HEIGHT, PIXEL_WIDTH};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandCode {
    Psr = 0x00,
    Pwr = 0x01,
    Pof = 0x02,
    Pofs = 0x03,
    PowerOn = 0x04,
    Btst = 0x06,
    DeepSleep = 0x07,
    Dtm1 = 0x10,
    Drf = 0x12,
    Pll = 0x30,
    Tse = 0x41,
    Cdi = 0x50,
    Tcon = 0x60,
    Tres = 0x61,
    Pws = 0xE3,
}

const PSR_DATA: [u8; 2] = [0xEF, 0x08];
const PWR_DATA: [u8; 4] = [0x37, 0x00, 0x23, 0x23];
const POFS_DATA: [u8; 1] = [0x00];
const BTST_DATA: [u8; 3] = [0xC7, 0xC7, 0x1D];
const PLL_DATA: [u8; 1] = [0x3C];
const TSE_DATA: [u8; 1] = [0x00];
const CDI_DATA: [u8; 1] = [0x37];
const TCON_DATA: [u8; 1] = [0x22];
const TRES_DATA: [u8; 4] = [
    (PIXEL_WIDTH >> 8) as u8,
    PIXEL_WIDTH as u8,
    (PIXEL_HEIGHT >> 8) as u8,
    PIXEL_HEIGHT as u8,
];
const PWS_DATA: [u8; 1] = [0xAA];
const DEEP_SLEEP_DATA: [u8; 1] = [0xA5];

impl CommandCode {
    pub fn cmd(self) -> u8 {
        self as u8
    }

    /// Fixed parameter bytes sent after the command, if any.
    pub fn data<'a>(&self) -> Option<&'a [u8]> {
        match self {
            CommandCode::Psr => Some(&PSR_DATA),
            CommandCode::Pwr => Some(&PWR_DATA),
            CommandCode::Pof => None,
            CommandCode::Pofs => Some(&POFS_DATA),
            CommandCode::PowerOn => None,
            CommandCode::Btst => Some(&BTST_DATA),
            CommandCode::DeepSleep => Some(&DEEP_SLEEP_DATA),
            CommandCode::Dtm1 => None, // the data is the frame itself
            CommandCode::Drf => None,
            CommandCode::Pll => Some(&PLL_DATA),
            CommandCode::Tse => Some(&TSE_DATA),
            CommandCode::Cdi => Some(&CDI_DATA),
            CommandCode::Tcon => Some(&TCON_DATA),
            CommandCode::Tres => Some(&TRES_DATA),
            CommandCode::Pws => Some(&PWS_DATA),
        }
    }
}
