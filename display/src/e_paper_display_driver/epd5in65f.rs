use crate::display_constants::{
    BYTES_TOTAL, EPD_SPI_CHUNK, EPD_SPI_CLOCK_HZ, EPD_WHITE_PAIR, PIXEL_HEIGHT, PIXEL_WIDTH,
};
use crate::e_paper_display_driver::{command_code::CommandCode, gpio_pin::GpioPin};
use crate::e_paper_display_driver::{pin_error, spi_error, EpdError};
use crate::pipeline::Panel;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;
use rppal::gpio::{Gpio, InputPin as PiInputPin, OutputPin as PiOutputPin};
use rppal::hal::Delay;
use rppal::spi::{Bus, Mode, SimpleHalSpiDevice, SlaveSelect, Spi};
use std::iter::repeat;
use tracing::{debug, info};

/// Waveshare 5.65" ACeP 7-colour panel (600x448).
#[derive(Debug)]
pub struct Epd5in65f<SPI, BUSY, DC, RST, DELAY>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    DELAY: DelayNs,
{
    spi: SPI,
    busy_pin: BUSY,
    data_or_cmd_pin: DC,
    reset_pin: RST,
    delay: DELAY,
}

/// The panel on a Raspberry Pi HAT: spidev0.0 with hardware chip select.
pub type PiEpd5in65f = Epd5in65f<SimpleHalSpiDevice, PiInputPin, PiOutputPin, PiOutputPin, Delay>;

impl PiEpd5in65f {
    pub fn open(spi_clock_hz: u32) -> Result<Self, EpdError> {
        let gpio = Gpio::new()?;
        let data_or_cmd_pin = gpio.get(GpioPin::DataCommandPin.into())?.into_output_low();
        let reset_pin = gpio.get(GpioPin::ResetPin.into())?.into_output_low();
        let busy_pin = gpio.get(GpioPin::BusyPin.into())?.into_input();

        let clock = if spi_clock_hz == 0 { EPD_SPI_CLOCK_HZ } else { spi_clock_hz };
        let spi = Spi::new(Bus::Spi0, SlaveSelect::Ss0, clock, Mode::Mode0)?;
        debug!("spidev0.0 open at {} Hz", clock);

        Ok(Epd5in65f::new(
            SimpleHalSpiDevice::new(spi),
            busy_pin,
            data_or_cmd_pin,
            reset_pin,
            Delay::new(),
        ))
    }
}

impl<SPI, BUSY, DC, RST, DELAY> Epd5in65f<SPI, BUSY, DC, RST, DELAY>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    DELAY: DelayNs,
{
    pub fn new(
        spi: SPI,
        busy_pin: BUSY,
        data_or_cmd_pin: DC,
        reset_pin: RST,
        delay: DELAY,
    ) -> Self {
        Self {
            spi,
            busy_pin,
            data_or_cmd_pin,
            reset_pin,
            delay,
        }
    }

    fn spi_write(&mut self, bytes: &[u8]) -> Result<(), EpdError> {
        if bytes.len() > 32 {
            debug!("Spi write {} bytes", bytes.len());
        } else {
            debug!("Spi write {:02X?}", bytes);
        }
        for chunk in bytes.chunks(EPD_SPI_CHUNK) {
            self.spi.write(chunk).map_err(spi_error)?;
        }
        Ok(())
    }

    fn send_command(&mut self, command_code: CommandCode) -> Result<(), EpdError> {
        self.data_or_cmd_pin.set_low().map_err(pin_error)?;
        self.spi_write(&[command_code.cmd()])?;
        if let Some(data) = command_code.data() {
            self.send_data(data)?;
        }
        Ok(())
    }

    fn send_data(&mut self, data: &[u8]) -> Result<(), EpdError> {
        self.data_or_cmd_pin.set_high().map_err(pin_error)?;
        self.spi_write(data)
    }

    fn reset(&mut self) -> Result<(), EpdError> {
        for (high, ms) in [(true, 600), (false, 2), (true, 200)] {
            debug!("Reset: {}", if high { "high" } else { "low" });
            if high {
                self.reset_pin.set_high().map_err(pin_error)?;
            } else {
                self.reset_pin.set_low().map_err(pin_error)?;
            }
            self.delay.delay_ms(ms);
        }
        Ok(())
    }

    /// BUSY is low while the controller works.
    fn wait_until_idle(&mut self) -> Result<(), EpdError> {
        debug!("e-Paper busy H");
        while self.busy_pin.is_low().map_err(pin_error)? {
            self.delay.delay_ms(10);
        }
        debug!("e-Paper busy H release");
        Ok(())
    }

    /// After power-off the controller holds BUSY high until the charge pump
    /// has discharged.
    fn wait_until_powered_down(&mut self) -> Result<(), EpdError> {
        debug!("e-Paper busy L");
        while self.busy_pin.is_high().map_err(pin_error)? {
            self.delay.delay_ms(10);
        }
        debug!("e-Paper busy L release");
        Ok(())
    }

    pub fn init(&mut self) -> Result<(), EpdError> {
        info!("EPD init...");
        self.reset()?;
        self.wait_until_idle()?;

        let boot_sequence = [
            CommandCode::Psr,
            CommandCode::Pwr,
            CommandCode::Pofs,
            CommandCode::Btst,
            CommandCode::Pll,
            CommandCode::Tse,
            CommandCode::Cdi,
            CommandCode::Tcon,
            CommandCode::Tres,
            CommandCode::Pws,
        ];
        for command in boot_sequence {
            self.send_command(command)?;
        }
        self.delay.delay_ms(100);
        self.send_command(CommandCode::Cdi)?;
        Ok(())
    }

    /// Streams one full frame into display RAM and runs the refresh.
    fn write_frame<I>(&mut self, frame: I) -> Result<(), EpdError>
    where
        I: IntoIterator<Item = u8>,
    {
        self.send_command(CommandCode::Tres)?;
        self.send_command(CommandCode::Dtm1)?;
        let mut frame = frame.into_iter();
        let mut chunk = Vec::with_capacity(EPD_SPI_CHUNK);
        loop {
            chunk.clear();
            chunk.extend(frame.by_ref().take(EPD_SPI_CHUNK));
            if chunk.is_empty() {
                break;
            }
            self.send_data(&chunk)?;
        }
        self.turn_display_on()
    }

    fn turn_display_on(&mut self) -> Result<(), EpdError> {
        info!("Write PON");
        self.send_command(CommandCode::PowerOn)?;
        self.wait_until_idle()?;

        info!("Write DRF");
        self.send_command(CommandCode::Drf)?;
        self.wait_until_idle()?;

        info!("Write POF");
        self.send_command(CommandCode::Pof)?;
        self.wait_until_powered_down()?;
        self.delay.delay_ms(500);

        info!("Display Done");
        Ok(())
    }

    pub fn clear(&mut self) -> Result<(), EpdError> {
        self.write_frame(repeat(EPD_WHITE_PAIR).take(BYTES_TOTAL))
    }

    pub fn display(&mut self, image: &[u8]) -> Result<(), EpdError> {
        if image.len() != BYTES_TOTAL {
            return Err(EpdError::FrameSize {
                expected: BYTES_TOTAL,
                actual: image.len(),
            });
        }
        self.write_frame(image.iter().copied())
    }

    pub fn sleep(&mut self) -> Result<(), EpdError> {
        self.delay.delay_ms(500);
        self.send_command(CommandCode::DeepSleep)?;
        self.delay.delay_ms(2_000);
        Ok(())
    }
}

impl<SPI, BUSY, DC, RST, DELAY> Panel for Epd5in65f<SPI, BUSY, DC, RST, DELAY>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    DELAY: DelayNs,
{
    fn width(&self) -> u32 {
        PIXEL_WIDTH
    }

    fn height(&self) -> u32 {
        PIXEL_HEIGHT
    }

    fn init(&mut self) -> Result<(), EpdError> {
        Epd5in65f::init(self)
    }

    fn clear(&mut self) -> Result<(), EpdError> {
        Epd5in65f::clear(self)
    }

    fn display(&mut self, buffer: &[u8]) -> Result<(), EpdError> {
        Epd5in65f::display(self, buffer)
    }

    fn sleep(&mut self) -> Result<(), EpdError> {
        Epd5in65f::sleep(self)
    }
}

impl<SPI, BUSY, DC, RST, DELAY> Drop for Epd5in65f<SPI, BUSY, DC, RST, DELAY>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    DELAY: DelayNs,
{
    fn drop(&mut self) {
        // we're going to ignore errors here...
        let _ = self.data_or_cmd_pin.set_low();
        let _ = self.reset_pin.set_low();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::digital::ErrorType as PinErrorType;
    use embedded_hal::spi::{ErrorType as SpiErrorType, Operation};
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction as PinTransaction};
    use std::cell::{Cell, RefCell};
    use std::convert::Infallible;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Command(u8),
        Data(Vec<u8>),
    }

    /// Records SPI bytes split by the DC level they were clocked under.
    #[derive(Clone, Default)]
    struct Wire {
        events: Rc<RefCell<Vec<Event>>>,
        dc_high: Rc<Cell<bool>>,
    }

    impl Wire {
        fn events(&self) -> Vec<Event> {
            self.events.borrow().clone()
        }

        fn commands(&self) -> Vec<u8> {
            self.events()
                .into_iter()
                .filter_map(|e| match e {
                    Event::Command(c) => Some(c),
                    _ => None,
                })
                .collect()
        }

        fn data_after(&self, command: u8) -> Vec<Vec<u8>> {
            self.events()
                .windows(2)
                .filter_map(|pair| match pair {
                    [Event::Command(c), Event::Data(d)] if *c == command => Some(d.clone()),
                    _ => None,
                })
                .collect()
        }
    }

    struct WireSpi(Wire);

    impl SpiErrorType for WireSpi {
        type Error = Infallible;
    }

    impl SpiDevice for WireSpi {
        fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Infallible> {
            for operation in operations.iter() {
                if let Operation::Write(bytes) = operation {
                    let mut events = self.0.events.borrow_mut();
                    if self.0.dc_high.get() {
                        match events.last_mut() {
                            Some(Event::Data(data)) => data.extend_from_slice(bytes),
                            _ => events.push(Event::Data(bytes.to_vec())),
                        }
                    } else {
                        events.extend(bytes.iter().map(|b| Event::Command(*b)));
                    }
                }
            }
            Ok(())
        }
    }

    struct WireDc(Wire);

    impl PinErrorType for WireDc {
        type Error = Infallible;
    }

    impl OutputPin for WireDc {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.0.dc_high.set(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.0.dc_high.set(true);
            Ok(())
        }
    }

    type TestEpd = Epd5in65f<WireSpi, PinMock, WireDc, PinMock, NoopDelay>;

    struct Harness {
        epd: TestEpd,
        wire: Wire,
        busy: PinMock,
        reset: PinMock,
    }

    impl Harness {
        /// `reset` lists the expected RST writes; the low written on drop is
        /// appended here.
        fn new(busy: &[PinTransaction], reset: &[PinTransaction]) -> Self {
            let mut reset = reset.to_vec();
            reset.push(PinTransaction::set(State::Low));
            let busy = PinMock::new(busy);
            let reset = PinMock::new(&reset);
            let wire = Wire::default();
            let epd = Epd5in65f::new(
                WireSpi(wire.clone()),
                busy.clone(),
                WireDc(wire.clone()),
                reset.clone(),
                NoopDelay::new(),
            );
            Harness {
                epd,
                wire,
                busy,
                reset,
            }
        }

        fn finish(self) {
            let Harness {
                epd,
                mut busy,
                mut reset,
                ..
            } = self;
            drop(epd);
            busy.done();
            reset.done();
        }
    }

    /// BUSY as seen by one refresh: idle after PON, idle after DRF, low after POF.
    fn refresh_busy() -> Vec<PinTransaction> {
        vec![
            PinTransaction::get(State::High),
            PinTransaction::get(State::High),
            PinTransaction::get(State::Low),
        ]
    }

    #[test]
    fn init_resets_then_sends_boot_registers() {
        let mut h = Harness::new(
            &[PinTransaction::get(State::High)],
            &[
                PinTransaction::set(State::High),
                PinTransaction::set(State::Low),
                PinTransaction::set(State::High),
            ],
        );
        h.epd.init().expect("init");

        assert_eq!(
            h.wire.commands(),
            vec![0x00, 0x01, 0x03, 0x06, 0x30, 0x41, 0x50, 0x60, 0x61, 0xE3, 0x50]
        );
        assert_eq!(h.wire.data_after(0x00), vec![vec![0xEF, 0x08]]);
        assert_eq!(h.wire.data_after(0x06), vec![vec![0xC7, 0xC7, 0x1D]]);
        assert_eq!(h.wire.data_after(0x61), vec![vec![0x02, 0x58, 0x01, 0xC0]]);
        h.finish();
    }

    #[test]
    fn init_polls_busy_until_controller_is_idle() {
        let mut h = Harness::new(
            &[
                PinTransaction::get(State::Low),
                PinTransaction::get(State::Low),
                PinTransaction::get(State::High),
            ],
            &[
                PinTransaction::set(State::High),
                PinTransaction::set(State::Low),
                PinTransaction::set(State::High),
            ],
        );
        h.epd.init().expect("init");
        h.finish();
    }

    #[test]
    fn display_streams_frame_and_refreshes() {
        let mut h = Harness::new(&refresh_busy(), &[]);
        let frame: Vec<u8> = (0..BYTES_TOTAL).map(|i| (i % 7) as u8 * 0x11).collect();
        h.epd.display(&frame).expect("display");

        assert_eq!(h.wire.commands(), vec![0x61, 0x10, 0x04, 0x12, 0x02]);
        assert_eq!(h.wire.data_after(0x10), vec![frame]);
        h.finish();
    }

    #[test]
    fn clear_paints_every_pixel_white() {
        let mut h = Harness::new(&refresh_busy(), &[]);
        h.epd.clear().expect("clear");

        let data = h.wire.data_after(0x10);
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].len(), BYTES_TOTAL);
        assert!(data[0].iter().all(|b| *b == EPD_WHITE_PAIR));
        h.finish();
    }

    #[test]
    fn display_rejects_wrong_frame_size() {
        let mut h = Harness::new(&[], &[]);
        let err = h.epd.display(&[0u8; 10]).expect_err("short frame");
        assert!(matches!(
            err,
            EpdError::FrameSize { expected: BYTES_TOTAL, actual: 10 }
        ));
        assert!(h.wire.events().is_empty());
        h.finish();
    }

    #[test]
    fn sleep_sends_deep_sleep_check_code() {
        let mut h = Harness::new(&[], &[]);
        h.epd.sleep().expect("sleep");
        assert_eq!(h.wire.commands(), vec![0x07]);
        assert_eq!(h.wire.data_after(0x07), vec![vec![0xA5]]);
        h.finish();
    }

    #[test]
    fn panel_reports_native_geometry() {
        let h = Harness::new(&[], &[]);
        assert_eq!((Panel::width(&h.epd), Panel::height(&h.epd)), (600, 448));
        h.finish();
    }
}
