//! SSD1306 OLED device
//!
//! The device layer on top of a [`DisplayBus`]: panel geometry, the init
//! command sequence, and the frame push. Rendering into the framebuffer is
//! the application's business; the device only hands out the buffer view
//! and moves it to the panel.

use crate::bus::{BusConfig, BusError, DisplayBus};

/// SSD1306 commands
#[allow(dead_code)]
mod cmd {
    pub const SET_CONTRAST: u8 = 0x81;
    pub const ALL_ON_RESUME: u8 = 0xA4;
    pub const SET_NORMAL: u8 = 0xA6;
    pub const SET_INVERSE: u8 = 0xA7;
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_VCOM_DESELECT: u8 = 0xDB;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const SET_START_LINE: u8 = 0x40;
    pub const MEMORY_MODE: u8 = 0x20;
    pub const COLUMN_ADDR: u8 = 0x21;
    pub const PAGE_ADDR: u8 = 0x22;
    pub const SEG_REMAP: u8 = 0xA1;
    pub const COM_SCAN_DEC: u8 = 0xC8;
    pub const CHARGE_PUMP: u8 = 0x8D;
}

/// Supported panel geometries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplaySize {
    /// 128x64 pixels
    W128xH64,
    /// 128x32 pixels
    W128xH32,
    /// 96x16 pixels
    W96xH16,
}

impl DisplaySize {
    pub const fn width(self) -> u8 {
        match self {
            Self::W128xH64 | Self::W128xH32 => 128,
            Self::W96xH16 => 96,
        }
    }

    pub const fn height(self) -> u8 {
        match self {
            Self::W128xH64 => 64,
            Self::W128xH32 => 32,
            Self::W96xH16 => 16,
        }
    }

    /// Framebuffer size in bytes (1 bit per pixel, page-organized)
    pub const fn frame_bytes(self) -> usize {
        self.width() as usize * self.height() as usize / 8
    }

    /// COM pins hardware configuration for this geometry
    const fn com_pins(self) -> u8 {
        match self {
            Self::W128xH64 => 0x12, // alternative COM configuration
            Self::W128xH32 | Self::W96xH16 => 0x02,
        }
    }
}

/// SSD1306 driver
///
/// Owns its bus; the bus learns the frame size through
/// [`configure`](Self::configure) and keeps no reference back.
pub struct Ssd1306<B> {
    bus: B,
    size: DisplaySize,
}

impl<B: DisplayBus> Ssd1306<B> {
    pub fn new(bus: B, size: DisplaySize) -> Self {
        Self { bus, size }
    }

    /// Initialize the bus and the panel
    ///
    /// Configures the bus for this geometry's frame size, then runs the
    /// panel init sequence. Horizontal addressing mode with the full
    /// column/page window means one burst paints the whole panel and the
    /// hardware pointer wraps back to the origin, so frame pushes need no
    /// per-frame addressing commands.
    ///
    /// # Preconditions
    ///
    /// Call exactly once, like [`DisplayBus::configure`].
    pub fn configure(&mut self) -> Result<(), BusError<B::Error>> {
        self.bus.configure(BusConfig {
            frame_bytes: self.size.frame_bytes(),
        })?;

        let width = self.size.width();
        let pages = self.size.height() / 8;

        self.bus.command(&[cmd::DISPLAY_OFF])?;
        self.bus.command(&[cmd::SET_CLOCK_DIV, 0x80])?;
        self.bus.command(&[cmd::SET_MUX_RATIO, self.size.height() - 1])?;
        self.bus.command(&[cmd::SET_DISPLAY_OFFSET, 0x00])?;
        self.bus.command(&[cmd::SET_START_LINE])?;
        self.bus.command(&[cmd::CHARGE_PUMP, 0x14])?;
        self.bus.command(&[cmd::MEMORY_MODE, 0x00])?;
        self.bus.command(&[cmd::SEG_REMAP])?;
        self.bus.command(&[cmd::COM_SCAN_DEC])?;
        self.bus.command(&[cmd::SET_COM_PINS, self.size.com_pins()])?;
        self.bus.command(&[cmd::SET_CONTRAST, 0x8F])?;
        self.bus.command(&[cmd::SET_PRECHARGE, 0xF1])?;
        self.bus.command(&[cmd::SET_VCOM_DESELECT, 0x40])?;
        self.bus.command(&[cmd::COLUMN_ADDR, 0, width - 1])?;
        self.bus.command(&[cmd::PAGE_ADDR, 0, pages - 1])?;
        self.bus.command(&[cmd::ALL_ON_RESUME])?;
        self.bus.command(&[cmd::SET_NORMAL])?;
        self.bus.command(&[cmd::DISPLAY_ON])
    }

    /// Push the framebuffer to the panel
    ///
    /// Returns as soon as the burst is armed; poll
    /// [`is_busy`](Self::is_busy) or just call again - the next push
    /// provides the backpressure.
    pub fn push_frame(&mut self) -> Result<(), BusError<B::Error>> {
        self.bus.flush_frame()
    }

    /// The framebuffer, one bit per pixel, page-organized
    pub fn frame_mut(&mut self) -> &mut [u8] {
        self.bus.frame_mut()
    }

    /// Zero the framebuffer (does not push)
    pub fn clear_frame(&mut self) {
        self.bus.frame_mut().fill(0);
    }

    /// Whether a frame burst is still in flight
    pub fn is_busy(&self) -> bool {
        self.bus.is_busy()
    }

    /// Change the I2C device address used for subsequent transfers
    pub fn set_address(&mut self, address: u8) {
        self.bus.set_address(address);
    }

    /// Set panel contrast (0-255)
    pub fn set_contrast(&mut self, contrast: u8) -> Result<(), BusError<B::Error>> {
        self.bus.command(&[cmd::SET_CONTRAST, contrast])
    }

    /// Turn the panel on or off (the frame memory is retained)
    pub fn set_power(&mut self, on: bool) -> Result<(), BusError<B::Error>> {
        self.bus
            .command(&[if on { cmd::DISPLAY_ON } else { cmd::DISPLAY_OFF }])
    }

    /// Invert the panel without touching the framebuffer
    pub fn set_inverted(&mut self, inverted: bool) -> Result<(), BusError<B::Error>> {
        self.bus
            .command(&[if inverted { cmd::SET_INVERSE } else { cmd::SET_NORMAL }])
    }

    pub fn size(&self) -> DisplaySize {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::DmaConfig;
    use crate::i2c::I2cDmaBus;
    use crate::transfer::TransferFlag;
    use lumen_hal::dma::TriggerSource;
    use lumen_hal_mock::{Event, EventLog, MockChannel, MockI2c};
    use std::boxed::Box;
    use std::vec::Vec;

    fn make_display(
        log: &EventLog,
    ) -> Ssd1306<I2cDmaBus<MockI2c, MockChannel, crate::transfer::SpinRelax, 2048>> {
        let flag = Box::leak(Box::new(TransferFlag::new()));
        let bus = I2cDmaBus::new(
            MockI2c::new(log),
            MockChannel::new(log),
            flag,
            DmaConfig::new(TriggerSource(0x0F)),
        );
        Ssd1306::new(bus, DisplaySize::W128xH64)
    }

    fn commands(log: &EventLog) -> Vec<Vec<u8>> {
        log.events()
            .iter()
            .filter_map(|e| match e {
                Event::I2cWriteRegister {
                    register: 0x00,
                    bytes,
                    ..
                } => Some(bytes.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn geometry() {
        assert_eq!(DisplaySize::W128xH64.frame_bytes(), 1024);
        assert_eq!(DisplaySize::W128xH32.frame_bytes(), 512);
        assert_eq!(DisplaySize::W96xH16.frame_bytes(), 192);
    }

    #[test]
    fn configure_sizes_frame_and_runs_init_sequence() {
        let log = EventLog::new();
        let mut display = make_display(&log);
        display.configure().unwrap();

        assert_eq!(display.frame_mut().len(), 1024);

        let cmds = commands(&log);
        assert_eq!(cmds.first().unwrap(), &alloc_cmd(&[cmd::DISPLAY_OFF]));
        assert_eq!(cmds.last().unwrap(), &alloc_cmd(&[cmd::DISPLAY_ON]));
        // geometry-dependent entries
        assert!(cmds.contains(&alloc_cmd(&[cmd::SET_MUX_RATIO, 63])));
        assert!(cmds.contains(&alloc_cmd(&[cmd::SET_COM_PINS, 0x12])));
        assert!(cmds.contains(&alloc_cmd(&[cmd::COLUMN_ADDR, 0, 127])));
        assert!(cmds.contains(&alloc_cmd(&[cmd::PAGE_ADDR, 0, 7])));
        // one burst paints the whole panel
        assert!(cmds.contains(&alloc_cmd(&[cmd::MEMORY_MODE, 0x00])));
    }

    fn alloc_cmd(bytes: &[u8]) -> Vec<u8> {
        bytes.to_vec()
    }

    #[test]
    fn push_frame_arms_one_burst() {
        let log = EventLog::new();
        let mut display = make_display(&log);
        display.configure().unwrap();
        log.clear();

        display.frame_mut()[0] = 0xA5;
        display.push_frame().unwrap();

        assert!(display.is_busy());
        assert_eq!(log.count(|e| matches!(e, Event::ChannelArmed { .. })), 1);
    }

    #[test]
    fn panel_controls_are_command_phase_only() {
        let log = EventLog::new();
        let mut display = make_display(&log);
        display.configure().unwrap();
        log.clear();

        display.set_contrast(0x40).unwrap();
        display.set_inverted(true).unwrap();
        display.set_power(false).unwrap();

        assert!(!display.is_busy());
        assert_eq!(log.count(|e| matches!(e, Event::ChannelArmed { .. })), 0);
        let cmds = commands(&log);
        assert_eq!(cmds[0], [cmd::SET_CONTRAST, 0x40]);
        assert_eq!(cmds[1], [cmd::SET_INVERSE]);
        assert_eq!(cmds[2], [cmd::DISPLAY_OFF]);
    }
}
