//! PCF8574 I2C GPIO expander
//!
//! A deliberately simple part: each pin is either high (weak pullup) or low
//! (grounded), and can always be read back. To use a pin as an input, drive
//! it high and see whether something external forces it low. The chip has no
//! registers; writes set the pins directly and reads return their state.
//!
//! The similar PCF8575 carries 16 pins instead of 8.
//!
//! Datasheet: <https://cdn-learn.adafruit.com/assets/assets/000/113/910/original/pcf8574.pdf>

use lumen_hal::i2c::I2cBus;

/// Default I2C address (all address pins grounded). The datasheet caps the
/// bus at 100 kHz.
pub const DEFAULT_ADDRESS: u8 = 0x20;

/// PCF8574 configuration
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub address: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
        }
    }
}

/// State of all eight pins from a single bus round-trip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Report(pub u8);

impl Report {
    /// Whether the given pin reads high
    pub fn pin(self, p: u8) -> bool {
        self.0 & (1 << p) != 0
    }
}

/// PCF8574 driver
///
/// Mirrors the last written pin state locally so single-pin updates need
/// only one bus write.
pub struct Pcf8574<I2C> {
    bus: I2C,
    address: u8,
    state: u8,
}

impl<I2C: I2cBus> Pcf8574<I2C> {
    pub fn new(bus: I2C) -> Self {
        Self {
            bus,
            address: DEFAULT_ADDRESS,
            // power-on default, everything high
            state: 0xFF,
        }
    }

    pub fn configure(&mut self, config: Config) {
        self.address = config.address;
    }

    /// Drive a single pin: true for the weak pullup, false to sink current
    pub fn set_pin(&mut self, pin: u8, high: bool) -> Result<(), I2C::Error> {
        if high {
            self.state |= 1 << pin;
        } else {
            self.state &= !(1 << pin);
        }
        self.send()
    }

    /// Drive all pins at once from their bit in `state`
    pub fn set_all(&mut self, state: u8) -> Result<(), I2C::Error> {
        self.state = state;
        self.send()
    }

    /// Read the state of every pin
    pub fn read(&mut self) -> Result<Report, I2C::Error> {
        let mut buf = [0u8; 1];
        self.bus.read(self.address, &mut buf)?;
        Ok(Report(buf[0]))
    }

    fn send(&mut self) -> Result<(), I2C::Error> {
        self.bus.write(self.address, &[self.state])
    }
}
