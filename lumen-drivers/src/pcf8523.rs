//! PCF8523 real-time clock
//!
//! Basic read/write of the current time only. The part also supports alarms,
//! drift compensation and timer interrupts; those remain unimplemented.
//!
//! Datasheet: <https://www.nxp.com/docs/en/data-sheet/PCF8523.pdf>

use lumen_hal::i2c::I2cBus;

/// Fixed I2C address
pub const ADDRESS: u8 = 0x68;

/// Register map
#[allow(dead_code)]
mod reg {
    pub const CONTROL1: u8 = 0x00;
    pub const CONTROL2: u8 = 0x01;
    pub const CONTROL3: u8 = 0x02;
    /// Time registers starting with seconds. The seconds register doubles
    /// as the oscillator status register.
    pub const TIME: u8 = 0x03;
    pub const STATUS: u8 = 0x03;
    pub const OFFSET: u8 = 0x0E;
    pub const CLKOUT_CONTROL: u8 = 0x0F;
    pub const TIMER_B_FREQ: u8 = 0x12;
    pub const TIMER_B_VALUE: u8 = 0x13;
}

/// A calendar timestamp as the clock stores it
///
/// `year` is the full Gregorian year; the part only keeps the two low
/// digits, so anything outside 2000..=2099 will not round-trip. `weekday`
/// counts from 0 with no fixed anchor, use it consistently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub weekday: u8,
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
}

/// PCF8523 driver
pub struct Pcf8523<I2C> {
    bus: I2C,
    pub address: u8,
}

impl<I2C: I2cBus> Pcf8523<I2C> {
    pub fn new(bus: I2C) -> Self {
        Self { bus, address: ADDRESS }
    }

    /// Whether the oscillator stopped since the time was last set
    ///
    /// A stopped oscillator means the stored time can not be trusted.
    pub fn lost_power(&mut self) -> Result<bool, I2C::Error> {
        let mut buf = [0u8; 1];
        self.bus.read_register(self.address, reg::STATUS, &mut buf)?;
        Ok(buf[0] & 0xF0 == 0xF0)
    }

    /// Whether the part has been configured since its last power-on reset
    pub fn initialized(&mut self) -> Result<bool, I2C::Error> {
        let mut buf = [0u8; 1];
        self.bus
            .read_register(self.address, reg::CONTROL3, &mut buf)?;
        Ok(buf[0] & 0xE0 != 0xE0)
    }

    /// Set the current time and start the clock
    pub fn set(&mut self, t: &DateTime) -> Result<(), I2C::Error> {
        let mut buf = [0u8; 1];
        self.bus
            .read_register(self.address, reg::CONTROL1, &mut buf)?;
        // Keep cap_sel and the second/alarm/correction interrupt bits;
        // ensure the clock runs in 24-hour mode.
        buf[0] &= 0b1000_0111;
        self.bus
            .write_register(self.address, reg::CONTROL1, &buf)?;

        let time = [
            decimal_to_bcd(t.seconds),
            decimal_to_bcd(t.minutes),
            decimal_to_bcd(t.hours),
            decimal_to_bcd(t.day),
            decimal_to_bcd(t.weekday),
            decimal_to_bcd(t.month),
            decimal_to_bcd((t.year.saturating_sub(2000)) as u8),
        ];
        self.bus.write_register(self.address, reg::TIME, &time)?;

        // Battery switchover on, battery interrupts off
        self.bus.write_register(self.address, reg::CONTROL3, &[0])
    }

    /// Read the current time
    pub fn now(&mut self) -> Result<DateTime, I2C::Error> {
        let mut buf = [0u8; 7];
        self.bus.read_register(self.address, reg::TIME, &mut buf)?;

        Ok(DateTime {
            seconds: bcd_to_decimal(buf[0] & 0x7F),
            minutes: bcd_to_decimal(buf[1] & 0x7F),
            hours: bcd_to_decimal(buf[2] & 0x3F),
            day: bcd_to_decimal(buf[3] & 0x3F),
            weekday: bcd_to_decimal(buf[4] & 0x07),
            month: bcd_to_decimal(buf[5] & 0x1F),
            year: bcd_to_decimal(buf[6]) as u16 + 2000,
        })
    }
}

fn decimal_to_bcd(dec: u8) -> u8 {
    dec + 6 * (dec / 10)
}

fn bcd_to_decimal(bcd: u8) -> u8 {
    bcd - 6 * (bcd >> 4)
}
