//! MPR121 capacitive touch controller
//!
//! Twelve-channel touch sensor with an optional proximity channel built from
//! the first few electrodes. Most of its registers only accept writes while
//! the part is in stop mode, so every register write here transparently
//! parks the electrode configuration register, performs the write and then
//! restores run mode.
//!
//! Datasheet: <https://cdn-shop.adafruit.com/datasheets/MPR121.pdf>

use lumen_hal::delay::Delay;
use lumen_hal::i2c::I2cBus;

/// Factory-default I2C address (ADDR pin tied to ground)
pub const DEFAULT_ADDRESS: u8 = 0x5A;

/// Register map
#[allow(dead_code)]
mod reg {
    pub const TOUCH_STATUS_L: u8 = 0x00;
    pub const TOUCH_STATUS_H: u8 = 0x01;

    // Rising / falling / touched baseline filters
    pub const MHDR: u8 = 0x2B;
    pub const NHDR: u8 = 0x2C;
    pub const NCLR: u8 = 0x2D;
    pub const FDLR: u8 = 0x2E;
    pub const MHDF: u8 = 0x2F;
    pub const NHDF: u8 = 0x30;
    pub const NCLF: u8 = 0x31;
    pub const FDLF: u8 = 0x32;
    pub const NHDT: u8 = 0x33;
    pub const NCLT: u8 = 0x34;
    pub const FDLT: u8 = 0x35;

    pub const TOUCH_TH_0: u8 = 0x41;
    pub const RELEASE_TH_0: u8 = 0x42;
    pub const DEBOUNCE: u8 = 0x5B;
    pub const CONFIG1: u8 = 0x5C;
    pub const CONFIG2: u8 = 0x5D;
    pub const ECR: u8 = 0x5E;

    pub const AUTOCONFIG0: u8 = 0x7B;
    pub const UP_LIMIT: u8 = 0x7D;
    pub const LOW_LIMIT: u8 = 0x7E;
    pub const TARGET_LIMIT: u8 = 0x7F;
    pub const SOFT_RESET: u8 = 0x80;
}

/// Number of electrodes wired into the proximity channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProximityMode {
    #[default]
    Off = 0,
    Two = 1,
    Four = 2,
    Twelve = 3,
}

/// MPR121 configuration
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub address: u8,
    pub touch_threshold: u8,
    pub release_threshold: u8,
    pub proximity_mode: ProximityMode,
    /// Enable the part's own automatic charge configuration. Works well
    /// enough in practice, you probably want this.
    pub auto_config: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            // Typical hysteresis pair per AN3892
            touch_threshold: 12,
            release_threshold: 6,
            proximity_mode: ProximityMode::Off,
            auto_config: true,
        }
    }
}

/// Touch state of all channels from a single bus round-trip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Report(pub u16);

impl Report {
    /// Whether the given channel (0..=11, 12 = proximity) reads as touched
    pub fn touched(self, channel: u8) -> bool {
        self.0 & (1 << channel) != 0
    }
}

/// MPR121 driver
///
/// The datasheet caps the bus at 400 kHz; parts in the field have run at
/// 1 MHz, but that is out of spec.
pub struct Mpr121<I2C> {
    bus: I2C,
    address: u8,
}

impl<I2C: I2cBus> Mpr121<I2C> {
    pub fn new(bus: I2C) -> Self {
        Self {
            bus,
            address: DEFAULT_ADDRESS,
        }
    }

    /// Soft-reset the part and program filters, thresholds and run mode
    pub fn configure(&mut self, delay: &mut impl Delay, config: Config) -> Result<(), I2C::Error> {
        self.address = config.address;

        self.write(reg::SOFT_RESET, 0x63)?;
        delay.delay_ms(1);

        self.write(reg::ECR, 0)?;

        self.set_thresholds(config.touch_threshold, config.release_threshold)?;

        // Baseline tracking filters, datasheet section 5.5
        self.write(reg::MHDR, 0x01)?;
        self.write(reg::NHDR, 0x01)?;
        self.write(reg::NCLR, 0x0E)?;
        self.write(reg::FDLR, 0x00)?;

        self.write(reg::MHDF, 0x01)?;
        self.write(reg::NHDF, 0x05)?;
        self.write(reg::NCLF, 0x01)?;
        self.write(reg::FDLF, 0x00)?;

        self.write(reg::NHDT, 0x00)?;
        self.write(reg::NCLT, 0x00)?;
        self.write(reg::FDLT, 0x00)?;

        self.write(reg::DEBOUNCE, 0)?;
        self.write(reg::CONFIG1, 0x10)?; // default, 16uA charge current
        self.write(reg::CONFIG2, 0x20)?; // 0.5uS encoding, 1ms period

        if config.auto_config {
            self.write(reg::AUTOCONFIG0, 0x0B)?;

            // Charge limits for Vdd = 3.3V
            self.write(reg::UP_LIMIT, 200)?; // ((Vdd - 0.7)/Vdd) * 256
            self.write(reg::TARGET_LIMIT, 180)?; // UP_LIMIT * 0.9
            self.write(reg::LOW_LIMIT, 130)?; // UP_LIMIT * 0.65
        }

        let pm = ((config.proximity_mode as u8) & 0b11) << 4;

        // Run mode: all 12 channels plus the selected proximity bundle
        self.write(reg::ECR, 0b1000_0000 + 12 + pm)
    }

    /// Read the touch state of every channel in one transaction
    pub fn status(&mut self) -> Result<Report, I2C::Error> {
        let mut buf = [0u8; 2];
        self.bus
            .read_register(self.address, reg::TOUCH_STATUS_L, &mut buf)?;
        Ok(Report(u16::from_le_bytes(buf)))
    }

    /// Set every channel to the given touch/release thresholds
    ///
    /// Touch should sit several counts above release to give hysteresis;
    /// the usual range is 0x04..=0x10. See application note AN3892.
    pub fn set_thresholds(&mut self, touch: u8, release: u8) -> Result<(), I2C::Error> {
        for channel in 0..=12 {
            self.set_threshold(channel, touch, release)?;
        }
        Ok(())
    }

    /// Set one channel's touch/release thresholds
    pub fn set_threshold(&mut self, channel: u8, touch: u8, release: u8) -> Result<(), I2C::Error> {
        self.write(reg::TOUCH_TH_0 + 2 * channel, touch)?;
        self.write(reg::RELEASE_TH_0 + 2 * channel, release)
    }

    /// Register write with the stop-mode dance
    ///
    /// Everything outside ECR and the autoconfig window only latches while
    /// the electrodes are disabled, so park ECR, write, restore.
    fn write(&mut self, register: u8, value: u8) -> Result<(), I2C::Error> {
        let must_stop = register != reg::ECR && !(0x73..=0x7A).contains(&register);

        let mut ecr_backup = 0;
        if must_stop {
            let mut buf = [0u8; 1];
            self.bus.read_register(self.address, reg::ECR, &mut buf)?;
            if buf[0] != 0 {
                ecr_backup = buf[0];
                self.bus.write_register(self.address, reg::ECR, &[0])?;
            }
        }

        self.bus.write_register(self.address, register, &[value])?;

        if must_stop && ecr_backup != 0 {
            self.bus.write_register(self.address, reg::ECR, &[ecr_backup])?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::vec;
    use std::vec::Vec;

    use lumen_hal_mock::{Event, EventLog, MockDelay, MockI2c};

    use super::*;

    fn configured(log: &EventLog) -> (Mpr121<MockI2c>, MockI2c) {
        let wire = MockI2c::new(log);
        let mut touch = Mpr121::new(wire.clone());
        touch
            .configure(&mut MockDelay::new(log), Config::default())
            .unwrap();
        (touch, wire)
    }

    #[test]
    fn report_decodes_channels() {
        let report = Report(0b0001_0000_0000_0101);
        assert!(report.touched(0));
        assert!(report.touched(2));
        assert!(report.touched(12));
        assert!(!report.touched(1));
        assert!(!report.touched(11));
    }

    #[test]
    fn configure_resets_then_settles_then_runs() {
        let log = EventLog::new();
        let (_, wire) = configured(&log);

        let reset = log
            .position(|e| {
                matches!(e, Event::I2cWriteRegister { register, .. } if *register == reg::SOFT_RESET)
            })
            .unwrap();
        let settle = log
            .position(|e| matches!(e, Event::DelayUs { us: 1_000 }))
            .unwrap();
        assert!(reset < settle);

        // Run mode: 12 channels enabled, proximity off
        assert_eq!(wire.register(DEFAULT_ADDRESS, reg::ECR), vec![0x8C]);
    }

    #[test]
    fn configure_with_proximity_bundles_channels() {
        let log = EventLog::new();
        let wire = MockI2c::new(&log);
        let mut touch = Mpr121::new(wire.clone());
        touch
            .configure(
                &mut MockDelay::new(&log),
                Config {
                    proximity_mode: ProximityMode::Twelve,
                    ..Config::default()
                },
            )
            .unwrap();

        assert_eq!(wire.register(DEFAULT_ADDRESS, reg::ECR), vec![0x8C | 0x30]);
    }

    #[test]
    fn configure_programs_autoconfig_limits() {
        let log = EventLog::new();
        let (_, wire) = configured(&log);

        assert_eq!(wire.register(DEFAULT_ADDRESS, reg::AUTOCONFIG0), vec![0x0B]);
        assert_eq!(wire.register(DEFAULT_ADDRESS, reg::UP_LIMIT), vec![200]);
        assert_eq!(wire.register(DEFAULT_ADDRESS, reg::TARGET_LIMIT), vec![180]);
        assert_eq!(wire.register(DEFAULT_ADDRESS, reg::LOW_LIMIT), vec![130]);
    }

    #[test]
    fn threshold_write_parks_and_restores_run_mode() {
        let log = EventLog::new();
        let (mut touch, wire) = configured(&log);
        log.clear();

        touch.set_threshold(3, 10, 5).unwrap();

        assert_eq!(wire.register(DEFAULT_ADDRESS, 0x47), vec![10]);
        assert_eq!(wire.register(DEFAULT_ADDRESS, 0x48), vec![5]);
        // Back in run mode afterwards
        assert_eq!(wire.register(DEFAULT_ADDRESS, reg::ECR), vec![0x8C]);

        let ecr_write = |bytes: Vec<u8>| {
            move |e: &Event| {
                *e == Event::I2cWriteRegister {
                    address: DEFAULT_ADDRESS,
                    register: reg::ECR,
                    bytes: bytes.clone(),
                }
            }
        };
        let park = log.position(ecr_write(vec![0])).unwrap();
        let write = log
            .position(|e| matches!(e, Event::I2cWriteRegister { register: 0x47, .. }))
            .unwrap();
        let restore = log.position(ecr_write(vec![0x8C])).unwrap();
        assert!(park < write && write < restore);
    }

    #[test]
    fn status_reads_both_status_bytes() {
        let log = EventLog::new();
        let (mut touch, wire) = configured(&log);
        wire.set_register(DEFAULT_ADDRESS, reg::TOUCH_STATUS_L, &[0x05, 0x10]);

        let report = touch.status().unwrap();

        assert_eq!(report, Report(0x1005));
    }

    #[test]
    fn configure_propagates_bus_faults() {
        let log = EventLog::new();
        let wire = MockI2c::new(&log);
        let mut touch = Mpr121::new(wire.clone());
        wire.fail_next();

        let result = touch.configure(&mut MockDelay::new(&log), Config::default());

        assert!(result.is_err());
    }
}
