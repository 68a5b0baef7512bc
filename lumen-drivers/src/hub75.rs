//! HUB75 LED matrix pin bundle
//!
//! The low-level half of a HUB75 panel driver: six colour lines shared by
//! the upper and lower panel halves, a shift clock and the row-address
//! lines. Row scanning policy and rendering stay with the caller; this
//! module only moves pin levels, plus the [`RowTimer`] trait the caller's
//! scan interrupt is paced by.
//!
//! Panels latch colour data on the falling clock edge, so [`clock_color`]
//! raises the clock, sets the colour lines and drops the clock again.
//!
//! [`clock_color`]: Hub75Pins::clock_color

use lumen_hal::gpio::OutputPin;

/// One pixel for each panel half
///
/// The upper half drives `r1`/`g1`/`b1`, the lower half `r2`/`g2`/`b2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ColorPair {
    pub r1: bool,
    pub g1: bool,
    pub b1: bool,
    pub r2: bool,
    pub g2: bool,
    pub b2: bool,
}

impl ColorPair {
    pub const BLANK: Self = Self {
        r1: false,
        g1: false,
        b1: false,
        r2: false,
        g2: false,
        b2: false,
    };
}

/// Periodic timer pacing the row-scan interrupt
///
/// The scan handler pauses the timer while it shifts a row out and resumes
/// it with the display period for the next row's bit plane.
pub trait RowTimer {
    /// Start counting from `value`, firing when the count reaches `period`
    fn resume(&mut self, value: u32, period: u32);

    /// Stop counting and return the current count
    fn pause(&mut self) -> u32;
}

/// The pin bundle of one HUB75 connector
///
/// `N` is the number of row-address lines; a 1/16-scan panel has four, a
/// 1/32-scan panel five.
pub struct Hub75Pins<P, const N: usize> {
    color: [P; 6],
    clk: P,
    addr: [P; N],
}

impl<P: OutputPin, const N: usize> Hub75Pins<P, N> {
    /// Bundle pins in connector order: `[r1, g1, b1, r2, g2, b2]`, the shift
    /// clock, then the row-address lines from least significant
    pub fn new(color: [P; 6], clk: P, addr: [P; N]) -> Self {
        Self { color, clk, addr }
    }

    /// Drive the six colour lines
    pub fn set_color(&mut self, c: ColorPair) {
        let levels = [c.r1, c.g1, c.b1, c.r2, c.g2, c.b2];
        for (pin, level) in self.color.iter_mut().zip(levels) {
            pin.set_state(level);
        }
    }

    /// Shift one pixel pair into the panel
    pub fn clock_color(&mut self, c: ColorPair) {
        self.clk.set_high();
        self.set_color(c);
        self.clk.set_low();
    }

    /// Shift a blank pixel pair into the panel
    pub fn clock_blank(&mut self) {
        self.clock_color(ColorPair::BLANK);
    }

    /// Drive the row-address lines to select `row`
    pub fn select_row(&mut self, row: usize) {
        for (bit, pin) in self.addr.iter_mut().enumerate() {
            pin.set_state(row & (1 << bit) != 0);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::vec;
    use std::vec::Vec;

    use lumen_hal_mock::{Event, EventLog, SharedPin};

    use super::*;

    fn bundle(log: &EventLog) -> Hub75Pins<SharedPin, 5> {
        let color = ["r1", "g1", "b1", "r2", "g2", "b2"].map(|name| SharedPin::new(log, name, false));
        let clk = SharedPin::new(log, "clk", false);
        let addr = ["a0", "a1", "a2", "a3", "a4"].map(|name| SharedPin::new(log, name, false));
        Hub75Pins::new(color, clk, addr)
    }

    fn levels(log: &EventLog) -> Vec<(&'static str, bool)> {
        log.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::PinSet { name, high } => Some((name, high)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn clock_color_wraps_the_lines_in_one_clock_pulse() {
        let log = EventLog::new();
        let mut pins = bundle(&log);
        log.clear();

        pins.clock_color(ColorPair {
            r1: true,
            b2: true,
            ..ColorPair::BLANK
        });

        assert_eq!(
            levels(&log),
            vec![
                ("clk", true),
                ("r1", true),
                ("g1", false),
                ("b1", false),
                ("r2", false),
                ("g2", false),
                ("b2", true),
                ("clk", false),
            ]
        );
    }

    #[test]
    fn clock_blank_clears_every_colour_line() {
        let log = EventLog::new();
        let mut pins = bundle(&log);
        pins.set_color(ColorPair {
            r1: true,
            g1: true,
            b1: true,
            r2: true,
            g2: true,
            b2: true,
        });
        log.clear();

        pins.clock_blank();

        let colours = levels(&log)
            .into_iter()
            .filter(|(name, _)| *name != "clk")
            .collect::<Vec<_>>();
        assert!(colours.iter().all(|(_, high)| !high));
        assert_eq!(colours.len(), 6);
    }

    #[test]
    fn select_row_encodes_the_row_in_binary() {
        let log = EventLog::new();
        let mut pins = bundle(&log);
        log.clear();

        pins.select_row(0b10110);

        assert_eq!(
            levels(&log),
            vec![
                ("a0", false),
                ("a1", true),
                ("a2", true),
                ("a3", false),
                ("a4", true),
            ]
        );
    }
}
