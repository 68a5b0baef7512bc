//! Blocking delay abstraction
//!
//! A narrow trait for the few places drivers need wall-clock waits (reset
//! pulse timing, post-reset settle). Any `embedded_hal` 1.0 delay provider
//! works through the blanket impl.

/// Blocking delay provider
pub trait Delay {
    /// Block for at least `us` microseconds
    fn delay_us(&mut self, us: u32);

    /// Block for at least `ms` milliseconds
    fn delay_ms(&mut self, ms: u32) {
        self.delay_us(ms.saturating_mul(1_000));
    }
}

impl<T: embedded_hal::delay::DelayNs> Delay for T {
    fn delay_us(&mut self, us: u32) {
        embedded_hal::delay::DelayNs::delay_us(self, us);
    }

    fn delay_ms(&mut self, ms: u32) {
        embedded_hal::delay::DelayNs::delay_ms(self, ms);
    }
}
