//! GPIO pin abstractions
//!
//! Digital input and output pins as the drivers see them: bare set/read
//! operations, no mode switching. Pin muxing and configuration belong to the
//! implementing HAL.

/// Digital output pin
///
/// Implementations handle the register write for the specific chip. A single
/// call must resolve to one atomic register access so output pins can also be
/// driven from interrupt context (the SPI chip-select line is released from
/// the transfer-complete handler).
pub trait OutputPin {
    /// Drive the pin high (logic 1)
    fn set_high(&mut self);

    /// Drive the pin low (logic 0)
    fn set_low(&mut self);

    /// Drive the pin to a specific state
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the pin is currently driven high
    fn is_set_high(&self) -> bool;

    /// Check if the pin is currently driven low
    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}

/// Digital input pin
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&self) -> bool {
        !self.is_high()
    }
}
