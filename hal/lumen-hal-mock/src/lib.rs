//! Host-side test doubles for the `lumen-hal` traits
//!
//! Every double records what the driver under test did into a shared
//! [`EventLog`], so a test can assert not just that an operation happened
//! but in what order relative to operations on *other* peripherals - e.g.
//! that the I2C target address register was programmed before the DMA
//! channel was armed, or that chip-select went high only after the
//! transmit-complete flag was acknowledged.
//!
//! The doubles share state through `Rc`, so a test can keep a clone for
//! inspection while the driver owns the other handle. This crate is
//! host-only and is consumed exclusively as a dev-dependency.

pub mod delay;
pub mod dma;
pub mod event;
pub mod i2c;
pub mod pin;
pub mod spi;

pub use delay::MockDelay;
pub use dma::{MockChannel, MockChannelIrq};
pub use event::{Event, EventLog};
pub use i2c::MockI2c;
pub use pin::SharedPin;
pub use spi::{MockSpi, MockSpiIrq};

/// Error injected by a mock bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockBusFault;
