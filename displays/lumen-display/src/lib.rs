//! DMA push engine and SSD1306 device driver
//!
//! This crate moves a display framebuffer over a shared serial bus (I2C or
//! SPI) without blocking the controlling thread: short control writes go out
//! synchronously, bulk frame data is handed to a DMA channel and completed
//! from interrupt context.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Ssd1306  (device: geometry, init, frame)   │
//! └─────────────────────────────────────────────┘
//!                      │  DisplayBus
//!          ┌───────────┴───────────┐
//!          ▼                       ▼
//! ┌────────────────┐      ┌────────────────┐
//! │   I2cDmaBus    │      │   SpiDmaBus    │
//! └────────────────┘      └────────────────┘
//!          │                       │
//!          ▼                       ▼
//!   lumen-hal I2cDma        lumen-hal SpiDma
//!   + DmaChannel            + DmaChannel + pins
//! ```
//!
//! # Transfer discipline
//!
//! Each bus owns one raw buffer, one DMA descriptor and one shared
//! [`TransferFlag`]. A frame push acquires the flag (spin-yield with a
//! compare-exchange, so two pushes can never both arm the channel), programs
//! the descriptor and arms the channel, then returns; the transfer-complete
//! interrupt handler acknowledges the hardware, releases any held control
//! line and clears the flag as its last action. Command writes wait for the
//! flag but never touch it.
//!
//! # Interrupt wiring
//!
//! The crate exposes [`I2cTransferComplete`] and [`SpiTransferComplete`];
//! binding them to the right vector, choosing its priority and enabling it
//! in the NVIC is the integrator's job. The [`TransferFlag`] is allocated by
//! the integrator (a `static`) and handed to both sides:
//!
//! ```ignore
//! static FRAME_TX: TransferFlag = TransferFlag::new();
//!
//! let bus = I2cDmaBus::<_, _, _, 1025>::new(wire, channel, &FRAME_TX, dma_cfg);
//! let mut display = Ssd1306::new(bus, DisplaySize::W128xH64);
//! let mut completion = I2cTransferComplete::new(channel_irq, &FRAME_TX);
//! // from the DMA channel's interrupt vector:
//! //     completion.on_interrupt();
//! ```
//!
//! If the interrupt is never wired up, the second frame push spins forever.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod bus;
pub mod i2c;
pub mod spi;
pub mod ssd1306;
pub mod transfer;

// Re-export key types
pub use bus::{BusConfig, BusError, DisplayBus, DmaConfig};
pub use i2c::{I2cDmaBus, I2cTransferComplete};
pub use spi::{SpiDmaBus, SpiTransferComplete};
pub use ssd1306::{DisplaySize, Ssd1306};
pub use transfer::{Relax, SpinRelax, TransferFlag};
