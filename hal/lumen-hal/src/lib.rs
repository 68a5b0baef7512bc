//! Lumen Hardware Abstraction Layer
//!
//! This crate defines the hardware traits the Lumen drivers are written
//! against. Chip-specific crates (or board support packages) implement them
//! on real peripherals; `lumen-hal-mock` implements them on recording test
//! doubles so every driver is testable on the host.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  Drivers (lumen-display, lumen-drivers)      │
//! └──────────────────────────────────────────────┘
//!                      │
//!                      ▼
//! ┌──────────────────────────────────────────────┐
//! │  lumen-hal (this crate - traits)             │
//! └──────────────────────────────────────────────┘
//!                      │
//!          ┌───────────┴───────────┐
//!          ▼                       ▼
//! ┌────────────────┐      ┌────────────────┐
//! │ chip/board HAL │      │ lumen-hal-mock │
//! │ (out of tree)  │      │ (host tests)   │
//! └────────────────┘      └────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Digital I/O
//! - [`i2c::I2cBus`], [`i2c::I2cDma`] - I2C master operations
//! - [`spi::SpiBus`], [`spi::SpiDma`], [`spi::SpiDmaIrq`] - SPI master operations
//! - [`dma::DmaChannel`], [`dma::DmaChannelIrq`] - DMA channel control
//! - [`delay::Delay`] - Blocking delays

#![no_std]
#![deny(unsafe_code)]

pub mod delay;
pub mod dma;
pub mod gpio;
pub mod i2c;
pub mod spi;

// Re-export key traits at crate root for convenience
pub use delay::Delay;
pub use dma::{BlockControl, DmaChannel, DmaChannelIrq, TransferDescriptor};
pub use gpio::{InputPin, OutputPin};
pub use i2c::{I2cBus, I2cDma};
pub use spi::{SpiBus, SpiDma, SpiDmaIrq};
