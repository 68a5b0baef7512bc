//! Drivers for the slower peripherals that accompany a Lumen display head:
//! a capacitive touch controller, a battery-backed RTC, a quasi-bidirectional
//! GPIO expander and the pin bundle for HUB75 LED matrices.
//!
//! Everything here is polled over plain blocking bus traits from [`lumen_hal`].
//! None of these parts move enough data to justify DMA; the display path in
//! `lumen-display` is where the heavy lifting happens.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod hub75;
pub mod mpr121;
pub mod pcf8523;
pub mod pcf8574;
