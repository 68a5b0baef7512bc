//! SPI bus abstractions
//!
//! Provides traits for SPI master operations. [`SpiBus`] is the synchronous
//! surface; [`SpiDma`] and [`SpiDmaIrq`] add the hooks the DMA push engine
//! needs for asynchronous bursts completed from interrupt context. Clock
//! mode and pin setup belong to the implementing HAL; drivers receive a
//! ready-to-use master.

/// SPI bus master
///
/// Provides basic SPI transfer operations for communicating with
/// peripheral devices. Chip-select handling is the caller's business.
pub trait SpiBus {
    /// Error type for SPI operations
    type Error;

    /// Write data without reading
    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Read data (writes zeros)
    fn read(&mut self, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Transfer data (simultaneous read/write)
    ///
    /// Writes data from `write` buffer while reading into `read` buffer.
    /// Both buffers must be the same length.
    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error>;

    /// Transfer data in place
    fn transfer_in_place(&mut self, data: &mut [u8]) -> Result<(), Self::Error>;
}

/// SPI master whose transmit path can be fed by a DMA channel
///
/// Completion is signalled by the serial peripheral's own transmit-complete
/// flag, not the DMA controller's: the DMA interrupt fires once the last
/// byte is handed to the shifter, one byte-time before it is actually on the
/// wire, and releasing chip-select on it would truncate the final byte.
pub trait SpiDma: SpiBus {
    /// Raw address of the peripheral's transmit data register
    ///
    /// Used as the fixed (non-incrementing) DMA destination.
    fn data_register(&self) -> *mut u8;

    /// Enable the peripheral's transmit-complete interrupt source
    fn enable_tx_complete_interrupt(&mut self);
}

/// Interrupt-context handle to an [`SpiDma`] peripheral's completion flag
///
/// Separate from [`SpiDma`] so the transfer-complete handler can own the
/// acknowledge path while the bus keeps the transmit path.
pub trait SpiDmaIrq {
    /// Acknowledge the transmit-complete flag
    ///
    /// Mandatory in the handler, otherwise the interrupt re-fires.
    fn acknowledge_tx_complete(&mut self);
}
