//! Display bus capability contract
//!
//! The uniform surface a [`Ssd1306`](crate::ssd1306::Ssd1306) device drives,
//! implemented by the I2C and SPI DMA buses. Command writes are synchronous;
//! frame pushes are asynchronous bursts out of the bus's own raw buffer.

use core::num::NonZeroU32;

use lumen_hal::dma::TriggerSource;

/// One-time parameters the bus needs from its device
///
/// Passed into [`DisplayBus::configure`]; the bus keeps no reference back
/// to the device.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusConfig {
    /// Logical framebuffer size in bytes (excluding any protocol prefix the
    /// bus itself adds)
    pub frame_bytes: usize,
}

/// DMA channel parameters, supplied by the integrator at construction
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DmaConfig {
    /// Trigger source index for the serial peripheral backing this bus
    /// (e.g. the SERCOM TX trigger)
    pub trigger: TriggerSource,
    /// Channel arbitration priority level
    pub priority: u8,
    /// Bound on every busy-wait, in relax steps
    ///
    /// `None` (the default) spins indefinitely, trusting that an armed
    /// burst always completes. A bound turns a stalled channel into
    /// [`BusError::Stalled`] instead of a hang.
    pub stall_limit: Option<NonZeroU32>,
}

impl DmaConfig {
    pub const fn new(trigger: TriggerSource) -> Self {
        Self {
            trigger,
            priority: 0,
            stall_limit: None,
        }
    }
}

/// Errors from display bus operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError<E> {
    /// A busy-wait exceeded the configured stall limit; nothing was
    /// transmitted and no state was changed
    Stalled,
    /// The underlying serial primitive failed during a synchronous write
    Comm(E),
}

/// Capability set of a DMA-backed display bus
pub trait DisplayBus {
    /// Error type of the underlying serial primitive
    type Error;

    /// One-time setup: allocate the raw buffer, initialize the descriptor's
    /// static fields, reset and configure the DMA channel, enable the
    /// completion interrupt source.
    ///
    /// # Preconditions
    ///
    /// Call exactly once. A second call is a programming error; it is
    /// logged and ignored. The configured frame (plus any protocol prefix)
    /// must fit the bus's buffer capacity.
    fn configure(&mut self, cfg: BusConfig) -> Result<(), BusError<Self::Error>>;

    /// Synchronous command-phase write
    ///
    /// Busy-waits for any in-flight burst first (a control write must not
    /// interleave with frame data), then blocks until the write completes.
    /// Never touches the transfer state.
    fn command(&mut self, bytes: &[u8]) -> Result<(), BusError<Self::Error>>;

    /// Asynchronous data-phase push of the whole framebuffer
    ///
    /// Busy-waits until the previous burst has been retired by the
    /// completion handler, then programs the descriptor from the bus's own
    /// raw buffer, arms the channel and returns immediately.
    fn flush_frame(&mut self) -> Result<(), BusError<Self::Error>>;

    /// The logical framebuffer: the raw buffer minus any protocol prefix
    ///
    /// Empty until [`configure`](DisplayBus::configure) has run. Writing to
    /// it while [`is_busy`](DisplayBus::is_busy) returns true can tear the
    /// frame currently on the wire; sequence frame updates through the
    /// backpressure in [`flush_frame`](DisplayBus::flush_frame).
    fn frame_mut(&mut self) -> &mut [u8];

    /// Set the target device address used for subsequent transfers
    ///
    /// Meaningful on I2C only. On SPI, device selection is chip-select;
    /// calling this is a caller error, logged and otherwise ignored.
    fn set_address(&mut self, address: u8);

    /// Non-blocking check whether a burst is in flight
    fn is_busy(&self) -> bool;
}
