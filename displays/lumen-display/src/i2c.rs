//! I2C DMA display bus
//!
//! Commands travel as synchronous register writes to the control register
//! (selector 0x00); frame data travels as one DMA burst into the bus data
//! register. The raw buffer carries a single leading byte holding the data
//! register selector (0x40), so the burst's fixed DMA destination can be
//! the serial data register and the selector simply rides along as the
//! first byte - there is no separate addressed phase per frame.

use heapless::Vec;
use lumen_hal::dma::{BlockControl, BurstLength, DmaChannel, DmaChannelIrq, TriggerAction};
use lumen_hal::i2c::I2cDma;

use crate::bus::{BusConfig, BusError, DisplayBus, DmaConfig};
use crate::transfer::{Relax, SpinRelax, TransferFlag};

/// Default SSD1306 I2C device address
pub const DEFAULT_ADDRESS: u8 = 0x3C;

/// Control byte selecting the command register
const CONTROL_COMMAND: u8 = 0x00;
/// Control byte selecting the data register
const CONTROL_DATA: u8 = 0x40;

/// Display bus over an I2C master with a DMA-fed transmit path
///
/// `BUF` is the raw buffer capacity in bytes and must hold the configured
/// frame plus the one-byte selector prefix.
pub struct I2cDmaBus<I2C, CH, R, const BUF: usize> {
    wire: I2C,
    channel: CH,
    relax: R,
    address: u8,
    flag: &'static TransferFlag,
    stall_limit: Option<core::num::NonZeroU32>,
    /// Consumed by the first `configure` call
    dma: Option<DmaConfig>,
    buf: Vec<u8, BUF>,
}

impl<I2C, CH, const BUF: usize> I2cDmaBus<I2C, CH, SpinRelax, BUF>
where
    I2C: I2cDma,
    CH: DmaChannel,
{
    /// Create a bus with the default spin-loop waiter
    ///
    /// `flag` is the integrator-allocated transfer state, shared with the
    /// matching [`I2cTransferComplete`].
    pub fn new(wire: I2C, channel: CH, flag: &'static TransferFlag, dma: DmaConfig) -> Self {
        Self::with_relax(wire, channel, flag, dma, SpinRelax)
    }
}

impl<I2C, CH, R, const BUF: usize> I2cDmaBus<I2C, CH, R, BUF>
where
    I2C: I2cDma,
    CH: DmaChannel,
    R: Relax,
{
    /// Create a bus with a caller-provided busy-wait implementation
    pub fn with_relax(
        wire: I2C,
        channel: CH,
        flag: &'static TransferFlag,
        dma: DmaConfig,
        relax: R,
    ) -> Self {
        Self {
            wire,
            channel,
            relax,
            address: DEFAULT_ADDRESS,
            flag,
            stall_limit: dma.stall_limit,
            dma: Some(dma),
            buf: Vec::new(),
        }
    }
}

impl<I2C, CH, R, const BUF: usize> DisplayBus for I2cDmaBus<I2C, CH, R, BUF>
where
    I2C: I2cDma,
    CH: DmaChannel,
    R: Relax,
{
    type Error = I2C::Error;

    fn configure(&mut self, cfg: BusConfig) -> Result<(), BusError<Self::Error>> {
        let dma = match self.dma.take() {
            Some(dma) => dma,
            None => {
                #[cfg(feature = "defmt")]
                defmt::warn!("configure called twice on I2C display bus; ignoring");
                return Ok(());
            }
        };

        // one extra leading byte for the data register selector
        let raw_len = cfg.frame_bytes + 1;
        assert!(raw_len <= u16::MAX as usize, "frame exceeds one burst");
        self.buf
            .resize(raw_len, 0)
            .expect("frame does not fit the DMA buffer");
        self.buf[0] = CONTROL_DATA;

        let descriptor = self.channel.descriptor();
        descriptor.initialize(
            BlockControl::memory_to_peripheral(),
            self.wire.data_register(),
        );

        self.channel.disable();
        self.channel.reset();
        self.channel.set_priority(dma.priority);
        self.channel
            .set_trigger(dma.trigger, TriggerAction::Burst, BurstLength::Single);
        self.channel.enable_complete_interrupt();

        Ok(())
    }

    fn command(&mut self, bytes: &[u8]) -> Result<(), BusError<Self::Error>> {
        // an in-flight burst must drain first so the register-select write
        // cannot interleave with frame data on the wire
        self.flag
            .wait_idle(&mut self.relax, self.stall_limit)
            .map_err(|_| BusError::Stalled)?;

        self.wire
            .write_register(self.address, CONTROL_COMMAND, bytes)
            .map_err(BusError::Comm)
    }

    fn flush_frame(&mut self) -> Result<(), BusError<Self::Error>> {
        debug_assert!(!self.buf.is_empty(), "flush_frame before configure");

        self.flag
            .acquire(&mut self.relax, self.stall_limit)
            .map_err(|_| BusError::Stalled)?;

        self.wire.load_target_address(self.address);

        // the controller takes the address one past the end of the buffer,
        // not its start: with source increment it fetches from srcaddr-btcnt
        let len = self.buf.len();
        let source_end = self.buf.as_ptr().wrapping_add(len);
        self.channel.descriptor().set_burst(source_end, len as u16);

        self.channel.enable();
        Ok(())
    }

    fn frame_mut(&mut self) -> &mut [u8] {
        if self.buf.is_empty() {
            &mut []
        } else {
            &mut self.buf[1..]
        }
    }

    fn set_address(&mut self, address: u8) {
        self.address = address;
    }

    fn is_busy(&self) -> bool {
        self.flag.is_active()
    }
}

/// Completion handler for the I2C bus's DMA bursts
///
/// Call [`on_interrupt`](Self::on_interrupt) from the DMA channel's
/// transfer-complete interrupt vector. Wiring the vector, its priority and
/// enabling it in the NVIC is the integrator's responsibility; if it never
/// fires, the second frame push spins forever.
pub struct I2cTransferComplete<IRQ> {
    irq: IRQ,
    flag: &'static TransferFlag,
}

impl<IRQ: DmaChannelIrq> I2cTransferComplete<IRQ> {
    pub fn new(irq: IRQ, flag: &'static TransferFlag) -> Self {
        Self { irq, flag }
    }

    /// Retire the in-flight burst
    ///
    /// Acknowledges the channel's completion flag (mandatory, or the
    /// interrupt re-fires), then clears the transfer state. The state
    /// clear is last: a spinning transmitter must never observe Idle
    /// before the hardware is settled.
    pub fn on_interrupt(&mut self) {
        self.irq.acknowledge_complete();
        self.flag.release();
    }
}
