//! SPI DMA display bus
//!
//! Drives three control lines besides the serial pins: data/command select,
//! reset, and chip-select (active low). Commands are synchronous writes with
//! DC low; frame data is a DMA burst with DC high. Chip-select stays low for
//! the whole phase - the command path raises it synchronously, the data path
//! leaves it to the completion handler.
//!
//! Completion is the serial peripheral's transmit-complete flag, not the DMA
//! controller's: the DMA interrupt fires when the last byte reaches the
//! shifter, one byte-time before it is on the wire, and releasing
//! chip-select on it would truncate the final byte.

use heapless::Vec;
use lumen_hal::delay::Delay;
use lumen_hal::dma::{BlockControl, BurstLength, DmaChannel, TriggerAction};
use lumen_hal::gpio::OutputPin;
use lumen_hal::spi::{SpiDma, SpiDmaIrq};

use crate::bus::{BusConfig, BusError, DisplayBus, DmaConfig};
use crate::transfer::{Relax, SpinRelax, TransferFlag};

/// Display bus over an SPI master with a DMA-fed transmit path
///
/// `BUF` is the frame buffer capacity in bytes; SPI needs no protocol
/// prefix.
pub struct SpiDmaBus<SPI, CH, DC, RST, CS, D, R, const BUF: usize> {
    wire: SPI,
    channel: CH,
    dc: DC,
    reset: RST,
    cs: CS,
    delay: D,
    relax: R,
    flag: &'static TransferFlag,
    stall_limit: Option<core::num::NonZeroU32>,
    /// Consumed by the first `configure` call
    dma: Option<DmaConfig>,
    buf: Vec<u8, BUF>,
}

impl<SPI, CH, DC, RST, CS, D, const BUF: usize> SpiDmaBus<SPI, CH, DC, RST, CS, D, SpinRelax, BUF>
where
    SPI: SpiDma,
    CH: DmaChannel,
    DC: OutputPin,
    RST: OutputPin,
    CS: OutputPin,
    D: Delay,
{
    /// Create a bus with the default spin-loop waiter
    ///
    /// `flag` is the integrator-allocated transfer state, shared with the
    /// matching [`SpiTransferComplete`] - which also needs its own handle
    /// to the same physical chip-select line.
    pub fn new(
        wire: SPI,
        channel: CH,
        dc: DC,
        reset: RST,
        cs: CS,
        delay: D,
        flag: &'static TransferFlag,
        dma: DmaConfig,
    ) -> Self {
        Self::with_relax(wire, channel, dc, reset, cs, delay, flag, dma, SpinRelax)
    }
}

impl<SPI, CH, DC, RST, CS, D, R, const BUF: usize> SpiDmaBus<SPI, CH, DC, RST, CS, D, R, BUF>
where
    SPI: SpiDma,
    CH: DmaChannel,
    DC: OutputPin,
    RST: OutputPin,
    CS: OutputPin,
    D: Delay,
    R: Relax,
{
    /// Create a bus with a caller-provided busy-wait implementation
    #[allow(clippy::too_many_arguments)]
    pub fn with_relax(
        wire: SPI,
        channel: CH,
        dc: DC,
        reset: RST,
        cs: CS,
        delay: D,
        flag: &'static TransferFlag,
        dma: DmaConfig,
        relax: R,
    ) -> Self {
        Self {
            wire,
            channel,
            dc,
            reset,
            cs,
            delay,
            relax,
            flag,
            stall_limit: dma.stall_limit,
            dma: Some(dma),
            buf: Vec::new(),
        }
    }

    /// Hardware reset pulse
    ///
    /// The controller needs a minimum power-up settle time before it
    /// accepts commands, so the timing here is a floor, not a target.
    fn reset_pulse(&mut self) {
        self.cs.set_low();
        self.dc.set_low();
        self.reset.set_low();

        self.reset.set_high();
        self.delay.delay_ms(1);
        self.reset.set_low();
        self.delay.delay_ms(10);
        self.reset.set_high();

        self.cs.set_high();
    }
}

impl<SPI, CH, DC, RST, CS, D, R, const BUF: usize> DisplayBus
    for SpiDmaBus<SPI, CH, DC, RST, CS, D, R, BUF>
where
    SPI: SpiDma,
    CH: DmaChannel,
    DC: OutputPin,
    RST: OutputPin,
    CS: OutputPin,
    D: Delay,
    R: Relax,
{
    type Error = SPI::Error;

    fn configure(&mut self, cfg: BusConfig) -> Result<(), BusError<Self::Error>> {
        let dma = match self.dma.take() {
            Some(dma) => dma,
            None => {
                #[cfg(feature = "defmt")]
                defmt::warn!("configure called twice on SPI display bus; ignoring");
                return Ok(());
            }
        };

        self.reset_pulse();

        assert!(cfg.frame_bytes <= u16::MAX as usize, "frame exceeds one burst");
        self.buf
            .resize(cfg.frame_bytes, 0)
            .expect("frame does not fit the DMA buffer");

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

        // completion comes from the peripheral's TXC flag, not the DMA
        // controller's; see the module docs
        self.wire.enable_tx_complete_interrupt();

        Ok(())
    }

    fn command(&mut self, bytes: &[u8]) -> Result<(), BusError<Self::Error>> {
        self.flag
            .wait_idle(&mut self.relax, self.stall_limit)
            .map_err(|_| BusError::Stalled)?;

        self.dc.set_low();
        self.cs.set_low();
        let result = self.wire.write(bytes).map_err(BusError::Comm);
        self.cs.set_high();
        result
    }

    fn flush_frame(&mut self) -> Result<(), BusError<Self::Error>> {
        debug_assert!(!self.buf.is_empty(), "flush_frame before configure");

        self.flag
            .acquire(&mut self.relax, self.stall_limit)
            .map_err(|_| BusError::Stalled)?;

        self.dc.set_high();
        self.cs.set_low();

        // one past the end of the buffer, per the controller's addressing
        // convention; chip-select stays low until the completion handler
        let len = self.buf.len();
        let source_end = self.buf.as_ptr().wrapping_add(len);
        self.channel.descriptor().set_burst(source_end, len as u16);

        self.channel.enable();
        Ok(())
    }

    fn frame_mut(&mut self) -> &mut [u8] {
        &mut self.buf
    }

    fn set_address(&mut self, _address: u8) {
        // device selection on SPI is chip-select; a bus address is a
        // caller error and alters nothing
        #[cfg(feature = "defmt")]
        defmt::warn!("set_address called on SPI display bus");
    }

    fn is_busy(&self) -> bool {
        self.flag.is_active()
    }
}

/// Completion handler for the SPI bus's DMA bursts
///
/// Call [`on_interrupt`](Self::on_interrupt) from the serial peripheral's
/// transmit-complete interrupt vector. `cs` is a second handle to the same
/// physical chip-select line the bus drives; a pin write is a single
/// register access, so both contexts may own one.
pub struct SpiTransferComplete<IRQ, CS> {
    irq: IRQ,
    cs: CS,
    flag: &'static TransferFlag,
}

impl<IRQ: SpiDmaIrq, CS: OutputPin> SpiTransferComplete<IRQ, CS> {
    pub fn new(irq: IRQ, cs: CS, flag: &'static TransferFlag) -> Self {
        Self { irq, cs, flag }
    }

    /// Retire the in-flight burst
    ///
    /// Acknowledges the peripheral's transmit-complete flag (mandatory, or
    /// the interrupt re-fires), releases chip-select, then clears the
    /// transfer state. The state clear is last: a spinning transmitter
    /// must never observe Idle while chip-select is still asserted.
    pub fn on_interrupt(&mut self) {
        self.irq.acknowledge_tx_complete();
        self.cs.set_high();
        self.flag.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::DmaConfig;
    use lumen_hal::dma::TriggerSource;
    use lumen_hal_mock::{Event, EventLog, MockChannel, MockDelay, MockSpi, MockSpiIrq, SharedPin};
    use std::boxed::Box;
    use std::vec;
    use std::vec::Vec;

    const FRAME: usize = 8;

    type TestBus =
        SpiDmaBus<MockSpi, MockChannel, SharedPin, SharedPin, SharedPin, MockDelay, SpinRelax, 16>;

    struct Fixture {
        log: EventLog,
        bus: TestBus,
        cs: SharedPin,
        dc: SharedPin,
    }

    fn leak_flag() -> &'static TransferFlag {
        Box::leak(Box::new(TransferFlag::new()))
    }

    fn fixture(flag: &'static TransferFlag) -> Fixture {
        let log = EventLog::new();
        let dc = SharedPin::new(&log, "dc", false);
        let reset = SharedPin::new(&log, "reset", false);
        let cs = SharedPin::new(&log, "cs", true);
        let bus = SpiDmaBus::new(
            MockSpi::new(&log),
            MockChannel::new(&log),
            dc.clone(),
            reset,
            cs.clone(),
            MockDelay::new(&log),
            flag,
            DmaConfig::new(TriggerSource(0x0D)),
        );
        Fixture { log, bus, cs, dc }
    }

    #[test]
    fn configure_pulses_reset_with_settle_times() {
        let mut f = fixture(leak_flag());
        f.bus.configure(BusConfig { frame_bytes: FRAME }).unwrap();

        let reset_levels: Vec<bool> = f
            .log
            .events()
            .iter()
            .filter_map(|e| match e {
                Event::PinSet {
                    name: "reset",
                    high,
                } => Some(*high),
                _ => None,
            })
            .collect();
        assert_eq!(reset_levels, vec![false, true, false, true]);

        let delays: Vec<u32> = f
            .log
            .events()
            .iter()
            .filter_map(|e| match e {
                Event::DelayUs { us } => Some(*us),
                _ => None,
            })
            .collect();
        assert_eq!(delays, vec![1_000, 10_000]);

        // completion source is the peripheral's TXC flag, and chip-select
        // ends up released
        assert_eq!(f.log.count(|e| matches!(e, Event::SpiTxCompleteIrqEnabled)), 1);
        assert_eq!(
            f.log.count(|e| matches!(e, Event::ChannelCompleteIrqEnabled)),
            0
        );
        assert!(f.cs.level());
        assert_eq!(f.bus.frame_mut().len(), FRAME);
    }

    #[test]
    #[should_panic(expected = "frame does not fit the DMA buffer")]
    fn configure_rejects_frame_larger_than_the_buffer() {
        let mut f = fixture(leak_flag());
        let _ = f.bus.configure(BusConfig { frame_bytes: 64 });
    }

    #[test]
    fn command_keeps_dc_low_and_strobes_cs_once() {
        let mut f = fixture(leak_flag());
        f.bus.configure(BusConfig { frame_bytes: FRAME }).unwrap();
        f.log.clear();

        f.bus.command(&[0x21, 0x00, 0x7F]).unwrap();

        assert_eq!(
            f.log.events(),
            vec![
                Event::PinSet {
                    name: "dc",
                    high: false
                },
                Event::PinSet {
                    name: "cs",
                    high: false
                },
                Event::SpiWrite {
                    bytes: vec![0x21, 0x00, 0x7F]
                },
                Event::PinSet {
                    name: "cs",
                    high: true
                },
            ]
        );
        assert!(!f.bus.is_busy());
        assert!(!f.dc.level());
    }

    #[test]
    fn command_releases_cs_even_on_fault() {
        let mut f = fixture(leak_flag());
        f.bus.configure(BusConfig { frame_bytes: FRAME }).unwrap();

        f.bus.wire.fail_next();
        assert!(f.bus.command(&[0xAF]).is_err());
        assert!(f.cs.level());
    }

    #[test]
    fn flush_raises_dc_and_holds_cs_for_the_handler() {
        let mut f = fixture(leak_flag());
        f.bus.configure(BusConfig { frame_bytes: FRAME }).unwrap();
        f.log.clear();

        f.bus.flush_frame().unwrap();

        assert!(f.bus.is_busy());
        assert!(f.dc.level());
        assert!(!f.cs.level(), "chip-select held until completion");
        assert!(f.log.events().iter().any(|e| matches!(
            e,
            Event::ChannelArmed { burst_len, .. } if *burst_len == FRAME as u16
        )));
    }

    #[test]
    fn completion_acks_then_releases_cs_then_clears_state() {
        let flag = leak_flag();
        let mut f = fixture(flag);
        f.bus.configure(BusConfig { frame_bytes: FRAME }).unwrap();
        f.bus.flush_frame().unwrap();
        f.log.clear();

        let mut completion =
            SpiTransferComplete::new(MockSpiIrq::new(&f.log), f.cs.clone(), flag);
        completion.on_interrupt();

        assert!(!f.bus.is_busy());
        assert!(f.cs.level());
        // acknowledgment precedes the chip-select release
        let acked = f
            .log
            .position(|e| matches!(e, Event::SpiTxCompleteAcked))
            .unwrap();
        let cs_high = f
            .log
            .position(|e| matches!(e, Event::PinSet { name: "cs", high: true }))
            .unwrap();
        assert!(acked < cs_high);
    }

    #[test]
    fn set_address_is_a_logged_noop() {
        let flag = leak_flag();
        let mut f = fixture(flag);
        f.bus.configure(BusConfig { frame_bytes: FRAME }).unwrap();
        f.log.clear();

        f.bus.set_address(0x3C);

        assert!(f.log.is_empty());
        assert!(!f.bus.is_busy());
        assert!(f.cs.level());
    }
}
