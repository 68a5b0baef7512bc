//! Mock DMA channel
//!
//! Owns a real [`TransferDescriptor`] so the engine programs exactly the
//! words it would program on hardware; [`MockChannel::enable`] snapshots the
//! descriptor into the event log so tests can assert what was armed and
//! when, relative to other peripherals.

use lumen_hal::dma::{
    BurstLength, DmaChannel, DmaChannelIrq, TransferDescriptor, TriggerAction, TriggerSource,
};

use crate::event::{Event, EventLog};

/// Recording DMA channel double
#[derive(Debug)]
pub struct MockChannel {
    log: EventLog,
    descriptor: TransferDescriptor,
    enabled: bool,
}

impl MockChannel {
    pub fn new(log: &EventLog) -> Self {
        Self {
            log: log.clone(),
            descriptor: TransferDescriptor::empty(),
            enabled: false,
        }
    }

    /// Whether the channel enable bit is currently set
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl DmaChannel for MockChannel {
    fn disable(&mut self) {
        self.enabled = false;
        self.log.record(Event::ChannelDisabled);
    }

    fn reset(&mut self) {
        // resets channel registers only; the descriptor lives in the
        // RAM-resident table and survives, as on hardware
        self.log.record(Event::ChannelReset);
    }

    fn set_priority(&mut self, level: u8) {
        self.log.record(Event::ChannelPriority { level });
    }

    fn set_trigger(&mut self, source: TriggerSource, _action: TriggerAction, _burst: BurstLength) {
        self.log.record(Event::ChannelTrigger { source: source.0 });
    }

    fn enable_complete_interrupt(&mut self) {
        self.log.record(Event::ChannelCompleteIrqEnabled);
    }

    fn descriptor(&mut self) -> &mut TransferDescriptor {
        &mut self.descriptor
    }

    fn enable(&mut self) {
        self.enabled = true;
        self.log.record(Event::ChannelArmed {
            source_end: self.descriptor.source_end() as usize,
            burst_len: self.descriptor.burst_len(),
            destination: self.descriptor.destination() as usize,
        });
    }
}

/// Interrupt-side handle to the mock DMA channel
#[derive(Debug, Clone)]
pub struct MockChannelIrq {
    log: EventLog,
}

impl MockChannelIrq {
    pub fn new(log: &EventLog) -> Self {
        Self { log: log.clone() }
    }
}

impl DmaChannelIrq for MockChannelIrq {
    fn acknowledge_complete(&mut self) {
        self.log.record(Event::ChannelCompleteAcked);
    }
}
