//! Shared event log
//!
//! One log instance is handed to every mock a test constructs; the mocks
//! append to it and the test asserts on the resulting sequence.

use std::cell::RefCell;
use std::rc::Rc;

/// One recorded operation on a mock peripheral
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Plain I2C write
    I2cWrite { address: u8, bytes: Vec<u8> },
    /// I2C register write
    I2cWriteRegister {
        address: u8,
        register: u8,
        bytes: Vec<u8>,
    },
    /// I2C register read
    I2cReadRegister {
        address: u8,
        register: u8,
        len: usize,
    },
    /// Plain I2C read
    I2cRead { address: u8, len: usize },
    /// The bus target-address register was loaded for a DMA burst
    I2cTargetLoaded { address: u8 },
    /// Synchronous SPI write
    SpiWrite { bytes: Vec<u8> },
    /// SPI transmit-complete interrupt source enabled
    SpiTxCompleteIrqEnabled,
    /// SPI transmit-complete flag acknowledged
    SpiTxCompleteAcked,
    /// An output pin changed level
    PinSet { name: &'static str, high: bool },
    /// DMA channel enable bit cleared
    ChannelDisabled,
    /// DMA channel software reset
    ChannelReset,
    /// DMA channel priority programmed
    ChannelPriority { level: u8 },
    /// DMA channel trigger source programmed
    ChannelTrigger { source: u32 },
    /// DMA channel transfer-complete interrupt source enabled
    ChannelCompleteIrqEnabled,
    /// DMA channel armed; snapshot of the programmed descriptor
    ChannelArmed {
        source_end: usize,
        burst_len: u16,
        destination: usize,
    },
    /// DMA channel transfer-complete flag acknowledged
    ChannelCompleteAcked,
    /// Blocking delay
    DelayUs { us: u32 },
}

/// Append-only log shared by all mocks of one test
#[derive(Debug, Clone, Default)]
pub struct EventLog(Rc<RefCell<Vec<Event>>>);

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event
    pub fn record(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    /// Snapshot of everything recorded so far
    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    /// Number of events recorded so far
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Discard everything recorded so far
    ///
    /// Handy for skipping past a configure sequence before asserting on the
    /// interesting part of a test.
    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// Index of the first event matching `pred`, if any
    pub fn position<F: FnMut(&Event) -> bool>(&self, pred: F) -> Option<usize> {
        self.0.borrow().iter().position(pred)
    }

    /// Count of events matching `pred`
    pub fn count<F: FnMut(&Event) -> bool>(&self, mut pred: F) -> usize {
        self.0.borrow().iter().filter(|e| pred(e)).count()
    }
}
