//! Shared mock pin
//!
//! Clones share one level cell, mirroring a physical line that several
//! owners can drive - the SPI bus and its transfer-complete handler both
//! hold a handle to the same chip-select pin.

use std::cell::Cell;
use std::rc::Rc;

use lumen_hal::gpio::{InputPin, OutputPin};

use crate::event::{Event, EventLog};

/// Recording output/input pin double
#[derive(Debug, Clone)]
pub struct SharedPin {
    name: &'static str,
    level: Rc<Cell<bool>>,
    log: EventLog,
}

impl SharedPin {
    /// Create a pin; `high` is the initial level
    pub fn new(log: &EventLog, name: &'static str, high: bool) -> Self {
        Self {
            name,
            level: Rc::new(Cell::new(high)),
            log: log.clone(),
        }
    }

    /// Current level without going through the pin traits
    pub fn level(&self) -> bool {
        self.level.get()
    }
}

impl OutputPin for SharedPin {
    fn set_high(&mut self) {
        self.level.set(true);
        self.log.record(Event::PinSet {
            name: self.name,
            high: true,
        });
    }

    fn set_low(&mut self) {
        self.level.set(false);
        self.log.record(Event::PinSet {
            name: self.name,
            high: false,
        });
    }

    fn is_set_high(&self) -> bool {
        self.level.get()
    }
}

impl InputPin for SharedPin {
    fn is_high(&self) -> bool {
        self.level.get()
    }
}
