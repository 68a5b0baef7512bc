//! Mock delay provider
//!
//! Implements `embedded_hal::delay::DelayNs` and reaches the drivers
//! through `lumen-hal`'s blanket impl, the same route a real delay provider
//! takes. Recorded in microseconds; no time actually passes.

use crate::event::{Event, EventLog};

/// Recording delay double
#[derive(Debug, Clone)]
pub struct MockDelay {
    log: EventLog,
}

impl MockDelay {
    pub fn new(log: &EventLog) -> Self {
        Self { log: log.clone() }
    }
}

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.log.record(Event::DelayUs {
            us: ns.div_ceil(1_000),
        });
    }

    fn delay_us(&mut self, us: u32) {
        self.log.record(Event::DelayUs { us });
    }

    fn delay_ms(&mut self, ms: u32) {
        self.log.record(Event::DelayUs {
            us: ms.saturating_mul(1_000),
        });
    }
}
