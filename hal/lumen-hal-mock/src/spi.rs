//! Mock SPI master

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use lumen_hal::spi::{SpiBus, SpiDma, SpiDmaIrq};

use crate::event::{Event, EventLog};
use crate::MockBusFault;

/// Recording SPI bus double
#[derive(Debug, Clone)]
pub struct MockSpi {
    log: EventLog,
    fail_next: Rc<Cell<bool>>,
    data_reg: Rc<RefCell<u8>>,
}

impl MockSpi {
    pub fn new(log: &EventLog) -> Self {
        Self {
            log: log.clone(),
            fail_next: Rc::new(Cell::new(false)),
            data_reg: Rc::new(RefCell::new(0)),
        }
    }

    /// Make the next bus operation fail with [`MockBusFault`]
    pub fn fail_next(&self) {
        self.fail_next.set(true);
    }

    fn check_fault(&self) -> Result<(), MockBusFault> {
        if self.fail_next.replace(false) {
            Err(MockBusFault)
        } else {
            Ok(())
        }
    }
}

impl SpiBus for MockSpi {
    type Error = MockBusFault;

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.check_fault()?;
        self.log.record(Event::SpiWrite {
            bytes: data.to_vec(),
        });
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.check_fault()?;
        buf.fill(0);
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        self.check_fault()?;
        self.log.record(Event::SpiWrite {
            bytes: write.to_vec(),
        });
        read.fill(0);
        Ok(())
    }

    fn transfer_in_place(&mut self, data: &mut [u8]) -> Result<(), Self::Error> {
        self.check_fault()?;
        self.log.record(Event::SpiWrite {
            bytes: data.to_vec(),
        });
        data.fill(0);
        Ok(())
    }
}

impl SpiDma for MockSpi {
    fn data_register(&self) -> *mut u8 {
        self.data_reg.as_ptr()
    }

    fn enable_tx_complete_interrupt(&mut self) {
        self.log.record(Event::SpiTxCompleteIrqEnabled);
    }
}

/// Interrupt-side handle to the mock SPI peripheral
#[derive(Debug, Clone)]
pub struct MockSpiIrq {
    log: EventLog,
}

impl MockSpiIrq {
    pub fn new(log: &EventLog) -> Self {
        Self { log: log.clone() }
    }
}

impl SpiDmaIrq for MockSpiIrq {
    fn acknowledge_tx_complete(&mut self) {
        self.log.record(Event::SpiTxCompleteAcked);
    }
}
