//! Mock I2C master
//!
//! Keeps a register map per (device address, register) pair: register writes
//! update the map and register reads serve from it, so read-modify-write
//! sequences (like the MPR121's stop-mode dance around ECR) behave the way
//! they would against real hardware.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use lumen_hal::i2c::{I2cBus, I2cDma};

use crate::event::{Event, EventLog};
use crate::MockBusFault;

#[derive(Debug, Default)]
struct State {
    regs: HashMap<(u8, u8), Vec<u8>>,
    /// Responses for plain (register-less) reads, oldest first
    read_queue: VecDeque<Vec<u8>>,
}

/// Recording I2C bus double
///
/// Cloning yields another handle to the same bus, so a test can keep one
/// for inspection while the driver owns the other.
#[derive(Debug, Clone)]
pub struct MockI2c {
    log: EventLog,
    state: Rc<RefCell<State>>,
    fail_next: Rc<Cell<bool>>,
    data_reg: Rc<RefCell<u8>>,
    target: Rc<Cell<Option<u8>>>,
}

impl MockI2c {
    pub fn new(log: &EventLog) -> Self {
        Self {
            log: log.clone(),
            state: Rc::default(),
            fail_next: Rc::new(Cell::new(false)),
            data_reg: Rc::new(RefCell::new(0)),
            target: Rc::new(Cell::new(None)),
        }
    }

    /// Make the next bus operation fail with [`MockBusFault`]
    pub fn fail_next(&self) {
        self.fail_next.set(true);
    }

    /// Seed a register value
    pub fn set_register(&self, address: u8, register: u8, bytes: &[u8]) {
        self.state
            .borrow_mut()
            .regs
            .insert((address, register), bytes.to_vec());
    }

    /// Current register value (empty if never written or seeded)
    pub fn register(&self, address: u8, register: u8) -> Vec<u8> {
        self.state
            .borrow()
            .regs
            .get(&(address, register))
            .cloned()
            .unwrap_or_default()
    }

    /// Queue a response for a plain (register-less) read
    pub fn queue_read(&self, bytes: &[u8]) {
        self.state.borrow_mut().read_queue.push_back(bytes.to_vec());
    }

    /// Target address last loaded for a DMA burst, if any
    pub fn loaded_target(&self) -> Option<u8> {
        self.target.get()
    }

    fn check_fault(&self) -> Result<(), MockBusFault> {
        if self.fail_next.replace(false) {
            Err(MockBusFault)
        } else {
            Ok(())
        }
    }

    fn fill_from_register(&self, address: u8, register: u8, buf: &mut [u8]) {
        let state = self.state.borrow();
        let src = state.regs.get(&(address, register));
        for (i, b) in buf.iter_mut().enumerate() {
            *b = src.and_then(|v| v.get(i)).copied().unwrap_or(0);
        }
    }
}

impl I2cBus for MockI2c {
    type Error = MockBusFault;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.check_fault()?;
        self.log.record(Event::I2cWrite {
            address,
            bytes: data.to_vec(),
        });
        Ok(())
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.check_fault()?;
        self.log.record(Event::I2cRead {
            address,
            len: buf.len(),
        });
        let response = self.state.borrow_mut().read_queue.pop_front();
        for (i, b) in buf.iter_mut().enumerate() {
            *b = response.as_ref().and_then(|v| v.get(i)).copied().unwrap_or(0);
        }
        Ok(())
    }

    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.check_fault()?;
        // By convention the write phase is a single register selector.
        let register = write_data.first().copied().unwrap_or(0);
        self.log.record(Event::I2cReadRegister {
            address,
            register,
            len: read_buf.len(),
        });
        self.fill_from_register(address, register, read_buf);
        Ok(())
    }

    fn write_register(&mut self, address: u8, reg: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.check_fault()?;
        self.log.record(Event::I2cWriteRegister {
            address,
            register: reg,
            bytes: data.to_vec(),
        });
        self.state
            .borrow_mut()
            .regs
            .insert((address, reg), data.to_vec());
        Ok(())
    }
}

impl I2cDma for MockI2c {
    fn data_register(&self) -> *mut u8 {
        self.data_reg.as_ptr()
    }

    fn load_target_address(&mut self, address: u8) {
        self.target.set(Some(address));
        self.log.record(Event::I2cTargetLoaded { address });
    }
}
