//! I2C bus abstractions
//!
//! Provides traits for I2C master operations. [`I2cBus`] is the synchronous,
//! blocking surface every polling driver uses; [`I2cDma`] adds the two raw
//! hooks the DMA push engine needs on top of it. Clock speed and pin setup
//! belong to the implementing HAL; drivers receive a ready-to-use master.

/// I2C bus master
///
/// Provides basic I2C read/write operations for communicating with
/// peripheral devices.
pub trait I2cBus {
    /// Error type for I2C operations
    type Error;

    /// Write data to a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `data` - Bytes to write
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Read data from a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `buf` - Buffer to read into
    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Write then read in a single transaction (repeated start)
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `write_data` - Bytes to write (typically a register address)
    /// * `read_buf` - Buffer to read into
    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error>;

    /// Write `data` to the register `reg` of the device at `address`
    ///
    /// Required rather than defaulted because implementations usually have a
    /// cheaper path than concatenating into a scratch buffer (hardware
    /// address phases, linked transfers).
    fn write_register(&mut self, address: u8, reg: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Read from the register `reg` of the device at `address`
    fn read_register(
        &mut self,
        address: u8,
        reg: u8,
        buf: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.write_read(address, &[reg], buf)
    }
}

/// I2C master whose transmit path can be fed by a DMA channel
///
/// The push engine programs the DMA destination with [`data_register`] once
/// at configuration and calls [`load_target_address`] immediately before
/// arming each burst; the hardware then clocks the burst out on its own.
///
/// [`data_register`]: I2cDma::data_register
/// [`load_target_address`]: I2cDma::load_target_address
pub trait I2cDma: I2cBus {
    /// Raw address of the peripheral's transmit data register
    ///
    /// Used as the fixed (non-incrementing) DMA destination.
    fn data_register(&self) -> *mut u8;

    /// Program the bus target-address register with a 7-bit device address
    ///
    /// Starts the addressed write transaction that the DMA burst completes.
    /// Must only be called while no burst is in flight.
    fn load_target_address(&mut self, address: u8);
}
