//! Blocking driver for the [VL53L0X ToF distance sensor](https://www.st.com/en/imaging-and-photonics-solutions/vl53l0x.html).
//!
//! ```no_run
//! use vl53l0x::{wait::StdTick, Vl53l0x};
//! use vl53l0x::i2cdev::linux::LinuxI2CDevice;
//!
//! let mut dev = LinuxI2CDevice::new("/dev/i2c-1", vl53l0x::DEFAULT_ADDRESS.into())?;
//! let mut vl53 = Vl53l0x::new(StdTick::new());
//!
//! vl53.init(&mut dev)?;
//!
//! loop {
//!     let distance = vl53.get_distance(&mut dev)?;
//!     println!("{} mm", distance);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The sensor is never owned by the driver. Every operation borrows a
//! [`RegisterAccess`] handle for the duration of the call, so one driver value
//! can serve several sensors as long as the caller hands over the right one.

#![warn(missing_docs)]
#![no_std]

#[cfg(any(test, feature = "std"))]
extern crate std;

#[cfg(feature = "i2cdev")]
pub use i2cdev;

mod error;
pub mod i2c;
#[cfg(test)]
mod mock;
mod page;
pub mod wait;

pub use error::Error;
pub use i2c::{Device, RegisterAccess};
pub use wait::Tick;

use page::PageGuard;

#[cfg(feature = "tracing")]
use tracing::{debug, error, instrument, warn};

#[derive(Debug, Clone, Copy)]
#[allow(non_camel_case_types)]
enum Register {
    SYSRANGE_START = 0x00,
    SYSTEM_INTERRUPT_CLEAR = 0x0b,
    RESULT_INTERRUPT_STATUS = 0x13,
    RESULT_RANGE_VALUE_HI = 0x1e,
    RESULT_RANGE_VALUE_LO = 0x1f,
    I2C_SLAVE_DEVICE_ADDRESS = 0x8a,
    IDENTIFICATION_MODEL_ID = 0xc0,
}

impl Register {
    const fn addr(&self) -> u8 {
        *self as u8
    }
}

/// Undocumented, selects standard I<sup>2</sup>C mode during bring-up.
const I2C_MODE: u8 = 0x88;
/// Only reachable inside a [`PageGuard`].
const STOP_VARIABLE: u8 = 0x91;

/// Values written to `SYSRANGE_START`.
mod mode {
    pub const STOP: u8 = 0x00;
    pub const SINGLE_SHOT: u8 = 0x01;
    pub const CONTINUOUS: u8 = 0x03;
}

/// Default I<sup>2</sup>C address of the VL53L0X.
pub const DEFAULT_ADDRESS: u8 = 0x29;

/// Value of the identification register on a genuine VL53L0X.
pub const MODEL_ID: u8 = 0xee;

/// Default budget for [`Vl53l0x::get_distance`], in [`Tick`] units.
pub const DEFAULT_TIMEOUT_TICKS: u32 = 500;

/// How [`Vl53l0x::init`] treats failing writes in the bring-up sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BringUp {
    /// Abort on the first failing transaction, closing the register page
    /// first if it is open.
    #[default]
    Strict,
    /// Log failing bring-up writes and carry on. Reads are still checked.
    Lenient,
}

impl BringUp {
    fn check<E: core::fmt::Debug>(self, _reg: u8, res: Result<(), E>) -> Result<(), E> {
        match (self, res) {
            (BringUp::Lenient, Err(_e)) => {
                #[cfg(feature = "tracing")]
                warn!("ignoring failed bring-up write to {:#04x}: {:?}", _reg, _e);
                Ok(())
            }
            (_, res) => res,
        }
    }
}

/// Driver configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Ticks [`Vl53l0x::get_distance`] waits for a range before giving up.
    pub timeout_ticks: u32,
    /// Error policy of [`Vl53l0x::init`].
    pub bring_up: BringUp,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout_ticks: DEFAULT_TIMEOUT_TICKS,
            bring_up: BringUp::Strict,
        }
    }
}

/// A VL53L0X ToF range sensor driver.
pub struct Vl53l0x<T> {
    tick: T,
    config: Config,
}

impl<T: Tick> Vl53l0x<T> {
    /// Construct a driver with the default [`Config`]. Nothing is sent to
    /// the sensor until [`Self::init`].
    pub fn new(tick: T) -> Self {
        Self::with_config(tick, Config::default())
    }

    /// Construct a driver with an explicit [`Config`].
    pub fn with_config(tick: T, config: Config) -> Self {
        Self { tick, config }
    }

    /// The active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Give the tick source back.
    pub fn release(self) -> T {
        self.tick
    }

    /// Tell the sensor to answer on the 7-bit address `addr` from now on.
    ///
    /// The address is written as is. The handle itself is left alone: update
    /// its address (e.g. [`Device::addr`]) before the next call.
    pub fn set_address<D: RegisterAccess>(
        &self,
        dev: &mut D,
        addr: u8,
    ) -> Result<(), Error<D::Error>> {
        dev.write_register(Register::I2C_SLAVE_DEVICE_ADDRESS.addr(), addr)?;
        Ok(())
    }

    /// Read the identification register.
    pub fn model_id<D: RegisterAccess>(&self, dev: &mut D) -> Result<u8, Error<D::Error>> {
        Ok(dev.read_register(Register::IDENTIFICATION_MODEL_ID.addr())?)
    }

    /// Check the model id and run the bring-up sequence.
    ///
    /// # Errors
    ///
    /// - [`Error::UnexpectedDevice`] if the sensor does not report
    ///   [`MODEL_ID`]. Nothing is written in that case.
    /// - [`Error::Transport`] on the first failing transaction, subject to
    ///   [`Config::bring_up`].
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
    pub fn init<D: RegisterAccess>(&self, dev: &mut D) -> Result<(), Error<D::Error>> {
        let id = self.model_id(dev)?;
        if id != MODEL_ID {
            #[cfg(feature = "tracing")]
            error!("strange device id ({:#04x})", id);
            return Err(Error::UnexpectedDevice(id));
        }

        let policy = self.config.bring_up;

        policy.check(I2C_MODE, dev.write_register(I2C_MODE, 0x00))?;

        let mut page = PageGuard::open(dev, policy)?;
        let stop_variable = page.read(STOP_VARIABLE)?;
        page.close()?;

        #[cfg(feature = "tracing")]
        debug!("stop variable {:#04x}", stop_variable);

        let mut page = PageGuard::open(dev, policy)?;
        page.write(STOP_VARIABLE, stop_variable)?;
        page.close()?;

        let start = Register::SYSRANGE_START.addr();
        policy.check(start, dev.write_register(start, mode::SINGLE_SHOT))?;

        #[cfg(feature = "tracing")]
        debug!("initialized");

        Ok(())
    }

    /// Begin continuous ranging.
    #[inline]
    pub fn start_ranging<D: RegisterAccess>(&self, dev: &mut D) -> Result<(), Error<D::Error>> {
        dev.write_register(Register::SYSRANGE_START.addr(), mode::CONTINUOUS)?;
        Ok(())
    }

    /// Stop ranging.
    #[inline]
    pub fn stop_ranging<D: RegisterAccess>(&self, dev: &mut D) -> Result<(), Error<D::Error>> {
        dev.write_register(Register::SYSRANGE_START.addr(), mode::STOP)?;
        Ok(())
    }

    /// Trigger a single-shot range, wait for it and return the distance.
    ///
    /// Polls for at most [`Config::timeout_ticks`] and clears the interrupt
    /// afterwards so that the next range can start.
    ///
    /// # Errors
    ///
    /// - [`Error::Timeout`] if the range is not ready in time. The result
    ///   registers are not touched in that case.
    /// - [`Error::Transport`] on the first failing transaction. If only
    ///   clearing the interrupt fails, the distance already read is dropped.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
    pub fn get_distance<D: RegisterAccess>(&mut self, dev: &mut D) -> Result<u16, Error<D::Error>> {
        if let Err(e) = dev.write_register(Register::SYSRANGE_START.addr(), mode::SINGLE_SHOT) {
            #[cfg(feature = "tracing")]
            error!("failed to start range: {:?}", e);
            return Err(Error::Transport(e));
        }

        wait::wait_for_measurement(dev, &mut self.tick, self.config.timeout_ticks)?;

        let distance = self.read_distance(dev)?;

        if let Err(e) = self.clear_interrupt(dev) {
            #[cfg(feature = "tracing")]
            {
                error!("failed to clear interrupt: {}", e);
                warn!("discarding distance {}", distance);
            }
            return Err(e);
        }

        Ok(distance)
    }

    /// Check if the sensor has a range ready. Unless you are driving
    /// continuous ranging by hand, use [`Self::get_distance`] instead.
    #[inline]
    pub fn has_measurement<D: RegisterAccess>(
        &self,
        dev: &mut D,
    ) -> Result<bool, Error<D::Error>> {
        Ok(wait::has_measurement(dev)?)
    }

    /// Read the current range. Wait for [`Self::has_measurement`] first and
    /// call [`Self::clear_interrupt`] afterwards.
    ///
    /// ```no_run
    /// # use vl53l0x::{wait::StdTick, Vl53l0x};
    /// # use vl53l0x::i2cdev::linux::LinuxI2CDevice;
    /// #
    /// # let mut dev = LinuxI2CDevice::new("/dev/i2c-1", 0x29)?;
    /// # let vl53 = Vl53l0x::new(StdTick::new());
    /// #
    /// vl53.start_ranging(&mut dev)?;
    ///
    /// loop {
    ///     while !vl53.has_measurement(&mut dev)? {}
    ///
    ///     let distance = vl53.read_distance(&mut dev)?;
    ///     vl53.clear_interrupt(&mut dev)?;
    ///
    ///     println!("{} mm", distance);
    /// }
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[inline]
    pub fn read_distance<D: RegisterAccess>(&self, dev: &mut D) -> Result<u16, Error<D::Error>> {
        let hi = dev.read_register(Register::RESULT_RANGE_VALUE_HI.addr())?;
        let lo = dev.read_register(Register::RESULT_RANGE_VALUE_LO.addr())?;
        Ok(u16::from_be_bytes([hi, lo]))
    }

    /// Clear the interrupt, letting the sensor produce the next range.
    #[inline]
    pub fn clear_interrupt<D: RegisterAccess>(&self, dev: &mut D) -> Result<(), Error<D::Error>> {
        dev.write_register(Register::SYSTEM_INTERRUPT_CLEAR.addr(), 0x01)?;
        Ok(())
    }
}
