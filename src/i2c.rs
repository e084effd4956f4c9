//! [I²C](https://en.wikipedia.org/wiki/I%C2%B2C) abstractions.

use core::fmt::Debug;

use embedded_hal::i2c::I2c;

#[cfg(feature = "tracing")]
use tracing::trace;

/// Single-byte register access to the sensor.
///
/// This is the device handle every [`crate::Vl53l0x`] operation borrows. It
/// is owned by the caller and identifies one physical sensor on the bus.
pub trait RegisterAccess {
    /// Transport error, passed through to the caller unchanged.
    type Error: Debug;

    /// Read one byte from register `reg`.
    fn read_register(&mut self, reg: u8) -> Result<u8, Self::Error>;

    /// Write `value` into register `reg`.
    fn write_register(&mut self, reg: u8, value: u8) -> Result<(), Self::Error>;
}

impl<T: RegisterAccess + ?Sized> RegisterAccess for &mut T {
    type Error = T::Error;

    #[inline]
    fn read_register(&mut self, reg: u8) -> Result<u8, Self::Error> {
        (**self).read_register(reg)
    }

    #[inline]
    fn write_register(&mut self, reg: u8, value: u8) -> Result<(), Self::Error> {
        (**self).write_register(reg, value)
    }
}

/// A sensor at `addr` on an [`embedded_hal`] I²C bus.
///
/// [`crate::Vl53l0x::set_address`] only tells the sensor to move; update
/// `addr` afterwards so that later calls reach it.
#[derive(Debug)]
pub struct Device<M: I2c> {
    /// 7-bit address the sensor currently answers on.
    pub addr: u8,
    /// The bus.
    pub i2c: M,
}

impl<M: I2c> Device<M> {
    /// Sensor at the factory default address.
    pub fn new(i2c: M) -> Self {
        Self {
            addr: crate::DEFAULT_ADDRESS,
            i2c,
        }
    }

    /// Give the bus back.
    pub fn release(self) -> M {
        self.i2c
    }
}

impl<M: I2c> RegisterAccess for Device<M> {
    type Error = M::Error;

    fn read_register(&mut self, reg: u8) -> Result<u8, Self::Error> {
        let mut buf = [0];
        #[cfg(feature = "tracing")]
        trace!("read {:#04x} @ {:#04x}", reg, self.addr);
        self.i2c.write_read(self.addr, &[reg], &mut buf)?;
        Ok(buf[0])
    }

    fn write_register(&mut self, reg: u8, value: u8) -> Result<(), Self::Error> {
        #[cfg(feature = "tracing")]
        trace!("write {:#04x} = {:#04x} @ {:#04x}", reg, value, self.addr);
        self.i2c.write(self.addr, &[reg, value])
    }
}

#[cfg(feature = "i2cdev")]
mod linux {
    use i2cdev::{
        core::I2CDevice,
        linux::{LinuxI2CDevice, LinuxI2CError},
    };

    #[cfg(feature = "tracing")]
    use tracing::trace;

    use super::RegisterAccess;

    impl RegisterAccess for LinuxI2CDevice {
        type Error = LinuxI2CError;

        fn read_register(&mut self, reg: u8) -> Result<u8, LinuxI2CError> {
            #[cfg(feature = "tracing")]
            trace!("read {:#04x}", reg);
            self.smbus_read_byte_data(reg)
        }

        fn write_register(&mut self, reg: u8, value: u8) -> Result<(), LinuxI2CError> {
            #[cfg(feature = "tracing")]
            trace!("write {:#04x} = {:#04x}", reg, value);
            self.smbus_write_byte_data(reg, value)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::vec::Vec;

    use embedded_hal::i2c::{ErrorKind, ErrorType, Operation, SevenBitAddress};

    use super::*;

    /// Records raw I²C frames as `(addr, bytes written)`.
    #[derive(Default)]
    struct Frames {
        sent: Vec<(u8, Vec<u8>)>,
        reply: u8,
    }

    impl ErrorType for Frames {
        type Error = ErrorKind;
    }

    impl I2c for Frames {
        fn transaction(
            &mut self,
            address: SevenBitAddress,
            operations: &mut [Operation<'_>],
        ) -> Result<(), ErrorKind> {
            for op in operations {
                match op {
                    Operation::Write(bytes) => self.sent.push((address, bytes.to_vec())),
                    Operation::Read(buf) => buf.fill(self.reply),
                }
            }
            Ok(())
        }
    }

    #[test]
    fn write_sends_register_then_value() {
        let mut dev = Device::new(Frames::default());
        dev.write_register(0x8a, 0x30).unwrap();
        assert_eq!(dev.i2c.sent, [(0x29, std::vec![0x8a, 0x30])]);
    }

    #[test]
    fn read_selects_register_on_current_address() {
        let mut dev = Device::new(Frames {
            reply: 0xee,
            ..Default::default()
        });
        dev.addr = 0x30;
        assert_eq!(dev.read_register(0xc0).unwrap(), 0xee);
        assert_eq!(dev.i2c.sent, [(0x30, std::vec![0xc0])]);
    }
}
