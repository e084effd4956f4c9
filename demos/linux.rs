//! Reads distances from a VL53L0X on `/dev/i2c-1`, moving it to `0x30` first.

use vl53l0x::i2cdev::linux::LinuxI2CDevice;
use vl53l0x::{wait::StdTick, Error, Vl53l0x};

const NEW_ADDRESS: u8 = 0x30;

fn main() -> anyhow::Result<()> {
    let mut dev = LinuxI2CDevice::new("/dev/i2c-1", vl53l0x::DEFAULT_ADDRESS.into())?;
    let mut vl53 = Vl53l0x::new(StdTick::new());

    vl53.set_address(&mut dev, NEW_ADDRESS)?;
    dev.set_slave_address(NEW_ADDRESS.into())?;

    vl53.init(&mut dev)?;

    loop {
        match vl53.get_distance(&mut dev) {
            Ok(distance) => println!("{} mm", distance),
            Err(Error::Timeout) => println!("timeout"),
            Err(e) => return Err(e.into()),
        }
    }
}
