//! The VL53L0X sets the low bits of `RESULT_INTERRUPT_STATUS` once a range
//! is ready. This module polls for that, bounded by a [`Tick`] source.

use crate::{i2c::RegisterAccess, Error, Register};

#[cfg(feature = "tracing")]
use tracing::error;

/// A monotonically increasing counter used to bound polling.
///
/// The counter may wrap; elapsed time is computed with wrapping arithmetic.
/// Its unit is whatever [`crate::Config::timeout_ticks`] is expressed in.
pub trait Tick {
    /// Current counter value.
    fn ticks(&mut self) -> u32;
}

impl<T: Tick + ?Sized> Tick for &mut T {
    #[inline]
    fn ticks(&mut self) -> u32 {
        (**self).ticks()
    }
}

/// Milliseconds since construction, from [`std::time::Instant`].
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct StdTick(std::time::Instant);

#[cfg(feature = "std")]
impl StdTick {
    /// Start counting from now.
    pub fn new() -> Self {
        Self(std::time::Instant::now())
    }
}

#[cfg(feature = "std")]
impl Default for StdTick {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Tick for StdTick {
    fn ticks(&mut self) -> u32 {
        self.0.elapsed().as_millis() as u32
    }
}

/// Mask over `RESULT_INTERRUPT_STATUS` that is nonzero once a range is ready.
const RANGE_READY_MASK: u8 = 0x07;

pub(crate) fn has_measurement<D>(dev: &mut D) -> Result<bool, D::Error>
where
    D: RegisterAccess,
{
    let status = dev.read_register(Register::RESULT_INTERRUPT_STATUS.addr())?;
    Ok(status & RANGE_READY_MASK != 0)
}

/// Poll until a range is ready or `timeout` ticks have passed since the first
/// poll. The status register is always read at least once.
pub(crate) fn wait_for_measurement<D, T>(
    dev: &mut D,
    tick: &mut T,
    timeout: u32,
) -> Result<(), Error<D::Error>>
where
    D: RegisterAccess,
    T: Tick,
{
    let start = tick.ticks();

    loop {
        match has_measurement(dev) {
            Ok(true) => return Ok(()),
            Ok(false) => {}
            Err(e) => {
                #[cfg(feature = "tracing")]
                error!("error reading interrupt status: {:?}", e);
                return Err(Error::Transport(e));
            }
        }

        if tick.ticks().wrapping_sub(start) >= timeout {
            #[cfg(feature = "tracing")]
            error!("timeout waiting for range ready");
            return Err(Error::Timeout);
        }

        core::hint::spin_loop();
    }
}
