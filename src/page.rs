//! Access to the sensor's internal register page.
//!
//! A handful of undocumented registers are only reachable after a three-write
//! unlock sequence, which has to be undone in reverse afterwards. [`PageGuard`]
//! ties the unlock to a scope so the page is always closed again, including
//! when a transaction in between fails.

use crate::{i2c::RegisterAccess, BringUp};

#[cfg(feature = "tracing")]
use tracing::warn;

/// `(register, value)` writes that open the page. Closing undoes them in
/// reverse with the values in [`CLOSE`].
const OPEN: [(u8, u8); 3] = [(0x80, 0x01), (0xff, 0x01), (0x00, 0x00)];
/// Value written to undo the matching entry of [`OPEN`].
const CLOSE: [u8; 3] = [0x00, 0x00, 0x01];

pub(crate) struct PageGuard<'a, D: RegisterAccess> {
    dev: &'a mut D,
    policy: BringUp,
    /// Number of entries of [`OPEN`] that have been issued.
    opened: usize,
}

impl<'a, D: RegisterAccess> PageGuard<'a, D> {
    /// Open the page. If one of the opening writes fails, the ones already
    /// issued are undone before the error is returned.
    pub fn open(dev: &'a mut D, policy: BringUp) -> Result<Self, D::Error> {
        let mut guard = Self {
            dev,
            policy,
            opened: 0,
        };

        for (reg, value) in OPEN {
            let res = guard.dev.write_register(reg, value);
            guard.policy.check(reg, res)?;
            guard.opened += 1;
        }

        Ok(guard)
    }

    pub fn read(&mut self, reg: u8) -> Result<u8, D::Error> {
        self.dev.read_register(reg)
    }

    pub fn write(&mut self, reg: u8, value: u8) -> Result<(), D::Error> {
        let res = self.dev.write_register(reg, value);
        self.policy.check(reg, res)
    }

    /// Close the page, reporting the first failing closing write. The
    /// remaining closing writes are still attempted.
    pub fn close(mut self) -> Result<(), D::Error> {
        let mut first = Ok(());

        while let Some((reg, value)) = self.pop() {
            let res = self.dev.write_register(reg, value);
            if let Err(e) = self.policy.check(reg, res) {
                #[cfg(feature = "tracing")]
                warn!("failed to close register page at {:#04x}: {:?}", reg, e);
                if first.is_ok() {
                    first = Err(e);
                }
            }
        }

        first
    }

    /// Next closing write, in reverse order of opening.
    fn pop(&mut self) -> Option<(u8, u8)> {
        self.opened = self.opened.checked_sub(1)?;
        Some((OPEN[self.opened].0, CLOSE[self.opened]))
    }
}

impl<D: RegisterAccess> Drop for PageGuard<'_, D> {
    fn drop(&mut self) {
        while let Some((reg, value)) = self.pop() {
            if let Err(_e) = self.dev.write_register(reg, value) {
                #[cfg(feature = "tracing")]
                warn!("failed to close register page at {:#04x}: {:?}", reg, _e);
            }
        }
    }
}
