use core::fmt;

/// Everything that can go wrong while talking to the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// The register transport failed.
    Transport(E),
    /// The identification register did not hold [`crate::MODEL_ID`].
    UnexpectedDevice(u8),
    /// No measurement became ready within the configured number of ticks.
    Timeout,
}

impl<E> From<E> for Error<E> {
    fn from(value: E) -> Self {
        Self::Transport(value)
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Transport(e) => write!(f, "register transport failed: {e:?}"),
            Error::UnexpectedDevice(id) => write!(f, "unexpected model id {id:#04x}"),
            Error::Timeout => f.write_str("timed out waiting for range ready"),
        }
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug> std::error::Error for Error<E> {}
