//! Error handling primitives for the MAX30003 driver.

/// Crate-wide result type alias.
pub type Result<T, E> = core::result::Result<T, Error<E>>;

/// Error variants produced by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// Any error reported by the underlying bus interface.
    Interface(E),
    /// The provided configuration parameters are invalid.
    InvalidConfig,
    /// The `INFO` register did not identify a MAX30003. Carries the raw word read back.
    DeviceIdMismatch(u32),
}

impl<E> From<E> for Error<E> {
    fn from(err: E) -> Self {
        Self::Interface(err)
    }
}

#[cfg(feature = "defmt")]
impl<E> defmt::Format for Error<E> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Interface(_) => defmt::write!(f, "Interface"),
            Self::InvalidConfig => defmt::write!(f, "InvalidConfig"),
            Self::DeviceIdMismatch(info) => defmt::write!(f, "DeviceIdMismatch({=u32:#x})", info),
        }
    }
}
