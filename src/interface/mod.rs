//! Bus interface abstraction for the MAX30003 driver.

pub mod spi;

/// Mask selecting the 24 payload bits of a register frame.
pub const FRAME_MASK: u32 = 0x00FF_FFFF;

/// Mask selecting the 7 address bits of a register command.
pub const ADDRESS_MASK: u8 = 0x7F;

/// Abstraction over the low-level bus access required by the driver.
///
/// Every MAX30003 register is 24 bits wide. Implementations transfer exactly one register per
/// call and must never split a frame across two device selections.
pub trait Max30003Interface {
    /// Error type produced by the concrete bus implementation.
    type Error;

    /// Writes the low 24 bits of `value` to a single register.
    fn write_register(&mut self, address: u8, value: u32) -> core::result::Result<(), Self::Error>;

    /// Reads a single register. Only the low 24 bits of the result are populated.
    fn read_register(&mut self, address: u8) -> core::result::Result<u32, Self::Error>;
}
