//! ECG FIFO decoding utilities.

use crate::error::Result;
use crate::interface::Max30003Interface;
use crate::registers::{EcgFifoWord, Register};

/// Sample tag carried in `ECG_FIFO[5:3]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EcgTag {
    /// Valid sample.
    Valid,
    /// Sample taken while fast recovery was active.
    Fast,
    /// Last valid sample before the FIFO emptied.
    ValidEof,
    /// Last fast-recovery sample before the FIFO emptied.
    FastEof,
    /// FIFO was empty; the sample is not meaningful.
    Empty,
    /// FIFO overflowed; a `FIFO_RST` is required.
    Overflow,
    /// Reserved encoding.
    Reserved(u8),
}

impl EcgTag {
    /// Returns `true` for tags carrying a usable sample.
    pub const fn has_sample(self) -> bool {
        matches!(self, Self::Valid | Self::Fast | Self::ValidEof | Self::FastEof)
    }
}

impl From<u8> for EcgTag {
    fn from(value: u8) -> Self {
        match value & 0b111 {
            0b000 => Self::Valid,
            0b001 => Self::Fast,
            0b010 => Self::ValidEof,
            0b011 => Self::FastEof,
            0b110 => Self::Empty,
            0b111 => Self::Overflow,
            other => Self::Reserved(other),
        }
    }
}

/// A decoded `ECG_FIFO` read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EcgFrame {
    /// Sign-extended ADC code, not voltage scaled.
    pub sample: i32,
    /// Tag describing the sample.
    pub tag: EcgTag,
}

impl EcgFrame {
    /// Decodes a raw 24-bit `ECG_FIFO` word.
    pub fn from_raw(raw: u32) -> Self {
        let word = EcgFifoWord::from(raw);
        Self {
            sample: decode_sample(raw),
            tag: EcgTag::from(word.etag()),
        }
    }
}

/// Extracts the 18-bit two's complement sample from bits 23:6 of a FIFO word.
///
/// Shifting left by 8 places the sample's sign bit at bit 31; the arithmetic shift right by 14
/// then drops the tag bits and sign-extends.
#[inline]
pub fn decode_sample(raw: u32) -> i32 {
    ((raw << 8) as i32) >> 14
}

/// Reads and decodes a single `ECG_FIFO` entry.
pub fn read_frame<IFACE>(interface: &mut IFACE) -> Result<EcgFrame, IFACE::Error>
where
    IFACE: Max30003Interface,
{
    let raw = interface.read_register(Register::EcgFifo.address())?;
    Ok(EcgFrame::from_raw(raw))
}
