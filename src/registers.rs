//! Register map definitions for the MAX30003 ECG analog front-end.
//!
//! Every register is 24 bits wide. Bitfield structs below are declared least-significant field
//! first, matching `modular-bitfield` packing, and convert to and from the `u32` frame carried
//! by [`Max30003Interface`](crate::interface::Max30003Interface).
//!
//! Some enum-typed fields do not assign every bit pattern. Their plain getters panic when a
//! reserved pattern is present, so words read back from the device should be decoded with the
//! generated `*_or_err` getters, which return the raw bits on failure.
#![allow(unused_parens)]

use modular_bitfield::prelude::*;

use crate::params::{
    BiasMode, BiasResistance, CalibrationInput, CalibrationMagnitude, CalibrationMode,
    DcLeadOffCurrent, DcLeadOffMode, DcLeadOffPolarity, DcLeadOffThreshold, EcgChannel, EcgGain,
    EcgRate, HighPassFilter, InputPolarity, InputSwitch, LowPassFilter, MasterClock,
    PeakAveraging, RtorDetector, RtorGain, RtorWindow,
};

/// Access permissions encoded for each register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterAccess {
    /// Read-only register.
    ReadOnly,
    /// Write-only register. Writes to command registers trigger an action; the payload is ignored.
    WriteOnly,
    /// Read/write register.
    ReadWrite,
}

/// Addressable MAX30003 registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Register {
    /// `NO_OP`.
    NoOp = 0x00,
    /// `STATUS`.
    Status = 0x01,
    /// `EN_INT`, INTB interrupt enables.
    EnInt = 0x02,
    /// `EN_INT2`, INT2B interrupt enables.
    EnInt2 = 0x03,
    /// `MNGR_INT`, interrupt management.
    MngrInt = 0x04,
    /// `MNGR_DYN`, dynamic mode management.
    MngrDyn = 0x05,
    /// `SW_RST`, software reset command.
    SwReset = 0x08,
    /// `SYNCH`, synchronization command.
    Synch = 0x09,
    /// `FIFO_RST`, FIFO reset command.
    FifoReset = 0x0A,
    /// `INFO`, revision and part identification.
    Info = 0x0F,
    /// `CNFG_GEN`, general configuration.
    CnfgGen = 0x10,
    /// `CNFG_CAL`, calibration source configuration.
    CnfgCal = 0x12,
    /// `CNFG_EMUX`, input multiplexer configuration.
    CnfgEmux = 0x14,
    /// `CNFG_ECG`, ECG channel configuration.
    CnfgEcg = 0x15,
    /// `CNFG_RTOR1`, R-to-R detector configuration.
    CnfgRtor1 = 0x1D,
    /// `CNFG_RTOR2`, R-to-R detector timing configuration.
    CnfgRtor2 = 0x1E,
    /// `ECG_FIFO_BURST`, burst-mode ECG FIFO read.
    EcgFifoBurst = 0x20,
    /// `ECG_FIFO`, single ECG FIFO read.
    EcgFifo = 0x21,
    /// `RTOR`, latest R-to-R interval.
    Rtor = 0x25,
    /// `NO_OP` mirror at the top of the address space.
    NoOpHigh = 0x7F,
}

impl Register {
    /// Returns the 7-bit register address.
    pub const fn address(self) -> u8 {
        self as u8
    }

    /// Returns the access classification documented in the datasheet.
    pub const fn access(self) -> RegisterAccess {
        match self {
            Self::NoOp | Self::NoOpHigh => RegisterAccess::ReadWrite,
            Self::Status
            | Self::Info
            | Self::EcgFifoBurst
            | Self::EcgFifo
            | Self::Rtor => RegisterAccess::ReadOnly,
            Self::SwReset | Self::Synch | Self::FifoReset => RegisterAccess::WriteOnly,
            Self::EnInt
            | Self::EnInt2
            | Self::MngrInt
            | Self::MngrDyn
            | Self::CnfgGen
            | Self::CnfgCal
            | Self::CnfgEmux
            | Self::CnfgEcg
            | Self::CnfgRtor1
            | Self::CnfgRtor2 => RegisterAccess::ReadWrite,
        }
    }
}

impl From<Register> for u8 {
    fn from(value: Register) -> Self {
        value.address()
    }
}

/// Payload written to `SW_RST`, `FIFO_RST` and `SYNCH`. The command fires on the write itself.
pub const COMMAND_PAYLOAD: u32 = 0x00_0000;

/// Mask applied to `INFO` before comparing against [`EXPECTED_INFO_ID`].
pub const INFO_ID_MASK: u32 = 0x00_00F0;
/// Expected masked `INFO` value for a MAX30003.
pub const EXPECTED_INFO_ID: u32 = 0x00_0050;

/// Minimal metadata exposed by every register value type.
pub trait RegisterValue: Copy + From<u32> + Into<u32> {
    /// Register the value belongs to.
    const REGISTER: Register;
}

macro_rules! impl_register_word {
    ($ty:ty, $reg:expr) => {
        impl From<u32> for $ty {
            fn from(value: u32) -> Self {
                let [_, b2, b1, b0] = value.to_be_bytes();
                Self::from_bytes([b0, b1, b2])
            }
        }

        impl From<$ty> for u32 {
            fn from(value: $ty) -> Self {
                let [b0, b1, b2] = value.into_bytes();
                u32::from_le_bytes([b0, b1, b2, 0])
            }
        }

        impl RegisterValue for $ty {
            const REGISTER: Register = $reg;
        }
    };
}

/// Bitfield representation of the `STATUS` register (address `0x01`).
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    // ECGN below VMID - VTH (bit 0).
    pub ldoff_nl: bool,
    // ECGN above VMID + VTH (bit 1).
    pub ldoff_nh: bool,
    // ECGP below VMID - VTH (bit 2).
    pub ldoff_pl: bool,
    // ECGP above VMID + VTH, DC lead-off (bit 3).
    pub ldoff_ph: bool,
    #[skip]
    __: B4,
    // PLL unlocked (bit 8).
    pub pllint: bool,
    // Sample synchronization pulse (bit 9).
    pub samp: bool,
    // R-to-R interval ready (bit 10).
    pub rrint: bool,
    // Ultra-low-power lead-on detected (bit 11).
    pub lonint: bool,
    #[skip]
    __: B8,
    // DC lead-off detected (bit 20).
    pub dcloffint: bool,
    // ECG fast recovery active (bit 21).
    pub fstint: bool,
    // ECG FIFO overflow (bit 22).
    pub eovf: bool,
    // ECG FIFO interrupt (bit 23).
    pub eint: bool,
}

impl_register_word!(Status, Register::Status);

/// Status bit masks, usable against the raw `STATUS` word or `EN_INT` enables.
pub mod status {
    /// ECG FIFO interrupt.
    pub const EINT: u32 = 1 << 23;
    /// ECG FIFO overflow.
    pub const EOVF: u32 = 1 << 22;
    /// ECG fast recovery.
    pub const FSTINT: u32 = 1 << 21;
    /// DC lead-off interrupt.
    pub const DCLOFFINT: u32 = 1 << 20;
    /// Ultra-low-power lead-on.
    pub const LONINT: u32 = 1 << 11;
    /// R-to-R interval ready.
    pub const RRINT: u32 = 1 << 10;
    /// Sample synchronization pulse.
    pub const SAMP: u32 = 1 << 9;
    /// PLL unlocked.
    pub const PLLINT: u32 = 1 << 8;
    /// ECGP above threshold.
    pub const LDOFF_PH: u32 = 1 << 3;
    /// ECGP below threshold.
    pub const LDOFF_PL: u32 = 1 << 2;
    /// ECGN above threshold.
    pub const LDOFF_NH: u32 = 1 << 1;
    /// ECGN below threshold.
    pub const LDOFF_NL: u32 = 1 << 0;
}

/// Bitfield representation of the `CNFG_GEN` register (address `0x10`).
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneralConfig {
    // Negative input resistive bias enable (bit 0).
    pub rbiasn: bool,
    // Positive input resistive bias enable (bit 1).
    pub rbiasp: bool,
    // Resistive bias value (bits 3:2).
    pub rbiasv: BiasResistance,
    // Resistive bias mode (bits 5:4).
    pub en_rbias: BiasMode,
    // DC lead-off threshold (bits 7:6).
    pub dcloff_vth: DcLeadOffThreshold,
    // DC lead-off current magnitude (bits 10:8).
    pub dcloff_imag: DcLeadOffCurrent,
    // DC lead-off current polarity (bit 11).
    pub dcloff_ipol: DcLeadOffPolarity,
    // DC lead-off detection mode (bits 13:12).
    pub en_dcloff: DcLeadOffMode,
    #[skip]
    __: B5,
    // ECG channel enable (bit 19).
    pub en_ecg: EcgChannel,
    // Master clock selection (bits 21:20).
    pub fmstr: MasterClock,
    // Ultra-low-power lead-on detection (bits 23:22).
    pub en_ulp_lon: B2,
}

impl_register_word!(GeneralConfig, Register::CnfgGen);

/// Bitfield representation of the `CNFG_CAL` register (address `0x12`).
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationConfig {
    // Calibration pulse high time (bits 10:0).
    pub thigh: B11,
    // Fixed 50% duty cycle (bit 11).
    pub fifty: bool,
    // Calibration frequency selection (bits 14:12).
    pub fcal: B3,
    #[skip]
    __: B5,
    // Calibration magnitude (bit 20).
    pub vmag: CalibrationMagnitude,
    // Calibration mode (bit 21).
    pub vmode: CalibrationMode,
    // Calibration source enable (bit 22).
    pub en_vcal: bool,
    #[skip]
    __: B1,
}

impl_register_word!(CalibrationConfig, Register::CnfgCal);

/// Bitfield representation of the `CNFG_EMUX` register (address `0x14`).
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MuxConfig {
    #[skip]
    __: B16,
    // ECGN calibration selection (bits 17:16).
    pub caln_sel: CalibrationInput,
    // ECGP calibration selection (bits 19:18).
    pub calp_sel: CalibrationInput,
    // ECGN input switch (bit 20).
    pub openn: InputSwitch,
    // ECGP input switch (bit 21).
    pub openp: InputSwitch,
    #[skip]
    __: B1,
    // Input polarity (bit 23).
    pub pol: InputPolarity,
}

impl_register_word!(MuxConfig, Register::CnfgEmux);

/// Bitfield representation of the `CNFG_ECG` register (address `0x15`).
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EcgConfig {
    #[skip]
    __: B12,
    // Digital low-pass filter (bits 13:12).
    pub dlpf: LowPassFilter,
    // Digital high-pass filter (bit 14).
    pub dhpf: HighPassFilter,
    #[skip]
    __: B1,
    // Channel gain (bits 17:16).
    pub gain: EcgGain,
    #[skip]
    __: B4,
    // Data rate (bits 23:22).
    pub rate: EcgRate,
}

impl_register_word!(EcgConfig, Register::CnfgEcg);

/// Bitfield representation of the `CNFG_RTOR1` register (address `0x1D`).
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RtorConfig {
    #[skip]
    __: B8,
    // Peak threshold scaling factor, (PTSF + 1) / 16 (bits 11:8).
    pub ptsf: B4,
    // Peak averaging weight (bits 13:12).
    pub pavg: PeakAveraging,
    #[skip]
    __: B1,
    // Detector enable (bit 15).
    pub en_rtor: RtorDetector,
    // Detector gain (bits 19:16).
    pub gain: RtorGain,
    // Averaging window (bits 23:20).
    pub wndw: RtorWindow,
}

impl_register_word!(RtorConfig, Register::CnfgRtor1);

/// Bitfield representation of the `ECG_FIFO` register (address `0x21`).
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EcgFifoWord {
    // Pace tag, unused on the MAX30003 (bits 2:0).
    pub ptag: B3,
    // ECG sample tag (bits 5:3).
    pub etag: B3,
    // Left-justified two's complement sample (bits 23:6).
    pub sample: B18,
}

impl_register_word!(EcgFifoWord, Register::EcgFifo);

/// Bitfield representation of the `RTOR` register (address `0x25`).
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RtorWord {
    #[skip]
    __: B10,
    // R-to-R interval in resolution ticks (bits 23:10).
    pub ticks: B14,
}

impl_register_word!(RtorWord, Register::Rtor);
