//! Strongly typed parameter enumerations for the MAX30003 driver.
//!
//! These enums map directly to datasheet field encodings and are used across
//! [`Config`](crate::config::Config) and the register bitfields. Prefer these
//! types over raw integers to keep configuration values valid and explicit.
//!
//! # Examples
//!
//! ```rust
//! use max30003::params::{EcgGain, LowPassFilter, MasterClock};
//!
//! let clock = MasterClock::Fmstr32000Sps200;
//! let gain = EcgGain::Gain40;
//! let lpf = LowPassFilter::Hz40;
//! assert_eq!(gain.volts_per_volt(), 40);
//! let _ = (clock, lpf);
//! ```

use modular_bitfield::prelude::Specifier;

/// Master clock frequency selection (`CNFG_GEN.FMSTR`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 2]
pub enum MasterClock {
    /// 32768 Hz master clock; ECG rates 512, 256, 128 sps.
    Fmstr32768 = 0b00,
    /// 32000 Hz master clock; ECG rates 500, 250, 125 sps.
    Fmstr32000 = 0b01,
    /// 32000 Hz master clock; ECG rate 200 sps, 8 ms R-to-R resolution.
    Fmstr32000Sps200 = 0b10,
    /// 31968.78 Hz master clock; ECG rate 199.8 sps.
    Fmstr31968 = 0b11,
}

impl MasterClock {
    /// R-to-R timing resolution in nanoseconds.
    ///
    /// The detector counts in units of 256 master clock cycles, so the tick period follows FMSTR:
    /// 7.8125 ms at 32768 Hz, 8 ms at 32000 Hz and about 8.0078 ms at 31968.78 Hz.
    pub const fn rtor_tick_ns(self) -> u32 {
        match self {
            Self::Fmstr32768 => 7_812_500,
            Self::Fmstr32000 | Self::Fmstr32000Sps200 => 8_000_000,
            Self::Fmstr31968 => 8_007_813,
        }
    }
}

/// ECG channel enable bit (`CNFG_GEN.EN_ECG`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 1]
pub enum EcgChannel {
    /// ECG channel powered down.
    Disabled = 0,
    /// ECG channel enabled.
    Enabled = 1,
}

/// DC lead-off detection mode (`CNFG_GEN.EN_DCLOFF`).
///
/// `0b10` and `0b11` are reserved. The plain bitfield getter panics on a reserved pattern, so decode
/// words read back from the device with [`en_dcloff_or_err`](crate::registers::GeneralConfig::en_dcloff_or_err).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 2]
pub enum DcLeadOffMode {
    /// DC lead-off detection disabled.
    Disabled = 0b00,
    /// DC lead-off detection applied to the ECGP/ECGN inputs.
    EcgInputs = 0b01,
}

/// DC lead-off current polarity (`CNFG_GEN.DCLOFF_IPOL`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 1]
pub enum DcLeadOffPolarity {
    /// ECGP pull-up, ECGN pull-down.
    PullUpP = 0,
    /// ECGP pull-down, ECGN pull-up.
    PullDownP = 1,
}

/// DC lead-off current magnitude (`CNFG_GEN.DCLOFF_IMAG`).
///
/// `0b110` and `0b111` are reserved. The plain bitfield getter panics on a reserved pattern, so decode
/// words read back from the device with [`dcloff_imag_or_err`](crate::registers::GeneralConfig::dcloff_imag_or_err).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 3]
pub enum DcLeadOffCurrent {
    /// 0 nA, current sources off.
    Na0 = 0b000,
    /// 5 nA.
    Na5 = 0b001,
    /// 10 nA.
    Na10 = 0b010,
    /// 20 nA.
    Na20 = 0b011,
    /// 50 nA.
    Na50 = 0b100,
    /// 100 nA.
    Na100 = 0b101,
}

impl DcLeadOffCurrent {
    /// Returns the sourced current in nanoamperes.
    pub const fn nanoamps(self) -> u8 {
        match self {
            Self::Na0 => 0,
            Self::Na5 => 5,
            Self::Na10 => 10,
            Self::Na20 => 20,
            Self::Na50 => 50,
            Self::Na100 => 100,
        }
    }
}

/// DC lead-off voltage threshold around VMID (`CNFG_GEN.DCLOFF_VTH`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 2]
pub enum DcLeadOffThreshold {
    /// VMID ± 300 mV.
    Mv300 = 0b00,
    /// VMID ± 400 mV.
    Mv400 = 0b01,
    /// VMID ± 450 mV.
    Mv450 = 0b10,
    /// VMID ± 500 mV.
    Mv500 = 0b11,
}

/// Resistive bias enable (`CNFG_GEN.EN_RBIAS`).
///
/// `0b10` and `0b11` are reserved. The plain bitfield getter panics on a reserved pattern, so decode
/// words read back from the device with [`en_rbias_or_err`](crate::registers::GeneralConfig::en_rbias_or_err).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 2]
pub enum BiasMode {
    /// Resistive bias disabled.
    Disabled = 0b00,
    /// Resistive bias applied to the ECG inputs.
    EcgInputs = 0b01,
}

/// Resistive bias value (`CNFG_GEN.RBIASV`).
///
/// `0b11` is reserved. The plain bitfield getter panics on a reserved pattern, so decode
/// words read back from the device with [`rbiasv_or_err`](crate::registers::GeneralConfig::rbiasv_or_err).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 2]
pub enum BiasResistance {
    /// 50 MΩ.
    Mohm50 = 0b00,
    /// 100 MΩ.
    Mohm100 = 0b01,
    /// 200 MΩ.
    Mohm200 = 0b10,
}

/// Calibration source mode (`CNFG_CAL.VMODE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 1]
pub enum CalibrationMode {
    /// Unipolar pulses, sources swing between VMID and VMID + VMAG.
    Unipolar = 0,
    /// Bipolar pulses, sources swing between VMID - VMAG and VMID + VMAG.
    Bipolar = 1,
}

/// Calibration source magnitude (`CNFG_CAL.VMAG`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 1]
pub enum CalibrationMagnitude {
    /// 0.25 mV.
    Uv250 = 0,
    /// 0.50 mV.
    Uv500 = 1,
}

/// Input switch state for ECGP/ECGN (`CNFG_EMUX.OPENP`, `CNFG_EMUX.OPENN`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 1]
pub enum InputSwitch {
    /// Input connected to the AFE channel.
    Connected = 0,
    /// Input isolated from the AFE channel.
    Isolated = 1,
}

/// Calibration signal routed to an ECG input (`CNFG_EMUX.CALP_SEL`, `CNFG_EMUX.CALN_SEL`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 2]
pub enum CalibrationInput {
    /// No calibration signal applied.
    None = 0b00,
    /// Input connected to VMID.
    Vmid = 0b01,
    /// Input connected to VCALP.
    Vcalp = 0b10,
    /// Input connected to VCALN.
    Vcaln = 0b11,
}

/// ECG input polarity (`CNFG_EMUX.POL`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 1]
pub enum InputPolarity {
    /// Non-inverted input.
    NonInverted = 0,
    /// Inverted input.
    Inverted = 1,
}

/// ECG data rate (`CNFG_ECG.RATE`). Absolute rate depends on [`MasterClock`].
///
/// `0b11` is reserved. The plain bitfield getter panics on a reserved pattern, so decode
/// words read back from the device with [`rate_or_err`](crate::registers::EcgConfig::rate_or_err).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 2]
pub enum EcgRate {
    /// 512 or 500 sps.
    High = 0b00,
    /// 256 or 250 sps.
    Medium = 0b01,
    /// 128, 125 or 200 sps.
    Low = 0b10,
}

/// ECG channel gain (`CNFG_ECG.GAIN`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 2]
pub enum EcgGain {
    /// 20 V/V.
    Gain20 = 0b00,
    /// 40 V/V.
    Gain40 = 0b01,
    /// 80 V/V.
    Gain80 = 0b10,
    /// 160 V/V.
    Gain160 = 0b11,
}

impl EcgGain {
    /// Returns the gain in volts per volt.
    pub const fn volts_per_volt(self) -> u16 {
        match self {
            Self::Gain20 => 20,
            Self::Gain40 => 40,
            Self::Gain80 => 80,
            Self::Gain160 => 160,
        }
    }
}

/// Digital high-pass filter (`CNFG_ECG.DHPF`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 1]
pub enum HighPassFilter {
    /// Filter bypassed (DC coupled).
    Bypass = 0,
    /// 0.5 Hz corner.
    Hz0_5 = 1,
}

/// Digital low-pass filter (`CNFG_ECG.DLPF`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 2]
pub enum LowPassFilter {
    /// Filter bypassed.
    Bypass = 0b00,
    /// 40 Hz corner.
    Hz40 = 0b01,
    /// 100 Hz corner.
    Hz100 = 0b10,
    /// 150 Hz corner.
    Hz150 = 0b11,
}

/// R-to-R detector averaging window (`CNFG_RTOR1.WNDW`), in R-to-R resolution ticks.
///
/// `0b1100` to `0b1111` are reserved. The plain bitfield getter panics on a reserved pattern, so decode
/// words read back from the device with [`wndw_or_err`](crate::registers::RtorConfig::wndw_or_err).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 4]
pub enum RtorWindow {
    /// 6 ticks.
    Ticks6 = 0b0000,
    /// 8 ticks.
    Ticks8 = 0b0001,
    /// 10 ticks.
    Ticks10 = 0b0010,
    /// 12 ticks.
    Ticks12 = 0b0011,
    /// 14 ticks.
    Ticks14 = 0b0100,
    /// 16 ticks.
    Ticks16 = 0b0101,
    /// 18 ticks.
    Ticks18 = 0b0110,
    /// 20 ticks.
    Ticks20 = 0b0111,
    /// 22 ticks.
    Ticks22 = 0b1000,
    /// 24 ticks.
    Ticks24 = 0b1001,
    /// 26 ticks.
    Ticks26 = 0b1010,
    /// 28 ticks.
    Ticks28 = 0b1011,
}

/// R-to-R detector gain (`CNFG_RTOR1.GAIN`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 4]
pub enum RtorGain {
    /// 1x.
    X1 = 0b0000,
    /// 2x.
    X2 = 0b0001,
    /// 4x.
    X4 = 0b0010,
    /// 8x.
    X8 = 0b0011,
    /// 16x.
    X16 = 0b0100,
    /// 32x.
    X32 = 0b0101,
    /// 64x.
    X64 = 0b0110,
    /// 128x.
    X128 = 0b0111,
    /// 256x.
    X256 = 0b1000,
    /// 512x.
    X512 = 0b1001,
    /// 1024x.
    X1024 = 0b1010,
    /// 2048x.
    X2048 = 0b1011,
    /// 4096x.
    X4096 = 0b1100,
    /// 8192x.
    X8192 = 0b1101,
    /// 16384x.
    X16384 = 0b1110,
    /// Gain tracked automatically by the detector.
    AutoScale = 0b1111,
}

impl RtorGain {
    /// Returns the fixed gain factor, or `None` for [`RtorGain::AutoScale`].
    pub const fn multiplier(self) -> Option<u16> {
        match self {
            Self::AutoScale => None,
            fixed => Some(1 << fixed as u8),
        }
    }
}

/// R-to-R enable bit (`CNFG_RTOR1.EN_RTOR`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 1]
pub enum RtorDetector {
    /// R-to-R detection disabled.
    Disabled = 0,
    /// R-to-R detection enabled.
    Enabled = 1,
}

/// Number of past peaks averaged for the detection threshold (`CNFG_RTOR1.PAVG`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 2]
pub enum PeakAveraging {
    /// 2 peaks.
    Peaks2 = 0b00,
    /// 4 peaks.
    Peaks4 = 0b01,
    /// 8 peaks.
    Peaks8 = 0b10,
    /// 16 peaks.
    Peaks16 = 0b11,
}
