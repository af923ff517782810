//! R-to-R interval decoding and heart-rate derivation.

use crate::config::SignalLimits;
use crate::params::MasterClock;
use crate::registers::RtorWord;

const MS_PER_MINUTE: u32 = 60_000;
const NS_PER_MS: u64 = 1_000_000;

/// Heart rate and R-to-R interval derived from the `RTOR` register.
///
/// Intervals outside the plausible window are reported as [`RtorReading::INVALID`] rather than
/// as an error; the detector occasionally emits spurious intervals on poor contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RtorReading {
    /// Heart rate in beats per minute, `0` when invalid.
    pub heart_rate_bpm: u16,
    /// R-to-R interval in milliseconds, `0` when invalid.
    pub rr_interval_ms: u16,
}

impl RtorReading {
    /// Reading reported for rejected intervals.
    pub const INVALID: Self = Self {
        heart_rate_bpm: 0,
        rr_interval_ms: 0,
    };

    /// Converts a tick count into a reading, gated by `limits`.
    ///
    /// The tick period is taken from `clock`; the interval is truncated to whole milliseconds.
    pub fn from_ticks(ticks: u16, clock: MasterClock, limits: &SignalLimits) -> Self {
        let rr_ns = u64::from(ticks) * u64::from(clock.rtor_tick_ns());
        let Ok(rr_ms) = u32::try_from(rr_ns / NS_PER_MS) else {
            return Self::INVALID;
        };
        if !limits.accepts_rr(rr_ms) {
            return Self::INVALID;
        }

        match (u16::try_from(rr_ms), u16::try_from(MS_PER_MINUTE / rr_ms)) {
            (Ok(rr_interval_ms), Ok(heart_rate_bpm)) => Self {
                heart_rate_bpm,
                rr_interval_ms,
            },
            _ => Self::INVALID,
        }
    }

    /// Decodes a raw 24-bit `RTOR` word sampled under `clock`.
    pub fn from_raw(raw: u32, clock: MasterClock, limits: &SignalLimits) -> Self {
        Self::from_ticks(RtorWord::from(raw).ticks(), clock, limits)
    }

    /// Returns `true` when the interval passed the plausibility gate.
    pub const fn is_valid(&self) -> bool {
        self.rr_interval_ms != 0
    }
}
