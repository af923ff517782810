//! Configuration primitives for the MAX30003 driver.

use crate::params::{
    BiasMode,
    BiasResistance,
    CalibrationInput,
    CalibrationMagnitude,
    CalibrationMode,
    DcLeadOffCurrent,
    DcLeadOffMode,
    DcLeadOffThreshold,
    EcgChannel,
    EcgGain,
    EcgRate,
    HighPassFilter,
    InputPolarity,
    InputSwitch,
    LowPassFilter,
    MasterClock,
    PeakAveraging,
    RtorDetector,
    RtorGain,
    RtorWindow,
};
use crate::registers::{CalibrationConfig, EcgConfig, GeneralConfig, MuxConfig, RtorConfig};

/// Post-reset settle delay before the first command after `SW_RST` (milliseconds).
pub const DEFAULT_RESET_SETTLE_MS: u32 = 200;

/// Samples with a magnitude above this are treated as railed.
pub const DEFAULT_RAIL_THRESHOLD: i32 = 35_000;
/// ADC saturation sentinel reported by a railed channel.
pub const RAIL_SENTINEL: i32 = 0x7F_FFFF;
/// Shortest accepted R-to-R interval, exclusive (milliseconds, 300 bpm).
pub const DEFAULT_MIN_RR_MS: u32 = 200;
/// Longest accepted R-to-R interval, exclusive (milliseconds, 20 bpm).
pub const DEFAULT_MAX_RR_MS: u32 = 3_000;

// Largest value representable by the 4-bit `PTSF` field.
const MAX_PEAK_THRESHOLD: u8 = 0x0F;

/// Plausibility limits applied to decoded signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SignalLimits {
    /// Absolute sample value above which the input is considered railed.
    pub rail_threshold: i32,
    /// Exclusive lower bound of a plausible R-to-R interval in milliseconds.
    pub min_rr_ms: u32,
    /// Exclusive upper bound of a plausible R-to-R interval in milliseconds.
    pub max_rr_ms: u32,
}

impl SignalLimits {
    /// Returns `true` when `sample` sits outside the rail threshold or equals the saturation sentinel.
    pub const fn is_railed(&self, sample: i32) -> bool {
        sample > self.rail_threshold
            || sample < self.rail_threshold.saturating_neg()
            || sample == RAIL_SENTINEL
    }

    /// Returns `true` when `rr_ms` lies strictly inside the plausible window.
    pub const fn accepts_rr(&self, rr_ms: u32) -> bool {
        rr_ms > self.min_rr_ms && rr_ms < self.max_rr_ms
    }
}

impl Default for SignalLimits {
    fn default() -> Self {
        Self {
            rail_threshold: DEFAULT_RAIL_THRESHOLD,
            min_rr_ms: DEFAULT_MIN_RR_MS,
            max_rr_ms: DEFAULT_MAX_RR_MS,
        }
    }
}

/// User-facing configuration for the MAX30003.
///
/// The default reproduces the reference configuration: 32 kHz master clock with 8 ms R-to-R
/// resolution, DC lead-off at ±500 mV, 40 V/V gain, 0.5 Hz to 40 Hz band and automatic R-to-R gain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Master clock selection.
    pub master_clock: MasterClock,
    /// ECG channel enable.
    pub ecg_channel: EcgChannel,
    /// DC lead-off detection mode.
    pub dc_lead_off: DcLeadOffMode,
    /// DC lead-off current magnitude.
    pub dc_lead_off_current: DcLeadOffCurrent,
    /// DC lead-off voltage threshold.
    pub dc_lead_off_threshold: DcLeadOffThreshold,
    /// Resistive bias mode.
    pub bias_mode: BiasMode,
    /// Resistive bias value.
    pub bias_resistance: BiasResistance,
    /// Positive and negative input bias enables.
    pub bias_inputs: (bool, bool),
    /// Internal calibration source enable.
    pub calibration_enabled: bool,
    /// Calibration pulse mode.
    pub calibration_mode: CalibrationMode,
    /// Calibration pulse magnitude.
    pub calibration_magnitude: CalibrationMagnitude,
    /// Input switch state for ECGP and ECGN.
    pub input_switches: (InputSwitch, InputSwitch),
    /// Calibration routing for ECGP and ECGN.
    pub calibration_inputs: (CalibrationInput, CalibrationInput),
    /// Input polarity.
    pub polarity: InputPolarity,
    /// ECG data rate.
    pub rate: EcgRate,
    /// ECG channel gain.
    pub gain: EcgGain,
    /// Digital high-pass filter.
    pub high_pass: HighPassFilter,
    /// Digital low-pass filter.
    pub low_pass: LowPassFilter,
    /// R-to-R detector enable.
    pub rtor_detector: RtorDetector,
    /// R-to-R averaging window.
    pub rtor_window: RtorWindow,
    /// R-to-R detector gain.
    pub rtor_gain: RtorGain,
    /// R-to-R peak averaging.
    pub peak_averaging: PeakAveraging,
    /// R-to-R peak threshold scaling factor, `(n + 1) / 16`.
    pub peak_threshold: u8,
    /// Delay after the software reset command (milliseconds).
    pub reset_settle_ms: u32,
    /// Plausibility limits for decoded samples and intervals.
    pub limits: SignalLimits,
}

impl Config {
    /// Begins building a [`Config`] using the builder pattern.
    pub fn new() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Checks whether this configuration is valid.
    pub fn validate(&self) -> core::result::Result<(), ConfigError> {
        if self.peak_threshold > MAX_PEAK_THRESHOLD {
            return Err(ConfigError::PeakThresholdOutOfRange);
        }

        if self.limits.min_rr_ms >= self.limits.max_rr_ms {
            return Err(ConfigError::EmptyRrWindow);
        }

        if self.limits.rail_threshold <= 0 {
            return Err(ConfigError::InvalidRailThreshold);
        }

        Ok(())
    }

    /// Encodes the `CNFG_GEN` word.
    pub fn cnfg_gen(&self) -> GeneralConfig {
        let (rbiasp, rbiasn) = self.bias_inputs;
        GeneralConfig::new()
            .with_fmstr(self.master_clock)
            .with_en_ecg(self.ecg_channel)
            .with_en_dcloff(self.dc_lead_off)
            .with_dcloff_imag(self.dc_lead_off_current)
            .with_dcloff_vth(self.dc_lead_off_threshold)
            .with_en_rbias(self.bias_mode)
            .with_rbiasv(self.bias_resistance)
            .with_rbiasp(rbiasp)
            .with_rbiasn(rbiasn)
    }

    /// Encodes the `CNFG_CAL` word.
    pub fn cnfg_cal(&self) -> CalibrationConfig {
        CalibrationConfig::new()
            .with_en_vcal(self.calibration_enabled)
            .with_vmode(self.calibration_mode)
            .with_vmag(self.calibration_magnitude)
    }

    /// Encodes the `CNFG_EMUX` word.
    pub fn cnfg_emux(&self) -> MuxConfig {
        let (openp, openn) = self.input_switches;
        let (calp, caln) = self.calibration_inputs;
        MuxConfig::new()
            .with_pol(self.polarity)
            .with_openp(openp)
            .with_openn(openn)
            .with_calp_sel(calp)
            .with_caln_sel(caln)
    }

    /// Encodes the `CNFG_ECG` word.
    pub fn cnfg_ecg(&self) -> EcgConfig {
        EcgConfig::new()
            .with_rate(self.rate)
            .with_gain(self.gain)
            .with_dhpf(self.high_pass)
            .with_dlpf(self.low_pass)
    }

    /// Encodes the `CNFG_RTOR1` word.
    pub fn cnfg_rtor1(&self) -> RtorConfig {
        RtorConfig::new()
            .with_wndw(self.rtor_window)
            .with_gain(self.rtor_gain)
            .with_en_rtor(self.rtor_detector)
            .with_pavg(self.peak_averaging)
            .with_ptsf(self.peak_threshold & MAX_PEAK_THRESHOLD)
    }
}

/// Builder for [`Config`] allowing piecemeal construction.
#[derive(Debug, Clone, Copy)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Creates a new builder seeded with [`Config::default()`].
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Overrides the master clock.
    pub fn master_clock(mut self, master_clock: MasterClock) -> Self {
        self.config.master_clock = master_clock;
        self
    }

    /// Configures DC lead-off detection.
    pub fn dc_lead_off(
        mut self,
        mode: DcLeadOffMode,
        current: DcLeadOffCurrent,
        threshold: DcLeadOffThreshold,
    ) -> Self {
        self.config.dc_lead_off = mode;
        self.config.dc_lead_off_current = current;
        self.config.dc_lead_off_threshold = threshold;
        self
    }

    /// Configures resistive input bias.
    pub fn bias(mut self, mode: BiasMode, resistance: BiasResistance) -> Self {
        self.config.bias_mode = mode;
        self.config.bias_resistance = resistance;
        self
    }

    /// Enables the internal calibration source and routes it to both inputs.
    pub fn calibration(mut self, mode: CalibrationMode, magnitude: CalibrationMagnitude) -> Self {
        self.config.calibration_enabled = true;
        self.config.calibration_mode = mode;
        self.config.calibration_magnitude = magnitude;
        self.config.calibration_inputs = (CalibrationInput::Vcalp, CalibrationInput::Vcaln);
        self
    }

    /// Overrides the ECG data rate.
    pub fn rate(mut self, rate: EcgRate) -> Self {
        self.config.rate = rate;
        self
    }

    /// Overrides the ECG channel gain.
    pub fn gain(mut self, gain: EcgGain) -> Self {
        self.config.gain = gain;
        self
    }

    /// Overrides the digital filters.
    pub fn filters(mut self, high_pass: HighPassFilter, low_pass: LowPassFilter) -> Self {
        self.config.high_pass = high_pass;
        self.config.low_pass = low_pass;
        self
    }

    /// Overrides the R-to-R detector window and gain.
    pub fn rtor(mut self, window: RtorWindow, gain: RtorGain) -> Self {
        self.config.rtor_window = window;
        self.config.rtor_gain = gain;
        self
    }

    /// Sets the R-to-R peak threshold scaling factor.
    pub fn peak_threshold(mut self, peak_threshold: u8) -> Self {
        self.config.peak_threshold = peak_threshold;
        self
    }

    /// Sets the post-reset settle delay.
    pub fn reset_settle_ms(mut self, millis: u32) -> Self {
        self.config.reset_settle_ms = millis;
        self
    }

    /// Overrides the signal plausibility limits.
    pub fn limits(mut self, limits: SignalLimits) -> Self {
        self.config.limits = limits;
        self
    }

    /// Finalizes the builder and returns the [`Config`].
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            master_clock: MasterClock::Fmstr32000Sps200,
            ecg_channel: EcgChannel::Enabled,
            dc_lead_off: DcLeadOffMode::EcgInputs,
            dc_lead_off_current: DcLeadOffCurrent::Na0,
            dc_lead_off_threshold: DcLeadOffThreshold::Mv500,
            bias_mode: BiasMode::Disabled,
            bias_resistance: BiasResistance::Mohm100,
            bias_inputs: (true, true),
            calibration_enabled: false,
            calibration_mode: CalibrationMode::Unipolar,
            calibration_magnitude: CalibrationMagnitude::Uv250,
            input_switches: (InputSwitch::Connected, InputSwitch::Connected),
            calibration_inputs: (CalibrationInput::None, CalibrationInput::None),
            polarity: InputPolarity::NonInverted,
            rate: EcgRate::Low,
            gain: EcgGain::Gain40,
            high_pass: HighPassFilter::Hz0_5,
            low_pass: LowPassFilter::Hz40,
            rtor_detector: RtorDetector::Enabled,
            rtor_window: RtorWindow::Ticks12,
            rtor_gain: RtorGain::AutoScale,
            peak_averaging: PeakAveraging::Peaks8,
            peak_threshold: 0b0110,
            reset_settle_ms: DEFAULT_RESET_SETTLE_MS,
            limits: SignalLimits::default(),
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Validation errors generated while verifying a [`Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// `peak_threshold` does not fit the 4-bit `PTSF` field.
    PeakThresholdOutOfRange,
    /// The R-to-R acceptance window is empty.
    EmptyRrWindow,
    /// The rail threshold must be positive.
    InvalidRailThreshold,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_encodes_reference_words() {
        let config = Config::default();
        assert_eq!(u32::from(config.cnfg_gen()), 0x28_10C7);
        assert_eq!(u32::from(config.cnfg_cal()), 0x00_0000);
        assert_eq!(u32::from(config.cnfg_emux()), 0x00_0000);
        assert_eq!(u32::from(config.cnfg_ecg()), 0x81_5000);
        assert_eq!(u32::from(config.cnfg_rtor1()), 0x3F_A600);
    }

    #[test]
    fn builder_overrides_fields() {
        let config = Config::new()
            .gain(EcgGain::Gain160)
            .filters(HighPassFilter::Bypass, LowPassFilter::Hz150)
            .calibration(CalibrationMode::Bipolar, CalibrationMagnitude::Uv500)
            .build();

        assert_eq!(u32::from(config.cnfg_ecg()), 0x83_3000);
        assert_eq!(u32::from(config.cnfg_cal()), 0x70_0000);
        assert_eq!(u32::from(config.cnfg_emux()), 0x0B_0000);
    }

    #[test]
    fn validate_rejects_inverted_rr_window() {
        let config = Config::new()
            .limits(SignalLimits {
                min_rr_ms: 3_000,
                max_rr_ms: 200,
                ..SignalLimits::default()
            })
            .build();
        assert_eq!(config.validate(), Err(ConfigError::EmptyRrWindow));
    }

    #[test]
    fn validate_rejects_wide_peak_threshold() {
        let config = Config::new().peak_threshold(0x10).build();
        assert_eq!(config.validate(), Err(ConfigError::PeakThresholdOutOfRange));
        assert_eq!(Config::default().validate(), Ok(()));
    }

    #[test]
    fn limits_classify_samples_and_intervals() {
        let limits = SignalLimits::default();
        assert!(limits.is_railed(36_000));
        assert!(limits.is_railed(-35_001));
        assert!(limits.is_railed(RAIL_SENTINEL));
        assert!(!limits.is_railed(35_000));
        assert!(!limits.is_railed(0));

        assert!(!limits.accepts_rr(200));
        assert!(limits.accepts_rr(208));
        assert!(limits.accepts_rr(2_992));
        assert!(!limits.accepts_rr(3_000));
    }
}
