//! High-level MAX30003 device driver implementation.

use crate::config::{Config, SignalLimits};
use crate::error::{Error, Result};
use crate::fifo::{self, EcgFrame};
use crate::interface::spi::SpiInterface;
use crate::interface::Max30003Interface;
use crate::log::{debug, info, trace, warning};
use crate::registers::{
    Register,
    RegisterValue,
    Status,
    COMMAND_PAYLOAD,
    EXPECTED_INFO_ID,
    INFO_ID_MASK,
};
use crate::rtor::RtorReading;
use embedded_hal::delay::DelayNs;
use embedded_hal::spi::SpiDevice;

/// Progress through the initialization sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitState {
    /// No command has been issued yet.
    Unpowered,
    /// Software reset issued and settle delay elapsed.
    Reset,
    /// ECG FIFO cleared.
    FifoCleared,
    /// First synchronization issued.
    Synced,
    /// All configuration registers written.
    Configured,
    /// Configuration latched and part identity confirmed.
    Verified,
    /// Initialization aborted by a bus error or identity mismatch.
    Failed,
}

/// Reason a lead-off condition was reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LeadOffCause {
    /// `STATUS[3]` DC lead-off comparator tripped.
    DcLeadOff,
    /// `STATUS[22]` asserted without the companion `STATUS[2]` bit.
    ReferenceLeadOff,
    /// The sample is outside the rail threshold or equals the saturation sentinel.
    SignalRailed,
}

/// Decoded view of the `STATUS` register with explicit flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusSnapshot {
    /// Raw 24-bit register word.
    pub raw: u32,
    /// STATUS[23] EINT.
    pub eint: bool,
    /// STATUS[22] EOVF.
    pub eovf: bool,
    /// STATUS[21] FSTINT.
    pub fstint: bool,
    /// STATUS[20] DCLOFFINT.
    pub dcloffint: bool,
    /// STATUS[11] LONINT.
    pub lonint: bool,
    /// STATUS[10] RRINT.
    pub rrint: bool,
    /// STATUS[9] SAMP.
    pub samp: bool,
    /// STATUS[8] PLLINT.
    pub pllint: bool,
    /// STATUS[3] LDOFF_PH.
    pub ldoff_ph: bool,
    /// STATUS[2] LDOFF_PL.
    pub ldoff_pl: bool,
    /// STATUS[1] LDOFF_NH.
    pub ldoff_nh: bool,
    /// STATUS[0] LDOFF_NL.
    pub ldoff_nl: bool,
}

impl StatusSnapshot {
    /// Builds a snapshot from the raw STATUS bitfield.
    pub fn from_register(status: Status) -> Self {
        Self {
            raw: u32::from(status),
            eint: status.eint(),
            eovf: status.eovf(),
            fstint: status.fstint(),
            dcloffint: status.dcloffint(),
            lonint: status.lonint(),
            rrint: status.rrint(),
            samp: status.samp(),
            pllint: status.pllint(),
            ldoff_ph: status.ldoff_ph(),
            ldoff_pl: status.ldoff_pl(),
            ldoff_nh: status.ldoff_nh(),
            ldoff_nl: status.ldoff_nl(),
        }
    }

    /// Classifies the lead state, combining hardware flags with a plausibility check on `sample`.
    ///
    /// Causes are checked in order: DC lead-off, reference lead-off, railed signal.
    pub fn lead_off_cause(&self, sample: i32, limits: &SignalLimits) -> Option<LeadOffCause> {
        if self.ldoff_ph {
            Some(LeadOffCause::DcLeadOff)
        } else if self.eovf && !self.ldoff_pl {
            Some(LeadOffCause::ReferenceLeadOff)
        } else if limits.is_railed(sample) {
            Some(LeadOffCause::SignalRailed)
        } else {
            None
        }
    }
}

impl From<u32> for StatusSnapshot {
    fn from(raw: u32) -> Self {
        Self::from_register(Status::from(raw))
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for StatusSnapshot {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "StatusSnapshot {{ raw: {=u32:#x}, EINT: {}, EOVF: {}, FSTINT: {}, DCLOFFINT: {}, LONINT: {}, RRINT: {}, SAMP: {}, PLLINT: {}, LDOFF: [{}, {}, {}, {}] }}",
            self.raw,
            self.eint,
            self.eovf,
            self.fstint,
            self.dcloffint,
            self.lonint,
            self.rrint,
            self.samp,
            self.pllint,
            self.ldoff_ph,
            self.ldoff_pl,
            self.ldoff_nh,
            self.ldoff_nl
        );
    }
}

/// High-level synchronous driver for the MAX30003 ECG front-end.
///
/// One instance owns one device. The driver performs no internal locking; callers sharing it
/// between contexts must serialize access themselves.
pub struct Max30003<IFACE> {
    interface: IFACE,
    config: Config,
    state: InitState,
}

impl<IFACE> Max30003<IFACE> {
    // ==================================================================
    // == Driver Construction & Ownership ===============================
    // ==================================================================
    /// Creates a new driver instance from the provided bus interface.
    pub fn new(interface: IFACE, config: Config) -> Self {
        Self {
            interface,
            config,
            state: InitState::Unpowered,
        }
    }

    /// Consumes the driver and returns the owned interface.
    pub fn release(self) -> (IFACE, Config) {
        (self.interface, self.config)
    }

    /// Provides mutable access to the underlying interface.
    pub fn interface_mut(&mut self) -> &mut IFACE {
        &mut self.interface
    }

    /// Returns a shared reference to the active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the current initialization state.
    pub fn state(&self) -> InitState {
        self.state
    }

    /// Returns `true` once [`init`](Self::init) has completed successfully.
    pub fn is_ready(&self) -> bool {
        self.state == InitState::Verified
    }
}

impl<SPI> Max30003<SpiInterface<SPI>>
where
    SPI: SpiDevice,
{
    // ==================================================================
    // == SPI Convenience Constructors ==================================
    // ==================================================================
    /// Convenience constructor for SPI transports.
    pub fn new_spi(spi: SPI, config: Config) -> Self {
        Self::new(SpiInterface::new(spi), config)
    }

    /// Releases the driver, returning the SPI device and configuration.
    pub fn release_spi(self) -> (SPI, Config) {
        let (iface, config) = self.release();
        (iface.release(), config)
    }
}

impl<IFACE, CommE> Max30003<IFACE>
where
    IFACE: Max30003Interface<Error = CommE>,
{
    // ==================================================================
    // == Initialization =================================================
    // ==================================================================
    /// Resets, configures and verifies the device.
    ///
    /// Sequence: `SW_RST`, settle delay, `FIFO_RST`, `SYNCH`, `CNFG_GEN`, `CNFG_CAL`,
    /// `CNFG_EMUX`, `CNFG_ECG`, `CNFG_RTOR1`, `SYNCH`, then an `INFO` identity check. The second
    /// `SYNCH` latches the configuration. Any error leaves the driver in [`InitState::Failed`];
    /// calling `init` again restarts from the software reset.
    pub fn init(&mut self, delay: &mut impl DelayNs) -> Result<(), CommE> {
        self.config.validate().map_err(|_| Error::InvalidConfig)?;

        self.state = InitState::Unpowered;
        let outcome = self.run_init_sequence(delay);
        if outcome.is_err() {
            warning!("MAX30003 initialization failed in state {}", self.state);
            self.state = InitState::Failed;
        }
        outcome
    }

    fn run_init_sequence(&mut self, delay: &mut impl DelayNs) -> Result<(), CommE> {
        self.reset()?;
        delay.delay_ms(self.config.reset_settle_ms);
        self.advance(InitState::Reset);

        self.reset_fifo()?;
        self.advance(InitState::FifoCleared);

        self.synchronize()?;
        self.advance(InitState::Synced);

        let config = self.config;
        self.write_value(config.cnfg_gen())?;
        self.write_value(config.cnfg_cal())?;
        self.write_value(config.cnfg_emux())?;
        self.write_value(config.cnfg_ecg())?;
        self.write_value(config.cnfg_rtor1())?;
        self.advance(InitState::Configured);

        self.synchronize()?;
        self.check_info()?;
        self.advance(InitState::Verified);
        info!("MAX30003 ready");
        Ok(())
    }

    fn advance(&mut self, next: InitState) {
        debug!("MAX30003 {} -> {}", self.state, next);
        self.state = next;
    }

    /// Issues a software reset. All registers return to their power-on values.
    pub fn reset(&mut self) -> Result<(), CommE> {
        self.write_register(Register::SwReset, COMMAND_PAYLOAD)
    }

    /// Clears the ECG FIFO.
    pub fn reset_fifo(&mut self) -> Result<(), CommE> {
        self.write_register(Register::FifoReset, COMMAND_PAYLOAD)
    }

    /// Restarts the internal timing phase and latches pending configuration writes.
    pub fn synchronize(&mut self) -> Result<(), CommE> {
        self.write_register(Register::Synch, COMMAND_PAYLOAD)
    }

    // ==================================================================
    // == Identification & Status =======================================
    // ==================================================================
    /// Reads the raw `INFO` register.
    pub fn read_info(&mut self) -> Result<u32, CommE> {
        self.read_register(Register::Info)
    }

    /// Verifies the `INFO` register identifies a MAX30003 and returns the raw word.
    pub fn check_info(&mut self) -> Result<u32, CommE> {
        let info = self.read_info()?;
        if info & INFO_ID_MASK != EXPECTED_INFO_ID {
            return Err(Error::DeviceIdMismatch(info));
        }

        Ok(info)
    }

    /// Reads the raw 24-bit `STATUS` word.
    pub fn read_status_raw(&mut self) -> Result<u32, CommE> {
        self.read_register(Register::Status)
    }

    /// Returns a snapshot of the `STATUS` register.
    pub fn read_status(&mut self) -> Result<StatusSnapshot, CommE> {
        self.read_status_raw().map(StatusSnapshot::from)
    }

    /// Reads `STATUS` and classifies the lead state for `sample`.
    pub fn lead_off_cause(&mut self, sample: i32) -> Result<Option<LeadOffCause>, CommE> {
        let status = self.read_status()?;
        Ok(status.lead_off_cause(sample, &self.config.limits))
    }

    /// Returns `true` when any electrode has lost contact or `sample` is railed.
    pub fn is_lead_off(&mut self, sample: i32) -> Result<bool, CommE> {
        self.lead_off_cause(sample).map(|cause| cause.is_some())
    }

    /// Polls `STATUS` for the R-to-R ready flag.
    ///
    /// The flag is level-sensitive: repeated polls observe it until the device clears it.
    pub fn is_rtor_ready(&mut self) -> Result<bool, CommE> {
        self.read_status().map(|status| status.rrint)
    }

    // ==================================================================
    // == Data Acquisition ==============================================
    // ==================================================================
    /// Reads one ECG sample as a sign-extended ADC code.
    pub fn read_ecg(&mut self) -> Result<i32, CommE> {
        self.read_ecg_frame().map(|frame| frame.sample)
    }

    /// Reads one ECG sample together with its FIFO tag.
    pub fn read_ecg_frame(&mut self) -> Result<EcgFrame, CommE> {
        let frame = fifo::read_frame(&mut self.interface)?;
        trace!("ECG {=i32} {}", frame.sample, frame.tag);
        Ok(frame)
    }

    /// Reads the latest R-to-R interval and derives the heart rate.
    ///
    /// Ticks are scaled by the configured master clock. Implausible intervals yield
    /// [`RtorReading::INVALID`].
    pub fn read_rtor(&mut self) -> Result<RtorReading, CommE> {
        let raw = self.read_register(Register::Rtor)?;
        Ok(RtorReading::from_raw(
            raw,
            self.config.master_clock,
            &self.config.limits,
        ))
    }

    // ==================================================================
    // == Raw Register Access ===========================================
    // ==================================================================
    /// Writes the low 24 bits of `value` to `register`.
    pub fn write_register(&mut self, register: Register, value: u32) -> Result<(), CommE> {
        self.interface
            .write_register(register.address(), value)
            .map_err(Error::from)
    }

    /// Reads the 24-bit contents of `register`.
    pub fn read_register(&mut self, register: Register) -> Result<u32, CommE> {
        self.interface
            .read_register(register.address())
            .map_err(Error::from)
    }

    fn write_value<R: RegisterValue>(&mut self, value: R) -> Result<(), CommE> {
        self.write_register(R::REGISTER, value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RAIL_SENTINEL;
    use crate::params::MasterClock;
    use crate::registers::status;
    use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};

    struct RecordingDelay {
        total_ms: u32,
    }

    impl DelayNs for RecordingDelay {
        fn delay_ns(&mut self, _ns: u32) {}

        fn delay_ms(&mut self, ms: u32) {
            self.total_ms += ms;
        }
    }

    fn write(register: Register, value: u32) -> [SpiTransaction<u8>; 4] {
        let [_, b2, b1, b0] = value.to_be_bytes();
        [
            SpiTransaction::transaction_start(),
            SpiTransaction::write_vec(vec![register.address() << 1]),
            SpiTransaction::write_vec(vec![b2, b1, b0]),
            SpiTransaction::transaction_end(),
        ]
    }

    fn read(register: Register, value: u32) -> [SpiTransaction<u8>; 4] {
        let [_, b2, b1, b0] = value.to_be_bytes();
        [
            SpiTransaction::transaction_start(),
            SpiTransaction::write_vec(vec![(register.address() << 1) | 0x01]),
            SpiTransaction::transfer(vec![0x00, 0x00, 0x00], vec![b2, b1, b0]),
            SpiTransaction::transaction_end(),
        ]
    }

    fn init_sequence(info: u32) -> Vec<SpiTransaction<u8>> {
        [
            write(Register::SwReset, 0),
            write(Register::FifoReset, 0),
            write(Register::Synch, 0),
            write(Register::CnfgGen, 0x28_10C7),
            write(Register::CnfgCal, 0x00_0000),
            write(Register::CnfgEmux, 0x00_0000),
            write(Register::CnfgEcg, 0x81_5000),
            write(Register::CnfgRtor1, 0x3F_A600),
            write(Register::Synch, 0),
            read(Register::Info, info),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn driver(expectations: &[SpiTransaction<u8>]) -> Max30003<SpiInterface<SpiMock<u8>>> {
        Max30003::new_spi(SpiMock::new(expectations), Config::default())
    }

    fn finish(device: Max30003<SpiInterface<SpiMock<u8>>>) {
        let (mut spi, _) = device.release_spi();
        spi.done();
    }

    #[test]
    fn init_writes_configuration_between_two_syncs() {
        let expectations = init_sequence(0x50_0058);
        let mut device = driver(&expectations);
        let mut delay = RecordingDelay { total_ms: 0 };

        device.init(&mut delay).unwrap();

        assert_eq!(device.state(), InitState::Verified);
        assert!(device.is_ready());
        assert_eq!(delay.total_ms, 200);
        finish(device);
    }

    #[test]
    fn init_fails_on_unexpected_info() {
        for info in [0x00_0000, 0x00_0040, 0x00_0060, 0xFF_FF0F] {
            let expectations = init_sequence(info);
            let mut device = driver(&expectations);
            let mut delay = RecordingDelay { total_ms: 0 };

            assert_eq!(device.init(&mut delay), Err(Error::DeviceIdMismatch(info)));
            assert_eq!(device.state(), InitState::Failed);
            finish(device);
        }
    }

    #[test]
    fn init_accepts_any_info_with_matching_nibble() {
        let expectations = init_sequence(0x12_345F);
        let mut device = driver(&expectations);
        let mut delay = RecordingDelay { total_ms: 0 };

        assert_eq!(device.init(&mut delay), Ok(()));
        finish(device);
    }

    #[test]
    fn init_rejects_invalid_config_without_bus_traffic() {
        let config = Config::new().peak_threshold(0x20).build();
        let mut device = Max30003::new_spi(SpiMock::new(&[]), config);
        let mut delay = RecordingDelay { total_ms: 0 };

        assert_eq!(device.init(&mut delay), Err(Error::InvalidConfig));
        assert_eq!(device.state(), InitState::Unpowered);
        finish(device);
    }

    #[test]
    fn read_ecg_sign_extends_fifo_word() {
        let expectations: Vec<_> = [read(Register::EcgFifo, 0x80_0000), read(Register::EcgFifo, 0)]
            .into_iter()
            .flatten()
            .collect();
        let mut device = driver(&expectations);

        assert_eq!(device.read_ecg().unwrap(), -131_072);
        assert_eq!(device.read_ecg().unwrap(), 0);
        finish(device);
    }

    #[test]
    fn lead_off_reported_for_dc_bit_regardless_of_sample() {
        let expectations = read(Register::Status, status::LDOFF_PH);
        let mut device = driver(&expectations);

        assert_eq!(device.lead_off_cause(0).unwrap(), Some(LeadOffCause::DcLeadOff));
        finish(device);
    }

    #[test]
    fn lead_off_reported_for_railed_sample() {
        let expectations = read(Register::Status, 0);
        let mut device = driver(&expectations);

        assert!(device.is_lead_off(36_000).unwrap());
        finish(device);
    }

    #[test]
    fn lead_on_when_status_clear_and_sample_zero() {
        let expectations = read(Register::Status, 0);
        let mut device = driver(&expectations);

        assert!(!device.is_lead_off(0).unwrap());
        finish(device);
    }

    #[test]
    fn reference_lead_off_requires_companion_bit_clear() {
        let limits = SignalLimits::default();
        let asserted = StatusSnapshot::from(status::EOVF);
        let masked = StatusSnapshot::from(status::EOVF | status::LDOFF_PL);

        assert_eq!(asserted.lead_off_cause(0, &limits), Some(LeadOffCause::ReferenceLeadOff));
        assert_eq!(masked.lead_off_cause(0, &limits), None);
        assert_eq!(
            masked.lead_off_cause(RAIL_SENTINEL, &limits),
            Some(LeadOffCause::SignalRailed)
        );
    }

    #[test]
    fn rtor_ready_polls_status_each_time() {
        let expectations: Vec<_> = [
            read(Register::Status, status::RRINT),
            read(Register::Status, status::RRINT),
            read(Register::Status, 0),
        ]
        .into_iter()
        .flatten()
        .collect();
        let mut device = driver(&expectations);

        assert!(device.is_rtor_ready().unwrap());
        assert!(device.is_rtor_ready().unwrap());
        assert!(!device.is_rtor_ready().unwrap());
        finish(device);
    }

    #[test]
    fn read_rtor_gates_interval() {
        let expectations: Vec<_> = [
            read(Register::Rtor, 125 << 10),
            read(Register::Rtor, 12 << 10),
            read(Register::Rtor, 437 << 10),
        ]
        .into_iter()
        .flatten()
        .collect();
        let mut device = driver(&expectations);

        assert_eq!(
            device.read_rtor().unwrap(),
            RtorReading {
                heart_rate_bpm: 60,
                rr_interval_ms: 1_000
            }
        );
        assert_eq!(device.read_rtor().unwrap(), RtorReading::INVALID);
        assert_eq!(device.read_rtor().unwrap(), RtorReading::INVALID);
        finish(device);
    }

    #[test]
    fn read_rtor_scales_ticks_by_master_clock() {
        let expectations = read(Register::Rtor, 128 << 10);
        let config = Config::new().master_clock(MasterClock::Fmstr32768).build();
        let mut device = Max30003::new_spi(SpiMock::new(&expectations), config);

        assert_eq!(
            device.read_rtor().unwrap(),
            RtorReading {
                heart_rate_bpm: 60,
                rr_interval_ms: 1_000
            }
        );
        finish(device);
    }

    #[test]
    fn raw_register_access_uses_register_address() {
        let expectations: Vec<_> = [
            write(Register::EnInt, status::RRINT),
            read(Register::MngrInt, 0x00_0004),
        ]
        .into_iter()
        .flatten()
        .collect();
        let mut device = driver(&expectations);

        device.write_register(Register::EnInt, status::RRINT).unwrap();
        assert_eq!(device.read_register(Register::MngrInt).unwrap(), 0x00_0004);
        finish(device);
    }

    /// Interface double whose bus fails after a fixed number of transfers.
    struct FailingInterface {
        remaining: usize,
    }

    impl Max30003Interface for FailingInterface {
        type Error = ();

        fn write_register(&mut self, _address: u8, _value: u32) -> core::result::Result<(), ()> {
            if self.remaining == 0 {
                return Err(());
            }
            self.remaining -= 1;
            Ok(())
        }

        fn read_register(&mut self, _address: u8) -> core::result::Result<u32, ()> {
            Err(())
        }
    }

    #[test]
    fn bus_failure_aborts_init_without_retry() {
        let mut device = Max30003::new(FailingInterface { remaining: 3 }, Config::default());
        let mut delay = RecordingDelay { total_ms: 0 };

        assert_eq!(device.init(&mut delay), Err(Error::Interface(())));
        assert_eq!(device.state(), InitState::Failed);
        let (iface, _) = device.release();
        assert_eq!(iface.remaining, 0);
    }
}
