//! Mock implementations for testing
//!
//! [`MockI2sBus`] records every driver call in order so tests can assert the
//! exact sequence the renderer issues, and can be scripted to simulate a full
//! DMA ring, a failing install, or a capture stream.

#![cfg(any(test, feature = "std"))]

use std::collections::VecDeque;
use std::vec::Vec;

use embassy_time::Duration;
use thiserror_no_std::Error;

use crate::audio_types::{AdcChannel, AdcUnit, BitDepth, BusId, SampleRateHz};
use crate::i2s::{BusEvent, ClockOutput, DacChannels, DriverConfig, I2sBus, PinConfig};

/// One recorded driver call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusCall {
    /// [`I2sBus::install`]
    Install(DriverConfig),
    /// [`I2sBus::uninstall`]
    Uninstall,
    /// [`I2sBus::set_clock`]
    SetClock {
        /// Sample rate.
        rate: SampleRateHz,
        /// Slot width.
        bit_depth: BitDepth,
        /// Slot count.
        channels: u8,
    },
    /// [`I2sBus::set_sample_rate`]
    SetSampleRate(u32),
    /// [`I2sBus::set_pins`]
    SetPins(PinConfig),
    /// [`I2sBus::route_clock_output`]
    RouteClockOutput(ClockOutput),
    /// [`I2sBus::set_dac_mode`]
    SetDacMode(DacChannels),
    /// [`I2sBus::set_adc_mode`]
    SetAdcMode(AdcUnit, AdcChannel),
    /// [`I2sBus::adc_enable`]
    AdcEnable,
    /// [`I2sBus::adc_disable`]
    AdcDisable,
    /// [`I2sBus::start`]
    Start,
    /// [`I2sBus::stop`]
    Stop,
    /// [`I2sBus::zero_dma_buffer`]
    ZeroDmaBuffer,
    /// [`I2sBus::write_bytes`]
    WriteBytes {
        /// Bytes offered.
        offered: usize,
        /// Bytes accepted.
        accepted: usize,
        /// Per-attempt timeout.
        timeout: Duration,
    },
    /// [`I2sBus::push_sample`]
    PushSample {
        /// Frame bytes offered.
        frame: Vec<u8>,
        /// Bytes accepted (0 = ring full).
        accepted: usize,
    },
    /// [`I2sBus::read_bytes`]
    ReadBytes {
        /// Buffer length.
        requested: usize,
        /// Bytes delivered.
        read: usize,
    },
}

/// Mock bus errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MockBusError {
    /// Install while a driver is already installed on this unit.
    #[error("driver already installed")]
    AlreadyInstalled,
    /// Operation requires an installed driver.
    #[error("driver not installed")]
    NotInstalled,
    /// Scripted install failure.
    #[error("driver install failed")]
    InstallFailed,
    /// Scripted uninstall failure.
    #[error("driver uninstall failed")]
    UninstallFailed,
    /// `read_bytes` with no scripted capture data left.
    #[error("capture data exhausted")]
    CaptureExhausted,
}

/// Mock serial audio bus
pub struct MockI2sBus {
    id: BusId,
    calls: Vec<BusCall>,
    installed: bool,
    running: bool,
    adc_enabled: bool,
    reject_pushes: u32,
    reject_writes: u32,
    write_chunk: Option<usize>,
    fail_install: bool,
    fail_uninstall_after: Option<u32>,
    capture: VecDeque<u8>,
    events: VecDeque<BusEvent>,
    output: Vec<u8>,
}

impl MockI2sBus {
    /// Create new mock bus for the given hardware unit
    pub fn new(id: BusId) -> Self {
        Self {
            id,
            calls: Vec::new(),
            installed: false,
            running: false,
            adc_enabled: false,
            reject_pushes: 0,
            reject_writes: 0,
            write_chunk: None,
            fail_install: false,
            fail_uninstall_after: None,
            capture: VecDeque::new(),
            events: VecDeque::new(),
            output: Vec::new(),
        }
    }

    /// Report a full DMA ring for the next `n` pushes.
    pub fn reject_next_pushes(&mut self, n: u32) {
        self.reject_pushes = n;
    }

    /// Report a full DMA ring for the next `n` writes.
    pub fn reject_next_writes(&mut self, n: u32) {
        self.reject_writes = n;
    }

    /// Accept at most `chunk` bytes per write.
    pub fn limit_write_chunk(&mut self, chunk: usize) {
        self.write_chunk = Some(chunk);
    }

    /// Make the next install fail.
    pub fn fail_next_install(&mut self) {
        self.fail_install = true;
    }

    /// Let `successes` uninstalls through, then fail the next one.
    pub fn fail_uninstall_after(&mut self, successes: u32) {
        self.fail_uninstall_after = Some(successes);
    }

    /// Append bytes to the capture stream served by `read_bytes`.
    pub fn feed_capture(&mut self, data: &[u8]) {
        self.capture.extend(data.iter().copied());
    }

    /// Queue a driver event.
    pub fn queue_event(&mut self, event: BusEvent) {
        self.events.push_back(event);
    }

    /// Every call so far, in order.
    pub fn calls(&self) -> &[BusCall] {
        &self.calls
    }

    /// Forget recorded calls and accepted output (scripted state is kept).
    pub fn clear_calls(&mut self) {
        self.calls.clear();
        self.output.clear();
    }

    /// Number of recorded calls matching `pred`.
    pub fn count(&self, pred: impl Fn(&BusCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    /// Every push attempt as `(frame, accepted)`.
    pub fn pushes(&self) -> impl Iterator<Item = (&[u8], usize)> {
        self.calls.iter().filter_map(|c| match c {
            BusCall::PushSample { frame, accepted } => Some((frame.as_slice(), *accepted)),
            _ => None,
        })
    }

    /// Bytes the "DMA ring" has accepted, from writes and pushes alike.
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Whether a driver is installed.
    pub fn is_installed(&self) -> bool {
        self.installed
    }

    /// Whether the bus is clocking.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether the built-in ADC is ungated.
    pub fn is_adc_enabled(&self) -> bool {
        self.adc_enabled
    }

    fn require_installed(&self) -> Result<(), MockBusError> {
        if self.installed {
            Ok(())
        } else {
            Err(MockBusError::NotInstalled)
        }
    }
}

impl I2sBus for MockI2sBus {
    type Error = MockBusError;

    fn id(&self) -> BusId {
        self.id
    }

    async fn install(&mut self, config: DriverConfig) -> Result<(), Self::Error> {
        self.calls.push(BusCall::Install(config));
        if self.fail_install {
            self.fail_install = false;
            return Err(MockBusError::InstallFailed);
        }
        if self.installed {
            return Err(MockBusError::AlreadyInstalled);
        }
        self.installed = true;
        Ok(())
    }

    async fn uninstall(&mut self) -> Result<(), Self::Error> {
        self.calls.push(BusCall::Uninstall);
        match self.fail_uninstall_after {
            Some(0) => {
                self.fail_uninstall_after = None;
                return Err(MockBusError::UninstallFailed);
            }
            Some(n) => self.fail_uninstall_after = Some(n.saturating_sub(1)),
            None => {}
        }
        self.installed = false;
        self.running = false;
        self.adc_enabled = false;
        Ok(())
    }

    async fn set_clock(
        &mut self,
        rate: SampleRateHz,
        bit_depth: BitDepth,
        channels: u8,
    ) -> Result<(), Self::Error> {
        self.calls.push(BusCall::SetClock {
            rate,
            bit_depth,
            channels,
        });
        self.require_installed()
    }

    async fn set_sample_rate(&mut self, rate_hz: u32) -> Result<(), Self::Error> {
        self.calls.push(BusCall::SetSampleRate(rate_hz));
        self.require_installed()
    }

    async fn set_pins(&mut self, pins: PinConfig) -> Result<(), Self::Error> {
        self.calls.push(BusCall::SetPins(pins));
        self.require_installed()
    }

    async fn route_clock_output(&mut self, output: ClockOutput) -> Result<(), Self::Error> {
        self.calls.push(BusCall::RouteClockOutput(output));
        Ok(())
    }

    async fn set_dac_mode(&mut self, channels: DacChannels) -> Result<(), Self::Error> {
        self.calls.push(BusCall::SetDacMode(channels));
        self.require_installed()
    }

    async fn set_adc_mode(&mut self, unit: AdcUnit, channel: AdcChannel) -> Result<(), Self::Error> {
        self.calls.push(BusCall::SetAdcMode(unit, channel));
        self.require_installed()
    }

    async fn adc_enable(&mut self) -> Result<(), Self::Error> {
        self.calls.push(BusCall::AdcEnable);
        self.require_installed()?;
        self.adc_enabled = true;
        Ok(())
    }

    async fn adc_disable(&mut self) -> Result<(), Self::Error> {
        self.calls.push(BusCall::AdcDisable);
        self.require_installed()?;
        self.adc_enabled = false;
        Ok(())
    }

    async fn start(&mut self) -> Result<(), Self::Error> {
        self.calls.push(BusCall::Start);
        self.require_installed()?;
        self.running = true;
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), Self::Error> {
        self.calls.push(BusCall::Stop);
        self.require_installed()?;
        self.running = false;
        Ok(())
    }

    async fn zero_dma_buffer(&mut self) -> Result<(), Self::Error> {
        self.calls.push(BusCall::ZeroDmaBuffer);
        self.require_installed()
    }

    async fn write_bytes(&mut self, data: &[u8], timeout: Duration) -> Result<usize, Self::Error> {
        self.require_installed()?;
        let accepted = if self.reject_writes > 0 {
            self.reject_writes = self.reject_writes.saturating_sub(1);
            0
        } else {
            self.write_chunk.map_or(data.len(), |chunk| chunk.min(data.len()))
        };
        self.output.extend_from_slice(data.get(..accepted).unwrap_or_default());
        self.calls.push(BusCall::WriteBytes {
            offered: data.len(),
            accepted,
            timeout,
        });
        Ok(accepted)
    }

    async fn push_sample(
        &mut self,
        frame: &[u8],
        _timeout: Option<Duration>,
    ) -> Result<usize, Self::Error> {
        self.require_installed()?;
        let accepted = if self.reject_pushes > 0 {
            self.reject_pushes = self.reject_pushes.saturating_sub(1);
            0
        } else {
            self.output.extend_from_slice(frame);
            frame.len()
        };
        self.calls.push(BusCall::PushSample {
            frame: frame.to_vec(),
            accepted,
        });
        Ok(accepted)
    }

    async fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, Self::Error> {
        self.require_installed()?;
        if self.capture.is_empty() {
            return Err(MockBusError::CaptureExhausted);
        }
        let read = buffer.len().min(self.capture.len());
        for (slot, byte) in buffer.iter_mut().zip(self.capture.drain(..read)) {
            *slot = byte;
        }
        self.calls.push(BusCall::ReadBytes {
            requested: buffer.len(),
            read,
        });
        Ok(read)
    }

    fn poll_event(&mut self) -> Option<BusEvent> {
        self.events.pop_front()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::audio_config::driver_config;
    use crate::i2s::ModeFlags;

    fn dac_config() -> DriverConfig {
        driver_config(
            ModeFlags::MASTER | ModeFlags::TX,
            SampleRateHz::CD,
            BitDepth::Bits16,
            false,
        )
    }

    #[tokio::test]
    async fn test_mock_rejects_double_install() {
        let mut bus = MockI2sBus::new(BusId::I2s0);
        bus.install(dac_config()).await.unwrap();
        assert_eq!(
            bus.install(dac_config()).await,
            Err(MockBusError::AlreadyInstalled)
        );
        bus.uninstall().await.unwrap();
        bus.install(dac_config()).await.unwrap();
        assert!(bus.is_installed());
    }

    #[tokio::test]
    async fn test_mock_push_rejection_is_scripted() {
        let mut bus = MockI2sBus::new(BusId::I2s0);
        bus.install(dac_config()).await.unwrap();
        bus.reject_next_pushes(2);

        assert_eq!(bus.push_sample(&[1, 2, 3, 4], None).await.unwrap(), 0);
        assert_eq!(bus.push_sample(&[1, 2, 3, 4], None).await.unwrap(), 0);
        assert_eq!(bus.push_sample(&[1, 2, 3, 4], None).await.unwrap(), 4);
        assert_eq!(bus.pushes().count(), 3);
        assert_eq!(bus.output(), &[1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_mock_write_chunking() {
        let mut bus = MockI2sBus::new(BusId::I2s1);
        bus.install(dac_config()).await.unwrap();
        bus.limit_write_chunk(3);

        let data = [9u8; 8];
        let n = bus.write_bytes(&data, Duration::from_millis(1)).await.unwrap();
        assert_eq!(n, 3);
        assert_eq!(bus.output().len(), 3);
    }

    #[tokio::test]
    async fn test_mock_requires_install_for_data() {
        let mut bus = MockI2sBus::new(BusId::I2s0);
        assert_eq!(
            bus.push_sample(&[0; 4], None).await,
            Err(MockBusError::NotInstalled)
        );
        // Uninstall without an install is fine.
        bus.uninstall().await.unwrap();
    }

    #[tokio::test]
    async fn test_mock_capture_and_events() {
        let mut bus = MockI2sBus::new(BusId::I2s0);
        bus.install(dac_config()).await.unwrap();
        bus.feed_capture(&[1, 2, 3]);
        bus.queue_event(BusEvent::TxDone);

        let mut buf = [0u8; 2];
        assert_eq!(bus.read_bytes(&mut buf).await.unwrap(), 2);
        assert_eq!(buf, [1, 2]);
        assert_eq!(bus.read_bytes(&mut buf).await.unwrap(), 1);
        assert_eq!(
            bus.read_bytes(&mut buf).await,
            Err(MockBusError::CaptureExhausted)
        );
        assert_eq!(bus.poll_event(), Some(BusEvent::TxDone));
        assert_eq!(bus.poll_event(), None);
    }
}
