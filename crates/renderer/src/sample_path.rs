//! PCM to bus: rate adaptation, the direct write path and the repacking path.
//!
//! ```text
//! render_samples
//!   ├─ rate differs?      set_sample_rate(incoming × modifier)
//!   ├─ native format?     write_bytes(tail, timeout) until drained     (Direct)
//!   └─ otherwise          16-bit only: frame by frame
//!                         StereoFrames ─> WireFormat::pack ─> push_sample (Repacked)
//! ```
//!
//! A zero-byte answer from the driver means the DMA ring is full. The same
//! bytes are offered again after yielding to the executor, for as long as the
//! configured [`RetryPolicy`](crate::RetryPolicy) allows. Frames always reach
//! the bus in buffer order.

use embassy_futures::yield_now;
use embassy_time::Duration;
use platform::{I2sBus, SampleRateHz};

use crate::config::{FormatPolicy, RendererConfig};
use crate::error::RendererError;
use crate::format::{PcmFormat, PcmLayout, RenderPath, RenderReport};
use crate::frames::StereoFrames;
use crate::pack::WireFormat;
use crate::renderer::Renderer;
use crate::retry::Exhausted;

/// Source depth the repacking path understands.
const REPACK_BITS: u8 = 16;

/// Shortest per-attempt wait on the direct path.
const MIN_WRITE_TIMEOUT: Duration = Duration::from_millis(1);

/// Per-attempt wait for a direct write: half the buffer's playback time.
pub fn write_timeout(frames: usize, sample_rate: u32) -> Duration {
    let micros = u64::try_from(frames)
        .unwrap_or(u64::MAX)
        .saturating_mul(1_000_000)
        .checked_div(u64::from(sample_rate).saturating_mul(2))
        .unwrap_or(0);
    Duration::from_micros(micros).max(MIN_WRITE_TIMEOUT)
}

impl<B: I2sBus> Renderer<B> {
    /// Deliver one buffer of PCM to the bus.
    ///
    /// Only whole frames are rendered; trailing bytes are ignored.
    ///
    /// # Errors
    ///
    /// - [`RendererError::NotConfigured`].
    /// - [`RendererError::UnsupportedMode`] when the mode has no transmit path.
    /// - [`RendererError::InvalidConfig`] when the stream rate, or the clock
    ///   rate scaled by `sample_rate_modifier`, falls outside
    ///   [`SampleRateHz`]'s range. The bus is left untouched.
    /// - [`RendererError::UnsupportedBitDepth`] / [`RendererError::UnsupportedChannelCount`]
    ///   for input the repacking path cannot convert, under
    ///   [`FormatPolicy::Strict`].
    /// - [`RendererError::Bus`] if the driver fails.
    pub async fn render_samples(
        &mut self,
        buf: &[u8],
        format: &PcmFormat,
    ) -> Result<RenderReport, RendererError<B::Error>> {
        let config = self.require_config()?;
        if !config.mode.has_dac() {
            return Err(RendererError::UnsupportedMode);
        }

        let rate_changed = self.adapt_rate(&config, format.sample_rate).await?;

        let mut report = if is_native(&config, format) {
            self.write_direct(&config, buf, format).await?
        } else {
            self.write_repacked(&config, buf, format).await?
        };
        report.rate_changed = rate_changed;

        if report.frames_dropped > 0 {
            warn!(
                "dropped {} of {} frames",
                report.frames_dropped,
                report.frames_total
            );
        }
        Ok(report)
    }

    async fn adapt_rate(
        &mut self,
        config: &RendererConfig,
        incoming_hz: u32,
    ) -> Result<Option<u32>, RendererError<B::Error>> {
        if !config.adapt_sample_rate || incoming_hz == config.sample_rate.get() {
            return Ok(None);
        }
        let stored = SampleRateHz::new(incoming_hz)
            .map_err(|_| RendererError::InvalidConfig("stream sample rate out of range"))?;
        let effective = config.effective_rate(incoming_hz);
        SampleRateHz::new(effective)
            .map_err(|_| RendererError::InvalidConfig("adapted clock rate out of range"))?;

        info!(
            "sample rate {} -> {} Hz (clock {} Hz)",
            config.sample_rate.get(),
            incoming_hz,
            effective
        );
        self.bus
            .set_sample_rate(effective)
            .await
            .map_err(RendererError::Bus)?;

        if let Some(active) = self.config.as_mut() {
            active.sample_rate = stored;
        }
        Ok(Some(effective))
    }

    async fn write_direct(
        &mut self,
        config: &RendererConfig,
        buf: &[u8],
        format: &PcmFormat,
    ) -> Result<RenderReport, RendererError<B::Error>> {
        let frame_bytes = config.bit_depth.bytes_per_sample().saturating_mul(2);
        let frames = format.frames_in(buf.len());
        let whole = buf
            .get(..frames.saturating_mul(frame_bytes))
            .unwrap_or(buf);
        let timeout = write_timeout(frames, format.sample_rate);

        let mut report = RenderReport::new(frames, RenderPath::Direct);
        let mut written = 0usize;
        let mut attempts = config.retry.attempt();

        while let Some(tail) = whole.get(written..).filter(|t| !t.is_empty()) {
            let accepted = self
                .bus
                .write_bytes(tail, timeout)
                .await
                .map_err(RendererError::Bus)?;
            if accepted > 0 {
                written = written.saturating_add(accepted.min(tail.len()));
                attempts.reset();
                continue;
            }
            if !attempts.record() {
                // The driver consumes bytes, not frames: nothing smaller than
                // the remaining tail can be skipped without misaligning slots.
                debug!("direct write gave up after {} attempts", attempts.made());
                break;
            }
            yield_now().await;
        }

        report.frames_delivered = written.checked_div(frame_bytes).unwrap_or(0);
        report.frames_dropped = frames.saturating_sub(report.frames_delivered);
        Ok(report)
    }

    async fn write_repacked(
        &mut self,
        config: &RendererConfig,
        buf: &[u8],
        format: &PcmFormat,
    ) -> Result<RenderReport, RendererError<B::Error>> {
        if format.bit_depth != REPACK_BITS {
            let err = RendererError::UnsupportedBitDepth(format.bit_depth);
            return skip_or_fail(config.format_policy, format.frames_in(buf.len()), err);
        }
        if !(1..=2).contains(&format.channels) {
            let err = RendererError::UnsupportedChannelCount(format.channels);
            return skip_or_fail(config.format_policy, format.frames_in(buf.len()), err);
        }

        let wire = WireFormat::for_target(config.mode, config.bit_depth);
        let frames = StereoFrames::new(buf, format.layout, format.channels);
        let mut report = RenderReport::new(frames.frame_count(), RenderPath::Repacked);
        trace!("repacking {} frames", report.frames_total);

        for frame in frames {
            let packed = wire.pack(&frame);
            let mut attempts = config.retry.attempt();
            loop {
                let accepted = self
                    .bus
                    .push_sample(packed.as_bytes(), None)
                    .await
                    .map_err(RendererError::Bus)?;
                if accepted > 0 {
                    report.frames_delivered = report.frames_delivered.saturating_add(1);
                    break;
                }
                if !attempts.record() {
                    match config.retry.on_exhausted {
                        Exhausted::SkipFrame => {
                            report.frames_dropped = report.frames_dropped.saturating_add(1);
                            break;
                        }
                        Exhausted::AbortBuffer => {
                            report.frames_dropped = report
                                .frames_total
                                .saturating_sub(report.frames_delivered);
                            return Ok(report);
                        }
                    }
                }
                yield_now().await;
            }
        }
        Ok(report)
    }
}

/// The source already matches the bus slots and no conversion is needed.
fn is_native(config: &RendererConfig, format: &PcmFormat) -> bool {
    format.bit_depth == config.bit_depth.bits()
        && format.layout == PcmLayout::Interleaved
        && format.channels == 2
        && !config.mode.is_built_in_dac()
}

fn skip_or_fail<E>(
    policy: FormatPolicy,
    frames: usize,
    err: RendererError<E>,
) -> Result<RenderReport, RendererError<E>> {
    match policy {
        FormatPolicy::Strict => Err(err),
        FormatPolicy::SilentDrop => {
            debug!("skipping buffer: {}", err.name());
            let mut report = RenderReport::new(frames, RenderPath::Skipped);
            report.frames_dropped = frames;
            Ok(report)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn write_timeout_is_half_the_buffer() {
        // 4410 frames at 44.1 kHz = 100 ms of audio.
        assert_eq!(write_timeout(4_410, 44_100), Duration::from_millis(50));
    }

    #[test]
    fn write_timeout_has_a_floor() {
        assert_eq!(write_timeout(1, 48_000), MIN_WRITE_TIMEOUT);
        assert_eq!(write_timeout(128, 0), MIN_WRITE_TIMEOUT);
    }

    #[test]
    fn native_format_detection() {
        let config = RendererConfig::default();
        assert!(is_native(&config, &PcmFormat::stereo16(44_100)));

        let mono = PcmFormat {
            channels: 1,
            ..PcmFormat::stereo16(44_100)
        };
        assert!(!is_native(&config, &mono));

        let split = PcmFormat {
            layout: PcmLayout::LeftRightSplit,
            ..PcmFormat::stereo16(44_100)
        };
        assert!(!is_native(&config, &split));

        let built_in = RendererConfig::new(crate::RendererMode::DacBuiltIn, platform::BusId::I2s0);
        assert!(!is_native(&built_in, &PcmFormat::stereo16(44_100)));
    }
}
