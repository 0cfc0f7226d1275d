//! Renderer configuration.
//!
//! A [`RendererConfig`] fully describes one rendering session: the operating
//! mode, the bus unit it runs on, the wire format negotiated with that bus,
//! and the policies the sample path applies to unsupported input and to a
//! full DMA ring.

use platform::audio_config::{
    DEFAULT_BIT_DEPTH, DEFAULT_BUS, DEFAULT_CHANNELS, DEFAULT_SAMPLE_RATE,
};
use platform::{AdcChannel, AdcUnit, BitDepth, BusId, ModeFlags, SampleRateHz};

use crate::error::RendererError;
use crate::retry::RetryPolicy;

// ── Mode ─────────────────────────────────────────────────────────────────────

/// Operating mode: which direction(s) run and whether the on-chip converters
/// replace the discrete codec pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RendererMode {
    /// Transmit to an external DAC over discrete pins.
    Dac,
    /// Receive from an external ADC over discrete pins.
    Adc,
    /// Both directions over discrete pins.
    AdcDac,
    /// Transmit into the on-chip DAC.
    DacBuiltIn,
    /// Receive from the on-chip ADC.
    AdcBuiltIn,
    /// Transmit into the on-chip DAC and receive from the on-chip ADC.
    AdcDacBuiltIn,
}

impl RendererMode {
    /// Mode has a transmit path.
    pub fn has_dac(self) -> bool {
        matches!(
            self,
            Self::Dac | Self::AdcDac | Self::DacBuiltIn | Self::AdcDacBuiltIn
        )
    }

    /// Mode has a receive path.
    pub fn has_adc(self) -> bool {
        matches!(
            self,
            Self::Adc | Self::AdcDac | Self::AdcBuiltIn | Self::AdcDacBuiltIn
        )
    }

    /// Transmit path feeds the on-chip DAC.
    pub fn is_built_in_dac(self) -> bool {
        matches!(self, Self::DacBuiltIn | Self::AdcDacBuiltIn)
    }

    /// Receive path samples the on-chip ADC.
    pub fn is_built_in_adc(self) -> bool {
        matches!(self, Self::AdcBuiltIn | Self::AdcDacBuiltIn)
    }

    /// Bus signals are routed to GPIO pins for an external codec.
    pub fn uses_discrete_pins(self) -> bool {
        matches!(self, Self::Dac | Self::Adc | Self::AdcDac)
    }

    /// Peripheral role flags for driver install.
    ///
    /// Master always; TX for any DAC variant; RX for any ADC variant; the
    /// built-in converter flag for each built-in direction.
    pub fn mode_flags(self) -> ModeFlags {
        let mut flags = ModeFlags::MASTER;
        if self.has_dac() {
            flags = flags | ModeFlags::TX;
        }
        if self.has_adc() {
            flags = flags | ModeFlags::RX;
        }
        if self.is_built_in_dac() {
            flags = flags | ModeFlags::DAC_BUILT_IN;
        }
        if self.is_built_in_adc() {
            flags = flags | ModeFlags::ADC_BUILT_IN;
        }
        flags
    }

    /// Short name for log lines.
    pub fn name(self) -> &'static str {
        match self {
            Self::Dac => "DAC",
            Self::Adc => "ADC",
            Self::AdcDac => "ADC_DAC",
            Self::DacBuiltIn => "DAC_BUILT_IN",
            Self::AdcBuiltIn => "ADC_BUILT_IN",
            Self::AdcDacBuiltIn => "ADC_DAC_BUILT_IN",
        }
    }
}

// ── Policies ─────────────────────────────────────────────────────────────────

/// What the sample path does with input it cannot convert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FormatPolicy {
    /// Return an error naming the unsupported property.
    #[default]
    Strict,
    /// Drop the buffer and report it as skipped.
    SilentDrop,
}

// ── RendererConfig ───────────────────────────────────────────────────────────

/// Complete description of one rendering session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RendererConfig {
    /// Operating mode.
    pub mode: RendererMode,
    /// Bus unit.
    pub bus: BusId,
    /// Current bus sample rate. Updated when the sample path adapts.
    pub sample_rate: SampleRateHz,
    /// Slot width on the bus.
    pub bit_depth: BitDepth,
    /// Slot count negotiated with the bus (1 or 2).
    pub channel_count: u8,
    /// Clock the bus from the audio PLL.
    pub use_high_precision_clock: bool,
    /// ADC unit (built-in ADC modes only).
    pub adc_unit: AdcUnit,
    /// ADC channel (built-in ADC modes only).
    pub adc_channel: AdcChannel,
    /// Multiplier applied to an incoming stream's rate when reprogramming the clock.
    pub sample_rate_modifier: f32,
    /// Follow the sample rate announced by each incoming buffer.
    pub adapt_sample_rate: bool,
    /// Handling of unsupported source formats.
    pub format_policy: FormatPolicy,
    /// Handling of a full DMA ring.
    pub retry: RetryPolicy,
}

impl RendererConfig {
    /// ADC channel wired to the microphone input on the board.
    pub const DEFAULT_ADC_CHANNEL: u8 = 2;

    /// Configuration for `mode` on `bus` with the board defaults.
    pub fn new(mode: RendererMode, bus: BusId) -> Self {
        Self {
            mode,
            bus,
            ..Self::default()
        }
    }

    /// Set the bus sample rate.
    #[must_use]
    pub fn with_sample_rate(mut self, rate: SampleRateHz) -> Self {
        self.sample_rate = rate;
        self
    }

    /// Set the slot width.
    #[must_use]
    pub fn with_bit_depth(mut self, bit_depth: BitDepth) -> Self {
        self.bit_depth = bit_depth;
        self
    }

    /// Set the slot width from a raw bit count.
    ///
    /// # Errors
    ///
    /// Returns [`RendererError::UnsupportedBitDepth`] unless `bits` is 16 or 32.
    pub fn with_raw_bit_depth<E>(self, bits: u8) -> Result<Self, RendererError<E>> {
        let depth = BitDepth::try_from(bits).map_err(|e| RendererError::UnsupportedBitDepth(e.0))?;
        Ok(self.with_bit_depth(depth))
    }

    /// Set the slot count.
    #[must_use]
    pub fn with_channel_count(mut self, channels: u8) -> Self {
        self.channel_count = channels;
        self
    }

    /// Select the audio PLL.
    #[must_use]
    pub fn with_high_precision_clock(mut self, enabled: bool) -> Self {
        self.use_high_precision_clock = enabled;
        self
    }

    /// Set the built-in ADC routing.
    #[must_use]
    pub fn with_adc(mut self, unit: AdcUnit, channel: AdcChannel) -> Self {
        self.adc_unit = unit;
        self.adc_channel = channel;
        self
    }

    /// Set the rate-adaptation multiplier.
    #[must_use]
    pub fn with_sample_rate_modifier(mut self, modifier: f32) -> Self {
        self.sample_rate_modifier = modifier;
        self
    }

    /// Enable or disable rate adaptation.
    #[must_use]
    pub fn with_rate_adaptation(mut self, enabled: bool) -> Self {
        self.adapt_sample_rate = enabled;
        self
    }

    /// Set the unsupported-format policy.
    #[must_use]
    pub fn with_format_policy(mut self, policy: FormatPolicy) -> Self {
        self.format_policy = policy;
        self
    }

    /// Set the full-ring retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Check the invariants the type system does not already carry.
    ///
    /// # Errors
    ///
    /// - [`RendererError::UnsupportedChannelCount`] unless 1 or 2 slots.
    /// - [`RendererError::InvalidConfig`] for a non-finite or non-positive modifier.
    pub fn validate<E>(&self) -> Result<(), RendererError<E>> {
        if !(1..=2).contains(&self.channel_count) {
            return Err(RendererError::UnsupportedChannelCount(self.channel_count));
        }
        if !self.sample_rate_modifier.is_finite() || self.sample_rate_modifier <= 0.0 {
            return Err(RendererError::InvalidConfig(
                "sample_rate_modifier must be finite and positive",
            ));
        }
        Ok(())
    }

    /// Clock rate to program for a stream announced at `incoming_hz`.
    ///
    /// Truncates toward zero and saturates at `u32::MAX`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn effective_rate(&self, incoming_hz: u32) -> u32 {
        // f32 → u32 `as` saturates; the modifier is validated positive.
        (incoming_hz as f32 * self.sample_rate_modifier) as u32
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            mode: RendererMode::Dac,
            bus: DEFAULT_BUS,
            sample_rate: DEFAULT_SAMPLE_RATE,
            bit_depth: DEFAULT_BIT_DEPTH,
            channel_count: DEFAULT_CHANNELS,
            use_high_precision_clock: false,
            adc_unit: AdcUnit::Unit1,
            adc_channel: AdcChannel::clamped(Self::DEFAULT_ADC_CHANNEL),
            sample_rate_modifier: 1.0,
            adapt_sample_rate: true,
            format_policy: FormatPolicy::Strict,
            retry: RetryPolicy::UNBOUNDED,
        }
    }
}
