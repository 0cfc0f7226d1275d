//! Serial audio bus (I2S) abstraction
//!
//! The renderer treats the vendor I2S driver as a black box. One implementor
//! of [`I2sBus`] stands for one hardware unit ([`BusId`]); the driver's own
//! resource rules (install before use, uninstall before re-install) are
//! exposed unchanged so the renderer can sequence them.

use core::ops::BitOr;

use embassy_time::Duration;

use crate::audio_types::{AdcChannel, AdcUnit, BitDepth, BusId, SampleRateHz};

/// Serial audio bus trait
pub trait I2sBus {
    /// Error type
    type Error: core::fmt::Debug;

    /// Hardware unit this bus drives.
    fn id(&self) -> BusId;

    /// Install the driver: allocate DMA descriptors and the event queue.
    fn install(
        &mut self,
        config: DriverConfig,
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Release the driver. Succeeds when nothing is installed.
    fn uninstall(&mut self) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Program the bit clock and word-select dividers.
    fn set_clock(
        &mut self,
        rate: SampleRateHz,
        bit_depth: BitDepth,
        channels: u8,
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Reprogram only the sample-rate generator, keeping slot width and channels.
    fn set_sample_rate(
        &mut self,
        rate_hz: u32,
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Route bus signals to GPIO pins (discrete codec wiring only).
    fn set_pins(
        &mut self,
        pins: PinConfig,
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Drive the master clock out of a GPIO for an external codec.
    fn route_clock_output(
        &mut self,
        output: ClockOutput,
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Enable the built-in DAC on the given channels.
    fn set_dac_mode(
        &mut self,
        channels: DacChannels,
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Route the built-in ADC unit/channel into the receive path.
    fn set_adc_mode(
        &mut self,
        unit: AdcUnit,
        channel: AdcChannel,
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Ungate the built-in ADC.
    fn adc_enable(&mut self) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Gate the built-in ADC.
    fn adc_disable(&mut self) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Start clocking the bus.
    fn start(&mut self) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Stop clocking the bus. The driver stays installed.
    fn stop(&mut self) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Fill every DMA buffer with silence.
    fn zero_dma_buffer(&mut self) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Copy as much of `data` into the DMA ring as fits within `timeout`.
    ///
    /// Returns the number of bytes accepted; `0` means the ring is full.
    fn write_bytes(
        &mut self,
        data: &[u8],
        timeout: Duration,
    ) -> impl core::future::Future<Output = Result<usize, Self::Error>>;

    /// Queue one frame (both channels of one sample instant).
    ///
    /// Returns the number of bytes accepted; `0` means the ring is full.
    /// `None` waits until the driver accepts or gives up on its own.
    fn push_sample(
        &mut self,
        frame: &[u8],
        timeout: Option<Duration>,
    ) -> impl core::future::Future<Output = Result<usize, Self::Error>>;

    /// Read captured bytes, waiting until at least one byte is available.
    fn read_bytes(
        &mut self,
        buffer: &mut [u8],
    ) -> impl core::future::Future<Output = Result<usize, Self::Error>>;

    /// Pop the next driver event, if any.
    fn poll_event(&mut self) -> Option<BusEvent>;
}

// ── Mode flags ───────────────────────────────────────────────────────────────

/// Peripheral role flags passed to [`I2sBus::install`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModeFlags(u8);

impl ModeFlags {
    /// Bus generates the clocks.
    pub const MASTER: Self = Self(1 << 0);
    /// Transmit path enabled.
    pub const TX: Self = Self(1 << 1);
    /// Receive path enabled.
    pub const RX: Self = Self(1 << 2);
    /// Transmit into the on-chip DAC instead of the data-out pin.
    pub const DAC_BUILT_IN: Self = Self(1 << 3);
    /// Receive from the on-chip ADC instead of the data-in pin.
    pub const ADC_BUILT_IN: Self = Self(1 << 4);

    /// No flags set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// True when every flag in `other` is set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Raw bit pattern.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl BitOr for ModeFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

// ── Driver configuration ─────────────────────────────────────────────────────

/// Order in which channel slots are clocked out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelFormat {
    /// Two slots per frame, right then left on the wire.
    RightLeft,
    /// Left slot only.
    OnlyLeft,
    /// Right slot only.
    OnlyRight,
}

/// Frame framing on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommFormat {
    /// Philips I2S: data delayed one bit clock after word-select.
    I2s,
    /// MSB-justified.
    Msb,
}

/// Everything the driver needs at install time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriverConfig {
    /// Role flags.
    pub mode: ModeFlags,
    /// Initial sample rate.
    pub sample_rate: SampleRateHz,
    /// Slot width.
    pub bit_depth: BitDepth,
    /// Slot order.
    pub channel_format: ChannelFormat,
    /// Wire framing.
    pub comm_format: CommFormat,
    /// Number of DMA descriptors.
    pub dma_buf_count: u16,
    /// Frames per DMA descriptor.
    pub dma_buf_len: u16,
    /// Use the audio PLL instead of the main PLL divider.
    pub use_apll: bool,
}

/// GPIO assignment for discrete codec wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinConfig {
    /// Bit clock.
    pub bck: u8,
    /// Word select (LRCK).
    pub ws: u8,
    /// Serial data out.
    pub data_out: u8,
    /// Serial data in.
    pub data_in: u8,
}

/// Master-clock output routing for an external codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockOutput {
    /// GPIO carrying the clock.
    pub pin: u8,
    /// Value written to the pin-control register selecting the clock source.
    pub pin_ctrl: u32,
}

/// Built-in DAC channel enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DacChannels {
    /// Right DAC only.
    Right,
    /// Left DAC only.
    Left,
    /// Both DACs.
    Both,
}

/// Driver event-queue items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusEvent {
    /// A transmit descriptor was sent. Fires once per descriptor; the renderer
    /// counts it as a possible underflow.
    TxDone,
    /// A receive descriptor was filled.
    RxDone,
    /// DMA bus error.
    DmaError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_flags_union_and_contains() {
        let flags = ModeFlags::MASTER | ModeFlags::TX | ModeFlags::DAC_BUILT_IN;
        assert!(flags.contains(ModeFlags::MASTER));
        assert!(flags.contains(ModeFlags::TX | ModeFlags::DAC_BUILT_IN));
        assert!(!flags.contains(ModeFlags::RX));
        assert!(ModeFlags::empty().contains(ModeFlags::empty()));
    }

    #[test]
    fn mode_flags_are_distinct_bits() {
        let all = [
            ModeFlags::MASTER,
            ModeFlags::TX,
            ModeFlags::RX,
            ModeFlags::DAC_BUILT_IN,
            ModeFlags::ADC_BUILT_IN,
        ];
        let combined = all.iter().fold(ModeFlags::empty(), |acc, f| acc | *f);
        assert_eq!(combined.bits().count_ones(), 5);
    }
}
