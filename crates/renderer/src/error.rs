//! Renderer error types.

use thiserror_no_std::Error;

/// Errors returned by renderer operations.
///
/// `E` is the bus driver's error type. Driver failures are never swallowed:
/// a failed install leaves the renderer unconfigured rather than pretending
/// the hardware is ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RendererError<E> {
    /// No configuration is active on this bus (never configured, or destroyed).
    #[error("renderer not configured")]
    NotConfigured,
    /// Bit depth the bus or the sample path cannot handle.
    #[error("unsupported bit depth: {0}")]
    UnsupportedBitDepth(u8),
    /// Channel count outside 1..=2.
    #[error("unsupported channel count: {0}")]
    UnsupportedChannelCount(u8),
    /// Operation needs a mode the renderer is not configured for.
    #[error("operation not supported in the configured mode")]
    UnsupportedMode,
    /// ADC gating requested while the mode has no receive path.
    #[error("configured mode has no ADC path")]
    AdcUnavailable,
    /// Destination shorter than the converted output.
    #[error("buffer too small: need {needed} bytes, got {actual}")]
    BufferTooSmall {
        /// Required length.
        needed: usize,
        /// Provided length.
        actual: usize,
    },
    /// Configuration rejected by validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
    /// The configuration names a different bus than the one this renderer owns.
    #[error("configuration targets another bus")]
    BusMismatch,
    /// Bus driver failure.
    #[error("bus error: {0:?}")]
    Bus(E),
}

impl<E> RendererError<E> {
    /// Short name for log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NotConfigured => "NotConfigured",
            Self::UnsupportedBitDepth(_) => "UnsupportedBitDepth",
            Self::UnsupportedChannelCount(_) => "UnsupportedChannelCount",
            Self::UnsupportedMode => "UnsupportedMode",
            Self::AdcUnavailable => "AdcUnavailable",
            Self::BufferTooSmall { .. } => "BufferTooSmall",
            Self::InvalidConfig(_) => "InvalidConfig",
            Self::BusMismatch => "BusMismatch",
            Self::Bus(_) => "Bus",
        }
    }
}

/// Errors returned by [`crate::RendererRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegistryError<E> {
    /// A bus with the same id is already attached.
    #[error("bus already attached")]
    BusAlreadyAttached,
    /// No free slot.
    #[error("registry full")]
    RegistryFull,
    /// No bus with that id is attached.
    #[error("unknown bus")]
    UnknownBus,
    /// The renderer for the bus failed.
    #[error("renderer error: {0}")]
    Renderer(RendererError<E>),
}

impl<E> From<RendererError<E>> for RegistryError<E> {
    fn from(err: RendererError<E>) -> Self {
        Self::Renderer(err)
    }
}
