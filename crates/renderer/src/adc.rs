//! Raw capture and built-in ADC sample conditioning.
//!
//! The on-chip ADC delivers unsigned 12-bit codes in 16-bit little-endian
//! slots, biased to mid-scale. [`rescale_adc16`] removes the bias plus a
//! fixed board calibration offset and widens the result; [`rectify_adc16`]
//! turns signed PCM into a magnitude envelope.
//!
//! Both work only on 16-bit configurations. Any other depth is an
//! [`AdcConvertError::UnsupportedBitDepth`] under [`FormatPolicy::Strict`],
//! and a zero-length conversion under [`FormatPolicy::SilentDrop`].

use embassy_futures::yield_now;
use platform::{BitDepth, I2sBus};
use thiserror_no_std::Error;

use crate::config::{FormatPolicy, RendererConfig};
use crate::error::RendererError;
use crate::frames::{StridedSamples, SAMPLE_BYTES};
use crate::renderer::Renderer;

/// ADC mid-scale code (12-bit converter).
pub const ADC_MID_SCALE: u16 = 2048;

/// Fixed calibration offset measured on the board.
pub const ADC_CALIBRATION_OFFSET: u16 = 300;

/// Code that rescales to zero.
const ADC_ZERO_CODE: u16 = ADC_MID_SCALE + ADC_CALIBRATION_OFFSET;

/// Left shift applied after offset removal.
pub const ADC_RESCALE_SHIFT: u32 = 4;

/// Conversion errors, independent of the bus error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcConvertError {
    /// Configured depth is not 16 bits.
    #[error("unsupported bit depth: {0}")]
    UnsupportedBitDepth(u8),
    /// Destination shorter than the converted output.
    #[error("buffer too small: need {needed}, got {actual}")]
    BufferTooSmall {
        /// Required length (in destination units).
        needed: usize,
        /// Provided length.
        actual: usize,
    },
}

impl<E> From<AdcConvertError> for RendererError<E> {
    fn from(err: AdcConvertError) -> Self {
        match err {
            AdcConvertError::UnsupportedBitDepth(bits) => Self::UnsupportedBitDepth(bits),
            AdcConvertError::BufferTooSmall { needed, actual } => {
                Self::BufferTooSmall { needed, actual }
            }
        }
    }
}

/// `Ok(true)` to convert, `Ok(false)` to silently produce nothing.
fn accepts_16bit(config: &RendererConfig) -> Result<bool, AdcConvertError> {
    match (config.bit_depth, config.format_policy) {
        (BitDepth::Bits16, _) => Ok(true),
        (other, FormatPolicy::Strict) => Err(AdcConvertError::UnsupportedBitDepth(other.bits())),
        (_, FormatPolicy::SilentDrop) => Ok(false),
    }
}

#[allow(clippy::arithmetic_side_effects)] // SAMPLE_BYTES is non-zero
fn sample_count(src: &[u8]) -> usize {
    src.len() / SAMPLE_BYTES
}

fn samples(src: &[u8]) -> StridedSamples<'_, SAMPLE_BYTES> {
    StridedSamples::new(src, 0, SAMPLE_BYTES, sample_count(src))
}

/// Remove the ADC bias and widen: `((code - 2348) << 4) mod 2^16`, per sample.
///
/// Reads whole 16-bit samples from `src` and writes the same number to `dst`.
/// A trailing odd byte is ignored. Returns the number of bytes written.
///
/// # Errors
///
/// - [`AdcConvertError::UnsupportedBitDepth`] (strict policy, non-16-bit config).
/// - [`AdcConvertError::BufferTooSmall`] if `dst` is shorter than the output.
pub fn rescale_adc16(
    config: &RendererConfig,
    dst: &mut [u8],
    src: &[u8],
) -> Result<usize, AdcConvertError> {
    if !accepts_16bit(config)? {
        return Ok(0);
    }
    let len = sample_count(src).saturating_mul(SAMPLE_BYTES);
    if dst.len() < len {
        return Err(AdcConvertError::BufferTooSmall {
            needed: len,
            actual: dst.len(),
        });
    }
    for (out, sample) in dst.chunks_exact_mut(SAMPLE_BYTES).zip(samples(src)) {
        let code = u16::from_le_bytes(sample);
        let rescaled = code
            .wrapping_sub(ADC_ZERO_CODE)
            .wrapping_shl(ADC_RESCALE_SHIFT);
        out.copy_from_slice(&rescaled.to_le_bytes());
    }
    Ok(len)
}

/// Full-wave rectify: each signed 16-bit sample in `src` becomes its magnitude
/// in `dst`, one output sample per input sample. `-32768` maps to `32768`.
///
/// Returns the number of samples written.
///
/// # Errors
///
/// As [`rescale_adc16`], with lengths counted in samples.
pub fn rectify_adc16(
    config: &RendererConfig,
    dst: &mut [u16],
    src: &[u8],
) -> Result<usize, AdcConvertError> {
    if !accepts_16bit(config)? {
        return Ok(0);
    }
    let count = sample_count(src);
    if dst.len() < count {
        return Err(AdcConvertError::BufferTooSmall {
            needed: count,
            actual: dst.len(),
        });
    }
    for (out, sample) in dst.iter_mut().zip(samples(src)) {
        *out = i16::from_le_bytes(sample).unsigned_abs();
    }
    Ok(count)
}

impl<B: I2sBus> Renderer<B> {
    /// Fill `buf` from the receive path, waiting as long as it takes.
    ///
    /// # Errors
    ///
    /// [`RendererError::NotConfigured`], [`RendererError::UnsupportedMode`]
    /// when the mode has no receive path, or a bus error.
    pub async fn read_raw(&mut self, buf: &mut [u8]) -> Result<usize, RendererError<B::Error>> {
        let config = self.require_config()?;
        if !config.mode.has_adc() {
            return Err(RendererError::UnsupportedMode);
        }
        let mut filled = 0usize;
        while let Some(rest) = buf.get_mut(filled..).filter(|r| !r.is_empty()) {
            let read = self
                .bus
                .read_bytes(rest)
                .await
                .map_err(RendererError::Bus)?;
            if read == 0 {
                yield_now().await;
                continue;
            }
            filled = filled.saturating_add(read);
        }
        Ok(filled)
    }

    /// [`rescale_adc16`] against the active configuration.
    ///
    /// # Errors
    ///
    /// [`RendererError::NotConfigured`] or the conversion error.
    pub fn rescale_adc16(&self, dst: &mut [u8], src: &[u8]) -> Result<usize, RendererError<B::Error>> {
        let config = self.require_config()?;
        Ok(rescale_adc16(&config, dst, src)?)
    }

    /// [`rectify_adc16`] against the active configuration.
    ///
    /// # Errors
    ///
    /// [`RendererError::NotConfigured`] or the conversion error.
    pub fn rectify_adc16(&self, dst: &mut [u16], src: &[u8]) -> Result<usize, RendererError<B::Error>> {
        let config = self.require_config()?;
        Ok(rectify_adc16(&config, dst, src)?)
    }
}
