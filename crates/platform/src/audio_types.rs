//! Audio domain newtypes for compile-time safety.
//!
//! These zero-cost abstractions prevent common errors:
//! - `BusId`: one of the fixed serial-audio hardware units, never a raw integer
//! - `BitDepth`: only the 16/32-bit slot widths the bus can clock
//! - `SampleRateHz`: validates 8000–768000 Hz range
//! - `AdcUnit` / `AdcChannel`: built-in ADC routing, validated on construction

use thiserror_no_std::Error;

// ── Error types ──────────────────────────────────────────────────────────────

/// Error returned when a value is out of the valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[error("value {value} outside {min}..={max}")]
pub struct OutOfRangeError {
    /// The value that was out of range.
    pub value: u32,
    /// The inclusive minimum allowed value.
    pub min: u32,
    /// The inclusive maximum allowed value.
    pub max: u32,
}

/// Error returned when a bit width is not a bus slot width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[error("unsupported bit depth: {0}")]
pub struct UnsupportedBitDepth(pub u8);

// ── BusId ────────────────────────────────────────────────────────────────────

/// Serial audio bus hardware unit.
///
/// The SoC exposes exactly two I2S controllers. Only one renderer may hold
/// a driver installation on a unit at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusId {
    /// I2S controller 0.
    I2s0,
    /// I2S controller 1.
    I2s1,
}

impl BusId {
    /// Zero-based hardware unit number.
    #[must_use]
    pub fn index(self) -> u8 {
        match self {
            Self::I2s0 => 0,
            Self::I2s1 => 1,
        }
    }
}

impl TryFrom<u8> for BusId {
    type Error = OutOfRangeError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        match index {
            0 => Ok(Self::I2s0),
            1 => Ok(Self::I2s1),
            _ => Err(OutOfRangeError {
                value: u32::from(index),
                min: 0,
                max: 1,
            }),
        }
    }
}

// ── BitDepth ─────────────────────────────────────────────────────────────────

/// Bits per sample slot on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitDepth {
    /// 16-bit slots.
    Bits16,
    /// 32-bit slots.
    Bits32,
}

impl BitDepth {
    /// Slot width in bits.
    #[must_use]
    pub fn bits(self) -> u8 {
        match self {
            Self::Bits16 => 16,
            Self::Bits32 => 32,
        }
    }

    /// Slot width in bytes.
    #[must_use]
    pub fn bytes_per_sample(self) -> usize {
        match self {
            Self::Bits16 => 2,
            Self::Bits32 => 4,
        }
    }
}

impl TryFrom<u8> for BitDepth {
    type Error = UnsupportedBitDepth;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        match bits {
            16 => Ok(Self::Bits16),
            32 => Ok(Self::Bits32),
            other => Err(UnsupportedBitDepth(other)),
        }
    }
}

// ── SampleRateHz ─────────────────────────────────────────────────────────────

/// Sample rate in Hz, validated to the range the bus clock divider can reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct SampleRateHz(u32);

impl SampleRateHz {
    /// Minimum supported sample rate: 8000 Hz (telephony).
    pub const MIN_HZ: u32 = 8_000;

    /// Maximum supported sample rate: 768000 Hz.
    pub const MAX_HZ: u32 = 768_000;

    /// CD-quality default.
    pub const CD: Self = Self(44_100);

    /// Create a `SampleRateHz`, returning an error if out of 8000–768000 Hz.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] if `hz < 8000` or `hz > 768000`.
    pub fn new(hz: u32) -> Result<Self, OutOfRangeError> {
        if hz < Self::MIN_HZ || hz > Self::MAX_HZ {
            Err(OutOfRangeError {
                value: hz,
                min: Self::MIN_HZ,
                max: Self::MAX_HZ,
            })
        } else {
            Ok(Self(hz))
        }
    }

    /// Return the sample rate in Hz.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }
}

// ── Built-in ADC routing ─────────────────────────────────────────────────────

/// On-chip SAR ADC unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcUnit {
    /// ADC1 (the only unit the I2S peripheral can sample from).
    Unit1,
    /// ADC2.
    Unit2,
}

/// Input channel of an [`AdcUnit`] (0–9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct AdcChannel(u8);

impl AdcChannel {
    /// Highest channel number on either unit.
    pub const MAX: u8 = 9;

    /// Create an `AdcChannel`.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] if `channel > 9`.
    pub fn new(channel: u8) -> Result<Self, OutOfRangeError> {
        if channel > Self::MAX {
            Err(OutOfRangeError {
                value: u32::from(channel),
                min: 0,
                max: u32::from(Self::MAX),
            })
        } else {
            Ok(Self(channel))
        }
    }

    /// Create an `AdcChannel`, clamping values above 9 to 9.
    #[must_use]
    pub const fn clamped(channel: u8) -> Self {
        if channel > Self::MAX {
            Self(Self::MAX)
        } else {
            Self(channel)
        }
    }

    /// Return the channel number.
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}
