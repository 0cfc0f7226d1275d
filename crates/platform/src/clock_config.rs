//! Bus clock derivation for the serial audio peripheral.
//!
//! # Clock Tree
//!
//! ```text
//! PLL_D2 (160 MHz) ──┐
//!                    ├──> I2S module clock ──> MCLK (256 x fs) ──> BCLK ──> WS (fs)
//! APLL (fractional) ─┘
//! ```
//!
//! The integer PLL divider cannot hit 44.1 kHz family rates exactly; the
//! audio PLL (APLL) trades a few microseconds of lock time for a fractional
//! synthesiser that can. `use_high_precision_clock` selects it.
//!
//! `BCLK = bits x channels x fs`, `MCLK = 256 x fs`.

use crate::audio_types::{BitDepth, SampleRateHz};

/// MCLK/fs ratio used for every external codec on the board.
pub const MCLK_FS_RATIO: u32 = 256;

/// Integer-divider source clock (Hz).
pub const PLL_D2_HZ: u32 = 160_000_000;

/// Clock sources able to feed the I2S module clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockSource {
    /// Main PLL divided by two, integer dividers only.
    PllD2,
    /// Audio PLL, fractional synthesiser.
    Apll,
}

/// Derived clock frequencies for one bus configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockPlan {
    /// Selected module clock source.
    pub source: ClockSource,
    /// Word-select frequency (= sample rate).
    pub sample_rate_hz: u32,
    /// Bit clock.
    pub bclk_hz: u32,
    /// Master clock.
    pub mclk_hz: u32,
}

impl ClockPlan {
    /// Derive bit and master clocks.
    ///
    /// `channels` is the slot count on the bus, not the source stream's.
    #[must_use]
    pub fn new(
        rate: SampleRateHz,
        bit_depth: BitDepth,
        channels: u8,
        high_precision: bool,
    ) -> Self {
        let fs = rate.get();
        let bits_per_frame = u32::from(bit_depth.bits()).saturating_mul(u32::from(channels));
        Self {
            source: if high_precision {
                ClockSource::Apll
            } else {
                ClockSource::PllD2
            },
            sample_rate_hz: fs,
            bclk_hz: bits_per_frame.saturating_mul(fs),
            mclk_hz: MCLK_FS_RATIO.saturating_mul(fs),
        }
    }

    /// Integer MCLK divider from PLL_D2 (truncated); `None` when the APLL is used.
    #[must_use]
    pub fn pll_divider(&self) -> Option<u32> {
        match self.source {
            ClockSource::PllD2 => PLL_D2_HZ.checked_div(self.mclk_hz),
            ClockSource::Apll => None,
        }
    }
}
