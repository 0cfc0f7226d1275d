//! Board wiring and DMA sizing for the serial audio bus.
//!
//! # Discrete codec wiring
//!
//! | Function       | GPIO |
//! |----------------|------|
//! | BCK (bit clk)  | 18   |
//! | WS (LRCK)      | 5    |
//! | DATA_OUT       | 32   |
//! | DATA_IN        | 35   |
//! | MCLK (CLK_OUT1)| 0    |
//!
//! The external codec has no crystal; it is clocked from CLK_OUT1 on GPIO0.
//! `PIN_CTRL = 0xFFF0` selects the I2S0 master clock for CLK_OUT1.
//!
//! # DMA sizing
//!
//! The ring must hold at least one full decoder output frame so the sample
//! path does not stall on every frame. HE-AAC (AAC+) produces the largest
//! frames of the supported decoders: 2048 frames after SBR upsampling.
//!
//! ```text
//! bytes = (bits_per_sample / 8) * channels * dma_buf_count * dma_buf_len
//!  16 bit: 2 * 2 * 16 * 128 =  8192 bytes
//!  32 bit: 4 * 2 * 16 * 128 = 16384 bytes
//! ```

use crate::audio_types::{BitDepth, BusId, SampleRateHz};
use crate::i2s::{ChannelFormat, ClockOutput, CommFormat, DriverConfig, ModeFlags, PinConfig};

/// Number of DMA descriptors in the ring.
pub const DMA_BUF_COUNT: u16 = 16;

/// Frames per DMA descriptor.
pub const DMA_BUF_LEN: u16 = 128;

/// Largest decoder output frame the ring must absorb (HE-AAC, frames).
pub const MAX_DECODE_FRAME: u32 = 2048;

/// Discrete codec pin assignment.
pub const DISCRETE_PINS: PinConfig = PinConfig {
    bck: 18,
    ws: 5,
    data_out: 32,
    data_in: 35,
};

/// Master-clock output for the external codec: GPIO0 as CLK_OUT1.
pub const CODEC_CLOCK_OUTPUT: ClockOutput = ClockOutput {
    pin: 0,
    pin_ctrl: 0xFFF0,
};

/// Default bus unit.
pub const DEFAULT_BUS: BusId = BusId::I2s0;

/// Default channel count negotiated with the bus.
pub const DEFAULT_CHANNELS: u8 = 2;

/// Default slot width.
pub const DEFAULT_BIT_DEPTH: BitDepth = BitDepth::Bits16;

/// Default sample rate.
pub const DEFAULT_SAMPLE_RATE: SampleRateHz = SampleRateHz::CD;

/// Total frames held by the DMA ring.
#[must_use]
pub const fn dma_capacity_frames() -> u32 {
    DMA_BUF_COUNT as u32 * DMA_BUF_LEN as u32
}

/// Total bytes held by the DMA ring for the given slot width and channel count.
#[must_use]
#[allow(clippy::arithmetic_side_effects)] // Max: 4 * 255 * 2048, well inside usize
pub fn dma_capacity_bytes(bit_depth: BitDepth, channels: u8) -> usize {
    bit_depth.bytes_per_sample() * usize::from(channels) * dma_capacity_frames() as usize
}

/// Build the install-time driver configuration with the fixed DMA policy.
#[must_use]
pub fn driver_config(
    mode: ModeFlags,
    sample_rate: SampleRateHz,
    bit_depth: BitDepth,
    use_apll: bool,
) -> DriverConfig {
    DriverConfig {
        mode,
        sample_rate,
        bit_depth,
        channel_format: ChannelFormat::RightLeft,
        comm_format: CommFormat::I2s,
        dma_buf_count: DMA_BUF_COUNT,
        dma_buf_len: DMA_BUF_LEN,
        use_apll,
    }
}
