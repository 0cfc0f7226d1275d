//! Per-frame wire packing for the slow path.
//!
//! ```text
//! Built-in DAC     u32 LE: (L + 0x8000) << 16 | (R + 0x8000)      4 bytes
//! Discrete 16-bit  L0 L1 R0 R1                                     4 bytes
//! Discrete 32-bit  00 00 L0 L1 00 00 R0 R1                         8 bytes
//! ```
//!
//! The on-chip DAC is unsigned: adding 0x8000 (mod 2^16) maps -32768 to 0
//! and 32767 to 65535. In 32-bit slots the 16-bit sample occupies the upper
//! half of each little-endian word, so the codec sees it MSB-aligned.

use platform::BitDepth;

use crate::config::RendererMode;
use crate::frames::StereoFrame;

/// Largest packed frame in bytes.
pub const MAX_WIRE_FRAME: usize = 8;

/// Offset from signed PCM to the built-in DAC's unsigned code.
const DAC_OFFSET: u16 = 0x8000;

/// How a frame is laid out on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WireFormat {
    /// Offset-binary word for the on-chip DAC.
    BuiltInDac,
    /// Two 16-bit slots.
    Slot16,
    /// Two 32-bit slots, sample in the upper half.
    Slot32,
}

impl WireFormat {
    /// Wire format for a transmit mode and slot width.
    pub fn for_target(mode: RendererMode, bit_depth: BitDepth) -> Self {
        match (mode.is_built_in_dac(), bit_depth) {
            (true, _) => Self::BuiltInDac,
            (false, BitDepth::Bits16) => Self::Slot16,
            (false, BitDepth::Bits32) => Self::Slot32,
        }
    }

    /// Packed frame length in bytes.
    pub fn frame_len(self) -> usize {
        match self {
            Self::BuiltInDac | Self::Slot16 => 4,
            Self::Slot32 => 8,
        }
    }

    /// Pack one source frame.
    pub fn pack(self, frame: &StereoFrame) -> WireFrame {
        let bytes = match self {
            Self::BuiltInDac => {
                let left = u16::from_le_bytes(frame.left).wrapping_add(DAC_OFFSET);
                let right = u16::from_le_bytes(frame.right).wrapping_add(DAC_OFFSET);
                let word = u32::from(left).wrapping_shl(16) | u32::from(right);
                let [b0, b1, b2, b3] = word.to_le_bytes();
                [b0, b1, b2, b3, 0, 0, 0, 0]
            }
            Self::Slot16 => {
                let [l0, l1] = frame.left;
                let [r0, r1] = frame.right;
                [l0, l1, r0, r1, 0, 0, 0, 0]
            }
            Self::Slot32 => {
                let [l0, l1] = frame.left;
                let [r0, r1] = frame.right;
                [0, 0, l0, l1, 0, 0, r0, r1]
            }
        };
        WireFrame {
            bytes,
            len: self.frame_len(),
        }
    }
}

/// One packed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireFrame {
    bytes: [u8; MAX_WIRE_FRAME],
    len: usize,
}

impl WireFrame {
    /// Bytes to hand to the driver.
    pub fn as_bytes(&self) -> &[u8] {
        self.bytes.get(..self.len).unwrap_or(&self.bytes)
    }
}
