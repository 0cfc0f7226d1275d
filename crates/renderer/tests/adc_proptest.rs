//! Property-based tests for ADC conditioning and frame repacking.
//! Verifies invariants hold for ALL sample values, not just fixed examples.
// Integration test file: unwrap and unchecked math are intentional test mechanisms.
#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation
)]

use platform::{BitDepth, BusId};
use renderer::frames::{StereoFrame, StereoFrames};
use renderer::pack::WireFormat;
use renderer::{rectify_adc16, rescale_adc16, PcmLayout, RendererConfig, RendererMode};

fn adc_config() -> RendererConfig {
    RendererConfig::new(RendererMode::AdcBuiltIn, BusId::I2s0)
}

proptest::proptest! {
    /// Rescale matches the offset-and-shift formula for every 16-bit code.
    #[test]
    fn rescale_matches_wrapping_formula(code in proptest::num::u16::ANY) {
        let mut dst = [0u8; 2];
        let n = rescale_adc16(&adc_config(), &mut dst, &code.to_le_bytes()).unwrap();
        assert_eq!(n, 2);
        let expected = ((i32::from(code) - 2348) << 4) as u16;
        assert_eq!(u16::from_le_bytes(dst), expected);
    }

    /// Rescale output is always a multiple of 16 (low nibble cleared).
    #[test]
    fn rescale_clears_low_nibble(codes in proptest::collection::vec(proptest::num::u16::ANY, 0..64)) {
        let src: Vec<u8> = codes.iter().flat_map(|c| c.to_le_bytes()).collect();
        let mut dst = vec![0u8; src.len()];
        rescale_adc16(&adc_config(), &mut dst, &src).unwrap();
        for pair in dst.chunks_exact(2) {
            assert_eq!(u16::from_le_bytes([pair[0], pair[1]]) & 0xF, 0);
        }
    }

    /// Rectify is |x| for every i16, one output per input.
    #[test]
    fn rectify_is_absolute_value(samples in proptest::collection::vec(proptest::num::i16::ANY, 0..64)) {
        let src: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        let mut dst = vec![0u16; samples.len()];
        let n = rectify_adc16(&adc_config(), &mut dst, &src).unwrap();
        assert_eq!(n, samples.len());
        for (out, s) in dst.iter().zip(&samples) {
            assert_eq!(u32::from(*out), i32::from(*s).unsigned_abs());
        }
    }

    /// Built-in DAC packing is monotone: larger signed input, larger unsigned code.
    #[test]
    fn built_in_dac_offset_is_monotone(a in proptest::num::i16::ANY, b in proptest::num::i16::ANY) {
        let code = |v: i16| {
            let frame = StereoFrame { left: v.to_le_bytes(), right: v.to_le_bytes() };
            let bytes = WireFormat::BuiltInDac.pack(&frame);
            u32::from_le_bytes(bytes.as_bytes().try_into().unwrap()) & 0xFFFF
        };
        assert_eq!(a < b, code(a) < code(b));
        assert_eq!(code(a), (i32::from(a) + 0x8000) as u32);
    }

    /// Split-layout frames reproduce the left and right halves in order.
    #[test]
    fn split_layout_round_trips_halves(
        left in proptest::collection::vec(proptest::num::i16::ANY, 1..32),
        seed in proptest::num::i16::ANY,
    ) {
        let right: Vec<i16> = left.iter().map(|l| l.wrapping_add(seed)).collect();
        let src: Vec<u8> = left.iter().chain(&right).flat_map(|s| s.to_le_bytes()).collect();
        let frames: Vec<(i16, i16)> = StereoFrames::new(&src, PcmLayout::LeftRightSplit, 2)
            .map(|f| (f.left_i16(), f.right_i16()))
            .collect();
        let expected: Vec<(i16, i16)> = left.iter().copied().zip(right.iter().copied()).collect();
        assert_eq!(frames, expected);
    }

    /// Wide slots keep the sample bytes and zero the padding.
    #[test]
    fn slot32_padding_is_zero(l in proptest::num::i16::ANY, r in proptest::num::i16::ANY) {
        let frame = StereoFrame { left: l.to_le_bytes(), right: r.to_le_bytes() };
        let wire = WireFormat::for_target(RendererMode::Dac, BitDepth::Bits32).pack(&frame);
        let bytes = wire.as_bytes();
        assert_eq!(bytes.len(), 8);
        assert_eq!(&bytes[0..2], &[0, 0]);
        assert_eq!(&bytes[4..6], &[0, 0]);
        assert_eq!(&bytes[2..4], &l.to_le_bytes());
        assert_eq!(&bytes[6..8], &r.to_le_bytes());
    }
}
