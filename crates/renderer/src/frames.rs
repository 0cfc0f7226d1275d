//! Typed, bounds-checked views over 16-bit PCM byte buffers.
//!
//! The slow path walks a left and a right cursor through the source buffer.
//! Where the cursors start and how far they step depends on the layout:
//!
//! ```text
//! Interleaved stereo   L0 L0 R0 R0 L1 L1 R1 R1 ...   left@0  right@2    stride 4
//! Left/right split     L0 L0 L1 L1 ... R0 R0 R1 R1   left@0  right@mid  stride 2
//! Mono (either)        S0 S0 S1 S1 ...               left@0  right@0    stride 2
//! ```
//!
//! Every read goes through `slice::get`, so a short or odd-length buffer
//! ends the iteration instead of reading past the end.

use crate::format::PcmLayout;

/// Width of one 16-bit source sample in bytes.
pub const SAMPLE_BYTES: usize = 2;

/// Fixed-width samples at a constant stride.
#[derive(Debug, Clone)]
pub struct StridedSamples<'a, const W: usize> {
    data: &'a [u8],
    pos: usize,
    stride: usize,
    remaining: usize,
}

impl<'a, const W: usize> StridedSamples<'a, W> {
    /// `count` samples of `W` bytes starting at `offset`, `stride` bytes apart.
    pub fn new(data: &'a [u8], offset: usize, stride: usize, count: usize) -> Self {
        Self {
            data,
            pos: offset,
            stride,
            remaining: count,
        }
    }
}

impl<const W: usize> Iterator for StridedSamples<'_, W> {
    type Item = [u8; W];

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let end = self.pos.checked_add(W)?;
        let sample: [u8; W] = self.data.get(self.pos..end)?.try_into().ok()?;
        self.pos = self.pos.saturating_add(self.stride);
        self.remaining = self.remaining.saturating_sub(1);
        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

/// One source frame: a left and a right 16-bit sample, bytes as stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StereoFrame {
    /// Left sample, little-endian.
    pub left: [u8; SAMPLE_BYTES],
    /// Right sample, little-endian (equal to `left` for mono sources).
    pub right: [u8; SAMPLE_BYTES],
}

impl StereoFrame {
    /// Left sample as signed PCM.
    pub fn left_i16(&self) -> i16 {
        i16::from_le_bytes(self.left)
    }

    /// Right sample as signed PCM.
    pub fn right_i16(&self) -> i16 {
        i16::from_le_bytes(self.right)
    }
}

/// Frame iterator over a 16-bit source buffer.
#[derive(Debug, Clone)]
pub struct StereoFrames<'a> {
    left: StridedSamples<'a, SAMPLE_BYTES>,
    right: StridedSamples<'a, SAMPLE_BYTES>,
    frames: usize,
}

impl<'a> StereoFrames<'a> {
    /// Walk `data` as 16-bit PCM with `channels` (1 or 2) in `layout`.
    ///
    /// Trailing bytes that do not complete a frame are ignored.
    #[allow(clippy::arithmetic_side_effects)] // frames * SAMPLE_BYTES <= data.len()
    pub fn new(data: &'a [u8], layout: PcmLayout, channels: u8) -> Self {
        let frame_bytes = SAMPLE_BYTES * usize::from(channels.max(1));
        let frames = data.len() / frame_bytes;

        let (right_offset, stride) = match (channels, layout) {
            (0 | 1, _) => (0, SAMPLE_BYTES),
            (_, PcmLayout::Interleaved) => (SAMPLE_BYTES, 2 * SAMPLE_BYTES),
            (_, PcmLayout::LeftRightSplit) => (frames * SAMPLE_BYTES, SAMPLE_BYTES),
        };

        Self {
            left: StridedSamples::new(data, 0, stride, frames),
            right: StridedSamples::new(data, right_offset, stride, frames),
            frames,
        }
    }

    /// Total frames the iterator will yield.
    pub fn frame_count(&self) -> usize {
        self.frames
    }
}

impl Iterator for StereoFrames<'_> {
    type Item = StereoFrame;

    fn next(&mut self) -> Option<Self::Item> {
        Some(StereoFrame {
            left: self.left.next()?,
            right: self.right.next()?,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.left.size_hint()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn pcm(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    #[test]
    fn interleaved_stereo_pairs_adjacent_samples() {
        let data = pcm(&[1, -1, 2, -2, 3, -3]);
        let frames: Vec<_> = StereoFrames::new(&data, PcmLayout::Interleaved, 2)
            .map(|f| (f.left_i16(), f.right_i16()))
            .collect();
        assert_eq!(frames, vec![(1, -1), (2, -2), (3, -3)]);
    }

    #[test]
    fn split_layout_reads_right_from_second_half() {
        let data = pcm(&[1, 2, 3, -1, -2, -3]);
        let frames: Vec<_> = StereoFrames::new(&data, PcmLayout::LeftRightSplit, 2)
            .map(|f| (f.left_i16(), f.right_i16()))
            .collect();
        assert_eq!(frames, vec![(1, -1), (2, -2), (3, -3)]);
    }

    #[test]
    fn mono_duplicates_each_sample() {
        let data = pcm(&[10, 20, 30]);
        for layout in [PcmLayout::Interleaved, PcmLayout::LeftRightSplit] {
            let frames: Vec<_> = StereoFrames::new(&data, layout, 1)
                .map(|f| (f.left_i16(), f.right_i16()))
                .collect();
            assert_eq!(frames, vec![(10, 10), (20, 20), (30, 30)]);
        }
    }

    #[test]
    fn trailing_partial_frame_is_ignored() {
        let mut data = pcm(&[1, -1, 2, -2]);
        data.extend_from_slice(&[0xAA, 0xBB, 0xCC]);
        let frames = StereoFrames::new(&data, PcmLayout::Interleaved, 2);
        assert_eq!(frames.frame_count(), 2);
        assert_eq!(frames.count(), 2);
    }

    #[test]
    fn byte_order_is_preserved() {
        let data = [0x34, 0x12, 0x78, 0x56];
        let frame = StereoFrames::new(&data, PcmLayout::Interleaved, 2)
            .next()
            .unwrap();
        assert_eq!(frame.left, [0x34, 0x12]);
        assert_eq!(frame.right, [0x78, 0x56]);
        assert_eq!(frame.left_i16(), 0x1234);
    }

    #[test]
    fn strided_samples_stop_at_buffer_end() {
        let data = [0u8; 5];
        let samples: Vec<[u8; 2]> = StridedSamples::new(&data, 0, 2, 10).collect();
        assert_eq!(samples.len(), 2);
    }
}
