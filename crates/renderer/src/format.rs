//! Source PCM format descriptors and render results.

/// Channel arrangement inside a source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PcmLayout {
    /// `L R L R ...`
    Interleaved,
    /// All left samples, then all right samples.
    LeftRightSplit,
}

/// Describes the samples in one buffer handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PcmFormat {
    /// Bits per source sample.
    pub bit_depth: u8,
    /// Source channels.
    pub channels: u8,
    /// Channel arrangement.
    pub layout: PcmLayout,
    /// Rate the producer decoded at.
    pub sample_rate: u32,
}

impl PcmFormat {
    /// Interleaved 16-bit stereo, the common decoder output.
    pub const fn stereo16(sample_rate: u32) -> Self {
        Self {
            bit_depth: 16,
            channels: 2,
            layout: PcmLayout::Interleaved,
            sample_rate,
        }
    }

    /// Bytes per source sample (0 for sub-byte depths).
    pub fn bytes_per_sample(&self) -> usize {
        usize::from(self.bit_depth / 8)
    }

    /// Whole frames (one sample per channel) in `len` bytes.
    pub fn frames_in(&self, len: usize) -> usize {
        let frame_bytes = self.bytes_per_sample().saturating_mul(usize::from(self.channels));
        len.checked_div(frame_bytes).unwrap_or(0)
    }
}

/// Which route a buffer took to the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RenderPath {
    /// Written to the DMA ring unchanged.
    Direct,
    /// Repacked frame by frame.
    Repacked,
    /// Not rendered (unsupported format under a silent-drop policy).
    Skipped,
}

/// Outcome of one `render_samples` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RenderReport {
    /// Frames present in the buffer.
    pub frames_total: usize,
    /// Frames the driver accepted.
    pub frames_delivered: usize,
    /// Frames given up on.
    pub frames_dropped: usize,
    /// Route taken.
    pub path: RenderPath,
    /// New bus rate if this buffer triggered rate adaptation.
    pub rate_changed: Option<u32>,
}

impl RenderReport {
    pub(crate) fn new(frames_total: usize, path: RenderPath) -> Self {
        Self {
            frames_total,
            frames_delivered: 0,
            frames_dropped: 0,
            path,
            rate_changed: None,
        }
    }

    /// Every frame reached the driver.
    pub fn is_complete(&self) -> bool {
        self.frames_dropped == 0 && self.frames_delivered == self.frames_total
    }
}
