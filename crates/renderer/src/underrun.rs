//! DMA underflow tracking.
//!
//! The driver posts a [`BusEvent::TxDone`] each time it finishes sending a
//! transmit descriptor. The monitor follows the board firmware's reading of
//! that event as an underflow: a descriptor drained while the producer was
//! meant to keep the ring topped up. It is a coarse signal, since the event
//! also fires for descriptors that were refilled in time. The renderer never
//! blocks on these events; callers poll them with
//! [`Renderer::poll_underflow`] and decide for themselves whether to raise
//! the producer's priority, grow their decode buffer, or just count glitches.
//!
//! # Usage Pattern
//!
//! ```rust,ignore
//! loop {
//!     let pcm = decoder.next_frame().await;
//!     renderer.render_samples(pcm, &format).await?;
//!
//!     let monitor = renderer.poll_underflow()?;
//!     if monitor.is_underflowing() {
//!         stats.glitches += u32::from(monitor.underflow_count());
//!         renderer.clear_underflow();
//!     }
//! }
//! ```

use platform::{BusEvent, I2sBus};

use crate::error::RendererError;
use crate::renderer::Renderer;

// ─── State machine ───────────────────────────────────────────────────────────

/// Underflow state.
///
/// Counts saturate at [`u8::MAX`] so a long stall cannot wrap back to a
/// small number before the caller looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UnderflowState {
    /// No drained descriptor seen since the last reset.
    Healthy,
    /// One or more `TxDone` events seen.
    Underflowing {
        /// Drained descriptors since the last reset. Saturates at 255.
        count: u8,
    },
}

/// Transmit-ring health as seen through the driver event queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnderflowMonitor {
    state: UnderflowState,
    dma_errors: u8,
}

impl UnderflowMonitor {
    /// Healthy, with no DMA errors.
    pub const fn new() -> Self {
        Self {
            state: UnderflowState::Healthy,
            dma_errors: 0,
        }
    }

    /// Fold one driver event into the state.
    ///
    /// - `TxDone`: enter or stay in `Underflowing`, count + 1 (saturating).
    /// - `DmaError`: DMA error count + 1 (saturating); underflow state unchanged.
    /// - `RxDone`: ignored.
    pub fn on_event(&mut self, event: BusEvent) {
        match event {
            BusEvent::TxDone => {
                self.state = UnderflowState::Underflowing {
                    count: match self.state {
                        UnderflowState::Underflowing { count } => count.saturating_add(1),
                        UnderflowState::Healthy => 1,
                    },
                };
            }
            BusEvent::DmaError => self.dma_errors = self.dma_errors.saturating_add(1),
            BusEvent::RxDone => {}
        }
    }

    /// Back to `Healthy` with zero DMA errors. Safe to call when healthy.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Current underflow state.
    pub fn state(&self) -> UnderflowState {
        self.state
    }

    /// At least one `TxDone` seen since the last reset.
    pub fn is_underflowing(&self) -> bool {
        matches!(self.state, UnderflowState::Underflowing { .. })
    }

    /// Drained descriptors since the last reset, 0 when healthy.
    pub fn underflow_count(&self) -> u8 {
        match self.state {
            UnderflowState::Underflowing { count } => count,
            UnderflowState::Healthy => 0,
        }
    }

    /// DMA errors since the last reset.
    pub fn dma_errors(&self) -> u8 {
        self.dma_errors
    }
}

impl Default for UnderflowMonitor {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Renderer integration ────────────────────────────────────────────────────

impl<B: I2sBus> Renderer<B> {
    /// Drain pending driver events into the monitor and return a snapshot.
    ///
    /// Never blocks. The monitor is reset by [`start`](Self::start),
    /// [`configure`](Self::configure) and [`clear_underflow`](Self::clear_underflow).
    ///
    /// # Errors
    ///
    /// [`RendererError::NotConfigured`].
    pub fn poll_underflow(&mut self) -> Result<UnderflowMonitor, RendererError<B::Error>> {
        self.require_config()?;
        let before = self.underflow.underflow_count();
        while let Some(event) = self.bus.poll_event() {
            self.underflow.on_event(event);
        }
        let after = self.underflow.underflow_count();
        if after != before {
            warn!("DMA underflow on I2S{}: {} descriptors", self.bus.id().index(), after);
        }
        Ok(self.underflow)
    }

    /// Acknowledge reported underflows.
    pub fn clear_underflow(&mut self) {
        self.underflow.reset();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
