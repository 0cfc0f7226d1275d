//! Full-ring retry policy.
//!
//! A push that the driver answers with zero bytes accepted means the DMA ring
//! is full. That is backpressure, not an error: the same frame is offered
//! again. The policy decides how many times, and what happens when the budget
//! runs out.

use core::num::NonZeroU32;

/// What to do when a frame exhausts its retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Exhausted {
    /// Drop this frame and carry on with the next one.
    SkipFrame,
    /// Drop the rest of the buffer.
    AbortBuffer,
}

/// Retry budget for one frame (slow path) or one stalled write (fast path).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RetryPolicy {
    /// Attempts per frame including the first; `None` retries forever.
    pub max_attempts: Option<NonZeroU32>,
    /// Action once `max_attempts` is reached.
    pub on_exhausted: Exhausted,
}

impl RetryPolicy {
    /// Retry until the driver accepts. Never drops audio; may stall the caller.
    pub const UNBOUNDED: Self = Self {
        max_attempts: None,
        on_exhausted: Exhausted::SkipFrame,
    };

    /// Give up after `attempts` tries and apply `on_exhausted`.
    ///
    /// `attempts == 0` is treated as 1.
    pub const fn bounded(attempts: u32, on_exhausted: Exhausted) -> Self {
        let max_attempts = match NonZeroU32::new(attempts) {
            Some(n) => n,
            None => NonZeroU32::MIN,
        };
        Self {
            max_attempts: Some(max_attempts),
            on_exhausted,
        }
    }

    /// Start tracking one frame.
    pub(crate) fn attempt(&self) -> Attempts {
        Attempts {
            limit: self.max_attempts,
            made: 0,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

/// Attempt counter for a single frame or write.
#[derive(Debug)]
pub(crate) struct Attempts {
    limit: Option<NonZeroU32>,
    made: u32,
}

impl Attempts {
    /// Record one attempt. Returns `false` once the budget is spent.
    pub(crate) fn record(&mut self) -> bool {
        self.made = self.made.saturating_add(1);
        self.limit.map_or(true, |limit| self.made < limit.get())
    }

    /// Attempts made so far.
    pub(crate) fn made(&self) -> u32 {
        self.made
    }

    /// Forget previous attempts, e.g. after partial progress.
    pub(crate) fn reset(&mut self) {
        self.made = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_never_exhausts() {
        let mut attempts = RetryPolicy::UNBOUNDED.attempt();
        for _ in 0..10_000 {
            assert!(attempts.record());
        }
        assert_eq!(attempts.made(), 10_000);
    }

    #[test]
    fn bounded_allows_exactly_n_attempts() {
        let mut attempts = RetryPolicy::bounded(3, Exhausted::SkipFrame).attempt();
        assert!(attempts.record()); // 1st failed, may retry
        assert!(attempts.record()); // 2nd failed, may retry
        assert!(!attempts.record()); // 3rd failed, budget spent
    }

    #[test]
    fn zero_budget_means_single_attempt() {
        let policy = RetryPolicy::bounded(0, Exhausted::AbortBuffer);
        assert_eq!(policy.max_attempts.map(NonZeroU32::get), Some(1));
        let mut attempts = policy.attempt();
        assert!(!attempts.record());
    }

    #[test]
    fn reset_restores_budget() {
        let mut attempts = RetryPolicy::bounded(2, Exhausted::SkipFrame).attempt();
        assert!(attempts.record());
        attempts.reset();
        assert!(attempts.record());
        assert!(!attempts.record());
    }
}
