// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounded exponential backoff for transient host I/O.

/// An exponential backoff schedule: `attempts` tries, waiting
/// `initial_delay_ms` after the first failure and doubling the wait after
/// each subsequent one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Backoff {
    /// Total number of attempts, including the first.
    pub attempts: u32,
    /// Delay after the first failed attempt, in milliseconds.
    pub initial_delay_ms: u32,
}

impl Backoff {
    /// Creates a schedule.
    #[must_use]
    pub const fn new(attempts: u32, initial_delay_ms: u32) -> Self {
        Self {
            attempts,
            initial_delay_ms,
        }
    }

    /// Returns the delays to wait after each failed attempt, in order.
    ///
    /// The iterator yields one value per attempt; a failed attempt waits for
    /// its value before the next one starts, and the caller gives up when the
    /// iterator is exhausted. Delays saturate at `u32::MAX`.
    pub fn delays(&self) -> impl Iterator<Item = u32> + use<> {
        let mut next = self.initial_delay_ms;
        (0..self.attempts).map(move |_| {
            let current = next;
            next = next.saturating_mul(2);
            current
        })
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    #[test]
    fn doubles_from_initial_delay() {
        let delays: Vec<u32> = Backoff::new(8, 100).delays().collect();
        assert_eq!(delays, [100, 200, 400, 800, 1600, 3200, 6400, 12800]);
    }

    #[test]
    fn zero_attempts_yield_nothing() {
        assert_eq!(Backoff::new(0, 100).delays().count(), 0);
    }

    #[test]
    fn saturates_instead_of_overflowing() {
        let last = Backoff::new(40, 1 << 30).delays().last();
        assert_eq!(last, Some(u32::MAX));
    }
}
