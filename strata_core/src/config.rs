// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chassis configuration.

use crate::retry::Backoff;

/// Tuning for scrollable regions.
///
/// See [`ScrollManager`](crate::scroll::ScrollManager) for how each field is
/// used.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollConfig {
    /// Maximum number of samples kept by the interpolator.
    pub capacity: usize,
    /// Consecutive identical samples after which motion counts as stopped.
    pub stop_after_identical: u32,
    /// Fraction of the gap between the last report and the prediction that
    /// each predicted report covers (0.0–1.0).
    pub smoothing: f64,
    /// Interval of the host sampler, in milliseconds. Zero means "as often as
    /// the host timer allows".
    pub sample_interval_ms: u32,
}

impl ScrollConfig {
    /// Defaults matching browser touch scrolling.
    #[must_use]
    pub const fn web() -> Self {
        Self {
            capacity: 100,
            stop_after_identical: 4,
            smoothing: 0.95,
            sample_interval_ms: 0,
        }
    }
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self::web()
    }
}

/// Configuration for a [`Chassis`](crate::chassis::Chassis).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChassisConfig {
    /// Retry schedule for image fetches.
    pub image_retry: Backoff,
    /// Scroll prediction tuning.
    pub scroll: ScrollConfig,
    /// Focusable controls get `tabindex = tab_index_base - z_index`, so
    /// keyboard focus follows paint order from front to back.
    pub tab_index_base: i64,
}

impl ChassisConfig {
    /// Default configuration for browsers.
    #[must_use]
    pub const fn web() -> Self {
        Self {
            image_retry: Backoff::new(8, 100),
            scroll: ScrollConfig::web(),
            tab_index_base: 1_000_000,
        }
    }
}

impl Default for ChassisConfig {
    fn default() -> Self {
        Self::web()
    }
}
