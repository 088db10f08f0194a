// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll delta reporting with latency compensation.
//!
//! Native scrollers move on their own; the core only learns about it through
//! [`NativeInterrupt::Scroll`](crate::interrupt::NativeInterrupt::Scroll)
//! deltas sent once per frame. A host sampler feeds the scroll offset into a
//! [`ScrollManager`] at a high rate. While the user's finger is down (or
//! after motion stops) the manager reports the exact change since the last
//! report. After a touch release, while momentum scrolling continues, it
//! reports toward a cubic Hermite prediction instead, which hides the lag
//! between the native scroll position and the frame that paints it.

use alloc::collections::VecDeque;

use kurbo::{Point, Vec2};

use crate::config::ScrollConfig;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Sample {
    /// Milliseconds since the first sample.
    t: f64,
    position: f64,
    velocity: f64,
}

fn slope(from: &Sample, to_t: f64, to_position: f64) -> f64 {
    let dt = to_t - from.t;
    if dt > 0.0 {
        (to_position - from.position) / dt
    } else {
        0.0
    }
}

/// Cubic Hermite extrapolation over a bounded history of one coordinate.
#[derive(Clone, Debug)]
pub struct HermiteInterpolator {
    samples: VecDeque<Sample>,
    capacity: usize,
    origin: Option<f64>,
}

impl HermiteInterpolator {
    /// Creates an interpolator keeping at most `capacity` samples.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity: capacity.max(2),
            origin: None,
        }
    }

    /// Number of stored samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether no sample has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    fn normalize(&mut self, timestamp: f64) -> f64 {
        timestamp - *self.origin.get_or_insert(timestamp)
    }

    /// Records `position` at `timestamp` (milliseconds).
    ///
    /// The sample's velocity is the slope from the previous sample, averaged
    /// with the previous slope when there is one.
    pub fn update(&mut self, timestamp: f64, position: f64) {
        let t = self.normalize(timestamp);
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        let n = self.samples.len();
        let velocity = match n {
            0 => 0.0,
            1 => slope(&self.samples[0], t, position),
            _ => {
                let (earlier, prev) = (&self.samples[n - 2], &self.samples[n - 1]);
                0.5 * (slope(prev, t, position) + slope(earlier, prev.t, prev.position))
            }
        };
        self.samples.push_back(Sample {
            t,
            position,
            velocity,
        });
    }

    /// Estimated position at `timestamp`.
    ///
    /// Interpolates between the two latest samples, and extrapolates past the
    /// latest one. With one sample, returns its position; with none, zero.
    #[must_use]
    pub fn predict(&self, timestamp: f64) -> f64 {
        let n = self.samples.len();
        match n {
            0 => return 0.0,
            1 => return self.samples[0].position,
            _ => {}
        }
        let t = timestamp - self.origin.unwrap_or(timestamp);
        let (s0, s1) = (&self.samples[n - 2], &self.samples[n - 1]);
        let span = s1.t - s0.t;
        if span <= 0.0 {
            return s1.position;
        }
        let m = (t - s0.t) / span;
        let (m2, m3) = (m * m, m * m * m);
        let h00 = 2.0 * m3 - 3.0 * m2 + 1.0;
        let h10 = m3 - 2.0 * m2 + m;
        let h01 = -2.0 * m3 + 3.0 * m2;
        let h11 = m3 - m2;
        h00 * s0.position + h10 * span * s0.velocity + h01 * s1.position + h11 * span * s1.velocity
    }
}

/// How [`ScrollManager::scroll_delta`] computes its result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollMode {
    /// Exact change since the last report.
    Direct,
    /// Smoothed step toward the predicted position.
    Predicting,
}

/// Scroll state of one native scroller.
#[derive(Clone, Debug)]
pub struct ScrollManager {
    config: ScrollConfig,
    x: HermiteInterpolator,
    y: HermiteInterpolator,
    last: Point,
    reported: Point,
    /// Length of the current run of equal samples, counting its first.
    identical: u32,
    touching: bool,
    mode: ScrollMode,
}

impl Default for ScrollManager {
    fn default() -> Self {
        Self::new(ScrollConfig::web())
    }
}

impl ScrollManager {
    /// Creates a manager at offset zero in direct mode.
    #[must_use]
    pub fn new(config: ScrollConfig) -> Self {
        Self {
            config,
            x: HermiteInterpolator::new(config.capacity),
            y: HermiteInterpolator::new(config.capacity),
            last: Point::ORIGIN,
            reported: Point::ORIGIN,
            identical: 0,
            touching: false,
            mode: ScrollMode::Direct,
        }
    }

    /// Current reporting mode.
    #[must_use]
    pub fn mode(&self) -> ScrollMode {
        self.mode
    }

    /// Whether a touch is in progress.
    #[must_use]
    pub fn is_touching(&self) -> bool {
        self.touching
    }

    /// Whether the offset has stopped changing.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.identical >= self.config.stop_after_identical
    }

    /// The most recently sampled offset.
    #[must_use]
    pub fn offset(&self) -> Point {
        self.last
    }

    /// Records a touch start or end on the scroller.
    pub fn set_touching(&mut self, touching: bool) {
        self.touching = touching;
        self.mode = if touching || self.is_stopped() {
            ScrollMode::Direct
        } else {
            ScrollMode::Predicting
        };
    }

    /// Records the scroll offset observed at `now_ms`.
    pub fn sample(&mut self, now_ms: f64, offset: Point) {
        if offset == self.last && self.identical > 0 {
            self.identical = self.identical.saturating_add(1);
        } else {
            self.identical = 1;
        }
        self.last = offset;
        if self.is_stopped() {
            self.mode = ScrollMode::Direct;
        } else {
            self.x.update(now_ms, offset.x);
            self.y.update(now_ms, offset.y);
        }
    }

    /// The scroll movement to report at `now_ms`.
    ///
    /// Advances the reported baseline, so movement is never reported twice.
    /// Call at most once per frame.
    pub fn scroll_delta(&mut self, now_ms: f64) -> Vec2 {
        let target = match self.mode {
            ScrollMode::Direct => self.last,
            ScrollMode::Predicting => {
                let predicted = Point::new(self.x.predict(now_ms), self.y.predict(now_ms));
                self.reported.lerp(predicted, self.config.smoothing)
            }
        };
        let delta = target - self.reported;
        self.reported = target;
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_with_few_samples() {
        let mut interpolator = HermiteInterpolator::new(100);
        assert_eq!(interpolator.predict(5.0), 0.0);
        interpolator.update(1000.0, 42.0);
        assert_eq!(interpolator.predict(2000.0), 42.0);
    }

    #[test]
    fn predict_hits_samples_and_extrapolates_linear_motion() {
        let mut interpolator = HermiteInterpolator::new(100);
        for (t, y) in [(0.0, 0.0), (10.0, 10.0), (20.0, 20.0)] {
            interpolator.update(t, y);
        }
        assert!((interpolator.predict(10.0) - 10.0).abs() < 1e-9, "interpolates t0");
        assert!((interpolator.predict(20.0) - 20.0).abs() < 1e-9, "interpolates t1");
        assert!(
            (interpolator.predict(30.0) - 30.0).abs() < 1e-9,
            "constant velocity extrapolates linearly"
        );
    }

    #[test]
    fn duplicate_timestamps_do_not_divide_by_zero() {
        let mut interpolator = HermiteInterpolator::new(100);
        interpolator.update(5.0, 1.0);
        interpolator.update(5.0, 3.0);
        interpolator.update(5.0, 4.0);
        let p = interpolator.predict(6.0);
        assert_eq!(p, 4.0);
    }

    #[test]
    fn capacity_evicts_oldest() {
        let mut interpolator = HermiteInterpolator::new(3);
        for i in 0..10 {
            interpolator.update(f64::from(i), f64::from(i));
        }
        assert_eq!(interpolator.len(), 3);
    }

    #[test]
    fn direct_delta_is_cumulative() {
        let mut scroll = ScrollManager::default();
        scroll.set_touching(true);
        scroll.sample(0.0, Point::new(0.0, 0.0));
        scroll.sample(16.0, Point::new(0.0, 10.0));
        scroll.sample(32.0, Point::new(0.0, 25.0));
        assert_eq!(scroll.scroll_delta(40.0), Vec2::new(0.0, 25.0));
        assert_eq!(scroll.scroll_delta(48.0), Vec2::ZERO, "no double counting");
    }

    #[test]
    fn release_predicts_until_motion_stops() {
        let mut scroll = ScrollManager::default();
        scroll.set_touching(true);
        for i in 1..=5 {
            scroll.sample(f64::from(i) * 10.0, Point::new(0.0, f64::from(i) * 10.0));
        }
        let _ = scroll.scroll_delta(50.0);
        scroll.set_touching(false);
        assert_eq!(scroll.mode(), ScrollMode::Predicting);

        let ahead = scroll.scroll_delta(60.0);
        assert!(ahead.y > 0.0, "momentum should be reported ahead of samples");

        for _ in 0..4 {
            scroll.sample(70.0, Point::new(0.0, 55.0));
        }
        assert!(scroll.is_stopped());
        assert_eq!(scroll.mode(), ScrollMode::Direct);
        let settle = scroll.scroll_delta(80.0);
        let total = 50.0 + ahead.y + settle.y;
        assert!((total - 55.0).abs() < 1e-9, "direct mode catches up exactly");
    }

    #[test]
    fn stops_on_fourth_identical_sample() {
        let mut scroll = ScrollManager::default();
        scroll.set_touching(true);
        scroll.sample(0.0, Point::new(0.0, 10.0));
        scroll.sample(10.0, Point::new(0.0, 20.0));
        for i in 0..3 {
            scroll.sample(20.0 + f64::from(i) * 10.0, Point::new(0.0, 30.0));
        }
        assert!(!scroll.is_stopped(), "three equal samples are still moving");
        scroll.set_touching(false);
        assert_eq!(scroll.mode(), ScrollMode::Predicting);

        scroll.sample(50.0, Point::new(0.0, 30.0));
        assert!(scroll.is_stopped(), "the fourth equal sample stops");
        assert_eq!(scroll.mode(), ScrollMode::Direct);
    }

    #[test]
    fn touch_release_after_stop_stays_direct() {
        let mut scroll = ScrollManager::default();
        for _ in 0..4 {
            scroll.sample(1.0, Point::ORIGIN);
        }
        scroll.set_touching(false);
        assert_eq!(scroll.mode(), ScrollMode::Direct);
    }
}
