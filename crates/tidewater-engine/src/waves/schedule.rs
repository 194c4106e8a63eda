use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{RenderError, RenderResult};

use super::DisturbanceConfig;

/// A disturbance picked by the schedule for the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Disturbance {
    pub row: usize,
    pub col: usize,
    pub magnitude: f32,
}

/// Fires a random impulse every `interval` seconds of simulated time.
///
/// The trigger time advances by exactly one interval per fired impulse, so a slow frame
/// is caught up over the following frames (at most one impulse per frame).
#[derive(Debug)]
pub struct DisturbanceSchedule {
    interval: f32,
    rows: std::ops::RangeInclusive<usize>,
    cols: std::ops::RangeInclusive<usize>,
    magnitude: std::ops::RangeInclusive<f32>,
    base_time: f32,
    rng: StdRng,
}

impl DisturbanceSchedule {
    /// Builds a schedule targeting a `rows x cols` grid.
    pub fn new(config: &DisturbanceConfig, rows: usize, cols: usize) -> RenderResult<Self> {
        if !config.interval.is_finite() || config.interval <= 0.0 {
            return Err(RenderError::config(format!(
                "disturbance interval must be > 0, got {}",
                config.interval
            )));
        }

        let min_dim = 2 * config.margin + 1;
        if rows < min_dim || cols < min_dim {
            return Err(RenderError::config(format!(
                "grid {rows}x{cols} too small for disturbance margin {} (need at least {min_dim})",
                config.margin
            )));
        }

        let (lo, hi) = (config.magnitude_min, config.magnitude_max);
        if !lo.is_finite() || !hi.is_finite() || lo > hi {
            return Err(RenderError::config(format!(
                "invalid disturbance magnitude range [{lo}, {hi}]"
            )));
        }

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            interval: config.interval,
            rows: config.margin..=rows - 1 - config.margin,
            cols: config.margin..=cols - 1 - config.margin,
            magnitude: lo..=hi,
            base_time: 0.0,
            rng,
        })
    }

    /// Simulated time at which the next impulse becomes due.
    pub fn next_due(&self) -> f32 {
        self.base_time + self.interval
    }

    /// Returns an impulse when `total_time` has reached the next trigger.
    pub fn poll(&mut self, total_time: f32) -> Option<Disturbance> {
        if total_time - self.base_time < self.interval {
            return None;
        }
        self.base_time += self.interval;

        Some(Disturbance {
            row: self.rng.gen_range(self.rows.clone()),
            col: self.rng.gen_range(self.cols.clone()),
            magnitude: self.rng.gen_range(self.magnitude.clone()),
        })
    }
}
