use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Clamped time since the previous tick, in seconds.
    pub dt: f32,

    /// Sum of every clamped `dt` so far (simulation time), in seconds.
    pub total: f32,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

impl FrameTime {
    /// A synthetic snapshot for fixed-step and headless loops.
    pub fn fixed(dt: f32, total: f32, frame_index: u64) -> Self {
        Self {
            dt,
            total,
            now: Instant::now(),
            frame_index,
        }
    }
}

/// Frame clock producing `FrameTime` snapshots.
///
/// Delta time is clamped so a debugger pause or a minimized window does not hand the
/// wave simulation a multi-second step.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    total: Duration,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    /// Creates a clock clamping `dt` to `[100 µs, 250 ms]`.
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: Instant::now(),
            total: Duration::ZERO,
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Resets the delta baseline without touching accumulated time.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);

        self.last = now;
        self.total += dt;

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            total: self.total.as_secs_f32(),
            now,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_long_stalls() {
        let mut c = FrameClock::new();
        let start = c.last;
        let ft = c.tick_at(start + Duration::from_secs(5));
        assert_eq!(ft.dt, 0.25);
        assert_eq!(ft.total, 0.25);
        assert_eq!(ft.frame_index, 0);
    }

    #[test]
    fn total_accumulates_clamped_deltas() {
        let mut c = FrameClock::new();
        let start = c.last;
        c.tick_at(start + Duration::from_millis(100));
        c.tick_at(start + Duration::from_millis(100));
        let ft = c.tick_at(start + Duration::from_millis(300));

        assert_eq!(ft.frame_index, 2);
        assert!((ft.total - 0.3001).abs() < 1e-6);
    }
}
