//! Wave simulation parameters with physical units.

/// Height-field grid and integration parameters.
#[derive(Debug, Clone)]
pub struct WaveConfig {
    /// Grid rows (vertices along z).
    pub rows: usize,

    /// Grid columns (vertices along x).
    pub cols: usize,

    /// Distance between neighbouring grid vertices (meters).
    pub spatial_step: f32,

    /// Fixed simulation step (seconds).
    pub time_step: f32,

    /// Wave propagation speed (meters per second).
    pub speed: f32,

    /// Damping coefficient (1 / seconds). Zero keeps energy forever.
    pub damping: f32,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            rows: 128,
            cols: 128,
            spatial_step: 1.0,
            time_step: 0.03,
            speed: 4.0,
            damping: 0.2,
        }
    }
}

/// Random impulse schedule applied on top of the simulation.
#[derive(Debug, Clone)]
pub struct DisturbanceConfig {
    /// Simulated time between impulses (seconds).
    pub interval: f32,

    /// Cells kept clear of the grid edge when picking an impulse target.
    pub margin: usize,

    /// Smallest impulse height (meters).
    pub magnitude_min: f32,

    /// Largest impulse height (meters).
    pub magnitude_max: f32,

    /// RNG seed. `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for DisturbanceConfig {
    fn default() -> Self {
        Self {
            interval: 0.25,
            margin: 4,
            magnitude_min: 0.2,
            magnitude_max: 0.5,
            seed: None,
        }
    }
}
