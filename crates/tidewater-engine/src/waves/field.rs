use glam::{Vec2, Vec3};

use crate::error::{RenderError, RenderResult};

use super::WaveConfig;

/// Damped 2D wave equation integrated on a regular height-field grid.
///
/// Three height buffers rotate every step (`previous <- current <- next`); none is ever
/// reallocated. Border cells are pinned at rest height and never written.
///
/// Layout: cell `(row, col)` sits at `x = -width/2 + col*dx`, `z = depth/2 - row*dx`,
/// so rows advance toward -z.
#[derive(Debug, Clone)]
pub struct WaveField {
    rows: usize,
    cols: usize,
    spatial_step: f32,
    time_step: f32,

    // next = k_current*current + k_previous*previous + k_neighbors*(sum of 4 neighbours)
    k_current: f32,
    k_previous: f32,
    k_neighbors: f32,

    previous: Vec<f32>,
    current: Vec<f32>,
    next: Vec<f32>,

    accumulator: f32,
}

impl WaveField {
    /// Creates a field at rest.
    ///
    /// Fails with `RenderError::Configuration` when the grid is empty or the
    /// step/speed/damping combination would make the explicit scheme diverge.
    pub fn new(config: &WaveConfig) -> RenderResult<Self> {
        validate(config)?;

        let WaveConfig {
            rows,
            cols,
            spatial_step: dx,
            time_step: dt,
            speed,
            damping,
        } = *config;

        let d = damping * dt + 2.0;
        let e = (speed * speed) * (dt * dt) / (dx * dx);

        let cells = rows * cols;

        Ok(Self {
            rows,
            cols,
            spatial_step: dx,
            time_step: dt,
            k_current: (4.0 - 8.0 * e) / d,
            k_previous: (damping * dt - 2.0) / d,
            k_neighbors: (2.0 * e) / d,
            previous: vec![0.0; cells],
            current: vec![0.0; cells],
            next: vec![0.0; cells],
            accumulator: 0.0,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn vertex_count(&self) -> usize {
        self.rows * self.cols
    }

    pub fn triangle_count(&self) -> usize {
        self.rows.saturating_sub(1) * self.cols.saturating_sub(1) * 2
    }

    /// Extent along x (meters).
    pub fn width(&self) -> f32 {
        self.cols.saturating_sub(1) as f32 * self.spatial_step
    }

    /// Extent along z (meters).
    pub fn depth(&self) -> f32 {
        self.rows.saturating_sub(1) as f32 * self.spatial_step
    }

    pub fn time_step(&self) -> f32 {
        self.time_step
    }

    /// Current height at `(row, col)`, or `None` outside the grid.
    pub fn height(&self, row: usize, col: usize) -> Option<f32> {
        (row < self.rows && col < self.cols).then(|| self.current[row * self.cols + col])
    }

    /// Current heights in row-major order.
    pub fn heights(&self) -> &[f32] {
        &self.current
    }

    /// Raises `(row, col)` by `magnitude` and its four neighbours by half of it.
    ///
    /// The impulse is a static displacement: both the current and previous states are
    /// raised, so the surface starts at rest and then relaxes. Targets closer than two
    /// cells to the edge are ignored so border cells are never displaced. Returns
    /// whether the impulse was applied.
    pub fn disturb(&mut self, row: usize, col: usize, magnitude: f32) -> bool {
        if row < 2 || col < 2 || row + 2 >= self.rows || col + 2 >= self.cols {
            return false;
        }

        let n = self.cols;
        let half = 0.5 * magnitude;
        let center = row * n + col;

        for buf in [&mut self.current, &mut self.previous] {
            buf[center] += magnitude;
            buf[center + 1] += half;
            buf[center - 1] += half;
            buf[center + n] += half;
            buf[center - n] += half;
        }

        true
    }

    /// Accumulates `dt` and advances in fixed steps. Returns the number of steps taken.
    pub fn update(&mut self, dt: f32) -> u32 {
        if !dt.is_finite() || dt <= 0.0 {
            return 0;
        }

        self.accumulator += dt;

        let mut steps = 0;
        while self.accumulator >= self.time_step {
            self.step();
            self.accumulator -= self.time_step;
            steps += 1;
        }
        steps
    }

    fn step(&mut self) {
        let (m, n) = (self.rows, self.cols);

        for i in 1..m.saturating_sub(1) {
            for j in 1..n.saturating_sub(1) {
                let k = i * n + j;
                let neighbors = self.current[k + n]
                    + self.current[k - n]
                    + self.current[k + 1]
                    + self.current[k - 1];

                self.next[k] = self.k_current * self.current[k]
                    + self.k_previous * self.previous[k]
                    + self.k_neighbors * neighbors;
            }
        }

        std::mem::swap(&mut self.previous, &mut self.current);
        std::mem::swap(&mut self.current, &mut self.next);
    }

    /// World-space position of vertex `index` (row-major).
    ///
    /// # Panics
    ///
    /// If `index >= vertex_count()`, as for `normal` and `tex_coord`.
    pub fn position(&self, index: usize) -> Vec3 {
        let (row, col) = (index / self.cols, index % self.cols);
        Vec3::new(
            -0.5 * self.width() + col as f32 * self.spatial_step,
            self.current[index],
            0.5 * self.depth() - row as f32 * self.spatial_step,
        )
    }

    /// Surface normal at vertex `index` from central differences.
    ///
    /// Border vertices report a flat up-normal.
    pub fn normal(&self, index: usize) -> Vec3 {
        match self.neighbor_heights(index) {
            Some([l, r, t, b]) => {
                Vec3::new(l - r, 2.0 * self.spatial_step, b - t).normalize_or(Vec3::Y)
            }
            None => Vec3::Y,
        }
    }

    /// Texture coordinate mapping the grid extent onto `[0, 1]`.
    pub fn tex_coord(&self, index: usize) -> Vec2 {
        let p = self.position(index);
        let (w, d) = (self.width().max(f32::EPSILON), self.depth().max(f32::EPSILON));
        Vec2::new(0.5 + p.x / w, 0.5 - p.z / d)
    }

    /// Triangle list covering the grid, two triangles per quad.
    pub fn indices(&self) -> Vec<u32> {
        let (m, n) = (self.rows, self.cols);
        let mut indices = Vec::with_capacity(3 * self.triangle_count());

        for i in 0..m.saturating_sub(1) {
            for j in 0..n.saturating_sub(1) {
                let a = (i * n + j) as u32;
                let b = (i * n + j + 1) as u32;
                let c = ((i + 1) * n + j) as u32;
                let d = ((i + 1) * n + j + 1) as u32;
                indices.extend_from_slice(&[a, b, c, c, b, d]);
            }
        }
        indices
    }

    // [left, right, top, bottom] heights; `None` for border vertices.
    fn neighbor_heights(&self, index: usize) -> Option<[f32; 4]> {
        let (row, col) = (index / self.cols, index % self.cols);
        if row == 0 || col == 0 || row + 1 >= self.rows || col + 1 >= self.cols {
            return None;
        }
        let n = self.cols;
        Some([
            self.current[index - 1],
            self.current[index + 1],
            self.current[index - n],
            self.current[index + n],
        ])
    }
}

fn validate(c: &WaveConfig) -> RenderResult<()> {
    if c.rows == 0 || c.cols == 0 {
        return Err(RenderError::config(format!(
            "wave grid must be non-empty, got {}x{}",
            c.rows, c.cols
        )));
    }

    let finite_positive = |v: f32| v.is_finite() && v > 0.0;
    if !finite_positive(c.spatial_step) || !finite_positive(c.time_step) {
        return Err(RenderError::config(format!(
            "spatial step and time step must be > 0, got dx={} dt={}",
            c.spatial_step, c.time_step
        )));
    }
    if !c.speed.is_finite() || c.speed < 0.0 || !c.damping.is_finite() || c.damping < 0.0 {
        return Err(RenderError::config(format!(
            "speed and damping must be >= 0, got speed={} damping={}",
            c.speed, c.damping
        )));
    }

    let (dx, dt, speed, mu) = (c.spatial_step, c.time_step, c.speed, c.damping);

    let max_speed = dx / (2.0 * dt) * (mu * dt + 2.0).sqrt();
    if speed >= max_speed {
        return Err(RenderError::config(format!(
            "wave speed {speed} is unstable for dx={dx} dt={dt} (must be < {max_speed})"
        )));
    }

    if speed > 0.0 {
        let c2 = speed * speed / (dx * dx);
        let max_dt = (mu + (mu * mu + 32.0 * c2).sqrt()) / (8.0 * c2);
        if dt >= max_dt {
            return Err(RenderError::config(format!(
                "time step {dt} is unstable for speed={speed} dx={dx} (must be < {max_dt})"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(rows: usize, cols: usize) -> WaveConfig {
        WaveConfig {
            rows,
            cols,
            ..WaveConfig::default()
        }
    }

    // ── construction ──────────────────────────────────────────────────────

    #[test]
    fn rejects_empty_grid() {
        assert!(matches!(
            WaveField::new(&config(0, 8)),
            Err(RenderError::Configuration(_))
        ));
        assert!(WaveField::new(&config(8, 0)).is_err());
    }

    #[test]
    fn rejects_unstable_speed() {
        let c = WaveConfig {
            speed: 100.0,
            ..config(16, 16)
        };
        assert!(matches!(WaveField::new(&c), Err(RenderError::Configuration(_))));
    }

    #[test]
    fn rejects_non_positive_steps() {
        let c = WaveConfig {
            time_step: 0.0,
            ..config(16, 16)
        };
        assert!(WaveField::new(&c).is_err());
    }

    #[test]
    fn starts_flat() {
        let f = WaveField::new(&config(6, 5)).unwrap();
        assert_eq!(f.vertex_count(), 30);
        assert_eq!(f.triangle_count(), 5 * 4 * 2);
        assert!(f.heights().iter().all(|&h| h == 0.0));
    }

    // ── disturb ───────────────────────────────────────────────────────────

    #[test]
    fn disturb_raises_center_and_neighbours_only() {
        let mut f = WaveField::new(&config(9, 9)).unwrap();
        assert!(f.disturb(4, 4, 0.4));

        let raised = [(4, 4), (3, 4), (5, 4), (4, 3), (4, 5)];
        for row in 0..9 {
            for col in 0..9 {
                let h = f.height(row, col).unwrap();
                if raised.contains(&(row, col)) {
                    assert!(h > 0.0, "({row},{col}) not raised");
                } else {
                    assert_eq!(h, 0.0, "({row},{col}) changed");
                }
            }
        }
        assert_eq!(f.height(4, 4), Some(0.4));
        assert_eq!(f.height(3, 4), Some(0.2));
    }

    #[test]
    fn disturb_near_edge_is_noop() {
        let mut f = WaveField::new(&config(9, 9)).unwrap();
        assert!(!f.disturb(1, 4, 1.0));
        assert!(!f.disturb(4, 7, 1.0));
        assert!(!f.disturb(0, 0, 1.0));
        assert!(!f.disturb(40, 40, 1.0));
        assert!(f.heights().iter().all(|&h| h == 0.0));
    }

    // ── update ────────────────────────────────────────────────────────────

    #[test]
    fn update_waits_for_full_step() {
        let mut f = WaveField::new(&config(9, 9)).unwrap();
        assert_eq!(f.update(0.02), 0);
        assert_eq!(f.update(0.02), 1);
        assert_eq!(f.update(-1.0), 0);
        assert_eq!(f.update(f32::NAN), 0);
    }

    #[test]
    fn border_stays_at_rest() {
        let mut f = WaveField::new(&config(10, 12)).unwrap();
        f.disturb(2, 2, 0.5);
        f.disturb(7, 9, 0.5);
        for _ in 0..200 {
            f.update(0.03);
        }
        for row in 0..10 {
            for col in 0..12 {
                if row == 0 || col == 0 || row == 9 || col == 11 {
                    assert_eq!(f.height(row, col), Some(0.0));
                }
            }
        }
    }

    // ── surface samples ───────────────────────────────────────────────────

    #[test]
    fn positions_are_centered() {
        let f = WaveField::new(&config(5, 9)).unwrap();
        let first = f.position(0);
        assert_eq!(first, Vec3::new(-4.0, 0.0, 2.0));

        let last = f.position(f.vertex_count() - 1);
        assert_eq!(last, Vec3::new(4.0, 0.0, -2.0));
    }

    #[test]
    #[should_panic]
    fn position_past_last_vertex_panics() {
        let f = WaveField::new(&config(5, 9)).unwrap();
        f.position(f.vertex_count());
    }

    #[test]
    fn tex_coords_span_unit_square() {
        let f = WaveField::new(&config(5, 9)).unwrap();
        assert_eq!(f.tex_coord(0), Vec2::new(0.0, 0.0));
        assert_eq!(f.tex_coord(f.vertex_count() - 1), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn flat_surface_normal_points_up() {
        let f = WaveField::new(&config(9, 9)).unwrap();
        assert_eq!(f.normal(4 * 9 + 4), Vec3::Y);
        assert_eq!(f.normal(0), Vec3::Y);
    }

    #[test]
    fn normal_tilts_away_from_crest() {
        let mut f = WaveField::new(&config(9, 9)).unwrap();
        f.disturb(4, 4, 0.5);

        // West of the crest the surface rises toward +x.
        let west = f.normal(4 * 9 + 3);
        assert!(west.x < 0.0);
        assert!((west.length() - 1.0).abs() < 1e-5);

        // North of the crest (row 3, larger z) the surface rises toward -z.
        let north = f.normal(3 * 9 + 4);
        assert!(north.z > 0.0);
    }

    #[test]
    fn indices_cover_every_quad() {
        let f = WaveField::new(&config(3, 4)).unwrap();
        let idx = f.indices();
        assert_eq!(idx.len(), 3 * f.triangle_count());
        assert_eq!(&idx[..6], &[0, 1, 4, 4, 1, 5]);
        assert!(idx.iter().all(|&i| (i as usize) < f.vertex_count()));
    }
}
