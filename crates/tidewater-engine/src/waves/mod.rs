//! Wave height-field simulation.
//!
//! Responsibilities:
//! - integrate the damped wave equation on a fixed grid (`WaveField`)
//! - schedule random impulses on simulated time (`DisturbanceSchedule`)
//! - publish surface vertices into a frame slot's dynamic vertex buffer

mod config;
mod field;
mod schedule;

pub use config::{DisturbanceConfig, WaveConfig};
pub use field::WaveField;
pub use schedule::{Disturbance, DisturbanceSchedule};

use crate::error::{RenderError, RenderResult};
use crate::frame::UploadBuffer;
use crate::render::Vertex;

/// A wave field paired with its disturbance schedule.
#[derive(Debug)]
pub struct WaveSimulation {
    field: WaveField,
    schedule: DisturbanceSchedule,
}

impl WaveSimulation {
    pub fn new(waves: &WaveConfig, disturbances: &DisturbanceConfig) -> RenderResult<Self> {
        let field = WaveField::new(waves)?;
        let schedule = DisturbanceSchedule::new(disturbances, field.rows(), field.cols())?;
        Ok(Self { field, schedule })
    }

    pub fn field(&self) -> &WaveField {
        &self.field
    }

    /// Applies a due impulse (if any) and advances the field by `dt`.
    ///
    /// `total_time` is simulated time since start; returns the impulse that was applied.
    pub fn advance(&mut self, total_time: f32, dt: f32) -> Option<Disturbance> {
        let fired = self.schedule.poll(total_time);
        if let Some(d) = fired {
            self.field.disturb(d.row, d.col, d.magnitude);
            log::debug!(
                "wave disturbance at ({}, {}) magnitude {:.3}",
                d.row,
                d.col,
                d.magnitude
            );
        }
        self.field.update(dt);
        fired
    }

    /// Writes every surface vertex (position, normal, texcoord) into `out`.
    pub fn write_vertices(&self, out: &mut UploadBuffer<Vertex>) -> RenderResult<()> {
        let count = self.field.vertex_count();
        if out.len() < count {
            return Err(RenderError::exhausted(format!(
                "wave vertex buffer holds {} vertices, field has {count}",
                out.len()
            )));
        }

        for i in 0..count {
            let v = Vertex::new(
                self.field.position(i),
                self.field.normal(i),
                self.field.tex_coord(i),
            );
            out.copy_data(i, &v)?;
        }
        Ok(())
    }
}
