use crate::error::RenderError;

/// High-level response after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; skip presenting the current frame.
    SkipFrame,
    /// Fatal error (commonly OOM); terminate gracefully.
    Fatal,
}

impl SurfaceErrorAction {
    /// `Some(error)` when the frame loop must abort.
    pub fn into_fatal(self, err: &wgpu::SurfaceError) -> Option<RenderError> {
        match self {
            SurfaceErrorAction::Fatal => Some(RenderError::ResourceExhaustion(format!(
                "surface texture unavailable: {err}"
            ))),
            SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => None,
        }
    }
}
