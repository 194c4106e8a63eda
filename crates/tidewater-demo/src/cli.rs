//! Command-line argument parsing.

use std::time::Duration;

use clap::Parser;
use tidewater_engine::frame::FrameRingConfig;
use tidewater_engine::orchestrator::OrchestratorConfig;
use tidewater_engine::waves::{DisturbanceConfig, WaveConfig};

/// Command line arguments
#[derive(Parser, Debug, Clone)]
#[command(name = "tidewater")]
#[command(about = "Waterfront scene with a CPU-simulated lake", long_about = None)]
pub struct Args {
    /// Wave grid rows
    #[arg(long, default_value_t = 128)]
    pub rows: usize,

    /// Wave grid columns
    #[arg(long, default_value_t = 128)]
    pub cols: usize,

    /// Frames the CPU may run ahead of the GPU
    #[arg(long, value_name = "SLOTS", default_value_t = 3)]
    pub ring_size: usize,

    /// Fatal timeout for a frame-slot wait (0 waits forever)
    #[arg(long, value_name = "MS", default_value_t = 10_000)]
    pub fence_timeout_ms: u64,

    /// Start with the opaque layer in wireframe (toggle with `1`)
    #[arg(long)]
    pub wireframe: bool,

    /// Seed for wave disturbances
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log filter, e.g. "debug" or "tidewater_engine=trace"
    #[arg(long, value_name = "FILTER")]
    pub log: Option<String>,

    /// Exit after this many frames (0 runs until closed)
    #[arg(long, default_value_t = 0)]
    pub frames: u64,

    /// Run the frame loop without a window or GPU
    #[arg(long)]
    pub headless: bool,
}

impl Args {
    pub fn wave_config(&self) -> WaveConfig {
        WaveConfig {
            rows: self.rows,
            cols: self.cols,
            ..WaveConfig::default()
        }
    }

    pub fn disturbance_config(&self) -> DisturbanceConfig {
        DisturbanceConfig {
            seed: self.seed,
            ..DisturbanceConfig::default()
        }
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            ring: FrameRingConfig {
                slot_count: self.ring_size,
                wait_timeout: (self.fence_timeout_ms > 0)
                    .then(|| Duration::from_millis(self.fence_timeout_ms)),
            },
            wireframe: self.wireframe,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::parse_from(["tidewater"]);
        assert_eq!((args.rows, args.cols, args.ring_size), (128, 128, 3));
        let config = args.orchestrator_config();
        assert_eq!(config.ring.wait_timeout, Some(Duration::from_secs(10)));
        assert!(!config.wireframe);
    }

    #[test]
    fn zero_timeout_waits_forever() {
        let args = Args::parse_from([
            "tidewater",
            "--fence-timeout-ms",
            "0",
            "--ring-size",
            "2",
            "--wireframe",
            "--seed",
            "9",
        ]);
        let config = args.orchestrator_config();
        assert_eq!(config.ring.wait_timeout, None);
        assert_eq!(config.ring.slot_count, 2);
        assert!(config.wireframe);
        assert_eq!(args.disturbance_config().seed, Some(9));
    }
}
