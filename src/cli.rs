//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::params::{AnalyzerParams, FieldParams, RingParams};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "Beatring")]
#[command(about = "Audio-reactive spectrum ring visualizer", long_about = None)]
pub struct Args {
    /// Audio track to visualize
    pub track: PathBuf,

    /// Initial playback volume
    #[arg(long, value_name = "LEVEL", default_value = "1.0")]
    pub volume: f32,

    /// Play the track once instead of looping
    #[arg(long)]
    pub no_loop: bool,

    /// Number of spectrum bars on the ring
    #[arg(long, value_name = "COUNT", default_value = "1024")]
    pub bars: usize,

    /// Number of background cubes
    #[arg(long, value_name = "COUNT", default_value = "200")]
    pub cubes: usize,

    /// Seed for the cube field layout (random when omitted)
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,
}

impl Args {
    pub fn field_params(&self) -> FieldParams {
        FieldParams {
            shape_count: self.cubes,
            ..FieldParams::default()
        }
    }

    pub fn ring_params(&self) -> RingParams {
        RingParams {
            vertex_count: self.bars,
            ..RingParams::default()
        }
    }

    pub fn analyzer_params(&self) -> AnalyzerParams {
        AnalyzerParams::for_vertex_count(self.bars)
    }

    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Display name for the loaded track
    pub fn track_title(&self) -> String {
        self.track
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Unknown")
            .to_string()
    }
}
