//! Run recordings: the collapse log of a run plus its final grid, as JSON.
//!
//! A recording made from a seeded run can be replayed against the same
//! catalog to check that the solver still makes the same decisions.
//!
//! ```ignore
//! let recording = CollapseRecording::from_run(&run, Some(seed));
//! recording.save("runs/knots_seed42.json")?;
//!
//! let loaded = CollapseRecording::load("runs/knots_seed42.json")?;
//! assert!(loaded.replay(TileCatalog::knots())?);
//! ```

use super::catalog::TileCatalog;
use super::error::{ConfigError, ContradictionError};
use super::run::{CollapseEvent, RunConfig, WfcRun};
use super::snapshot::GridSnapshot;
use crate::rng::StdRandom;
use bevy::log::debug;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

/// Everything needed to compare or reproduce a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollapseRecording {
    /// RNG seed, if the run was seeded.
    pub seed: Option<u64>,
    pub config: RunConfig,
    /// Ticks performed when the recording was taken.
    pub ticks: u64,
    pub collapsed_count: usize,
    pub terminal: bool,
    pub events: Vec<CollapseEvent>,
    pub final_snapshot: GridSnapshot,
    /// First contradiction reported by a strict run.
    #[serde(default)]
    pub contradiction: Option<ContradictionError>,
}

/// Errors that can occur when saving, loading or replaying recordings.
#[derive(Debug)]
pub enum RecordingError {
    Io(io::Error),
    Json(serde_json::Error),
    /// Replay requires a seed.
    Unseeded,
    Config(ConfigError),
}

impl std::fmt::Display for RecordingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {}", e),
            Self::Json(e) => write!(f, "JSON error: {}", e),
            Self::Unseeded => write!(f, "recording has no seed and cannot be replayed"),
            Self::Config(e) => write!(f, "invalid recorded config: {}", e),
        }
    }
}

impl std::error::Error for RecordingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Unseeded => None,
        }
    }
}

impl From<io::Error> for RecordingError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for RecordingError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<ConfigError> for RecordingError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl CollapseRecording {
    /// Capture the current state of a run.
    pub fn from_run(run: &WfcRun, seed: Option<u64>) -> Self {
        Self {
            seed,
            config: run.config().clone(),
            ticks: run.tick_count(),
            collapsed_count: run.collapsed_count(),
            terminal: run.is_terminal(),
            events: run.events().to_vec(),
            final_snapshot: run.snapshot(),
            contradiction: run.contradiction(),
        }
    }

    /// Save as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), RecordingError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, RecordingError> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Re-run the recorded seed and config for the same number of ticks and
    /// report whether the collapse log, final grid and strict-mode
    /// contradiction match.
    ///
    /// A contradiction is an outcome to compare, not a replay failure.
    pub fn replay(&self, catalog: TileCatalog) -> Result<bool, RecordingError> {
        let seed = self.seed.ok_or(RecordingError::Unseeded)?;
        let mut run =
            WfcRun::with_config(catalog, self.config.clone(), StdRandom::from_u64_seed(seed))?;
        while run.tick_count() < self.ticks && !run.is_terminal() {
            if let Err(e) = run.tick() {
                debug!("Replay reproduced {}", e);
            }
        }
        Ok(run.events() == self.events.as_slice()
            && run.snapshot() == self.final_snapshot
            && run.contradiction() == self.contradiction)
    }
}
