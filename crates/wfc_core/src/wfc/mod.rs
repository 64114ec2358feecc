//! Simplified Wave Function Collapse over a rectangular tile grid.
//!
//! This module implements the solver and its run driver:
//! - `TileCatalog`: tiles and their per-direction adjacency rules
//! - `Grid`: candidate tile sets for every cell
//! - `propagate`: sweep-until-stable neighbor narrowing
//! - `entropy::select` / `collapse_one`: pick and fix the most constrained cell
//! - `WfcRun`: owns one run and advances it tick by tick
//! - `loader` / `recording`: XML tilesets and JSON run recordings

pub mod catalog;
pub mod collapse;
pub mod direction;
pub mod entropy;
pub mod error;
pub mod grid;
pub mod loader;
pub mod propagate;
pub mod recording;
pub mod run;
pub mod snapshot;

pub use catalog::{RuleAsymmetry, TileCatalog, TileDef, TileId};
pub use collapse::collapse_one;
pub use direction::Direction;
pub use error::{ConfigError, ContradictionError, ContradictionKind};
pub use grid::{Cell, Grid};
pub use loader::{load_catalog_xml, parse_catalog_xml, CatalogLoadError};
pub use propagate::{
    propagate, propagate_observed, ContradictionLog, PropagationObserver, SilentObserver,
};
pub use recording::{CollapseRecording, RecordingError};
pub use run::{
    new_run, CollapseEvent, RunConfig, RunPhase, SeedCell, TickResult, WfcRun, DEFAULT_DIMENSION,
};
pub use snapshot::{CellView, GridSnapshot};
