//! Tile solver core for the WFC studio.
//!
//! This crate provides:
//! - The wave function collapse engine and run driver (`wfc`)
//! - Seedable random number generation (`rng`)
//! - A Bevy plugin that ticks a run once per frame (`plugin`)

pub mod plugin;
pub mod rng;
pub mod wfc;

pub use plugin::{tick_wfc_run, WfcPlugin, WfcRunResource, WfcStatus};
pub use rng::{StdRandom, TileRng};
pub use wfc::{
    load_catalog_xml, new_run, CollapseRecording, ConfigError, ContradictionError, GridSnapshot,
    RunConfig, TickResult, TileCatalog, TileDef, TileId, WfcRun,
};
