//! Bevy integration: the run lives in a resource and advances one tick per frame.
//!
//! ## Usage
//!
//! ```ignore
//! use wfc_core::plugin::{WfcPlugin, WfcRunResource};
//!
//! App::new()
//!     .add_plugins(WfcPlugin)
//!     .insert_resource(WfcRunResource::new(run))
//!     .run();
//! ```
//!
//! Presentation systems read [`WfcRunResource`] and [`WfcStatus`]; only
//! [`tick_wfc_run`] mutates the run.

use crate::wfc::{ContradictionError, GridSnapshot, TickResult, WfcRun};
use bevy::prelude::*;

/// The active run.
#[derive(Resource)]
pub struct WfcRunResource {
    pub run: WfcRun,
    /// Ticks per frame.
    pub ticks_per_frame: u32,
}

impl WfcRunResource {
    pub fn new(run: WfcRun) -> Self {
        Self {
            run,
            ticks_per_frame: 1,
        }
    }

    pub fn with_ticks_per_frame(mut self, ticks: u32) -> Self {
        self.ticks_per_frame = ticks.max(1);
        self
    }

    pub fn snapshot(&self) -> GridSnapshot {
        self.run.snapshot()
    }
}

/// Outcome of the most recent frame.
#[derive(Resource, Debug, Default)]
pub struct WfcStatus {
    pub last: Option<TickResult>,
    /// Set once a strict run reports a contradiction; ticking stops.
    pub error: Option<ContradictionError>,
    /// Terminal, stalled or failed.
    pub finished: bool,
}

/// Registers [`WfcStatus`] and the tick system.
pub struct WfcPlugin;

impl Plugin for WfcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WfcStatus>()
            .add_systems(Update, tick_wfc_run);
    }
}

/// Advance the run, if one is installed and not finished.
pub fn tick_wfc_run(run: Option<ResMut<WfcRunResource>>, mut status: ResMut<WfcStatus>) {
    let Some(mut res) = run else {
        return;
    };
    if status.finished {
        return;
    }

    for _ in 0..res.ticks_per_frame {
        match res.run.tick() {
            Ok(result) => {
                status.last = Some(result);
                if result.is_terminal {
                    status.finished = true;
                    break;
                }
                if result.stalled {
                    warn!(
                        "Run stalled on tick {} with {} contradictory cells",
                        result.tick,
                        res.run.grid().contradictions().len()
                    );
                    status.finished = true;
                    break;
                }
            }
            Err(e) => {
                error!("Run stopped: {}", e);
                status.error = Some(e);
                status.finished = true;
                break;
            }
        }
    }
}
