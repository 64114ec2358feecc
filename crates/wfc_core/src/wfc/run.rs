//! Run driver: owns the grid and advances it one tick at a time.
//!
//! A tick is: propagate, recount collapsed cells, select the lowest-entropy
//! cells, collapse one of them. The run is terminal once every cell holds
//! exactly one option; further ticks are no-ops that report the same state.
//!
//! Contradictions are absorbed into the grid by default. With
//! [`RunConfig::strict`] set, the first contradiction a tick's propagation
//! creates is returned as a [`ContradictionError`] instead of selecting and
//! collapsing; the grid is left exactly as propagation made it.

use super::catalog::{TileCatalog, TileId};
use super::collapse::collapse_one;
use super::entropy::select;
use super::error::{ConfigError, ContradictionError};
use super::grid::Grid;
use super::propagate::{propagate, propagate_observed, ContradictionLog};
use super::snapshot::GridSnapshot;
use crate::rng::TileRng;
use bevy::log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// Default grid side length.
pub const DEFAULT_DIMENSION: usize = 20;

/// Fixed placement for the initial collapse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedCell {
    pub row: usize,
    pub col: usize,
    pub tile: TileId,
}

/// Run configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub rows: usize,
    pub cols: usize,
    /// Surface contradictions as errors instead of absorbing them.
    pub strict: bool,
    /// Use this placement instead of a random seed collapse.
    pub seed_cell: Option<SeedCell>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::square(DEFAULT_DIMENSION)
    }
}

impl RunConfig {
    /// Permissive `n x n` run with a random seed collapse.
    pub fn square(n: usize) -> Self {
        Self {
            rows: n,
            cols: n,
            strict: false,
            seed_cell: None,
        }
    }

    pub fn with_size(mut self, rows: usize, cols: usize) -> Self {
        self.rows = rows;
        self.cols = cols;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_seed_cell(mut self, row: usize, col: usize, tile: impl Into<TileId>) -> Self {
        self.seed_cell = Some(SeedCell {
            row,
            col,
            tile: tile.into(),
        });
        self
    }

    fn validate(&self, catalog: &TileCatalog) -> Result<(), ConfigError> {
        let cells = self.rows.checked_mul(self.cols).unwrap_or(0);
        if cells == 0 {
            return Err(ConfigError::InvalidDimension {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if let Some(seed) = self.seed_cell {
            if seed.row >= self.rows || seed.col >= self.cols || !catalog.contains(seed.tile) {
                return Err(ConfigError::InvalidSeedCell {
                    row: seed.row,
                    col: seed.col,
                    tile: seed.tile,
                });
            }
        }
        Ok(())
    }
}

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Initialized and seeded, no tick yet.
    Uncollapsed,
    /// At least one tick performed, cells remain.
    Running,
    /// Every cell holds exactly one option.
    Terminal,
}

/// One collapse decision. The seed collapse is recorded with tick 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollapseEvent {
    pub tick: u64,
    pub row: usize,
    pub col: usize,
    pub tile: TileId,
}

/// Outcome of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickResult {
    /// Number of ticks performed so far.
    pub tick: u64,
    pub collapsed_count: usize,
    pub is_terminal: bool,
    /// The collapse made by this tick, if any.
    pub collapsed: Option<CollapseEvent>,
    /// Not terminal, yet no cell had more than one option to choose from.
    pub stalled: bool,
}

/// Owned state of one run.
pub struct WfcRun {
    catalog: TileCatalog,
    config: RunConfig,
    grid: Grid,
    rng: Box<dyn TileRng + Send + Sync>,
    collapsed_count: usize,
    tick: u64,
    phase: RunPhase,
    events: Vec<CollapseEvent>,
    contradiction: Option<ContradictionError>,
}

/// Start an `n x n` run: validate, initialize every cell, seed-collapse one.
pub fn new_run<R>(catalog: TileCatalog, dimension: usize, rng: R) -> Result<WfcRun, ConfigError>
where
    R: TileRng + Send + Sync + 'static,
{
    WfcRun::with_config(catalog, RunConfig::square(dimension), rng)
}

impl WfcRun {
    /// Start a run from a full configuration.
    pub fn with_config<R>(
        catalog: TileCatalog,
        config: RunConfig,
        rng: R,
    ) -> Result<Self, ConfigError>
    where
        R: TileRng + Send + Sync + 'static,
    {
        config.validate(&catalog)?;

        if config.strict {
            for asym in catalog.asymmetries() {
                warn!(
                    "Tile {} ({}) allows {} to its {} but not the reverse",
                    asym.tile,
                    catalog.name(asym.tile),
                    catalog.name(asym.neighbor),
                    asym.direction
                );
            }
        }

        let mut grid = Grid::new(config.rows, config.cols);
        grid.initialize(&catalog.tile_ids());

        let mut rng: Box<dyn TileRng + Send + Sync> = Box::new(rng);
        let seed = match config.seed_cell {
            Some(seed) => {
                grid.collapse_cell(seed.row, seed.col, seed.tile);
                Some((seed.row, seed.col, seed.tile))
            }
            None => grid.seed_collapse(rng.as_mut()),
        };

        let events: Vec<CollapseEvent> = seed
            .map(|(row, col, tile)| CollapseEvent {
                tick: 0,
                row,
                col,
                tile,
            })
            .into_iter()
            .collect();
        if let Some(event) = events.first() {
            debug!(
                "Seeded {}x{} grid at ({}, {}) with {}",
                config.rows,
                config.cols,
                event.row,
                event.col,
                catalog.name(event.tile)
            );
        }

        let collapsed_count = grid.collapsed_count();
        let phase = if collapsed_count == grid.len() {
            RunPhase::Terminal
        } else {
            RunPhase::Uncollapsed
        };

        Ok(Self {
            catalog,
            config,
            grid,
            rng,
            collapsed_count,
            tick: 0,
            phase,
            events,
            contradiction: None,
        })
    }

    /// Advance one step.
    ///
    /// Always `Ok` unless the run is strict and propagation created a
    /// contradiction during this tick.
    pub fn tick(&mut self) -> Result<TickResult, ContradictionError> {
        if self.phase == RunPhase::Terminal {
            return Ok(self.result(None));
        }

        self.tick += 1;
        self.phase = RunPhase::Running;

        if self.config.strict {
            let mut log = ContradictionLog::default();
            propagate_observed(&mut self.grid, &self.catalog, &mut log);
            self.collapsed_count = self.grid.collapsed_count();
            if let Some(&(row, col, kind)) = log.entries.first() {
                let err = ContradictionError {
                    row,
                    col,
                    tick: self.tick,
                    kind,
                };
                warn!("{}", err);
                self.contradiction.get_or_insert(err);
                self.update_phase();
                return Err(err);
            }
        } else {
            propagate(&mut self.grid, &self.catalog);
            self.collapsed_count = self.grid.collapsed_count();
        }

        let candidates = select(&self.grid);
        let mut collapsed = None;
        if let Some((row, col, tile)) = collapse_one(&mut self.grid, &candidates, self.rng.as_mut())
        {
            self.collapsed_count += 1;
            let event = CollapseEvent {
                tick: self.tick,
                row,
                col,
                tile,
            };
            self.events.push(event);
            collapsed = Some(event);
        }

        self.update_phase();
        let result = self.result(collapsed);
        if result.stalled {
            debug!(
                "Tick {}: no cell left to collapse, {} of {} resolved",
                self.tick,
                self.collapsed_count,
                self.grid.len()
            );
        }
        Ok(result)
    }

    /// Tick until terminal, stalled, or `max_ticks` ticks were performed.
    pub fn run_to_completion(&mut self, max_ticks: u64) -> Result<TickResult, ContradictionError> {
        let mut last = self.result(None);
        for _ in 0..max_ticks {
            last = self.tick()?;
            if last.is_terminal || last.stalled {
                break;
            }
        }
        Ok(last)
    }

    fn update_phase(&mut self) {
        if self.collapsed_count == self.grid.len() && self.phase != RunPhase::Terminal {
            self.phase = RunPhase::Terminal;
            info!(
                "All {} cells collapsed after {} ticks",
                self.grid.len(),
                self.tick
            );
        }
    }

    fn result(&self, collapsed: Option<CollapseEvent>) -> TickResult {
        let is_terminal = self.phase == RunPhase::Terminal;
        TickResult {
            tick: self.tick,
            collapsed_count: self.collapsed_count,
            is_terminal,
            collapsed,
            stalled: !is_terminal && collapsed.is_none() && self.tick > 0,
        }
    }

    /// Read-only view of the current grid.
    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot::from_grid(&self.grid)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn catalog(&self) -> &TileCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn is_terminal(&self) -> bool {
        self.phase == RunPhase::Terminal
    }

    pub fn collapsed_count(&self) -> usize {
        self.collapsed_count
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Every collapse so far, seed first.
    pub fn events(&self) -> &[CollapseEvent] {
        &self.events
    }

    /// First contradiction a strict run reported, if any.
    pub fn contradiction(&self) -> Option<ContradictionError> {
        self.contradiction
    }
}
