//! Tile catalog: tile identifiers and their per-direction adjacency rules.
//!
//! A catalog is built once, validated, and then only read for the lifetime
//! of a run. Rules are stored per direction independently; a catalog does not
//! have to be symmetric (tile A allowing B to its right does not imply B
//! allowing A to its left). [`TileCatalog::asymmetries`] lists such pairs for
//! diagnostics without changing how the rules are applied.

use super::direction::Direction;
use super::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Stable identifier of a tile within a catalog.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TileId(pub u32);

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for TileId {
    fn from(id: u32) -> Self {
        TileId(id)
    }
}

/// A single tile definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileDef {
    pub id: TileId,
    /// Human-readable name, used for diagnostics only.
    pub name: String,
    /// Character used when printing a grid as text.
    pub glyph: Option<char>,
    /// Image path for external renderers. Never loaded by the solver.
    pub image: Option<String>,
    /// `rules[dir.index()]` = tiles permitted in the neighbour at `dir`.
    rules: [Vec<TileId>; 4],
}

impl TileDef {
    /// Create a tile with no permitted neighbours in any direction.
    pub fn new(id: impl Into<TileId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            glyph: None,
            image: None,
            rules: Default::default(),
        }
    }

    /// Set the permitted neighbours for one direction.
    ///
    /// Duplicates are dropped; first-seen order is kept.
    pub fn with_rule<I, T>(mut self, dir: Direction, allowed: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TileId>,
    {
        self.set_rule(dir, allowed);
        self
    }

    pub fn with_glyph(mut self, glyph: char) -> Self {
        self.glyph = Some(glyph);
        self
    }

    pub fn with_image(mut self, path: impl Into<String>) -> Self {
        self.image = Some(path.into());
        self
    }

    /// Replace the permitted neighbours for one direction.
    pub fn set_rule<I, T>(&mut self, dir: Direction, allowed: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<TileId>,
    {
        let mut ids: Vec<TileId> = Vec::new();
        for id in allowed.into_iter().map(Into::into) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        self.rules[dir.index()] = ids;
    }

    /// Tiles permitted in the neighbour at `dir`.
    pub fn rule(&self, dir: Direction) -> &[TileId] {
        &self.rules[dir.index()]
    }
}

/// A rule that is not mirrored by the neighbour's rule in the opposite direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleAsymmetry {
    /// Tile whose rule permits `neighbor`.
    pub tile: TileId,
    pub direction: Direction,
    /// Tile that does not permit `tile` in `direction.opposite()`.
    pub neighbor: TileId,
}

/// Validated, read-only set of tiles and adjacency rules.
#[derive(Debug, Clone)]
pub struct TileCatalog {
    tiles: Vec<TileDef>,
    index: HashMap<TileId, usize>,
}

impl TileCatalog {
    /// Build and validate a catalog.
    ///
    /// Fails if the catalog is empty, defines an id twice, or any rule
    /// references a tile that is not defined.
    pub fn new(tiles: Vec<TileDef>) -> Result<Self, ConfigError> {
        if tiles.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }

        let mut index = HashMap::with_capacity(tiles.len());
        for (i, tile) in tiles.iter().enumerate() {
            if index.insert(tile.id, i).is_some() {
                return Err(ConfigError::DuplicateTile(tile.id));
            }
        }

        for tile in &tiles {
            for dir in Direction::ALL {
                if let Some(&missing) = tile.rule(dir).iter().find(|id| !index.contains_key(id)) {
                    return Err(ConfigError::UndefinedTile {
                        tile: tile.id,
                        direction: dir,
                        referenced: missing,
                    });
                }
            }
        }

        Ok(Self { tiles, index })
    }

    /// Build a catalog from the array encoding `table[tile][direction]`.
    ///
    /// Tile ids are row indices, directions are in [`Direction::ALL`] order
    /// (up, right, down, left).
    pub fn from_rule_table(names: &[&str], table: &[[&[u32]; 4]]) -> Result<Self, ConfigError> {
        let tiles = table
            .iter()
            .enumerate()
            .map(|(i, rules)| {
                let name = names.get(i).copied().unwrap_or("tile");
                let mut def = TileDef::new(i as u32, name);
                for dir in Direction::ALL {
                    def.set_rule(dir, rules[dir.index()].iter().copied());
                }
                def
            })
            .collect();
        Self::new(tiles)
    }

    /// The built-in five-piece set: a blank tile and four T-junctions.
    ///
    /// Rules are kept exactly as authored; nothing is mirrored or filled in.
    pub fn knots() -> Self {
        const BLANK: u32 = 0;
        const UP: u32 = 1;
        const RIGHT: u32 = 2;
        const DOWN: u32 = 3;
        const LEFT: u32 = 4;

        let table: [[&[u32]; 4]; 5] = [
            [&[BLANK, UP], &[BLANK, RIGHT], &[BLANK, DOWN], &[BLANK, LEFT]],
            [&[RIGHT, LEFT, DOWN], &[LEFT, UP, DOWN], &[BLANK, DOWN], &[RIGHT, UP, DOWN]],
            [&[RIGHT, LEFT, DOWN], &[LEFT, UP, DOWN], &[RIGHT, LEFT, UP], &[BLANK, LEFT]],
            [&[BLANK, UP], &[LEFT, UP, DOWN], &[RIGHT, LEFT, UP], &[RIGHT, UP, DOWN]],
            [&[RIGHT, LEFT, DOWN], &[BLANK, RIGHT], &[RIGHT, LEFT, UP], &[UP, DOWN, RIGHT]],
        ];
        let names = ["Blank", "Up", "Right", "Down", "Left"];
        let glyphs = ['.', '┴', '├', '┬', '┤'];
        let images = ["blank", "up", "right", "down", "left"];

        let mut catalog = match Self::from_rule_table(&names, &table) {
            Ok(catalog) => catalog,
            Err(e) => unreachable!("built-in knot table is self-contained: {}", e),
        };
        for (tile, (glyph, image)) in catalog.tiles.iter_mut().zip(glyphs.iter().zip(images)) {
            tile.glyph = Some(*glyph);
            tile.image = Some(format!("tiles/{}.png", image));
        }
        catalog
    }

    /// Tiles permitted next to `tile` in direction `dir`.
    ///
    /// Unknown tiles permit nothing.
    pub fn neighbors_allowed(&self, tile: TileId, dir: Direction) -> &[TileId] {
        self.get(tile).map(|t| t.rule(dir)).unwrap_or(&[])
    }

    pub fn get(&self, tile: TileId) -> Option<&TileDef> {
        self.index.get(&tile).map(|&i| &self.tiles[i])
    }

    pub fn contains(&self, tile: TileId) -> bool {
        self.index.contains_key(&tile)
    }

    /// Name of a tile, `"?"` for unknown ids.
    pub fn name(&self, tile: TileId) -> &str {
        self.get(tile).map(|t| t.name.as_str()).unwrap_or("?")
    }

    /// All tile ids in definition order.
    pub fn tile_ids(&self) -> Vec<TileId> {
        self.tiles.iter().map(|t| t.id).collect()
    }

    pub fn tiles(&self) -> &[TileDef] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Rules that the neighbour does not mirror in the opposite direction.
    pub fn asymmetries(&self) -> Vec<RuleAsymmetry> {
        let mut found = Vec::new();
        for tile in &self.tiles {
            for dir in Direction::ALL {
                for &neighbor in tile.rule(dir) {
                    if !self.neighbors_allowed(neighbor, dir.opposite()).contains(&tile.id) {
                        found.push(RuleAsymmetry {
                            tile: tile.id,
                            direction: dir,
                            neighbor,
                        });
                    }
                }
            }
        }
        found
    }
}
