//! Lua tile catalogs.
//!
//! A catalog script returns a list of tile tables:
//!
//! ```lua
//! return {
//!     { id = 0, name = "Blank", glyph = ".", image = "tiles/blank.png",
//!       rules = { up = {0, 1}, right = {0, 2}, down = {0, 3}, left = {0, 4} } },
//!     -- ...
//! }
//! ```
//!
//! `glyph`, `image` and each rule are optional. A missing rule allows no
//! neighbor on that side. `top`/`bottom` work as aliases of `up`/`down`, but
//! a side may only be given once.

use bevy::log::debug;
use mlua::{Lua, Result as LuaResult, Table, Value};
use std::path::Path;
use wfc_core::wfc::{ConfigError, Direction, TileCatalog, TileDef};

/// Error type for Lua catalog loading.
#[derive(Debug)]
pub enum ScriptError {
    /// Script file cannot be read
    Io(String),
    /// Script failed to run or returned the wrong shape
    Lua(String),
    /// Tiles parsed but do not form a valid catalog
    Config(ConfigError),
}

impl std::fmt::Display for ScriptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "cannot read catalog script: {}", msg),
            Self::Lua(msg) => write!(f, "Lua error: {}", msg),
            Self::Config(e) => write!(f, "invalid catalog: {}", e),
        }
    }
}

impl std::error::Error for ScriptError {}

impl From<mlua::Error> for ScriptError {
    fn from(e: mlua::Error) -> Self {
        Self::Lua(e.to_string())
    }
}

impl From<ConfigError> for ScriptError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Load a catalog from a Lua file.
pub fn load_catalog_lua<P: AsRef<Path>>(path: P) -> Result<TileCatalog, ScriptError> {
    let path = path.as_ref();
    let src = std::fs::read_to_string(path)
        .map_err(|e| ScriptError::Io(format!("{}: {}", path.display(), e)))?;

    let lua = Lua::new();
    let catalog = parse_catalog_lua(&lua, &src)?;
    debug!("Loaded {} tiles from {}", catalog.len(), path.display());
    Ok(catalog)
}

/// Evaluate `src` and build a catalog from the returned table.
pub fn parse_catalog_lua(lua: &Lua, src: &str) -> Result<TileCatalog, ScriptError> {
    let tiles = parse_tiles(lua, src)?;
    Ok(TileCatalog::new(tiles)?)
}

fn parse_tiles(lua: &Lua, src: &str) -> LuaResult<Vec<TileDef>> {
    let value: Value = lua.load(src).eval()?;

    let table = value
        .as_table()
        .ok_or_else(|| mlua::Error::RuntimeError("Catalog must be a table".into()))?;

    let mut tiles = Vec::new();
    for entry in table.sequence_values::<Value>() {
        let entry = entry?;
        let entry_table = entry
            .as_table()
            .ok_or_else(|| mlua::Error::RuntimeError("Each tile must be a table".into()))?;
        tiles.push(parse_tile(entry_table)?);
    }

    Ok(tiles)
}

fn parse_tile(entry: &Table) -> LuaResult<TileDef> {
    let id: u32 = entry.get("id")?;
    let name: String = entry.get("name")?;
    let mut def = TileDef::new(id, name);

    if let Some(glyph) = entry.get::<Option<String>>("glyph")? {
        let mut chars = glyph.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => def = def.with_glyph(c),
            _ => {
                return Err(mlua::Error::RuntimeError(format!(
                    "tile {}: glyph must be a single character, got {:?}",
                    id, glyph
                )))
            }
        }
    }

    if let Some(image) = entry.get::<Option<String>>("image")? {
        def = def.with_image(image);
    }

    if let Some(rules) = entry.get::<Option<Table>>("rules")? {
        let mut seen = [false; 4];
        for pair in rules.pairs::<String, Vec<u32>>() {
            let (side, allowed) = pair?;
            let dir = Direction::from_name(&side).ok_or_else(|| {
                mlua::Error::RuntimeError(format!("tile {}: unknown direction '{}'", id, side))
            })?;
            if std::mem::replace(&mut seen[dir.index()], true) {
                return Err(mlua::Error::RuntimeError(format!(
                    "tile {}: {} rule given more than once",
                    id, dir
                )));
            }
            def.set_rule(dir, allowed);
        }
    }

    Ok(def)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wfc_core::wfc::TileId;

    #[test]
    fn test_parse_catalog_lua() {
        let lua = Lua::new();
        let src = r#"
            return {
                { id = 0, name = "A", glyph = "a", rules = { right = {1}, up = {0, 1} } },
                { id = 1, name = "B", image = "tiles/b.png", rules = { left = {0}, bottom = {1} } },
            }
        "#;

        let catalog = parse_catalog_lua(&lua, src).expect("Should parse");
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.tile_ids(), vec![TileId(0), TileId(1)]);
        assert_eq!(
            catalog.neighbors_allowed(TileId(0), Direction::Right),
            &[TileId(1)]
        );
        assert_eq!(
            catalog.neighbors_allowed(TileId(1), Direction::Down),
            &[TileId(1)]
        );
        assert!(catalog
            .neighbors_allowed(TileId(0), Direction::Down)
            .is_empty());
        assert_eq!(catalog.get(TileId(0)).and_then(|t| t.glyph), Some('a'));
        assert_eq!(
            catalog.get(TileId(1)).and_then(|t| t.image.as_deref()),
            Some("tiles/b.png")
        );
    }

    #[test]
    fn test_parse_catalog_invalid_format() {
        let lua = Lua::new();
        let result = parse_catalog_lua(&lua, r#"return "not a table""#);
        assert!(matches!(result, Err(ScriptError::Lua(_))));
    }

    #[test]
    fn test_parse_catalog_missing_field() {
        let lua = Lua::new();
        let src = r#"return { { id = 0 } }"#; // missing name
        assert!(matches!(
            parse_catalog_lua(&lua, src),
            Err(ScriptError::Lua(_))
        ));
    }

    #[test]
    fn test_parse_catalog_unknown_direction() {
        let lua = Lua::new();
        let src = r#"return { { id = 0, name = "A", rules = { sideways = {0} } } }"#;
        let err = parse_catalog_lua(&lua, src).unwrap_err();
        assert!(err.to_string().contains("sideways"));
    }

    #[test]
    fn test_parse_catalog_side_given_twice() {
        let lua = Lua::new();
        let src = r#"return { { id = 0, name = "A", rules = { up = {0}, top = {0} } } }"#;
        let err = parse_catalog_lua(&lua, src).unwrap_err();
        assert!(matches!(err, ScriptError::Lua(_)));
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_undefined_reference_is_config_error() {
        let lua = Lua::new();
        let src = r#"return { { id = 0, name = "A", rules = { up = {7} } } }"#;
        assert!(matches!(
            parse_catalog_lua(&lua, src),
            Err(ScriptError::Config(ConfigError::UndefinedTile { .. }))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("single.lua");
        std::fs::write(
            &path,
            r#"return { { id = 3, name = "Only", rules = { up = {3}, down = {3} } } }"#,
        )
        .unwrap();

        let catalog = load_catalog_lua(&path).unwrap();
        assert_eq!(catalog.name(TileId(3)), "Only");

        assert!(matches!(
            load_catalog_lua(dir.path().join("missing.lua")),
            Err(ScriptError::Io(_))
        ));
    }
}
