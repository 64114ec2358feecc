//! XML tileset loader.
//!
//! ```xml
//! <tileset name="knots">
//!   <tile id="0" name="Blank" glyph="." image="tiles/blank.png"
//!         up="0 1" right="0 2" down="0 3" left="0 4"/>
//!   ...
//! </tileset>
//! ```
//!
//! Rule attributes hold space-separated tile ids. `top`/`bottom` are accepted
//! as aliases of `up`/`down`; a missing rule attribute means no neighbor is
//! allowed on that side. Giving one side twice (`up` and `top`) is an error.

use super::catalog::{TileCatalog, TileDef, TileId};
use super::direction::Direction;
use super::error::ConfigError;
use bevy::log::debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::path::Path;

/// Error type for tileset loading.
#[derive(Debug)]
pub enum CatalogLoadError {
    /// File not found or cannot be read
    Io(String),
    /// XML parsing error
    Xml(String),
    /// Missing required attribute
    MissingAttribute { element: String, attribute: String },
    /// Invalid attribute value
    InvalidAttribute {
        element: String,
        attribute: String,
        value: String,
    },
    /// The tiles parsed but do not form a valid catalog
    Config(ConfigError),
}

impl std::fmt::Display for CatalogLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "cannot read tileset: {}", msg),
            Self::Xml(msg) => write!(f, "XML parse error: {}", msg),
            Self::MissingAttribute { element, attribute } => {
                write!(f, "<{}> is missing attribute '{}'", element, attribute)
            }
            Self::InvalidAttribute {
                element,
                attribute,
                value,
            } => write!(
                f,
                "<{}> has invalid {}=\"{}\"",
                element, attribute, value
            ),
            Self::Config(e) => write!(f, "invalid tileset: {}", e),
        }
    }
}

impl std::error::Error for CatalogLoadError {}

impl From<ConfigError> for CatalogLoadError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Load a tileset from disk.
pub fn load_catalog_xml<P: AsRef<Path>>(path: P) -> Result<TileCatalog, CatalogLoadError> {
    let path = path.as_ref();
    let xml = std::fs::read_to_string(path)
        .map_err(|e| CatalogLoadError::Io(format!("{}: {}", path.display(), e)))?;
    let catalog = parse_catalog_xml(&xml)?;
    debug!("Loaded {} tiles from {}", catalog.len(), path.display());
    Ok(catalog)
}

/// Parse a tileset document.
pub fn parse_catalog_xml(xml: &str) -> Result<TileCatalog, CatalogLoadError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut tiles = Vec::new();
    let mut in_tileset = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"tileset" => in_tileset = true,
                b"tile" if in_tileset => tiles.push(parse_tile_element(e)?),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => {
                if in_tileset && e.name().as_ref() == b"tile" {
                    tiles.push(parse_tile_element(e)?);
                }
            }
            Ok(Event::End(ref e)) => {
                if e.name().as_ref() == b"tileset" {
                    in_tileset = false;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(CatalogLoadError::Xml(e.to_string())),
            _ => {}
        }
    }

    Ok(TileCatalog::new(tiles)?)
}

fn parse_tile_element(e: &BytesStart) -> Result<TileDef, CatalogLoadError> {
    let mut id = None;
    let mut name = None;
    let mut glyph = None;
    let mut image = None;
    let mut rules: [Option<Vec<TileId>>; 4] = Default::default();

    for attr in e.attributes() {
        let attr = attr.map_err(|e| CatalogLoadError::Xml(e.to_string()))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| CatalogLoadError::Xml(e.to_string()))?;
        let value = attr
            .unescape_value()
            .map_err(|e| CatalogLoadError::Xml(e.to_string()))?;

        match key {
            "id" => id = Some(parse_id(key, &value)?),
            "name" => name = Some(value.to_string()),
            "glyph" => {
                let mut chars = value.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => glyph = Some(c),
                    _ => return Err(invalid(key, &value)),
                }
            }
            "image" => image = Some(value.to_string()),
            _ => {
                if let Some(dir) = Direction::from_name(key) {
                    let slot = &mut rules[dir.index()];
                    if slot.is_some() {
                        return Err(invalid(key, &value));
                    }
                    *slot = Some(
                        value
                            .split_whitespace()
                            .map(|raw| parse_id(key, raw))
                            .collect::<Result<_, _>>()?,
                    );
                }
            }
        }
    }

    let id = id.ok_or_else(|| missing("id"))?;
    let name = name.ok_or_else(|| missing("name"))?;

    let mut def = TileDef::new(id, name);
    for dir in Direction::ALL {
        if let Some(allowed) = rules[dir.index()].take() {
            def.set_rule(dir, allowed);
        }
    }
    if let Some(glyph) = glyph {
        def = def.with_glyph(glyph);
    }
    if let Some(image) = image {
        def = def.with_image(image);
    }
    Ok(def)
}

fn parse_id(attribute: &str, raw: &str) -> Result<TileId, CatalogLoadError> {
    raw.parse::<u32>()
        .map(TileId)
        .map_err(|_| invalid(attribute, raw))
}

fn missing(attribute: &str) -> CatalogLoadError {
    CatalogLoadError::MissingAttribute {
        element: "tile".to_string(),
        attribute: attribute.to_string(),
    }
}

fn invalid(attribute: &str, value: &str) -> CatalogLoadError {
    CatalogLoadError::InvalidAttribute {
        element: "tile".to_string(),
        attribute: attribute.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAIR: &str = r#"
        <tileset name="pair">
          <tile id="0" name="A" glyph="a" right="1" up="0 1" down="0 1" left="0 1"/>
          <tile id="1" name="B" top="0 1" bottom="0 1" left="0" right="0 1">
            <!-- children are ignored -->
          </tile>
        </tileset>
    "#;

    #[test]
    fn test_parse_pair_tileset() {
        let catalog = parse_catalog_xml(PAIR).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.neighbors_allowed(TileId(0), Direction::Right),
            &[TileId(1)]
        );
        assert_eq!(
            catalog.neighbors_allowed(TileId(1), Direction::Up),
            &[TileId(0), TileId(1)]
        );
        assert_eq!(
            catalog.neighbors_allowed(TileId(1), Direction::Left),
            &[TileId(0)]
        );
        assert_eq!(catalog.get(TileId(0)).and_then(|t| t.glyph), Some('a'));
        assert_eq!(catalog.get(TileId(1)).and_then(|t| t.glyph), None);
    }

    #[test]
    fn test_missing_rule_allows_nothing() {
        let catalog =
            parse_catalog_xml(r#"<tileset><tile id="0" name="lonely"/></tileset>"#).unwrap();
        for dir in Direction::ALL {
            assert!(catalog.neighbors_allowed(TileId(0), dir).is_empty());
        }
    }

    #[test]
    fn test_undefined_reference_is_config_error() {
        let xml = r#"<tileset><tile id="0" name="A" up="0 7"/></tileset>"#;
        let err = parse_catalog_xml(xml).unwrap_err();
        assert!(matches!(
            err,
            CatalogLoadError::Config(ConfigError::UndefinedTile { .. })
        ));
    }

    #[test]
    fn test_attribute_errors() {
        let err = parse_catalog_xml(r#"<tileset><tile name="A"/></tileset>"#).unwrap_err();
        assert!(matches!(
            err,
            CatalogLoadError::MissingAttribute { ref attribute, .. } if attribute == "id"
        ));

        let err =
            parse_catalog_xml(r#"<tileset><tile id="0" name="A" up="x"/></tileset>"#).unwrap_err();
        assert!(matches!(
            err,
            CatalogLoadError::InvalidAttribute { ref value, .. } if value == "x"
        ));

        let err = parse_catalog_xml(r#"<tileset><tile id="0" name="A" glyph="ab"/></tileset>"#)
            .unwrap_err();
        assert!(matches!(err, CatalogLoadError::InvalidAttribute { .. }));
    }

    #[test]
    fn test_side_given_twice_is_rejected() {
        let xml = r#"<tileset><tile id="0" name="A" up="0" top="0"/></tileset>"#;
        let err = parse_catalog_xml(xml).unwrap_err();
        assert!(matches!(
            err,
            CatalogLoadError::InvalidAttribute { ref attribute, .. } if attribute == "top"
        ));

        let xml = r#"<tileset><tile id="0" name="A" bottom="0" down="0"/></tileset>"#;
        assert!(matches!(
            parse_catalog_xml(xml),
            Err(CatalogLoadError::InvalidAttribute { .. })
        ));
    }

    #[test]
    fn test_empty_tileset_is_rejected() {
        let err = parse_catalog_xml("<tileset></tileset>").unwrap_err();
        assert!(matches!(
            err,
            CatalogLoadError::Config(ConfigError::EmptyCatalog)
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pair.xml");
        std::fs::write(&path, PAIR).unwrap();

        let catalog = load_catalog_xml(&path).unwrap();
        assert_eq!(catalog.name(TileId(1)), "B");

        let err = load_catalog_xml(dir.path().join("nope.xml")).unwrap_err();
        assert!(matches!(err, CatalogLoadError::Io(_)));
    }
}
