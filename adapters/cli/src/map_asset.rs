//! Loader for Tiled JSON maps.
//!
//! Only the tile layer named `ground` is read. Tile gid `0` marks an empty
//! cell and loads as [`Tile::Void`]; every other gid is a tile code.

use std::{fs, path::Path};

use moldfarm_core::Tile;
use moldfarm_world::{LayoutError, MapLayout};
use serde::Deserialize;
use thiserror::Error;

/// Name of the tile layer holding the playable grid.
pub(crate) const GROUND_LAYER: &str = "ground";

/// Tiled stores flip and rotation flags in the top bits of each gid.
const GID_FLAG_MASK: u32 = 0x1fff_ffff;

/// Errors raised while loading a map asset.
#[derive(Debug, Error)]
pub(crate) enum MapAssetError {
    /// The file could not be read.
    #[error("failed to read map {path}: {source}")]
    Read {
        /// Path that failed to load.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The document is not a Tiled JSON map.
    #[error("malformed map json: {0}")]
    Json(#[from] serde_json::Error),
    /// No tile layer named `ground` exists.
    #[error("map has no tile layer named `ground`")]
    MissingGroundLayer,
    /// The ground layer does not fill the declared dimensions.
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

#[derive(Debug, Deserialize)]
struct TiledMap {
    layers: Vec<TiledLayer>,
}

#[derive(Debug, Deserialize)]
struct TiledLayer {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
    #[serde(default)]
    data: Vec<u32>,
}

/// Reads and parses the map stored at `path`.
pub(crate) fn load(path: &Path) -> Result<MapLayout, MapAssetError> {
    let contents = fs::read_to_string(path).map_err(|source| MapAssetError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse(&contents)
}

/// Parses a Tiled JSON document into a layout.
pub(crate) fn parse(contents: &str) -> Result<MapLayout, MapAssetError> {
    let map: TiledMap = serde_json::from_str(contents)?;
    let layer = map
        .layers
        .into_iter()
        .find(|layer| layer.kind == "tilelayer" && layer.name == GROUND_LAYER)
        .ok_or(MapAssetError::MissingGroundLayer)?;

    let tiles = layer.data.iter().map(|&gid| tile_for_gid(gid)).collect();
    Ok(MapLayout::new(layer.width, layer.height, tiles)?)
}

fn tile_for_gid(gid: u32) -> Tile {
    match gid & GID_FLAG_MASK {
        0 => Tile::Void,
        code => i32::try_from(code).map_or(Tile::Void, Tile::from_code),
    }
}
