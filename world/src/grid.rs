use moldfarm_core::{Tile, TileCoord, TileView};
use thiserror::Error;

/// Reasons a map layout may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The tile buffer does not contain exactly `width * height` entries.
    #[error("layout of {width}x{height} expects {expected} tiles, got {actual}")]
    SizeMismatch {
        /// Number of columns.
        width: u32,
        /// Number of rows.
        height: u32,
        /// Number of tiles implied by the dimensions.
        expected: usize,
        /// Number of tiles supplied.
        actual: usize,
    },
}

/// Initial tile contents of a map, stored row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapLayout {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
}

impl MapLayout {
    /// Validates and wraps a row-major tile buffer.
    pub fn new(width: u32, height: u32, tiles: Vec<Tile>) -> Result<Self, LayoutError> {
        let expected = cell_count(width, height);
        if tiles.len() != expected {
            return Err(LayoutError::SizeMismatch {
                width,
                height,
                expected,
                actual: tiles.len(),
            });
        }
        Ok(Self {
            width,
            height,
            tiles,
        })
    }

    /// Creates a layout where every tile holds the same value.
    #[must_use]
    pub fn filled(width: u32, height: u32, tile: Tile) -> Self {
        Self {
            width,
            height,
            tiles: vec![tile; cell_count(width, height)],
        }
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Row-major tile buffer.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }
}

/// Dense rectangular tile buffer owned by the world.
#[derive(Clone, Debug)]
pub(crate) struct TileGrid {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
}

impl TileGrid {
    pub(crate) fn from_layout(layout: MapLayout) -> Self {
        Self {
            width: layout.width,
            height: layout.height,
            tiles: layout.tiles,
        }
    }

    pub(crate) fn get(&self, coord: TileCoord) -> Tile {
        self.view().get(coord)
    }

    /// Overwrites the tile, returning the previous value when the coordinate
    /// lies inside the grid.
    pub(crate) fn set(&mut self, coord: TileCoord, tile: Tile) -> Option<Tile> {
        let index = self.index(coord)?;
        let slot = self.tiles.get_mut(index)?;
        Some(std::mem::replace(slot, tile))
    }

    pub(crate) fn view(&self) -> TileView<'_> {
        TileView::new(&self.tiles, self.width, self.height)
    }

    fn index(&self, coord: TileCoord) -> Option<usize> {
        let x = u32::try_from(coord.x()).ok()?;
        let y = u32::try_from(coord.y()).ok()?;
        if x < self.width && y < self.height {
            let row = usize::try_from(y).ok()?;
            let column = usize::try_from(x).ok()?;
            let width = usize::try_from(self.width).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

fn cell_count(width: u32, height: u32) -> usize {
    let count = u64::from(width) * u64::from(height);
    usize::try_from(count).unwrap_or(usize::MAX)
}
