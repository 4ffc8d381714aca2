//! Plain-text rendering of the tile grid.

use moldfarm_core::{Tile, TileCoord, TileView};

/// Glyph printed for the player's tile.
const PLAYER_GLYPH: char = '@';

/// Character used to draw a tile.
pub(crate) const fn glyph(tile: Tile) -> char {
    match tile {
        Tile::Void => ' ',
        Tile::Empty => '_',
        Tile::Ground => '.',
        Tile::Farm => '=',
        Tile::Plant => ',',
        Tile::Floor => '-',
        Tile::Carrot => 'c',
        Tile::Rock => '#',
        Tile::AngerReal => '!',
        Tile::AngerWarning => '?',
        Tile::TopRightWall | Tile::BottomLeftWall | Tile::BottomRightWall => '%',
        Tile::WorkingVent => 'o',
        Tile::BrokenVent => 'x',
        Tile::Mold => 'm',
    }
}

/// Renders the grid row by row, marking the player's tile.
pub(crate) fn render(view: TileView<'_>, player: TileCoord) -> String {
    let (width, height) = view.dimensions();
    let mut out = String::with_capacity(((width + 1) * height) as usize);
    for y in 0..height {
        for x in 0..width {
            let coord = TileCoord::new(x as i32, y as i32);
            out.push(if coord == player {
                PLAYER_GLYPH
            } else {
                glyph(view.get(coord))
            });
        }
        out.push('\n');
    }
    out
}
