
use crate::bounding_box::BoundingBox;
use crate::error::{Error, Result};
use crate::tile::Tile;

/// Edge length of a tile in pixels.
pub const TILE_SIZE: u32 = 256;

/// An inclusive rectangle of tiles at a single zoom level.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TileGrid {
    min: Tile,
    max: Tile,
}

impl TileGrid {
    /// Creates the grid spanned by the north-west tile `nw` and the south-east
    /// tile `se`.
    ///
    /// # Panics
    /// Panics if the tiles are on different zoom levels.
    pub fn new(nw: Tile, se: Tile) -> Self {
        assert_eq!(nw.z, se.z, "grid corners must share a zoom level");

        TileGrid {
            min: Tile::new(nw.x.min(se.x), nw.y.min(se.y), nw.z),
            max: Tile::new(nw.x.max(se.x), nw.y.max(se.y), nw.z),
        }
    }

    pub fn min(&self) -> Tile {
        self.min
    }

    pub fn max(&self) -> Tile {
        self.max
    }

    pub fn zoom(&self) -> u8 {
        self.min.z
    }

    pub fn columns(&self) -> u64 {
        u64::from(self.max.x - self.min.x) + 1
    }

    pub fn rows(&self) -> u64 {
        u64::from(self.max.y - self.min.y) + 1
    }

    pub fn tile_count(&self) -> u64 {
        self.columns() * self.rows()
    }

    /// Iterates over all tiles in the grid, column by column.
    pub fn tiles(&self) -> impl Iterator<Item = Tile> {
        let (min, max) = (self.min, self.max);

        (min.x..=max.x).flat_map(move |x| (min.y..=max.y).map(move |y| Tile::new(x, y, min.z)))
    }

    /// Width and height of the stitched image in pixels.
    pub fn pixel_size(&self) -> Result<(u32, u32)> {
        let to_pixels = |tiles: u64| {
            u32::try_from(tiles * u64::from(TILE_SIZE)).map_err(|_| {
                Error::config(
                    "bbox",
                    format!("{} tiles per side exceed the maximum image size", tiles),
                )
            })
        };

        Ok((to_pixels(self.columns())?, to_pixels(self.rows())?))
    }

    /// Position of the tile's top-left pixel in the stitched image.
    pub fn pixel_offset(&self, tile: Tile) -> (u32, u32) {
        (
            TILE_SIZE * (tile.x - self.min.x),
            TILE_SIZE * (tile.y - self.min.y),
        )
    }

    /// The area covered by the full tiles of the grid.
    pub fn bounds(&self) -> BoundingBox {
        let (min_lon, max_lat) = self.min.nw_corner();
        let (max_lon, min_lat) = Tile::new(self.max.x + 1, self.max.y + 1, self.max.z).nw_corner();

        BoundingBox::new(min_lat, max_lat, min_lon, max_lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions() {
        let grid = TileGrid::new(Tile::new(5, 10, 5), Tile::new(7, 11, 5));
        assert_eq!((grid.columns(), grid.rows(), grid.tile_count()), (3, 2, 6));
        assert_eq!(grid.pixel_size().unwrap(), (768, 512));
        assert_eq!(grid.pixel_offset(Tile::new(6, 10, 5)), (256, 0));
        assert_eq!(grid.pixel_offset(Tile::new(7, 11, 5)), (512, 256));
    }

    #[test]
    fn tiles_are_enumerated_once() {
        let grid = TileGrid::new(Tile::new(5, 10, 5), Tile::new(7, 11, 5));
        let tiles: Vec<_> = grid.tiles().collect();

        assert_eq!(tiles.len(), 6);
        assert_eq!(tiles[0], Tile::new(5, 10, 5));
        assert_eq!(tiles[5], Tile::new(7, 11, 5));
    }

    #[test]
    fn bounds_cover_full_tiles() {
        let bounds = TileGrid::new(Tile::new(5, 10, 5), Tile::new(7, 11, 5)).bounds();

        assert_eq!(bounds.min_lon, -123.75);
        assert_eq!(bounds.max_lon, -90.0);
        assert!((bounds.max_lat - 55.776_573).abs() < 1e-6);
        assert!((bounds.min_lat - 40.979_898).abs() < 1e-6);
    }

    #[test]
    fn whole_world_at_zoom_zero() {
        let grid = TileGrid::new(Tile::new(0, 0, 0), Tile::new(0, 0, 0));
        let bounds = grid.bounds();

        assert_eq!(grid.pixel_size().unwrap(), (256, 256));
        assert_eq!((bounds.min_lon, bounds.max_lon), (-180.0, 180.0));
        assert!((bounds.min_lat + bounds.max_lat).abs() < 1e-9);
    }

    #[test]
    fn oversized_grid_is_rejected() {
        let grid = TileGrid::new(Tile::new(0, 0, 30), Tile::new(20_000_000, 0, 30));
        assert!(matches!(
            grid.pixel_size(),
            Err(Error::Config { param: "bbox", .. })
        ));
    }
}
