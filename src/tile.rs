use std::f64::consts::PI;
use std::fmt;

/// Highest zoom level whose tile indices fit in `u32`.
pub const MAX_ZOOM: u8 = 30;

/// An OSM slippy-map tile with x, y and z-coordinate.
/// ref: https://wiki.openstreetmap.org/wiki/Slippy_map_tilenames
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Tile {
    pub x: u32,
    pub y: u32,
    pub z: u8,
}

impl Tile {
    pub fn new(x: u32, y: u32, z: u8) -> Self {
        Self { x, y, z }
    }

    /// Number of tiles along each axis at zoom `z`.
    ///
    /// # Panics
    /// Panics if `z` is above [`MAX_ZOOM`].
    pub fn tiles_per_axis(z: u8) -> u64 {
        assert!(z <= MAX_ZOOM, "zoom {} is above the maximum of {}", z, MAX_ZOOM);
        1_u64 << z
    }

    /// Returns the tile containing the given point (in degrees).
    ///
    /// Indices are clamped into `[0, 2^zoom)`, so points on the antimeridian
    /// or beyond the Mercator latitude limit land in the outermost tile.
    ///
    /// # Panics
    /// Panics if `zoom` is above [`MAX_ZOOM`]; use
    /// [`BoundingBox::tile_grid`](crate::BoundingBox::tile_grid) for
    /// unchecked input.
    pub fn from_lon_lat(lon: f64, lat: f64, zoom: u8) -> Self {
        // scale factor
        let n = Tile::tiles_per_axis(zoom) as f64;
        let lat_rad = lat.to_radians();

        let x = (lon + 180_f64) / 360_f64 * n;
        let y = (1_f64 - (lat_rad.tan() + 1_f64 / lat_rad.cos()).ln() / PI) / 2_f64 * n;

        let max = n - 1_f64;
        Self::new(x.floor().clamp(0.0, max) as u32, y.floor().clamp(0.0, max) as u32, zoom)
    }

    /// Longitude and latitude (in degrees) of the tile's north-west corner.
    pub fn nw_corner(&self) -> (f64, f64) {
        let n = Tile::tiles_per_axis(self.z) as f64;

        let lon = self.x as f64 / n * 360_f64 - 180_f64;
        let lat = (PI * (1_f64 - 2_f64 * self.y as f64 / n)).sinh().atan();

        (lon, lat.to_degrees())
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}
