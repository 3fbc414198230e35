use crate::error::{Error, Result};
use crate::grid::TileGrid;
use crate::tile::{Tile, MAX_ZOOM};

/// A point in degrees.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        GeoPoint { lat, lon }
    }
}

/// A bounding box given by its latitude and longitude extents in degrees.
///
/// # Example
/// ```rust
/// # use webmap_stitch::BoundingBox;
/// let aachen_germany = BoundingBox::new(50.7492, 50.811, 6.031, 6.1649);
/// assert_eq!(aachen_germany.center().lat, (50.7492 + 50.811) / 2.0);
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Creates a bounding box. The values are not checked here, see
    /// [`BoundingBox::validate`].
    pub fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        BoundingBox {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    /// Checks that all values are finite, latitudes lie strictly between the
    /// poles, longitudes lie within [-180, 180] and the minimums don't exceed
    /// the maximums.
    pub fn validate(&self) -> Result<()> {
        let values = [self.min_lat, self.max_lat, self.min_lon, self.max_lon];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(Error::config("bbox", format!("{:?} has non-finite values", self)));
        }
        if self.min_lat <= -90.0 || self.max_lat >= 90.0 {
            return Err(Error::config("bbox", "latitudes must lie strictly between -90° and 90°"));
        }
        if self.min_lon < -180.0 || self.max_lon > 180.0 {
            return Err(Error::config("bbox", "longitudes must lie within [-180°, 180°]"));
        }
        if self.min_lat > self.max_lat || self.min_lon > self.max_lon {
            return Err(Error::config(
                "bbox",
                format!("{:?} has a minimum above its maximum", self),
            ));
        }

        Ok(())
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.lat)
            && (self.min_lon..=self.max_lon).contains(&point.lon)
    }

    /// Returns the grid of tiles at `zoom` covering this bounding box.
    ///
    /// # Errors
    /// Fails with [`Error::Config`] if `zoom` is above [`MAX_ZOOM`].
    pub fn tile_grid(&self, zoom: u8) -> Result<TileGrid> {
        if zoom > MAX_ZOOM {
            return Err(Error::config(
                "zoom",
                format!("{} is above the maximum of {}", zoom, MAX_ZOOM),
            ));
        }

        let nw = Tile::from_lon_lat(self.min_lon, self.max_lat, zoom);
        let se = Tile::from_lon_lat(self.max_lon, self.min_lat, zoom);

        Ok(TileGrid::new(nw, se))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_bbox() {
        assert!(BoundingBox::new(50.7492, 50.811, 6.031, 6.1649).validate().is_ok());
        assert!(BoundingBox::new(-85.0, 85.0, -180.0, 180.0).validate().is_ok());
    }

    #[test]
    fn rejects_poles() {
        let err = BoundingBox::new(0.0, 90.0, 0.0, 1.0).validate().unwrap_err();
        assert!(matches!(err, Error::Config { param: "bbox", .. }));
    }

    #[test]
    fn rejects_nan_and_inverted() {
        assert!(BoundingBox::new(f64::NAN, 1.0, 0.0, 1.0).validate().is_err());
        assert!(BoundingBox::new(2.0, 1.0, 0.0, 1.0).validate().is_err());
        assert!(BoundingBox::new(0.0, 1.0, 3.0, 1.0).validate().is_err());
        assert!(BoundingBox::new(0.0, 1.0, -181.0, 1.0).validate().is_err());
    }

    #[test]
    fn center_and_contains() {
        let bbox = BoundingBox::new(10.0, 20.0, -30.0, -10.0);
        assert_eq!(bbox.center(), GeoPoint::new(15.0, -20.0));
        assert!(bbox.contains(bbox.center()));
        assert!(!bbox.contains(GeoPoint::new(25.0, -20.0)));
    }

    #[test]
    fn grid_corners() {
        let grid = BoundingBox::new(50.7492, 50.811, 6.031, 6.1649).tile_grid(18).unwrap();
        assert_eq!(grid.min(), Tile::new(135463, 87978, 18));
        assert_eq!(grid.max(), Tile::new(135561, 88049, 18));
    }

    #[test]
    fn grid_zoom_is_bounded() {
        let aachen = BoundingBox::new(50.7492, 50.811, 6.031, 6.1649);

        let deepest = aachen.tile_grid(MAX_ZOOM).unwrap();
        assert!(deepest.tile_count() > 1);

        for zoom in [MAX_ZOOM + 1, 40, 63, 64, u8::MAX] {
            let err = aachen.tile_grid(zoom).unwrap_err();
            assert!(matches!(err, Error::Config { param: "zoom", .. }));
        }
    }
}
