//! Spherical-Mercator pixel coordinates at a fixed reference zoom.
//!
//! Pixel space here is the world at zoom 21 with 256px tiles, i.e. a square
//! of `2 * OFFSET` pixels whose origin is the north-west corner. Forward
//! projections return fractional pixels; inverse projections snap their input
//! to the nearest whole pixel first.

use std::f64::consts::PI;

use crate::error::{Error, Result};

/// Zoom level the pixel coordinates are expressed at.
pub const REFERENCE_ZOOM: u8 = 21;

/// Half the world width in pixels at [`REFERENCE_ZOOM`] (2^28).
pub const OFFSET: f64 = 268_435_456.0;

/// Radius of the projected sphere in pixels.
pub const RADIUS: f64 = OFFSET / PI;

pub fn lon_to_pixel_x(lon: f64) -> f64 {
    OFFSET + RADIUS * lon.to_radians()
}

/// Undefined at the poles.
pub fn lat_to_pixel_y(lat: f64) -> f64 {
    let sin = lat.to_radians().sin();
    OFFSET - RADIUS * ((1.0 + sin) / (1.0 - sin)).ln() / 2.0
}

pub fn pixel_x_to_lon(x: f64) -> f64 {
    ((x.round() - OFFSET) / RADIUS).to_degrees()
}

pub fn pixel_y_to_lat(y: f64) -> f64 {
    (PI / 2.0 - 2.0 * ((y.round() - OFFSET) / RADIUS).exp().atan()).to_degrees()
}

/// Moves the center `(lon, lat)` by `(dx, dy)` pixels measured at `zoom`.
///
/// Positive `dx` moves east, positive `dy` moves south. Returns the new
/// `(lon, lat)`.
///
/// # Errors
/// Fails with [`Error::Config`] if `zoom` is above [`REFERENCE_ZOOM`].
pub fn shift_center(dx: i64, dy: i64, lon: f64, lat: f64, zoom: u8) -> Result<(f64, f64)> {
    if zoom > REFERENCE_ZOOM {
        return Err(Error::config(
            "zoom",
            format!(
                "{} is above the maximum of {} for static map framing",
                zoom, REFERENCE_ZOOM
            ),
        ));
    }

    let scale = 1_i64 << (REFERENCE_ZOOM - zoom);
    let x = lon_to_pixel_x(lon) + (dx * scale) as f64;
    let y = lat_to_pixel_y(lat) + (dy * scale) as f64;

    Ok((pixel_x_to_lon(x), pixel_y_to_lat(y)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // Half a reference pixel is ~3.4e-7°.
    const TOLERANCE: f64 = 1e-6;

    #[test]
    fn origin_is_world_center() {
        assert_eq!(lon_to_pixel_x(0.0), OFFSET);
        assert_eq!(lat_to_pixel_y(0.0), OFFSET);
        assert_eq!(pixel_x_to_lon(OFFSET), 0.0);
        assert!(pixel_y_to_lat(OFFSET).abs() < 1e-12);
    }

    #[test]
    fn world_edges() {
        assert!((lon_to_pixel_x(-180.0)).abs() < 1e-6);
        assert!((lon_to_pixel_x(180.0) - 2.0 * OFFSET).abs() < 1e-6);
        // the Mercator limit maps to the top edge of the world
        assert!(lat_to_pixel_y(85.051_128_78).abs() < 1.0);
    }

    #[test]
    fn inverse_snaps_to_whole_pixels() {
        assert_eq!(pixel_x_to_lon(OFFSET + 0.4), 0.0);
        assert_eq!(pixel_x_to_lon(OFFSET + 0.6), pixel_x_to_lon(OFFSET + 1.0));
    }

    #[test]
    fn zero_shift_keeps_center() {
        for zoom in 0..=REFERENCE_ZOOM {
            let (lon, lat) = shift_center(0, 0, 6.0402, 50.7929, zoom).unwrap();
            assert!((lon - 6.0402).abs() < TOLERANCE);
            assert!((lat - 50.7929).abs() < TOLERANCE);
        }
    }

    #[test]
    fn shift_scales_with_zoom() {
        // 128px at zoom 1 is a quarter of the world width
        let (lon, _) = shift_center(128, 0, 0.0, 0.0, 1).unwrap();
        assert!((lon - 90.0).abs() < TOLERANCE);

        let (lon, lat) = shift_center(-128, -128, 0.0, 0.0, 2).unwrap();
        assert!((lon + 45.0).abs() < TOLERANCE);
        assert!((lat - 40.979_898).abs() < 1e-5);
    }

    #[test]
    fn shift_rejects_zoom_above_reference() {
        let err = shift_center(1, 1, 0.0, 0.0, 22).unwrap_err();
        assert!(matches!(err, Error::Config { param: "zoom", .. }));
    }

    proptest! {
        #[test]
        fn lon_round_trip(lon in -179.99f64..179.99) {
            prop_assert!((pixel_x_to_lon(lon_to_pixel_x(lon)) - lon).abs() < TOLERANCE);
        }

        #[test]
        fn lat_round_trip(lat in -84.99f64..84.99) {
            prop_assert!((pixel_y_to_lat(lat_to_pixel_y(lat)) - lat).abs() < TOLERANCE);
        }
    }
}
