//! Single-request maps from static map services.
//!
//! The service composes the image itself, so the covered area is derived
//! by shifting the requested center by half the image size in pixels.

use md5::{Digest, Md5};

use crate::bounding_box::{BoundingBox, GeoPoint};
use crate::config::StaticMapOptions;
use crate::error::{Error, Result};
use crate::projection::{shift_center, REFERENCE_ZOOM};
use crate::provider::MapSource;
use crate::url::with_query;

/// Largest width or height a static map service accepts.
pub const MAX_SIZE: u32 = 640;

/// Accepted pixel multipliers.
pub const SCALES: &[u8] = &[1, 2, 4];

const URL_HASH_LEN: usize = 12;

/// A validated static map request.
#[derive(Clone, Debug, PartialEq)]
pub struct StaticMapRequest {
    center: GeoPoint,
    zoom: u8,
    options: StaticMapOptions,
}

impl StaticMapRequest {
    /// Validates `options` and centers the request on `bbox`.
    pub fn new(bbox: &BoundingBox, zoom: u8, options: &StaticMapOptions) -> Result<Self> {
        if zoom > REFERENCE_ZOOM {
            return Err(Error::config(
                "zoom",
                format!("{} is above the maximum of {}", zoom, REFERENCE_ZOOM),
            ));
        }

        let (width, height) = options.size;
        if width == 0 || height == 0 || width > MAX_SIZE || height > MAX_SIZE {
            return Err(Error::config(
                "size",
                format!(
                    "{}x{} must be between 1x1 and {}x{}",
                    width, height, MAX_SIZE, MAX_SIZE
                ),
            ));
        }

        if !SCALES.contains(&options.scale) {
            return Err(Error::config(
                "scale",
                format!("{} is not one of {:?}", options.scale, SCALES),
            ));
        }

        Ok(StaticMapRequest {
            center: bbox.center(),
            zoom,
            options: options.clone(),
        })
    }

    pub fn center(&self) -> GeoPoint {
        self.center
    }

    /// Size of the returned image in pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        let scale = u32::from(self.options.scale);
        (self.options.size.0 * scale, self.options.size.1 * scale)
    }

    pub fn url(&self, source: &MapSource) -> String {
        let (width, height) = self.options.size;

        let markers = self
            .options
            .markers
            .iter()
            .map(|point| format_point(*point))
            .collect::<Vec<_>>()
            .join("|");

        let mut params = vec![
            ("center", format_point(self.center)),
            ("zoom", self.zoom.to_string()),
            ("size", format!("{}x{}", width, height)),
            ("scale", self.options.scale.to_string()),
            ("format", "png8".to_owned()),
            ("maptype", source.map_type().to_owned()),
            ("style", self.options.style.clone().unwrap_or_default()),
            ("markers", markers),
        ];
        for path in &self.options.paths {
            let path = path
                .iter()
                .map(|point| format_point(*point))
                .collect::<Vec<_>>()
                .join("|");
            params.push(("path", path));
        }

        with_query(source.server(), &params)
    }

    /// Cache file name: `<prefix>-<map type>_<zoom>_<url hash>.png`.
    pub fn file_name(&self, prefix: &str, map_type: &str, url: &str) -> String {
        let mut hash = format!("{:x}", Md5::digest(url.as_bytes()));
        hash.truncate(URL_HASH_LEN);

        format!("{}-{}_{}_{}.png", prefix, map_type, self.zoom, hash)
    }

    /// The area covered by the returned image.
    ///
    /// Only the unscaled size matters here, the scale multiplies pixels
    /// without widening the view.
    pub fn bounds(&self) -> Result<BoundingBox> {
        let half_width = i64::from(self.options.size.0 / 2);
        let half_height = i64::from(self.options.size.1 / 2);
        let GeoPoint { lat, lon } = self.center;

        let (min_lon, max_lat) = shift_center(-half_width, -half_height, lon, lat, self.zoom)?;
        let (max_lon, min_lat) = shift_center(half_width, half_height, lon, lat, self.zoom)?;

        Ok(BoundingBox::new(min_lat, max_lat, min_lon, max_lon))
    }
}

/// `lat,lon` rounded to six decimals.
fn format_point(point: GeoPoint) -> String {
    let round = |v: f64| (v * 1e6).round() / 1e6;
    format!("{},{}", round(point.lat), round(point.lon))
}
