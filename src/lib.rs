//! Build map images from webmap tiles or static map services.
//!
//! Tiles are fetched from OpenStreetMap, Stamen or any other slippy-map
//! server, cached on disk and stitched into a single image. Static map
//! services (Google Static Maps style) are fetched as one image per request.
//! Either way the result comes with the bounding box it actually covers,
//! which is usually a little larger than the one requested.
//!
//! Cached tiles are never revalidated. Delete files from the cache directory
//! to force a fresh download.
//!
//! # Usage
//!
//! The library is also available as the `webmap-stitch` CLI, which features a
//! helpful help text you can access via `-h` / `--help`.
//!
//! # CLI Example
//!
//! ```bash
//! webmap-stitch \
//!   --provider stamen \
//!   --map-type toner \
//!   --north 50.811 \
//!   --east 6.1649 \
//!   --south 50.7492 \
//!   --west 6.031 \
//!   --zoom 14 \
//!   --cache ./tiles \
//!   --output aachen.png
//! ```
//!
//! # Library Example
//! ```rust,no_run
//! use webmap_stitch::{BoundingBox, ImageCanvas, ManagerConfig, MapManager, MapOptions, Provider};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let mut manager = MapManager::new(ManagerConfig {
//!     provider: Provider::Stamen,
//!     cache_dir: Some("./tiles".into()),
//!     ..ManagerConfig::default()
//! })
//! .expect("no usable cache directory");
//!
//! let options = MapOptions {
//!     map_type: Some("toner".into()),
//!     ..MapOptions::default()
//! };
//! let map = manager
//!     .create_map::<ImageCanvas>(&BoundingBox::new(50.7492, 50.811, 6.031, 6.1649), 14, &options)
//!     .await
//!     .expect("failed creating map");
//!
//! map.image.save("aachen.png").expect("failed saving map");
//! # }
//! ```

mod bounding_box;
mod cache;
mod canvas;
mod config;
mod error;
mod fetch;
mod grid;
mod manager;
pub mod projection;
mod provider;
mod static_map;
mod stitch;
mod tile;
mod url;

pub use bounding_box::{BoundingBox, GeoPoint};
pub use cache::{cache_prefix, resolve_cache_dir, TileCache, TileKey};
pub use canvas::{Canvas, CanvasError, ImageCanvas};
pub use config::{ColorMode, ManagerConfig, MapOptions, StaticMapOptions};
pub use error::{Error, Result};
pub use fetch::{FetchError, Fetcher, HttpFetcher};
pub use grid::{TileGrid, TILE_SIZE};
pub use manager::MapManager;
pub use provider::{MapSource, Provider, StaticMapParams};
pub use static_map::{StaticMapRequest, MAX_SIZE, SCALES};
pub use stitch::{fetch_static, stitch_tiles, MapResult};
pub use tile::{Tile, MAX_ZOOM};
pub use url::UrlFormat;
