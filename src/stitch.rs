//! Composes fetched tiles (or a single static image) into one map image.

use futures::{stream, StreamExt, TryStreamExt};
use indicatif::ProgressBar;
use tracing::debug;

use crate::bounding_box::BoundingBox;
use crate::canvas::Canvas;
use crate::cache::TileCache;
use crate::config::ColorMode;
use crate::error::{Error, Result};
use crate::fetch::Fetcher;
use crate::grid::TileGrid;
use crate::provider::MapSource;
use crate::static_map::StaticMapRequest;

/// A composed map image and the area it actually covers.
///
/// The covered area is usually larger than the requested one since it is
/// expanded to full tiles, or framed by the static map service.
#[derive(Clone, Debug)]
pub struct MapResult<I> {
    pub image: I,
    pub bounds: BoundingBox,
}

/// Fetches every tile of `grid` and pastes it into a fresh canvas.
///
/// Up to `fetch_rate` tiles are downloaded at once. The first failure aborts
/// the whole map and no partial image is returned.
pub async fn stitch_tiles<F: Fetcher, C: Canvas>(
    cache: &TileCache<F>,
    source: &MapSource,
    grid: &TileGrid,
    color: ColorMode,
    fetch_rate: usize,
    progress: &ProgressBar,
) -> Result<MapResult<C::Output>> {
    let (width, height) = grid.pixel_size()?;
    debug!(
        zoom = grid.zoom(),
        columns = grid.columns(),
        rows = grid.rows(),
        width,
        height,
        "stitching tile grid"
    );

    let mut canvas = C::create(width, height, color).map_err(|e| Error::MapBuild {
        target: format!("a {}x{} canvas", width, height),
        source: e,
    })?;

    progress.set_length(grid.tile_count());
    progress.set_position(0);

    let fetched: Result<Vec<_>> = stream::iter(grid.tiles())
        .map(|tile| async move {
            let path = cache.fetch(source, tile).await?;
            progress.inc(1);
            Ok::<_, Error>((tile, path))
        })
        .buffer_unordered(fetch_rate.max(1))
        .try_collect()
        .await;
    progress.finish_and_clear();

    for (tile, path) in fetched? {
        let (x, y) = grid.pixel_offset(tile);
        canvas.paste_file(&path, x, y).map_err(|e| Error::MapBuild {
            target: format!("tile {}", tile),
            source: e,
        })?;
    }

    Ok(MapResult {
        image: canvas.into_output(),
        bounds: grid.bounds(),
    })
}

/// Fetches one composed image from a static map service.
pub async fn fetch_static<F: Fetcher, C: Canvas>(
    cache: &TileCache<F>,
    source: &MapSource,
    request: &StaticMapRequest,
    color: ColorMode,
) -> Result<MapResult<C::Output>> {
    let bounds = request.bounds()?;
    let (width, height) = request.pixel_size();

    let mut canvas = C::create(width, height, color).map_err(|e| Error::MapBuild {
        target: format!("a {}x{} canvas", width, height),
        source: e,
    })?;

    let path = cache.fetch_static(source, request).await?;
    canvas.paste_file(&path, 0, 0).map_err(|e| Error::MapBuild {
        target: "static map image".to_owned(),
        source: e,
    })?;

    Ok(MapResult {
        image: canvas.into_output(),
        bounds,
    })
}
