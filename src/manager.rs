use std::path::Path;

use indicatif::ProgressBar;

use crate::bounding_box::BoundingBox;
use crate::cache::TileCache;
use crate::canvas::Canvas;
use crate::config::{ManagerConfig, MapOptions};
use crate::error::{Error, Result};
use crate::fetch::{Fetcher, HttpFetcher};
use crate::provider::{MapSource, Provider};
use crate::static_map::StaticMapRequest;
use crate::stitch::{fetch_static, stitch_tiles, MapResult};

/// Retrieves, caches and composes map images from one provider.
///
/// # Example
/// ```no_run
/// use webmap_stitch::{BoundingBox, ImageCanvas, ManagerConfig, MapManager, MapOptions};
///
/// # #[tokio::main]
/// # async fn main() -> webmap_stitch::Result<()> {
/// let mut manager = MapManager::new(ManagerConfig {
///     cache_dir: Some("./tiles".into()),
///     ..ManagerConfig::default()
/// })?;
///
/// let aachen_germany = BoundingBox::new(50.7492, 50.811, 6.031, 6.1649);
/// let map = manager
///     .create_map::<ImageCanvas>(&aachen_germany, 14, &MapOptions::default())
///     .await?;
/// println!("covers {:?}", map.bounds);
/// # Ok(())
/// # }
/// ```
pub struct MapManager<F = HttpFetcher> {
    provider: Provider,
    server: String,
    cache: TileCache<F>,
    fetch_rate: usize,
    progress: ProgressBar,
    prepared: bool,
}

impl MapManager<HttpFetcher> {
    /// Creates a manager downloading over HTTP.
    pub fn new(config: ManagerConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.user_agent, config.timeout).map_err(|e| {
            Error::config("user_agent", format!("failed creating HTTP client: {}", e))
        })?;

        Self::with_fetcher(config, fetcher)
    }
}

impl<F: Fetcher> MapManager<F> {
    /// Creates a manager downloading through `fetcher`.
    pub fn with_fetcher(config: ManagerConfig, fetcher: F) -> Result<Self> {
        let server = match &config.server {
            Some(base) => config.provider.server_from_base(base),
            None => config.provider.default_server(),
        };

        Ok(MapManager {
            cache: TileCache::new(config.cache_dir.as_deref(), fetcher)?,
            provider: config.provider,
            server,
            fetch_rate: usize::from(config.fetch_rate),
            progress: ProgressBar::hidden(),
            prepared: false,
        })
    }

    /// Reports tile downloads on `progress`.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn cache_dir(&self) -> &Path {
        self.cache.dir()
    }

    pub fn cache(&self) -> &TileCache<F> {
        &self.cache
    }

    /// Creates a map image covering `bbox` at `zoom`.
    ///
    /// Tile providers stitch all tiles touching `bbox`; the returned bounds
    /// are those of the full tiles. Static map providers fetch a single image
    /// centered on `bbox` and sized by `options.static_map`.
    ///
    /// All options are validated before anything is downloaded.
    pub async fn create_map<C: Canvas>(
        &mut self,
        bbox: &BoundingBox,
        zoom: u8,
        options: &MapOptions,
    ) -> Result<MapResult<C::Output>> {
        if self.prepared && !options.overwrite {
            return Err(Error::config(
                "overwrite",
                "a map image was already prepared; set overwrite to create a new one",
            ));
        }
        bbox.validate()?;

        let source = MapSource::new(self.provider.clone(), &self.server, options.map_type.as_deref())?;

        let map = if source.single_request() {
            let request = StaticMapRequest::new(bbox, zoom, &options.static_map)?;
            fetch_static::<F, C>(&self.cache, &source, &request, options.color).await?
        } else {
            let grid = bbox.tile_grid(zoom)?;
            stitch_tiles::<F, C>(
                &self.cache,
                &source,
                &grid,
                options.color,
                self.fetch_rate,
                &self.progress,
            )
            .await?
        };

        self.prepared = true;
        Ok(map)
    }

    /// Number of tiles a tile provider would fetch for `bbox` at `zoom`, or
    /// one for static map providers.
    pub fn tile_count(&self, bbox: &BoundingBox, zoom: u8) -> Result<u64> {
        if self.provider.single_request() {
            Ok(1)
        } else {
            Ok(bbox.tile_grid(zoom)?.tile_count())
        }
    }
}
