//! On-disk tile cache.
//!
//! Files live in a single flat directory and are named after their
//! [`TileKey`]. A file that exists is trusted forever: nothing is revalidated
//! against the server, and entries only disappear when deleted externally.

use std::{
    env, fmt, fs,
    path::{Path, PathBuf},
};

use md5::{Digest, Md5};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::fetch::{FetchError, Fetcher};
use crate::provider::MapSource;
use crate::static_map::StaticMapRequest;
use crate::tile::Tile;

const PREFIX_LEN: usize = 5;

/// Returns the cache prefix for `server`: the first five hex digits of the
/// MD5 of the server string.
pub fn cache_prefix(server: &str) -> String {
    let mut digest = format!("{:x}", Md5::digest(server.as_bytes()));
    digest.truncate(PREFIX_LEN);
    digest
}

/// Identifies a cached tile.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct TileKey {
    pub prefix: String,
    pub map_type: String,
    pub tile: Tile,
}

impl TileKey {
    /// `<prefix>-<map type>_<zoom>_<x>_<y>.png`
    pub fn file_name(&self) -> String {
        format!(
            "{}-{}_{}_{}_{}.png",
            self.prefix, self.map_type, self.tile.z, self.tile.x, self.tile.y
        )
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}

/// Picks the cache directory.
///
/// Uses `requested` if it is a writable directory or can be created. Falls
/// back to the first writable temp directory from `TMPDIR`, `TMP`, `TEMP` and
/// the platform default.
pub fn resolve_cache_dir(requested: Option<&Path>) -> Result<PathBuf> {
    let fallbacks = ["TMPDIR", "TMP", "TEMP"]
        .iter()
        .filter_map(|var| env::var_os(var))
        .map(PathBuf::from)
        .chain(std::iter::once(env::temp_dir()));

    resolve_cache_dir_from(requested, fallbacks)
}

fn resolve_cache_dir_from(
    requested: Option<&Path>,
    fallbacks: impl IntoIterator<Item = PathBuf>,
) -> Result<PathBuf> {
    let mut tried = Vec::new();

    if let Some(dir) = requested {
        if !dir.is_dir() {
            match fs::create_dir_all(dir) {
                Ok(()) => {
                    info!(dir = %dir.display(), "created cache directory");
                    return Ok(dir.to_owned());
                }
                Err(e) => warn!(dir = %dir.display(), error = %e, "could not create cache directory"),
            }
        } else if is_writable(dir) {
            return Ok(dir.to_owned());
        } else {
            warn!(dir = %dir.display(), "insufficient privileges on cache directory");
        }
        tried.push(dir.to_owned());
    }

    for dir in fallbacks {
        if dir.is_dir() && is_writable(&dir) {
            info!(dir = %dir.display(), "using temp directory to cache map tiles");
            return Ok(dir);
        }
        tried.push(dir);
    }

    Err(Error::CacheDir { tried })
}

fn is_writable(dir: &Path) -> bool {
    tempfile::tempfile_in(dir).is_ok()
}

/// Maps tiles to local files, downloading them on a cache miss.
#[derive(Debug)]
pub struct TileCache<F> {
    dir: PathBuf,
    fetcher: F,
}

impl<F: Fetcher> TileCache<F> {
    /// Creates a cache in the directory picked by [`resolve_cache_dir`].
    pub fn new(dir: Option<&Path>, fetcher: F) -> Result<Self> {
        Ok(Self {
            dir: resolve_cache_dir(dir)?,
            fetcher,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn path_for(&self, key: &TileKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    /// Returns the local file for `tile`, downloading it from `source` if it
    /// isn't cached yet.
    pub async fn fetch(&self, source: &MapSource, tile: Tile) -> Result<PathBuf> {
        let path = self.path_for(&source.tile_key(tile));
        if path.is_file() {
            debug!(%tile, "tile cache hit");
            return Ok(path);
        }

        let url = source.tile_url(tile)?;
        debug!(%tile, %url, "tile cache miss");
        self.download(&url, &path)
            .await
            .map_err(|e| Error::Fetch {
                target: format!("tile {}", tile),
                url,
                source: e,
            })?;

        Ok(path)
    }

    /// Returns the local file for a static map image, downloading it if it
    /// isn't cached yet.
    pub async fn fetch_static(&self, source: &MapSource, request: &StaticMapRequest) -> Result<PathBuf> {
        let url = request.url(source);
        let path = self.dir.join(request.file_name(source.cache_prefix(), source.map_type(), &url));
        if path.is_file() {
            debug!(%url, "static map cache hit");
            return Ok(path);
        }

        debug!(%url, "static map cache miss");
        self.download(&url, &path)
            .await
            .map_err(|e| Error::Fetch {
                target: "static map image".to_owned(),
                url,
                source: e,
            })?;

        Ok(path)
    }

    /// Downloads into a temporary file next to `path` and renames it into
    /// place. A partial download is never visible under `path`.
    async fn download(&self, url: &str, path: &Path) -> std::result::Result<(), FetchError> {
        let partial = tempfile::Builder::new()
            .prefix(".webmap-")
            .suffix(".part")
            .tempfile_in(&self.dir)?
            .into_temp_path();

        self.fetcher.fetch(url, &partial).await?;
        partial.persist(path).map_err(|e| e.error)?;

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::provider::Provider;
    use std::{
        io,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Mutex,
        },
    };
    use tempfile::TempDir;

    /// Writes the URL into the destination and records every call.
    #[derive(Debug, Default)]
    pub(crate) struct CountingFetcher {
        pub calls: AtomicUsize,
        pub urls: Mutex<Vec<String>>,
        pub fail_on: Option<String>,
    }

    impl CountingFetcher {
        pub fn failing_on(pattern: &str) -> Self {
            Self {
                fail_on: Some(pattern.to_owned()),
                ..Self::default()
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Fetcher for CountingFetcher {
        async fn fetch(&self, url: &str, dest: &Path) -> std::result::Result<(), FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.urls.lock().unwrap().push(url.to_owned());

            if let Some(pattern) = &self.fail_on {
                if url.contains(pattern.as_str()) {
                    return Err(io::Error::new(io::ErrorKind::Other, "connection reset").into());
                }
            }

            tokio::fs::write(dest, url.as_bytes()).await?;
            Ok(())
        }
    }

    fn osm_source() -> MapSource {
        MapSource::new(Provider::OpenStreetMap, "https://tile.openstreetmap.org", None).unwrap()
    }

    #[test]
    fn prefix_is_md5_of_server() {
        assert_eq!(cache_prefix("https://tile.openstreetmap.org"), "45888");
        assert_ne!(cache_prefix("http://tile.stamen.com"), "45888");
        assert_eq!(cache_prefix(""), "d41d8");
    }

    #[test]
    fn key_file_name() {
        let key = TileKey {
            prefix: "abcde".to_owned(),
            map_type: "toner".to_owned(),
            tile: Tile::new(5, 10, 4),
        };
        assert_eq!(key.file_name(), "abcde-toner_4_5_10.png");
    }

    #[test]
    fn creates_requested_dir() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("tiles").join("osm");

        assert_eq!(resolve_cache_dir(Some(&dir)).unwrap(), dir);
        assert!(dir.is_dir());
    }

    #[test]
    fn falls_back_to_temp_dir() {
        let root = TempDir::new().unwrap();
        // a regular file can neither be used nor created as a directory
        let file = root.path().join("not-a-dir");
        fs::write(&file, b"").unwrap();

        let dir = resolve_cache_dir(Some(&file.join("tiles"))).unwrap();
        assert!(dir.is_dir());
        assert_ne!(dir, file.join("tiles"));
    }

    #[test]
    fn no_usable_dir_is_fatal() {
        let root = TempDir::new().unwrap();
        let file = root.path().join("not-a-dir");
        fs::write(&file, b"").unwrap();
        let requested = file.join("tiles");
        let missing = root.path().join("missing");

        let err = resolve_cache_dir_from(Some(&requested), vec![file.clone(), missing.clone()])
            .unwrap_err();
        match err {
            Error::CacheDir { tried } => assert_eq!(tried, vec![requested, file.clone(), missing]),
            other => panic!("unexpected error: {:?}", other),
        }

        let fallback = resolve_cache_dir_from(None, vec![file, root.path().to_owned()]).unwrap();
        assert_eq!(fallback.as_path(), root.path());
    }

    #[tokio::test]
    async fn miss_then_hit() {
        let root = TempDir::new().unwrap();
        let cache = TileCache::new(Some(root.path()), CountingFetcher::default()).unwrap();
        let source = osm_source();
        let tile = Tile::new(1, 2, 3);

        let path = cache.fetch(&source, tile).await.unwrap();
        assert_eq!(path, cache.path_for(&source.tile_key(tile)));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "https://tile.openstreetmap.org/3/1/2.png"
        );

        let again = cache.fetch(&source, tile).await.unwrap();
        assert_eq!(again, path);
        assert_eq!(cache.fetcher().calls(), 1);
    }

    #[tokio::test]
    async fn failed_download_leaves_no_entry() {
        let root = TempDir::new().unwrap();
        let cache = TileCache::new(Some(root.path()), CountingFetcher::failing_on("/3/1/2")).unwrap();
        let source = osm_source();
        let tile = Tile::new(1, 2, 3);

        let err = cache.fetch(&source, tile).await.unwrap_err();
        match err {
            Error::Fetch { target, url, .. } => {
                assert_eq!(target, "tile 3/1/2");
                assert_eq!(url, "https://tile.openstreetmap.org/3/1/2.png");
            }
            other => panic!("unexpected error: {:?}", other),
        }

        assert!(!cache.path_for(&source.tile_key(tile)).exists());
        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
    }
}
