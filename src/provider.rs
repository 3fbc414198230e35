//! Map providers and the per-call tile source built from them.
//!
//! A [`Provider`] names a map service and knows its default server and map
//! types. A [`MapSource`] binds a provider to a concrete server and map type
//! and is the only thing the stitcher and the cache talk to.

use std::{fmt, str::FromStr};

use crate::cache::{cache_prefix, TileKey};
use crate::error::{Error, Result};
use crate::tile::Tile;
use crate::url::{with_query, UrlFormat};

const OSM_SERVER: &str = "https://tile.openstreetmap.org";
const STAMEN_SERVER: &str = "http://tile.stamen.com";
const GOOGLE_STATIC_SERVER: &str = "http://maps.googleapis.com/maps/api/staticmap";

const OSM_MAP_TYPES: &[&str] = &[""];
const STAMEN_MAP_TYPES: &[&str] = &["terrain", "watercolor", "toner"];
const GOOGLE_MAP_TYPES: &[&str] = &["terrain", "satellite", "roadmap", "hybrid"];

/// Localization parameters sent with every static map request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StaticMapParams {
    /// Label language, e.g. `en-EN`.
    pub language: Option<String>,

    /// Two-character ccTLD region code.
    pub region: Option<String>,

    pub sensor: bool,
}

/// A supported map service.
#[derive(Clone, Debug, PartialEq)]
pub enum Provider {
    OpenStreetMap,
    Stamen,
    /// A Google Static Maps style service returning one composed image per
    /// request.
    GoogleStatic(StaticMapParams),
}

impl Provider {
    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenStreetMap => "osm",
            Provider::Stamen => "stamen",
            Provider::GoogleStatic(_) => "google",
        }
    }

    /// The server used when none is configured. For static map services the
    /// localization parameters are part of the server string.
    pub fn default_server(&self) -> String {
        match self {
            Provider::OpenStreetMap => OSM_SERVER.to_owned(),
            Provider::Stamen => STAMEN_SERVER.to_owned(),
            Provider::GoogleStatic(_) => self.server_from_base(GOOGLE_STATIC_SERVER),
        }
    }

    /// Builds the full server string from a configured base URL.
    pub fn server_from_base(&self, base: &str) -> String {
        match self {
            Provider::GoogleStatic(params) => with_query(
                base,
                &[
                    ("language", params.language.clone().unwrap_or_default()),
                    ("region", params.region.clone().unwrap_or_default()),
                    ("sensor", params.sensor.to_string()),
                ],
            ),
            _ => base.to_owned(),
        }
    }

    pub fn map_types(&self) -> &'static [&'static str] {
        match self {
            Provider::OpenStreetMap => OSM_MAP_TYPES,
            Provider::Stamen => STAMEN_MAP_TYPES,
            Provider::GoogleStatic(_) => GOOGLE_MAP_TYPES,
        }
    }

    pub fn default_map_type(&self) -> &'static str {
        self.map_types()[0]
    }

    /// Whether the provider serves one composed image per request instead of
    /// a tile grid.
    pub fn single_request(&self) -> bool {
        matches!(self, Provider::GoogleStatic(_))
    }

    /// Resolves the requested map type, falling back to the default.
    pub fn map_type(&self, requested: Option<&str>) -> Result<&'static str> {
        let requested = match requested {
            None => return Ok(self.default_map_type()),
            // OSM has a single unnamed map type
            Some(_) if *self == Provider::OpenStreetMap => return Ok(""),
            Some(requested) => requested,
        };

        self.map_types()
            .iter()
            .find(|map_type| **map_type == requested)
            .copied()
            .ok_or_else(|| {
                Error::config(
                    "map_type",
                    format!(
                        "{:?} is not one of {:?} for {}",
                        requested,
                        self.map_types(),
                        self.name()
                    ),
                )
            })
    }
}

impl FromStr for Provider {
    type Err = &'static str;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "osm" | "openstreetmap" => Ok(Provider::OpenStreetMap),
            "stamen" => Ok(Provider::Stamen),
            "google" | "googlestatic" => Ok(Provider::GoogleStatic(StaticMapParams::default())),
            _ => Err("unrecognized provider"),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A provider bound to a server and a validated map type.
#[derive(Debug)]
pub struct MapSource {
    provider: Provider,
    server: String,
    map_type: &'static str,
    cache_prefix: String,
    url_fmt: Option<UrlFormat>,
}

impl MapSource {
    /// Binds `provider` to `server` (a full server string, see
    /// [`Provider::server_from_base`]) and the requested map type.
    pub fn new(provider: Provider, server: &str, map_type: Option<&str>) -> Result<Self> {
        let map_type = provider.map_type(map_type)?;
        let url_fmt = if provider.single_request() {
            None
        } else {
            Some(UrlFormat::new(server, map_type)?)
        };

        Ok(MapSource {
            cache_prefix: cache_prefix(server),
            server: server.to_owned(),
            provider,
            map_type,
            url_fmt,
        })
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn map_type(&self) -> &str {
        self.map_type
    }

    pub fn cache_prefix(&self) -> &str {
        &self.cache_prefix
    }

    pub fn single_request(&self) -> bool {
        self.provider.single_request()
    }

    pub fn tile_url(&self, tile: Tile) -> Result<String> {
        match &self.url_fmt {
            Some(url_fmt) => url_fmt.tile_url(&tile, self.map_type),
            None => Err(Error::config(
                "provider",
                format!("{} serves static images, not tiles", self.provider),
            )),
        }
    }

    pub fn tile_key(&self, tile: Tile) -> TileKey {
        TileKey {
            prefix: self.cache_prefix.clone(),
            map_type: self.map_type.to_owned(),
            tile,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamen_map_types() {
        assert_eq!(Provider::Stamen.map_type(None).unwrap(), "terrain");
        assert_eq!(Provider::Stamen.map_type(Some("toner")).unwrap(), "toner");

        let err = Provider::Stamen.map_type(Some("satellite")).unwrap_err();
        assert!(matches!(err, Error::Config { param: "map_type", .. }));
    }

    #[test]
    fn osm_ignores_map_type() {
        assert_eq!(Provider::OpenStreetMap.map_type(None).unwrap(), "");
        assert_eq!(Provider::OpenStreetMap.map_type(Some("toner")).unwrap(), "");
    }

    #[test]
    fn google_server_carries_params() {
        let provider = Provider::GoogleStatic(StaticMapParams {
            language: Some("en-EN".into()),
            region: None,
            sensor: false,
        });

        assert_eq!(
            provider.default_server(),
            "http://maps.googleapis.com/maps/api/staticmap?language=en-EN&sensor=false"
        );
        assert!(provider.single_request());
        assert_eq!(provider.map_type(None).unwrap(), "terrain");
    }

    #[test]
    fn parse_provider() {
        assert_eq!("OSM".parse::<Provider>().unwrap(), Provider::OpenStreetMap);
        assert_eq!("stamen".parse::<Provider>().unwrap(), Provider::Stamen);
        assert!("google".parse::<Provider>().unwrap().single_request());
        assert!("bing".parse::<Provider>().is_err());
    }

    #[test]
    fn source_builds_urls_and_keys() {
        let source = MapSource::new(Provider::Stamen, STAMEN_SERVER, Some("watercolor")).unwrap();
        let tile = Tile::new(5, 10, 4);

        assert_eq!(
            source.tile_url(tile).unwrap(),
            "http://tile.stamen.com/watercolor/4/5/10.png"
        );

        let key = source.tile_key(tile);
        assert_eq!(key.prefix, cache_prefix(STAMEN_SERVER));
        assert_eq!(key.map_type, "watercolor");
        assert_eq!(key.tile, tile);
    }

    #[test]
    fn static_source_has_no_tiles() {
        let provider = Provider::GoogleStatic(StaticMapParams::default());
        let source = MapSource::new(provider.clone(), &provider.default_server(), None).unwrap();

        assert!(source.tile_url(Tile::new(0, 0, 0)).is_err());
    }
}
