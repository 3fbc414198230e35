use std::{fmt, path::PathBuf, str::FromStr, time::Duration};

use tracing::warn;

use crate::bounding_box::GeoPoint;
use crate::provider::Provider;

/// Map manager configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct ManagerConfig {
    /// The map service to fetch from.
    pub provider: Provider,

    /// Directory for downloaded tiles. Falls back to a temp directory when
    /// unset or unusable.
    pub cache_dir: Option<PathBuf>,

    /// Overrides the provider's default server. May be a base URL or a
    /// template with `{x}`, `{y}`, `{z}`, `{t}` and `{s}` specifiers.
    pub server: Option<String>,

    /// User-Agent header sent with every request.
    pub user_agent: String,

    /// Timeout for fetching a single tile.
    ///
    /// Pass the zero duration to disable the timeout.
    pub timeout: Duration,

    /// Maximum number of parallel downloads.
    pub fetch_rate: u8,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        ManagerConfig {
            provider: Provider::OpenStreetMap,
            cache_dir: None,
            server: None,
            user_agent: format!("webmap-stitch/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(30),
            fetch_rate: 4,
        }
    }
}

/// Pixel format of the composed image.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ColorMode {
    /// RGBA
    #[default]
    Color,
    /// 8-bit grayscale
    Bw,
}

impl ColorMode {
    /// Parses `s`, logging a warning and falling back to [`ColorMode::Color`]
    /// for unknown values.
    pub fn lenient(s: &str) -> Self {
        s.parse().unwrap_or_else(|_| {
            warn!(value = s, "wrong color specification, must be 'color' or 'bw'; defaulting to 'color'");
            ColorMode::Color
        })
    }
}

impl FromStr for ColorMode {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "color" => Ok(ColorMode::Color),
            "bw" => Ok(ColorMode::Bw),
            _ => Err("must be 'color' or 'bw'"),
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ColorMode::Color => "color",
            ColorMode::Bw => "bw",
        })
    }
}

/// Options for a single static map request. Ignored by tile providers.
#[derive(Clone, Debug, PartialEq)]
pub struct StaticMapOptions {
    /// Width and height in pixels, each at most 640.
    pub size: (u32, u32),

    /// Pixel multiplier, one of 1, 2 or 4.
    pub scale: u8,

    /// Style specification passed through to the service verbatim.
    pub style: Option<String>,

    pub markers: Vec<GeoPoint>,

    /// Each path is drawn as its own polyline.
    pub paths: Vec<Vec<GeoPoint>>,
}

impl Default for StaticMapOptions {
    fn default() -> Self {
        StaticMapOptions {
            size: (256, 256),
            scale: 2,
            style: None,
            markers: Vec::new(),
            paths: Vec::new(),
        }
    }
}

/// Options for a single `create_map` call.
#[derive(Clone, Debug, PartialEq)]
pub struct MapOptions {
    pub color: ColorMode,

    /// Whether the manager may prepare another map image after it has
    /// already prepared one.
    pub overwrite: bool,

    /// Map type, defaulting to the provider's first map type.
    pub map_type: Option<String>,

    pub static_map: StaticMapOptions,
}

impl Default for MapOptions {
    fn default() -> Self {
        MapOptions {
            color: ColorMode::Color,
            overwrite: true,
            map_type: None,
            static_map: StaticMapOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_mode_parsing() {
        assert_eq!("bw".parse::<ColorMode>(), Ok(ColorMode::Bw));
        assert_eq!("color".parse::<ColorMode>(), Ok(ColorMode::Color));
        assert!("grey".parse::<ColorMode>().is_err());
    }

    #[test]
    fn lenient_color_mode_defaults() {
        assert_eq!(ColorMode::lenient("bw"), ColorMode::Bw);
        assert_eq!(ColorMode::lenient("sepia"), ColorMode::Color);
    }

    #[test]
    fn defaults() {
        let options = MapOptions::default();
        assert!(options.overwrite);
        assert_eq!(options.color, ColorMode::Color);
        assert_eq!(options.static_map.size, (256, 256));
        assert_eq!(options.static_map.scale, 2);

        let config = ManagerConfig::default();
        assert_eq!(config.provider, Provider::OpenStreetMap);
        assert!(config.user_agent.starts_with("webmap-stitch/"));
    }
}
