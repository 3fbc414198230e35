use anyhow::{Context, Result};
use clap::{
    app_from_crate, crate_authors, crate_description, crate_name, crate_version,
    AppSettings, Arg, ArgMatches,
};
use std::{path::PathBuf, str::FromStr, time::Duration};

use crate::validators::*;
use webmap_stitch::{
    BoundingBox, ColorMode, ManagerConfig, MapOptions, Provider, StaticMapOptions,
    StaticMapParams,
};

const PROVIDER_ARG: &str = "provider";
const SERVER_ARG: &str = "server";
const MAP_TYPE_ARG: &str = "map_type";
const ZOOM_ARG: &str = "zoom";
const BBOX_NORTH_ARG: &str = "north";
const BBOX_SOUTH_ARG: &str = "south";
const BBOX_WEST_ARG: &str = "west";
const BBOX_EAST_ARG: &str = "east";
const COLOR_ARG: &str = "color";
const CACHE_DIR_ARG: &str = "cache_dir";
const OUTPUT_ARG: &str = "output";
const TIMEOUT_ARG: &str = "timeout";
const USER_AGENT_ARG: &str = "user_agent";
const PARALLEL_FETCHES_ARG: &str = "num_parallel";
const SIZE_ARG: &str = "size";
const SCALE_ARG: &str = "scale";
const STYLE_ARG: &str = "style";
const MARKER_ARG: &str = "marker";
const PATH_ARG: &str = "path";
const LANGUAGE_ARG: &str = "language";
const REGION_ARG: &str = "region";
const SENSOR_ARG: &str = "sensor";
const NO_OVERWRITE_ARG: &str = "no_overwrite";
const DRY_RUN_ARG: &str = "dry_run";

pub struct Args {
    pub provider: Provider,
    pub server: Option<String>,
    pub map_type: Option<String>,
    pub zoom: u8,
    pub bounding_box: BoundingBox,
    pub color: ColorMode,
    pub cache_dir: Option<PathBuf>,
    pub output: PathBuf,
    pub timeout: Duration,
    pub user_agent: Option<String>,
    pub parallel_fetches: u8,
    pub static_map: StaticMapOptions,
    pub overwrite: bool,
    pub dry_run: bool,
}

impl Args {
    pub fn parse() -> Result<Self> {
        let matches = get_matches();

        let provider = match parse_arg::<Provider>(&matches, PROVIDER_ARG)? {
            Provider::GoogleStatic(_) => Provider::GoogleStatic(StaticMapParams {
                language: matches.value_of(LANGUAGE_ARG).map(str::to_owned),
                region: matches.value_of(REGION_ARG).map(str::to_owned),
                sensor: matches.is_present(SENSOR_ARG),
            }),
            provider => provider,
        };

        let bounding_box = BoundingBox::new(
            parse_arg(&matches, BBOX_SOUTH_ARG)?,
            parse_arg(&matches, BBOX_NORTH_ARG)?,
            parse_arg(&matches, BBOX_WEST_ARG)?,
            parse_arg(&matches, BBOX_EAST_ARG)?,
        );

        let static_map = StaticMapOptions {
            size: parse_size(matches.value_of(SIZE_ARG).unwrap_or_default())
                .map_err(anyhow::Error::msg)
                .context("invalid --size")?,
            scale: parse_arg(&matches, SCALE_ARG)?,
            style: matches.value_of(STYLE_ARG).map(str::to_owned),
            markers: matches
                .values_of(MARKER_ARG)
                .into_iter()
                .flatten()
                .map(parse_point)
                .collect::<Result<_, _>>()
                .map_err(anyhow::Error::msg)
                .context("invalid --marker")?,
            paths: matches
                .values_of(PATH_ARG)
                .into_iter()
                .flatten()
                .map(parse_path)
                .collect::<Result<_, _>>()
                .map_err(anyhow::Error::msg)
                .context("invalid --path")?,
        };

        Ok(Self {
            provider,
            bounding_box,
            static_map,
            server: matches.value_of(SERVER_ARG).map(str::to_owned),
            map_type: matches.value_of(MAP_TYPE_ARG).map(str::to_owned),
            zoom: parse_arg(&matches, ZOOM_ARG)?,
            color: ColorMode::lenient(matches.value_of(COLOR_ARG).unwrap_or_default()),
            cache_dir: matches.value_of(CACHE_DIR_ARG).map(PathBuf::from),
            output: PathBuf::from(matches.value_of(OUTPUT_ARG).unwrap_or_default()),
            timeout: Duration::from_secs(parse_arg(&matches, TIMEOUT_ARG)?),
            user_agent: matches.value_of(USER_AGENT_ARG).map(str::to_owned),
            parallel_fetches: parse_arg(&matches, PARALLEL_FETCHES_ARG)?,
            overwrite: !matches.is_present(NO_OVERWRITE_ARG),
            dry_run: matches.is_present(DRY_RUN_ARG),
        })
    }

    pub fn manager_config(&self) -> ManagerConfig {
        let defaults = ManagerConfig::default();

        ManagerConfig {
            provider: self.provider.clone(),
            cache_dir: self.cache_dir.clone(),
            server: self.server.clone(),
            user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent),
            timeout: self.timeout,
            fetch_rate: self.parallel_fetches,
        }
    }

    pub fn map_options(&self) -> MapOptions {
        MapOptions {
            color: self.color,
            overwrite: self.overwrite,
            map_type: self.map_type.clone(),
            static_map: self.static_map.clone(),
        }
    }
}

fn parse_arg<T>(matches: &ArgMatches<'_>, name: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = matches
        .value_of(name)
        .with_context(|| format!("missing value for `{}`", name))?;

    raw.parse::<T>()
        .map_err(|e| anyhow::anyhow!("invalid value {:?} for `{}`: {}", raw, name, e))
}

fn get_matches() -> ArgMatches<'static> {
    app_from_crate!()
        .setting(AppSettings::GlobalVersion)
        .setting(AppSettings::VersionlessSubcommands)
        .arg(
            Arg::with_name(PROVIDER_ARG)
                .help("The map provider: `osm`, `stamen` or `google` (static maps)")
                .validator(is_provider)
                .default_value("osm")
                .takes_value(true)
                .short("p")
                .long("provider"),
        )
        .arg(
            Arg::with_name(SERVER_ARG)
                .help("Overrides the provider's server. Either a base URL or a template with the format specifiers `{x}`, `{y}`, `{z}`, `{t}` (map type) and `{s}`, which is replaced with `a`, `b` or `c` in turn to spread the load between different servers.")
                .takes_value(true)
                .long("server"),
        )
        .arg(
            Arg::with_name(MAP_TYPE_ARG)
                .help("The map type, e.g. `terrain`, `watercolor` or `toner` for Stamen and `terrain`, `satellite`, `roadmap` or `hybrid` for Google")
                .takes_value(true)
                .short("m")
                .long("map-type"),
        )
        .arg(
            Arg::with_name(BBOX_NORTH_ARG)
                .help("Latitude of north bounding box boundary (in degrees)")
                .required(true)
                .validator(is_latitude)
                .takes_value(true)
                .allow_hyphen_values(true)
                .short("n")
                .long("north"),
        )
        .arg(
            Arg::with_name(BBOX_SOUTH_ARG)
                .help("Latitude of south bounding box boundary (in degrees)")
                .required(true)
                .validator(is_latitude)
                .takes_value(true)
                .allow_hyphen_values(true)
                .short("s")
                .long("south"),
        )
        .arg(
            Arg::with_name(BBOX_EAST_ARG)
                .help("Longitude of east bounding box boundary (in degrees)")
                .required(true)
                .validator(is_longitude)
                .takes_value(true)
                .allow_hyphen_values(true)
                .short("e")
                .long("east"),
        )
        .arg(
            Arg::with_name(BBOX_WEST_ARG)
                .help("Longitude of west bounding box boundary (in degrees)")
                .required(true)
                .validator(is_longitude)
                .takes_value(true)
                .allow_hyphen_values(true)
                .short("w")
                .long("west"),
        )
        .arg(
            Arg::with_name(ZOOM_ARG)
                .help("The zoom level to fetch")
                .required(true)
                .validator(is_numeric_min(0))
                .takes_value(true)
                .short("z")
                .long("zoom"),
        )
        .arg(
            Arg::with_name(COLOR_ARG)
                .help("Compose a `color` or black-and-white (`bw`) image")
                .default_value("color")
                .takes_value(true)
                .long("color"),
        )
        .arg(
            Arg::with_name(CACHE_DIR_ARG)
                .help("The folder to cache downloaded tiles in. Falls back to a temp directory if it can't be used.")
                .takes_value(true)
                .short("c")
                .long("cache"),
        )
        .arg(
            Arg::with_name(OUTPUT_ARG)
                .help("The file to write the map image to. The image format is derived from the extension.")
                .default_value("map.png")
                .takes_value(true)
                .short("o")
                .long("output"),
        )
        .arg(
            Arg::with_name(PARALLEL_FETCHES_ARG)
                .help("The amount of tiles fetched in parallel.")
                .validator(is_numeric_min(1))
                .default_value("4")
                .takes_value(true)
                .short("r")
                .long("rate"),
        )
        .arg(
            Arg::with_name(TIMEOUT_ARG)
                .help("The timeout (in seconds) for fetching a single tile. Pass 0 for no timeout.")
                .validator(is_numeric_min(0))
                .default_value("30")
                .takes_value(true)
                .short("t")
                .long("timeout"),
        )
        .arg(
            Arg::with_name(USER_AGENT_ARG)
                .help("The User-Agent header to send with every request")
                .takes_value(true)
                .long("user-agent"),
        )
        .arg(
            Arg::with_name(SIZE_ARG)
                .help("Static maps only: the image size as WIDTHxHEIGHT, at most 640x640")
                .validator(is_size)
                .default_value("256x256")
                .takes_value(true)
                .long("size"),
        )
        .arg(
            Arg::with_name(SCALE_ARG)
                .help("Static maps only: the pixel multiplier, 1, 2 or 4")
                .validator(is_numeric_min(1))
                .default_value("2")
                .takes_value(true)
                .long("scale"),
        )
        .arg(
            Arg::with_name(STYLE_ARG)
                .help("Static maps only: a style specification passed to the service verbatim")
                .takes_value(true)
                .long("style"),
        )
        .arg(
            Arg::with_name(MARKER_ARG)
                .help("Static maps only: a marker at LAT,LON. May be repeated.")
                .validator(is_point)
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .allow_hyphen_values(true)
                .long("marker"),
        )
        .arg(
            Arg::with_name(PATH_ARG)
                .help("Static maps only: a path as LAT,LON;LAT,LON;... May be repeated.")
                .validator(is_path)
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .allow_hyphen_values(true)
                .long("path"),
        )
        .arg(
            Arg::with_name(LANGUAGE_ARG)
                .help("Static maps only: the label language, e.g. `en-EN`")
                .takes_value(true)
                .long("language"),
        )
        .arg(
            Arg::with_name(REGION_ARG)
                .help("Static maps only: the region as a two-character ccTLD code")
                .takes_value(true)
                .long("region"),
        )
        .arg(
            Arg::with_name(SENSOR_ARG)
                .help("Static maps only: tell the service a sensor determined the location")
                .takes_value(false)
                .long("sensor"),
        )
        .arg(
            Arg::with_name(NO_OVERWRITE_ARG)
                .help("Refuse to replace an existing output file")
                .takes_value(false)
                .long("no-overwrite"),
        )
        .arg(
            Arg::with_name(DRY_RUN_ARG)
                .help("Don't actually fetch anything, just determine how many tiles would be fetched.")
                .takes_value(false)
                .long("dry-run"),
        )
        .get_matches()
}
