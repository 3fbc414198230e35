use maplit::hashmap;
use std::{
    fmt,
    sync::atomic::{AtomicUsize, Ordering},
};
use strfmt::strfmt;

use crate::error::{Error, Result};
use crate::tile::Tile;

const OSM_SERVERS: &[&str] = &["a", "b", "c"];

/// A tile URL template.
///
/// Supports the format specifiers `{x}`, `{y}`, `{z}`, `{t}` (map type) and
/// `{s}`, which cycles through `a`, `b` and `c` to spread the load between
/// mirrors. A server given without any specifiers is treated as a base URL
/// and gets the `<server>/<t>/<z>/<x>/<y>.png` layout, dropping the map type
/// segment when the map type is empty.
pub struct UrlFormat {
    inc: AtomicUsize,
    format_str: String,
}

impl UrlFormat {
    pub fn new(server: &str, map_type: &str) -> Result<Self> {
        let format_str = if server.contains('{') {
            server.to_owned()
        } else if map_type.is_empty() {
            format!("{}/{{z}}/{{x}}/{{y}}.png", server.trim_end_matches('/'))
        } else {
            format!("{}/{{t}}/{{z}}/{{x}}/{{y}}.png", server.trim_end_matches('/'))
        };

        let url_fmt = Self {
            inc: AtomicUsize::new(0),
            format_str,
        };
        // fails on unknown specifiers
        url_fmt.format(&Tile::new(0, 0, 0), map_type, OSM_SERVERS[0])?;

        Ok(url_fmt)
    }

    pub fn tile_url(&self, tile: &Tile, map_type: &str) -> Result<String> {
        let inc = self.inc.fetch_add(1, Ordering::Relaxed);
        self.format(tile, map_type, OSM_SERVERS[inc % OSM_SERVERS.len()])
    }

    fn format(&self, tile: &Tile, map_type: &str, server: &str) -> Result<String> {
        let vars = hashmap! {
            "s".to_owned() => server.to_owned(),
            "t".to_owned() => map_type.to_owned(),
            "x".to_owned() => tile.x.to_string(),
            "y".to_owned() => tile.y.to_string(),
            "z".to_owned() => tile.z.to_string(),
        };

        strfmt(&self.format_str, &vars)
            .map_err(|e| Error::config("server", format!("bad URL template: {}", e)))
    }
}

impl PartialEq for UrlFormat {
    fn eq(&self, other: &Self) -> bool {
        self.format_str == other.format_str
    }
}

impl fmt::Debug for UrlFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UrlFormat")
            .field("format_str", &self.format_str)
            .finish()
    }
}

/// Appends `key=value` query parameters to `server`, skipping empty values.
pub fn with_query(server: &str, params: &[(&str, String)]) -> String {
    let query = params
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>();

    if query.is_empty() {
        return server.to_owned();
    }

    let separator = match server.find('?') {
        Some(pos) if pos + 1 == server.len() || server.ends_with('&') => "",
        Some(_) => "&",
        None => "?",
    };

    format!("{}{}{}", server, separator, query.join("&"))
}
