use std::path::PathBuf;

use thiserror::Error;

use crate::canvas::CanvasError;
use crate::fetch::FetchError;

/// Errors returned by map creation.
#[derive(Debug, Error)]
pub enum Error {
    /// An option, bounding box or zoom level was rejected before any I/O.
    #[error("invalid `{param}`: {reason}")]
    Config { param: &'static str, reason: String },

    /// No usable tile cache directory could be found or created.
    #[error("unable to find, create or use a tile cache directory (tried {tried:?})")]
    CacheDir { tried: Vec<PathBuf> },

    /// Downloading a tile or static image failed.
    #[error("failed fetching {target} from {url}")]
    Fetch {
        target: String,
        url: String,
        #[source]
        source: FetchError,
    },

    /// Composing the downloaded images into the output surface failed.
    #[error("failed composing map at {target}")]
    MapBuild {
        target: String,
        #[source]
        source: CanvasError,
    },
}

impl Error {
    pub(crate) fn config(param: &'static str, reason: impl Into<String>) -> Self {
        Error::Config {
            param,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
