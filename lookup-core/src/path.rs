use serde::{Deserialize, Serialize};

use crate::model::CityQuery;

const WEATHER_PATH_PREFIX: &str = "/api/weather/";

/// How the city is placed into the request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathEncoding {
    /// Percent-encode the city as a single path segment.
    #[default]
    Percent,
    /// Interpolate the city unchanged, spaces and slashes included.
    Raw,
}

impl PathEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            PathEncoding::Percent => "percent",
            PathEncoding::Raw => "raw",
        }
    }

    pub const fn all() -> &'static [PathEncoding] {
        &[PathEncoding::Percent, PathEncoding::Raw]
    }
}

impl std::fmt::Display for PathEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build `/api/weather/<city>`.
pub fn request_path(city: &CityQuery, encoding: PathEncoding) -> String {
    match encoding {
        PathEncoding::Raw => format!("{WEATHER_PATH_PREFIX}{city}"),
        PathEncoding::Percent => {
            format!("{WEATHER_PATH_PREFIX}{}", urlencoding::encode(city.as_str()))
        }
    }
}

/// Join a configured base URL and a request path without doubling the slash.
pub fn join_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}
