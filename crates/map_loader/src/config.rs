use crate::error::{LoaderError, Result};
use ride_map::{Coordinate, DEFAULT_CREDENTIAL_URL, DEFAULT_TOKEN_KEY, MapOptions};
use serde::Deserialize;
use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};

const ENV_CREDENTIAL_URL: &str = "MAP_LOADER_CREDENTIAL_URL";
const ENV_TOKEN_KEY: &str = "MAP_LOADER_TOKEN_KEY";
const ENV_TIMEOUT_SECS: &str = "MAP_LOADER_TIMEOUT_SECS";
const ENV_OUTPUT_DIR: &str = "MAP_LOADER_OUTPUT_DIR";

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_OUTPUT_DIR: &str = "scenes";
const MAX_ZOOM: u8 = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub credential_url: String,
    pub token_key: String,
    /// `None` waits for the credential endpoint indefinitely.
    pub timeout: Option<Duration>,
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            credential_url: DEFAULT_CREDENTIAL_URL.to_string(),
            token_key: DEFAULT_TOKEN_KEY.to_string(),
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from a variable lookup. Blank values keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(url) = get(ENV_CREDENTIAL_URL) {
            config.credential_url = url.trim().to_string();
        }
        if let Some(key) = get(ENV_TOKEN_KEY) {
            config.token_key = key.trim().to_string();
        }
        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                LoaderError::InvalidConfiguration(format!(
                    "{ENV_TIMEOUT_SECS} must be a whole number of seconds, got {raw:?}"
                ))
            })?;
            config.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(dir) = get(ENV_OUTPUT_DIR) {
            let path = PathBuf::from(dir);

            // If the path already exists but is not a directory, reject early.
            if path.exists() && !path.is_dir() {
                return Err(LoaderError::InvalidConfiguration(format!(
                    "Output path is not a directory: {}",
                    path.display()
                )));
            }
            config.output_dir = path;
        }

        Ok(config)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct MapFile {
    #[serde(default)]
    map: MapSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct MapSection {
    center: Option<[f64; 2]>,
    zoom: Option<u8>,
    prefer_canvas: Option<bool>,
    base_layer: Option<String>,
    base_layer_label: Option<String>,
}

/// Reads map options from a TOML file with an optional `[map]` table.
pub fn load_map_options(path: &Path) -> Result<MapOptions> {
    let content = std::fs::read_to_string(path).map_err(|e| LoaderError::ReadConfig {
        path: path.to_path_buf(),
        source: e,
    })?;
    let file: MapFile = toml::from_str(&content).map_err(|e| LoaderError::ParseConfig {
        path: path.to_path_buf(),
        source: e,
    })?;
    file.map.into_options()
}

impl MapSection {
    fn into_options(self) -> Result<MapOptions> {
        let mut options = MapOptions::default();

        if let Some([latitude, longitude]) = self.center {
            options.center = Coordinate::new(latitude, longitude)
                .map_err(|reason| LoaderError::InvalidConfiguration(format!("map.center: {reason}")))?;
        }
        if let Some(zoom) = self.zoom {
            if zoom > MAX_ZOOM {
                return Err(LoaderError::InvalidConfiguration(format!(
                    "map.zoom must be between 0 and {MAX_ZOOM}, got {zoom}"
                )));
            }
            options.zoom = zoom;
        }
        if let Some(prefer_canvas) = self.prefer_canvas {
            options.prefer_canvas = prefer_canvas;
        }
        if let Some(layer) = self.base_layer {
            options.base_layer.layer = layer;
        }
        if let Some(label) = self.base_layer_label {
            options.base_layer.label = label;
        }

        Ok(options)
    }
}
