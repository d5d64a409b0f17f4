use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Runtime knobs, read from an optional JSON file in the working
/// directory. A missing file or field falls back to the defaults.
/// Grid geometry always follows the terminal and is not configurable.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tick_interval_ms: u64,
    pub input_poll_ms: u64,
    pub log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100,
            input_poll_ms: 50,
            log_file: "lapwatch.log".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(config) => config,
                Err(e) => {
                    // Logging is not up yet; this prints before the
                    // alternate screen takes over.
                    eprintln!("ignoring malformed {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}
