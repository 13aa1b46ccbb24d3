use std::fs;
use std::path::Path;

use serde::Deserialize;

/// On-disk daemon configuration, loaded from TOML.
///
/// ```toml
/// strategy = "spray-and-wait"
/// initial_copies = 8
/// rssi_threshold = -90
/// store_path = "drift.sqlite3"
/// identity_path = "drift.identity"
/// ```
#[derive(Debug, Deserialize)]
pub struct DaemonConfig {
    #[serde(default = "default_strategy")]
    pub strategy: String,
    #[serde(default = "default_initial_copies")]
    pub initial_copies: u8,
    #[serde(default = "default_rssi_threshold")]
    pub rssi_threshold: i8,
    #[serde(default)]
    pub store_path: Option<String>,
    #[serde(default)]
    pub identity_path: Option<String>,
}

fn default_strategy() -> String {
    "epidemic".to_string()
}

fn default_initial_copies() -> u8 {
    8
}

fn default_rssi_threshold() -> i8 {
    -128
}

impl DaemonConfig {
    pub fn from_toml(input: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(input)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, std::io::Error> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))
    }

    /// Build the `Strategy` this config selects. `spray-and-wait` reads
    /// `initial_copies`; the other two ignore it.
    pub fn strategy(&self) -> drift_core::Result<drift_core::Strategy> {
        match self.strategy.as_str() {
            "direct" => Ok(drift_core::Strategy::Direct),
            "epidemic" => Ok(drift_core::Strategy::Epidemic),
            "spray-and-wait" => drift_core::Strategy::spray_and_wait(self.initial_copies),
            other => {
                log::warn!("unknown strategy '{other}', falling back to epidemic");
                Ok(drift_core::Strategy::Epidemic)
            }
        }
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            initial_copies: default_initial_copies(),
            rssi_threshold: default_rssi_threshold(),
            store_path: None,
            identity_path: None,
        }
    }
}
