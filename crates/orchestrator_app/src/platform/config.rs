use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use orchestrator_engine::{ClientSettings, EngineConfig};
use serde::{Deserialize, Serialize};

use super::logging::LogDestination;

/// Looked up in the working directory when no path is given on the command line.
pub const CONFIG_FILENAME: &str = "orchestrator.ron";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub orchestrator_url: String,
    pub agent_url: String,
    pub download_dir: PathBuf,
    pub connect_timeout_secs: u64,
    /// `None` disables the per-request timeout.
    pub request_timeout_secs: Option<u64>,
    pub log_destination: LogDestination,
    /// Color chat lines by message kind.
    pub color: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        let client = ClientSettings::default();
        Self {
            orchestrator_url: client.orchestrator_url,
            agent_url: client.agent_url,
            download_dir: PathBuf::from("downloads"),
            connect_timeout_secs: client.connect_timeout.as_secs(),
            request_timeout_secs: client.request_timeout.map(|timeout| timeout.as_secs()),
            log_destination: LogDestination::default(),
            color: true,
        }
    }
}

impl AppConfig {
    /// Reads `explicit`, or `orchestrator.ron` when no path is given. A missing
    /// default file yields the defaults; a missing explicit file is an error.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME));
        match fs::read_to_string(&path) {
            Ok(text) => Self::from_ron(&text)
                .with_context(|| format!("invalid configuration in {}", path.display())),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound && explicit.is_none() => {
                Ok(Self::default())
            }
            Err(err) => {
                Err(err).with_context(|| format!("could not read configuration {}", path.display()))
            }
        }
    }

    pub fn from_ron(text: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(text)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            client: ClientSettings {
                orchestrator_url: self.orchestrator_url.clone(),
                agent_url: self.agent_url.clone(),
                connect_timeout: Duration::from_secs(self.connect_timeout_secs),
                request_timeout: self.request_timeout_secs.map(Duration::from_secs),
            },
            download_dir: self.download_dir.clone(),
        }
    }
}
