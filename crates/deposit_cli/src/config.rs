use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use deposit_engine::{
    ClientSettings, DepositSettings, PollSettings, UploadSettings, DEFAULT_TOKEN_FILE,
};
use deposit_logging::LogDestination;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "deposit.ron";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub poll_interval_secs: u64,
    pub max_poll_attempts: Option<u32>,
    /// Poll until a terminal state with no attempt bound. Overrides `max_poll_attempts`.
    pub unbounded_polling: bool,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: Option<u64>,
    pub expect_continue: bool,
    pub token_file: PathBuf,
    pub package_filename: String,
    pub log_file: Option<PathBuf>,
    /// Also log to the terminal when `log_file` is set.
    pub terminal_log: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let client = ClientSettings::default();
        let poll = PollSettings::default();
        Self {
            poll_interval_secs: poll.interval.as_secs(),
            max_poll_attempts: poll.max_attempts,
            unbounded_polling: false,
            connect_timeout_secs: client.connect_timeout.as_secs(),
            request_timeout_secs: None,
            expect_continue: true,
            token_file: PathBuf::from(DEFAULT_TOKEN_FILE),
            package_filename: "bag.zip".to_string(),
            log_file: None,
            terminal_log: true,
        }
    }
}

impl ClientConfig {
    /// `explicit` if given, else `./deposit.ron` if it exists.
    pub fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
        match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                fallback.exists().then_some(fallback)
            }
        }
    }

    /// Reads the file at `path`, or returns defaults when there is none.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        ron::from_str(&content).with_context(|| format!("failed to parse config {}", path.display()))
    }

    pub fn log_destination(&self) -> LogDestination {
        match (&self.log_file, self.terminal_log) {
            (Some(path), true) => LogDestination::Both(path.clone()),
            (Some(path), false) => LogDestination::File(path.clone()),
            (None, _) => LogDestination::Terminal,
        }
    }

    pub fn deposit_settings(&self) -> DepositSettings {
        let max_attempts = if self.unbounded_polling {
            None
        } else {
            self.max_poll_attempts
        };
        DepositSettings {
            client: ClientSettings {
                connect_timeout: Duration::from_secs(self.connect_timeout_secs),
                request_timeout: self.request_timeout_secs.map(Duration::from_secs),
                ..ClientSettings::default()
            },
            upload: UploadSettings {
                expect_continue: self.expect_continue,
                ..UploadSettings::default()
            },
            poll: PollSettings {
                interval: Duration::from_secs(self.poll_interval_secs),
                max_attempts,
            },
        }
    }
}
