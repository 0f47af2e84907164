use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use deposit_logging::deposit_warn;

/// Default location of the supplementary authorization token, relative to the working directory.
pub const DEFAULT_TOKEN_FILE: &str = "x-auth-value.txt";

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Source of the `X-Authorization` value. Consulted once per outgoing request.
pub trait TokenProvider: Send + Sync {
    fn current_token(&self) -> Option<String>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoTokenProvider;

impl TokenProvider for NoTokenProvider {
    fn current_token(&self) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl TokenProvider for StaticTokenProvider {
    fn current_token(&self) -> Option<String> {
        Some(self.token.clone())
    }
}

/// Re-reads a token file on every call so a rotated token is picked up between polls.
///
/// A missing, unreadable or blank file yields no token.
#[derive(Debug, Clone)]
pub struct FileTokenProvider {
    path: PathBuf,
}

impl FileTokenProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileTokenProvider {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_FILE)
    }
}

impl TokenProvider for FileTokenProvider {
    fn current_token(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(text) => {
                let token = text.trim();
                (!token.is_empty()).then(|| token.to_string())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => {
                deposit_warn!("Ignoring unreadable token file {:?}: {}", self.path, err);
                None
            }
        }
    }
}
