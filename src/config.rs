//! Repository credentials from a Java-style properties file.
//!
//! The file is resolved in priority order:
//! 1. `--credentials` CLI flag
//! 2. `CSV2METADATA_CREDENTIALS` environment variable
//! 3. `preservica.properties` in the platform config directory, if present
use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

pub const CREDENTIALS_ENV: &str = "CSV2METADATA_CREDENTIALS";
pub const DEFAULT_CREDENTIALS_FILE: &str = "preservica.properties";

const DOMAIN_KEY: &str = "preservica.domain";
const USERNAME_KEY: &str = "preservica.username";
const PASSWORD_KEY: &str = "preservica.password";

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub domain: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("domain", &self.domain)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn from_properties(properties: &BTreeMap<String, String>) -> Result<Self> {
        let get = |key: &str| {
            properties
                .get(key)
                .filter(|value| !value.is_empty())
                .cloned()
                .ok_or_else(|| Error::config(format!("credentials are missing {key}")))
        };
        Ok(Self {
            domain: get(DOMAIN_KEY)?,
            username: get(USERNAME_KEY)?,
            password: get(PASSWORD_KEY)?,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|err| {
            Error::config(format!(
                "could not read credentials file {}: {err}",
                path.display()
            ))
        })?;
        Self::from_properties(&parse_properties(&text))
    }
}

/// Parse `key=value` / `key: value` lines; `#` and `!` start comments.
pub fn parse_properties(text: &str) -> BTreeMap<String, String> {
    let mut properties = BTreeMap::new();
    for line in text.lines() {
        let line = line.trim_start_matches('\u{feff}').trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        let (key, value) = match line.find(['=', ':']) {
            Some(idx) => (&line[..idx], &line[idx + 1..]),
            None => (line, ""),
        };
        properties.insert(key.trim().to_string(), value.trim().to_string());
    }
    properties
}

/// Pick the credentials file to use, if any.
///
/// An explicit flag or environment value is always returned; the default
/// location only when the file exists.
pub fn credentials_path(flag: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = flag {
        return Some(path.to_path_buf());
    }
    if let Some(value) = std::env::var_os(CREDENTIALS_ENV).filter(|value| !value.is_empty()) {
        return Some(PathBuf::from(value));
    }
    dirs::config_dir()
        .map(|dir| dir.join("csv2metadata").join(DEFAULT_CREDENTIALS_FILE))
        .filter(|path| path.is_file())
}

pub fn resolve_credentials(flag: Option<&Path>) -> Result<Option<Credentials>> {
    credentials_path(flag)
        .map(|path| Credentials::load(&path))
        .transpose()
}
