//! Locates the archive endpoint and API key.
//!
//! `CDSAPI_URL` and `CDSAPI_KEY` take precedence, each on its own. Whatever
//! the environment leaves unset is read from the rc file, `CDSAPI_RC` if set
//! or `~/.cdsapirc`, which holds one `name: value` per line:
//!
//! ```text
//! url: https://cds.climate.copernicus.eu/api
//! key: <personal access token>
//! ```

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use super::CdsError;

pub const DEFAULT_URL: &str = "https://cds.climate.copernicus.eu/api";

#[derive(Clone, PartialEq)]
pub struct Credentials {
    pub url: String,
    pub key: String,
}

// Keeps the key out of debug logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("url", &self.url)
            .field("key", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn new(url: &str, key: &str) -> Self {
        Credentials {
            url: url.trim_end_matches('/').to_string(),
            key: key.to_string(),
        }
    }

    /// Loads credentials from the environment or the rc file.
    pub fn load() -> Result<Self, CdsError> {
        let rc_path = env::var_os("CDSAPI_RC")
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|home| home.join(".cdsapirc")));

        resolve(
            env::var("CDSAPI_URL").ok(),
            env::var("CDSAPI_KEY").ok(),
            rc_path.as_deref(),
        )
    }
}

/// Each value comes from the environment first, then the rc file.
fn resolve(
    env_url: Option<String>,
    env_key: Option<String>,
    rc_path: Option<&Path>,
) -> Result<Credentials, CdsError> {
    let (rc_url, rc_key) = match rc_path.filter(|path| path.is_file()) {
        Some(path) if env_url.is_none() || env_key.is_none() => {
            tracing::debug!(path = %path.display(), "reading rc file");
            parse_rc(&fs::read_to_string(path)?)
        }
        _ => (None, None),
    };

    let key = env_key.or(rc_key).ok_or_else(|| CdsError::Config {
        message: format!(
            "no API key found; set CDSAPI_KEY or add `key: ...` to {}",
            rc_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "~/.cdsapirc".to_string())
        ),
    })?;
    let url = env_url.or(rc_url).unwrap_or_else(|| DEFAULT_URL.to_string());

    Ok(Credentials::new(&url, &key))
}

/// Returns the `url` and `key` entries of an rc file.
pub fn parse_rc(contents: &str) -> (Option<String>, Option<String>) {
    let mut url = None;
    let mut key = None;

    for line in contents.lines() {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }

        match name.trim() {
            "url" => url = Some(value.to_string()),
            "key" => key = Some(value.to_string()),
            _ => {}
        }
    }

    (url, key)
}
