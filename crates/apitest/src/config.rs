//! Configuration shared by every request chain.

use std::path::Path;

use hyper::Uri;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Scheme and authority prepended to every request path.
    /// Handlers run in-process, so this only shapes the request URI.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Log every request and response at `info` level.
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            debug: false,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost".to_string()
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        let uri: Uri = self
            .base_url
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid base_url '{}': {}", self.base_url, e))?;

        match uri.scheme_str() {
            Some("http") | Some("https") => {}
            _ => anyhow::bail!(
                "Unsupported base_url scheme in '{}'. Currently supported: http, https",
                self.base_url
            ),
        }

        if uri.authority().is_none() {
            anyhow::bail!("base_url '{}' must include a host", self.base_url);
        }

        Ok(())
    }

    /// The base URL without a trailing slash, ready to have a path appended.
    pub(crate) fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
