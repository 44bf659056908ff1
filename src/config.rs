//! Configuration parsing for fitblast
//!
//! Parses YAML configuration files holding the server root and the
//! thresholds used to pick and highlight hits.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root URL of the fitness browser, e.g. `https://fit.genomics.lbl.gov/`
    #[serde(default)]
    pub server_root: Option<String>,

    /// Maximum number of query characters embedded in the "more" link
    #[serde(default = "default_detail_query_limit")]
    pub detail_query_limit: usize,

    /// Overall timeout for the search request (none by default)
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Hit selection thresholds
    #[serde(default)]
    pub thresholds: Thresholds,
}

/// Thresholds shared by both views.
///
/// A hit is considered useful if its cofitness is above `min_cofit`, or if
/// both |fitness| and |t| are above `min_abs_fit` and `min_abs_t`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Hits below this coverage are ignored
    #[serde(default = "default_min_coverage")]
    pub min_coverage: f64,

    /// %identity to be considered a close hit
    #[serde(default = "default_min_close_identity")]
    pub min_close_identity: f64,

    /// |fitness| for a "strong phenotype"
    #[serde(default = "default_min_abs_strong")]
    pub min_abs_strong: f64,

    /// Minimum cofitness considered useful
    #[serde(default = "default_min_cofit")]
    pub min_cofit: f64,

    /// Minimum |fitness| considered useful
    #[serde(default = "default_min_abs_fit")]
    pub min_abs_fit: f64,

    /// Minimum |t| considered useful
    #[serde(default = "default_min_abs_t")]
    pub min_abs_t: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_coverage: default_min_coverage(),
            min_close_identity: default_min_close_identity(),
            min_abs_strong: default_min_abs_strong(),
            min_cofit: default_min_cofit(),
            min_abs_fit: default_min_abs_fit(),
            min_abs_t: default_min_abs_t(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_root: None,
            detail_query_limit: default_detail_query_limit(),
            request_timeout_secs: None,
            thresholds: Thresholds::default(),
        }
    }
}

fn default_detail_query_limit() -> usize {
    8000
}

fn default_min_coverage() -> f64 {
    0.75
}

fn default_min_close_identity() -> f64 {
    80.0
}

fn default_min_abs_strong() -> f64 {
    2.0
}

fn default_min_cofit() -> f64 {
    0.75
}

fn default_min_abs_fit() -> f64 {
    1.0
}

fn default_min_abs_t() -> f64 {
    4.0
}

impl Config {
    /// Load configuration from YAML file
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(root) = &self.server_root {
            if root.trim().is_empty() {
                anyhow::bail!("server_root must not be empty");
            }
        }

        if self.detail_query_limit == 0 {
            anyhow::bail!("detail_query_limit must be at least 1");
        }

        if self.request_timeout_secs == Some(0) {
            anyhow::bail!("request_timeout_secs must be at least 1 when set");
        }

        self.thresholds.validate()
    }

    /// Pick the server root: command line first, then the config file.
    pub fn resolve_server_root(&self, cli_root: Option<&str>) -> Result<String> {
        let root = cli_root
            .map(str::to_string)
            .or_else(|| self.server_root.clone())
            .context("No server root given (use --server-root or set server_root in the config)")?;

        if root.trim().is_empty() {
            anyhow::bail!("server root must not be empty");
        }
        if !root.ends_with('/') {
            log::warn!(
                "Server root '{}' does not end with '/'; links are built by plain concatenation",
                root
            );
        }
        Ok(root)
    }
}

impl Thresholds {
    /// Validate that thresholds are finite and within their natural ranges
    pub fn validate(&self) -> Result<()> {
        let fractions = [
            ("min_coverage", self.min_coverage),
            ("min_cofit", self.min_cofit),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                anyhow::bail!("{} must be within [0, 1], got {}", name, value);
            }
        }

        if !(0.0..=100.0).contains(&self.min_close_identity) {
            anyhow::bail!(
                "min_close_identity must be within [0, 100], got {}",
                self.min_close_identity
            );
        }

        let magnitudes = [
            ("min_abs_strong", self.min_abs_strong),
            ("min_abs_fit", self.min_abs_fit),
            ("min_abs_t", self.min_abs_t),
        ];
        for (name, value) in magnitudes {
            if !value.is_finite() || value <= 0.0 {
                anyhow::bail!("{} must be a positive number, got {}", name, value);
            }
        }

        if self.min_abs_strong < self.min_abs_fit {
            anyhow::bail!(
                "min_abs_strong ({}) must not be below min_abs_fit ({})",
                self.min_abs_strong,
                self.min_abs_fit
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
server_root: "https://fit.genomics.lbl.gov/"
thresholds:
  min_coverage: 0.8
  min_abs_t: 5
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.server_root.as_deref(), Some("https://fit.genomics.lbl.gov/"));
        assert_eq!(config.thresholds.min_coverage, 0.8);
        assert_eq!(config.thresholds.min_abs_t, 5.0);
        // Unspecified fields keep their defaults
        assert_eq!(config.thresholds.min_close_identity, 80.0);
        assert_eq!(config.detail_query_limit, 8000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.thresholds, Thresholds::default());
        assert!(config.server_root.is_none());
        assert!(config.request_timeout_secs.is_none());
    }

    #[test]
    fn test_invalid_thresholds() {
        let mut t = Thresholds::default();
        t.min_coverage = 1.5;
        assert!(t.validate().is_err());

        let mut t = Thresholds::default();
        t.min_abs_strong = 0.5;
        assert!(t.validate().is_err());

        let mut t = Thresholds::default();
        t.min_abs_t = f64::NAN;
        assert!(t.validate().is_err());
    }

    #[test]
    fn test_resolve_server_root() {
        let config = Config {
            server_root: Some("https://fit.genomics.lbl.gov/".to_string()),
            ..Config::default()
        };
        assert_eq!(
            config.resolve_server_root(Some("http://localhost/")).unwrap(),
            "http://localhost/"
        );
        assert_eq!(
            config.resolve_server_root(None).unwrap(),
            "https://fit.genomics.lbl.gov/"
        );
        assert!(Config::default().resolve_server_root(None).is_err());
    }

    #[test]
    fn test_from_yaml_file() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "detail_query_limit: 0").unwrap();
        assert!(Config::from_yaml(file.path()).is_err());
    }
}
