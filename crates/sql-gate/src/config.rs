use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use tracing::warn;

use crate::decision::BehaviorKind;

/// Gate configuration, supplied by the host.
#[derive(Debug, Clone, Deserialize)]
pub struct GateConfig {
    /// Emit an incident record on each detection.
    #[serde(default)]
    pub logging: bool,
    /// What to do when a request is flagged.
    #[serde(default)]
    pub behavior: BehaviorKind,
    /// Target resource for the forward behavior.
    #[serde(default)]
    pub forward_to: Option<String>,
    /// Exact context-relative paths that bypass inspection entirely.
    #[serde(default)]
    pub excluded_urls: Vec<String>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            logging: false,
            behavior: BehaviorKind::default(),
            forward_to: None,
            excluded_urls: Vec::new(),
        }
    }
}

impl GateConfig {
    /// Build a configuration from a servlet-style string option table.
    ///
    /// Recognized keys: `logging`, `behavior`, `forwardTo`, `excludedUrls`
    /// (comma-separated).  Values are matched case-insensitively; unknown
    /// keys and unrecognized behavior names are warned about and otherwise
    /// ignored.
    pub fn from_options<'a>(options: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut config = Self::default();

        for (key, value) in options {
            match key {
                "logging" => config.logging = value.eq_ignore_ascii_case("true"),
                "behavior" => {
                    config.behavior = if value.eq_ignore_ascii_case("protect") {
                        BehaviorKind::Protect
                    } else if value.eq_ignore_ascii_case("throw") {
                        BehaviorKind::Throw
                    } else if value.eq_ignore_ascii_case("forward") {
                        BehaviorKind::Forward
                    } else {
                        warn!(value, "unrecognized behavior; defaulting to protect");
                        BehaviorKind::Protect
                    }
                }
                "forwardTo" => config.forward_to = Some(value.to_string()),
                "excludedUrls" => {
                    config.excluded_urls = value
                        .split(',')
                        .filter(|p| !p.is_empty())
                        .map(str::to_string)
                        .collect()
                }
                other => warn!(option = other, "unknown gate option ignored"),
            }
        }

        config
    }
}

/// Load configuration from a YAML file.
///
/// A path with no file behind it is not an error: the gate starts with
/// [`GateConfig::default`] and a warning, so hosts can ship before writing
/// any config. An unreadable or unparseable file *is* an error.
pub fn load(path: &Path) -> anyhow::Result<GateConfig> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "no gate config at this path; starting with defaults");
            return Ok(GateConfig::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("reading gate config {}", path.display()))
        }
    };

    let config: GateConfig = serde_yml::from_str(&contents)
        .with_context(|| format!("gate config {} is not valid YAML for this schema", path.display()))?;

    if config.behavior == BehaviorKind::Forward && config.forward_to.is_none() {
        // Not fatal: the gate resolves this to a rejection at runtime.
        warn!("behavior is 'forward' but no forward_to target is configured");
    }

    Ok(config)
}
