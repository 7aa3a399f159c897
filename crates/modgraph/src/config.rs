use anyhow::{Context, Result, anyhow};
use cow_utils::CowUtils;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::combine::Combine;
use crate::dirs::{CONFIG_FILE, system_config_file, user_config_file};

/// Target version used when none is configured
const DEFAULT_TARGET_VERSION: &str = "py310";

/// What to do with a source file that fails to parse
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum ParseErrorPolicy {
    /// Report the file and leave it out of the graph
    Skip,
    /// Stop the analysis with the parse error
    #[default]
    Abort,
}

impl std::str::FromStr for ParseErrorPolicy {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().cow_to_lowercase().as_ref() {
            "skip" => Ok(Self::Skip),
            "abort" => Ok(Self::Abort),
            _ => Err(anyhow!(
                "Invalid parse error policy '{}'. Supported values: skip, abort",
                value
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Top-level name of the analyzed package; inferred from the tree root when unset
    pub package: Option<String>,

    /// Dotted name of the lazy-import facade module; defaults to `<package>._imports`
    pub facade: Option<String>,

    /// Policy for files that are not valid Python
    pub on_parse_error: Option<ParseErrorPolicy>,

    /// Target Python version used to recognise standard library modules.
    /// Supports Ruff-style values: "py38" through "py313"
    pub target_version: Option<String>,

    /// Extra import name to distribution name conversions, merged over the built-in table
    pub conversions: IndexMap<String, String>,
}

impl Combine for Config {
    fn combine(self, other: Self) -> Self {
        Self {
            package: self.package.combine(other.package),
            facade: self.facade.combine(other.facade),
            on_parse_error: self.on_parse_error.combine(other.on_parse_error),
            target_version: self.target_version.combine(other.target_version),
            conversions: self.conversions.combine(other.conversions),
        }
    }
}

/// Configuration values from environment variables with the MODGRAPH_ prefix
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub package: Option<String>,
    pub facade: Option<String>,
    pub on_parse_error: Option<ParseErrorPolicy>,
    pub target_version: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables with the MODGRAPH_ prefix
    pub fn from_env() -> Result<Self> {
        let non_empty = |name: &str| {
            env::var(name)
                .ok()
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let on_parse_error = non_empty("MODGRAPH_ON_PARSE_ERROR")
            .map(|value| value.parse::<ParseErrorPolicy>())
            .transpose()
            .context("Invalid MODGRAPH_ON_PARSE_ERROR")?;

        Ok(Self {
            package: non_empty("MODGRAPH_PACKAGE"),
            facade: non_empty("MODGRAPH_FACADE"),
            on_parse_error,
            target_version: non_empty("MODGRAPH_TARGET_VERSION"),
        })
    }

    /// Apply environment config to base config
    pub fn apply_to(self, config: Config) -> Config {
        Config {
            package: self.package,
            facade: self.facade,
            on_parse_error: self.on_parse_error,
            target_version: self.target_version,
            conversions: IndexMap::new(),
        }
        .combine(config)
    }
}

impl Config {
    /// Parse a Ruff-style target version string to the Python 3 minor version
    pub fn parse_target_version(version_str: &str) -> Result<u8> {
        match version_str {
            "py38" => Ok(8),
            "py39" => Ok(9),
            "py310" => Ok(10),
            "py311" => Ok(11),
            "py312" => Ok(12),
            "py313" => Ok(13),
            _ => Err(anyhow!(
                "Invalid target version '{}'. Supported versions: py38, py39, py310, py311, py312, py313",
                version_str
            )),
        }
    }

    /// The configured target version, or the default
    pub fn target_version(&self) -> &str {
        self.target_version
            .as_deref()
            .unwrap_or(DEFAULT_TARGET_VERSION)
    }

    /// Python 3 minor version used for standard library checks
    pub fn python_version(&self) -> Result<u8> {
        Self::parse_target_version(self.target_version())
    }

    /// Set the target version from a string value
    pub fn set_target_version(&mut self, version: String) -> Result<()> {
        Self::parse_target_version(&version)?;
        self.target_version = Some(version);
        Ok(())
    }

    pub fn parse_error_policy(&self) -> ParseErrorPolicy {
        self.on_parse_error.unwrap_or_default()
    }

    /// Load a single config file from a path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        config.python_version().with_context(|| {
            format!(
                "Invalid target-version in config file: {}",
                config.target_version()
            )
        })?;

        Ok(config)
    }

    fn try_load_and_combine<P: AsRef<Path>>(
        config: &mut Config,
        path: P,
        context: &str,
    ) -> Result<()> {
        if path.as_ref().exists() {
            log::debug!("Loading {} from: {:?}", context, path.as_ref());
            let loaded = Self::load_from_file(&path)
                .with_context(|| format!("Failed to load {} from {:?}", context, path.as_ref()))?;
            *config = loaded.combine(std::mem::take(config));
        }
        Ok(())
    }

    /// Load configuration with hierarchical precedence:
    /// 1. CLI-provided config path (highest precedence)
    /// 2. Environment variables (MODGRAPH_*)
    /// 3. Project config (modgraph.toml in current directory)
    /// 4. User config (~/.config/modgraph/modgraph.toml)
    /// 5. System config (/etc/modgraph/modgraph.toml or equivalent)
    /// 6. Default values (lowest precedence)
    pub fn load(cli_config_path: Option<&Path>) -> Result<Self> {
        let mut config = Config::default();

        if let Some(system_config_path) = system_config_file() {
            Self::try_load_and_combine(&mut config, &system_config_path, "system config")?;
        }

        if let Some(user_config_path) = user_config_file() {
            Self::try_load_and_combine(&mut config, &user_config_path, "user config")?;
        }

        let project_config_path = PathBuf::from(CONFIG_FILE);
        Self::try_load_and_combine(&mut config, &project_config_path, "project config")?;

        config = EnvConfig::from_env()?.apply_to(config);

        if let Some(cli_config_path) = cli_config_path {
            if !cli_config_path.exists() {
                return Err(anyhow!("Config file not found: {:?}", cli_config_path));
            }
            Self::try_load_and_combine(&mut config, cli_config_path, "CLI config")?;
        }

        config.python_version().with_context(|| {
            format!(
                "Invalid target-version in final config: {}",
                config.target_version()
            )
        })?;

        Ok(config)
    }
}
