//! Configuration management for mapping generation
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (es-mappings.toml)
//! - Environment variables (ES_MAPPINGS__*)
//!
//! ## Example config file (es-mappings.toml):
//! ```toml
//! [compiler]
//! tag_key = "es-mapping"
//! format = "pretty"
//!
//! [input]
//! all_types = false
//! extension = "types.json"
//!
//! [output]
//! file_suffix = "_es_mapper.json"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::tag::DEFAULT_TAG_KEY;

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapperConfig {
    /// Compiler settings
    #[serde(default)]
    pub compiler: CompilerConfig,

    /// Descriptor input settings
    #[serde(default)]
    pub input: InputConfig,

    /// Output file settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Settings the compiler itself consumes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Tag key mapping annotations are read from
    #[serde(default = "default_tag_key")]
    pub tag_key: String,

    /// Output format (pretty or compact)
    #[serde(default)]
    pub format: OutputFormat,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One tab per nesting level
    #[default]
    Pretty,
    Compact,
}

/// Descriptor input configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Compile every type, not only annotated ones
    #[serde(default)]
    pub all_types: bool,

    /// Extension of descriptor files, without the leading dot
    #[serde(default = "default_extension")]
    pub extension: String,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Suffix appended to the input stem (or package name) to form the output file
    #[serde(default = "default_file_suffix")]
    pub file_suffix: String,
}

fn default_tag_key() -> String {
    DEFAULT_TAG_KEY.to_string()
}

fn default_extension() -> String {
    "types.json".to_string()
}

fn default_file_suffix() -> String {
    "_es_mapper.json".to_string()
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            tag_key: default_tag_key(),
            format: OutputFormat::Pretty,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            all_types: false,
            extension: default_extension(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file_suffix: default_file_suffix(),
        }
    }
}

impl MapperConfig {
    /// Load configuration from the default locations, with `config_path`
    /// and then `ES_MAPPINGS__*` variables layered on top
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = [
            "es-mappings.toml",
            ".es-mappings.toml",
            "config/es-mappings.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("com", "bringhub", "es-mappings") {
            let xdg_config = config_dir.config_dir().join("es-mappings.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // ES_MAPPINGS__COMPILER__FORMAT=compact etc.
        builder = builder.add_source(
            Environment::with_prefix("ES_MAPPINGS")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}
