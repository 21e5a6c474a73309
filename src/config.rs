use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

/// What to do when two assets end up with the same output name.
#[derive(Deserialize, clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Keep the last asset in file-name order.
    #[default]
    Overwrite,
    /// Abort the run.
    Error,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    pub static_dir: String,
    pub on_collision: CollisionPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_root: PathBuf::from("download"),
            output_root: PathBuf::from("."),
            static_dir: "static".to_string(),
            on_collision: CollisionPolicy::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Command-line values that take precedence over the config file.
#[derive(clap::Args, Debug, Default)]
pub struct ConfigOverrides {
    /// Directory holding the downloaded page [default: download]
    #[arg(short, long)]
    pub input: Option<PathBuf>,
    /// Directory the site package is written to [default: .]
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Name of the shared static directory [default: static]
    #[arg(short, long)]
    pub static_dir: Option<String>,
    /// Policy for assets that map to the same output name [default: overwrite]
    #[arg(long, value_enum)]
    pub on_collision: Option<CollisionPolicy>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(input) = overrides.input {
            self.input_root = input;
        }
        if let Some(output) = overrides.output {
            self.output_root = output;
        }
        if let Some(static_dir) = overrides.static_dir {
            self.static_dir = static_dir;
        }
        if let Some(policy) = overrides.on_collision {
            self.on_collision = policy;
        }
        self
    }
}
