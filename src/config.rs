use std::{collections::HashMap, fs};

use ron::{Options, extensions::Extensions};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    CONFIG_VERSION,
    entity::select,
    matrix::api::{NUM_INPUTS, NUM_OUTPUTS},
};

#[derive(Debug, Deserialize, Serialize)]
pub struct CrossbarConfig {
    pub version: f32,
    pub matrix: MatrixConfig,
    /// input number (1-8) -> config
    #[serde(default)]
    pub inputs: HashMap<u8, InputConfig>,
    /// output number (1-8) -> config
    #[serde(default)]
    pub outputs: HashMap<u8, OutputConfig>,
    #[serde(default)]
    pub dashboard: Vec<CardConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MatrixConfig {
    pub host: String,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_password")]
    pub password: String,
    /// seconds between polls
    #[serde(default = "default_update_interval")]
    pub update_interval: u64,
    /// http timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct InputConfig {
    pub name: String,
    /// disabled inputs are hidden from dropdowns but still display
    /// by name when the matrix reports them as routed
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OutputConfig {
    pub name: String,
    /// disabled outputs get no entity
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// None = every input
    pub available_inputs: Option<Vec<u8>>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CardConfig {
    #[serde(default = "default_card_type")]
    pub r#type: String,
    #[serde(default)]
    pub entity: String,
    /// dropdown contents to show before the first poll
    pub options: Option<Vec<String>>,
    /// selection to show before the first poll
    pub value: Option<String>,
    pub device_name: Option<String>,
    pub name: Option<String>,
}

fn default_username() -> String {
    "Admin".to_string()
}

fn default_password() -> String {
    "admin".to_string()
}

fn default_update_interval() -> u64 {
    30
}

fn default_timeout() -> u64 {
    10
}

fn default_enabled() -> bool {
    true
}

fn default_card_type() -> String {
    "matrix-card".to_string()
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("read error `{0}`")]
    Read(String),
    #[error("parse error `{0}`")]
    Parse(String),
    #[error("wrong config version (got {got}, expected {expected})")]
    WrongVersion { got: f32, expected: f32 },
    #[error("matrix host is empty")]
    EmptyHost,
    #[error("update_interval must be at least 1 second")]
    ZeroInterval,
    #[error("input number `{0}` out of range (1-{NUM_INPUTS})")]
    BadInput(u8),
    #[error("output number `{0}` out of range (1-{NUM_OUTPUTS})")]
    BadOutput(u8),
    #[error("inputs `{0}` and `{1}` share a name")]
    DuplicateInputName(u8, u8),
    #[error("outputs `{0}` and `{1}` derive the same entity id")]
    DuplicateOutputName(u8, u8),
    #[error("dashboard card {0} is missing required `entity`")]
    CardMissingEntity(usize),
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Read(value.to_string())
    }
}

impl From<ron::error::SpannedError> for ConfigError {
    fn from(value: ron::error::SpannedError) -> Self {
        Self::Parse(value.to_string())
    }
}

impl CrossbarConfig {
    pub fn from_file(file_path: &str) -> Result<Self, ConfigError> {
        Self::parse(&fs::read_to_string(file_path)?)
    }

    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let options = Options::default()
            .with_default_extension(Extensions::IMPLICIT_SOME)
            .with_default_extension(Extensions::UNWRAP_NEWTYPES)
            .with_default_extension(Extensions::UNWRAP_VARIANT_NEWTYPES);
        let mut cfg: Self = options.from_str(s)?;
        cfg.matrix.host = clean_host(&cfg.matrix.host);
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::WrongVersion {
                got: self.version,
                expected: CONFIG_VERSION,
            });
        }
        if self.matrix.host.is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if self.matrix.update_interval == 0 {
            return Err(ConfigError::ZeroInterval);
        }

        for num in self.inputs.keys() {
            if *num < 1 || *num > NUM_INPUTS {
                return Err(ConfigError::BadInput(*num));
            }
        }
        for (num, out) in &self.outputs {
            if *num < 1 || *num > NUM_OUTPUTS {
                return Err(ConfigError::BadOutput(*num));
            }
            if let Some(avail) = &out.available_inputs {
                for i in avail {
                    if *i < 1 || *i > NUM_INPUTS {
                        return Err(ConfigError::BadInput(*i));
                    }
                }
            }
        }

        //option resolution goes by input name
        let mut input_names: HashMap<String, u8> = HashMap::new();
        for num in 1..=NUM_INPUTS {
            if let Some(first) = input_names.insert(select::input_name(self, num), num) {
                return Err(ConfigError::DuplicateInputName(first, num));
            }
        }

        //entity ids are slugged output names
        let mut output_slugs: HashMap<String, u8> = HashMap::new();
        for num in 1..=NUM_OUTPUTS {
            if let Some(out) = self.outputs.get(&num) {
                if !out.enabled {
                    continue;
                }
            }
            let slug = select::slugify(&select::output_name(self, num));
            if let Some(first) = output_slugs.insert(slug, num) {
                return Err(ConfigError::DuplicateOutputName(first, num));
            }
        }

        for (idx, card) in self.dashboard.iter().enumerate() {
            if card.entity.is_empty() {
                return Err(ConfigError::CardMissingEntity(idx));
            }
        }

        Ok(())
    }
}

/// Accepts hosts pasted with a scheme or trailing slash
pub fn clean_host(host: &str) -> String {
    let host = host.trim();
    let host = host
        .strip_prefix("http://")
        .or_else(|| host.strip_prefix("https://"))
        .unwrap_or(host);
    host.trim_end_matches('/').to_string()
}
