use serde::{Deserialize, Serialize};

use crate::diag::Framing;
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Fraction of packets to fully decode, in `[0, 1]`. The rest are
    /// decoded header-only.
    pub sample_rate: f64,
    pub framing: Framing,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        DecoderConfig {
            sample_rate: 1.0,
            framing: Framing::Standard,
        }
    }
}

impl DecoderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.sample_rate) {
            return Err(ConfigError::InvalidSampleRate(self.sample_rate));
        }
        Ok(())
    }
}

pub fn parse_config_str(contents: &str) -> Result<DecoderConfig, ConfigError> {
    let config: DecoderConfig = toml::from_str(contents)?;
    config.validate()?;
    Ok(config)
}

/// Reads a TOML config file. A missing file gives the default config.
pub fn parse_config<P>(path: P) -> Result<DecoderConfig, ConfigError>
where
    P: AsRef<std::path::Path>,
{
    match std::fs::read_to_string(&path) {
        Ok(contents) => parse_config_str(&contents),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(DecoderConfig::default()),
        Err(err) => Err(err.into()),
    }
}
