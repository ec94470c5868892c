//! Configuration loading from files (std only).

use std::fs;
use std::path::Path;

use crate::error::{ConfigError, Error, Result};

use super::HarnessConfig;

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
///
/// ```rust,ignore
/// use axis_harness::load_config;
///
/// let config = load_config("harness.toml")?;
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<HarnessConfig> {
    let content = fs::read_to_string(path.as_ref()).map_err(|e| {
        let msg = truncated(&e.to_string());
        Error::Config(ConfigError::IoError(msg))
    })?;

    parse_config(&content)
}

/// Parse configuration from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is invalid or fails validation.
pub fn parse_config(content: &str) -> Result<HarnessConfig> {
    let config: HarnessConfig = toml::from_str(content).map_err(|e| {
        let msg = truncated(e.message());
        Error::Config(ConfigError::ParseError(msg))
    })?;

    // Validate the configuration
    super::validation::validate_config(&config)?;

    Ok(config)
}

fn truncated(msg: &str) -> heapless::String<128> {
    msg.chars()
        .scan(0usize, |len, c| {
            *len += c.len_utf8();
            (*len <= 128).then_some(c)
        })
        .collect()
}
