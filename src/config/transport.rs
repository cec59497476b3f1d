use crate::domain::env::{Environment, ProcessEnv};
use crate::utils::error::{Result, WrapperError};
use crate::utils::validation::{validate_positive_number, Validate};
use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetryMode {
    #[default]
    Standard,
    Adaptive,
}

/// Transport settings handed to the SDK when a client is built. Every field is optional;
/// unset fields keep the SDK defaults.
///
/// ```toml
/// connect_timeout_seconds = 5
/// read_timeout_seconds = 30
/// max_attempts = 3
/// retry_mode = "adaptive"
/// force_path_style = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransportConfig {
    pub connect_timeout_seconds: Option<u64>,
    pub read_timeout_seconds: Option<u64>,
    pub operation_timeout_seconds: Option<u64>,
    pub max_attempts: Option<u32>,
    pub retry_mode: Option<RetryMode>,
    /// S3 only: address buckets as `endpoint/bucket` instead of `bucket.endpoint`.
    pub force_path_style: Option<bool>,
}

impl TransportConfig {
    /// Reads and validates a transport config file; `${VAR}` references are expanded from
    /// the process environment.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Self::from_toml_str_with_env(content, &ProcessEnv)
    }

    pub fn from_toml_str_with_env(content: &str, env: &dyn Environment) -> Result<Self> {
        let processed = substitute_env_vars(content, env)?;
        let config: Self = toml::from_str(&processed)?;
        config.validate()?;
        Ok(config)
    }

    pub fn timeout_config(&self) -> Option<TimeoutConfig> {
        if self.connect_timeout_seconds.is_none()
            && self.read_timeout_seconds.is_none()
            && self.operation_timeout_seconds.is_none()
        {
            return None;
        }

        let mut builder = TimeoutConfig::builder();
        if let Some(seconds) = self.connect_timeout_seconds {
            builder = builder.connect_timeout(Duration::from_secs(seconds));
        }
        if let Some(seconds) = self.read_timeout_seconds {
            builder = builder.read_timeout(Duration::from_secs(seconds));
        }
        if let Some(seconds) = self.operation_timeout_seconds {
            builder = builder.operation_timeout(Duration::from_secs(seconds));
        }
        Some(builder.build())
    }

    pub fn retry_config(&self) -> Option<RetryConfig> {
        if self.max_attempts.is_none() && self.retry_mode.is_none() {
            return None;
        }

        let mut config = match self.retry_mode.unwrap_or_default() {
            RetryMode::Standard => RetryConfig::standard(),
            RetryMode::Adaptive => RetryConfig::adaptive(),
        };
        if let Some(attempts) = self.max_attempts {
            config = config.with_max_attempts(attempts);
        }
        Some(config)
    }
}

impl Validate for TransportConfig {
    fn validate(&self) -> Result<()> {
        let timeouts = [
            ("connect_timeout_seconds", self.connect_timeout_seconds),
            ("read_timeout_seconds", self.read_timeout_seconds),
            ("operation_timeout_seconds", self.operation_timeout_seconds),
        ];
        for (field, value) in timeouts {
            if let Some(seconds) = value {
                validate_positive_number(field, seconds, 1)?;
            }
        }
        if let Some(attempts) = self.max_attempts {
            validate_positive_number("max_attempts", attempts, 1)?;
        }
        Ok(())
    }
}

/// Expands `${VAR}` references; unknown variables are left as written.
fn substitute_env_vars(content: &str, env: &dyn Environment) -> Result<String> {
    let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| WrapperError::ConfigError {
        message: format!("invalid substitution pattern: {}", e),
    })?;

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        env.var(var_name)
            .unwrap_or_else(|| format!("${{{}}}", var_name))
    });

    Ok(result.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn no_env() -> HashMap<String, String> {
        HashMap::new()
    }

    #[test]
    fn test_parse_full_config() {
        let config = TransportConfig::from_toml_str_with_env(
            r#"
connect_timeout_seconds = 5
read_timeout_seconds = 30
max_attempts = 4
retry_mode = "adaptive"
force_path_style = true
"#,
            &no_env(),
        )
        .unwrap();

        assert_eq!(config.connect_timeout_seconds, Some(5));
        assert_eq!(config.retry_mode, Some(RetryMode::Adaptive));
        assert_eq!(config.force_path_style, Some(true));

        let timeouts = config.timeout_config().unwrap();
        assert_eq!(timeouts.connect_timeout(), Some(Duration::from_secs(5)));
        assert_eq!(timeouts.read_timeout(), Some(Duration::from_secs(30)));

        let retry = config.retry_config().unwrap();
        assert_eq!(retry.max_attempts(), 4);
    }

    #[test]
    fn test_empty_config_keeps_sdk_defaults() {
        let config = TransportConfig::from_toml_str_with_env("", &no_env()).unwrap();
        assert_eq!(config, TransportConfig::default());
        assert!(config.timeout_config().is_none());
        assert!(config.retry_config().is_none());
    }

    #[test]
    fn test_env_substitution() {
        let env = HashMap::from([("ATTEMPTS".to_string(), "7".to_string())]);
        let config =
            TransportConfig::from_toml_str_with_env("max_attempts = ${ATTEMPTS}", &env).unwrap();
        assert_eq!(config.max_attempts, Some(7));

        // unknown variables are left verbatim, which is not valid TOML here
        let err = TransportConfig::from_toml_str_with_env("max_attempts = ${MISSING}", &env);
        assert!(err.is_err());
    }

    #[test]
    fn test_unknown_references_are_left_as_written() {
        let env = HashMap::from([("S3_TIMEOUT".to_string(), "9".to_string())]);
        let out = substitute_env_vars("a = ${S3_TIMEOUT}\nb = \"${NOT_SET}\"", &env).unwrap();
        assert_eq!(out, "a = 9\nb = \"${NOT_SET}\"");
    }

    #[test]
    fn test_rejects_zero_attempts_and_unknown_keys() {
        let env = no_env();
        assert!(TransportConfig::from_toml_str_with_env("max_attempts = 0", &env).is_err());
        assert!(TransportConfig::from_toml_str_with_env("addressing = \"path\"", &env).is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("transport.toml");
        std::fs::write(&path, "operation_timeout_seconds = 60\n").unwrap();

        let config = TransportConfig::from_file(&path).unwrap();
        assert_eq!(config.operation_timeout_seconds, Some(60));
        assert!(TransportConfig::from_file(dir.path().join("missing.toml")).is_err());
    }
}
