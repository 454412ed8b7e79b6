use serde::Deserialize;

use common::log_debug;

use crate::host::HostSize;

use super::ENV_PREFIX;

const CONFIG_FILENAME: &str = "marsh_config";

#[derive(Debug, Default, Clone, Deserialize)]
pub struct SessionConfig {
    /// The exclusive bound for the element count of dictionaries and tuples.
    /// When absent, the bound configured in the engine is used.
    #[serde(default)]
    pub max_symbolic_size: Option<HostSize>,
}

impl TryFrom<::config::Config> for SessionConfig {
    type Error = ::config::ConfigError;

    fn try_from(value: ::config::Config) -> Result<Self, Self::Error> {
        let config: SessionConfig = value.try_deserialize()?;
        log_debug!("Loaded configurations: {:?}", config);

        match config.max_symbolic_size {
            Some(size) if size <= 0 => Err(::config::ConfigError::Message(format!(
                "The maximum symbolic size must be positive, got {size}"
            ))),
            _ => Ok(config),
        }
    }
}

impl SessionConfig {
    pub fn load() -> Result<Self, ::config::ConfigError> {
        common::config::load_config(CONFIG_FILENAME, ENV_PREFIX, Ok)?.try_into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_override(size: i64) -> Result<SessionConfig, ::config::ConfigError> {
        ::config::Config::builder()
            .set_override("max_symbolic_size", size)?
            .build()?
            .try_into()
    }

    #[test]
    fn test_default_is_unset() {
        let config: SessionConfig = ::config::Config::builder()
            .build()
            .unwrap()
            .try_into()
            .unwrap();
        assert_eq!(config.max_symbolic_size, None);
    }

    #[test]
    fn test_max_symbolic_size() {
        assert_eq!(from_override(64).unwrap().max_symbolic_size, Some(64));
        assert!(from_override(0).is_err());
        assert!(from_override(-3).is_err());
    }
}
