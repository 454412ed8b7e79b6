use std::env;

use config::{
    Config, ConfigBuilder, ConfigError, Environment, File, FileFormat, FileStoredFormat,
    builder::DefaultState,
};

use crate::{log_debug, log_warn};

/// Suffix of the environment variable holding an inline configuration.
pub const CONFIG_STR: &str = "CONFIG_STR";
/// Suffix of the environment variable holding the format of the inline configuration.
pub const CONFIG_STR_FORMAT: &str = "CONFIG_STR_FMT";

/// Loads the configuration from the following sources, later ones overriding
/// the earlier ones:
/// 1. Whatever `config_builder` adds (typically defaults).
/// 2. The file named `file_name` (any supported extension) found in the
///    closest ancestor of the working directory or the executable, if any.
/// 3. An inline configuration string in `{env_prefix}_CONFIG_STR`, with its
///    format given by `{env_prefix}_CONFIG_STR_FMT`.
/// 4. Environment variables prefixed by `{env_prefix}_`, where `__`
///    separates nested keys.
pub fn load_config(
    file_name: &str,
    env_prefix: &str,
    config_builder: impl FnOnce(
        ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError>,
) -> Result<Config, ConfigError> {
    let mut builder = config_builder(Config::builder())?;

    let file_path = crate::utils::search_current_ancestor_dirs_for(file_name)
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| file_name.to_string());
    builder = builder.add_source(File::with_name(&file_path).required(false));

    if let Some((str, format)) = Option::zip(
        env::var(format!("{env_prefix}_{CONFIG_STR}")).ok(),
        env::var(format!("{env_prefix}_{CONFIG_STR_FORMAT}")).ok(),
    ) {
        match try_parse_format(&format) {
            Ok(format) => builder = builder.add_source(File::from_str(str.as_str(), format)),
            Err(format) => log_warn!("Unknown format for config string: {}", format),
        }
    }

    builder = builder.add_source(
        Environment::with_prefix(env_prefix)
            .prefix_separator("_")
            .separator("__"),
    );

    builder
        .build()
        .inspect(|c| log_debug!("Loaded raw configurations: {:?}", c))
}

fn try_parse_format(format: &str) -> Result<FileFormat, &str> {
    use FileFormat::*;
    let all_formats = [Toml, Json, Json5, Yaml, Ron, Ini];
    all_formats
        .into_iter()
        .find(|f| f.file_extensions().contains(&format))
        .ok_or(format)
}
