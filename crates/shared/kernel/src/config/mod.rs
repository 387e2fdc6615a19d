use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use trip_domain::config::AppConfig;

/// File consulted when no explicit path is given. Its absence is not an error.
pub const DEFAULT_CONFIG_FILE: &str = "tripgate";

/// Prefix of environment overrides, e.g. `TRIP__TRIP__CAPACITY=20`.
pub const ENV_PREFIX: &str = "TRIP";

/// Custom error type for config loading.
#[trip_derive::trip_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },

    #[error("Invalid configuration{}: {message}", format_context(.context))]
    Invalid { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Loads `T` from a config file layered under environment overrides.
///
/// 1. **File**: `path` if given (must exist), otherwise the optional `tripgate.{toml,json,yaml}`
///    in the working directory. The format follows the extension.
/// 2. **Environment**: variables prefixed `TRIP__`, with `__` separating nested keys
///    (`TRIP__SUBMISSION__ENDPOINT` maps to `submission.endpoint`).
///
/// # Errors
/// Returns [`ConfigError::Config`] if an explicit file is missing, a source is malformed,
/// or the merged values do not deserialize into `T`.
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let (file, required) = path.map_or_else(
        || (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        |p| (p.as_ref().to_path_buf(), true),
    );

    info!(path = %file.display(), required, "Loading configuration");

    let config = Config::builder()
        .add_source(File::from(file.as_path()).required(required))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}

/// Loads and sanity-checks the gatekeeper's [`AppConfig`].
///
/// # Errors
/// Propagates [`load_config`] failures and returns [`ConfigError::Invalid`] for a zero
/// capacity, an empty captcha answer, or an empty endpoint.
pub fn load_app_config(path: Option<impl AsRef<Path>>) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = load_config(path)?;
    validate(&config)?;
    debug!(
        capacity = config.trip.capacity,
        endpoint = %config.submission.endpoint,
        data_dir = %config.storage.data_dir.display(),
        "Configuration loaded"
    );
    Ok(config)
}

/// Rejects settings that would make every registration fail.
///
/// # Errors
/// Returns [`ConfigError::Invalid`] describing the first offending setting.
pub fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    let problem = if config.trip.capacity == 0 {
        Some("trip.capacity must be greater than zero")
    } else if config.trip.captcha_answer.trim().is_empty() {
        Some("trip.captcha_answer cannot be empty")
    } else if config.submission.endpoint.trim().is_empty() {
        Some("submission.endpoint cannot be empty")
    } else {
        None
    };

    problem.map_or(Ok(()), |message| {
        Err(ConfigError::Invalid { message: message.into(), context: None })
    })
}
