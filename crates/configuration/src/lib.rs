use crate::error::ConfigError;
use std::collections::HashMap;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{AppEnvironment, DatabaseSettings, LoggingSettings, ServerSettings, Settings};

/// The optional configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Loads the application settings.
///
/// Sources, lowest precedence first: built-in defaults, `config.toml` (if
/// present), then `DATABASE_URL`, `PORT` and `APP_ENV` from the process
/// environment (a `.env` file is loaded into the environment first).
pub fn load_settings() -> Result<Settings, ConfigError> {
    dotenvy::dotenv().ok();
    let env: HashMap<String, String> = std::env::vars().collect();
    load_settings_from(Path::new(CONFIG_FILE), &env)
}

/// Same as [`load_settings`] but with an explicit file and environment, so
/// callers (and tests) don't depend on process state.
pub fn load_settings_from(
    file: &Path,
    env: &HashMap<String, String>,
) -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 3000_i64)?
        .set_default("database.url", "")?
        .set_default("database.max_connections", 10_i64)?
        .set_default("database.acquire_timeout_secs", 5_i64)?
        .set_default("logging.level", "info")?
        .set_default("logging.file_prefix", "notas.log")?
        .set_default("environment", "development")?
        .add_source(config::File::from(file).required(false))
        .set_override_option("database.url", env.get("DATABASE_URL").cloned())?
        .set_override_option("server.port", env.get("PORT").cloned())?
        .set_override_option("environment", env.get("APP_ENV").cloned())?
        .build()?;

    // Attempt to deserialize the entire configuration into our `Settings` struct
    let settings = builder.try_deserialize::<Settings>()?;
    validate(&settings)?;

    Ok(settings)
}

fn validate(settings: &Settings) -> Result<(), ConfigError> {
    if settings.database.url.trim().is_empty() {
        return Err(ConfigError::ValidationError("DATABASE_URL must be set".to_string()));
    }
    if settings.database.max_connections == 0 {
        return Err(ConfigError::ValidationError(
            "database.max_connections must be greater than 0".to_string(),
        ));
    }
    Ok(())
}
