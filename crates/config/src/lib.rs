//! Configuration loading, validation and env substitution.
//!
//! Config files: `lexbot.toml`, `lexbot.yaml`, `lexbot.yml` or `lexbot.json`.
//! Searched in `./` then `~/.config/lexbot/`.
//!
//! Supports `${ENV_VAR}` and `${ENV_VAR:-fallback}` substitution in the raw
//! file text, and `LEXBOT_*` overrides for every secret.

pub mod env_subst;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    loader::{
        ENV_IMAGE_API_KEY, ENV_PAGE_ACCESS_TOKEN, ENV_VERIFY_TOKEN, ENV_WEATHER_API_KEY,
        apply_env_overrides, config_dir, discover_and_load, find_config_file, load_config,
    },
    schema::{
        GitConfig, HEALTH_PATH, HttpConfig, ImagesConfig, LexbotConfig, MessengerConfig,
        ServerConfig, WeatherConfig,
    },
    validate::{Diagnostic, Severity, ValidationResult},
};
