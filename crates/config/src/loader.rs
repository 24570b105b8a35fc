use std::path::{Path, PathBuf};

use {
    secrecy::Secret,
    tracing::{debug, warn},
};

use crate::{env_subst::substitute_env, schema::LexbotConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &["lexbot.toml", "lexbot.yaml", "lexbot.yml", "lexbot.json"];

/// Environment variables that override secrets after the file is parsed.
pub const ENV_PAGE_ACCESS_TOKEN: &str = "LEXBOT_PAGE_ACCESS_TOKEN";
pub const ENV_VERIFY_TOKEN: &str = "LEXBOT_VERIFY_TOKEN";
pub const ENV_WEATHER_API_KEY: &str = "LEXBOT_WEATHER_API_KEY";
pub const ENV_IMAGE_API_KEY: &str = "LEXBOT_IMAGE_API_KEY";

/// Load config from the given path (any supported format), then apply
/// environment overrides.
pub fn load_config(path: &Path) -> anyhow::Result<LexbotConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    let mut cfg = parse_config(&raw, path)?;
    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./lexbot.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/lexbot/lexbot.{toml,yaml,yml,json}` (user-global)
///
/// Falls back to defaults (plus environment overrides) when no file is found
/// or the file cannot be loaded.
pub fn discover_and_load() -> LexbotConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    let mut cfg = LexbotConfig::default();
    apply_env_overrides(&mut cfg);
    cfg
}

/// Find the first config file in standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    let dir = config_dir()?;
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/lexbot/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "lexbot").map(|d| d.config_dir().to_path_buf())
}

/// Override secrets from `LEXBOT_*` environment variables.
pub fn apply_env_overrides(cfg: &mut LexbotConfig) {
    apply_env_overrides_with(cfg, |name| std::env::var(name).ok());
}

fn apply_env_overrides_with(cfg: &mut LexbotConfig, lookup: impl Fn(&str) -> Option<String>) {
    let overrides = [
        (ENV_PAGE_ACCESS_TOKEN, &mut cfg.messenger.page_access_token),
        (ENV_VERIFY_TOKEN, &mut cfg.messenger.verify_token),
        (ENV_WEATHER_API_KEY, &mut cfg.weather.api_key),
        (ENV_IMAGE_API_KEY, &mut cfg.images.api_key),
    ];
    for (name, slot) in overrides {
        if let Some(value) = lookup(name).filter(|v| !v.is_empty()) {
            debug!(var = name, "config secret overridden from environment");
            *slot = Secret::new(value);
        }
    }
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<LexbotConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}
