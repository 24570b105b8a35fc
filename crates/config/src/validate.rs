//! Configuration validation.
//!
//! Reports syntax errors, unknown or misspelled keys, and settings that leave
//! the bot unable to verify, enrich or deliver.

use std::path::{Path, PathBuf};

use secrecy::ExposeSecret;

use crate::{loader, schema::LexbotConfig};

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// e.g. "syntax", "unknown-field", "missing-secret", "url", "route"
    pub category: &'static str,
    /// Dotted path, e.g. "messenger.verify_token"
    pub path: String,
    pub message: String,
}

/// Result of validating a configuration file.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
    pub config_path: Option<PathBuf>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    fn push(
        &mut self,
        severity: Severity,
        category: &'static str,
        path: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(Diagnostic {
            severity,
            category,
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Known keys per section, used for unknown-field detection.
const SECTIONS: &[(&str, &[&str])] = &[
    ("server", &["bind", "port", "webhook_path", "git_path"]),
    ("messenger", &[
        "send_api_url",
        "page_access_token",
        "verify_token",
    ]),
    ("weather", &["endpoint", "api_key"]),
    ("images", &["endpoint", "api_key", "per_page"]),
    ("git", &["recipient_id"]),
    ("http", &["timeout_secs"]),
];

/// Validate the file at `path`, or the discovered config file when `None`.
pub fn validate(path: Option<&Path>) -> ValidationResult {
    let Some(path) = path.map(Path::to_path_buf).or_else(loader::find_config_file) else {
        let mut result = ValidationResult::default();
        result.push(
            Severity::Info,
            "file-ref",
            "",
            "no config file found, defaults will be used",
        );
        check_semantics(&LexbotConfig::default(), &mut result);
        return result;
    };

    let is_toml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_none_or(|ext| ext == "toml");
    let mut result = if is_toml {
        match std::fs::read_to_string(&path) {
            Ok(raw) => validate_toml_str(&crate::env_subst::substitute_env(&raw)),
            Err(e) => {
                let mut result = ValidationResult::default();
                result.push(Severity::Error, "file-ref", "", format!("cannot read file: {e}"));
                result
            },
        }
    } else {
        let mut result = ValidationResult::default();
        match loader::load_config(&path) {
            Ok(cfg) => check_semantics(&cfg, &mut result),
            Err(e) => result.push(Severity::Error, "syntax", "", e.to_string()),
        }
        result
    };
    result.config_path = Some(path);
    result
}

/// Validate TOML text (after env substitution).
pub fn validate_toml_str(toml_str: &str) -> ValidationResult {
    let mut result = ValidationResult::default();

    let table: toml::Table = match toml::from_str(toml_str) {
        Ok(t) => t,
        Err(e) => {
            result.push(Severity::Error, "syntax", "", e.to_string());
            return result;
        },
    };
    check_unknown_fields(&table, &mut result);

    match toml::from_str::<LexbotConfig>(toml_str) {
        Ok(mut cfg) => {
            loader::apply_env_overrides(&mut cfg);
            check_semantics(&cfg, &mut result);
        },
        Err(e) => result.push(Severity::Error, "type-error", "", e.to_string()),
    }
    result
}

fn check_unknown_fields(table: &toml::Table, result: &mut ValidationResult) {
    let section_names: Vec<&str> = SECTIONS.iter().map(|(name, _)| *name).collect();

    for (key, value) in table {
        let Some((_, fields)) = SECTIONS.iter().find(|(name, _)| name == key) else {
            result.push(
                Severity::Warning,
                "unknown-field",
                key.as_str(),
                unknown_message(key, &section_names),
            );
            continue;
        };
        let Some(section) = value.as_table() else {
            continue;
        };
        for field in section.keys() {
            if !fields.contains(&field.as_str()) {
                result.push(
                    Severity::Warning,
                    "unknown-field",
                    format!("{key}.{field}"),
                    unknown_message(field, fields),
                );
            }
        }
    }
}

fn unknown_message(key: &str, candidates: &[&str]) -> String {
    match suggest(key, candidates, 3) {
        Some(s) => format!("unknown field \"{key}\", did you mean \"{s}\"?"),
        None => format!("unknown field \"{key}\""),
    }
}

fn check_semantics(cfg: &LexbotConfig, result: &mut ValidationResult) {
    let secrets = [
        (
            "messenger.verify_token",
            cfg.messenger.verify_token.expose_secret(),
            Severity::Error,
            "webhook verification will always fail",
        ),
        (
            "messenger.page_access_token",
            cfg.messenger.page_access_token.expose_secret(),
            Severity::Error,
            "the send API will reject every reply",
        ),
        (
            "weather.api_key",
            cfg.weather.api_key.expose_secret(),
            Severity::Warning,
            "weather replies will be empty",
        ),
        (
            "images.api_key",
            cfg.images.api_key.expose_secret(),
            Severity::Warning,
            "image replies will be empty",
        ),
    ];
    for (path, value, severity, consequence) in secrets {
        if value.is_empty() {
            result.push(
                severity,
                "missing-secret",
                path,
                format!("{path} is not set; {consequence}"),
            );
        }
    }

    for (path, url) in [
        ("messenger.send_api_url", &cfg.messenger.send_api_url),
        ("weather.endpoint", &cfg.weather.endpoint),
        ("images.endpoint", &cfg.images.endpoint),
    ] {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            result.push(
                Severity::Error,
                "url",
                path,
                format!("{path} must be an http(s) URL, got \"{url}\""),
            );
        }
    }

    if !(3..=200).contains(&cfg.images.per_page) {
        result.push(
            Severity::Warning,
            "range",
            "images.per_page",
            format!(
                "images.per_page = {} is outside the range 3..=200 accepted by the image API",
                cfg.images.per_page
            ),
        );
    }

    for (path, message) in cfg.server.route_problems() {
        result.push(Severity::Error, "route", path, message);
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

fn suggest<'a>(needle: &str, candidates: &[&'a str], max_distance: usize) -> Option<&'a str> {
    candidates
        .iter()
        .map(|c| (*c, levenshtein(needle, c)))
        .filter(|(_, d)| *d <= max_distance)
        .min_by_key(|(_, d)| *d)
        .map(|(c, _)| c)
}
