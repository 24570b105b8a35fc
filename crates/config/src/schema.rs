/// Config schema types (server, messenger, auxiliary APIs, outbound HTTP).
use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LexbotConfig {
    pub server: ServerConfig,
    pub messenger: MessengerConfig,
    pub weather: WeatherConfig,
    pub images: ImagesConfig,
    pub git: GitConfig,
    pub http: HttpConfig,
}

impl LexbotConfig {
    /// Copy with every non-empty secret replaced, for display.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut cfg = self.clone();
        for secret in [
            &mut cfg.messenger.page_access_token,
            &mut cfg.messenger.verify_token,
            &mut cfg.weather.api_key,
            &mut cfg.images.api_key,
        ] {
            if !secret.expose_secret().is_empty() {
                *secret = Secret::new(REDACTED.into());
            }
        }
        cfg
    }
}

const REDACTED: &str = "[REDACTED]";

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to. Defaults to "127.0.0.1".
    pub bind: String,
    pub port: u16,
    /// Path of the messaging webhook (GET handshake + POST events).
    pub webhook_path: String,
    /// Path of the source-control push webhook.
    pub git_path: String,
}

/// Path of the health endpoint, always mounted next to the configured routes.
pub const HEALTH_PATH: &str = "/health";

impl ServerConfig {
    /// Problems that would keep the configured routes from being mounted,
    /// as `(field, message)` pairs.
    #[must_use]
    pub fn route_problems(&self) -> Vec<(&'static str, String)> {
        let mut problems = Vec::new();
        for (field, route) in [
            ("server.webhook_path", &self.webhook_path),
            ("server.git_path", &self.git_path),
        ] {
            if !route.starts_with('/') {
                problems.push((field, format!("{field} must start with '/'")));
            } else if route.contains(['{', '}', '*']) {
                problems.push((
                    field,
                    format!("{field} must be a literal path without '{{', '}}' or '*'"),
                ));
            } else if route == HEALTH_PATH {
                problems.push((field, format!("{field} collides with {HEALTH_PATH}")));
            }
        }
        if self.webhook_path == self.git_path {
            problems.push((
                "server.git_path",
                "server.git_path must differ from server.webhook_path".into(),
            ));
        }
        problems
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 8080,
            webhook_path: "/webhook".into(),
            git_path: "/git".into(),
        }
    }
}

/// Messaging platform credentials and send-API location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MessengerConfig {
    pub send_api_url: String,

    /// Page access token appended to every send-API call.
    #[serde(serialize_with = "serialize_secret")]
    pub page_access_token: Secret<String>,

    /// Shared secret expected in `hub.verify_token` during the handshake.
    #[serde(serialize_with = "serialize_secret")]
    pub verify_token: Secret<String>,
}

impl Default for MessengerConfig {
    fn default() -> Self {
        Self {
            send_api_url: "https://graph.facebook.com/v2.6/me/messages".into(),
            page_access_token: Secret::new(String::new()),
            verify_token: Secret::new(String::new()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub endpoint: String,
    #[serde(serialize_with = "serialize_secret")]
    pub api_key: Secret<String>,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openweathermap.org/data/2.5/weather".into(),
            api_key: Secret::new(String::new()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    pub endpoint: String,
    #[serde(serialize_with = "serialize_secret")]
    pub api_key: Secret<String>,
    /// Number of hits requested per search.
    pub per_page: u32,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://pixabay.com/api/".into(),
            api_key: Secret::new(String::new()),
            per_page: 3,
        }
    }
}

/// Push notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Platform user that receives push notifications.
    pub recipient_id: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            recipient_id: "1137104706416635".into(),
        }
    }
}

/// Outbound HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds; 0 disables it.
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 10 }
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = LexbotConfig::default();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.webhook_path, "/webhook");
        assert_eq!(cfg.server.git_path, "/git");
        assert_eq!(cfg.images.per_page, 3);
        assert_eq!(cfg.http.timeout_secs, 10);
        assert!(cfg.messenger.verify_token.expose_secret().is_empty());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let cfg: LexbotConfig = toml::from_str(
            r#"
            [messenger]
            verify_token = "abc"

            [images]
            per_page = 5
            "#,
        )
        .unwrap();
        assert_eq!(cfg.messenger.verify_token.expose_secret(), "abc");
        assert_eq!(
            cfg.messenger.send_api_url,
            "https://graph.facebook.com/v2.6/me/messages"
        );
        assert_eq!(cfg.images.per_page, 5);
        assert_eq!(cfg.images.endpoint, "https://pixabay.com/api/");
    }

    #[test]
    fn default_routes_have_no_problems() {
        assert!(ServerConfig::default().route_problems().is_empty());
    }

    #[test]
    fn route_problems_catch_unmountable_paths() {
        let server = ServerConfig {
            webhook_path: HEALTH_PATH.into(),
            git_path: "git/{id}".into(),
            ..Default::default()
        };
        let fields: Vec<&str> = server.route_problems().iter().map(|(f, _)| *f).collect();
        assert_eq!(fields, ["server.webhook_path", "server.git_path"]);

        let server = ServerConfig {
            git_path: "/hooks/{repo}".into(),
            ..Default::default()
        };
        assert_eq!(server.route_problems().len(), 1);

        let server = ServerConfig {
            git_path: "/webhook".into(),
            ..Default::default()
        };
        assert_eq!(
            server.route_problems()[0].1,
            "server.git_path must differ from server.webhook_path"
        );
    }

    #[test]
    fn redacted_hides_only_set_secrets() {
        let mut cfg = LexbotConfig::default();
        cfg.messenger.page_access_token = Secret::new("EAAB".into());
        let shown = cfg.redacted();
        assert_eq!(shown.messenger.page_access_token.expose_secret(), REDACTED);
        assert_eq!(shown.weather.api_key.expose_secret(), "");

        let text = toml::to_string(&shown).unwrap();
        assert!(!text.contains("EAAB"));
    }
}
