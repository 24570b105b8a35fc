use std::sync::Arc;

use {
    lexbot_config::{LexbotConfig, ServerConfig},
    lexbot_messenger::HttpMessengerBot,
    secrecy::{ExposeSecret, Secret},
};

/// Shared gateway state, handed to every handler.
pub struct GatewayState {
    pub bot: HttpMessengerBot,
    /// Token expected in `hub.verify_token` during the subscription handshake.
    verify_token: Secret<String>,
    /// Route layout the router was built from.
    pub server: ServerConfig,
    /// Server version string.
    pub version: String,
}

impl GatewayState {
    /// Fails when the configured routes cannot be mounted next to each other
    /// and the health endpoint.
    pub fn new(
        bot: HttpMessengerBot,
        verify_token: Secret<String>,
        server: ServerConfig,
    ) -> anyhow::Result<Arc<Self>> {
        let problems: Vec<String> = server
            .route_problems()
            .into_iter()
            .map(|(_, message)| message)
            .collect();
        if !problems.is_empty() {
            anyhow::bail!("invalid server routes: {}", problems.join("; "));
        }
        Ok(Arc::new(Self {
            bot,
            verify_token,
            server,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }))
    }

    /// Build the bot and state from a loaded config.
    pub fn from_config(config: &LexbotConfig) -> anyhow::Result<Arc<Self>> {
        let bot = HttpMessengerBot::from_config(config)?;
        Self::new(
            bot,
            config.messenger.verify_token.clone(),
            config.server.clone(),
        )
    }

    pub fn verify_token(&self) -> &str {
        self.verify_token.expose_secret()
    }
}
