//! Inbound webhook handling: subscription handshake, event dispatch and push
//! notifications.

use {
    lexbot_config::LexbotConfig,
    serde::Deserialize,
    tracing::{debug, info, warn},
};

use crate::{
    classify::{EventKind, classify},
    command::Command,
    compose::ReplyComposer,
    error::{Error, Result},
    fetch::{DataFetcher, HttpDataFetcher, http_client},
    outbound::{DeliveryOutcome, Dispatcher, GraphSendApi, SendApi},
    push::push_notification,
    reply::ReplyPayload,
    types::{MessagingEvent, PushEvent, WebhookEnvelope},
};

/// `object` value of envelopes sent by the messaging platform.
pub const PAGE_OBJECT: &str = "page";

/// Query parameters of the subscription handshake.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscriptionQuery {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

impl SubscriptionQuery {
    /// Build from raw query pairs. A repeated key keeps its first value.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "hub.mode" => &mut query.mode,
                "hub.verify_token" => &mut query.verify_token,
                "hub.challenge" => &mut query.challenge,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into());
            }
        }
        query
    }
}

/// Verify a webhook subscription (GET request).
///
/// Returns the challenge to echo when `hub.mode=subscribe` and
/// `hub.verify_token` matches the configured token. An empty configured
/// token never matches. Every rejection is logged with the received token.
pub fn verify_subscription(query: &SubscriptionQuery, expected_token: &str) -> Option<String> {
    let mode = query.mode.as_deref().unwrap_or_default();
    let token = query.verify_token.as_deref().unwrap_or_default();

    let accepted = mode == "subscribe"
        && query.verify_token.is_some()
        && !expected_token.is_empty()
        && token == expected_token;
    if accepted {
        Some(query.challenge.clone().unwrap_or_default())
    } else {
        warn!(
            mode = ?query.mode,
            verify_token = ?query.verify_token,
            "webhook verification failed"
        );
        None
    }
}

/// Result of handling one messaging envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// `object` was not `"page"`; nothing was processed.
    Rejected { object: String },
    Accepted { events: usize, replies: usize },
}

/// The bot: classifies events, composes replies and delivers them.
pub struct MessengerBot<F, S> {
    composer: ReplyComposer<F>,
    dispatcher: Dispatcher<S>,
    git_recipient: String,
}

/// Bot wired to the real HTTP services.
pub type HttpMessengerBot = MessengerBot<HttpDataFetcher, GraphSendApi>;

impl HttpMessengerBot {
    pub fn from_config(config: &LexbotConfig) -> Result<Self> {
        let http = http_client(&config.http)?;
        let fetcher =
            HttpDataFetcher::new(http.clone(), config.weather.clone(), config.images.clone());
        let send_api = GraphSendApi::new(http, &config.messenger)?;
        Ok(Self::new(fetcher, send_api, config.git.recipient_id.clone()))
    }
}

impl<F: DataFetcher, S: SendApi> MessengerBot<F, S> {
    pub fn new(fetcher: F, send_api: S, git_recipient: impl Into<String>) -> Self {
        Self {
            composer: ReplyComposer::new(fetcher),
            dispatcher: Dispatcher::new(send_api),
            git_recipient: git_recipient.into(),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher<S> {
        &self.dispatcher
    }

    /// Process every event of every entry, one after another.
    pub async fn handle_envelope(&self, envelope: &WebhookEnvelope) -> WebhookOutcome {
        if envelope.object != PAGE_OBJECT {
            debug!(object = %envelope.object, "ignoring webhook for non-page object");
            return WebhookOutcome::Rejected {
                object: envelope.object.clone(),
            };
        }

        let mut events = 0;
        let mut replies = 0;
        for entry in &envelope.entry {
            for raw in &entry.messaging {
                events += 1;
                if self.handle_event(raw.clone()).await.is_some() {
                    replies += 1;
                }
            }
        }
        WebhookOutcome::Accepted { events, replies }
    }

    /// Handle one raw messaging event. Returns the delivery outcome when a
    /// reply was attempted.
    pub async fn handle_event(&self, raw: serde_json::Value) -> Option<DeliveryOutcome> {
        let event = MessagingEvent::decode(raw);
        let kind = classify(&event);
        match kind {
            EventKind::IncomingMessage(inbound) => {
                info!(user = %inbound.sender_id, message = %inbound.text, "message received");
                let command = Command::parse(&inbound.text);
                let composed = self.composer.compose(&command).await;
                debug!(
                    command = command.name(),
                    enrichment = ?composed.enrichment,
                    "reply composed"
                );
                Some(
                    self.dispatcher
                        .deliver(&inbound.sender_id, composed.payload)
                        .await,
                )
            },
            EventKind::AuthOptin
            | EventKind::DeliveryReceipt
            | EventKind::Postback
            | EventKind::ReadReceipt
            | EventKind::AccountLinking => {
                info!(kind = kind.label(), sender = %event.sender.id, "event not handled yet");
                None
            },
            EventKind::Unknown => {
                info!("webhook received unknown event");
                None
            },
        }
    }

    /// Announce a source-control push to the configured recipient.
    pub async fn handle_push(&self, event: &PushEvent) -> DeliveryOutcome {
        info!(
            pusher = %event.pusher.name,
            repo = %event.repository.name,
            "push notification received"
        );
        self.dispatcher
            .deliver(&self.git_recipient, push_notification(event))
            .await
    }

    /// Send a plain-text message outside any webhook exchange.
    pub async fn send_text(&self, recipient_id: &str, text: &str) -> Result<DeliveryOutcome> {
        if recipient_id.is_empty() {
            return Err(Error::invalid_input("recipient id must not be empty"));
        }
        Ok(self
            .dispatcher
            .deliver(recipient_id, ReplyPayload::text(text))
            .await)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use {async_trait::async_trait, serde_json::json, tracing_test::traced_test};

    use {
        super::*,
        crate::{
            fetch::{Enrichment, ImageHit, ImageHits, WeatherReport},
            outbound::{SendEnvelope, SendReceipt},
            reply::start_menu,
        },
    };

    struct CannedFetcher;

    #[async_trait]
    impl DataFetcher for CannedFetcher {
        async fn weather(&self, _city: &str) -> Enrichment<WeatherReport> {
            Enrichment::Fetched(WeatherReport {
                condition: "Clear".into(),
                city: "Paris".into(),
            })
        }

        async fn images(&self, _query: &str) -> Enrichment<ImageHits> {
            Enrichment::Fetched(ImageHits {
                hits: vec![ImageHit {
                    page_url: "A".into(),
                    preview_url: "B".into(),
                }],
            })
        }
    }

    #[derive(Default)]
    struct RecordingSendApi {
        sent: Mutex<Vec<serde_json::Value>>,
    }

    #[async_trait]
    impl SendApi for RecordingSendApi {
        async fn send(&self, envelope: &SendEnvelope) -> Result<SendReceipt> {
            self.sent
                .lock()
                .unwrap()
                .push(serde_json::to_value(envelope)?);
            Ok(SendReceipt {
                status: 200,
                body: "{}".into(),
            })
        }
    }

    fn bot() -> MessengerBot<CannedFetcher, RecordingSendApi> {
        MessengerBot::new(CannedFetcher, RecordingSendApi::default(), "git-recipient")
    }

    fn sent(bot: &MessengerBot<CannedFetcher, RecordingSendApi>) -> Vec<serde_json::Value> {
        bot.dispatcher().api().sent.lock().unwrap().clone()
    }

    fn envelope(value: serde_json::Value) -> WebhookEnvelope {
        serde_json::from_value(value).unwrap()
    }

    fn query(mode: &str, token: &str, challenge: &str) -> SubscriptionQuery {
        SubscriptionQuery {
            mode: Some(mode.into()),
            verify_token: Some(token.into()),
            challenge: Some(challenge.into()),
        }
    }

    #[test]
    fn verify_subscription_valid() {
        assert_eq!(
            verify_subscription(&query("subscribe", "my_token", "challenge_123"), "my_token"),
            Some("challenge_123".to_string())
        );
    }

    #[test]
    fn verify_subscription_invalid_token() {
        assert_eq!(
            verify_subscription(&query("subscribe", "wrong", "challenge_123"), "my_token"),
            None
        );
    }

    #[test]
    fn verify_subscription_wrong_mode() {
        assert_eq!(
            verify_subscription(&query("unsubscribe", "my_token", "c"), "my_token"),
            None
        );
    }

    #[test]
    fn verify_subscription_missing_params() {
        assert_eq!(
            verify_subscription(&SubscriptionQuery::default(), "my_token"),
            None
        );
    }

    #[test]
    fn pairs_keep_first_value_of_repeated_keys() {
        let query = SubscriptionQuery::from_pairs([
            ("hub.mode", "subscribe"),
            ("hub.verify_token", "my_token"),
            ("hub.verify_token", "other"),
            ("hub.challenge", "c1"),
            ("hub.challenge", "c2"),
            ("unrelated", "x"),
        ]);
        assert_eq!(query.mode.as_deref(), Some("subscribe"));
        assert_eq!(query.verify_token.as_deref(), Some("my_token"));
        assert_eq!(verify_subscription(&query, "my_token"), Some("c1".into()));
    }

    #[test]
    fn verify_subscription_missing_token_never_matches() {
        let query = SubscriptionQuery {
            mode: Some("subscribe".into()),
            verify_token: None,
            challenge: Some("c".into()),
        };
        assert_eq!(verify_subscription(&query, "my_token"), None);
    }

    #[test]
    #[traced_test]
    fn rejections_log_the_received_token() {
        verify_subscription(&query("subscribe", "wrong-token", "c"), "my_token");
        assert!(logs_contain("webhook verification failed"));
        assert!(logs_contain("wrong-token"));

        let no_mode = SubscriptionQuery {
            verify_token: Some("token-without-mode".into()),
            ..Default::default()
        };
        assert_eq!(verify_subscription(&no_mode, "my_token"), None);
        assert!(logs_contain("token-without-mode"));
    }

    #[test]
    fn verify_subscription_rejects_empty_configured_token() {
        assert_eq!(verify_subscription(&query("subscribe", "", "c"), ""), None);
    }

    #[tokio::test]
    async fn non_page_object_is_rejected_without_sending() {
        let bot = bot();
        let outcome = bot
            .handle_envelope(&envelope(json!({
                "object": "user",
                "entry": [{ "messaging": [{ "sender": { "id": "1" }, "message": { "text": "hi" } }] }]
            })))
            .await;
        assert_eq!(outcome, WebhookOutcome::Rejected {
            object: "user".into()
        });
        assert!(sent(&bot).is_empty());
    }

    #[tokio::test]
    async fn walks_every_entry_and_event_in_order() {
        let bot = bot();
        let outcome = bot
            .handle_envelope(&envelope(json!({
                "object": "page",
                "entry": [
                    { "messaging": [
                        { "sender": { "id": "1" }, "message": { "text": "hello world" } },
                        { "sender": { "id": "1" }, "read": { "watermark": 1 } }
                    ]},
                    { "messaging": [
                        { "sender": { "id": "2" }, "message": { "text": "start" } },
                        {}
                    ]}
                ]
            })))
            .await;
        assert_eq!(outcome, WebhookOutcome::Accepted {
            events: 4,
            replies: 2
        });

        let sent = sent(&bot);
        assert_eq!(sent.len(), 2);
        assert_eq!(
            sent[0],
            json!({ "recipient": { "id": "1" }, "message": { "text": "hello world" } })
        );
        assert_eq!(sent[1], json!({
            "recipient": { "id": "2" },
            "message": serde_json::to_value(start_menu()).unwrap()
        }));
    }

    #[tokio::test]
    async fn weather_and_image_replies_use_fetched_data() {
        let bot = bot();
        bot.handle_event(json!({ "sender": { "id": "9" }, "message": { "text": "weather paris" } }))
            .await;
        bot.handle_event(json!({ "sender": { "id": "9" }, "message": { "text": "image me cats" } }))
            .await;

        let sent = sent(&bot);
        assert_eq!(
            sent[0]["message"]["text"],
            "The weather for today in Paris is Clear"
        );
        assert_eq!(
            sent[1]["message"]["attachment"]["payload"]["elements"][0],
            json!({ "title": "Image", "item_url": "A", "image_url": "B" })
        );
    }

    #[tokio::test]
    async fn stub_and_unknown_events_take_no_action() {
        let bot = bot();
        for event in [
            json!({ "optin": { "ref": "x" } }),
            json!({ "delivery": { "mids": ["m"] } }),
            json!({ "postback": { "payload": "DIVORCE_LEGAL_PROCESS" } }),
            json!({ "read": {} }),
            json!({ "account_linking": { "status": "linked" } }),
            json!({}),
            json!("garbage"),
        ] {
            assert!(bot.handle_event(event).await.is_none());
        }
        assert!(sent(&bot).is_empty());
    }

    #[tokio::test]
    async fn push_goes_to_configured_recipient() {
        let bot = bot();
        let event = PushEvent::decode(&json!({
            "repository": { "name": "lexbot", "url": "https://git.example.com/lexbot" },
            "pusher": { "name": "ana" }
        }));
        let outcome = bot.handle_push(&event).await;
        assert!(matches!(outcome, DeliveryOutcome::Delivered(_)));

        let sent = sent(&bot);
        assert_eq!(sent[0]["recipient"]["id"], "git-recipient");
        assert_eq!(
            sent[0]["message"]["attachment"]["payload"]["elements"][0]["title"],
            "ana has pushed to repo: lexbot"
        );
    }

    #[tokio::test]
    async fn send_text_requires_recipient() {
        let bot = bot();
        assert!(bot.send_text("", "hi").await.is_err());
        let outcome = bot.send_text("7", "hi").await.unwrap();
        assert!(matches!(outcome, DeliveryOutcome::Delivered(_)));
    }
}
