//! Inbound webhook payloads, decoded once at the HTTP boundary.
//!
//! Every field is optional or defaulted: a missing or mistyped field is
//! treated as absent rather than rejecting the request.

use serde::{Deserialize, Deserializer, de::DeserializeOwned};

/// Top-level messaging webhook body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WebhookEnvelope {
    /// Source object type; `"page"` for the messaging platform.
    pub object: String,
    #[serde(deserialize_with = "lenient")]
    pub entry: Vec<Entry>,
}

/// One batch of events inside an envelope.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Entry {
    #[serde(deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub time: Option<i64>,
    /// Raw events; each one is decoded separately so a single malformed
    /// event cannot reject its siblings.
    #[serde(deserialize_with = "lenient")]
    pub messaging: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Participant {
    #[serde(deserialize_with = "lenient")]
    pub id: String,
}

/// A single messaging event. At most one tag is expected to be present, but
/// the classifier only looks at the first one in priority order.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MessagingEvent {
    #[serde(deserialize_with = "lenient")]
    pub sender: Participant,
    #[serde(deserialize_with = "lenient")]
    pub recipient: Option<Participant>,
    #[serde(deserialize_with = "lenient")]
    pub timestamp: Option<i64>,
    #[serde(deserialize_with = "lenient")]
    pub optin: Option<Optin>,
    #[serde(deserialize_with = "lenient")]
    pub message: Option<IncomingMessage>,
    #[serde(deserialize_with = "lenient")]
    pub delivery: Option<Delivery>,
    #[serde(deserialize_with = "lenient")]
    pub postback: Option<Postback>,
    #[serde(deserialize_with = "lenient")]
    pub read: Option<Read>,
    #[serde(deserialize_with = "lenient")]
    pub account_linking: Option<AccountLinking>,
}

impl MessagingEvent {
    /// Decode a raw event. Anything that is not a JSON object decodes to an
    /// event with no tags, which classifies as unknown.
    pub fn decode(value: serde_json::Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Optin {
    #[serde(rename = "ref", deserialize_with = "lenient")]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IncomingMessage {
    #[serde(deserialize_with = "lenient")]
    pub mid: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub text: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Delivery {
    #[serde(deserialize_with = "lenient")]
    pub mids: Vec<String>,
    #[serde(deserialize_with = "lenient")]
    pub watermark: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Postback {
    #[serde(deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub payload: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Read {
    #[serde(deserialize_with = "lenient")]
    pub watermark: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AccountLinking {
    #[serde(deserialize_with = "lenient")]
    pub status: Option<String>,
}

/// Source-control push notification body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PushEvent {
    #[serde(deserialize_with = "lenient")]
    pub repository: Repository,
    #[serde(deserialize_with = "lenient")]
    pub pusher: Pusher,
}

impl PushEvent {
    pub fn decode(value: &serde_json::Value) -> Self {
        Self::deserialize(value).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Repository {
    #[serde(deserialize_with = "lenient")]
    pub name: String,
    #[serde(deserialize_with = "lenient")]
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Pusher {
    #[serde(deserialize_with = "lenient")]
    pub name: String,
}

/// Deserialize a field, falling back to its default when the value has the
/// wrong shape. `null` also maps to the default, so a `null` tag is absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}
