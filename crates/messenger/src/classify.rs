use crate::types::MessagingEvent;

/// Text message ready for command parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundText {
    pub sender_id: String,
    pub text: String,
}

/// Classification of one messaging event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    AuthOptin,
    IncomingMessage(InboundText),
    DeliveryReceipt,
    Postback,
    ReadReceipt,
    AccountLinking,
    Unknown,
}

impl EventKind {
    /// Stable name used in log fields.
    pub fn label(&self) -> &'static str {
        match self {
            Self::AuthOptin => "optin",
            Self::IncomingMessage(_) => "message",
            Self::DeliveryReceipt => "delivery",
            Self::Postback => "postback",
            Self::ReadReceipt => "read",
            Self::AccountLinking => "account_linking",
            Self::Unknown => "unknown",
        }
    }
}

/// Classify an event by the first tag present, in the order optin, message,
/// delivery, postback, read, account_linking.
pub fn classify(event: &MessagingEvent) -> EventKind {
    if event.optin.is_some() {
        EventKind::AuthOptin
    } else if let Some(message) = &event.message {
        EventKind::IncomingMessage(InboundText {
            sender_id: event.sender.id.clone(),
            text: message.text.clone(),
        })
    } else if event.delivery.is_some() {
        EventKind::DeliveryReceipt
    } else if event.postback.is_some() {
        EventKind::Postback
    } else if event.read.is_some() {
        EventKind::ReadReceipt
    } else if event.account_linking.is_some() {
        EventKind::AccountLinking
    } else {
        EventKind::Unknown
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    fn kind_of(value: serde_json::Value) -> EventKind {
        classify(&MessagingEvent::decode(value))
    }

    #[test]
    fn empty_event_is_unknown() {
        assert_eq!(kind_of(json!({})), EventKind::Unknown);
        assert_eq!(kind_of(json!({ "sender": { "id": "1" } })), EventKind::Unknown);
    }

    #[test]
    fn each_tag_maps_to_its_kind() {
        assert_eq!(kind_of(json!({ "optin": {} })), EventKind::AuthOptin);
        assert_eq!(kind_of(json!({ "delivery": {} })), EventKind::DeliveryReceipt);
        assert_eq!(kind_of(json!({ "postback": {} })), EventKind::Postback);
        assert_eq!(kind_of(json!({ "read": {} })), EventKind::ReadReceipt);
        assert_eq!(
            kind_of(json!({ "account_linking": {} })),
            EventKind::AccountLinking
        );
    }

    #[test]
    fn message_carries_sender_and_text() {
        let kind = kind_of(json!({
            "sender": { "id": "42" },
            "message": { "text": "hello world" }
        }));
        assert_eq!(
            kind,
            EventKind::IncomingMessage(InboundText {
                sender_id: "42".into(),
                text: "hello world".into(),
            })
        );
    }

    #[test]
    fn first_tag_in_priority_order_wins() {
        let all = json!({
            "optin": {}, "message": { "text": "x" }, "delivery": {},
            "postback": {}, "read": {}, "account_linking": {}
        });
        assert_eq!(kind_of(all), EventKind::AuthOptin);

        let kind = kind_of(json!({ "account_linking": {}, "read": {}, "message": {} }));
        assert!(matches!(kind, EventKind::IncomingMessage(_)));

        assert_eq!(
            kind_of(json!({ "account_linking": {}, "postback": {}, "read": {} })),
            EventKind::Postback
        );
        assert_eq!(
            kind_of(json!({ "account_linking": {}, "delivery": {} })),
            EventKind::DeliveryReceipt
        );
        assert_eq!(
            kind_of(json!({ "account_linking": {}, "read": {} })),
            EventKind::ReadReceipt
        );
    }

    #[test]
    fn message_without_text_yields_empty_text() {
        let kind = kind_of(json!({ "message": { "attachments": [] } }));
        assert_eq!(
            kind,
            EventKind::IncomingMessage(InboundText {
                sender_id: String::new(),
                text: String::new(),
            })
        );
    }

    #[test]
    fn labels_are_snake_case() {
        assert_eq!(EventKind::AccountLinking.label(), "account_linking");
        assert_eq!(EventKind::Unknown.label(), "unknown");
    }
}
