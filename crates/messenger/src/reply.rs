//! Outbound message shapes accepted by the platform send API.

use serde::Serialize;

/// Body of the `message` field of a send-API request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ReplyPayload {
    /// Prompt with tappable preset answers.
    QuickReplies {
        text: String,
        quick_replies: Vec<QuickReply>,
    },
    /// Plain text.
    Text { text: String },
    /// Structured template (generic element list).
    Template { attachment: Attachment },
}

impl ReplyPayload {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn generic(elements: Vec<Element>) -> Self {
        Self::Template {
            attachment: Attachment {
                kind: AttachmentKind::Template,
                payload: TemplatePayload {
                    template_type: TemplateType::Generic,
                    elements,
                },
            },
        }
    }

    pub fn shape(&self) -> &'static str {
        match self {
            Self::QuickReplies { .. } => "quick_replies",
            Self::Text { .. } => "text",
            Self::Template { .. } => "template",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuickReply {
    pub content_type: QuickReplyContent,
    pub title: String,
    pub payload: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuickReplyContent {
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    #[serde(rename = "type")]
    pub kind: AttachmentKind,
    pub payload: TemplatePayload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    Template,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplatePayload {
    pub template_type: TemplateType,
    pub elements: Vec<Element>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateType {
    Generic,
}

/// One card of a generic template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Element {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<Button>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Button {
    #[serde(rename = "type")]
    pub kind: ButtonKind,
    pub url: String,
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonKind {
    WebUrl,
}

// ── Legal-process menu ──────────────────────────────────────────────────────

/// Menu entry shown by the `start` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegalProcess {
    pub label: &'static str,
    pub code: &'static str,
}

/// Menu entries in display order.
pub const LEGAL_PROCESSES: [LegalProcess; 5] = [
    LegalProcess {
        label: "Divorce",
        code: "DIVORCE_LEGAL_PROCESS",
    },
    LegalProcess {
        label: "Adoption",
        code: "ADOPTION_LEGAL_PROCESS",
    },
    LegalProcess {
        label: "Testament",
        code: "TESTAMENT_LEGAL_PROCESS",
    },
    LegalProcess {
        label: "Corruption",
        code: "CORRUPTION_LEGAL_PROCESS",
    },
    LegalProcess {
        label: "Other",
        code: "OTHER_LEGAL_PROCESS",
    },
];

pub const START_PROMPT: &str = "Pick a legal process I can help you with:";

/// The `start` menu: one quick reply per legal process.
pub fn start_menu() -> ReplyPayload {
    ReplyPayload::QuickReplies {
        text: START_PROMPT.into(),
        quick_replies: LEGAL_PROCESSES
            .iter()
            .map(|process| QuickReply {
                content_type: QuickReplyContent::Text,
                title: process.label.into(),
                payload: process.code.into(),
            })
            .collect(),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    #[test]
    fn text_serializes_to_single_field() {
        let value = serde_json::to_value(ReplyPayload::text("hi")).unwrap();
        assert_eq!(value, json!({ "text": "hi" }));
    }

    #[test]
    fn start_menu_lists_processes_in_order() {
        let value = serde_json::to_value(start_menu()).unwrap();
        assert_eq!(value["text"], START_PROMPT);
        let replies = value["quick_replies"].as_array().unwrap();
        assert_eq!(replies.len(), 5);

        let titles: Vec<_> = replies.iter().map(|r| r["title"].clone()).collect();
        assert_eq!(
            titles,
            vec!["Divorce", "Adoption", "Testament", "Corruption", "Other"]
        );
        assert_eq!(replies[0], json!({
            "content_type": "text",
            "title": "Divorce",
            "payload": "DIVORCE_LEGAL_PROCESS"
        }));
        assert_eq!(replies[4]["payload"], "OTHER_LEGAL_PROCESS");
    }

    #[test]
    fn generic_template_shape() {
        let payload = ReplyPayload::generic(vec![Element {
            title: "card".into(),
            item_url: None,
            image_url: None,
            buttons: vec![Button {
                kind: ButtonKind::WebUrl,
                url: "https://example.com".into(),
                title: "Open".into(),
            }],
        }]);
        assert_eq!(payload.shape(), "template");
        assert_eq!(
            serde_json::to_value(payload).unwrap(),
            json!({
                "attachment": {
                    "type": "template",
                    "payload": {
                        "template_type": "generic",
                        "elements": [{
                            "title": "card",
                            "buttons": [{
                                "type": "web_url",
                                "url": "https://example.com",
                                "title": "Open"
                            }]
                        }]
                    }
                }
            })
        );
    }

    #[test]
    fn empty_template_keeps_elements_array() {
        let value = serde_json::to_value(ReplyPayload::generic(Vec::new())).unwrap();
        assert_eq!(value["attachment"]["payload"]["elements"], json!([]));
    }
}
