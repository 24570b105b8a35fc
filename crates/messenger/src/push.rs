use crate::{
    reply::{Button, ButtonKind, Element, ReplyPayload},
    types::PushEvent,
};

pub const VIEW_REPO: &str = "View repo";

/// Single-card template announcing a push, with a link to the repository.
pub fn push_notification(event: &PushEvent) -> ReplyPayload {
    ReplyPayload::generic(vec![Element {
        title: format!(
            "{} has pushed to repo: {}",
            event.pusher.name, event.repository.name
        ),
        item_url: None,
        image_url: None,
        buttons: vec![Button {
            kind: ButtonKind::WebUrl,
            url: event.repository.url.clone(),
            title: VIEW_REPO.into(),
        }],
    }])
}
