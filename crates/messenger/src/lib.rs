//! Messaging-platform bot core.
//!
//! Inbound webhook payloads are decoded into typed events, classified,
//! turned into a reply (optionally enriched with weather or image-search
//! data) and delivered through the platform send API.

pub mod classify;
pub mod command;
pub mod compose;
pub mod error;
pub mod fetch;
pub mod outbound;
pub mod push;
pub mod reply;
pub mod types;
pub mod webhook;

pub use {
    classify::{EventKind, InboundText, classify},
    command::Command,
    compose::{Composed, EnrichmentStatus, ReplyComposer},
    error::{Error, Result},
    fetch::{DataFetcher, Enrichment, HttpDataFetcher},
    outbound::{DeliveryOutcome, Dispatcher, GraphSendApi, SendApi, SendEnvelope, SendReceipt},
    reply::ReplyPayload,
    types::{MessagingEvent, PushEvent, WebhookEnvelope},
    webhook::{
        HttpMessengerBot, MessengerBot, PAGE_OBJECT, SubscriptionQuery, WebhookOutcome,
        verify_subscription,
    },
};
