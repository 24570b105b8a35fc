use tracing::debug;

use crate::{
    command::Command,
    fetch::{DataFetcher, Enrichment, ImageHits, WeatherReport},
    reply::{Element, ReplyPayload, start_menu},
};

/// Whether a reply needed auxiliary data, and whether that lookup worked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichmentStatus {
    NotRequired,
    Fetched,
    Degraded(String),
}

impl<T> From<&Enrichment<T>> for EnrichmentStatus {
    fn from(enrichment: &Enrichment<T>) -> Self {
        match enrichment {
            Enrichment::Fetched(_) => Self::Fetched,
            Enrichment::Degraded { reason, .. } => Self::Degraded(reason.clone()),
        }
    }
}

/// A reply ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composed {
    pub payload: ReplyPayload,
    pub enrichment: EnrichmentStatus,
}

impl Composed {
    fn plain(payload: ReplyPayload) -> Self {
        Self {
            payload,
            enrichment: EnrichmentStatus::NotRequired,
        }
    }
}

/// Builds the reply for each [`Command`].
pub struct ReplyComposer<F> {
    fetcher: F,
}

impl<F: DataFetcher> ReplyComposer<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    pub async fn compose(&self, command: &Command) -> Composed {
        match command {
            Command::Start => Composed::plain(start_menu()),
            Command::Weather { city } => {
                let report = self.fetcher.weather(city).await;
                Composed {
                    enrichment: (&report).into(),
                    payload: ReplyPayload::text(weather_sentence(report.data())),
                }
            },
            Command::ImageSearch { query } => {
                let hits = self.fetcher.images(query).await;
                debug!(query, count = hits.data().hits.len(), "composing image reply");
                Composed {
                    enrichment: (&hits).into(),
                    payload: image_gallery(hits.data()),
                }
            },
            Command::Echo(text) => Composed::plain(ReplyPayload::text(text.clone())),
        }
    }
}

pub fn weather_sentence(report: &WeatherReport) -> String {
    format!(
        "The weather for today in {} is {}",
        report.city, report.condition
    )
}

/// Generic template with one card per hit. The card links to the hit's page
/// and shows its preview.
pub fn image_gallery(hits: &ImageHits) -> ReplyPayload {
    ReplyPayload::generic(
        hits.hits
            .iter()
            .map(|hit| Element {
                title: "Image".into(),
                item_url: Some(hit.page_url.clone()),
                image_url: Some(hit.preview_url.clone()),
                buttons: Vec::new(),
            })
            .collect(),
    )
}
