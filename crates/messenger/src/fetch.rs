//! Weather and image lookups used to enrich replies.
//!
//! A failed lookup never aborts a reply: it is logged and reported as
//! [`Enrichment::Degraded`] with empty data, and the reply is still sent.

use std::time::Duration;

use {
    async_trait::async_trait,
    lexbot_config::{HttpConfig, ImagesConfig, WeatherConfig},
    secrecy::ExposeSecret,
    serde::{Deserialize, de::DeserializeOwned},
    tracing::{debug, warn},
};

use crate::error::{Error, Result};

/// Outcome of an enrichment lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enrichment<T> {
    Fetched(T),
    /// The lookup failed; `data` is the empty default.
    Degraded { data: T, reason: String },
}

impl<T: Default> Enrichment<T> {
    pub fn degraded(reason: impl Into<String>) -> Self {
        Self::Degraded {
            data: T::default(),
            reason: reason.into(),
        }
    }
}

impl<T> Enrichment<T> {
    pub fn data(&self) -> &T {
        match self {
            Self::Fetched(data) | Self::Degraded { data, .. } => data,
        }
    }

    pub fn into_data(self) -> T {
        match self {
            Self::Fetched(data) | Self::Degraded { data, .. } => data,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }
}

/// Current conditions for one city.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeatherReport {
    /// `weather[0].main`, e.g. `Clear`.
    pub condition: String,
    /// `name`, the city as spelled by the weather service.
    pub city: String,
}

/// Image-search results, in service order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ImageHits {
    pub hits: Vec<ImageHit>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ImageHit {
    #[serde(rename = "pageURL")]
    pub page_url: String,
    #[serde(rename = "previewURL")]
    pub preview_url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WeatherResponse {
    weather: Vec<WeatherCondition>,
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WeatherCondition {
    main: String,
}

impl From<WeatherResponse> for WeatherReport {
    fn from(response: WeatherResponse) -> Self {
        Self {
            condition: response
                .weather
                .into_iter()
                .next()
                .map(|w| w.main)
                .unwrap_or_default(),
            city: response.name,
        }
    }
}

/// Source of enrichment data for the reply composer.
#[async_trait]
pub trait DataFetcher: Send + Sync {
    async fn weather(&self, city: &str) -> Enrichment<WeatherReport>;

    async fn images(&self, query: &str) -> Enrichment<ImageHits>;
}

/// Build the shared outbound HTTP client. A zero timeout disables it.
pub fn http_client(config: &HttpConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().user_agent(concat!(
        env!("CARGO_PKG_NAME"),
        "/",
        env!("CARGO_PKG_VERSION")
    ));
    if config.timeout_secs > 0 {
        builder = builder.timeout(Duration::from_secs(config.timeout_secs));
    }
    builder
        .build()
        .map_err(|e| Error::http("building HTTP client", e))
}

/// [`DataFetcher`] backed by the configured weather and image-search APIs.
pub struct HttpDataFetcher {
    http: reqwest::Client,
    weather: WeatherConfig,
    images: ImagesConfig,
}

impl HttpDataFetcher {
    pub fn new(http: reqwest::Client, weather: WeatherConfig, images: ImagesConfig) -> Self {
        Self {
            http,
            weather,
            images,
        }
    }

    async fn get_json<T>(
        &self,
        context: &'static str,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let resp = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| Error::http(context, e))?;
        let status = resp.status();
        let body = resp.text().await.map_err(|e| Error::http(context, e))?;
        if !status.is_success() {
            return Err(Error::status(context, status.as_u16(), body));
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl DataFetcher for HttpDataFetcher {
    async fn weather(&self, city: &str) -> Enrichment<WeatherReport> {
        let api_key = self.weather.api_key.expose_secret();
        let query = [("APPID", api_key.as_str()), ("q", city)];
        match self
            .get_json::<WeatherResponse>("weather lookup", &self.weather.endpoint, &query)
            .await
        {
            Ok(response) => {
                debug!(city, "weather lookup succeeded");
                Enrichment::Fetched(response.into())
            },
            Err(e) => {
                warn!(city, error = %e, "weather lookup failed, replying with empty data");
                Enrichment::degraded(e.to_string())
            },
        }
    }

    async fn images(&self, query: &str) -> Enrichment<ImageHits> {
        let api_key = self.images.api_key.expose_secret();
        let per_page = self.images.per_page.to_string();
        let params = [
            ("key", api_key.as_str()),
            ("q", query),
            ("per_page", per_page.as_str()),
        ];
        match self
            .get_json::<ImageHits>("image search", &self.images.endpoint, &params)
            .await
        {
            Ok(hits) => {
                debug!(query, count = hits.hits.len(), "image search succeeded");
                Enrichment::Fetched(hits)
            },
            Err(e) => {
                warn!(query, error = %e, "image search failed, replying with empty data");
                Enrichment::degraded(e.to_string())
            },
        }
    }
}
