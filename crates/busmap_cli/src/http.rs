use std::time::Duration;

use anyhow::Context;
use busmap_core::{FeedSource, SourceError, StopNo};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;

pub const DEFAULT_API_BASE: &str = "https://api.translink.ca/rttiapi/v1";

pub fn arrivals_url(base: &str, api_key: &str, stop: StopNo) -> String {
    format!(
        "{}/stops/{}/estimates?apikey={}",
        base.trim_end_matches('/'),
        stop,
        api_key
    )
}

pub fn buses_url(base: &str, api_key: &str, stop: StopNo) -> String {
    format!(
        "{}/buses?apikey={}&stopNo={}",
        base.trim_end_matches('/'),
        api_key,
        stop
    )
}

pub fn build_client() -> anyhow::Result<Client> {
    Client::builder()
        .user_agent(format!("busmap/{}", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(20))
        .build()
        .context("build http client")
}

/// A real-time feed fetched over HTTP. Retrying is left to whoever runs the CLI.
pub struct HttpSource {
    client: Client,
    url: String,
    label: String,
}

impl HttpSource {
    /// `label` is what logs and reports show instead of the URL, which carries the API key.
    pub fn new(client: Client, url: String, label: impl Into<String>) -> Self {
        Self {
            client,
            url,
            label: label.into(),
        }
    }
}

impl FeedSource for HttpSource {
    fn name(&self) -> String {
        self.label.clone()
    }

    fn fetch(&self) -> Result<String, SourceError> {
        let fetch_error = |err: reqwest::Error| SourceError::Fetch {
            source_name: self.label.clone(),
            message: err.without_url().to_string(),
        };
        self.client
            .get(&self.url)
            .header(ACCEPT, "application/json")
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .map_err(fetch_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_realtime_urls() {
        assert_eq!(
            arrivals_url(DEFAULT_API_BASE, "KEY", 51479),
            "https://api.translink.ca/rttiapi/v1/stops/51479/estimates?apikey=KEY"
        );
        assert_eq!(
            buses_url("http://localhost:8080/", "KEY", 51479),
            "http://localhost:8080/buses?apikey=KEY&stopNo=51479"
        );
    }
}
