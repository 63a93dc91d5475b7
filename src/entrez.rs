use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::error::ScanError;

/// Flat-record retrieval selector. Brief records carry annotation and the
/// CONTIG directive; with-parts records expand a scaffold into its full
/// feature table and sequence, so they get the larger timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    Brief,
    WithParts,
}

impl RecordFormat {
    fn rettype(self) -> &'static str {
        match self {
            RecordFormat::Brief => "gb",
            RecordFormat::WithParts => "gbwithparts",
        }
    }
}

pub trait EntrezClient: Send + Sync {
    fn fetch_record(&self, accession: &str, format: RecordFormat) -> Result<String, ScanError>;
}

#[derive(Clone)]
pub struct EntrezHttpClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl EntrezHttpClient {
    pub fn new() -> Result<Self, ScanError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("synscan/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| ScanError::EntrezHttp(err.to_string()))?,
        );

        let api_key = std::env::var("NCBI_API_KEY")
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        // Scaffold records with parts can run to hundreds of megabytes; the
        // per-request timeout has to cover the slowest of them.
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(600))
            .build()
            .map_err(|err| ScanError::EntrezHttp(err.to_string()))?;

        Ok(Self {
            client,
            base_url: "https://eutils.ncbi.nlm.nih.gov/entrez/eutils".to_string(),
            api_key,
        })
    }
}

impl EntrezClient for EntrezHttpClient {
    fn fetch_record(&self, accession: &str, format: RecordFormat) -> Result<String, ScanError> {
        let url = format!("{}/efetch.fcgi", self.base_url);
        let mut request = self.client.get(&url).query(&[
            ("db", "nuccore"),
            ("id", accession),
            ("rettype", format.rettype()),
            ("retmode", "text"),
        ]);
        if let Some(key) = &self.api_key {
            request = request.query(&[("api_key", key.as_str())]);
        }

        let response = request
            .send()
            .map_err(|err| ScanError::EntrezHttp(err.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "efetch request failed".to_string());
            return Err(ScanError::EntrezStatus { status, message });
        }
        response
            .text()
            .map_err(|err| ScanError::EntrezHttp(err.to_string()))
    }
}
