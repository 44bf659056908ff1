//! Fetch hits from the sequence service and write a view into the page
//!
//! One POST per load, no retries. Every failure is terminal: its message
//! replaces the widget content and is returned to the caller for logging.

use std::time::Duration;

use crate::config::Config;
use crate::hits::{parse_response, Hit, ServiceResponse};
use crate::page::Document;
use crate::render::{Links, View};

/// Shown while the search request is in flight
pub const LOADING: &str = "<small>loading...</small>";

/// Failure of the outbound search request
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server answered HTTP {0}")]
    Status(reqwest::StatusCode),
}

/// Why a load ended without rendering hits
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("No element named {0}")]
    MissingElement(String),
    #[error("Cannot contact server")]
    Contact(#[source] BackendError),
    #[error("Empty response from server")]
    EmptyResponse,
    #[error("{0}")]
    Server(String),
}

/// Runs a search for a query sequence and returns the raw response body
pub trait SearchBackend {
    fn search(&self, url: &str, sequence: &str) -> Result<String, BackendError>;
}

/// Blocking HTTP client posting the sequence as form data
pub struct HttpBackend {
    client: reqwest::blocking::Client,
}

impl HttpBackend {
    /// Without a timeout a hung server keeps the load waiting.
    pub fn new(timeout: Option<Duration>) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("fitblast/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Self::new(config.request_timeout_secs.map(Duration::from_secs))
    }
}

impl SearchBackend for HttpBackend {
    fn search(&self, url: &str, sequence: &str) -> Result<String, BackendError> {
        // POST rather than GET: long queries exceed URL length limits
        let response = self.client.post(url).form(&[("seq", sequence)]).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status));
        }
        Ok(response.text()?)
    }
}

fn fetch_hits<B: SearchBackend + ?Sized>(
    backend: &B,
    url: &str,
    sequence: &str,
) -> Result<Vec<Hit>, LoadError> {
    let body = backend.search(url, sequence).map_err(LoadError::Contact)?;
    log::debug!("Received {} bytes from {}", body.len(), url);

    match parse_response(&body) {
        ServiceResponse::Hits(hits) => Ok(hits),
        ServiceResponse::Empty => Err(LoadError::EmptyResponse),
        ServiceResponse::ServerError(message) => Err(LoadError::Server(message)),
    }
}

/// Search with `sequence` and fill element `id` with whatever `handler`
/// renders from the hits.
pub fn load<D, B, F>(
    document: &mut D,
    backend: &B,
    id: &str,
    links: &Links,
    sequence: &str,
    handler: F,
) -> Result<(), LoadError>
where
    D: Document + ?Sized,
    B: SearchBackend + ?Sized,
    F: FnOnce(&[Hit]) -> String,
{
    if !document.has_element(id) {
        log::error!("No element named {}", id);
        return Err(LoadError::MissingElement(id.to_string()));
    }
    document.set_inner_html(id, LOADING);

    let url = links.search_url();
    log::info!(
        "Searching {} residues against {}",
        sequence.chars().count(),
        url
    );

    match fetch_hits(backend, &url, sequence) {
        Ok(hits) => {
            log::info!("Received {} hits", hits.len());
            document.set_inner_html(id, "");
            let html = handler(&hits);
            document.set_inner_html(id, &html);
            Ok(())
        }
        Err(e) => {
            match &e {
                LoadError::Contact(source) => log::warn!("{}: {}", e, source),
                _ => log::warn!("Search failed: {}", e),
            }
            document.set_inner_html(id, &e.to_string());
            Err(e)
        }
    }
}

/// Fill element `id` with the short summary of the hits
pub fn load_short<D, B>(
    document: &mut D,
    backend: &B,
    id: &str,
    server_root: &str,
    sequence: &str,
    config: &Config,
) -> Result<(), LoadError>
where
    D: Document + ?Sized,
    B: SearchBackend + ?Sized,
{
    load_view(View::Short, document, backend, id, server_root, sequence, config)
}

/// Fill element `id` with the table of all well-covered hits
pub fn load_table<D, B>(
    document: &mut D,
    backend: &B,
    id: &str,
    server_root: &str,
    sequence: &str,
    config: &Config,
) -> Result<(), LoadError>
where
    D: Document + ?Sized,
    B: SearchBackend + ?Sized,
{
    load_view(View::Table, document, backend, id, server_root, sequence, config)
}

/// Fill element `id` with the given view of the hits
pub fn load_view<D, B>(
    view: View,
    document: &mut D,
    backend: &B,
    id: &str,
    server_root: &str,
    sequence: &str,
    config: &Config,
) -> Result<(), LoadError>
where
    D: Document + ?Sized,
    B: SearchBackend + ?Sized,
{
    let links = Links::new(server_root, config.detail_query_limit);
    load(document, backend, id, &links, sequence, |hits| {
        view.render(hits, sequence, &links, &config.thresholds)
    })
}

/// Fetch and parse without rendering
pub fn fetch<B: SearchBackend + ?Sized>(
    backend: &B,
    links: &Links,
    sequence: &str,
) -> Result<Vec<Hit>, LoadError> {
    fetch_hits(backend, &links.search_url(), sequence)
}
