use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info};

use super::StoreError;

pub const DEFAULT_DATASET_URL: &str = "https://raw.githubusercontent.com/matrimonyfortelugubrahmins/matrimonyfortelugubrahmins.github.io/main/matrimony.json";

const USER_AGENT: &str = concat!("matribrowse/", env!("CARGO_PKG_VERSION"));

/// Where the dataset comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DatasetSource {
    Url(String),
    File(PathBuf),
}

impl Default for DatasetSource {
    fn default() -> Self {
        DatasetSource::Url(DEFAULT_DATASET_URL.to_string())
    }
}

impl DatasetSource {
    pub fn describe(&self) -> String {
        match self {
            DatasetSource::Url(url) => url.clone(),
            DatasetSource::File(path) => path.display().to_string(),
        }
    }

    /// Raw response body. Non-2xx statuses are failures.
    pub async fn fetch(&self, client: &reqwest::Client) -> Result<String, StoreError> {
        match self {
            DatasetSource::Url(url) => fetch_url(client, url).await,
            DatasetSource::File(path) => {
                debug!(path = %path.display(), "reading dataset file");
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|e| StoreError::Read {
                        path: path.display().to_string(),
                        source: e,
                    })
            }
        }
    }
}

async fn fetch_url(client: &reqwest::Client, url: &str) -> Result<String, StoreError> {
    info!(%url, "fetching dataset");
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| StoreError::Fetch {
            url: url.to_string(),
            source: e,
        })?;
    let status = response.status();
    if !status.is_success() {
        return Err(StoreError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    let body = response.text().await.map_err(|e| StoreError::Fetch {
        url: url.to_string(),
        source: e,
    })?;
    debug!(%url, bytes = body.len(), "dataset fetched");
    Ok(body)
}

pub fn build_client(
    proxy: Option<&str>,
    timeout_seconds: u64,
) -> Result<reqwest::Client, StoreError> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::USER_AGENT,
        reqwest::header::HeaderValue::from_static(USER_AGENT),
    );
    headers.insert(
        reqwest::header::ACCEPT,
        reqwest::header::HeaderValue::from_static("application/json"),
    );

    let mut builder = reqwest::Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(timeout_seconds.max(1)));

    if let Some(proxy) = proxy.filter(|p| !p.trim().is_empty()) {
        let proxy = reqwest::Proxy::all(proxy).map_err(|e| StoreError::ProxySetup {
            proxy: proxy.to_string(),
            source: e,
        })?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| StoreError::ClientBuild { source: e })
}
