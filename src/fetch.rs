use crate::config::{ExtractConfig, FetchMode};
use crate::error::EtlError;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub source_url: String,
    pub body: String,
}

pub fn fetch_document(config: &ExtractConfig) -> Result<FetchedDocument, EtlError> {
    match config.mode {
        FetchMode::Http => fetch_http_document(config),
        // validate() rejects file mode without a path; an empty path fails as a read error.
        FetchMode::File => fetch_file_document(config.file_path.as_deref().unwrap_or(Path::new(""))),
    }
}

fn fetch_http_document(config: &ExtractConfig) -> Result<FetchedDocument, EtlError> {
    let url = config.url.as_str();
    let fetch_err = |source| EtlError::Fetch {
        url: url.to_string(),
        source,
    };

    let mut headers = HeaderMap::new();
    if let Some(user_agent) = &config.user_agent {
        match HeaderValue::from_str(user_agent) {
            Ok(value) => {
                headers.insert(USER_AGENT, value);
            }
            Err(_) => warn!(%user_agent, "ignoring user agent that is not a valid header value"),
        }
    }

    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .default_headers(headers)
        .build()
        .map_err(fetch_err)?;

    let resp = client.get(url).send().map_err(fetch_err)?;
    let status = resp.status();
    if !status.is_success() {
        return Err(EtlError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = resp.text().map_err(fetch_err)?;
    info!(%url, bytes = body.len(), "fetched document");

    Ok(FetchedDocument {
        source_url: url.to_string(),
        body,
    })
}

pub fn fetch_file_document(path: &Path) -> Result<FetchedDocument, EtlError> {
    let bytes = std::fs::read(path).map_err(|source| EtlError::ReadDocument {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(file = %path.display(), bytes = bytes.len(), "loaded file document");

    Ok(FetchedDocument {
        source_url: format!("file://{}", path.display()),
        body: String::from_utf8_lossy(&bytes).into_owned(),
    })
}
