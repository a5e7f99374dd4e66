/*!
 * HTTP(S) downloads over a blocking `reqwest` client
 */

use std::fs::File;
use std::io;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use reqwest::header::{LAST_MODIFIED, USER_AGENT};
use tracing::debug;

use crate::core::download::{FetchResponse, Fetcher};
use crate::error::{Result, SyncError};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the client shared by manifest requests and file downloads
pub fn build_client(user_agent: &str) -> Result<Client> {
    Client::builder()
        .user_agent(user_agent)
        .connect_timeout(CONNECT_TIMEOUT)
        // no deadline for the whole transfer
        .timeout(None)
        .build()
        .map_err(|e| SyncError::Config(format!("failed to build HTTP client: {}", e)))
}

/// Parse an HTTP-date (`Sun, 06 Nov 1994 08:49:37 GMT`)
pub fn parse_http_date(value: &str) -> Option<SystemTime> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|dt| SystemTime::from(dt.with_timezone(&Utc)))
}

/// [`Fetcher`] for `http://` and `https://` URLs
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, user_agent: Option<&str>, dst: &mut File) -> Result<FetchResponse> {
        let fetch_error = |message: String| SyncError::Fetch {
            url: url.to_string(),
            message,
        };

        let mut request = self.client.get(url);
        if let Some(ua) = user_agent {
            request = request.header(USER_AGENT, ua);
        }

        let mut response = request.send().map_err(|e| fetch_error(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let modified = response
            .headers()
            .get(LAST_MODIFIED)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_http_date);

        let bytes = io::copy(&mut response, dst).map_err(|e| fetch_error(e.to_string()))?;
        debug!(url, bytes, ?modified, "Fetched body");

        Ok(FetchResponse { bytes, modified })
    }
}
