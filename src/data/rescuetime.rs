//! RescueTime Analytic Data API integration.
//!
//! Only one query shape is used: hourly activity over an interval, returned as
//! CSV. The API rejects hourly queries spanning more than a month, which is why
//! callers feed this module one `DateInterval` at a time.

use std::time::Duration;

use log::debug;
use reqwest::StatusCode;
use reqwest::blocking::Client;

use crate::data::retry::{Failure, RetryPolicy};
use crate::domain::{DateInterval, RequestDescriptor};
use crate::error::AppError;

const BASE_URL: &str = "https://www.rescuetime.com/anapi/data";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Build the hourly-activity CSV request for one interval.
///
/// The credential is embedded exactly as given.
pub fn build_request(credential: &str, interval: &DateInterval) -> RequestDescriptor {
    build_request_at(BASE_URL, credential, interval)
}

/// Same as [`build_request`] against a different endpoint.
pub fn build_request_at(base_url: &str, credential: &str, interval: &DateInterval) -> RequestDescriptor {
    let url = format!(
        "{base_url}?key={credential}&perspective=interval&restrict_kind=activity\
         &interval=hour&restrict_begin={}&restrict_end={}&format=csv",
        interval.start.format(DATE_FORMAT),
        interval.end.format(DATE_FORMAT),
    );
    RequestDescriptor {
        url,
        interval_start: interval.start,
    }
}

/// Mask the `key=` query value so URLs can be logged.
pub fn redact_credential(url: &str) -> String {
    let Some(pos) = url.find("key=") else {
        return url.to_string();
    };
    let value_start = pos + "key=".len();
    let value_end = url[value_start..]
        .find('&')
        .map_or(url.len(), |i| value_start + i);
    format!("{}***{}", &url[..value_start], &url[value_end..])
}

/// Source of raw chunk bodies.
///
/// The download pipeline only needs "give me the bytes behind this URL"; keeping
/// that behind a trait lets tests drive the pipeline without a network.
pub trait ChunkFetcher {
    fn fetch(&self, request: &RequestDescriptor) -> Result<Vec<u8>, AppError>;
}

/// Blocking HTTP client with an explicit timeout and retry policy.
pub struct RescueTimeClient {
    client: Client,
    retry: RetryPolicy,
}

impl RescueTimeClient {
    pub fn new(timeout: Duration, retry: RetryPolicy) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::transport(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, retry })
    }

    fn fetch_once(&self, url: &str) -> Result<Vec<u8>, Failure> {
        // reqwest errors embed the request URL, which carries the API key.
        let resp = self.client.get(url).send().map_err(|e| {
            let err = AppError::transport(format!("RescueTime request failed: {}", e.without_url()));
            Failure::Transient(err)
        })?;

        let status = resp.status();
        if !status.is_success() {
            let err = AppError::transport(format!("RescueTime request failed with status {status}."));
            return Err(if is_transient_status(status) {
                Failure::Transient(err)
            } else {
                Failure::Permanent(err)
            });
        }

        let body = resp.bytes().map_err(|e| {
            Failure::Transient(AppError::transport(format!(
                "Failed to read RescueTime response: {}",
                e.without_url()
            )))
        })?;
        Ok(body.to_vec())
    }
}

impl ChunkFetcher for RescueTimeClient {
    fn fetch(&self, request: &RequestDescriptor) -> Result<Vec<u8>, AppError> {
        debug!("GET {}", redact_credential(&request.url));
        let body = self.retry.run(|| self.fetch_once(&request.url))?;
        debug!("received {} bytes for {}", body.len(), request.interval_start);
        Ok(body)
    }
}

fn is_transient_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}
