//! Shared HTTP plumbing for the provider clients.

use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::error::{EnrichError, EnrichResult};

const USER_AGENT: &str = concat!("playlens/", env!("CARGO_PKG_VERSION"));

/// Request timeout applied to every provider call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Build the HTTP client used by a provider.
pub(crate) fn build_client(source_name: &str) -> EnrichResult<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| EnrichError::Http {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })
}

/// Turn a transport failure into an [`EnrichError::Http`].
pub(crate) fn transport_error(source_name: &str, err: &reqwest::Error) -> EnrichError {
    EnrichError::Http {
        source_name: source_name.to_string(),
        message: err.to_string(),
    }
}

/// Check the status of `response` and decode its JSON body.
///
/// Non-success statuses become [`EnrichError::Status`] (with any
/// `Retry-After` value); undecodable bodies become [`EnrichError::Parse`].
pub(crate) async fn read_json<T: DeserializeOwned>(
    source_name: &str,
    response: Response,
) -> EnrichResult<T> {
    if !response.status().is_success() {
        return Err(EnrichError::from_response(source_name, &response));
    }

    response.json::<T>().await.map_err(|e| EnrichError::Parse {
        source_name: source_name.to_string(),
        message: e.to_string(),
    })
}
