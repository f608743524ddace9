//! HTTP access to the vehicle feed.

mod basic;
mod client;
#[cfg(test)]
pub(crate) mod stub;

pub use basic::BasicClient;
pub use client::HttpClient;

use crate::error::FetchError;
use crate::model::VehicleRecord;
use crate::parser::parse_vehicles;
use tracing::debug;

/// Public SDIP endpoint listing every vehicle currently in service.
pub const FEED_URL: &str = "https://sdip.transportgzm.pl/main?action=v";

/// GETs `url` and returns the body, failing on any non-2xx status.
pub async fn fetch_bytes<C: HttpClient + ?Sized>(
    client: &C,
    url: &str,
) -> Result<Vec<u8>, FetchError> {
    let url = reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    let req = reqwest::Request::new(reqwest::Method::GET, url);

    let resp = client.execute(req).await?;
    let status = resp.status();
    debug!(%status, "Feed responded");
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }

    Ok(resp.bytes().await?.to_vec())
}

/// Fetches and decodes the vehicle list.
#[tracing::instrument(skip(client))]
pub async fn fetch_vehicles<C: HttpClient + ?Sized>(
    client: &C,
    url: &str,
) -> Result<Vec<VehicleRecord>, FetchError> {
    let bytes = fetch_bytes(client, url).await?;
    debug!(bytes = bytes.len(), "Feed bytes received, parsing");
    let vehicles = parse_vehicles(&bytes)?;
    debug!(vehicles = vehicles.len(), "Feed parsed");
    Ok(vehicles)
}
