use crate::utils::error::{Result, SyncError};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

pub fn build_client(timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(concat!("character-sync/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// GET `url` and decode the JSON body, aborting as soon as `cancel` fires.
pub async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    cancel: &CancellationToken,
) -> Result<T> {
    if cancel.is_cancelled() {
        return Err(SyncError::Cancelled);
    }

    tracing::debug!("GET {}", url);
    let request = async {
        let response = client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::UpstreamStatusError {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok::<T, SyncError>(response.json::<T>().await?)
    };

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(SyncError::Cancelled),
        result = request => result,
    }
}
