use hubsnap_common::error::{HubError, Result};
use hubsnap_common::model::HubIdentity;
use tracing::debug;

use crate::http::HubClient;

/// Looks up the account the configured token belongs to.
pub async fn whoami(client: &HubClient) -> Result<HubIdentity> {
    let url = client.whoami_url()?;
    let body = client.get(url).await?.bytes().await?;
    let identity: HubIdentity = serde_json::from_slice(&body)
        .map_err(|e| HubError::Parse(format!("Unexpected whoami response: {e}")))?;
    debug!("Authenticated as {}", identity.name);
    Ok(identity)
}
