use async_trait::async_trait;
use std::time::Duration;
use tracing::{info, warn};

use crate::models::ProbeOutcome;

/// Performs one availability check against one target.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, target: &str) -> ProbeOutcome;
}

/// Single HTTP GET per probe, 2xx is up. No retries.
pub struct HttpProber {
    client: reqwest::Client,
}

impl HttpProber {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Probe for HttpProber {
    async fn probe(&self, target: &str) -> ProbeOutcome {
        match self.client.get(target).send().await {
            Ok(resp) if resp.status().is_success() => {
                info!(url = target, status = %resp.status(), "Website is up");
                ProbeOutcome::Up
            }
            Ok(resp) => {
                let status = resp.status();
                warn!(url = target, status = %status, "Website is down");
                ProbeOutcome::Down(status.to_string())
            }
            Err(e) => {
                warn!(url = target, error = %e, "Website is down");
                ProbeOutcome::Down(e.to_string())
            }
        }
    }
}
