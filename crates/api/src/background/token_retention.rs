//! Periodic cleanup of expired e-mail tokens.
//!
//! Tokens are also collected per user whenever a new one is issued; this job
//! catches rows for users who never come back.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::identity::IdentityService;

/// Run the token retention loop until `cancel` is triggered.
///
/// The first sweep happens immediately.
pub async fn run(identity: Arc<IdentityService>, every: Duration, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = every.as_secs(),
        "Token retention job started"
    );

    let mut interval = tokio::time::interval(every);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Token retention job stopping");
                break;
            }
            _ = interval.tick() => {
                match identity.tokens().purge_expired().await {
                    Ok(deleted) if deleted > 0 => {
                        tracing::info!(deleted, "Token retention: purged expired rows");
                    }
                    Ok(_) => tracing::debug!("Token retention: no rows to purge"),
                    Err(e) => {
                        tracing::error!(error = %e, "Token retention: cleanup failed");
                    }
                }
            }
        }
    }
}
