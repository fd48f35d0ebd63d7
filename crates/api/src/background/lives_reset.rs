//! Periodic rollover of daily lives.
//!
//! Lives are also reset lazily when a learner touches them on a new day; this
//! job brings every stale record up to date so reads never see yesterday's
//! count. The bulk update only touches rows whose reset date is before today,
//! so running it many times a day is harmless.

use std::sync::Arc;
use std::time::Duration;

use lingo_core::store::DailyLivesStore;
use lingo_core::usecases::lives::ResetAllLives;
use tokio_util::sync::CancellationToken;

/// Run the reset loop until `cancel` is triggered.
///
/// The first tick fires immediately, so a freshly started server catches up
/// on any rollover it missed while down.
pub async fn run(lives: Arc<dyn DailyLivesStore>, every: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = every.as_secs(), "Lives reset job started");

    let reset_all = ResetAllLives::new(lives);
    let mut interval = tokio::time::interval(every);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Lives reset job stopping");
                break;
            }
            _ = interval.tick() => {
                match reset_all.execute().await {
                    Ok(reset) => {
                        if reset > 0 {
                            tracing::info!(reset, "Lives reset: refilled stale records");
                        } else {
                            tracing::debug!("Lives reset: nothing to refill");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Lives reset: bulk update failed");
                    }
                }
            }
        }
    }
}
