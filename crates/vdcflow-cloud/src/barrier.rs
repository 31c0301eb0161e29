//! Availability barrier
//!
//! Every mutating call is followed by a wait until the touched resources
//! report `AVAILABLE` again; the remote API rejects changes to busy
//! resources.

use crate::api::CloudApi;
use crate::error::{CloudError, Result};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, instrument};

/// Polling interval between rounds
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Maximum number of polling rounds
pub const DEFAULT_MAX_ATTEMPTS: u32 = 120;

/// Barrier settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarrierConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for BarrierConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Blocks until a set of resources is available
pub struct AvailabilityBarrier<'a> {
    api: &'a dyn CloudApi,
    config: BarrierConfig,
}

impl<'a> AvailabilityBarrier<'a> {
    pub fn new(api: &'a dyn CloudApi, config: BarrierConfig) -> Self {
        Self { api, config }
    }

    pub fn config(&self) -> BarrierConfig {
        self.config
    }

    /// Poll every href once per round until all of them are `AVAILABLE`
    ///
    /// Sleeps `interval` between rounds (never before the first or after the
    /// last) and fails with `Timeout` once `max_attempts` rounds are spent.
    #[instrument(skip(self))]
    pub async fn await_available(&self, hrefs: &[String]) -> Result<()> {
        let attempts = self.config.max_attempts.max(1);
        let mut pending = Vec::new();

        for attempt in 0..attempts {
            pending.clear();
            for href in hrefs {
                let state = self.api.get(href).await?.state();
                if !state.is_available() {
                    debug!(%href, %state, attempt, "Not available yet");
                    pending.push(href.clone());
                }
            }

            if pending.is_empty() {
                return Ok(());
            }

            if attempt + 1 < attempts {
                sleep(self.config.interval).await;
            }
        }

        Err(CloudError::Timeout { pending, attempts })
    }
}
