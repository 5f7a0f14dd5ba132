//! Mirror synchronization.
//!
//! A sync fetches the whole catalog from the remote store first, then
//! replaces the mirror content in one SQLite transaction. A failed fetch
//! leaves the previous mirror untouched; a failed load rolls back.
//!
//! The time of the last successful sync is stored in the mirror, so a
//! restarted process reuses a fresh mirror file instead of resyncing.
//!
//! When a stale mirror can be served, searches wait on a refresh only up to
//! a short timeout, and after a failed refresh they skip the remote store
//! entirely for a cooldown period.

use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::{Serialize, Serializer};
use spice_core::error::CoreError;
use spice_core::restaurant::Offering;
use spice_core::types::{DbId, Timestamp};
use spice_db::remote::RemoteStore;
use spice_db::repositories::MirrorRepo;
use spice_db::MirrorPool;
use tokio::sync::Mutex;

use crate::monitor::PerformanceMonitor;
use crate::{mirror_unavailable, remote_unavailable};

/// Default freshness threshold for the mirror (1 hour).
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(3600);

/// Default pause after a failed refresh before searches try again.
pub const DEFAULT_RETRY_COOLDOWN: Duration = Duration::from_secs(60);

/// Default wait on a refresh when stale data could be served instead.
pub const DEFAULT_STALE_REFRESH_TIMEOUT: Duration = Duration::from_secs(5);

/// Freshness and failure-handling knobs for a [`Synchronizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSettings {
    /// Mirror age after which a refresh is due.
    pub interval: Duration,
    /// How long after a failed refresh searches serve stale data without
    /// contacting the remote store.
    pub retry_cooldown: Duration,
    /// Longest a search waits on a due refresh when a stale mirror exists.
    pub stale_refresh_timeout: Duration,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_SYNC_INTERVAL,
            retry_cooldown: DEFAULT_RETRY_COOLDOWN,
            stale_refresh_timeout: DEFAULT_STALE_REFRESH_TIMEOUT,
        }
    }
}

impl SyncSettings {
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            ..Self::default()
        }
    }
}

/* --------------------------------------------------------------------------
Outcomes
-------------------------------------------------------------------------- */

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncResult {
    /// Restaurants plus offerings written to the mirror.
    pub rows_copied: u64,
    #[serde(rename = "duration_ms", serialize_with = "as_millis")]
    pub duration: Duration,
    pub timestamp: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncOutcome {
    Synced(SyncResult),
    UpToDate { last_synced_at: Timestamp },
}

/// Snapshot of the mirror's sync bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncStatus {
    pub last_synced_at: Option<Timestamp>,
    pub restaurants: i64,
    pub offerings: i64,
    pub refresh_due: bool,
    pub interval_secs: u64,
    /// Time of the last failed refresh, if it failed after the last success.
    pub last_failed_at: Option<Timestamp>,
    /// Seconds until searches contact the remote store again.
    pub retry_in_secs: Option<u64>,
}

fn as_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

/// Whether a mirror last synced at `last` needs a refresh at `now`.
///
/// A mirror that was never synced is always due. A timestamp in the future
/// (clock skew) counts as fresh.
pub fn refresh_due(last: Option<Timestamp>, now: Timestamp, interval: Duration) -> bool {
    match last {
        None => true,
        Some(last) => (now - last)
            .to_std()
            .is_ok_and(|elapsed| elapsed > interval),
    }
}

/* --------------------------------------------------------------------------
Synchronizer
-------------------------------------------------------------------------- */

/// Copies the remote catalog into the local mirror.
///
/// Created once at startup and shared behind an `Arc`. Syncs within one
/// process are serialized.
pub struct Synchronizer {
    remote: Arc<dyn RemoteStore>,
    mirror: MirrorPool,
    settings: SyncSettings,
    monitor: Arc<PerformanceMonitor>,
    lock: Mutex<()>,
    last_failure: StdMutex<Option<Failure>>,
}

#[derive(Debug, Clone, Copy)]
struct Failure {
    at: Instant,
    wall: Timestamp,
}

impl Synchronizer {
    pub fn new(
        remote: Arc<dyn RemoteStore>,
        mirror: MirrorPool,
        settings: SyncSettings,
        monitor: Arc<PerformanceMonitor>,
    ) -> Self {
        Self {
            remote,
            mirror,
            settings,
            monitor,
            lock: Mutex::new(()),
            last_failure: StdMutex::new(None),
        }
    }

    pub fn mirror(&self) -> &MirrorPool {
        &self.mirror
    }

    pub fn monitor(&self) -> &Arc<PerformanceMonitor> {
        &self.monitor
    }

    /// Refresh the mirror if forced, never synced, or older than the
    /// interval.
    ///
    /// A caller that waited on another sync re-checks freshness once it
    /// holds the lock, so a burst of requests triggers a single fetch.
    pub async fn sync(&self, force: bool) -> Result<SyncOutcome, CoreError> {
        if !force {
            if let Some(last_synced_at) = self.fresh_since().await? {
                return Ok(SyncOutcome::UpToDate { last_synced_at });
            }
        }

        let _guard = self.lock.lock().await;

        if !force {
            if let Some(last_synced_at) = self.fresh_since().await? {
                return Ok(SyncOutcome::UpToDate { last_synced_at });
            }
        }

        let result = self.monitor.measure("sync", self.run()).await;
        match &result {
            Ok(_) => self.set_failure(None),
            Err(_) => self.note_failure(),
        }
        result.map(SyncOutcome::Synced)
    }

    /// Make sure searches have a mirror to read.
    ///
    /// A mirror that was never synced waits for a sync and is an error if
    /// it fails. A stale mirror is refreshed unless a recent refresh failed;
    /// if the refresh fails or outlasts the stale-refresh timeout, the stale
    /// content is served with a warning.
    pub async fn ensure_ready(&self) -> Result<(), CoreError> {
        let Some(last_synced_at) = self.last_synced_at().await? else {
            return match self.sync(false).await {
                Ok(_) => Ok(()),
                Err(err) => Err(CoreError::MirrorUnavailable(format!(
                    "mirror has never been synced ({err})"
                ))),
            };
        };

        if !refresh_due(Some(last_synced_at), Utc::now(), self.settings.interval) {
            return Ok(());
        }

        if let Some(retry_in) = self.cooldown_remaining() {
            tracing::debug!(
                retry_in_secs = retry_in.as_secs(),
                last_synced_at = %last_synced_at,
                "Mirror refresh cooling down, serving stale data",
            );
            return Ok(());
        }

        let reason = match tokio::time::timeout(
            self.settings.stale_refresh_timeout,
            self.sync(false),
        )
        .await
        {
            Ok(Ok(_)) => return Ok(()),
            Ok(Err(err)) => err.to_string(),
            Err(_) => {
                self.note_failure();
                format!(
                    "refresh did not finish within {} ms",
                    self.settings.stale_refresh_timeout.as_millis()
                )
            }
        };

        tracing::warn!(
            error = %reason,
            last_synced_at = %last_synced_at,
            retry_in_secs = self.settings.retry_cooldown.as_secs(),
            "Mirror refresh failed, serving stale data",
        );
        Ok(())
    }

    pub async fn last_synced_at(&self) -> Result<Option<Timestamp>, CoreError> {
        Ok(MirrorRepo::sync_state(&self.mirror)
            .await
            .map_err(mirror_unavailable)?
            .map(|state| state.synced_at))
    }

    pub async fn status(&self) -> Result<SyncStatus, CoreError> {
        let state = MirrorRepo::sync_state(&self.mirror)
            .await
            .map_err(mirror_unavailable)?;
        let last_synced_at = state.as_ref().map(|s| s.synced_at);

        Ok(SyncStatus {
            last_synced_at,
            restaurants: state.as_ref().map_or(0, |s| s.restaurants),
            offerings: state.as_ref().map_or(0, |s| s.offerings),
            refresh_due: refresh_due(last_synced_at, Utc::now(), self.settings.interval),
            interval_secs: self.settings.interval.as_secs(),
            last_failed_at: self.failure().map(|f| f.wall),
            retry_in_secs: self
                .cooldown_remaining()
                .map(|d| d.as_secs_f64().ceil() as u64),
        })
    }

    /// The last sync time, if the mirror is still within the interval.
    async fn fresh_since(&self) -> Result<Option<Timestamp>, CoreError> {
        let last = self.last_synced_at().await?;
        if refresh_due(last, Utc::now(), self.settings.interval) {
            Ok(None)
        } else {
            Ok(last)
        }
    }

    fn failure(&self) -> Option<Failure> {
        *self.last_failure.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_failure(&self, failure: Option<Failure>) {
        *self.last_failure.lock().unwrap_or_else(PoisonError::into_inner) = failure;
    }

    fn note_failure(&self) {
        self.set_failure(Some(Failure {
            at: Instant::now(),
            wall: Utc::now(),
        }));
    }

    /// Time left in the post-failure cooldown, if one is running.
    fn cooldown_remaining(&self) -> Option<Duration> {
        let failure = self.failure()?;
        self.settings
            .retry_cooldown
            .checked_sub(failure.at.elapsed())
            .filter(|left| !left.is_zero())
    }

    async fn run(&self) -> Result<SyncResult, CoreError> {
        let start = Instant::now();
        tracing::info!("Mirror sync started");

        let catalog = self
            .remote
            .fetch_catalog()
            .await
            .map_err(remote_unavailable)?;

        let offerings: Vec<(DbId, Offering)> = catalog
            .offerings
            .iter()
            .filter_map(|row| match row.parse() {
                Ok(offering) => Some((row.restaurant_id, offering)),
                Err(err) => {
                    tracing::warn!(
                        restaurant_id = row.restaurant_id,
                        day = %row.day,
                        time_slot = %row.time_slot,
                        error = %err,
                        "Skipping offering with unrecognized day or time slot",
                    );
                    None
                }
            })
            .collect();

        let timestamp = Utc::now();
        let rows_copied =
            MirrorRepo::replace_snapshot(&self.mirror, &catalog.restaurants, &offerings, timestamp)
                .await
                .map_err(mirror_unavailable)?;

        let duration = start.elapsed();
        tracing::info!(
            restaurants = catalog.restaurants.len(),
            offerings = offerings.len(),
            rows_copied,
            duration_ms = duration.as_millis() as u64,
            "Mirror sync completed",
        );

        Ok(SyncResult {
            rows_copied,
            duration,
            timestamp,
        })
    }
}
