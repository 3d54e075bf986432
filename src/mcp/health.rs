//! API health state machine and prober handle (`spec.md` §4.G, §4.H)
//!
//! Tracks the `HEALTHY`/`DOWN` state and the single active prober task,
//! enforcing the invariants from `spec.md` §3: `proberActive ⇒ healthy =
//! false`, and at most one prober runs at any time.

use tokio::sync::Mutex;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// Interval between health-prober re-mint attempts while `DOWN`.
pub const HEALTH_CHECK_INTERVAL_MS: u64 = 5000;

/// Shared health state: the `healthy` flag plus the active prober's handle.
#[derive(Default)]
pub struct Health {
    healthy: RwLock<bool>,
    prober: Mutex<Option<JoinHandle<()>>>,
}

impl Health {
    pub fn new() -> Self {
        Self {
            healthy: RwLock::new(true),
            prober: Mutex::new(None),
        }
    }

    pub async fn is_healthy(&self) -> bool {
        *self.healthy.read().await
    }

    /// Transition to `DOWN`. Returns `true` if this call was the one that
    /// made the transition (i.e. the API was healthy beforehand), so the
    /// caller knows whether it is responsible for starting the prober.
    pub async fn mark_down(&self) -> bool {
        let mut healthy = self.healthy.write().await;
        let was_healthy = *healthy;
        *healthy = false;
        was_healthy
    }

    /// Transition to `HEALTHY`. Returns `true` if this call was the one
    /// that made the transition (i.e. the API was down beforehand).
    pub async fn mark_healthy(&self) -> bool {
        let mut healthy = self.healthy.write().await;
        let was_down = !*healthy;
        *healthy = true;
        was_down
    }

    /// Record the prober task's handle. Called once, right after spawning.
    pub async fn set_prober(&self, handle: JoinHandle<()>) {
        *self.prober.lock().await = Some(handle);
    }

    /// Abort the active prober (if any) and clear the slot. Called by a
    /// request-path success that brought the API back while the prober was
    /// still ticking.
    pub async fn abort_prober(&self) {
        if let Some(handle) = self.prober.lock().await.take() {
            handle.abort();
        }
    }

    /// Clear the prober slot without aborting. Called by the prober task
    /// itself right before it returns on its own success path.
    pub async fn clear_prober_slot(&self) {
        *self.prober.lock().await = None;
    }

    pub async fn prober_active(&self) -> bool {
        self.prober.lock().await.is_some()
    }
}
