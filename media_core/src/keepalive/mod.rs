//! Periodic datastore keep-alive.
//!
//! Some hosting tiers drop idle database connections; a low-frequency
//! count query keeps the link warm. The task is a single timer with an
//! explicit Idle → Running → Idle lifecycle; `start` is idempotent and
//! `stop` cancels outright.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use sqlx::SqlitePool;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Outcome of one liveness probe. Both branches produce this shape;
/// nothing is thrown at callers.
#[derive(Debug, Clone, Serialize)]
pub struct PingReport {
    pub success: bool,
    pub duration_ms: u64,
    pub count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

pub struct KeepAlive {
    pool: SqlitePool,
    interval: Duration,
    running: AtomicBool,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl KeepAlive {
    pub fn new(pool: SqlitePool, interval_seconds: u64) -> Self {
        Self {
            pool,
            interval: Duration::from_secs(interval_seconds),
            running: AtomicBool::new(false),
            handle: Mutex::new(None),
        }
    }

    /// Spawns the recurring ping task. Calling `start` while the task
    /// is already running is a logged no-op.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Keep-alive already running, ignoring start");
            return;
        }

        info!(interval_secs = self.interval.as_secs(), "Starting keep-alive task");

        let pool = self.pool.clone();
        let interval = self.interval;
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let report = ping_pool(&pool).await;
                if report.success {
                    info!(
                        duration_ms = report.duration_ms,
                        count = report.count,
                        "Keep-alive ping succeeded"
                    );
                } else {
                    warn!(
                        duration_ms = report.duration_ms,
                        error = report.error.as_deref(),
                        "Keep-alive ping failed"
                    );
                }
            }
        });

        *self.handle.lock() = Some(handle);
    }

    /// Cancels the timer and returns to Idle.
    pub fn stop(&self) {
        if let Some(handle) = self.handle.lock().take() {
            handle.abort();
            info!("Keep-alive task stopped");
        }
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// One liveness probe on demand.
    pub async fn ping(&self) -> PingReport {
        ping_pool(&self.pool).await
    }
}

/// A lightweight count against the catalog, so the probe works
/// regardless of application schema.
async fn ping_pool(pool: &SqlitePool) -> PingReport {
    let start = Instant::now();

    match sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sqlite_master")
        .fetch_one(pool)
        .await
    {
        Ok(count) => PingReport {
            success: true,
            duration_ms: start.elapsed().as_millis() as u64,
            count: Some(count),
            error: None,
            timestamp: Utc::now(),
        },
        Err(e) => {
            error!("Keep-alive query failed: {}", e);
            PingReport {
                success: false,
                duration_ms: start.elapsed().as_millis() as u64,
                count: None,
                error: Some(e.to_string()),
                timestamp: Utc::now(),
            }
        }
    }
}

impl Drop for KeepAlive {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.lock().take() {
            handle.abort();
        }
    }
}
