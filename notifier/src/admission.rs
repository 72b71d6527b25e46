//! Notification admission control.
//!
//! All quota mutation happens behind one mutex inside the controller; the
//! pending queue is an unbounded channel whose sole consumer is the drain
//! loop. Detector ticks and the drain loop both funnel through the same
//! admission check.

use std::sync::Arc;
use std::time::Duration;

use chrono::Timelike;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, error, info, warn};

use common::clock::Clock;
use market::types::Notification;

use crate::quota::{QuotaLimits, QuotaState};
use crate::sink::NotifySink;

/// Outcome of an admission request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Admission {
    /// Quota consumed; delivery handed to the sink.
    Admitted,
    /// Quota exhausted; notification parked on the pending FIFO.
    Deferred,
}

/// Receiver half of the pending FIFO, owned by the drain loop.
pub type PendingReceiver = mpsc::UnboundedReceiver<Notification>;

/// Gatekeeper between the change detector and the notification sink.
pub struct AdmissionController<S> {
    quota: Mutex<QuotaState>,
    limits: QuotaLimits,
    sink: Arc<S>,
    clock: Arc<dyn Clock>,
    pending_tx: mpsc::UnboundedSender<Notification>,
}

impl<S: NotifySink> AdmissionController<S> {
    pub fn new(
        sink: Arc<S>,
        clock: Arc<dyn Clock>,
        limits: QuotaLimits,
    ) -> (Arc<Self>, PendingReceiver) {
        let (pending_tx, pending_rx) = mpsc::unbounded_channel();
        let quota = Mutex::new(QuotaState::new(clock.now_utc()));

        let controller = Arc::new(Self {
            quota,
            limits,
            sink,
            clock,
            pending_tx,
        });

        (controller, pending_rx)
    }

    /// Admit or defer one notification. Deferred notifications are retried
    /// later by the drain loop; nothing is dropped.
    pub async fn request(&self, notification: Notification) -> Admission {
        if self.try_admit().await {
            self.dispatch(notification);
            return Admission::Admitted;
        }

        info!(
            instrument = %notification.instrument,
            "notification quota reached; deferring"
        );
        if self.pending_tx.send(notification).is_err() {
            // Only possible when the drain loop is gone during shutdown.
            warn!("pending queue closed; notification dropped");
        }
        Admission::Deferred
    }

    /// Current quota counters, for observability and tests.
    pub async fn quota_snapshot(&self) -> QuotaState {
        self.quota.lock().await.clone()
    }

    /// Refresh the quota windows and consume one slot if available.
    async fn try_admit(&self) -> bool {
        let now = self.clock.now_utc();
        let mut quota = self.quota.lock().await;
        quota.refresh(now);

        if !quota.has_headroom(&self.limits) {
            return false;
        }
        quota.consume();
        true
    }

    /// Hand a notification to the sink on its own task so a slow or hung
    /// delivery never blocks tick processing. Quota was consumed at
    /// admission, so a failed attempt is accounted like a successful one.
    fn dispatch(&self, notification: Notification) {
        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            match sink.deliver(&notification).await {
                Ok(()) => info!(instrument = %notification.instrument, "notification sent"),
                Err(e) => error!(
                    instrument = %notification.instrument,
                    error = %e,
                    "notification delivery failed"
                ),
            }
        });
    }

    /// Drains deferred notifications in arrival order.
    ///
    /// An item is only submitted once quota has headroom again; while
    /// exhausted the loop sleeps to the next minute boundary and re-checks.
    /// Items are never re-queued behind themselves, so FIFO order holds and
    /// the loop cannot livelock against its own output.
    pub async fn run_drain_loop(self: Arc<Self>, mut pending_rx: PendingReceiver) {
        while let Some(notification) = pending_rx.recv().await {
            loop {
                if self.try_admit().await {
                    debug!(
                        instrument = %notification.instrument,
                        "deferred notification admitted"
                    );
                    self.dispatch(notification);
                    break;
                }

                let wait = self.seconds_to_next_minute();
                debug!(wait_s = wait, "quota still exhausted; waiting for the next minute");
                tokio::time::sleep(Duration::from_secs(wait)).await;
            }
        }

        debug!("pending queue closed; drain loop stopping");
    }

    fn seconds_to_next_minute(&self) -> u64 {
        u64::from(60 - self.clock.now_utc().second())
    }
}
