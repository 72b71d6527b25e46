use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use common::clock::ManualClock;
use market::types::{Instrument, Notification};
use notifier::admission::{Admission, AdmissionController};
use notifier::error::NotifyError;
use notifier::quota::QuotaLimits;
use notifier::sink::NotifySink;

/// Records every delivery attempt; optionally fails them all.
struct RecordingSink {
    attempts: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingSink {
    fn new(fail: bool) -> Arc<Self> {
        Arc::new(Self {
            attempts: Mutex::new(Vec::new()),
            fail,
        })
    }

    fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotifySink for RecordingSink {
    async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.attempts.lock().unwrap().push(notification.body.clone());
        if self.fail {
            return Err(NotifyError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR));
        }
        Ok(())
    }
}

fn start() -> DateTime<Utc> {
    // Anchored to second zero so minute-boundary waits are exact.
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

fn note(body: &str) -> Notification {
    Notification {
        instrument: Instrument::new("btcusdt"),
        body: body.to_string(),
    }
}

/// Yield until the sink has seen `n` attempts or the patience runs out.
///
/// Time is paused in these tests, so each sleep advances fake time far
/// enough for the drain loop's minute-boundary timer to elapse.
async fn wait_for_attempts(sink: &RecordingSink, n: usize) {
    for _ in 0..200 {
        if sink.attempts().len() >= n {
            return;
        }
        tokio::time::sleep(StdDuration::from_secs(1)).await;
    }
}

#[tokio::test(start_paused = true)]
async fn fourth_request_is_deferred_then_drained_after_the_minute() {
    let sink = RecordingSink::new(false);
    let clock = Arc::new(ManualClock::new(start()));
    let (controller, pending_rx) =
        AdmissionController::new(Arc::clone(&sink), clock.clone(), QuotaLimits::default());

    tokio::spawn(Arc::clone(&controller).run_drain_loop(pending_rx));

    for i in 0..3 {
        let admission = controller.request(note(&format!("n{i}"))).await;
        assert_eq!(admission, Admission::Admitted);
    }
    assert_eq!(controller.request(note("n3")).await, Admission::Deferred);

    wait_for_attempts(&sink, 3).await;
    assert_eq!(sink.attempts().len(), 3);

    // Minute boundary passes; the queued item is delivered under the new
    // window's quota.
    clock.advance(Duration::seconds(61));
    wait_for_attempts(&sink, 4).await;

    let attempts = sink.attempts();
    assert_eq!(attempts.len(), 4);
    assert_eq!(attempts[3], "n3");

    let quota = controller.quota_snapshot().await;
    assert_eq!(quota.minute_sent(), 1);
    assert_eq!(quota.day_sent(), 4);
}

#[tokio::test(start_paused = true)]
async fn delivery_failure_still_consumes_quota_exactly_once() {
    let sink = RecordingSink::new(true);
    let clock = Arc::new(ManualClock::new(start()));
    let (controller, _pending_rx) =
        AdmissionController::new(Arc::clone(&sink), clock, QuotaLimits::default());

    assert_eq!(controller.request(note("boom")).await, Admission::Admitted);

    wait_for_attempts(&sink, 1).await;
    assert_eq!(sink.attempts().len(), 1);

    let quota = controller.quota_snapshot().await;
    assert_eq!(quota.minute_sent(), 1);
    assert_eq!(quota.day_sent(), 1);
}

#[tokio::test(start_paused = true)]
async fn deferred_notifications_drain_in_arrival_order() {
    let sink = RecordingSink::new(false);
    let clock = Arc::new(ManualClock::new(start()));
    let limits = QuotaLimits {
        per_minute: 1,
        per_day: 200,
    };
    let (controller, pending_rx) =
        AdmissionController::new(Arc::clone(&sink), clock.clone(), limits);

    tokio::spawn(Arc::clone(&controller).run_drain_loop(pending_rx));

    assert_eq!(controller.request(note("first")).await, Admission::Admitted);
    assert_eq!(controller.request(note("second")).await, Admission::Deferred);
    assert_eq!(controller.request(note("third")).await, Admission::Deferred);

    // Each minute window admits one more item off the queue.
    for expected in [2usize, 3] {
        clock.advance(Duration::seconds(61));
        wait_for_attempts(&sink, expected).await;
    }

    assert_eq!(sink.attempts(), vec!["first", "second", "third"]);
}

#[tokio::test(start_paused = true)]
async fn day_cap_defers_even_with_minute_headroom() {
    let sink = RecordingSink::new(false);
    let clock = Arc::new(ManualClock::new(start()));
    let limits = QuotaLimits {
        per_minute: 10,
        per_day: 1,
    };
    let (controller, _pending_rx) =
        AdmissionController::new(Arc::clone(&sink), clock, limits);

    assert_eq!(controller.request(note("ok")).await, Admission::Admitted);
    assert_eq!(controller.request(note("over")).await, Admission::Deferred);

    wait_for_attempts(&sink, 1).await;
    assert_eq!(sink.attempts(), vec!["ok"]);
}
