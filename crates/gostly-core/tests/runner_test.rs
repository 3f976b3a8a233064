#![allow(clippy::unwrap_used)]
// Runner scheduling tests. Time is paused; no network is involved.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use gostly_core::{
    ApiError, Config, CoreError, Runner, ServerConfig, ServiceConfig, Session, Task, TaskEvent,
    TaskId,
};

// ── Helpers ─────────────────────────────────────────────────────────

/// Counts runs, optionally failing or taking a while.
#[derive(Clone, Default)]
struct Probe {
    runs: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    fail: bool,
    work: Duration,
}

impl Probe {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn slow(work: Duration) -> Self {
        Self {
            work,
            ..Self::default()
        }
    }

    fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

impl Task for Probe {
    fn id(&self) -> TaskId {
        TaskId::Custom("probe")
    }

    async fn run(&self, _session: &Session) -> Result<(), CoreError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.runs.fetch_add(1, Ordering::SeqCst);

        if !self.work.is_zero() {
            tokio::time::sleep(self.work).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail {
            Err(ApiError::Api {
                status: 500,
                code: 500,
                message: "boom".into(),
            }
            .into())
        } else {
            Ok(())
        }
    }
}

fn drain(rx: &mut broadcast::Receiver<TaskEvent>) -> Vec<TaskEvent> {
    let mut out = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        out.push(ev);
    }
    out
}

// ── Periodic execution ──────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn failing_periodic_task_keeps_ticking() {
    let runner = Runner::new(Session::default());
    let mut rx = runner.subscribe();
    let probe = Probe::failing();
    let cancel = CancellationToken::new();

    let handle = runner.exec_async(probe.clone(), Duration::from_millis(100), cancel.clone());
    tokio::time::sleep(Duration::from_millis(450)).await;

    // Runs at 0, 100, 200, 300 and 400 ms.
    let events = drain(&mut rx);
    assert_eq!(events.len(), 5);
    assert!(events.iter().all(|e| e.task == TaskId::Custom("probe")));
    assert!(events.iter().all(|e| !e.is_ok()));

    cancel.cancel();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn cancellation_stops_further_runs() {
    let runner = Runner::new(Session::default());
    let mut rx = runner.subscribe();
    let probe = Probe::default();
    let cancel = CancellationToken::new();

    let handle = runner.exec_async(probe.clone(), Duration::from_millis(100), cancel.clone());
    tokio::time::sleep(Duration::from_millis(250)).await;
    let before = probe.runs();

    cancel.cancel();
    handle.await.unwrap();
    let after_cancel = probe.runs();
    assert!(after_cancel <= before + 1);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(probe.runs(), after_cancel);
    assert_eq!(drain(&mut rx).len(), after_cancel);
}

#[tokio::test(start_paused = true)]
async fn already_cancelled_token_runs_nothing() {
    let runner = Runner::new(Session::default());
    let probe = Probe::default();
    let cancel = CancellationToken::new();
    cancel.cancel();

    runner
        .exec_async(probe.clone(), Duration::from_millis(100), cancel)
        .await
        .unwrap();

    assert_eq!(probe.runs(), 0);
}

#[tokio::test(start_paused = true)]
async fn runs_never_overlap() {
    let runner = Runner::new(Session::default());
    let probe = Probe::slow(Duration::from_millis(250));
    let cancel = CancellationToken::new();

    let handle = runner.exec_async(probe.clone(), Duration::from_millis(100), cancel.clone());
    tokio::time::sleep(Duration::from_secs(1)).await;
    cancel.cancel();
    handle.await.unwrap();

    assert!(probe.runs() >= 2);
    assert_eq!(probe.max_in_flight.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn run_cut_short_by_cancel_publishes_nothing() {
    let runner = Runner::new(Session::default());
    let mut rx = runner.subscribe();
    let probe = Probe::slow(Duration::from_millis(500));
    let cancel = CancellationToken::new();

    let handle = runner.exec_async(probe.clone(), Duration::from_millis(100), cancel.clone());
    tokio::time::sleep(Duration::from_millis(200)).await;
    cancel.cancel();
    handle.await.unwrap();

    assert_eq!(probe.runs(), 1);
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test(start_paused = true)]
async fn zero_interval_runs_once() {
    let runner = Runner::new(Session::default());
    let mut rx = runner.subscribe();
    let probe = Probe::default();

    runner
        .exec_async(probe.clone(), Duration::ZERO, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(probe.runs(), 1);
    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    assert!(events[0].is_ok());
}

// ── One-shot execution ──────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn exec_returns_and_publishes_the_error() {
    let runner = Runner::new(Session::default());
    let mut rx = runner.subscribe();

    let err = runner
        .exec(&Probe::failing(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "500 boom");

    let event = rx.recv().await.unwrap();
    assert_eq!(event.task, TaskId::Custom("probe"));
    assert_eq!(event.error.unwrap().to_string(), "500 boom");
}

#[tokio::test(start_paused = true)]
async fn exec_without_subscribers_still_succeeds() {
    let runner = Runner::new(Session::default());
    runner
        .exec(&Probe::default(), &CancellationToken::new())
        .await
        .unwrap();
}

#[tokio::test(start_paused = true)]
async fn exec_is_abandoned_on_cancel() {
    let runner = Runner::new(Session::default());
    let mut rx = runner.subscribe();
    let cancel = CancellationToken::new();

    let slow = Probe::slow(Duration::from_secs(60));
    let run = {
        let runner = runner.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { runner.exec(&slow, &cancel).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    cancel.cancel();

    let err = run.await.unwrap().unwrap_err();
    assert!(err.is_cancelled());
    assert!(rx.recv().await.unwrap().error.unwrap().is_cancelled());
}

#[tokio::test(start_paused = true)]
async fn slow_subscriber_observes_lag() {
    let runner = Runner::new(Session::default());
    let mut rx = runner.subscribe();
    let probe = Probe::default();

    for _ in 0..gostly_core::EVENT_CHANNEL_SIZE + 4 {
        runner.exec(&probe, &CancellationToken::new()).await.unwrap();
    }

    assert!(matches!(
        rx.recv().await,
        Err(broadcast::error::RecvError::Lagged(4))
    ));
}

// ── Poll replacement ────────────────────────────────────────────────

/// A run whose last stretch is blocking work after its final await, so an
/// abort cannot interrupt it. At the end it installs a stale snapshot.
#[derive(Clone, Default)]
struct BlockingTail {
    started: Arc<AtomicUsize>,
    finished: Arc<AtomicUsize>,
}

impl BlockingTail {
    const TAIL: Duration = Duration::from_millis(200);

    async fn wait_until_started(&self) {
        while self.started.load(Ordering::SeqCst) == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

impl Task for BlockingTail {
    fn id(&self) -> TaskId {
        TaskId::Custom("blocking_tail")
    }

    async fn run(&self, session: &Session) -> Result<(), CoreError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(Self::TAIL);
        session.install_config(Config {
            services: vec![ServiceConfig {
                name: "stale".into(),
                ..ServiceConfig::default()
            }],
            ..Config::default()
        });
        self.finished.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stop_polling_waits_for_the_running_poll() {
    let runner = Runner::new(Session::default());
    let task = BlockingTail::default();

    runner
        .start_polling(task.clone(), Duration::from_secs(60))
        .await;
    task.wait_until_started().await;

    runner.stop_polling().await;

    assert_eq!(task.finished.load(Ordering::SeqCst), 1);
    assert!(!runner.is_polling().await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn switch_server_mid_run_leaves_no_stale_snapshot() {
    let runner = Runner::new(Session::default());
    let task = BlockingTail::default();

    runner
        .start_polling(task.clone(), Duration::from_secs(60))
        .await;
    task.wait_until_started().await;

    // Empty URL: the new poll runs against the no-op client.
    let next = ServerConfig {
        interval: Duration::from_secs(60),
        ..ServerConfig::default()
    };
    runner.switch_server(&next).await.unwrap();

    assert_eq!(task.finished.load(Ordering::SeqCst), 1);
    assert!(runner.session().config().services.is_empty());

    // Nothing from the old poll lands later either.
    tokio::time::sleep(BlockingTail::TAIL * 2).await;
    assert!(runner.session().config().services.is_empty());
    assert!(runner.is_polling().await);

    runner.stop_polling().await;
}
