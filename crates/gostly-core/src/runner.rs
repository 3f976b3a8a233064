// ── Task runner ──
//
// Executes tasks once or periodically and broadcasts one `TaskEvent` per
// run. Owns the config polling loop and restarts it on server switch.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::ServerConfig;
use crate::error::CoreError;
use crate::session::Session;
use crate::task::{RefreshConfig, Task, TaskId};

/// Capacity of the event broadcast. Slow subscribers lose the oldest
/// events and observe `RecvError::Lagged`.
pub const EVENT_CHANNEL_SIZE: usize = 16;

/// Outcome of one task run.
#[derive(Debug, Clone)]
pub struct TaskEvent {
    pub task: TaskId,
    pub error: Option<CoreError>,
}

impl TaskEvent {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Drives tasks against a [`Session`].
///
/// Cheaply cloneable; all clones share the session, the event channel
/// and the polling slot.
#[derive(Clone)]
pub struct Runner {
    inner: Arc<RunnerInner>,
}

struct RunnerInner {
    session: Session,
    events: broadcast::Sender<TaskEvent>,
    poll: Mutex<Option<PollHandle>>,
}

struct PollHandle {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl PollHandle {
    fn signal(&self) {
        self.cancel.cancel();
        self.handle.abort();
    }

    /// Cancel the loop and wait for it to exit. An abort lands only at the
    /// next `.await`, so a run already past its last await finishes here,
    /// before the caller touches the session.
    async fn stop(self) {
        self.signal();
        let _ = self.handle.await;
    }
}

impl Runner {
    pub fn new(session: Session) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        Self {
            inner: Arc::new(RunnerInner {
                session,
                events,
                poll: Mutex::new(None),
            }),
        }
    }

    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    /// Subscribe to task outcomes published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<TaskEvent> {
        self.inner.events.subscribe()
    }

    // ── Execution ────────────────────────────────────────────────────

    /// Run `task` once, publish its outcome and return it.
    ///
    /// If `cancel` fires first the run is abandoned and the outcome is
    /// [`CoreError::Cancelled`].
    pub async fn exec<T: Task>(&self, task: &T, cancel: &CancellationToken) -> Result<(), CoreError> {
        run_and_publish(task, &self.inner.session, &self.inner.events, cancel).await
    }

    /// Run `task` now and then every `interval` until `cancel` fires.
    ///
    /// A zero `interval` runs the task exactly once. Runs never overlap:
    /// a run that outlasts the interval delays the next tick instead of
    /// queueing a burst. Failures are published and the loop continues.
    pub fn exec_async<T>(&self, task: T, interval: Duration, cancel: CancellationToken) -> JoinHandle<()>
    where
        T: Task + 'static,
    {
        let session = self.inner.session.clone();
        let events = self.inner.events.clone();

        tokio::spawn(async move {
            if cancel.is_cancelled() {
                return;
            }
            run_periodic(&task, &session, &events, &cancel).await;
            if interval.is_zero() {
                return;
            }

            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await; // consume the immediate first tick

            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    _ = ticker.tick() => run_periodic(&task, &session, &events, &cancel).await,
                }
            }
            debug!(task = %task.id(), "periodic task stopped");
        })
    }

    // ── Config polling ───────────────────────────────────────────────

    /// Point the session at `server` and restart config polling.
    ///
    /// The previous poll is stopped and joined before the client is
    /// swapped, and the snapshot is cleared so nothing from the old server
    /// survives.
    pub async fn switch_server(&self, server: &ServerConfig) -> Result<(), CoreError> {
        let client = server.build_client()?;

        let mut poll = self.inner.poll.lock().await;
        if let Some(old) = poll.take() {
            old.stop().await;
        }

        self.inner.session.set_client(client);
        self.inner.session.clear_config();

        *poll = Some(self.spawn_poll(RefreshConfig, server.interval));

        info!(
            server = %server.name,
            url = %server.url,
            interval = ?server.interval,
            "polling server"
        );
        Ok(())
    }

    /// Make `task` the runner's poll, replacing (and joining) any previous
    /// one. The session is left as is.
    pub async fn start_polling<T>(&self, task: T, interval: Duration)
    where
        T: Task + 'static,
    {
        let mut poll = self.inner.poll.lock().await;
        if let Some(old) = poll.take() {
            old.stop().await;
        }
        *poll = Some(self.spawn_poll(task, interval));
    }

    /// Stop polling, if running. Returns once the poll loop has exited.
    pub async fn stop_polling(&self) {
        let old = self.inner.poll.lock().await.take();
        if let Some(old) = old {
            old.stop().await;
            debug!("polling stopped");
        }
    }

    fn spawn_poll<T: Task + 'static>(&self, task: T, interval: Duration) -> PollHandle {
        let cancel = CancellationToken::new();
        let handle = self.exec_async(task, interval, cancel.clone());
        PollHandle { cancel, handle }
    }

    pub async fn is_polling(&self) -> bool {
        self.inner
            .poll
            .lock()
            .await
            .as_ref()
            .is_some_and(|p| !p.handle.is_finished())
    }
}

impl Drop for RunnerInner {
    fn drop(&mut self) {
        // No runtime to join on here; signal only.
        if let Some(poll) = self.poll.get_mut().take() {
            poll.signal();
        }
    }
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("session", &self.inner.session)
            .field("subscribers", &self.inner.events.receiver_count())
            .finish_non_exhaustive()
    }
}

async fn run_cancellable<T: Task>(
    task: &T,
    session: &Session,
    cancel: &CancellationToken,
) -> Result<(), CoreError> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(CoreError::Cancelled),
        r = task.run(session) => r,
    }
}

fn publish(events: &broadcast::Sender<TaskEvent>, task: TaskId, result: &Result<(), CoreError>) {
    // No subscribers is not an error.
    let _ = events.send(TaskEvent {
        task,
        error: result.as_ref().err().cloned(),
    });
}

async fn run_and_publish<T: Task>(
    task: &T,
    session: &Session,
    events: &broadcast::Sender<TaskEvent>,
    cancel: &CancellationToken,
) -> Result<(), CoreError> {
    let result = run_cancellable(task, session, cancel).await;
    publish(events, task.id(), &result);
    result
}

/// One periodic run. A run cut short by cancellation publishes nothing.
async fn run_periodic<T: Task>(
    task: &T,
    session: &Session,
    events: &broadcast::Sender<TaskEvent>,
    cancel: &CancellationToken,
) {
    let result = run_cancellable(task, session, cancel).await;
    if !matches!(result, Err(CoreError::Cancelled)) || !cancel.is_cancelled() {
        publish(events, task.id(), &result);
    }
}
