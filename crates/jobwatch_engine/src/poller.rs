use std::sync::Arc;
use std::time::Duration;

use jobwatch_core::{
    update, DisplayZone, Effect, JobHandle, Lifecycle, Msg, PollView, PollerState, ProgressSnapshot,
};
use jobwatch_logging::{watch_debug, watch_info, watch_warn};
use tokio::sync::{mpsc, watch};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{PollerError, StatusClient};

/// Callbacks for the view that owns a poller.
pub trait PollObserver: Send + Sync {
    /// The job reached `completed` or `failed`. Called at most once per handle.
    fn on_complete(&self, snapshot: &ProgressSnapshot);
    /// The view should go away. Called at most once per poller.
    fn on_close(&self);
}

#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    pub interval: Duration,
    pub zone: DisplayZone,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1000),
            zone: DisplayZone::default(),
        }
    }
}

enum PollerCommand {
    SwitchHandle(JobHandle),
    Close,
}

/// Owns the timer task for one watched job.
///
/// Dropping the poller stops it without invoking any callback.
pub struct ProgressPoller {
    cmd_tx: mpsc::UnboundedSender<PollerCommand>,
    view_rx: watch::Receiver<PollView>,
    cancel: CancellationToken,
}

impl ProgressPoller {
    /// Spawns the poll task on the current tokio runtime.
    ///
    /// Fails with [`PollerError::InvalidInterval`] for a zero interval.
    pub fn start(
        client: Arc<dyn StatusClient>,
        handle: JobHandle,
        settings: PollSettings,
        observer: Arc<dyn PollObserver>,
    ) -> Result<Self, PollerError> {
        if settings.interval.is_zero() {
            return Err(PollerError::InvalidInterval);
        }
        let state = PollerState::new(handle, settings.zone);
        let (view_tx, view_rx) = watch::channel(state.view());
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        watch_info!(
            "Polling job {} every {:?}",
            state.handle(),
            settings.interval
        );
        let task = PollTask {
            client,
            observer,
            view_tx,
            cancel: cancel.clone(),
            interval: settings.interval,
        };
        tokio::spawn(task.run(state, cmd_rx));

        Ok(Self {
            cmd_tx,
            view_rx,
            cancel,
        })
    }

    /// Stops the timer without notifying the observer. Safe to call repeatedly.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// User dismissal: invokes `on_close` once, then stops.
    pub fn close(&self) {
        // A stopped task has nobody to notify.
        let _ = self.cmd_tx.send(PollerCommand::Close);
    }

    /// Watches a different job, discarding everything known about the current one.
    pub fn switch_handle(&self, handle: JobHandle) -> Result<(), PollerError> {
        if self.cancel.is_cancelled() {
            return Err(PollerError::Stopped);
        }
        self.cmd_tx
            .send(PollerCommand::SwitchHandle(handle))
            .map_err(|_| PollerError::Stopped)
    }

    pub fn subscribe(&self) -> watch::Receiver<PollView> {
        self.view_rx.clone()
    }

    pub fn view(&self) -> PollView {
        self.view_rx.borrow().clone()
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves once the poller has been stopped or closed.
    pub async fn stopped(&self) {
        self.cancel.cancelled().await;
    }
}

impl Drop for ProgressPoller {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct PollTask {
    client: Arc<dyn StatusClient>,
    observer: Arc<dyn PollObserver>,
    view_tx: watch::Sender<PollView>,
    cancel: CancellationToken,
    interval: Duration,
}

impl PollTask {
    async fn run(self, mut state: PollerState, mut cmd_rx: mpsc::UnboundedReceiver<PollerCommand>) {
        // Every exit path, including a panic in an observer, cancels the token.
        let _exit = self.cancel.clone().drop_guard();
        let (result_tx, mut result_rx) = mpsc::unbounded_channel::<Msg>();
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let msg = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                command = cmd_rx.recv() => match command {
                    Some(PollerCommand::SwitchHandle(handle)) => Msg::HandleChanged(handle),
                    Some(PollerCommand::Close) => Msg::CloseRequested,
                    None => break,
                },
                Some(msg) = result_rx.recv() => msg,
                _ = ticker.tick(), if state.lifecycle() == Lifecycle::Polling => Msg::Tick,
            };

            let switching = matches!(msg, Msg::HandleChanged(_));
            if let Msg::FetchSucceeded {
                handle, snapshot, ..
            } = &msg
            {
                if handle == state.handle() && snapshot.items_history.len() < state.history_cursor()
                {
                    watch_warn!(
                        "Job {} history shrank from {} to {} entries",
                        handle,
                        state.history_cursor(),
                        snapshot.items_history.len()
                    );
                }
            }

            let (next, effects) = update(state, msg);
            state = next;
            if switching {
                watch_info!("Switched to job {}", state.handle());
                ticker.reset();
            }
            // Observers see the view that caused their notification.
            if state.consume_dirty() {
                self.view_tx.send_replace(state.view());
            }
            for effect in effects {
                self.execute(effect, &result_tx);
            }
            if state.lifecycle() == Lifecycle::Closed {
                break;
            }
        }
        watch_debug!("Poll task for job {} exited", state.handle());
    }

    fn execute(&self, effect: Effect, result_tx: &mpsc::UnboundedSender<Msg>) {
        match effect {
            Effect::FetchStatus { handle, seq } => {
                let client = self.client.clone();
                let result_tx = result_tx.clone();
                // Ticks do not wait for earlier fetches; the state machine orders results by seq.
                tokio::spawn(async move {
                    let msg = match client.fetch_progress(&handle).await {
                        Ok(snapshot) => Msg::FetchSucceeded {
                            handle,
                            seq,
                            snapshot,
                        },
                        Err(err) => {
                            watch_debug!("Progress fetch {} for job {} failed: {}", seq, handle, err);
                            Msg::FetchFailed {
                                handle,
                                seq,
                                failure: err.to_failure(),
                            }
                        }
                    };
                    // The task may be gone already; late results are dropped.
                    let _ = result_tx.send(msg);
                });
            }
            Effect::NotifyComplete(snapshot) => {
                watch_info!(
                    "Job finished with status {:?}: {} of {} succeeded",
                    snapshot.status,
                    snapshot.success_count,
                    snapshot.attempted()
                );
                self.observer.on_complete(&snapshot);
            }
            Effect::NotifyClose => {
                watch_info!("Closing progress view");
                self.observer.on_close();
            }
        }
    }
}
