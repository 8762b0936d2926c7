use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use jobwatch_core::{JobHandle, JobStatus, ProgressSnapshot};
use jobwatch_engine::{PollObserver, ProgressPoller, ReqwestStatusClient};
use jobwatch_logging::{watch_info, watch_warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::AppConfig;
use crate::render::TerminalPrinter;

/// How a watch session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    Completed,
    Failed,
    /// Closed before a terminal status was seen: dismissed early, or swept server-side.
    Closed,
}

impl SessionOutcome {
    pub fn exit_code(self) -> ExitCode {
        match self {
            SessionOutcome::Completed | SessionOutcome::Closed => ExitCode::SUCCESS,
            SessionOutcome::Failed => ExitCode::FAILURE,
        }
    }
}

enum SessionEvent {
    Completed(JobStatus),
    Closed,
}

struct ChannelObserver {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl PollObserver for ChannelObserver {
    fn on_complete(&self, snapshot: &ProgressSnapshot) {
        let _ = self.tx.send(SessionEvent::Completed(snapshot.status));
    }

    fn on_close(&self) {
        let _ = self.tx.send(SessionEvent::Closed);
    }
}

/// Watches one job until it is closed, drawing every view change to stdout.
///
/// A finished job stays on screen until Enter is pressed, unless `wait_for_dismissal` is off.
/// Ctrl-C closes the view at any point.
pub async fn run(
    config: &AppConfig,
    handle: JobHandle,
    wait_for_dismissal: bool,
) -> anyhow::Result<SessionOutcome> {
    let client = ReqwestStatusClient::new(config.client_settings()?)
        .context("failed to build HTTP client")?;
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let poller = ProgressPoller::start(
        Arc::new(client),
        handle,
        config.poll_settings()?,
        Arc::new(ChannelObserver { tx: event_tx }),
    )?;

    let mut printer = TerminalPrinter::new(io::stdout());
    let mut views = poller.subscribe();
    let mut outcome = SessionOutcome::Closed;
    let mut dismissal: Option<JoinHandle<()>> = None;

    let mut interrupts = Interrupts::listen().context("failed to listen for Ctrl-C")?;

    let initial = views.borrow_and_update().clone();
    printer.draw(&initial)?;

    loop {
        tokio::select! {
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = views.borrow_and_update().clone();
                printer.draw(&view)?;
            }
            Some(event) = event_rx.recv() => match event {
                SessionEvent::Completed(status) => {
                    outcome = if status == JobStatus::Failed {
                        SessionOutcome::Failed
                    } else {
                        SessionOutcome::Completed
                    };
                    // The terminal view is published before the observer runs.
                    let view = views.borrow_and_update().clone();
                    printer.draw(&view)?;
                    if wait_for_dismissal {
                        printer.prompt("Press Enter to close.")?;
                        dismissal = Some(spawn_enter_reader());
                    } else {
                        poller.close();
                    }
                }
                SessionEvent::Closed => break,
            },
            () = wait_for(&mut dismissal) => {
                dismissal = None;
                poller.close();
            }
            () = interrupts.recv() => {
                watch_info!("Interrupted; closing");
                poller.close();
            }
        }
    }

    // Drain a final view published alongside the close.
    let last = views.borrow().clone();
    printer.draw(&last)?;
    Ok(outcome)
}

/// Ctrl-C listener registered once for the whole session.
///
/// Presses that arrive while the loop body runs are buffered until the next `recv`.
struct Interrupts {
    #[cfg(unix)]
    inner: tokio::signal::unix::Signal,
    #[cfg(windows)]
    inner: tokio::signal::windows::CtrlC,
}

impl Interrupts {
    fn listen() -> io::Result<Self> {
        #[cfg(unix)]
        let inner = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())?;
        #[cfg(windows)]
        let inner = tokio::signal::windows::ctrl_c()?;
        Ok(Self { inner })
    }

    async fn recv(&mut self) {
        if self.inner.recv().await.is_none() {
            watch_warn!("Ctrl-C listener closed");
            std::future::pending::<()>().await;
        }
    }
}

fn spawn_enter_reader() -> JoinHandle<()> {
    tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        if let Err(err) = io::stdin().read_line(&mut line) {
            watch_warn!("Could not read from stdin: {}", err);
        }
    })
}

async fn wait_for(pending: &mut Option<JoinHandle<()>>) {
    match pending {
        Some(handle) => {
            let _ = handle.await;
        }
        None => std::future::pending().await,
    }
}
