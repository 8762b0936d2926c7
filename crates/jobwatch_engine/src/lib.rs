//! Jobwatch engine: status client and the timer-owning poll task.
mod client;
mod poller;
mod types;

pub use client::{ClientSettings, ReqwestStatusClient, StatusClient};
pub use poller::{PollObserver, PollSettings, ProgressPoller};
pub use types::{FailureKind, FetchError, PollerError};
