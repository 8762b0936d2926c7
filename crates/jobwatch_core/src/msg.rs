use crate::{JobHandle, ProgressSnapshot};

/// Why a status fetch produced no snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// The server no longer knows the job, usually because it finished and was swept.
    NotFound,
    /// Network blip, timeout, 5xx or an undecodable body.
    Transient(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The poll interval elapsed.
    Tick,
    /// A status fetch returned a snapshot.
    FetchSucceeded {
        handle: JobHandle,
        seq: u64,
        snapshot: ProgressSnapshot,
    },
    /// A status fetch failed.
    FetchFailed {
        handle: JobHandle,
        seq: u64,
        failure: FetchFailure,
    },
    /// The caller replaced the job being watched, e.g. a placeholder with the real handle.
    HandleChanged(JobHandle),
    /// The user dismissed the view.
    CloseRequested,
}
