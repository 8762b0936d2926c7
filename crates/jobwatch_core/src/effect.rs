use crate::{JobHandle, ProgressSnapshot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Issue `GET /progress/{handle}`; the result must come back tagged with `seq`.
    FetchStatus { handle: JobHandle, seq: u64 },
    /// The job reached a terminal status. Emitted at most once per handle.
    NotifyComplete(ProgressSnapshot),
    /// Tear the view down. Emitted at most once per poller.
    NotifyClose,
}
