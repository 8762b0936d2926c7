use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Running,
    Completed,
    Failed,
    /// Any status string this client does not know; treated as still active.
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn label(self) -> &'static str {
        match self {
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Running | JobStatus::Unknown => "in progress",
        }
    }
}

/// One record of the server's append-only item log.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryEntry {
    #[serde(deserialize_with = "null_as_default")]
    pub index: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub item: String,
    #[serde(deserialize_with = "null_as_default")]
    pub success: bool,
    pub timestamp: Option<String>,
}

/// Latest known state of a job, as returned by `GET /progress/{handle}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressSnapshot {
    #[serde(deserialize_with = "null_as_default")]
    pub status: JobStatus,
    #[serde(deserialize_with = "null_as_default")]
    pub current: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub total: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub success_count: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub failed_count: u64,
    pub phase: Option<String>,
    pub current_item: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub items_history: Vec<HistoryEntry>,
    pub error_message: Option<String>,
    pub description: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Server-reported sub-stage of a two-phase job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Collecting,
    Persisting,
}

const PHASE_ONE_LABEL: &str = "Phase 1";
const PHASE_ONE_MARKER: &str = "[Phase 1]";

impl ProgressSnapshot {
    /// Uses the `phase` field when it has a label, otherwise looks for the
    /// phase-1 marker in `current_item`.
    pub fn phase(&self) -> Phase {
        let label = self.phase.as_deref().map(str::trim).filter(|l| !l.is_empty());
        let collecting = match label {
            Some(label) => label == PHASE_ONE_LABEL,
            None => self
                .current_item
                .as_deref()
                .is_some_and(|item| item.contains(PHASE_ONE_MARKER)),
        };
        if collecting {
            Phase::Collecting
        } else {
            Phase::Persisting
        }
    }

    pub fn attempted(&self) -> u64 {
        self.success_count.saturating_add(self.failed_count)
    }
}

/// Share of `current` in `total`, rounded and clamped to `0..=100`.
///
/// A zero `total` means the count is unknown and yields 0.
pub fn percentage(current: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let ratio = (current as f64 / total as f64) * 100.0;
    ratio.round().clamp(0.0, 100.0) as u8
}
