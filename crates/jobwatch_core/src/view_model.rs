use crate::{JobCategory, JobHandle, JobStatus, Lifecycle, Phase};

/// Step state in the pipeline checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Pending,
    Running,
    Done,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineStepView {
    pub name: &'static str,
    pub group: &'static str,
    /// True for the first step of each group, where the group label is drawn.
    pub starts_group: bool,
    pub state: StepState,
    pub detail: Option<String>,
}

/// Numeric progress shown for active and finished jobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressPanel {
    pub title: Option<String>,
    pub current: u64,
    pub total: u64,
    pub percent: u8,
    pub success_count: u64,
    pub failed_count: u64,
    pub status: JobStatus,
    /// Active phase, only for two-phase categories.
    pub phase_indicator: Option<Phase>,
    /// Only while the job is still active.
    pub estimate: Option<&'static str>,
    pub current_item: Option<String>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseOneView {
    pub title: Option<String>,
    pub current_item: Option<String>,
    pub estimate: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalSummary {
    pub outcome: JobStatus,
    pub succeeded: u64,
    pub attempted: u64,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressView {
    /// No snapshot received yet.
    Bootstrapping { estimate: &'static str },
    /// Indeterminate collection phase of a two-phase job.
    PhaseOneCollecting(PhaseOneView),
    PhaseTwoOrSinglePhase(ProgressPanel),
    PipelineSteps {
        panel: ProgressPanel,
        steps: Vec<PipelineStepView>,
    },
    /// Finished job waiting for the user to dismiss it.
    Terminal {
        panel: ProgressPanel,
        steps: Option<Vec<PipelineStepView>>,
        summary: TerminalSummary,
    },
}

impl ProgressView {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProgressView::Terminal { .. })
    }
}

/// One formatted line of the item log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayLogEntry {
    pub id: String,
    pub time: String,
    pub success: bool,
    pub item: String,
}

impl DisplayLogEntry {
    pub fn line(&self) -> String {
        let mark = if self.success { "OK" } else { "ERR" };
        format!("[{}] {} {}", self.time, mark, self.item)
    }
}

/// Everything a front end needs to draw one poller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollView {
    pub handle: JobHandle,
    pub category: JobCategory,
    pub lifecycle: Lifecycle,
    pub progress: ProgressView,
    pub log: Vec<DisplayLogEntry>,
    pub transient_error: Option<String>,
}
