//! Jobwatch core: pure polling state machine, job categories and view-model rendering.
mod category;
mod effect;
mod msg;
mod render;
mod snapshot;
mod state;
mod timestamp;
mod update;
mod view_model;

pub use category::{estimate, JobCategory, JobHandle, PhaseLayout};
pub use effect::Effect;
pub use msg::{FetchFailure, Msg};
pub use render::{pipeline_steps, render, PipelineStep, PIPELINE_STEPS};
pub use snapshot::{percentage, HistoryEntry, JobStatus, Phase, ProgressSnapshot};
pub use state::{Lifecycle, PollerState, LOG_CAPACITY, NOT_FOUND_LIMIT};
pub use timestamp::{format_timestamp, DisplayZone};
pub use update::update;
pub use view_model::{
    DisplayLogEntry, PhaseOneView, PipelineStepView, PollView, ProgressPanel, ProgressView,
    StepState, TerminalSummary,
};
