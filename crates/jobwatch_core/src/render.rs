use crate::view_model::{
    PhaseOneView, PipelineStepView, ProgressPanel, ProgressView, StepState, TerminalSummary,
};
use crate::{percentage, HistoryEntry, JobCategory, Phase, ProgressSnapshot};

pub struct PipelineStep {
    pub name: &'static str,
    pub group: &'static str,
}

/// Sub-steps of a pipeline job, in the order the server reports them.
pub const PIPELINE_STEPS: [PipelineStep; 13] = [
    PipelineStep { name: "FDR stock master", group: "Step 1" },
    PipelineStep { name: "Stock data collection", group: "Step 2" },
    PipelineStep { name: "ETF data collection", group: "Step 2" },
    PipelineStep { name: "Incremental time-series load", group: "Step 3" },
    PipelineStep { name: "Dividend history, all tickers", group: "Step 4" },
    PipelineStep { name: "Corporate actions, 5 years", group: "Step 4" },
    PipelineStep { name: "Bonds, full set", group: "Step 4" },
    PipelineStep { name: "Financial statements FY2021", group: "Step 5" },
    PipelineStep { name: "Financial statements FY2022", group: "Step 5" },
    PipelineStep { name: "Financial statements FY2023", group: "Step 5" },
    PipelineStep { name: "Financial statements FY2024", group: "Step 5" },
    PipelineStep { name: "Financial statements FY2025", group: "Step 5" },
    PipelineStep { name: "Financial products, 6 kinds", group: "Step 6" },
];

/// Pure mapping from the latest snapshot to the view variant to draw.
pub fn render(category: JobCategory, snapshot: Option<&ProgressSnapshot>) -> ProgressView {
    let Some(snapshot) = snapshot else {
        return ProgressView::Bootstrapping {
            estimate: category.estimate(),
        };
    };

    let phase = snapshot.phase();
    let active = !snapshot.status.is_terminal();
    // Unknown statuses stay on the numeric view.
    let running = snapshot.status == crate::JobStatus::Running;

    if !category.is_single_phase() && running && phase == Phase::Collecting {
        return ProgressView::PhaseOneCollecting(PhaseOneView {
            title: snapshot.description.clone(),
            current_item: snapshot.current_item.clone(),
            estimate: category.estimate(),
        });
    }

    let panel = ProgressPanel {
        title: snapshot.description.clone(),
        current: snapshot.current,
        total: snapshot.total,
        percent: percentage(snapshot.current, snapshot.total),
        success_count: snapshot.success_count,
        failed_count: snapshot.failed_count,
        status: snapshot.status,
        phase_indicator: (!category.is_single_phase()).then_some(phase),
        estimate: active.then(|| category.estimate()),
        current_item: snapshot.current_item.clone(),
        error_message: snapshot.error_message.clone(),
    };
    let steps = category
        .is_pipeline()
        .then(|| pipeline_steps(&snapshot.items_history, running));

    if !active {
        let summary = TerminalSummary {
            outcome: snapshot.status,
            succeeded: snapshot.success_count,
            attempted: snapshot.attempted(),
            error_message: snapshot.error_message.clone(),
        };
        return ProgressView::Terminal {
            panel,
            steps,
            summary,
        };
    }

    match steps {
        Some(steps) => ProgressView::PipelineSteps { panel, steps },
        None => ProgressView::PhaseTwoOrSinglePhase(panel),
    }
}

/// Index-aligned: step `i` reflects `history[i]`, whatever its item text says.
pub fn pipeline_steps(history: &[HistoryEntry], running: bool) -> Vec<PipelineStepView> {
    PIPELINE_STEPS
        .iter()
        .enumerate()
        .map(|(idx, step)| {
            let entry = history.get(idx);
            let state = match entry {
                Some(entry) if entry.success => StepState::Done,
                Some(_) => StepState::Fail,
                None if idx == history.len() && running => StepState::Running,
                None => StepState::Pending,
            };
            PipelineStepView {
                name: step.name,
                group: step.group,
                starts_group: idx == 0 || PIPELINE_STEPS[idx - 1].group != step.group,
                state,
                detail: entry.and_then(|entry| trailing_detail(&entry.item)),
            }
        })
        .collect()
}

/// Text inside a trailing `( ... )` group, e.g. `"Bonds (1,204 rows)"` gives `1,204 rows`.
fn trailing_detail(item: &str) -> Option<String> {
    let body = item.strip_suffix(')')?;
    let start = body.rfind(')').map_or(0, |pos| pos + 1);
    let open = start + body[start..].find('(')?;
    let inner = &body[open + 1..];
    (!inner.is_empty()).then(|| inner.to_string())
}
