use jobwatch_core::{
    render, HistoryEntry, JobCategory, JobHandle, JobStatus, Phase, PhaseOneView,
    PipelineStepView, ProgressPanel, ProgressSnapshot, ProgressView, StepState, TerminalSummary,
};
use pretty_assertions::assert_eq;

fn history(outcomes: &[bool]) -> Vec<HistoryEntry> {
    outcomes
        .iter()
        .enumerate()
        .map(|(idx, success)| HistoryEntry {
            index: idx as u64,
            item: format!("step {} (row {idx})", idx + 1),
            success: *success,
            timestamp: Some("2024-01-01T10:00:00".into()),
        })
        .collect()
}

fn states(steps: &[PipelineStepView]) -> Vec<StepState> {
    steps.iter().map(|step| step.state).collect()
}

#[test]
fn no_snapshot_is_bootstrapping() {
    assert_eq!(
        render(JobCategory::Pipeline, None),
        ProgressView::Bootstrapping {
            estimate: "about 60-90 minutes"
        }
    );
}

#[test]
fn pipeline_steps_follow_history_positions() {
    let handle = JobHandle::from("pipeline_20240101");
    let snapshot = ProgressSnapshot {
        status: JobStatus::Running,
        current: 5,
        total: 13,
        success_count: 5,
        items_history: history(&[true; 5]),
        ..ProgressSnapshot::default()
    };

    let ProgressView::PipelineSteps { panel, steps } = render(handle.category(), Some(&snapshot))
    else {
        panic!("expected pipeline view");
    };
    assert_eq!(steps.len(), 13);
    let mut expected = vec![StepState::Done; 5];
    expected.push(StepState::Running);
    expected.extend([StepState::Pending; 7]);
    assert_eq!(states(&steps), expected);
    assert_eq!(steps[0].detail.as_deref(), Some("row 0"));
    assert_eq!(steps[5].detail, None);
    assert_eq!(panel.phase_indicator, None);
    assert_eq!(panel.percent, 38);
}

#[test]
fn pipeline_failures_are_marked_positionally() {
    let snapshot = ProgressSnapshot {
        status: JobStatus::Running,
        items_history: history(&[true, false, true]),
        ..ProgressSnapshot::default()
    };
    let ProgressView::PipelineSteps { steps, .. } =
        render(JobCategory::Pipeline, Some(&snapshot))
    else {
        panic!("expected pipeline view");
    };
    assert_eq!(
        states(&steps[..5]),
        vec![
            StepState::Done,
            StepState::Fail,
            StepState::Done,
            StepState::Running,
            StepState::Pending,
        ]
    );
}

#[test]
fn finished_pipeline_has_no_running_step() {
    let snapshot = ProgressSnapshot {
        status: JobStatus::Failed,
        success_count: 3,
        failed_count: 1,
        items_history: history(&[true, true, true, false]),
        error_message: Some("DART quota exhausted".into()),
        ..ProgressSnapshot::default()
    };
    let ProgressView::Terminal { steps, summary, .. } =
        render(JobCategory::Pipeline, Some(&snapshot))
    else {
        panic!("expected terminal view");
    };
    let steps = steps.expect("pipeline steps stay visible");
    assert!(steps[4..].iter().all(|step| step.state == StepState::Pending));
    assert_eq!(
        summary,
        TerminalSummary {
            outcome: JobStatus::Failed,
            succeeded: 3,
            attempted: 4,
            error_message: Some("DART quota exhausted".into()),
        }
    );
}

#[test]
fn bonds_show_bar_without_phase_indicator() {
    let handle = JobHandle::from("bonds_abc");
    let snapshot = ProgressSnapshot {
        status: JobStatus::Running,
        current: 30,
        total: 100,
        phase: Some("Phase 1".into()),
        description: Some("Bond import".into()),
        ..ProgressSnapshot::default()
    };
    assert_eq!(
        render(handle.category(), Some(&snapshot)),
        ProgressView::PhaseTwoOrSinglePhase(ProgressPanel {
            title: Some("Bond import".into()),
            current: 30,
            total: 100,
            percent: 30,
            success_count: 0,
            failed_count: 0,
            status: JobStatus::Running,
            phase_indicator: None,
            estimate: Some("about 3-5 minutes"),
            current_item: None,
            error_message: None,
        })
    );
}

#[test]
fn two_phase_job_collecting_is_indeterminate() {
    let snapshot = ProgressSnapshot {
        status: JobStatus::Running,
        current_item: Some("[Phase 1] collecting KOSDAQ".into()),
        description: Some("Stock refresh".into()),
        ..ProgressSnapshot::default()
    };
    assert_eq!(
        render(JobCategory::Stocks, Some(&snapshot)),
        ProgressView::PhaseOneCollecting(PhaseOneView {
            title: Some("Stock refresh".into()),
            current_item: Some("[Phase 1] collecting KOSDAQ".into()),
            estimate: "about 3-5 minutes",
        })
    );
}

#[test]
fn two_phase_job_persisting_shows_indicator() {
    let snapshot = ProgressSnapshot {
        status: JobStatus::Running,
        current: 0,
        total: 0,
        phase: Some("Phase 2".into()),
        ..ProgressSnapshot::default()
    };
    let ProgressView::PhaseTwoOrSinglePhase(panel) =
        render(JobCategory::Incremental, Some(&snapshot))
    else {
        panic!("expected numeric view");
    };
    assert_eq!(panel.phase_indicator, Some(Phase::Persisting));
    assert_eq!(panel.percent, 0);
}

#[test]
fn completed_job_is_terminal_and_drops_estimate() {
    let snapshot = ProgressSnapshot {
        status: JobStatus::Completed,
        current: 120,
        total: 100,
        success_count: 118,
        failed_count: 2,
        phase: Some("Phase 1".into()),
        ..ProgressSnapshot::default()
    };
    let ProgressView::Terminal {
        panel,
        steps,
        summary,
    } = render(JobCategory::Etf, Some(&snapshot))
    else {
        panic!("expected terminal view");
    };
    assert_eq!(panel.percent, 100);
    assert_eq!(panel.estimate, None);
    assert_eq!(steps, None);
    assert_eq!(summary.succeeded, 118);
    assert_eq!(summary.attempted, 120);
}

#[test]
fn snapshot_decodes_from_server_json() {
    let body = r#"{
        "status": "running",
        "current": 12,
        "total": 40,
        "success_count": 11,
        "failed_count": 1,
        "phase": "Phase 2",
        "current_item": "005930",
        "items_history": [
            {"index": 0, "item": "000660", "success": true, "timestamp": "2024-01-01T10:00:00"}
        ],
        "error_message": null,
        "description": "Stock refresh"
    }"#;
    let snapshot: ProgressSnapshot = serde_json::from_str(body).unwrap();
    assert_eq!(snapshot.items_history.len(), 1);
    let ProgressView::PhaseTwoOrSinglePhase(panel) =
        render(JobCategory::Stocks, Some(&snapshot))
    else {
        panic!("expected numeric view");
    };
    assert_eq!(panel.percent, 30);
    assert_eq!(panel.phase_indicator, Some(Phase::Persisting));
}
