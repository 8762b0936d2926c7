use std::io::{self, Write};

use jobwatch_core::{
    DisplayLogEntry, JobStatus, Phase, PipelineStepView, PollView, ProgressPanel, ProgressView,
    StepState, TerminalSummary,
};

const BAR_WIDTH: usize = 30;
const DEFAULT_TITLE: &str = "Data load";

/// Text lines for the status block of a view.
pub fn status_lines(view: &PollView) -> Vec<String> {
    let mut lines = match &view.progress {
        ProgressView::Bootstrapping { estimate } => vec![
            format!("{DEFAULT_TITLE} [{}]", view.handle),
            format!("Waiting for the job to report progress ({estimate})"),
        ],
        ProgressView::PhaseOneCollecting(phase_one) => vec![
            title_line(phase_one.title.as_deref()),
            "Phase 1: collecting".to_string(),
            phase_one
                .current_item
                .clone()
                .unwrap_or_else(|| "Collecting source data...".to_string()),
            format!("This phase takes {}", phase_one.estimate),
            "Results are saved in phase 2".to_string(),
        ],
        ProgressView::PhaseTwoOrSinglePhase(panel) => panel_lines(panel),
        ProgressView::PipelineSteps { panel, steps } => {
            let mut lines = panel_lines(panel);
            lines.extend(step_lines(steps));
            lines
        }
        ProgressView::Terminal {
            panel,
            steps,
            summary,
        } => {
            let mut lines = panel_lines(panel);
            if let Some(steps) = steps {
                lines.extend(step_lines(steps));
            }
            lines.extend(summary_lines(summary));
            lines
        }
    };
    if let Some(error) = &view.transient_error {
        lines.push(format!("! {error}"));
    }
    lines
}

fn title_line(title: Option<&str>) -> String {
    title.unwrap_or(DEFAULT_TITLE).to_string()
}

fn panel_lines(panel: &ProgressPanel) -> Vec<String> {
    let mut lines = vec![
        title_line(panel.title.as_deref()),
        format!(
            "{} / {} done  {}%",
            format_with_commas(panel.current),
            format_with_commas(panel.total),
            panel.percent
        ),
        progress_bar(panel.percent, BAR_WIDTH),
    ];
    if let Some(phase) = panel.phase_indicator {
        lines.push(phase_indicator(phase));
    }
    lines.push(format!(
        "OK {}  ERR {}  {}",
        format_with_commas(panel.success_count),
        format_with_commas(panel.failed_count),
        panel.status.label()
    ));
    if let Some(estimate) = panel.estimate {
        lines.push(format!("Estimated time: {estimate}"));
    }
    if let Some(item) = &panel.current_item {
        lines.push(format!("Now: {item}"));
    }
    if let Some(error) = &panel.error_message {
        lines.push(format!("! {error}"));
    }
    lines
}

fn phase_indicator(active: Phase) -> String {
    match active {
        Phase::Collecting => "[Phase 1: collect]  Phase 2: save ".to_string(),
        Phase::Persisting => " Phase 1: collect  [Phase 2: save]".to_string(),
    }
}

fn step_lines(steps: &[PipelineStepView]) -> Vec<String> {
    let mut lines = Vec::with_capacity(steps.len() + 6);
    for step in steps {
        if step.starts_group {
            lines.push(step.group.to_string());
        }
        let mark = match step.state {
            StepState::Done => "[x]",
            StepState::Fail => "[!]",
            StepState::Running => "[>]",
            StepState::Pending => "[ ]",
        };
        match &step.detail {
            Some(detail) => lines.push(format!("  {mark} {} ({detail})", step.name)),
            None => lines.push(format!("  {mark} {}", step.name)),
        }
    }
    lines
}

fn summary_lines(summary: &TerminalSummary) -> Vec<String> {
    let headline = match summary.outcome {
        JobStatus::Failed => "Job failed",
        _ => "Data load finished",
    };
    vec![
        headline.to_string(),
        format!(
            "{} of {} succeeded",
            format_with_commas(summary.succeeded),
            format_with_commas(summary.attempted)
        ),
    ]
}

pub fn progress_bar(percent: u8, width: usize) -> String {
    let filled = width * usize::from(percent.min(100)) / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

fn format_with_commas(value: u64) -> String {
    let mut out = String::new();
    for (i, ch) in value.to_string().chars().rev().enumerate() {
        if i != 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.chars().rev().collect()
}

/// Remembers the last printed log line so each line is printed once.
#[derive(Debug, Default)]
pub struct LogTail {
    last_id: Option<String>,
}

impl LogTail {
    /// Entries of `log` after the last one returned by a previous call.
    ///
    /// When that entry is gone (rotated out, or the job changed) the whole log is new.
    pub fn fresh<'a>(&mut self, log: &'a [DisplayLogEntry]) -> &'a [DisplayLogEntry] {
        let start = self
            .last_id
            .as_ref()
            .and_then(|id| log.iter().rposition(|entry| entry.id == *id))
            .map_or(0, |pos| pos + 1);
        if let Some(last) = log.last() {
            self.last_id = Some(last.id.clone());
        }
        &log[start..]
    }
}

/// Draws views to a terminal-like writer, skipping unchanged status blocks.
pub struct TerminalPrinter<W: Write> {
    out: W,
    last_status: Vec<String>,
    log_tail: LogTail,
}

impl<W: Write> TerminalPrinter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            last_status: Vec::new(),
            log_tail: LogTail::default(),
        }
    }

    pub fn draw(&mut self, view: &PollView) -> io::Result<()> {
        for entry in self.log_tail.fresh(&view.log) {
            writeln!(self.out, "{}", entry.line())?;
        }
        let status = status_lines(view);
        if status != self.last_status {
            writeln!(self.out)?;
            for line in &status {
                writeln!(self.out, "{line}")?;
            }
            self.last_status = status;
        }
        self.out.flush()
    }

    pub fn prompt(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")?;
        self.out.flush()
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}
