use std::fmt;

/// Opaque identifier of one server-side background job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobHandle(String);

const PLACEHOLDER_PREFIX: &str = "temp_";

impl JobHandle {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Placeholder handles name jobs the server has not registered yet.
    pub fn is_placeholder(&self) -> bool {
        self.0.starts_with(PLACEHOLDER_PREFIX)
    }

    pub fn category(&self) -> JobCategory {
        JobCategory::from_handle(&self.0)
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobHandle {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for JobHandle {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JobCategory {
    Pipeline,
    Incremental,
    FinancialStatements,
    Scoring,
    Stocks,
    Etf,
    Dividends,
    CorporateActions,
    Bonds,
    Deposits,
    LoanProducts,
    #[default]
    General,
}

/// How a category's progress is laid out on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseLayout {
    /// Collection then persistence, with a phase indicator.
    TwoPhase,
    /// One progress bar, no phase indicator.
    SinglePhase,
    /// Single phase plus the fixed step checklist.
    Pipeline,
}

/// Ordered prefix table; the first match wins.
const PREFIXES: &[(&str, JobCategory)] = &[
    ("pipeline_", JobCategory::Pipeline),
    ("incremental_", JobCategory::Incremental),
    ("dart_fin_", JobCategory::FinancialStatements),
    ("compass_", JobCategory::Scoring),
    ("stocks_", JobCategory::Stocks),
    ("fdr_", JobCategory::Stocks),
    ("etf_", JobCategory::Etf),
    ("dividends_", JobCategory::Dividends),
    ("corp_action_", JobCategory::CorporateActions),
    ("bonds_", JobCategory::Bonds),
    ("deposits_", JobCategory::Deposits),
    ("savings_", JobCategory::Deposits),
    ("annuity_", JobCategory::LoanProducts),
    ("mortgage_", JobCategory::LoanProducts),
    ("rentloan_", JobCategory::LoanProducts),
    ("creditloan_", JobCategory::LoanProducts),
];

impl JobCategory {
    pub fn from_handle(raw: &str) -> Self {
        PREFIXES
            .iter()
            .find(|(prefix, _)| raw.starts_with(prefix))
            .map(|(_, category)| *category)
            .unwrap_or_default()
    }

    pub fn estimate(self) -> &'static str {
        match self {
            JobCategory::Pipeline => "about 60-90 minutes",
            JobCategory::Incremental => "about 30-40 minutes",
            JobCategory::FinancialStatements => "about 5-10 minutes",
            JobCategory::Scoring => "about 20-30 minutes",
            JobCategory::Stocks | JobCategory::Dividends | JobCategory::Bonds => {
                "about 3-5 minutes"
            }
            JobCategory::Etf | JobCategory::Deposits | JobCategory::LoanProducts => {
                "about 1-2 minutes"
            }
            JobCategory::CorporateActions => "about 10-30 seconds",
            JobCategory::General => "about 2-3 minutes",
        }
    }

    pub fn layout(self) -> PhaseLayout {
        match self {
            JobCategory::Pipeline => PhaseLayout::Pipeline,
            JobCategory::FinancialStatements
            | JobCategory::CorporateActions
            | JobCategory::Bonds
            | JobCategory::Deposits
            | JobCategory::LoanProducts => PhaseLayout::SinglePhase,
            JobCategory::Incremental
            | JobCategory::Scoring
            | JobCategory::Stocks
            | JobCategory::Etf
            | JobCategory::Dividends
            | JobCategory::General => PhaseLayout::TwoPhase,
        }
    }

    /// Single-phase jobs never show the phase indicator or the phase-1 view.
    pub fn is_single_phase(self) -> bool {
        !matches!(self.layout(), PhaseLayout::TwoPhase)
    }

    pub fn is_pipeline(self) -> bool {
        matches!(self.layout(), PhaseLayout::Pipeline)
    }
}

/// Human-readable duration estimate for a job. Total over all inputs.
pub fn estimate(handle: Option<&JobHandle>) -> &'static str {
    handle
        .map(JobHandle::category)
        .unwrap_or_default()
        .estimate()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_map_to_categories() {
        assert_eq!(JobCategory::from_handle("pipeline_20240101"), JobCategory::Pipeline);
        assert_eq!(JobCategory::from_handle("fdr_krx"), JobCategory::Stocks);
        assert_eq!(JobCategory::from_handle("savings_1"), JobCategory::Deposits);
        assert_eq!(JobCategory::from_handle("creditloan_x"), JobCategory::LoanProducts);
        assert_eq!(JobCategory::from_handle("mystery"), JobCategory::General);
        assert_eq!(JobCategory::from_handle(""), JobCategory::General);
    }

    #[test]
    fn estimate_falls_back_without_handle() {
        assert_eq!(estimate(None), "about 2-3 minutes");
        assert_eq!(estimate(Some(&JobHandle::from("unknown_1"))), "about 2-3 minutes");
        assert_eq!(
            estimate(Some(&JobHandle::from("pipeline_1"))),
            "about 60-90 minutes"
        );
        assert_eq!(
            estimate(Some(&JobHandle::from("corp_action_7"))),
            "about 10-30 seconds"
        );
    }

    #[test]
    fn pipeline_counts_as_single_phase() {
        assert!(JobCategory::Pipeline.is_single_phase());
        assert!(JobCategory::Pipeline.is_pipeline());
        assert!(JobCategory::Bonds.is_single_phase());
        assert!(!JobCategory::Bonds.is_pipeline());
        assert!(!JobCategory::Stocks.is_single_phase());
        assert!(!JobCategory::General.is_single_phase());
    }

    #[test]
    fn placeholder_handles_are_detected() {
        assert!(JobHandle::from("temp_123").is_placeholder());
        assert!(!JobHandle::from("stocks_temp_123").is_placeholder());
    }
}
