//! Visit models: the encounter lifecycle and its results.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Visit status.
///
/// ```text
/// Pending ──(start processing: not yet driven)──▶ InProcess
///    │                                               │
///    └──────────────(save results)───────────────────┴──▶ Completed
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum VisitStatus {
    /// Created, awaiting results
    Pending,
    /// Samples being processed. No operation enters this state yet; a
    /// "start processing" transition would target it.
    InProcess,
    /// Results saved
    Completed,
}

impl VisitStatus {
    /// Localized display label.
    pub fn label(&self) -> &'static str {
        match self {
            VisitStatus::Pending => "قيد الانتظار",
            VisitStatus::InProcess => "جاري الفحص",
            VisitStatus::Completed => "مكتمل",
        }
    }

    /// Whether the lifecycle allows moving from `self` to `next`.
    ///
    /// Saving results is allowed from every state, including `Completed`
    /// (results are overwritten). Nothing leaves `Completed` otherwise.
    pub fn can_transition_to(&self, next: VisitStatus) -> bool {
        match (self, next) {
            (_, VisitStatus::Completed) => true,
            (VisitStatus::Pending, VisitStatus::InProcess) => true,
            _ => false,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, VisitStatus::Completed)
    }
}

/// Result flag relative to the reference range.
///
/// Always `Normal` today: reference ranges are free-text display strings and
/// no range grammar is defined.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ResultFlag {
    High,
    Low,
    #[default]
    Normal,
}

/// The stored result for one selected test.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestResult {
    /// Catalog test ID (member of the visit's selected tests)
    pub test_id: String,
    /// Operator input, not validated
    pub value: String,
    pub flag: ResultFlag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// What an analysis note contains.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AnalysisKind {
    /// Narrative produced by the analysis service
    Narrative,
    /// Localized explanation of why no narrative is available
    Unavailable,
}

/// Text attached to a visit by the analysis service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisNote {
    pub kind: AnalysisKind,
    pub text: String,
}

impl AnalysisNote {
    pub fn narrative(text: String) -> Self {
        Self {
            kind: AnalysisKind::Narrative,
            text,
        }
    }

    pub fn unavailable(text: String) -> Self {
        Self {
            kind: AnalysisKind::Unavailable,
            text,
        }
    }

    pub fn is_narrative(&self) -> bool {
        matches!(self.kind, AnalysisKind::Narrative)
    }
}

/// A clinical encounter binding a patient to an ordered set of tests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Visit {
    /// Unique visit ID
    pub id: String,
    /// Patient ID; may no longer resolve
    pub patient_id: String,
    /// Creation date
    pub date: NaiveDate,
    pub status: VisitStatus,
    /// Ordered test IDs; display order, duplicates allowed
    pub selected_test_ids: Vec<String>,
    /// One result per selected test once saved
    pub results: Vec<TestResult>,
    /// Sum of prices at creation; never recomputed
    pub total_cost: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_analysis: Option<AnalysisNote>,
}

impl Visit {
    /// Create a pending visit dated today.
    pub fn new(patient_id: String, selected_test_ids: Vec<String>, total_cost: u64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            patient_id,
            date: chrono::Local::now().date_naive(),
            status: VisitStatus::Pending,
            selected_test_ids,
            results: Vec::new(),
            total_cost,
            ai_analysis: None,
        }
    }

    /// Stored result for a test, if any.
    pub fn result_for(&self, test_id: &str) -> Option<&TestResult> {
        self.results.iter().find(|r| r.test_id == test_id)
    }

    /// Short upper-case reference printed on reports.
    pub fn short_id(&self) -> String {
        self.id.chars().take(8).collect::<String>().to_uppercase()
    }
}
