//! Print-ready visit reports.
//!
//! [`ReportDocument::build`] is a pure assembly step over a visit and
//! snapshots of the patient, catalog and lab settings. It resolves every
//! selected test against the current catalog and works at any visit status.

mod text;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::{LabSettings, LabTest, Patient, Visit};

/// Result cell for a test with no stored value.
pub const EMPTY_RESULT: &str = "-";

/// Name shown for a test that is no longer in the catalog.
pub const UNKNOWN_TEST: &str = "Unknown Test";

/// Name shown for a patient that is no longer registered.
pub const UNKNOWN_PATIENT: &str = "مريض غير معروف";

/// Lab identity header.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportHeader {
    pub lab_name: String,
    pub address: String,
    pub phone: String,
    /// Short visit reference (first 8 characters, upper case)
    pub report_id: String,
}

/// Patient demographic block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientBlock {
    pub name: String,
    pub visit_date: String,
    /// Age in years, if the patient is known
    pub age: Option<u32>,
    /// Gender label, if the patient is known
    pub gender: Option<String>,
    pub phone: String,
}

/// One line of the results table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportRow {
    pub test_id: String,
    pub test_name: String,
    pub result: String,
    pub unit: String,
    pub reference_range: String,
}

/// Fixed-layout report for one visit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportDocument {
    pub header: ReportHeader,
    pub patient: PatientBlock,
    /// Visit status label at print time
    pub status: String,
    /// Rows in the visit's selected-test order
    pub rows: Vec<ReportRow>,
    /// Narrative block; failure explanations are not printed
    pub analysis: Option<String>,
    pub footer_text: String,
    pub printed_at: NaiveDateTime,
}

impl ReportDocument {
    /// Assemble the report. Inputs are read only.
    pub fn build(
        visit: &Visit,
        patient: Option<&Patient>,
        catalog: &[LabTest],
        settings: &LabSettings,
        printed_at: NaiveDateTime,
    ) -> Self {
        let rows = visit
            .selected_test_ids
            .iter()
            .map(|test_id| {
                let test = catalog.iter().find(|t| &t.id == test_id);
                let result = visit
                    .result_for(test_id)
                    .map(|r| r.value.as_str())
                    .filter(|v| !v.is_empty())
                    .unwrap_or(EMPTY_RESULT);

                ReportRow {
                    test_id: test_id.clone(),
                    test_name: test.map_or(UNKNOWN_TEST, |t| t.name.as_str()).to_string(),
                    result: result.to_string(),
                    unit: test.map(|t| t.unit.clone()).unwrap_or_default(),
                    reference_range: test.map(|t| t.normal_range.clone()).unwrap_or_default(),
                }
            })
            .collect();

        let patient = match patient {
            Some(p) => PatientBlock {
                name: p.name.clone(),
                visit_date: visit.date.to_string(),
                age: Some(p.age),
                gender: Some(p.gender.label().to_string()),
                phone: p.phone.clone(),
            },
            None => PatientBlock {
                name: UNKNOWN_PATIENT.to_string(),
                visit_date: visit.date.to_string(),
                age: None,
                gender: None,
                phone: String::new(),
            },
        };

        Self {
            header: ReportHeader {
                lab_name: settings.lab_name.clone(),
                address: settings.address.clone(),
                phone: settings.phone.clone(),
                report_id: visit.short_id(),
            },
            patient,
            status: visit.status.label().to_string(),
            rows,
            analysis: visit
                .ai_analysis
                .as_ref()
                .filter(|note| note.is_narrative())
                .map(|note| note.text.clone()),
            footer_text: settings.footer_text.clone(),
            printed_at,
        }
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{seed_patients, seed_tests, AnalysisNote, ResultFlag, TestResult, VisitStatus};
    use chrono::NaiveDate;

    fn printed_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 2)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn make_visit() -> Visit {
        let mut visit = Visit::new("1".into(), vec!["t2".into(), "t3".into(), "t5".into()], 370);
        visit.id = "abcdef123456".into();
        visit.date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        visit
    }

    fn result(test_id: &str, value: &str) -> TestResult {
        TestResult {
            test_id: test_id.into(),
            value: value.into(),
            flag: ResultFlag::Normal,
            notes: None,
        }
    }

    #[test]
    fn test_rows_follow_selection() {
        let mut visit = make_visit();
        visit.status = VisitStatus::Completed;
        visit.results = vec![result("t5", "240"), result("t2", "95"), result("t3", "")];

        let report = ReportDocument::build(
            &visit,
            seed_patients().first(),
            &seed_tests(),
            &LabSettings::default(),
            printed_at(),
        );

        let names: Vec<&str> = report.rows.iter().map(|r| r.test_name.as_str()).collect();
        assert_eq!(names, vec!["Fasting Blood Sugar", "HbA1c", "Lipid Profile"]);
        assert_eq!(report.rows[0].result, "95");
        assert_eq!(report.rows[0].unit, "mg/dL");
        assert_eq!(report.rows[1].result, EMPTY_RESULT);
        assert_eq!(report.rows[2].reference_range, "<200");
        assert_eq!(report.header.report_id, "ABCDEF12");
        assert_eq!(report.patient.age, Some(34));
        assert_eq!(report.status, "مكتمل");
    }

    #[test]
    fn test_pending_visit_has_blank_results() {
        let visit = make_visit();
        let report = ReportDocument::build(
            &visit,
            None,
            &seed_tests(),
            &LabSettings::default(),
            printed_at(),
        );

        assert!(report.rows.iter().all(|r| r.result == EMPTY_RESULT));
        assert_eq!(report.patient.name, UNKNOWN_PATIENT);
        assert_eq!(report.patient.age, None);
        assert_eq!(report.status, "قيد الانتظار");
    }

    #[test]
    fn test_unknown_test_placeholder() {
        let visit = make_visit();
        let catalog: Vec<LabTest> = seed_tests().into_iter().filter(|t| t.id != "t3").collect();

        let report = ReportDocument::build(
            &visit,
            None,
            &catalog,
            &LabSettings::default(),
            printed_at(),
        );

        assert_eq!(report.rows.len(), 3);
        assert_eq!(report.rows[1].test_name, UNKNOWN_TEST);
        assert_eq!(report.rows[1].unit, "");
    }

    #[test]
    fn test_only_narrative_printed() {
        let mut visit = make_visit();
        visit.ai_analysis = Some(AnalysisNote::unavailable("failed".into()));
        let report = ReportDocument::build(&visit, None, &[], &LabSettings::default(), printed_at());
        assert_eq!(report.analysis, None);

        visit.ai_analysis = Some(AnalysisNote::narrative("looks fine".into()));
        let report = ReportDocument::build(&visit, None, &[], &LabSettings::default(), printed_at());
        assert_eq!(report.analysis.as_deref(), Some("looks fine"));
    }

    #[test]
    fn test_build_does_not_mutate() {
        let visit = make_visit();
        let before = visit.clone();
        let _ = ReportDocument::build(&visit, None, &seed_tests(), &LabSettings::default(), printed_at());
        assert_eq!(visit, before);
    }

    #[test]
    fn test_report_json() {
        let visit = make_visit();
        let report = ReportDocument::build(&visit, None, &seed_tests(), &LabSettings::default(), printed_at());
        let json = report.to_json().unwrap();
        assert!(json.contains("HbA1c"));
        assert!(json.contains("ABCDEF12"));
    }
}
