//! Narrative analysis of a visit's results.
//!
//! The collaborator call is split from the state changes so the caller can
//! release its lock while the request is in flight:
//! [`prepare_analysis`](LabController::prepare_analysis) snapshots the inputs,
//! the analyzer runs, and [`apply_analysis`](LabController::apply_analysis)
//! stores the note. Concurrent requests for the same visit are not fenced;
//! whichever is applied last wins.

use lab_records_llm::{AnalysisError, AnalysisRequest, AnalysisRow, LabAnalyzer};

use super::{EngineError, EngineResult, LabController};
use crate::db::{Slot, SnapshotStore};
use crate::models::AnalysisNote;
use crate::report::UNKNOWN_TEST;

/// What a request for analysis produced.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// No connectivity: the service was not called and nothing was stored.
    Offline { message: String },
    /// A note (narrative or failure explanation) was stored on the visit.
    Stored(AnalysisNote),
}

impl AnalysisOutcome {
    /// Text to show the operator.
    pub fn text(&self) -> &str {
        match self {
            AnalysisOutcome::Offline { message } => message,
            AnalysisOutcome::Stored(note) => &note.text,
        }
    }
}

/// Turn the analyzer's answer into a note; failures become their localized text.
pub fn note_from_result(result: Result<String, AnalysisError>) -> AnalysisNote {
    match result {
        Ok(text) => AnalysisNote::narrative(text),
        Err(e) => {
            tracing::warn!(error = %e, "Lab analysis unavailable");
            AnalysisNote::unavailable(e.localized_message().to_string())
        }
    }
}

/// Outcome of a request made without connectivity; nothing is called or stored.
pub fn offline_outcome(visit_id: &str) -> AnalysisOutcome {
    tracing::info!(visit_id = %visit_id, "Analysis skipped while offline");
    AnalysisOutcome::Offline {
        message: AnalysisError::Offline.localized_message().to_string(),
    }
}

impl<S: SnapshotStore> LabController<S> {
    /// Snapshot what the analyzer needs for a visit.
    ///
    /// Rows follow the visit's stored results and resolve names from the
    /// current catalog.
    pub fn prepare_analysis(&self, visit_id: &str) -> EngineResult<AnalysisRequest> {
        let visit = self
            .state
            .visit(visit_id)
            .ok_or_else(|| EngineError::NotFound(format!("visit {}", visit_id)))?;
        let patient = self.state.patient(&visit.patient_id).ok_or_else(|| {
            EngineError::NotFound(format!("patient {} of visit {}", visit.patient_id, visit_id))
        })?;

        let rows = visit
            .results
            .iter()
            .map(|result| {
                let test = self.state.test(&result.test_id);
                AnalysisRow {
                    test_name: test
                        .map(|t| t.name.clone())
                        .unwrap_or_else(|| UNKNOWN_TEST.to_string()),
                    value: result.value.clone(),
                    unit: test.map(|t| t.unit.clone()).unwrap_or_default(),
                    normal_range: test.map(|t| t.normal_range.clone()).unwrap_or_default(),
                }
            })
            .collect();

        Ok(AnalysisRequest {
            age: patient.age,
            gender: patient.gender.label().to_string(),
            rows,
        })
    }

    /// Store an analysis note on a visit, replacing any previous one.
    pub fn apply_analysis(&mut self, visit_id: &str, note: AnalysisNote) -> EngineResult<()> {
        let index = self.visit_index(visit_id)?;

        let kind = note.kind;
        self.commit(Slot::Visits, |state| state.visits[index].ai_analysis = Some(note))?;

        tracing::info!(visit_id = %visit_id, kind = ?kind, "Analysis stored");
        Ok(())
    }

    /// Run the whole analysis flow in place.
    ///
    /// With `online == false` the analyzer is never called and any existing
    /// note is left as it was.
    pub fn request_analysis(
        &mut self,
        visit_id: &str,
        online: bool,
        analyzer: &dyn LabAnalyzer,
    ) -> EngineResult<AnalysisOutcome> {
        if !online {
            return Ok(offline_outcome(visit_id));
        }

        let request = self.prepare_analysis(visit_id)?;
        let note = note_from_result(analyzer.analyze(&request));
        self.apply_analysis(visit_id, note.clone())?;
        Ok(AnalysisOutcome::Stored(note))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::AnalysisKind;
    use lab_records_llm::{messages, MockAnalyzer};
    use std::collections::HashMap;

    fn completed_visit(controller: &mut LabController<MemoryStore>) -> String {
        let visit = controller
            .create_visit("1", vec!["t2".into(), "t5".into()])
            .unwrap();
        let inputs = HashMap::from([
            ("t2".to_string(), "130".to_string()),
            ("t5".to_string(), "240".to_string()),
        ]);
        controller.save_results(&visit.id, &inputs).unwrap();
        visit.id
    }

    #[test]
    fn test_prepare_analysis_rows() {
        let mut controller = LabController::load(MemoryStore::new()).unwrap();
        let visit_id = completed_visit(&mut controller);

        let request = controller.prepare_analysis(&visit_id).unwrap();
        assert_eq!(request.age, 34);
        assert_eq!(request.gender, "ذكر");
        assert_eq!(request.rows.len(), 2);
        assert_eq!(request.rows[0].test_name, "Fasting Blood Sugar");
        assert_eq!(request.rows[0].value, "130");
        assert_eq!(request.rows[1].normal_range, "<200");
    }

    #[test]
    fn test_offline_never_calls_analyzer() {
        let mut controller = LabController::load(MemoryStore::new()).unwrap();
        let visit_id = completed_visit(&mut controller);
        let analyzer = MockAnalyzer::new("should not appear");

        let outcome = controller
            .request_analysis(&visit_id, false, &analyzer)
            .unwrap();

        assert_eq!(analyzer.calls(), 0);
        assert_eq!(
            outcome,
            AnalysisOutcome::Offline {
                message: messages::OFFLINE.to_string()
            }
        );
        assert!(controller.state().visit(&visit_id).unwrap().ai_analysis.is_none());
    }

    #[test]
    fn test_offline_outcome_matches_controller_path() {
        let mut controller = LabController::load(MemoryStore::new()).unwrap();
        let visit_id = completed_visit(&mut controller);
        let analyzer = MockAnalyzer::new("unused");

        let outcome = controller
            .request_analysis(&visit_id, false, &analyzer)
            .unwrap();
        assert_eq!(outcome, offline_outcome(&visit_id));
        assert_eq!(offline_outcome("any").text(), messages::OFFLINE);
    }

    #[test]
    fn test_online_stores_narrative() {
        let mut controller = LabController::load(MemoryStore::new()).unwrap();
        let visit_id = completed_visit(&mut controller);
        let analyzer = MockAnalyzer::new("ارتفاع في السكر والدهون");

        let outcome = controller
            .request_analysis(&visit_id, true, &analyzer)
            .unwrap();

        assert_eq!(analyzer.calls(), 1);
        assert_eq!(outcome.text(), "ارتفاع في السكر والدهون");
        let note = controller
            .state()
            .visit(&visit_id)
            .unwrap()
            .ai_analysis
            .clone()
            .unwrap();
        assert_eq!(note.kind, AnalysisKind::Narrative);
    }

    #[test]
    fn test_failure_stored_as_unavailable() {
        let mut controller = LabController::load(MemoryStore::new()).unwrap();
        let visit_id = completed_visit(&mut controller);
        let analyzer = MockAnalyzer::failing(|| AnalysisError::Timeout(30));

        let outcome = controller
            .request_analysis(&visit_id, true, &analyzer)
            .unwrap();

        let expected = AnalysisNote::unavailable(messages::REQUEST_FAILED.to_string());
        assert_eq!(outcome, AnalysisOutcome::Stored(expected.clone()));
        assert_eq!(
            controller.state().visit(&visit_id).unwrap().ai_analysis,
            Some(expected)
        );
    }

    #[test]
    fn test_last_applied_wins() {
        let mut controller = LabController::load(MemoryStore::new()).unwrap();
        let visit_id = completed_visit(&mut controller);

        controller
            .apply_analysis(&visit_id, AnalysisNote::narrative("first".into()))
            .unwrap();
        controller
            .apply_analysis(&visit_id, AnalysisNote::narrative("second".into()))
            .unwrap();

        let note = controller.state().visit(&visit_id).unwrap().ai_analysis.clone();
        assert_eq!(note.map(|n| n.text), Some("second".to_string()));
    }

    #[test]
    fn test_missing_patient_is_not_found() {
        let mut controller = LabController::load(MemoryStore::new()).unwrap();
        let visit = controller.create_visit("ghost", vec!["t1".into()]).unwrap();
        let analyzer = MockAnalyzer::new("x");

        let result = controller.request_analysis(&visit.id, true, &analyzer);
        assert!(matches!(result, Err(EngineError::NotFound(_))));
        assert_eq!(analyzer.calls(), 0);
    }
}
