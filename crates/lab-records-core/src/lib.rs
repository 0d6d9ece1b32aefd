//! Lab Records Core Library
//!
//! Local-first records for a single clinic laboratory: patients, the test
//! catalog, visits with their results, and print-ready reports.
//!
//! # Architecture
//!
//! ```text
//! Register patient ──┐
//!                    ▼
//!      CreateVisit(patient, tests)      total frozen from current prices
//!                    │
//!          [Visit: Pending]
//!                    │
//!       SaveResults(values by test)     rows rebuilt from selected tests
//!                    │
//!          [Visit: Completed]
//!                    │
//!      ┌─────────────┼──────────────────────┐
//!      │             │                      │
//!      ▼             ▼                      ▼
//!   Report      RequestAnalysis        Dashboard / Search
//!  (text/json)  (hosted model, online)
//! ```
//!
//! Every mutation writes the full snapshot of the touched dataset slot
//! (`lab_patients`, `lab_tests`, `lab_visits`, `lab_settings`).
//!
//! # Modules
//!
//! - [`db`]: Snapshot store trait with SQLite and in-memory backends
//! - [`models`]: Domain types (Patient, LabTest, Visit, LabSettings)
//! - [`engine`]: The controller owning the lab state and its named operations
//! - [`report`]: Report assembly and text/JSON output
//! - [`stats`]: Dashboard figures
//! - [`search`]: List filters

pub mod db;
pub mod engine;
pub mod models;
pub mod report;
pub mod search;
pub mod stats;

// Re-export commonly used types
pub use db::{Database, MemoryStore, Slot, SnapshotStore};
pub use engine::{
    AnalysisOutcome, Confirmation, EngineError, LabController, LabState, NewLabTest, NewPatient,
};
pub use models::{
    AnalysisKind, AnalysisNote, Gender, LabSettings, LabTest, LabTestUpdate, Patient,
    PatientUpdate, ResultFlag, TestCategory, TestResult, Visit, VisitStatus,
};
pub use report::ReportDocument;
pub use stats::DashboardStats;

use lab_records_llm::{AnalysisConfig, AnalysisError, GeminiAnalyzer, LabAnalyzer};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Install a `tracing` fmt subscriber filtered by `RUST_LOG`
/// (default `lab_records_core=info,lab_records_llm=info`).
///
/// Safe to call more than once; later calls are ignored.
#[uniffi::export]
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "lab_records_core=info,lab_records_llm=info".into());
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum LabRecordsError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Confirmation required: {0}")]
    ConfirmationRequired(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Analysis error: {0}")]
    AnalysisError(String),
}

impl From<db::DbError> for LabRecordsError {
    fn from(e: db::DbError) -> Self {
        LabRecordsError::DatabaseError(e.to_string())
    }
}

impl From<EngineError> for LabRecordsError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Validation(msg) => LabRecordsError::InvalidInput(msg),
            EngineError::NotFound(msg) => LabRecordsError::NotFound(msg),
            EngineError::ConfirmationRequired(msg) => LabRecordsError::ConfirmationRequired(msg),
            EngineError::Store(e) => e.into(),
            EngineError::Json(e) => e.into(),
        }
    }
}

impl From<serde_json::Error> for LabRecordsError {
    fn from(e: serde_json::Error) -> Self {
        LabRecordsError::SerializationError(e.to_string())
    }
}

impl From<AnalysisError> for LabRecordsError {
    fn from(e: AnalysisError) -> Self {
        LabRecordsError::AnalysisError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for LabRecordsError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        LabRecordsError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path.
///
/// The analyzer is configured from the environment (see [`AnalysisConfig`]).
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<LabRecordsCore>, LabRecordsError> {
    let db = Database::open(&path)?;
    LabRecordsCore::with_config(db, AnalysisConfig::from_env())
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<LabRecordsCore>, LabRecordsError> {
    let db = Database::open_in_memory()?;
    LabRecordsCore::with_config(db, AnalysisConfig::from_env())
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe controller wrapper for FFI.
#[derive(uniffi::Object)]
pub struct LabRecordsCore {
    controller: Arc<Mutex<LabController<Database>>>,
    analyzer: Arc<dyn LabAnalyzer>,
}

impl LabRecordsCore {
    fn with_config(db: Database, config: AnalysisConfig) -> Result<Arc<Self>, LabRecordsError> {
        let analyzer = GeminiAnalyzer::new(config)?;
        Self::with_analyzer(db, Arc::new(analyzer))
    }

    /// Build a core around any analyzer (e.g., a mock in tests).
    pub fn with_analyzer(
        db: Database,
        analyzer: Arc<dyn LabAnalyzer>,
    ) -> Result<Arc<Self>, LabRecordsError> {
        let controller = LabController::load(db)?;
        Ok(Arc::new(Self {
            controller: Arc::new(Mutex::new(controller)),
            analyzer,
        }))
    }
}

#[uniffi::export]
impl LabRecordsCore {
    // =========================================================================
    // Patient Operations
    // =========================================================================

    /// Register a new patient.
    pub fn register_patient(
        &self,
        name: String,
        age: u32,
        gender: FfiGender,
        phone: String,
        email: Option<String>,
    ) -> Result<FfiPatient, LabRecordsError> {
        let mut controller = self.controller.lock()?;
        let patient = controller.register_patient(NewPatient {
            name,
            age,
            gender: gender.into(),
            phone,
            email,
        })?;
        Ok(patient.into())
    }

    /// Replace a patient's editable fields. Returns `false` if not found.
    pub fn update_patient(&self, patient: FfiPatient) -> Result<bool, LabRecordsError> {
        let mut controller = self.controller.lock()?;
        let update = PatientUpdate {
            name: Some(patient.name),
            age: Some(patient.age),
            gender: Some(patient.gender.into()),
            phone: Some(patient.phone),
            email: Some(patient.email),
        };
        Ok(controller.update_patient(&patient.id, update)?)
    }

    /// Delete a patient. Visits referencing the patient are kept.
    pub fn delete_patient(&self, patient_id: String, confirmed: bool) -> Result<bool, LabRecordsError> {
        let mut controller = self.controller.lock()?;
        Ok(controller.delete_patient(&patient_id, confirmed.into())?)
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, patient_id: String) -> Result<Option<FfiPatient>, LabRecordsError> {
        let controller = self.controller.lock()?;
        Ok(controller.state().patient(&patient_id).cloned().map(|p| p.into()))
    }

    /// Search patients by name or phone.
    pub fn search_patients(&self, query: String) -> Result<Vec<FfiPatient>, LabRecordsError> {
        let controller = self.controller.lock()?;
        let patients = search::search_patients(controller.state(), &query);
        Ok(patients.into_iter().cloned().map(|p| p.into()).collect())
    }

    // =========================================================================
    // Catalog Operations
    // =========================================================================

    /// Add a test to the catalog. An empty code becomes `GEN`.
    pub fn add_test(&self, test: FfiNewLabTest) -> Result<FfiLabTest, LabRecordsError> {
        let mut controller = self.controller.lock()?;
        let created = controller.add_test(test.into())?;
        Ok(created.into())
    }

    /// Replace a test's editable fields. Returns `false` if not found.
    pub fn update_test(&self, test: FfiLabTest) -> Result<bool, LabRecordsError> {
        let mut controller = self.controller.lock()?;
        let update = LabTestUpdate {
            code: Some(test.code),
            name: Some(test.name),
            price: Some(test.price),
            unit: Some(test.unit),
            normal_range: Some(test.normal_range),
            category: Some(test.category.into()),
        };
        Ok(controller.update_test(&test.id, update)?)
    }

    /// Remove a test. Visits that ordered it keep the ID.
    pub fn delete_test(&self, test_id: String, confirmed: bool) -> Result<bool, LabRecordsError> {
        let mut controller = self.controller.lock()?;
        Ok(controller.delete_test(&test_id, confirmed.into())?)
    }

    /// Search the catalog by name or code, ignoring case.
    pub fn search_tests(&self, query: String) -> Result<Vec<FfiLabTest>, LabRecordsError> {
        let controller = self.controller.lock()?;
        let tests = search::search_tests(controller.state(), &query);
        Ok(tests.into_iter().cloned().map(|t| t.into()).collect())
    }

    // =========================================================================
    // Visit Operations
    // =========================================================================

    /// Create a pending visit with its total frozen from current prices.
    pub fn create_visit(
        &self,
        patient_id: String,
        test_ids: Vec<String>,
    ) -> Result<FfiVisit, LabRecordsError> {
        let mut controller = self.controller.lock()?;
        let visit = controller.create_visit(&patient_id, test_ids)?;
        Ok(visit.into())
    }

    /// Save result values keyed by test ID and complete the visit.
    pub fn save_results(
        &self,
        visit_id: String,
        values: HashMap<String, String>,
    ) -> Result<FfiVisit, LabRecordsError> {
        let mut controller = self.controller.lock()?;
        let visit = controller.save_results(&visit_id, &values)?;
        Ok(visit.into())
    }

    /// Delete a visit.
    pub fn delete_visit(&self, visit_id: String, confirmed: bool) -> Result<bool, LabRecordsError> {
        let mut controller = self.controller.lock()?;
        Ok(controller.delete_visit(&visit_id, confirmed.into())?)
    }

    /// Get a visit by ID.
    pub fn get_visit(&self, visit_id: String) -> Result<Option<FfiVisit>, LabRecordsError> {
        let controller = self.controller.lock()?;
        Ok(controller.state().visit(&visit_id).cloned().map(|v| v.into()))
    }

    /// Search visits by patient name or visit ID, most recent first.
    pub fn search_visits(&self, query: String) -> Result<Vec<FfiVisit>, LabRecordsError> {
        let controller = self.controller.lock()?;
        let visits = search::search_visits(controller.state(), &query);
        Ok(visits.into_iter().cloned().map(|v| v.into()).collect())
    }

    // =========================================================================
    // Analysis Operations
    // =========================================================================

    /// Request a narrative for a visit's results.
    ///
    /// The lock is released while the hosted model is called. Returns the
    /// text to show the operator.
    pub fn request_analysis(&self, visit_id: String, online: bool) -> Result<String, LabRecordsError> {
        if !online {
            return Ok(engine::offline_outcome(&visit_id).text().to_string());
        }

        let request = {
            let controller = self.controller.lock()?;
            controller.prepare_analysis(&visit_id)?
        };

        let note = engine::note_from_result(self.analyzer.analyze(&request));

        let mut controller = self.controller.lock()?;
        controller.apply_analysis(&visit_id, note.clone())?;
        Ok(note.text)
    }

    // =========================================================================
    // Report Operations
    // =========================================================================

    /// Render a visit's report as fixed-layout text.
    pub fn report_text(&self, visit_id: String) -> Result<String, LabRecordsError> {
        let controller = self.controller.lock()?;
        Ok(controller.report(&visit_id)?.to_text())
    }

    /// Export a visit's report as JSON.
    pub fn report_json(&self, visit_id: String) -> Result<String, LabRecordsError> {
        let controller = self.controller.lock()?;
        Ok(controller.report(&visit_id)?.to_json()?)
    }

    // =========================================================================
    // Settings & Dashboard
    // =========================================================================

    pub fn get_settings(&self) -> Result<FfiLabSettings, LabRecordsError> {
        let controller = self.controller.lock()?;
        Ok(controller.state().settings().clone().into())
    }

    pub fn update_settings(&self, settings: FfiLabSettings) -> Result<(), LabRecordsError> {
        let mut controller = self.controller.lock()?;
        controller.update_settings(settings.into())?;
        Ok(())
    }

    /// Dashboard figures for today.
    pub fn dashboard_stats(&self) -> Result<FfiDashboardStats, LabRecordsError> {
        let controller = self.controller.lock()?;
        let today = chrono::Local::now().date_naive();
        Ok(DashboardStats::compute(controller.state(), today).into())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiGender {
    Male,
    Female,
}

impl From<Gender> for FfiGender {
    fn from(gender: Gender) -> Self {
        match gender {
            Gender::Male => FfiGender::Male,
            Gender::Female => FfiGender::Female,
        }
    }
}

impl From<FfiGender> for Gender {
    fn from(gender: FfiGender) -> Self {
        match gender {
            FfiGender::Male => Gender::Male,
            FfiGender::Female => Gender::Female,
        }
    }
}

/// FFI-safe test category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiTestCategory {
    Hematology,
    Biochemistry,
    Microbiology,
    Hormones,
}

impl From<TestCategory> for FfiTestCategory {
    fn from(category: TestCategory) -> Self {
        match category {
            TestCategory::Hematology => FfiTestCategory::Hematology,
            TestCategory::Biochemistry => FfiTestCategory::Biochemistry,
            TestCategory::Microbiology => FfiTestCategory::Microbiology,
            TestCategory::Hormones => FfiTestCategory::Hormones,
        }
    }
}

impl From<FfiTestCategory> for TestCategory {
    fn from(category: FfiTestCategory) -> Self {
        match category {
            FfiTestCategory::Hematology => TestCategory::Hematology,
            FfiTestCategory::Biochemistry => TestCategory::Biochemistry,
            FfiTestCategory::Microbiology => TestCategory::Microbiology,
            FfiTestCategory::Hormones => TestCategory::Hormones,
        }
    }
}

/// FFI-safe patient.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatient {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub gender: FfiGender,
    pub gender_label: String,
    pub phone: String,
    pub email: Option<String>,
    /// ISO date (YYYY-MM-DD)
    pub registered_at: String,
}

impl From<Patient> for FfiPatient {
    fn from(patient: Patient) -> Self {
        Self {
            gender_label: patient.gender.label().to_string(),
            id: patient.id,
            name: patient.name,
            age: patient.age,
            gender: patient.gender.into(),
            phone: patient.phone,
            email: patient.email,
            registered_at: patient.registered_at.to_string(),
        }
    }
}

/// FFI-safe catalog test.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiLabTest {
    pub id: String,
    pub code: String,
    pub name: String,
    pub price: u64,
    pub unit: String,
    pub normal_range: String,
    pub category: FfiTestCategory,
}

impl From<LabTest> for FfiLabTest {
    fn from(test: LabTest) -> Self {
        Self {
            id: test.id,
            code: test.code,
            name: test.name,
            price: test.price,
            unit: test.unit,
            normal_range: test.normal_range,
            category: test.category.into(),
        }
    }
}

/// FFI-safe fields for a new catalog test.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewLabTest {
    pub name: String,
    pub code: String,
    pub price: u64,
    pub unit: String,
    pub normal_range: String,
    pub category: FfiTestCategory,
}

impl From<FfiNewLabTest> for NewLabTest {
    fn from(test: FfiNewLabTest) -> Self {
        NewLabTest {
            name: test.name,
            code: test.code,
            price: test.price,
            unit: test.unit,
            normal_range: test.normal_range,
            category: test.category.into(),
        }
    }
}

/// FFI-safe test result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiTestResult {
    pub test_id: String,
    pub value: String,
    pub flag: String,
    pub notes: Option<String>,
}

impl From<TestResult> for FfiTestResult {
    fn from(result: TestResult) -> Self {
        Self {
            test_id: result.test_id,
            value: result.value,
            flag: format!("{:?}", result.flag),
            notes: result.notes,
        }
    }
}

/// FFI-safe visit.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiVisit {
    pub id: String,
    pub patient_id: String,
    /// ISO date (YYYY-MM-DD)
    pub date: String,
    pub status: String,
    pub status_label: String,
    pub selected_test_ids: Vec<String>,
    pub results: Vec<FfiTestResult>,
    pub total_cost: u64,
    pub ai_analysis: Option<String>,
    /// `false` when `ai_analysis` explains a failure
    pub ai_analysis_is_narrative: bool,
}

impl From<Visit> for FfiVisit {
    fn from(visit: Visit) -> Self {
        let ai_analysis_is_narrative = visit
            .ai_analysis
            .as_ref()
            .is_some_and(|note| note.is_narrative());
        Self {
            id: visit.id,
            patient_id: visit.patient_id,
            date: visit.date.to_string(),
            status: format!("{:?}", visit.status),
            status_label: visit.status.label().to_string(),
            selected_test_ids: visit.selected_test_ids,
            results: visit.results.into_iter().map(|r| r.into()).collect(),
            total_cost: visit.total_cost,
            ai_analysis: visit.ai_analysis.map(|note| note.text),
            ai_analysis_is_narrative,
        }
    }
}

/// FFI-safe lab settings.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiLabSettings {
    pub lab_name: String,
    pub address: String,
    pub phone: String,
    pub footer_text: String,
}

impl From<LabSettings> for FfiLabSettings {
    fn from(settings: LabSettings) -> Self {
        Self {
            lab_name: settings.lab_name,
            address: settings.address,
            phone: settings.phone,
            footer_text: settings.footer_text,
        }
    }
}

impl From<FfiLabSettings> for LabSettings {
    fn from(settings: FfiLabSettings) -> Self {
        LabSettings {
            lab_name: settings.lab_name,
            address: settings.address,
            phone: settings.phone,
            footer_text: settings.footer_text,
        }
    }
}

/// FFI-safe dashboard figures.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDashboardStats {
    pub total_patients: u64,
    pub revenue_today: u64,
    pub pending_visits: u64,
    pub completed_visits: u64,
}

impl From<DashboardStats> for FfiDashboardStats {
    fn from(stats: DashboardStats) -> Self {
        Self {
            total_patients: stats.total_patients as u64,
            revenue_today: stats.revenue_today,
            pending_visits: stats.pending_visits as u64,
            completed_visits: stats.completed_visits as u64,
        }
    }
}
