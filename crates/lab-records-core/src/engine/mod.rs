//! Application state and the controller that owns it.
//!
//! [`LabController`] is the only way to mutate [`LabState`]. Every named
//! operation validates its input, applies the change in memory, and then
//! writes the full snapshot of the touched slot to the store.

mod analysis;
mod catalog;
mod patients;
mod results;
mod visits;

pub use analysis::*;
pub use catalog::*;
pub use patients::*;
pub use results::*;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use crate::db::{DbError, Slot, SnapshotStore};
use crate::models::{seed_patients, seed_tests, LabSettings, LabTest, Patient, Visit};

/// Engine errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Confirmation required to {0}")]
    ConfirmationRequired(String),

    #[error("Store error: {0}")]
    Store(#[from] DbError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Operator answer to a destructive-action prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl Confirmation {
    /// Fail with `ConfirmationRequired` unless confirmed.
    fn require(self, action: &str) -> EngineResult<()> {
        match self {
            Confirmation::Confirmed => Ok(()),
            Confirmation::Declined => Err(EngineError::ConfirmationRequired(action.to_string())),
        }
    }
}

impl From<bool> for Confirmation {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            Confirmation::Confirmed
        } else {
            Confirmation::Declined
        }
    }
}

/// The whole in-memory dataset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabState {
    patients: Vec<Patient>,
    tests: Vec<LabTest>,
    /// Most recent first
    visits: Vec<Visit>,
    settings: LabSettings,
}

impl Default for LabState {
    /// The seed dataset.
    fn default() -> Self {
        Self {
            patients: seed_patients(),
            tests: seed_tests(),
            visits: Vec::new(),
            settings: LabSettings::default(),
        }
    }
}

impl LabState {
    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    pub fn tests(&self) -> &[LabTest] {
        &self.tests
    }

    pub fn visits(&self) -> &[Visit] {
        &self.visits
    }

    pub fn settings(&self) -> &LabSettings {
        &self.settings
    }

    pub fn patient(&self, id: &str) -> Option<&Patient> {
        self.patients.iter().find(|p| p.id == id)
    }

    pub fn test(&self, id: &str) -> Option<&LabTest> {
        self.tests.iter().find(|t| t.id == id)
    }

    pub fn visit(&self, id: &str) -> Option<&Visit> {
        self.visits.iter().find(|v| v.id == id)
    }
}

/// Owner of the lab state and its store.
pub struct LabController<S: SnapshotStore> {
    state: LabState,
    store: S,
}

impl<S: SnapshotStore> LabController<S> {
    /// Load every slot once, falling back to seed data for absent slots.
    pub fn load(store: S) -> EngineResult<Self> {
        let defaults = LabState::default();
        let state = LabState {
            patients: load_slot(&store, Slot::Patients)?.unwrap_or(defaults.patients),
            tests: load_slot(&store, Slot::Tests)?.unwrap_or(defaults.tests),
            visits: load_slot(&store, Slot::Visits)?.unwrap_or(defaults.visits),
            settings: load_slot(&store, Slot::Settings)?.unwrap_or(defaults.settings),
        };

        tracing::info!(
            patients = state.patients.len(),
            tests = state.tests.len(),
            visits = state.visits.len(),
            "Lab state loaded"
        );

        Ok(Self { state, store })
    }

    /// Read-only view of the current state.
    pub fn state(&self) -> &LabState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Release the store (e.g., to reload from it).
    pub fn into_store(self) -> S {
        self.store
    }

    /// Replace the lab settings.
    pub fn update_settings(&mut self, settings: LabSettings) -> EngineResult<()> {
        self.commit(Slot::Settings, |state| state.settings = settings)?;
        tracing::info!(lab_name = %self.state.settings.lab_name, "Lab settings updated");
        Ok(())
    }

    /// Write every slot.
    pub fn persist_all(&mut self) -> EngineResult<()> {
        for slot in Slot::ALL {
            self.persist(slot)?;
        }
        Ok(())
    }

    /// Apply `change` to the state and write the touched slot.
    ///
    /// If the write fails the state is restored and the error returned, so a
    /// failed operation leaves nothing behind in memory.
    fn commit<T>(&mut self, slot: Slot, change: impl FnOnce(&mut LabState) -> T) -> EngineResult<T> {
        let previous = self.state.clone();
        let output = change(&mut self.state);

        if let Err(e) = self.persist(slot) {
            tracing::warn!(slot = slot.key(), error = %e, "Snapshot write failed, change reverted");
            self.state = previous;
            return Err(e);
        }
        Ok(output)
    }

    /// Write the full snapshot of one slot.
    fn persist(&mut self, slot: Slot) -> EngineResult<()> {
        let snapshot = match slot {
            Slot::Patients => serde_json::to_string(&self.state.patients)?,
            Slot::Tests => serde_json::to_string(&self.state.tests)?,
            Slot::Visits => serde_json::to_string(&self.state.visits)?,
            Slot::Settings => serde_json::to_string(&self.state.settings)?,
        };
        self.store.save(slot, &snapshot)?;
        Ok(())
    }
}

fn load_slot<T: DeserializeOwned, S: SnapshotStore>(store: &S, slot: Slot) -> EngineResult<Option<T>> {
    match store.load(slot)? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}
