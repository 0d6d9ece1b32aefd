//! Dashboard statistics.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::engine::LabState;

/// Headline figures for the dashboard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_patients: usize,
    /// Sum of totals for visits dated `today`
    pub revenue_today: u64,
    /// Visits not yet completed
    pub pending_visits: usize,
    pub completed_visits: usize,
}

impl DashboardStats {
    pub fn compute(state: &LabState, today: NaiveDate) -> Self {
        let visits = state.visits();
        let completed_visits = visits.iter().filter(|v| v.status.is_completed()).count();

        Self {
            total_patients: state.patients().len(),
            revenue_today: visits
                .iter()
                .filter(|v| v.date == today)
                .map(|v| v.total_cost)
                .sum(),
            pending_visits: visits.len() - completed_visits,
            completed_visits,
        }
    }
}
