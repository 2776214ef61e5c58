use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AdmissionPlanner, Allocation, Candidate, SlotAssignment};
use crate::workflows::dock::domain::{
    ApplicationCategory, ApplicationId, DockApplication, MemberId, ValidationError,
};
use crate::workflows::dock::layout::DockLayoutConfig;

/// Default cap on applications handed to the exact planner in one run. Rosters well past what the
/// default dock can hold still finish in seconds at this size; the memo cap below is what stops
/// a pathological roster.
pub const DEFAULT_MAX_APPLICATIONS: usize = 120;

/// Default cap on memoized states per pump-out position.
pub const DEFAULT_MAX_MEMO_STATES: usize = 5_000_000;

/// Sweeps the pump-out start over its configured range and keeps the best admission plan.
#[derive(Debug, Clone)]
pub struct PlanSearch {
    layout: DockLayoutConfig,
    max_applications: usize,
    max_memo_states: usize,
}

impl Default for PlanSearch {
    fn default() -> Self {
        Self::new(DockLayoutConfig::default(), DEFAULT_MAX_APPLICATIONS)
    }
}

impl PlanSearch {
    pub fn new(layout: DockLayoutConfig, max_applications: usize) -> Self {
        Self {
            layout,
            max_applications,
            max_memo_states: DEFAULT_MAX_MEMO_STATES,
        }
    }

    pub fn with_memo_limit(mut self, max_memo_states: usize) -> Self {
        self.max_memo_states = max_memo_states;
        self
    }

    /// Computes the best plan without touching any stored state.
    pub fn compute(&self, applications: &[DockApplication]) -> Result<DockPlan, ValidationError> {
        self.validate(applications)?;

        let mut ordered: Vec<&DockApplication> = applications.iter().collect();
        ordered.sort_by(|a, b| a.priority_cmp(b));

        let candidates: Vec<Candidate> = ordered
            .iter()
            .map(|application| Candidate {
                id: application.id.clone(),
                boat_length: application.boat.length.feet(),
            })
            .collect();

        let mut best: Option<(u32, Allocation)> = None;
        for pump_start in self.layout.pump_starts() {
            let segments = self.layout.segments(pump_start);
            let planner = AdmissionPlanner::new(&segments, self.layout.boat_spacing)?;
            let improved = match &best {
                None => Some(planner.admit_within(&candidates, self.max_memo_states)?),
                Some((_, incumbent)) => {
                    planner.improve_on(&candidates, incumbent, self.max_memo_states)?
                }
            };

            match improved {
                Some(allocation) => {
                    debug!(
                        pump_start,
                        count = allocation.count,
                        total_length = allocation.total_length,
                        "pump-out position improves the plan"
                    );
                    best = Some((pump_start, allocation));
                }
                None => debug!(pump_start, "pump-out position cannot improve the plan"),
            }
        }

        let (pump_start, allocation) =
            best.unwrap_or_else(|| (self.layout.pump_start_min, Allocation::default()));
        let (admitted, waitlist) = ordered
            .into_iter()
            .map(PlannedEntry::from)
            .partition(|entry| allocation.assignments.contains_key(&entry.application_id));

        Ok(DockPlan {
            max_boats: allocation.count,
            total_length: allocation.total_length,
            pump_start,
            assignments: allocation.assignments,
            admitted,
            waitlist,
            layout: self.layout.clone(),
        })
    }

    fn validate(&self, applications: &[DockApplication]) -> Result<(), ValidationError> {
        if self.layout.pump_start_min > self.layout.pump_start_max {
            return Err(ValidationError::EmptySweepRange {
                start: self.layout.pump_start_min,
                end: self.layout.pump_start_max,
            });
        }

        if applications.len() > self.max_applications {
            return Err(ValidationError::TooManyApplications {
                limit: self.max_applications,
                found: applications.len(),
            });
        }

        let mut seen = HashSet::new();
        for application in applications {
            if !seen.insert(&application.id) {
                return Err(ValidationError::DuplicateApplication(
                    application.id.clone(),
                ));
            }
        }

        Ok(())
    }
}

/// Snapshot of an application as it stood when the plan was computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedEntry {
    pub application_id: ApplicationId,
    pub member_id: MemberId,
    pub member_name: String,
    pub seniority: u32,
    pub category: ApplicationCategory,
    pub boat_name: String,
    pub boat_length: u32,
}

impl From<&DockApplication> for PlannedEntry {
    fn from(application: &DockApplication) -> Self {
        Self {
            application_id: application.id.clone(),
            member_id: application.member.id.clone(),
            member_name: application.member.name.clone(),
            seniority: application.member.seniority,
            category: application.category,
            boat_name: application.boat.name.clone(),
            boat_length: application.boat.length.feet(),
        }
    }
}

/// Winning admission plan for a season. Both lists are in priority order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockPlan {
    pub max_boats: usize,
    pub total_length: u64,
    pub pump_start: u32,
    pub assignments: BTreeMap<ApplicationId, SlotAssignment>,
    pub admitted: Vec<PlannedEntry>,
    pub waitlist: Vec<PlannedEntry>,
    /// Layout the plan was computed against. Slot maps and the bumping party read positions
    /// from this copy, not from whatever the service is configured with later.
    pub layout: DockLayoutConfig,
}

impl DockPlan {
    pub fn is_admitted(&self, id: &ApplicationId) -> bool {
        self.assignments.contains_key(id)
    }

    pub fn slot_for(&self, id: &ApplicationId) -> Option<SlotAssignment> {
        self.assignments.get(id).copied()
    }

    /// Admitted entry whose turn it is at `cursor` during the bumping party.
    pub fn admitted_at(&self, cursor: usize) -> Option<&PlannedEntry> {
        self.admitted.get(cursor)
    }
}
