//! The bumping party: admitted members pick their berth one at a time in priority order.
//!
//! The sequencer only decides transitions; persisting them is the service's job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{ApplicationId, DockApplication, MemberId, SeasonId, ValidationError};
use super::layout::SegmentId;
use super::planner::{DockPlan, PlannedEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BumpingPhase {
    NotStarted,
    InProgress,
    Completed,
}

impl BumpingPhase {
    pub fn of(state: Option<&BumpingState>) -> Self {
        state.map_or(BumpingPhase::NotStarted, BumpingState::phase)
    }
}

/// Progress of a season's bumping party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BumpingState {
    pub season_id: SeasonId,
    /// Index into the plan's admitted list of the member whose turn it is.
    pub cursor: usize,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl BumpingState {
    pub fn begin(season_id: SeasonId, now: DateTime<Utc>) -> Self {
        Self {
            season_id,
            cursor: 0,
            started_at: now,
            completed_at: None,
        }
    }

    pub fn phase(&self) -> BumpingPhase {
        if self.completed_at.is_some() {
            BumpingPhase::Completed
        } else {
            BumpingPhase::InProgress
        }
    }
}

/// Berth chosen on behalf of a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub application_id: ApplicationId,
    pub segment: SegmentId,
    /// Distance in feet from the start of the segment to the bow of the boat.
    pub position: u32,
}

/// Confirmed berth for one member in one season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub season_id: SeasonId,
    pub application_id: ApplicationId,
    pub member_id: MemberId,
    pub segment: SegmentId,
    pub position: u32,
    pub boat_length: u32,
    pub locked: bool,
    pub confirmed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BumpingError {
    #[error("bumping party already in progress")]
    AlreadyInProgress,
    #[error("bumping party not in progress")]
    NotInProgress,
    #[error("application {found} is out of turn; waiting on {expected}")]
    OutOfTurn {
        expected: ApplicationId,
        found: ApplicationId,
    },
    #[error(transparent)]
    Rejected(#[from] ValidationError),
}

/// Outcome of starting a party.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kickoff {
    pub state: BumpingState,
    /// A finished party exists and must be cleared before `state` is stored.
    pub replaces_completed: bool,
}

/// Outcome of one confirmed selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advance {
    pub assignment: Assignment,
    pub cursor: usize,
    pub completed: bool,
}

pub struct BumpingSequencer<'a> {
    plan: &'a DockPlan,
}

impl<'a> BumpingSequencer<'a> {
    pub fn new(plan: &'a DockPlan) -> Self {
        Self { plan }
    }

    pub fn start(
        &self,
        season_id: SeasonId,
        existing: Option<&BumpingState>,
        now: DateTime<Utc>,
    ) -> Result<Kickoff, BumpingError> {
        let replaces_completed = match BumpingPhase::of(existing) {
            BumpingPhase::InProgress => return Err(BumpingError::AlreadyInProgress),
            BumpingPhase::Completed => true,
            BumpingPhase::NotStarted => false,
        };

        let mut state = BumpingState::begin(season_id, now);
        if self.plan.admitted.is_empty() {
            state.completed_at = Some(now);
        }

        Ok(Kickoff {
            state,
            replaces_completed,
        })
    }

    /// Validate a selection for the member whose turn it is and compute the next state.
    pub fn confirm(
        &self,
        state: &BumpingState,
        application: &DockApplication,
        selection: &Selection,
        now: DateTime<Utc>,
    ) -> Result<Advance, BumpingError> {
        if state.phase() != BumpingPhase::InProgress {
            return Err(BumpingError::NotInProgress);
        }

        let expected = self
            .plan
            .admitted_at(state.cursor)
            .ok_or(BumpingError::NotInProgress)?;
        if expected.application_id != selection.application_id
            || application.id != selection.application_id
        {
            return Err(BumpingError::OutOfTurn {
                expected: expected.application_id.clone(),
                found: selection.application_id.clone(),
            });
        }

        let boat_length = application.boat.length.feet();
        self.check_position(selection, boat_length)?;

        let cursor = state.cursor + 1;
        Ok(Advance {
            assignment: Assignment {
                season_id: state.season_id.clone(),
                application_id: application.id.clone(),
                member_id: application.member.id.clone(),
                segment: selection.segment,
                position: selection.position,
                boat_length,
                locked: true,
                confirmed_at: now,
            },
            cursor,
            completed: cursor >= self.plan.admitted.len(),
        })
    }

    /// The boat must lie entirely within the chosen segment of the plan's layout.
    pub fn check_position(
        &self,
        selection: &Selection,
        boat_length: u32,
    ) -> Result<(), ValidationError> {
        let segment = self.plan.layout.segment(self.plan.pump_start, selection.segment);
        let end = u64::from(selection.position) + u64::from(boat_length);
        if end > u64::from(segment.length) {
            return Err(ValidationError::PositionOutOfBounds {
                segment: segment.id,
                position: selection.position,
                boat_length,
                segment_length: segment.length,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueStatus {
    Complete,
    UpNow,
    Waiting,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueEntry {
    pub turn: usize,
    pub entry: PlannedEntry,
    pub status: QueueStatus,
}

/// Admitted members in turn order with their progress through the party.
pub fn queue(plan: &DockPlan, state: Option<&BumpingState>) -> Vec<QueueEntry> {
    plan.admitted
        .iter()
        .enumerate()
        .map(|(turn, entry)| {
            let status = match state {
                None => QueueStatus::Waiting,
                Some(state) if state.completed_at.is_some() => QueueStatus::Complete,
                Some(state) if turn < state.cursor => QueueStatus::Complete,
                Some(state) if turn == state.cursor => QueueStatus::UpNow,
                Some(_) => QueueStatus::Waiting,
            };
            QueueEntry {
                turn,
                entry: entry.clone(),
                status,
            }
        })
        .collect()
}
