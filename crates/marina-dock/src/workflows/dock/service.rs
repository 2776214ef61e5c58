use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};

use super::bumping::{
    queue, Assignment, BumpingError, BumpingPhase, BumpingSequencer, BumpingState, QueueEntry,
    Selection,
};
use super::domain::{
    ApplicationId, ApplicationPatch, ApplicationStatus, ApplicationSubmission, DockApplication,
    NewSeason, Season, SeasonId, SeasonPatch, SeasonStatus, ValidationError,
};
use super::intake::IntakeGuard;
use super::planner::{DockPlan, PlanSearch};
use super::repository::{
    ApplicationRepository, AssignmentRepository, BumpingStateRepository, DockStore,
    PlanRepository, RepositoryError, SeasonRepository, StoredPlan,
};
use super::slots::{slot_map, SegmentSlots};
use crate::config::PlannerConfig;

/// Service composing intake validation, plan search, the bumping sequencer and storage.
///
/// Every operation that writes season-scoped records holds that season's lock for its whole
/// read-modify-write cycle.
pub struct DockPlanningService<S> {
    store: Arc<S>,
    search: PlanSearch,
    guard: IntakeGuard,
    locks: SeasonLocks,
    sequence: AtomicU64,
}

impl<S> DockPlanningService<S>
where
    S: DockStore + 'static,
{
    pub fn new(store: Arc<S>, config: &PlannerConfig) -> Self {
        Self {
            store,
            search: PlanSearch::new(config.layout.clone(), config.max_applications)
                .with_memo_limit(config.max_memo_states),
            guard: IntakeGuard::new(config.minimum_insurance),
            locks: SeasonLocks::default(),
            sequence: AtomicU64::new(1),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn create_season(&self, request: NewSeason) -> Result<Season, DockServiceError> {
        if request.application_end < request.application_start {
            return Err(ValidationError::InvalidApplicationWindow {
                start: request.application_start,
                end: request.application_end,
            }
            .into());
        }

        let season = Season {
            id: SeasonId(format!("season-{}", request.year)),
            year: request.year,
            application_start: request.application_start,
            application_end: request.application_end,
            bumping_date: request.bumping_date,
            status: SeasonStatus::Planning,
        };
        let stored = self.store.seasons().insert(season)?;
        info!(season = %stored.id, year = stored.year, "season created");
        Ok(stored)
    }

    /// Every season, most recent year first.
    pub fn seasons(&self) -> Result<Vec<Season>, DockServiceError> {
        let mut seasons = self.store.seasons().list()?;
        seasons.sort_by(|a, b| b.year.cmp(&a.year));
        Ok(seasons)
    }

    /// Moves a season's application window or bumping date. Status changes go through
    /// [`set_season_status`](Self::set_season_status).
    #[instrument(skip(self, patch), fields(season = %season_id))]
    pub fn update_season(
        &self,
        season_id: &SeasonId,
        patch: SeasonPatch,
    ) -> Result<Season, DockServiceError> {
        let handle = self.locks.handle(season_id);
        let _turn = handle.lock().unwrap_or_else(PoisonError::into_inner);

        let season = patch.apply(self.season(season_id)?);
        if season.application_end < season.application_start {
            return Err(ValidationError::InvalidApplicationWindow {
                start: season.application_start,
                end: season.application_end,
            }
            .into());
        }

        let updated = self.store.seasons().update(season)?;
        info!(
            start = %updated.application_start,
            end = %updated.application_end,
            "season updated"
        );
        Ok(updated)
    }

    pub fn season(&self, season_id: &SeasonId) -> Result<Season, DockServiceError> {
        self.store
            .seasons()
            .fetch(season_id)?
            .ok_or_else(|| DockServiceError::not_found("season", season_id))
    }

    /// Season whose active range covers `date`; resolved once at the edge of the system.
    pub fn current_season(&self, date: NaiveDate) -> Result<Season, DockServiceError> {
        self.store
            .seasons()
            .find_active_on(date)?
            .ok_or_else(|| DockServiceError::not_found("season", date))
    }

    pub fn set_season_status(
        &self,
        season_id: &SeasonId,
        status: SeasonStatus,
    ) -> Result<Season, DockServiceError> {
        let handle = self.locks.handle(season_id);
        let _turn = handle.lock().unwrap_or_else(PoisonError::into_inner);

        self.season(season_id)?;
        Ok(self.store.seasons().update_status(season_id, status)?)
    }

    /// Submit a member's application, or update it when the member already applied this season.
    #[instrument(skip(self, submission), fields(season = %season_id, member = %submission.member.id))]
    pub fn submit_application(
        &self,
        season_id: &SeasonId,
        submission: ApplicationSubmission,
    ) -> Result<DockApplication, DockServiceError> {
        let handle = self.locks.handle(season_id);
        let _turn = handle.lock().unwrap_or_else(PoisonError::into_inner);

        let season = self.season(season_id)?;
        ensure_accepting(&season)?;

        let applications = self.store.applications();
        match applications.find_by_member(season_id, &submission.member.id)? {
            Some(existing) => {
                let updated = self.guard.apply_patch(&existing, submission.into())?;
                applications.update(updated.clone())?;
                info!(application = %updated.id, "application updated");
                Ok(updated)
            }
            None => {
                let application = self.guard.application_from_submission(
                    self.next_application_id(),
                    season_id.clone(),
                    submission,
                )?;
                let stored = applications.insert(application)?;
                info!(application = %stored.id, "application submitted");
                Ok(stored)
            }
        }
    }

    pub fn amend_application(
        &self,
        application_id: &ApplicationId,
        patch: ApplicationPatch,
    ) -> Result<DockApplication, DockServiceError> {
        let season_id = self.application(application_id)?.season_id;
        let handle = self.locks.handle(&season_id);
        let _turn = handle.lock().unwrap_or_else(PoisonError::into_inner);

        let application = self.application(application_id)?;
        let season = self.season(&season_id)?;
        ensure_accepting(&season)?;

        let updated = self.guard.apply_patch(&application, patch)?;
        self.store.applications().update(updated.clone())?;
        Ok(updated)
    }

    pub fn application(
        &self,
        application_id: &ApplicationId,
    ) -> Result<DockApplication, DockServiceError> {
        self.store
            .applications()
            .fetch(application_id)?
            .ok_or_else(|| DockServiceError::not_found("application", application_id))
    }

    /// Applications of a season in planning priority order.
    pub fn applications(
        &self,
        season_id: &SeasonId,
    ) -> Result<Vec<DockApplication>, DockServiceError> {
        self.season(season_id)?;
        let mut applications = self.store.applications().list_by_season(season_id)?;
        applications.sort_by(|a, b| a.priority_cmp(b));
        Ok(applications)
    }

    /// Administrative status override.
    pub fn set_status(
        &self,
        application_id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<DockApplication, DockServiceError> {
        let mut application = self.application(application_id)?;
        let handle = self.locks.handle(&application.season_id);
        let _turn = handle.lock().unwrap_or_else(PoisonError::into_inner);

        self.store
            .applications()
            .update_status(application_id, status)?;
        application.status = status;
        info!(application = %application_id, status = status.label(), "status overridden");
        Ok(application)
    }

    pub fn stats(&self, season_id: &SeasonId) -> Result<ApplicationStats, DockServiceError> {
        Ok(ApplicationStats::tally(&self.applications(season_id)?))
    }

    /// Compute the best plan for a season without committing it.
    pub fn compute_plan(&self, season_id: &SeasonId) -> Result<DockPlan, DockServiceError> {
        let applications = self.applications(season_id)?;
        if applications.is_empty() {
            return Err(ValidationError::NoApplications.into());
        }
        Ok(self.search.compute(&applications)?)
    }

    /// Persist a computed plan and move every application to `approved` or `waitlist`.
    pub fn commit_plan(
        &self,
        season_id: &SeasonId,
        plan: DockPlan,
    ) -> Result<StoredPlan, DockServiceError> {
        let handle = self.locks.handle(season_id);
        let _turn = handle.lock().unwrap_or_else(PoisonError::into_inner);
        self.commit_locked(season_id, plan)
    }

    /// Compute and commit under one season lock.
    #[instrument(skip(self), fields(season = %season_id))]
    pub fn plan_season(&self, season_id: &SeasonId) -> Result<StoredPlan, DockServiceError> {
        let handle = self.locks.handle(season_id);
        let _turn = handle.lock().unwrap_or_else(PoisonError::into_inner);

        let plan = self.compute_plan(season_id)?;
        self.commit_locked(season_id, plan)
    }

    pub fn plan(&self, season_id: &SeasonId) -> Result<StoredPlan, DockServiceError> {
        self.store
            .plans()
            .load(season_id)?
            .ok_or_else(|| DockServiceError::not_found("plan", season_id))
    }

    pub fn slot_map(&self, season_id: &SeasonId) -> Result<Vec<SegmentSlots>, DockServiceError> {
        let stored = self.plan(season_id)?;
        Ok(slot_map(&stored.plan))
    }

    #[instrument(skip(self), fields(season = %season_id))]
    pub fn start_bumping(&self, season_id: &SeasonId) -> Result<BumpingState, DockServiceError> {
        let handle = self.locks.handle(season_id);
        let _turn = handle.lock().unwrap_or_else(PoisonError::into_inner);

        self.season(season_id)?;
        let stored = self.plan(season_id)?;
        let bumping = self.store.bumping();
        let existing = bumping.load(season_id)?;

        let kickoff = BumpingSequencer::new(&stored.plan).start(
            season_id.clone(),
            existing.as_ref(),
            Utc::now(),
        )?;
        if kickoff.replaces_completed {
            bumping.reset(season_id)?;
        }

        let state = bumping.create(kickoff.state)?;
        let season_status = match state.phase() {
            BumpingPhase::Completed => SeasonStatus::Completed,
            _ => SeasonStatus::BumpingInProgress,
        };
        self.store.seasons().update_status(season_id, season_status)?;

        info!(admitted = stored.plan.admitted.len(), "bumping party started");
        Ok(state)
    }

    /// Confirm the berth picked for the member whose turn it is, then advance the party.
    #[instrument(skip(self, selection), fields(season = %season_id, application = %selection.application_id))]
    pub fn confirm_selection(
        &self,
        season_id: &SeasonId,
        selection: Selection,
    ) -> Result<SelectionOutcome, DockServiceError> {
        let handle = self.locks.handle(season_id);
        let _turn = handle.lock().unwrap_or_else(PoisonError::into_inner);

        let bumping = self.store.bumping();
        let state = bumping
            .load(season_id)?
            .ok_or(BumpingError::NotInProgress)?;
        let stored = self.plan(season_id)?;
        let application = self.application(&selection.application_id)?;

        let advance = BumpingSequencer::new(&stored.plan).confirm(
            &state,
            &application,
            &selection,
            Utc::now(),
        )?;

        let assignments = self.store.assignments();
        let replaced = assignments.delete_by_member(season_id, &application.member.id)?;
        if replaced > 0 {
            warn!(replaced, member = %application.member.id, "replaced earlier assignment");
        }
        let assignment = assignments.insert(advance.assignment)?;
        self.store
            .applications()
            .update_status(&application.id, ApplicationStatus::Assigned)?;

        let state = if advance.completed {
            let state = bumping.mark_complete(season_id, assignment.confirmed_at)?;
            self.store
                .seasons()
                .update_status(season_id, SeasonStatus::Completed)?;
            info!("bumping party completed");
            state
        } else {
            bumping.update_cursor(season_id, advance.cursor)?
        };

        info!(
            cursor = state.cursor,
            segment = assignment.segment.as_str(),
            position = assignment.position,
            "selection confirmed"
        );
        Ok(SelectionOutcome {
            assignment,
            completed: advance.completed,
            state,
        })
    }

    pub fn bumping_overview(
        &self,
        season_id: &SeasonId,
    ) -> Result<BumpingOverview, DockServiceError> {
        let state = self
            .store
            .bumping()
            .load(season_id)?
            .ok_or_else(|| DockServiceError::not_found("bumping state", season_id))?;
        let stored = self.plan(season_id)?;
        let assignments = self.store.assignments().list_by_season(season_id)?;
        let queue = queue(&stored.plan, Some(&state));

        Ok(BumpingOverview {
            phase: state.phase(),
            state,
            plan: stored,
            assignments,
            queue,
        })
    }

    fn commit_locked(
        &self,
        season_id: &SeasonId,
        plan: DockPlan,
    ) -> Result<StoredPlan, DockServiceError> {
        if let Some(state) = self.store.bumping().load(season_id)? {
            if state.phase() == BumpingPhase::InProgress {
                return Err(BumpingError::AlreadyInProgress.into());
            }
        }

        // Statuses go first: if one of them fails, the previous plan stays the stored one.
        let applications = self.store.applications();
        for entry in &plan.admitted {
            applications.update_status(&entry.application_id, ApplicationStatus::Approved)?;
        }
        for entry in &plan.waitlist {
            applications.update_status(&entry.application_id, ApplicationStatus::Waitlist)?;
        }

        let stored = self.store.plans().save(StoredPlan {
            season_id: season_id.clone(),
            plan,
            computed_at: Utc::now(),
        })?;

        info!(
            season = %season_id,
            max_boats = stored.plan.max_boats,
            total_length = stored.plan.total_length,
            pump_start = stored.plan.pump_start,
            waitlisted = stored.plan.waitlist.len(),
            "dock plan committed"
        );
        Ok(stored)
    }

    fn next_application_id(&self) -> ApplicationId {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        ApplicationId(format!("app-{id:06}"))
    }
}

fn ensure_accepting(season: &Season) -> Result<(), StateError> {
    if season.accepts_applications() {
        Ok(())
    } else {
        Err(StateError::NotAcceptingApplications {
            season: season.id.clone(),
            status: season.status.label(),
        })
    }
}

/// One mutex per season, created on first use.
#[derive(Default)]
struct SeasonLocks {
    locks: Mutex<HashMap<SeasonId, Arc<Mutex<()>>>>,
}

impl SeasonLocks {
    fn handle(&self, season_id: &SeasonId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(season_id.clone()).or_default().clone()
    }
}

/// Application counts by status for one season.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplicationStats {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub assigned: usize,
    pub waitlist: usize,
    pub rejected: usize,
}

impl ApplicationStats {
    pub fn tally(applications: &[DockApplication]) -> Self {
        applications
            .iter()
            .fold(Self::default(), |mut stats, application| {
                stats.total += 1;
                match application.status {
                    ApplicationStatus::Pending => stats.pending += 1,
                    ApplicationStatus::Approved => stats.approved += 1,
                    ApplicationStatus::Assigned => stats.assigned += 1,
                    ApplicationStatus::Waitlist => stats.waitlist += 1,
                    ApplicationStatus::Rejected => stats.rejected += 1,
                }
                stats
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionOutcome {
    pub assignment: Assignment,
    pub state: BumpingState,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BumpingOverview {
    pub phase: BumpingPhase,
    pub state: BumpingState,
    pub plan: StoredPlan,
    pub assignments: Vec<Assignment>,
    pub queue: Vec<QueueEntry>,
}

/// Transition refused because of the season's or the party's current state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("season {season} is not accepting applications (status: {status})")]
    NotAcceptingApplications {
        season: SeasonId,
        status: &'static str,
    },
    #[error(transparent)]
    Bumping(BumpingError),
}

/// Error raised by the dock planning service.
#[derive(Debug, thiserror::Error)]
pub enum DockServiceError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error(transparent)]
    InvalidState(#[from] StateError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl DockServiceError {
    fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<BumpingError> for DockServiceError {
    fn from(error: BumpingError) -> Self {
        match error {
            BumpingError::Rejected(validation) => Self::Validation(validation),
            other => Self::InvalidState(StateError::Bumping(other)),
        }
    }
}
