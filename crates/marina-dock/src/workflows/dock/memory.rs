//! Mutex-guarded in-memory repositories used by the demo server and the tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, Utc};

use super::bumping::{Assignment, BumpingState};
use super::domain::{
    ApplicationId, ApplicationStatus, DockApplication, MemberId, Season, SeasonId, SeasonStatus,
};
use super::repository::{
    ApplicationRepository, AssignmentRepository, BumpingStateRepository, DockStore,
    PlanRepository, RepositoryError, SeasonRepository, StoredPlan,
};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))
}

#[derive(Default, Clone)]
pub struct MemoryApplications {
    records: Arc<Mutex<BTreeMap<ApplicationId, DockApplication>>>,
}

impl ApplicationRepository for MemoryApplications {
    fn insert(&self, application: DockApplication) -> Result<DockApplication, RepositoryError> {
        let mut guard = lock(&self.records)?;
        if guard.contains_key(&application.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(application.id.clone(), application.clone());
        Ok(application)
    }

    fn update(&self, application: DockApplication) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records)?;
        match guard.get_mut(&application.id) {
            Some(existing) => {
                *existing = application;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<DockApplication>, RepositoryError> {
        Ok(lock(&self.records)?.get(id).cloned())
    }

    fn find_by_member(
        &self,
        season_id: &SeasonId,
        member_id: &MemberId,
    ) -> Result<Option<DockApplication>, RepositoryError> {
        Ok(lock(&self.records)?
            .values()
            .find(|record| &record.season_id == season_id && &record.member.id == member_id)
            .cloned())
    }

    fn list_by_season(&self, season_id: &SeasonId) -> Result<Vec<DockApplication>, RepositoryError> {
        Ok(lock(&self.records)?
            .values()
            .filter(|record| &record.season_id == season_id)
            .cloned()
            .collect())
    }

    fn update_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records)?;
        let record = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        record.status = status;
        Ok(())
    }
}

#[derive(Default, Clone)]
pub struct MemorySeasons {
    records: Arc<Mutex<BTreeMap<SeasonId, Season>>>,
}

impl SeasonRepository for MemorySeasons {
    fn insert(&self, season: Season) -> Result<Season, RepositoryError> {
        let mut guard = lock(&self.records)?;
        if guard.contains_key(&season.id) || guard.values().any(|s| s.year == season.year) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(season.id.clone(), season.clone());
        Ok(season)
    }

    fn fetch(&self, id: &SeasonId) -> Result<Option<Season>, RepositoryError> {
        Ok(lock(&self.records)?.get(id).cloned())
    }

    fn find_by_year(&self, year: i32) -> Result<Option<Season>, RepositoryError> {
        Ok(lock(&self.records)?
            .values()
            .find(|season| season.year == year)
            .cloned())
    }

    fn list(&self) -> Result<Vec<Season>, RepositoryError> {
        Ok(lock(&self.records)?.values().cloned().collect())
    }

    fn update(&self, season: Season) -> Result<Season, RepositoryError> {
        let mut guard = lock(&self.records)?;
        let stored = guard.get_mut(&season.id).ok_or(RepositoryError::NotFound)?;
        *stored = season.clone();
        Ok(season)
    }

    fn update_status(&self, id: &SeasonId, status: SeasonStatus) -> Result<Season, RepositoryError> {
        let mut guard = lock(&self.records)?;
        let season = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        season.status = status;
        Ok(season.clone())
    }

    fn find_active_on(&self, date: NaiveDate) -> Result<Option<Season>, RepositoryError> {
        Ok(lock(&self.records)?
            .values()
            .filter(|season| season.is_active_on(date))
            .max_by_key(|season| season.year)
            .cloned())
    }
}

#[derive(Default, Clone)]
pub struct MemoryPlans {
    records: Arc<Mutex<HashMap<SeasonId, StoredPlan>>>,
}

impl PlanRepository for MemoryPlans {
    fn save(&self, plan: StoredPlan) -> Result<StoredPlan, RepositoryError> {
        lock(&self.records)?.insert(plan.season_id.clone(), plan.clone());
        Ok(plan)
    }

    fn load(&self, season_id: &SeasonId) -> Result<Option<StoredPlan>, RepositoryError> {
        Ok(lock(&self.records)?.get(season_id).cloned())
    }
}

#[derive(Default, Clone)]
pub struct MemoryAssignments {
    records: Arc<Mutex<Vec<Assignment>>>,
}

impl AssignmentRepository for MemoryAssignments {
    fn insert(&self, assignment: Assignment) -> Result<Assignment, RepositoryError> {
        lock(&self.records)?.push(assignment.clone());
        Ok(assignment)
    }

    fn delete_by_member(
        &self,
        season_id: &SeasonId,
        member_id: &MemberId,
    ) -> Result<usize, RepositoryError> {
        let mut guard = lock(&self.records)?;
        let before = guard.len();
        guard.retain(|record| !(&record.season_id == season_id && &record.member_id == member_id));
        Ok(before - guard.len())
    }

    fn list_by_season(&self, season_id: &SeasonId) -> Result<Vec<Assignment>, RepositoryError> {
        let mut assignments: Vec<Assignment> = lock(&self.records)?
            .iter()
            .filter(|record| &record.season_id == season_id)
            .cloned()
            .collect();
        assignments.sort_by_key(|record| (record.segment, record.position));
        Ok(assignments)
    }
}

#[derive(Default, Clone)]
pub struct MemoryBumpingStates {
    records: Arc<Mutex<HashMap<SeasonId, BumpingState>>>,
}

impl MemoryBumpingStates {
    fn modify(
        &self,
        season_id: &SeasonId,
        change: impl FnOnce(&mut BumpingState),
    ) -> Result<BumpingState, RepositoryError> {
        let mut guard = lock(&self.records)?;
        let state = guard.get_mut(season_id).ok_or(RepositoryError::NotFound)?;
        change(state);
        Ok(state.clone())
    }
}

impl BumpingStateRepository for MemoryBumpingStates {
    fn create(&self, state: BumpingState) -> Result<BumpingState, RepositoryError> {
        let mut guard = lock(&self.records)?;
        if guard.contains_key(&state.season_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(state.season_id.clone(), state.clone());
        Ok(state)
    }

    fn update_cursor(
        &self,
        season_id: &SeasonId,
        cursor: usize,
    ) -> Result<BumpingState, RepositoryError> {
        self.modify(season_id, |state| state.cursor = cursor)
    }

    fn mark_complete(
        &self,
        season_id: &SeasonId,
        completed_at: DateTime<Utc>,
    ) -> Result<BumpingState, RepositoryError> {
        self.modify(season_id, |state| state.completed_at = Some(completed_at))
    }

    fn reset(&self, season_id: &SeasonId) -> Result<(), RepositoryError> {
        lock(&self.records)?.remove(season_id);
        Ok(())
    }

    fn load(&self, season_id: &SeasonId) -> Result<Option<BumpingState>, RepositoryError> {
        Ok(lock(&self.records)?.get(season_id).cloned())
    }
}

/// All in-memory repositories behind one handle.
#[derive(Default, Clone)]
pub struct MemoryStore {
    pub applications: MemoryApplications,
    pub seasons: MemorySeasons,
    pub plans: MemoryPlans,
    pub assignments: MemoryAssignments,
    pub bumping: MemoryBumpingStates,
}

impl DockStore for MemoryStore {
    type Applications = MemoryApplications;
    type Seasons = MemorySeasons;
    type Plans = MemoryPlans;
    type Assignments = MemoryAssignments;
    type Bumping = MemoryBumpingStates;

    fn applications(&self) -> &Self::Applications {
        &self.applications
    }

    fn seasons(&self) -> &Self::Seasons {
        &self.seasons
    }

    fn plans(&self) -> &Self::Plans {
        &self.plans
    }

    fn assignments(&self) -> &Self::Assignments {
        &self.assignments
    }

    fn bumping(&self) -> &Self::Bumping {
        &self.bumping
    }
}
