use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::bumping::{Assignment, BumpingState};
use super::domain::{
    ApplicationId, ApplicationStatus, DockApplication, MemberId, Season, SeasonId, SeasonStatus,
};
use super::planner::DockPlan;

/// Plan as persisted for a season, replaced wholesale on recomputation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredPlan {
    pub season_id: SeasonId,
    pub plan: DockPlan,
    pub computed_at: DateTime<Utc>,
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, application: DockApplication) -> Result<DockApplication, RepositoryError>;
    fn update(&self, application: DockApplication) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<DockApplication>, RepositoryError>;
    fn find_by_member(
        &self,
        season_id: &SeasonId,
        member_id: &MemberId,
    ) -> Result<Option<DockApplication>, RepositoryError>;
    /// All applications of a season, in no particular order.
    fn list_by_season(&self, season_id: &SeasonId) -> Result<Vec<DockApplication>, RepositoryError>;
    fn update_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<(), RepositoryError>;
}

pub trait SeasonRepository: Send + Sync {
    fn insert(&self, season: Season) -> Result<Season, RepositoryError>;
    fn fetch(&self, id: &SeasonId) -> Result<Option<Season>, RepositoryError>;
    fn find_by_year(&self, year: i32) -> Result<Option<Season>, RepositoryError>;
    fn list(&self) -> Result<Vec<Season>, RepositoryError>;
    /// Replace a stored season. Fails with `NotFound` when the id is unknown.
    fn update(&self, season: Season) -> Result<Season, RepositoryError>;
    fn update_status(&self, id: &SeasonId, status: SeasonStatus) -> Result<Season, RepositoryError>;
    /// Latest season whose active range covers `date`.
    fn find_active_on(&self, date: NaiveDate) -> Result<Option<Season>, RepositoryError>;
}

pub trait PlanRepository: Send + Sync {
    /// Store the plan, replacing any earlier plan for the same season.
    fn save(&self, plan: StoredPlan) -> Result<StoredPlan, RepositoryError>;
    fn load(&self, season_id: &SeasonId) -> Result<Option<StoredPlan>, RepositoryError>;
}

pub trait AssignmentRepository: Send + Sync {
    fn insert(&self, assignment: Assignment) -> Result<Assignment, RepositoryError>;
    /// Returns how many assignments were removed.
    fn delete_by_member(
        &self,
        season_id: &SeasonId,
        member_id: &MemberId,
    ) -> Result<usize, RepositoryError>;
    fn list_by_season(&self, season_id: &SeasonId) -> Result<Vec<Assignment>, RepositoryError>;
}

pub trait BumpingStateRepository: Send + Sync {
    /// Fails with `Conflict` when the season already has a state.
    fn create(&self, state: BumpingState) -> Result<BumpingState, RepositoryError>;
    fn update_cursor(
        &self,
        season_id: &SeasonId,
        cursor: usize,
    ) -> Result<BumpingState, RepositoryError>;
    fn mark_complete(
        &self,
        season_id: &SeasonId,
        completed_at: DateTime<Utc>,
    ) -> Result<BumpingState, RepositoryError>;
    fn reset(&self, season_id: &SeasonId) -> Result<(), RepositoryError>;
    fn load(&self, season_id: &SeasonId) -> Result<Option<BumpingState>, RepositoryError>;
}

/// Bundle of every collaborator the planning service talks to.
///
/// The service writes through the individual repositories one call at a time; nothing here is
/// transactional. Plan commits write application statuses before the plan itself so that a
/// failure part way leaves the previous plan in place.
pub trait DockStore: Send + Sync {
    type Applications: ApplicationRepository;
    type Seasons: SeasonRepository;
    type Plans: PlanRepository;
    type Assignments: AssignmentRepository;
    type Bumping: BumpingStateRepository;

    fn applications(&self) -> &Self::Applications;
    fn seasons(&self) -> &Self::Seasons;
    fn plans(&self) -> &Self::Plans;
    fn assignments(&self) -> &Self::Assignments;
    fn bumping(&self) -> &Self::Bumping;
}
