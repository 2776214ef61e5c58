use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use crate::config::PlannerConfig;
use crate::workflows::dock::bumping::{Assignment, BumpingState};
use crate::workflows::dock::domain::{
    ApplicationCategory, ApplicationId, ApplicationStatus, ApplicationSubmission, Boat,
    BoatLength, DockApplication, Insurance, Member, MemberId, NewSeason, Season, SeasonId,
    SeasonStatus,
};
use crate::workflows::dock::layout::DockLayoutConfig;
use crate::workflows::dock::repository::{
    ApplicationRepository, AssignmentRepository, BumpingStateRepository, DockStore,
    PlanRepository, RepositoryError, SeasonRepository, StoredPlan,
};
use crate::workflows::dock::memory::{
    MemoryApplications, MemoryAssignments, MemoryBumpingStates, MemoryPlans, MemorySeasons,
};
use crate::workflows::dock::{dock_router, DockPlanningService, MemoryStore};

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn new_season(year: i32) -> NewSeason {
    NewSeason {
        year,
        application_start: date(year, 1, 15),
        application_end: date(year, 3, 31),
        bumping_date: Some(date(year, 4, 12)),
    }
}

pub(super) fn submission(
    member: &str,
    seniority: u32,
    category: ApplicationCategory,
    boat_length: u32,
) -> ApplicationSubmission {
    ApplicationSubmission {
        member: Member {
            id: MemberId(member.to_string()),
            name: format!("Member {member}"),
            seniority,
        },
        category,
        boat_name: format!("Boat of {member}"),
        boat_length,
        boat_type: "sloop".to_string(),
        boat_registration: format!("IA-{seniority:04}"),
        insurance_coverage: 750_000,
        insurance_notes: None,
    }
}

/// Pending application built directly, bypassing intake.
pub(super) fn application(
    id: &str,
    seniority: u32,
    category: ApplicationCategory,
    boat_length: u32,
) -> DockApplication {
    DockApplication {
        id: ApplicationId(id.to_string()),
        season_id: SeasonId("season-2025".to_string()),
        member: Member {
            id: MemberId(format!("member-{id}")),
            name: format!("Owner {id}"),
            seniority,
        },
        category,
        boat: Boat {
            name: format!("Hull {id}"),
            length: BoatLength::new(boat_length).expect("positive length"),
            kind: "sloop".to_string(),
            registration: format!("IA-{id}"),
        },
        insurance: Insurance {
            coverage: 750_000,
            notes: None,
        },
        status: ApplicationStatus::Pending,
    }
}

/// Only the small dock is usable, and the sweep has a single position.
pub(super) fn single_slip_layout(small_length: u32) -> DockLayoutConfig {
    DockLayoutConfig {
        small_length,
        inside_south_length: 0,
        inside_north_length: 0,
        inside_gap: 0,
        outside_run_length: 0,
        pump_zone_width: 0,
        pump_start_min: 0,
        pump_start_max: 0,
        boat_spacing: 3,
    }
}

/// Five short segments so exhaustive checks stay cheap.
pub(super) fn compact_layout() -> DockLayoutConfig {
    DockLayoutConfig {
        small_length: 100,
        inside_south_length: 80,
        inside_north_length: 60,
        inside_gap: 20,
        outside_run_length: 150,
        pump_zone_width: 10,
        pump_start_min: 70,
        pump_start_max: 70,
        boat_spacing: 3,
    }
}

/// Deterministic boat lengths between 15 and 59 ft.
pub(super) fn pseudo_random_lengths(seed: u64, count: usize) -> Vec<u32> {
    let mut state = seed;
    (0..count)
        .map(|_| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            15 + ((state >> 33) % 45) as u32
        })
        .collect()
}

pub(super) fn build_service() -> (DockPlanningService<MemoryStore>, Arc<MemoryStore>) {
    build_service_with(PlannerConfig::default())
}

pub(super) fn build_service_with(
    config: PlannerConfig,
) -> (DockPlanningService<MemoryStore>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let service = DockPlanningService::new(store.clone(), &config);
    (service, store)
}

/// Creates the 2025 season and opens it for applications.
pub(super) fn open_season(service: &DockPlanningService<MemoryStore>) -> Season {
    let season = service
        .create_season(new_season(2025))
        .expect("season created");
    service
        .set_season_status(&season.id, SeasonStatus::AcceptingApplications)
        .expect("season opened")
}

pub(super) fn dock_router_with_service(service: DockPlanningService<MemoryStore>) -> axum::Router {
    dock_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Store whose every repository call fails as if the database were down.
#[derive(Default)]
pub(super) struct OfflineStore {
    repository: OfflineRepository,
}

#[derive(Default)]
pub(super) struct OfflineRepository;

fn offline<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::Unavailable("database offline".to_string()))
}

impl ApplicationRepository for OfflineRepository {
    fn insert(&self, _application: DockApplication) -> Result<DockApplication, RepositoryError> {
        offline()
    }

    fn update(&self, _application: DockApplication) -> Result<(), RepositoryError> {
        offline()
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<DockApplication>, RepositoryError> {
        offline()
    }

    fn find_by_member(
        &self,
        _season_id: &SeasonId,
        _member_id: &MemberId,
    ) -> Result<Option<DockApplication>, RepositoryError> {
        offline()
    }

    fn list_by_season(&self, _season_id: &SeasonId) -> Result<Vec<DockApplication>, RepositoryError> {
        offline()
    }

    fn update_status(
        &self,
        _id: &ApplicationId,
        _status: ApplicationStatus,
    ) -> Result<(), RepositoryError> {
        offline()
    }
}

impl SeasonRepository for OfflineRepository {
    fn insert(&self, _season: Season) -> Result<Season, RepositoryError> {
        offline()
    }

    fn fetch(&self, _id: &SeasonId) -> Result<Option<Season>, RepositoryError> {
        offline()
    }

    fn find_by_year(&self, _year: i32) -> Result<Option<Season>, RepositoryError> {
        offline()
    }

    fn list(&self) -> Result<Vec<Season>, RepositoryError> {
        offline()
    }

    fn update(&self, _season: Season) -> Result<Season, RepositoryError> {
        offline()
    }

    fn update_status(&self, _id: &SeasonId, _status: SeasonStatus) -> Result<Season, RepositoryError> {
        offline()
    }

    fn find_active_on(&self, _date: NaiveDate) -> Result<Option<Season>, RepositoryError> {
        offline()
    }
}

impl PlanRepository for OfflineRepository {
    fn save(&self, _plan: StoredPlan) -> Result<StoredPlan, RepositoryError> {
        offline()
    }

    fn load(&self, _season_id: &SeasonId) -> Result<Option<StoredPlan>, RepositoryError> {
        offline()
    }
}

impl AssignmentRepository for OfflineRepository {
    fn insert(&self, _assignment: Assignment) -> Result<Assignment, RepositoryError> {
        offline()
    }

    fn delete_by_member(
        &self,
        _season_id: &SeasonId,
        _member_id: &MemberId,
    ) -> Result<usize, RepositoryError> {
        offline()
    }

    fn list_by_season(&self, _season_id: &SeasonId) -> Result<Vec<Assignment>, RepositoryError> {
        offline()
    }
}

impl BumpingStateRepository for OfflineRepository {
    fn create(&self, _state: BumpingState) -> Result<BumpingState, RepositoryError> {
        offline()
    }

    fn update_cursor(
        &self,
        _season_id: &SeasonId,
        _cursor: usize,
    ) -> Result<BumpingState, RepositoryError> {
        offline()
    }

    fn mark_complete(
        &self,
        _season_id: &SeasonId,
        _completed_at: DateTime<Utc>,
    ) -> Result<BumpingState, RepositoryError> {
        offline()
    }

    fn reset(&self, _season_id: &SeasonId) -> Result<(), RepositoryError> {
        offline()
    }

    fn load(&self, _season_id: &SeasonId) -> Result<Option<BumpingState>, RepositoryError> {
        offline()
    }
}

impl DockStore for OfflineStore {
    type Applications = OfflineRepository;
    type Seasons = OfflineRepository;
    type Plans = OfflineRepository;
    type Assignments = OfflineRepository;
    type Bumping = OfflineRepository;

    fn applications(&self) -> &Self::Applications {
        &self.repository
    }

    fn seasons(&self) -> &Self::Seasons {
        &self.repository
    }

    fn plans(&self) -> &Self::Plans {
        &self.repository
    }

    fn assignments(&self) -> &Self::Assignments {
        &self.repository
    }

    fn bumping(&self) -> &Self::Bumping {
        &self.repository
    }
}

/// In-memory store whose application status writes fail; everything else works.
#[derive(Default)]
pub(super) struct FrozenStatusStore {
    pub(super) inner: MemoryStore,
    applications: FrozenStatuses,
}

#[derive(Default)]
pub(super) struct FrozenStatuses(MemoryApplications);

impl ApplicationRepository for FrozenStatuses {
    fn insert(&self, application: DockApplication) -> Result<DockApplication, RepositoryError> {
        self.0.insert(application)
    }

    fn update(&self, application: DockApplication) -> Result<(), RepositoryError> {
        self.0.update(application)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<DockApplication>, RepositoryError> {
        self.0.fetch(id)
    }

    fn find_by_member(
        &self,
        season_id: &SeasonId,
        member_id: &MemberId,
    ) -> Result<Option<DockApplication>, RepositoryError> {
        self.0.find_by_member(season_id, member_id)
    }

    fn list_by_season(&self, season_id: &SeasonId) -> Result<Vec<DockApplication>, RepositoryError> {
        self.0.list_by_season(season_id)
    }

    fn update_status(
        &self,
        _id: &ApplicationId,
        _status: ApplicationStatus,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("status column locked".to_string()))
    }
}

impl DockStore for FrozenStatusStore {
    type Applications = FrozenStatuses;
    type Seasons = MemorySeasons;
    type Plans = MemoryPlans;
    type Assignments = MemoryAssignments;
    type Bumping = MemoryBumpingStates;

    fn applications(&self) -> &Self::Applications {
        &self.applications
    }

    fn seasons(&self) -> &Self::Seasons {
        &self.inner.seasons
    }

    fn plans(&self) -> &Self::Plans {
        &self.inner.plans
    }

    fn assignments(&self) -> &Self::Assignments {
        &self.inner.assignments
    }

    fn bumping(&self) -> &Self::Bumping {
        &self.inner.bumping
    }
}
