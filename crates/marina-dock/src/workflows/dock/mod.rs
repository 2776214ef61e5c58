//! Dock space allocation for a yacht club marina.
//!
//! Applications are collected per season, the planner picks the admission set that fits the
//! most boats (then the most total boat length) for the best pump-out position, and the
//! bumping party lets admitted members confirm their berths in priority order.

pub mod bumping;
pub mod domain;
pub mod intake;
pub mod layout;
pub mod memory;
pub mod planner;
pub mod repository;
pub mod roster;
pub mod router;
pub mod service;
pub mod slots;

#[cfg(test)]
mod tests;

pub use bumping::{
    queue, Assignment, BumpingError, BumpingPhase, BumpingSequencer, BumpingState, QueueEntry,
    QueueStatus, Selection,
};
pub use domain::{
    ApplicationCategory, ApplicationId, ApplicationPatch, ApplicationStatus,
    ApplicationSubmission, Boat, BoatLength, DockApplication, Insurance, Member, MemberId,
    NewSeason, Season, SeasonId, SeasonPatch, SeasonStatus, ValidationError,
};
pub use intake::{IntakeGuard, DEFAULT_MINIMUM_INSURANCE};
pub use layout::{Dock, DockLayoutConfig, Orientation, Segment, SegmentId};
pub use memory::MemoryStore;
pub use planner::{
    AdmissionPlanner, Allocation, Candidate, DockPlan, PlanSearch, PlannedEntry, SlotAssignment,
    DEFAULT_MAX_APPLICATIONS, DEFAULT_MAX_MEMO_STATES,
};
pub use repository::{
    ApplicationRepository, AssignmentRepository, BumpingStateRepository, DockStore,
    PlanRepository, RepositoryError, SeasonRepository, StoredPlan,
};
pub use roster::{parse_roster, RosterImportError};
pub use router::dock_router;
pub use service::{
    ApplicationStats, BumpingOverview, DockPlanningService, DockServiceError, SelectionOutcome,
    StateError,
};
pub use slots::{proposed_berth, slot_map, ProposedBerth, SegmentSlots};
