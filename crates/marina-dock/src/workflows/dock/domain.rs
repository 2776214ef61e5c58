use std::cmp::Ordering;
use std::fmt;
use std::num::NonZeroU32;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::layout::SegmentId;

/// Identifier wrapper for submitted dock applications.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier for a boating season (one per calendar year).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SeasonId(pub String);

impl fmt::Display for SeasonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Club member identifier. A member holds at most one application per season.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MemberId(pub String);

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Member snapshot captured on the application.
///
/// `seniority` is the club seniority number; lower numbers take their turn first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub seniority: u32,
}

/// Coarse priority tier for an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationCategory {
    /// Returning member keeping a boat of the same size.
    RenewalSame,
    /// Returning member moving to a larger boat.
    RenewalLarger,
    New,
}

impl ApplicationCategory {
    pub const fn tier(self) -> u8 {
        match self {
            ApplicationCategory::RenewalSame => 1,
            ApplicationCategory::RenewalLarger => 2,
            ApplicationCategory::New => 3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationCategory::RenewalSame => "renewal_same",
            ApplicationCategory::RenewalLarger => "renewal_larger",
            ApplicationCategory::New => "new",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "renewal_same" => Some(Self::RenewalSame),
            "renewal_larger" => Some(Self::RenewalLarger),
            "new" => Some(Self::New),
            _ => None,
        }
    }
}

/// Lifecycle status of a dock application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Assigned,
    Waitlist,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Assigned => "assigned",
            ApplicationStatus::Waitlist => "waitlist",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

/// Boat length in whole feet. Zero-length boats cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct BoatLength(NonZeroU32);

impl BoatLength {
    pub fn new(feet: u32) -> Result<Self, ValidationError> {
        NonZeroU32::new(feet)
            .map(Self)
            .ok_or(ValidationError::ZeroBoatLength)
    }

    pub const fn feet(self) -> u32 {
        self.0.get()
    }
}

impl TryFrom<u32> for BoatLength {
    type Error = ValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BoatLength> for u32 {
    fn from(value: BoatLength) -> Self {
        value.feet()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boat {
    pub name: String,
    pub length: BoatLength,
    pub kind: String,
    pub registration: String,
}

/// Liability coverage declared on the application, in whole dollars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insurance {
    pub coverage: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Stored application for one member in one season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockApplication {
    pub id: ApplicationId,
    pub season_id: SeasonId,
    pub member: Member,
    pub category: ApplicationCategory,
    pub boat: Boat,
    pub insurance: Insurance,
    pub status: ApplicationStatus,
}

impl DockApplication {
    /// Processing order: category tier, then seniority number, then id for a stable total order.
    pub fn priority_cmp(&self, other: &Self) -> Ordering {
        self.category
            .tier()
            .cmp(&other.category.tier())
            .then(self.member.seniority.cmp(&other.member.seniority))
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Raw intake payload. Validated by the intake guard before it becomes a `DockApplication`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSubmission {
    pub member: Member,
    pub category: ApplicationCategory,
    pub boat_name: String,
    pub boat_length: u32,
    pub boat_type: String,
    pub boat_registration: String,
    pub insurance_coverage: u64,
    #[serde(default)]
    pub insurance_notes: Option<String>,
}

/// Fields a member may change while the season accepts applications.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationPatch {
    #[serde(default)]
    pub category: Option<ApplicationCategory>,
    #[serde(default)]
    pub boat_name: Option<String>,
    #[serde(default)]
    pub boat_length: Option<u32>,
    #[serde(default)]
    pub boat_type: Option<String>,
    #[serde(default)]
    pub boat_registration: Option<String>,
    #[serde(default)]
    pub insurance_coverage: Option<u64>,
    #[serde(default)]
    pub insurance_notes: Option<String>,
}

impl From<ApplicationSubmission> for ApplicationPatch {
    fn from(submission: ApplicationSubmission) -> Self {
        Self {
            category: Some(submission.category),
            boat_name: Some(submission.boat_name),
            boat_length: Some(submission.boat_length),
            boat_type: Some(submission.boat_type),
            boat_registration: Some(submission.boat_registration),
            insurance_coverage: Some(submission.insurance_coverage),
            insurance_notes: submission.insurance_notes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonStatus {
    Planning,
    AcceptingApplications,
    ApplicationsClosed,
    BumpingInProgress,
    Completed,
}

impl SeasonStatus {
    pub const fn label(self) -> &'static str {
        match self {
            SeasonStatus::Planning => "planning",
            SeasonStatus::AcceptingApplications => "accepting_applications",
            SeasonStatus::ApplicationsClosed => "applications_closed",
            SeasonStatus::BumpingInProgress => "bumping_in_progress",
            SeasonStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    pub id: SeasonId,
    pub year: i32,
    pub application_start: NaiveDate,
    pub application_end: NaiveDate,
    #[serde(default)]
    pub bumping_date: Option<NaiveDate>,
    pub status: SeasonStatus,
}

impl Season {
    /// A season is active from the day its application window opens through the end of its year.
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        date >= self.application_start && date.year() <= self.year
    }

    pub fn accepts_applications(&self) -> bool {
        self.status == SeasonStatus::AcceptingApplications
    }
}

/// Request payload for opening a new season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSeason {
    pub year: i32,
    pub application_start: NaiveDate,
    pub application_end: NaiveDate,
    #[serde(default)]
    pub bumping_date: Option<NaiveDate>,
}

/// Date changes for an existing season. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonPatch {
    #[serde(default)]
    pub application_start: Option<NaiveDate>,
    #[serde(default)]
    pub application_end: Option<NaiveDate>,
    #[serde(default)]
    pub bumping_date: Option<NaiveDate>,
}

impl SeasonPatch {
    pub fn apply(self, mut season: Season) -> Season {
        if let Some(start) = self.application_start {
            season.application_start = start;
        }
        if let Some(end) = self.application_end {
            season.application_end = end;
        }
        if let Some(bumping_date) = self.bumping_date {
            season.bumping_date = Some(bumping_date);
        }
        season
    }
}

/// Input rejected before it reaches the planner or the repositories.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("boat length must be a positive whole number of feet")]
    ZeroBoatLength,
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("minimum insurance coverage of ${minimum} required (found ${found})")]
    InsufficientInsurance { minimum: u64, found: u64 },
    #[error("application window ends ({end}) before it starts ({start})")]
    InvalidApplicationWindow { start: NaiveDate, end: NaiveDate },
    #[error("dock layout has no segments")]
    EmptyLayout,
    #[error("pump-out sweep range {start}..={end} is empty")]
    EmptySweepRange { start: u32, end: u32 },
    #[error("too many applications to plan exactly (limit {limit}, found {found})")]
    TooManyApplications { limit: usize, found: usize },
    #[error("search gave up after {limit} memoized states; reduce the roster or raise the limit")]
    SearchTooLarge { limit: usize },
    #[error("application {0} appears more than once")]
    DuplicateApplication(ApplicationId),
    #[error("no applications to process")]
    NoApplications,
    #[error(
        "a {boat_length} ft boat at position {position} does not fit segment {segment:?} ({segment_length} ft)"
    )]
    PositionOutOfBounds {
        segment: SegmentId,
        position: u32,
        boat_length: u32,
        segment_length: u32,
    },
}
