use super::domain::{
    ApplicationId, ApplicationPatch, ApplicationStatus, ApplicationSubmission, Boat, BoatLength,
    DockApplication, Insurance, SeasonId, ValidationError,
};

/// Club minimum for liability coverage, in dollars.
pub const DEFAULT_MINIMUM_INSURANCE: u64 = 500_000;

/// Guard that turns raw submissions and patches into valid applications.
#[derive(Debug, Clone)]
pub struct IntakeGuard {
    minimum_insurance: u64,
}

impl Default for IntakeGuard {
    fn default() -> Self {
        Self::new(DEFAULT_MINIMUM_INSURANCE)
    }
}

impl IntakeGuard {
    pub fn new(minimum_insurance: u64) -> Self {
        Self { minimum_insurance }
    }

    pub fn minimum_insurance(&self) -> u64 {
        self.minimum_insurance
    }

    /// Validate a submission and build a pending application from it.
    pub fn application_from_submission(
        &self,
        id: ApplicationId,
        season_id: SeasonId,
        submission: ApplicationSubmission,
    ) -> Result<DockApplication, ValidationError> {
        if submission.member.id.0.trim().is_empty() {
            return Err(ValidationError::MissingField("member.id"));
        }
        if submission.member.name.trim().is_empty() {
            return Err(ValidationError::MissingField("member.name"));
        }

        let boat = Boat {
            name: required("boat_name", submission.boat_name)?,
            length: BoatLength::new(submission.boat_length)?,
            kind: required("boat_type", submission.boat_type)?,
            registration: required("boat_registration", submission.boat_registration)?,
        };
        let insurance = self.insurance(submission.insurance_coverage, submission.insurance_notes)?;

        Ok(DockApplication {
            id,
            season_id,
            member: submission.member,
            category: submission.category,
            boat,
            insurance,
            status: ApplicationStatus::Pending,
        })
    }

    /// Apply a patch, validating every field it touches. The application is unchanged on error.
    pub fn apply_patch(
        &self,
        application: &DockApplication,
        patch: ApplicationPatch,
    ) -> Result<DockApplication, ValidationError> {
        let mut updated = application.clone();

        if let Some(category) = patch.category {
            updated.category = category;
        }
        if let Some(name) = patch.boat_name {
            updated.boat.name = required("boat_name", name)?;
        }
        if let Some(length) = patch.boat_length {
            updated.boat.length = BoatLength::new(length)?;
        }
        if let Some(kind) = patch.boat_type {
            updated.boat.kind = required("boat_type", kind)?;
        }
        if let Some(registration) = patch.boat_registration {
            updated.boat.registration = required("boat_registration", registration)?;
        }
        if let Some(coverage) = patch.insurance_coverage {
            updated.insurance = self.insurance(coverage, updated.insurance.notes.take())?;
        }
        if let Some(notes) = patch.insurance_notes {
            updated.insurance.notes = non_blank(notes);
        }

        Ok(updated)
    }

    fn insurance(&self, coverage: u64, notes: Option<String>) -> Result<Insurance, ValidationError> {
        if coverage == 0 {
            return Err(ValidationError::MissingField("insurance_coverage"));
        }
        if coverage < self.minimum_insurance {
            return Err(ValidationError::InsufficientInsurance {
                minimum: self.minimum_insurance,
                found: coverage,
            });
        }

        Ok(Insurance {
            coverage,
            notes: notes.and_then(non_blank),
        })
    }
}

fn required(field: &'static str, value: String) -> Result<String, ValidationError> {
    non_blank(value).ok_or(ValidationError::MissingField(field))
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
