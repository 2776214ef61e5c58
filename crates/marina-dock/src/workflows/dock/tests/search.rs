use super::common::*;

use crate::workflows::dock::domain::{ApplicationCategory, ApplicationId, ValidationError};
use crate::workflows::dock::layout::{DockLayoutConfig, SegmentId};
use crate::workflows::dock::planner::{PlanSearch, PlannedEntry, SlotAssignment};

fn ids(entries: &[PlannedEntry]) -> Vec<&str> {
    entries
        .iter()
        .map(|entry| entry.application_id.0.as_str())
        .collect()
}

#[test]
fn single_fifty_foot_renewal_lands_on_the_small_dock() {
    let search = PlanSearch::default();
    let plan = search
        .compute(&[application("a1", 1, ApplicationCategory::RenewalSame, 50)])
        .expect("plan computes");

    assert_eq!(plan.max_boats, 1);
    assert_eq!(plan.total_length, 50);
    assert_eq!(plan.pump_start, 455);
    assert_eq!(
        plan.slot_for(&ApplicationId("a1".to_string())),
        Some(SlotAssignment {
            segment: SegmentId::Small,
            order: 0,
        })
    );
    assert!(plan.waitlist.is_empty());
}

#[test]
fn two_five_hundred_foot_boats_admit_only_the_senior_member() {
    let search = PlanSearch::default();
    let plan = search
        .compute(&[
            application("junior", 8, ApplicationCategory::New, 500),
            application("senior", 2, ApplicationCategory::New, 500),
        ])
        .expect("plan computes");

    assert_eq!(plan.max_boats, 1);
    assert_eq!(ids(&plan.admitted), vec!["senior"]);
    assert_eq!(ids(&plan.waitlist), vec!["junior"]);
    assert_eq!(plan.pump_start, 455);
    assert_eq!(
        plan.slot_for(&ApplicationId("senior".to_string()))
            .map(|slot| slot.segment),
        Some(SegmentId::MainOutsideLower)
    );
}

#[test]
fn category_outranks_seniority_when_only_one_fits() {
    let search = PlanSearch::new(single_slip_layout(60), 10);
    let plan = search
        .compute(&[
            application("newcomer", 1, ApplicationCategory::New, 50),
            application("upsizing", 40, ApplicationCategory::RenewalLarger, 50),
            application("returning", 90, ApplicationCategory::RenewalSame, 50),
        ])
        .expect("plan computes");

    assert_eq!(ids(&plan.admitted), vec!["returning"]);
    assert_eq!(ids(&plan.waitlist), vec!["upsizing", "newcomer"]);
}

#[test]
fn equal_counts_prefer_the_longer_admission_set() {
    let search = PlanSearch::new(single_slip_layout(60), 10);
    let plan = search
        .compute(&[
            application("a", 1, ApplicationCategory::RenewalSame, 20),
            application("b", 2, ApplicationCategory::RenewalSame, 30),
            application("c", 3, ApplicationCategory::RenewalSame, 35),
        ])
        .expect("plan computes");

    assert_eq!(plan.max_boats, 2);
    assert_eq!(plan.total_length, 55);
    assert_eq!(ids(&plan.admitted), vec!["a", "c"]);
    assert_eq!(ids(&plan.waitlist), vec!["b"]);
}

#[test]
fn sweep_keeps_the_first_best_pump_start() {
    // Only the outside run is usable, so a longer upper segment is what admits the third boat.
    let layout = DockLayoutConfig {
        small_length: 0,
        inside_south_length: 0,
        inside_north_length: 0,
        inside_gap: 0,
        outside_run_length: 200,
        pump_zone_width: 10,
        pump_start_min: 40,
        pump_start_max: 60,
        boat_spacing: 3,
    };
    let search = PlanSearch::new(layout, 10);
    let plan = search
        .compute(&[
            application("a", 1, ApplicationCategory::RenewalSame, 25),
            application("b", 2, ApplicationCategory::RenewalSame, 25),
            application("c", 3, ApplicationCategory::RenewalSame, 130),
        ])
        .expect("plan computes");

    // Upper needs 25 + 3 + 25 = 53; lower then has 200 - 63 = 137 for the 130 ft boat.
    assert_eq!(plan.max_boats, 3);
    assert_eq!(plan.pump_start, 53);
}

#[test]
fn empty_roster_yields_an_empty_plan() {
    let plan = PlanSearch::default().compute(&[]).expect("plan computes");

    assert_eq!(plan.max_boats, 0);
    assert_eq!(plan.total_length, 0);
    assert!(plan.admitted.is_empty());
    assert!(plan.waitlist.is_empty());
    assert!(plan.assignments.is_empty());
}

#[test]
fn identical_input_gives_identical_plans() {
    let search = PlanSearch::new(compact_layout(), 10);
    let roster: Vec<_> = pseudo_random_lengths(3, 6)
        .into_iter()
        .enumerate()
        .map(|(index, length)| {
            application(
                &format!("app-{index}"),
                index as u32 % 3,
                ApplicationCategory::New,
                length,
            )
        })
        .collect();
    let mut reversed = roster.clone();
    reversed.reverse();

    let first = search.compute(&roster).expect("plan computes");
    let second = search.compute(&reversed).expect("plan computes");

    assert_eq!(first, second);
}

#[test]
fn rejects_oversized_and_duplicate_rosters() {
    let search = PlanSearch::new(compact_layout(), 2);
    let roster = vec![
        application("a", 1, ApplicationCategory::New, 20),
        application("b", 2, ApplicationCategory::New, 20),
        application("c", 3, ApplicationCategory::New, 20),
    ];
    assert_eq!(
        search.compute(&roster),
        Err(ValidationError::TooManyApplications { limit: 2, found: 3 })
    );

    let duplicated = vec![
        application("a", 1, ApplicationCategory::New, 20),
        application("a", 1, ApplicationCategory::New, 20),
    ];
    assert_eq!(
        search.compute(&duplicated),
        Err(ValidationError::DuplicateApplication(ApplicationId(
            "a".to_string()
        )))
    );
}

#[test]
fn rejects_an_inverted_sweep_range() {
    let layout = DockLayoutConfig {
        pump_start_min: 520,
        pump_start_max: 500,
        ..DockLayoutConfig::default()
    };

    assert_eq!(
        PlanSearch::new(layout, 10).compute(&[]),
        Err(ValidationError::EmptySweepRange {
            start: 520,
            end: 500,
        })
    );
}

#[test]
fn memo_limit_surfaces_as_a_validation_error() {
    // The 50 ft boat has to be skipped to beat it, so the search cannot settle on the first path.
    let roster = vec![
        application("a", 1, ApplicationCategory::RenewalSame, 10),
        application("b", 2, ApplicationCategory::RenewalSame, 50),
        application("c", 3, ApplicationCategory::RenewalSame, 20),
        application("d", 4, ApplicationCategory::RenewalSame, 30),
    ];

    let bounded = PlanSearch::new(single_slip_layout(60), 10).with_memo_limit(2);
    assert_eq!(
        bounded.compute(&roster),
        Err(ValidationError::SearchTooLarge { limit: 2 })
    );

    let plan = PlanSearch::new(single_slip_layout(60), 10)
        .compute(&roster)
        .expect("plan computes");
    assert_eq!((plan.max_boats, plan.total_length), (2, 50));
    assert_eq!(ids(&plan.admitted), vec!["a", "c"]);
}

#[test]
fn full_default_roster_completes_under_the_default_limits() {
    let roster: Vec<_> = pseudo_random_lengths(11, 40)
        .into_iter()
        .enumerate()
        .map(|(index, length)| {
            application(
                &format!("app-{index:02}"),
                index as u32,
                ApplicationCategory::RenewalSame,
                length,
            )
        })
        .collect();

    let plan = PlanSearch::default().compute(&roster).expect("plan computes");

    // 1,546 ft with clearance against roughly 2,250 ft of dock.
    assert_eq!(plan.max_boats, 40);
    assert_eq!(plan.total_length, 1_426);
    assert!(plan.waitlist.is_empty());
    assert_eq!(plan.pump_start, 455);
    assert_eq!(plan.assignments.len(), 40);
}

#[test]
fn oversubscribed_default_roster_waitlists_the_most_junior() {
    let roster: Vec<_> = (0..60)
        .map(|index| {
            application(
                &format!("app-{index:02}"),
                index,
                ApplicationCategory::RenewalSame,
                40,
            )
        })
        .collect();

    let plan = PlanSearch::default().compute(&roster).expect("plan computes");

    assert_eq!(plan.max_boats, 50);
    assert_eq!(plan.total_length, 2_000);
    assert_eq!(plan.pump_start, 455);
    assert_eq!(
        ids(&plan.waitlist),
        (50..60).map(|index| format!("app-{index:02}")).collect::<Vec<_>>()
    );
}
