use super::common::*;

use crate::workflows::dock::domain::ApplicationId;
use crate::workflows::dock::layout::Segment;
use crate::workflows::dock::planner::{required_length, AdmissionPlanner, Allocation, Candidate};

fn candidates(lengths: &[u32]) -> Vec<Candidate> {
    lengths
        .iter()
        .enumerate()
        .map(|(index, &boat_length)| Candidate {
            id: ApplicationId(format!("cand-{index:02}")),
            boat_length,
        })
        .collect()
}

/// Enumerates every placement, including leaving a boat out, and returns the best score.
fn exhaustive_best(segments: &[Segment], lengths: &[u32], spacing: u32) -> (usize, u64) {
    let options = segments.len() + 1;
    let combinations = options.pow(lengths.len() as u32);
    let mut best = (0, 0);

    for mut code in 0..combinations {
        let mut sums = vec![0u64; segments.len()];
        let mut counts = vec![0u32; segments.len()];
        for &length in lengths {
            let choice = code % options;
            code /= options;
            if choice < segments.len() {
                sums[choice] += u64::from(length);
                counts[choice] += 1;
            }
        }

        let feasible = segments.iter().enumerate().all(|(index, segment)| {
            required_length(sums[index], counts[index], spacing) <= u64::from(segment.length)
        });
        if feasible {
            let score = (
                counts.iter().sum::<u32>() as usize,
                sums.iter().sum::<u64>(),
            );
            if score > best {
                best = score;
            }
        }
    }

    best
}

fn assert_within_capacity(segments: &[Segment], allocation: &Allocation, lengths: &[u32]) {
    for segment in segments {
        let placed: Vec<u32> = candidates(lengths)
            .iter()
            .filter(|candidate| {
                allocation
                    .assignments
                    .get(&candidate.id)
                    .is_some_and(|slot| slot.segment == segment.id)
            })
            .map(|candidate| candidate.boat_length)
            .collect();
        let sum: u64 = placed.iter().map(|&length| u64::from(length)).sum();
        assert!(
            required_length(sum, placed.len() as u32, 3) <= u64::from(segment.length),
            "segment {:?} over capacity with {:?}",
            segment.id,
            placed
        );
    }
}

#[test]
fn matches_exhaustive_search_on_small_rosters() {
    let layout = compact_layout();
    let segments = layout.segments(70);
    let planner = AdmissionPlanner::new(&segments, layout.boat_spacing).expect("segments exist");

    for seed in 1..=12 {
        let lengths = pseudo_random_lengths(seed, 6);
        let allocation = planner.admit(&candidates(&lengths));

        assert_eq!(
            (allocation.count, allocation.total_length),
            exhaustive_best(&segments, &lengths, layout.boat_spacing),
            "seed {seed} lengths {lengths:?}"
        );
        assert_eq!(allocation.assignments.len(), allocation.count);
        assert_within_capacity(&segments, &allocation, &lengths);
    }
}

#[test]
fn reported_totals_match_the_assignments() {
    let layout = compact_layout();
    let segments = layout.segments(70);
    let planner = AdmissionPlanner::new(&segments, layout.boat_spacing).expect("segments exist");
    let lengths = pseudo_random_lengths(99, 7);
    let pool = candidates(&lengths);

    let allocation = planner.admit(&pool);
    let admitted_length: u64 = pool
        .iter()
        .filter(|candidate| allocation.assignments.contains_key(&candidate.id))
        .map(|candidate| u64::from(candidate.boat_length))
        .sum();

    assert_eq!(admitted_length, allocation.total_length);
}

#[test]
fn adding_an_application_never_lowers_the_count() {
    let layout = compact_layout();
    let segments = layout.segments(70);
    let planner = AdmissionPlanner::new(&segments, layout.boat_spacing).expect("segments exist");
    let lengths = pseudo_random_lengths(7, 7);

    let mut previous = 0;
    for size in 0..=lengths.len() {
        let allocation = planner.admit(&candidates(&lengths[..size]));
        assert!(allocation.count >= previous);
        previous = allocation.count;
    }
}

#[test]
fn more_boats_win_over_more_length() {
    let layout = single_slip_layout(60);
    let segments = layout.segments(0);
    let planner = AdmissionPlanner::new(&segments, 3).expect("segments exist");

    let allocation = planner.admit(&candidates(&[55, 28, 28]));

    assert_eq!(allocation.count, 2);
    assert_eq!(allocation.total_length, 56);
    assert!(!allocation
        .assignments
        .contains_key(&ApplicationId("cand-00".to_string())));
}

#[test]
fn spacing_is_charged_between_boats_only() {
    let layout = single_slip_layout(60);
    let segments = layout.segments(0);
    let planner = AdmissionPlanner::new(&segments, 3).expect("segments exist");

    // 28 + 3 + 29 = 60 fits exactly; 28 + 3 + 30 does not.
    assert_eq!(planner.admit(&candidates(&[28, 29])).count, 2);
    assert_eq!(planner.admit(&candidates(&[28, 30])).count, 1);
    assert_eq!(planner.admit(&candidates(&[60])).count, 1);
    assert_eq!(planner.admit(&candidates(&[61])).count, 0);
}

#[test]
fn zero_length_segments_receive_no_boats() {
    let layout = single_slip_layout(40);
    let segments = layout.segments(0);
    let planner = AdmissionPlanner::new(&segments, 3).expect("segments exist");

    let allocation = planner.admit(&candidates(&[30, 30]));

    assert_eq!(allocation.count, 1);
    assert!(allocation
        .assignments
        .values()
        .all(|slot| slot.segment == segments[0].id));
}
