//! Exact admission planning for one dock layout.
//!
//! Applications are explored in the order given (the caller sorts them by priority). Each one is
//! either placed into a segment that still has room or skipped, and the best outcome is the one
//! admitting the most boats, then the most total boat length. Sub-results are memoized on the
//! application index together with the room left in every segment.
//!
//! The search is a branch and bound: every state is capped by [`bounds::SuffixBounds`], a branch
//! only has to be followed when it could strictly beat what the state already has, and a state
//! whose best branch meets its ceiling stops there. Since a later branch can at most tie and
//! ties keep the earlier branch, pruning never changes which plan wins.

mod bounds;
mod occupancy;
pub mod search;

pub use occupancy::{footprint, required_length, segment_room};
pub use search::{
    DockPlan, PlanSearch, PlannedEntry, DEFAULT_MAX_APPLICATIONS, DEFAULT_MAX_MEMO_STATES,
};

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use self::bounds::{Score, SuffixBounds};
use super::domain::{ApplicationId, ValidationError};
use super::layout::{Segment, SegmentId};

/// Application reduced to what the planner needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub id: ApplicationId,
    pub boat_length: u32,
}

/// Planned berth: the segment and the boat's order within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAssignment {
    pub segment: SegmentId,
    pub order: usize,
}

/// Best admission found for one layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Allocation {
    pub count: usize,
    pub total_length: u64,
    pub assignments: BTreeMap<ApplicationId, SlotAssignment>,
}

impl Allocation {
    /// Strictly more boats, or as many boats with strictly more total length.
    pub fn beats(&self, other: &Allocation) -> bool {
        self.score() > other.score()
    }

    fn score(&self) -> Score {
        Score {
            count: self.count,
            total_length: self.total_length,
        }
    }
}

pub struct AdmissionPlanner<'a> {
    segments: &'a [Segment],
    spacing: u32,
}

impl<'a> AdmissionPlanner<'a> {
    pub fn new(segments: &'a [Segment], spacing: u32) -> Result<Self, ValidationError> {
        if segments.is_empty() {
            return Err(ValidationError::EmptyLayout);
        }
        Ok(Self { segments, spacing })
    }

    pub fn admit(&self, candidates: &[Candidate]) -> Allocation {
        self.explore(candidates, usize::MAX, None)
            .ok()
            .flatten()
            .unwrap_or_default()
    }

    /// Same as [`admit`](Self::admit), but gives up once `memo_limit` states have been recorded.
    pub fn admit_within(
        &self,
        candidates: &[Candidate],
        memo_limit: usize,
    ) -> Result<Allocation, ValidationError> {
        self.explore(candidates, memo_limit, None)
            .map(Option::unwrap_or_default)
    }

    /// Searches only for an allocation that strictly beats `incumbent`. `Ok(None)` means this
    /// layout cannot do better, which is usually settled without expanding a single state.
    pub fn improve_on(
        &self,
        candidates: &[Candidate],
        incumbent: &Allocation,
        memo_limit: usize,
    ) -> Result<Option<Allocation>, ValidationError> {
        self.explore(candidates, memo_limit, Some(incumbent.score()))
    }

    fn explore(
        &self,
        candidates: &[Candidate],
        memo_limit: usize,
        floor: Option<Score>,
    ) -> Result<Option<Allocation>, ValidationError> {
        let rooms: Vec<u64> = self
            .segments
            .iter()
            .map(|segment| segment_room(segment.length, self.spacing))
            .collect();
        let footprints: Vec<u64> = candidates
            .iter()
            .map(|candidate| footprint(candidate.boat_length, self.spacing))
            .collect();
        let lengths: Vec<u64> = candidates
            .iter()
            .map(|candidate| u64::from(candidate.boat_length))
            .collect();

        let bounds = SuffixBounds::new(
            &footprints,
            &lengths,
            rooms.iter().sum(),
            rooms.iter().copied().max().unwrap_or_default(),
        );
        let mut exploration = Exploration {
            footprints,
            lengths,
            bounds,
            memo: HashMap::new(),
            memo_limit,
            overflowed: false,
        };

        let mut root = rooms;
        exploration.bounds.settle(0, &mut root);
        let best = exploration.solve(0, &root, floor);
        if exploration.overflowed {
            return Err(ValidationError::SearchTooLarge { limit: memo_limit });
        }

        Ok(best.map(|outcome| Allocation {
            count: outcome.count,
            total_length: outcome.total_length,
            assignments: exploration.replay(candidates, self.segments, root),
        }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct StateKey {
    index: usize,
    rooms: Box<[u64]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    Skip,
    Place(usize),
}

#[derive(Debug, Clone, Copy)]
struct Outcome {
    count: usize,
    total_length: u64,
    choice: Choice,
}

impl Outcome {
    const EXHAUSTED: Outcome = Outcome {
        count: 0,
        total_length: 0,
        choice: Choice::Skip,
    };

    fn score(&self) -> Score {
        Score {
            count: self.count,
            total_length: self.total_length,
        }
    }
}

/// What the memo knows about a state.
#[derive(Debug, Clone, Copy)]
enum Entry {
    Exact(Outcome),
    /// The state was abandoned below a floor: its best is no better than this.
    AtMost(Score),
}

struct Exploration {
    footprints: Vec<u64>,
    lengths: Vec<u64>,
    bounds: SuffixBounds,
    memo: HashMap<StateKey, Entry>,
    memo_limit: usize,
    overflowed: bool,
}

impl Exploration {
    /// Best outcome from `index` onward with `rooms` left, provided it strictly beats `floor`.
    /// `None` means it does not (or the memo overflowed).
    fn solve(&mut self, index: usize, rooms: &[u64], floor: Option<Score>) -> Option<Outcome> {
        if self.overflowed {
            return None;
        }

        let ceiling = self.bounds.ceiling(index, rooms.iter().sum());
        if floor.is_some_and(|floor| ceiling <= floor) {
            return None;
        }
        if index >= self.footprints.len() || ceiling == Score::default() {
            return Some(Outcome::EXHAUSTED);
        }

        let key = StateKey {
            index,
            rooms: Box::from(rooms),
        };
        match self.memo.get(&key) {
            Some(Entry::Exact(outcome)) => {
                let outcome = *outcome;
                return floor
                    .map_or(true, |floor| outcome.score() > floor)
                    .then_some(outcome);
            }
            Some(Entry::AtMost(bound)) if floor.is_some_and(|floor| *bound <= floor) => {
                return None;
            }
            _ => {}
        }
        if self.memo.len() >= self.memo_limit {
            self.overflowed = true;
            return None;
        }

        let footprint = self.footprints[index];
        let length = self.lengths[index];
        let mut best: Option<Outcome> = None;

        for segment in 0..rooms.len() {
            if rooms[segment] < footprint || rooms[..segment].contains(&rooms[segment]) {
                continue;
            }

            let need = best.map(|outcome| outcome.score()).max(floor);
            let mut child = rooms.to_vec();
            child[segment] -= footprint;
            self.bounds.settle(index + 1, &mut child);

            let Some(rest) = self.solve(
                index + 1,
                &child,
                need.and_then(|need| need.remainder(length)),
            ) else {
                continue;
            };
            best = Some(Outcome {
                count: rest.count + 1,
                total_length: rest.total_length + length,
                choice: Choice::Place(segment),
            });
            if best.is_some_and(|outcome| outcome.score() == ceiling) {
                break;
            }
        }

        if !best.is_some_and(|outcome| outcome.score() == ceiling) {
            let need = best.map(|outcome| outcome.score()).max(floor);
            let mut child = rooms.to_vec();
            self.bounds.settle(index + 1, &mut child);

            if let Some(rest) = self.solve(index + 1, &child, need) {
                best = Some(Outcome {
                    choice: Choice::Skip,
                    ..rest
                });
            }
        }

        if self.overflowed {
            return None;
        }
        match best {
            Some(outcome) => {
                self.memo.insert(key, Entry::Exact(outcome));
                Some(outcome)
            }
            None => {
                if let Some(floor) = floor {
                    self.memo.insert(key, Entry::AtMost(floor));
                }
                None
            }
        }
    }

    /// Walks the recorded choices from the empty dock to rebuild the winning assignment.
    fn replay(
        &self,
        candidates: &[Candidate],
        segments: &[Segment],
        mut rooms: Vec<u64>,
    ) -> BTreeMap<ApplicationId, SlotAssignment> {
        let mut orders = vec![0usize; segments.len()];
        let mut assignments = BTreeMap::new();

        for (index, candidate) in candidates.iter().enumerate() {
            let key = StateKey {
                index,
                rooms: rooms.as_slice().into(),
            };
            let Some(Entry::Exact(outcome)) = self.memo.get(&key) else {
                break;
            };

            if let Choice::Place(segment) = outcome.choice {
                assignments.insert(
                    candidate.id.clone(),
                    SlotAssignment {
                        segment: segments[segment].id,
                        order: orders[segment],
                    },
                );
                orders[segment] += 1;
                rooms[segment] -= self.footprints[index];
            }
            self.bounds.settle(index + 1, &mut rooms);
        }

        assignments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::dock::layout::DockLayoutConfig;

    fn candidates(lengths: &[u32]) -> Vec<Candidate> {
        lengths
            .iter()
            .enumerate()
            .map(|(index, &boat_length)| Candidate {
                id: ApplicationId(format!("app-{index:03}")),
                boat_length,
            })
            .collect()
    }

    #[test]
    fn empty_segment_list_is_rejected() {
        assert!(matches!(
            AdmissionPlanner::new(&[], 3),
            Err(ValidationError::EmptyLayout)
        ));
    }

    #[test]
    fn no_candidates_admits_nothing() {
        let segments = DockLayoutConfig::default().segments(480);
        let planner = AdmissionPlanner::new(&segments, 3).expect("layout has segments");
        assert_eq!(planner.admit(&[]), Allocation::default());
    }

    #[test]
    fn ties_keep_the_first_segment_tried() {
        let segments = DockLayoutConfig::default().segments(480);
        let planner = AdmissionPlanner::new(&segments, 3).expect("layout has segments");
        let allocation = planner.admit(&candidates(&[40]));

        assert_eq!(allocation.count, 1);
        assert_eq!(
            allocation.assignments[&ApplicationId("app-000".to_string())],
            SlotAssignment {
                segment: SegmentId::Small,
                order: 0,
            }
        );
    }

    #[test]
    fn order_index_counts_earlier_boats_in_the_same_segment() {
        let segments = DockLayoutConfig::default().segments(455);
        let single = [segments[0].clone()];
        let planner = AdmissionPlanner::new(&single, 3).expect("layout has segments");
        let allocation = planner.admit(&candidates(&[100, 100, 100]));

        let orders: Vec<usize> = allocation
            .assignments
            .values()
            .map(|slot| slot.order)
            .collect();
        assert_eq!(allocation.count, 3);
        assert_eq!(orders, vec![0, 1, 2]);
    }

    fn single_sixty_foot_slip() -> [Segment; 1] {
        let layout = DockLayoutConfig {
            small_length: 60,
            ..DockLayoutConfig::default()
        };
        [layout.segment(455, SegmentId::Small)]
    }

    #[test]
    fn memo_limit_aborts_the_search() {
        let slip = single_sixty_foot_slip();
        let planner = AdmissionPlanner::new(&slip, 3).expect("layout has segments");
        let pool = candidates(&[10, 50, 20, 30]);

        assert_eq!(
            planner.admit_within(&pool, 2),
            Err(ValidationError::SearchTooLarge { limit: 2 })
        );

        let allocation = planner
            .admit_within(&pool, 1_000)
            .expect("small search completes");
        assert_eq!((allocation.count, allocation.total_length), (2, 50));
        assert_eq!(allocation, planner.admit(&pool));
    }

    #[test]
    fn identical_boats_fill_every_segment_without_backtracking() {
        let segments = DockLayoutConfig::default().segments(455);
        let planner = AdmissionPlanner::new(&segments, 3).expect("layout has segments");
        let pool = candidates(&[40; 60]);

        let allocation = planner
            .admit_within(&pool, 60)
            .expect("every state on the greedy path meets its ceiling");

        // 9 + 10 + 9 + 10 + 12 boats of 43 ft including clearance
        assert_eq!(allocation.count, 50);
        assert_eq!(allocation.total_length, 2_000);
        assert!(pool[..50]
            .iter()
            .all(|candidate| allocation.assignments.contains_key(&candidate.id)));
    }

    #[test]
    fn improve_on_only_reports_strictly_better_allocations() {
        let slip = single_sixty_foot_slip();
        let planner = AdmissionPlanner::new(&slip, 3).expect("layout has segments");
        let pool = candidates(&[10, 50, 20, 30]);
        let best = planner.admit(&pool);

        assert_eq!(planner.improve_on(&pool, &best, 1_000), Ok(None));

        let weaker = Allocation {
            count: 2,
            total_length: 49,
            ..Allocation::default()
        };
        assert_eq!(planner.improve_on(&pool, &weaker, 1_000), Ok(Some(best)));
    }
}
