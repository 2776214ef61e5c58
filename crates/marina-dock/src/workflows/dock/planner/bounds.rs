//! Upper bounds on what the applications from a given index onward can still add.
//!
//! Both tables are built once per planning run with one row per suffix of the candidate list.
//! `knapsack` answers "how much could a single segment with this much room take" when every
//! remaining segment is merged into one, which can only overestimate. `reachable` records which
//! footprint sums the suffix can hit exactly, so room that no combination of boats could ever use
//! is dropped before it reaches the memo key.

/// Boats admitted and their total length, compared count first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(super) struct Score {
    pub count: usize,
    pub total_length: u64,
}

impl Score {
    fn with_boat(self, length: u64) -> Self {
        Self {
            count: self.count + 1,
            total_length: self.total_length + length,
        }
    }

    /// The score the rest of the roster has to strictly beat so that one more boat of `length`
    /// on top of it strictly beats `self`. `None` when any rest will do.
    pub fn remainder(self, length: u64) -> Option<Score> {
        match self.count {
            0 => None,
            count if self.total_length >= length => Some(Score {
                count: count - 1,
                total_length: self.total_length - length,
            }),
            1 => None,
            count => Some(Score {
                count: count - 2,
                total_length: u64::MAX,
            }),
        }
    }
}

pub(super) struct SuffixBounds {
    knapsack: Vec<Vec<Score>>,
    reachable: Vec<Vec<u64>>,
    widest: u64,
}

impl SuffixBounds {
    /// `footprints[i]` is the dock a boat consumes including its clearance, `total_room` the
    /// room of all segments together and `widest` the room of the largest one.
    pub fn new(footprints: &[u64], lengths: &[u64], total_room: u64, widest: u64) -> Self {
        let words = (widest / 64) as usize + 1;
        let mut empty = vec![0u64; words];
        empty[0] = 1;

        let mut knapsack = vec![vec![Score::default()]];
        let mut reachable = vec![empty];

        for (&footprint, &length) in footprints.iter().zip(lengths).rev() {
            let (Some(next), Some(sums)) = (knapsack.last(), reachable.last()) else {
                break;
            };

            let saturated = next.len() - 1;
            let width = (saturated as u64 + footprint).min(total_room) as usize + 1;
            let row = (0..width)
                .map(|room| {
                    let skipped = next[room.min(saturated)];
                    match (room as u64).checked_sub(footprint) {
                        Some(rest) => skipped.max(next[(rest as usize).min(saturated)].with_boat(length)),
                        None => skipped,
                    }
                })
                .collect();
            let sums = shifted_union(sums, footprint);

            knapsack.push(row);
            reachable.push(sums);
        }

        knapsack.reverse();
        reachable.reverse();
        Self {
            knapsack,
            reachable,
            widest,
        }
    }

    /// Best score the candidates from `index` onward could reach with `room` feet spread over
    /// any number of segments.
    pub fn ceiling(&self, index: usize, room: u64) -> Score {
        let row = &self.knapsack[index];
        row[(room as usize).min(row.len() - 1)]
    }

    /// Shrinks every segment's room to the largest footprint sum the candidates from `index`
    /// onward can fill exactly.
    pub fn settle(&self, index: usize, rooms: &mut [u64]) {
        let sums = &self.reachable[index];
        for room in rooms {
            *room = largest_sum_within(sums, (*room).min(self.widest));
        }
    }
}

/// `sums | sums << shift`, truncated to the width of `sums`.
fn shifted_union(sums: &[u64], shift: u64) -> Vec<u64> {
    let mut union = sums.to_vec();
    let (words, bits) = ((shift / 64) as usize, (shift % 64) as u32);

    for (index, &word) in sums.iter().enumerate() {
        let target = index + words;
        if word == 0 || target >= union.len() {
            continue;
        }
        union[target] |= word << bits;
        if bits > 0 && target + 1 < union.len() {
            union[target + 1] |= word >> (64 - bits);
        }
    }

    union
}

fn largest_sum_within(sums: &[u64], limit: u64) -> u64 {
    let top = limit as usize;
    let mut word = top / 64;
    let mut mask = u64::MAX >> (63 - top % 64);

    loop {
        let hits = sums[word] & mask;
        if hits != 0 {
            return (word * 64 + 63 - hits.leading_zeros() as usize) as u64;
        }
        if word == 0 {
            return 0;
        }
        word -= 1;
        mask = u64::MAX;
    }
}
