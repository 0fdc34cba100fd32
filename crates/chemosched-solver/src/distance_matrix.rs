//! All-pairs longest-path distances over the fixed conjunctions of a
//! schedule scheme, with incremental update on new conjunctions and
//! positive-cycle infeasibility detection.
//!
//! Grounded on `b&b_algorithm/distance_matrix.py`. That implementation
//! relaxes distances with `min`, which is a shortest-path convention
//! inconsistent with its own positive-cycle infeasibility check; this
//! port uses `max`-relaxation (longest path) throughout, since it is the
//! longest path from `i` to `j` that bounds how early `j` can start after
//! `i` finishes.

use std::collections::BTreeMap;

use chemosched_core::{ActivityId, ScheduleScheme};

/// Sentinel meaning "no path currently known between these activities".
/// Distinct from `Some(0)`, which means a real zero-length path exists.
const UNREACHABLE: i64 = i64::MIN / 2;

/// Dense all-pairs longest-path distance matrix indexed by activity id.
#[derive(Clone, Debug)]
pub struct DistanceMatrix {
    ids: Vec<ActivityId>,
    index: BTreeMap<ActivityId, usize>,
    distances: Vec<Vec<i64>>,
}

impl DistanceMatrix {
    /// Build the matrix from the conjunctions currently fixed in `scheme`,
    /// weighting each edge `i -> j` by the duration of `i`.
    #[must_use]
    pub fn from_scheme(scheme: &ScheduleScheme) -> Self {
        let ids: Vec<ActivityId> = scheme.activities().keys().copied().collect();
        let index: BTreeMap<ActivityId, usize> =
            ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();
        let n = ids.len();

        let mut distances = vec![vec![UNREACHABLE; n]; n];
        for i in 0..n {
            distances[i][i] = 0;
        }

        for (&from, &to) in scheme.conjunctions().iter() {
            let duration = i64::from(scheme.activities()[&from].duration);
            let fi = index[&from];
            let ti = index[&to];
            distances[fi][ti] = distances[fi][ti].max(duration);
        }

        let mut matrix = Self {
            ids,
            index,
            distances,
        };
        matrix.floyd_warshall();
        matrix
    }

    fn floyd_warshall(&mut self) {
        let n = self.ids.len();
        for k in 0..n {
            for i in 0..n {
                if self.distances[i][k] <= UNREACHABLE {
                    continue;
                }
                for j in 0..n {
                    if self.distances[k][j] <= UNREACHABLE {
                        continue;
                    }
                    let through_k = self.distances[i][k] + self.distances[k][j];
                    if through_k > self.distances[i][j] {
                        self.distances[i][j] = through_k;
                    }
                }
            }
        }
    }

    /// Longest-path distance from `from` to `to`, or `None` if no path is
    /// known between them under the current conjunctions.
    #[must_use]
    pub fn get(&self, from: ActivityId, to: ActivityId) -> Option<i64> {
        let fi = *self.index.get(&from)?;
        let ti = *self.index.get(&to)?;
        let d = self.distances[fi][ti];
        if d <= UNREACHABLE {
            None
        } else {
            Some(d)
        }
    }

    /// `true` if some activity has a strictly positive distance to
    /// itself, meaning the conjunction graph contains a positive-length
    /// cycle and the scheme is infeasible.
    #[must_use]
    pub fn has_positive_cycle(&self) -> bool {
        (0..self.ids.len()).any(|i| self.distances[i][i] > 0)
    }

    /// Apply a new conjunction `i -> j` weighted by `duration(i)` and
    /// re-propagate in O(n^2) rather than a full O(n^3) recompute.
    pub fn update_with_conjunction(&mut self, from: ActivityId, to: ActivityId, weight: i64) {
        let n = self.ids.len();
        let Some(&fi) = self.index.get(&from) else {
            return;
        };
        let Some(&ti) = self.index.get(&to) else {
            return;
        };

        if weight > self.distances[fi][ti] {
            self.distances[fi][ti] = weight;
        }

        for i in 0..n {
            if self.distances[i][fi] <= UNREACHABLE {
                continue;
            }
            for j in 0..n {
                if self.distances[ti][j] <= UNREACHABLE {
                    continue;
                }
                let candidate = self.distances[i][fi] + self.distances[ti][j];
                if candidate > self.distances[i][j] {
                    self.distances[i][j] = candidate;
                }
            }
        }
    }

    /// `true` if fixing `i -> j` with the given weight would not create a
    /// positive cycle (i.e. `j` does not already reach back to `i` with a
    /// distance that, combined with the new edge, would be positive).
    #[must_use]
    pub fn can_add_conjunction(&self, from: ActivityId, to: ActivityId, weight: i64) -> bool {
        match self.get(to, from) {
            Some(back) => back + weight <= 0,
            None => true,
        }
    }
}
