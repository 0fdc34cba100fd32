//! Branching: pick an undecided disjunctive pair and fork the search
//! into the two possible fixed orders.
//!
//! Grounded on `b&b_algorithm/branching.py`. The weighted selection rule
//! there (`max_weight = -inf; if weight > max_weight: ...`) picks the
//! pair maximizing `|r_i - r_j| + (p_i + p_j)` — the conflicting pair
//! whose activities are furthest apart in their earliest-start times and
//! longest in combined duration, the pair with the most at stake if
//! ordered the wrong way. Minimizing `p_i + p_j` alone is a different,
//! unweighted fallback rule in the same source file and is not used
//! here. `create_branches` clones the scheme once per direction and
//! commits a conjunction in each.

use chemosched_core::{ActivityId, Pair, ScheduleScheme};

use crate::heads_tails::HeadsTails;

/// Select the disjunctive pair to branch on next, or `None` if the
/// scheme has no undecided pairs left (a leaf).
#[must_use]
pub fn select_disjunction(scheme: &ScheduleScheme, ht: &HeadsTails) -> Option<Pair> {
    let mut pairs: Vec<Pair> = scheme.disjunction_pairs().collect();
    pairs.sort_unstable();

    pairs.into_iter().max_by_key(|&(i, j)| weight(scheme, ht, i, j))
}

fn weight(scheme: &ScheduleScheme, ht: &HeadsTails, i: ActivityId, j: ActivityId) -> i64 {
    let r_i = ht.heads[&i];
    let r_j = ht.heads[&j];
    let p_i = i64::from(scheme.activities()[&i].duration);
    let p_j = i64::from(scheme.activities()[&j].duration);
    (r_i - r_j).abs() + (p_i + p_j)
}

/// Fork a scheme on the pair `(i, j)`: one branch fixes `i -> j`, the
/// other fixes `j -> i`.
#[must_use]
pub fn create_branches(scheme: &ScheduleScheme, i: ActivityId, j: ActivityId) -> (ScheduleScheme, ScheduleScheme) {
    let mut before = scheme.clone();
    before.add_conjunction(i, j);

    let mut after = scheme.clone();
    after.add_conjunction(j, i);

    (before, after)
}
