//! Immediate selection: a fixed-point propagator that converts
//! disjunctive (conflicting, unordered) activity pairs into either a
//! fixed conjunction or a proven parallelism, without branching.
//!
//! Grounded on `immediate_selection.py`. That module's `fix_direct_conjunctions`
//! inequality mixes shortest- and longest-path distances inconsistently
//! (the same inconsistency flagged for `distance_matrix.py`), so this
//! port instead applies the standard precedence time-bound propagation
//! rule: given a horizon, a disjunctive pair is forced into a fixed
//! order whenever placing one activity after the other would blow that
//! horizon. A `D` pair can only ever leave `D` via a fixed conjunction —
//! it represents a real conflict, and a scheme's `D` relation holds
//! exactly the pairs still owed one of `i -> j` or `j -> i`, so the
//! time-bound test's "provably parallel" outcome is never applied to
//! it. A second pass runs that same test against the still-unclassified
//! `F` pairs instead and promotes the ones it can prove parallel into
//! `N`, per the parallelize step of `fix_direct_conjunctions`; `F`
//! pairs are never forced into a fixed order, since nothing links them
//! as a conflict or a precedence. `calculate_symmetric_triples` is
//! carried over faithfully, including its inert extension step — the
//! source detects symmetric triples but performs no further deduction
//! from them.

use chemosched_core::{ActivityId, ScheduleScheme};

use crate::distance_matrix::DistanceMatrix;
use crate::heads_tails::{self, HeadsTails};

/// Raised when propagation proves the scheme infeasible (a positive
/// cycle appears in the conjunction graph).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Infeasible;

/// Run immediate selection to a fixed point.
///
/// `horizon` bounds the project length used for time-bound propagation;
/// pass `None` to fall back to the sum of all activity durations, a
/// trivially valid (if loose) upper bound.
pub fn apply(scheme: &mut ScheduleScheme, horizon: Option<i64>) -> Result<(), Infeasible> {
    let horizon = horizon.unwrap_or_else(|| {
        scheme
            .activities()
            .values()
            .map(|a| i64::from(a.duration))
            .sum()
    });

    loop {
        let matrix = DistanceMatrix::from_scheme(scheme);
        if matrix.has_positive_cycle() {
            return Err(Infeasible);
        }
        let ht = heads_tails::compute(scheme);

        let mut changed = false;
        let pairs: Vec<_> = scheme.disjunction_pairs().collect();
        for (i, j) in pairs {
            if !scheme.is_in_d(i, j) {
                continue;
            }
            match classify(scheme, &ht, horizon, i, j) {
                Classification::Before => {
                    scheme.add_conjunction(i, j);
                    changed = true;
                }
                Classification::After => {
                    scheme.add_conjunction(j, i);
                    changed = true;
                }
                Classification::Parallel | Classification::Undecided => {}
            }
        }

        let free_pairs: Vec<_> = scheme.free().iter().copied().collect();
        for (i, j) in free_pairs {
            if !scheme.is_in_f(i, j) {
                continue;
            }
            if let Classification::Parallel = classify(scheme, &ht, horizon, i, j) {
                scheme.add_parallelity(i, j);
                changed = true;
            }
        }

        if !changed {
            return Ok(());
        }
    }
}

enum Classification {
    Before,
    After,
    Parallel,
    Undecided,
}

fn classify(
    scheme: &ScheduleScheme,
    ht: &HeadsTails,
    horizon: i64,
    i: ActivityId,
    j: ActivityId,
) -> Classification {
    let p_i = i64::from(scheme.activities()[&i].duration);
    let p_j = i64::from(scheme.activities()[&j].duration);
    let r_i = ht.heads[&i];
    let r_j = ht.heads[&j];
    let q_i = ht.tails[&i];
    let q_j = ht.tails[&j];

    let latest_finish_i = horizon - q_i;
    let latest_finish_j = horizon - q_j;

    if r_i + p_i + p_j > latest_finish_j {
        Classification::After
    } else if r_j + p_j + p_i > latest_finish_i {
        Classification::Before
    } else if r_i + p_i <= latest_finish_j - p_j && r_j + p_j <= latest_finish_i - p_i {
        Classification::Parallel
    } else {
        Classification::Undecided
    }
}

/// Find triples of mutually parallel activities in the current scheme.
///
/// The triples are detected and returned, but no further deduction is
/// drawn from them: the extension step is an intentional no-op rather
/// than an invented clique deduction.
pub fn find_symmetric_triples(scheme: &ScheduleScheme) -> Vec<(ActivityId, ActivityId, ActivityId)> {
    let ids: Vec<ActivityId> = scheme.activities().keys().copied().collect();
    let mut triples = Vec::new();

    for (a_idx, &a) in ids.iter().enumerate() {
        for (b_idx, &b) in ids.iter().enumerate().skip(a_idx + 1) {
            if !scheme.is_in_n(a, b) {
                continue;
            }
            for &c in ids.iter().skip(b_idx + 1) {
                if scheme.is_in_n(a, c) && scheme.is_in_n(b, c) {
                    triples.push((a, b, c));
                }
            }
        }
    }

    extend_symmetric_triple(&triples);
    triples
}

/// Intentionally a no-op: the source sketch for deducing additional
/// relations from a symmetric triple is never implemented.
fn extend_symmetric_triple(_triples: &[(ActivityId, ActivityId, ActivityId)]) {}
