//! Upper and lower bound computation for branch-and-bound pruning.
//!
//! Grounded on `b&b_algorithm/bounds.py`: an upper bound from a p-SGS
//! construction, and lower bounds from the critical path and from
//! per-resource work content, taking the tighter of the two.

use chemosched_core::{Pair, ScheduleScheme};

use crate::heads_tails::{self, HeadsTails};
use crate::psgs;

/// Upper bound via p-SGS construction. `None` means p-SGS could not
/// complete a schedule (a resource/incompatibility deadlock) — the
/// caller treats this the same as the original's "catch exception,
/// return infinity".
#[must_use]
pub fn upper_bound(scheme: &ScheduleScheme, incompatibilities: &[Pair]) -> Option<u32> {
    let schedule = psgs::run(scheme, incompatibilities)?;
    Some(psgs::makespan(scheme, &schedule))
}

/// Critical path length: the longest path from source to sink under
/// the currently fixed conjunctions, ignoring resource capacity.
#[must_use]
pub fn lower_bound_critical_path(ht: &HeadsTails, scheme: &ScheduleScheme) -> i64 {
    let sink = *scheme.activities().keys().max().expect("non-empty");
    ht.heads[&sink]
}

/// Per-resource work-content bound: `ceil(total demand / capacity)`,
/// maximized over all resources. A trivial lower bound that ignores
/// precedence entirely.
#[must_use]
pub fn lower_bound_resource(scheme: &ScheduleScheme) -> i64 {
    scheme
        .resources()
        .iter()
        .map(|(resource, &capacity)| {
            if capacity == 0 {
                return 0;
            }
            let total_work: u64 = scheme
                .activities()
                .values()
                .map(|a| u64::from(a.duration) * u64::from(a.demand(resource)))
                .sum();
            let capacity = u64::from(capacity);
            ((total_work + capacity - 1) / capacity) as i64
        })
        .max()
        .unwrap_or(0)
}

/// The tighter of the critical-path and resource-content bounds.
#[must_use]
pub fn lower_bound(scheme: &ScheduleScheme) -> i64 {
    let ht = heads_tails::compute(scheme);
    lower_bound_critical_path(&ht, scheme).max(lower_bound_resource(scheme))
}
