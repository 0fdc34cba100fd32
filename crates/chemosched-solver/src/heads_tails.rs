//! Heads (earliest start) and tails (distance-to-sink) for every activity
//! under a scheme's currently fixed conjunctions.
//!
//! Grounded on `compute_heads_and_tails` in `distance_matrix.py`, but
//! computed over a proper topological order (Kahn's algorithm, id
//! tie-break) rather than the original's raw activity-id iteration,
//! which only happens to be a valid order for instances numbered in
//! precedence order.

use std::collections::{BTreeMap, VecDeque};

use chemosched_core::{ActivityId, ScheduleScheme};

/// Earliest-start (`r`) and distance-to-sink (`q`) for every activity.
#[derive(Clone, Debug, Default)]
pub struct HeadsTails {
    pub heads: BTreeMap<ActivityId, i64>,
    pub tails: BTreeMap<ActivityId, i64>,
}

impl HeadsTails {
    /// `r_i + duration_i + q_i`: the length of the longest path through
    /// `i` from source to sink. Used as a per-activity lower bound.
    #[must_use]
    pub fn path_through(&self, id: ActivityId, duration: u32) -> Option<i64> {
        Some(self.heads.get(&id)? + i64::from(duration) + self.tails.get(&id)?)
    }
}

/// Kahn's-algorithm topological order of the conjunction graph, breaking
/// ties on ascending activity id for determinism.
#[must_use]
fn topological_order(scheme: &ScheduleScheme) -> Vec<ActivityId> {
    let ids: Vec<ActivityId> = scheme.activities().keys().copied().collect();
    let mut in_degree: BTreeMap<ActivityId, usize> = ids.iter().map(|&id| (id, 0)).collect();
    for &(_, to) in scheme.conjunctions().iter() {
        *in_degree.get_mut(&to).unwrap() += 1;
    }

    let mut ready: VecDeque<ActivityId> = in_degree
        .iter()
        .filter(|&(_, &deg)| deg == 0)
        .map(|(&id, _)| id)
        .collect();
    let mut ready_sorted: Vec<ActivityId> = ready.drain(..).collect();
    ready_sorted.sort_unstable();
    let mut queue: VecDeque<ActivityId> = ready_sorted.into();

    let mut order = Vec::with_capacity(ids.len());
    while let Some(id) = queue.pop_front() {
        order.push(id);
        let mut newly_ready: Vec<ActivityId> = scheme
            .successors(id)
            .filter(|succ| {
                let deg = in_degree.get_mut(succ).unwrap();
                *deg -= 1;
                *deg == 0
            })
            .collect();
        newly_ready.sort_unstable();
        queue.extend(newly_ready);
    }

    debug_assert_eq!(order.len(), ids.len(), "conjunction graph must be acyclic");
    order
}

/// Compute heads and tails via forward/backward topological DP.
#[must_use]
pub fn compute(scheme: &ScheduleScheme) -> HeadsTails {
    let order = topological_order(scheme);

    let mut heads: BTreeMap<ActivityId, i64> = order.iter().map(|&id| (id, 0)).collect();
    for &id in &order {
        let duration = i64::from(scheme.activities()[&id].duration);
        let finish = heads[&id] + duration;
        for succ in scheme.successors(id) {
            let entry = heads.entry(succ).or_insert(0);
            *entry = (*entry).max(finish);
        }
    }

    let mut tails: BTreeMap<ActivityId, i64> = order.iter().map(|&id| (id, 0)).collect();
    for &id in order.iter().rev() {
        let duration = i64::from(scheme.activities()[&id].duration);
        let from_here = tails[&id] + duration;
        for pred in scheme.predecessors(id) {
            let entry = tails.entry(pred).or_insert(0);
            *entry = (*entry).max(from_here);
        }
    }

    HeadsTails { heads, tails }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chemosched_core::{Activity, Instance, Resources};

    #[test]
    fn heads_and_tails_bound_the_makespan() {
        let activities = vec![
            Activity::new(1, 0),
            Activity::new(2, 5),
            Activity::new(3, 2),
            Activity::new(4, 0),
        ];
        let instance =
            Instance::new(activities, Resources::new(), vec![(1, 2), (2, 3), (3, 4)], vec![])
                .unwrap();
        let scheme = ScheduleScheme::new(&instance);
        let ht = compute(&scheme);

        assert_eq!(ht.heads[&4], 7);
        assert_eq!(ht.tails[&1], 7);
        assert_eq!(ht.path_through(2, 5), Some(7));
    }

    #[test]
    fn parallel_branches_take_the_longer_head() {
        let activities = vec![
            Activity::new(1, 0),
            Activity::new(2, 3),
            Activity::new(3, 8),
            Activity::new(4, 0),
        ];
        let instance = Instance::new(
            activities,
            Resources::new(),
            vec![(1, 2), (1, 3), (2, 4), (3, 4)],
            vec![],
        )
        .unwrap();
        let scheme = ScheduleScheme::new(&instance);
        let ht = compute(&scheme);

        assert_eq!(ht.heads[&4], 8);
    }
}
