//! Parallel serial generation scheme (p-SGS): a constructive heuristic
//! that turns a (possibly still partially ordered) schedule scheme into
//! a concrete, resource- and incompatibility-feasible schedule. Used to
//! compute upper bounds during search and to materialize the final
//! answer at a feasible leaf.
//!
//! Grounded on `gerar_cronograma` in `b&b_algorithm/algorithm.py`: a
//! decision/active/completed set simulation, advancing time to the next
//! activity finish whenever nothing more can start right away.

use std::collections::{BTreeMap, BTreeSet};

use chemosched_core::{ActivityId, Cronograma, Pair, ScheduleScheme};

/// Run p-SGS against the instance's full incompatibility list so that
/// pairs not yet resolved by the scheme (still in `D`) are still
/// honored in the constructed schedule.
#[must_use]
pub fn run(scheme: &ScheduleScheme, incompatibilities: &[Pair]) -> Option<Cronograma> {
    let all_ids: Vec<ActivityId> = scheme.activities().keys().copied().collect();

    let mut completed: BTreeSet<ActivityId> = BTreeSet::new();
    let mut active: BTreeSet<ActivityId> = BTreeSet::new();
    let mut decision: BTreeSet<ActivityId> = all_ids
        .iter()
        .copied()
        .filter(|&id| scheme.predecessors(id).next().is_none())
        .collect();
    let mut start: Cronograma = BTreeMap::new();
    let mut finish: BTreeMap<ActivityId, u32> = BTreeMap::new();
    let mut t: u32 = 0;

    while completed.len() < all_ids.len() {
        let mut scheduled_this_round = Vec::new();

        for &id in &decision {
            if can_start(scheme, incompatibilities, &active, id) {
                start.insert(id, t);
                finish.insert(id, t + scheme.activities()[&id].duration);
                scheduled_this_round.push(id);
                // Committed immediately so later candidates in this same
                // round see it as active too: two activities that
                // conflict with each other, both newly decidable at the
                // same instant, must not both pass `can_start`.
                active.insert(id);
            }
        }

        if scheduled_this_round.is_empty() && active.is_empty() {
            // Nothing running, nothing startable: a genuine deadlock.
            return None;
        }

        for id in scheduled_this_round {
            decision.remove(&id);
        }

        if active.is_empty() {
            continue;
        }

        let next_t = active.iter().map(|id| finish[id]).min().unwrap();
        t = next_t;

        let finishing: Vec<ActivityId> = active
            .iter()
            .copied()
            .filter(|id| finish[id] == t)
            .collect();
        for id in finishing {
            active.remove(&id);
            completed.insert(id);
        }

        for &id in &all_ids {
            if completed.contains(&id) || active.contains(&id) || decision.contains(&id) {
                continue;
            }
            if scheme.predecessors(id).all(|p| completed.contains(&p)) {
                decision.insert(id);
            }
        }
    }

    Some(start)
}

fn can_start(
    scheme: &ScheduleScheme,
    incompatibilities: &[Pair],
    active: &BTreeSet<ActivityId>,
    candidate: ActivityId,
) -> bool {
    for &peer in active {
        let conflicts = incompatibilities
            .iter()
            .any(|&(a, b)| (a == candidate && b == peer) || (a == peer && b == candidate));
        if conflicts {
            return false;
        }
    }

    for (resource, &capacity) in scheme.resources() {
        let demand = scheme.activities()[&candidate].demand(resource);
        let used: u32 = active
            .iter()
            .map(|id| scheme.activities()[id].demand(resource))
            .sum();
        if used + demand > capacity {
            return false;
        }
    }

    true
}

/// The makespan of a constructed schedule: the finish time of the sink
/// activity (the maximum id), which is always scheduled last.
#[must_use]
pub fn makespan(scheme: &ScheduleScheme, schedule: &Cronograma) -> u32 {
    let sink = *scheme.activities().keys().max().expect("non-empty");
    schedule[&sink] + scheme.activities()[&sink].duration
}

#[cfg(test)]
mod tests {
    use super::*;
    use chemosched_core::{Activity, Instance, Resources};

    #[test]
    fn sequential_chain_schedules_back_to_back() {
        let activities = vec![
            Activity::new(1, 0),
            Activity::new(2, 4),
            Activity::new(3, 3),
            Activity::new(4, 0),
        ];
        let instance = Instance::new(
            activities,
            Resources::new(),
            vec![(1, 2), (2, 3), (3, 4)],
            vec![],
        )
        .unwrap();
        let scheme = ScheduleScheme::new(&instance);

        let schedule = run(&scheme, instance.incompatibilities()).unwrap();
        assert_eq!(schedule[&1], 0);
        assert_eq!(schedule[&2], 0);
        assert_eq!(schedule[&3], 4);
        assert_eq!(schedule[&4], 7);
        assert_eq!(makespan(&scheme, &schedule), 7);
    }

    #[test]
    fn resource_capacity_serializes_conflicting_activities() {
        let activities = vec![
            Activity::new(1, 0),
            Activity::new(2, 3).with_demand("R1", 2),
            Activity::new(3, 3).with_demand("R1", 2),
            Activity::new(4, 0),
        ];
        let mut resources = Resources::new();
        resources.insert("R1".to_string(), 3);
        let instance = Instance::new(
            activities,
            resources,
            vec![(1, 2), (1, 3), (2, 4), (3, 4)],
            vec![],
        )
        .unwrap();
        let scheme = ScheduleScheme::new(&instance);

        let schedule = run(&scheme, instance.incompatibilities()).unwrap();
        assert_ne!(schedule[&2], schedule[&3]);
    }

    #[test]
    fn incompatible_activities_never_run_simultaneously() {
        let activities = vec![
            Activity::new(1, 0),
            Activity::new(2, 5),
            Activity::new(3, 5),
            Activity::new(4, 0),
        ];
        let instance = Instance::new(
            activities,
            Resources::new(),
            vec![(1, 2), (1, 3), (2, 4), (3, 4)],
            vec![(2, 3)],
        )
        .unwrap();
        let scheme = ScheduleScheme::new(&instance);

        let schedule = run(&scheme, instance.incompatibilities()).unwrap();
        let (s2, s3) = (schedule[&2], schedule[&3]);
        assert!(s2 + 5 <= s3 || s3 + 5 <= s2);
    }
}
