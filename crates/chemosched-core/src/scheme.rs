//! The schedule-scheme algebra: four relations (C/D/N/F) over activity
//! pairs, used by the branch-and-bound search to incrementally commit to
//! an execution order without re-deriving it from scratch at every node.
//!
//! - `C` (conjunction): a fixed, directed precedence `i -> j`.
//! - `D` (disjunction): an unordered conflicting pair still undecided —
//!   exactly one of `i -> j` or `j -> i` must eventually be fixed.
//! - `N` (parallelism): an unordered pair proven free of conflict; no
//!   order is ever required between the two activities.
//! - `F` (free): the initial, unclassified default for every pair not
//!   already linked by a given precedence. Immediate selection and
//!   branching move pairs out of `F` into `C`, `D`, or `N`.
//!
//! `C`/`D`/`N`/`F` are `im::HashSet`s so that cloning a scheme at a
//! branch point is O(1) structural sharing rather than a deep copy.

use std::collections::BTreeMap;
use std::rc::Rc;

use im::HashSet as PersistentSet;

use crate::{canon, Activity, ActivityId, Instance, Pair, Resources};

/// An immutable-by-convention, cheaply cloneable snapshot of activity
/// ordering decisions made so far during the search.
#[derive(Clone, Debug)]
pub struct ScheduleScheme {
    activities: Rc<BTreeMap<ActivityId, Activity>>,
    resources: Rc<Resources>,
    c: PersistentSet<Pair>,
    d: PersistentSet<Pair>,
    n: PersistentSet<Pair>,
    f: PersistentSet<Pair>,
}

impl ScheduleScheme {
    /// Build the root scheme for an instance: `C` seeded from the given
    /// precedences, `D` seeded from the given incompatibilities, every
    /// other activity pair starting in `F`.
    #[must_use]
    pub fn new(instance: &Instance) -> Self {
        let activities = instance.activities_handle();
        let resources = instance.resources_handle();

        let mut c = PersistentSet::new();
        let mut precedence_pairs = PersistentSet::new();
        for &(i, j) in instance.precedences() {
            c.insert((i, j));
            precedence_pairs.insert(canon(i, j));
        }

        let mut d = PersistentSet::new();
        for &(i, j) in instance.incompatibilities() {
            d.insert(canon(i, j));
        }

        let ids: Vec<ActivityId> = activities.keys().copied().collect();
        let mut f = PersistentSet::new();
        for (idx, &i) in ids.iter().enumerate() {
            for &j in &ids[idx + 1..] {
                let pair = canon(i, j);
                if !precedence_pairs.contains(&pair) && !d.contains(&pair) {
                    f.insert(pair);
                }
            }
        }

        Self {
            activities,
            resources,
            c,
            d,
            n: PersistentSet::new(),
            f,
        }
    }

    #[must_use]
    pub fn activities(&self) -> &BTreeMap<ActivityId, Activity> {
        &self.activities
    }

    #[must_use]
    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    #[must_use]
    pub fn conjunctions(&self) -> &PersistentSet<Pair> {
        &self.c
    }

    #[must_use]
    pub fn disjunctions(&self) -> &PersistentSet<Pair> {
        &self.d
    }

    #[must_use]
    pub fn parallelities(&self) -> &PersistentSet<Pair> {
        &self.n
    }

    #[must_use]
    pub fn free(&self) -> &PersistentSet<Pair> {
        &self.f
    }

    #[must_use]
    pub fn is_in_c(&self, i: ActivityId, j: ActivityId) -> bool {
        self.c.contains(&(i, j))
    }

    #[must_use]
    pub fn is_in_d(&self, i: ActivityId, j: ActivityId) -> bool {
        self.d.contains(&canon(i, j))
    }

    #[must_use]
    pub fn is_in_n(&self, i: ActivityId, j: ActivityId) -> bool {
        self.n.contains(&canon(i, j))
    }

    #[must_use]
    pub fn is_in_f(&self, i: ActivityId, j: ActivityId) -> bool {
        self.f.contains(&canon(i, j))
    }

    /// Fix the order `i -> j`. Clears `{i, j}` from `D`, `N`, and `F`.
    pub fn add_conjunction(&mut self, i: ActivityId, j: ActivityId) {
        debug_assert!(
            !self.c.contains(&(j, i)),
            "conjunction {j}->{i} already fixed in the opposite direction"
        );
        let pair = canon(i, j);
        self.c.insert((i, j));
        self.d.remove(&pair);
        self.n.remove(&pair);
        self.f.remove(&pair);
    }

    /// Record `{i, j}` as a conflicting pair whose order is still
    /// undecided. Clears the pair from `F`.
    pub fn add_disjunction(&mut self, i: ActivityId, j: ActivityId) {
        let pair = canon(i, j);
        debug_assert!(
            !self.c.contains(&(i, j)) && !self.c.contains(&(j, i)),
            "pair {i}-{j} already has a fixed order"
        );
        self.d.insert(pair);
        self.f.remove(&pair);
    }

    /// Record `{i, j}` as proven conflict-free: no order is required.
    /// Clears the pair from `D` and `F`.
    pub fn add_parallelity(&mut self, i: ActivityId, j: ActivityId) {
        let pair = canon(i, j);
        self.n.insert(pair);
        self.d.remove(&pair);
        self.f.remove(&pair);
    }

    /// Direct successors of `i` under the currently fixed conjunctions.
    pub fn successors(&self, i: ActivityId) -> impl Iterator<Item = ActivityId> + '_ {
        self.c
            .iter()
            .filter(move |&&(from, _)| from == i)
            .map(|&(_, to)| to)
    }

    /// Direct predecessors of `i` under the currently fixed conjunctions.
    pub fn predecessors(&self, i: ActivityId) -> impl Iterator<Item = ActivityId> + '_ {
        self.c
            .iter()
            .filter(move |&&(_, to)| to == i)
            .map(|&(from, _)| from)
    }

    /// All disjunctive pairs still undecided, in canonical order.
    pub fn disjunction_pairs(&self) -> impl Iterator<Item = Pair> + '_ {
        self.d.iter().copied()
    }

    /// `true` if the conjunction graph (`C`) contains no cycle.
    ///
    /// A depth-first search tracking the recursion stack.
    #[must_use]
    pub fn acyclic(&self) -> bool {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            Visiting,
            Done,
        }

        let mut marks: BTreeMap<ActivityId, Mark> = BTreeMap::new();

        fn visit(
            scheme: &ScheduleScheme,
            node: ActivityId,
            marks: &mut BTreeMap<ActivityId, Mark>,
        ) -> bool {
            match marks.get(&node) {
                Some(Mark::Done) => return true,
                Some(Mark::Visiting) => return false,
                None => {}
            }
            marks.insert(node, Mark::Visiting);
            for next in scheme.successors(node).collect::<Vec<_>>() {
                if !visit(scheme, next, marks) {
                    return false;
                }
            }
            marks.insert(node, Mark::Done);
            true
        }

        for &id in self.activities.keys() {
            if !visit(self, id, &mut marks) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Activity, Resources};

    fn line_instance() -> Instance {
        let activities = vec![Activity::new(1, 0), Activity::new(2, 3), Activity::new(3, 0)];
        Instance::new(activities, Resources::new(), vec![(1, 2), (2, 3)], vec![]).unwrap()
    }

    #[test]
    fn new_scheme_seeds_conjunctions_from_precedences() {
        let instance = line_instance();
        let scheme = ScheduleScheme::new(&instance);

        assert!(scheme.is_in_c(1, 2));
        assert!(scheme.is_in_c(2, 3));
        assert!(!scheme.is_in_f(1, 2));
        assert!(scheme.is_in_f(1, 3));
    }

    #[test]
    fn new_scheme_seeds_disjunctions_from_incompatibilities() {
        let activities = vec![
            Activity::new(1, 0),
            Activity::new(2, 3),
            Activity::new(3, 3),
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

        assert!(scheme.is_in_d(2, 3));
        assert!(!scheme.is_in_f(2, 3));
    }

    #[test]
    fn add_conjunction_moves_pair_out_of_free() {
        let activities = vec![Activity::new(1, 0), Activity::new(2, 2), Activity::new(3, 0)];
        let instance = Instance::new(activities, Resources::new(), vec![], vec![]).unwrap();
        let mut scheme = ScheduleScheme::new(&instance);

        assert!(scheme.is_in_f(1, 2));
        scheme.add_conjunction(1, 2);
        assert!(scheme.is_in_c(1, 2));
        assert!(!scheme.is_in_f(1, 2));
    }

    #[test]
    fn add_disjunction_then_parallelity_clears_d() {
        let activities = vec![Activity::new(1, 1), Activity::new(2, 1)];
        let instance = Instance::new(activities, Resources::new(), vec![], vec![]).unwrap();
        let mut scheme = ScheduleScheme::new(&instance);

        scheme.add_disjunction(1, 2);
        assert!(scheme.is_in_d(1, 2));

        scheme.add_parallelity(1, 2);
        assert!(scheme.is_in_n(1, 2));
        assert!(!scheme.is_in_d(1, 2));
    }

    #[test]
    fn acyclic_detects_cycles() {
        let activities = vec![Activity::new(1, 1), Activity::new(2, 1), Activity::new(3, 1)];
        let instance = Instance::new(activities, Resources::new(), vec![], vec![]).unwrap();
        let mut scheme = ScheduleScheme::new(&instance);

        scheme.add_conjunction(1, 2);
        scheme.add_conjunction(2, 3);
        assert!(scheme.acyclic());

        scheme.add_conjunction(3, 1);
        assert!(!scheme.acyclic());
    }

    #[test]
    fn cloning_a_scheme_shares_structure() {
        let instance = line_instance();
        let mut scheme = ScheduleScheme::new(&instance);
        let snapshot = scheme.clone();

        scheme.add_disjunction(1, 3);
        assert!(!snapshot.is_in_d(1, 3));
    }
}
