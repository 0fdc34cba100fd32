//! # chemosched-core
//!
//! Core domain model for the chemosched scheduling engine: activities,
//! resources, the schedule-scheme algebra (C/D/N/F), and the `Scheduler`
//! trait every solver implements.
//!
//! This crate provides:
//! - Domain types: `Activity`, `Resource` map, `Instance`, `Cronograma`
//! - The `ScheduleScheme` four-relation algebra used by the B&B search
//! - The `Scheduler` trait and structured solve outcome types
//!
//! ## Example
//!
//! ```rust
//! use chemosched_core::{Activity, Instance};
//! use std::collections::BTreeMap;
//!
//! let activities = vec![
//!     Activity::new(1, 0),
//!     Activity::new(2, 3),
//!     Activity::new(3, 0),
//! ];
//! let instance = Instance::new(activities, BTreeMap::new(), vec![(1, 2), (2, 3)], vec![])
//!     .unwrap();
//! assert_eq!(instance.source_id(), 1);
//! assert_eq!(instance.sink_id(), 3);
//! ```

use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod scheme;

pub use scheme::ScheduleScheme;

/// Stable integer identifier for an activity.
pub type ActivityId = u32;

/// Name of a renewable resource (e.g. "R1", "nurse").
pub type ResourceName = String;

/// Resource name -> renewable capacity.
pub type Resources = BTreeMap<ResourceName, u32>;

/// Final schedule: activity id -> start time.
pub type Cronograma = BTreeMap<ActivityId, u32>;

/// A canonical (unordered) activity pair, always stored as (min, max).
pub type Pair = (ActivityId, ActivityId);

/// Canonicalize an unordered activity pair.
#[must_use]
pub fn canon(i: ActivityId, j: ActivityId) -> Pair {
    if i < j {
        (i, j)
    } else {
        (j, i)
    }
}

/// A single schedulable activity.
///
/// Source and sink are ordinary activities with zero duration and zero
/// demand; they are not a distinct variant, only the min/max id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub duration: u32,
    pub demands: BTreeMap<ResourceName, u32>,
}

impl Activity {
    #[must_use]
    pub fn new(id: ActivityId, duration: u32) -> Self {
        Self {
            id,
            duration,
            demands: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_demand(mut self, resource: impl Into<ResourceName>, amount: u32) -> Self {
        self.demands.insert(resource.into(), amount);
        self
    }

    #[must_use]
    pub fn demand(&self, resource: &str) -> u32 {
        self.demands.get(resource).copied().unwrap_or(0)
    }
}

/// Errors raised while constructing an `Instance`.
#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("instance has no activities")]
    Empty,

    #[error("duplicate activity id: {0}")]
    DuplicateActivity(ActivityId),

    #[error("precedence references unknown activity: {0}")]
    UnknownPrecedenceActivity(ActivityId),

    #[error("incompatibility references unknown activity: {0}")]
    UnknownIncompatibilityActivity(ActivityId),
}

/// A fully loaded, validated problem instance: activities, resources,
/// precedences, and incompatibilities. Immutable once built.
#[derive(Clone, Debug)]
pub struct Instance {
    activities: Rc<BTreeMap<ActivityId, Activity>>,
    resources: Rc<Resources>,
    precedences: Vec<Pair>,
    incompatibilities: Vec<Pair>,
}

impl Instance {
    /// Build and validate an instance.
    ///
    /// The source is the minimum activity id, the sink the maximum;
    /// incompatibility pairs that reference either are silently dropped.
    pub fn new(
        activities: Vec<Activity>,
        resources: Resources,
        precedences: Vec<(ActivityId, ActivityId)>,
        incompatibilities: Vec<(ActivityId, ActivityId)>,
    ) -> Result<Self, InstanceError> {
        if activities.is_empty() {
            return Err(InstanceError::Empty);
        }

        let mut map = BTreeMap::new();
        for activity in activities {
            if map.insert(activity.id, activity.clone()).is_some() {
                return Err(InstanceError::DuplicateActivity(activity.id));
            }
        }

        for &(i, j) in &precedences {
            if !map.contains_key(&i) {
                return Err(InstanceError::UnknownPrecedenceActivity(i));
            }
            if !map.contains_key(&j) {
                return Err(InstanceError::UnknownPrecedenceActivity(j));
            }
        }

        let source = *map.keys().min().expect("non-empty checked above");
        let sink = *map.keys().max().expect("non-empty checked above");

        let mut canon_incompatibilities = Vec::new();
        for &(i, j) in &incompatibilities {
            if !map.contains_key(&i) {
                return Err(InstanceError::UnknownIncompatibilityActivity(i));
            }
            if !map.contains_key(&j) {
                return Err(InstanceError::UnknownIncompatibilityActivity(j));
            }
            if i == source || i == sink || j == source || j == sink {
                tracing::debug!(i, j, "dropping incompatibility pair touching source/sink");
                continue;
            }
            canon_incompatibilities.push(canon(i, j));
        }

        Ok(Self {
            activities: Rc::new(map),
            resources: Rc::new(resources),
            precedences,
            incompatibilities: canon_incompatibilities,
        })
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
    pub fn precedences(&self) -> &[Pair] {
        &self.precedences
    }

    #[must_use]
    pub fn incompatibilities(&self) -> &[Pair] {
        &self.incompatibilities
    }

    #[must_use]
    pub fn activity(&self, id: ActivityId) -> Option<&Activity> {
        self.activities.get(&id)
    }

    /// The distinguished source activity: the minimum id.
    #[must_use]
    pub fn source_id(&self) -> ActivityId {
        *self.activities.keys().min().expect("validated non-empty")
    }

    /// The distinguished sink activity: the maximum id.
    #[must_use]
    pub fn sink_id(&self) -> ActivityId {
        *self.activities.keys().max().expect("validated non-empty")
    }

    pub(crate) fn activities_handle(&self) -> Rc<BTreeMap<ActivityId, Activity>> {
        Rc::clone(&self.activities)
    }

    pub(crate) fn resources_handle(&self) -> Rc<Resources> {
        Rc::clone(&self.resources)
    }
}

/// Options controlling a single solve run.
#[derive(Clone, Copy, Debug)]
pub struct SolveOptions {
    pub time_limit: Duration,
    pub verbose: bool,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_secs(600),
            verbose: false,
        }
    }
}

/// Structured statistics describing a completed (or timed-out) search.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SolveStats {
    pub nodes_explored: u64,
    pub nodes_pruned: u64,
    pub elapsed: Duration,
    pub optimal: bool,
    pub best_makespan: Option<u32>,
}

/// The outcome of a solve run. The engine never fails: an infeasible
/// instance is a proven result (`optimal = true`, `makespan = None`), and
/// a time-out is a reported incumbent, not an error.
#[derive(Clone, Debug)]
pub struct SolveReport {
    pub makespan: Option<u32>,
    pub schedule: Option<Cronograma>,
    pub stats: SolveStats,
}

/// Core scheduling abstraction. Implemented by the branch-and-bound
/// engine in `chemosched-solver`.
pub trait Scheduler {
    fn solve(&self, instance: &Instance, options: SolveOptions) -> SolveReport;
}
