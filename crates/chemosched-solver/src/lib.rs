//! # chemosched-solver
//!
//! Branch-and-bound solver for the resource-constrained project
//! scheduling problem augmented with pairwise activity incompatibilities.
//!
//! This crate provides:
//! - The distance-matrix / heads-tails machinery used to bound a
//!   partially ordered schedule scheme
//! - Immediate selection, the fixed-point propagator that resolves
//!   disjunctive pairs without branching
//! - p-SGS, the constructive heuristic used for upper bounds and for
//!   materializing the final schedule
//! - The weighted branching rule and the best-first search engine
//!
//! ## Example
//!
//! ```rust
//! use chemosched_core::{Activity, Instance, Scheduler, SolveOptions, Resources};
//! use chemosched_solver::BranchAndBoundSolver;
//!
//! let activities = vec![
//!     Activity::new(1, 0),
//!     Activity::new(2, 4),
//!     Activity::new(3, 0),
//! ];
//! let instance =
//!     Instance::new(activities, Resources::new(), vec![(1, 2), (2, 3)], vec![]).unwrap();
//!
//! let solver = BranchAndBoundSolver::new();
//! let report = solver.solve(&instance, SolveOptions::default());
//! assert_eq!(report.makespan, Some(4));
//! ```

pub mod bounds;
pub mod branching;
pub mod distance_matrix;
pub mod engine;
pub mod heads_tails;
pub mod immediate_selection;
pub mod psgs;

pub use distance_matrix::DistanceMatrix;
pub use engine::{solve, BranchAndBoundSolver};
pub use heads_tails::HeadsTails;
pub use immediate_selection::Infeasible;
