//! # chemosched-parser
//!
//! Parser and synthetic-instance generator for chemosched project files.
//!
//! This crate provides:
//! - `parse_str`/`parse_file` for PSPLIB `.sm` instance files
//! - Instance generation: resource-availability variants and
//!   multi-patient replication of a template instance
//!
//! ## Example
//!
//! ```rust
//! use chemosched_parser::parse_str;
//!
//! let input = "\
//! PRECEDENCE RELATIONS:
//! jobnr.    #modes  #successors   successors
//!    1        1          1           2
//!    2        1          0
//! REQUESTS/DURATIONS:
//! jobnr. mode duration  R 1
//!   1      1     0       0
//!   2      1     0       0
//! RESOURCEAVAILABILITIES:
//!   R 1
//!     2
//! ";
//!
//! let instance = parse_str(input).unwrap();
//! assert_eq!(instance.activities().len(), 2);
//! ```

pub mod generator;
pub mod sm;

pub use generator::{replicate_patients, with_resource_capacity};
pub use sm::{parse_file, parse_str, ParseError};
