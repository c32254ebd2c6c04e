//! Roster construction.
//!
//! - [`fields`] - canonical field resolution through alias groups
//! - [`duration`] - free-text duration grammars
//! - [`builder`] - inclusion, parsing and ordering of student records
//! - [`pipeline`] - file to roster orchestration

pub mod builder;
pub mod duration;
pub mod fields;
pub mod pipeline;

pub use builder::{build_roster, parse_student};
pub use duration::{format_duration, matching_grammar, parse_duration};
pub use fields::{resolve, CanonicalField};
pub use pipeline::{load_roster, LoadedRoster};
