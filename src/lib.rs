//! Exercise form checking and repetition counting over pose landmarks.
//!
//! A [`rules::RuleSet`] consumes one [`pose::Snapshot`] per frame, runs its
//! geometric rules, aggregates them into a form verdict, and advances its
//! repetition counter. Rule sets are built per session through a
//! [`registry::Registry`].

pub mod config;
pub mod error;
pub mod frames;
pub mod geometry;
pub mod pose;
pub mod registry;
pub mod reps;
pub mod rules;

pub use error::Error;
pub use pose::{Landmark, Position, Snapshot};
pub use registry::{ExerciseKind, Registry};
pub use rules::{Evaluate, Evaluation, RuleSet, Verdict};
