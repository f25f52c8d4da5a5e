//! Declarative policy rules
//!
//! - `model`: rule file parsing into a [`RuleSet`]
//! - `extract`: per-resource-type value extraction (the extractor registry)
//! - `matcher`: evaluation of a rule against one record

pub mod extract;
pub mod matcher;
pub mod model;

pub use extract::{extractor_for, Extractor};
pub use matcher::{evaluate, evaluate_with, PredicateHit, RuleVerdict};
pub use model::{Predicate, Rule, RuleKind, RuleSet};
