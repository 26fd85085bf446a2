#![forbid(unsafe_code)]

//! Rule definitions, evaluation and the rulebase registry

mod comparison;
mod definition;
mod pattern;
mod registry;
mod rule;

pub use comparison::{Comparison, ContradictionOracle, DEFAULT_NEGATION_KEY, DeclaredOpposites};
pub use definition::{RuleDefinition, RuleKindName, RulebaseDefinition};
pub use pattern::{StatementPattern, TagSelector};
pub use registry::{Rulebase, RulebaseRegistry};
pub use rule::{
    CorpusRule, DEFAULT_SCAN_BATCH, Evaluation, EvaluationContext, Rule, RuleEvidence, RuleKind,
    SelfContainedCheck,
};
