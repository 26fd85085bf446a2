#![forbid(unsafe_code)]

//! Statement comparison vocabulary
//!
//! Structural comparisons are fixed; the semantic "contradicts" relation is an
//! injected [`ContradictionOracle`] so new strategies can be plugged into a
//! checker without touching documents or rules.

use crate::model::{Statement, normalize};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Debug;

/// Metadata key marking a statement as negated, unless configured otherwise
pub const DEFAULT_NEGATION_KEY: &str = "negated";

/// Decides whether two statements contradict each other
///
/// Implementations must be symmetric and side-effect free; the engine may call
/// them from several threads at once.
pub trait ContradictionOracle: Send + Sync + Debug {
    fn contradicts(&self, a: &Statement, b: &Statement) -> bool;
}

/// Contradiction by declared opposite objects or by negation
///
/// Two statements contradict when they share subject and predicate and either
/// their objects form a declared opposite pair (in either order), or their
/// objects are equal and exactly one of them is negated.
#[derive(Debug, Clone)]
pub struct DeclaredOpposites {
    pairs: HashSet<(String, String)>,
    negation_key: String,
}

impl DeclaredOpposites {
    pub fn new() -> Self {
        Self {
            pairs: HashSet::new(),
            negation_key: DEFAULT_NEGATION_KEY.to_string(),
        }
    }

    /// Declares `a` and `b` as opposite objects; order does not matter
    pub fn with_opposites(mut self, a: &str, b: &str) -> Self {
        let (a, b) = (normalize(a), normalize(b));
        self.pairs.insert((a.clone(), b.clone()));
        self.pairs.insert((b, a));
        self
    }

    pub fn with_negation_key(mut self, key: impl Into<String>) -> Self {
        self.negation_key = key.into();
        self
    }

    fn opposite(&self, a: &str, b: &str) -> bool {
        self.pairs.contains(&(normalize(a), normalize(b)))
    }
}

impl Default for DeclaredOpposites {
    /// Opposites used when no configuration overrides them
    fn default() -> Self {
        Self::new()
            .with_opposites("forbidden", "required")
            .with_opposites("forbidden", "permitted")
            .with_opposites("prohibited", "required")
            .with_opposites("prohibited", "permitted")
            .with_opposites("mandatory", "optional")
    }
}

impl ContradictionOracle for DeclaredOpposites {
    fn contradicts(&self, a: &Statement, b: &Statement) -> bool {
        if !a.same_subject_predicate(b) {
            return false;
        }
        let negation_differs = a.flag(&self.negation_key) != b.flag(&self.negation_key);
        if normalize(&a.object) == normalize(&b.object) {
            return negation_differs;
        }
        // Negating one side of an opposite pair makes them agree
        self.opposite(&a.object, &b.object) && !negation_differs
    }
}

/// How a corpus-relative rule compares candidate statements with a reference document's
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Comparison {
    /// Some pair of statements contradicts under the injected oracle
    #[default]
    Contradicts,
    /// Some pair shares subject and predicate
    SubjectPredicate,
    /// Some pair is structurally equal
    Equal,
}

impl Comparison {
    /// Name as written in rulebase files
    pub fn as_str(&self) -> &'static str {
        match self {
            Comparison::Contradicts => "contradicts",
            Comparison::SubjectPredicate => "subject-predicate",
            Comparison::Equal => "equal",
        }
    }

    /// True if any candidate statement relates to any reference statement under this comparison
    pub fn conflicts(
        &self,
        candidate: &[Statement],
        reference: &[Statement],
        oracle: &dyn ContradictionOracle,
    ) -> bool {
        candidate.iter().any(|c| {
            reference.iter().any(|r| match self {
                Comparison::Contradicts => oracle.contradicts(c, r),
                Comparison::SubjectPredicate => c.same_subject_predicate(r),
                Comparison::Equal => c.same_triple(r),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stmt(text: &str) -> Statement {
        Statement::parse_sentence(text).unwrap()
    }

    #[test]
    fn test_declared_opposites_contradict() {
        let oracle = DeclaredOpposites::default();
        assert!(oracle.contradicts(&stmt("X is forbidden"), &stmt("X is required")));
        assert!(oracle.contradicts(&stmt("X is required"), &stmt("X is forbidden")));
        assert!(oracle.contradicts(&stmt("x IS Forbidden"), &stmt("X is permitted")));
    }

    #[test]
    fn test_unrelated_statements_do_not_contradict() {
        let oracle = DeclaredOpposites::default();
        assert!(!oracle.contradicts(&stmt("X is forbidden"), &stmt("Y is optional")));
        assert!(!oracle.contradicts(&stmt("X is forbidden"), &stmt("Y is required")));
        assert!(!oracle.contradicts(&stmt("X is forbidden"), &stmt("X is forbidden")));
        assert!(!oracle.contradicts(&stmt("X is required"), &stmt("X is permitted")));
    }

    #[test]
    fn test_negation_contradicts_same_claim() {
        let oracle = DeclaredOpposites::default();
        let plain = stmt("X is required");
        let negated = stmt("X is required").with_metadata("negated", "true");
        assert!(oracle.contradicts(&plain, &negated));
        assert!(!oracle.contradicts(&negated, &negated));
    }

    #[test]
    fn test_negated_opposite_agrees() {
        let oracle = DeclaredOpposites::default();
        let not_forbidden = stmt("X is forbidden").with_metadata("negated", "true");
        assert!(!oracle.contradicts(&not_forbidden, &stmt("X is permitted")));
    }

    #[test]
    fn test_custom_negation_key_and_opposites() {
        let oracle = DeclaredOpposites::new()
            .with_opposites("Allowed", "Denied")
            .with_negation_key("not");
        assert!(oracle.contradicts(&stmt("access is allowed"), &stmt("access is denied")));
        assert!(oracle.contradicts(
            &stmt("access is allowed"),
            &stmt("access is allowed").with_metadata("not", "true")
        ));
        assert!(!oracle.contradicts(&stmt("X is forbidden"), &stmt("X is required")));
    }

    #[test]
    fn test_comparison_variants() {
        let oracle = DeclaredOpposites::default();
        let candidate = vec![stmt("X is required"), stmt("Z is optional")];

        assert!(Comparison::Contradicts.conflicts(&candidate, &[stmt("X is forbidden")], &oracle));
        assert!(!Comparison::Contradicts.conflicts(&candidate, &[stmt("Y is forbidden")], &oracle));

        assert!(Comparison::SubjectPredicate.conflicts(&candidate, &[stmt("Z is mandatory")], &oracle));
        assert!(!Comparison::SubjectPredicate.conflicts(&candidate, &[stmt("Z must be optional")], &oracle));

        assert!(Comparison::Equal.conflicts(&candidate, &[stmt("z is OPTIONAL")], &oracle));
        assert!(!Comparison::Equal.conflicts(&candidate, &[stmt("Z is mandatory")], &oracle));
    }

    #[test]
    fn test_comparison_empty_sides() {
        let oracle = DeclaredOpposites::default();
        assert!(!Comparison::Equal.conflicts(&[], &[stmt("X is forbidden")], &oracle));
        assert!(!Comparison::Equal.conflicts(&[stmt("X is forbidden")], &[], &oracle));
    }
}
