#![forbid(unsafe_code)]

//! Rulebase listing formatters for the `compliance rulebases` command

use crate::rules::Rulebase;
use serde::Serialize;

/// Listing entry for one rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleSummary {
    pub id: String,
    pub kind: &'static str,
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub criteria: String,
}

/// Listing entry for one rulebase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RulebaseSummary {
    pub id: String,
    pub description: String,
    pub rules: Vec<RuleSummary>,
}

impl From<&Rulebase> for RulebaseSummary {
    fn from(rulebase: &Rulebase) -> Self {
        RulebaseSummary {
            id: rulebase.id().to_string(),
            description: rulebase.description().to_string(),
            rules: rulebase
                .rules()
                .iter()
                .map(|rule| RuleSummary {
                    id: rule.id().to_string(),
                    kind: rule.kind_name(),
                    description: rule.description().to_string(),
                    criteria: rule.criteria(),
                })
                .collect(),
        }
    }
}

/// Human-readable formatter for rulebase listings
pub struct RulebaseHumanFormatter;

impl RulebaseHumanFormatter {
    pub fn new() -> Self {
        RulebaseHumanFormatter
    }

    pub fn format(&self, rulebases: &[RulebaseSummary]) -> String {
        let mut output = String::new();

        output.push_str(&format!("Rulebases ({} registered):\n", rulebases.len()));

        for rulebase in rulebases {
            output.push('\n');
            output.push_str(&format!("{} ({} rules)\n", rulebase.id, rulebase.rules.len()));
            if !rulebase.description.is_empty() {
                output.push_str(&format!("  Description: {}\n", rulebase.description));
            }
            for rule in &rulebase.rules {
                if rule.description.is_empty() {
                    output.push_str(&format!("  - {} [{}]\n", rule.id, rule.kind));
                } else {
                    output.push_str(&format!(
                        "  - {} [{}]: {}\n",
                        rule.id, rule.kind, rule.description
                    ));
                }
                if !rule.criteria.is_empty() {
                    output.push_str(&format!("      Matches: {}\n", rule.criteria));
                }
            }
        }

        output
    }

    pub fn write_to_stdout(&self, rulebases: &[RulebaseSummary]) {
        print!("{}", self.format(rulebases));
    }
}

impl Default for RulebaseHumanFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// JSONL formatter for rulebase listings, one record per rulebase
pub struct RulebaseJsonlFormatter;

#[derive(Serialize)]
struct RulebaseRecord<'a> {
    id: &'a str,
    description: &'a str,
    rules: &'a [RuleSummary],
}

impl<'a> From<&'a RulebaseSummary> for RulebaseRecord<'a> {
    fn from(rulebase: &'a RulebaseSummary) -> Self {
        RulebaseRecord {
            id: &rulebase.id,
            description: &rulebase.description,
            rules: &rulebase.rules,
        }
    }
}

impl RulebaseJsonlFormatter {
    pub fn new() -> Self {
        RulebaseJsonlFormatter
    }

    pub fn format(&self, rulebases: &[RulebaseSummary]) -> String {
        let mut output = String::new();

        for rulebase in rulebases {
            if let Ok(json) = serde_json::to_string(&RulebaseRecord::from(rulebase)) {
                output.push_str(&json);
                output.push('\n');
            }
        }

        output
    }

    pub fn write_to_stdout(&self, rulebases: &[RulebaseSummary]) {
        print!("{}", self.format(rulebases));
    }
}

impl Default for RulebaseJsonlFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// JSON formatter for rulebase listings, a single array of rulebase records
pub struct RulebaseJsonFormatter;

impl RulebaseJsonFormatter {
    pub fn new() -> Self {
        RulebaseJsonFormatter
    }

    pub fn format(&self, rulebases: &[RulebaseSummary]) -> String {
        let records: Vec<RulebaseRecord<'_>> = rulebases.iter().map(RulebaseRecord::from).collect();
        match serde_json::to_string(&records) {
            Ok(mut json) => {
                json.push('\n');
                json
            }
            Err(_) => String::new(),
        }
    }

    pub fn write_to_stdout(&self, rulebases: &[RulebaseSummary]) {
        print!("{}", self.format(rulebases));
    }
}

impl Default for RulebaseJsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}
