//! Output formatters (human, JSONL and JSON)

pub mod human;
pub mod json;
pub mod jsonl;
pub mod rulebase_list;

pub use human::HumanFormatter;
pub use json::JsonFormatter;
pub use jsonl::JsonlFormatter;
pub use rulebase_list::{
    RuleSummary, RulebaseHumanFormatter, RulebaseJsonFormatter, RulebaseJsonlFormatter,
    RulebaseSummary,
};
