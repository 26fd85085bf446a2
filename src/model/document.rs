#![forbid(unsafe_code)]

//! Documents: identified, versioned collections of statements

use crate::model::Statement;
use crate::types::{DocumentId, Revision};
use serde::{Deserialize, Serialize};

/// An identified, versioned aggregate of statements
///
/// `id` and `revision` are assigned by the store. A candidate document submitted
/// for checking may have neither. Only `statements` are inspected by rules;
/// `tags` are used by corpus selectors to pick reference documents.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,

    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<Revision>,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub statements: Vec<Statement>,
}

impl Document {
    pub fn new(name: impl Into<String>) -> Self {
        Document {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_statement(mut self, statement: Statement) -> Self {
        self.statements.push(statement);
        self
    }

    /// Builds a new, unsaved document from `template` carrying this document's statements
    ///
    /// Identity and revision are cleared so the result can be posted as a fresh document.
    pub fn duplicate_into(&self, template: Document) -> Document {
        Document {
            id: None,
            revision: None,
            statements: self.statements.clone(),
            ..template
        }
    }

    /// Short label used in logs and human output
    pub fn label(&self) -> String {
        match (&self.id, self.name.is_empty()) {
            (Some(id), true) => id.to_string(),
            (Some(id), false) => format!("{} ({})", id, self.name),
            (None, false) => format!("<unsaved> ({})", self.name),
            (None, true) => "<unsaved>".to_string(),
        }
    }
}
