//! Document and statement value types

mod document;
mod statement;

pub use document::Document;
pub use statement::Statement;
pub(crate) use statement::normalize;
