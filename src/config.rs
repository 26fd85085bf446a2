//! Configuration file parsing and validation

pub mod compliance_toml;

pub use compliance_toml::{
    ColorOption, ComplianceMeta, Config, ContradictionConfig, OutputConfig, OutputFormat,
};
