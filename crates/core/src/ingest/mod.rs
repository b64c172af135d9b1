//! Boundary parsing of raw JSON input.
//!
//! Shapes are checked here, once. Amounts are read leniently so the engines
//! can record numeric anomalies instead of failing.

pub mod error;
pub mod parse;

pub use error::IngestError;
pub use parse::{
    ReconciliationInput, SamplingInput, parse_a07, parse_annotations, parse_mapping_rules,
    parse_rows, parse_sampling_configuration, parse_transactions, parse_trial_balance,
};
