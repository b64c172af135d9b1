//! Audit sampling over ledger transactions.
//!
//! Three methods are supported: simple random sampling, stratified coverage
//! sampling, and monetary unit sampling. All of them are pure functions of the
//! population, the configuration, and an injected [`RandomSource`].

pub mod engine;
pub mod error;
pub mod random;
pub mod session;
pub mod types;


pub use engine::{SamplingEngine, compute_sample};
pub use error::SamplingError;
pub use random::{RandomSource, SeededRandom};
pub use session::SampleSession;
pub use types::{
    SamplingConfiguration, SamplingMethod, SamplingPolicy, SamplingResult, SamplingSummary,
    SamplingWarning, Transaction,
};
