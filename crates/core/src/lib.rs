//! Core audit logic for AuditDesk.
//!
//! The engines are pure functions over in-memory collections with no
//! storage or network dependencies. Storage is reached only through the
//! ports the service is built with.
//!
//! # Modules
//!
//! - `sampling` - Simple random, stratified and monetary unit sampling
//! - `reconciliation` - A07 payroll reconciliation against the trial balance
//! - `currency` - Cent rounding and locale-aware amount formatting
//! - `ingest` - Raw JSON boundary parsing
//! - `ports` - Data source and session store interfaces with adapters
//! - `service` - Orchestration of the engines over the ports

pub mod currency;
pub mod ingest;
pub mod ports;
pub mod reconciliation;
pub mod sampling;
pub mod service;

pub use service::AuditService;
