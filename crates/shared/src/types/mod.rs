//! Common types used across the application.

pub mod amount;
pub mod id;
pub mod money;

pub use amount::{amount_from_value, parse_amount};
pub use id::*;
pub use money::{Currency, Locale};
