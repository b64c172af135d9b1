//! Currency rounding and display utilities.

pub mod format;
pub mod rounding;

#[cfg(test)]
mod props;

pub use auditdesk_shared::types::parse_amount;
pub use format::format_as_currency;
pub use rounding::{CENT_PLACES, round_to_cent};
