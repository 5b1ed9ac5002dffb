//! Pure pipeline logic
//!
//! Everything in here is deterministic and free of I/O: price text parsing,
//! candidate filtering, and the pricing optimization that turns finalized
//! observations into a report.

pub mod filter;
pub mod optimizer;
pub mod price;

pub use filter::is_acceptable_candidate;
pub use optimizer::analyze;
pub use price::extract_price;
