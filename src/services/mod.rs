//! Service implementations
//!
//! Real implementations behind the capability traits plus the I/O at the
//! pipeline's edges: the Chromium-backed automation engine, item-list
//! loading, and report serialization.

pub mod browser;
pub mod input;
pub mod report;

pub use browser::ChromiumEngine;
pub use input::{load_items, parse_item_spec};
pub use report::{print_summary, track_recommendation, write_csv, write_json};
