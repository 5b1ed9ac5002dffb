//! Storefront price discovery and purchase optimization for music lists
//!
//! tunecart drives a pool of automated browsing sessions through a
//! storefront's digital-music search, extracts per-track (and, when offered,
//! per-album) prices, and computes a cost-minimizing purchase plan that
//! decides per album whether buying the whole album beats buying its tracks
//! individually.

pub mod config;
pub mod core;
pub mod error;
pub mod events;
pub mod extract;
pub mod pipeline;
pub mod services;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::{PipelineConfig, SelectorConfig, StorefrontConfig};
pub use error::{PipelineError, PipelineResult};
pub use events::{NullSink, PipelineEvent, TracingSink};
pub use pipeline::PricingPipeline;
pub use traits::{AutomationEngine, BrowsingSession, ElementHandle, EventSink};
pub use types::{AlbumAnalysis, MusicItem, PriceObservation, PricingReport, SessionId};
