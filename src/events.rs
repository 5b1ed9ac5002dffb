//! Structured pipeline progress events
//!
//! Every observable step of a run is announced as a `PipelineEvent` through
//! the `EventSink` trait instead of ad-hoc printing inside the control flow.

use crate::traits::EventSink;
use crate::types::SessionId;

/// Progress event emitted by the scheduler and the per-item extractor.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// A run was accepted and sessions are being opened.
    RunStarted { total_items: usize, concurrency: usize },

    /// One browsing session became ready.
    SessionOpened { session: SessionId },

    /// A chunk of concurrently processed items began.
    ChunkStarted { index: usize, size: usize },

    /// Every item of the chunk reached a final outcome (join barrier).
    ChunkCompleted { index: usize },

    /// An extraction task picked up an item.
    ItemStarted {
        session: SessionId,
        artist: String,
        song: String,
    },

    /// The search results page was evaluated.
    SearchCompleted {
        session: SessionId,
        query: String,
        results: usize,
    },

    /// Too few results; the narrower query is being issued.
    QueryRefined { session: SessionId, query: String },

    /// A scanned result failed the candidate filter.
    CandidateRejected { session: SessionId, title: String },

    /// A scanned result passed the filter; scanning stops here.
    CandidateAccepted { session: SessionId, title: String },

    /// A positive track price was read off the product page.
    TrackPriced {
        session: SessionId,
        song: String,
        price: f64,
    },

    /// The product page also carried an album offer.
    AlbumOfferSeen {
        session: SessionId,
        album: String,
        price: f64,
    },

    /// The item reached a final observation.
    ItemCompleted {
        session: SessionId,
        song: String,
        available: bool,
    },

    /// A finalized-unavailable item is being re-run.
    ItemRetried { song: String, attempt: u32 },

    /// All chunks finished and the report was assembled.
    RunCompleted { total: usize, available: usize },
}

/// Production sink forwarding events to `tracing`.
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: PipelineEvent) {
        match event {
            PipelineEvent::RunStarted {
                total_items,
                concurrency,
            } => {
                tracing::info!(total_items, concurrency, "starting price discovery run");
            }
            PipelineEvent::SessionOpened { session } => {
                tracing::debug!(%session, "browsing session ready");
            }
            PipelineEvent::ChunkStarted { index, size } => {
                tracing::info!(chunk = index, size, "processing chunk");
            }
            PipelineEvent::ChunkCompleted { index } => {
                tracing::debug!(chunk = index, "chunk completed");
            }
            PipelineEvent::ItemStarted { session, artist, song } => {
                tracing::info!(%session, %artist, %song, "searching for item");
            }
            PipelineEvent::SearchCompleted {
                session,
                query,
                results,
            } => {
                tracing::debug!(%session, %query, results, "search results evaluated");
            }
            PipelineEvent::QueryRefined { session, query } => {
                tracing::debug!(%session, %query, "refining search query");
            }
            PipelineEvent::CandidateRejected { session, title } => {
                tracing::debug!(%session, %title, "candidate rejected");
            }
            PipelineEvent::CandidateAccepted { session, title } => {
                tracing::debug!(%session, %title, "candidate accepted");
            }
            PipelineEvent::TrackPriced { session, song, price } => {
                tracing::info!(%session, %song, price, "track priced");
            }
            PipelineEvent::AlbumOfferSeen { session, album, price } => {
                tracing::debug!(%session, %album, price, "album offer seen");
            }
            PipelineEvent::ItemCompleted {
                session,
                song,
                available,
            } => {
                if available {
                    tracing::debug!(%session, %song, "item completed");
                } else {
                    tracing::warn!(%session, %song, "item finished without a price");
                }
            }
            PipelineEvent::ItemRetried { song, attempt } => {
                tracing::info!(%song, attempt, "retrying item");
            }
            PipelineEvent::RunCompleted { total, available } => {
                tracing::info!(total, available, "price discovery run completed");
            }
        }
    }
}

/// Sink that drops every event; used where progress output is unwanted.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: PipelineEvent) {}
}
