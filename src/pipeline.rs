//! Batch scheduling of concurrent price extraction
//!
//! The pipeline owns a fixed pool of browsing sessions and works the item
//! list through them in concurrency-bounded chunks: chunks run strictly one
//! after another behind a join barrier, items within a chunk run
//! concurrently, each on its own session. A failure or panic inside one
//! task becomes that item's observation and never disturbs its siblings.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::task::JoinSet;
use tokio::time::{sleep, timeout};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::events::{PipelineEvent, TracingSink};
use crate::extract::{build_search_query, PriceExtractor};
use crate::traits::{AutomationEngine, BrowsingSession, EventSink};
use crate::types::{MusicItem, PriceObservation, PricingReport};

/// Front door of the price-discovery pipeline.
///
/// Dependencies are injected: the automation engine decides what a browsing
/// session actually is (a Chromium page in production, a scripted fake in
/// tests) and the event sink decides where progress goes.
pub struct PricingPipeline<E>
where
    E: AutomationEngine + Send + Sync + 'static,
{
    engine: E,
    config: Arc<PipelineConfig>,
    events: Arc<dyn EventSink>,
}

impl<E> PricingPipeline<E>
where
    E: AutomationEngine + Send + Sync + 'static,
{
    /// Create a pipeline reporting progress through `tracing`.
    pub fn new(engine: E, config: PipelineConfig) -> Self {
        Self {
            engine,
            config: Arc::new(config),
            events: Arc::new(TracingSink),
        }
    }

    /// Replace the progress event sink.
    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Price every item and assemble the report.
    ///
    /// Fatal errors: an empty item list and an engine that cannot produce
    /// its sessions. Everything else finalizes as per-item observations.
    /// The engine is shut down on every exit path.
    pub async fn run(&self, items: &[MusicItem]) -> PipelineResult<PricingReport> {
        if items.is_empty() {
            self.release_engine().await;
            return Err(PipelineError::invalid_input("no items to price"));
        }

        let concurrency = self.config.effective_concurrency();
        self.events.emit(PipelineEvent::RunStarted {
            total_items: items.len(),
            concurrency,
        });

        let sessions = match self.open_sessions(concurrency).await {
            Ok(sessions) => sessions,
            Err(error) => {
                self.release_engine().await;
                return Err(error);
            }
        };

        let observations = if concurrency == 1 {
            self.collect_sequential(items, &sessions[0]).await
        } else {
            self.collect_chunked(items, &sessions).await
        };

        drop(sessions);
        self.release_engine().await;

        let available = observations.iter().filter(|o| o.available).count();
        let report = crate::core::analyze(observations);
        self.events.emit(PipelineEvent::RunCompleted {
            total: report.total_tracks,
            available,
        });
        Ok(report)
    }

    /// Initialize the fixed session pool once, up front.
    async fn open_sessions(
        &self,
        concurrency: usize,
    ) -> PipelineResult<Vec<Arc<dyn BrowsingSession>>> {
        let mut sessions = Vec::with_capacity(concurrency);
        for _ in 0..concurrency {
            let session = self.engine.new_session().await?;
            self.events.emit(PipelineEvent::SessionOpened {
                session: session.id(),
            });
            sessions.push(session);
        }
        Ok(sessions)
    }

    async fn release_engine(&self) {
        if let Err(error) = self.engine.shutdown().await {
            tracing::warn!(%error, "automation engine shutdown reported an error");
        }
    }

    /// Chunk-major concurrent collection.
    ///
    /// Chunk `i` holds `items[i*C, (i+1)*C)`; its members run concurrently,
    /// each on session `offset % C`, and the next chunk only starts after
    /// every member finished (join barrier) plus the politeness delay.
    async fn collect_chunked(
        &self,
        items: &[MusicItem],
        sessions: &[Arc<dyn BrowsingSession>],
    ) -> Vec<PriceObservation> {
        let concurrency = sessions.len();
        let chunk_count = items.len().div_ceil(concurrency);
        let mut indexed: Vec<(usize, PriceObservation)> = Vec::with_capacity(items.len());

        for (chunk_index, chunk) in items.chunks(concurrency).enumerate() {
            self.events.emit(PipelineEvent::ChunkStarted {
                index: chunk_index,
                size: chunk.len(),
            });

            let mut tasks = JoinSet::new();
            for (offset, item) in chunk.iter().enumerate() {
                let global_index = chunk_index * concurrency + offset;
                let session = Arc::clone(&sessions[offset % concurrency]);
                let config = Arc::clone(&self.config);
                let events = Arc::clone(&self.events);
                let item = item.clone();
                tasks.spawn(async move {
                    (global_index, run_item(session, config, events, item).await)
                });
            }

            let mut finished: HashSet<usize> = HashSet::with_capacity(chunk.len());
            while let Some(joined) = tasks.join_next().await {
                if let Ok((index, observation)) = joined {
                    finished.insert(index);
                    indexed.push((index, observation));
                }
            }
            // A panicked task left no observation behind; backfill a failure
            // so every item still appears exactly once in the report.
            for (offset, item) in chunk.iter().enumerate() {
                let global_index = chunk_index * concurrency + offset;
                if !finished.contains(&global_index) {
                    let query = build_search_query(item);
                    indexed.push((
                        global_index,
                        PriceObservation::unavailable(item, &query, "extraction task panicked"),
                    ));
                }
            }

            self.events.emit(PipelineEvent::ChunkCompleted { index: chunk_index });
            if chunk_index + 1 < chunk_count {
                sleep(self.config.chunk_delay).await;
            }
        }

        if self.config.restore_input_order {
            indexed.sort_by_key(|(index, _)| *index);
        }
        indexed
            .into_iter()
            .map(|(_, observation)| observation)
            .collect()
    }

    /// Degenerate mode: one item at a time on a single session, with the
    /// politeness delay after every item instead of every chunk.
    async fn collect_sequential(
        &self,
        items: &[MusicItem],
        session: &Arc<dyn BrowsingSession>,
    ) -> Vec<PriceObservation> {
        let mut observations = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let observation = run_item(
                Arc::clone(session),
                Arc::clone(&self.config),
                Arc::clone(&self.events),
                item.clone(),
            )
            .await;
            observations.push(observation);

            if index + 1 < items.len() {
                sleep(self.config.item_delay).await;
            }
        }
        observations
    }
}

/// Run one item to a finalized observation: deadline-bounded extraction,
/// re-run up to `max_retries` times when it finalizes unavailable.
async fn run_item(
    session: Arc<dyn BrowsingSession>,
    config: Arc<PipelineConfig>,
    events: Arc<dyn EventSink>,
    item: MusicItem,
) -> PriceObservation {
    let extractor = PriceExtractor::new(session, Arc::clone(&config), Arc::clone(&events));
    let mut observation = extract_once(&extractor, &config, &item).await;

    let mut attempt = 0;
    while !observation.available && attempt < config.max_retries {
        attempt += 1;
        events.emit(PipelineEvent::ItemRetried {
            song: item.song.clone(),
            attempt,
        });
        observation = extract_once(&extractor, &config, &item).await;
    }
    observation
}

async fn extract_once(
    extractor: &PriceExtractor,
    config: &PipelineConfig,
    item: &MusicItem,
) -> PriceObservation {
    match timeout(config.item_timeout, extractor.price_item(item)).await {
        Ok(observation) => observation,
        Err(_) => {
            let query = build_search_query(item);
            let error = PipelineError::ItemTimeout {
                timeout: config.item_timeout,
            };
            PriceObservation::unavailable(item, &query, error.to_string())
        }
    }
}
