//! Per-item price extraction
//!
//! One `PriceExtractor` drives one browsing session through the whole
//! search → filter → navigate → parse sequence for a single item. Every
//! fault inside that sequence is converted to a failed `PriceObservation`
//! here, at the item boundary; nothing escapes to the scheduler.

use std::sync::Arc;

use crate::config::PipelineConfig;
use crate::core::{extract_price, is_acceptable_candidate};
use crate::error::{PipelineError, PipelineResult};
use crate::events::PipelineEvent;
use crate::traits::{BrowsingSession, ElementHandle, EventSink};
use crate::types::{MusicItem, PriceObservation};

/// How many price-bearing elements to inspect per price selector before the
/// cascade moves on; later siblings are usually struck-through list prices.
const PRICE_ELEMENTS_PER_SELECTOR: usize = 3;

/// Storefront search query for an item: artist, song, and album when known.
pub fn build_search_query(item: &MusicItem) -> String {
    let mut query = format!("{} {}", item.artist, item.song);
    if let Some(album) = &item.album {
        query.push(' ');
        query.push_str(album);
    }
    query
}

/// Narrower follow-up query issued when the first search returns too little:
/// quoting the song title drops loosely related hits.
pub fn refine_search_query(item: &MusicItem) -> String {
    format!("{} \"{}\"", item.artist, item.song)
}

/// Drives one browsing session through the extraction of one item.
pub struct PriceExtractor {
    session: Arc<dyn BrowsingSession>,
    config: Arc<PipelineConfig>,
    events: Arc<dyn EventSink>,
}

impl PriceExtractor {
    pub fn new(
        session: Arc<dyn BrowsingSession>,
        config: Arc<PipelineConfig>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            session,
            config,
            events,
        }
    }

    /// Run the full extraction for one item.
    ///
    /// Never fails outward: any error becomes the `error` string of an
    /// unavailable observation.
    pub async fn price_item(&self, item: &MusicItem) -> PriceObservation {
        let query = build_search_query(item);
        self.events.emit(PipelineEvent::ItemStarted {
            session: self.session.id(),
            artist: item.artist.clone(),
            song: item.song.clone(),
        });

        let observation = match self.discover(item, &query).await {
            Ok(observation) => observation,
            Err(error) => PriceObservation::unavailable(item, &query, error.to_string()),
        };

        self.events.emit(PipelineEvent::ItemCompleted {
            session: self.session.id(),
            song: item.song.clone(),
            available: observation.available,
        });
        observation
    }

    async fn discover(&self, item: &MusicItem, query: &str) -> PipelineResult<PriceObservation> {
        let mut results = self.search(query).await?;

        // One refine pass when the first search came back thin
        if results.len() < self.config.min_results_before_refine {
            let refined = refine_search_query(item);
            self.events.emit(PipelineEvent::QueryRefined {
                session: self.session.id(),
                query: refined.clone(),
            });
            let refined_results = self.search(&refined).await?;
            if !refined_results.is_empty() {
                results = refined_results;
            }
        }

        if results.is_empty() {
            return Err(PipelineError::NoResultsFound {
                query: query.to_string(),
            });
        }

        let accepted = self.scan_results(&results, item, query).await?;
        self.open_product(accepted.as_ref()).await?;
        self.session.wait(self.config.settle_delay).await;

        let track_price = self.read_track_price(query).await?;
        self.events.emit(PipelineEvent::TrackPriced {
            session: self.session.id(),
            song: item.song.clone(),
            price: track_price,
        });

        let mut observation = PriceObservation::priced(item, query, track_price);
        let (album_price, album_name) = self.read_album_offer().await;
        if let Some(price) = album_price {
            self.events.emit(PipelineEvent::AlbumOfferSeen {
                session: self.session.id(),
                album: album_name.clone().unwrap_or_else(|| "unknown album".to_string()),
                price,
            });
        }
        observation.album_price = album_price;
        observation.album_name = album_name;

        Ok(observation)
    }

    /// Navigate to the search results for `query` and return the result
    /// containers, empty when the page shows nothing usable.
    async fn search(&self, query: &str) -> PipelineResult<Vec<Arc<dyn ElementHandle>>> {
        let url = self.config.storefront.search_url(query);
        self.session.navigate(&url).await?;
        self.session.wait(self.config.settle_delay).await;

        let located = self.locate_first(&self.config.selectors.results).await?;
        let visible = match located.first() {
            Some(first) => first.is_visible(self.config.lookup_timeout).await,
            None => false,
        };
        let results = if visible { located } else { Vec::new() };

        self.events.emit(PipelineEvent::SearchCompleted {
            session: self.session.id(),
            query: query.to_string(),
            results: results.len(),
        });
        Ok(results)
    }

    /// First cascade entry with at least one match wins.
    async fn locate_first(&self, cascade: &[String]) -> PipelineResult<Vec<Arc<dyn ElementHandle>>> {
        for selector in cascade {
            let found = self.session.locate(selector).await?;
            if !found.is_empty() {
                return Ok(found);
            }
        }
        Ok(Vec::new())
    }

    /// Scan the leading results and return the first one passing the
    /// candidate filter. First match wins; scanning stops immediately so a
    /// price is never attributed to a lookalike further down the page.
    async fn scan_results(
        &self,
        results: &[Arc<dyn ElementHandle>],
        item: &MusicItem,
        query: &str,
    ) -> PipelineResult<Arc<dyn ElementHandle>> {
        let scan_limit = results.len().min(self.config.max_results_scanned);

        for result in &results[..scan_limit] {
            let title = self.result_title(result.as_ref()).await;
            if title.is_empty() {
                continue;
            }
            if is_acceptable_candidate(&title, item) {
                self.events.emit(PipelineEvent::CandidateAccepted {
                    session: self.session.id(),
                    title,
                });
                return Ok(Arc::clone(result));
            }
            self.events.emit(PipelineEvent::CandidateRejected {
                session: self.session.id(),
                title,
            });
        }

        Err(PipelineError::NoMatchingCandidate {
            query: query.to_string(),
            scanned: scan_limit,
        })
    }

    /// Title of one search result: the title cascade first, the result's
    /// whole text as a last resort.
    async fn result_title(&self, result: &dyn ElementHandle) -> String {
        for selector in &self.config.selectors.titles {
            let Ok(found) = result.find(selector).await else {
                continue;
            };
            let Some(element) = found.first() else {
                continue;
            };
            if let Ok(text) = element.read_text(self.config.lookup_timeout).await {
                let text = text.trim();
                if !text.is_empty() {
                    return text.to_string();
                }
            }
        }

        result
            .read_text(self.config.lookup_timeout)
            .await
            .map(|text| text.trim().to_string())
            .unwrap_or_default()
    }

    /// Follow the accepted candidate to its product page, preferring the
    /// href (resolved to absolute) and falling back to a native click.
    async fn open_product(&self, result: &dyn ElementHandle) -> PipelineResult<()> {
        for selector in &self.config.selectors.links {
            let Ok(found) = result.find(selector).await else {
                continue;
            };
            let Some(link) = found.first() else {
                continue;
            };

            if let Ok(Some(href)) = link
                .read_attribute("href", self.config.lookup_timeout)
                .await
            {
                let url = self.config.storefront.absolutize(&href);
                self.session.navigate(&url).await?;
                return Ok(());
            }

            link.click().await?;
            return Ok(());
        }

        Err(PipelineError::fault("accepted candidate has no product link"))
    }

    /// Walk the track price cascade on the product page; the first element
    /// yielding a positive parsed price wins and the cascade halts.
    async fn read_track_price(&self, query: &str) -> PipelineResult<f64> {
        for selector in &self.config.selectors.track_prices {
            let found = self.session.locate(selector).await?;
            for element in found.iter().take(PRICE_ELEMENTS_PER_SELECTOR) {
                let Ok(text) = element.read_text(self.config.lookup_timeout).await else {
                    continue;
                };
                let price = extract_price(&text);
                if price > 0.0 {
                    return Ok(price);
                }
            }
        }

        Err(PipelineError::NoPriceExtracted {
            query: query.to_string(),
        })
    }

    /// Opportunistic album offer lookup: failures leave the fields absent
    /// and are never fatal to the item.
    async fn read_album_offer(&self) -> (Option<f64>, Option<String>) {
        let mut album_price = None;
        for selector in &self.config.selectors.album_prices {
            let Ok(found) = self.session.locate(selector).await else {
                continue;
            };
            for element in found.iter().take(PRICE_ELEMENTS_PER_SELECTOR) {
                let Ok(text) = element.read_text(self.config.lookup_timeout).await else {
                    continue;
                };
                let price = extract_price(&text);
                if price > 0.0 {
                    album_price = Some(price);
                    break;
                }
            }
            if album_price.is_some() {
                break;
            }
        }

        let mut album_name = None;
        for selector in &self.config.selectors.album_titles {
            let Ok(found) = self.session.locate(selector).await else {
                continue;
            };
            let Some(element) = found.first() else {
                continue;
            };
            if let Ok(text) = element.read_text(self.config.lookup_timeout).await {
                let text = text.trim();
                if !text.is_empty() {
                    album_name = Some(text.to_string());
                    break;
                }
            }
        }

        (album_price, album_name)
    }
}
