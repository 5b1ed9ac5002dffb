//! Test fixtures for pipeline tests
//!
//! Builds scripted storefronts matching the default selector cascades: a
//! search page with three results (the wanted track first, two decoys) and
//! a product page carrying the track price and, optionally, an album offer.

use std::time::Duration;

use tunecart::config::{PipelineConfig, StorefrontConfig};
use tunecart::extract::build_search_query;
use tunecart::types::MusicItem;

use super::helpers::{FakeElement, FakePage, FakeSite};

/// One scripted track of the fake storefront.
pub struct TrackSpec {
    pub artist: &'static str,
    pub song: &'static str,
    pub price: &'static str,
    /// Album offer shown on the product page: (name, price text).
    pub album: Option<(&'static str, &'static str)>,
}

impl TrackSpec {
    pub fn new(artist: &'static str, song: &'static str, price: &'static str) -> Self {
        Self {
            artist,
            song,
            price,
            album: None,
        }
    }

    pub fn on_album(mut self, name: &'static str, price: &'static str) -> Self {
        self.album = Some((name, price));
        self
    }
}

/// Standard test data and fixtures
pub struct TestFixtures;

impl TestFixtures {
    /// First entry of each default selector cascade; the fake pages register
    /// their elements under these.
    pub const RESULTS: &'static str = "div.s-result-item[data-component-type='s-search-result']";
    pub const TITLE: &'static str = "h2 a span";
    pub const LINK: &'static str = "h2 a";
    pub const TRACK_PRICE: &'static str = "span.a-price span.a-offscreen";
    pub const ALBUM_PRICE: &'static str = "#declarative_digital_music_album span.a-color-price";
    pub const ALBUM_TITLE: &'static str = "#productTitle";

    /// Pipeline configuration with test-friendly timings.
    pub fn config() -> PipelineConfig {
        PipelineConfig {
            concurrency: 2,
            chunk_delay: Duration::from_millis(1),
            item_delay: Duration::from_millis(1),
            item_timeout: Duration::from_secs(5),
            settle_delay: Duration::from_millis(0),
            lookup_timeout: Duration::from_millis(50),
            ..Default::default()
        }
    }

    /// Search URL the extractor will request for an item.
    pub fn search_url(item: &MusicItem) -> String {
        StorefrontConfig::default().search_url(&build_search_query(item))
    }

    pub fn product_slug(song: &str) -> String {
        song.to_lowercase().replace(' ', "-")
    }

    pub fn product_url(song: &str) -> String {
        format!("https://www.amazon.com/dp/{}", Self::product_slug(song))
    }

    /// A search result whose title matches nothing and whose label is merch.
    pub fn decoy_result(label: &str) -> FakeElement {
        FakeElement::with_text("").child(Self::TITLE, FakeElement::with_text(label))
    }

    /// A search result pointing at the track's product page.
    pub fn track_result(spec: &TrackSpec) -> FakeElement {
        FakeElement::with_text("")
            .child(
                Self::TITLE,
                FakeElement::with_text(format!("{} by {}", spec.song, spec.artist)),
            )
            .child(
                Self::LINK,
                FakeElement::with_text("").attr("href", format!("/dp/{}", Self::product_slug(spec.song))),
            )
    }

    /// Product page for one track spec.
    pub fn product_page(spec: &TrackSpec) -> FakePage {
        let mut page = FakePage::new().with(
            Self::TRACK_PRICE,
            vec![FakeElement::with_text(spec.price)],
        );
        if let Some((album_name, album_price)) = spec.album {
            page = page
                .with(Self::ALBUM_PRICE, vec![FakeElement::with_text(album_price)])
                .with(Self::ALBUM_TITLE, vec![FakeElement::with_text(album_name)]);
        }
        page
    }

    /// Storefront scripted with a search page and a product page per track.
    pub fn storefront(tracks: &[TrackSpec]) -> FakeSite {
        let mut site = FakeSite::new();
        for spec in tracks {
            let item = MusicItem::new(spec.artist, spec.song);
            let search = FakePage::new().with(
                Self::RESULTS,
                vec![
                    Self::track_result(spec),
                    Self::decoy_result("Unrelated Band Poster"),
                    Self::decoy_result("Some Other Tune"),
                ],
            );
            site = site
                .page(Self::search_url(&item), search)
                .page(Self::product_url(spec.song), Self::product_page(spec));
        }
        site
    }
}
