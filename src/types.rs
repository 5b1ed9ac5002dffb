//! Data model for the price-discovery pipeline
//!
//! Inputs are `MusicItem`s owned by the caller; each item yields exactly one
//! `PriceObservation`, finalized by the extractor and never mutated after.
//! The optimizer owns everything it derives (`AlbumAnalysis`, `PricingReport`).

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// One entry of the caller-supplied shopping list.
///
/// Identity is the (artist, song) pair as given; matching against storefront
/// text is case-insensitive everywhere else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MusicItem {
    pub artist: String,
    pub song: String,
    pub album: Option<String>,
}

impl MusicItem {
    pub fn new(artist: impl Into<String>, song: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            song: song.into(),
            album: None,
        }
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }
}

impl fmt::Display for MusicItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.artist, self.song)?;
        if let Some(album) = &self.album {
            write!(f, " - {album}")?;
        }
        Ok(())
    }
}

/// One item's finalized pricing result.
///
/// Invariant: `available == true` iff a positive `track_price` was extracted;
/// when `available == false`, `error` carries a non-empty diagnostic.
/// `album_price` and `album_name` are filled opportunistically from the
/// product page and stay `None` when the page did not offer them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub artist: String,
    pub song: String,
    pub album: Option<String>,
    pub track_price: f64,
    pub album_price: Option<f64>,
    pub album_name: Option<String>,
    pub available: bool,
    pub search_query: String,
    pub error: Option<String>,
}

impl PriceObservation {
    /// Successful observation carrying a positive track price.
    pub fn priced(item: &MusicItem, query: &str, track_price: f64) -> Self {
        Self {
            artist: item.artist.clone(),
            song: item.song.clone(),
            album: item.album.clone(),
            track_price,
            album_price: None,
            album_name: None,
            available: true,
            search_query: query.to_string(),
            error: None,
        }
    }

    /// Failed observation with a diagnostic; the run continues for other items.
    pub fn unavailable(item: &MusicItem, query: &str, error: impl Into<String>) -> Self {
        Self {
            artist: item.artist.clone(),
            song: item.song.clone(),
            album: item.album.clone(),
            track_price: 0.0,
            album_price: None,
            album_name: None,
            available: false,
            search_query: query.to_string(),
            error: Some(error.into()),
        }
    }
}

/// Per-album savings breakdown for a group of at least three priced tracks
/// sharing an album offer.
///
/// Invariants: `savings == total_track_price - album_price` (cent-rounded)
/// and `track_count == tracks.len() >= 3`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlbumAnalysis {
    pub album_name: String,
    pub artist: String,
    pub album_price: f64,
    pub tracks: Vec<String>,
    pub track_count: usize,
    pub total_track_price: f64,
    pub savings: f64,
    pub recommendation: String,
}

/// The final report assembled once per run.
///
/// Invariants: `total_savings == total_cost - optimized_cost`;
/// `savings_percentage == 100 * total_savings / total_cost` when
/// `total_cost > 0`, else `0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingReport {
    pub timestamp: String,
    pub total_tracks: usize,
    pub available_tracks: usize,
    pub total_cost: f64,
    pub optimized_cost: f64,
    pub total_savings: f64,
    pub savings_percentage: f64,
    pub tracks: Vec<PriceObservation>,
    pub album_analysis: Vec<AlbumAnalysis>,
    pub recommendations: Vec<String>,
}

/// Identifier of one isolated browsing session, carried in events and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short prefix is enough to tell sessions apart in logs
        let full = self.0.to_string();
        write!(f, "{}", &full[..8])
    }
}

/// Round a money amount to whole cents.
///
/// All savings arithmetic goes through this so that reported figures like
/// `4.86 - 7.99` come out as exactly `-3.13` instead of a float remainder.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_display_includes_optional_album() {
        let bare = MusicItem::new("Queen", "Bohemian Rhapsody");
        assert_eq!(bare.to_string(), "Queen - Bohemian Rhapsody");

        let full = MusicItem::new("Queen", "Bohemian Rhapsody").with_album("A Night at the Opera");
        assert_eq!(full.to_string(), "Queen - Bohemian Rhapsody - A Night at the Opera");
    }

    #[test]
    fn unavailable_observation_carries_diagnostic() {
        let item = MusicItem::new("Queen", "Bohemian Rhapsody");
        let obs = PriceObservation::unavailable(&item, "Queen Bohemian Rhapsody", "no results");

        assert!(!obs.available);
        assert_eq!(obs.track_price, 0.0);
        assert_eq!(obs.error.as_deref(), Some("no results"));
    }

    #[test]
    fn cent_rounding_cleans_float_remainders() {
        assert_eq!(round_cents(4.86 - 7.99), -3.13);
        assert_eq!(round_cents(1.29 + 1.29 + 0.99), 3.57);
    }
}
