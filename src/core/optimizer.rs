//! Pricing optimization over finalized observations
//!
//! Pure function: groups available observations by artist and by
//! (artist, album), decides per album whether the album price beats buying
//! its tracks individually, and assembles the final report. Inputs are never
//! mutated; grouping runs over ordered maps so two invocations on the same
//! observation list produce identical reports except for the timestamp.

use std::collections::{BTreeMap, HashSet};

use crate::types::{round_cents, AlbumAnalysis, PriceObservation, PricingReport};

/// Album groups below this size never produce an analysis; with fewer than
/// three priced tracks the album price comparison is not meaningful.
pub const ALBUM_MIN_TRACKS: usize = 3;

/// Artists with at least this many available tracks get a compilation
/// purchase suggestion.
pub const COMPILATION_MIN_TRACKS: usize = 10;

struct AlbumGroup {
    artist: String,
    album_name: String,
    album_price: f64,
    tracks: Vec<String>,
    total_track_price: f64,
}

struct ArtistGroup {
    artist: String,
    track_count: usize,
    total_cost: f64,
}

/// Compute the cost-minimizing purchase plan for a finalized observation list.
pub fn analyze(observations: Vec<PriceObservation>) -> PricingReport {
    let total_tracks = observations.len();
    let available: Vec<&PriceObservation> = observations.iter().filter(|o| o.available).collect();
    let available_tracks = available.len();
    let total_cost = round_cents(available.iter().map(|o| o.track_price).sum());

    let album_analysis = analyze_albums(&available);
    let optimized_cost = optimized_cost(&available, &album_analysis);
    let total_savings = round_cents(total_cost - optimized_cost);
    let savings_percentage = if total_cost > 0.0 {
        100.0 * total_savings / total_cost
    } else {
        0.0
    };

    let recommendations = build_recommendations(&available, &album_analysis);

    PricingReport {
        timestamp: chrono::Utc::now().to_rfc3339(),
        total_tracks,
        available_tracks,
        total_cost,
        optimized_cost,
        total_savings,
        savings_percentage,
        tracks: observations,
        album_analysis,
        recommendations,
    }
}

/// Group by (artist, album) over observations carrying a positive album
/// price; keys compare case-insensitively, display strings keep the casing
/// of the first member seen.
fn analyze_albums(available: &[&PriceObservation]) -> Vec<AlbumAnalysis> {
    let mut groups: BTreeMap<(String, String), AlbumGroup> = BTreeMap::new();

    for obs in available {
        let (Some(album_name), Some(album_price)) = (&obs.album_name, obs.album_price) else {
            continue;
        };
        if album_price <= 0.0 {
            continue;
        }

        let key = (obs.artist.to_lowercase(), album_name.to_lowercase());
        let group = groups.entry(key).or_insert_with(|| AlbumGroup {
            artist: obs.artist.clone(),
            album_name: album_name.clone(),
            album_price,
            tracks: Vec::new(),
            total_track_price: 0.0,
        });
        group.tracks.push(obs.song.clone());
        group.total_track_price += obs.track_price;
    }

    groups
        .into_values()
        .filter(|group| group.tracks.len() >= ALBUM_MIN_TRACKS)
        .map(|group| {
            let total_track_price = round_cents(group.total_track_price);
            let savings = round_cents(total_track_price - group.album_price);
            let recommendation = if savings > 0.0 {
                format!(
                    "Buy album '{}' for ${:.2} instead of {} tracks for ${:.2} to save ${:.2}",
                    group.album_name,
                    group.album_price,
                    group.tracks.len(),
                    total_track_price,
                    savings
                )
            } else {
                "Buy individual tracks".to_string()
            };

            AlbumAnalysis {
                album_name: group.album_name,
                artist: group.artist,
                album_price: group.album_price,
                track_count: group.tracks.len(),
                tracks: group.tracks,
                total_track_price,
                savings,
                recommendation,
            }
        })
        .collect()
}

/// Optimized cost: each album with positive savings is paid once and covers
/// its member tracks; every other available track is paid individually.
/// Album groups are disjoint by construction, so no track is counted twice.
fn optimized_cost(available: &[&PriceObservation], album_analysis: &[AlbumAnalysis]) -> f64 {
    let winning: HashSet<(String, String)> = album_analysis
        .iter()
        .filter(|analysis| analysis.savings > 0.0)
        .map(|analysis| {
            (
                analysis.artist.to_lowercase(),
                analysis.album_name.to_lowercase(),
            )
        })
        .collect();

    let mut cost: f64 = album_analysis
        .iter()
        .filter(|analysis| analysis.savings > 0.0)
        .map(|analysis| analysis.album_price)
        .sum();

    for obs in available {
        if !is_covered(obs, &winning) {
            cost += obs.track_price;
        }
    }

    round_cents(cost)
}

/// A track is covered when it is a member of a winning album group, i.e. it
/// carries that group's positive album price.
fn is_covered(obs: &PriceObservation, winning: &HashSet<(String, String)>) -> bool {
    match (&obs.album_name, obs.album_price) {
        (Some(album_name), Some(album_price)) if album_price > 0.0 => {
            winning.contains(&(obs.artist.to_lowercase(), album_name.to_lowercase()))
        }
        _ => false,
    }
}

/// Compilation suggestions for prolific artists first, then every album
/// recommendation that actually saves money.
fn build_recommendations(
    available: &[&PriceObservation],
    album_analysis: &[AlbumAnalysis],
) -> Vec<String> {
    let mut artists: BTreeMap<String, ArtistGroup> = BTreeMap::new();
    for obs in available {
        let group = artists
            .entry(obs.artist.to_lowercase())
            .or_insert_with(|| ArtistGroup {
                artist: obs.artist.clone(),
                track_count: 0,
                total_cost: 0.0,
            });
        group.track_count += 1;
        group.total_cost += obs.track_price;
    }

    let mut recommendations: Vec<String> = artists
        .into_values()
        .filter(|group| group.track_count >= COMPILATION_MIN_TRACKS)
        .map(|group| {
            format!(
                "Consider a compilation for {}: {} tracks currently totaling ${:.2}",
                group.artist,
                group.track_count,
                round_cents(group.total_cost)
            )
        })
        .collect();

    recommendations.extend(
        album_analysis
            .iter()
            .filter(|analysis| analysis.savings > 0.0)
            .map(|analysis| analysis.recommendation.clone()),
    );

    recommendations
}
