//! Report serialization
//!
//! JSON and CSV writers plus the console summary. Both file formats
//! round-trip every field of the report; the CSV additionally derives a
//! per-track recommendation column from the album analysis.

use std::path::Path;

use crate::error::{PipelineError, PipelineResult};
use crate::types::{PriceObservation, PricingReport};

/// Write the full report as pretty-printed JSON.
pub async fn write_json(report: &PricingReport, path: impl AsRef<Path>) -> PipelineResult<()> {
    let json = serde_json::to_string_pretty(report)?;
    tokio::fs::write(path.as_ref(), json).await?;
    tracing::info!(path = %path.as_ref().display(), "JSON report written");
    Ok(())
}

/// Write a per-track CSV with a derived recommendation column.
pub async fn write_csv(report: &PricingReport, path: impl AsRef<Path>) -> PipelineResult<()> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "artist",
        "song",
        "album",
        "track_price",
        "album_price",
        "available",
        "recommendation",
    ])?;

    for track in &report.tracks {
        let album = track
            .album_name
            .as_deref()
            .or(track.album.as_deref())
            .unwrap_or("");
        let album_price = track
            .album_price
            .map(|price| format!("{price:.2}"))
            .unwrap_or_default();
        writer.write_record([
            track.artist.clone(),
            track.song.clone(),
            album.to_string(),
            format!("{:.2}", track.track_price),
            album_price,
            track.available.to_string(),
            track_recommendation(track, report),
        ])?;
    }

    let data = writer
        .into_inner()
        .map_err(|error| PipelineError::fault(error.to_string()))?;
    tokio::fs::write(path.as_ref(), data).await?;
    tracing::info!(path = %path.as_ref().display(), "CSV report written");
    Ok(())
}

/// Per-track purchase recommendation derived from the album analysis.
pub fn track_recommendation(track: &PriceObservation, report: &PricingReport) -> String {
    if !track.available {
        return "Unavailable".to_string();
    }

    if let (Some(album_name), Some(album_price)) = (&track.album_name, track.album_price) {
        if album_price > 0.0 {
            let covered = report.album_analysis.iter().any(|analysis| {
                analysis.savings > 0.0
                    && analysis.artist.eq_ignore_ascii_case(&track.artist)
                    && analysis.album_name.eq_ignore_ascii_case(album_name)
            });
            if covered {
                return format!("Buy with album '{album_name}'");
            }
        }
    }

    "Buy individual track".to_string()
}

/// Print the human-readable run summary to stdout.
pub fn print_summary(report: &PricingReport) {
    println!();
    println!("Pricing report ({})", report.timestamp);
    println!(
        "  Tracks priced:   {}/{}",
        report.available_tracks, report.total_tracks
    );
    println!("  Total cost:      ${:.2}", report.total_cost);
    println!("  Optimized cost:  ${:.2}", report.optimized_cost);
    println!(
        "  Savings:         ${:.2} ({:.1}%)",
        report.total_savings, report.savings_percentage
    );

    if !report.album_analysis.is_empty() {
        println!();
        println!("Album analysis:");
        for analysis in &report.album_analysis {
            println!(
                "  {} - {}: {} tracks for ${:.2}, album ${:.2} ({})",
                analysis.artist,
                analysis.album_name,
                analysis.track_count,
                analysis.total_track_price,
                analysis.album_price,
                if analysis.savings > 0.0 {
                    format!("save ${:.2}", analysis.savings)
                } else {
                    "no savings".to_string()
                }
            );
        }
    }

    if !report.recommendations.is_empty() {
        println!();
        println!("Recommendations:");
        for recommendation in &report.recommendations {
            println!("  - {recommendation}");
        }
    }

    let unavailable: Vec<&PriceObservation> =
        report.tracks.iter().filter(|t| !t.available).collect();
    if !unavailable.is_empty() {
        println!();
        println!("Not priced:");
        for track in unavailable {
            println!(
                "  {} - {} ({})",
                track.artist,
                track.song,
                track.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
    println!();
}
