//! Item list loading
//!
//! Two input shapes: a CSV file of `artist,song,album` rows (album optional,
//! header row optional) and a single `"Artist - Song[ - Album]"` spec string
//! from the command line.

use std::path::Path;

use crate::error::{PipelineError, PipelineResult};
use crate::types::MusicItem;

/// Load a music item list from a CSV file.
///
/// Rows with fewer than two non-empty fields are skipped with a warning; an
/// input yielding no usable items at all is fatal.
pub fn load_items(path: impl AsRef<Path>) -> PipelineResult<Vec<MusicItem>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut items = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;

        // Optional header row
        if row == 0
            && record
                .get(0)
                .map(|field| field.eq_ignore_ascii_case("artist"))
                .unwrap_or(false)
        {
            continue;
        }

        let artist = record.get(0).unwrap_or("").trim();
        let song = record.get(1).unwrap_or("").trim();
        if artist.is_empty() || song.is_empty() {
            tracing::warn!(row = row + 1, "skipping row with insufficient data");
            continue;
        }

        let mut item = MusicItem::new(artist, song);
        if let Some(album) = record.get(2).map(str::trim).filter(|album| !album.is_empty()) {
            item = item.with_album(album);
        }
        items.push(item);
    }

    if items.is_empty() {
        return Err(PipelineError::invalid_input(format!(
            "{} contains no usable items",
            path.display()
        )));
    }
    Ok(items)
}

/// Parse a single-item spec: `"Artist - Song"` or `"Artist - Song - Album"`.
pub fn parse_item_spec(spec: &str) -> PipelineResult<MusicItem> {
    let parts: Vec<&str> = spec.split(" - ").map(str::trim).collect();
    if parts.len() < 2 {
        return Err(PipelineError::invalid_input(
            "invalid item format; use 'Artist - Song' or 'Artist - Song - Album'",
        ));
    }

    let artist = parts[0];
    let song = parts[1];
    if artist.is_empty() || song.is_empty() {
        return Err(PipelineError::invalid_input("artist and song cannot be empty"));
    }

    let mut item = MusicItem::new(artist, song);
    if let Some(album) = parts.get(2).filter(|album| !album.is_empty()) {
        item = item.with_album(*album);
    }
    Ok(item)
}
