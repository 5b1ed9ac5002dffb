//! Search result candidate filtering
//!
//! Storefront search mixes digital tracks with physical media and
//! merchandise. A candidate label is only worth opening when it matches the
//! wanted song or artist and is not obviously merch.

use crate::types::MusicItem;

/// Labels containing any of these are merchandise or physical media, never a
/// digital track. "cd " keeps its trailing space so words like "cdbaby" in
/// artist names survive.
pub const MERCH_KEYWORDS: &[&str] = &[
    "poster", "print", "wall art", "t-shirt", "mug", "vinyl", "cd ", "dvd", "book",
];

/// Decide whether a search result label plausibly is the wanted item.
///
/// Accepts iff the label case-insensitively contains the song title or the
/// artist name, and contains no merchandise keyword. Pure and deterministic.
pub fn is_acceptable_candidate(label: &str, item: &MusicItem) -> bool {
    let label = label.to_lowercase();

    if MERCH_KEYWORDS.iter().any(|keyword| label.contains(keyword)) {
        return false;
    }

    label.contains(&item.song.to_lowercase()) || label.contains(&item.artist.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> MusicItem {
        MusicItem::new("Queen", "Bohemian Rhapsody")
    }

    #[test]
    fn accepts_matching_song_title() {
        assert!(is_acceptable_candidate("Bohemian Rhapsody (Remastered)", &item()));
    }

    #[test]
    fn accepts_matching_artist_without_song() {
        assert!(is_acceptable_candidate("Queen — Greatest Hits I", &item()));
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert!(is_acceptable_candidate("BOHEMIAN RHAPSODY", &item()));
        assert!(is_acceptable_candidate("bohemian rhapsody", &item()));
    }

    #[test]
    fn rejects_merchandise_even_when_title_matches() {
        assert!(!is_acceptable_candidate(
            "Queen Bohemian Rhapsody Poster Wall Art",
            &item()
        ));
        assert!(!is_acceptable_candidate("Bohemian Rhapsody T-Shirt XL", &item()));
        assert!(!is_acceptable_candidate("A Night at the Opera Vinyl LP", &item()));
        assert!(!is_acceptable_candidate("Queen Photo Book", &item()));
    }

    #[test]
    fn trailing_space_distinguishes_cd_from_words() {
        assert!(!is_acceptable_candidate("Bohemian Rhapsody CD single", &item()));
        // "cd" not followed by a space does not trip the keyword
        assert!(is_acceptable_candidate("Bohemian Rhapsody ABCD", &item()));
    }

    #[test]
    fn rejects_unrelated_results() {
        assert!(!is_acceptable_candidate("Stairway to Heaven", &item()));
        assert!(!is_acceptable_candidate("", &item()));
    }
}
