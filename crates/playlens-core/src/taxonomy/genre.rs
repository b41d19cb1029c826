//! Genre canonicalization and community-tag filtering.
//!
//! Catalog genres and community tags spell the same genre many ways
//! ("kpop", "k pop", "korean pop"). [`canonicalize_genre`] folds those
//! variants into a single label. [`is_denylisted`] rejects tags that
//! describe mood, context, audience or era rather than a genre; it is
//! meant for the community tag source only, since the catalog's own
//! genre field is already curated.

// ---------------------------------------------------------------------------
// Synonym table
// ---------------------------------------------------------------------------

/// Spelling variant to canonical label. Keys are lowercase and trimmed.
const GENRE_SYNONYMS: &[(&str, &str)] = &[
    // Asian pop
    ("kpop", "k-pop"),
    ("k pop", "k-pop"),
    ("korean pop", "k-pop"),
    ("k rap", "k-rap"),
    ("jpop", "j-pop"),
    ("j pop", "j-pop"),
    ("japanese pop", "j-pop"),
    ("cpop", "c-pop"),
    ("c pop", "c-pop"),
    ("chinese pop", "c-pop"),
    ("vpop", "vietnamese pop"),
    ("v pop", "vietnamese pop"),
    ("v-pop", "vietnamese pop"),
    // Hip hop
    ("hiphop", "hip hop"),
    ("hip-hop", "hip hop"),
    // R&B
    ("rnb", "r&b"),
    ("r n b", "r&b"),
    ("r'n'b", "r&b"),
    ("alternative rnb", "alternative r&b"),
    ("k-rnb", "k-r&b"),
    // Electronic
    ("electronic dance music", "edm"),
    ("drum n bass", "drum and bass"),
    ("drum & bass", "drum and bass"),
    ("dnb", "drum and bass"),
    // Indie / alternative
    ("indie-pop", "indie pop"),
    ("alt rock", "alternative rock"),
    ("alt-rock", "alternative rock"),
    // Latin
    ("reggaetón", "reggaeton"),
    // Rock / metal
    ("nu-metal", "nu metal"),
    ("pop-punk", "pop punk"),
    // Other
    ("lofi", "lo-fi"),
    ("lo fi", "lo-fi"),
];

// ---------------------------------------------------------------------------
// Denylist
// ---------------------------------------------------------------------------

/// Community tags that are not genres. Compared against lowercased tags.
const DENYLISTED_TAGS: &[&str] = &[
    // Subjective praise
    "best",
    "top",
    "legendary",
    "amazing",
    "epic",
    "masterpiece",
    "underrated",
    "overrated",
    "greatest",
    "iconic",
    "incredible",
    // Listening context
    "chill",
    "study",
    "relaxing",
    "background",
    "party",
    "workout",
    "sleep",
    "driving",
    "focus",
    "gym",
    "night",
    // Mood
    "sad",
    "happy",
    "angry",
    "emotional",
    "uplifting",
    "nostalgic",
    "angsty",
    "peaceful",
    "energetic",
    "intense",
    // Location / scene
    "local",
    "hometown",
    "city",
    "underground",
    "diy",
    "usa",
    "uk",
    // Personal, audience-size and era tags
    "seen live",
    "spotify",
    "violon",
    "favorite",
    "favorites",
    "favourite",
    "favourites",
    "my favorite",
    "my favourites",
    "my top song",
    "my top songs",
    "better than selena gomez",
    "love",
    "loved",
    "good",
    "nice",
    "awesome",
    "under 2000 listeners",
    "under 1000 listeners",
    "female vocalists",
    "male vocalists",
    "00s",
    "90s",
    "80s",
    "70s",
    "60s",
    "10s",
    "all",
    "other",
];

/// Fold a genre tag into its canonical spelling.
///
/// The tag is lowercased and trimmed, then looked up in the synonym
/// table; unknown tags pass through (lowercased and trimmed).
pub fn canonicalize_genre(tag: &str) -> String {
    let key = tag.trim().to_lowercase();
    GENRE_SYNONYMS
        .iter()
        .find(|(variant, _)| *variant == key)
        .map(|(_, canonical)| (*canonical).to_string())
        .unwrap_or(key)
}

/// Whether a community tag should be discarded as a non-genre.
pub fn is_denylisted(tag: &str) -> bool {
    let key = tag.trim().to_lowercase();
    DENYLISTED_TAGS.contains(&key.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kpop_variants_fold_together() {
        assert_eq!(canonicalize_genre("K Pop"), "k-pop");
        assert_eq!(canonicalize_genre("kpop"), "k-pop");
        assert_eq!(canonicalize_genre("Korean Pop "), "k-pop");
        assert_eq!(canonicalize_genre("K Pop"), canonicalize_genre("kpop"));
    }

    #[test]
    fn test_hip_hop_and_rnb() {
        assert_eq!(canonicalize_genre("Hip-Hop"), "hip hop");
        assert_eq!(canonicalize_genre("hiphop"), "hip hop");
        assert_eq!(canonicalize_genre("RnB"), "r&b");
        assert_eq!(canonicalize_genre("r'n'b"), "r&b");
        assert_eq!(canonicalize_genre("R&B"), "r&b");
    }

    #[test]
    fn test_unknown_tag_passes_through_lowercased() {
        assert_eq!(canonicalize_genre("  Shoegaze "), "shoegaze");
        assert_eq!(canonicalize_genre("k-pop"), "k-pop");
    }

    #[test]
    fn test_denylist() {
        assert!(is_denylisted("seen live"));
        assert!(is_denylisted("Female Vocalists"));
        assert!(is_denylisted("DIY"));
        assert!(is_denylisted("90s"));
        assert!(!is_denylisted("indie rock"));
        assert!(!is_denylisted("k-pop"));
    }

    #[test]
    fn test_synonym_keys_are_normalized() {
        for (variant, _) in GENRE_SYNONYMS {
            assert_eq!(*variant, variant.trim().to_lowercase());
        }
        for tag in DENYLISTED_TAGS {
            assert_eq!(*tag, tag.trim().to_lowercase());
        }
    }
}
