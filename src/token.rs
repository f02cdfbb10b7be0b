//! Token derivation: an MD5 digest of the canonical query with timestamp
//! fragments spliced in.
//!
//! The splice layout was recovered from the official web client and is a
//! hypothesis, not a confirmed contract. The offsets live in
//! [`SpliceRecipe`] and [`splice_fragments`] takes an already-computed
//! digest string, so both the layout and the hash can be swapped per
//! experiment without touching the splice itself.

use chrono::{DateTime, Local};

/// Character offsets at which the three timestamp fragments are inserted.
///
/// Each offset addresses the sequence *as it stands after the previous
/// insertion*, not the original digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpliceRecipe {
    pub offsets: [usize; 3],
}

impl Default for SpliceRecipe {
    fn default() -> Self {
        Self {
            offsets: [4, 12, 24],
        }
    }
}

/// Fixed-width decimal fragments captured from a single wall-clock reading.
///
/// Immutable once captured; one probe uses exactly one reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampParts {
    /// 4-digit year (`%Y`).
    pub year: String,
    /// 4-digit month+day (`%m%d`).
    pub month_day: String,
    /// 4-digit hour+minute (`%H%M`).
    pub hour_minute: String,
}

impl TimestampParts {
    pub fn from_datetime(now: DateTime<Local>) -> Self {
        Self {
            year: now.format("%Y").to_string(),
            month_day: now.format("%m%d").to_string(),
            hour_minute: now.format("%H%M").to_string(),
        }
    }
}

/// 32-character lowercase hexadecimal MD5 of the UTF-8 bytes of `input`.
pub fn md5_hex(input: &str) -> String {
    format!("{:x}", md5::compute(input.as_bytes()))
}

/// Splices the three fragments into `digest` at the recipe offsets.
///
/// The digest is treated as a growing sequence: each fragment is inserted
/// as one multi-character element, shifting everything after it, and the
/// next offset indexes the already-grown sequence. Insertion order is
/// year, month+day, hour+minute.
///
/// Panics if an offset exceeds the current sequence length; with a
/// 32-character digest the default recipe is always in range.
pub fn splice_fragments(digest: &str, parts: &TimestampParts, recipe: &SpliceRecipe) -> String {
    let mut seq: Vec<String> = digest.chars().map(String::from).collect();

    let fragments = [&parts.year, &parts.month_day, &parts.hour_minute];
    for (offset, fragment) in recipe.offsets.iter().zip(fragments) {
        seq.insert(*offset, fragment.clone());
    }

    seq.concat()
}

/// Derives the full 44-character token for `canonical` at time `now`.
pub fn derive_token(canonical: &str, now: DateTime<Local>, recipe: &SpliceRecipe) -> String {
    let digest = md5_hex(canonical);
    let parts = TimestampParts::from_datetime(now);
    splice_fragments(&digest, &parts, recipe)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const EMPTY_MD5: &str = "d41d8cd98f00b204e9800998ecf8427e";

    fn fixed_parts() -> TimestampParts {
        TimestampParts {
            year: "2025".to_string(),
            month_day: "0807".to_string(),
            hour_minute: "1234".to_string(),
        }
    }

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 8, 7, 12, 34, 56).unwrap()
    }

    #[test]
    fn test_md5_hex_of_empty_string() {
        assert_eq!(md5_hex(""), EMPTY_MD5);
    }

    #[test]
    fn test_splice_against_literal_example() {
        // Hand-expanded: 4 digest chars, year, 7 digest chars, month+day,
        // 11 digest chars, hour+minute, remaining 10 digest chars.
        let digest = "0123456789abcdef0123456789abcdef";
        let token = splice_fragments(digest, &fixed_parts(), &SpliceRecipe::default());
        assert_eq!(token, "01232025456789a0807bcdef01234512346789abcdef");
    }

    #[test]
    fn test_splice_offsets_index_the_grown_sequence() {
        let digest = "0123456789abcdef0123456789abcdef";
        let token = splice_fragments(digest, &fixed_parts(), &SpliceRecipe::default());

        // First fragment after 4 digest chars, second after 11, third
        // after 22; the later offsets only line up because each insertion
        // occupies a single element of the grown sequence.
        assert_eq!(&token[4..8], "2025");
        assert_eq!(&token[15..19], "0807");
        assert_eq!(&token[30..34], "1234");
    }

    #[test]
    fn test_empty_canonical_still_yields_well_formed_token() {
        let token = derive_token("", fixed_now(), &SpliceRecipe::default());
        assert_eq!(token.len(), 44);
        assert_eq!(token, "d41d20258cd98f008070b204e98009123498ecf8427e");
    }

    #[test]
    fn test_token_length_is_always_44() {
        let recipe = SpliceRecipe::default();
        for canonical in ["", "routeName=33", "routeName=33&dir=0&lang=zh-tw&device=web"] {
            assert_eq!(derive_token(canonical, fixed_now(), &recipe).len(), 44);
        }
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let canonical = "routeName=33&dir=0&lang=zh-tw&device=web";
        let recipe = SpliceRecipe::default();
        let a = derive_token(canonical, fixed_now(), &recipe);
        let b = derive_token(canonical, fixed_now(), &recipe);
        assert_eq!(a, b);
    }

    #[test]
    fn test_timestamp_parts_are_fixed_width() {
        let now = Local.with_ymd_and_hms(2025, 1, 3, 4, 5, 6).unwrap();
        let parts = TimestampParts::from_datetime(now);
        assert_eq!(parts.year, "2025");
        assert_eq!(parts.month_day, "0103");
        assert_eq!(parts.hour_minute, "0405");
    }

    #[test]
    fn test_alternate_recipe_moves_fragments() {
        let digest = "0123456789abcdef0123456789abcdef";
        let recipe = SpliceRecipe { offsets: [0, 0, 0] };
        let token = splice_fragments(digest, &fixed_parts(), &recipe);
        assert!(token.starts_with("123408072025"));
        assert_eq!(token.len(), 44);
    }
}
