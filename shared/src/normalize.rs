//! Variant normalization
//!
//! Maps a free-text product description to the base key shared by every
//! colour variant of the same sized part, so that "WOOD TABLE RED 40CM" and
//! "WOOD TABLE BLUE 40CM" draw from the same semi-finished stock while
//! "WOOD TABLE 60CM" does not.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static UNIT_MARKER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"UNIT|UNIDAD").unwrap());
static SIZE_TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([0-9]+)\s*CM").unwrap());

/// Colour families a part can be finished in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Wood,
    Green,
    Blue,
    Beige,
    Red,
    Black,
    Gold,
    Silver,
}

impl Color {
    pub const ALL: [Color; 8] = [
        Color::Wood,
        Color::Green,
        Color::Blue,
        Color::Beige,
        Color::Red,
        Color::Black,
        Color::Gold,
        Color::Silver,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Wood => "wood",
            Color::Green => "green",
            Color::Blue => "blue",
            Color::Beige => "beige",
            Color::Red => "red",
            Color::Black => "black",
            Color::Gold => "gold",
            Color::Silver => "silver",
        }
    }

    /// Uppercase keywords naming this colour in descriptions (English and Spanish)
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Color::Wood => &["WOOD", "MADERA"],
            Color::Green => &["GREEN", "VERDE"],
            Color::Blue => &["BLUE", "AZUL"],
            Color::Beige => &["BEIGE"],
            Color::Red => &["RED", "ROJO"],
            Color::Black => &["BLACK", "NEGRO"],
            Color::Gold => &["GOLD", "DORADO"],
            Color::Silver => &["SILVER", "PLATA"],
        }
    }

    pub fn from_keyword(word: &str) -> Option<Self> {
        Color::ALL
            .into_iter()
            .find(|c| c.keywords().iter().any(|k| k.eq_ignore_ascii_case(word)))
    }
}

/// Compute the base key of a product description.
///
/// Uppercases, drops everything from the first `UNIT`/`UNIDAD` marker, and if
/// a `<digits>CM` size token is present truncates right after it, removing
/// the colour keywords and whitespace directly in front of it. Descriptions
/// without a size token come back trimmed and uppercased.
pub fn normalize(description: &str) -> String {
    let mut text = description.to_uppercase();
    if let Some(marker) = UNIT_MARKER_RE.find(&text) {
        text.truncate(marker.start());
    }

    let Some(size) = SIZE_TOKEN_RE.captures(&text) else {
        return text.trim().to_string();
    };
    let (Some(token), Some(digits)) = (size.get(0), size.get(1)) else {
        return text.trim().to_string();
    };

    let mut prefix = text[..token.start()].trim_start();
    loop {
        prefix = prefix.trim_end();
        let last_word_start = prefix
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        if prefix.is_empty() || Color::from_keyword(&prefix[last_word_start..]).is_none() {
            break;
        }
        prefix = &prefix[..last_word_start];
    }

    // Keep a digit-ending prefix apart from the size so the two numbers never merge
    let separator = if prefix.ends_with(|c: char| c.is_ascii_digit()) {
        " "
    } else {
        ""
    };
    format!("{}{}{}CM", prefix, separator, digits.as_str())
}

/// First palette colour named in a description, as a whole word
pub fn detect_color(description: &str) -> Option<Color> {
    let upper = description.to_uppercase();
    let words: Vec<&str> = upper
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    Color::ALL
        .into_iter()
        .find(|color| color.keywords().iter().any(|k| words.contains(k)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_variants_share_base_key() {
        assert_eq!(
            normalize("WOOD TABLE RED 40CM"),
            normalize("WOOD TABLE BLUE 40CM")
        );
        assert_eq!(normalize("WOOD TABLE RED 40CM"), "WOOD TABLE40CM");
    }

    #[test]
    fn test_size_changes_base_key() {
        assert_ne!(normalize("WOOD TABLE 40CM"), normalize("WOOD TABLE 60CM"));
    }

    #[test]
    fn test_lowercase_and_spaced_size_token() {
        assert_eq!(normalize("wood chair red 30 cm"), "WOOD CHAIR30CM");
        assert_eq!(normalize("wood chair 30cm"), normalize("WOOD CHAIR BLUE 30 CM"));
    }

    #[test]
    fn test_unit_suffix_is_dropped() {
        assert_eq!(normalize("SHELF GOLD 20CM UNIT X 4"), "SHELF20CM");
        assert_eq!(normalize("REPISA DORADO 20CM UNIDAD"), "REPISA20CM");
        assert_eq!(normalize("METAL HOOK UNITS 12"), "METAL HOOK");
    }

    #[test]
    fn test_text_after_size_is_dropped() {
        assert_eq!(normalize("TRAY BLACK 25CM DEEP EDITION"), "TRAY25CM");
    }

    #[test]
    fn test_multiple_colors_before_size_are_stripped() {
        assert_eq!(normalize("VASE BLACK GOLD 15CM"), "VASE15CM");
        assert_eq!(normalize("MESA MADERA ROJO 40CM"), "MESA40CM");
    }

    #[test]
    fn test_only_whole_color_words_are_stripped() {
        assert_eq!(normalize("COVERED 40CM"), "COVERED40CM");
    }

    #[test]
    fn test_color_away_from_size_is_kept() {
        assert_eq!(normalize("WOOD STOOL 45CM"), "WOOD STOOL45CM");
        assert_eq!(normalize("RED WOOD STOOL 45CM"), "RED WOOD STOOL45CM");
    }

    #[test]
    fn test_without_size_returns_trimmed_uppercase() {
        assert_eq!(normalize("  Metal Shelf Red "), "METAL SHELF RED");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_numeric_prefix_stays_separate_from_size() {
        assert_eq!(normalize("PACK 5 RED 40CM"), "PACK 5 40CM");
        assert_ne!(normalize("PACK 5 RED 40CM"), normalize("PACK 540CM"));
    }

    #[test]
    fn test_normalize_is_idempotent_on_samples() {
        for sample in [
            "WOOD TABLE RED 40CM",
            "5 RED 40CM",
            "RED 5 40CM",
            "wood chair red 30 cm unidad",
            "RED 10CM",
            "plain text",
        ] {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "sample {sample:?}");
        }
    }

    #[test]
    fn test_detect_color() {
        assert_eq!(detect_color("Wood table red 40cm"), Some(Color::Wood));
        assert_eq!(detect_color("MESA ROJO 40CM"), Some(Color::Red));
        assert_eq!(detect_color("COVERED TRAY"), None);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(200))]

            #[test]
            fn prop_normalize_idempotent(text in "[A-Za-z0-9 ]{0,40}") {
                let once = normalize(&text);
                prop_assert_eq!(normalize(&once), once);
            }

            #[test]
            fn prop_color_invariant(
                stem in "[A-Z]{3,8}( [A-Z]{3,8})?",
                size in 1u32..300,
                a in 0usize..8,
                b in 0usize..8,
            ) {
                let first = format!("{} {} {}CM", stem, Color::ALL[a].keywords()[0], size);
                let second = format!("{} {} {}CM", stem, Color::ALL[b].keywords()[0], size);
                prop_assert_eq!(normalize(&first), normalize(&second));
            }
        }
    }
}
