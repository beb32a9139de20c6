//! Variant normalizer tests
//!
//! Tests for base key derivation including:
//! - Idempotence
//! - Colour invariance (English and Spanish palette)
//! - Size sensitivity

use proptest::prelude::*;
use shared::{detect_color, normalize, Color};

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Spanish colour names strip the same way as English ones
    #[test]
    fn test_spanish_palette() {
        assert_eq!(normalize("MESA MADERA 80CM"), normalize("MESA NEGRO 80CM"));
        assert_eq!(normalize("SILLA ROJO PLATA 45CM"), "SILLA45CM");
    }

    /// Colour words inside other words are left alone
    #[test]
    fn test_colour_must_be_whole_word() {
        assert_eq!(normalize("REDWOOD BOX 20CM"), "REDWOOD BOX20CM");
        assert_eq!(detect_color("REDWOOD BOX"), None);
    }

    /// Only the colours right before the size are stripped
    #[test]
    fn test_leading_colour_kept() {
        assert_eq!(normalize("GOLD FRAME BLACK 30CM"), "GOLD FRAME30CM");
    }

    #[test]
    fn test_detect_color() {
        assert_eq!(detect_color("chair azul 30cm"), Some(Color::Blue));
        assert_eq!(detect_color("BEIGE CUSHION"), Some(Color::Beige));
        assert_eq!(detect_color("PLAIN STOOL"), None);
    }

    /// No size token: trimmed uppercase text is the key
    #[test]
    fn test_no_size_token() {
        assert_eq!(normalize("  plain stool red "), "PLAIN STOOL RED");
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn stem_strategy() -> impl Strategy<Value = String> {
        prop::sample::select(vec!["CHAIR", "WOOD TABLE", "SHELF", "BENCH LOW"])
            .prop_map(str::to_string)
    }

    fn keyword_strategy() -> impl Strategy<Value = &'static str> {
        prop::sample::select(
            Color::ALL
                .iter()
                .flat_map(|c| c.keywords().iter().copied())
                .collect::<Vec<_>>(),
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// normalize(normalize(d)) == normalize(d)
        #[test]
        fn prop_idempotent(text in "[A-Za-z0-9 ]{0,60}") {
            let once = normalize(&text);
            prop_assert_eq!(normalize(&once), once);
        }

        /// Descriptions differing only in the colour before the size share a key
        #[test]
        fn prop_colour_invariance(
            stem in stem_strategy(),
            first in keyword_strategy(),
            second in keyword_strategy(),
            size in 1u32..500
        ) {
            prop_assert_eq!(
                normalize(&format!("{} {} {}CM", stem, first, size)),
                normalize(&format!("{} {} {}CM", stem, second, size))
            );
        }

        /// Different sizes never share a key
        #[test]
        fn prop_size_sensitivity(
            stem in stem_strategy(),
            a in 1u32..500,
            b in 1u32..500
        ) {
            prop_assume!(a != b);
            prop_assert_ne!(
                normalize(&format!("{} {}CM", stem, a)),
                normalize(&format!("{} {}CM", stem, b))
            );
        }
    }
}
