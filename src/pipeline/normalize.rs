//! Text normalisation: deterministic cleanup of raw OCR text.
//!
//! OCR output from photographed menus is noisy in predictable ways: stray
//! symbols, inconsistent whitespace, and accented-vowel misreads of plain
//! Latin letters ("Chícken", "tómato"). This module applies cheap,
//! deterministic regex/string rules that fix those artefacts without touching
//! content. Each rule is a pure function and independently testable; `clean`
//! is idempotent, so re-cleaning already-clean text is a no-op.
//!
//! [`extract_dish_name`] is a best-effort heuristic seed only; the
//! model-driven analysis in [`crate::pipeline::llm`] is authoritative for
//! multi-dish menus.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

// Whitelist: word characters, whitespace, and menu punctuation.
static RE_DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s\-&,.()'/]").unwrap());

// Price-like pattern: optional dollar sign, digits, optional decimal part.
static RE_PRICE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$?\d+\.?\d*").unwrap());

/// Whole-word OCR misreads with corrections a character substitution cannot
/// produce (dropped or doubled letters, truncations). Checked before the
/// character table; longer entries first so prefixes don't shadow them.
const OCR_WORD_FIXES: &[(&str, &str)] = &[
    ("chícken", "chicken"),
    ("chíck", "chicken"),
    ("chéese", "cheese"),
    ("chése", "cheese"),
    ("beéf", "beef"),
    ("pórk", "pork"),
    ("tómato", "tomato"),
    ("oníon", "onion"),
];

/// Accented vowels that OCR commonly produces in place of plain Latin
/// letters on menu text. Case-preserving, applied character by character.
const OCR_ACCENT_FIXES: &[(char, char)] = &[
    ('á', 'a'), ('à', 'a'), ('â', 'a'), ('ä', 'a'),
    ('é', 'e'), ('è', 'e'), ('ê', 'e'), ('ë', 'e'),
    ('í', 'i'), ('ì', 'i'), ('î', 'i'), ('ï', 'i'),
    ('ó', 'o'), ('ò', 'o'), ('ô', 'o'), ('ö', 'o'),
    ('ú', 'u'), ('ù', 'u'), ('û', 'u'), ('ü', 'u'),
    ('Á', 'A'), ('À', 'A'), ('Â', 'A'), ('Ä', 'A'),
    ('É', 'E'), ('È', 'E'), ('Ê', 'E'), ('Ë', 'E'),
    ('Í', 'I'), ('Ì', 'I'), ('Î', 'I'), ('Ï', 'I'),
    ('Ó', 'O'), ('Ò', 'O'), ('Ô', 'O'), ('Ö', 'O'),
    ('Ú', 'U'), ('Ù', 'U'), ('Û', 'U'), ('Ü', 'U'),
];

/// Clean and normalise OCR text.
///
/// Rules (applied in order):
/// 1. Strip characters outside the whitelist (`\w`, whitespace, `- & , . ( ) ' /`)
/// 2. Substitute known OCR misreads (whole words, then accented characters)
/// 3. Collapse runs of whitespace to a single space and trim
///
/// Whitespace collapse runs last: stripping a disallowed character between
/// spaces leaves a doubled space that an earlier collapse would miss, and
/// idempotence (`clean(clean(x)) == clean(x)`) requires the final pass to
/// see everything the earlier ones produced.
///
/// Purely functional, no I/O, deterministic, and idempotent.
pub fn clean(text: &str) -> String {
    let filtered = RE_DISALLOWED.replace_all(text, "");
    let fixed = fix_ocr_misreads(&filtered);
    RE_WHITESPACE.replace_all(fixed.trim(), " ").into_owned()
}

/// Clean OCR text line by line, keeping the line structure intact so
/// downstream consumers (dish-name extraction, the model prompt) still see
/// one menu item per line. Lines that clean to nothing are dropped.
pub fn clean_text(text: &str) -> String {
    text.lines()
        .map(clean)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn fix_ocr_misreads(text: &str) -> String {
    let mut fixed = text.to_string();
    for (wrong, correct) in OCR_WORD_FIXES {
        if fixed.contains(wrong) {
            fixed = fixed.replace(wrong, correct);
        }
    }
    fixed
        .chars()
        .map(|c| {
            OCR_ACCENT_FIXES
                .iter()
                .find(|(wrong, _)| *wrong == c)
                .map(|(_, right)| *right)
                .unwrap_or(c)
        })
        .collect()
}

/// Extract the most likely dish name from OCR text.
///
/// Scans line by line (each line cleaned individually so newlines survive
/// until the scan): the first line longer than 3 characters that is not
/// purely numeric wins, with any price-like pattern removed and the result
/// trimmed. Falls back to the first 50 characters of the cleaned text when
/// no line qualifies.
pub fn extract_dish_name(text: &str) -> String {
    for line in text.split('\n') {
        let line = clean(line);
        if line.len() > 3 && !line.chars().all(|c| c.is_ascii_digit()) {
            let without_price = RE_PRICE.replace_all(&line, "");
            let candidate = clean(&without_price);
            if !candidate.is_empty() {
                return candidate;
            }
        }
    }

    // Fallback: first 50 characters of the whole cleaned text.
    clean(text).chars().take(50).collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_collapses_whitespace() {
        assert_eq!(clean("  grilled \t salmon \n with rice  "), "grilled salmon with rice");
    }

    #[test]
    fn clean_strips_disallowed_chars() {
        assert_eq!(clean("pasta * with % garlic!"), "pasta with garlic");
        // Whitelisted punctuation survives.
        assert_eq!(clean("mac & cheese (v), w/ fries"), "mac & cheese (v), w/ fries");
    }

    #[test]
    fn clean_collapses_space_left_by_stripped_char() {
        // Removing a disallowed character between spaces must not leave a
        // doubled space, and trailing junk must not leave a trailing space.
        assert_eq!(clean("pasta ! sauce"), "pasta sauce");
        assert_eq!(clean("caesar salad %"), "caesar salad");
    }

    #[test]
    fn clean_fixes_ocr_accents() {
        assert_eq!(clean("chícken with tómato and oníon"), "chicken with tomato and onion");
        assert_eq!(clean("beéf, pórk, chéese"), "beef, pork, cheese");
    }

    #[test]
    fn clean_fixes_word_level_misreads() {
        // These need the word table: a character substitution alone would
        // give "chese" and "chick".
        assert_eq!(clean("chése plate"), "cheese plate");
        assert_eq!(clean("fried chíck strips"), "fried chicken strips");
    }

    #[test]
    fn clean_is_idempotent() {
        let inputs = [
            "Chícken Tíkka Masala $14.99\nwith basmati rice",
            "  messy \t\t text!!  @#$",
            "pasta ! sauce",
            "chése & chíck",
            "",
            "already clean",
        ];
        for x in inputs {
            let once = clean(x);
            assert_eq!(clean(&once), once, "clean not idempotent for {x:?}");
        }
    }

    #[test]
    fn clean_text_preserves_line_structure() {
        let cleaned = clean_text("Chícken Tíkka Masala $14.99\n***\nwith basmati rice");
        assert_eq!(cleaned, "Chicken Tikka Masala 14.99\nwith basmati rice");
        assert_eq!(clean_text(&cleaned), cleaned);
    }

    #[test]
    fn extract_dish_name_strips_price_and_fixes_accents() {
        let name = extract_dish_name("Chícken Tíkka Masala $14.99\nwith basmati rice");
        assert_eq!(name, "Chicken Tikka Masala");
    }

    #[test]
    fn extract_dish_name_skips_numeric_and_short_lines() {
        let name = extract_dish_name("42\nok\nMargherita Pizza 12.50");
        assert_eq!(name, "Margherita Pizza");
    }

    #[test]
    fn extract_dish_name_falls_back_to_prefix() {
        // Every line is too short or numeric, so the 50-char fallback kicks in.
        let name = extract_dish_name("12\nab\n9");
        assert_eq!(name, "12 ab 9");
    }

    #[test]
    fn extract_dish_name_skips_price_only_lines() {
        let name = extract_dish_name("$9.99\nCaesar Salad");
        assert_eq!(name, "Caesar Salad");
    }
}
