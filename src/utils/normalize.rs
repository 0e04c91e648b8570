//! Institution-name normalization utilities.
//!
//! Alumni enter the school they attend as free text, so the same institution
//! shows up as "MIT", " M.I.T. ", "mit" and so on. Everything that compares
//! institution names (curated lookups, geocoder results, unmapped grouping)
//! goes through [`normalize_institution`] first.
//! Key transformations:
//! - Convert to lowercase
//! - Remove accents/diacritics (é → e, ü → u, etc.)
//! - Strip punctuation noise (periods, commas, apostrophes, parentheses)
//! - Normalize whitespace

use unicode_normalization::UnicodeNormalization;

/// Keywords marking a record as not-a-college: employment, military service,
/// trade programs, or an explicit "no school" entry. Matched against the
/// cleaned, lower-cased name.
const NON_COLLEGE_KEYWORDS: &[&str] = &[
    "employ",
    "work",
    "job",
    "career",
    "full time",
    "army",
    "navy",
    "air force",
    "marine",
    "coast guard",
    "national guard",
    "military",
    "trade",
    "apprentice",
    "vocational",
    "cosmetology",
    "barber",
    "welding",
    "not attending",
    "no college",
    "gap year",
];

/// Normalize an institution name for matching purposes.
///
/// Transformations applied:
/// 1. Replace special characters that don't decompose (ł, ø, æ, etc.)
/// 2. Unicode NFD normalization (decompose characters)
/// 3. Remove combining diacritical marks (accents)
/// 4. Strip punctuation noise; `&` becomes `and`
/// 5. Convert to lowercase
/// 6. Normalize whitespace (collapse multiple spaces, trim)
///
/// Idempotent: normalizing an already-normalized name is a no-op.
///
/// # Examples
///
/// ```
/// use alumnimap::utils::normalize_institution;
///
/// assert_eq!(normalize_institution(" M.I.T. "), "mit");
/// assert_eq!(normalize_institution("St. John's University"), "st johns university");
/// assert_eq!(normalize_institution("Texas A&M"), "texas a and m");
/// assert_eq!(normalize_institution("École Polytechnique"), "ecole polytechnique");
/// ```
pub fn normalize_institution(name: &str) -> String {
    // First, replace special characters that don't decompose via NFD
    let replaced = replace_special_chars(name);

    replaced
        // NFD decomposition: splits characters into base + combining marks
        // e.g., "é" becomes "e" + combining acute accent
        .nfd()
        // Filter out combining diacritical marks (Unicode category Mn)
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
        // Strip punctuation noise: periods and apostrophes vanish ("M.I.T."
        // → "MIT"), separators become word breaks, "&" reads as "and"
        .chars()
        .map(|c| match c {
            '&' => " and ".to_string(),
            '.' | '\'' | '\u{2019}' | '"' => String::new(),
            ',' | '(' | ')' | '/' | '-' => " ".to_string(),
            _ => c.to_string(),
        })
        .collect::<String>()
        // Normalize whitespace
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
}

/// Replace special characters that don't decompose via Unicode NFD.
///
/// Some characters like Ł, Ø, Æ are distinct letters, not accented versions,
/// so they need explicit replacement for normalization.
fn replace_special_chars(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            // Polish
            'Ł' => 'L',
            'ł' => 'l',
            // Nordic
            'Ø' => 'O',
            'ø' => 'o',
            'Æ' => 'A',
            'æ' => 'a',
            'Å' => 'A',
            'å' => 'a',
            // German
            'ß' => 's',
            // Icelandic
            'Ð' => 'D',
            'ð' => 'd',
            'Þ' => 'T',
            'þ' => 't',
            // Croatian/Serbian
            'Đ' => 'D',
            'đ' => 'd',
            // Turkish
            'İ' => 'I',
            'ı' => 'i',
            'Ğ' => 'G',
            'ğ' => 'g',
            'Ş' => 'S',
            'ş' => 's',
            // Others pass through for NFD handling
            _ => c,
        })
        .collect()
}

/// Check whether a raw institution entry describes something other than a
/// college: employment, military service, a trade program, or no entry at
/// all. Such records are valid roster data but are never geocoded.
///
/// # Examples
///
/// ```
/// use alumnimap::utils::is_non_college;
///
/// assert!(is_non_college("Works at Acme Corp"));
/// assert!(is_non_college("US Army"));
/// assert!(is_non_college("N/A"));
/// assert!(is_non_college("   "));
/// assert!(!is_non_college("Oberlin College"));
/// ```
pub fn is_non_college(name: &str) -> bool {
    let cleaned = normalize_institution(name);

    if cleaned.is_empty() || cleaned == "na" || cleaned == "n a" || cleaned == "none" {
        return true;
    }

    NON_COLLEGE_KEYWORDS.iter().any(|kw| cleaned.contains(kw))
}

/// Check that a value is a usable map coordinate: a finite number. Curated
/// rows with NaN or infinite coordinates are skipped rather than indexed.
pub fn is_valid_coordinate(v: f64) -> bool {
    v.is_finite()
}

/// Check whether a character is a combining diacritical mark.
///
/// Combining marks are Unicode characters that modify the preceding character,
/// such as accents (́), umlauts (̈), cedillas (̧), etc.
fn is_combining_mark(c: char) -> bool {
    // Unicode combining diacritical marks range
    // See: https://unicode.org/charts/PDF/U0300.pdf
    matches!(c,
        '\u{0300}'..='\u{036F}' |  // Combining Diacritical Marks
        '\u{1AB0}'..='\u{1AFF}' |  // Combining Diacritical Marks Extended
        '\u{1DC0}'..='\u{1DFF}' |  // Combining Diacritical Marks Supplement
        '\u{20D0}'..='\u{20FF}' |  // Combining Diacritical Marks for Symbols
        '\u{FE20}'..='\u{FE2F}'    // Combining Half Marks
    )
}
