//! Post-extraction normalization primitives: opening-hours formatting, time
//! and phone normalization, rating/reviews cleanup. Pure functions over
//! `&str`, independent of any browser/page type, so the scrape engine and
//! its tests can share them without a DOM in scope.

use once_cell::sync::Lazy;
use regex::Regex;

/// Localized day names mapped onto the canonical English literal. Order
/// does not matter for lookup but longer/more-specific tokens are listed
/// first to avoid a short prefix matching before a longer one.
const DAY_NAMES: &[(&str, &str)] = &[
    // German
    ("montag", "Monday"),
    ("dienstag", "Tuesday"),
    ("mittwoch", "Wednesday"),
    ("donnerstag", "Thursday"),
    ("freitag", "Friday"),
    ("samstag", "Saturday"),
    ("sonnabend", "Saturday"),
    ("sonntag", "Sunday"),
    // French
    ("lundi", "Monday"),
    ("mardi", "Tuesday"),
    ("mercredi", "Wednesday"),
    ("jeudi", "Thursday"),
    ("vendredi", "Friday"),
    ("samedi", "Saturday"),
    ("dimanche", "Sunday"),
    // Italian
    ("lunedì", "Monday"),
    ("lunedi", "Monday"),
    ("martedì", "Tuesday"),
    ("martedi", "Tuesday"),
    ("mercoledì", "Wednesday"),
    ("mercoledi", "Wednesday"),
    ("giovedì", "Thursday"),
    ("giovedi", "Thursday"),
    ("venerdì", "Friday"),
    ("venerdi", "Friday"),
    ("sabato", "Saturday"),
    ("domenica", "Sunday"),
    // Spanish
    ("lunes", "Monday"),
    ("martes", "Tuesday"),
    ("miércoles", "Wednesday"),
    ("miercoles", "Wednesday"),
    ("jueves", "Thursday"),
    ("viernes", "Friday"),
    ("sábado", "Saturday"),
    ("sabado", "Saturday"),
    ("domingo", "Sunday"),
    // Portuguese
    ("segunda-feira", "Monday"),
    ("segunda", "Monday"),
    ("terça-feira", "Tuesday"),
    ("terca-feira", "Tuesday"),
    ("terça", "Tuesday"),
    ("quarta-feira", "Wednesday"),
    ("quarta", "Wednesday"),
    ("quinta-feira", "Thursday"),
    ("quinta", "Thursday"),
    ("sexta-feira", "Friday"),
    ("sexta", "Friday"),
    ("sábado", "Saturday"),
    ("domingo", "Sunday"),
    // English (identity, still needed so detection below finds a match)
    ("monday", "Monday"),
    ("tuesday", "Tuesday"),
    ("wednesday", "Wednesday"),
    ("thursday", "Thursday"),
    ("friday", "Friday"),
    ("saturday", "Saturday"),
    ("sunday", "Sunday"),
];

/// Detect which English weekday a raw hours-row's text refers to, by
/// scanning for any supported-language day name anywhere in the string.
/// Returns `None` when no day token is present, leaving that day's bucket
/// empty rather than guessing from row order.
pub fn detect_day(raw: &str) -> Option<&'static str> {
    detect_day_span(raw).map(|(day, _, _)| day)
}

/// Like `detect_day`, but also returns the matched token's byte range in
/// `raw` (via the lowercased string, which the day-name table is scoped to
/// stay byte-length-stable under `to_lowercase` for), so callers can strip
/// the day token out and normalize only the remaining time text.
fn detect_day_span(raw: &str) -> Option<(&'static str, usize, usize)> {
    let lower = raw.to_lowercase();
    let mut best: Option<(&'static str, usize, usize)> = None;
    for (needle, day) in DAY_NAMES {
        if let Some(pos) = lower.find(needle) {
            let len = needle.len();
            if best.map(|(_, s, e)| len > e - s).unwrap_or(true) {
                best = Some((day, pos, pos + len));
            }
        }
    }
    best
}

/// Remove the matched day token (plus any trailing `:`/`-`/whitespace
/// separator) from `raw`, leaving the time text.
fn strip_day_token(raw: &str, start: usize, end: usize) -> String {
    let before = raw[..start].trim_end();
    let after = raw[end..].trim_start_matches(|c: char| c == ':' || c == '-' || c.is_whitespace());
    format!("{}{}", before, after)
}

static CLOSED_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(closed|geschlossen|ferm[ée]|chiuso|cerrado)\s*$").unwrap()
});
static OPEN_24H_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)open\s*24\s*hours?").unwrap());
static MERIDIEM_GLUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d)\s*(am|pm)(\d)").unwrap());
static MERIDIEM_SPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d)(am|pm)").unwrap());
static TIME_12H: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d{1,2})(?::(\d{2}))?\s*(am|pm)").unwrap());
static RANGE_SEP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*(-|–|—|\bto\b)\s*").unwrap());
static LIST_SEP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*(,|\band\b)\s*").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Normalize one day's raw opening-hours text into the canonical form:
/// `Closed`, `Open 24 hours`, or `HH:MM - HH:MM` (optionally ` & `-joined).
///
/// Idempotent: feeding an already-normalized string back through returns it
/// unchanged.
pub fn normalize_hours(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if CLOSED_PATTERN.is_match(trimmed) {
        return "Closed".to_string();
    }
    if OPEN_24H_PATTERN.is_match(trimmed) {
        return "Open 24 hours".to_string();
    }

    // Step 3: insert missing spaces between digits and am/pm, and split
    // concatenated ranges like "9 am7 pm" -> "9 am 7 pm", before any 24h
    // conversion runs (so the boundary between two times is never lost).
    let spaced = MERIDIEM_GLUE.replace_all(trimmed, "$1 $2 $3");
    let spaced = MERIDIEM_SPACE.replace_all(&spaced, "$1 $2");

    // Step 4: convert every `\d+(:\d+)? am|pm` occurrence to 24-hour form
    // before touching separators, so "12:00 pm - 9:00 pm" cannot collapse
    // into "12:0021:00".
    let converted = TIME_12H.replace_all(&spaced, |caps: &regex::Captures| {
        let hour: u32 = caps[1].parse().unwrap_or(0);
        let minute: u32 = caps.get(2).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
        let meridiem = caps[3].to_lowercase();
        let hour24 = to_24h_hour(hour, &meridiem);
        format!("{:02}:{:02}", hour24, minute)
    });

    // Step 5/6: normalize range and list separators.
    let ranged = RANGE_SEP.replace_all(&converted, " - ");
    let listed = LIST_SEP.replace_all(&ranged, " & ");

    WHITESPACE.replace_all(listed.trim(), " ").to_string()
}

fn to_24h_hour(hour: u32, meridiem: &str) -> u32 {
    match meridiem {
        "am" => {
            if hour == 12 {
                0
            } else {
                hour
            }
        }
        "pm" => {
            if hour == 12 {
                12
            } else {
                hour + 12
            }
        }
        _ => hour,
    }
}

/// Localize a day's raw text by first substituting any recognized
/// localized day name with its English literal, then normalizing the time
/// portion. Used by the extractor to decide which `Weekday` bucket a row
/// belongs to and what its normalized value is in one pass.
pub fn localize_and_normalize(raw: &str) -> (Option<&'static str>, String) {
    match detect_day_span(raw) {
        Some((day, start, end)) => (Some(day), normalize_hours(&strip_day_token(raw, start, end))),
        None => (None, normalize_hours(raw)),
    }
}

/// Parse and canonicalize a rating string; accepts only values in [0, 5].
/// Output always carries one decimal place (`4` -> `"4.0"`).
pub fn format_rating(raw: &str) -> Option<String> {
    static RATING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+[.,]\d+|\d+").unwrap());
    let m = RATING_RE.find(raw)?;
    let normalized = m.as_str().replace(',', ".");
    let value: f64 = normalized.parse().ok()?;
    if !(0.0..=5.0).contains(&value) {
        return None;
    }
    Some(format!("{:.1}", value))
}

/// Parse a reviews-count string (`(123)`, `123 reviews`, localized
/// variants, or a bare number with thousand separators) into a bare
/// non-negative integer string.
pub fn parse_reviews_count(raw: &str) -> Option<String> {
    static DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\d.,]+").unwrap());
    let m = DIGITS_RE.find(raw)?;
    let cleaned: String = m.as_str().chars().filter(|c| c.is_ascii_digit()).collect();
    if cleaned.is_empty() {
        return None;
    }
    let value: u64 = cleaned.parse().ok()?;
    Some(value.to_string())
}

/// International-prefix phone number normalization.
pub fn normalize_phone(raw: &str, default_country_prefix: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
        .collect();

    if let Some(rest) = cleaned.strip_prefix('+') {
        let (country, national) = split_country_code(rest);
        return format!("+{} {}", country, group_digits(national));
    }

    let national = cleaned.strip_prefix('0').unwrap_or(&cleaned);
    if national.len() < 4 {
        return format!("{}{}", default_country_prefix, cleaned);
    }
    format!("{} {}", default_country_prefix, group_digits(national))
}

/// Split a `+`-stripped international number into (country code, rest),
/// using a short table of common 1-3 digit country codes.
fn split_country_code(digits: &str) -> (&str, &str) {
    const KNOWN: &[&str] = &[
        "41", "49", "33", "39", "34", "351", "31", "32", "44", "1", "45", "46", "47", "358",
    ];
    for code in KNOWN {
        if digits.starts_with(code) {
            return digits.split_at(code.len());
        }
    }
    // Best-effort default: assume a 2-digit country code.
    if digits.len() > 2 {
        digits.split_at(2)
    } else {
        (digits, "")
    }
}

fn group_digits(digits: &str) -> String {
    let chars: Vec<char> = digits.chars().collect();
    let mut groups = Vec::new();
    let mut i = 0;
    if chars.len() > 3 {
        groups.push(chars[..2].iter().collect::<String>());
        i = 2;
    }
    while i < chars.len() {
        let end = (i + 3).min(chars.len());
        groups.push(chars[i..end].iter().collect::<String>());
        i = end;
    }
    groups.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noon_and_midnight_boundaries() {
        assert_eq!(normalize_hours("12am - 1am"), "00:00 - 01:00");
        assert_eq!(normalize_hours("12pm - 1pm"), "12:00 - 13:00");
    }

    #[test]
    fn pm_to_pm_range_does_not_collapse() {
        assert_eq!(normalize_hours("12:00 pm - 9:00 pm"), "12:00 - 21:00");
    }

    #[test]
    fn midnight_wrap_without_day_rollover() {
        assert_eq!(normalize_hours("12:30 pm - 12:30 am"), "12:30 - 00:30");
    }

    #[test]
    fn multi_range_uses_ampersand() {
        assert_eq!(
            normalize_hours("9 am - 12 pm and 1 pm - 8 pm"),
            "09:00 - 12:00 & 13:00 - 20:00"
        );
    }

    #[test]
    fn glued_meridiem_is_split_before_conversion() {
        assert_eq!(normalize_hours("9 am7 pm"), "09:00 19:00");
    }

    #[test]
    fn localized_closed_and_open_24h() {
        assert_eq!(normalize_hours("Geschlossen"), "Closed");
        assert_eq!(normalize_hours("Fermé"), "Closed");
        assert_eq!(normalize_hours("Chiuso"), "Closed");
        assert_eq!(normalize_hours("Cerrado"), "Closed");
        assert_eq!(normalize_hours("Open 24 hours"), "Open 24 hours");
    }

    #[test]
    fn normalize_hours_is_idempotent() {
        let once = normalize_hours("12:00 pm - 9:00 pm");
        let twice = normalize_hours(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn detect_day_is_order_independent_and_multilingual() {
        assert_eq!(detect_day("Donnerstag: 08:00 - 18:00"), Some("Thursday"));
        assert_eq!(detect_day("Montag geschlossen"), Some("Monday"));
        assert_eq!(detect_day("Sonntag: Closed"), Some("Sunday"));
        assert_eq!(detect_day("no day token here"), None);
    }

    #[test]
    fn localize_and_normalize_strips_day_token_before_normalizing() {
        let (day, value) = localize_and_normalize("Donnerstag 08:00-18:00");
        assert_eq!(day, Some("Thursday"));
        assert_eq!(value, "08:00 - 18:00");

        let (day, value) = localize_and_normalize("Montag Closed");
        assert_eq!(day, Some("Monday"));
        assert_eq!(value, "Closed");
    }

    #[test]
    fn rating_accepts_only_in_range_and_formats_one_decimal() {
        assert_eq!(format_rating("4 stars"), Some("4.0".to_string()));
        assert_eq!(format_rating("4.7 (based on reviews)"), Some("4.7".to_string()));
        assert_eq!(format_rating("4,7"), Some("4.7".to_string()));
        assert_eq!(format_rating("5.2"), None);
        assert_eq!(format_rating("no rating"), None);
    }

    #[test]
    fn reviews_count_strips_separators() {
        assert_eq!(parse_reviews_count("(1,234)"), Some("1234".to_string()));
        assert_eq!(parse_reviews_count("1.234 reviews"), Some("1234".to_string()));
        assert_eq!(parse_reviews_count("42"), Some("42".to_string()));
        assert_eq!(parse_reviews_count("no count"), None);
    }

    #[test]
    fn phone_normalization_keeps_or_adds_country_prefix() {
        assert_eq!(normalize_phone("+41 44 123 45 67", "+41"), "+41 44 123 45 67");
        assert_eq!(normalize_phone("044 123 45 67", "+41"), "+41 44 123 45 67");
    }
}
