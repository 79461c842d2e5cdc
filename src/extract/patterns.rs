//! Compiled patterns and literal markers shared by both extraction strategies.
//!
//! All of these are tuned to the earth911 results template (US phone numbers,
//! English markers, a New York city line). Anything else falls through as
//! "no match".

use regex::Regex;
use std::sync::OnceLock;

pub const MATERIALS_MARKER: &str = "Materials accepted:";
pub const RESIDENTS_MARKER: &str = "For residents";
pub const CITY_STATE_TEXT: &str = "New York, NY";

static PHONE: OnceLock<Regex> = OnceLock::new();
static STREET_LINE: OnceLock<Regex> = OnceLock::new();
static CITY_LINE: OnceLock<Regex> = OnceLock::new();
static STREET_PREFIX: OnceLock<Regex> = OnceLock::new();
static CONTAINER_STREET_LINE: OnceLock<Regex> = OnceLock::new();
static PAGINATION_TOKEN: OnceLock<Regex> = OnceLock::new();

fn compile(slot: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    slot.get_or_init(|| Regex::new(pattern).expect("valid built-in pattern"))
}

/// `(212) 555-0100`, with optional whitespace after the area code.
pub fn phone() -> &'static Regex {
    compile(&PHONE, r"\(\d{3}\)\s*\d{3}-\d{4}")
}

/// House number, street words, street suffix.
pub fn street_line() -> &'static Regex {
    compile(
        &STREET_LINE,
        r"\d+\s+[A-Za-z\s]+(St|Ave|Avenue|Street|Rd|Road|Blvd|Boulevard|Dr|Drive)",
    )
}

pub fn city_line() -> &'static Regex {
    compile(&CITY_LINE, r"New York, NY \d{5}")
}

/// Leading street portion of a joined address, used to name anonymous facilities.
pub fn street_prefix() -> &'static Regex {
    compile(&STREET_PREFIX, r"(\d+\s+[A-Za-z\s]+(?:St|Ave|Avenue|Street))")
}

/// Narrower suffix set used by the container fallback.
pub fn container_street_line() -> &'static Regex {
    compile(&CONTAINER_STREET_LINE, r"\d+\s+[A-Za-z\s]+(St|Ave|Street|Road)")
}

/// Pagination leftovers such as the `+3` in `+3 more`.
pub fn pagination_token() -> &'static Regex {
    compile(&PAGINATION_TOKEN, r"^\+\d+")
}

/// Text between the first materials marker and the next one (or the end), cut
/// at the residents note and then at the first parenthesis. `None` when the
/// marker is absent.
pub fn materials_tail(text: &str) -> Option<&str> {
    let (_, after) = text.split_once(MATERIALS_MARKER)?;
    let after = after.split(MATERIALS_MARKER).next().unwrap_or(after);
    let after = after.split(RESIDENTS_MARKER).next().unwrap_or(after);
    Some(after.split('(').next().unwrap_or(after))
}

/// First `n` characters of `s`, on a char boundary.
pub fn truncate_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
