//! Log-safe redaction of caller-supplied text

use once_cell::sync::Lazy;
use regex::Regex;

pub const CARD_REDACTION: &str = "[REDACTED-CARD]";
pub const SSN_REDACTION: &str = "[REDACTED-SSN]";
pub const SECRET_REDACTION: &str = "[REDACTED]";
pub const TRUNCATION_MARKER: &str = "...[TRUNCATED]";

/// 13 to 19 digits, optionally grouped by single spaces or hyphens
static CARD_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d(?:[ -]?\d){12,18}\b").expect("card pattern must compile"));

static SSN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").expect("ssn pattern must compile"));

static SECRET_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(password|passwd|pwd)\s*=\s*[^\s&;,]+").expect("secret pattern must compile")
});

/// Redact sensitive substrings and cap the length of `text` for logging.
///
/// Card-shaped digit runs, SSN-shaped sequences and `password=`/`pwd=` values
/// are replaced by fixed tokens. The result is then truncated to `max_length`
/// characters, with [`TRUNCATION_MARKER`] appended when anything was cut.
/// Never fails.
pub fn sanitize_for_logging(text: &str, max_length: usize) -> String {
    let redacted = CARD_NUMBER.replace_all(text, CARD_REDACTION);
    let redacted = SSN.replace_all(&redacted, SSN_REDACTION);
    let redacted = SECRET_PAIR.replace_all(&redacted, format!("${{1}}={}", SECRET_REDACTION));

    if redacted.chars().count() <= max_length {
        return redacted.into_owned();
    }

    let mut truncated: String = redacted.chars().take(max_length).collect();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}
