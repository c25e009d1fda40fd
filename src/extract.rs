//! Aggressive name extraction from free text
//!
//! Low precision, high recall by design: a structured JSON parse is attempted
//! first, then an ordered list of regex patterns anchored on leadership
//! keywords, and finally any two-capitalized-word sequence in the text. The
//! broad fallback will happily match non-person proper nouns; the exclusion
//! list only filters obvious organizational words.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::sources::{CeoRecord, Confidence};

/// Placeholder values that mean "no result" when read back from the table.
const PLACEHOLDERS: &[&str] = &["Not found", "Error", "Unknown", "N/A"];

/// Substrings that disqualify an extracted candidate outright.
const EXCLUDED_WORDS: &[&str] = &[
    "not found",
    "unknown",
    "error",
    "company",
    "corporation",
    "limited",
    "llc",
    "inc",
    "group",
    "team",
    "staff",
    "information",
    "available",
    "website",
    "linkedin",
];

/// Ordered from most to least specific; the first plausible hit wins.
static NAME_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // Leadership keyword followed by a name
        r"(?:CEO|Chief Executive|President|Founder|Owner|Director|Manager|Chairman)[:\s]+([A-Z][a-zA-Z]+\s+[A-Z][a-zA-Z]+)",
        // A ceo_name fragment from half-formed JSON
        r#""ceo_name"\s*:\s*"([^"]+)""#,
        // "founded by", "started by", ...
        r"(?:founded|started|created|established|owned|led|managed)\s+by[:\s]+([A-Z][a-zA-Z]+\s+[A-Z][a-zA-Z]+)",
        // Name followed by a leadership keyword
        r"([A-Z][a-zA-Z]+\s+[A-Z][a-zA-Z]+)(?:\s+(?:is|was|serves\s+as|acts\s+as))?\s+(?:the\s+)?(?:CEO|Chief Executive|President|Founder|Owner)",
        r"([A-Z][a-zA-Z]+\s+[A-Z][a-zA-Z]+),\s*(?:CEO|Chief Executive|President|Founder|Owner)",
        // Honorifics
        r"(?:Mr\.|Ms\.|Dr\.)\s+([A-Z][a-zA-Z]+\s+[A-Z][a-zA-Z]+)",
        // Last resort: ANY two capitalized words
        r"\b([A-Z][a-zA-Z]{2,}\s+[A-Z][a-zA-Z]{2,})\b",
        // Quoted names and attribution verbs
        r#""([A-Z][a-zA-Z]+\s+[A-Z][a-zA-Z]+)""#,
        r"([A-Z][a-zA-Z]+\s+[A-Z][a-zA-Z]+)\s+(?:said|explained)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static pattern"))
    .collect()
});

static EMBEDDED_JSON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\{[^{}]*"ceo_name"[^{}]*\}"#).expect("static pattern"));

/// Is this cell value one of the "no result" placeholders (or blank)?
pub fn is_placeholder(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || PLACEHOLDERS.iter().any(|p| trimmed.eq_ignore_ascii_case(p))
}

/// Validity check applied before a cascade result is accepted and before a
/// stored row is considered done: non-placeholder, length > 3, and not a
/// failure message masquerading as a name.
pub fn is_valid_name(name: &str) -> bool {
    let trimmed = name.trim();
    if is_placeholder(trimmed) || trimmed.len() <= 3 {
        return false;
    }
    let lower = trimmed.to_lowercase();
    !["unknown", "not found", "error"]
        .iter()
        .any(|prefix| lower.starts_with(prefix))
}

/// Candidate filter for the regex patterns: plausible "First Last" shape and
/// nothing from the exclusion list.
pub fn is_plausible_name(candidate: &str) -> bool {
    let name = candidate.trim();
    if name.len() <= 5 || name.len() >= 50 {
        return false;
    }
    if !name.contains(' ') || name.matches(' ').count() > 3 {
        return false;
    }
    let lower = name.to_lowercase();
    !EXCLUDED_WORDS.iter().any(|w| lower.contains(w))
}

/// Extract ANY human-looking name from text. Returns the first candidate that
/// survives the exclusion filter, trying patterns in order of specificity.
pub fn extract_name(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }

    for pattern in NAME_PATTERNS.iter() {
        for caps in pattern.captures_iter(text) {
            let Some(m) = caps.get(1) else { continue };
            let candidate = m.as_str().trim();
            if is_plausible_name(candidate) {
                debug!("Extracted name candidate: {}", candidate);
                return Some(candidate.to_string());
            }
        }
    }

    None
}

/// Shape of the JSON object the prompts ask models to return.
#[derive(Debug, Deserialize)]
struct LlmReply {
    #[serde(default)]
    ceo_name: String,
    #[serde(default)]
    ceo_title: String,
    #[serde(default)]
    ceo_email: String,
    #[serde(default)]
    ceo_linkedin: String,
    #[serde(default)]
    confidence: String,
}

/// Strip markdown code fences and emphasis markers that models wrap around
/// JSON replies.
fn strip_markdown(text: &str) -> String {
    let mut body = text;
    if let Some(rest) = body.split("```json").nth(1) {
        body = rest.split("```").next().unwrap_or(rest);
    } else if let Some(rest) = body.split("```").nth(1) {
        body = rest;
    }
    body.replace("**", "").replace('*', "").trim().to_string()
}

fn record_from_reply(reply: LlmReply, source: &str) -> Option<CeoRecord> {
    if !is_valid_name(&reply.ceo_name) {
        return None;
    }
    let confidence = reply
        .confidence
        .parse::<Confidence>()
        .unwrap_or(Confidence::Low);
    Some(
        CeoRecord::new(reply.ceo_name.trim(), source)
            .with_title(reply.ceo_title)
            .with_email(reply.ceo_email)
            .with_linkedin(reply.ceo_linkedin)
            .with_confidence(confidence),
    )
}

/// Parse a model response into a record: structured JSON first, then an
/// embedded JSON object, then aggressive regex extraction over the response
/// text, finally over the original prompt context.
pub fn parse_lookup_response(
    response: &str,
    source: &str,
    context: Option<&str>,
) -> Option<CeoRecord> {
    let body = strip_markdown(response);

    if body.starts_with('{') {
        match serde_json::from_str::<LlmReply>(&body) {
            Ok(reply) => {
                if let Some(record) = record_from_reply(reply, source) {
                    debug!("JSON-parsed name: {}", record.name);
                    return Some(record);
                }
            }
            Err(e) => debug!("JSON parse failed, falling back to regex: {}", e),
        }
    }

    // A JSON object buried in surrounding prose
    if let Some(m) = EMBEDDED_JSON.find(&body) {
        if let Ok(reply) = serde_json::from_str::<LlmReply>(m.as_str()) {
            if let Some(record) = record_from_reply(reply, source) {
                debug!("Embedded-JSON name: {}", record.name);
                return Some(record);
            }
        }
    }

    // Aggressive: any name in the response at all
    if let Some(name) = extract_name(&body) {
        return Some(
            CeoRecord::new(name, format!("{} - aggressive extraction", source))
                .with_title("Leadership"),
        );
    }

    // Last resort: any name in the context we fed the model
    if let Some(ctx) = context {
        if let Some(name) = extract_name(ctx) {
            return Some(
                CeoRecord::new(name, format!("{} - context extraction", source))
                    .with_title("Found in content"),
            );
        }
    }

    warn!("Could not extract any name from {} response", source);
    None
}
