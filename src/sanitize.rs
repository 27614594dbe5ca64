//! Input sanitization for user-supplied text and structured request data
//!
//! This module neutralizes HTML/script/URL-scheme injection before any
//! value reaches storage or is echoed back to a client:
//! - Free-text cleaning with HTML encoding or an allow-list tag filter
//! - URL scheme validation (http/https only)
//! - Filename normalization for uploaded files
//! - Recursive cleaning of nested JSON bodies with depth and size caps
//! - Advisory XSS signature detection for telemetry
//!
//! Attack-signature detection here is a blocklist, not a parser; it is a
//! telemetry layer. The structural placeholder discipline enforced by the
//! query guard is the primary security boundary.
//!
//! Sanitization never fails on malformed data: every function degrades to
//! the safest representation (encoded text, `None`, or a fallback value).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Maximum recursion depth for [`sanitize_object`]
const MAX_DEPTH: usize = 10;
/// Maximum number of properties retained per object
const MAX_PROPERTIES: usize = 50;
/// Maximum number of elements retained per array
const MAX_ARRAY_LEN: usize = 100;
/// Maximum length of a sanitized object key
const MAX_KEY_LENGTH: usize = 50;

/// Tags permitted when `allow_html` is enabled
const ALLOWED_TAGS: &[&str] = &[
    "p", "br", "b", "i", "u", "strong", "em", "ul", "ol", "li", "a",
];

static SCRIPT_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<\s*script\b[^>]*>.*?</\s*script\s*>").unwrap());
static SCRIPT_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</?\s*script\b[^>]*>").unwrap());
static HTML_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<\s*(/?)\s*([a-zA-Z][a-zA-Z0-9]*)([^>]*)>").unwrap());
static EVENT_ATTR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bon\w+\s*=").unwrap());
static JS_SCHEME: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)javascript\s*:").unwrap());
static VB_SCHEME: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)vbscript\s*:").unwrap());
static DATA_HTML: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)data\s*:\s*text/html").unwrap());
static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());
static HORIZONTAL_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());
static ANY_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static MULTI_DOT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.{2,}").unwrap());

/// XSS signatures checked by [`detect_xss_attempts`]
///
/// Detection is advisory: a match is logged but never blocks or alters
/// the input on its own.
static XSS_SIGNATURES: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    vec![
        ("script-tag", Regex::new(r"(?i)<script").unwrap()),
        ("javascript-scheme", Regex::new(r"(?i)javascript\s*:").unwrap()),
        ("event-handler", Regex::new(r"(?i)\bon\w+\s*=").unwrap()),
        ("iframe-tag", Regex::new(r"(?i)<iframe").unwrap()),
        ("document-cookie", Regex::new(r"(?i)document\.cookie").unwrap()),
        ("document-write", Regex::new(r"(?i)document\.write").unwrap()),
        ("eval-call", Regex::new(r"(?i)\beval\s*\(").unwrap()),
        ("alert-call", Regex::new(r"(?i)\balert\s*\(").unwrap()),
        ("prompt-call", Regex::new(r"(?i)\bprompt\s*\(").unwrap()),
        ("confirm-call", Regex::new(r"(?i)\bconfirm\s*\(").unwrap()),
        ("object-tag", Regex::new(r"(?i)<object").unwrap()),
        ("embed-tag", Regex::new(r"(?i)<embed").unwrap()),
        ("css-expression", Regex::new(r"(?i)expression\s*\(").unwrap()),
        ("vbscript-scheme", Regex::new(r"(?i)vbscript\s*:").unwrap()),
        ("data-html-url", Regex::new(r"(?i)data\s*:\s*text/html").unwrap()),
    ]
});

/// Per-call configuration for [`sanitize_user_input`]
///
/// Call sites construct one of these per field; the middleware collaborator
/// decides which fields get sanitized and with what `max_length`.
///
/// # Examples
///
/// ```
/// use palisade::sanitize::SanitizeOptions;
///
/// // Comment bodies: short, no markup
/// let comment = SanitizeOptions {
///     max_length: 500,
///     ..Default::default()
/// };
///
/// // Ad descriptions: limited markup allowed
/// let description = SanitizeOptions {
///     max_length: 5000,
///     allow_html: true,
///     preserve_line_breaks: true,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SanitizeOptions {
    /// Maximum length of the cleaned output, in characters
    pub max_length: usize,
    /// Permit the small allow-listed tag set instead of encoding everything
    pub allow_html: bool,
    /// Remove tags outright before encoding (only applies when `allow_html` is off)
    pub strip_tags: bool,
    /// Collapse runs of whitespace to a single space
    pub normalize_whitespace: bool,
    /// Keep line breaks when normalizing whitespace
    pub preserve_line_breaks: bool,
    /// Return an empty string instead of `None` when nothing survives cleaning
    pub allow_empty_string: bool,
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self {
            max_length: 1000,
            allow_html: false,
            strip_tags: false,
            normalize_whitespace: true,
            preserve_line_breaks: false,
            allow_empty_string: false,
        }
    }
}

/// Cleans a user-supplied string for safe storage and display
///
/// Steps, in order: advisory XSS detection (log only), HTML handling
/// (allow-list filter or full encoding), unconditional script/scheme
/// neutralization, whitespace normalization, trim, and truncation to
/// `max_length` characters.
///
/// Returns `None` when the cleaned result is empty and
/// `allow_empty_string` is off.
///
/// # Examples
///
/// ```
/// use palisade::sanitize::{sanitize_user_input, SanitizeOptions};
///
/// let cleaned = sanitize_user_input("  hello   world  ", &SanitizeOptions::default());
/// assert_eq!(cleaned.as_deref(), Some("hello world"));
/// ```
pub fn sanitize_user_input(input: &str, options: &SanitizeOptions) -> Option<String> {
    if let Some(signature) = detect_xss_attempts(input) {
        warn!(signature, "XSS signature detected in user input");
    }

    let text = if options.allow_html {
        sanitize_html(input)
    } else if options.strip_tags {
        html_encode(&ANY_TAG.replace_all(input, ""))
    } else {
        html_encode(input)
    };

    let text = remove_scripts(&text);

    let text = if options.normalize_whitespace {
        if options.preserve_line_breaks {
            HORIZONTAL_WS.replace_all(&text, " ").into_owned()
        } else {
            ANY_WS.replace_all(&text, " ").into_owned()
        }
    } else {
        text
    };

    let text = text.trim();
    if text.is_empty() && !options.allow_empty_string {
        return None;
    }

    Some(text.chars().take(options.max_length).collect())
}

/// Encodes the six HTML-reserved characters
///
/// The entity forms are a fixed contract shared with the frontend: stored
/// values are rendered without further escaping, so the set and spelling
/// here must not change.
pub fn html_encode(input: &str) -> String {
    let mut encoded = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => encoded.push_str("&amp;"),
            '<' => encoded.push_str("&lt;"),
            '>' => encoded.push_str("&gt;"),
            '"' => encoded.push_str("&quot;"),
            '\'' => encoded.push_str("&#x27;"),
            '/' => encoded.push_str("&#x2F;"),
            _ => encoded.push(c),
        }
    }
    encoded
}

/// Strips script blocks and rewrites executable schemes to inert text
///
/// Applied unconditionally after HTML handling, so content that survives
/// the allow-list filter still cannot carry `javascript:` URLs or inline
/// event handlers.
pub fn remove_scripts(input: &str) -> String {
    let text = SCRIPT_BLOCK.replace_all(input, "");
    let text = SCRIPT_TAG.replace_all(&text, "");
    let text = JS_SCHEME.replace_all(&text, "blocked:");
    let text = VB_SCHEME.replace_all(&text, "blocked:");
    let text = DATA_HTML.replace_all(&text, "blocked:");
    EVENT_ATTR.replace_all(&text, "data-blocked=").into_owned()
}

/// Filters HTML down to the allow-listed tag set
///
/// Script blocks are removed with their content; other disallowed tags
/// lose their markup but keep their inner text. Event-handler attributes
/// and `javascript:` hrefs inside allowed tags are rewritten to inert
/// equivalents.
fn sanitize_html(input: &str) -> String {
    let text = SCRIPT_BLOCK.replace_all(input, "");
    HTML_TAG
        .replace_all(&text, |caps: &regex::Captures| {
            let name = caps[2].to_lowercase();
            if !ALLOWED_TAGS.contains(&name.as_str()) {
                return String::new();
            }
            if !caps[1].is_empty() {
                return format!("</{}>", name);
            }
            let attrs = EVENT_ATTR.replace_all(&caps[3], "data-blocked=");
            let attrs = JS_SCHEME.replace_all(&attrs, "blocked:");
            format!("<{}{}>", name, attrs)
        })
        .into_owned()
}

/// Validates a URL against the http/https scheme allow-list
///
/// Scheme-less input is accepted when it resolves as a relative URL.
/// Everything else (`javascript:`, `data:`, `file:`, `ftp:`, malformed
/// text) comes back as `None`.
///
/// # Examples
///
/// ```
/// use palisade::sanitize::sanitize_url;
///
/// assert_eq!(sanitize_url("https://example.com").as_deref(), Some("https://example.com"));
/// assert_eq!(sanitize_url("javascript:alert(1)"), None);
/// ```
pub fn sanitize_url(url: &str) -> Option<String> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return None;
    }

    match url::Url::parse(trimmed) {
        Ok(parsed) => match parsed.scheme() {
            "http" | "https" => Some(trimmed.to_string()),
            _ => None,
        },
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            // Scheme-less input; accept it only if it parses as a path
            // against a throwaway base.
            let base = url::Url::parse("https://placeholder.invalid/").ok()?;
            base.join(trimmed).ok().map(|_| trimmed.to_string())
        }
        Err(_) => None,
    }
}

/// Normalizes an uploaded filename to a safe character set
///
/// Characters outside `[A-Za-z0-9._-]` become `_`, dot runs collapse to a
/// single dot, leading and trailing dots are stripped, and the result is
/// truncated to 100 characters. An empty result falls back to `"file"`.
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let collapsed = MULTI_DOT.replace_all(&replaced, ".");
    let trimmed = collapsed.trim_matches('.');
    let truncated: String = trimmed.chars().take(100).collect();

    if truncated.is_empty() {
        "file".to_string()
    } else {
        truncated
    }
}

/// Recursively cleans every string leaf of a JSON tree
///
/// Applies [`sanitize_user_input`] to string values and to object keys
/// (keys capped at 50 characters; properties with empty keys after
/// cleaning are dropped). Guards against hostile shapes: recursion past
/// depth 10 returns an empty object, objects keep at most 50 properties,
/// arrays at most 100 elements. Numbers and booleans are coerced to
/// strings and cleaned like any other leaf.
pub fn sanitize_object(value: &Value, depth: usize) -> Value {
    if depth > MAX_DEPTH {
        warn!(depth, "object recursion limit exceeded, dropping subtree");
        return Value::Object(Map::new());
    }

    match value {
        Value::Object(map) => {
            if map.len() > MAX_PROPERTIES {
                warn!(
                    dropped = map.len() - MAX_PROPERTIES,
                    "object property cap exceeded, dropping extra properties"
                );
            }

            let key_options = SanitizeOptions {
                max_length: MAX_KEY_LENGTH,
                ..Default::default()
            };

            let mut cleaned = Map::new();
            for (key, child) in map.iter().take(MAX_PROPERTIES) {
                match sanitize_user_input(key, &key_options) {
                    Some(clean_key) => {
                        cleaned.insert(clean_key, sanitize_object(child, depth + 1));
                    }
                    None => {
                        debug!("dropping property whose key is empty after sanitization");
                    }
                }
            }
            Value::Object(cleaned)
        }
        Value::Array(items) => {
            if items.len() > MAX_ARRAY_LEN {
                warn!(
                    dropped = items.len() - MAX_ARRAY_LEN,
                    "array length cap exceeded, dropping extra elements"
                );
            }
            Value::Array(
                items
                    .iter()
                    .take(MAX_ARRAY_LEN)
                    .map(|item| sanitize_object(item, depth + 1))
                    .collect(),
            )
        }
        Value::String(s) => {
            let options = SanitizeOptions {
                allow_empty_string: true,
                ..Default::default()
            };
            Value::String(sanitize_user_input(s, &options).unwrap_or_default())
        }
        Value::Null => Value::Null,
        scalar => {
            let options = SanitizeOptions {
                allow_empty_string: true,
                ..Default::default()
            };
            Value::String(sanitize_user_input(&scalar.to_string(), &options).unwrap_or_default())
        }
    }
}

/// Checks input against the fixed XSS signature list
///
/// Returns the label of the first matching signature, logging it for
/// telemetry. Detection never alters or blocks the input.
pub fn detect_xss_attempts(input: &str) -> Option<&'static str> {
    for (label, pattern) in XSS_SIGNATURES.iter() {
        if pattern.is_match(input) {
            debug!(signature = label, "input matched XSS signature");
            return Some(label);
        }
    }
    None
}
