//! Provider key transcoding
//!
//! Providers spell keys as PascalCase (`BoxOffice`) or snake_case
//! (`release_date`). The catalog uses camelCase throughout, so every provider
//! response passes through [`transcode_keys`] once when it is ingested.

use serde_json::{Map, Value};

/// Rewrite every object key in `value` to camelCase, recursively
///
/// Values, nesting and array order are untouched.
pub fn transcode_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(transcode_map(map)),
        Value::Array(items) => Value::Array(items.into_iter().map(transcode_keys).collect()),
        other => other,
    }
}

/// [`transcode_keys`] for a top-level mapping
///
/// When two keys land on the same camelCase key, a key that was already
/// spelled that way wins; otherwise the first one seen is kept.
pub fn transcode_map(map: Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    for (key, value) in map {
        let camel = to_camel_case(&key);
        if out.contains_key(&camel) {
            let replaces = key == camel;
            tracing::debug!(
                key = %key,
                camel_key = %camel,
                replaces,
                "Provider keys collide after transcoding"
            );
            if !replaces {
                continue;
            }
        }
        out.insert(camel, transcode_keys(value));
    }
    out
}

/// Convert one key to camelCase
///
/// - `box_office` → `boxOffice`
/// - `Title` → `title`, `BoxOffice` → `boxOffice`
/// - `DVD` → `dvd`
/// - `imdbID` → `imdbID` (already camelCase)
///
/// Keys with characters outside `[A-Za-z0-9_]`, or a leading underscore,
/// are returned unchanged.
pub fn to_camel_case(key: &str) -> String {
    let supported = !key.is_empty()
        && !key.starts_with('_')
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !supported {
        return key.to_string();
    }

    if !key.contains('_') {
        return lower_leading(key);
    }

    let mut out = String::with_capacity(key.len());
    for (i, word) in key.split('_').filter(|w| !w.is_empty()).enumerate() {
        if i == 0 {
            out.push_str(&lower_leading(word));
        } else {
            out.push_str(&upper_first(&word.to_ascii_lowercase()));
        }
    }
    out
}

/// Lower the leading run of capitals, leaving the capital that starts the
/// next word (`URLPath` → `urlPath`)
fn lower_leading(word: &str) -> String {
    let upper_run = word.chars().take_while(|c| c.is_ascii_uppercase()).count();
    let len = word.chars().count();

    let lowered = match upper_run {
        0 => return word.to_string(),
        n if n == len => len,
        1 => 1,
        n => n - 1,
    };

    word.chars()
        .enumerate()
        .map(|(i, c)| if i < lowered { c.to_ascii_lowercase() } else { c })
        .collect()
}

fn upper_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}
