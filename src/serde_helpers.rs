//! Lenient deserialization for REST bodies and gateway payloads.
//!
//! The gateway adds fields to its payloads without notice, so unknown fields are never an
//! error. When the `tracing` feature is enabled they are logged, which makes protocol drift
//! visible without breaking the session.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Deserializes `value` into `T`, logging unknown fields (and the failing path on error) when
/// the `tracing` feature is enabled.
#[cfg(feature = "tracing")]
pub fn deserialize_with_warnings<T: DeserializeOwned>(value: Value) -> crate::Result<T> {
    use std::any::type_name;

    tracing::trace!(
        type_name = %type_name::<T>(),
        json = %value,
        "deserializing JSON"
    );

    let original = value.clone();
    let mut unknown_paths: Vec<String> = Vec::new();

    let result: T = serde_ignored::deserialize(value, |path| {
        unknown_paths.push(path.to_string());
    })
    .inspect_err(|_| {
        let path_result: Result<T, _> = serde_path_to_error::deserialize(&original);
        if let Err(path_err) = path_result {
            let path = path_err.path().to_string();
            tracing::error!(
                type_name = %type_name::<T>(),
                path = %path,
                value = %format_value(lookup_value(&original, &path)),
                error = %path_err.inner(),
                "deserialization failed"
            );
        }
    })?;

    for path in unknown_paths {
        tracing::debug!(
            type_name = %type_name::<T>(),
            field = %path,
            value = %format_value(lookup_value(&original, &path)),
            "unknown field in payload"
        );
    }

    Ok(result)
}

/// Pass-through deserialization when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub fn deserialize_with_warnings<T: DeserializeOwned>(value: Value) -> crate::Result<T> {
    Ok(serde_json::from_value(value)?)
}

/// Resolves a `serde_ignored`/`serde_path_to_error` path (`author.id`, `items[0].name`,
/// `?.field`) against `value` by rewriting it into a JSON pointer.
#[cfg(feature = "tracing")]
fn lookup_value<'value>(value: &'value Value, path: &str) -> Option<&'value Value> {
    let pointer: String = path
        .replace('[', ".")
        .replace(']', "")
        .split('.')
        .filter(|segment| !segment.is_empty() && *segment != "?")
        .fold(String::new(), |mut pointer, segment| {
            pointer.push('/');
            pointer.push_str(&segment.replace('~', "~0").replace('/', "~1"));
            pointer
        });

    value.pointer(&pointer)
}

/// Formats a looked-up value for log output, truncating long strings.
#[cfg(feature = "tracing")]
fn format_value(value: Option<&Value>) -> String {
    const MAX_LEN: usize = 120;

    match value {
        None => "<unavailable>".to_owned(),
        Some(Value::String(s)) if s.chars().count() > MAX_LEN => {
            let truncated: String = s.chars().take(MAX_LEN).collect();
            format!("\"{truncated}...\"")
        }
        Some(v) => v.to_string(),
    }
}
