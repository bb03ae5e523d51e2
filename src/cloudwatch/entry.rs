//! Turning Logs Insights result rows into readable log entries.

use serde_json::{Map, Value};

use super::api::ResultField;

pub type LogEntry = Map<String, Value>;

/// Build a log entry from one result row.
///
/// `@timestamp` becomes `timestamp`, `@message` becomes `message` (parsed
/// as JSON when it looks like an object), other fields keep their names.
pub fn build_log_entry(row: &[ResultField]) -> LogEntry {
    let mut entry = LogEntry::new();
    for cell in row {
        match cell.field.as_str() {
            "@timestamp" => {
                entry.insert("timestamp".to_string(), Value::String(cell.value.clone()));
            }
            "@message" => {
                entry.insert("message".to_string(), parse_message(&cell.value));
            }
            other => {
                entry.insert(other.to_string(), Value::String(cell.value.clone()));
            }
        }
    }
    entry
}

fn parse_message(raw: &str) -> Value {
    let message = raw.replace('\n', "");
    if looks_like_object(&message)
        && let Ok(parsed) = serde_json::from_str::<Value>(&message)
    {
        return expand_nested_json(parsed);
    }
    Value::String(message)
}

/// Parse string values nested in objects that themselves hold JSON objects,
/// e.g. a `log` field carrying an application's structured log line.
///
/// Strings directly inside arrays are left alone, and a freshly parsed
/// value is not expanded further.
pub fn expand_nested_json(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| {
                    let value = match value {
                        nested @ (Value::Object(_) | Value::Array(_)) => expand_nested_json(nested),
                        Value::String(s) if looks_like_object(&s) => {
                            serde_json::from_str(&s).unwrap_or(Value::String(s))
                        }
                        other => other,
                    };
                    (key, value)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(expand_nested_json).collect()),
        other => other,
    }
}

fn looks_like_object(s: &str) -> bool {
    s.starts_with('{') && s.ends_with('}')
}
