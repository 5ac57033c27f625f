use serde::Serialize;
use serde_json::{Map, Value};

/// Headers that are safe and useful to show in HTTP debug output.
pub const DEFAULT_HTTP_HEADERS: [&str; 6] = [
    "Accept",
    "Content-Type",
    "Content-Length",
    "User-Agent",
    "Date",
    "Referrer-Policy",
];

/// Renders a serialisable input model as `[key: value, ...]`.
///
/// Keys are sorted, empty values (null, "", [] and {}) are dropped. Zero numbers
/// and `false` are kept since they are meaningful on update commands.
pub fn build_debug_str_from_input_model<T: Serialize>(model: &T) -> Result<String, serde_json::Error> {
    match serde_json::to_value(model)? {
        Value::Object(map) => Ok(build_debug_str_from_map(&map)),
        other => Ok(format_value(&other)),
    }
}

pub fn build_debug_str_from_map(map: &Map<String, Value>) -> String {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();

    let parts: Vec<String> = keys
        .into_iter()
        .filter_map(|k| {
            let v = &map[k.as_str()];
            if is_empty(v) {
                None
            } else {
                Some(format!("{}: {}", k, format_value(v)))
            }
        })
        .collect();
    format!("[{}]", parts.join(", "))
}

/// Renders the allowed subset of `headers` in the same bracketed form.
pub fn build_debug_str_from_headers<'a, I>(headers: I, include: &[&str]) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut map = Map::new();
    for (name, value) in headers {
        if let Some(canonical) = include.iter().find(|h| h.eq_ignore_ascii_case(name)) {
            map.insert(canonical.to_string(), Value::String(value.to_string()));
        }
    }
    build_debug_str_from_map(&map)
}

/// Renders a request or response body, expanding JSON objects.
pub fn build_debug_str_from_body(body: &[u8]) -> String {
    if body.is_empty() {
        return String::new();
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => build_debug_str_from_map(&map),
        Ok(other) => format_value(&other),
        Err(_) => String::from_utf8_lossy(body).into_owned(),
    }
}

fn is_empty(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(m) => m.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

fn format_value(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(format_value).collect();
            format!("[{}]", parts.join(", "))
        }
        Value::Object(map) => build_debug_str_from_map(map),
    }
}
