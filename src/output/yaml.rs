//! Block-style YAML with indented sequences.
//!
//! serde_yaml puts sequence items flush with their parent key; this emitter
//! indents them by two spaces and leaves scalar quoting to serde_yaml.

use serde::Serialize;
use serde_yaml::Value;

const INDENT: usize = 2;

pub fn to_string<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_yaml::Error> {
    let value = serde_yaml::to_value(value)?;
    let mut out = String::new();
    match &value {
        Value::Mapping(m) if !m.is_empty() => emit_mapping(m, 0, &mut out)?,
        Value::Sequence(s) if !s.is_empty() => emit_sequence(s, 0, &mut out)?,
        other => {
            out.push_str(&scalar(other)?);
            out.push('\n');
        }
    }
    Ok(out)
}

fn emit_mapping(map: &serde_yaml::Mapping, indent: usize, out: &mut String) -> Result<(), serde_yaml::Error> {
    let pad = " ".repeat(indent);
    for (k, v) in map {
        let key = scalar(k)?;
        match v {
            Value::Mapping(m) if !m.is_empty() => {
                out.push_str(&format!("{}{}:\n", pad, key));
                emit_mapping(m, indent + INDENT, out)?;
            }
            Value::Sequence(s) if !s.is_empty() => {
                out.push_str(&format!("{}{}:\n", pad, key));
                emit_sequence(s, indent + INDENT, out)?;
            }
            Value::Tagged(t) => {
                out.push_str(&format!("{}{}: {}\n", pad, key, scalar(&t.value)?));
            }
            other => out.push_str(&format!("{}{}: {}\n", pad, key, scalar(other)?)),
        }
    }
    Ok(())
}

fn emit_sequence(seq: &[Value], indent: usize, out: &mut String) -> Result<(), serde_yaml::Error> {
    let pad = " ".repeat(indent);
    for item in seq {
        let nested = match item {
            Value::Mapping(m) if !m.is_empty() => {
                let mut s = String::new();
                emit_mapping(m, indent + INDENT, &mut s)?;
                Some(s)
            }
            Value::Sequence(inner) if !inner.is_empty() => {
                let mut s = String::new();
                emit_sequence(inner, indent + INDENT, &mut s)?;
                Some(s)
            }
            _ => None,
        };
        match nested {
            // The first nested line shares the dash line.
            Some(s) => {
                out.push_str(&pad);
                out.push_str("- ");
                out.push_str(&s[indent + INDENT..]);
            }
            None => out.push_str(&format!("{}- {}\n", pad, scalar(item)?)),
        }
    }
    Ok(())
}

fn scalar(v: &Value) -> Result<String, serde_yaml::Error> {
    match v {
        Value::Mapping(m) if m.is_empty() => Ok("{}".to_string()),
        Value::Sequence(s) if s.is_empty() => Ok("[]".to_string()),
        Value::String(s) if s.contains('\n') => {
            Ok(serde_json::to_string(s).unwrap_or_else(|_| format!("{:?}", s)))
        }
        Value::Tagged(t) => scalar(&t.value),
        other => Ok(serde_yaml::to_string(other)?.trim_end().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sequences_are_indented() {
        let v = json!({"id": "x", "acl": ["1.2.3.0/24", "10.0.0.0/8"], "storage": {"size": 10}});
        let out = to_string(&v).unwrap();
        assert!(out.contains("acl:\n  - 1.2.3.0/24\n  - 10.0.0.0/8\n"), "{}", out);
        assert!(out.contains("storage:\n  size: 10\n"), "{}", out);
    }

    #[test]
    fn sequence_of_mappings() {
        let v = json!([{"id": "a", "name": "one"}, {"id": "b", "tags": ["t"]}]);
        let out = to_string(&v).unwrap();
        assert_eq!(out, "- id: a\n  name: one\n- id: b\n  tags:\n    - t\n");
    }

    #[test]
    fn empty_collections_and_quoting() {
        assert_eq!(to_string(&json!([])).unwrap(), "[]\n");
        let out = to_string(&json!({"a": [], "b": "true", "c": "plain"})).unwrap();
        assert!(out.contains("a: []\n"));
        assert!(out.contains("b: 'true'\n"), "{}", out);
        assert!(out.contains("c: plain\n"));
    }
}
