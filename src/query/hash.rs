//! Content hashing of requests

use serde_json::Value;

const FNV_OFFSET: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// FNV-1a, 32 bit
pub fn fnv1a_32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV_OFFSET, |hash, &b| {
        (hash ^ u32::from(b)).wrapping_mul(FNV_PRIME)
    })
}

/// Order-independent string rendering of a JSON value.
///
/// Object entries render as `key + value` and are sorted, array elements
/// are sorted, so equal contents give equal strings regardless of order.
pub fn sorted_json_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => {
            let mut parts: Vec<String> = items.iter().map(sorted_json_string).collect();
            parts.sort();
            format!("[{}]", parts.join(","))
        }
        Value::Object(map) => {
            let mut parts: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}{}", k, sorted_json_string(v)))
                .collect();
            parts.sort();
            format!("{{{}}}", parts.join(","))
        }
        Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => i.to_string(),
            (_, Some(u), _) => u.to_string(),
            (_, _, Some(f)) => format!("{:?}", f),
            _ => n.to_string(),
        },
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Null => "null".to_string(),
    }
}

/// Hash of a JSON object with some top-level keys ignored
pub fn query_hash(value: &Value, ignore_keys: &[&str]) -> u32 {
    let filtered = match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(k, _)| !ignore_keys.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        ),
        other => other.clone(),
    };
    fnv1a_32(sorted_json_string(&filtered).as_bytes())
}
