// Request introspection
// Extracts the method, path and decoded query parameters from a request head

use hyper::{Method, Uri};
use serde::Serialize;
use std::collections::BTreeMap;

/// Decoded query string, keyed by parameter name
pub type QueryParams = BTreeMap<String, QueryValue>;

/// A single query parameter value
///
/// `key[]=a&key[]=b` collects into a list, `key[x]=a&key[y]=b` into a map,
/// every other key keeps its last value.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum QueryValue {
    Single(String),
    List(Vec<String>),
    Map(BTreeMap<String, String>),
}

/// Request-scoped view of an inbound HTTP request
#[derive(Debug, Clone)]
pub struct IncomingRequest {
    pub method: Method,
    pub path: String,
    pub query: QueryParams,
}

impl IncomingRequest {
    pub fn from_parts(method: &Method, uri: &Uri) -> Self {
        Self {
            method: method.clone(),
            path: uri.path().to_string(),
            query: parse_query(uri.query()),
        }
    }
}

/// Decode an `application/x-www-form-urlencoded` query string
///
/// Key names follow the form-variable rules web runtimes apply: `.` and
/// space in the name become `_`, `name[]` appends, `name[sub]` sets a
/// member, and an unclosed `[` is treated as `_`. Only the first bracket
/// level is honoured.
pub fn parse_query(raw: Option<&str>) -> QueryParams {
    let mut params = QueryParams::new();
    let Some(raw) = raw else {
        return params;
    };

    for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
        let Some(key) = parse_key(&key) else {
            continue;
        };
        let value = value.into_owned();

        match key {
            ParsedKey::Plain(name) => {
                params.insert(name, QueryValue::Single(value));
            }
            ParsedKey::Nested(name, sub) => insert_nested(&mut params, name, sub, value),
        }
    }

    params
}

#[derive(Debug, PartialEq, Eq)]
enum ParsedKey {
    Plain(String),
    /// `name[sub]`, `sub` empty for `name[]`
    Nested(String, String),
}

/// Split a raw key into its name and optional bracket member.
///
/// Returns `None` for keys with an empty name.
fn parse_key(raw: &str) -> Option<ParsedKey> {
    let open = raw.find('[');
    let name_end = open.unwrap_or(raw.len());
    if name_end == 0 {
        return None;
    }

    let closed = open.and_then(|i| raw[i + 1..].find(']').map(|j| (i, i + 1 + j)));
    match closed {
        Some((i, j)) => Some(ParsedKey::Nested(
            normalize_name(&raw[..i]),
            raw[i + 1..j].to_string(),
        )),
        None => Some(ParsedKey::Plain(normalize_name(&raw.replacen('[', "_", 1)))),
    }
}

fn normalize_name(name: &str) -> String {
    name.replace(['.', ' '], "_")
}

fn insert_nested(params: &mut QueryParams, name: String, sub: String, value: String) {
    let slot = params
        .entry(name)
        .or_insert_with(|| QueryValue::List(Vec::new()));

    let replacement = match slot {
        QueryValue::Single(_) if sub.is_empty() => Some(QueryValue::List(vec![value])),
        QueryValue::Single(_) => Some(QueryValue::Map(BTreeMap::from([(sub, value)]))),
        QueryValue::List(values) if sub.is_empty() => {
            values.push(value);
            None
        }
        QueryValue::List(values) => {
            // Mixing `name[]` and `name[sub]` turns the list into an indexed map
            let mut map: BTreeMap<String, String> = std::mem::take(values)
                .into_iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect();
            map.insert(sub, value);
            Some(QueryValue::Map(map))
        }
        QueryValue::Map(map) => {
            let key = if sub.is_empty() { next_index(map).to_string() } else { sub };
            map.insert(key, value);
            None
        }
    };

    if let Some(replacement) = replacement {
        *slot = replacement;
    }
}

/// Next free integer key of a map built from mixed bracket keys
fn next_index(map: &BTreeMap<String, String>) -> usize {
    map.keys()
        .filter_map(|k| k.parse::<usize>().ok())
        .max()
        .map_or(0, |max| max + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(s: &str) -> QueryValue {
        QueryValue::Single(s.to_string())
    }

    #[test]
    fn test_from_parts() {
        let uri: Uri = "/search?q=rust&page=2".parse().unwrap();
        let req = IncomingRequest::from_parts(&Method::POST, &uri);
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.path, "/search");
        assert_eq!(req.query.get("q"), Some(&single("rust")));
        assert_eq!(req.query.get("page"), Some(&single("2")));
    }

    #[test]
    fn test_no_query() {
        assert!(parse_query(None).is_empty());
        assert!(parse_query(Some("")).is_empty());
    }

    #[test]
    fn test_percent_and_plus_decoding() {
        let params = parse_query(Some("name=hello+world&city=S%C3%A3o%20Paulo"));
        assert_eq!(params.get("name"), Some(&single("hello world")));
        assert_eq!(params.get("city"), Some(&single("São Paulo")));
    }

    #[test]
    fn test_repeated_key_keeps_last() {
        let params = parse_query(Some("a=1&a=2"));
        assert_eq!(params.get("a"), Some(&single("2")));
    }

    #[test]
    fn test_bracket_keys_collect_list() {
        let params = parse_query(Some("tag[]=x&tag[]=y&other=z"));
        assert_eq!(
            params.get("tag"),
            Some(&QueryValue::List(vec!["x".to_string(), "y".to_string()]))
        );
        assert_eq!(params.get("other"), Some(&single("z")));
    }

    #[test]
    fn test_bracket_keys_collect_map() {
        let params = parse_query(Some("a[x]=1&a[y]=2&b.c=3&first name=Ada"));
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            serde_json::json!({"a": {"x": "1", "y": "2"}, "b_c": "3", "first_name": "Ada"})
        );
    }

    #[test]
    fn test_mixed_bracket_keys() {
        let params = parse_query(Some("m[]=a&m[k]=b&m[]=c"));
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            serde_json::json!({"m": {"0": "a", "k": "b", "1": "c"}})
        );

        // A plain key after bracket keys replaces them, and the reverse
        let params = parse_query(Some("p[]=1&p=2&q=1&q[z]=2"));
        assert_eq!(params.get("p"), Some(&single("2")));
        assert_eq!(
            params.get("q"),
            Some(&QueryValue::Map(BTreeMap::from([("z".to_string(), "2".to_string())])))
        );
    }

    #[test]
    fn test_key_name_edge_cases() {
        assert_eq!(parse_key("[]"), None);
        assert_eq!(parse_key("[x]"), None);
        assert_eq!(parse_key("a[b"), Some(ParsedKey::Plain("a_b".to_string())));
        assert_eq!(
            parse_key("a.b[c.d]"),
            Some(ParsedKey::Nested("a_b".to_string(), "c.d".to_string()))
        );
        assert_eq!(
            parse_key("a[x][y]"),
            Some(ParsedKey::Nested("a".to_string(), "x".to_string()))
        );
    }

    #[test]
    fn test_flag_and_empty_keys() {
        let params = parse_query(Some("debug&=ignored&[]=also"));
        assert_eq!(params.get("debug"), Some(&single("")));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_serializes_as_plain_json() {
        let params = parse_query(Some("foo=bar&ids[]=1&ids[]=2"));
        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(json, r#"{"foo":"bar","ids":["1","2"]}"#);
    }
}
