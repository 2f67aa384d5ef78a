//! Declarative dynamic leaves for template files
//!
//! JSON and YAML cannot carry closures, so template files describe dynamic leaves with
//! single-key objects whose key starts with `$`:
//!
//!     {"$sequence": [a, b, c]}                    yields a, b, c, then completes
//!     {"$cycle": [a, b]}                          yields a, b, a, b, ... forever
//!     {"$range": {"start": 0, "end": 10, "step": 2}}
//!                                                 0, 2, 4, 6, 8, then completes
//!                                                 (end is exclusive and optional)
//!     {"$repeat": {"value": v, "times": 3}}       yields v three times, then completes
//!     {"$timestamp": "millis" | "seconds"}        thunk: current unix time
//!     {"$literal": anything}                      inserts its argument verbatim
//!
//! Any other object, including one with several keys, is plain data and is interpreted
//! recursively. A lone `$`-key that is not listed above is an error, so typos surface early.

use super::leaf::Template;
use super::tree::{Map, Tree};
use super::value::Value;
use serde_json::Value as Json;
use std::time::{SystemTime, UNIX_EPOCH};

/// Problems found while interpreting directives
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectiveError {
    #[error("unknown directive `{name}` at `{path}`")]
    Unknown { name: String, path: String },

    #[error("directive `{name}` at `{path}` expects {expected}")]
    InvalidArgument {
        name: String,
        path: String,
        expected: &'static str,
    },
}

/// Turn a JSON document into a template, expanding directives
pub fn interpret(json: Json) -> Result<Template, DirectiveError> {
    interpret_at(json, "$")
}

fn interpret_at(json: Json, path: &str) -> Result<Template, DirectiveError> {
    match json {
        Json::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| interpret_at(item, &format!("{}[{}]", path, i)))
            .collect::<Result<Vec<_>, _>>()
            .map(Tree::Array),
        Json::Object(entries) => {
            if entries.len() == 1 {
                if let Some((name, argument)) = entries.iter().next() {
                    if name.starts_with('$') {
                        return directive(name, argument.clone(), path);
                    }
                }
            }
            entries
                .into_iter()
                .map(|(key, value)| {
                    let child = format!("{}.{}", path, key);
                    interpret_at(value, &child).map(|template| (key, template))
                })
                .collect::<Result<Map<_>, _>>()
                .map(Tree::Object)
        }
        other => Ok(Template::from(other)),
    }
}

fn directive(name: &str, argument: Json, path: &str) -> Result<Template, DirectiveError> {
    let invalid = |expected: &'static str| DirectiveError::InvalidArgument {
        name: name.to_string(),
        path: path.to_string(),
        expected,
    };
    match name {
        "$sequence" => {
            let items = values(argument).ok_or_else(|| invalid("an array"))?;
            Ok(Template::iter(move || items.clone()))
        }
        "$cycle" => {
            let items = values(argument)
                .filter(|items| !items.is_empty())
                .ok_or_else(|| invalid("a non-empty array"))?;
            Ok(Template::iter(move || items.clone().into_iter().cycle()))
        }
        "$range" => range(&argument)
            .ok_or_else(|| invalid("an object {start?, end?, step?} with a non-zero step")),
        "$repeat" => {
            let value = argument.get("value").cloned().map(Value::from);
            let times = argument
                .get("times")
                .and_then(Json::as_u64)
                .and_then(|times| usize::try_from(times).ok());
            match (value, times) {
                (Some(value), Some(times)) => Ok(Template::iter(move || {
                    std::iter::repeat(value.clone()).take(times)
                })),
                _ => Err(invalid("{value, times}")),
            }
        }
        "$timestamp" => match argument.as_str() {
            Some("millis") => Ok(Template::thunk(|| unix_time().as_millis() as u64)),
            Some("seconds") => Ok(Template::thunk(|| unix_time().as_secs())),
            _ => Err(invalid(r#""millis" or "seconds""#)),
        },
        "$literal" => Ok(Template::from(argument)),
        _ => Err(DirectiveError::Unknown {
            name: name.to_string(),
            path: path.to_string(),
        }),
    }
}

fn values(argument: Json) -> Option<Vec<Value>> {
    match argument {
        Json::Array(items) => Some(items.into_iter().map(Value::from).collect()),
        _ => None,
    }
}

fn range(argument: &Json) -> Option<Template> {
    let fields = argument.as_object()?;
    if fields
        .keys()
        .any(|key| !matches!(key.as_str(), "start" | "end" | "step"))
    {
        return None;
    }
    let field = |key: &str| fields.get(key);
    let all_integers = ["start", "end", "step"]
        .into_iter()
        .all(|key| field(key).map_or(true, |n| n.is_i64()));

    if all_integers {
        let start = field("start").and_then(Json::as_i64).unwrap_or(0);
        let end = field("end").and_then(Json::as_i64);
        let step = field("step").and_then(Json::as_i64).unwrap_or(1);
        if step == 0 {
            return None;
        }
        return Some(Template::iter(move || {
            std::iter::successors(Some(start), move |n| n.checked_add(step))
                .take_while(move |n| end.map_or(true, |end| if step > 0 { *n < end } else { *n > end }))
        }));
    }

    let number = |key: &str| -> Option<Option<f64>> {
        match field(key) {
            None => Some(None),
            Some(n) => n.as_f64().map(Some),
        }
    };
    let start = number("start")?.unwrap_or(0.0);
    let end = number("end")?;
    let step = number("step")?.unwrap_or(1.0);
    if step == 0.0 || !step.is_finite() {
        return None;
    }
    Some(Template::iter(move || {
        (0u64..)
            .map(move |i| start + step * i as f64)
            .take_while(move |n| end.map_or(true, |end| if step > 0.0 { *n < end } else { *n > end }))
    }))
}

fn unix_time() -> std::time::Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
}
