//! Change target paths and their application to plan documents.
//!
//! A target is a JSON Pointer (RFC 6901) into the serialized plan, e.g.
//! `/title` or `/structured/goals/0`. Inside arrays a segment may also be
//! written `@<key>`: it selects the element whose `id` field equals `<key>`,
//! or the string element equal to `<key>`. Paths recorded for rollbacks always
//! use the `@` form where the element allows it, so they survive reordering.

use serde_json::Value;
use thiserror::Error;

use crate::models::{ChangeOperation, RollbackData};

/// Top-level plan fields no change may touch.
const PROTECTED_FIELDS: &[&str] = &["id", "owner_id", "version", "created_at", "updated_at"];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PathError {
    #[error("malformed path '{0}'")]
    Malformed(String),
    #[error("field '{0}' cannot be changed")]
    Protected(String),
    #[error("nothing at '{0}'")]
    Missing(String),
    #[error("'{0}' does not address an element inside an object or array")]
    NotContainer(String),
    #[error("index {index} out of bounds at '{path}'")]
    OutOfBounds { path: String, index: usize },
}

/// Result of applying one operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    /// Value at the target before the edit
    pub previous: Option<Value>,
    /// Value at the target after the edit
    pub current: Option<Value>,
    /// Edit that restores the previous state
    pub inverse: Inverse,
}

/// Inverse of an applied edit, expressed against stable paths.
#[derive(Debug, Clone, PartialEq)]
pub struct Inverse {
    pub operation: ChangeOperation,
    pub target: String,
    pub value: Option<Value>,
}

impl Inverse {
    pub fn into_rollback_data(self, plan_version: u64) -> RollbackData {
        RollbackData {
            operation: self.operation,
            target: self.target,
            value: self.value,
            plan_version,
        }
    }
}

/// Splits a pointer into unescaped tokens.
pub fn parse(target: &str) -> Result<Vec<String>, PathError> {
    let rest = target
        .strip_prefix('/')
        .ok_or_else(|| PathError::Malformed(target.to_string()))?;
    let tokens: Vec<String> = rest
        .split('/')
        .map(|token| token.replace("~1", "/").replace("~0", "~"))
        .collect();
    if tokens.iter().any(String::is_empty) {
        return Err(PathError::Malformed(target.to_string()));
    }
    if PROTECTED_FIELDS.contains(&tokens[0].as_str()) {
        return Err(PathError::Protected(tokens[0].clone()));
    }
    Ok(tokens)
}

fn escape(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

fn join(tokens: &[String]) -> String {
    tokens.iter().map(|t| format!("/{}", escape(t))).collect()
}

fn matches_key(element: &Value, key: &str) -> bool {
    element.get("id").and_then(Value::as_str) == Some(key) || element.as_str() == Some(key)
}

/// Token that keeps addressing `element` if the array is reordered.
fn stable_token(element: &Value, index: usize) -> String {
    if let Some(id) = element.get("id").and_then(Value::as_str) {
        format!("@{id}")
    } else if let Some(s) = element.as_str() {
        format!("@{s}")
    } else {
        index.to_string()
    }
}

fn array_index(items: &[Value], token: &str, path: &str) -> Result<usize, PathError> {
    if let Some(key) = token.strip_prefix('@') {
        return items
            .iter()
            .position(|element| matches_key(element, key))
            .ok_or_else(|| PathError::Missing(path.to_string()));
    }
    let index = token
        .parse::<usize>()
        .map_err(|_| PathError::Malformed(path.to_string()))?;
    if index >= items.len() {
        return Err(PathError::OutOfBounds {
            path: path.to_string(),
            index,
        });
    }
    Ok(index)
}

/// Walks `tokens`, recording the stable form of every segment taken.
fn resolve_mut<'a>(
    mut node: &'a mut Value,
    tokens: &[String],
    canonical: &mut Vec<String>,
) -> Result<&'a mut Value, PathError> {
    for token in tokens {
        let path = join(canonical) + "/" + &escape(token);
        node = match node {
            Value::Object(map) => {
                canonical.push(token.clone());
                map.get_mut(token.as_str())
                    .ok_or_else(|| PathError::Missing(path))?
            }
            Value::Array(items) => {
                let index = array_index(items, token, &path)?;
                canonical.push(stable_token(&items[index], index));
                &mut items[index]
            }
            _ => return Err(PathError::NotContainer(path)),
        };
    }
    Ok(node)
}

/// Applies `operation` at `target` inside `doc`.
///
/// `value` is the new value for `add` and `modify` and is ignored by
/// `remove`.
pub fn apply(
    doc: &mut Value,
    operation: ChangeOperation,
    target: &str,
    value: &Value,
) -> Result<Applied, PathError> {
    let tokens = parse(target)?;
    let (last, parents) = tokens
        .split_last()
        .ok_or_else(|| PathError::Malformed(target.to_string()))?;
    let mut canonical = Vec::with_capacity(tokens.len());
    let parent = resolve_mut(doc, parents, &mut canonical)?;

    match operation {
        ChangeOperation::Add => add(parent, canonical, last, value, target),
        ChangeOperation::Modify => modify(parent, canonical, last, value, target),
        ChangeOperation::Remove => remove(parent, canonical, last, target),
    }
}

fn add(
    parent: &mut Value,
    mut canonical: Vec<String>,
    last: &str,
    value: &Value,
    target: &str,
) -> Result<Applied, PathError> {
    match parent {
        Value::Array(items) => {
            let index = if last == "-" {
                items.len()
            } else {
                let index = last
                    .parse::<usize>()
                    .map_err(|_| PathError::Malformed(target.to_string()))?;
                if index > items.len() {
                    return Err(PathError::OutOfBounds {
                        path: target.to_string(),
                        index,
                    });
                }
                index
            };
            items.insert(index, value.clone());
            canonical.push(stable_token(value, index));
            Ok(Applied {
                previous: None,
                current: Some(value.clone()),
                inverse: Inverse {
                    operation: ChangeOperation::Remove,
                    target: join(&canonical),
                    value: None,
                },
            })
        }
        Value::Object(map) => {
            // Adding to an existing array field appends to it.
            if let Some(Value::Array(items)) = map.get_mut(last) {
                canonical.push(last.to_string());
                let index = items.len();
                items.push(value.clone());
                canonical.push(stable_token(value, index));
                return Ok(Applied {
                    previous: None,
                    current: Some(value.clone()),
                    inverse: Inverse {
                        operation: ChangeOperation::Remove,
                        target: join(&canonical),
                        value: None,
                    },
                });
            }
            canonical.push(last.to_string());
            let previous = map.insert(last.to_string(), value.clone());
            let inverse = match &previous {
                Some(old) => Inverse {
                    operation: ChangeOperation::Modify,
                    target: join(&canonical),
                    value: Some(old.clone()),
                },
                None => Inverse {
                    operation: ChangeOperation::Remove,
                    target: join(&canonical),
                    value: None,
                },
            };
            Ok(Applied {
                previous,
                current: Some(value.clone()),
                inverse,
            })
        }
        _ => Err(PathError::NotContainer(target.to_string())),
    }
}

fn modify(
    parent: &mut Value,
    mut canonical: Vec<String>,
    last: &str,
    value: &Value,
    target: &str,
) -> Result<Applied, PathError> {
    let slot = resolve_mut(parent, &[last.to_string()], &mut canonical).map_err(|err| match err {
        PathError::Missing(_) => PathError::Missing(target.to_string()),
        other => other,
    })?;
    let previous = std::mem::replace(slot, value.clone());
    // Replacing a whole element can change its key; address the new one.
    if let Some(token) = canonical.last_mut().filter(|token| token.starts_with('@')) {
        if let Some(key) = value.get("id").and_then(Value::as_str).or(value.as_str()) {
            *token = format!("@{key}");
        }
    }
    Ok(Applied {
        previous: Some(previous.clone()),
        current: Some(value.clone()),
        inverse: Inverse {
            operation: ChangeOperation::Modify,
            target: join(&canonical),
            value: Some(previous),
        },
    })
}

fn remove(
    parent: &mut Value,
    mut canonical: Vec<String>,
    last: &str,
    target: &str,
) -> Result<Applied, PathError> {
    match parent {
        Value::Array(items) => {
            let index = array_index(items, last, target)?;
            let removed = items.remove(index);
            canonical.push(index.to_string());
            Ok(Applied {
                previous: Some(removed.clone()),
                current: None,
                inverse: Inverse {
                    operation: ChangeOperation::Add,
                    target: join(&canonical),
                    value: Some(removed),
                },
            })
        }
        Value::Object(map) => {
            let removed = map
                .remove(last)
                .ok_or_else(|| PathError::Missing(target.to_string()))?;
            canonical.push(last.to_string());
            Ok(Applied {
                previous: Some(removed.clone()),
                current: None,
                inverse: Inverse {
                    operation: ChangeOperation::Add,
                    target: join(&canonical),
                    value: Some(removed),
                },
            })
        }
        _ => Err(PathError::NotContainer(target.to_string())),
    }
}
