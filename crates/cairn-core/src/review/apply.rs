//! Applying a single change to a plan.

use std::collections::HashSet;

use crate::{
    error::{CairnError, Result},
    models::{Change, Plan},
    path::{self, Applied},
};

/// Applies `change` to a copy of `plan`.
///
/// The result must still be a valid plan with unique item ids; otherwise the
/// change is rejected and `plan` is left as it was.
pub fn apply_change(plan: &Plan, change: &Change) -> Result<(Plan, Applied)> {
    let field = || format!("changes.{}", change.id);

    let mut doc = serde_json::to_value(plan)?;
    let applied = path::apply(&mut doc, change.operation, &change.target, &change.new_value)
        .map_err(|err| CairnError::invalid_input(field()).with_reason(err.to_string()))?;

    let tag_count = doc
        .pointer("/structured/tags")
        .and_then(serde_json::Value::as_array)
        .map(Vec::len);

    let mut next: Plan = serde_json::from_value(doc).map_err(|err| {
        CairnError::invalid_input(field()).with_reason(format!(
            "{} {} leaves the plan invalid: {err}",
            change.operation.as_str(),
            change.target
        ))
    })?;

    // Tags are a set; a change that collapses into an existing tag has no inverse.
    if tag_count.is_some_and(|count| count != next.structured.tags.len()) {
        return Err(CairnError::invalid_input(field()).with_reason(format!(
            "{} {} would duplicate an existing tag",
            change.operation.as_str(),
            change.target
        )));
    }

    let mut seen = HashSet::new();
    if let Some(duplicate) = next
        .structured
        .items
        .iter()
        .find(|item| !seen.insert(item.id.as_str()))
    {
        return Err(CairnError::invalid_input(field())
            .with_reason(format!("item id {} is already in use", duplicate.id)));
    }

    next.reindex_items();
    Ok((next, applied))
}
