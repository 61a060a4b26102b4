//! Provider registry: validates raw provider records from configuration.

use std::collections::HashSet;

use serde_yaml::Value;

use crate::error::AppError;
use crate::models::{Contact, Provider};

/// Validates provider records, optionally keeping only the requested ids.
///
/// Entries whose `id` is not in `ids` are skipped before validation, so a broken
/// record only fails the call when it was asked for. Input order is preserved.
///
/// # Errors
///
/// Returns `AppError::MalformedProvider` for the first retained entry missing `id`,
/// `contact` or `files`, or whose `files` is not a non-empty list of strings.
/// Returns `AppError::DuplicateProvider` if two retained entries share an id.
///
/// # Examples
///
/// ```
/// use edits_core::registry::load_providers;
///
/// let raw: Vec<serde_yaml::Value> = serde_yaml::from_str(
///     "- id: acme\n  contact: {name: Jo, email: jo@example.org}\n  files: [https://x/a.yaml]\n",
/// )
/// .unwrap();
///
/// let providers = load_providers(&raw, None).unwrap();
/// assert_eq!(providers[0].id, "acme");
/// ```
pub fn load_providers(
    raw_entries: &[Value],
    ids: Option<&HashSet<String>>,
) -> Result<Vec<Provider>, AppError> {
    let mut seen = HashSet::new();
    let mut result = Vec::new();

    for (index, entry) in raw_entries.iter().enumerate() {
        if let Some(ids) = ids.filter(|ids| !ids.is_empty()) {
            let requested = entry
                .get("id")
                .and_then(Value::as_str)
                .is_some_and(|id| ids.contains(id));
            if !requested {
                continue;
            }
        }

        let provider = check_entry(index, entry)?;
        if !seen.insert(provider.id.clone()) {
            return Err(AppError::DuplicateProvider(provider.id));
        }
        result.push(provider);
    }

    tracing::debug!("Loaded {} provider(s)", result.len());
    Ok(result)
}

/// Returns the single provider entry with the given id.
///
/// # Errors
///
/// Returns `AppError::ProviderNotFound` if no entry has this id and
/// `AppError::DuplicateProvider` if more than one does.
pub fn find_provider(raw_entries: &[Value], id: &str) -> Result<Provider, AppError> {
    let ids = HashSet::from([id.to_string()]);
    // load_providers rejects a second entry with this id, so at most one is left
    load_providers(raw_entries, Some(&ids))?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::ProviderNotFound(id.to_string()))
}

/// Checks one raw record against the provider schema.
fn check_entry(index: usize, entry: &Value) -> Result<Provider, AppError> {
    let label = match entry.get("id").and_then(Value::as_str) {
        Some(id) => format!("#{} ('{}')", index, id),
        None => format!("#{}", index),
    };
    let malformed = |reason: String| AppError::MalformedProvider {
        entry: label.clone(),
        reason,
    };

    if !entry.is_mapping() {
        return Err(malformed("entry is not a mapping".to_string()));
    }

    for key in ["id", "contact", "files"] {
        if entry.get(key).is_none_or(Value::is_null) {
            return Err(malformed(format!("missing '{}' key", key)));
        }
    }

    let id = entry["id"]
        .as_str()
        .ok_or_else(|| malformed("'id' is not a string".to_string()))?
        .to_string();

    let files = entry["files"]
        .as_sequence()
        .and_then(|files| {
            files
                .iter()
                .map(|f| f.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
        })
        .ok_or_else(|| {
            malformed(format!(
                "'files' key is not a list of strings: {:?}",
                entry["files"]
            ))
        })?;

    if files.is_empty() {
        return Err(malformed("'files' list is empty".to_string()));
    }

    Ok(Provider {
        id,
        contact: contact_from(&entry["contact"]),
        files,
    })
}

fn contact_from(value: &Value) -> Contact {
    match value {
        Value::String(name) => Contact {
            name: Some(name.clone()),
            email: None,
        },
        _ => Contact {
            name: value.get("name").and_then(Value::as_str).map(str::to_string),
            email: value.get("email").and_then(Value::as_str).map(str::to_string),
        },
    }
}
