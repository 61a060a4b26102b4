//! Results of fetching: collected descriptions, isolated failures and notices.
//!
//! Item-level failures never abort a fetch. They are recorded here next to the
//! descriptions that did load, so callers can show both.

use std::collections::HashSet;

use crate::error::AppError;
use crate::models::Description;
use crate::normalize::Notice;

/// An item that was skipped.
#[derive(Debug)]
pub struct ItemFailure {
    /// URL of the file, or `URL!entry` for an archive entry.
    pub origin: String,
    pub error: AppError,
}

/// Per-provider counters.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProviderSummary {
    pub provider_id: String,
    pub loaded: usize,
    pub skipped: usize,
}

/// Aggregated outcome of one or more fetches.
///
/// Full ids are kept unique: the first description with a given full id wins and
/// later ones are recorded as `AppError::DuplicateDescription` failures.
#[derive(Debug, Default)]
pub struct FetchReport {
    pub descriptions: Vec<Description>,
    pub failures: Vec<ItemFailure>,
    pub notices: Vec<Notice>,
    pub providers: Vec<ProviderSummary>,
    /// Origin of each entry of `descriptions`, at the same index.
    origins: Vec<String>,
    full_ids: HashSet<String>,
}

impl FetchReport {
    /// Creates a new empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a description unless its full id is already present.
    ///
    /// Returns false, and records a failure against `origin`, for a duplicate.
    pub fn add_description(&mut self, description: Description, origin: &str) -> bool {
        let full_id = description.full_id();
        if self.full_ids.contains(&full_id) {
            self.add_failure(origin, AppError::DuplicateDescription(full_id));
            return false;
        }
        self.full_ids.insert(full_id);
        self.descriptions.push(description);
        self.origins.push(origin.to_string());
        true
    }

    /// Records a skipped item.
    pub fn add_failure(&mut self, origin: impl Into<String>, error: AppError) {
        self.failures.push(ItemFailure {
            origin: origin.into(),
            error,
        });
    }

    /// Returns the URL, or `URL!entry`, the description at `index` was loaded from.
    pub fn origin(&self, index: usize) -> Option<&str> {
        self.origins.get(index).map(String::as_str)
    }

    /// Appends another report, keeping its order and re-checking full ids.
    ///
    /// A description dropped as a duplicate is moved from `loaded` to `skipped` in
    /// the summary of the provider in `other` that produced it.
    pub fn merge(&mut self, other: FetchReport) {
        let FetchReport {
            descriptions,
            failures,
            notices,
            mut providers,
            origins,
            ..
        } = other;

        for (description, origin) in descriptions.into_iter().zip(origins) {
            let provider_id = description.provider_id.clone();
            if self.add_description(description, &origin) {
                continue;
            }
            let owner = providers
                .iter_mut()
                .rev()
                .find(|summary| provider_id.as_deref() == Some(summary.provider_id.as_str()));
            if let Some(summary) = owner {
                summary.loaded = summary.loaded.saturating_sub(1);
                summary.skipped += 1;
            }
        }
        self.failures.extend(failures);
        self.notices.extend(notices);
        self.providers.extend(providers);
    }

    /// Returns the number of loaded descriptions.
    pub fn loaded_count(&self) -> usize {
        self.descriptions.len()
    }

    /// Returns the number of skipped items.
    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }

    /// Returns true if nothing was skipped.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
