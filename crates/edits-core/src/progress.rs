//! Progress reporting for the fetch pipeline.
//!
//! The pipeline never prints. It emits [`FetchEvent`]s to a [`ProgressReporter`]
//! supplied by the caller, so the CLI can log them while tests stay silent.

use crate::error::AppError;
use crate::normalize::Notice;

/// Something that happened while fetching a provider.
#[derive(Debug)]
pub enum FetchEvent<'a> {
    ProviderStarted {
        provider_id: &'a str,
        file_count: usize,
    },
    FileStarted {
        url: &'a str,
    },
    ItemLoaded {
        full_id: &'a str,
    },
    /// An item was skipped; the error explains why.
    ItemSkipped {
        origin: &'a str,
        error: &'a AppError,
    },
    Notice(&'a Notice),
    ProviderCompleted {
        provider_id: &'a str,
        loaded: usize,
        skipped: usize,
    },
}

/// Receives pipeline events. All methods default to doing nothing.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: FetchEvent<'_>) {
        let _ = event;
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}

/// Forwards events to `tracing`: skips as warnings, everything else as info or debug.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ProgressReporter for TracingReporter {
    fn report(&self, event: FetchEvent<'_>) {
        match event {
            FetchEvent::ProviderStarted {
                provider_id,
                file_count,
            } => tracing::info!("{}: fetching {} file(s)", provider_id, file_count),
            FetchEvent::FileStarted { url } => tracing::debug!("Fetching {}", url),
            FetchEvent::ItemLoaded { full_id } => tracing::debug!("Loaded {}", full_id),
            FetchEvent::ItemSkipped { origin, error } => {
                tracing::warn!("{} when loading:\n  {}\n…skipping.", error, origin)
            }
            FetchEvent::Notice(notice) => tracing::info!("{}", notice),
            FetchEvent::ProviderCompleted {
                provider_id,
                loaded,
                skipped,
            } => tracing::info!(
                "{}: retrieved {} description(s), skipped {}",
                provider_id,
                loaded,
                skipped
            ),
        }
    }
}
