//! EDITS Core - Provider registry, fetch pipeline, normalization and search.
//!
//! This crate turns provider records into validated [`Provider`]s, retrieves their
//! `.yaml` documents and `.zip` archives through a [`RemoteFetcher`], normalizes each
//! document into a [`Description`] and searches the resulting collection.
//!
//! - **Registry**: [`load_providers`], [`find_provider`]
//! - **Extraction**: [`archive::extract`]
//! - **Normalization**: [`normalize()`], with legacy field renames
//! - **Pipeline**: [`FetchPipeline`], isolating per-item failures in a [`FetchReport`]
//! - **Search**: [`search()`] over dimension or measure codes
//!
//! The HTTP implementation of [`RemoteFetcher`] lives in the `edits-client` crate.

pub mod archive;
pub mod config;
pub mod error;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod progress;
pub mod registry;
pub mod report;
pub mod search;
pub mod traits;

// Configuration
pub use config::{
    default_providers_path, load_provider_entries, parse_provider_entries, FetchConfig,
    HttpConfig,
};

// Error handling
pub use error::{AppError, YamlLocation};

// Domain models
pub use models::{Contact, Description, Descriptor, Facets, Provider};

// Normalization
pub use normalize::{load_document, normalize, Normalized, Notice, NoticeKind, RawFields};

// Pipeline and results
pub use archive::{ArchiveEntry, EntryError};
pub use pipeline::{FetchPipeline, FileKind};
pub use report::{FetchReport, ItemFailure, ProviderSummary};

// Progress reporting
pub use progress::{FetchEvent, ProgressReporter, SilentReporter, TracingReporter};

// Registry
pub use registry::{find_provider, load_providers};

// Search
pub use search::{run_query, search, search_by_name, Query, QueryKind, SearchHit};

// Traits for dependency injection
pub use traits::RemoteFetcher;
