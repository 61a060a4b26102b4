//! Fetch pipeline: retrieves provider files and turns them into descriptions.
//!
//! Every file, archive entry and document is handled on its own: a failure is
//! recorded in the [`FetchReport`] and processing moves on to the next sibling.

use std::path::Path;

use futures::stream::{self, StreamExt};
use url::Url;

use crate::archive;
use crate::config::FetchConfig;
use crate::error::AppError;
use crate::models::Provider;
use crate::normalize::{self, Normalized};
use crate::progress::{FetchEvent, ProgressReporter, SilentReporter};
use crate::report::{FetchReport, ProviderSummary};
use crate::traits::RemoteFetcher;

/// Kind of a provider file, decided by the suffix of its URL path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// A single YAML document.
    Yaml,
    /// A ZIP archive of YAML documents.
    Zip,
}

impl FileKind {
    /// Classifies `url` by the suffix of its path; any query string is ignored.
    ///
    /// ```
    /// use edits_core::pipeline::FileKind;
    ///
    /// assert_eq!(FileKind::of("https://x.org/a.yaml?raw=1").unwrap(), FileKind::Yaml);
    /// assert_eq!(FileKind::of("https://x.org/meta.zip").unwrap(), FileKind::Zip);
    /// assert!(FileKind::of("https://x.org/data.csv").is_err());
    /// ```
    pub fn of(url: &str) -> Result<Self, AppError> {
        let path = url_path(url);
        if path.ends_with(".yaml") {
            Ok(FileKind::Yaml)
        } else if path.ends_with(".zip") {
            Ok(FileKind::Zip)
        } else {
            Err(AppError::UnsupportedFileType(url.to_string()))
        }
    }
}

/// Path component of a URL, or the string itself when it is not an absolute URL.
fn url_path(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.to_string(),
    }
}

/// File name without directories or extension.
fn file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Orchestrates retrieval, extraction and normalization for providers.
///
/// # Examples
///
/// ```no_run
/// use edits_core::pipeline::FetchPipeline;
/// use edits_core::progress::TracingReporter;
/// # use edits_core::{Provider, RemoteFetcher};
/// # async fn example<F: RemoteFetcher>(fetcher: F, providers: Vec<Provider>) {
/// let pipeline = FetchPipeline::new(fetcher);
/// let report = pipeline
///     .fetch_all_with_progress(&providers, &TracingReporter)
///     .await;
/// println!("Total {} descriptions.", report.loaded_count());
/// # }
/// ```
pub struct FetchPipeline<F> {
    fetcher: F,
    config: FetchConfig,
}

impl<F: RemoteFetcher> FetchPipeline<F> {
    pub fn new(fetcher: F) -> Self {
        Self::with_config(fetcher, FetchConfig::default())
    }

    pub fn with_config(fetcher: F, config: FetchConfig) -> Self {
        Self { fetcher, config }
    }

    /// Fetches every provider, reporting in provider order, then file order,
    /// then archive entry order.
    pub async fn fetch_all(&self, providers: &[Provider]) -> FetchReport {
        self.fetch_all_with_progress(providers, &SilentReporter).await
    }

    /// Like [`fetch_all`](Self::fetch_all), emitting events to `reporter`.
    ///
    /// Up to `FetchConfig::concurrency` providers are in flight at once; results are
    /// still merged in input order.
    pub async fn fetch_all_with_progress(
        &self,
        providers: &[Provider],
        reporter: &dyn ProgressReporter,
    ) -> FetchReport {
        let reports: Vec<FetchReport> = stream::iter(providers)
            .map(|provider| self.fetch_provider_with_progress(provider, reporter))
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await;

        let mut all = FetchReport::new();
        for report in reports {
            all.merge(report);
        }
        all
    }

    /// Fetches every file of one provider, in declared order.
    pub async fn fetch_provider(&self, provider: &Provider) -> FetchReport {
        self.fetch_provider_with_progress(provider, &SilentReporter)
            .await
    }

    /// Like [`fetch_provider`](Self::fetch_provider), emitting events to `reporter`.
    pub async fn fetch_provider_with_progress(
        &self,
        provider: &Provider,
        reporter: &dyn ProgressReporter,
    ) -> FetchReport {
        reporter.report(FetchEvent::ProviderStarted {
            provider_id: &provider.id,
            file_count: provider.files.len(),
        });

        let mut report = FetchReport::new();
        for url in &provider.files {
            self.fetch_into(url, provider, reporter, &mut report).await;
        }

        let summary = ProviderSummary {
            provider_id: provider.id.clone(),
            loaded: report.loaded_count(),
            skipped: report.failed_count(),
        };
        reporter.report(FetchEvent::ProviderCompleted {
            provider_id: &summary.provider_id,
            loaded: summary.loaded,
            skipped: summary.skipped,
        });
        report.providers.push(summary);
        report
    }

    /// Fetches a single file on behalf of `provider`.
    pub async fn fetch_file(&self, url: &str, provider: &Provider) -> FetchReport {
        self.fetch_file_with_progress(url, provider, &SilentReporter)
            .await
    }

    /// Like [`fetch_file`](Self::fetch_file), emitting events to `reporter`.
    pub async fn fetch_file_with_progress(
        &self,
        url: &str,
        provider: &Provider,
        reporter: &dyn ProgressReporter,
    ) -> FetchReport {
        let mut report = FetchReport::new();
        self.fetch_into(url, provider, reporter, &mut report).await;
        report
    }

    async fn fetch_into(
        &self,
        url: &str,
        provider: &Provider,
        reporter: &dyn ProgressReporter,
        report: &mut FetchReport,
    ) {
        reporter.report(FetchEvent::FileStarted { url });

        let kind = match FileKind::of(url) {
            Ok(kind) => kind,
            Err(e) => return skip(report, reporter, url, e),
        };

        let bytes = match self.fetcher.fetch(url).await {
            Ok(bytes) => bytes,
            Err(e) => return skip(report, reporter, url, e),
        };

        match kind {
            FileKind::Yaml => {
                let id = file_stem(&url_path(url));
                load_into(report, reporter, &bytes, url, &id, &provider.id);
            }
            FileKind::Zip => {
                let entries = match archive::extract(&bytes) {
                    Ok(entries) => entries,
                    Err(e) => return skip(report, reporter, url, e),
                };
                let prefix = provider.slug();

                for entry in entries {
                    match entry {
                        Ok(entry) => {
                            let origin = format!("{}!{}", url, entry.name);
                            let id = format!("{}/{}", prefix, file_stem(&entry.name));
                            load_into(
                                report,
                                reporter,
                                &entry.bytes,
                                &origin,
                                &id,
                                &provider.id,
                            );
                        }
                        Err(e) => {
                            let origin = e.origin(url);
                            skip(report, reporter, &origin, e.error)
                        }
                    }
                }
            }
        }
    }
}

/// Normalizes one document into `report`, recording the failure if it does not load.
fn load_into(
    report: &mut FetchReport,
    reporter: &dyn ProgressReporter,
    bytes: &[u8],
    origin: &str,
    id: &str,
    provider_id: &str,
) {
    let Normalized {
        description,
        notices,
    } = match normalize::load_document(bytes, origin, id, Some(provider_id)) {
        Ok(normalized) => normalized,
        Err(e) => return skip(report, reporter, origin, e),
    };

    for notice in &notices {
        reporter.report(FetchEvent::Notice(notice));
    }
    report.notices.extend(notices);

    let full_id = description.full_id();
    if report.add_description(description, origin) {
        reporter.report(FetchEvent::ItemLoaded { full_id: &full_id });
    } else if let Some(failure) = report.failures.last() {
        reporter.report(FetchEvent::ItemSkipped {
            origin: &failure.origin,
            error: &failure.error,
        });
    }
}

fn skip(report: &mut FetchReport, reporter: &dyn ProgressReporter, origin: &str, error: AppError) {
    reporter.report(FetchEvent::ItemSkipped {
        origin,
        error: &error,
    });
    report.add_failure(origin, error);
}
