use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use serde_yaml::Value;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use edits_cli::{Command, Config, OutputFormat};
use edits_client::HttpFetcher;
use edits_core::{
    default_providers_path, find_provider, load_document, load_provider_entries, load_providers,
    run_query, AppError, Description, FetchConfig, FetchPipeline, FetchReport, Notice, Query,
    TracingReporter,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::parse();

    // Setup logging (stderr to keep stdout clean for exports)
    let level = if config.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    if let Err(e) = run(config).await {
        match e.downcast_ref::<AppError>() {
            Some(app_error) => error!("{}", app_error.user_message()),
            None => error!("{:#}", e),
        }
        std::process::exit(1);
    }

    Ok(())
}

async fn run(config: Config) -> anyhow::Result<()> {
    let mut fetch_config = FetchConfig::from_env();
    if let Some(concurrency) = config.concurrency {
        fetch_config.concurrency = concurrency.max(1);
    }

    let pipeline = FetchPipeline::with_config(HttpFetcher::new()?, fetch_config);
    let providers_path = config.providers.as_deref();

    match config.command {
        Command::Check { local: true, id } => check_local(Path::new(&id)),
        Command::Check { local: false, id } => check(&pipeline, providers_path, &id).await,
        Command::Search { expression } => search(&pipeline, providers_path, &expression).await,
        Command::List { format } => list(&pipeline, providers_path, format).await,
    }
}

/// Read the raw provider records from `path` or the default location
fn provider_entries(path: Option<&Path>) -> anyhow::Result<Vec<Value>> {
    let path: PathBuf = match path {
        Some(p) => p.to_path_buf(),
        None => default_providers_path().context("Cannot determine where providers.yaml is")?,
    };
    info!("Reading providers from {}", path.display());
    Ok(load_provider_entries(&path)?)
}

/// Check a single local YAML file
fn check_local(path: &Path) -> anyhow::Result<()> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Cannot read {}", path.display()))?;
    let id = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    println!("--- {}", path.display());
    match load_document(&bytes, &path.display().to_string(), &id, None) {
        Ok(normalized) => {
            print_notices(&normalized.notices);
            println!("{}", normalized.description);
        }
        Err(e) => println!("{}", e),
    }
    println!("--- done.");

    Ok(())
}

/// Check the providers.yaml entry for `id`, then each of its files
async fn check(
    pipeline: &FetchPipeline<HttpFetcher>,
    providers_path: Option<&Path>,
    id: &str,
) -> anyhow::Result<()> {
    println!(
        "Check metadata formats for provider: {}\n\n--- Information in providers.yaml",
        id
    );

    let entries = provider_entries(providers_path)?;
    let provider = find_provider(&entries, id)?;
    println!("{}", provider);

    println!("--- Data description files");
    for url in &provider.files {
        println!("--- {}", url);
        let report = pipeline.fetch_file(url, &provider).await;
        print_notices(&report.notices);
        for description in &report.descriptions {
            println!("{}", description);
        }
        print_failures(&report);
    }
    println!("--- done.");

    Ok(())
}

/// Search dimension or measure codes across all providers
async fn search(
    pipeline: &FetchPipeline<HttpFetcher>,
    providers_path: Option<&Path>,
    expression: &str,
) -> anyhow::Result<()> {
    // Reject a bad expression before fetching anything
    let query: Query = expression.parse()?;

    let report = fetch_everything(pipeline, providers_path).await?;
    let hits = run_query(&report.descriptions, &query);

    if hits.is_empty() {
        println!("No matches");
        return Ok(());
    }

    for hit in hits {
        let entry = BTreeMap::from([(hit.code, hit.descriptor)]);
        let yaml = serde_yaml::to_string(&entry)?;
        println!("--- {}\n{}", hit.description.full_id(), yaml);
    }

    Ok(())
}

/// Fetch all descriptions and print them
async fn list(
    pipeline: &FetchPipeline<HttpFetcher>,
    providers_path: Option<&Path>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let report = fetch_everything(pipeline, providers_path).await?;

    match format {
        OutputFormat::Text => print_summary(&report),
        OutputFormat::Jsonl => {
            for description in &report.descriptions {
                println!("{}", serde_json::to_string(&export_record(description)?)?);
            }
        }
        OutputFormat::Json => {
            let records = report
                .descriptions
                .iter()
                .map(export_record)
                .collect::<anyhow::Result<Vec<_>>>()?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
    }

    Ok(())
}

async fn fetch_everything(
    pipeline: &FetchPipeline<HttpFetcher>,
    providers_path: Option<&Path>,
) -> anyhow::Result<FetchReport> {
    let providers = load_providers(&provider_entries(providers_path)?, None)?;
    info!("Fetch data descriptions from {} provider(s)", providers.len());

    let report = pipeline
        .fetch_all_with_progress(&providers, &TracingReporter)
        .await;
    info!(
        "Fetching complete: {} loaded, {} skipped",
        report.loaded_count(),
        report.failed_count()
    );
    Ok(report)
}

fn print_summary(report: &FetchReport) {
    for summary in &report.providers {
        println!(
            "{}: {} description(s), {} skipped",
            summary.provider_id, summary.loaded, summary.skipped
        );
    }

    println!("\nTotal {} descriptions.\n", report.loaded_count());

    for description in &report.descriptions {
        println!(
            "{}\ncontains data classified as:\n  {:?}\n",
            description, description.classifiers
        );
    }

    print_failures(report);
}

fn print_notices(notices: &[Notice]) {
    for notice in notices {
        println!("note: {}", notice);
    }
}

fn print_failures(report: &FetchReport) {
    for failure in &report.failures {
        println!("{} when loading:\n  {}\n…skipping.\n", failure.error, failure.origin);
    }
}

/// Create an export record, including the derived full id
fn export_record(description: &Description) -> anyhow::Result<serde_json::Value> {
    let mut record = serde_json::to_value(description)?;
    if let Some(object) = record.as_object_mut() {
        object.insert("full_id".to_string(), description.full_id().into());
    }
    Ok(record)
}
