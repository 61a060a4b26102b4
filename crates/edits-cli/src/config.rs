use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI configuration parsed from command line arguments and environment variables
#[derive(Parser, Debug)]
#[command(name = "edits")]
#[command(author, version, about = "EDITS network metadata")]
#[command(after_help = "Examples:
  edits check acme
  edits check --local meta/energy.yaml
  edits search dimension=foo
  edits list --format jsonl > descriptions.jsonl")]
pub struct Config {
    /// Path to the providers.yaml file (default: ./providers.yaml, then the user config dir)
    #[arg(long, global = true, env = "EDITS_PROVIDERS", value_name = "PATH")]
    pub providers: Option<PathBuf>,

    /// Number of providers fetched at once (overrides EDITS_FETCH_CONCURRENCY)
    #[arg(long, global = true, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Log per-file progress
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check metadata formats for a provider or a local file
    ///
    /// Without --local, the providers.yaml entry for ID is checked and its files
    /// are retrieved over the internet and checked one at a time.
    #[command(after_help = "Examples:
  edits check acme                       # Check provider 'acme' and its files
  edits check --local meta/energy.yaml   # Check a single local file")]
    Check {
        /// ID is the path to a local YAML file
        #[arg(long)]
        local: bool,

        /// Provider id, or a file path with --local
        id: String,
    },
    /// Search dimension or measure codes across all providers
    #[command(after_help = "EXPRESSION must be of the form KIND=KEY, where KIND is \"dimension\" or
\"measure\". KEY matches any code containing it, so dimension=foo shows \"foo\",
\"food\" and \"other_foo\".")]
    Search {
        /// Query of the form KIND=KEY
        expression: String,
    },
    /// Fetch all descriptions and list them
    #[command(visible_alias = "demo")]
    List {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

/// Supported output formats for `list`
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary with classifiers
    Text,
    /// JSON Lines format (one JSON object per line)
    Jsonl,
    /// Standard JSON array format
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search() {
        let config = Config::try_parse_from(["edits", "search", "dimension=foo"]).unwrap();
        assert!(matches!(
            config.command,
            Command::Search { expression } if expression == "dimension=foo"
        ));
    }

    #[test]
    fn test_parse_check_local() {
        let config =
            Config::try_parse_from(["edits", "check", "--local", "meta/a.yaml"]).unwrap();
        assert!(matches!(
            config.command,
            Command::Check { local: true, id } if id == "meta/a.yaml"
        ));
    }

    #[test]
    fn test_demo_alias_and_global_options() {
        let config = Config::try_parse_from([
            "edits",
            "demo",
            "--providers",
            "p.yaml",
            "--format",
            "json",
        ])
        .unwrap();
        assert!(matches!(
            config.command,
            Command::List {
                format: OutputFormat::Json
            }
        ));
        assert_eq!(config.providers, Some(PathBuf::from("p.yaml")));
    }
}
