//! Branchscope - organization-wide branch hierarchy scanner
//!
//! The `branchscope` command lists an organization's repositories through
//! the `gh` CLI, resolves every repository's open pull requests into a
//! branch dependency tree, and writes the result as one JSON document.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use branchscope_core::{
    emit_report_written, write_report, ErrorReport, GhCli, OrgScanner, RemoteSource, ScopeConfig,
    ScopeError, DEFAULT_CONFIG_FILE,
};
use branchscope_core::telemetry::verbosity;

#[derive(Parser, Debug)]
#[command(name = "branchscope")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Map open pull requests of an organization into branch trees", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Organization to scan (overrides the config file)
    #[arg(long)]
    org: Option<String>,

    /// Where to write the report
    #[arg(short, long, default_value = "data/org_data.json")]
    output: PathBuf,

    /// Config file; missing keys keep their defaults
    #[arg(long, env = "BRANCHSCOPE_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Skip commit-delta lookups
    #[arg(long)]
    no_commits: bool,

    /// Sort tree children by branch name
    #[arg(long)]
    sort_children: bool,
}

impl Cli {
    /// Load the config file and apply command-line overrides.
    fn scope_config(&self) -> ScopeConfig {
        let mut config = ScopeConfig::load_or_default(&self.config);
        if let Some(org) = &self.org {
            config.organization = org.clone();
        }
        if self.no_commits {
            config.fetch_commits = false;
        }
        if self.sort_children {
            config.sort_children = true;
        }
        config
    }
}

/// What a finished run wrote.
#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Report { repos_with_prs: usize, total_open_prs: usize },
    NoRepositories,
}

/// Scan and write either the report or, when the organization has no
/// repositories to scan, an error document.
async fn run_scan(
    source: Arc<dyn RemoteSource>,
    config: ScopeConfig,
    output: &Path,
) -> Result<Outcome> {
    let scanner = OrgScanner::new(source, config);
    let outcome = match scanner.scan().await {
        Ok(report) => {
            write_report(output, &report)
                .with_context(|| format!("Failed to write report to {}", output.display()))?;
            Outcome::Report {
                repos_with_prs: report.stats.repos_with_prs,
                total_open_prs: report.stats.total_open_prs,
            }
        }
        Err(err @ ScopeError::NoRepositories { .. }) => {
            tracing::error!(error = %err, "nothing to scan");
            write_report(output, &ErrorReport::new(&err))
                .with_context(|| format!("Failed to write error report to {}", output.display()))?;
            Outcome::NoRepositories
        }
        Err(err) => return Err(anyhow::Error::new(err).context("Scan failed")),
    };
    emit_report_written(output);
    Ok(outcome)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    branchscope_core::init_tracing(cli.json, verbosity(cli.verbose));

    let config = cli.scope_config();
    let source = GhCli::new().with_timeout(Duration::from_secs(config.command_timeout_secs));
    info!(
        organization = %config.organization,
        config = %cli.config.display(),
        "Starting branchscope {}",
        branchscope_core::VERSION
    );

    match run_scan(Arc::new(source), config, &cli.output).await? {
        Outcome::Report {
            repos_with_prs,
            total_open_prs,
        } => {
            println!(
                "✓ Wrote {} ({} repositories with {} open pull requests)",
                cli.output.display(),
                repos_with_prs,
                total_open_prs
            );
        }
        Outcome::NoRepositories => {
            println!("✗ No repositories found; wrote {}", cli.output.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use branchscope_core::fakes::MemoryRemoteSource;
    use branchscope_core::{ChangeRequest, RepoInfo};
    use serde_json::{json, Value};

    fn read_json(path: &Path) -> Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    fn config() -> ScopeConfig {
        ScopeConfig {
            organization: "acme".to_string(),
            fetch_ci: false,
            ..ScopeConfig::default()
        }
    }

    #[test]
    fn test_cli_overrides_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("org_config.json");
        std::fs::write(&config_path, r#"{"organization": "from-file", "max_repos": 3}"#).unwrap();

        let cli = Cli::try_parse_from([
            "branchscope",
            "--config",
            config_path.to_str().unwrap(),
            "--org",
            "from-flag",
            "--no-commits",
        ])
        .unwrap();
        let config = cli.scope_config();
        assert_eq!(config.organization, "from-flag");
        assert_eq!(config.max_repos, 3);
        assert!(!config.fetch_commits);
        assert!(!config.sort_children);
    }

    #[test]
    fn test_default_output_path() {
        let cli = Cli::try_parse_from(["branchscope", "--config", "absent.json"]).unwrap();
        assert_eq!(cli.output, PathBuf::from("data/org_data.json"));
        assert!(!cli.verbose);
    }

    #[tokio::test]
    async fn test_run_scan_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("data").join("org_data.json");
        let source = Arc::new(MemoryRemoteSource::new());
        source.set_repos(vec![RepoInfo::new("widgets", "acme/widgets", "main")]);
        source.set_requests(
            "acme/widgets",
            vec![ChangeRequest::new(3, "Add gears", "gears", "main")],
        );

        let outcome = run_scan(source, config(), &output).await.unwrap();
        assert_eq!(
            outcome,
            Outcome::Report {
                repos_with_prs: 1,
                total_open_prs: 1
            }
        );
        let raw = read_json(&output);
        assert_eq!(raw["organization"], json!("acme"));
        assert_eq!(raw["trees"]["widgets"]["children"][0]["branch"], json!("gears"));
    }

    #[tokio::test]
    async fn test_run_scan_writes_error_document_for_empty_org() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("org_data.json");
        let source = Arc::new(MemoryRemoteSource::new());
        source.set_repos(Vec::new());

        let outcome = run_scan(source, config(), &output).await.unwrap();
        assert_eq!(outcome, Outcome::NoRepositories);
        assert_eq!(
            read_json(&output),
            json!({"error": "No repositories found for acme"})
        );
    }
}
