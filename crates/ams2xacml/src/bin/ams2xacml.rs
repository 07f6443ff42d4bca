use std::sync::Arc;

use ams2xacml::core::PolicyTemplate;
use ams2xacml::store::SqliteStore;
use ams2xacml::{Cli, Converter};
use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let template = PolicyTemplate::bundled().context("loading policy template")?;
    if !cli.corpus_db.exists() {
        anyhow::bail!("corpus database {} does not exist", cli.corpus_db.display());
    }
    let store = SqliteStore::open(&cli.corpus_db)
        .with_context(|| format!("opening {}", cli.corpus_db.display()))?;

    let converter = Converter::new(store, Arc::new(template), cli.config());
    let report = converter
        .run(&cli.start_nodes)
        .await
        .context("conversion aborted")?;

    if let Some(path) = &cli.report {
        let json = report.to_json().context("rendering report")?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("writing report to {}", path.display()))?;
    }

    println!(
        "{} written, {} off site, {} unknown, {} without handle, {} failed",
        report.written,
        report.skipped_off_site,
        report.skipped_unknown,
        report.skipped_missing_handle,
        report.failed
    );
    Ok(())
}
