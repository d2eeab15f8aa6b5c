use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, DEFAULT_CONFIG_FILE};
use serpgrab_common::observability::{LogConfig, LogFormat, init_logging};
use serpgrab_config::{SerpgrabConfig, SerpgrabConfigLoader};
use serpgrab_http::{DEFAULT_USER_AGENT, HttpClient};
use serpgrab_tui::{TuiSettings, run_tui};
use serpgrab_web::{Collector, SearchEndpoint};
use std::sync::Arc;
use std::time::Duration;
mod cli;
mod headless;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) Load config (env wins)
    let loader = match &cli.config {
        Some(path) => SerpgrabConfigLoader::new().with_file(path),
        None => SerpgrabConfigLoader::new().with_optional_file(DEFAULT_CONFIG_FILE),
    };
    let cfg: SerpgrabConfig = loader.load().context("loading configuration")?;

    // 2) Logging; stderr stays quiet while the UI owns the screen
    let format: LogFormat = cfg.logging.format.parse()?;
    let log_path = init_logging(LogConfig {
        log_dir: cfg.logging.dir.clone(),
        emit_stderr: cli.command.is_some(),
        format,
        default_filter: cfg.logging.filter.clone(),
        ..LogConfig::default()
    })?;

    let collector = build_collector(&cfg)?;
    tracing::info!(
        log = %log_path.display(),
        endpoint = %collector.endpoint().base(),
        "app.start"
    );

    match cli.command {
        Some(Commands::Collect(args)) => {
            let out_dir = args.out.clone().unwrap_or_else(|| cfg.output_dir());
            let report =
                headless::collect(&collector, &args, cfg.search.default_pages, &out_dir).await?;
            tracing::info!(
                spreadsheet = ?report.spreadsheet,
                articles = report.articles.len(),
                article_failures = report.article_failures,
                "app.collect.done"
            );
            Ok(())
        }
        None => {
            run_tui(
                collector,
                TuiSettings {
                    pages: cfg.search.default_pages,
                    output_dir: cfg.output_dir(),
                },
            )
            .await
        }
    }
}

fn build_collector(cfg: &SerpgrabConfig) -> Result<Collector> {
    let user_agent = cfg
        .search
        .user_agent
        .as_deref()
        .unwrap_or(DEFAULT_USER_AGENT);
    let mut client = HttpClient::new(user_agent)?;
    if let Some(secs) = cfg.search.timeout_secs {
        client = client.with_timeout(Duration::from_secs(secs));
    }
    let endpoint = SearchEndpoint::parse(&cfg.search.endpoint)?;
    Ok(Collector::new(Arc::new(client), endpoint))
}
