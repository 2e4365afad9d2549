#![forbid(unsafe_code)]
use anyhow::{Context, Result, bail};
use clap::Parser;
use sensview::bus::Event;
use sensview::chart::MemoryChart;
use sensview::config::{self, load_configuration};
use sensview::engine::{EngineOptions, EventLoop};
use sensview::exporters::JsonlConverter;
use sensview::source::create_source_from_connection_string;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;
use tracing::event;

/// Plots live metrics from a data source on a headless chart
#[derive(Debug, Parser)]
#[command(name = "sensview", version)]
struct Cli {
    /// Metric to plot, may be repeated
    #[arg(short, long = "metric", required = true)]
    metrics: Vec<String>,

    /// Stop after this many seconds instead of waiting for Ctrl-C
    #[arg(long)]
    duration_seconds: Option<u64>,

    /// Write the merged rows as JSON lines to this file on exit
    #[arg(long)]
    export: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")?;

    runtime.block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    load_configuration().context("Failed to load configuration")?;
    let config = config::get().context("Failed to get configuration")?;
    let options = EngineOptions::from_config(&config)?;

    println!(
        "📡 Connecting to data source: {}",
        config.source_connection_string
    );
    let source = create_source_from_connection_string(&config.source_connection_string)
        .await
        .context("Failed to create data source")?;

    let mut event_loop = EventLoop::new(source, MemoryChart::new(), options);
    event_loop
        .load_catalog()
        .await
        .context("Failed to list metrics")?;

    let metrics = match event_loop.state().resolve_selection(&cli.metrics) {
        Ok(metrics) => metrics,
        Err(err) => bail!(
            "{}. Available metrics: {}",
            err,
            event_loop.state().catalog().join(", ")
        ),
    };

    let bus = event_loop.bus();
    for metric in &metrics {
        bus.publish(Event::SelectionAdded(metric.clone()))?;
    }

    let stopper = bus.clone();
    let duration = cli.duration_seconds.map(Duration::from_secs);
    tokio::spawn(async move {
        match duration {
            Some(duration) => tokio::time::sleep(duration).await,
            None => {
                if let Err(err) = tokio::signal::ctrl_c().await {
                    event!(Level::ERROR, "Failed to listen for Ctrl-C: {}", err);
                }
            }
        }
        let _ = stopper.publish(Event::Unmount);
    });

    println!("📈 Plotting {}", metrics.join(", "));
    event_loop.run().await;

    let rows = event_loop.state().store().all_rows();
    println!(
        "✅ Stopped with {} rows in store, {} appended to the chart",
        rows.len(),
        event_loop.chart().appended_count()
    );
    event!(Level::INFO, rows = rows.len(), "dashboard unmounted");

    if let Some(path) = cli.export {
        let jsonl = JsonlConverter::to_jsonl(rows)?;
        tokio::fs::write(&path, jsonl)
            .await
            .with_context(|| format!("Failed to write export to {}", path.display()))?;
        println!("💾 Exported rows to {}", path.display());
    }

    Ok(())
}
