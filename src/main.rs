use anyhow::{Context, Result};
use kenall_loader::{pipeline, Config};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,kenall_loader=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    std::panic::set_hook(Box::new(|info| {
        eprintln!("panic: {:?}", info);
    }));

    // ─── 2) fixed locations ──────────────────────────────────────────
    let config = Config::default();
    info!(
        source = %config.source_path.display(),
        intermediate = %config.intermediate_path.display(),
        database = %config.database_path.display(),
        "postal code database build started"
    );

    // ─── 3) run the pipeline ─────────────────────────────────────────
    let summary = match pipeline::run(&config) {
        Ok(summary) => summary,
        Err(e) => {
            error!(kind = ?e.kind(), "postal code database build failed: {}", e);
            return Err(e).context("building postal code database");
        }
    };

    info!(
        summary = %serde_json::to_string(&summary).context("serializing run summary")?,
        "postal code database build finished"
    );
    Ok(())
}
