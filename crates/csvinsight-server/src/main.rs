use anyhow::Result;
use csvinsight_ai::{InsightGenerator, OpenRouterProvider};
use csvinsight_storage::{ReportGateway, ReportStore};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use csvinsight_server::app;
use csvinsight_server::config::ServerConfig;
use csvinsight_server::insights::InsightPipeline;
use csvinsight_server::sample::CsvSample;
use csvinsight_server::state::AppState;

const DEFAULT_CONFIG_PATH: &str = "config/server.toml";

#[allow(clippy::print_stderr)]
fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  csvinsight-server [config.toml]                    Start the HTTP server");
    eprintln!("  csvinsight-server analyze <file.csv> [config.toml] Generate and store insights for a CSV file");
    eprintln!("  csvinsight-server reports [config.toml]            Print the most recent reports");
    eprintln!();
    eprintln!("Environment: DATABASE_URL, OPENROUTER_API_KEY, OPENROUTER_MODEL, HTTP_PORT, RUST_LOG");
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("csvinsight_server=info".parse()?)
                .add_directive("csvinsight_storage=info".parse()?)
                .add_directive("csvinsight_ai=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("analyze") => {
            let csv_path = args.get(2).ok_or_else(|| {
                print_usage();
                anyhow::anyhow!("analyze requires a <file.csv> argument")
            })?;
            let config_path = args.get(3).map(String::as_str).unwrap_or(DEFAULT_CONFIG_PATH);
            run_analyze(csv_path, config_path).await
        }
        Some("reports") => {
            let config_path = args.get(2).map(String::as_str).unwrap_or(DEFAULT_CONFIG_PATH);
            run_reports(config_path).await
        }
        Some("--help" | "-h") => {
            print_usage();
            Ok(())
        }
        _ => {
            let config_path = args.get(1).map(String::as_str).unwrap_or(DEFAULT_CONFIG_PATH);
            run_server(config_path).await
        }
    }
}

fn build_generator(config: &ServerConfig) -> Result<Arc<OpenRouterProvider>> {
    let provider = OpenRouterProvider::new(config.ai.provider_config())?;
    if !provider.has_api_key() {
        tracing::warn!("OPENROUTER_API_KEY is not set; insight generation will fail until it is configured");
    }
    Ok(Arc::new(provider))
}

/// Opens the report store up front. Failure is not fatal: routes that need
/// storage report the error per request and the connection is retried.
async fn connect_store(config: &ServerConfig) -> Arc<ReportGateway> {
    let gateway = Arc::new(ReportGateway::new(config.database.clone()));
    match gateway.backend() {
        Ok(backend) => tracing::info!(backend = %backend, "Report store configured"),
        Err(e) => tracing::warn!(error = %e, "Report store not usable"),
    }
    if let Err(e) = gateway.connect().await {
        tracing::warn!(error = %e, "Report store unavailable at startup");
    }
    gateway
}

/// Sample a CSV file, generate insights for it and store the report.
#[allow(clippy::print_stdout)]
async fn run_analyze(csv_path: &str, config_path: &str) -> Result<()> {
    let config = ServerConfig::load_or_default(config_path)?;

    let path = Path::new(csv_path);
    let sample = CsvSample::from_path(path)?;
    let payload = sample.payload()?;
    tracing::info!(
        file = %csv_path,
        columns = sample.headers.len(),
        rows = sample.total_rows,
        sampled = sample.rows.len(),
        payload_chars = payload.chars().count(),
        "CSV sampled"
    );

    let generator: Arc<dyn InsightGenerator> = build_generator(&config)?;
    let store: Arc<dyn ReportStore> = connect_store(&config).await;
    let pipeline = InsightPipeline::new(generator, store);

    let filename = path.file_name().and_then(|n| n.to_str());
    let outcome = pipeline.generate(&payload, filename).await?;

    match (&outcome.report_id, &outcome.warning) {
        (Some(id), _) => tracing::info!(report_id = id, "Report stored"),
        (None, Some(warning)) => tracing::warn!(warning = %warning, "Insights generated but not stored"),
        (None, None) => {}
    }

    println!("{}", outcome.insights);
    Ok(())
}

/// Print the most recent reports.
#[allow(clippy::print_stdout)]
async fn run_reports(config_path: &str) -> Result<()> {
    let config = ServerConfig::load_or_default(config_path)?;
    let gateway = ReportGateway::new(config.database.clone());

    let reports = gateway.list(config.reports.list_limit).await?;
    if reports.is_empty() {
        println!("No reports yet.");
    }
    for report in reports {
        println!(
            "#{:<5} {}  {}",
            report.id,
            report.timestamp.format("%Y-%m-%d %H:%M:%S"),
            report.filename
        );
    }
    Ok(())
}

async fn run_server(config_path: &str) -> Result<()> {
    let config = ServerConfig::load_or_default(config_path)?;

    tracing::info!(
        http_port = config.http_port,
        db = %config.database.redacted_url(),
        ai_base_url = %config.ai.base_url,
        "csvinsight-server starting"
    );

    let generator = build_generator(&config)?;
    tracing::info!(
        provider = %generator.provider(),
        model = %generator.model_name(),
        "AI provider configured"
    );
    let store = connect_store(&config).await;

    let state = AppState::new(generator, store, config.clone());

    let http_addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    let app = app::build_http_app(state);
    let listener = tokio::net::TcpListener::bind(http_addr).await?;

    tracing::info!(http = %http_addr, "Server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            signal::ctrl_c().await.ok();
            tracing::info!("Shutting down gracefully");
        })
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
