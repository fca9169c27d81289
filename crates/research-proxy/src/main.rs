//! Research Proxy - Entry Point
//!
//! `serve` runs the HTTP backend; `ask` queries a running backend from the terminal.

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use research_proxy::{
    ResearchCollector, ResearchService,
    config::{self, Config},
    formatters,
    models::SearchType,
    server::ResearchServer,
};

#[derive(Parser, Debug)]
#[command(name = "research-proxy")]
#[command(about = "Research assistant backend for the Perplexity API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG", global = true)]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP backend (default)
    Serve(ServeArgs),

    /// Ask a running backend for a research report
    Ask(AskArgs),
}

#[derive(clap::Args, Debug)]
struct ServeArgs {
    /// Perplexity API key
    #[arg(long, env = config::env::API_KEY, hide_env_values = true)]
    api_key: Option<String>,

    /// Perplexity API base URL
    #[arg(long, env = config::env::API_URL, default_value = config::api::BASE_URL)]
    api_url: String,

    /// HTTP server port
    #[arg(long, env = config::env::PORT, default_value_t = config::server::DEFAULT_PORT)]
    port: u16,
}

#[derive(clap::Args, Debug)]
struct AskArgs {
    /// Research topic
    topic: String,

    /// Source category to restrict the report to
    #[arg(long, short = 't', value_enum, default_value_t = SearchType::All)]
    search_type: SearchType,

    /// Backend base URL
    #[arg(long, env = config::env::BACKEND_URL, default_value = config::server::DEFAULT_BACKEND_URL)]
    backend_url: String,
}

impl ServeArgs {
    /// Arguments for a bare invocation, read from the same environment variables.
    fn from_env() -> anyhow::Result<Self> {
        let config = Config::from_env()?;
        Ok(Self { api_key: config.api_key, api_url: config.api_url, port: config.port })
    }
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    // stderr keeps stdout clean for `ask` reports.
    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        subscriber.with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr)).init();
    }
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = Config::new(args.api_key).with_api_url(&args.api_url)?.with_port(args.port);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?config,
        "Starting research proxy"
    );

    let service = ResearchService::new(&config)?;
    ResearchServer::new(service).run_http(config.port).await
}

async fn ask(args: AskArgs) -> anyhow::Result<()> {
    let collector = ResearchCollector::new(&args.backend_url)?;
    tracing::debug!(backend = collector.backend_url(), search_type = %args.search_type, "Asking backend");

    let result = collector.collect(&args.topic, args.search_type).await?;
    if !result.has_sources() {
        tracing::warn!("Backend returned no sources");
    }
    println!("{}", formatters::format_report_markdown(&args.topic, &result));

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.json_logs);

    match cli.command {
        Some(Command::Ask(args)) => ask(args).await,
        Some(Command::Serve(args)) => serve(args).await,
        None => serve(ServeArgs::from_env()?).await,
    }
}
