//! Daily Bias Bot
//!
//! Posts the daily directional bias of configured crypto assets to Discord.

use clap::{Parser, Subcommand};
use daily_bias_bot::{
    analysis::classify,
    chart::CandlestickRenderer,
    client::{BinanceClient, MarketData},
    config::Config,
    notify::{ChatSink, DiscordNotifier, LogNotifier},
    report::CycleTrigger,
    scheduler::BiasScheduler,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "daily-bias")]
#[command(about = "Posts the daily market bias of crypto assets to Discord")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scheduler until interrupted
    Run {
        /// Log messages instead of posting them
        #[arg(long)]
        dry_run: bool,
    },
    /// Run a single cycle and exit
    Once {
        /// Log messages instead of posting them
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the current bias of one symbol
    Bias {
        /// Exchange symbol, e.g. BTCUSDT
        symbol: String,
    },
    /// Render the daily chart of one symbol
    Chart {
        /// Exchange symbol, e.g. BTCUSDT
        symbol: String,
        /// Output path (defaults to report.chart_path)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Send a test message to the configured channel
    TestNotify,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Run { dry_run } => run_bot(config, dry_run).await,
        Commands::Once { dry_run } => run_once(config, dry_run).await,
        Commands::Bias { symbol } => show_bias(config, &symbol).await,
        Commands::Chart { symbol, output } => render_chart(config, &symbol, output).await,
        Commands::TestNotify => test_notify(config).await,
    }
}

fn build_sink(config: &Config, dry_run: bool) -> anyhow::Result<Arc<dyn ChatSink>> {
    if dry_run {
        tracing::warn!("Running in DRY RUN mode - messages are logged, not posted");
        return Ok(Arc::new(LogNotifier));
    }
    config.require_discord()?;
    Ok(Arc::new(DiscordNotifier::new(&config.discord)?))
}

fn build_scheduler(config: &Config, dry_run: bool) -> anyhow::Result<BiasScheduler> {
    let source: Arc<dyn MarketData> = Arc::new(BinanceClient::new(&config.market)?);
    let sink = build_sink(config, dry_run)?;
    Ok(BiasScheduler::new(config, source, sink)?)
}

async fn run_bot(config: Config, dry_run: bool) -> anyhow::Result<()> {
    tracing::info!("Starting daily bias bot");
    let scheduler = build_scheduler(&config, dry_run)?;

    tokio::select! {
        _ = scheduler.run() => {}
        result = tokio::signal::ctrl_c() => {
            result?;
            tracing::info!("Shutdown signal received, stopping");
        }
    }
    Ok(())
}

async fn run_once(config: Config, dry_run: bool) -> anyhow::Result<()> {
    let scheduler = build_scheduler(&config, dry_run)?;
    let summary = scheduler.run_cycle(CycleTrigger::Startup).await;

    println!(
        "✅ Cycle done: {}/{} assets ok, {}/{} messages delivered",
        summary.assets - summary.failed_assets,
        summary.assets,
        summary.delivered,
        summary.messages
    );
    if summary.failed_deliveries > 0 {
        anyhow::bail!("{} message(s) failed to deliver", summary.failed_deliveries);
    }
    Ok(())
}

async fn show_bias(config: Config, symbol: &str) -> anyhow::Result<()> {
    let client = BinanceClient::new(&config.market)?;
    let series = client.fetch(symbol, config.market.limit).await?;
    let bias = classify(&series)?;

    println!("\n📊 {} bias ({} candles)\n", symbol, client.interval());
    println!("Bias:   {} {}", bias.label.emoji(), bias.label);
    println!("Reason: {}", bias.reason);
    println!(
        "\nO={} H={} L={} C={} | prior close={}",
        bias.inputs.open, bias.inputs.high, bias.inputs.low, bias.inputs.close, bias.inputs.prior_close
    );
    Ok(())
}

async fn render_chart(config: Config, symbol: &str, output: Option<PathBuf>) -> anyhow::Result<()> {
    let client = BinanceClient::new(&config.market)?;
    let series = client.fetch(symbol, config.market.limit).await?;

    let path = output.unwrap_or_else(|| config.report.chart_path_for(symbol));
    let renderer = CandlestickRenderer::new(config.report.chart_width, config.report.chart_height);
    let target = path.clone();
    tokio::task::spawn_blocking(move || renderer.render(&series, &target)).await??;

    println!("✅ Chart written to {}", path.display());
    Ok(())
}

async fn test_notify(config: Config) -> anyhow::Result<()> {
    config.require_discord()?;
    let notifier = DiscordNotifier::new(&config.discord)?;

    notifier
        .send_text("🧪 **Test Notification**\n\nIf you see this, Discord integration is working!")
        .await?;

    println!("✅ Test notification sent!");
    Ok(())
}
