use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use nightscape::server::{CityscapeServer, Environment, ServerConfig};
use nightscape::CanvasConfig;

#[derive(Parser)]
#[command(name = "nightscape", version, about = "Night cityscape PNG renderer")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP service (default)
    Serve(ServeArgs),
    /// Render a single image to a file
    Render(RenderArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// Listening port
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,
    /// Interface to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Worker threads (defaults to the CPU count)
    #[arg(long)]
    workers: Option<usize>,
    /// Deployment mode
    #[arg(long = "env", env = "NIGHTSCAPE_ENV", value_enum, default_value_t = Environment::Production)]
    environment: Environment,
}

#[derive(Args)]
struct RenderArgs {
    #[arg(long, default_value_t = 1200)]
    width: u32,
    #[arg(long, default_value_t = 800)]
    height: u32,
    /// Seed for window lighting and stars; random when omitted
    #[arg(long)]
    seed: Option<u64>,
    /// Destination PNG file
    #[arg(long, short)]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Some(Command::Render(args)) => render(args),
        Some(Command::Serve(args)) => serve(args).await,
        None => serve(cli.serve).await,
    }
}

fn render(args: RenderArgs) -> anyhow::Result<()> {
    let config = CanvasConfig::new(args.width, args.height)?;
    let shot = match args.seed {
        Some(seed) => nightscape::generate_cityscape_with_rng(&config, &mut StdRng::seed_from_u64(seed))?,
        None => nightscape::generate_cityscape(&config)?,
    };
    std::fs::write(&args.output, &shot.png_data)
        .with_context(|| format!("writing {}", args.output.display()))?;
    info!(
        "wrote {}x{} cityscape to {} (sha256 {})",
        shot.width,
        shot.height,
        args.output.display(),
        shot.digest()
    );
    Ok(())
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = ServerConfig {
        host: args.host,
        port: args.port,
        environment: args.environment,
        workers: args.workers.unwrap_or_else(num_cpus::get),
    };
    let port = config.port;
    let running = CityscapeServer::bind(config)?.spawn()?;
    info!("Server is running on port {}", port);
    info!("Health check: http://localhost:{}/api/health", port);

    let signal = wait_for_signal().await?;
    info!("{} signal received: closing HTTP server", signal);
    tokio::task::spawn_blocking(move || running.stop()).await?;
    info!("HTTP server closed");
    Ok(())
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = signal(SignalKind::terminate())?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res.map(|_| "SIGINT"),
        _ = term.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await.map(|_| "SIGINT")
}
