// craftwatch-server/src/main.rs

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use craftwatch_core::Database;
use craftwatch_core::Error;
use craftwatch_core::platforms::discord::{DiscordPlatform, DiscordPublisher};
use craftwatch_core::platforms::mcstatus::McStatusClient;
use craftwatch_core::render::Renderer;
use craftwatch_core::repositories::SqliteTrackerRepository;
use craftwatch_core::services::discord::DiscordEventService;
use craftwatch_core::services::refresh::RefreshEngine;
use craftwatch_core::tasks::status_refresh::RefreshScheduler;

#[derive(Parser, Debug, Clone)]
#[command(name = "craftwatch")]
#[command(author, version, about = "Craftwatch - Minecraft server status tracking bot")]
struct Args {
    /// Path to the sqlite registry database.
    #[arg(long, default_value = "craftwatch.sqlite")]
    db_path: String,

    /// Base URL of the status API.
    #[arg(long, default_value = "https://api.mcstatus.io/v2/status")]
    status_api_base: String,

    /// Seconds between refresh cycles.
    #[arg(long, default_value_t = 300)]
    refresh_interval_secs: u64,

    /// TTF/OTF font used for the MOTD card. Without it, status messages
    /// are published without the MOTD image.
    #[arg(long)]
    motd_font: Option<String>,
}

fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("craftwatch=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(sub)
        .expect("Failed to set global subscriber");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    init_tracing();
    let args = Args::parse();
    info!(
        "Craftwatch starting. db={}, refresh every {}s",
        args.db_path, args.refresh_interval_secs
    );

    if let Err(e) = run(args).await {
        error!("Server error: {:?}", e);
    }
    info!("Main finished. Goodbye!");
    Ok(())
}

async fn run(args: Args) -> Result<(), Error> {
    let token = std::env::var("DISCORD_TOKEN")
        .map_err(|_| Error::Auth("DISCORD_TOKEN environment variable is not set".into()))?;

    let db = Database::new(&args.db_path).await?;
    db.migrate().await?;
    let repo = Arc::new(SqliteTrackerRepository::new(db.pool().clone()));

    let fetcher = Arc::new(McStatusClient::new(&args.status_api_base)?);

    let font = match &args.motd_font {
        Some(path) => match Renderer::load_font(path) {
            Ok(font) => Some(font),
            Err(e) => {
                warn!("Could not load MOTD font: {}; continuing without MOTD images", e);
                None
            }
        },
        None => None,
    };
    let renderer = Arc::new(Renderer::new(font));

    let mut platform = DiscordPlatform::new(token);
    platform.connect().await?;
    let platform = Arc::new(platform);

    let publisher = Arc::new(DiscordPublisher::new(platform.http()?));

    let engine = Arc::new(RefreshEngine::new(repo, fetcher, renderer, publisher));
    let scheduler = Arc::new(RefreshScheduler::new(
        engine.clone(),
        Duration::from_secs(args.refresh_interval_secs),
    ));

    let events = DiscordEventService::new(platform.clone(), engine, scheduler.clone());

    tokio::select! {
        res = events.run() => {
            if let Err(e) = res {
                error!("Event service stopped: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl-C received, shutting down");
        }
    }

    scheduler.stop().await;
    // platform is shared with the event service; shards close when the
    // process exits.
    Ok(())
}
