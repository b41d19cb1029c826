use anyhow::Result;
use clap::Parser;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "playlens", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Run the playlist enrichment HTTP service
    ///
    /// Serves `GET /api/playlist/:id?limit=N`, which fetches a public
    /// playlist from Spotify and returns every track with album and artist
    /// artwork, canonical genres and a lyrics link, plus `GET /health`.
    ///
    /// Genres come from Spotify, falling back to Last.fm tags when an API
    /// key is configured. Lyrics links come from Genius when an access
    /// token is configured, otherwise from a site-restricted web search.
    ///
    /// Caches live for the lifetime of the process: a second request for
    /// the same playlist makes no further provider calls for tracks it has
    /// already seen.
    Serve {
        /// Listen address (default: 127.0.0.1:3000)
        #[arg(long)]
        bind: Option<String>,

        /// Track pipelines run per batch
        #[arg(long)]
        track_concurrency: Option<usize>,

        /// Include an "errors" array listing dropped tracks
        #[arg(long)]
        report_failures: bool,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigAction {
    /// Show the effective configuration (secrets masked)
    Show,
    /// Create the config file with commented defaults
    Init,
    /// Print the config file path
    Path,
    /// Print an example configuration
    Example,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            bind,
            track_concurrency,
            report_failures,
        } => {
            let mut config = playlens_enrich::Config::load()?;
            if let Some(bind) = bind {
                config.bind_address = bind;
            }
            if let Some(track_concurrency) = track_concurrency {
                config.track_concurrency = track_concurrency;
            }
            if report_failures {
                config.report_failures = true;
            }
            commands::run_serve(config.normalized()).await?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show_config()?,
            ConfigAction::Init => commands::config::init_config()?,
            ConfigAction::Path => commands::config::show_path()?,
            ConfigAction::Example => commands::config::show_example()?,
        },
    }

    Ok(())
}
