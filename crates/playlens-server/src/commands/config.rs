use anyhow::Result;
use playlens_enrich::{config, Config};

fn show_secret(value: Option<&str>) -> &str {
    value.unwrap_or("<not set>")
}

/// Show the current effective configuration.
pub fn show_config() -> Result<()> {
    let config = Config::load()?.redacted();

    println!("Current Configuration");
    println!("=====================\n");

    println!("Config file: {}", config::config_file_path().display());

    let exists = config::config_file_path().exists();
    println!("File exists: {}\n", if exists { "yes" } else { "no (using defaults)" });

    println!("Settings:");
    println!("  spotify_client_id: {}", show_secret(config.spotify_client_id.as_deref()));
    println!("  spotify_client_secret: {}", show_secret(config.spotify_client_secret.as_deref()));
    println!("  genius_access_token: {}", show_secret(config.genius_access_token.as_deref()));
    println!("  lastfm_api_key: {}", show_secret(config.lastfm_api_key.as_deref()));
    println!("  track_concurrency: {}", config.track_concurrency);
    println!("  artist_concurrency: {}", config.artist_concurrency);
    println!("  report_failures: {}", config.report_failures);
    println!("  bind_address: {}", config.bind_address);

    println!("\nPriority: CLI args > ENV vars (PLAYLENS_*) > Config file > Defaults");

    Ok(())
}

/// Show the config file path.
pub fn show_path() -> Result<()> {
    let config_path = config::config_file_path();
    println!("{}", config_path.display());
    Ok(())
}

/// Show example configuration.
pub fn show_example() -> Result<()> {
    print!("{}", config::example_config());
    Ok(())
}

/// Initialize config file with defaults.
pub fn init_config() -> Result<()> {
    let created = config::ensure_config_file()?;
    let config_path = config::config_file_path();

    if created {
        println!("✓ Created config file: {}", config_path.display());
        println!("\nEdit this file to configure playlens.");
    } else {
        println!("Config file already exists: {}", config_path.display());
    }

    Ok(())
}
