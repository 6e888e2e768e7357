//! Jinbot Telegram bot binary.
//!
//! Start the bot with:
//! ```bash
//! TELEGRAM_BOT_TOKEN=xxx cargo run -p jinbot-telegram
//! ```

use clap::Parser;
use jinbot_core::{BotConfig, MonitorConfig};
use jinbot_telegram::JinBot;
use tracing_subscriber::EnvFilter;

/// Jinbot - personal Telegram bot with uptime monitoring
#[derive(Parser, Debug)]
#[command(name = "jinbot-telegram")]
#[command(about = "Personal Telegram bot: tasks, notes, and endpoint monitoring")]
struct Args {
    /// Verbose logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load environment variables from .env.local or .env
    let _ = dotenvy::from_filename(".env.local").or_else(|_| dotenvy::dotenv());

    // Initialize logging based on verbosity
    let filter = match args.verbose {
        0 => "info,teloxide=warn",
        1 => "debug,teloxide=info",
        2 => "trace,teloxide=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = BotConfig::from_env()?;
    let monitor_config = MonitorConfig::from_env();

    let bot = JinBot::new(config, monitor_config)?;

    match bot.get_me().await {
        Ok(username) => {
            tracing::info!(username = %username, "Bot initialized successfully");
            println!("\n[bot] Jinbot");
            println!("   Bot: @{}", username);
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to get bot info");
            return Err(e.into());
        }
    }

    println!("\n[phone] Open Telegram and send /start to begin");
    println!("   Press Ctrl+C to stop\n");

    bot.start_polling().await?;

    Ok(())
}
