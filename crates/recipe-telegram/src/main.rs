//! Recipe Bot Telegram binary.
//!
//! Start the bot with:
//! ```bash
//! TELEGRAM_BOT_TOKEN=xxx OPENAI_API_KEY=yyy cargo run -p recipe-telegram
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use recipe_core::config::{self, DEFAULT_LOG_LEVEL};
use recipe_core::{Config, OpenAiGenerator};
use recipe_persistence::open_store;
use recipe_telegram::{create_shared_context, BotError, RecipeBot};
use tracing_subscriber::EnvFilter;

/// Recipe Bot - generate and keep recipes from Telegram
#[derive(Parser, Debug)]
#[command(name = "recipe-telegram")]
#[command(about = "Telegram bot that generates recipes and keeps your own")]
struct Args {
    /// Use webhook mode (default: polling mode). Needs WEBHOOK_URL.
    #[arg(short, long)]
    webhook: bool,

    /// Webhook listen port (default: WEBHOOK_PORT or 8443)
    #[arg(short, long)]
    port: Option<u16>,

    /// Load environment variables from this file instead of the defaults
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Verbose logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn load_env(args: &Args) -> Result<(), dotenvy::Error> {
    if let Some(path) = &args.env_file {
        dotenvy::from_path(path)?;
        return Ok(());
    }

    // Load environment variables from the state directory first
    let env_path = config::env_file();
    if env_path.exists() {
        let _ = dotenvy::from_path(&env_path);
    }
    let _ = dotenvy::dotenv();
    Ok(())
}

/// Tracing filter for the given `-v` count and configured level.
fn log_filter(verbose: u8, level: &str) -> String {
    const CRATES: [&str; 3] = ["recipe_telegram", "recipe_core", "recipe_persistence"];
    let preset = |ours: &str, teloxide: &str| {
        let mut directives: Vec<String> = CRATES.iter().map(|c| format!("{c}={ours}")).collect();
        directives.push(format!("teloxide={teloxide}"));
        directives.join(",")
    };

    match verbose {
        0 => level.to_lowercase(),
        1 => preset("debug", "info"),
        2 => preset("trace", "debug"),
        _ => "trace".to_string(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    load_env(&args)?;

    let config = Config::from_env();

    // Initialize logging: -v flags win over LOG_LEVEL
    let level = config.as_ref().map_or(DEFAULT_LOG_LEVEL, |c| c.log_level.as_str());
    let filter = log_filter(args.verbose, level);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config.map_err(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        BotError::from(e)
    })?;

    let store = open_store(config.storage_kind, &config.storage_path).map_err(BotError::from)?;
    tracing::info!(
        backend = store.backend(),
        path = %config.storage_path.display(),
        "Recipe store ready"
    );

    let generator = OpenAiGenerator::new(config.model.clone()).map_err(BotError::from)?;
    tracing::info!(model = %config.model.model, "AI generator ready");

    let ctx = create_shared_context(store, Arc::new(generator));
    let bot = RecipeBot::new(config.telegram_bot_token.clone(), ctx);

    match bot.get_me().await {
        Ok(username) => {
            tracing::info!(username = %username, "Bot initialized successfully");
            println!("\n[chef] Recipe Bot");
            println!("   Bot: @{}", username);
            println!("   Mode: {}", if args.webhook { "webhook" } else { "polling" });
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to get bot info");
            return Err(e.into());
        }
    }

    println!("\n[phone] Open Telegram and send /start to begin");
    println!("   Press Ctrl+C to stop\n");

    if args.webhook {
        let url = config.webhook_url.clone().ok_or(BotError::NoWebhookUrl)?;
        let port = args.port.unwrap_or(config.webhook_port);
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        bot.start_webhook(addr, url).await?;
    } else {
        bot.start_polling().await?;
    }

    Ok(())
}
