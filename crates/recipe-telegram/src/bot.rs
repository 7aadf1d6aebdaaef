//! Main Telegram bot implementation.

use std::net::SocketAddr;
use std::sync::Arc;

use teloxide::dispatching::{DefaultKey, UpdateFilterExt, UpdateHandler};
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use teloxide::update_listeners::webhooks;
use teloxide::utils::command::BotCommands;
use tracing::{info, warn};
use url::Url;

use crate::error::{BotError, Result};
use crate::handlers::{
    handle_callback, handle_command, handle_message, handle_unknown_command, Command,
};
use crate::state::BotContext;

/// The Telegram recipe bot.
pub struct RecipeBot {
    /// The teloxide bot instance.
    bot: Bot,
    /// Shared context across handlers.
    ctx: Arc<BotContext>,
}

impl RecipeBot {
    /// Create a bot for the given token.
    pub fn new(token: impl Into<String>, ctx: Arc<BotContext>) -> Self {
        Self {
            bot: Bot::new(token),
            ctx,
        }
    }

    /// Get the bot's username.
    pub async fn get_me(&self) -> Result<String> {
        let me = self
            .bot
            .get_me()
            .await
            .map_err(|e| BotError::BotStartFailed(e.to_string()))?;
        Ok(me.username().to_string())
    }

    /// Publish the command list shown in Telegram's menu.
    async fn register_commands(&self) {
        if let Err(e) = self.bot.set_my_commands(Command::bot_commands()).await {
            warn!(error = %e, "Failed to register bot commands");
        }
    }

    /// Start the bot in long polling mode.
    pub async fn start_polling(&self) -> Result<()> {
        info!("Starting Telegram bot in polling mode...");
        self.register_commands().await;

        info!("Bot is running! Send /start to begin.");
        self.dispatcher().dispatch().await;
        Ok(())
    }

    /// Start the bot behind a webhook.
    ///
    /// Listens on `addr` and registers `url` with Telegram as the webhook.
    pub async fn start_webhook(&self, addr: SocketAddr, url: Url) -> Result<()> {
        info!(addr = %addr, url = %url, "Starting Telegram bot in webhook mode...");
        self.register_commands().await;

        let listener = webhooks::axum(self.bot.clone(), webhooks::Options::new(addr, url))
            .await
            .map_err(|e| BotError::WebhookFailed(e.to_string()))?;

        info!("Bot is running! Send /start to begin.");
        self.dispatcher()
            .dispatch_with_listener(
                listener,
                LoggingErrorHandler::with_custom_text("An error from the update listener"),
            )
            .await;
        Ok(())
    }

    fn dispatcher(&self) -> Dispatcher<Bot, teloxide::RequestError, DefaultKey> {
        Dispatcher::builder(self.bot.clone(), schema(Arc::clone(&self.ctx)))
            .default_handler(|upd| async move {
                warn!("Unhandled update: {:?}", upd);
            })
            .enable_ctrlc_handler()
            .build()
    }
}

/// Routing for incoming updates: buttons, commands, unknown commands, text.
pub fn schema(ctx: Arc<BotContext>) -> UpdateHandler<teloxide::RequestError> {
    let ctx_for_callbacks = Arc::clone(&ctx);
    let ctx_for_commands = Arc::clone(&ctx);
    let ctx_for_messages = ctx;

    dptree::entry()
        .branch(
            Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
                let ctx = Arc::clone(&ctx_for_callbacks);
                async move { handle_callback(bot, q, ctx).await }
            }),
        )
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(move |bot: Bot, msg: Message, cmd: Command| {
                    let ctx = Arc::clone(&ctx_for_commands);
                    info!(chat_id = %msg.chat.id, "Command matched: {:?}", cmd);
                    async move { handle_command(bot, msg, cmd, ctx).await }
                }),
        )
        .branch(
            Update::filter_message()
                .filter(|msg: Message| msg.text().is_some_and(|t| t.starts_with('/')))
                .endpoint(handle_unknown_command),
        )
        .branch(
            Update::filter_message()
                .filter(|msg: Message| msg.text().is_some_and(|t| !t.starts_with('/')))
                .endpoint(move |bot: Bot, msg: Message| {
                    let ctx = Arc::clone(&ctx_for_messages);
                    async move { handle_message(bot, msg, ctx).await }
                }),
        )
}
