//! Command handlers for the Telegram bot.
//!
//! These functions only translate between teloxide types and [`crate::flow`].

use std::sync::Arc;

use recipe_models::UserId;
use teloxide::prelude::*;
use teloxide::types::{
    ChatAction, InlineKeyboardButton, InlineKeyboardMarkup, MaybeInaccessibleMessage, ParseMode,
};
use teloxide::utils::command::BotCommands;
use tracing::{debug, info, warn};

use crate::flow::{self, Keyboard, Reply};
use crate::state::BotContext;

/// Bot commands that can be invoked with /.
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Start the bot and get help")]
    Start,

    #[command(description = "Show help message")]
    Help,

    #[command(description = "Create a recipe from ingredients: /generate [chicken, rice, ...]")]
    Generate(String),

    #[command(description = "Save your own recipe: /add [name]")]
    Add(String),

    #[command(description = "Browse your saved recipes")]
    List,

    #[command(description = "Edit a recipe: /edit <id>")]
    Edit(String),

    #[command(description = "Delete a recipe: /delete <id>")]
    Delete(String),

    #[command(description = "Stop the current action")]
    Cancel,
}

fn to_markup(keyboard: &Keyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(keyboard.iter().map(|row| {
        row.iter()
            .map(|b| InlineKeyboardButton::callback(b.label.clone(), b.action.to_string()))
            .collect::<Vec<_>>()
    }))
}

/// Send a reply as a new HTML message.
async fn send_reply(bot: &Bot, chat_id: ChatId, reply: Reply) -> ResponseResult<()> {
    let mut req = bot.send_message(chat_id, reply.text).parse_mode(ParseMode::Html);
    if let Some(keyboard) = &reply.keyboard {
        req = req.reply_markup(to_markup(keyboard));
    }
    req.await?;
    Ok(())
}

fn sender(msg: &Message) -> Option<UserId> {
    msg.from.as_ref().map(|u| UserId(u.id.0))
}

/// Handle the /help command.
pub async fn handle_help(bot: Bot, msg: Message) -> ResponseResult<()> {
    bot.send_message(msg.chat.id, Command::descriptions().to_string())
        .await?;
    Ok(())
}

/// Dispatch commands to appropriate handlers.
pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    ctx: Arc<BotContext>,
) -> ResponseResult<()> {
    let Some(user_id) = sender(&msg) else {
        debug!(chat_id = %msg.chat.id, "Command without a sender, ignoring");
        return Ok(());
    };

    let reply = match cmd {
        Command::Start => {
            info!(chat_id = %msg.chat.id, user_id = %user_id, "User started bot");
            flow::start(msg.from.as_ref().map(|u| u.first_name.as_str()))
        }
        Command::Help => return handle_help(bot, msg).await,
        Command::Generate(args) => {
            if !args.trim().is_empty() {
                let _ = bot.send_chat_action(msg.chat.id, ChatAction::Typing).await;
            }
            flow::begin_generate(&ctx, user_id, &args).await
        }
        Command::Add(args) => flow::begin_add(&ctx, user_id, &args).await,
        Command::List => flow::list(&ctx, user_id).await,
        Command::Edit(args) => flow::begin_edit(&ctx, user_id, &args).await,
        Command::Delete(args) => flow::delete_command(&ctx, user_id, &args).await,
        Command::Cancel => flow::cancel(&ctx, user_id).await,
    };

    send_reply(&bot, msg.chat.id, reply).await
}

/// Handle a non-command text message.
pub async fn handle_message(bot: Bot, msg: Message, ctx: Arc<BotContext>) -> ResponseResult<()> {
    let (Some(user_id), Some(text)) = (sender(&msg), msg.text()) else {
        return Ok(());
    };

    let expects_generation = ctx
        .dialogue(user_id)
        .await
        .is_some_and(|d| d.expects_generation());
    if expects_generation {
        let _ = bot.send_chat_action(msg.chat.id, ChatAction::Typing).await;
    }

    let reply = flow::message(&ctx, user_id, text).await;
    send_reply(&bot, msg.chat.id, reply).await
}

/// Handle a pressed inline keyboard button.
///
/// The reply replaces the message the button belongs to when possible.
pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    ctx: Arc<BotContext>,
) -> ResponseResult<()> {
    bot.answer_callback_query(q.id.clone()).await?;

    let user_id = UserId(q.from.id.0);
    let data = q.data.as_deref().unwrap_or_default();
    debug!(user_id = %user_id, data = %data, "Callback received");

    if data.starts_with("improve:") {
        if let Some(message) = &q.message {
            let _ = bot.send_chat_action(message.chat().id, ChatAction::Typing).await;
        }
    }

    let reply = flow::callback(&ctx, user_id, data).await;

    match &q.message {
        Some(message) => edit_or_send(&bot, message, reply).await,
        None => send_reply(&bot, ChatId(user_id.get() as i64), reply).await,
    }
}

async fn edit_or_send(
    bot: &Bot,
    message: &MaybeInaccessibleMessage,
    reply: Reply,
) -> ResponseResult<()> {
    let chat_id = message.chat().id;
    let mut req = bot
        .edit_message_text(chat_id, message.id(), reply.text.clone())
        .parse_mode(ParseMode::Html);
    if let Some(keyboard) = &reply.keyboard {
        req = req.reply_markup(to_markup(keyboard));
    }

    if let Err(e) = req.await {
        // Old or inaccessible messages cannot be edited; answer with a new one
        warn!(chat_id = %chat_id, error = %e, "Failed to edit message, sending a new one");
        send_reply(bot, chat_id, reply).await?;
    }
    Ok(())
}

/// Handle a message that looks like a command but did not parse.
pub async fn handle_unknown_command(bot: Bot, msg: Message) -> ResponseResult<()> {
    if let Some(text) = msg.text() {
        info!(cmd = %text, "Unrecognized command");
        let name = text.split_whitespace().next().unwrap_or(text);
        bot.send_message(
            msg.chat.id,
            format!("Unknown command: {}\n\nUse /help to see available commands.", name),
        )
        .await?;
    }
    Ok(())
}
