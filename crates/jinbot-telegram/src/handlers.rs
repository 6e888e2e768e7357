//! Command handlers for the Telegram bot.

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::ParseMode;
use teloxide::utils::command::BotCommands;
use teloxide::utils::html;
use tracing::{debug, info, warn};

use jinbot_models::{Task, TaskPriority};

use crate::auth::{required_level, DENIAL_MESSAGE};
use crate::state::BotState;

/// Bot commands that can be invoked with /.
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Start the bot and get help")]
    Start,

    #[command(description = "Show help message")]
    Help,

    #[command(description = "Add a task: /task [high|low] <description>")]
    Task(String),

    #[command(description = "Complete a task: /done <id>")]
    Done(String),

    #[command(description = "List pending tasks")]
    Tasks,

    #[command(description = "Search tasks: /find <keyword>")]
    Find(String),

    #[command(description = "Save a note: /note <text>")]
    Note(String),

    #[command(description = "Search saved messages: /messages <keyword>")]
    Messages(String),

    #[command(description = "Show recent messages: /recent [hours]")]
    Recent(String),

    #[command(description = "Run the endpoint checks now")]
    Check,

    #[command(description = "Show bot status")]
    Status,

    #[command(description = "Show store statistics")]
    Stats,

    #[command(description = "Set a preference: /set <key> <value>")]
    Set(String),

    #[command(description = "List preferences")]
    Settings,
}

/// Entry point for all parsed commands.
///
/// Authorization is resolved once here; handlers below never check it
/// again.
pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: Arc<BotState>,
) -> ResponseResult<()> {
    let username = msg
        .from
        .as_ref()
        .and_then(|u| u.username.as_deref());
    let granted = state.authorizer.level_for(msg.chat.id.0, username);

    if required_level(&cmd) > granted {
        bot.send_message(msg.chat.id, DENIAL_MESSAGE).await?;
        info!(chat_id = %msg.chat.id, cmd = ?cmd, "restricted command denied");
        return Ok(());
    }

    match cmd {
        Command::Start => handle_start(bot, msg).await,
        Command::Help => handle_help(bot, msg).await,
        Command::Task(args) => handle_task(bot, msg, state, args).await,
        Command::Done(args) => handle_done(bot, msg, state, args).await,
        Command::Tasks => handle_tasks(bot, msg, state).await,
        Command::Find(args) => handle_find(bot, msg, state, args).await,
        Command::Note(args) => handle_note(bot, msg, state, args).await,
        Command::Messages(args) => handle_messages(bot, msg, state, args).await,
        Command::Recent(args) => handle_recent(bot, msg, state, args).await,
        Command::Check => handle_check(bot, msg, state).await,
        Command::Status => handle_status(bot, msg, state).await,
        Command::Stats => handle_stats(bot, msg, state).await,
        Command::Set(args) => handle_set(bot, msg, state, args).await,
        Command::Settings => handle_settings(bot, msg, state).await,
    }
}

/// Handle the /start command.
async fn handle_start(bot: Bot, msg: Message) -> ResponseResult<()> {
    let welcome = "Hi, I'm Jinbot. 👋\n\n\
        I keep tasks, remember messages, and watch your endpoints.\n\n\
        <b>Getting started:</b>\n\
        1. /task buy groceries - add a task\n\
        2. /tasks - see what's pending\n\
        3. /note or just send me text - I'll remember it\n\
        4. /check - probe the monitored endpoints now\n\n\
        Type /help for all commands.";

    bot.send_message(msg.chat.id, welcome)
        .parse_mode(ParseMode::Html)
        .await?;

    info!(chat_id = %msg.chat.id, user = ?msg.from.as_ref().map(|u| &u.username), "user started bot");
    Ok(())
}

/// Handle the /help command.
async fn handle_help(bot: Bot, msg: Message) -> ResponseResult<()> {
    let help_text = Command::descriptions().to_string();
    bot.send_message(msg.chat.id, help_text).await?;
    Ok(())
}

/// Splits an optional leading priority keyword off the task text.
fn parse_task_args(args: &str) -> (TaskPriority, &str) {
    let trimmed = args.trim();
    if let Some((first, rest)) = trimmed.split_once(char::is_whitespace) {
        if let Some(priority) = TaskPriority::from_keyword(first) {
            return (priority, rest.trim_start());
        }
    }
    (TaskPriority::Medium, trimmed)
}

/// Handle the /task command.
async fn handle_task(
    bot: Bot,
    msg: Message,
    state: Arc<BotState>,
    args: String,
) -> ResponseResult<()> {
    let (priority, description) = parse_task_args(&args);

    if description.is_empty() {
        bot.send_message(
            msg.chat.id,
            "Usage: <code>/task [high|low] &lt;description&gt;</code>",
        )
        .parse_mode(ParseMode::Html)
        .await?;
        return Ok(());
    }

    match state.store.add_task(description, priority, Vec::new()) {
        Ok(task) => {
            bot.send_message(
                msg.chat.id,
                format!(
                    "Task <b>#{}</b> added ({} priority).",
                    task.id,
                    format!("{:?}", task.priority).to_lowercase()
                ),
            )
            .parse_mode(ParseMode::Html)
            .await?;
            info!(chat_id = %msg.chat.id, task_id = task.id, "task added");
        }
        Err(e) => {
            bot.send_message(msg.chat.id, format!("❌ {}", e)).await?;
        }
    }
    Ok(())
}

/// Handle the /done command.
async fn handle_done(
    bot: Bot,
    msg: Message,
    state: Arc<BotState>,
    args: String,
) -> ResponseResult<()> {
    let id = match args.trim().trim_start_matches('#').parse::<u64>() {
        Ok(id) => id,
        Err(_) => {
            bot.send_message(msg.chat.id, "Usage: /done <id> (a task number from /tasks)")
                .await?;
            return Ok(());
        }
    };

    match state.store.complete_task(id) {
        Some(task) => {
            bot.send_message(
                msg.chat.id,
                format!("✅ Task #{} done: {}", task.id, html::escape(&task.description)),
            )
            .parse_mode(ParseMode::Html)
            .await?;
            info!(chat_id = %msg.chat.id, task_id = id, "task completed");
        }
        None => {
            bot.send_message(msg.chat.id, format!("Task #{} not found.", id))
                .await?;
        }
    }
    Ok(())
}

fn priority_marker(task: &Task) -> &'static str {
    match task.priority {
        TaskPriority::High => "‼️",
        TaskPriority::Medium => "▫️",
        TaskPriority::Low => "▪️",
    }
}

/// Handle the /tasks command.
async fn handle_tasks(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let pending = state.store.pending_tasks(10);

    if pending.is_empty() {
        bot.send_message(msg.chat.id, "No pending tasks. 🎉").await?;
        return Ok(());
    }

    let mut text = format!("<b>Pending tasks</b> ({}):\n", pending.len());
    for task in &pending {
        text.push_str(&format!(
            "{} #{} {}\n",
            priority_marker(task),
            task.id,
            html::escape(&task.description)
        ));
    }
    text.push_str("\nComplete one with /done <id>");

    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

/// Handle the /find command.
async fn handle_find(
    bot: Bot,
    msg: Message,
    state: Arc<BotState>,
    args: String,
) -> ResponseResult<()> {
    let keyword = args.trim();
    if keyword.is_empty() {
        bot.send_message(msg.chat.id, "Usage: /find <keyword>").await?;
        return Ok(());
    }

    let mut found = state.store.search_tasks(keyword, None);
    found.truncate(10);

    if found.is_empty() {
        bot.send_message(msg.chat.id, format!("No tasks matching \"{}\".", keyword))
            .await?;
        return Ok(());
    }

    let mut text = format!("<b>Tasks matching \"{}\"</b>:\n", html::escape(keyword));
    for task in &found {
        let check = if task.is_pending() { "☐" } else { "☑" };
        text.push_str(&format!(
            "{} #{} {}\n",
            check,
            task.id,
            html::escape(&task.description)
        ));
    }

    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

/// Label for where a message came from: chat title, else username,
/// else the bare chat id.
fn chat_label(msg: &Message) -> String {
    if let Some(title) = msg.chat.title() {
        return title.to_string();
    }
    if let Some(username) = msg.from.as_ref().and_then(|u| u.username.as_deref()) {
        return username.to_string();
    }
    msg.chat.id.0.to_string()
}

/// Saves text as a message and replies with what was derived from it.
async fn save_message(
    bot: &Bot,
    msg: &Message,
    state: &BotState,
    text: &str,
) -> ResponseResult<()> {
    match state.store.add_message(text, chat_label(msg), Vec::new()) {
        Ok(saved) => {
            let mut reply = "Noted.".to_string();
            if !saved.tags.is_empty() {
                reply.push_str(&format!(" Tags: {}.", saved.tags.join(", ")));
            }
            match saved.action_items.len() {
                0 => {}
                1 => reply.push_str(" 1 action item captured."),
                n => reply.push_str(&format!(" {} action items captured.", n)),
            }
            bot.send_message(msg.chat.id, reply).await?;
            debug!(chat_id = %msg.chat.id, message_id = %saved.id, "message saved");
        }
        Err(e) => {
            bot.send_message(msg.chat.id, format!("❌ {}", e)).await?;
        }
    }
    Ok(())
}

/// Handle the /note command.
async fn handle_note(
    bot: Bot,
    msg: Message,
    state: Arc<BotState>,
    args: String,
) -> ResponseResult<()> {
    let text = args.trim();
    if text.is_empty() {
        bot.send_message(msg.chat.id, "Usage: /note <text>").await?;
        return Ok(());
    }
    save_message(&bot, &msg, &state, text).await
}

/// Handle the /messages command.
async fn handle_messages(
    bot: Bot,
    msg: Message,
    state: Arc<BotState>,
    args: String,
) -> ResponseResult<()> {
    let keyword = args.trim();
    if keyword.is_empty() {
        bot.send_message(msg.chat.id, "Usage: /messages <keyword>").await?;
        return Ok(());
    }

    let found = state.store.search_messages(keyword, 5);
    if found.is_empty() {
        bot.send_message(msg.chat.id, format!("No messages matching \"{}\".", keyword))
            .await?;
        return Ok(());
    }

    let mut text = format!("<b>Messages matching \"{}\"</b>:\n", html::escape(keyword));
    for m in &found {
        text.push_str(&format!(
            "• <i>{}</i> [{}] {}\n",
            m.timestamp.format("%b %d %H:%M"),
            html::escape(&m.source_chat),
            html::escape(&m.text)
        ));
    }

    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

/// Parses an hour count, defaulting to 24.
fn parse_hours(args: &str) -> i64 {
    args.trim().parse().unwrap_or(24)
}

/// Handle the /recent command.
async fn handle_recent(
    bot: Bot,
    msg: Message,
    state: Arc<BotState>,
    args: String,
) -> ResponseResult<()> {
    let hours = parse_hours(&args);
    let recent = state.store.recent_messages(hours, 10);

    if recent.is_empty() {
        bot.send_message(
            msg.chat.id,
            format!("Nothing saved in the last {} hours.", hours),
        )
        .await?;
        return Ok(());
    }

    let mut text = format!("<b>Last {} hours</b> ({} messages):\n", hours, recent.len());
    for m in &recent {
        text.push_str(&format!(
            "• <i>{}</i> {}\n",
            m.timestamp.format("%H:%M"),
            html::escape(&m.text)
        ));
    }

    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

/// Handle the /check command: run the monitoring loop on demand.
async fn handle_check(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let endpoints = state.monitor.config().endpoints.len();
    if endpoints == 0 {
        bot.send_message(
            msg.chat.id,
            "No endpoints configured. Set MONITOR_ENDPOINTS to a comma-separated URL list.",
        )
        .await?;
        return Ok(());
    }

    bot.send_message(msg.chat.id, format!("Checking {} endpoints…", endpoints))
        .await?;

    let summary = state.monitor.run_check().await;
    let took_ms = (summary.finished_at - summary.started_at).num_milliseconds();

    bot.send_message(
        msg.chat.id,
        format!(
            "Checked {}: {} healthy, {} alerts ({}ms).",
            summary.endpoints_checked, summary.healthy_count, summary.alerts_generated, took_ms
        ),
    )
    .await?;
    Ok(())
}

/// Handle the /status command.
async fn handle_status(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let stats = state.store.stats();
    let uptime = state.uptime_seconds();

    let text = format!(
        "<b>Jinbot status</b>\n\
        Uptime: {}h {}m\n\
        Storage: {}\n\
        Monitored endpoints: {}\n\
        Version: {}",
        uptime / 3600,
        (uptime % 3600) / 60,
        stats.storage,
        state.monitor.config().endpoints.len(),
        env!("CARGO_PKG_VERSION"),
    );

    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

/// Handle the /stats command.
async fn handle_stats(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let stats = state.store.stats();

    let text = format!(
        "<b>Store statistics</b>\n\
        Tasks: {} total, {} pending, {} done\n\
        Messages: {}\n\
        Storage: {}",
        stats.total_tasks,
        stats.pending_tasks,
        stats.completed_tasks,
        stats.message_count,
        stats.storage,
    );

    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

/// Handle the /set command.
async fn handle_set(
    bot: Bot,
    msg: Message,
    state: Arc<BotState>,
    args: String,
) -> ResponseResult<()> {
    let Some((key, value)) = args.trim().split_once(char::is_whitespace) else {
        bot.send_message(msg.chat.id, "Usage: /set <key> <value>").await?;
        return Ok(());
    };

    let durable = state.store.set_setting(key, value.trim());
    let reply = if durable {
        format!("Setting \"{}\" saved.", key)
    } else {
        format!("Setting \"{}\" saved (in-memory only, storage degraded).", key)
    };
    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}

/// Handle the /settings command.
async fn handle_settings(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let settings = state.store.settings();

    if settings.is_empty() {
        bot.send_message(msg.chat.id, "No settings stored. Use /set <key> <value>.")
            .await?;
        return Ok(());
    }

    let mut text = "<b>Settings</b>\n".to_string();
    for (key, value) in &settings {
        text.push_str(&format!(
            "• {} = {}\n",
            html::escape(key),
            html::escape(value)
        ));
    }

    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

/// Handle plain (non-command) text messages.
///
/// Operator text is remembered like /note; anything else is ignored.
pub async fn handle_message(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let username = msg.from.as_ref().and_then(|u| u.username.as_deref());
    if state.authorizer.level_for(msg.chat.id.0, username) < crate::auth::AuthLevel::Owner {
        debug!(chat_id = %msg.chat.id, "ignoring text from unauthorized chat");
        return Ok(());
    }

    if text.trim().is_empty() {
        return Ok(());
    }

    save_message(&bot, &msg, &state, text).await
}

/// Handle a message that starts with / but did not parse as a command.
pub async fn handle_unknown_command(bot: Bot, msg: Message) -> ResponseResult<()> {
    if let Some(text) = msg.text() {
        warn!(cmd = %text, "unrecognized command");
        bot.send_message(
            msg.chat.id,
            format!(
                "Unknown command: {}\n\nUse /help to see available commands.",
                text.split_whitespace().next().unwrap_or(text)
            ),
        )
        .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_task_args_default_priority() {
        let (priority, description) = parse_task_args("buy groceries");
        assert_eq!(priority, TaskPriority::Medium);
        assert_eq!(description, "buy groceries");
    }

    #[test]
    fn test_parse_task_args_leading_priority() {
        let (priority, description) = parse_task_args("high call the bank");
        assert_eq!(priority, TaskPriority::High);
        assert_eq!(description, "call the bank");

        let (priority, description) = parse_task_args("LOW water plants");
        assert_eq!(priority, TaskPriority::Low);
        assert_eq!(description, "water plants");
    }

    #[test]
    fn test_parse_task_args_priority_word_alone_is_description() {
        let (priority, description) = parse_task_args("high");
        assert_eq!(priority, TaskPriority::Medium);
        assert_eq!(description, "high");
    }

    #[test]
    fn test_parse_hours() {
        assert_eq!(parse_hours("6"), 6);
        assert_eq!(parse_hours(""), 24);
        assert_eq!(parse_hours("soon"), 24);
    }

    #[test]
    fn test_command_parsing() {
        let cmd = Command::parse("/task high fix the roof", "jinbot").unwrap();
        assert!(matches!(cmd, Command::Task(args) if args == "high fix the roof"));

        let cmd = Command::parse("/tasks", "jinbot").unwrap();
        assert!(matches!(cmd, Command::Tasks));
    }
}
