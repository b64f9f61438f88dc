//! Bot CLI commands: list, create, analytics, users, connect, embed.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use automazap_types::bot::{Bot, CreateBotRequest, IntegrationKind, IntegrationStatus};
use automazap_types::user::EndUser;

use crate::cli::notice::flush_notices;
use crate::cli::{Output, resolve_bot, spinner};
use crate::state::AppState;

fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        header
            .iter()
            .map(|h| Cell::new(h).fg(Color::White))
            .collect::<Vec<_>>(),
    );
    table
}

fn integration_label(bot: &Bot) -> String {
    match &bot.integration {
        Some(i) => format!("{} ({})", i.kind, i.status),
        None => "-".to_string(),
    }
}

/// List all bots in a table.
pub async fn list_bots(state: &AppState, out: Output) -> Result<()> {
    let bots = state.store.list_bots().await;

    if out.json {
        println!("{}", serde_json::to_string_pretty(&bots)?);
        return Ok(());
    }

    let mut table = table(&["Name", "Status", "Personality", "Messages", "Users", "Integration", "ID"]);
    for bot in &bots {
        let status = if bot.is_active {
            Cell::new("● ativo").fg(Color::Green)
        } else {
            Cell::new("○ inativo").fg(Color::Yellow)
        };
        table.add_row(vec![
            Cell::new(&bot.name).fg(Color::Cyan),
            status,
            Cell::new(bot.personality.to_string()),
            Cell::new(bot.stats.messages),
            Cell::new(bot.stats.users),
            Cell::new(integration_label(bot)),
            Cell::new(bot.id.to_string()).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    Ok(())
}

/// Create a bot. The store lives for this process only, so the caller
/// chats with it right away.
pub async fn create(state: &AppState, request: CreateBotRequest, out: Output) -> Result<Bot> {
    let mut rx = state.events.subscribe();
    let bot = state.store.create_bot(request).await;

    if out.json {
        println!("{}", serde_json::to_string_pretty(&bot)?);
        return Ok(bot);
    }

    println!();
    flush_notices(&mut rx, out.styled());
    if out.styled() {
        println!("  {}  {}", style("ID:").bold(), style(bot.id).dim());
    }
    Ok(bot)
}

/// Show daily stats, top questions and satisfaction for a bot.
pub async fn show_analytics(state: &AppState, bot: Option<&str>, out: Output) -> Result<()> {
    let bot = resolve_bot(state, bot).await?;
    let Some(analytics) = state.store.get_bot_analytics(&bot.id).await else {
        anyhow::bail!("no analytics recorded for bot {}", bot.id);
    };

    if out.json {
        println!("{}", serde_json::to_string_pretty(&analytics)?);
        return Ok(());
    }

    println!();
    println!("  {} {}", style("Analytics:").bold(), style(&bot.name).cyan().bold());
    println!();
    println!(
        "  {}  {}",
        style("Total messages:").bold(),
        analytics.total_messages()
    );
    println!(
        "  {}  {:.0}%",
        style("Satisfaction:").bold(),
        analytics.user_satisfaction
    );
    println!(
        "  {}  {:.1}s",
        style("Avg. response:").bold(),
        analytics.average_response_time
    );
    println!();

    let mut daily = table(&["Date", "Messages", "Users", "Response (s)"]);
    for day in &analytics.daily_stats {
        daily.add_row(vec![
            Cell::new(day.date.format("%d/%m/%Y")),
            Cell::new(day.message_count),
            Cell::new(day.user_count),
            Cell::new(format!("{:.1}", day.response_time)),
        ]);
    }
    println!("{daily}");

    if !analytics.top_questions.is_empty() {
        let mut questions = table(&["Top questions", "Count"]);
        for q in &analytics.top_questions {
            questions.add_row(vec![Cell::new(&q.question), Cell::new(q.count)]);
        }
        println!();
        println!("{questions}");
    }
    println!();
    Ok(())
}

fn format_last_seen(user: &EndUser) -> String {
    user.last_interaction
        .map(|t| t.format("%d/%m/%Y %H:%M").to_string())
        .unwrap_or_else(|| "never".to_string())
}

/// List a bot's end users, optionally filtered.
pub async fn list_users(
    state: &AppState,
    bot: Option<&str>,
    search: Option<&str>,
    out: Output,
) -> Result<()> {
    let bot = resolve_bot(state, bot).await?;
    let users = match search {
        Some(term) => state.store.search_bot_users(&bot.id, term).await,
        None => state.store.get_bot_users(&bot.id).await,
    };

    if out.json {
        println!("{}", serde_json::to_string_pretty(&users)?);
        return Ok(());
    }

    if users.is_empty() {
        println!();
        println!("  {} No users found for {}", style("i").blue().bold(), style(&bot.name).cyan());
        println!();
        return Ok(());
    }

    let mut table = table(&["Name", "Phone", "Email", "Messages", "Last seen"]);
    for user in &users {
        let count = user
            .bot_interactions
            .get(&bot.id)
            .map(|i| i.message_count)
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(&user.name).fg(Color::Cyan),
            Cell::new(user.phone_number.as_deref().unwrap_or("-")),
            Cell::new(user.email.as_deref().unwrap_or("-")),
            Cell::new(count),
            Cell::new(format_last_seen(user)),
        ]);
    }
    println!();
    println!("{table}");
    println!();
    Ok(())
}

/// Pair a bot with a channel, waiting for the simulated pairing to finish.
pub async fn connect(
    state: &AppState,
    bot: Option<&str>,
    kind: IntegrationKind,
    out: Output,
) -> Result<()> {
    let bot = resolve_bot(state, bot).await?;
    let mut rx = state.events.subscribe();

    let task = state.store.connect_integration(&bot.id, kind).await?;
    let progress = out
        .styled()
        .then(|| spinner("Aguardando leitura do QR code..."))
        .transpose()?;
    let integration = task.wait().await;
    if let Some(progress) = progress {
        progress.finish_and_clear();
    }
    let integration = integration?;

    if out.json {
        println!("{}", serde_json::to_string_pretty(&integration)?);
        return Ok(());
    }

    println!();
    flush_notices(&mut rx, out.styled());
    if out.styled() && integration.status == IntegrationStatus::Connected && kind == IntegrationKind::Website {
        println!();
        println!("  {}", style("Add this snippet to your site:").dim());
        println!("  {}", automazap_core::store::embed_snippet_for(&bot.id));
    }
    println!();
    Ok(())
}

/// Print the embed snippet for a bot.
pub async fn embed(state: &AppState, bot: Option<&str>, out: Output) -> Result<()> {
    let bot = resolve_bot(state, bot).await?;
    let Some(snippet) = state.store.embed_snippet(&bot.id).await else {
        anyhow::bail!("bot {} not found", bot.id);
    };

    if out.json {
        println!("{}", serde_json::json!({ "botId": bot.id, "snippet": snippet }));
    } else {
        println!("{snippet}");
    }
    Ok(())
}
