//! Welcome banner display for chat sessions.

use std::io::Write;

use console::style;

use automazap_types::bot::Bot;

/// Print the bot's name, description and settings, plus a slash-command hint.
pub fn print_welcome_banner(out: &mut impl Write, bot: &Bot, user: &str) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "  {} {}", bot.avatar.as_deref().unwrap_or("*"), style(&bot.name).cyan().bold())?;
    writeln!(out, "  {}", style(&bot.description).dim())?;
    writeln!(out)?;
    writeln!(
        out,
        "  {}  {}",
        style("Personality:").bold(),
        style(bot.personality).dim()
    )?;
    writeln!(out, "  {}  {}", style("Speed:").bold(), style(bot.speed()).dim())?;
    writeln!(out, "  {}  {}", style("User:").bold(), style(user).dim())?;
    if !bot.is_active {
        writeln!(
            out,
            "  {}",
            style("This bot is inactive; it will still reply here.").yellow()
        )?;
    }
    writeln!(out)?;
    writeln!(out, "  {}", style("Type /help for commands, Ctrl+D to exit").dim())?;
    writeln!(out, "  {}", style("---").dim())?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use automazap_types::bot::{BotId, BotStats, Personality};
    use chrono::Utc;

    #[test]
    fn banner_names_bot_and_user() {
        console::set_colors_enabled(false);
        let bot = Bot {
            id: BotId::new(),
            name: "Luna".to_string(),
            description: "Atendimento".to_string(),
            personality: Personality::Formal,
            created_at: Utc::now(),
            is_active: true,
            stats: BotStats::default(),
            avatar: None,
            welcome_message: None,
            language: None,
            response_time: None,
            knowledge_base: None,
            integration: None,
            ai_model: None,
            tags: None,
            owner_id: None,
        };

        let mut buf = Vec::new();
        print_welcome_banner(&mut buf, &bot, "u1").unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Luna"));
        assert!(text.contains("Formal"));
        assert!(text.contains("u1"));
    }
}
