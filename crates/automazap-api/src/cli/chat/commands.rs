//! Slash command parsing for the chat loop.

use std::io::Write;

use automazap_types::bot::{Personality, ResponseSpeed};
use console::style;

/// Available slash commands in the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    /// Show available commands.
    Help,
    /// Clear the terminal screen.
    Clear,
    /// Exit the chat session.
    Exit,
    /// Show this user's conversation with the bot.
    History,
    /// Show the bot's counters.
    Stats,
    /// Activate or deactivate the bot.
    Toggle,
    /// Change the bot's name.
    Rename(String),
    /// Change the bot's welcome message.
    Welcome(String),
    /// Change the reply speed tier.
    Speed(ResponseSpeed),
    /// Change the reply personality.
    Personality(Personality),
    /// Delete the bot and end the session.
    Delete,
    /// A known command with a missing or invalid argument.
    Usage(&'static str),
    /// Unknown command.
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let (cmd, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((cmd, arg)) => (cmd.to_lowercase(), arg.trim()),
        None => (trimmed.to_lowercase(), ""),
    };

    let command = match cmd.as_str() {
        "/help" | "/h" | "/?" => ChatCommand::Help,
        "/clear" | "/cls" => ChatCommand::Clear,
        "/exit" | "/quit" | "/q" => ChatCommand::Exit,
        "/history" => ChatCommand::History,
        "/stats" => ChatCommand::Stats,
        "/toggle" => ChatCommand::Toggle,
        "/delete" => ChatCommand::Delete,
        "/rename" if !arg.is_empty() => ChatCommand::Rename(arg.to_string()),
        "/rename" => ChatCommand::Usage("/rename <name>"),
        "/welcome" if !arg.is_empty() => ChatCommand::Welcome(arg.to_string()),
        "/welcome" => ChatCommand::Usage("/welcome <message>"),
        "/speed" => match arg.parse() {
            Ok(speed) => ChatCommand::Speed(speed),
            Err(_) => ChatCommand::Usage("/speed <fast|normal|detailed>"),
        },
        "/personality" => match arg.parse() {
            Ok(personality) => ChatCommand::Personality(personality),
            Err(_) => ChatCommand::Usage("/personality <formal|friendly|playful>"),
        },
        other => ChatCommand::Unknown(other.to_string()),
    };
    Some(command)
}

/// Print the help text listing all available commands.
pub fn print_help(out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "  {}", style("Available commands:").bold())?;
    writeln!(out)?;
    writeln!(out, "  {}    Show this help message", style("/help").cyan())?;
    writeln!(out, "  {}   Clear the screen", style("/clear").cyan())?;
    writeln!(out, "  {}    End the chat session", style("/exit").cyan())?;
    writeln!(out, "  {} Show conversation history", style("/history").cyan())?;
    writeln!(out, "  {}   Show the bot's counters", style("/stats").cyan())?;
    writeln!(out)?;
    writeln!(out, "  {}", style("Bot settings:").bold())?;
    writeln!(out)?;
    writeln!(out, "  {}                 Activate or deactivate the bot", style("/toggle").cyan())?;
    writeln!(out, "  {}          Rename the bot", style("/rename <name>").cyan())?;
    writeln!(out, "  {}    Set the welcome message", style("/welcome <text>").cyan())?;
    writeln!(out, "  {}           Set speed: fast, normal, detailed", style("/speed <tier>").cyan())?;
    writeln!(out, "  {}     Set personality: formal, friendly, playful", style("/personality <p>").cyan())?;
    writeln!(out, "  {}                 Delete the bot and end the session", style("/delete").cyan())?;
    writeln!(out)?;
    writeln!(
        out,
        "  {}",
        style("Ctrl+D to exit. Pending replies are dropped on exit.").dim()
    )?;
    writeln!(out)?;
    Ok(())
}
