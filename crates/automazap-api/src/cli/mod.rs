//! CLI command definitions for the `azap` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod account;
pub mod bot;
pub mod chat;
pub mod notice;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use indicatif::{ProgressBar, ProgressStyle};

use automazap_types::bot::{Bot, BotId, IntegrationKind, Language, Personality, ResponseSpeed};

use crate::state::AppState;

/// Create and talk to AutomaZap chatbots from the terminal.
#[derive(Parser)]
#[command(name = "azap", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List bots.
    #[command(alias = "ls")]
    Bots,

    /// Create a bot and open a chat with it.
    Create {
        name: String,

        /// Short description shown on the dashboard.
        #[arg(long, short, default_value = "")]
        description: String,

        /// Personality: formal, friendly or playful.
        #[arg(long)]
        personality: Option<Personality>,

        /// Reply speed: fast, normal or detailed.
        #[arg(long)]
        speed: Option<ResponseSpeed>,

        /// Conversation language: pt-br, en-us or es-es.
        #[arg(long)]
        language: Option<Language>,

        /// Welcome message (defaults to a greeting with the bot's name).
        #[arg(long)]
        welcome: Option<String>,

        /// End-user id to chat as.
        #[arg(long, default_value = "cli-user")]
        user: String,
    },

    /// Chat with a bot.
    Chat {
        /// Bot id (defaults to the first bot).
        #[arg(long)]
        bot: Option<String>,

        /// End-user id to chat as.
        #[arg(long, default_value = "cli-user")]
        user: String,
    },

    /// Show a bot's analytics.
    Analytics {
        /// Bot id (defaults to the first bot).
        #[arg(long)]
        bot: Option<String>,
    },

    /// List end users who talked to a bot.
    Users {
        /// Bot id (defaults to the first bot).
        #[arg(long)]
        bot: Option<String>,

        /// Filter by name, phone or email.
        #[arg(long, short)]
        search: Option<String>,
    },

    /// Connect a bot to a messaging channel.
    Connect {
        /// Channel: whatsapp, telegram or website.
        kind: IntegrationKind,

        /// Bot id (defaults to the first bot).
        #[arg(long)]
        bot: Option<String>,
    },

    /// Print the website embed snippet for a bot.
    Embed {
        /// Bot id (defaults to the first bot).
        #[arg(long)]
        bot: Option<String>,
    },

    /// Show the plan catalogue.
    Plans,

    /// Sign in.
    Login {
        email: String,

        /// Password (prompted when omitted on a terminal).
        #[arg(long)]
        password: Option<String>,
    },

    /// Create an account and sign in.
    Signup {
        email: String,
        name: String,

        /// Password (prompted when omitted on a terminal).
        #[arg(long)]
        password: Option<String>,
    },

    /// Sign out.
    Logout,

    /// Show the signed-in account.
    Whoami,

    /// Subscribe to a plan.
    Subscribe {
        /// Plan id: free, pro or enterprise.
        plan: String,
    },

    /// Cancel the active subscription.
    Cancel {
        /// Skip confirmation prompt.
        #[arg(long)]
        yes: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Global output flags passed to every handler.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
    pub quiet: bool,
}

impl Output {
    /// Whether styled, human-oriented output should be printed.
    pub fn styled(&self) -> bool {
        !self.json && !self.quiet
    }
}

/// Resolve `--bot`, falling back to the first bot in the store.
pub async fn resolve_bot(state: &AppState, bot: Option<&str>) -> Result<Bot> {
    match bot {
        Some(raw) => {
            let id: BotId = raw
                .parse()
                .with_context(|| format!("invalid bot id: {raw}"))?;
            state
                .store
                .get_bot(&id)
                .await
                .with_context(|| format!("bot {id} not found"))
        }
        None => state
            .store
            .list_bots()
            .await
            .into_iter()
            .next()
            .context("no bots available"),
    }
}

/// Steady-ticking spinner with `msg`.
pub fn spinner(msg: &str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message(msg.to_string());
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    Ok(spinner)
}
