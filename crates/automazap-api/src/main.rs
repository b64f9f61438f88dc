//! AutomaZap CLI entry point.
//!
//! Binary name: `azap`
//!
//! Parses CLI arguments, wires the store and services, then dispatches to
//! the command handler.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;

use automazap_types::bot::CreateBotRequest;

use cli::{Cli, Commands, Output};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,automazap_core=debug,automazap_api=debug",
        _ => "trace",
    };
    automazap_observe::init_tracing(filter, cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "azap", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init().await?;
    let out = Output {
        json: cli.json,
        quiet: cli.quiet,
    };

    let result = run(&state, cli.command, out).await;

    state.store.shutdown();
    automazap_observe::shutdown_tracing();
    result
}

async fn run(state: &AppState, command: Commands, out: Output) -> anyhow::Result<()> {
    match command {
        Commands::Bots => cli::bot::list_bots(state, out).await,
        Commands::Create {
            name,
            description,
            personality,
            speed,
            language,
            welcome,
            user,
        } => {
            let request = CreateBotRequest {
                personality,
                response_time: speed,
                language,
                welcome_message: welcome,
                ..CreateBotRequest::new(name, description)
            };
            let bot = cli::bot::create(state, request, out).await?;
            cli::chat::loop_runner::run_chat_loop(state, Some(&bot.id.to_string()), &user).await
        }
        Commands::Chat { bot, user } => {
            cli::chat::loop_runner::run_chat_loop(state, bot.as_deref(), &user).await
        }
        Commands::Analytics { bot } => cli::bot::show_analytics(state, bot.as_deref(), out).await,
        Commands::Users { bot, search } => {
            cli::bot::list_users(state, bot.as_deref(), search.as_deref(), out).await
        }
        Commands::Connect { kind, bot } => cli::bot::connect(state, bot.as_deref(), kind, out).await,
        Commands::Embed { bot } => cli::bot::embed(state, bot.as_deref(), out).await,
        Commands::Plans => cli::account::list_plans(state, out).await,
        Commands::Login { email, password } => {
            cli::account::login(state, &email, password, out).await
        }
        Commands::Signup {
            email,
            name,
            password,
        } => cli::account::signup(state, &email, &name, password, out).await,
        Commands::Logout => cli::account::logout(state, out).await,
        Commands::Whoami => cli::account::whoami(state, out).await,
        Commands::Subscribe { plan } => cli::account::subscribe(state, &plan, out).await,
        Commands::Cancel { yes } => cli::account::cancel(state, yes, out).await,
        Commands::Completions { .. } => Ok(()),
    }
}
