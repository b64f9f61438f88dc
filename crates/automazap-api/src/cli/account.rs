//! Account and subscription CLI commands.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::{Term, style};
use dialoguer::{Confirm, Password};

use automazap_types::account::UserProfile;
use automazap_types::plan::SubscriptionPlan;

use crate::cli::notice::flush_notices;
use crate::cli::{Output, spinner};
use crate::state::AppState;

/// Use `password` or prompt for it when attached to a terminal. The mock
/// backend never checks it.
fn read_password(password: Option<String>) -> Result<String> {
    match password {
        Some(p) => Ok(p),
        None if Term::stdout().is_term() => Ok(Password::new().with_prompt("Senha").interact()?),
        None => Ok(String::new()),
    }
}

fn print_profile(profile: &UserProfile, plan: &SubscriptionPlan) {
    println!();
    println!("  {}  {}", style("Name:").bold(), style(&profile.name).cyan());
    println!("  {}  {}", style("Email:").bold(), profile.email);
    if let Some(company) = &profile.company {
        println!("  {}  {}", style("Company:").bold(), company);
    }
    println!(
        "  {}  {} ({})",
        style("Plan:").bold(),
        plan.name,
        profile.subscription_status
    );
    if let Some(end) = profile.subscription_end_date {
        println!(
            "  {}  {}",
            style("Renews:").bold(),
            end.format("%d/%m/%Y")
        );
    }
    println!(
        "  {}  {} bots, {} messages",
        style("Usage:").bold(),
        profile.bots_created,
        profile.messages_used
    );
    println!();
}

pub async fn login(state: &AppState, email: &str, password: Option<String>, out: Output) -> Result<()> {
    let password = read_password(password)?;
    let mut rx = state.events.subscribe();

    let progress = out.styled().then(|| spinner("Entrando...")).transpose()?;
    let result = state.account.login(email, &password).await;
    if let Some(progress) = progress {
        progress.finish_and_clear();
    }

    flush_notices(&mut rx, out.styled());
    let profile = result?;
    if out.json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    }
    Ok(())
}

pub async fn signup(
    state: &AppState,
    email: &str,
    name: &str,
    password: Option<String>,
    out: Output,
) -> Result<()> {
    let password = read_password(password)?;
    let mut rx = state.events.subscribe();

    let progress = out.styled().then(|| spinner("Criando conta...")).transpose()?;
    let result = state.account.signup(email, &password, name).await;
    if let Some(progress) = progress {
        progress.finish_and_clear();
    }

    flush_notices(&mut rx, out.styled());
    let profile = result?;
    if out.json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    }
    Ok(())
}

pub async fn logout(state: &AppState, out: Output) -> Result<()> {
    let mut rx = state.events.subscribe();
    state.account.logout().await?;
    flush_notices(&mut rx, out.styled());
    Ok(())
}

pub async fn whoami(state: &AppState, out: Output) -> Result<()> {
    let profile = state.account.current().await;

    if out.json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
        return Ok(());
    }

    match profile {
        Some(profile) => {
            let plan = state.subscriptions.current_plan().await;
            print_profile(&profile, plan);
        }
        None => {
            println!();
            println!(
                "  {} Not signed in. Use: {}",
                style("i").blue().bold(),
                style("azap login <email>").yellow()
            );
            println!();
        }
    }
    Ok(())
}

/// Show the plan catalogue, marking the current plan.
pub async fn list_plans(state: &AppState, out: Output) -> Result<()> {
    let plans = state.subscriptions.plans();

    if out.json {
        println!("{}", serde_json::to_string_pretty(plans)?);
        return Ok(());
    }

    let current = state.subscriptions.current_plan().await.id.clone();
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Plan").fg(Color::White),
        Cell::new("Price").fg(Color::White),
        Cell::new("Bots").fg(Color::White),
        Cell::new("Messages/month").fg(Color::White),
        Cell::new("Features").fg(Color::White),
    ]);

    for plan in plans {
        let name = if plan.id == current {
            Cell::new(format!("● {} ({})", plan.name, plan.id)).fg(Color::Green)
        } else {
            Cell::new(format!("{} ({})", plan.name, plan.id)).fg(Color::Cyan)
        };
        let price = if plan.is_free() {
            "Grátis".to_string()
        } else {
            format!("R$ {}/mês", plan.price)
        };
        let bots = plan
            .bot_limit
            .map(|n| n.to_string())
            .unwrap_or_else(|| "ilimitado".to_string());
        table.add_row(vec![
            name,
            Cell::new(price),
            Cell::new(bots),
            Cell::new(plan.message_limit),
            Cell::new(plan.features.join("\n")),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    Ok(())
}

pub async fn subscribe(state: &AppState, plan_id: &str, out: Output) -> Result<()> {
    let mut rx = state.events.subscribe();

    let progress = out
        .styled()
        .then(|| spinner("Processando pagamento..."))
        .transpose()?;
    let result = state.subscriptions.subscribe_to_plan(plan_id).await;
    if let Some(progress) = progress {
        progress.finish_and_clear();
    }

    flush_notices(&mut rx, out.styled());
    let profile = result?;
    if out.json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    }
    Ok(())
}

pub async fn cancel(state: &AppState, yes: bool, out: Output) -> Result<()> {
    if !yes && Term::stdout().is_term() {
        let confirmed = Confirm::new()
            .with_prompt("Cancelar a assinatura atual?")
            .default(false)
            .interact()?;
        if !confirmed {
            println!("  {}", style("Nada foi alterado.").dim());
            return Ok(());
        }
    }

    let mut rx = state.events.subscribe();
    let progress = out.styled().then(|| spinner("Cancelando...")).transpose()?;
    let result = state.subscriptions.cancel_subscription().await;
    if let Some(progress) = progress {
        progress.finish_and_clear();
    }

    flush_notices(&mut rx, out.styled());
    let profile = result?;
    if out.json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    }
    Ok(())
}
