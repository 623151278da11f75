use colored::Colorize;

use crate::cli::{Cli, RulesCommands};
use crate::error::{HiderError, Result};
use crate::rules::{toggle_stored_rule, RuleStore};

pub async fn run(cli: &Cli, command: &RulesCommands) -> Result<()> {
    let config = super::effective_config(cli)?;
    let store = super::store_for(&config);

    match command {
        RulesCommands::List => {
            let rules = store.get_all().await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&rules)?);
                return Ok(());
            }

            if rules.is_empty() {
                println!("{} No rules stored", "!".yellow());
                return Ok(());
            }

            for (i, rule) in rules.iter().enumerate() {
                let state = if rule.is_enabled {
                    "on ".green()
                } else {
                    "off".dimmed()
                };
                println!(
                    "{:>3}. [{}] {} on {}",
                    i + 1,
                    state,
                    rule.selector.cyan(),
                    rule.url
                );
                if cli.verbose {
                    println!("       hidden={} createdAt={}", rule.is_hidden, rule.created_at);
                }
            }
        }

        RulesCommands::Toggle { selector, url } => {
            // Prefer the coordinator so the live page reflects the change;
            // with no page to drive, flip the stored flag alone.
            let enabled = match super::connect(cli).await {
                Ok(mut coordinator) => coordinator.toggle_rule(selector, url).await?,
                Err(HiderError::BrowserNotRunning) | Err(HiderError::AgentUnreachable) => {
                    toggle_stored_rule(&store, selector, url).await?
                }
                Err(e) => return Err(e),
            };

            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "success": true,
                        "isEnabled": enabled,
                    }))?
                );
            } else if enabled {
                println!("{} Rule enabled: {}", "✓".green(), selector.cyan());
            } else {
                println!("{} Rule disabled: {}", "✓".green(), selector.cyan());
            }
        }

        RulesCommands::Delete { selector, url } => {
            let remaining = match super::connect(cli).await {
                Ok(mut coordinator) => coordinator.delete_rule(selector, url).await?,
                Err(HiderError::BrowserNotRunning) | Err(HiderError::AgentUnreachable) => {
                    store.delete(selector, url).await?
                }
                Err(e) => return Err(e),
            };

            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "success": true,
                        "remaining": remaining.len(),
                    }))?
                );
            } else {
                println!(
                    "{} Rule deleted: {} ({} remaining)",
                    "✓".green(),
                    selector.cyan(),
                    remaining.len()
                );
            }
        }

        RulesCommands::Clear => {
            store.clear().await?;

            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({ "success": true }))?
                );
            } else {
                println!("{} All rules cleared", "✓".green());
            }
        }
    }

    Ok(())
}
