use colored::Colorize;

use crate::browser::{SessionManager, SessionStatus};
use crate::cli::{BrowserCommands, Cli};
use crate::error::Result;

pub async fn run(cli: &Cli, command: &BrowserCommands) -> Result<()> {
    let config = super::effective_config(cli)?;
    let session = SessionManager::new(config.browser.clone());

    match command {
        BrowserCommands::Status => {
            let status = session.status().await;

            if cli.json {
                let value = match &status {
                    SessionStatus::Running { cdp_port, pages } => serde_json::json!({
                        "running": true,
                        "cdpPort": cdp_port,
                        "pages": pages.iter().map(|p| serde_json::json!({
                            "title": p.title,
                            "url": p.url,
                        })).collect::<Vec<_>>(),
                    }),
                    SessionStatus::Stale => serde_json::json!({ "running": false, "stale": true }),
                    SessionStatus::NotRunning => serde_json::json!({ "running": false }),
                };
                println!("{}", serde_json::to_string_pretty(&value)?);
                return Ok(());
            }

            match status {
                SessionStatus::Running { cdp_port, pages } => {
                    println!("{} Browser running (CDP port {})", "✓".green(), cdp_port);
                    for page in pages {
                        println!("  {} {}", "·".dimmed(), page.url);
                    }
                }
                SessionStatus::Stale => {
                    println!("{} Recorded session is dead; run 'browser open'", "!".yellow());
                }
                SessionStatus::NotRunning => {
                    println!("{} Browser not running", "!".yellow());
                }
            }
        }

        BrowserCommands::Open { url } => {
            session.open_url(url).await?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({ "success": true }))?
                );
            } else {
                println!("{} Opened {}", "✓".green(), url);
            }
        }

        BrowserCommands::Close => {
            session.close().await?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({ "success": true }))?
                );
            } else {
                println!("{} Browser closed", "✓".green());
            }
        }
    }

    Ok(())
}
