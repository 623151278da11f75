use colored::Colorize;

use crate::cli::Cli;
use crate::error::Result;

pub async fn run(cli: &Cli, no_retry: bool) -> Result<()> {
    let mut coordinator = super::connect(cli).await?;
    let url = coordinator.agent().url().to_string();

    let applied = if no_retry {
        coordinator.reconcile_now().await?
    } else {
        coordinator.reconcile_with_retries().await?
    };

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "success": true,
                "applied": applied,
                "url": url,
            }))?
        );
    } else if applied == 0 {
        println!("{} No matching rules for {}", "!".yellow(), url);
    } else {
        println!("{} {} element(s) hidden on {}", "✓".green(), applied, url);
    }

    Ok(())
}
