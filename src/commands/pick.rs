use colored::Colorize;

use crate::cli::Cli;
use crate::error::Result;

pub async fn run(cli: &Cli) -> Result<()> {
    let mut coordinator = super::connect(cli).await?;

    if !cli.json {
        println!(
            "{} Click an element in the browser to hide it. Esc cancels, Ctrl-C quits.",
            "?".cyan()
        );
    }

    let outcome = {
        let picker = coordinator.run_picker();
        tokio::pin!(picker);

        tokio::select! {
            result = &mut picker => Some(result?),
            _ = tokio::signal::ctrl_c() => None,
        }
    };

    match outcome {
        Some(Some(pick)) => {
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "success": true,
                        "selector": pick.selector,
                        "url": pick.url,
                    }))?
                );
            } else {
                println!(
                    "{} Element hidden and rule saved: {} on {}",
                    "✓".green(),
                    pick.selector.cyan(),
                    pick.url
                );
            }
        }
        Some(None) => {
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({ "success": false }))?
                );
            } else {
                println!("{} Nothing hidden", "!".yellow());
            }
        }
        None => {
            // Ctrl-C: tear the overlay down before leaving
            coordinator.stop_picker().await?;
            if !cli.json {
                println!("{} Picker cancelled", "!".yellow());
            }
        }
    }

    Ok(())
}
