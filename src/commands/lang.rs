use colored::Colorize;

use crate::cli::Cli;
use crate::config::Language;
use crate::error::Result;
use crate::rules::RuleStore;

pub async fn run(cli: &Cli, value: Option<&str>) -> Result<()> {
    let config = super::effective_config(cli)?;
    let store = super::store_for(&config);

    match value {
        None => {
            let tag = store.language().await?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({ "language": tag }))?
                );
            } else {
                println!("{}", tag);
            }
        }
        Some(value) => {
            // Unknown tags fall back to English rather than erroring
            let language = Language::parse(value);
            store.set_language(language.tag()).await?;

            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "success": true,
                        "language": language.tag(),
                    }))?
                );
            } else {
                println!("{} Language set to {}", "✓".green(), language.tag());
            }
        }
    }

    Ok(())
}
