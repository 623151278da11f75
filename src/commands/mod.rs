pub mod apply;
pub mod browser;
pub mod config;
pub mod hide;
pub mod lang;
pub mod pick;
pub mod rules;
pub mod show;
pub mod viewport;

use colored::Colorize;

use crate::agent::AgentResponse;
use crate::browser::{LivePage, SessionManager};
use crate::cli::Cli;
use crate::config::{Config, Language};
use crate::coordinator::{Coordinator, Settings};
use crate::error::Result;
use crate::rules::{JsonFileStore, RuleStore};

/// Loaded configuration with CLI overrides applied.
pub(crate) fn effective_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load()?;

    if let Some(path) = &cli.browser_path {
        config.browser.executable = Some(path.clone());
    }
    if cli.headless {
        config.browser.headless = true;
    }

    Ok(config)
}

pub(crate) fn store_for(config: &Config) -> JsonFileStore {
    JsonFileStore::new(config.storage_file_path())
}

/// Attach to the active page of the running browser and build the
/// coordinator around it.
pub(crate) async fn connect(cli: &Cli) -> Result<Coordinator<LivePage, JsonFileStore>> {
    let config = effective_config(cli)?;
    let store = store_for(&config);

    let language = match store.language().await {
        Ok(tag) => Language::parse(&tag),
        Err(_) => Language::default(),
    };

    let session = SessionManager::new(config.browser.clone());
    let page = LivePage::attach(session).await?;

    let settings = Settings::new(language, config.reapply_delays());
    Ok(Coordinator::new(page, store, settings))
}

/// Print an agent response the way the rest of the CLI does: JSON verbatim
/// in `--json` mode, colored one-liners otherwise.
pub(crate) fn print_response(
    cli: &Cli,
    response: &AgentResponse,
    success_msg: &str,
    noop_msg: &str,
) -> Result<()> {
    if cli.json {
        println!("{}", serde_json::to_string_pretty(response)?);
        return Ok(());
    }

    match response {
        AgentResponse::Hidden {
            success: true,
            selector,
            url,
        } => println!(
            "{} {}: {} on {}",
            "✓".green(),
            success_msg,
            selector.cyan(),
            url
        ),
        AgentResponse::Hidden {
            success: false,
            selector,
            ..
        } => println!("{} {}: {}", "!".yellow(), noop_msg, selector),
        AgentResponse::Ack { success: true } => println!("{} {}", "✓".green(), success_msg),
        AgentResponse::Ack { success: false } => println!("{} {}", "!".yellow(), noop_msg),
        AgentResponse::Viewport { width, height } => {
            println!("{}x{}", width, height)
        }
        AgentResponse::Error { error } => println!("{} {}", "✗".red(), error),
    }

    Ok(())
}
