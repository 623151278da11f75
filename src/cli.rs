use clap::{Parser, Subcommand};

use crate::commands;
use crate::error::Result;

/// Element Hider CLI - Hide page elements with rules that stick
#[derive(Parser)]
#[command(name = "element-hider")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Browser executable path (overrides auto-discovery)
    #[arg(long, env = "ELEMENT_HIDER_BROWSER_EXECUTABLE", global = true)]
    pub browser_path: Option<String>,

    /// Run the managed browser in headless mode
    #[arg(long, global = true)]
    pub headless: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Hide the element at viewport coordinates, or by selector
    Hide {
        /// X coordinate within the viewport
        x: Option<f64>,
        /// Y coordinate within the viewport
        y: Option<f64>,

        /// CSS selector of the element to hide
        #[arg(long, conflicts_with_all = ["x", "y"])]
        selector: Option<String>,

        /// Record the rule against this URL instead of the current page
        #[arg(long, requires = "selector")]
        url: Option<String>,
    },

    /// Show (un-hide) the element at viewport coordinates, or by selector
    Show {
        /// X coordinate within the viewport
        x: Option<f64>,
        /// Y coordinate within the viewport
        y: Option<f64>,

        /// CSS selector of the element to show
        #[arg(long, conflicts_with_all = ["x", "y"])]
        selector: Option<String>,
    },

    /// Interactively pick an element in the browser to hide
    Pick,

    /// Apply stored rules to the current page
    Apply {
        /// Single pass, without the delayed re-applies for late content
        #[arg(long)]
        no_retry: bool,
    },

    /// Stored rule management
    Rules {
        #[command(subcommand)]
        command: RulesCommands,
    },

    /// Show the current page's viewport size
    Viewport,

    /// Get or set the user-interface language
    Lang {
        /// Language tag (en, zh_CN); prints the current one when omitted
        value: Option<String>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Managed browser session
    Browser {
        #[command(subcommand)]
        command: BrowserCommands,
    },
}

#[derive(Subcommand)]
pub enum RulesCommands {
    /// List all stored rules
    List,

    /// Enable or disable a rule without deleting it
    Toggle {
        /// Rule selector
        selector: String,
        /// Rule URL
        url: String,
    },

    /// Delete one rule
    Delete {
        /// Rule selector
        selector: String,
        /// Rule URL
        url: String,
    },

    /// Delete all rules
    Clear,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Get a configuration value
    Get {
        /// Configuration key (e.g. browser.cdp_port)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Configuration value
        value: String,
    },

    /// Show configuration file path
    Path,
}

#[derive(Subcommand)]
pub enum BrowserCommands {
    /// Show browser session status
    Status,

    /// Open a URL in the managed browser (launching it if needed)
    Open {
        /// URL to open
        url: String,
    },

    /// Close the managed browser
    Close,
}

impl Cli {
    pub async fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Hide {
                x,
                y,
                selector,
                url,
            } => commands::hide::run(self, *x, *y, selector.as_deref(), url.as_deref()).await,
            Commands::Show { x, y, selector } => {
                commands::show::run(self, *x, *y, selector.as_deref()).await
            }
            Commands::Pick => commands::pick::run(self).await,
            Commands::Apply { no_retry } => commands::apply::run(self, *no_retry).await,
            Commands::Rules { command } => commands::rules::run(self, command).await,
            Commands::Viewport => commands::viewport::run(self).await,
            Commands::Lang { value } => commands::lang::run(self, value.as_deref()).await,
            Commands::Config { command } => commands::config::run(self, command).await,
            Commands::Browser { command } => commands::browser::run(self, command).await,
        }
    }
}
