use thiserror::Error;

#[derive(Error, Debug)]
pub enum HiderError {
    #[error("Browser not found. Please install Chrome, Brave, or Edge.")]
    BrowserNotFound,

    #[error("Browser launch failed: {0}")]
    BrowserLaunchFailed(String),

    #[error("CDP connection failed: {0}")]
    CdpConnectionFailed(String),

    #[error("Browser not running. Use 'element-hider browser open <url>' first.")]
    BrowserNotRunning,

    #[error("Page agent unreachable. Reload the page and try again.")]
    AgentUnreachable,

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("No rule stored for '{selector}' on {url}")]
    RuleNotFound { selector: String, url: String },

    #[error("JavaScript execution failed: {0}")]
    JavaScriptError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    StoreError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, HiderError>;
