use std::fs;
use std::path::PathBuf;

use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use super::launcher::BrowserLauncher;
use crate::config::BrowserConfig;
use crate::error::{HiderError, Result};

/// Page info from the CDP /json/list endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(rename = "type")]
    pub page_type: String,
    pub web_socket_debugger_url: Option<String>,
}

/// Session state persisted to disk between CLI invocations
#[derive(Debug, Serialize, Deserialize)]
struct SessionState {
    cdp_port: u16,
    cdp_url: String,
}

#[derive(Debug)]
pub enum SessionStatus {
    Running { cdp_port: u16, pages: Vec<PageInfo> },
    Stale,
    NotRunning,
}

/// Manages the managed browser session across CLI invocations. All page
/// traffic goes over short-lived raw CDP WebSocket connections.
pub struct SessionManager {
    browser: BrowserConfig,
    state_file: PathBuf,
}

impl SessionManager {
    pub fn new(browser: BrowserConfig) -> Self {
        let state_file = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("element-hider")
            .join("session.json");

        Self {
            browser,
            state_file,
        }
    }

    #[cfg(test)]
    fn with_state_file(browser: BrowserConfig, state_file: PathBuf) -> Self {
        Self {
            browser,
            state_file,
        }
    }

    fn load_state(&self) -> Option<SessionState> {
        if !self.state_file.exists() {
            return None;
        }
        let content = fs::read_to_string(&self.state_file).ok()?;
        serde_json::from_str(&content).ok()
    }

    fn save_state(&self, state: &SessionState) -> Result<()> {
        if let Some(parent) = self.state_file.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(state)?;
        fs::write(&self.state_file, content)?;
        Ok(())
    }

    fn remove_state(&self) -> Result<()> {
        if self.state_file.exists() {
            fs::remove_file(&self.state_file)?;
        }
        Ok(())
    }

    fn http_client() -> reqwest::Client {
        // Bypass proxies for localhost
        reqwest::Client::builder()
            .no_proxy()
            .timeout(std::time::Duration::from_secs(5))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    }

    async fn is_alive(&self, state: &SessionState) -> bool {
        let url = format!("http://127.0.0.1:{}/json/version", state.cdp_port);
        Self::http_client().get(&url).send().await.is_ok()
    }

    /// Fetch the browser WebSocket URL for a running CDP port. The URL
    /// changes whenever the browser restarts on the same port.
    async fn fetch_browser_ws_url(&self, cdp_port: u16) -> Option<String> {
        let url = format!("http://127.0.0.1:{}/json/version", cdp_port);
        let resp = Self::http_client().get(&url).send().await.ok()?;
        let info: serde_json::Value = resp.json().await.ok()?;
        info.get("webSocketDebuggerUrl")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }

    /// Reuse the recorded session when it is still alive, otherwise launch
    /// a new browser.
    pub async fn ensure_running(&self) -> Result<()> {
        if let Some(mut state) = self.load_state() {
            if self.is_alive(&state).await {
                if let Some(fresh_url) = self.fetch_browser_ws_url(state.cdp_port).await {
                    if fresh_url != state.cdp_url {
                        tracing::debug!("CDP WebSocket URL changed, updating session");
                        state.cdp_url = fresh_url;
                        self.save_state(&state)?;
                    }
                }
                tracing::debug!("reusing existing browser session");
                return Ok(());
            }
            tracing::debug!("recorded session is dead, removing");
            self.remove_state()?;
        }

        let launcher = BrowserLauncher::from_config(&self.browser)?;
        let (_child, cdp_url) = launcher.launch_and_wait().await?;

        self.save_state(&SessionState {
            cdp_port: launcher.cdp_port(),
            cdp_url,
        })?;

        Ok(())
    }

    fn running_state(&self) -> Result<SessionState> {
        self.load_state().ok_or(HiderError::BrowserNotRunning)
    }

    /// List open pages, excluding extensions and service workers.
    pub async fn get_pages(&self) -> Result<Vec<PageInfo>> {
        let state = self.running_state()?;

        let url = format!("http://127.0.0.1:{}/json/list", state.cdp_port);
        let response = Self::http_client().get(&url).send().await.map_err(|e| {
            HiderError::CdpConnectionFailed(format!("failed to get pages: {}", e))
        })?;

        let pages: Vec<PageInfo> = response.json().await.map_err(|e| {
            HiderError::CdpConnectionFailed(format!("failed to parse pages: {}", e))
        })?;

        Ok(pages
            .into_iter()
            .filter(|p| p.page_type == "page")
            .collect())
    }

    /// The page agent's target: the first open page.
    pub async fn active_page(&self) -> Result<PageInfo> {
        let pages = self.get_pages().await?;
        pages.into_iter().next().ok_or(HiderError::BrowserNotRunning)
    }

    /// Execute JavaScript on the active page over a direct CDP WebSocket.
    pub async fn eval_on_page(&self, expression: &str) -> Result<serde_json::Value> {
        let page = self.active_page().await?;
        let ws_url = page.web_socket_debugger_url.ok_or_else(|| {
            HiderError::CdpConnectionFailed("no WebSocket URL for page".to_string())
        })?;

        let result = ws_cdp_call(
            &ws_url,
            "Runtime.evaluate",
            serde_json::json!({
                "expression": expression,
                "returnByValue": true
            }),
        )
        .await?;

        if let Some(exception) = result.get("exceptionDetails") {
            return Err(HiderError::JavaScriptError(
                exception
                    .get("exception")
                    .and_then(|e| e.get("description"))
                    .and_then(|d| d.as_str())
                    .unwrap_or("uncaught exception")
                    .to_string(),
            ));
        }

        if let Some(inner) = result.get("result") {
            if let Some(value) = inner.get("value") {
                return Ok(value.clone());
            }
            return Ok(inner.clone());
        }

        Ok(serde_json::Value::Null)
    }

    /// Open a URL in a new tab via the browser-level CDP connection.
    pub async fn open_url(&self, url: &str) -> Result<()> {
        self.ensure_running().await?;
        let state = self.running_state()?;

        ws_cdp_call(
            &state.cdp_url,
            "Target.createTarget",
            serde_json::json!({ "url": url }),
        )
        .await?;

        Ok(())
    }

    /// Close the browser and forget the session.
    pub async fn close(&self) -> Result<()> {
        if let Some(state) = self.load_state() {
            if self.is_alive(&state).await {
                let _ = ws_cdp_call(&state.cdp_url, "Browser.close", serde_json::json!({})).await;
            }
            self.remove_state()?;
        }
        Ok(())
    }

    pub async fn status(&self) -> SessionStatus {
        match self.load_state() {
            Some(state) => {
                if self.is_alive(&state).await {
                    let pages = self.get_pages().await.unwrap_or_default();
                    SessionStatus::Running {
                        cdp_port: state.cdp_port,
                        pages,
                    }
                } else {
                    SessionStatus::Stale
                }
            }
            None => SessionStatus::NotRunning,
        }
    }
}

/// Send one CDP command over a fresh WebSocket connection and wait for its
/// response.
async fn ws_cdp_call(
    ws_url: &str,
    method: &str,
    params: serde_json::Value,
) -> Result<serde_json::Value> {
    let (mut ws, _) = connect_async(ws_url).await.map_err(|e| {
        HiderError::CdpConnectionFailed(format!("WebSocket connection failed: {}", e))
    })?;

    let cmd = serde_json::json!({
        "id": 1,
        "method": method,
        "params": params
    });

    ws.send(Message::Text(cmd.to_string().into()))
        .await
        .map_err(|e| HiderError::Other(format!("failed to send command: {}", e)))?;

    while let Some(msg) = ws.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                let response: serde_json::Value = serde_json::from_str(text.as_str())?;
                if response.get("id") == Some(&serde_json::json!(1)) {
                    if let Some(error) = response.get("error") {
                        return Err(HiderError::CdpConnectionFailed(format!(
                            "CDP error: {}",
                            error
                        )));
                    }
                    return Ok(response
                        .get("result")
                        .cloned()
                        .unwrap_or(serde_json::Value::Null));
                }
            }
            Ok(_) => continue,
            Err(e) => return Err(HiderError::Other(format!("WebSocket error: {}", e))),
        }
    }

    Err(HiderError::Other("no response received".to_string()))
}
