use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use tokio::time::sleep;

use super::discovery::discover_browser;
use crate::config::BrowserConfig;
use crate::error::{HiderError, Result};

/// Launches a browser with remote debugging enabled and waits for the CDP
/// endpoint to come up.
pub struct BrowserLauncher {
    executable: PathBuf,
    cdp_port: u16,
    headless: bool,
    user_data_dir: PathBuf,
}

impl BrowserLauncher {
    pub fn from_config(config: &BrowserConfig) -> Result<Self> {
        let executable = match &config.executable {
            Some(path) => {
                let path = PathBuf::from(shellexpand::tilde(path).to_string());
                if !path.exists() {
                    return Err(HiderError::BrowserLaunchFailed(format!(
                        "browser not found at {:?}",
                        path
                    )));
                }
                path
            }
            None => discover_browser()?.path,
        };

        let user_data_dir = match &config.user_data_dir {
            Some(dir) => PathBuf::from(shellexpand::tilde(dir).to_string()),
            None => dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("element-hider")
                .join("profile"),
        };

        Ok(Self {
            executable,
            cdp_port: config.cdp_port,
            headless: config.headless,
            user_data_dir,
        })
    }

    pub fn cdp_port(&self) -> u16 {
        self.cdp_port
    }

    fn build_args(&self) -> Vec<String> {
        let mut args = vec![
            format!("--remote-debugging-port={}", self.cdp_port),
            format!("--user-data-dir={}", self.user_data_dir.display()),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
        ];

        if self.headless {
            args.push("--headless=new".to_string());
        }

        args
    }

    pub fn launch(&self) -> Result<Child> {
        std::fs::create_dir_all(&self.user_data_dir)?;

        let args = self.build_args();
        tracing::debug!(
            "launching browser: {:?} with args: {:?}",
            self.executable,
            args
        );

        Command::new(&self.executable)
            .args(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                HiderError::BrowserLaunchFailed(format!(
                    "failed to launch {:?}: {}",
                    self.executable, e
                ))
            })
    }

    /// Launch and block until the CDP endpoint answers, returning the
    /// browser-level WebSocket URL.
    pub async fn launch_and_wait(&self) -> Result<(Child, String)> {
        let child = self.launch()?;
        let cdp_url = self.wait_for_cdp().await?;
        Ok((child, cdp_url))
    }

    async fn wait_for_cdp(&self) -> Result<String> {
        let url = format!("http://127.0.0.1:{}/json/version", self.cdp_port);

        // Bypass proxies for localhost
        let client = reqwest::Client::builder()
            .no_proxy()
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        for attempt in 0..20 {
            sleep(Duration::from_millis(500)).await;

            match client.get(&url).send().await {
                Ok(response) if response.status().is_success() => {
                    let json: serde_json::Value = response.json().await.map_err(|e| {
                        HiderError::CdpConnectionFailed(format!(
                            "failed to parse CDP response: {}",
                            e
                        ))
                    })?;

                    if let Some(ws_url) = json.get("webSocketDebuggerUrl").and_then(|v| v.as_str())
                    {
                        tracing::info!("CDP ready at: {}", ws_url);
                        return Ok(ws_url.to_string());
                    }
                }
                Ok(_) => {
                    tracing::debug!("CDP not ready yet (attempt {})", attempt + 1);
                }
                Err(e) => {
                    tracing::debug!("CDP connection attempt {} failed: {}", attempt + 1, e);
                }
            }
        }

        Err(HiderError::CdpConnectionFailed(
            "timeout waiting for CDP to be ready".to_string(),
        ))
    }
}
