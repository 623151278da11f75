use std::path::PathBuf;
use std::process::Command;

use crate::error::{HiderError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserKind {
    Chrome,
    Brave,
    Edge,
    Chromium,
}

impl BrowserKind {
    pub fn name(&self) -> &'static str {
        match self {
            BrowserKind::Chrome => "Google Chrome",
            BrowserKind::Brave => "Brave",
            BrowserKind::Edge => "Microsoft Edge",
            BrowserKind::Chromium => "Chromium",
        }
    }
}

#[derive(Debug, Clone)]
pub struct BrowserInfo {
    pub kind: BrowserKind,
    pub path: PathBuf,
    pub version: Option<String>,
}

impl BrowserInfo {
    pub fn new(kind: BrowserKind, path: PathBuf) -> Self {
        Self {
            kind,
            path,
            version: None,
        }
    }

    pub fn with_version(mut self) -> Self {
        self.version = detect_version(&self.path);
        self
    }
}

/// Find the best available Chromium-family browser on this system.
pub fn discover_browser() -> Result<BrowserInfo> {
    for (kind, paths) in platform_candidates() {
        for path in paths {
            let path = PathBuf::from(path);
            if path.exists() {
                return Ok(BrowserInfo::new(kind, path).with_version());
            }
        }
    }

    // Fall back to PATH lookup for Linux distros with nonstandard prefixes
    for (kind, name) in [
        (BrowserKind::Chrome, "google-chrome"),
        (BrowserKind::Chrome, "google-chrome-stable"),
        (BrowserKind::Brave, "brave-browser"),
        (BrowserKind::Chromium, "chromium"),
        (BrowserKind::Chromium, "chromium-browser"),
    ] {
        if let Ok(path) = which::which(name) {
            return Ok(BrowserInfo::new(kind, path).with_version());
        }
    }

    Err(HiderError::BrowserNotFound)
}

fn platform_candidates() -> Vec<(BrowserKind, Vec<&'static str>)> {
    #[cfg(target_os = "macos")]
    {
        vec![
            (
                BrowserKind::Chrome,
                vec!["/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"],
            ),
            (
                BrowserKind::Brave,
                vec!["/Applications/Brave Browser.app/Contents/MacOS/Brave Browser"],
            ),
            (
                BrowserKind::Edge,
                vec!["/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge"],
            ),
            (
                BrowserKind::Chromium,
                vec!["/Applications/Chromium.app/Contents/MacOS/Chromium"],
            ),
        ]
    }

    #[cfg(target_os = "linux")]
    {
        vec![
            (
                BrowserKind::Chrome,
                vec![
                    "/usr/bin/google-chrome",
                    "/usr/bin/google-chrome-stable",
                    "/snap/bin/chromium",
                ],
            ),
            (
                BrowserKind::Brave,
                vec!["/usr/bin/brave-browser", "/usr/bin/brave"],
            ),
            (
                BrowserKind::Edge,
                vec!["/usr/bin/microsoft-edge", "/usr/bin/microsoft-edge-stable"],
            ),
            (
                BrowserKind::Chromium,
                vec!["/usr/bin/chromium", "/usr/bin/chromium-browser"],
            ),
        ]
    }

    #[cfg(target_os = "windows")]
    {
        vec![
            (
                BrowserKind::Chrome,
                vec![
                    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
                    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
                ],
            ),
            (
                BrowserKind::Brave,
                vec![r"C:\Program Files\BraveSoftware\Brave-Browser\Application\brave.exe"],
            ),
            (
                BrowserKind::Edge,
                vec![r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe"],
            ),
        ]
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        vec![]
    }
}

fn detect_version(path: &PathBuf) -> Option<String> {
    let output = Command::new(path).arg("--version").output().ok()?;

    if !output.status.success() {
        return None;
    }

    let version = String::from_utf8_lossy(&output.stdout);
    let version = version.trim();
    // "Google Chrome 120.0.6099.109" -> "120.0.6099.109"
    match version.rfind(' ') {
        Some(idx) => Some(version[idx + 1..].to_string()),
        None => Some(version.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidates_exist_for_this_platform() {
        // The table may be empty only on unsupported platforms.
        #[cfg(any(target_os = "macos", target_os = "linux", target_os = "windows"))]
        assert!(!platform_candidates().is_empty());
    }

    #[test]
    fn discovery_reports_not_found_or_a_real_path() {
        match discover_browser() {
            Ok(info) => assert!(info.path.exists()),
            Err(e) => assert!(matches!(e, HiderError::BrowserNotFound)),
        }
    }
}
