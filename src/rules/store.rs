//! Rule persistence: one JSON document holding the rule list and the
//! language setting, rewritten wholesale on every mutation. Last write wins;
//! there is no cross-process coordination beyond that.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::Rule;
use crate::error::{HiderError, Result};

/// The persistence collaborator consumed by the coordinator.
#[async_trait]
pub trait RuleStore: Send + Sync {
    async fn get_all(&self) -> Result<Vec<Rule>>;

    /// Replace the rule with the same `(selector, url)` pair, or append.
    /// Returns the full list after the write.
    async fn upsert(&self, rule: Rule) -> Result<Vec<Rule>>;

    /// Remove at most one rule. Deleting a pair that is not stored is a
    /// no-op. Returns the full list after the write.
    async fn delete(&self, selector: &str, url: &str) -> Result<Vec<Rule>>;

    async fn clear(&self) -> Result<()>;

    async fn language(&self) -> Result<String>;

    async fn set_language(&self, language: &str) -> Result<()>;
}

fn default_language() -> String {
    "en".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    rules: Vec<Rule>,
    #[serde(default = "default_language")]
    language: String,
}

impl Default for StoreDocument {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            language: default_language(),
        }
    }
}

/// File-backed store. Every read parses the file from scratch and every
/// mutation rewrites it, so two processes race with last-write-wins
/// semantics.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<StoreDocument> {
        if !self.path.exists() {
            return Ok(StoreDocument::default());
        }

        let content = fs::read_to_string(&self.path)?;
        serde_json::from_str(&content).map_err(|e| {
            HiderError::StoreError(format!(
                "cannot parse {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn write_document(&self, doc: &StoreDocument) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(doc)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

#[async_trait]
impl RuleStore for JsonFileStore {
    async fn get_all(&self) -> Result<Vec<Rule>> {
        Ok(self.read_document()?.rules)
    }

    async fn upsert(&self, rule: Rule) -> Result<Vec<Rule>> {
        let mut doc = self.read_document()?;

        match doc
            .rules
            .iter_mut()
            .find(|r| r.key_matches(&rule.selector, &rule.url))
        {
            Some(existing) => *existing = rule,
            None => doc.rules.push(rule),
        }

        self.write_document(&doc)?;
        tracing::debug!(total = doc.rules.len(), "rules saved");
        Ok(doc.rules)
    }

    async fn delete(&self, selector: &str, url: &str) -> Result<Vec<Rule>> {
        let mut doc = self.read_document()?;

        if let Some(index) = doc.rules.iter().position(|r| r.key_matches(selector, url)) {
            doc.rules.remove(index);
            self.write_document(&doc)?;
        }

        Ok(doc.rules)
    }

    async fn clear(&self) -> Result<()> {
        let mut doc = self.read_document()?;
        doc.rules.clear();
        self.write_document(&doc)
    }

    async fn language(&self) -> Result<String> {
        Ok(self.read_document()?.language)
    }

    async fn set_language(&self, language: &str) -> Result<()> {
        let mut doc = self.read_document()?;
        doc.language = language.to_string();
        self.write_document(&doc)
    }
}
