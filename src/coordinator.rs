//! Orchestration layer: dispatches the agent message contract, persists
//! rules on successful hides, and owns the settings that the rest of the
//! system receives as plain values.

use std::time::Duration;

use crate::agent::{AgentRequest, AgentResponse, PageAgent, PickOutcome, PickerStep};
use crate::config::Language;
use crate::dom::{PageDom, Viewport};
use crate::error::Result;
use crate::rules::{Rule, RuleStore};

/// How often the picker loop drains captured events.
const PICKER_POLL_INTERVAL: Duration = Duration::from_millis(150);

/// Delay between the concluding click and picker teardown, so the feedback
/// message stays visible.
const PICKER_STOP_GRACE: Duration = Duration::from_millis(500);

/// Point used when neither the caller nor the viewport yields coordinates.
const FALLBACK_POINT: (f64, f64) = (100.0, 100.0);

/// Settings threaded through as values; nothing here is process-global.
#[derive(Debug, Clone)]
pub struct Settings {
    pub language: Language,
    pub reapply_delays: Vec<Duration>,
}

impl Settings {
    pub fn new(language: Language, reapply_delays: Vec<Duration>) -> Self {
        Self {
            language,
            reapply_delays,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: Language::En,
            reapply_delays: vec![Duration::from_millis(1000), Duration::from_millis(3000)],
        }
    }
}

pub struct Coordinator<D: PageDom, S: RuleStore> {
    agent: PageAgent<D>,
    store: S,
    settings: Settings,
}

impl<D: PageDom, S: RuleStore> Coordinator<D, S> {
    pub fn new(dom: D, store: S, settings: Settings) -> Self {
        let agent = PageAgent::new(dom, settings.language.messages());
        Self {
            agent,
            store,
            settings,
        }
    }

    pub fn agent(&self) -> &PageAgent<D> {
        &self.agent
    }

    pub fn agent_mut(&mut self) -> &mut PageAgent<D> {
        &mut self.agent
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Hide the element under the given viewport point and persist a rule
    /// for it. Non-finite coordinates fall back to the viewport centre.
    pub async fn hide_at_point(&mut self, x: f64, y: f64) -> Result<AgentResponse> {
        let (x, y) = self.normalize_point(x, y).await;
        let response = self.agent.handle(AgentRequest::ApplyHideAtPoint { x, y }).await;

        if let AgentResponse::Hidden {
            success: true,
            selector,
            url,
        } = &response
        {
            self.store
                .upsert(Rule::hide(selector.clone(), url.clone()))
                .await?;
        }

        Ok(response)
    }

    pub async fn show_at_point(&mut self, x: f64, y: f64) -> Result<AgentResponse> {
        let (x, y) = self.normalize_point(x, y).await;
        Ok(self.agent.handle(AgentRequest::ApplyShowAtPoint { x, y }).await)
    }

    /// Hide by an explicit selector. The rule is recorded against `url`
    /// when given, otherwise against the current page address.
    pub async fn hide_by_selector(
        &mut self,
        selector: &str,
        url: Option<&str>,
    ) -> Result<AgentResponse> {
        let url = url.unwrap_or_else(|| self.agent.url()).to_string();
        let response = self
            .agent
            .handle(AgentRequest::HideBySelector {
                selector: selector.to_string(),
                url: url.clone(),
            })
            .await;

        if response.is_success() {
            self.store.upsert(Rule::hide(selector, url)).await?;
        }

        Ok(response)
    }

    pub async fn show_by_selector(&mut self, selector: &str) -> Result<AgentResponse> {
        let url = self.agent.url().to_string();
        Ok(self
            .agent
            .handle(AgentRequest::ShowBySelector {
                selector: selector.to_string(),
                url,
            })
            .await)
    }

    /// Flip a rule's enabled flag, returning the new state. The live page
    /// is updated best-effort: failures to apply or revert do not undo the
    /// store write.
    pub async fn toggle_rule(&mut self, selector: &str, url: &str) -> Result<bool> {
        let enabled = crate::rules::toggle_stored_rule(&self.store, selector, url).await?;

        if enabled {
            let _ = self
                .agent
                .handle(AgentRequest::HideBySelector {
                    selector: selector.to_string(),
                    url: url.to_string(),
                })
                .await;
        } else {
            let _ = self
                .agent
                .handle(AgentRequest::RemoveHiddenElement {
                    selector: selector.to_string(),
                    url: url.to_string(),
                })
                .await;
        }

        Ok(enabled)
    }

    /// Delete a stored rule and revert its mutation on the live page.
    pub async fn delete_rule(&mut self, selector: &str, url: &str) -> Result<Vec<Rule>> {
        let rules = self.store.delete(selector, url).await?;

        let _ = self
            .agent
            .handle(AgentRequest::RemoveHiddenElement {
                selector: selector.to_string(),
                url: url.to_string(),
            })
            .await;

        Ok(rules)
    }

    pub async fn clear_rules(&mut self) -> Result<()> {
        self.store.clear().await
    }

    pub async fn list_rules(&self) -> Result<Vec<Rule>> {
        self.store.get_all().await
    }

    /// One reconcile pass over the stored rules.
    pub async fn reconcile_now(&mut self) -> Result<usize> {
        let rules = self.store.get_all().await?;
        self.agent.reconcile_page_load(&rules).await
    }

    /// Reconcile, then re-run after each configured delay so content that
    /// renders late still gets hidden. Re-running is idempotent.
    pub async fn reconcile_with_retries(&mut self) -> Result<usize> {
        let mut applied = self.reconcile_now().await?;

        let delays = self.settings.reapply_delays.clone();
        for delay in delays {
            tokio::time::sleep(delay).await;
            applied += self.reconcile_now().await?;
        }

        Ok(applied)
    }

    /// Run one interactive picker session to completion. Returns the picked
    /// outcome, or `None` when the session was cancelled or the clicked
    /// element was already hidden. The rule for a successful pick is
    /// persisted before the picker is torn down.
    pub async fn run_picker(&mut self) -> Result<Option<PickOutcome>> {
        self.agent.start_picker().await?;

        loop {
            match self.agent.pump_picker().await? {
                PickerStep::Concluded(outcome) => {
                    if let Some(out) = &outcome {
                        self.store
                            .upsert(Rule::hide(out.selector.clone(), out.url.clone()))
                            .await?;
                    }
                    tokio::time::sleep(PICKER_STOP_GRACE).await;
                    self.agent.stop_picker().await?;
                    return Ok(outcome);
                }
                PickerStep::Cancelled => return Ok(None),
                PickerStep::Continue => {
                    if !matches!(
                        self.agent.picker_state(),
                        crate::agent::PickerState::Picking
                    ) {
                        return Ok(None);
                    }
                    tokio::time::sleep(PICKER_POLL_INTERVAL).await;
                }
            }
        }
    }

    pub async fn stop_picker(&mut self) -> Result<()> {
        self.agent.stop_picker().await
    }

    pub async fn viewport(&self) -> Result<Viewport> {
        self.agent.viewport().await
    }

    async fn normalize_point(&self, x: f64, y: f64) -> (f64, f64) {
        if x.is_finite() && y.is_finite() {
            return (x, y);
        }

        match self.agent.viewport().await {
            Ok(viewport) => viewport.center(),
            Err(_) => FALLBACK_POINT,
        }
    }
}
