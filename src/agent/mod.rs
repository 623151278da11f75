//! Per-page agent: applies and reverses hide mutations, reconciles stored
//! rules on page load, and runs the interactive picker session.

pub mod picker;
pub mod protocol;
pub mod registry;

pub use picker::{PickOutcome, Picker, PickerState, PickerStep};
pub use protocol::{AgentRequest, AgentResponse};
pub use registry::{HiddenRecord, HiddenRegistry};

use crate::config::Messages;
use crate::dom::{NodeId, PageDom, PickerEvent, Viewport};
use crate::error::Result;
use crate::rules::{rule_matches_page, Rule};
use crate::selector::synthesize;

/// Marker set on elements hidden by us, so "is this hidden by us" can be
/// answered from the document without consulting the registry.
pub const MARKER_ATTRIBUTE: &str = "data-element-hider-hidden";

/// Tooltip offset from the pointer, in CSS pixels.
const TOOLTIP_OFFSET: f64 = 10.0;

pub struct PageAgent<D: PageDom> {
    dom: D,
    registry: HiddenRegistry,
    picker: Picker,
    messages: Messages,
}

impl<D: PageDom> PageAgent<D> {
    pub fn new(dom: D, messages: Messages) -> Self {
        Self {
            dom,
            registry: HiddenRegistry::new(),
            picker: Picker::default(),
            messages,
        }
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    pub fn url(&self) -> &str {
        self.dom.url()
    }

    pub fn hidden_count(&self) -> usize {
        self.registry.len()
    }

    /// Hide an element, recording enough state to reverse the mutation.
    /// Returns `false` without touching anything when the element is
    /// already tracked.
    pub async fn apply_hide(&mut self, node: NodeId, selector: &str, url: &str) -> Result<bool> {
        if self.registry.contains(node) {
            return Ok(false);
        }

        let original_visibility = self.dom.inline_visibility(node).await?;
        self.dom.set_inline_visibility(node, Some("hidden")).await?;
        self.dom.set_attribute(node, MARKER_ATTRIBUTE, "true").await?;

        self.registry.insert(
            node,
            HiddenRecord {
                selector: selector.to_string(),
                url: url.to_string(),
                original_visibility,
            },
        );

        tracing::debug!(%node, selector, "element hidden");
        Ok(true)
    }

    /// Restore an element we hid. Returns `false` when the element is not
    /// tracked.
    pub async fn apply_show(&mut self, node: NodeId) -> Result<bool> {
        let Some(record) = self.registry.remove(node) else {
            return Ok(false);
        };

        let restore = if record.original_visibility.is_empty() {
            None
        } else {
            Some(record.original_visibility.as_str())
        };
        self.dom.set_inline_visibility(node, restore).await?;
        self.dom.remove_attribute(node, MARKER_ATTRIBUTE).await?;

        tracing::debug!(%node, "element shown");
        Ok(true)
    }

    /// Answered from the marker attribute, so it also covers elements
    /// hidden by another agent instance on the same page.
    pub async fn is_hidden_by_us(&self, node: NodeId) -> Result<bool> {
        Ok(self.dom.attribute(node, MARKER_ATTRIBUTE).await?.as_deref() == Some("true"))
    }

    /// Reverse the mutation for every tracked element recorded under the
    /// pair. The stored rule (if any) is not touched.
    pub async fn remove_hidden_element(&mut self, selector: &str, url: &str) -> Result<()> {
        for (node, record) in self.registry.drain_matching(selector, url) {
            let restore = if record.original_visibility.is_empty() {
                None
            } else {
                Some(record.original_visibility.as_str())
            };
            self.dom.set_inline_visibility(node, restore).await?;
            self.dom.remove_attribute(node, MARKER_ATTRIBUTE).await?;
        }
        Ok(())
    }

    /// Currently tracked `(selector, url)` pairs, pruning entries whose
    /// element has left the document.
    pub async fn hidden_elements(&mut self) -> Result<Vec<(String, String)>> {
        let mut live = Vec::new();

        for node in self.registry.nodes() {
            if self.dom.is_connected(node).await? {
                if let Some(record) = self.registry.get(node) {
                    live.push((record.selector.clone(), record.url.clone()));
                }
            } else {
                self.registry.remove(node);
            }
        }

        Ok(live)
    }

    /// Apply every enabled rule that matches the current page. Dangling
    /// selectors are skipped silently; re-running is harmless because
    /// already-tracked elements are no-ops. Returns how many elements were
    /// newly hidden.
    pub async fn reconcile_page_load(&mut self, rules: &[Rule]) -> Result<usize> {
        let current_url = self.dom.url().to_string();
        let current_hostname = self.dom.hostname().to_string();
        let mut applied = 0;

        for rule in rules.iter().filter(|r| r.is_enabled) {
            if !rule_matches_page(&rule.url, &current_url, &current_hostname) {
                continue;
            }

            let Some(node) = self.dom.resolve(&rule.selector).await? else {
                continue;
            };

            if rule.is_hidden && self.apply_hide(node, &rule.selector, &rule.url).await? {
                applied += 1;
            }
        }

        if applied > 0 {
            tracing::info!(applied, url = %current_url, "rules applied");
        }
        Ok(applied)
    }

    pub fn picker_state(&self) -> PickerState {
        self.picker.state()
    }

    /// Enter picking mode. A no-op while a session is already active, so
    /// repeated starts never stack overlays or listeners.
    pub async fn start_picker(&mut self) -> Result<()> {
        if self.picker.is_picking() {
            return Ok(());
        }

        self.dom
            .mount_picker_overlay(self.messages.select_instruction)
            .await?;
        self.dom.set_scroll_lock(true).await?;
        self.picker.begin();

        tracing::debug!("picker started");
        Ok(())
    }

    /// Leave picking mode, removing the overlay and restoring scroll.
    /// Idempotent.
    pub async fn stop_picker(&mut self) -> Result<()> {
        if !self.picker.is_picking() {
            return Ok(());
        }

        self.dom.set_highlight(None).await?;
        self.dom.hide_tooltip().await?;
        self.dom.remove_picker_overlay().await?;
        self.dom.set_scroll_lock(false).await?;
        self.picker.end();

        tracing::debug!("picker stopped");
        Ok(())
    }

    /// Drain and process pending picker events. Returns the step result of
    /// the last consequential event.
    pub async fn pump_picker(&mut self) -> Result<PickerStep> {
        let events = self.dom.poll_picker_events().await?;
        let mut step = PickerStep::Continue;

        for event in events {
            step = self.handle_picker_event(event).await?;
            if !matches!(step, PickerStep::Continue) {
                break;
            }
        }

        Ok(step)
    }

    pub async fn handle_picker_event(&mut self, event: PickerEvent) -> Result<PickerStep> {
        if !self.picker.is_picking() {
            return Ok(PickerStep::Continue);
        }

        match event {
            PickerEvent::PointerEnter { node, x, y } => {
                self.dom.set_highlight(Some(node)).await?;
                self.picker.set_hovered(Some(node));

                // Preview under the cursor shows what would be recorded.
                if let Ok(descriptor) = self.dom.describe(node).await {
                    let preview = synthesize(&descriptor);
                    self.dom
                        .show_tooltip(&preview, x + TOOLTIP_OFFSET, y + TOOLTIP_OFFSET)
                        .await?;
                }

                Ok(PickerStep::Continue)
            }
            PickerEvent::PointerLeave => {
                self.dom.hide_tooltip().await?;
                Ok(PickerStep::Continue)
            }
            PickerEvent::Click { node } => {
                let descriptor = self.dom.describe(node).await?;
                let selector = synthesize(&descriptor);
                let url = self.dom.url().to_string();

                let hidden = self.apply_hide(node, &selector, &url).await?;

                if hidden {
                    self.dom
                        .show_feedback(self.messages.element_hidden, true)
                        .await?;
                    Ok(PickerStep::Concluded(Some(PickOutcome { selector, url })))
                } else {
                    self.dom
                        .show_feedback(self.messages.element_already_hidden, false)
                        .await?;
                    Ok(PickerStep::Concluded(None))
                }
            }
            PickerEvent::CancelKey => {
                self.stop_picker().await?;
                Ok(PickerStep::Cancelled)
            }
        }
    }

    pub async fn viewport(&self) -> Result<Viewport> {
        self.dom.viewport().await
    }

    /// Dispatch one request from the orchestration layer. Failures come
    /// back in the response body; this never returns an error.
    pub async fn handle(&mut self, request: AgentRequest) -> AgentResponse {
        match self.dispatch(request).await {
            Ok(response) => response,
            Err(e) => AgentResponse::error(e.to_string()),
        }
    }

    async fn dispatch(&mut self, request: AgentRequest) -> Result<AgentResponse> {
        match request {
            AgentRequest::ApplyHideAtPoint { x, y } => {
                let Some(node) = self.dom.element_at_point(x, y).await? else {
                    return Ok(AgentResponse::error("No element found"));
                };

                let descriptor = self.dom.describe(node).await?;
                let selector = synthesize(&descriptor);
                let url = self.dom.url().to_string();
                let success = self.apply_hide(node, &selector, &url).await?;

                Ok(AgentResponse::Hidden {
                    success,
                    selector,
                    url,
                })
            }
            AgentRequest::ApplyShowAtPoint { x, y } => {
                let Some(node) = self.dom.element_at_point(x, y).await? else {
                    return Ok(AgentResponse::error("No element found"));
                };
                Ok(AgentResponse::ack(self.apply_show(node).await?))
            }
            AgentRequest::HideBySelector { selector, url } => {
                let Some(node) = self.dom.resolve(&selector).await? else {
                    return Ok(AgentResponse::error("Element not found"));
                };
                Ok(AgentResponse::ack(
                    self.apply_hide(node, &selector, &url).await?,
                ))
            }
            AgentRequest::ShowBySelector { selector, url: _ } => {
                let Some(node) = self.dom.resolve(&selector).await? else {
                    return Ok(AgentResponse::error("Element not found"));
                };
                Ok(AgentResponse::ack(self.apply_show(node).await?))
            }
            AgentRequest::StartPicker => {
                self.start_picker().await?;
                Ok(AgentResponse::ack(true))
            }
            AgentRequest::StopPicker => {
                self.stop_picker().await?;
                Ok(AgentResponse::ack(true))
            }
            AgentRequest::RemoveHiddenElement { selector, url } => {
                self.remove_hidden_element(&selector, &url).await?;
                Ok(AgentResponse::ack(true))
            }
            AgentRequest::GetViewportSize => {
                let viewport = self.dom.viewport().await?;
                Ok(AgentResponse::Viewport {
                    width: viewport.width,
                    height: viewport.height,
                })
            }
        }
    }
}
