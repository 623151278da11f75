//! `PageDom` over a live CDP page.
//!
//! Every operation is one `Runtime.evaluate` round-trip. Node identity is
//! an attribute-stamped counter: the first time an element is handed out it
//! gets `data-eh-node="<n>"`, and later lookups re-find it by that
//! attribute. The picker overlay is injected markup whose capture-phase
//! listeners queue raw events into `window.__ehPickerEvents` for
//! [`LivePage::poll_picker_events`] to drain.

use async_trait::async_trait;
use serde::Deserialize;

use super::session::SessionManager;
use crate::dom::{NodeId, PageDom, PickerEvent, Viewport};
use crate::error::{HiderError, Result};
use crate::selector::ElementDescriptor;

/// JS helpers prepended to every snippet that deals in node ids.
const NODE_HELPERS: &str = r#"
function __ehById(n) {
    return document.querySelector('[data-eh-node="' + n + '"]');
}
function __ehTag(el) {
    if (!el.getAttribute('data-eh-node')) {
        window.__ehNodeCounter = (window.__ehNodeCounter || 0) + 1;
        el.setAttribute('data-eh-node', String(window.__ehNodeCounter));
    }
    return parseInt(el.getAttribute('data-eh-node'), 10);
}
"#;

pub struct LivePage {
    session: SessionManager,
    url: String,
    hostname: String,
}

impl LivePage {
    /// Attach to the active page of the running browser session.
    pub async fn attach(session: SessionManager) -> Result<Self> {
        let page = session.active_page().await?;
        let url = page.url.clone();
        let hostname = url::Url::parse(&url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_string()))
            .unwrap_or_default();

        tracing::debug!(url = %url, "attached to page");
        Ok(Self {
            session,
            url,
            hostname,
        })
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Evaluate JS on the page, mapping transport failures to the distinct
    /// delivery-failure error the coordinator reports to the user.
    async fn eval(&self, js: &str) -> Result<serde_json::Value> {
        match self.session.eval_on_page(js).await {
            Ok(value) => Ok(value),
            Err(HiderError::BrowserNotRunning) | Err(HiderError::CdpConnectionFailed(_)) => {
                Err(HiderError::AgentUnreachable)
            }
            Err(other) => Err(other),
        }
    }

    async fn eval_on_node(&self, node: NodeId, body: &[&str]) -> Result<serde_json::Value> {
        let mut js = vec![
            "(function() {".to_string(),
            NODE_HELPERS.to_string(),
            format!("var el = __ehById({});", node.0),
            "if (!el) return null;".to_string(),
        ];
        js.extend(body.iter().map(|s| s.to_string()));
        js.push("})()".to_string());

        self.eval(&js.join("\n")).await
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescribePayload {
    tag_name: String,
    id: Option<String>,
    class_attr: Option<String>,
    same_tag_index: usize,
    same_tag_count: usize,
}

#[async_trait]
impl PageDom for LivePage {
    fn url(&self) -> &str {
        &self.url
    }

    fn hostname(&self) -> &str {
        &self.hostname
    }

    async fn viewport(&self) -> Result<Viewport> {
        let js = r#"
            (function() {
                return { width: window.innerWidth, height: window.innerHeight };
            })()
        "#;

        let result = self.eval(js).await?;
        Ok(Viewport {
            width: result.get("width").and_then(|v| v.as_f64()).unwrap_or(0.0),
            height: result.get("height").and_then(|v| v.as_f64()).unwrap_or(0.0),
        })
    }

    async fn element_at_point(&mut self, x: f64, y: f64) -> Result<Option<NodeId>> {
        let js = [
            "(function() {",
            NODE_HELPERS,
            &format!("var el = document.elementFromPoint({}, {});", x, y),
            "if (!el) return null;",
            "if (el.closest('#eh-picker-overlay') || el.id === 'eh-picker-tooltip' || el.id === 'eh-picker-banner') return null;",
            "return __ehTag(el);",
            "})()",
        ]
        .join("\n");

        let result = self.eval(&js).await?;
        Ok(result.as_u64().map(NodeId))
    }

    async fn resolve(&mut self, selector: &str) -> Result<Option<NodeId>> {
        let selector_json = serde_json::to_string(selector)?;
        let js = [
            "(function() {",
            NODE_HELPERS,
            "var el = null;",
            // A malformed selector resolves to null, same as not found
            &format!("try {{ el = document.querySelector({}); }} catch (e) {{ return null; }}", selector_json),
            "if (!el) return null;",
            "return __ehTag(el);",
            "})()",
        ]
        .join("\n");

        let result = self.eval(&js).await?;
        Ok(result.as_u64().map(NodeId))
    }

    async fn describe(&self, node: NodeId) -> Result<ElementDescriptor> {
        let result = self
            .eval_on_node(
                node,
                &[
                    "var index = 1, count = 0;",
                    "if (el.parentElement) {",
                    "    var kids = el.parentElement.children;",
                    "    for (var i = 0; i < kids.length; i++) {",
                    "        if (kids[i].tagName === el.tagName) {",
                    "            count++;",
                    "            if (kids[i] === el) index = count;",
                    "        }",
                    "    }",
                    "} else { count = 1; }",
                    "return {",
                    "    tagName: el.tagName.toLowerCase(),",
                    "    id: el.getAttribute('id'),",
                    "    classAttr: el.getAttribute('class'),",
                    "    sameTagIndex: index,",
                    "    sameTagCount: count",
                    "};",
                ],
            )
            .await?;

        if result.is_null() {
            return Err(HiderError::ElementNotFound(node.to_string()));
        }

        let payload: DescribePayload = serde_json::from_value(result)?;
        Ok(ElementDescriptor {
            tag_name: payload.tag_name,
            id: payload.id,
            class_attr: payload.class_attr,
            same_tag_index: payload.same_tag_index,
            same_tag_count: payload.same_tag_count,
        })
    }

    async fn is_connected(&self, node: NodeId) -> Result<bool> {
        let result = self.eval_on_node(node, &["return el.isConnected;"]).await?;
        Ok(result.as_bool().unwrap_or(false))
    }

    async fn inline_visibility(&self, node: NodeId) -> Result<String> {
        let result = self
            .eval_on_node(node, &["return el.style.visibility;"])
            .await?;

        if result.is_null() {
            return Err(HiderError::ElementNotFound(node.to_string()));
        }
        Ok(result.as_str().unwrap_or_default().to_string())
    }

    async fn set_inline_visibility(&mut self, node: NodeId, value: Option<&str>) -> Result<()> {
        let value_json = serde_json::to_string(value.unwrap_or_default())?;
        self.eval_on_node(
            node,
            &[
                // Assigning '' clears the inline override
                &format!("el.style.visibility = {};", value_json),
                "return true;",
            ],
        )
        .await?;
        Ok(())
    }

    async fn attribute(&self, node: NodeId, name: &str) -> Result<Option<String>> {
        let name_json = serde_json::to_string(name)?;
        let result = self
            .eval_on_node(node, &[&format!("return el.getAttribute({});", name_json)])
            .await?;
        Ok(result.as_str().map(|s| s.to_string()))
    }

    async fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<()> {
        let name_json = serde_json::to_string(name)?;
        let value_json = serde_json::to_string(value)?;
        self.eval_on_node(
            node,
            &[
                &format!("el.setAttribute({}, {});", name_json, value_json),
                "return true;",
            ],
        )
        .await?;
        Ok(())
    }

    async fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<()> {
        let name_json = serde_json::to_string(name)?;
        self.eval_on_node(
            node,
            &[
                &format!("el.removeAttribute({});", name_json),
                "return true;",
            ],
        )
        .await?;
        Ok(())
    }

    async fn mount_picker_overlay(&mut self, instruction: &str) -> Result<()> {
        let instruction_json = serde_json::to_string(instruction)?;
        let js = [
            "(function() {".to_string(),
            NODE_HELPERS.to_string(),
            "if (document.getElementById('eh-picker-overlay')) return true;".to_string(),
            "window.__ehPickerEvents = [];".to_string(),
            // Full-viewport overlay; pointer-events stay off so hit testing
            // still reaches the page underneath.
            "var overlay = document.createElement('div');".to_string(),
            "overlay.id = 'eh-picker-overlay';".to_string(),
            "overlay.style.cssText = 'position:fixed;top:0;left:0;width:100%;height:100%;z-index:2147483647;cursor:crosshair;pointer-events:none;';".to_string(),
            "document.body.appendChild(overlay);".to_string(),
            "var tooltip = document.createElement('div');".to_string(),
            "tooltip.id = 'eh-picker-tooltip';".to_string(),
            "tooltip.style.cssText = 'position:fixed;background:#333;color:#fff;padding:6px 10px;border-radius:4px;font-size:12px;font-family:sans-serif;z-index:2147483648;pointer-events:none;display:none;max-width:300px;white-space:nowrap;overflow:hidden;text-overflow:ellipsis;';".to_string(),
            "document.body.appendChild(tooltip);".to_string(),
            "var banner = document.createElement('div');".to_string(),
            "banner.id = 'eh-picker-banner';".to_string(),
            "banner.style.cssText = 'position:fixed;top:20px;left:50%;transform:translateX(-50%);background:rgba(0,0,0,0.8);color:#fff;padding:12px 24px;border-radius:8px;font-family:sans-serif;font-size:14px;z-index:2147483647;text-align:center;';".to_string(),
            format!("banner.textContent = {};", instruction_json),
            "document.body.appendChild(banner);".to_string(),
            "setTimeout(function() { banner.remove(); }, 5000);".to_string(),
            "function ownNode(el) {".to_string(),
            "    return el.id === 'eh-picker-overlay' || el.id === 'eh-picker-tooltip' ||".to_string(),
            "        el.id === 'eh-picker-banner' || el.id === 'eh-picker-feedback' ||".to_string(),
            "        !!el.closest('#eh-picker-overlay');".to_string(),
            "}".to_string(),
            "var handlers = {".to_string(),
            "    mouseover: function(e) {".to_string(),
            "        if (ownNode(e.target)) return;".to_string(),
            "        window.__ehPickerEvents.push({ kind: 'enter', node: __ehTag(e.target), x: e.clientX, y: e.clientY });".to_string(),
            "    },".to_string(),
            "    mouseout: function(e) {".to_string(),
            "        window.__ehPickerEvents.push({ kind: 'leave' });".to_string(),
            "    },".to_string(),
            "    click: function(e) {".to_string(),
            "        if (ownNode(e.target)) return;".to_string(),
            "        e.preventDefault();".to_string(),
            "        e.stopPropagation();".to_string(),
            "        window.__ehPickerEvents.push({ kind: 'click', node: __ehTag(e.target) });".to_string(),
            "    },".to_string(),
            "    keydown: function(e) {".to_string(),
            "        if (e.key === 'Escape') window.__ehPickerEvents.push({ kind: 'cancel' });".to_string(),
            "    }".to_string(),
            "};".to_string(),
            "window.__ehPickerHandlers = handlers;".to_string(),
            "document.addEventListener('mouseover', handlers.mouseover, true);".to_string(),
            "document.addEventListener('mouseout', handlers.mouseout, true);".to_string(),
            "document.addEventListener('click', handlers.click, true);".to_string(),
            "document.addEventListener('keydown', handlers.keydown, true);".to_string(),
            "return true;".to_string(),
            "})()".to_string(),
        ]
        .join("\n");

        self.eval(&js).await?;
        Ok(())
    }

    async fn remove_picker_overlay(&mut self) -> Result<()> {
        let js = r#"
            (function() {
                var handlers = window.__ehPickerHandlers;
                if (handlers) {
                    document.removeEventListener('mouseover', handlers.mouseover, true);
                    document.removeEventListener('mouseout', handlers.mouseout, true);
                    document.removeEventListener('click', handlers.click, true);
                    document.removeEventListener('keydown', handlers.keydown, true);
                    window.__ehPickerHandlers = null;
                }
                ['eh-picker-overlay', 'eh-picker-tooltip', 'eh-picker-banner'].forEach(function(id) {
                    var el = document.getElementById(id);
                    if (el) el.remove();
                });
                window.__ehPickerEvents = [];
                return true;
            })()
        "#;

        self.eval(js).await?;
        Ok(())
    }

    async fn set_highlight(&mut self, node: Option<NodeId>) -> Result<()> {
        let target = match node {
            Some(n) => n.0.to_string(),
            None => "null".to_string(),
        };

        let js = [
            "(function() {",
            NODE_HELPERS,
            "var prev = window.__ehHighlighted;",
            "if (prev) { prev.style.outline = ''; window.__ehHighlighted = null; }",
            &format!("var target = {};", target),
            "if (target === null) return true;",
            "var el = __ehById(target);",
            "if (!el) return true;",
            "el.style.outline = '2px solid #ff5722';",
            "window.__ehHighlighted = el;",
            "return true;",
            "})()",
        ]
        .join("\n");

        self.eval(&js).await?;
        Ok(())
    }

    async fn show_tooltip(&mut self, text: &str, x: f64, y: f64) -> Result<()> {
        let text_json = serde_json::to_string(text)?;
        let js = [
            "(function() {",
            "var tooltip = document.getElementById('eh-picker-tooltip');",
            "if (!tooltip) return false;",
            &format!("tooltip.textContent = {};", text_json),
            "tooltip.style.display = 'block';",
            &format!("tooltip.style.left = '{}px';", x),
            &format!("tooltip.style.top = '{}px';", y),
            "return true;",
            "})()",
        ]
        .join("\n");

        self.eval(&js).await?;
        Ok(())
    }

    async fn hide_tooltip(&mut self) -> Result<()> {
        let js = r#"
            (function() {
                var tooltip = document.getElementById('eh-picker-tooltip');
                if (tooltip) tooltip.style.display = 'none';
                return true;
            })()
        "#;

        self.eval(js).await?;
        Ok(())
    }

    async fn set_scroll_lock(&mut self, locked: bool) -> Result<()> {
        let js = if locked {
            "(function() { document.body.style.overflow = 'hidden'; return true; })()"
        } else {
            "(function() { document.body.style.overflow = ''; return true; })()"
        };

        self.eval(js).await?;
        Ok(())
    }

    async fn show_feedback(&mut self, message: &str, success: bool) -> Result<()> {
        let message_json = serde_json::to_string(message)?;
        let background = if success {
            "rgba(76, 175, 80, 0.9)"
        } else {
            "rgba(244, 67, 54, 0.9)"
        };

        let js = [
            "(function() {".to_string(),
            "var feedback = document.createElement('div');".to_string(),
            "feedback.id = 'eh-picker-feedback';".to_string(),
            format!(
                "feedback.style.cssText = 'position:fixed;top:50%;left:50%;transform:translate(-50%,-50%);background:{};color:#fff;padding:16px 32px;border-radius:8px;font-family:sans-serif;font-size:16px;font-weight:bold;z-index:2147483647;';",
                background
            ),
            format!("feedback.textContent = {};", message_json),
            "document.body.appendChild(feedback);".to_string(),
            "setTimeout(function() { feedback.remove(); }, 1000);".to_string(),
            "return true;".to_string(),
            "})()".to_string(),
        ]
        .join("\n");

        self.eval(&js).await?;
        Ok(())
    }

    async fn poll_picker_events(&mut self) -> Result<Vec<PickerEvent>> {
        let js = r#"
            (function() {
                var queue = window.__ehPickerEvents || [];
                window.__ehPickerEvents = [];
                return queue;
            })()
        "#;

        let result = self.eval(js).await?;
        let mut events = Vec::new();

        if let Some(items) = result.as_array() {
            for item in items {
                let node = item.get("node").and_then(|n| n.as_u64()).map(NodeId);
                match item.get("kind").and_then(|k| k.as_str()) {
                    Some("enter") => {
                        if let Some(node) = node {
                            events.push(PickerEvent::PointerEnter {
                                node,
                                x: item.get("x").and_then(|v| v.as_f64()).unwrap_or(0.0),
                                y: item.get("y").and_then(|v| v.as_f64()).unwrap_or(0.0),
                            });
                        }
                    }
                    Some("leave") => events.push(PickerEvent::PointerLeave),
                    Some("click") => {
                        if let Some(node) = node {
                            events.push(PickerEvent::Click { node });
                        }
                    }
                    Some("cancel") => events.push(PickerEvent::CancelKey),
                    _ => tracing::debug!("ignoring unknown picker event: {}", item),
                }
            }
        }

        Ok(events)
    }
}
