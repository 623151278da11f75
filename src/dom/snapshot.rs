//! In-process DOM arena: the reference implementation of [`PageDom`].
//!
//! Nodes live in an id-keyed arena with parent/child links and viewport
//! bounding boxes, mirroring the node model a CDP driver assembles from the
//! browser. The picker surface is modelled as plain state so tests can
//! assert on overlay/highlight/scroll-lock effects.

use std::collections::VecDeque;

use async_trait::async_trait;

use super::{BoundingBox, NodeId, PageDom, PickerEvent, Viewport};
use crate::error::{HiderError, Result};
use crate::selector::{self, ElementDescriptor};

#[derive(Debug, Clone)]
struct SnapshotNode {
    tag: String,
    attrs: Vec<(String, String)>,
    inline_visibility: Option<String>,
    bbox: BoundingBox,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    connected: bool,
}

impl SnapshotNode {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Default, Clone)]
struct PickerSurface {
    overlays: usize,
    banner: Option<String>,
    highlighted: Option<NodeId>,
    tooltip: Option<(String, f64, f64)>,
    scroll_locked: bool,
    feedback: Vec<(String, bool)>,
    queue: VecDeque<PickerEvent>,
}

pub struct SnapshotDom {
    url: String,
    hostname: String,
    viewport: Viewport,
    nodes: Vec<SnapshotNode>,
    root: NodeId,
    surface: PickerSurface,
}

impl SnapshotDom {
    /// Create a document with an implicit `body` root.
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let hostname = url::Url::parse(&url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_string()))
            .unwrap_or_default();

        let body = SnapshotNode {
            tag: "body".to_string(),
            attrs: Vec::new(),
            inline_visibility: None,
            bbox: BoundingBox::default(),
            parent: None,
            children: Vec::new(),
            connected: true,
        };

        Self {
            url,
            hostname,
            viewport: Viewport {
                width: 1280.0,
                height: 720.0,
            },
            nodes: vec![body],
            root: NodeId(0),
            surface: PickerSurface::default(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport = Viewport { width, height };
    }

    /// Append an element under `parent` (the root when `None`).
    pub fn append_element(
        &mut self,
        parent: Option<NodeId>,
        tag: &str,
        attrs: &[(&str, &str)],
    ) -> NodeId {
        let parent = parent.unwrap_or(self.root);
        let id = NodeId(self.nodes.len() as u64);

        self.nodes.push(SnapshotNode {
            tag: tag.to_string(),
            attrs: attrs
                .iter()
                .map(|(n, v)| (n.to_string(), v.to_string()))
                .collect(),
            inline_visibility: None,
            bbox: BoundingBox::default(),
            parent: Some(parent),
            children: Vec::new(),
            connected: true,
        });

        self.nodes[parent.0 as usize].children.push(id);
        id
    }

    pub fn set_bounding_box(&mut self, node: NodeId, bbox: BoundingBox) {
        if let Some(n) = self.nodes.get_mut(node.0 as usize) {
            n.bbox = bbox;
        }
    }

    /// Remove a node from its parent and mark the subtree disconnected,
    /// like a page script removing it from the live document.
    pub fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes.get(node.0 as usize).and_then(|n| n.parent) {
            self.nodes[parent.0 as usize]
                .children
                .retain(|c| *c != node);
        }

        let mut pending = vec![node];
        while let Some(id) = pending.pop() {
            if let Some(n) = self.nodes.get_mut(id.0 as usize) {
                n.connected = false;
                pending.extend(n.children.iter().copied());
            }
        }
    }

    /// Queue a raw picker event, as the overlay listeners would.
    pub fn push_picker_event(&mut self, event: PickerEvent) {
        self.surface.queue.push_back(event);
    }

    pub fn overlay_count(&self) -> usize {
        self.surface.overlays
    }

    pub fn banner(&self) -> Option<&str> {
        self.surface.banner.as_deref()
    }

    pub fn highlighted(&self) -> Option<NodeId> {
        self.surface.highlighted
    }

    pub fn tooltip(&self) -> Option<&(String, f64, f64)> {
        self.surface.tooltip.as_ref()
    }

    pub fn is_scroll_locked(&self) -> bool {
        self.surface.scroll_locked
    }

    pub fn feedback_log(&self) -> &[(String, bool)] {
        &self.surface.feedback
    }

    fn node(&self, id: NodeId) -> Result<&SnapshotNode> {
        self.nodes
            .get(id.0 as usize)
            .ok_or_else(|| HiderError::Other(format!("unknown {id}")))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut SnapshotNode> {
        self.nodes
            .get_mut(id.0 as usize)
            .ok_or_else(|| HiderError::Other(format!("unknown {id}")))
    }

    /// Pre-order document traversal of connected nodes.
    fn document_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0 as usize];
            if !node.connected {
                continue;
            }
            order.push(id);
            for child in node.children.iter().rev() {
                stack.push(*child);
            }
        }
        order
    }

    /// 1-based position among same-tag siblings, and the sibling count.
    fn same_tag_position(&self, id: NodeId) -> (usize, usize) {
        let node = &self.nodes[id.0 as usize];
        let Some(parent) = node.parent else {
            return (1, 1);
        };

        let same_tag: Vec<NodeId> = self.nodes[parent.0 as usize]
            .children
            .iter()
            .copied()
            .filter(|c| self.nodes[c.0 as usize].tag == node.tag)
            .collect();

        let index = same_tag.iter().position(|c| *c == id).map_or(1, |i| i + 1);
        (index, same_tag.len())
    }
}

#[async_trait]
impl PageDom for SnapshotDom {
    fn url(&self) -> &str {
        &self.url
    }

    fn hostname(&self) -> &str {
        &self.hostname
    }

    async fn viewport(&self) -> Result<Viewport> {
        Ok(self.viewport)
    }

    async fn element_at_point(&mut self, x: f64, y: f64) -> Result<Option<NodeId>> {
        // Later document order paints on top; hidden elements are not hit.
        let mut hit = None;
        for id in self.document_order() {
            let node = &self.nodes[id.0 as usize];
            if node.inline_visibility.as_deref() == Some("hidden") {
                continue;
            }
            if node.bbox.contains(x, y) {
                hit = Some(id);
            }
        }
        Ok(hit)
    }

    async fn resolve(&mut self, selector: &str) -> Result<Option<NodeId>> {
        let Ok(parsed) = selector::parse(selector) else {
            return Ok(None);
        };

        for id in self.document_order() {
            let node = &self.nodes[id.0 as usize];
            let (index, _) = self.same_tag_position(id);
            if parsed.matches(&node.tag, node.attr("id"), node.attr("class"), index) {
                return Ok(Some(id));
            }
        }

        Ok(None)
    }

    async fn describe(&self, node: NodeId) -> Result<ElementDescriptor> {
        let data = self.node(node)?;
        let (index, count) = self.same_tag_position(node);

        Ok(ElementDescriptor {
            tag_name: data.tag.clone(),
            id: data.attr("id").map(|s| s.to_string()),
            class_attr: data.attr("class").map(|s| s.to_string()),
            same_tag_index: index,
            same_tag_count: count,
        })
    }

    async fn is_connected(&self, node: NodeId) -> Result<bool> {
        Ok(self.node(node)?.connected)
    }

    async fn inline_visibility(&self, node: NodeId) -> Result<String> {
        Ok(self.node(node)?.inline_visibility.clone().unwrap_or_default())
    }

    async fn set_inline_visibility(&mut self, node: NodeId, value: Option<&str>) -> Result<()> {
        let data = self.node_mut(node)?;
        data.inline_visibility = match value {
            Some(v) if !v.is_empty() => Some(v.to_string()),
            _ => None,
        };
        Ok(())
    }

    async fn attribute(&self, node: NodeId, name: &str) -> Result<Option<String>> {
        Ok(self.node(node)?.attr(name).map(|s| s.to_string()))
    }

    async fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<()> {
        let data = self.node_mut(node)?;
        if let Some(entry) = data.attrs.iter_mut().find(|(n, _)| n == name) {
            entry.1 = value.to_string();
        } else {
            data.attrs.push((name.to_string(), value.to_string()));
        }
        Ok(())
    }

    async fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<()> {
        self.node_mut(node)?.attrs.retain(|(n, _)| n != name);
        Ok(())
    }

    async fn mount_picker_overlay(&mut self, instruction: &str) -> Result<()> {
        self.surface.overlays += 1;
        self.surface.banner = Some(instruction.to_string());
        Ok(())
    }

    async fn remove_picker_overlay(&mut self) -> Result<()> {
        self.surface.overlays = 0;
        self.surface.banner = None;
        self.surface.tooltip = None;
        Ok(())
    }

    async fn set_highlight(&mut self, node: Option<NodeId>) -> Result<()> {
        self.surface.highlighted = node;
        Ok(())
    }

    async fn show_tooltip(&mut self, text: &str, x: f64, y: f64) -> Result<()> {
        self.surface.tooltip = Some((text.to_string(), x, y));
        Ok(())
    }

    async fn hide_tooltip(&mut self) -> Result<()> {
        self.surface.tooltip = None;
        Ok(())
    }

    async fn set_scroll_lock(&mut self, locked: bool) -> Result<()> {
        self.surface.scroll_locked = locked;
        Ok(())
    }

    async fn show_feedback(&mut self, message: &str, success: bool) -> Result<()> {
        self.surface.feedback.push((message.to_string(), success));
        Ok(())
    }

    async fn poll_picker_events(&mut self) -> Result<Vec<PickerEvent>> {
        Ok(self.surface.queue.drain(..).collect())
    }
}
