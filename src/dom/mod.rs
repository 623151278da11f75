//! Page DOM abstraction: the seam between the page agent and whatever is
//! actually rendering the document (a live CDP page, or the in-process
//! snapshot arena used by tests).

pub mod snapshot;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::selector::ElementDescriptor;

/// Opaque per-page element identity handed out by a driver. Ids are stable
/// for the lifetime of one page; they are never reused for a different
/// element within that lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Bounding box in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check if a point is inside this bounding box.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }
}

/// Raw pointer/keyboard events captured by the picker overlay and drained
/// by the agent's state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum PickerEvent {
    PointerEnter { node: NodeId, x: f64, y: f64 },
    PointerLeave,
    Click { node: NodeId },
    CancelKey,
}

/// Operations the page agent needs from a document. Drivers own node
/// identity (see [`NodeId`]) and are responsible for excluding their own
/// overlay nodes from hit testing and picker events.
#[async_trait]
pub trait PageDom: Send {
    /// Full address of the page this DOM belongs to.
    fn url(&self) -> &str;

    /// Hostname of the page, empty when the URL does not parse.
    fn hostname(&self) -> &str;

    async fn viewport(&self) -> Result<Viewport>;

    /// Topmost visible element at the given viewport coordinates.
    async fn element_at_point(&mut self, x: f64, y: f64) -> Result<Option<NodeId>>;

    /// First element matching a selector, in document order. A malformed
    /// selector resolves to `None`; callers cannot distinguish it from
    /// "not found".
    async fn resolve(&mut self, selector: &str) -> Result<Option<NodeId>>;

    async fn describe(&self, node: NodeId) -> Result<ElementDescriptor>;

    async fn is_connected(&self, node: NodeId) -> Result<bool>;

    /// Inline `visibility` style value; empty string when unset.
    async fn inline_visibility(&self, node: NodeId) -> Result<String>;

    /// Set the inline `visibility` value, or clear it with `None`.
    async fn set_inline_visibility(&mut self, node: NodeId, value: Option<&str>) -> Result<()>;

    async fn attribute(&self, node: NodeId, name: &str) -> Result<Option<String>>;

    async fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<()>;

    async fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<()>;

    /// Mount the picker overlay and show the instruction banner. The banner
    /// dismisses itself after a fixed interval; the overlay stays until
    /// [`PageDom::remove_picker_overlay`].
    async fn mount_picker_overlay(&mut self, instruction: &str) -> Result<()>;

    async fn remove_picker_overlay(&mut self) -> Result<()>;

    /// Outline the given node, clearing any previous outline. `None` clears.
    async fn set_highlight(&mut self, node: Option<NodeId>) -> Result<()>;

    async fn show_tooltip(&mut self, text: &str, x: f64, y: f64) -> Result<()>;

    async fn hide_tooltip(&mut self) -> Result<()>;

    async fn set_scroll_lock(&mut self, locked: bool) -> Result<()>;

    /// Transient centered feedback message (auto-dismissing).
    async fn show_feedback(&mut self, message: &str, success: bool) -> Result<()>;

    /// Drain pointer/keyboard events captured since the last poll.
    async fn poll_picker_events(&mut self) -> Result<Vec<PickerEvent>>;
}
