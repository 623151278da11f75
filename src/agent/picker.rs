//! Picker session state: a two-state machine driven by pointer events.
//!
//! Transition logic lives on [`crate::agent::PageAgent`], which owns the
//! DOM and the hidden-element registry; this module holds the session state
//! and the step results the host loop acts on.

use crate::dom::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PickerState {
    #[default]
    Idle,
    Picking,
}

/// Reported upward after a successful pick so the orchestration layer can
/// persist a rule.
#[derive(Debug, Clone, PartialEq)]
pub struct PickOutcome {
    pub selector: String,
    pub url: String,
}

/// What one processed event means for the session.
#[derive(Debug, Clone, PartialEq)]
pub enum PickerStep {
    /// Session continues (hover feedback only).
    Continue,
    /// A click concluded the session. The outcome is `None` when the
    /// clicked element was already hidden. The host stops the picker after
    /// a short grace delay so feedback stays visible.
    Concluded(Option<PickOutcome>),
    /// The cancel key stopped the session; no mutation happened.
    Cancelled,
}

#[derive(Debug, Default)]
pub struct Picker {
    state: PickerState,
    hovered: Option<NodeId>,
}

impl Picker {
    pub fn state(&self) -> PickerState {
        self.state
    }

    pub fn is_picking(&self) -> bool {
        self.state == PickerState::Picking
    }

    pub(crate) fn begin(&mut self) {
        self.state = PickerState::Picking;
    }

    pub(crate) fn end(&mut self) {
        self.state = PickerState::Idle;
        self.hovered = None;
    }

    pub(crate) fn set_hovered(&mut self, node: Option<NodeId>) {
        self.hovered = node;
    }

    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }
}
