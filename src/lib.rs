//! Element Hider: mark DOM elements on web pages as hidden, persist the
//! choice keyed by `(selector, url)`, and re-apply it when matching pages
//! are revisited.
//!
//! The core (selector synthesis, the page agent, the picker state machine,
//! rule storage) is host-independent and driven through the [`dom::PageDom`]
//! seam; the `browser` module supplies the live CDP implementation the CLI
//! uses.

pub mod agent;
pub mod browser;
pub mod cli;
pub mod commands;
pub mod config;
pub mod coordinator;
pub mod dom;
pub mod error;
pub mod rules;
pub mod selector;
