// ABOUTME: Pane layout management for the navbar sidebar app.
// ABOUTME: Binary split tree per tab, tab snapshots, and the container that mutates them.

mod container;
mod event;
mod tab;
mod tree;

pub use container::{
    CommandCompletion, FocusDirection, PaneContainer, PaneView, MIN_WEIGHT, RESIZE_STEP,
};
pub use event::PaneEvent;
pub use tab::{TabSnapshots, TabState};
pub use tree::{Axis, LayoutError, NodeIdx, PaneId, PaneTree, Rect, DEFAULT_WEIGHT};
