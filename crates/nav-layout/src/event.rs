// ABOUTME: Notifications emitted by the pane container.
// ABOUTME: Drained by the app to refresh the sidebar, tab list, and activity bar.

use crate::tree::PaneId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaneEvent {
    /// Number of panes in the active tab after a rebuild
    PaneCountChanged(usize),
    FocusChanged { pane: PaneId, name: String },
    TabSwitched(usize),
}
