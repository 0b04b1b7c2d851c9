// ABOUTME: Saved layouts of inactive tabs.
// ABOUTME: A snapshot holds a tab's tree, focus, id counter, and pane content by value.

use std::collections::BTreeMap;

use nav_terminal::LeafContent;

use crate::tree::{PaneId, PaneTree};

/// One tab's layout while it is not displayed
#[derive(Debug, Clone)]
pub struct TabState {
    pub tree: PaneTree,
    /// Always a leaf of `tree`
    pub focused: PaneId,
    pub id_counter_at_save: u64,
    pub saved_content: BTreeMap<PaneId, LeafContent>,
}

impl TabState {
    pub fn pane_count(&self) -> usize {
        self.tree.leaf_count()
    }
}

/// Snapshots keyed by tab index. Entries are only removed explicitly.
#[derive(Debug, Clone, Default)]
pub struct TabSnapshots {
    tabs: BTreeMap<usize, TabState>,
}

impl TabSnapshots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a snapshot, replacing any earlier one for the same tab
    pub fn save(&mut self, index: usize, state: TabState) {
        debug_assert!(
            state.tree.contains(state.focused),
            "snapshot focus must be one of its panes"
        );
        self.tabs.insert(index, state);
    }

    pub fn get(&self, index: usize) -> Option<&TabState> {
        self.tabs.get(&index)
    }

    /// Content of a pane saved in any snapshot
    pub fn content_mut(&mut self, pane: PaneId) -> Option<&mut LeafContent> {
        self.tabs
            .values_mut()
            .find_map(|state| state.saved_content.get_mut(&pane))
    }

    /// Drop the snapshot at `index` and renumber the tabs after it
    pub fn remove_and_shift(&mut self, index: usize) -> Option<TabState> {
        let removed = self.tabs.remove(&index);
        let later = self.tabs.split_off(&index);
        self.tabs
            .extend(later.into_iter().map(|(i, state)| (i - 1, state)));
        removed
    }
}
