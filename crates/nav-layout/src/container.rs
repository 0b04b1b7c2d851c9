// ABOUTME: Pane container: owns the live tab's tree, tab snapshots, and pane content.
// ABOUTME: Implements split/close/focus/resize/tab switching and rebuilds the display map.

use std::collections::{BTreeMap, HashMap};

use nav_core::Config;
use nav_terminal::{CommandOutcome, CommandRunner, LeafContent};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::event::PaneEvent;
use crate::tab::{TabSnapshots, TabState};
use crate::tree::{Axis, LayoutError, PaneId, PaneTree, Rect, DEFAULT_WEIGHT};

/// Weight moved between siblings per resize step
pub const RESIZE_STEP: f64 = 0.2;

/// Smallest weight a pane with a sibling may have
pub const MIN_WEIGHT: f64 = 0.2;

// Absorbs rounding from repeated 0.2 steps
const WEIGHT_EPSILON: f64 = 1e-9;

/// Logical focus movement. Left/up go to the previous pane in canonical
/// order, right/down to the next one, wrapping around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusDirection {
    Left,
    Up,
    Right,
    Down,
}

/// A displayed pane, produced by a rebuild
#[derive(Debug, Clone, PartialEq)]
pub struct PaneView {
    pub id: PaneId,
    pub content: LeafContent,
    pub focused: bool,
    pub rect: Rect,
}

/// Result of a dispatched command, sent back from its task
#[derive(Debug)]
pub struct CommandCompletion {
    pub pane: PaneId,
    pub command: String,
    pub outcome: CommandOutcome,
    ticket: u64,
}

#[derive(Debug)]
struct InFlight {
    ticket: u64,
    task: JoinHandle<()>,
}

pub struct PaneContainer {
    tree: PaneTree,
    focused: PaneId,
    active_tab: usize,
    snapshots: TabSnapshots,
    /// Shared by all tabs and never decremented
    id_counter: u64,
    panes: BTreeMap<PaneId, PaneView>,
    pending_commands: BTreeMap<PaneId, String>,
    in_flight: HashMap<PaneId, InFlight>,
    next_ticket: u64,
    runner: CommandRunner,
    completions_tx: mpsc::UnboundedSender<CommandCompletion>,
    completions_rx: mpsc::UnboundedReceiver<CommandCompletion>,
    events: Vec<PaneEvent>,
}

impl PaneContainer {
    /// A container showing tab 0 with a single pane
    pub fn new(runner: CommandRunner) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let first = PaneId(1);
        let mut container = Self {
            tree: PaneTree::new(first),
            focused: first,
            active_tab: 0,
            snapshots: TabSnapshots::new(),
            id_counter: first.0,
            panes: BTreeMap::new(),
            pending_commands: BTreeMap::new(),
            in_flight: HashMap::new(),
            next_ticket: 0,
            runner,
            completions_tx,
            completions_rx,
            events: Vec::new(),
        };
        container.rebuild_layout();
        container.events.clear();
        container
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(CommandRunner::from_config(config))
    }

    fn next_id(&mut self) -> PaneId {
        self.id_counter += 1;
        PaneId(self.id_counter)
    }

    pub fn pane_count(&self) -> usize {
        self.tree.leaf_count()
    }

    pub fn focused_pane_id(&self) -> PaneId {
        self.focused
    }

    pub fn active_tab(&self) -> usize {
        self.active_tab
    }

    pub fn id_counter(&self) -> u64 {
        self.id_counter
    }

    pub fn tree(&self) -> &PaneTree {
        &self.tree
    }

    pub fn all_identifiers(&self) -> Vec<PaneId> {
        self.tree.all_identifiers()
    }

    pub fn get_pane(&self, id: PaneId) -> Option<&PaneView> {
        self.panes.get(&id)
    }

    /// Displayed panes in canonical order
    pub fn panes(&self) -> Vec<&PaneView> {
        self.tree
            .all_identifiers()
            .into_iter()
            .filter_map(|id| self.panes.get(&id))
            .collect()
    }

    pub fn snapshot(&self, tab: usize) -> Option<&TabState> {
        self.snapshots.get(tab)
    }

    /// Live count for the active tab, saved count for visited tabs, 1 otherwise
    pub fn get_tab_pane_count(&self, tab: usize) -> usize {
        if tab == self.active_tab {
            self.pane_count()
        } else {
            self.snapshots.get(tab).map_or(1, TabState::pane_count)
        }
    }

    pub fn get_focused_weight(&self) -> f64 {
        self.tree
            .find_leaf(self.focused)
            .map_or(DEFAULT_WEIGHT, |idx| self.tree.weight(idx))
    }

    pub fn hit_test(&self, x: f32, y: f32) -> Option<PaneId> {
        self.tree.hit_test(x, y)
    }

    /// Take the notifications queued since the last call
    pub fn drain_events(&mut self) -> Vec<PaneEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn split(&mut self, axis: Axis, command: Option<&str>) -> Option<PaneId> {
        let target = self.focused;
        if !self.tree.contains(target) {
            tracing::debug!("Split refused: {}", LayoutError::UnknownPane(target));
            return None;
        }

        let new_id = self.next_id();
        if let Err(e) = self.tree.split_leaf(target, axis, new_id) {
            tracing::debug!("Split refused: {}", e);
            return None;
        }

        if let Some(command) = command.filter(|c| !c.trim().is_empty()) {
            self.pending_commands.insert(new_id, command.to_string());
        }

        tracing::info!(
            "Split {} {:?}, new pane {}, total panes: {}",
            target,
            axis,
            new_id,
            self.pane_count()
        );
        self.rebuild_layout();
        self.focus_pane(new_id);
        Some(new_id)
    }

    pub fn split_horizontal(&mut self, command: Option<&str>) -> Option<PaneId> {
        self.split(Axis::Horizontal, command)
    }

    pub fn split_vertical(&mut self, command: Option<&str>) -> Option<PaneId> {
        self.split(Axis::Vertical, command)
    }

    /// Close a pane (the focused one by default). The last pane stays.
    pub fn close(&mut self, target: Option<PaneId>) -> bool {
        let target = target.unwrap_or(self.focused);
        if self.pane_count() <= 1 {
            tracing::debug!("Close refused: {}", LayoutError::LastPane);
            return false;
        }
        if let Err(e) = self.tree.remove_leaf(target) {
            tracing::debug!("Close refused: {}", e);
            return false;
        }

        self.cancel_command(target);
        self.pending_commands.remove(&target);

        let focus_moved = target == self.focused;
        if focus_moved {
            self.focused = self.tree.first_identifier();
        }

        tracing::info!(
            "Closed pane {}, remaining panes: {}",
            target,
            self.pane_count()
        );
        self.rebuild_layout();
        if focus_moved {
            self.emit_focus_changed();
        }
        true
    }

    pub fn focus_pane(&mut self, id: PaneId) {
        if !self.panes.contains_key(&id) {
            tracing::debug!("Focus ignored: {}", LayoutError::UnknownPane(id));
            return;
        }

        if let Some(previous) = self.panes.get_mut(&self.focused) {
            previous.focused = false;
        }
        self.focused = id;
        if let Some(view) = self.panes.get_mut(&id) {
            view.focused = true;
        }
        self.emit_focus_changed();
    }

    pub fn focus_direction(&mut self, direction: FocusDirection) {
        let ids = self.tree.all_identifiers();
        if ids.len() <= 1 {
            return;
        }
        let Some(current) = ids.iter().position(|id| *id == self.focused) else {
            return;
        };

        let next = match direction {
            FocusDirection::Left | FocusDirection::Up => (current + ids.len() - 1) % ids.len(),
            FocusDirection::Right | FocusDirection::Down => (current + 1) % ids.len(),
        };
        self.focus_pane(ids[next]);
    }

    /// Grow or shrink the focused pane against its sibling
    pub fn resize_focused(&mut self, grow: bool) -> bool {
        match self.transfer_weight(grow) {
            Ok(weight) => {
                tracing::info!("Resized {} to weight {:.2}", self.focused, weight);
                self.rebuild_layout();
                true
            }
            Err(e) => {
                tracing::debug!("Resize refused: {}", e);
                false
            }
        }
    }

    fn transfer_weight(&mut self, grow: bool) -> Result<f64, LayoutError> {
        let leaf = self
            .tree
            .find_leaf(self.focused)
            .ok_or(LayoutError::UnknownPane(self.focused))?;
        let sibling = self
            .tree
            .sibling(leaf)
            .ok_or(LayoutError::NoSibling(self.focused))?;

        let (from, to) = if grow { (sibling, leaf) } else { (leaf, sibling) };
        let remaining = self.tree.weight(from) - RESIZE_STEP;
        if remaining < MIN_WEIGHT - WEIGHT_EPSILON {
            return Err(LayoutError::ResizeLimit);
        }

        self.tree.set_weight(from, remaining);
        self.tree.set_weight(to, self.tree.weight(to) + RESIZE_STEP);
        Ok(self.tree.weight(leaf))
    }

    /// Save the active tab and display `target`, creating a single pane on first visit
    pub fn switch_tab(&mut self, target: usize) {
        if target == self.active_tab {
            return;
        }

        let departing = TabState {
            tree: self.tree.clone(),
            focused: self.focused,
            id_counter_at_save: self.id_counter,
            saved_content: self.capture_content(),
        };
        self.snapshots.save(self.active_tab, departing);
        self.active_tab = target;

        match self.snapshots.get(target).cloned() {
            Some(state) => {
                self.tree = state.tree;
                self.focused = state.focused;
                // Ids minted while this tab was away must stay unique
                self.id_counter = self.id_counter.max(state.id_counter_at_save);
                self.rebuild_with(state.saved_content);
            }
            None => {
                let id = self.next_id();
                self.tree = PaneTree::new(id);
                self.focused = id;
                self.rebuild_with(BTreeMap::new());
            }
        }

        tracing::info!(
            "Switched to tab {} with {} panes",
            target,
            self.pane_count()
        );
        self.events.push(PaneEvent::TabSwitched(target));
    }

    /// Forget an inactive tab's snapshot and renumber the tabs after it
    pub fn remove_tab(&mut self, tab: usize) -> bool {
        if tab == self.active_tab {
            tracing::debug!("Refusing to remove the active tab {}", tab);
            return false;
        }

        if let Some(state) = self.snapshots.remove_and_shift(tab) {
            for id in state.tree.all_identifiers() {
                self.cancel_command(id);
            }
        }
        if self.active_tab > tab {
            self.active_tab -= 1;
            self.events.push(PaneEvent::TabSwitched(self.active_tab));
        }
        tracing::info!("Removed tab {}", tab);
        true
    }

    pub fn rename_pane(&mut self, id: PaneId, name: &str) -> bool {
        let Some(view) = self.panes.get_mut(&id) else {
            tracing::debug!("Rename ignored: {}", LayoutError::UnknownPane(id));
            return false;
        };
        view.content.name = name.to_string();
        if id == self.focused {
            self.emit_focus_changed();
        }
        true
    }

    pub fn rename_focused_pane(&mut self, name: &str) -> bool {
        self.rename_pane(self.focused, name)
    }

    /// Replace a pane's command line without running it
    pub fn set_pane_command(&mut self, id: PaneId, command: &str) -> bool {
        match self.panes.get_mut(&id) {
            Some(view) => {
                view.content.command = command.to_string();
                true
            }
            None => false,
        }
    }

    /// Run a command in a pane and wait for it to finish or time out
    pub async fn run_command_in_pane(&mut self, id: PaneId, command: &str) -> bool {
        if !self.panes.contains_key(&id) {
            tracing::debug!("Run ignored: {}", LayoutError::UnknownPane(id));
            return false;
        }
        self.cancel_command(id);

        let runner = self.runner.clone();
        if let Some(view) = self.panes.get_mut(&id) {
            view.content.run(&runner, command).await;
        }
        true
    }

    pub async fn run_command_in_focused(&mut self, command: &str) -> bool {
        self.run_command_in_pane(self.focused, command).await
    }

    /// Start a command in the background. Its output arrives through
    /// [`PaneContainer::next_completion`] and [`PaneContainer::apply_completion`].
    pub fn dispatch_command(&mut self, id: PaneId, command: &str) -> bool {
        if !self.panes.contains_key(&id) {
            tracing::debug!("Dispatch ignored: {}", LayoutError::UnknownPane(id));
            return false;
        }
        self.cancel_command(id);

        let Some(view) = self.panes.get_mut(&id) else {
            return false;
        };
        view.content.begin(command);

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!("Cannot run {:?} in {}: {}", command, id, e);
                view.content
                    .finish(&CommandOutcome::Failed("no async runtime".to_string()));
                return true;
            }
        };

        self.next_ticket += 1;
        let ticket = self.next_ticket;
        let runner = self.runner.clone();
        let tx = self.completions_tx.clone();
        let command = command.to_string();
        let task = handle.spawn(async move {
            let outcome = runner.run(&command).await;
            let _ = tx.send(CommandCompletion {
                pane: id,
                command,
                outcome,
                ticket,
            });
        });
        self.in_flight.insert(id, InFlight { ticket, task });
        true
    }

    pub fn dispatch_in_focused(&mut self, command: &str) -> bool {
        self.dispatch_command(self.focused, command)
    }

    pub fn is_command_running(&self, id: PaneId) -> bool {
        self.in_flight.contains_key(&id)
    }

    fn cancel_command(&mut self, id: PaneId) {
        if let Some(flight) = self.in_flight.remove(&id) {
            flight.task.abort();
            tracing::debug!("Cancelled running command in {}", id);
        }
    }

    /// Wait for the next background command to finish
    pub async fn next_completion(&mut self) -> Option<CommandCompletion> {
        self.completions_rx.recv().await
    }

    /// Store a finished command's output in its pane, wherever that pane now
    /// lives. Stale completions (cancelled or superseded) are dropped.
    pub fn apply_completion(&mut self, completion: CommandCompletion) -> bool {
        let current = self
            .in_flight
            .get(&completion.pane)
            .is_some_and(|flight| flight.ticket == completion.ticket);
        if !current {
            tracing::debug!("Discarding stale result for {}", completion.pane);
            return false;
        }
        self.in_flight.remove(&completion.pane);

        let content = match self.panes.get_mut(&completion.pane) {
            Some(view) => Some(&mut view.content),
            None => self.snapshots.content_mut(completion.pane),
        };
        match content {
            Some(content) => {
                content.finish(&completion.outcome);
                true
            }
            None => {
                tracing::debug!("Discarding result for closed {}", completion.pane);
                false
            }
        }
    }

    /// Apply every completion that has already arrived
    pub fn apply_ready_completions(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.completions_rx.try_recv() {
            if self.apply_completion(completion) {
                applied += 1;
            }
        }
        applied
    }

    /// Wait until every background command has reported back
    pub async fn wait_for_commands(&mut self) {
        while !self.in_flight.is_empty() {
            match self.completions_rx.recv().await {
                Some(completion) => {
                    self.apply_completion(completion);
                }
                None => break,
            }
        }
    }

    fn capture_content(&self) -> BTreeMap<PaneId, LeafContent> {
        self.panes
            .iter()
            .map(|(id, view)| (*id, view.content.clone()))
            .collect()
    }

    /// Regenerate the display map from the live tree, keeping the content of
    /// every pane that was already displayed
    pub fn rebuild_layout(&mut self) {
        let saved = self.capture_content();
        self.rebuild_with(saved);
    }

    fn rebuild_with(&mut self, mut saved: BTreeMap<PaneId, LeafContent>) {
        let rects = self.tree.pane_rects();
        self.panes = self
            .tree
            .all_identifiers()
            .into_iter()
            .map(|id| {
                let content = saved
                    .remove(&id)
                    .unwrap_or_else(|| LeafContent::named(id.default_name()));
                let view = PaneView {
                    id,
                    content,
                    focused: id == self.focused,
                    rect: rects[&id],
                };
                (id, view)
            })
            .collect();
        debug_assert!(
            self.panes.contains_key(&self.focused),
            "focus must be a displayed pane"
        );

        for (id, command) in std::mem::take(&mut self.pending_commands) {
            if !self.dispatch_command(id, &command) {
                tracing::debug!("Dropping queued command for {}", id);
            }
        }

        self.events
            .push(PaneEvent::PaneCountChanged(self.pane_count()));
    }

    fn emit_focus_changed(&mut self) {
        let name = self
            .panes
            .get(&self.focused)
            .map(|view| view.content.name.clone())
            .unwrap_or_default();
        self.events.push(PaneEvent::FocusChanged {
            pane: self.focused,
            name,
        });
    }
}

impl Drop for PaneContainer {
    fn drop(&mut self) {
        for (_, flight) in self.in_flight.drain() {
            flight.task.abort();
        }
    }
}
