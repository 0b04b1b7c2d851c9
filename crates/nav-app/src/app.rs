// ABOUTME: Application state and the modal key/mouse dispatcher.
// ABOUTME: Routes input to the pane container and keeps the sidebar in sync with its events.

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;

use nav_core::Config;
use nav_layout::{FocusDirection, PaneContainer, PaneEvent};

use crate::mode::{Mode, RenameTarget};
use crate::render;
use crate::widgets::{ActivityBar, Clock, TabList};

pub struct App {
    pub config: Config,
    pub container: PaneContainer,
    pub tabs: TabList,
    pub activity: ActivityBar,
    pub clock: Clock,
    pub mode: Mode,
    /// Text typed into the rename prompt
    pub prompt: String,
    pub sidebar_visible: bool,
    pub status_visible: bool,
    pub should_quit: bool,
    /// Last known terminal size, for mouse hit-testing
    viewport: Rect,
}

impl App {
    pub fn new(config: Config) -> Self {
        let container = PaneContainer::from_config(&config);
        let tabs = TabList::with_tabs(config.initial_tabs);
        let mut clock = Clock::new(config.clock_format.clone());
        clock.tick();

        let mut app = Self {
            sidebar_visible: config.sidebar_visible,
            container,
            tabs,
            activity: ActivityBar::default(),
            clock,
            mode: Mode::Normal,
            prompt: String::new(),
            status_visible: false,
            should_quit: false,
            viewport: Rect::default(),
            config,
        };
        let name = app.focused_pane_name();
        app.activity.update(&app.active_tab_label(), &name);
        app
    }

    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }

    fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            tracing::debug!("Mode {:?} -> {:?}", self.mode, mode);
        }
        self.mode = mode;
    }

    fn active_tab_label(&self) -> String {
        format!("Tab {}", self.container.active_tab() + 1)
    }

    fn focused_pane_name(&self) -> String {
        self.container
            .get_pane(self.container.focused_pane_id())
            .map(|pane| pane.content.name.clone())
            .unwrap_or_default()
    }

    /// Apply container notifications to the tab list and activity bar
    pub fn sync(&mut self) {
        for event in self.container.drain_events() {
            match event {
                PaneEvent::PaneCountChanged(count) => {
                    self.tabs.set_pane_count(self.container.active_tab(), count);
                }
                PaneEvent::FocusChanged { name, .. } => {
                    self.activity.update(&self.active_tab_label(), &name);
                }
                PaneEvent::TabSwitched(index) => {
                    self.tabs.set_active(index);
                    let name = self.focused_pane_name();
                    self.activity.update(&self.active_tab_label(), &name);
                }
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if key.code == KeyCode::Esc {
            if matches!(self.mode, Mode::Rename(_)) {
                self.prompt.clear();
            }
            self.set_mode(Mode::Normal);
            return;
        }

        match self.mode {
            Mode::Normal => self.handle_normal_key(key.code),
            Mode::Pane => self.handle_pane_key(key.code),
            Mode::Tab => self.handle_tab_key(key.code),
            Mode::Resize => self.handle_resize_key(key.code),
            Mode::Session => self.handle_session_key(key.code),
            Mode::Insert => self.handle_insert_key(key.code),
            Mode::Rename(target) => self.handle_rename_key(target, key.code),
        }
        self.sync();
    }

    fn handle_normal_key(&mut self, code: KeyCode) {
        let KeyCode::Char(c) = code else {
            return;
        };
        match c {
            'q' => self.should_quit = true,
            'p' => self.set_mode(Mode::Pane),
            't' => self.set_mode(Mode::Tab),
            'n' => self.set_mode(Mode::Resize),
            'o' => self.set_mode(Mode::Session),
            'i' => self.set_mode(Mode::Insert),
            'b' => self.toggle_sidebar(),
            's' if self.status_visible => self.toggle_status(),
            'r' if self.status_visible => self.start_rename(RenameTarget::Tab),
            c => {
                if let Some(index) = digit_index(c) {
                    self.switch_tab(index);
                }
            }
        }
    }

    fn handle_pane_key(&mut self, code: KeyCode) {
        let KeyCode::Char(c) = code else {
            return;
        };
        match c {
            'd' => {
                self.container.split_horizontal(None);
                self.set_mode(Mode::Normal);
            }
            'v' | 'l' | 'n' => {
                self.container.split_vertical(None);
                self.set_mode(Mode::Normal);
            }
            'x' => {
                self.container.close(None);
                self.set_mode(Mode::Normal);
            }
            'h' => self.container.focus_direction(FocusDirection::Left),
            'j' => self.container.focus_direction(FocusDirection::Down),
            'k' => self.container.focus_direction(FocusDirection::Up),
            'r' => self.start_rename(RenameTarget::Pane),
            _ => {}
        }
    }

    fn handle_tab_key(&mut self, code: KeyCode) {
        let KeyCode::Char(c) = code else {
            return;
        };
        let active = self.container.active_tab();
        match c {
            'n' => {
                self.new_tab();
                self.set_mode(Mode::Normal);
            }
            'r' => self.start_rename(RenameTarget::Tab),
            'x' => {
                self.close_active_tab();
                self.set_mode(Mode::Normal);
            }
            'h' if active > 0 => self.switch_tab(active - 1),
            'l' => self.switch_tab(active + 1),
            c => {
                if let Some(index) = digit_index(c) {
                    self.switch_tab(index);
                    self.set_mode(Mode::Normal);
                }
            }
        }
    }

    fn handle_resize_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('+' | '=' | 'l' | 'j') => {
                self.container.resize_focused(true);
            }
            KeyCode::Char('-' | 'h' | 'k') => {
                self.container.resize_focused(false);
            }
            _ => {}
        }
    }

    fn handle_session_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('s') => {
                self.toggle_status();
                self.set_mode(Mode::Normal);
            }
            KeyCode::Char('w') => {
                self.save_config();
                self.set_mode(Mode::Normal);
            }
            _ => {}
        }
    }

    fn handle_insert_key(&mut self, code: KeyCode) {
        let focused = self.container.focused_pane_id();
        let mut command = self
            .container
            .get_pane(focused)
            .map(|pane| pane.content.command.clone())
            .unwrap_or_default();

        match code {
            KeyCode::Char(c) => {
                command.push(c);
                self.container.set_pane_command(focused, &command);
            }
            KeyCode::Backspace => {
                command.pop();
                self.container.set_pane_command(focused, &command);
            }
            KeyCode::Enter => {
                if !command.trim().is_empty() {
                    tracing::info!("Running {:?} in {}", command, focused);
                    self.container.dispatch_command(focused, &command);
                }
                self.set_mode(Mode::Normal);
            }
            _ => {}
        }
    }

    fn start_rename(&mut self, target: RenameTarget) {
        self.prompt = match target {
            RenameTarget::Tab => self
                .tabs
                .get(self.container.active_tab())
                .map(|tab| tab.name.clone())
                .unwrap_or_default(),
            RenameTarget::Pane => self.focused_pane_name(),
        };
        self.set_mode(Mode::Rename(target));
    }

    fn handle_rename_key(&mut self, target: RenameTarget, code: KeyCode) {
        match code {
            KeyCode::Char(c) => self.prompt.push(c),
            KeyCode::Backspace => {
                self.prompt.pop();
            }
            KeyCode::Enter => {
                let name = std::mem::take(&mut self.prompt);
                match target {
                    RenameTarget::Tab => {
                        self.rename_active_tab(&name);
                    }
                    RenameTarget::Pane => {
                        self.container.rename_focused_pane(&name);
                    }
                }
                self.set_mode(Mode::Normal);
            }
            _ => {}
        }
    }

    pub fn rename_active_tab(&mut self, name: &str) -> bool {
        self.tabs.rename_tab(self.container.active_tab(), name)
    }

    pub fn switch_tab(&mut self, index: usize) {
        if index >= self.tabs.len() {
            tracing::debug!("No tab {} to switch to", index);
            return;
        }
        self.container.switch_tab(index);
        self.sync();
    }

    pub fn new_tab(&mut self) -> usize {
        let index = self.tabs.add_tab();
        tracing::info!("Added tab {}", index);
        index
    }

    /// Close the active tab and show its neighbor. The last tab stays.
    pub fn close_active_tab(&mut self) -> bool {
        if self.tabs.len() <= 1 {
            tracing::debug!("Refusing to close the last tab");
            return false;
        }
        let closing = self.container.active_tab();
        let neighbor = if closing + 1 < self.tabs.len() {
            closing + 1
        } else {
            closing - 1
        };

        self.container.switch_tab(neighbor);
        self.container.remove_tab(closing);
        self.tabs.remove_tab(closing);
        self.sync();
        true
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_visible = !self.sidebar_visible;
    }

    pub fn toggle_status(&mut self) {
        self.status_visible = !self.status_visible;
    }

    fn save_config(&mut self) {
        match self.config.save_to_default() {
            Ok(path) => {
                tracing::info!("Saved config to {}", path.display());
                self.activity.update("Config saved", &path.display().to_string());
            }
            Err(e) => {
                tracing::error!("Failed to save config: {}", e);
                self.activity.update("Config not saved", &e.to_string());
            }
        }
    }

    /// Left click focuses the pane or tab under the pointer
    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let layout = render::screen_layout(
            self.viewport,
            self.sidebar_visible,
            self.config.sidebar_width,
        );

        if let Some(sidebar) = layout.sidebar {
            if contains(sidebar, mouse.column, mouse.row) {
                if let Some(index) = render::tab_at_row(sidebar, mouse.row) {
                    if index < self.tabs.len() {
                        self.switch_tab(index);
                    }
                }
                return;
            }
        }

        if !self.status_visible && contains(layout.panes, mouse.column, mouse.row) {
            let (x, y) = render::normalize(layout.panes, mouse.column, mouse.row);
            if let Some(id) = self.container.hit_test(x, y) {
                self.container.focus_pane(id);
                self.sync();
            }
        }
    }

    pub fn tick(&mut self) {
        self.clock.tick();
    }
}

fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x && column < area.x + area.width && row >= area.y && row < area.y + area.height
}

fn digit_index(c: char) -> Option<usize> {
    match c.to_digit(10) {
        Some(d @ 1..=9) => Some(d as usize - 1),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use nav_layout::PaneId;

    fn app() -> App {
        App::new(Config::default())
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn click(app: &mut App, column: u16, row: u16) {
        app.handle_mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        });
    }

    #[test]
    fn test_initial_state() {
        let app = app();
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.tabs.len(), 3);
        assert!(app.sidebar_visible);
        assert_eq!(app.activity.text(), "Tab 1 — Pane 1");
    }

    #[test]
    fn test_normal_mode_switches() {
        let mut app = app();
        for (key, mode) in [
            ('p', Mode::Pane),
            ('t', Mode::Tab),
            ('n', Mode::Resize),
            ('o', Mode::Session),
            ('i', Mode::Insert),
        ] {
            press(&mut app, KeyCode::Char(key));
            assert_eq!(app.mode, mode);
            press(&mut app, KeyCode::Esc);
            assert_eq!(app.mode, Mode::Normal);
        }
    }

    #[test]
    fn test_quit_and_sidebar_toggle() {
        let mut app = app();
        press(&mut app, KeyCode::Char('b'));
        assert!(!app.sidebar_visible);
        press(&mut app, KeyCode::Char('b'));
        assert!(app.sidebar_visible);

        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_ctrl_c_quits_from_any_mode() {
        let mut app = app();
        press(&mut app, KeyCode::Char('i'));
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn test_key_release_is_ignored() {
        let mut app = app();
        let mut key = KeyEvent::new(KeyCode::Char('p'), KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        app.handle_key(key);
        assert_eq!(app.mode, Mode::Normal);
    }

    #[test]
    fn test_pane_mode_splits_and_returns_to_normal() {
        let mut app = app();
        type_str(&mut app, "pv");
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.container.pane_count(), 2);
        assert_eq!(app.tabs.get(0).unwrap().label(), "▸ Tab 1 (2)");
        assert_eq!(app.activity.text(), "Tab 1 — Pane 2");

        type_str(&mut app, "pd");
        assert_eq!(app.container.pane_count(), 3);
        assert_eq!(app.container.tree().depth(), 2);

        type_str(&mut app, "px");
        assert_eq!(app.container.pane_count(), 2);
        assert_eq!(app.tabs.get(0).unwrap().pane_count, 2);
        assert_eq!(app.activity.text(), "Tab 1 — Pane 1");
    }

    #[test]
    fn test_pane_focus_keys_stay_in_pane_mode() {
        let mut app = app();
        type_str(&mut app, "pvpv");
        type_str(&mut app, "ph");
        assert_eq!(app.mode, Mode::Pane);
        assert_eq!(app.container.focused_pane_id(), PaneId(2));

        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.container.focused_pane_id(), PaneId(3));
        press(&mut app, KeyCode::Char('k'));
        assert_eq!(app.container.focused_pane_id(), PaneId(2));
    }

    #[test]
    fn test_rename_pane_prompt() {
        let mut app = app();
        type_str(&mut app, "pr");
        assert_eq!(app.mode, Mode::Rename(RenameTarget::Pane));
        assert_eq!(app.prompt, "Pane 1");

        for _ in 0.."Pane 1".len() {
            press(&mut app, KeyCode::Backspace);
        }
        type_str(&mut app, "Logs");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(
            app.container.get_pane(PaneId(1)).unwrap().content.name,
            "Logs"
        );
        assert_eq!(app.activity.text(), "Tab 1 — Logs");
    }

    #[test]
    fn test_rename_cancelled_by_escape() {
        let mut app = app();
        type_str(&mut app, "trX");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode, Mode::Normal);
        assert!(app.prompt.is_empty());
        assert_eq!(app.tabs.get(0).unwrap().name, "Tab 1");
    }

    #[test]
    fn test_tab_mode_rename_and_new() {
        let mut app = app();
        type_str(&mut app, "tr");
        press(&mut app, KeyCode::Backspace);
        type_str(&mut app, "A");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.tabs.get(0).unwrap().name, "Tab A");

        type_str(&mut app, "tn");
        assert_eq!(app.tabs.len(), 4);
        assert_eq!(app.container.active_tab(), 0);
    }

    #[test]
    fn test_tab_jump_and_prev_next() {
        let mut app = app();
        type_str(&mut app, "t3");
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.container.active_tab(), 2);
        assert!(app.tabs.get(2).unwrap().active);
        assert_eq!(app.activity.text(), "Tab 3 — Pane 2");

        type_str(&mut app, "tl");
        assert_eq!(app.container.active_tab(), 2);
        press(&mut app, KeyCode::Char('h'));
        assert_eq!(app.container.active_tab(), 1);
        press(&mut app, KeyCode::Char('h'));
        press(&mut app, KeyCode::Char('h'));
        assert_eq!(app.container.active_tab(), 0);

        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('9'));
        assert_eq!(app.container.active_tab(), 0);
    }

    #[test]
    fn test_tab_pane_counts_follow_switches() {
        let mut app = app();
        type_str(&mut app, "pvpv");
        press(&mut app, KeyCode::Char('2'));

        assert_eq!(app.tabs.get(0).unwrap().label(), "  Tab 1 (3)");
        assert_eq!(app.tabs.get(1).unwrap().label(), "▸ Tab 2 (1)");

        press(&mut app, KeyCode::Char('1'));
        assert_eq!(app.container.pane_count(), 3);
    }

    #[test]
    fn test_close_tab() {
        let mut app = app();
        type_str(&mut app, "pv");
        press(&mut app, KeyCode::Char('2'));
        type_str(&mut app, "pvpv");

        type_str(&mut app, "tx");

        assert_eq!(app.tabs.len(), 2);
        assert_eq!(app.tabs.get(1).unwrap().name, "Tab 3");
        assert_eq!(app.container.active_tab(), 1);
        assert!(app.tabs.get(1).unwrap().active);

        press(&mut app, KeyCode::Char('1'));
        assert_eq!(app.container.pane_count(), 2);

        type_str(&mut app, "tx");
        assert_eq!(app.tabs.len(), 1);
        assert_eq!(app.container.active_tab(), 0);
        assert!(!app.close_active_tab());
    }

    #[test]
    fn test_resize_keys() {
        let mut app = app();
        type_str(&mut app, "pv");
        type_str(&mut app, "n+=");
        assert!((app.container.get_focused_weight() - 1.4).abs() < 1e-9);
        type_str(&mut app, "hk-");
        assert!((app.container.get_focused_weight() - 0.8).abs() < 1e-9);
        assert_eq!(app.mode, Mode::Resize);
    }

    #[test]
    fn test_status_toggle() {
        let mut app = app();
        type_str(&mut app, "os");
        assert!(app.status_visible);
        assert_eq!(app.mode, Mode::Normal);

        press(&mut app, KeyCode::Char('s'));
        assert!(!app.status_visible);
    }

    #[test]
    fn test_insert_mode_edits_command() {
        let mut app = app();
        type_str(&mut app, "iecho");
        press(&mut app, KeyCode::Backspace);
        let pane = app.container.get_pane(PaneId(1)).unwrap();
        assert_eq!(pane.content.command, "ech");

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode, Mode::Normal);
    }

    #[tokio::test]
    async fn test_insert_enter_runs_command() {
        let mut app = app();
        type_str(&mut app, "iecho typed");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, Mode::Normal);
        assert!(app.container.is_command_running(PaneId(1)));

        tokio::time::timeout(Duration::from_secs(5), app.container.wait_for_commands())
            .await
            .unwrap();

        let pane = app.container.get_pane(PaneId(1)).unwrap();
        assert_eq!(pane.content.command, "echo typed");
        assert_eq!(pane.content.output, "typed");
    }

    #[test]
    fn test_insert_enter_with_blank_command_does_nothing() {
        let mut app = app();
        type_str(&mut app, "i  ");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, Mode::Normal);
        assert!(app.container.get_pane(PaneId(1)).unwrap().content.output.is_empty());
    }

    #[test]
    fn test_click_focuses_pane() {
        let mut app = app();
        app.set_viewport(Rect::new(0, 0, 130, 41));
        type_str(&mut app, "pv");
        assert_eq!(app.container.focused_pane_id(), PaneId(2));

        // Sidebar is 30 columns wide; pane 1 occupies the left half of the rest
        click(&mut app, 40, 10);
        assert_eq!(app.container.focused_pane_id(), PaneId(1));
        assert_eq!(app.activity.text(), "Tab 1 — Pane 1");

        click(&mut app, 120, 10);
        assert_eq!(app.container.focused_pane_id(), PaneId(2));
    }

    #[test]
    fn test_click_tab_in_sidebar() {
        let mut app = app();
        app.set_viewport(Rect::new(0, 0, 130, 41));
        let row = render::TAB_LIST_ROW + 2;

        click(&mut app, 5, row);

        assert_eq!(app.container.active_tab(), 2);
    }

    #[test]
    fn test_click_activity_bar_keeps_tab() {
        let mut app = app();
        // Sidebar is 7 rows tall: rows 5 and 6 are the activity bar and clock
        app.set_viewport(Rect::new(0, 0, 130, 8));

        click(&mut app, 5, 5);
        click(&mut app, 5, 6);

        assert_eq!(app.container.active_tab(), 0);
        assert!(app.tabs.get(0).unwrap().active);
    }

    #[test]
    fn test_digit_index() {
        assert_eq!(digit_index('1'), Some(0));
        assert_eq!(digit_index('9'), Some(8));
        assert_eq!(digit_index('0'), None);
        assert_eq!(digit_index('a'), None);
    }
}
