// ABOUTME: Sidebar state: tab list, activity bar, and clock.
// ABOUTME: Plain data with label formatting; drawing lives in render.rs.

use std::fmt::Write;

use chrono::Local;

pub const HEADER: &str = "▌ NAVBAR ▐";

const DEFAULT_CLOCK_FORMAT: &str = "%H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabItem {
    pub name: String,
    pub active: bool,
    pub pane_count: usize,
}

impl TabItem {
    /// Sidebar label, e.g. `▸ Tab 1 (2)`
    pub fn label(&self) -> String {
        let marker = if self.active { "▸" } else { " " };
        format!("{} {} ({})", marker, self.name, self.pane_count)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TabList {
    tabs: Vec<TabItem>,
}

impl TabList {
    /// `count` tabs named `Tab 1..=count`, the first one active
    pub fn with_tabs(count: usize) -> Self {
        let mut list = Self::default();
        for _ in 0..count.max(1) {
            list.add_tab();
        }
        list.set_active(0);
        list
    }

    /// Append an inactive tab with a single pane and return its index
    pub fn add_tab(&mut self) -> usize {
        let index = self.tabs.len();
        self.tabs.push(TabItem {
            name: format!("Tab {}", index + 1),
            active: false,
            pane_count: 1,
        });
        index
    }

    /// Empty names are allowed
    pub fn rename_tab(&mut self, index: usize, name: &str) -> bool {
        match self.tabs.get_mut(index) {
            Some(tab) => {
                tab.name = name.to_string();
                true
            }
            None => false,
        }
    }

    pub fn set_active(&mut self, index: usize) {
        for (i, tab) in self.tabs.iter_mut().enumerate() {
            tab.active = i == index;
        }
    }

    pub fn set_pane_count(&mut self, index: usize, count: usize) {
        if let Some(tab) = self.tabs.get_mut(index) {
            tab.pane_count = count;
        }
    }

    /// Remove a tab. The last remaining tab is kept.
    pub fn remove_tab(&mut self, index: usize) -> bool {
        if self.tabs.len() <= 1 || index >= self.tabs.len() {
            return false;
        }
        self.tabs.remove(index);
        true
    }

    pub fn get(&self, index: usize) -> Option<&TabItem> {
        self.tabs.get(index)
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TabItem> {
        self.tabs.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityBar {
    text: String,
}

impl Default for ActivityBar {
    fn default() -> Self {
        Self {
            text: "Ready".to_string(),
        }
    }
}

impl ActivityBar {
    pub fn update(&mut self, tab_name: &str, detail: &str) {
        self.text = if detail.is_empty() {
            tab_name.to_string()
        } else {
            format!("{} — {}", tab_name, detail)
        };
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn render(&self) -> String {
        format!("▶ ACTIVE: {}", self.text)
    }
}

#[derive(Debug, Clone)]
pub struct Clock {
    format: String,
    time: String,
}

impl Clock {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            time: "--:--:--".to_string(),
        }
    }

    /// Refresh the displayed time. An unusable format falls back to `HH:MM:SS`.
    pub fn tick(&mut self) {
        let now = Local::now();
        let mut time = String::new();
        if write!(time, "{}", now.format(&self.format)).is_err() {
            tracing::warn!("Invalid clock format {:?}", self.format);
            self.format = DEFAULT_CLOCK_FORMAT.to_string();
            time = now.format(DEFAULT_CLOCK_FORMAT).to_string();
        }
        self.time = time;
    }

    pub fn render(&self) -> String {
        format!("🕐 {}", self.time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_tabs() {
        let tabs = TabList::with_tabs(3);
        assert_eq!(tabs.len(), 3);
        assert_eq!(tabs.get(0).unwrap().label(), "▸ Tab 1 (1)");
        assert_eq!(tabs.get(2).unwrap().label(), "  Tab 3 (1)");
    }

    #[test]
    fn test_zero_tabs_still_creates_one() {
        let tabs = TabList::with_tabs(0);
        assert_eq!(tabs.len(), 1);
        assert!(tabs.get(0).unwrap().active);
    }

    #[test]
    fn test_add_tab_numbers_sequentially() {
        let mut tabs = TabList::with_tabs(2);
        assert_eq!(tabs.add_tab(), 2);
        assert_eq!(tabs.get(2).unwrap().name, "Tab 3");
        assert!(!tabs.get(2).unwrap().active);
    }

    #[test]
    fn test_rename_tab() {
        let mut tabs = TabList::with_tabs(2);
        assert!(tabs.rename_tab(1, "Build"));
        assert_eq!(tabs.get(1).unwrap().label(), "  Build (1)");
        assert!(tabs.rename_tab(0, ""));
        assert_eq!(tabs.get(0).unwrap().name, "");
        assert!(!tabs.rename_tab(5, "Nope"));
    }

    #[test]
    fn test_set_active_is_exclusive() {
        let mut tabs = TabList::with_tabs(3);
        tabs.set_active(2);
        let active: Vec<bool> = tabs.iter().map(|t| t.active).collect();
        assert_eq!(active, vec![false, false, true]);
    }

    #[test]
    fn test_remove_keeps_last_tab() {
        let mut tabs = TabList::with_tabs(2);
        assert!(tabs.remove_tab(0));
        assert_eq!(tabs.get(0).unwrap().name, "Tab 2");
        assert!(!tabs.remove_tab(0));
        assert_eq!(tabs.len(), 1);
    }

    #[test]
    fn test_activity_text() {
        let mut bar = ActivityBar::default();
        assert_eq!(bar.render(), "▶ ACTIVE: Ready");
        bar.update("Tab 2", "Pane 4");
        assert_eq!(bar.text(), "Tab 2 — Pane 4");
        bar.update("Tab 2", "");
        assert_eq!(bar.text(), "Tab 2");
    }

    #[test]
    fn test_clock_formats_time() {
        let mut clock = Clock::new("%H:%M:%S");
        assert_eq!(clock.render(), "🕐 --:--:--");
        clock.tick();
        let time = clock.render().trim_start_matches("🕐 ").to_string();
        assert_eq!(time.len(), 8);
        assert_eq!(time.matches(':').count(), 2);
    }

    #[test]
    fn test_invalid_clock_format_falls_back() {
        let mut clock = Clock::new("%Q");
        clock.tick();
        assert_eq!(clock.render().trim_start_matches("🕐 ").len(), 8);
    }
}
