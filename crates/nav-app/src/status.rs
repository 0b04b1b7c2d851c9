// ABOUTME: Status overview text: every tab with its pane count, and the
// ABOUTME: active tab's panes with focus markers and their commands.

use nav_layout::PaneContainer;

use crate::widgets::TabList;

const RULE_WIDTH: usize = 40;

fn plural(count: usize) -> &'static str {
    if count == 1 {
        "pane"
    } else {
        "panes"
    }
}

/// Build the overview shown in place of the pane area
pub fn overview_lines(tabs: &TabList, container: &PaneContainer) -> Vec<String> {
    let rule = "─".repeat(RULE_WIDTH);
    let active_tab = container.active_tab();
    let mut lines = vec!["📋 Status Overview".to_string(), rule.clone(), String::new()];

    for (index, tab) in tabs.iter().enumerate() {
        let is_active = index == active_tab;
        let pane_count = container.get_tab_pane_count(index);
        lines.push(format!(
            "{} {}{} — {} {}",
            if is_active { "▸" } else { " " },
            tab.name,
            if is_active { " (active)" } else { "" },
            pane_count,
            plural(pane_count)
        ));

        if is_active {
            let panes = container.panes();
            let last = panes.len().saturating_sub(1);
            for (i, pane) in panes.iter().enumerate() {
                let connector = if i == last { "└─" } else { "├─" };
                let focus = if pane.focused { "[focused]" } else { "         " };
                let command = if pane.content.command.is_empty() {
                    "(empty)".to_string()
                } else {
                    format!("$ {}", pane.content.command)
                };
                lines.push(format!(
                    "  {} {} {} {}",
                    connector, pane.content.name, focus, command
                ));
            }
        } else {
            lines.push(format!("  └─ ({} {})", pane_count, plural(pane_count)));
        }
        lines.push(String::new());
    }

    lines.push(rule);
    lines.push(format!("Total: {} tabs", tabs.len()));
    lines.push(String::new());
    lines.push("Keys: s=close status, r=rename, 1-9=jump to tab".to_string());
    lines
}
