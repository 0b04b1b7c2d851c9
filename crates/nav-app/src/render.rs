// ABOUTME: Draws the sidebar, the pane area (or status overview), and the mode bar.
// ABOUTME: Maps normalized pane rectangles onto terminal cells.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use nav_layout::PaneView;

use crate::app::App;
use crate::mode::Mode;
use crate::status;
use crate::widgets::HEADER;

/// Row of the first tab label, relative to the top of the sidebar
pub const TAB_LIST_ROW: u16 = 3;

/// Screen regions for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub sidebar: Option<Rect>,
    pub panes: Rect,
    pub mode_bar: Rect,
}

pub fn screen_layout(area: Rect, sidebar_visible: bool, sidebar_width: u16) -> ScreenLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    if !sidebar_visible {
        return ScreenLayout {
            sidebar: None,
            panes: rows[0],
            mode_bar: rows[1],
        };
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(sidebar_width), Constraint::Min(0)])
        .split(rows[0]);
    ScreenLayout {
        sidebar: Some(columns[0]),
        panes: columns[1],
        mode_bar: rows[1],
    }
}

fn sidebar_block() -> Block<'static> {
    Block::default().borders(Borders::RIGHT)
}

/// Header and tab list above, activity bar and clock below
fn sidebar_sections(sidebar: Rect) -> (Rect, Rect) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(2)])
        .split(sidebar_block().inner(sidebar));
    (sections[0], sections[1])
}

/// Tab index under a sidebar row. Footer rows never map to a tab.
pub fn tab_at_row(sidebar: Rect, row: u16) -> Option<usize> {
    let (list, _) = sidebar_sections(sidebar);
    if row >= list.bottom() {
        return None;
    }
    row.checked_sub(list.y + TAB_LIST_ROW).map(usize::from)
}

/// Terminal cells covered by a normalized rectangle. Edges are rounded the
/// same way for neighbors, so adjacent panes tile without gaps.
pub fn cell_rect(area: Rect, rect: &nav_layout::Rect) -> Rect {
    let edge = |origin: u16, extent: u16, fraction: f32| {
        origin + (fraction * f32::from(extent)).round().clamp(0.0, f32::from(extent)) as u16
    };
    let x0 = edge(area.x, area.width, rect.x);
    let x1 = edge(area.x, area.width, rect.x + rect.width);
    let y0 = edge(area.y, area.height, rect.y);
    let y1 = edge(area.y, area.height, rect.y + rect.height);
    Rect::new(x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0))
}

/// Center of a cell in normalized pane-area coordinates
pub fn normalize(area: Rect, column: u16, row: u16) -> (f32, f32) {
    let fraction = |offset: u16, extent: u16| {
        (f32::from(offset) + 0.5) / f32::from(extent.max(1))
    };
    (
        fraction(column.saturating_sub(area.x), area.width),
        fraction(row.saturating_sub(area.y), area.height),
    )
}

fn rgb(color: nav_core::Color) -> Color {
    Color::Rgb(color.r, color.g, color.b)
}

pub fn draw(frame: &mut Frame, app: &App) {
    let layout = screen_layout(frame.size(), app.sidebar_visible, app.config.sidebar_width);

    if let Some(sidebar) = layout.sidebar {
        draw_sidebar(frame, app, sidebar);
    }
    if app.status_visible {
        draw_status(frame, app, layout.panes);
    } else {
        for pane in app.container.panes() {
            draw_pane(frame, app, pane, cell_rect(layout.panes, &pane.rect));
        }
    }
    draw_mode_bar(frame, app, layout.mode_bar);
}

fn draw_sidebar(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.config.theme;
    let muted = Style::default().fg(rgb(theme.muted));
    frame.render_widget(sidebar_block().border_style(muted), area);
    let (list, footer_area) = sidebar_sections(area);

    let mut lines = vec![
        Line::from(Span::styled(
            HEADER,
            Style::default()
                .fg(rgb(theme.normal))
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("Session: ", muted),
            Span::raw(format!("⚡ {}", app.config.session_name)),
        ]),
        Line::from(""),
    ];
    for tab in app.tabs.iter() {
        let style = if tab.active {
            Style::default()
                .fg(rgb(theme.tab))
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(tab.label(), style)));
    }
    frame.render_widget(Paragraph::new(Text::from(lines)), list);

    let footer = vec![
        Line::from(Span::styled(app.activity.render(), muted)),
        Line::from(app.clock.render()),
    ];
    frame.render_widget(
        Paragraph::new(Text::from(footer)).wrap(Wrap { trim: true }),
        footer_area,
    );
}

fn draw_pane(frame: &mut Frame, app: &App, pane: &PaneView, area: Rect) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let theme = &app.config.theme;
    let border = if pane.focused { theme.focus } else { theme.muted };
    let mut title_style = Style::default().fg(rgb(border));
    if pane.focused {
        title_style = title_style.add_modifier(Modifier::BOLD);
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(rgb(border)))
        .title(Span::styled(format!(" {} ", pane.content.name), title_style));
    let body: Vec<Line> = pane
        .content
        .body_lines()
        .into_iter()
        .map(Line::from)
        .collect();

    frame.render_widget(
        Paragraph::new(Text::from(body))
            .block(block)
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn draw_status(frame: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = status::overview_lines(&app.tabs, &app.container)
        .into_iter()
        .map(Line::from)
        .collect();
    frame.render_widget(
        Paragraph::new(Text::from(lines)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(rgb(app.config.theme.session))),
        ),
        area,
    );
}

fn draw_mode_bar(frame: &mut Frame, app: &App, area: Rect) {
    let color = rgb(app.mode.color(&app.config.theme));
    let mut spans = vec![
        Span::styled(
            app.mode.label(),
            Style::default()
                .fg(Color::Black)
                .bg(color)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
    ];
    if let Mode::Rename(_) = app.mode {
        spans.push(Span::styled(
            format!("Name: {}▏", app.prompt),
            Style::default().fg(color),
        ));
        spans.push(Span::raw("  "));
    }
    spans.push(Span::styled(
        app.mode.key_hints(),
        Style::default().fg(rgb(app.config.theme.muted)),
    ));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use nav_core::Config;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn screen(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer.get(x, y).symbol());
            }
            text.push('\n');
        }
        text
    }

    fn press(app: &mut App, c: char) {
        app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
    }

    #[test]
    fn test_screen_layout_with_sidebar() {
        let layout = screen_layout(Rect::new(0, 0, 100, 20), true, 30);
        assert_eq!(layout.sidebar, Some(Rect::new(0, 0, 30, 19)));
        assert_eq!(layout.panes, Rect::new(30, 0, 70, 19));
        assert_eq!(layout.mode_bar, Rect::new(0, 19, 100, 1));
    }

    #[test]
    fn test_screen_layout_without_sidebar() {
        let layout = screen_layout(Rect::new(0, 0, 100, 20), false, 30);
        assert_eq!(layout.sidebar, None);
        assert_eq!(layout.panes, Rect::new(0, 0, 100, 19));
    }

    #[test]
    fn test_cell_rects_tile() {
        let area = Rect::new(10, 0, 61, 20);
        let left = nav_layout::Rect {
            x: 0.0,
            y: 0.0,
            width: 0.4,
            height: 1.0,
        };
        let right = nav_layout::Rect {
            x: 0.4,
            y: 0.0,
            width: 0.6,
            height: 1.0,
        };

        let (a, b) = (cell_rect(area, &left), cell_rect(area, &right));

        assert_eq!(a.x, 10);
        assert_eq!(a.x + a.width, b.x);
        assert_eq!(b.x + b.width, 71);
        assert_eq!(a.height, 20);
    }

    #[test]
    fn test_tab_at_row() {
        let sidebar = Rect::new(0, 2, 30, 10);
        assert_eq!(tab_at_row(sidebar, 4), None);
        assert_eq!(tab_at_row(sidebar, 5), Some(0));
        assert_eq!(tab_at_row(sidebar, 7), Some(2));
    }

    #[test]
    fn test_footer_rows_are_not_tabs() {
        // Inner height 7: rows 2..=6 hold the list, 7 and 8 the footer
        let sidebar = Rect::new(0, 2, 30, 7);
        assert_eq!(tab_at_row(sidebar, 6), Some(1));
        assert_eq!(tab_at_row(sidebar, 7), None);
        assert_eq!(tab_at_row(sidebar, 8), None);
    }

    #[test]
    fn test_normalize_uses_cell_centers() {
        let area = Rect::new(10, 5, 10, 10);
        assert_eq!(normalize(area, 10, 5), (0.05, 0.05));
        assert_eq!(normalize(area, 19, 14), (0.95, 0.95));
    }

    #[test]
    fn test_draw_initial_screen() {
        let app = App::new(Config::default());
        let text = screen(&app, 100, 20);

        assert!(text.contains("NAVBAR"));
        assert!(text.contains("Session: "));
        assert!(text.contains("main"));
        assert!(text.contains("▸ Tab 1 (1)"));
        assert!(text.contains("Pane 1"));
        assert!(text.contains("(empty)"));
        assert!(text.contains(" NORMAL "));
        assert!(text.contains("p=Pane"));
    }

    #[test]
    fn test_draw_split_panes() {
        let mut app = App::new(Config::default());
        press(&mut app, 'p');
        press(&mut app, 'v');
        let text = screen(&app, 100, 20);

        assert!(text.contains("┌ Pane 1 "));
        assert!(text.contains("┌ Pane 2 "));
        assert!(text.contains("▸ Tab 1 (2)"));
    }

    #[test]
    fn test_draw_status_overview_hides_panes() {
        let mut app = App::new(Config::default());
        press(&mut app, 'o');
        press(&mut app, 's');
        let text = screen(&app, 100, 30);

        assert!(text.contains("Status Overview"));
        assert!(text.contains("Total: 3 tabs"));
        assert!(text.contains("└─ Pane 1 [focused] (empty)"));
        assert!(!text.contains("┌ Pane 1 "));
    }

    #[test]
    fn test_draw_without_sidebar() {
        let mut app = App::new(Config::default());
        press(&mut app, 'b');
        let text = screen(&app, 100, 20);

        assert!(!text.contains("NAVBAR"));
        assert!(text.contains("Pane 1"));
    }

    #[test]
    fn test_rename_prompt_in_mode_bar() {
        let mut app = App::new(Config::default());
        press(&mut app, 't');
        press(&mut app, 'r');
        let text = screen(&app, 120, 20);

        assert!(text.contains(" RENAME "));
        assert!(text.contains("Name: Tab 1"));
    }
}
