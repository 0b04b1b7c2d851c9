// ABOUTME: Input modes of the modal key dispatcher.
// ABOUTME: Each mode has a status bar label, a theme color, and a key hint line.

use nav_core::{Color, Theme};

/// What a rename prompt will rename when confirmed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameTarget {
    Tab,
    Pane,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    Pane,
    Tab,
    Resize,
    Session,
    Insert,
    Rename(RenameTarget),
}

impl Mode {
    pub fn label(self) -> &'static str {
        match self {
            Mode::Normal => " NORMAL ",
            Mode::Pane => " PANE ",
            Mode::Tab => " TAB ",
            Mode::Resize => " RESIZE ",
            Mode::Session => " SESSION ",
            Mode::Insert => " INSERT ",
            Mode::Rename(_) => " RENAME ",
        }
    }

    pub fn key_hints(self) -> &'static str {
        match self {
            Mode::Normal => {
                "p=Pane  t=Tab  n=Resize  o=Session  i=Insert  q=Quit  b=Sidebar  1-9=Jump"
            }
            Mode::Pane => "d=Split↓  v=Split→  x=Close  h/j/k=Focus  r=Rename  Esc=Normal",
            Mode::Tab => "n=New  r=Rename  x=Close  1-9=Jump  h/l=Prev/Next  Esc=Normal",
            Mode::Resize => "+/-=Grow/Shrink  h/j/k/l=Direction  Esc=Normal",
            Mode::Session => "s=Status  w=Save config  Esc=Normal",
            Mode::Insert => "type a command  Enter=Run  Backspace=Delete  Esc=Normal",
            Mode::Rename(_) => "type a name  Enter=Confirm  Esc=Cancel",
        }
    }

    pub fn color(self, theme: &Theme) -> Color {
        match self {
            Mode::Normal => theme.normal,
            Mode::Pane => theme.pane,
            Mode::Tab => theme.tab,
            Mode::Resize => theme.resize,
            Mode::Session => theme.session,
            Mode::Insert => theme.insert,
            Mode::Rename(RenameTarget::Tab) => theme.tab,
            Mode::Rename(RenameTarget::Pane) => theme.pane,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mode_is_normal() {
        assert_eq!(Mode::default(), Mode::Normal);
    }

    #[test]
    fn test_mode_colors_follow_theme() {
        let theme = Theme::default();
        assert_eq!(Mode::Normal.color(&theme).to_hex(), "#89b482");
        assert_eq!(Mode::Pane.color(&theme).to_hex(), "#d8a657");
        assert_eq!(Mode::Tab.color(&theme).to_hex(), "#7daea3");
        assert_eq!(Mode::Resize.color(&theme).to_hex(), "#d3869b");
        assert_eq!(Mode::Session.color(&theme).to_hex(), "#a9b665");
        assert_eq!(
            Mode::Rename(RenameTarget::Tab).color(&theme),
            Mode::Tab.color(&theme)
        );
    }

    #[test]
    fn test_labels_are_padded() {
        for mode in [Mode::Normal, Mode::Pane, Mode::Insert] {
            let label = mode.label();
            assert!(label.starts_with(' ') && label.ends_with(' '));
        }
    }
}
