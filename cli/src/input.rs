use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{Action, App, AppView};

pub mod keys {
    pub const HELP: &str = "?";
    pub const QUIT: &str = "q";
    pub const TERMINATE: &str = "K";
    pub const UP_DOWN: &str = "↑/↓";
}

pub fn handle_key(app: &App, key: KeyEvent) -> Action {
    match app.view {
        AppView::Main => handle_main_keys(key),
        AppView::Help => handle_help_keys(key),
        AppView::ConfirmTerminate => handle_confirm_keys(key),
    }
}

fn handle_main_keys(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
        KeyCode::Char('?') | KeyCode::Char('/') => Action::ToggleHelp,
        KeyCode::Up | KeyCode::Char('k') => Action::SelectPrevious,
        KeyCode::Down | KeyCode::Char('j') => Action::SelectNext,
        KeyCode::Char('K') => Action::RequestTerminate,
        _ => Action::None,
    }
}

fn handle_help_keys(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('/') | KeyCode::Char('q') => {
            Action::ToggleHelp
        }
        _ => Action::None,
    }
}

fn handle_confirm_keys(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => Action::ConfirmTerminate,
        _ => Action::Dismiss,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_main_view_bindings() {
        assert_eq!(handle_main_keys(key(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(
            handle_main_keys(key(KeyCode::Char('K'))),
            Action::RequestTerminate
        );
        assert_eq!(handle_main_keys(key(KeyCode::Down)), Action::SelectNext);
        assert_eq!(handle_main_keys(key(KeyCode::Char('x'))), Action::None);
    }

    #[test]
    fn test_confirm_view_only_accepts_yes() {
        assert_eq!(
            handle_confirm_keys(key(KeyCode::Char('y'))),
            Action::ConfirmTerminate
        );
        assert_eq!(
            handle_confirm_keys(key(KeyCode::Enter)),
            Action::ConfirmTerminate
        );
        assert_eq!(handle_confirm_keys(key(KeyCode::Char('n'))), Action::Dismiss);
        assert_eq!(handle_confirm_keys(key(KeyCode::Esc)), Action::Dismiss);
    }
}
