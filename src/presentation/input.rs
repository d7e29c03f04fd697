use crate::application::{App, AppMode};
use crate::domain::parser::Constant;
use crate::infrastructure::HistoryRepository;
use crossterm::event::{KeyCode, KeyModifiers};

pub struct InputHandler;

impl InputHandler {
    pub fn handle_key_event(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        match app.mode {
            AppMode::Normal => Self::handle_normal_mode(app, key, modifiers),
            AppMode::Help => Self::handle_help_mode(app, key),
            AppMode::ExportHistory => Self::handle_filename_input_mode(app, key),
        }
    }

    fn handle_normal_mode(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL) {
            match key {
                KeyCode::Char('s') => app.start_history_export(),
                KeyCode::Char('l') => app.clear_history(),
                _ => {}
            }
            return;
        }

        match key {
            KeyCode::Enter => app.calculate(),
            KeyCode::Esc => app.clear_all(),
            KeyCode::Backspace => app.clear_entry(),
            KeyCode::F(1) => app.show_help(),
            KeyCode::Up => app.select_previous_history(),
            KeyCode::Down => app.select_next_history(),
            KeyCode::Tab => app.use_selected_history(),
            KeyCode::Char(c) => Self::handle_character(app, c),
            _ => {}
        }
    }

    fn handle_character(app: &mut App, c: char) {
        match c {
            '0'..='9' | '.' => app.append_number(c),
            '+' | '-' | '*' | '/' | '(' | ')' => app.append_operator(c),
            '=' => app.calculate(),
            '^' => app.append_function("pow"),
            '?' => app.show_help(),
            _ => match c.to_ascii_lowercase() {
                'q' => app.append_function("sqrt"),
                'l' => app.append_function("log"),
                'n' => app.append_function("ln"),
                's' => app.append_function("sin"),
                'c' => app.append_function("cos"),
                't' => app.append_function("tan"),
                'p' => app.append_constant(Constant::Pi),
                'e' => app.append_constant(Constant::E),
                _ => {}
            },
        }
    }

    fn handle_help_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') => {
                app.close_help();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                app.help_scroll = app.help_scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.help_scroll += 1;
            }
            KeyCode::PageUp => {
                app.help_scroll = app.help_scroll.saturating_sub(5);
            }
            KeyCode::PageDown => {
                app.help_scroll += 5;
            }
            KeyCode::Home => {
                app.help_scroll = 0;
            }
            _ => {}
        }
    }

    fn handle_filename_input_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Enter => {
                let filename = app.get_export_filename();
                let result = HistoryRepository::export_history(&app.history, &filename);
                app.set_export_result(result);
            }
            KeyCode::Esc => {
                app.cancel_filename_input();
            }
            KeyCode::Backspace => {
                if let Some(start) = previous_boundary(&app.filename_input, app.cursor_position) {
                    app.filename_input.remove(start);
                    app.cursor_position = start;
                }
            }
            KeyCode::Delete => {
                if app.cursor_position < app.filename_input.len() {
                    app.filename_input.remove(app.cursor_position);
                }
            }
            KeyCode::Left => {
                if let Some(start) = previous_boundary(&app.filename_input, app.cursor_position) {
                    app.cursor_position = start;
                }
            }
            KeyCode::Right => {
                if let Some(ch) = app.filename_input[app.cursor_position..].chars().next() {
                    app.cursor_position += ch.len_utf8();
                }
            }
            KeyCode::Home => {
                app.cursor_position = 0;
            }
            KeyCode::End => {
                app.cursor_position = app.filename_input.len();
            }
            KeyCode::Char(c) => {
                app.filename_input.insert(app.cursor_position, c);
                app.cursor_position += c.len_utf8();
            }
            _ => {}
        }
    }
}

/// Byte index of the character before `cursor`, if any.
fn previous_boundary(text: &str, cursor: usize) -> Option<usize> {
    text[..cursor].char_indices().last().map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(app: &mut App, keys: &str) {
        for c in keys.chars() {
            InputHandler::handle_key_event(app, KeyCode::Char(c), KeyModifiers::NONE);
        }
    }

    #[test]
    fn test_keys_build_expression() {
        let mut app = App::default();
        press(&mut app, "q16)+^3)-p");
        assert_eq!(app.expression, "sqrt(16)+pow(3)-π");

        InputHandler::handle_key_event(&mut app, KeyCode::Backspace, KeyModifiers::NONE);
        assert_eq!(app.expression, "sqrt(16)+pow(3)-");
    }

    #[test]
    fn test_function_keys_are_case_insensitive() {
        let mut app = App::default();
        press(&mut app, "LNSCTE");
        assert_eq!(app.expression, "log(ln(sin(cos(tan(e");
    }

    #[test]
    fn test_enter_and_equals_calculate() {
        let mut app = App::default();
        press(&mut app, "1+2*3");
        InputHandler::handle_key_event(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(app.result, "7");

        // Start over so the function key does not chain onto the 7
        InputHandler::handle_key_event(&mut app, KeyCode::Esc, KeyModifiers::NONE);
        press(&mut app, "l100)=");
        assert_eq!(app.result, "2");
    }

    #[test]
    fn test_escape_clears_all() {
        let mut app = App::default();
        press(&mut app, "12");
        InputHandler::handle_key_event(&mut app, KeyCode::Esc, KeyModifiers::NONE);
        assert!(app.expression.is_empty());
        assert_eq!(app.result, "0");
    }

    #[test]
    fn test_control_keys() {
        let mut app = App::default();
        press(&mut app, "5=");
        assert_eq!(app.history.len(), 1);

        // Ctrl+S opens the export dialog instead of typing sin(
        InputHandler::handle_key_event(&mut app, KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert_eq!(app.mode, AppMode::ExportHistory);
        InputHandler::handle_key_event(&mut app, KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(app.mode, AppMode::Normal);

        InputHandler::handle_key_event(&mut app, KeyCode::Char('l'), KeyModifiers::CONTROL);
        assert!(app.history.is_empty());
    }

    #[test]
    fn test_history_navigation_keys() {
        let mut app = App::default();
        press(&mut app, "8=");
        InputHandler::handle_key_event(&mut app, KeyCode::Esc, KeyModifiers::NONE);
        press(&mut app, "9=");

        InputHandler::handle_key_event(&mut app, KeyCode::Down, KeyModifiers::NONE);
        InputHandler::handle_key_event(&mut app, KeyCode::Down, KeyModifiers::NONE);
        InputHandler::handle_key_event(&mut app, KeyCode::Tab, KeyModifiers::NONE);
        assert_eq!(app.result, "8");
    }

    #[test]
    fn test_help_mode_keys() {
        let mut app = App::default();
        press(&mut app, "?");
        assert_eq!(app.mode, AppMode::Help);

        InputHandler::handle_key_event(&mut app, KeyCode::PageDown, KeyModifiers::NONE);
        assert_eq!(app.help_scroll, 5);
        press(&mut app, "k");
        assert_eq!(app.help_scroll, 4);

        // Calculator keys do nothing while help is open
        press(&mut app, "1");
        assert!(app.expression.is_empty());

        InputHandler::handle_key_event(&mut app, KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(app.mode, AppMode::Normal);
    }

    #[test]
    fn test_filename_editing() {
        let mut app = App::default();
        app.start_history_export();
        InputHandler::handle_key_event(&mut app, KeyCode::End, KeyModifiers::NONE);
        for _ in 0..".json".len() {
            InputHandler::handle_key_event(&mut app, KeyCode::Backspace, KeyModifiers::NONE);
        }
        press(&mut app, "_é.json");
        assert_eq!(app.filename_input, "history_é.json");

        InputHandler::handle_key_event(&mut app, KeyCode::Home, KeyModifiers::NONE);
        InputHandler::handle_key_event(&mut app, KeyCode::Delete, KeyModifiers::NONE);
        assert_eq!(app.filename_input, "istory_é.json");

        InputHandler::handle_key_event(&mut app, KeyCode::End, KeyModifiers::NONE);
        for _ in 0..5 {
            InputHandler::handle_key_event(&mut app, KeyCode::Left, KeyModifiers::NONE);
        }
        InputHandler::handle_key_event(&mut app, KeyCode::Backspace, KeyModifiers::NONE);
        assert_eq!(app.filename_input, "istory_.json");
    }
}
