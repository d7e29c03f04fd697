use crate::application::{App, AppMode};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

pub fn render_ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);

    let calculator = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(body[0]);

    render_header(f, chunks[0]);
    render_display(f, app, calculator[0]);
    render_keypad(f, calculator[1]);
    render_history(f, app, body[1]);
    render_status_bar(f, app, chunks[2]);

    if app.mode == AppMode::Help {
        render_help_popup(f, app.help_scroll);
    }
}

fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new("tcalc - Terminal Calculator")
        .style(Style::default().fg(Color::Cyan));
    f.render_widget(header, area);
}

fn render_display(f: &mut Frame, app: &App, area: Rect) {
    let result_style = if app.is_showing_error() {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };

    let lines = vec![
        Line::from(app.expression.as_str()).alignment(Alignment::Right),
        Line::styled(app.result.as_str(), result_style).alignment(Alignment::Right),
    ];

    let display = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Display"));
    f.render_widget(display, area);
}

fn render_keypad(f: &mut Frame, area: Rect) {
    let keypad = Paragraph::new(KEYPAD_TEXT)
        .block(Block::default().borders(Borders::ALL).title("Keys"))
        .style(Style::default().fg(Color::Yellow));
    f.render_widget(keypad, area);
}

fn render_history(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("History ({}/{})", app.history.len(), app.history.limit()));

    if app.history.is_empty() {
        let empty = Paragraph::new("No calculations yet")
            .block(block)
            .style(Style::default().fg(Color::DarkGray));
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = app
        .history
        .iter()
        .map(|entry| {
            ListItem::new(vec![
                Line::from(format!("{}  {}", entry.timestamp, entry.expression)),
                Line::styled(format!("= {}", entry.result), Style::default().fg(Color::Green)),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White));

    let mut state = ListState::default();
    state.select(app.selected_history);
    f.render_stateful_widget(list, area, &mut state);
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let status_text = match app.mode {
        AppMode::Normal => {
            if let Some(ref status) = app.status_message {
                status.clone()
            } else {
                "Enter/=: calculate | Esc: clear | ↑↓ Tab: reuse history | Ctrl+S: export | F1/?: help | Ctrl+Q: quit".to_string()
            }
        }
        AppMode::Help => "↑↓/jk: scroll | PgUp/PgDn: fast scroll | Home: top | Esc: close help".to_string(),
        AppMode::ExportHistory => format!("Export history as: {} (Enter to export, Esc to cancel)", app.filename_input),
    };

    let status = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(match app.mode {
            AppMode::Normal => Style::default(),
            AppMode::Help => Style::default().fg(Color::Cyan),
            AppMode::ExportHistory => Style::default().fg(Color::Yellow),
        });
    f.render_widget(status, area);
}

const KEYPAD_TEXT: &str = "\
 7  8  9  /     q sqrt(   ^ pow(
 4  5  6  *     l log(    n ln(
 1  2  3  -     s sin(    c cos(
 0  .  =  +     t tan(    p π   e e
 (  )           Esc AC    Backspace CE";

fn render_help_popup(f: &mut Frame, scroll: usize) {
    let area = f.area();
    let popup_area = Rect {
        x: area.width / 10,
        y: area.height / 10,
        width: area.width * 4 / 5,
        height: area.height * 4 / 5,
    };

    f.render_widget(Clear, popup_area);

    let help_text = get_help_text();
    let help_lines: Vec<&str> = help_text.lines().collect();
    let visible_height = popup_area.height.saturating_sub(2) as usize;

    let start_line = scroll.min(help_lines.len().saturating_sub(visible_height));
    let end_line = (start_line + visible_height).min(help_lines.len());

    let visible_text = help_lines[start_line..end_line].join("\n");

    let help_widget = Paragraph::new(visible_text)
        .block(Block::default()
            .borders(Borders::ALL)
            .title(format!("tcalc Help (Line {}/{})", start_line + 1, help_lines.len()))
            .style(Style::default().fg(Color::Cyan)))
        .style(Style::default().fg(Color::White));

    f.render_widget(help_widget, popup_area);
}

fn get_help_text() -> &'static str {
    r#"TCALC EXPRESSION REFERENCE

=== NUMBERS AND OPERATORS ===
12, 3.5, .5     Decimal numbers
+ - * /         Add, subtract, multiply, divide (× and ÷ also accepted)
-x              Negation                    2*-3 → -6
( )             Grouping                    (1+2)*3 → 9

Multiplication and division bind tighter than addition and subtraction.
There is no implicit multiplication: write 2*π, not 2π.

=== FUNCTIONS ===
sqrt(x)         Square root                 sqrt(16) → 4
pow(x,y)        x to the power y            pow(2,10) → 1024
pow(x)          x squared                   pow(3) → 9
log(x)          Base-10 logarithm           log(100) → 2
ln(x)           Natural logarithm           ln(1) → 0
sin(x) cos(x) tan(x)  Trigonometry in radians

=== CONSTANTS ===
π               3.1415926536
e               2.7182818285
                (full precision with --full-precision)

=== RESULTS ===
Results are rounded to 10 decimal places.
Division by zero, undefined values and malformed input show "Error",
which clears itself after a moment.
Typing right after a result continues from that result.

=== KEYS ===
0-9 .           Digits
+ - * / ( )     Operators
Enter or =      Calculate
Esc             Clear all
Backspace       Delete last character
q ^ l n         sqrt( pow( log( ln(
s c t           sin( cos( tan(
p e             π e

=== HISTORY ===
↑ ↓             Select a history entry
Tab             Reuse the selected result
Ctrl+L          Clear history
Ctrl+S          Export history as JSON
                Recent calculations are kept newest first (50 by default).

=== OTHER ===
F1 or ?         Show this help (scroll with ↑↓, PgUp/PgDn, Home)
Ctrl+C/Ctrl+Q   Quit

=== HELP NAVIGATION ===
↑↓ or j/k       Scroll help text up/down one line
Page Up/Down    Scroll help text up/down 5 lines
Home            Jump to top of help text
Esc/F1/?        Close this help window"#
}
