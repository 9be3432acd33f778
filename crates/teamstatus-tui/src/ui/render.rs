use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, AppState, Screen};

use super::styles;
use super::views::{form, teams};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    match app.screen {
        Screen::Roster => teams::render(frame, app, chunks[1]),
        Screen::Form => form::render(frame, app, chunks[1]),
    }
    render_status_bar(frame, app, chunks[2]);

    // Render overlays
    match &app.state {
        AppState::ShowingHelp => render_help_overlay(frame, app),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        AppState::Confirming(pending) => render_confirm_overlay(frame, &app.confirm_prompt(pending)),
        _ => {}
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  TeamStatus";
    let search = if app.roster.is_filtered() || matches!(app.state, AppState::Searching) {
        let cursor = if matches!(app.state, AppState::Searching) { "▌" } else { "" };
        format!("  Search: {}{}", app.roster.search(), cursor)
    } else {
        String::new()
    };
    let help_hint = "[?] Help";

    let used = title.len() + search.chars().count() + help_hint.len() + 4;
    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::styled(search, styles::search_style()),
        Span::raw(" ".repeat((area.width as usize).saturating_sub(used))),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (left_text, left_style) = if let Some(notice) = app.current_notice() {
        (format!(" {} ", notice.message), styles::notice_style(notice.level))
    } else if app.is_busy() {
        (" Saving... ".to_string(), styles::muted_style())
    } else if let Some(grabbed) = app.grabbed.as_ref().and_then(|id| app.roster.team(id)) {
        (format!(" Moving {} ", grabbed.name), styles::highlight_style())
    } else {
        (String::new(), styles::muted_style())
    };

    let shortcuts = match (app.screen, &app.state) {
        (_, AppState::Searching) => "[Enter] keep | [Esc] clear",
        (_, AppState::EditingMember) => "[Enter] save | [Esc] cancel",
        (Screen::Form, _) => "[Ctrl+S] save | [Esc] exit",
        (Screen::Roster, _) => "[n]ew | [e]dit | [d]elete | [/] search | [u]pdate | [q]uit",
    };
    let right_text = format!(" {} ", shortcuts);

    let padding_len = (area.width as usize)
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.len());
    let status_line = Line::from(vec![
        Span::styled(left_text, left_style),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect_fixed(56, 31, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled("  TeamStatus", styles::title_style())),
        Line::from(Span::styled(
            format!("  version {}", version),
            styles::muted_style(),
        )),
        Line::from(Span::styled(
            format!("  {}", app.config.api_url()),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Teams", styles::highlight_style())),
        help_line("↑/↓", "Navigate rows"),
        help_line("Enter", "Expand / collapse members"),
        help_line("Space", "Select team"),
        help_line("a", "Select all visible teams"),
        help_line("1 / 2", "Cycle manager / director status"),
        help_line("g", "Grab team, then drop on another"),
        help_line("K / J", "Move team up / down"),
        help_line("e", "Edit team, or rename member"),
        help_line("d / D", "Delete row / delete selected"),
        help_line("n", "New team"),
        help_line("/", "Search teams and members"),
        help_line("u", "Reload from server"),
        help_line("Esc", "Cancel move / clear search"),
        help_line("q", "Quit"),
        Line::from(""),
        Line::from(Span::styled(" Team Form", styles::highlight_style())),
        help_line("Tab", "Next field"),
        help_line("←/→", "Choose gender"),
        help_line("Ctrl+N", "Add member"),
        help_line("Ctrl+D", "Remove focused member"),
        help_line("Ctrl+S", "Save"),
        help_line("Esc", "Exit without saving"),
        Line::from(""),
        Line::from(vec![
            Span::styled("         Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(help_text).block(block);

    frame.render_widget(paragraph, area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn yes_no_line() -> Line<'static> {
    Line::from(vec![
        Span::raw("           "),
        Span::styled("[y]", styles::help_key_style()),
        Span::styled(" Yes    ", styles::help_desc_style()),
        Span::styled("[n]", styles::help_key_style()),
        Span::styled(" No", styles::help_desc_style()),
    ])
}

fn render_confirm_overlay(frame: &mut Frame, prompt: &str) {
    let area = centered_rect_fixed(50, 8, frame.area());

    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!(" {}", prompt), styles::list_item_style())),
        Line::from(""),
        yes_no_line(),
    ];

    let block = Block::default()
        .title(" Confirm ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(40, 7, frame.area());

    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("        Quit TeamStatus?", styles::title_style())),
        Line::from(""),
        yes_no_line(),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}
