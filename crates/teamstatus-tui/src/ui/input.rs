//! Keyboard input handling for the TUI.
//!
//! Overlays (help, quit, confirmation) take keys first, then the active
//! text input (search, inline member edit), then the current screen.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use teamstatus_core::StatusField;

use crate::app::{App, AppState, Screen, PAGE_SCROLL_SIZE};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    // Handle destructive action confirmation
    if matches!(app.state, AppState::Confirming(_)) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.resolve_confirm(true),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.resolve_confirm(false),
            _ => {}
        }
        return Ok(false);
    }

    if matches!(app.state, AppState::Searching) {
        handle_search_input(app, key);
        return Ok(false);
    }

    if matches!(app.state, AppState::EditingMember) {
        handle_member_edit_input(app, key);
        return Ok(false);
    }

    match app.screen {
        Screen::Roster => Ok(handle_roster_input(app, key)),
        Screen::Form => {
            handle_form_input(app, key);
            Ok(false)
        }
    }
}

fn handle_search_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
            app.set_search(String::new());
        }
        KeyCode::Enter => {
            // Keep search query active
            app.state = AppState::Normal;
        }
        KeyCode::Backspace => {
            let mut query = app.roster.search().to_string();
            query.pop();
            app.set_search(query);
        }
        KeyCode::Char(c) => {
            let mut query = app.roster.search().to_string();
            query.push(c);
            app.set_search(query);
        }
        _ => {}
    }
}

fn handle_member_edit_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_member_edit(),
        KeyCode::Enter => app.save_member_edit(),
        KeyCode::Backspace => {
            if let Some(draft) = app.roster.member_draft_mut() {
                draft.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(draft) = app.roster.member_draft_mut() {
                draft.push(c);
            }
        }
        _ => {}
    }
}

/// Roster screen keys. Returns true if the app should quit.
fn handle_roster_input(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') => app.state = AppState::ConfirmingQuit,
        KeyCode::Char('?') => app.state = AppState::ShowingHelp,
        KeyCode::Char('/') => app.state = AppState::Searching,
        KeyCode::Char('u') => app.reload(),
        KeyCode::Up | KeyCode::Char('k') => app.move_cursor(-1),
        KeyCode::Down | KeyCode::Char('j') => app.move_cursor(1),
        KeyCode::PageUp => app.move_cursor(-(PAGE_SCROLL_SIZE as isize)),
        KeyCode::PageDown => app.move_cursor(PAGE_SCROLL_SIZE as isize),
        KeyCode::Home => app.cursor = 0,
        KeyCode::End => app.move_cursor(isize::MAX / 2),
        KeyCode::Char(' ') => app.toggle_select(),
        KeyCode::Char('a') => app.toggle_select_all(),
        KeyCode::Enter => app.toggle_expand(),
        KeyCode::Char('1') => app.cycle_status(StatusField::Manager),
        KeyCode::Char('2') => app.cycle_status(StatusField::Director),
        KeyCode::Char('g') => app.grab_or_drop(),
        KeyCode::Char('K') => app.nudge_team(true),
        KeyCode::Char('J') => app.nudge_team(false),
        KeyCode::Char('e') => match app.selected_row() {
            Some(crate::app::RosterRow::Team(_)) => app.open_edit_form(),
            Some(crate::app::RosterRow::Member { .. }) => app.begin_member_edit(),
            None => {}
        },
        KeyCode::Char('d') => app.request_delete(),
        KeyCode::Char('D') => app.request_bulk_delete(),
        KeyCode::Char('n') => app.open_new_form(),
        KeyCode::Esc => {
            if !app.cancel_grab() {
                if app.roster.is_filtered() {
                    app.set_search(String::new());
                } else {
                    app.roster.clear_selection();
                }
            }
            app.dismiss_notices();
        }
        _ => {}
    }
    matches!(app.state, AppState::Quitting)
}

fn handle_form_input(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('s') => app.request_submit(),
            KeyCode::Char('n') => app.form_add_member(),
            KeyCode::Char('d') => app.form_remove_member(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Esc => app.request_exit_form(),
        KeyCode::Tab | KeyCode::Down | KeyCode::Enter => app.move_form_focus(1),
        KeyCode::BackTab | KeyCode::Up => app.move_form_focus(-1),
        KeyCode::Left => app.form_cycle_gender(false),
        KeyCode::Right => app.form_cycle_gender(true),
        KeyCode::Backspace => app.form_backspace(),
        KeyCode::Char(c) => app.form_type(c),
        _ => {}
    }
}
