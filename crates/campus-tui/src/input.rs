use crossterm::event::{KeyCode, KeyEvent};

use campus_core::models::AttendanceStatus;

use crate::ui::App;

pub(crate) fn handle_key(app: &mut App, key: KeyEvent) {
    if app.notes.is_some() {
        handle_notes_key(app, key);
    } else if app.surface.is_some() {
        handle_modal_key(app, key);
    } else {
        handle_list_key(app, key);
    }
}

fn handle_notes_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit_notes(),
        KeyCode::Esc => app.cancel_notes(),
        KeyCode::Backspace => {
            if let Some(prompt) = app.notes.as_mut() {
                prompt.text.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(prompt) = app.notes.as_mut() {
                prompt.text.push(c);
            }
        }
        _ => {}
    }
}

fn handle_modal_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('c') => app.choose_response(AttendanceStatus::Confirmed),
        KeyCode::Char('m') => app.choose_response(AttendanceStatus::Maybe),
        KeyCode::Char('n') => app.choose_response(AttendanceStatus::Declined),
        KeyCode::Char('r') => app.retry_surface(),
        KeyCode::Esc | KeyCode::Char('q') => app.close_surface(),
        _ => {}
    }
}

fn handle_list_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.move_selection(1),
        KeyCode::Char('k') | KeyCode::Up => app.move_selection(-1),
        KeyCode::Enter => app.activate_selected(),
        KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(),
        KeyCode::Char('a') => app.mark_all_read(),
        KeyCode::Char('r') => app.reload(),
        KeyCode::Char('x') => app.toasts.dismiss(),
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        _ => {}
    }
}
