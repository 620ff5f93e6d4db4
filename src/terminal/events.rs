use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::sync::mpsc::Sender;

use crate::terminal::state::{AppState, Focus};
use crate::worker::StoreCommand;

/// Applies one key press. Returns `Ok(true)` when the app should quit.
pub fn handle_key(
    key: KeyEvent,
    state: &mut AppState,
    commands: &Sender<StoreCommand>,
) -> Result<bool> {
    if key.kind != KeyEventKind::Press {
        return Ok(false);
    }

    // A notice blocks everything until it is dismissed.
    if state.notice().is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            state.dismiss_notice();
        }
        return Ok(false);
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => return Ok(true),
            KeyCode::Char('s') => {
                save(state, commands)?;
                return Ok(false);
            }
            _ => {}
        }
    }

    match state.focus {
        Focus::List => handle_list_keys(key, state, commands),
        Focus::Draft => {
            handle_draft_keys(key, state);
            Ok(false)
        }
    }
}

fn save(state: &mut AppState, commands: &Sender<StoreCommand>) -> Result<()> {
    if let Some(cmd) = state.save_command() {
        commands.send(cmd)?;
    }
    Ok(())
}

fn handle_list_keys(
    key: KeyEvent,
    state: &mut AppState,
    commands: &Sender<StoreCommand>,
) -> Result<bool> {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
        KeyCode::Enter => state.select_at_cursor(),
        KeyCode::Down | KeyCode::Char('j') => state.move_cursor(1),
        KeyCode::Up | KeyCode::Char('k') => state.move_cursor(-1),
        KeyCode::Home | KeyCode::Char('g') => state.cursor_first(),
        KeyCode::End | KeyCode::Char('G') => state.cursor_last(),
        KeyCode::PageDown => state.scroll_detail(5),
        KeyCode::PageUp => state.scroll_detail(-5),
        KeyCode::Tab => state.toggle_focus(),
        KeyCode::Char('e') | KeyCode::Char('i') => state.edit_draft(),
        KeyCode::Char('s') => save(state, commands)?,
        KeyCode::Char('r') => {
            if !state.loading {
                commands.send(state.begin_fetch())?;
            }
        }
        _ => {}
    }
    Ok(false)
}

fn handle_draft_keys(key: KeyEvent, state: &mut AppState) {
    let draft = &mut state.draft;
    match key.code {
        KeyCode::Esc | KeyCode::Tab => state.focus = Focus::List,
        KeyCode::Enter => draft.newline(),
        KeyCode::Backspace => draft.backspace(),
        KeyCode::Delete => draft.delete(),
        KeyCode::Left => draft.left(),
        KeyCode::Right => draft.right(),
        KeyCode::Up => draft.up(),
        KeyCode::Down => draft.down(),
        KeyCode::Home => draft.home(),
        KeyCode::End => draft.end(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => draft.insert(c),
        _ => {}
    }
}
