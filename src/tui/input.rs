use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};

use super::mode::TuiState;
use crate::shared::{DialogKind, InputEvent};

// poll for input from the terminal and resolve it against the current mode
pub fn poll_input(timeout: Duration, ts: &TuiState) -> anyhow::Result<Vec<InputEvent>> {
    if !event::poll(timeout)? {
        return Ok(vec![]);
    }

    if let Event::Key(key) = event::read()? {
        if key.kind != KeyEventKind::Press {
            return Ok(vec![]);
        }
        return Ok(handle_key(key.code, ts));
    }
    Ok(vec![])
}

pub fn handle_key(code: KeyCode, ts: &TuiState) -> Vec<InputEvent> {
    match ts.dialog {
        Some(DialogKind::Tempo) => resolve_tempo_dialog(code),
        Some(DialogKind::Signature) => resolve_signature_dialog(code),
        None => resolve_grid(code),
    }
}

fn resolve_grid(code: KeyCode) -> Vec<InputEvent> {
    let event = match code {
        KeyCode::Esc | KeyCode::Char('q') => InputEvent::Quit,
        KeyCode::Char(' ') => InputEvent::PlayPress,
        KeyCode::Enter => InputEvent::TogglePad,
        KeyCode::Char('t') => InputEvent::OpenTempoDialog,
        KeyCode::Char('s') => InputEvent::OpenSignatureDialog,

        KeyCode::Up | KeyCode::Char('k') => InputEvent::MoveCursor { rows: -1, columns: 0 },
        KeyCode::Down | KeyCode::Char('j') => InputEvent::MoveCursor { rows: 1, columns: 0 },
        KeyCode::Left | KeyCode::Char('h') => InputEvent::MoveCursor { rows: 0, columns: -1 },
        KeyCode::Right | KeyCode::Char('l') => InputEvent::MoveCursor { rows: 0, columns: 1 },

        _ => return vec![],
    };
    vec![event]
}

fn resolve_tempo_dialog(code: KeyCode) -> Vec<InputEvent> {
    let event = match code {
        KeyCode::Left => InputEvent::NudgeTempo(-1.0),
        KeyCode::Right => InputEvent::NudgeTempo(1.0),
        KeyCode::Down => InputEvent::NudgeTempo(-10.0),
        KeyCode::Up => InputEvent::NudgeTempo(10.0),
        KeyCode::Enter => InputEvent::ApplyDialog,
        KeyCode::Esc => InputEvent::CancelDialog,
        _ => return vec![],
    };
    vec![event]
}

fn resolve_signature_dialog(code: KeyCode) -> Vec<InputEvent> {
    let event = match code {
        KeyCode::Left | KeyCode::Up => InputEvent::CycleSignature(-1),
        KeyCode::Right | KeyCode::Down => InputEvent::CycleSignature(1),
        KeyCode::Enter => InputEvent::ApplyDialog,
        KeyCode::Esc => InputEvent::CancelDialog,
        _ => return vec![],
    };
    vec![event]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(dialog: Option<DialogKind>) -> TuiState {
        TuiState { dialog }
    }

    #[test]
    fn grid_keys() {
        let grid = ts(None);
        assert_eq!(handle_key(KeyCode::Char(' '), &grid), vec![InputEvent::PlayPress]);
        assert_eq!(handle_key(KeyCode::Enter, &grid), vec![InputEvent::TogglePad]);
        let down = InputEvent::MoveCursor { rows: 1, columns: 0 };
        assert_eq!(handle_key(KeyCode::Char('j'), &grid), vec![down]);
        assert_eq!(handle_key(KeyCode::Esc, &grid), vec![InputEvent::Quit]);
        assert!(handle_key(KeyCode::Char('z'), &grid).is_empty());
    }

    #[test]
    fn esc_cancels_instead_of_quitting_inside_a_dialog() {
        let tempo = ts(Some(DialogKind::Tempo));
        let signature = ts(Some(DialogKind::Signature));
        assert_eq!(handle_key(KeyCode::Esc, &tempo), vec![InputEvent::CancelDialog]);
        assert_eq!(handle_key(KeyCode::Esc, &signature), vec![InputEvent::CancelDialog]);
        assert!(handle_key(KeyCode::Char('q'), &ts(Some(DialogKind::Tempo))).is_empty());
    }

    #[test]
    fn arrows_adjust_the_open_dialog() {
        let tempo = ts(Some(DialogKind::Tempo));
        let signature = ts(Some(DialogKind::Signature));
        assert_eq!(handle_key(KeyCode::Up, &tempo), vec![InputEvent::NudgeTempo(10.0)]);
        assert_eq!(handle_key(KeyCode::Left, &signature), vec![InputEvent::CycleSignature(-1)]);
    }
}
