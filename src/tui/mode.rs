use crate::shared::DialogKind;

// state local to the tui so key presses can be resolved into semantic
// input events; synced from DisplayState every loop
#[derive(Clone, Copy, Debug, Default)]
pub struct TuiState {
    pub dialog: Option<DialogKind>,
}
