// Types shared between the TUI and the middle layer.
//
// Keys (resolved by the TUI into the semantic events below):
//   arrows / h j k l   //  MoveCursor
//   Enter              //  TogglePad (the pad under the cursor)
//   Space              //  PlayPress
//   t                  //  OpenTempoDialog
//   s                  //  OpenSignatureDialog
//   q / Esc            //  Quit (Esc cancels instead while a dialog is open)
//
// Inside the tempo dialog:      Left/Right ±1 BPM, Down/Up ±10 BPM
// Inside the signature dialog:  Left/Right cycle through the presets
// Both dialogs:                 Enter applies, Esc cancels
//
// The middle layer owns the pad grid, the scheduler and dialog state; every
// frame the TUI asks it for a `DisplayState` and just draws that.

pub const NUM_ROWS: usize = 6;
pub const NUM_COLUMNS: usize = 6;
pub const NUM_SLOTS: usize = NUM_ROWS * NUM_COLUMNS;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PadId {
    pub row: usize,
    pub column: usize,
}

impl PadId {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// Row-major slot number, used when filling slots from a directory listing.
    pub fn from_slot(slot: usize) -> Option<Self> {
        (slot < NUM_SLOTS).then(|| Self::new(slot / NUM_COLUMNS, slot % NUM_COLUMNS))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DialogKind {
    Tempo,
    Signature,
}

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    MoveCursor { rows: i32, columns: i32 },
    TogglePad,
    PlayPress,

    OpenTempoDialog,
    OpenSignatureDialog,
    NudgeTempo(f64),        // tempo dialog
    CycleSignature(i32),    // signature dialog
    ApplyDialog,
    CancelDialog,

    Quit,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PadView {
    pub label: String,
    pub active: bool,
    pub loaded: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DialogView {
    Tempo { pending: f64 },
    Signature { options: Vec<String>, selected: usize },
}

impl DialogView {
    pub fn kind(&self) -> DialogKind {
        match self {
            DialogView::Tempo { .. } => DialogKind::Tempo,
            DialogView::Signature { .. } => DialogKind::Signature,
        }
    }
}

#[derive(Clone, Debug)]
pub struct DisplayState {
    pub pads: [[PadView; NUM_COLUMNS]; NUM_ROWS],
    pub cursor: PadId,
    pub playing: bool,
    pub tempo: f64,
    pub signature: String,
    pub beats_per_measure: u32,
    pub current_beat: Option<u32>, // beat of the measure that is sounding now
    pub dialog: Option<DialogView>,
    pub notice: String, // last warning worth showing, empty when there is none
}
