// The pad grid: which column is active in each row, and what sample sits
// behind every pad. Written by user input, read by the scheduler.
//
// Both halves live behind an ArcSwap so readers always get a whole value;
// writers build a new value and swap it in.

use std::path::PathBuf;

use arc_swap::ArcSwap;

use crate::audio::SampleHandle;
use crate::shared::{NUM_COLUMNS, NUM_ROWS, PadId};

/// Per-row column selection. At most one column per row is active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pattern {
    active: [Option<usize>; NUM_ROWS],
}

impl Pattern {
    pub fn active_column(&self, row: usize) -> Option<usize> {
        self.active.get(row).copied().flatten()
    }

    pub fn active_columns(&self) -> [Option<usize>; NUM_ROWS] {
        self.active
    }

    /// Select `column` in `row`, replacing whatever was selected there.
    /// Selecting the column that is already active turns the row off.
    /// Returns the row's new active column.
    pub fn toggle(&mut self, row: usize, column: usize) -> Option<usize> {
        if column >= NUM_COLUMNS {
            return self.active_column(row);
        }
        let Some(cell) = self.active.get_mut(row) else {
            return None;
        };
        *cell = if *cell == Some(column) { None } else { Some(column) };
        *cell
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SampleSlot {
    pub name: String,
    pub path: Option<PathBuf>,
    pub handle: Option<SampleHandle>, // set once the audio engine has the buffer
}

impl SampleSlot {
    pub fn empty(pad: PadId) -> Self {
        Self {
            name: format!("Loop R{}C{}", pad.row + 1, pad.column + 1),
            path: None,
            handle: None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.handle.is_some()
    }
}

#[derive(Clone, Debug)]
pub struct SampleBank {
    slots: [[SampleSlot; NUM_COLUMNS]; NUM_ROWS],
}

impl Default for SampleBank {
    fn default() -> Self {
        Self {
            slots: std::array::from_fn(|row| {
                std::array::from_fn(|column| SampleSlot::empty(PadId::new(row, column)))
            }),
        }
    }
}

impl SampleBank {
    pub fn get(&self, pad: PadId) -> Option<&SampleSlot> {
        self.slots.get(pad.row).and_then(|row| row.get(pad.column))
    }

    fn get_mut(&mut self, pad: PadId) -> Option<&mut SampleSlot> {
        self.slots.get_mut(pad.row).and_then(|row| row.get_mut(pad.column))
    }
}

/// Read side of the grid as the scheduler sees it.
pub trait PatternStore: Send + Sync {
    fn active_column(&self, row: usize) -> Option<usize>;

    fn sample(&self, row: usize, column: usize) -> SampleSlot;

    /// Every row's selection, read from one consistent state.
    fn active_columns(&self) -> [Option<usize>; NUM_ROWS] {
        std::array::from_fn(|row| self.active_column(row))
    }
}

#[derive(Default)]
pub struct PadGrid {
    pattern: ArcSwap<Pattern>,
    bank: ArcSwap<SampleBank>,
}

impl PadGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pattern(&self) -> Pattern {
        **self.pattern.load()
    }

    pub fn toggle_pad(&self, pad: PadId) -> Option<usize> {
        let mut now_active = None;
        self.pattern.rcu(|current| {
            let mut next = **current;
            now_active = next.toggle(pad.row, pad.column);
            next
        });
        now_active
    }

    pub fn slot(&self, pad: PadId) -> Option<SampleSlot> {
        self.bank.load().get(pad).cloned()
    }

    /// Point a pad at a loaded sample. Returns false for a pad outside the grid.
    pub fn assign_sample(&self, pad: PadId, path: PathBuf, handle: SampleHandle) -> bool {
        let mut assigned = false;
        self.bank.rcu(|current| {
            let mut next = SampleBank::clone(current);
            if let Some(slot) = next.get_mut(pad) {
                slot.path = Some(path.clone());
                slot.handle = Some(handle);
                assigned = true;
            }
            next
        });
        assigned
    }

    pub fn clear_slot(&self, pad: PadId) {
        self.bank.rcu(|current| {
            let mut next = SampleBank::clone(current);
            if let Some(slot) = next.get_mut(pad) {
                *slot = SampleSlot::empty(pad);
            }
            next
        });
    }
}

impl PatternStore for PadGrid {
    fn active_column(&self, row: usize) -> Option<usize> {
        self.pattern.load().active_column(row)
    }

    fn sample(&self, row: usize, column: usize) -> SampleSlot {
        let pad = PadId::new(row, column);
        self.slot(pad).unwrap_or_else(|| SampleSlot::empty(pad))
    }

    fn active_columns(&self) -> [Option<usize>; NUM_ROWS] {
        self.pattern.load().active_columns()
    }
}
