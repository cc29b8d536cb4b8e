mod pattern;
pub mod persistence;

pub use pattern::{PadGrid, Pattern, PatternStore, SampleBank, SampleSlot};
