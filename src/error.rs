//! Error types for the ptbkit library

use std::io;

/// Library error type for ptbkit operations
#[derive(Debug, thiserror::Error)]
pub enum PtbError {
    /// Parsing error when reading Power Tab data
    #[error("parsing error: {0}")]
    ParsingError(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(String),

    /// A stream was poisoned while encoding or decoding an entity
    #[error("stream error: {0}")]
    StreamError(#[from] StreamError),

    /// A mutator rejected its input
    #[error("validation error: {0}")]
    ValidationError(#[from] ValidationError),
}

impl From<io::Error> for PtbError {
    fn from(error: io::Error) -> Self {
        Self::IoError(error.to_string())
    }
}

/// First failure recorded by an input or output stream.
///
/// Once a stream holds one of these it stays poisoned for the rest of its life.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StreamError {
    #[error("unexpected end of data at offset {offset} while reading {what}")]
    UnexpectedEof { offset: usize, what: &'static str },

    #[error("invalid data at offset {offset}: {message}")]
    InvalidData { offset: usize, message: String },

    #[error("write failed: {0}")]
    Io(String),
}

/// Rejected input for a validated mutator. The target object is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid string count: {0}")]
    StringCount(usize),

    #[error("invalid string index: {0}")]
    StringIndex(usize),

    #[error("invalid MIDI note: {0}")]
    MidiNote(u8),

    #[error("invalid music notation offset: {0}")]
    MusicNotationOffset(i8),

    #[error("invalid key {key} with variation {variation}")]
    KeyAndVariation { key: u8, variation: u8 },

    #[error("invalid formula: {0}")]
    Formula(u8),

    #[error("invalid formula modification flag: {0:#06x}")]
    FormulaModificationFlag(u16),

    #[error("invalid fret position: {0}")]
    FretPosition(u8),

    #[error("invalid chord type: {0}")]
    ChordType(u8),

    #[error("invalid clef: {0}")]
    Clef(u8),

    #[error("invalid tablature staff type: {0}")]
    TablatureStaffType(u8),

    #[error("invalid duration type: {0}")]
    DurationType(u8),

    #[error("invalid position flag: {0:#010x}")]
    PositionFlag(u32),

    #[error("invalid note flag: {0:#06x}")]
    NoteFlag(u16),

    #[error("invalid fret number: {0}")]
    Fret(u8),

    #[error("invalid barline type: {0}")]
    BarlineType(u8),

    #[error("invalid repeat count {count} for barline type {barline_type}")]
    RepeatCount { barline_type: u8, count: u8 },

    #[error("invalid beats per minute: {0}")]
    BeatsPerMinute(u16),

    #[error("invalid beat type: {0}")]
    BeatType(u8),

    #[error("invalid triplet feel type: {0}")]
    TripletFeelType(u8),

    #[error("invalid tempo marker type: {0}")]
    TempoMarkerType(u8),

    #[error("invalid alteration of pace: {0}")]
    AlterationOfPace(u8),
}
