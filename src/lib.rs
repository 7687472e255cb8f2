//! Ptbkit - Power Tab document model and versioned binary codec
//!
//! This library provides:
//! - Score entities (tunings, chord names, staves, positions, dynamics, barlines, tempo markers)
//!   with validated setters over bit-packed storage
//! - A little-endian binary codec reading every Power Tab file version and writing the current one
//!
//! # Example
//!
//! ```no_run
//! use ptbkit::{from_bytes, to_bytes, FileVersion, Tuning};
//!
//! let data = std::fs::read("tuning.bin").unwrap();
//! let tuning: Tuning = from_bytes(&data, FileVersion::V1_0_2).unwrap();
//! println!("{}", tuning.spelling());
//! let migrated = to_bytes(&tuning).unwrap();
//! ```

pub mod codec;
pub mod error;
pub mod model;

// Re-export main types for convenience
pub use codec::{
    from_bytes, to_bytes, FileVersion, InputStream, Layout, OutputStream, Serializable,
};
pub use error::{PtbError, StreamError, ValidationError};
pub use model::{
    barline::Barline,
    chord_name::ChordName,
    dynamic::{Dynamic, VolumeLevel},
    position::{Note, Position},
    staff::Staff,
    tempo_marker::TempoMarker,
    tuning::Tuning,
};
