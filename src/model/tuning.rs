use std::io::Write;

use crate::codec::packed_field::flag_u8;
use crate::codec::{BitField, FileVersion, InputStream, Layout, OutputStream, Serializable};
use crate::model::pitch::{is_valid_midi_note, midi_note_text, MAX_MIDI_NOTE};
use crate::{StreamError, ValidationError};

pub const DEFAULT_NAME: &str = "";
pub const DEFAULT_DATA: u8 = 0;

pub const MIN_MUSIC_NOTATION_OFFSET: i8 = -12;
pub const MAX_MUSIC_NOTATION_OFFSET: i8 = 12;

pub const MIN_STRING_COUNT: usize = 3;
pub const MAX_STRING_COUNT: usize = 7;

/// Marker for an unused string slot
pub const NOT_USED: u8 = 0xff;

/// Frets reachable above the capo when computing a note range
pub const MAX_FRET: u8 = 24;

// data byte: bit 7 = offset sign, bits 6..1 = offset magnitude, bit 0 = sharps
const SHARPS: BitField<u8> = flag_u8(0x01);
const OFFSET_VALUE: BitField<u8> = BitField::new(0x7e, 1);
const OFFSET_SIGN: BitField<u8> = flag_u8(0x80);

/// Tuning of a stringed instrument.
///
/// Notes are MIDI note numbers ordered from the highest string to the lowest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tuning {
    name: String,
    data: u8,
    notes: Vec<u8>,
}

impl Default for Tuning {
    fn default() -> Self {
        Tuning {
            name: DEFAULT_NAME.to_string(),
            data: DEFAULT_DATA,
            notes: vec![],
        }
    }
}

impl Tuning {
    /// Build a tuning from up to seven notes; notes after the first `NOT_USED` are ignored.
    pub fn new(
        name: &str,
        music_notation_offset: i8,
        sharps: bool,
        notes: &[u8],
    ) -> Result<Self, ValidationError> {
        let mut tuning = Tuning::default();
        tuning.set_tuning(name, music_notation_offset, sharps, notes)?;
        Ok(tuning)
    }

    /// Six string guitar in standard tuning (E A D G B E)
    pub fn standard_guitar() -> Self {
        Tuning {
            name: "Standard".to_string(),
            data: DEFAULT_DATA,
            notes: vec![64, 59, 55, 50, 45, 40],
        }
    }

    pub fn set_tuning(
        &mut self,
        name: &str,
        music_notation_offset: i8,
        sharps: bool,
        notes: &[u8],
    ) -> Result<(), ValidationError> {
        if !Self::is_valid_music_notation_offset(music_notation_offset) {
            return Err(ValidationError::MusicNotationOffset(music_notation_offset));
        }
        let notes = used_notes(notes);
        if !Self::is_valid_string_count(notes.len()) {
            return Err(ValidationError::StringCount(notes.len()));
        }
        if let Some(&note) = notes.iter().find(|note| !is_valid_midi_note(**note)) {
            return Err(ValidationError::MidiNote(note));
        }

        let mut data = DEFAULT_DATA;
        encode_music_notation_offset(&mut data, music_notation_offset);
        SHARPS.set_flag(&mut data, sharps);

        self.name = name.to_string();
        self.data = data;
        self.notes = notes;
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub const fn is_valid_music_notation_offset(offset: i8) -> bool {
        offset >= MIN_MUSIC_NOTATION_OFFSET && offset <= MAX_MUSIC_NOTATION_OFFSET
    }

    pub fn set_music_notation_offset(&mut self, offset: i8) -> Result<(), ValidationError> {
        if !Self::is_valid_music_notation_offset(offset) {
            return Err(ValidationError::MusicNotationOffset(offset));
        }
        encode_music_notation_offset(&mut self.data, offset);
        Ok(())
    }

    pub fn music_notation_offset(&self) -> i8 {
        let value = OFFSET_VALUE.get(self.data) as i8;
        if OFFSET_SIGN.is_set(self.data) {
            -value
        } else {
            value
        }
    }

    pub fn set_sharps(&mut self, set: bool) {
        SHARPS.set_flag(&mut self.data, set);
    }

    /// Whether note names are displayed with sharps rather than flats
    pub fn uses_sharps(&self) -> bool {
        SHARPS.is_set(self.data)
    }

    pub const fn is_valid_string_count(count: usize) -> bool {
        count >= MIN_STRING_COUNT && count <= MAX_STRING_COUNT
    }

    pub fn is_valid_string(&self, string: usize) -> bool {
        string < self.notes.len()
    }

    /// Number of strings in use, unused slots excluded
    pub fn string_count(&self) -> usize {
        self.notes.iter().filter(|&&note| note != NOT_USED).count()
    }

    pub fn is_valid(&self) -> bool {
        Self::is_valid_string_count(self.string_count())
    }

    pub fn notes(&self) -> &[u8] {
        &self.notes
    }

    /// Replace the note of one string; `NOT_USED` marks the slot as unused.
    pub fn set_note(&mut self, string: usize, note: u8) -> Result<(), ValidationError> {
        if !self.is_valid_string(string) {
            return Err(ValidationError::StringIndex(string));
        }
        if note != NOT_USED && !is_valid_midi_note(note) {
            return Err(ValidationError::MidiNote(note));
        }
        if note == NOT_USED && self.notes[string] != NOT_USED {
            let remaining = self.string_count() - 1;
            if remaining < MIN_STRING_COUNT {
                return Err(ValidationError::StringCount(remaining));
            }
        }
        self.notes[string] = note;
        Ok(())
    }

    /// MIDI note of a string, optionally shifted by the music notation offset
    pub fn note(&self, string: usize, include_music_notation_offset: bool) -> Option<u8> {
        let note = *self.notes.get(string)?;
        if !include_music_notation_offset || note == NOT_USED {
            return Some(note);
        }
        let shifted = i16::from(note) + i16::from(self.music_notation_offset());
        Some(shifted.clamp(0, i16::from(MAX_MIDI_NOTE)) as u8)
    }

    pub fn note_text(&self, string: usize) -> Option<&'static str> {
        match self.notes.get(string) {
            Some(&NOT_USED) | None => None,
            Some(&note) => Some(midi_note_text(note, self.uses_sharps())),
        }
    }

    pub fn is_open_string_note(&self, note: u8) -> bool {
        note != NOT_USED && self.notes.contains(&note)
    }

    /// Lowest and highest playable notes with a capo on the given fret
    pub fn note_range(&self, capo: u8) -> Option<(u8, u8)> {
        let mut used = self.notes.iter().filter(|&&note| note != NOT_USED);
        let first = *used.next()?;
        let (low, high) = used.fold((first, first), |(low, high), &note| {
            (low.min(note), high.max(note))
        });
        let low = low.saturating_add(capo).min(MAX_MIDI_NOTE);
        let high = high
            .saturating_add(capo)
            .saturating_add(MAX_FRET)
            .min(MAX_MIDI_NOTE);
        Some((low, high))
    }

    /// Same notes, regardless of name, offset and sharps
    pub fn is_same_tuning(&self, other: &Tuning) -> bool {
        self.is_same_tuning_notes(&other.notes)
    }

    /// Unused slots are skipped on both sides
    pub fn is_same_tuning_notes(&self, notes: &[u8]) -> bool {
        let in_use = |notes: &[u8]| {
            notes
                .iter()
                .copied()
                .filter(|&note| note != NOT_USED)
                .collect::<Vec<_>>()
        };
        in_use(&self.notes) == in_use(notes)
    }

    /// Note names from the lowest string to the highest, e.g. "E A D G B E"
    pub fn spelling(&self) -> String {
        let sharps = self.uses_sharps();
        self.notes
            .iter()
            .rev()
            .filter(|&&note| note != NOT_USED)
            .map(|&note| midi_note_text(note, sharps))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Notes up to the first unused marker
fn used_notes(notes: &[u8]) -> Vec<u8> {
    notes
        .iter()
        .copied()
        .take_while(|&note| note != NOT_USED)
        .collect()
}

fn encode_music_notation_offset(data: &mut u8, offset: i8) {
    OFFSET_VALUE.set(data, offset.unsigned_abs());
    OFFSET_SIGN.set_flag(data, offset < 0);
}

impl Serializable for Tuning {
    fn serialize<W: Write>(&self, stream: &mut OutputStream<W>) -> Result<(), StreamError> {
        stream.write_string(&self.name);
        stream.write_u8(self.data);
        stream.write_bytes(&self.notes);
        stream.check_state()
    }

    fn deserialize(
        &mut self,
        stream: &mut InputStream<'_>,
        version: FileVersion,
    ) -> Result<(), StreamError> {
        let tuning = match version.layout() {
            // offset and sharps stored as two separate bytes
            Layout::Unpacked => {
                let name = stream.read_string();
                let offset = stream.read_i8();
                let sharps = stream.read_u8();
                let notes = stream.read_bytes();
                stream.check_state()?;

                let mut tuning = Tuning {
                    name,
                    data: DEFAULT_DATA,
                    notes,
                };
                if let Err(err) = tuning.set_music_notation_offset(offset) {
                    log::warn!("Ignoring legacy tuning offset: {err}");
                }
                tuning.set_sharps(sharps != 0);
                tuning
            }
            Layout::Packed => {
                let name = stream.read_string();
                let data = stream.read_u8();
                let notes = stream.read_bytes();
                stream.check_state()?;
                Tuning { name, data, notes }
            }
        };
        log::debug!("Tuning '{}' with {} strings", tuning.name, tuning.notes.len());
        *self = tuning;
        Ok(())
    }
}
