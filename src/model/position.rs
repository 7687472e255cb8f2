use std::io::Write;

use crate::codec::packed_field::{flag_u16, flag_u32};
use crate::codec::{BitField, FileVersion, InputStream, OutputStream, Serializable};
use crate::{StreamError, ValidationError};

pub const DEFAULT_POSITION: u8 = 0;
pub const DEFAULT_BEAMING: u16 = 0;
pub const DEFAULT_DURATION_TYPE: u8 = 8;
pub const DEFAULT_DATA: u32 = (DEFAULT_DURATION_TYPE as u32) << 24;

/// Valid duration types (whole note through sixty-fourth)
pub const DURATION_TYPES: [u8; 7] = [1, 2, 4, 8, 16, 32, 64];

// Position flags, bits 0..23 of the data word
pub const DOTTED: u32 = 0x0000_0001;
pub const DOUBLE_DOTTED: u32 = 0x0000_0002;
pub const REST: u32 = 0x0000_0004;
pub const VIBRATO: u32 = 0x0000_0008;
pub const WIDE_VIBRATO: u32 = 0x0000_0010;
pub const PALM_MUTING: u32 = 0x0000_0020;
pub const STACCATO: u32 = 0x0000_0040;
pub const LET_RING: u32 = 0x0000_0080;
pub const TREMOLO_PICKING: u32 = 0x0000_0100;
pub const PICK_STROKE_UP: u32 = 0x0000_0200;
pub const PICK_STROKE_DOWN: u32 = 0x0000_0400;
const POSITION_FLAGS_MASK: u32 = 0x00ff_ffff;

const DURATION_TYPE: BitField<u32> = BitField::new(0xff00_0000, 24);

pub const MAX_STRING: u8 = 6;
pub const MAX_FRET: u8 = 24;

// Note flags
pub const TIED: u16 = 0x0001;
pub const MUTED: u16 = 0x0002;
pub const TIE_WRAP: u16 = 0x0004;
pub const HAMMER_ON: u16 = 0x0008;
pub const PULL_OFF: u16 = 0x0010;
pub const GHOST_NOTE: u16 = 0x0020;
pub const NATURAL_HARMONIC: u16 = 0x0040;

// string data: string index | fret number
const STRING: BitField<u8> = BitField::new(0xe0, 5);
const FRET: BitField<u8> = BitField::new(0x1f, 0);

/// Note played on one string at a position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Note {
    string_data: u8,
    simple_data: u16,
}

impl Note {
    pub fn new(string: u8, fret: u8) -> Result<Self, ValidationError> {
        let mut note = Note::default();
        note.set_string(string)?;
        note.set_fret(fret)?;
        Ok(note)
    }

    pub fn set_string(&mut self, string: u8) -> Result<(), ValidationError> {
        if string > MAX_STRING {
            return Err(ValidationError::StringIndex(usize::from(string)));
        }
        STRING.set(&mut self.string_data, string);
        Ok(())
    }

    pub fn string(&self) -> u8 {
        STRING.get(self.string_data)
    }

    pub fn set_fret(&mut self, fret: u8) -> Result<(), ValidationError> {
        if fret > MAX_FRET {
            return Err(ValidationError::Fret(fret));
        }
        FRET.set(&mut self.string_data, fret);
        Ok(())
    }

    pub fn fret(&self) -> u8 {
        FRET.get(self.string_data)
    }

    pub fn set_flag(&mut self, flag: u16, set: bool) -> Result<(), ValidationError> {
        if !flag.is_power_of_two() {
            return Err(ValidationError::NoteFlag(flag));
        }
        flag_u16(flag).set_flag(&mut self.simple_data, set);
        Ok(())
    }

    pub fn has_flag(&self, flag: u16) -> bool {
        flag.is_power_of_two() && flag_u16(flag).is_set(self.simple_data)
    }
}

impl Serializable for Note {
    fn serialize<W: Write>(&self, stream: &mut OutputStream<W>) -> Result<(), StreamError> {
        stream.write_u8(self.string_data);
        stream.write_u16(self.simple_data);
        stream.check_state()
    }

    fn deserialize(
        &mut self,
        stream: &mut InputStream<'_>,
        _version: FileVersion,
    ) -> Result<(), StreamError> {
        let string_data = stream.read_u8();
        let simple_data = stream.read_u16();
        stream.check_state()?;
        *self = Note {
            string_data,
            simple_data,
        };
        Ok(())
    }
}

/// Group of notes sharing a rhythmic slot in a staff voice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    position: u8,
    beaming: u16,
    data: u32,
    notes: Vec<Note>,
}

impl Default for Position {
    fn default() -> Self {
        Position {
            position: DEFAULT_POSITION,
            beaming: DEFAULT_BEAMING,
            data: DEFAULT_DATA,
            notes: vec![],
        }
    }
}

impl Position {
    pub fn new(position: u8, duration_type: u8) -> Result<Self, ValidationError> {
        let mut result = Position {
            position,
            ..Position::default()
        };
        result.set_duration_type(duration_type)?;
        Ok(result)
    }

    pub const fn position(&self) -> u8 {
        self.position
    }

    pub fn set_position(&mut self, position: u8) {
        self.position = position;
    }

    pub const fn beaming(&self) -> u16 {
        self.beaming
    }

    pub fn set_beaming(&mut self, beaming: u16) {
        self.beaming = beaming;
    }

    pub fn is_valid_duration_type(duration_type: u8) -> bool {
        DURATION_TYPES.contains(&duration_type)
    }

    pub fn set_duration_type(&mut self, duration_type: u8) -> Result<(), ValidationError> {
        if !Self::is_valid_duration_type(duration_type) {
            return Err(ValidationError::DurationType(duration_type));
        }
        DURATION_TYPE.set(&mut self.data, u32::from(duration_type));
        Ok(())
    }

    pub fn duration_type(&self) -> u8 {
        DURATION_TYPE.get(self.data) as u8
    }

    pub const fn is_valid_flag(flag: u32) -> bool {
        flag.is_power_of_two() && flag & POSITION_FLAGS_MASK == flag
    }

    /// Dotted and double dotted exclude each other
    pub fn set_flag(&mut self, flag: u32, set: bool) -> Result<(), ValidationError> {
        if !Self::is_valid_flag(flag) {
            return Err(ValidationError::PositionFlag(flag));
        }
        if set && flag == DOTTED {
            flag_u32(DOUBLE_DOTTED).set_flag(&mut self.data, false);
        } else if set && flag == DOUBLE_DOTTED {
            flag_u32(DOTTED).set_flag(&mut self.data, false);
        }
        flag_u32(flag).set_flag(&mut self.data, set);
        Ok(())
    }

    pub fn has_flag(&self, flag: u32) -> bool {
        Self::is_valid_flag(flag) && flag_u32(flag).is_set(self.data)
    }

    pub fn is_rest(&self) -> bool {
        self.has_flag(REST)
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn note_on_string(&self, string: u8) -> Option<&Note> {
        self.notes.iter().find(|note| note.string() == string)
    }

    /// Add a note, replacing any note already on the same string
    pub fn add_note(&mut self, note: Note) {
        match self
            .notes
            .iter_mut()
            .find(|existing| existing.string() == note.string())
        {
            Some(existing) => *existing = note,
            None => self.notes.push(note),
        }
    }

    pub fn remove_note(&mut self, string: u8) -> Option<Note> {
        let index = self.notes.iter().position(|note| note.string() == string)?;
        Some(self.notes.remove(index))
    }
}

impl Serializable for Position {
    fn serialize<W: Write>(&self, stream: &mut OutputStream<W>) -> Result<(), StreamError> {
        stream.write_u8(self.position);
        stream.write_u16(self.beaming);
        stream.write_u32(self.data);
        stream.check_state()?;
        stream.write_vector(&self.notes)
    }

    fn deserialize(
        &mut self,
        stream: &mut InputStream<'_>,
        version: FileVersion,
    ) -> Result<(), StreamError> {
        let position = stream.read_u8();
        let beaming = stream.read_u16();
        let data = stream.read_u32();
        stream.check_state()?;
        let notes = stream.read_vector(version)?;
        *self = Position {
            position,
            beaming,
            data,
            notes,
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{from_bytes, to_bytes};

    #[test]
    fn test_note_fields_are_isolated() {
        let mut note = Note::new(5, 24).unwrap();
        note.set_string(0).unwrap();
        assert_eq!(note.fret(), 24);
        note.set_fret(0).unwrap();
        assert_eq!(note.string(), 0);
        note.set_string(MAX_STRING).unwrap();
        assert_eq!((note.string(), note.fret()), (6, 0));
    }

    #[test]
    fn test_note_rejects_out_of_range() {
        let mut note = Note::new(2, 7).unwrap();
        let before = note;
        assert_eq!(note.set_string(7), Err(ValidationError::StringIndex(7)));
        assert_eq!(note.set_fret(25), Err(ValidationError::Fret(25)));
        assert!(note.set_flag(TIED | MUTED, true).is_err());
        assert_eq!(note, before);
    }

    #[test]
    fn test_duration_and_flags_are_isolated() {
        let mut position = Position::new(3, 16).unwrap();
        position.set_flag(PALM_MUTING, true).unwrap();
        position.set_flag(DOTTED, true).unwrap();
        assert_eq!(position.duration_type(), 16);
        position.set_duration_type(1).unwrap();
        assert!(position.has_flag(PALM_MUTING));
        assert!(position.has_flag(DOTTED));
        position.set_flag(DOUBLE_DOTTED, true).unwrap();
        assert!(!position.has_flag(DOTTED));
        assert_eq!(position.duration_type(), 1);
    }

    #[test]
    fn test_position_rejects_invalid_values() {
        let mut position = Position::default();
        let before = position.clone();
        assert_eq!(
            position.set_duration_type(3),
            Err(ValidationError::DurationType(3))
        );
        assert!(position.set_flag(0x0100_0000, true).is_err());
        assert!(position.set_flag(DOTTED | REST, true).is_err());
        assert_eq!(position, before);
        assert!(Position::new(0, 128).is_err());
    }

    #[test]
    fn test_add_note_replaces_same_string() {
        let mut position = Position::default();
        position.add_note(Note::new(0, 3).unwrap());
        position.add_note(Note::new(1, 5).unwrap());
        position.add_note(Note::new(0, 7).unwrap());
        assert_eq!(position.notes().len(), 2);
        assert_eq!(position.note_on_string(0).map(Note::fret), Some(7));
        assert_eq!(position.remove_note(1).as_ref().map(Note::fret), Some(5));
        assert_eq!(position.remove_note(1), None);
    }

    #[test]
    fn test_position_round_trip() {
        let mut position = Position::new(12, 4).unwrap();
        position.set_beaming(0x0102);
        position.set_flag(VIBRATO, true).unwrap();
        let mut note = Note::new(2, 9).unwrap();
        note.set_flag(HAMMER_ON, true).unwrap();
        position.add_note(note);
        position.add_note(Note::new(4, 0).unwrap());

        let bytes = to_bytes(&position).unwrap();
        // 7 header bytes, 2 count bytes, 3 bytes per note
        assert_eq!(bytes.len(), 7 + 2 + 2 * 3);
        let decoded: Position = from_bytes(&bytes, FileVersion::CURRENT).unwrap();
        assert_eq!(decoded, position);
        assert!(decoded.notes()[0].has_flag(HAMMER_ON));
    }
}
