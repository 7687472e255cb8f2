use std::io::Write;

use crate::codec::packed_field::flag_u32;
use crate::codec::{BitField, FileVersion, InputStream, OutputStream, Serializable};
use crate::{StreamError, ValidationError};

pub const MIN_BEATS_PER_MINUTE: u16 = 40;
pub const MAX_BEATS_PER_MINUTE: u16 = 300;
pub const DEFAULT_BEATS_PER_MINUTE: u16 = 120;

// Beat types
pub const HALF: u8 = 0;
pub const HALF_DOTTED: u8 = 1;
pub const QUARTER: u8 = 2;
pub const QUARTER_DOTTED: u8 = 3;
pub const EIGHTH: u8 = 4;
pub const EIGHTH_DOTTED: u8 = 5;
pub const SIXTEENTH: u8 = 6;
pub const SIXTEENTH_DOTTED: u8 = 7;
pub const THIRTY_SECOND: u8 = 8;
pub const THIRTY_SECOND_DOTTED: u8 = 9;

// Triplet feel types
pub const NO_TRIPLET_FEEL: u8 = 0;
pub const TRIPLET_FEEL_EIGHTH: u8 = 1;
pub const TRIPLET_FEEL_SIXTEENTH: u8 = 2;
pub const TRIPLET_FEEL_EIGHTH_OFF: u8 = 3;
pub const TRIPLET_FEEL_SIXTEENTH_OFF: u8 = 4;

// Marker types
pub const NOT_SHOWN: u8 = 0;
pub const STANDARD_MARKER: u8 = 1;
pub const LISTESSO_MARKER: u8 = 2;
pub const ALTERATION_OF_PACE_MARKER: u8 = 3;

pub const ACCELERANDO: u8 = 0;
pub const RITARDANDO: u8 = 1;

pub const DEFAULT_POSITION: u8 = 0;
pub const DEFAULT_DESCRIPTION: &str = "";
pub const DEFAULT_DATA: u32 = ((STANDARD_MARKER as u32) << 27)
    | ((QUARTER as u32) << 16)
    | DEFAULT_BEATS_PER_MINUTE as u32;

/// Common tempo descriptions offered to the user
pub const DESCRIPTION_PRESETS: [&str; 11] = [
    "Fast Rock",
    "Faster",
    "Moderate Rock",
    "Moderately",
    "Moderately Fast Rock",
    "Moderately Slow Funk",
    "Moderately Slow Rock",
    "Slow Blues",
    "Slow Rock",
    "Slower",
    "Slowly",
];

const BEATS_PER_MINUTE: BitField<u32> = BitField::new(0x0000_ffff, 0);
const BEAT_TYPE: BitField<u32> = BitField::new(0x000f_0000, 16);
const LISTESSO_BEAT_TYPE: BitField<u32> = BitField::new(0x00f0_0000, 20);
const TRIPLET_FEEL_TYPE: BitField<u32> = BitField::new(0x0700_0000, 24);
const MARKER_TYPE: BitField<u32> = BitField::new(0x1800_0000, 27);
const ALTERATION_OF_PACE: BitField<u32> = flag_u32(0x2000_0000);

/// Tempo change anchored at a position within a system
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TempoMarker {
    position: u8,
    data: u32,
    description: String,
}

impl Default for TempoMarker {
    fn default() -> Self {
        TempoMarker {
            position: DEFAULT_POSITION,
            data: DEFAULT_DATA,
            description: DEFAULT_DESCRIPTION.to_owned(),
        }
    }
}

impl TempoMarker {
    pub fn new(
        position: u8,
        beat_type: u8,
        beats_per_minute: u16,
        description: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let mut marker = TempoMarker {
            position,
            description: description.into(),
            ..TempoMarker::default()
        };
        marker.set_beat_type(beat_type)?;
        marker.set_beats_per_minute(beats_per_minute)?;
        Ok(marker)
    }

    pub const fn position(&self) -> u8 {
        self.position
    }

    pub fn set_position(&mut self, position: u8) {
        self.position = position;
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub const fn is_valid_beats_per_minute(beats_per_minute: u16) -> bool {
        beats_per_minute >= MIN_BEATS_PER_MINUTE && beats_per_minute <= MAX_BEATS_PER_MINUTE
    }

    pub fn set_beats_per_minute(&mut self, beats_per_minute: u16) -> Result<(), ValidationError> {
        if !Self::is_valid_beats_per_minute(beats_per_minute) {
            return Err(ValidationError::BeatsPerMinute(beats_per_minute));
        }
        BEATS_PER_MINUTE.set(&mut self.data, u32::from(beats_per_minute));
        Ok(())
    }

    pub fn beats_per_minute(&self) -> u16 {
        BEATS_PER_MINUTE.get(self.data) as u16
    }

    pub const fn is_valid_beat_type(beat_type: u8) -> bool {
        beat_type <= THIRTY_SECOND_DOTTED
    }

    pub fn set_beat_type(&mut self, beat_type: u8) -> Result<(), ValidationError> {
        if !Self::is_valid_beat_type(beat_type) {
            return Err(ValidationError::BeatType(beat_type));
        }
        BEAT_TYPE.set(&mut self.data, u32::from(beat_type));
        Ok(())
    }

    pub fn beat_type(&self) -> u8 {
        BEAT_TYPE.get(self.data) as u8
    }

    /// Beat type the listesso marker equates the main beat type with
    pub fn set_listesso_beat_type(&mut self, beat_type: u8) -> Result<(), ValidationError> {
        if !Self::is_valid_beat_type(beat_type) {
            return Err(ValidationError::BeatType(beat_type));
        }
        LISTESSO_BEAT_TYPE.set(&mut self.data, u32::from(beat_type));
        Ok(())
    }

    pub fn listesso_beat_type(&self) -> u8 {
        LISTESSO_BEAT_TYPE.get(self.data) as u8
    }

    pub const fn is_valid_triplet_feel_type(triplet_feel: u8) -> bool {
        triplet_feel <= TRIPLET_FEEL_SIXTEENTH_OFF
    }

    pub fn set_triplet_feel_type(&mut self, triplet_feel: u8) -> Result<(), ValidationError> {
        if !Self::is_valid_triplet_feel_type(triplet_feel) {
            return Err(ValidationError::TripletFeelType(triplet_feel));
        }
        TRIPLET_FEEL_TYPE.set(&mut self.data, u32::from(triplet_feel));
        Ok(())
    }

    pub fn triplet_feel_type(&self) -> u8 {
        TRIPLET_FEEL_TYPE.get(self.data) as u8
    }

    pub fn has_triplet_feel(&self) -> bool {
        self.triplet_feel_type() != NO_TRIPLET_FEEL
    }

    pub const fn is_valid_marker_type(marker_type: u8) -> bool {
        marker_type <= ALTERATION_OF_PACE_MARKER
    }

    pub fn set_marker_type(&mut self, marker_type: u8) -> Result<(), ValidationError> {
        if !Self::is_valid_marker_type(marker_type) {
            return Err(ValidationError::TempoMarkerType(marker_type));
        }
        MARKER_TYPE.set(&mut self.data, u32::from(marker_type));
        Ok(())
    }

    pub fn marker_type(&self) -> u8 {
        MARKER_TYPE.get(self.data) as u8
    }

    pub fn is_shown(&self) -> bool {
        self.marker_type() != NOT_SHOWN
    }

    pub fn set_alteration_of_pace(&mut self, alteration: u8) -> Result<(), ValidationError> {
        if alteration > RITARDANDO {
            return Err(ValidationError::AlterationOfPace(alteration));
        }
        ALTERATION_OF_PACE.set_flag(&mut self.data, alteration == RITARDANDO);
        Ok(())
    }

    pub fn alteration_of_pace(&self) -> u8 {
        if ALTERATION_OF_PACE.is_set(self.data) {
            RITARDANDO
        } else {
            ACCELERANDO
        }
    }
}

impl Serializable for TempoMarker {
    fn serialize<W: Write>(&self, stream: &mut OutputStream<W>) -> Result<(), StreamError> {
        stream.write_u8(self.position);
        stream.write_u32(self.data);
        stream.write_string(&self.description);
        stream.check_state()
    }

    fn deserialize(
        &mut self,
        stream: &mut InputStream<'_>,
        _version: FileVersion,
    ) -> Result<(), StreamError> {
        let position = stream.read_u8();
        let data = stream.read_u32();
        let description = stream.read_string();
        stream.check_state()?;
        *self = TempoMarker {
            position,
            data,
            description,
        };
        Ok(())
    }
}
