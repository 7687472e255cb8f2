use std::io::Write;

use crate::codec::{BitField, FileVersion, InputStream, Layout, OutputStream, Serializable};
use crate::model::position::Position;
use crate::model::tuning::Tuning;
use crate::{StreamError, ValidationError};

pub const TREBLE_CLEF: u8 = 0;
pub const BASS_CLEF: u8 = 1;

pub const DEFAULT_CLEF: u8 = TREBLE_CLEF;
pub const DEFAULT_TABLATURE_STAFF_TYPE: u8 = 6;
pub const DEFAULT_DATA: u8 = (DEFAULT_CLEF << 4) | DEFAULT_TABLATURE_STAFF_TYPE;
pub const DEFAULT_STANDARD_NOTATION_STAFF_ABOVE_SPACING: u8 = 9;
pub const DEFAULT_STANDARD_NOTATION_STAFF_BELOW_SPACING: u8 = 9;
pub const DEFAULT_SYMBOL_SPACING: u8 = 0;
pub const DEFAULT_TABLATURE_STAFF_BELOW_SPACING: u8 = 0;

const CLEF: BitField<u8> = BitField::new(0x10, 4);
const TABLATURE_STAFF_TYPE: BitField<u8> = BitField::new(0x0f, 0);

/// Standard notation and tablature staff pair with two melody voices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Staff {
    data: u8,
    standard_notation_staff_above_spacing: u8,
    standard_notation_staff_below_spacing: u8,
    symbol_spacing: u8,
    tablature_staff_below_spacing: u8,
    high_melody_positions: Vec<Position>,
    low_melody_positions: Vec<Position>,
}

impl Default for Staff {
    fn default() -> Self {
        Staff {
            data: DEFAULT_DATA,
            standard_notation_staff_above_spacing: DEFAULT_STANDARD_NOTATION_STAFF_ABOVE_SPACING,
            standard_notation_staff_below_spacing: DEFAULT_STANDARD_NOTATION_STAFF_BELOW_SPACING,
            symbol_spacing: DEFAULT_SYMBOL_SPACING,
            tablature_staff_below_spacing: DEFAULT_TABLATURE_STAFF_BELOW_SPACING,
            high_melody_positions: vec![Position::default()],
            low_melody_positions: vec![Position::default()],
        }
    }
}

impl Staff {
    pub fn new(tablature_staff_type: u8, clef: u8) -> Result<Self, ValidationError> {
        let mut staff = Staff::default();
        staff.set_clef(clef)?;
        staff.set_tablature_staff_type(tablature_staff_type)?;
        Ok(staff)
    }

    pub const fn is_valid_clef(clef: u8) -> bool {
        clef <= BASS_CLEF
    }

    pub fn set_clef(&mut self, clef: u8) -> Result<(), ValidationError> {
        if !Self::is_valid_clef(clef) {
            return Err(ValidationError::Clef(clef));
        }
        CLEF.set(&mut self.data, clef);
        Ok(())
    }

    pub fn clef(&self) -> u8 {
        CLEF.get(self.data)
    }

    /// The tablature staff type is the number of strings
    pub const fn is_valid_tablature_staff_type(staff_type: u8) -> bool {
        Tuning::is_valid_string_count(staff_type as usize)
    }

    pub fn set_tablature_staff_type(&mut self, staff_type: u8) -> Result<(), ValidationError> {
        if !Self::is_valid_tablature_staff_type(staff_type) {
            return Err(ValidationError::TablatureStaffType(staff_type));
        }
        TABLATURE_STAFF_TYPE.set(&mut self.data, staff_type);
        Ok(())
    }

    pub fn tablature_staff_type(&self) -> u8 {
        TABLATURE_STAFF_TYPE.get(self.data)
    }

    pub const fn standard_notation_staff_above_spacing(&self) -> u8 {
        self.standard_notation_staff_above_spacing
    }

    pub fn set_standard_notation_staff_above_spacing(&mut self, spacing: u8) {
        self.standard_notation_staff_above_spacing = spacing;
    }

    pub const fn standard_notation_staff_below_spacing(&self) -> u8 {
        self.standard_notation_staff_below_spacing
    }

    pub fn set_standard_notation_staff_below_spacing(&mut self, spacing: u8) {
        self.standard_notation_staff_below_spacing = spacing;
    }

    pub const fn symbol_spacing(&self) -> u8 {
        self.symbol_spacing
    }

    pub fn set_symbol_spacing(&mut self, spacing: u8) {
        self.symbol_spacing = spacing;
    }

    pub const fn tablature_staff_below_spacing(&self) -> u8 {
        self.tablature_staff_below_spacing
    }

    pub fn set_tablature_staff_below_spacing(&mut self, spacing: u8) {
        self.tablature_staff_below_spacing = spacing;
    }

    pub fn high_melody_positions(&self) -> &[Position] {
        &self.high_melody_positions
    }

    pub fn low_melody_positions(&self) -> &[Position] {
        &self.low_melody_positions
    }

    pub fn high_melody_position_mut(&mut self, index: usize) -> Option<&mut Position> {
        self.high_melody_positions.get_mut(index)
    }

    pub fn low_melody_position_mut(&mut self, index: usize) -> Option<&mut Position> {
        self.low_melody_positions.get_mut(index)
    }

    pub fn push_high_melody_position(&mut self, position: Position) {
        self.high_melody_positions.push(position);
    }

    pub fn push_low_melody_position(&mut self, position: Position) {
        self.low_melody_positions.push(position);
    }
}

impl Serializable for Staff {
    fn serialize<W: Write>(&self, stream: &mut OutputStream<W>) -> Result<(), StreamError> {
        stream.write_u8(self.data);
        stream.write_u8(self.standard_notation_staff_above_spacing);
        stream.write_u8(self.standard_notation_staff_below_spacing);
        stream.write_u8(self.symbol_spacing);
        stream.write_u8(self.tablature_staff_below_spacing);
        stream.check_state()?;
        stream.write_vector(&self.high_melody_positions)?;
        stream.write_vector(&self.low_melody_positions)
    }

    fn deserialize(
        &mut self,
        stream: &mut InputStream<'_>,
        version: FileVersion,
    ) -> Result<(), StreamError> {
        let data = match version.layout() {
            // clef and tablature staff type stored as two separate bytes
            Layout::Unpacked => {
                let clef = stream.read_u8();
                let tablature_staff_type = stream.read_u8();
                stream.check_state()?;

                let mut data = DEFAULT_DATA;
                if Self::is_valid_clef(clef) {
                    CLEF.set(&mut data, clef);
                } else {
                    log::warn!("Ignoring legacy staff clef {clef}");
                }
                if Self::is_valid_tablature_staff_type(tablature_staff_type) {
                    TABLATURE_STAFF_TYPE.set(&mut data, tablature_staff_type);
                } else {
                    log::warn!("Ignoring legacy tablature staff type {tablature_staff_type}");
                }
                data
            }
            Layout::Packed => stream.read_u8(),
        };
        let standard_notation_staff_above_spacing = stream.read_u8();
        let standard_notation_staff_below_spacing = stream.read_u8();
        let symbol_spacing = stream.read_u8();
        let tablature_staff_below_spacing = stream.read_u8();
        stream.check_state()?;

        let high_melody_positions = stream.read_vector(version)?;
        let low_melody_positions = stream.read_vector(version)?;
        log::debug!(
            "Staff with {} high and {} low melody positions",
            high_melody_positions.len(),
            low_melody_positions.len()
        );
        *self = Staff {
            data,
            standard_notation_staff_above_spacing,
            standard_notation_staff_below_spacing,
            symbol_spacing,
            tablature_staff_below_spacing,
            high_melody_positions,
            low_melody_positions,
        };
        Ok(())
    }
}
